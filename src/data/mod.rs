//! Data module - dataset loading and hierarchy preparation

mod loader;
mod processor;

pub use loader::{DataLoader, SUPPORTED_EXTENSIONS};
pub use processor::{ColorMode, ColorValue, DataProcessor, PathRow, PreparedRows, ProcessorError};
