//! Hierarchy module - aggregation, color encoding and sunburst layout

mod color;
mod layout;
mod tree;

pub use color::{format_number, plasma, ColorScale, Rgb, PLASMA};
pub use layout::{Sector, WheelLayout};
pub use tree::{ColorAggregate, WheelTree};
