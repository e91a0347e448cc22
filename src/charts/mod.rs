//! Charts module - Wheel map model, interactive plotting and static rendering

mod plotter;
mod renderer;
mod wheel;

pub use plotter::WheelPlotter;
pub use renderer::{escape_xml, RenderError, StaticWheelRenderer};
pub use wheel::{ChartStyle, WheelChart, WheelSettings, MAX_SIZE, MIN_SIZE};
