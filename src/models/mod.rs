pub mod placement;
pub mod reading;
pub mod window;

pub use placement::{ClickPoint, Placement};
pub use reading::{MergedRow, Reading, SENSOR_LABELS};
pub use window::TimeWindow;
