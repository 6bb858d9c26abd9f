pub mod csv_loader;
pub mod floor_plan;

pub use csv_loader::{load_readings, LoadedReadings};
pub use floor_plan::FloorPlan;
