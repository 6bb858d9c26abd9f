pub mod merge;
pub mod range;

pub use merge::{merge_readings, MergedData};
pub use range::ValueRange;
