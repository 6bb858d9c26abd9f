pub mod collector;

pub use collector::{PlacementCollector, PlacementStatus, PLACEMENT_NOTICE};
