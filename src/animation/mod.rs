pub mod state;

pub use state::{Advance, AnimationState, AnimationStatus};
