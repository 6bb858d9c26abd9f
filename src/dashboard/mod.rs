pub mod branding;
pub(crate) mod commands;
pub mod controller;
pub mod events;
pub mod session;

pub use controller::{DashboardController, FrameSink};
pub use session::{DashboardSession, DashboardSnapshot, StepOutcome};
