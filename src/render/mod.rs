pub mod colormap;
pub mod frame;
pub mod glyphs;

pub use frame::{FrameJob, FrameRenderer, MarkerSpec, RenderConfig, RenderedFrame};
