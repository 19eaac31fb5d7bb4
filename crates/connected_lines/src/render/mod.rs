//! Drawing: surfaces and the render pass that feeds them.
pub mod pass;
pub mod raster;
pub mod surface;

pub use pass::{render_frame, FrameStats, Viewport, NODE_COLOR};
pub use raster::RasterSurface;
pub use surface::{DrawOp, RecordingSurface, Surface};
