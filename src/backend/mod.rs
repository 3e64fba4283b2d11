//! Drawing surfaces and grid backends that need no window system.

pub mod headless;
#[cfg(feature = "raster")]
#[cfg_attr(docsrs, doc(cfg(feature = "raster")))]
pub mod raster;
pub mod recording;

pub use headless::{HeadlessBackend, HeadlessWindow, WindowStats};
#[cfg(feature = "raster")]
pub use raster::{compose, RasterBackend, RasterSurface};
pub use recording::{DrawCommand, RecordingSurface};
