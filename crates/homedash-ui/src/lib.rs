//! Drawing for the dashboard screen.
//!
//! Everything is drawn immediate-mode into a [`Canvas`] each frame and handed
//! to a [`FrameSink`]. Only the clock strings persist between frames.

pub mod canvas;
pub mod clock;
pub mod dashboard;
pub mod layout;
pub mod sink;
pub mod text;
pub mod tiles;

pub use canvas::Canvas;
pub use clock::{ClockChange, ClockFace};
pub use dashboard::{Dashboard, FrameModel};
pub use sink::{open_sink, FrameSink, FramebufferSink, HeadlessSink, PngSink};
pub use tiles::{todo_lines, weather_lines, Align, WeatherLines};

#[cfg(feature = "window")]
pub use sink::WindowSink;
