//! Where finished frames go.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use homedash_core::{DisplaySettings, FramebufferFormat, RenderError, SinkKind};

use crate::canvas::Canvas;

/// Receives each rendered frame.
pub trait FrameSink {
    fn present(&mut self, canvas: &Canvas) -> Result<(), RenderError>;

    /// Whether the user asked to quit since the last poll.
    fn poll_quit(&mut self) -> bool {
        false
    }
}

/// Open the sink selected in `settings`.
pub fn open_sink(settings: &DisplaySettings) -> Result<Box<dyn FrameSink>, RenderError> {
    let sink: Box<dyn FrameSink> = match settings.sink {
        SinkKind::Headless => Box::new(HeadlessSink::default()),
        SinkKind::Png => Box::new(PngSink::new(&settings.png_path)),
        SinkKind::Framebuffer => Box::new(FramebufferSink::open(
            &settings.framebuffer_device,
            settings.framebuffer_format,
        )?),
        #[cfg(feature = "window")]
        SinkKind::Window => Box::new(WindowSink::new("Home Dashboard")),
        #[cfg(not(feature = "window"))]
        SinkKind::Window => {
            return Err(RenderError::Sink(
                "window output requires the `window` feature".to_string(),
            ))
        }
    };

    tracing::info!("Presenting frames via {:?} sink", settings.sink);
    Ok(sink)
}

/// Discards frames; counts them for tests and dry runs.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    frames: u64,
}

impl HeadlessSink {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for HeadlessSink {
    fn present(&mut self, _canvas: &Canvas) -> Result<(), RenderError> {
        self.frames += 1;
        Ok(())
    }
}

/// Writes every frame to a PNG file, replacing it atomically.
#[derive(Debug)]
pub struct PngSink {
    path: PathBuf,
}

impl PngSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSink for PngSink {
    fn present(&mut self, canvas: &Canvas) -> Result<(), RenderError> {
        let frame = image::RgbImage::from_raw(canvas.width(), canvas.height(), canvas.to_rgb_bytes())
            .ok_or_else(|| RenderError::Sink("frame buffer size mismatch".to_string()))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        frame
            .save_with_format(&tmp_path, image::ImageFormat::Png)
            .map_err(|e| RenderError::Sink(format!("{}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| RenderError::Sink(format!("{}: {}", self.path.display(), e)))
    }
}

/// Writes frames to a Linux framebuffer device such as `/dev/fb1`.
#[derive(Debug)]
pub struct FramebufferSink {
    device: PathBuf,
    format: FramebufferFormat,
    file: File,
}

impl FramebufferSink {
    pub fn open(device: impl Into<PathBuf>, format: FramebufferFormat) -> Result<Self, RenderError> {
        let device = device.into();
        let file = OpenOptions::new()
            .write(true)
            .open(&device)
            .map_err(|e| RenderError::Sink(format!("{}: {}", device.display(), e)))?;

        Ok(Self {
            device,
            format,
            file,
        })
    }
}

/// Pack a frame into the byte layout a framebuffer expects (little endian).
pub fn encode_frame(canvas: &Canvas, format: FramebufferFormat) -> Vec<u8> {
    match format {
        FramebufferFormat::Rgb565 => canvas
            .colors()
            .iter()
            .flat_map(|c| Rgb565::from(*c).into_storage().to_le_bytes())
            .collect(),
        FramebufferFormat::Xrgb8888 => canvas
            .colors()
            .iter()
            .flat_map(|c| [c.b(), c.g(), c.r(), 0xff])
            .collect(),
    }
}

impl FrameSink for FramebufferSink {
    fn present(&mut self, canvas: &Canvas) -> Result<(), RenderError> {
        let bytes = encode_frame(canvas, self.format);
        let sink_err = |e: std::io::Error| RenderError::Sink(format!("{}: {}", self.device.display(), e));

        self.file.seek(SeekFrom::Start(0)).map_err(sink_err)?;
        self.file.write_all(&bytes).map_err(sink_err)?;
        self.file.flush().map_err(sink_err)
    }
}

#[cfg(feature = "window")]
pub use window::WindowSink;

#[cfg(feature = "window")]
mod window {
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::sdl2::Keycode;
    use embedded_graphics_simulator::{
        OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
    };
    use homedash_core::RenderError;

    use super::FrameSink;
    use crate::canvas::Canvas;
    use crate::layout::{SCREEN_HEIGHT, SCREEN_WIDTH};

    /// Desktop window; closing it or pressing Escape requests quit.
    pub struct WindowSink {
        display: SimulatorDisplay<Rgb888>,
        window: Window,
        quit: bool,
    }

    impl WindowSink {
        pub fn new(title: &str) -> Self {
            Self {
                display: SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)),
                window: Window::new(title, &OutputSettingsBuilder::new().build()),
                quit: false,
            }
        }
    }

    impl FrameSink for WindowSink {
        fn present(&mut self, canvas: &Canvas) -> Result<(), RenderError> {
            let width = canvas.width();
            let pixels = canvas.colors().iter().enumerate().map(|(i, c)| {
                let i = i as u32;
                Pixel(Point::new((i % width) as i32, (i / width) as i32), *c)
            });
            self.display.draw_iter(pixels)?;
            self.window.update(&self.display);
            Ok(())
        }

        fn poll_quit(&mut self) -> bool {
            for event in self.window.events() {
                match event {
                    SimulatorEvent::Quit => self.quit = true,
                    SimulatorEvent::KeyDown { keycode, .. } if keycode == Keycode::Escape => {
                        self.quit = true
                    }
                    _ => {}
                }
            }
            self.quit
        }
    }
}
