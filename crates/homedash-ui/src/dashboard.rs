use chrono::NaiveDateTime;
use embedded_graphics::prelude::*;
use homedash_core::RenderError;
use homedash_services::Task;
use homedash_weather::{WeatherIcon, WeatherSnapshot};

use crate::canvas::Canvas;
use crate::clock::{ClockChange, ClockFace};
use crate::layout::BACKGROUND;
use crate::tiles;

/// Everything one frame needs, borrowed from shared state.
#[derive(Debug, Clone, Copy)]
pub struct FrameModel<'a> {
    pub now: NaiveDateTime,
    pub weather: Option<&'a WeatherSnapshot>,
    pub icon: Option<&'a WeatherIcon>,
    pub tasks: &'a [Task],
    pub quote: &'a str,
}

/// Immediate-mode renderer for the whole screen.
#[derive(Debug)]
pub struct Dashboard {
    clock: ClockFace,
}

impl Dashboard {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            clock: ClockFace::new(now),
        }
    }

    pub fn clock(&self) -> &ClockFace {
        &self.clock
    }

    /// Draw a full frame. Returns which clock parts changed since the last one.
    pub fn render(
        &mut self,
        canvas: &mut Canvas,
        model: &FrameModel<'_>,
    ) -> Result<ClockChange, RenderError> {
        let change = self.clock.update(model.now);

        canvas.clear(BACKGROUND)?;
        tiles::draw_time_tile(canvas, &self.clock)?;
        tiles::draw_quote_bar(canvas, model.quote)?;
        tiles::draw_weather_tile(canvas, model.weather, model.icon)?;
        tiles::draw_todo_tile(canvas, model.tasks)?;

        Ok(change)
    }
}
