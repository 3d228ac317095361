//! The four dashboard tiles and the text each one shows.

use std::fmt::Debug;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use homedash_core::RenderError;
use homedash_services::Task;
use homedash_weather::{WeatherIcon, WeatherSnapshot, ICON_SIZE};
use u8g2_fonts::types::{HorizontalAlignment, VerticalPosition};

use crate::canvas::Canvas;
use crate::clock::ClockFace;
use crate::layout::*;
use crate::text::{draw_text, FontSize};

pub const TODO_HEADING: &str = "TO-DO";
pub const NO_TASKS: &str = "No tasks pending.";
pub const WEATHER_PLACEHOLDER: [&str; 3] = ["No data", "Check API", "Connection?"];

const CHECKED: &str = "☑ ";
const UNCHECKED: &str = "☐ ";

/// Horizontal placement of a stack of lines inside a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Center,
    Left,
    Right,
}

/// What the weather tile shows.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherLines {
    Current {
        temperature: String,
        /// Description, then humidity
        details: [String; 2],
    },
    Placeholder([&'static str; 3]),
}

pub fn weather_lines(snapshot: Option<&WeatherSnapshot>) -> WeatherLines {
    match snapshot {
        Some(s) => WeatherLines::Current {
            temperature: s.temperature_label(),
            details: [s.description.clone(), s.humidity_label()],
        },
        None => WeatherLines::Placeholder(WEATHER_PLACEHOLDER),
    }
}

/// One line per task with its checkbox glyph, or the empty-list placeholder.
pub fn todo_lines(tasks: &[Task]) -> Vec<String> {
    if tasks.is_empty() {
        return vec![NO_TASKS.to_string()];
    }

    tasks
        .iter()
        .map(|task| {
            let glyph = if task.is_checked { CHECKED } else { UNCHECKED };
            format!("{}{}", glyph, task.task_text)
        })
        .collect()
}

fn fill_tile(canvas: &mut Canvas, rect: Rectangle, color: Rgb888) -> Result<(), RenderError> {
    RoundedRectangle::with_equal_corners(rect, Size::new(CORNER_RADIUS, CORNER_RADIUS))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(canvas)?;
    Ok(())
}

/// Draw `lines` as a vertically centred stack inside `rect`.
pub fn draw_lines<D, S>(target: &mut D, rect: Rectangle, lines: &[S], size: FontSize, align: Align)
where
    D: DrawTarget<Color = Rgb888>,
    D::Error: Debug,
    S: AsRef<str>,
{
    let line_height = size.line_height() as i32;
    let total = line_height * lines.len() as i32;
    let mut y = rect.top_left.y + (rect.size.height as i32 - total) / 2;

    let (x, horizontal) = match align {
        Align::Center => (rect.center().x, HorizontalAlignment::Center),
        Align::Left => (rect.top_left.x + TEXT_INSET, HorizontalAlignment::Left),
        Align::Right => (
            rect.top_left.x + rect.size.width as i32 - TEXT_INSET,
            HorizontalAlignment::Right,
        ),
    };

    for line in lines {
        draw_text(
            target,
            line.as_ref(),
            Point::new(x, y + line_height / 2),
            VerticalPosition::Center,
            horizontal,
            size,
        );
        y += line_height;
    }
}

/// Filled rounded tile with centred text on top.
pub fn draw_tile<S: AsRef<str>>(
    canvas: &mut Canvas,
    rect: Rectangle,
    color: Rgb888,
    lines: &[S],
    size: FontSize,
    align: Align,
) -> Result<(), RenderError> {
    fill_tile(canvas, rect, color)?;
    draw_lines(canvas, rect, lines, size, align);
    Ok(())
}

pub fn draw_time_tile(canvas: &mut Canvas, clock: &ClockFace) -> Result<(), RenderError> {
    let rect = TIME_TILE;
    // The blank second line lifts the clock into the upper part of the tile.
    draw_tile(canvas, rect, TIME_COLOR, &[clock.clock(), ""], FontSize::Large, Align::Center)?;

    let large = FontSize::Large.line_height() as i32;
    let clock_center = rect.top_left.y + (rect.size.height as i32 - 2 * large) / 2 + large / 2;
    let date_center = clock_center + large / 2 + FontSize::Medium.line_height() as i32 / 2;
    draw_text(
        canvas,
        clock.date(),
        Point::new(rect.center().x, date_center),
        VerticalPosition::Center,
        HorizontalAlignment::Center,
        FontSize::Medium,
    );

    let bottom_right = rect.anchor_point(embedded_graphics::geometry::AnchorPoint::BottomRight)
        - Point::new(PADDING as i32, PADDING as i32);
    draw_text(
        canvas,
        clock.seconds(),
        bottom_right,
        VerticalPosition::Bottom,
        HorizontalAlignment::Right,
        FontSize::Small,
    );
    Ok(())
}

pub fn draw_weather_tile(
    canvas: &mut Canvas,
    snapshot: Option<&WeatherSnapshot>,
    icon: Option<&WeatherIcon>,
) -> Result<(), RenderError> {
    let rect = WEATHER_TILE;

    let (temperature, details) = match weather_lines(snapshot) {
        WeatherLines::Placeholder(lines) => {
            return draw_tile(canvas, rect, WEATHER_COLOR, &lines, FontSize::Medium, Align::Center);
        }
        WeatherLines::Current {
            temperature,
            details,
        } => (temperature, details),
    };

    fill_tile(canvas, rect, WEATHER_COLOR)?;

    // Text sits to the right of the icon column.
    let text_area = Rectangle::new(
        rect.top_left + Point::new(ICON_SIZE as i32, 0),
        Size::new(rect.size.width - ICON_SIZE, rect.size.height),
    );
    let center_y = rect.center().y;

    draw_text(
        canvas,
        &temperature,
        Point::new(text_area.center().x, center_y - FontSize::Large.line_height() as i32 / 2),
        VerticalPosition::Center,
        HorizontalAlignment::Center,
        FontSize::Large,
    );

    let step = FontSize::Small.line_height() as i32 + 5;
    for (idx, line) in details.iter().enumerate() {
        draw_text(
            canvas,
            line,
            Point::new(text_area.center().x, center_y + idx as i32 * step),
            VerticalPosition::Top,
            HorizontalAlignment::Center,
            FontSize::Small,
        );
    }

    if let Some(icon) = icon {
        let top_left = Point::new(
            rect.top_left.x,
            rect.top_left.y + (rect.size.height as i32 - icon.height as i32) / 2,
        );
        draw_icon(canvas, icon, top_left, WEATHER_COLOR)?;
    }
    Ok(())
}

/// Blend an RGBA icon over a solid background colour.
fn draw_icon(
    canvas: &mut Canvas,
    icon: &WeatherIcon,
    top_left: Point,
    background: Rgb888,
) -> Result<(), RenderError> {
    let blend = |fg: u8, bg: u8, alpha: u8| -> u8 {
        let a = u16::from(alpha);
        ((u16::from(fg) * a + u16::from(bg) * (255 - a) + 127) / 255) as u8
    };

    let pixels = (0..icon.height).flat_map(|y| (0..icon.width).map(move |x| (x, y)));
    let pixels = pixels.filter_map(|(x, y)| {
        let [r, g, b, a] = icon.pixel(x, y)?;
        if a == 0 {
            return None;
        }
        let color = Rgb888::new(
            blend(r, background.r(), a),
            blend(g, background.g(), a),
            blend(b, background.b(), a),
        );
        Some(Pixel(top_left + Point::new(x as i32, y as i32), color))
    });

    canvas.draw_iter(pixels)?;
    Ok(())
}

pub fn draw_todo_tile(canvas: &mut Canvas, tasks: &[Task]) -> Result<(), RenderError> {
    let rect = TODO_TILE;
    fill_tile(canvas, rect, TODO_COLOR)?;

    let heading_center = rect.top_left.y + 20 + PADDING as i32;
    draw_text(
        canvas,
        TODO_HEADING,
        Point::new(rect.center().x, heading_center),
        VerticalPosition::Center,
        HorizontalAlignment::Center,
        FontSize::Medium,
    );

    let list_top = heading_center + FontSize::Medium.line_height() as i32 / 2 + PADDING as i32;
    let list_area = Rectangle::new(
        Point::new(rect.top_left.x, list_top),
        Size::new(
            rect.size.width,
            (rect.top_left.y + rect.size.height as i32 - list_top).max(0) as u32,
        ),
    );

    let lines = todo_lines(tasks);
    let align = if tasks.is_empty() {
        Align::Center
    } else {
        Align::Left
    };

    let capacity = (list_area.size.height / FontSize::Symbols.line_height()) as usize;
    if lines.len() > capacity {
        tracing::debug!("{} tasks, only {} fit on screen", lines.len(), capacity);
    }

    let mut clipped = canvas.clipped(&list_area);
    draw_lines(&mut clipped, list_area, &lines, FontSize::Symbols, align);
    Ok(())
}

pub fn draw_quote_bar(canvas: &mut Canvas, quote: &str) -> Result<(), RenderError> {
    draw_tile(canvas, QUOTE_BAR, QUOTE_COLOR, &[quote], FontSize::Medium, Align::Center)
}
