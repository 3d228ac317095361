//! Screen geometry and palette.
//!
//! All rectangles derive from the canvas size at compile time.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

// =============================================================================
// Canvas
// =============================================================================

pub const SCREEN_WIDTH: u32 = 480;
pub const SCREEN_HEIGHT: u32 = 320;

/// Gap between tiles and around the screen edge.
pub const PADDING: u32 = 10;

pub const QUOTE_BAR_HEIGHT: u32 = 60;

pub const CORNER_RADIUS: u32 = 12;

/// Horizontal inset for left/right aligned text.
pub const TEXT_INSET: i32 = 10;

// =============================================================================
// Tiles
// =============================================================================

/// Two columns with padding on both sides and between them.
pub const TILE_WIDTH: u32 = (SCREEN_WIDTH - 3 * PADDING) / 2;

/// Space above the quote bar, shared by two stacked tiles.
const AVAILABLE_HEIGHT: u32 = SCREEN_HEIGHT - 3 * PADDING - QUOTE_BAR_HEIGHT;

pub const TILE_HEIGHT: u32 = (AVAILABLE_HEIGHT - PADDING) / 2;

pub const TIME_TILE: Rectangle = Rectangle::new(
    Point::new(PADDING as i32, PADDING as i32),
    Size::new(TILE_WIDTH, TILE_HEIGHT),
);

pub const WEATHER_TILE: Rectangle = Rectangle::new(
    Point::new(PADDING as i32, (PADDING * 2 + TILE_HEIGHT) as i32),
    Size::new(TILE_WIDTH, TILE_HEIGHT),
);

/// Right column, spanning both rows.
pub const TODO_TILE: Rectangle = Rectangle::new(
    Point::new((2 * PADDING + TILE_WIDTH) as i32, PADDING as i32),
    Size::new(TILE_WIDTH, 2 * TILE_HEIGHT + PADDING),
);

pub const QUOTE_BAR: Rectangle = Rectangle::new(
    Point::new(PADDING as i32, (SCREEN_HEIGHT - PADDING - QUOTE_BAR_HEIGHT) as i32),
    Size::new(SCREEN_WIDTH - 2 * PADDING, QUOTE_BAR_HEIGHT),
);

// =============================================================================
// Palette
// =============================================================================

pub const BACKGROUND: Rgb888 = Rgb888::new(0, 0, 0);
pub const TEXT_COLOR: Rgb888 = Rgb888::new(255, 255, 255);
pub const TIME_COLOR: Rgb888 = Rgb888::new(235, 123, 52);
pub const WEATHER_COLOR: Rgb888 = Rgb888::new(20, 138, 186);
pub const TODO_COLOR: Rgb888 = Rgb888::new(19, 140, 139);
pub const QUOTE_COLOR: Rgb888 = Rgb888::new(231, 175, 59);
