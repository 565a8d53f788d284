//! # Floating Geometry
//!
//! Pure rect arithmetic behind the floating layer mutations. Every function
//! returns a rect that already satisfies the canvas bounds:
//!
//! - `0 <= x` and `x + width <= inner`
//! - `y >= 0`
//! - `width >= MIN_IMAGE_WIDTH`
//!
//! Out-of-range requests are clamped, never rejected.

use folio_document::floating::{clamp_width, clamp_x, clamp_y};
use folio_document::{Rect, MIN_IMAGE_WIDTH};
use serde::{Deserialize, Serialize};

/// Resize handle on the selection frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    fn east(self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    fn west(self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    fn north(self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    fn south(self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    /// Whether the handle has a horizontal component
    fn drives_width(self) -> bool {
        self.east() || self.west()
    }

    fn drives_height(self) -> bool {
        self.north() || self.south()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self, step: f64) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -step),
            Direction::Down => (0.0, step),
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
        }
    }
}

/// Round to the nearest multiple of `grid`
pub fn snap(value: f64, grid: f64) -> f64 {
    if grid > 0.0 && value.is_finite() {
        (value / grid).round() * grid
    } else {
        value
    }
}

/// Rect for a freshly created image
///
/// Oversized images are scaled down to the inner width and undersized ones
/// raised to the minimum width, both keeping their aspect ratio. Without an
/// explicit `x` the image is centred horizontally.
pub fn create_rect(width: f64, height: f64, x: Option<f64>, y: Option<f64>, inner: f64) -> Rect {
    let natural = if width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0 {
        Rect::new(0.0, 0.0, width, height)
    } else {
        Rect::new(0.0, 0.0, MIN_IMAGE_WIDTH, MIN_IMAGE_WIDTH)
    };

    let aspect = natural.aspect_ratio();
    let width = clamp_width(natural.width, inner);
    let height = if width == natural.width {
        natural.height
    } else {
        (width / aspect).max(1.0)
    };

    let x = x.unwrap_or((inner - width) / 2.0);
    let y = y.unwrap_or(0.0);
    Rect::new(clamp_x(x, width, inner), clamp_y(y), width, height)
}

/// Move to `(x, y)`, snapping first when a grid is given
pub fn move_rect(rect: Rect, x: f64, y: f64, grid: Option<f64>, inner: f64) -> Rect {
    let (x, y) = match grid {
        Some(grid) => (snap(x, grid), snap(y, grid)),
        None => (x, y),
    };
    Rect { x, y, ..rect }.clamp_within(inner)
}

/// Resize from the rect captured at resize start
///
/// Deltas are the total pointer travel since the start, so repeated calls
/// with the same `start` never accumulate error.
pub fn resize_rect(
    start: Rect,
    handle: Handle,
    delta_x: f64,
    delta_y: f64,
    lock_aspect: bool,
    inner: f64,
) -> Rect {
    let aspect = start.aspect_ratio();
    let right = start.x + start.width;
    let bottom = start.y + start.height;

    // Widest the item can get while staying inside the canvas
    let max_width = if handle.west() { right } else { inner - start.x }
        .min(inner)
        .max(MIN_IMAGE_WIDTH);

    let raw_width = if handle.east() {
        start.width + delta_x
    } else if handle.west() {
        start.width - delta_x
    } else {
        start.width
    };

    let raw_height = if handle.south() {
        start.height + delta_y
    } else if handle.north() {
        (start.height - delta_y).min(bottom.max(MIN_IMAGE_WIDTH))
    } else {
        start.height
    };

    let (width, height) = if handle.drives_width() {
        let width = finite_or(raw_width, start.width).clamp(MIN_IMAGE_WIDTH, max_width);
        let height = if lock_aspect {
            (width / aspect).max(1.0)
        } else if handle.drives_height() {
            finite_or(raw_height, start.height).max(MIN_IMAGE_WIDTH)
        } else {
            start.height
        };
        (width, height)
    } else if lock_aspect {
        let height = finite_or(raw_height, start.height).max(MIN_IMAGE_WIDTH);
        let width = (height * aspect).clamp(MIN_IMAGE_WIDTH, max_width);
        let height = if width == height * aspect {
            height
        } else {
            (width / aspect).max(1.0)
        };
        (width, height)
    } else {
        let height = finite_or(raw_height, start.height).max(MIN_IMAGE_WIDTH);
        (start.width.clamp(MIN_IMAGE_WIDTH, max_width), height)
    };

    let x = if handle.west() { right - width } else { start.x };
    let y = if handle.north() { bottom - height } else { start.y };

    Rect::new(clamp_x(x, width, inner), clamp_y(y), width, height)
}

pub fn align_rect(rect: Rect, alignment: Alignment, inner: f64) -> Rect {
    let rect = rect.clamp_within(inner);
    let x = match alignment {
        Alignment::Left => 0.0,
        Alignment::Center => (inner - rect.width) / 2.0,
        Alignment::Right => inner - rect.width,
    };
    Rect { x: clamp_x(x, rect.width, inner), ..rect }
}

/// Keyboard nudge, clamped like a move but never snapped
pub fn nudge_rect(rect: Rect, direction: Direction, step: f64, inner: f64) -> Rect {
    let (dx, dy) = direction.delta(step);
    move_rect(rect, rect.x + dx, rect.y + dy, None, inner)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INNER: f64 = 720.0;

    #[test]
    fn test_east_resize_with_aspect_lock() {
        let start = Rect::new(100.0, 0.0, 200.0, 100.0);
        let rect = resize_rect(start, Handle::E, 50.0, 0.0, true, INNER);

        assert_eq!(rect, Rect::new(100.0, 0.0, 250.0, 125.0));
    }

    #[test]
    fn test_east_resize_without_lock_keeps_height() {
        let start = Rect::new(100.0, 0.0, 200.0, 100.0);
        let rect = resize_rect(start, Handle::E, 50.0, 30.0, false, INNER);

        assert_eq!(rect, Rect::new(100.0, 0.0, 250.0, 100.0));
    }

    #[test]
    fn test_west_resize_shifts_x() {
        let start = Rect::new(100.0, 10.0, 200.0, 100.0);
        let rect = resize_rect(start, Handle::W, 40.0, 0.0, false, INNER);

        assert_eq!(rect, Rect::new(140.0, 10.0, 160.0, 100.0));
    }

    #[test]
    fn test_west_resize_holds_position_once_floored() {
        let start = Rect::new(100.0, 0.0, 200.0, 100.0);
        let floored = resize_rect(start, Handle::W, 180.0, 0.0, false, INNER);
        let beyond = resize_rect(start, Handle::W, 400.0, 0.0, false, INNER);

        assert_eq!(floored.width, MIN_IMAGE_WIDTH);
        assert_eq!(floored.x, 250.0);
        assert_eq!(beyond, floored);
    }

    #[test]
    fn test_west_resize_cannot_leave_canvas() {
        let start = Rect::new(30.0, 0.0, 200.0, 100.0);
        let rect = resize_rect(start, Handle::W, -100.0, 0.0, false, INNER);

        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.width, 230.0);
    }

    #[test]
    fn test_north_resize_with_lock_derives_width() {
        let start = Rect::new(0.0, 100.0, 200.0, 100.0);
        let rect = resize_rect(start, Handle::N, 0.0, -50.0, true, INNER);

        assert_eq!(rect, Rect::new(0.0, 50.0, 300.0, 150.0));
    }

    #[test]
    fn test_corner_resize_uses_horizontal_component() {
        let start = Rect::new(0.0, 0.0, 200.0, 100.0);
        let rect = resize_rect(start, Handle::SE, 100.0, 5.0, true, INNER);

        assert_eq!(rect, Rect::new(0.0, 0.0, 300.0, 150.0));
    }

    #[test]
    fn test_resize_is_capped_at_canvas_edge() {
        let start = Rect::new(600.0, 0.0, 100.0, 100.0);
        let rect = resize_rect(start, Handle::E, 500.0, 0.0, true, INNER);

        assert_eq!(rect.width, 120.0);
        assert_eq!(rect.height, 120.0);
        assert_eq!(rect.x + rect.width, INNER);
    }

    #[test]
    fn test_resize_repeated_from_origin_does_not_accumulate() {
        let start = Rect::new(100.0, 0.0, 200.0, 100.0);
        let mut rect = start;
        for dx in [10.0, 20.0, 30.0] {
            rect = resize_rect(start, Handle::E, dx, 0.0, true, INNER);
        }

        assert_eq!(rect, Rect::new(100.0, 0.0, 230.0, 115.0));
    }

    #[test]
    fn test_move_snaps_then_clamps() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);

        assert_eq!(move_rect(rect, 13.0, 21.0, Some(8.0), INNER), Rect::new(16.0, 24.0, 200.0, 100.0));
        assert_eq!(move_rect(rect, 13.0, 21.0, None, INNER), Rect::new(13.0, 21.0, 200.0, 100.0));
        assert_eq!(move_rect(rect, 9999.0, -5.0, Some(8.0), INNER), Rect::new(520.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_create_centres_and_scales() {
        let rect = create_rect(200.0, 100.0, None, None, INNER);
        assert_eq!(rect, Rect::new(260.0, 0.0, 200.0, 100.0));

        let huge = create_rect(1440.0, 960.0, Some(30.0), Some(40.0), INNER);
        assert_eq!(huge, Rect::new(0.0, 40.0, 720.0, 480.0));

        let tiny = create_rect(20.0, 10.0, Some(0.0), None, INNER);
        assert_eq!(tiny, Rect::new(0.0, 0.0, 50.0, 25.0));
    }

    #[test]
    fn test_create_with_missing_dimensions() {
        let rect = create_rect(0.0, f64::NAN, None, None, INNER);
        assert_eq!(rect.width, MIN_IMAGE_WIDTH);
        assert_eq!(rect.height, MIN_IMAGE_WIDTH);
    }

    #[test]
    fn test_align() {
        let rect = Rect::new(33.0, 10.0, 200.0, 100.0);

        assert_eq!(align_rect(rect, Alignment::Left, INNER).x, 0.0);
        assert_eq!(align_rect(rect, Alignment::Center, INNER).x, 260.0);
        assert_eq!(align_rect(rect, Alignment::Right, INNER).x, 520.0);
    }

    #[test]
    fn test_nudge_ignores_grid_and_clamps() {
        let rect = Rect::new(3.0, 0.0, 200.0, 100.0);

        assert_eq!(nudge_rect(rect, Direction::Right, 1.0, INNER).x, 4.0);
        assert_eq!(nudge_rect(rect, Direction::Left, 10.0, INNER).x, 0.0);
        assert_eq!(nudge_rect(rect, Direction::Up, 10.0, INNER).y, 0.0);
        assert_eq!(nudge_rect(rect, Direction::Down, 10.0, INNER).y, 10.0);
    }

    #[test]
    fn test_handle_wire_names() {
        assert_eq!(serde_json::to_string(&Handle::SE).unwrap(), "\"se\"");
        assert_eq!(serde_json::from_str::<Handle>("\"nw\"").unwrap(), Handle::NW);
        assert!(serde_json::from_str::<Handle>("\"x\"").is_err());
    }
}
