//! Row tiling for media galleries
//!
//! Arranges images and videos of varying aspect ratios into rows that fill a
//! container width. Two strategies are provided:
//!
//! - [`justified_rows`]: items keep their natural aspect ratio; each row is
//!   scaled so its total width matches the container.
//! - [`calculate_tile_layout`]: items are snapped to the nearest standard
//!   photographic ratio (3:2, 2:3, 4:5, 5:4) and rows close once enough ratio
//!   has accumulated for the container.
//!
//! Both are single-pass and operate on anything implementing [`Dimensions`].

mod cropped;
mod justified;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cropped::{calculate_tile_layout, closest_standard_ratio, STANDARD_RATIOS};
pub use justified::{justified_rows, DEFAULT_TARGET_ROW_HEIGHT};

/// Natural pixel dimensions of a tile-able item.
pub trait Dimensions {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Width over height. Only meaningful when [`has_area`](Self::has_area) holds.
    fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Whether the item can be placed at all.
    fn has_area(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LayoutError {
    #[error("container width must be a positive number, got {0}")]
    InvalidContainerWidth(f64),

    #[error("target row height must be a positive number, got {0}")]
    InvalidRowHeight(f64),
}

/// Which tiling strategy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Justified,
    Cropped,
}

/// An item placed in a row at its rendered size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTile<'a, T> {
    pub item: &'a T,
    pub scaled_width: f64,
    pub scaled_height: f64,
    /// Set when the item's ratio was snapped to a standard ratio.
    pub cropped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row<'a, T> {
    pub height: f64,
    pub tiles: Vec<PlacedTile<'a, T>>,
}

impl<T> Row<'_, T> {
    /// Sum of the rendered widths in this row.
    pub fn width(&self) -> f64 {
        self.tiles.iter().map(|t| t.scaled_width).sum()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Run the strategy selected by `mode`.
///
/// `target_row_height` only applies to [`LayoutMode::Justified`].
pub fn layout<'a, T: Dimensions>(
    items: &'a [T],
    container_width: f64,
    mode: LayoutMode,
    target_row_height: Option<f64>,
) -> Result<Vec<Row<'a, T>>, LayoutError> {
    match mode {
        LayoutMode::Justified => justified_rows(
            items,
            container_width,
            target_row_height.unwrap_or(DEFAULT_TARGET_ROW_HEIGHT),
        ),
        LayoutMode::Cropped => calculate_tile_layout(items, container_width),
    }
}

pub(crate) fn check_container_width(container_width: f64) -> Result<(), LayoutError> {
    if container_width.is_finite() && container_width > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidContainerWidth(container_width))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Dimensions;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Photo {
        pub id: u32,
        pub w: f64,
        pub h: f64,
    }

    impl Dimensions for Photo {
        fn width(&self) -> f64 {
            self.w
        }

        fn height(&self) -> f64 {
            self.h
        }
    }

    pub fn photo(id: u32, w: f64, h: f64) -> Photo {
        Photo { id, w, h }
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::testing::photo;
    use super::*;

    #[test]
    fn has_area_rejects_degenerate_sizes() {
        assert!(photo(1, 300.0, 200.0).has_area());
        assert!(!photo(2, 0.0, 200.0).has_area());
        assert!(!photo(3, 300.0, -1.0).has_area());
        assert!(!photo(4, f64::NAN, 200.0).has_area());
    }

    #[test]
    fn layout_dispatches_on_mode() {
        let items = vec![photo(1, 300.0, 200.0), photo(2, 1000.0, 200.0)];

        let justified = layout(&items, 1200.0, LayoutMode::Justified, Some(200.0)).unwrap();
        assert!(justified.iter().all(|row| row.tiles.iter().all(|t| !t.cropped)));

        let cropped = layout(&items, 1200.0, LayoutMode::Cropped, None).unwrap();
        assert!(cropped[0].tiles[1].cropped);
    }

    #[test]
    fn layout_mode_parses_lowercase() {
        let mode: LayoutMode = serde_json::from_str("\"cropped\"").unwrap();
        assert_eq!(mode, LayoutMode::Cropped);
        assert_eq!(LayoutMode::default(), LayoutMode::Justified);
    }

    #[test]
    fn rows_serialize_with_item_payload() {
        let items = vec![photo(7, 300.0, 200.0)];
        let rows = justified_rows(&items, 600.0, 200.0).unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["tiles"][0]["item"]["id"], 7);
        assert_eq!(json[0]["tiles"][0]["cropped"], false);
    }
}
