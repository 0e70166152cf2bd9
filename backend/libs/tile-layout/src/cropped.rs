use crate::{check_container_width, Dimensions, LayoutError, PlacedTile, Row};

/// Ratios an item is cropped to when its own ratio is not one of them.
/// Order matters: on a tie the earlier ratio wins.
pub const STANDARD_RATIOS: [f64; 4] = [3.0 / 2.0, 2.0 / 3.0, 4.0 / 5.0, 5.0 / 4.0];

/// Container pixels per unit of summed aspect ratio before a row closes.
const PIXELS_PER_RATIO_UNIT: f64 = 100.0;

pub fn closest_standard_ratio(aspect_ratio: f64) -> f64 {
    STANDARD_RATIOS
        .iter()
        .copied()
        .reduce(|closest, current| {
            if (current - aspect_ratio).abs() < (closest - aspect_ratio).abs() {
                current
            } else {
                closest
            }
        })
        .unwrap_or(STANDARD_RATIOS[0])
}

/// Tile items into rows using standard-ratio snapping.
///
/// A row closes as soon as the summed (snapped) aspect ratios reach
/// `container_width / 100`; its height is `container_width / sum`. Rendered
/// widths use each item's natural ratio at that height.
pub fn calculate_tile_layout<T: Dimensions>(
    items: &[T],
    container_width: f64,
) -> Result<Vec<Row<'_, T>>, LayoutError> {
    check_container_width(container_width)?;

    let threshold = container_width / PIXELS_PER_RATIO_UNIT;
    let mut rows = Vec::new();
    let mut current: Vec<(&T, bool)> = Vec::new();
    let mut total_ratio = 0.0;

    for item in items.iter().filter(|i| i.has_area()) {
        let natural = item.aspect_ratio();
        let (ratio, cropped) = if STANDARD_RATIOS.contains(&natural) {
            (natural, false)
        } else {
            (closest_standard_ratio(natural), true)
        };

        total_ratio += ratio;
        current.push((item, cropped));

        if total_ratio >= threshold {
            rows.push(close_row(std::mem::take(&mut current), total_ratio, container_width));
            total_ratio = 0.0;
        }
    }

    if !current.is_empty() {
        rows.push(close_row(current, total_ratio, container_width));
    }

    Ok(rows)
}

fn close_row<T: Dimensions>(
    items: Vec<(&T, bool)>,
    total_ratio: f64,
    container_width: f64,
) -> Row<'_, T> {
    let height = container_width / total_ratio;
    let tiles = items
        .into_iter()
        .map(|(item, cropped)| PlacedTile {
            item,
            scaled_width: height * item.aspect_ratio(),
            scaled_height: height,
            cropped,
        })
        .collect();

    Row { height, tiles }
}
