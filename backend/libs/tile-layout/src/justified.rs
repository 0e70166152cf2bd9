use crate::{check_container_width, Dimensions, LayoutError, PlacedTile, Row};

/// Row height the justified layout aims for before scaling.
pub const DEFAULT_TARGET_ROW_HEIGHT: f64 = 300.0;

/// Pack items into rows of roughly `target_row_height`, then scale each row
/// so its width equals `container_width`.
///
/// An item is moved to a new row when adding it would overflow the container.
/// The final row is scaled the same way, so a short trailing row comes out
/// taller than the target.
pub fn justified_rows<'a, T: Dimensions>(
    items: &'a [T],
    container_width: f64,
    target_row_height: f64,
) -> Result<Vec<Row<'a, T>>, LayoutError> {
    check_container_width(container_width)?;
    if !(target_row_height.is_finite() && target_row_height > 0.0) {
        return Err(LayoutError::InvalidRowHeight(target_row_height));
    }

    let mut rows = Vec::new();
    let mut current: Vec<&'a T> = Vec::new();
    let mut current_width = 0.0;

    for item in items.iter().filter(|i| i.has_area()) {
        let item_width = target_row_height * item.aspect_ratio();

        // never close an empty row, an oversized item gets a row to itself
        if !current.is_empty() && current_width + item_width > container_width {
            rows.push(close_row(
                std::mem::take(&mut current),
                current_width,
                container_width,
                target_row_height,
            ));
            current_width = 0.0;
        }

        current.push(item);
        current_width += item_width;
    }

    if !current.is_empty() {
        rows.push(close_row(
            current,
            current_width,
            container_width,
            target_row_height,
        ));
    }

    Ok(rows)
}

fn close_row<'a, T: Dimensions>(
    items: Vec<&'a T>,
    row_width: f64,
    container_width: f64,
    target_row_height: f64,
) -> Row<'a, T> {
    let height = target_row_height * (container_width / row_width);
    let tiles = items
        .into_iter()
        .map(|item| PlacedTile {
            item,
            scaled_width: height * item.aspect_ratio(),
            scaled_height: height,
            cropped: false,
        })
        .collect();

    Row { height, tiles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{approx, photo};

    #[test]
    fn empty_input_yields_no_rows() {
        let items: Vec<crate::testing::Photo> = Vec::new();
        assert!(justified_rows(&items, 1000.0, 300.0).unwrap().is_empty());
    }

    #[test]
    fn rows_fill_container_width() {
        // 3:2 items at 200px tall are 300px wide, three fit into 1000px
        let items: Vec<_> = (0..5).map(|i| photo(i, 600.0, 400.0)).collect();
        let rows = justified_rows(&items, 1000.0, 200.0).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 2);
        for row in &rows {
            assert!(approx(row.width(), 1000.0));
        }
        assert!(approx(rows[0].height, 200.0 * 1000.0 / 900.0));
        assert!(approx(rows[1].height, 200.0 * 1000.0 / 600.0));
    }

    #[test]
    fn tiles_keep_natural_aspect_ratio() {
        let items = vec![photo(1, 400.0, 600.0), photo(2, 1600.0, 900.0)];
        let rows = justified_rows(&items, 800.0, 300.0).unwrap();

        for tile in rows.iter().flat_map(|r| r.tiles.iter()) {
            assert!(approx(
                tile.scaled_width / tile.scaled_height,
                tile.item.w / tile.item.h
            ));
        }
    }

    #[test]
    fn oversized_item_gets_its_own_row() {
        let items = vec![
            photo(1, 4000.0, 500.0),
            photo(2, 300.0, 300.0),
            photo(3, 300.0, 300.0),
        ];
        let rows = justified_rows(&items, 1000.0, 300.0).unwrap();

        assert!(rows.iter().all(|r| !r.is_empty()));
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].tiles[0].item.id, 1);
        assert!(approx(rows[0].width(), 1000.0));
    }

    #[test]
    fn degenerate_items_are_skipped() {
        let items = vec![photo(1, 0.0, 300.0), photo(2, 300.0, 300.0)];
        let rows = justified_rows(&items, 1000.0, 300.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tiles[0].item.id, 2);
    }

    #[test]
    fn rejects_bad_dimensions() {
        let items = vec![photo(1, 300.0, 300.0)];
        assert_eq!(
            justified_rows(&items, 0.0, 300.0),
            Err(LayoutError::InvalidContainerWidth(0.0))
        );
        assert_eq!(
            justified_rows(&items, 1000.0, -5.0),
            Err(LayoutError::InvalidRowHeight(-5.0))
        );
    }
}
