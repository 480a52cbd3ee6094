use itertools::Itertools;
use ratatui::layout::Rect;

pub const TILE_WIDTH: u16 = 7;
pub const TILE_HEIGHT: u16 = 3;
const TILE_GAP: u16 = 2;
const ROW_GAP: u16 = 1;

/// How many tiles fit side by side in `width` columns (never less than one)
pub fn tiles_per_row(width: u16) -> usize {
    (width.saturating_add(TILE_GAP) / (TILE_WIDTH + TILE_GAP)).max(1) as usize
}

/// Rows of tiles stacked together, clamped to what a terminal can address
fn rows_height(rows: usize) -> u16 {
    u16::try_from(rows)
        .unwrap_or(u16::MAX)
        .saturating_mul(TILE_HEIGHT + ROW_GAP)
}

/// Height needed to show `count` tiles in `width` columns
pub fn board_height(count: usize, width: u16) -> u16 {
    rows_height(count.div_ceil(tiles_per_row(width))).saturating_sub(ROW_GAP)
}

/// Lay `count` tiles out in centered rows inside `area`.
///
/// Tiles that fall outside `area` come back clipped (possibly empty), so the
/// returned vector always has one entry per board position.
pub fn tile_rects(area: Rect, count: usize) -> Vec<Rect> {
    let per_row = tiles_per_row(area.width);

    (0..count)
        .map(|pos| {
            let row = pos / per_row;
            let top = area.y.saturating_add(rows_height(row));
            if top >= area.bottom() {
                return Rect::default();
            }

            let col = pos % per_row;
            let in_row = per_row.min(count - row * per_row) as u16;
            let row_width = in_row * TILE_WIDTH + (in_row - 1) * TILE_GAP;
            let left = area.x + area.width.saturating_sub(row_width) / 2;

            Rect::new(
                left.saturating_add(col as u16 * (TILE_WIDTH + TILE_GAP)),
                top,
                TILE_WIDTH,
                TILE_HEIGHT,
            )
            .intersection(area)
        })
        .collect()
}

/// Running sum of the picks, e.g. `3 + 2 = 5`
pub fn equation(numbers: &[u32], selected: &[usize]) -> String {
    if selected.is_empty() {
        return String::new();
    }

    let sum: u32 = selected.iter().map(|&i| numbers[i]).sum();
    format!("{} = {}", selected.iter().map(|&i| numbers[i]).join(" + "), sum)
}

/// Label shown on a tile's border for its quick-pick key
pub fn shortcut(position: usize) -> Option<char> {
    match position {
        0..=8 => char::from_digit(position as u32 + 1, 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_area_still_fits_one_tile() {
        assert_eq!(tiles_per_row(0), 1);
        assert_eq!(tiles_per_row(TILE_WIDTH), 1);
    }

    #[test]
    fn tiles_per_row_counts_gaps() {
        // 3 tiles + 2 gaps = 25 columns
        assert_eq!(tiles_per_row(25), 3);
        assert_eq!(tiles_per_row(24), 2);
    }

    #[test]
    fn board_height_wraps_rows() {
        assert_eq!(board_height(3, 25), TILE_HEIGHT);
        assert_eq!(board_height(4, 25), TILE_HEIGHT * 2 + 1);
        assert_eq!(board_height(0, 25), 0);
    }

    #[test]
    fn rows_are_centered() {
        let area = Rect::new(0, 0, 40, 10);
        let rects = tile_rects(area, 2);

        // two tiles + one gap = 16 wide, centered in 40
        assert_eq!(rects[0], Rect::new(12, 0, TILE_WIDTH, TILE_HEIGHT));
        assert_eq!(rects[1], Rect::new(21, 0, TILE_WIDTH, TILE_HEIGHT));
    }

    #[test]
    fn overflowing_tiles_are_clipped() {
        let area = Rect::new(0, 0, 9, 4);
        let rects = tile_rects(area, 3);

        assert_eq!(rects.len(), 3);
        assert!(!rects[0].is_empty());
        assert!(rects[2].is_empty());
    }

    #[test]
    fn huge_boards_saturate_instead_of_overflowing() {
        assert_eq!(board_height(300_000, 80), u16::MAX - ROW_GAP);
        assert_eq!(board_height(usize::MAX, 0), u16::MAX - ROW_GAP);
        assert_eq!(tiles_per_row(u16::MAX), (u16::MAX / 9) as usize);

        let area = Rect::new(0, 0, 80, 20);
        let rects = tile_rects(area, 300_000);
        assert_eq!(rects.len(), 300_000);
        assert!(!rects[0].is_empty());
        assert!(rects[299_999].is_empty());
        assert!(rects.iter().all(|r| r.is_empty() || area.contains(r.as_position())));
    }

    #[test]
    fn equation_lists_picks_in_order() {
        assert_eq!(equation(&[3, 5, 2, 7], &[0, 2]), "3 + 2 = 5");
        assert_eq!(equation(&[3, 5, 2, 7], &[3]), "7 = 7");
        assert_eq!(equation(&[3, 5, 2, 7], &[]), "");
    }

    #[test]
    fn shortcuts_cover_first_nine() {
        assert_eq!(shortcut(0), Some('1'));
        assert_eq!(shortcut(8), Some('9'));
        assert_eq!(shortcut(9), None);
    }
}
