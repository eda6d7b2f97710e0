//! Visual row layout for the input buffer.
//!
//! The buffer is hard-wrapped by display width, so every visual row is an
//! exact byte range into the buffer. Caret math (row, column, vertical
//! moves, screen position) works on those ranges directly.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Left + right border, plus one column kept free for the scrollbar.
pub(super) const HORIZONTAL_OVERHEAD: u16 = 3;
/// Top + bottom borders.
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Content rows shown before internal scrolling kicks in.
pub(super) const MAX_VISIBLE_ROWS: u16 = 5;

pub(super) fn inner_width(area_width: u16) -> usize {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD) as usize
}

/// Splits `buffer` into visual rows no wider than `width` columns.
///
/// Hard newlines end a row and are not part of any range. Always returns
/// at least one (possibly empty) row.
pub(super) fn visual_rows(buffer: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut start = 0;
    let mut col = 0;

    for (i, c) in buffer.char_indices() {
        if c == '\n' {
            rows.push(start..i);
            start = i + 1;
            col = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if col > 0 && col + w > width {
            rows.push(start..i);
            start = i;
            col = 0;
        }
        col += w;
    }
    rows.push(start..buffer.len());
    rows
}

/// Index of the row holding the caret at byte offset `pos`.
///
/// At a soft wrap the caret belongs to the start of the next row.
pub(super) fn row_of(rows: &[Range<usize>], pos: usize) -> usize {
    rows.iter().rposition(|r| r.start <= pos).unwrap_or(0)
}

/// Display column of `pos` within `row`.
pub(super) fn column_of(buffer: &str, row: &Range<usize>, pos: usize) -> usize {
    buffer[row.start..pos.min(row.end)]
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Byte offset in `row` closest to (not past) display `column`.
pub(super) fn offset_at_column(buffer: &str, row: &Range<usize>, column: usize) -> usize {
    let mut col = 0;
    for (i, c) in buffer[row.clone()].char_indices() {
        let w = c.width().unwrap_or(0);
        if col + w > column {
            return row.start + i;
        }
        col += w;
    }
    row.end
}

pub(super) fn prev_char_boundary(buffer: &str, pos: usize) -> usize {
    buffer[..pos]
        .chars()
        .next_back()
        .map_or(0, |c| pos - c.len_utf8())
}

pub(super) fn next_char_boundary(buffer: &str, pos: usize) -> usize {
    buffer[pos..]
        .chars()
        .next()
        .map_or(pos, |c| pos + c.len_utf8())
}
