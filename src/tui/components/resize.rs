//! Drag-to-resize for the terminal panel.
//!
//! The panel's top border is the handle. A drag records where it started,
//! and every move recomputes the height from that anchor, so the panel
//! follows the pointer without accumulating rounding drift.

/// Smallest panel height: borders, one message row, status and input.
pub const MIN_PANEL_HEIGHT: u16 = 8;
/// Rows always left for the title bar and a sliver of host area.
const RESERVED_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    start_row: u16,
    start_height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelResize {
    height: u16,
    /// Only present between mouse-down on the handle and mouse-up.
    drag: Option<Drag>,
}

impl PanelResize {
    pub fn new(height: u16) -> Self {
        Self {
            height: height.max(MIN_PANEL_HEIGHT),
            drag: None,
        }
    }

    pub fn max_height(frame_height: u16) -> u16 {
        frame_height.saturating_sub(RESERVED_ROWS).max(MIN_PANEL_HEIGHT)
    }

    /// Requested height clamped to what the frame can hold.
    pub fn height(&self, frame_height: u16) -> u16 {
        self.height
            .clamp(MIN_PANEL_HEIGHT, Self::max_height(frame_height))
            .min(frame_height)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Starts a drag if `row` is the handle row. Returns whether it did.
    pub fn begin(&mut self, row: u16, handle_row: u16, frame_height: u16) -> bool {
        if row != handle_row {
            return false;
        }
        self.drag = Some(Drag {
            start_row: row,
            start_height: self.height(frame_height),
        });
        log::debug!("Panel resize started at row {}", row);
        true
    }

    /// Applies a drag to `row`. Dragging up grows the panel.
    pub fn drag_to(&mut self, row: u16, frame_height: u16) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let delta = drag.start_row as i32 - row as i32;
        let wanted = drag.start_height as i32 + delta;
        let max = Self::max_height(frame_height) as i32;
        self.height = wanted.clamp(MIN_PANEL_HEIGHT as i32, max) as u16;
        true
    }

    pub fn end(&mut self) -> bool {
        let was_dragging = self.drag.take().is_some();
        if was_dragging {
            log::debug!("Panel resized to {} rows", self.height);
        }
        was_dragging
    }
}
