//! The two seams every panel piece plugs into.
//!
//! Drawing and input are split: a transient view borrows its state and
//! draws, while the state itself answers key and mouse events between
//! frames. `MessageList` / `MessageListState` and `CodeViewer` /
//! `CodeViewerState` are the pairs; `InputBox` is both.

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::TuiEvent;

/// Draws into `area`. Takes `&mut self` so layout caches, scroll clamps
/// and hit-test rects can be refreshed while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns a raw `TuiEvent` into something the router acts on.
pub trait EventHandler {
    type Event;

    /// `None` means consumed (or ignored) with nothing to report.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
