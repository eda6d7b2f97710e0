//! # TUI Components
//!
//! UI components for the generator terminal.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Created fresh each frame from the data they draw:
//! - `TitleBar`: top status line
//! - `MessageView`: one transcript message
//! - `ResultRow`: the rich row of a validated component
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own local state and emit events:
//! - `InputBox`: prompt editor with history recall
//! - `MessageList`: scrollable transcript with layout caching and selection
//! - `CodeViewer`: code overlay with its own scroll
//! - `PanelResize`: drag handle on the panel's top border
//!
//! Components receive external data as props, never by reaching into the
//! `App`. The draw function in `ui.rs` is the only place that reads both.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs
//! ├── result_row.rs
//! ├── message_list.rs
//! ├── code_viewer.rs
//! ├── resize.rs
//! └── input_box/
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod code_viewer;
pub mod input_box;
pub mod message;
pub mod message_list;
pub mod resize;
pub mod result_row;

pub use code_viewer::{CodeViewer, CodeViewerEvent, CodeViewerState};
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use resize::PanelResize;
pub use result_row::{ResultRow, RowAction};
