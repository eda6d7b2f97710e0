//! # Core Application Logic
//!
//! The terminal's business logic. It knows nothing about any specific UI
//! technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No UI. Storage behind  │
//!                    │  a trait.               │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │   assist   │
//!            │  Adapter   │            │ (Langflow) │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all terminal state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`command`]: One-line command grammar
//! - [`message`]: Transcript messages and the message list
//! - [`history`]: Submitted-line history over session storage
//! - [`config`]: Layered settings

pub mod action;
pub mod command;
pub mod config;
pub mod history;
pub mod message;
pub mod state;
