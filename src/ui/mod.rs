//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into these layers:
//!
//! - **[`screen`]**: terminal ownership and the render/input loop, with
//!   injectable redraw and key callbacks
//! - **[`app`]**: the dashboard controller: panel drawing on each tick and key
//!   handling for quitting and memory navigation
//! - **[`layout`]** / **[`viewport`]**: pane placement and the memory window
//! - **[`panes`]**: stateless render functions for each pane
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`Ui`]: construct it with a
//! [`Monitor`](crate::snapshot::Monitor) and a [`Screen`], then call
//! [`Ui::run`](app::Ui::run).

pub mod app;
pub mod layout;
pub mod panes;
pub mod screen;
pub mod theme;
pub mod viewport;

pub use app::{Dashboard, KeyAction, Ui};
pub use screen::{CrosstermEvents, EventSource, Screen, ScreenHandle};
pub use viewport::Viewport;
