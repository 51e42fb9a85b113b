//! # Introduction
//!
//! vbox-monitor is a live terminal dashboard for a single VirtualBox virtual
//! machine. It keeps polling the VM's CPU registers, call stack, memory image
//! and liveness through the `VBoxManage` debugger interface and shows the
//! latest of each in a multi-pane TUI built with
//! [ratatui](https://docs.rs/ratatui). It only ever reads from the VM.
//!
//! ## Data flow
//!
//! ```text
//! VBoxManage → DebugSource → Monitor (4 poller threads) → Dashboard → Screen
//! ```
//!
//! 1. [`vm`]: the [`vm::DebugSource`] boundary and the data it yields:
//!    [`vm::Registers`], [`vm::StackEntry`], [`vm::CoreDump`].
//! 2. [`snapshot`]: [`snapshot::Monitor`], the lock-guarded snapshot store
//!    refreshed by independent background pollers.
//! 3. [`ui`]: the screen driver, the dashboard controller and its panes.
//! 4. [`logging`]: file-based `tracing` setup; the terminal belongs to the UI.
//!
//! ## Keys
//!
//! `a`/`s` scroll memory one line up/down, `d`/`f` one page, `g` jumps back
//! to offset 0, `q` quits.

pub mod error;
pub mod logging;
pub mod snapshot;
pub mod ui;
pub mod vm;

pub use error::{Error, Result};
