//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`title`]: VM name, liveness badge and key legend
//! - [`registers`]: CPU register values
//! - [`stack`]: Guest call stack frames
//! - [`memory`]: Hex and ASCII view of the memory dump
//! - `utils`: Shared formatting helpers and the common pane frame
//!
//! Each pane module exports a stateless `render_*_pane()` function that draws
//! from snapshot data handed in by the caller. None of them touch the snapshot
//! store directly.

mod utils;

pub mod memory;
pub mod registers;
pub mod stack;
pub mod title;

pub use memory::render_memory_pane;
pub use registers::render_registers_pane;
pub use stack::render_stack_pane;
pub use title::render_title_pane;
