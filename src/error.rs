//! Error type shared by the debug source, the core dump reader and the screen

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("debug tool not found: {0}")]
    ToolNotFound(PathBuf),

    #[error("`{command}` exited with {status}: {stderr}")]
    Tool {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("malformed core dump: {0}")]
    Elf(#[from] goblin::error::Error),

    #[error("unexpected debugger output: {0}")]
    Parse(String),
}
