//! The virtual machine as seen through the debugger
//!
//! - [`registers`]: named CPU register values
//! - [`stack`]: guest call stack frames and `segment:offset` pointers
//! - [`dump`]: shared, read-only guest memory image
//! - [`manage`]: the `VBoxManage`-backed [`DebugSource`]
//!
//! Everything the dashboard shows comes through the [`DebugSource`] trait, so
//! the snapshot store can be driven by a fake source in tests.

pub mod dump;
pub mod manage;
pub mod registers;
pub mod stack;

pub use dump::CoreDump;
pub use manage::VBoxManage;
pub use registers::Registers;
pub use stack::{FarPointer, StackEntry};

use crate::error::Result;

/// A virtual machine the hypervisor reports as running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmInfo {
    pub name: String,
    pub uuid: String,
}

/// Point-in-time access to a VM's debug state.
///
/// Every call may block for as long as the underlying tool takes. Failures are
/// transient from the caller's point of view; the snapshot store simply asks
/// again on its next round.
pub trait DebugSource: Send + Sync {
    fn registers(&self, vm: &str) -> Result<Registers>;

    fn stack(&self, vm: &str) -> Result<Vec<StackEntry>>;

    fn dump(&self, vm: &str) -> Result<CoreDump>;

    fn running_vms(&self) -> Result<Vec<VmInfo>>;

    /// Whether `vm` is among the running machines
    fn is_running(&self, vm: &str) -> Result<bool> {
        Ok(self.running_vms()?.iter().any(|info| info.name == vm))
    }
}
