//! [`DebugSource`] backed by the `VBoxManage` command line tool

use super::stack::parse_stack;
use super::{CoreDump, DebugSource, Registers, StackEntry, VmInfo};
use crate::error::{Error, Result};
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

/// Talks to VirtualBox through `VBoxManage debugvm` and `VBoxManage list`
#[derive(Debug)]
pub struct VBoxManage {
    program: PathBuf,
    dump_dir: PathBuf,
    dump_counter: AtomicU64,
}

impl VBoxManage {
    /// Use the given `VBoxManage` executable, writing core dumps to the
    /// system temp directory
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_dump_dir(program, std::env::temp_dir())
    }

    pub fn with_dump_dir(program: impl Into<PathBuf>, dump_dir: impl Into<PathBuf>) -> Self {
        VBoxManage {
            program: program.into(),
            dump_dir: dump_dir.into(),
            dump_counter: AtomicU64::new(0),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        tracing::trace!(program = %self.program.display(), ?args, "running");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::ToolNotFound(self.program.clone()),
                _ => Error::Io(e),
            })?;

        if !output.status.success() {
            return Err(Error::Tool {
                command: format!("{} {}", self.program.display(), args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// A dump path nobody else is using. Every dump gets its own file so an
    /// older [`CoreDump`] still being rendered keeps reading its own data.
    fn next_dump_path(&self, vm: &str) -> PathBuf {
        let n = self.dump_counter.fetch_add(1, Ordering::Relaxed);
        let vm: String = vm
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dump_dir
            .join(format!("vbox-monitor-{}-{}-{}.core", std::process::id(), vm, n))
    }
}

impl DebugSource for VBoxManage {
    fn registers(&self, vm: &str) -> Result<Registers> {
        let output = self.run(&["debugvm", vm, "getregisters", "all"])?;
        Registers::parse(&output)
    }

    fn stack(&self, vm: &str) -> Result<Vec<StackEntry>> {
        let output = self.run(&["debugvm", vm, "stack"])?;
        Ok(parse_stack(&output))
    }

    fn dump(&self, vm: &str) -> Result<CoreDump> {
        let path = self.next_dump_path(vm);
        let filename = format!("--filename={}", path.display());

        if let Err(e) = self.run(&["debugvm", vm, "dumpvmcore", &filename]) {
            // A failed dump can leave a partial file behind
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }

        CoreDump::open_owned(&path).inspect_err(|_| {
            let _ = std::fs::remove_file(&path);
        })
    }

    fn running_vms(&self) -> Result<Vec<VmInfo>> {
        let output = self.run(&["list", "runningvms"])?;
        Ok(parse_running_vms(&output))
    }
}

/// Parse `list runningvms` output: one `"name" {uuid}` per line
pub fn parse_running_vms(output: &str) -> Vec<VmInfo> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix('"')?;
            let (name, rest) = rest.rsplit_once('"')?;
            let uuid = rest.trim().trim_start_matches('{').trim_end_matches('}');
            Some(VmInfo {
                name: name.to_string(),
                uuid: uuid.to_string(),
            })
        })
        .collect()
}
