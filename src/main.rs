// vbox-monitor: live registers, stack and memory of a VirtualBox VM

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use vbox_monitor::logging;
use vbox_monitor::snapshot::{Monitor, MonitorConfig};
use vbox_monitor::ui::{Screen, Ui};
use vbox_monitor::vm::VBoxManage;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the virtual machine to monitor
    vm: String,

    /// Path to the VBoxManage executable
    #[arg(long, env = "VBOX_MONITOR_VBOXMANAGE", default_value = "VBoxManage")]
    vboxmanage: PathBuf,

    /// Redraw interval in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Pause between two debugger queries of the same kind (0 = none)
    #[arg(long, default_value = "0")]
    poll_interval_ms: u64,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_dir = args.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    let log_guard = logging::init(&log_dir)?;

    info!(
        vm = %args.vm,
        vboxmanage = %args.vboxmanage.display(),
        log_dir = ?log_guard.as_ref().map(|guard| guard.log_dir()),
        "starting"
    );

    let source = Arc::new(VBoxManage::new(&args.vboxmanage));
    let config = MonitorConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
    };
    let monitor = Monitor::with_config(args.vm.clone(), source, config);

    if !monitor.live() {
        eprintln!("Warning: '{}' is not among the running VMs", args.vm);
    }

    let screen = Screen::stdout(Duration::from_millis(args.tick_ms.max(1)))?;
    let mut ui = Ui::new(monitor, screen);
    let res = ui.run();

    info!("exiting");
    res?;

    Ok(())
}
