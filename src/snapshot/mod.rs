//! Snapshot store for one virtual machine
//!
//! A [`Monitor`] keeps the latest register set, call stack, memory dump and
//! liveness flag of a VM. Each of the four is refreshed by its own background
//! poller thread, so they are never guaranteed to describe the same instant.
//!
//! # Locking
//!
//! All snapshot fields live in one state block guarded by a single mutex.
//! Pollers hold it only to check the stop flag and to store a freshly fetched
//! value; the fetch itself always happens unlocked. Readers copy a field out
//! under the lock and release it before returning.
//!
//! The state block sits behind one more indirection (`Mutex<Arc<Inner>>`).
//! Swapping two monitors exchanges those pointers, which is what makes
//! [`Monitor::assign`] a plain "copy, then swap" rather than a dance over two
//! state locks.

mod poller;

use crate::vm::{CoreDump, DebugSource, Registers, StackEntry};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Tuning for the background pollers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Pause between two fetches of the same kind. Zero polls back to back.
    /// A pause in progress is cut short by [`Monitor::stop`].
    pub poll_interval: Duration,
}

/// Live, thread-safe view of a VM's debug state
pub struct Monitor {
    inner: Mutex<Arc<Inner>>,
}

pub(crate) struct Inner {
    vm_name: String,
    source: Arc<dyn DebugSource>,
    config: MonitorConfig,
    state: Mutex<State>,
    wakeup: Condvar,
}

#[derive(Default)]
pub(crate) struct State {
    registers: Option<Registers>,
    stack: Vec<StackEntry>,
    dump: Option<Arc<CoreDump>>,
    live: bool,
    running: bool,
    stop: bool,
    /// Set once the owning `Monitor` is gone; a retired state never restarts
    retired: bool,
    pollers: Vec<JoinHandle<()>>,
}

impl Monitor {
    /// Create a stopped monitor for `vm_name`.
    ///
    /// Liveness is checked once, synchronously, before this returns.
    pub fn new(vm_name: impl Into<String>, source: Arc<dyn DebugSource>) -> Self {
        Self::with_config(vm_name, source, MonitorConfig::default())
    }

    pub fn with_config(
        vm_name: impl Into<String>,
        source: Arc<dyn DebugSource>,
        config: MonitorConfig,
    ) -> Self {
        let vm_name = vm_name.into();
        let live = poller::fetch_live(source.as_ref(), &vm_name);

        tracing::info!(vm = %vm_name, live, "monitor created");

        Monitor::from_inner(Inner {
            vm_name,
            source,
            config,
            state: Mutex::new(State {
                live,
                ..State::default()
            }),
            wakeup: Condvar::new(),
        })
    }

    fn from_inner(inner: Inner) -> Self {
        Monitor {
            inner: Mutex::new(Arc::new(inner)),
        }
    }

    fn current(&self) -> Arc<Inner> {
        self.inner.lock().clone()
    }

    pub fn vm_name(&self) -> String {
        self.current().vm_name.clone()
    }

    /// Launch the four pollers. Does nothing if they are already running.
    pub fn start(&self) {
        self.current().start();
    }

    /// Stop the pollers and wait for each to finish its in-flight fetch.
    /// Does nothing if the monitor is not running.
    pub fn stop(&self) {
        self.current().stop();
    }

    pub fn is_running(&self) -> bool {
        self.current().state.lock().running
    }

    pub fn live(&self) -> bool {
        self.current().state.lock().live
    }

    pub fn registers(&self) -> Option<Registers> {
        self.current().state.lock().registers.clone()
    }

    pub fn stack(&self) -> Vec<StackEntry> {
        self.current().state.lock().stack.clone()
    }

    pub fn dump(&self) -> Option<Arc<CoreDump>> {
        self.current().state.lock().dump.clone()
    }

    /// Exchange the complete state of two monitors, pollers included.
    ///
    /// Both indirections are locked in address order, so two threads swapping
    /// the same pair in opposite directions cannot deadlock.
    pub fn swap(&self, other: &Monitor) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (first, second) = if (self as *const Monitor) < (other as *const Monitor) {
            (self, other)
        } else {
            (other, self)
        };

        let mut first = first.inner.lock();
        let mut second = second.inner.lock();
        std::mem::swap(&mut *first, &mut *second);
    }

    /// Replace this monitor's state with a stopped copy of `source`.
    ///
    /// The copy is fully built before anything about `self` changes. Pollers
    /// that were running on the displaced state are stopped and joined.
    pub fn assign(&self, source: &Monitor) {
        let fresh = source.clone();
        self.swap(&fresh);
        fresh.stop();
    }
}

impl Clone for Monitor {
    /// A stopped monitor holding the same register, stack and dump snapshots.
    /// Liveness starts out false until the copy is started.
    fn clone(&self) -> Self {
        Monitor::from_inner(self.current().detached_copy())
    }
}

impl Drop for Monitor {
    /// Dropping does not join. Running pollers are told to stop and exit on
    /// their own after the fetch they are blocked in.
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        let mut state = inner.state.lock();
        state.retired = true;
        if state.running {
            state.stop = true;
            inner.wakeup.notify_all();
            tracing::debug!(vm = %inner.vm_name, "monitor dropped while running");
        }
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.current();
        let state = inner.state.lock();
        f.debug_struct("Monitor")
            .field("vm_name", &inner.vm_name)
            .field("running", &state.running)
            .field("live", &state.live)
            .field("registers", &state.registers.as_ref().map(Registers::len))
            .field("stack", &state.stack.len())
            .field("dump", &state.dump.as_ref().map(|d| d.memory_size()))
            .finish()
    }
}

impl Inner {
    fn start(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.running || state.retired {
            return;
        }

        state.stop = false;
        state.running = true;
        state.pollers = poller::spawn_all(self);

        if state.pollers.is_empty() {
            state.running = false;
            tracing::error!(vm = %self.vm_name, "no poller could be started");
        } else {
            tracing::info!(vm = %self.vm_name, pollers = state.pollers.len(), "monitor started");
        }
    }

    fn stop(&self) {
        // Take the handles and raise the flag in one critical section. A
        // second concurrent stop finds no handles and leaves the join to us.
        let pollers = {
            let mut state = self.state.lock();
            state.stop = true;
            std::mem::take(&mut state.pollers)
        };
        self.wakeup.notify_all();

        if pollers.is_empty() {
            return;
        }

        for poller in pollers {
            let name = poller.thread().name().unwrap_or("poller").to_string();
            if poller.join().is_err() {
                tracing::error!(vm = %self.vm_name, poller = %name, "poller panicked");
            }
        }

        self.state.lock().running = false;
        tracing::info!(vm = %self.vm_name, "monitor stopped");
    }

    fn detached_copy(&self) -> Inner {
        let state = self.state.lock();
        Inner {
            vm_name: self.vm_name.clone(),
            source: Arc::clone(&self.source),
            config: self.config,
            state: Mutex::new(State {
                registers: state.registers.clone(),
                stack: state.stack.clone(),
                dump: state.dump.clone(),
                ..State::default()
            }),
            wakeup: Condvar::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::vm::VmInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl DebugSource for CountingSource {
        fn registers(&self, _vm: &str) -> Result<Registers> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok([("eax".to_string(), 1)].into_iter().collect())
        }

        fn stack(&self, _vm: &str) -> Result<Vec<StackEntry>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![StackEntry::default()])
        }

        fn dump(&self, _vm: &str) -> Result<CoreDump> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(CoreDump::from_bytes(vec![0; 64]))
        }

        fn running_vms(&self) -> Result<Vec<VmInfo>> {
            Ok(vec![VmInfo {
                name: "test".to_string(),
                uuid: "0".to_string(),
            }])
        }
    }

    struct BrokenSource;

    impl DebugSource for BrokenSource {
        fn registers(&self, _vm: &str) -> Result<Registers> {
            Err(Error::Parse("no".into()))
        }

        fn stack(&self, _vm: &str) -> Result<Vec<StackEntry>> {
            Err(Error::Parse("no".into()))
        }

        fn dump(&self, _vm: &str) -> Result<CoreDump> {
            Err(Error::Parse("no".into()))
        }

        fn running_vms(&self) -> Result<Vec<VmInfo>> {
            Err(Error::Parse("no".into()))
        }
    }

    fn counting() -> Arc<CountingSource> {
        Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        })
    }

    fn wait_for(monitor: &Monitor, pred: impl Fn(&Monitor) -> bool) {
        for _ in 0..2000 {
            if pred(monitor) {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("condition never became true");
    }

    #[test]
    fn test_liveness_checked_at_construction() {
        assert!(Monitor::new("test", counting()).live());
        assert!(!Monitor::new("other", counting()).live());
        assert!(!Monitor::new("test", Arc::new(BrokenSource)).live());
    }

    #[test]
    fn test_start_stop_are_idempotent() {
        let monitor = Monitor::new("test", counting());
        assert!(!monitor.is_running());

        monitor.stop();
        assert!(!monitor.is_running());

        monitor.start();
        monitor.start();
        assert!(monitor.is_running());

        monitor.stop();
        assert!(!monitor.is_running());
        monitor.stop();
        assert!(!monitor.is_running());

        monitor.start();
        assert!(monitor.is_running());
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_no_fetches_after_stop() {
        let source = counting();
        let monitor = Monitor::new("test", source.clone());

        monitor.start();
        wait_for(&monitor, |m| {
            m.registers().is_some() && !m.stack().is_empty() && m.dump().is_some()
        });
        monitor.stop();

        let after_stop = source.fetches.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(source.fetches.load(Ordering::SeqCst), after_stop);

        assert_eq!(monitor.registers().unwrap().get("eax"), Some(1));
        assert_eq!(monitor.stack().len(), 1);
        assert_eq!(monitor.dump().unwrap().memory_size(), 64);
    }

    #[test]
    fn test_failing_source_yields_empty_snapshots() {
        let monitor = Monitor::with_config(
            "test",
            Arc::new(BrokenSource),
            MonitorConfig {
                poll_interval: Duration::from_millis(1),
            },
        );

        monitor.start();
        std::thread::sleep(Duration::from_millis(10));
        monitor.stop();

        assert!(monitor.registers().is_none());
        assert!(monitor.stack().is_empty());
        assert!(monitor.dump().is_none());
        assert!(!monitor.live());
    }

    #[test]
    fn test_clone_is_stopped_copy() {
        let monitor = Monitor::new("test", counting());
        monitor.start();
        wait_for(&monitor, |m| {
            m.registers().is_some() && !m.stack().is_empty() && m.dump().is_some()
        });
        monitor.stop();

        let copy = monitor.clone();
        assert!(!copy.is_running());
        assert!(!copy.live());
        assert_eq!(copy.vm_name(), "test");
        assert_eq!(copy.registers(), monitor.registers());
        assert_eq!(copy.stack(), monitor.stack());
        assert!(Arc::ptr_eq(&copy.dump().unwrap(), &monitor.dump().unwrap()));
    }

    #[test]
    fn test_clone_of_running_monitor_is_stopped() {
        let monitor = Monitor::new("test", counting());
        monitor.start();

        let copy = monitor.clone();
        assert!(!copy.is_running());
        assert!(monitor.is_running());

        monitor.stop();
    }

    #[test]
    fn test_swap_exchanges_state() {
        let a = Monitor::new("a", counting());
        let b = Monitor::new("b", counting());
        a.start();

        a.swap(&b);
        assert_eq!(a.vm_name(), "b");
        assert_eq!(b.vm_name(), "a");
        assert!(!a.is_running());
        assert!(b.is_running());

        b.stop();
        a.swap(&a);
        assert_eq!(a.vm_name(), "b");
    }

    #[test]
    fn test_assign_stops_displaced_pollers() {
        let source = counting();
        let a = Monitor::new("a", source.clone());
        let b = Monitor::new("b", counting());
        a.start();

        a.assign(&b);
        assert_eq!(a.vm_name(), "b");
        assert!(!a.is_running());

        let after = source.fetches.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(source.fetches.load(Ordering::SeqCst), after);
    }

    #[test]
    fn test_stop_cuts_poll_interval_short() {
        let monitor = Monitor::with_config(
            "test",
            counting(),
            MonitorConfig {
                poll_interval: Duration::from_secs(30),
            },
        );
        monitor.start();
        wait_for(&monitor, |m| {
            m.registers().is_some() && !m.stack().is_empty() && m.dump().is_some()
        });

        let begin = std::time::Instant::now();
        monitor.stop();
        assert!(begin.elapsed() < Duration::from_secs(5));
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_state_of_dropped_monitor_never_restarts() {
        let source = counting();
        let monitor = Monitor::new("test", source.clone());
        let inner = monitor.current();
        drop(monitor);

        inner.start();
        assert!(!inner.state.lock().running);
        assert!(inner.state.lock().pollers.is_empty());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }
}
