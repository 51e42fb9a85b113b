//! Background polling threads
//!
//! Every poller runs the same loop: check the stop flag under the lock, fetch
//! with the lock released, then store the result under the lock. A failed
//! fetch is stored as an absent or empty value and retried on the next round.
//! With a poll interval set, the pause between rounds waits on the state's
//! condvar so a stop request ends it early.

use super::{Inner, State};
use crate::vm::DebugSource;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(super) fn spawn_all(inner: &Arc<Inner>) -> Vec<JoinHandle<()>> {
    [
        spawn(inner, "registers", fetch_registers, |state, value| {
            state.registers = value
        }),
        spawn(inner, "stack", fetch_stack, |state, value| state.stack = value),
        spawn(inner, "memory", fetch_dump, |state, value| state.dump = value),
        spawn(
            inner,
            "liveness",
            |inner| fetch_live(inner.source.as_ref(), &inner.vm_name),
            |state, value| state.live = value,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn spawn<T: 'static>(
    inner: &Arc<Inner>,
    kind: &'static str,
    fetch: fn(&Inner) -> T,
    store: fn(&mut State, T),
) -> Option<JoinHandle<()>> {
    let inner = Arc::clone(inner);
    let spawned = thread::Builder::new()
        .name(format!("poll-{}", kind))
        .spawn(move || run(&inner, kind, fetch, store));

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!(poller = kind, error = %e, "failed to spawn poller");
            None
        }
    }
}

fn run<T>(inner: &Inner, kind: &'static str, fetch: fn(&Inner) -> T, store: fn(&mut State, T)) {
    tracing::debug!(vm = %inner.vm_name, poller = kind, "poller running");

    loop {
        if inner.state.lock().stop {
            break;
        }

        let value = fetch(inner);
        let mut state = inner.state.lock();
        store(&mut state, value);

        if !state.stop && !inner.config.poll_interval.is_zero() {
            inner
                .wakeup
                .wait_for(&mut state, inner.config.poll_interval);
        }
    }

    tracing::debug!(vm = %inner.vm_name, poller = kind, "poller exited");
}

fn fetch_registers(inner: &Inner) -> Option<crate::vm::Registers> {
    inner
        .source
        .registers(&inner.vm_name)
        .inspect_err(|e| tracing::debug!(vm = %inner.vm_name, error = %e, "register fetch failed"))
        .ok()
}

fn fetch_stack(inner: &Inner) -> Vec<crate::vm::StackEntry> {
    inner
        .source
        .stack(&inner.vm_name)
        .inspect_err(|e| tracing::debug!(vm = %inner.vm_name, error = %e, "stack fetch failed"))
        .unwrap_or_default()
}

fn fetch_dump(inner: &Inner) -> Option<Arc<crate::vm::CoreDump>> {
    inner
        .source
        .dump(&inner.vm_name)
        .inspect_err(|e| tracing::debug!(vm = %inner.vm_name, error = %e, "memory dump failed"))
        .ok()
        .map(Arc::new)
}

pub(super) fn fetch_live(source: &dyn DebugSource, vm_name: &str) -> bool {
    source
        .is_running(vm_name)
        .inspect_err(|e| tracing::debug!(vm = %vm_name, error = %e, "liveness check failed"))
        .unwrap_or(false)
}
