//! Single-writer admission with a bounded wait.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};

/// Admits one transaction at a time. Waiters give up after a timeout instead
/// of blocking indefinitely.
#[derive(Debug, Default)]
pub(crate) struct WriterGate {
    busy: Mutex<bool>,
    released: Condvar,
}

impl WriterGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for the gate, then hold it until the pass drops.
    pub(crate) fn acquire(&self, timeout: Duration) -> StoreResult<GatePass<'_>> {
        let started = Instant::now();
        let busy = self
            .busy
            .lock()
            .map_err(|_| StoreError::unavailable("writer gate poisoned"))?;
        let (mut busy, _) = self
            .released
            .wait_timeout_while(busy, timeout, |busy| *busy)
            .map_err(|_| StoreError::unavailable("writer gate poisoned"))?;

        if *busy {
            tracing::warn!(
                waited_ms = started.elapsed().as_millis() as u64,
                "store lock wait timed out"
            );
            return Err(StoreError::timeout(started.elapsed()));
        }

        *busy = true;
        Ok(GatePass { gate: self })
    }
}

/// Proof of admission; releases the gate on drop, including during unwinding.
#[derive(Debug)]
pub(crate) struct GatePass<'g> {
    gate: &'g WriterGate,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        match self.gate.busy.lock() {
            Ok(mut busy) => *busy = false,
            Err(poisoned) => *poisoned.into_inner() = false,
        }
        self.gate.released.notify_one();
    }
}
