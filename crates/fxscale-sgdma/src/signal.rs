//! Completion flags shared with engine interrupt context
//!
//! Each direction has one flag. Notifiers only store `true`; the session
//! thread busy-waits for both flags, transmit first, and clears them once
//! the transfer is torn down.

use crate::regs::CompletionCallback;
use crate::{Direction, SgdmaError, SgdmaResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Spins between clock reads while waiting with a timeout
const SPINS_PER_CLOCK_CHECK: u32 = 1024;

#[derive(Debug, Default)]
struct Flags {
    transmit: AtomicBool,
    receive: AtomicBool,
}

impl Flags {
    fn get(&self, direction: Direction) -> &AtomicBool {
        match direction {
            Direction::Transmit => &self.transmit,
            Direction::Receive => &self.receive,
        }
    }
}

/// Transmit/receive completion flag pair
#[derive(Debug, Clone, Default)]
pub struct CompletionSignal {
    flags: Arc<Flags>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that marks `direction` complete.
    pub fn notifier(&self, direction: Direction) -> CompletionCallback {
        let flags = Arc::clone(&self.flags);
        Box::new(move || flags.get(direction).store(true, Ordering::Release))
    }

    /// Mark `direction` complete.
    pub fn notify(&self, direction: Direction) {
        self.flags.get(direction).store(true, Ordering::Release);
    }

    /// Whether `direction` has completed.
    pub fn is_set(&self, direction: Direction) -> bool {
        self.flags.get(direction).load(Ordering::Acquire)
    }

    /// Reset both flags.
    pub fn clear(&self) {
        self.flags.transmit.store(false, Ordering::Release);
        self.flags.receive.store(false, Ordering::Release);
    }

    /// Spin until both directions have completed, transmit first.
    ///
    /// With `timeout == None` this never returns until both flags are set.
    ///
    /// # Errors
    ///
    /// Returns [`SgdmaError::Timeout`] naming the direction still pending
    /// once `timeout` has elapsed.
    pub fn wait_both(&self, timeout: Option<Duration>) -> SgdmaResult<()> {
        let started = Instant::now();
        let deadline = timeout.map(|t| (started + t, t));
        for direction in [Direction::Transmit, Direction::Receive] {
            self.spin_until_set(direction, deadline)?;
            log::debug!(
                "{} completion after {:?}",
                direction,
                started.elapsed()
            );
        }
        Ok(())
    }

    fn spin_until_set(
        &self,
        direction: Direction,
        deadline: Option<(Instant, Duration)>,
    ) -> SgdmaResult<()> {
        let flag = self.flags.get(direction);
        let mut spins = 0u32;
        while !flag.load(Ordering::Acquire) {
            std::hint::spin_loop();
            spins = spins.wrapping_add(1);
            if let Some((at, waited)) = deadline {
                if spins % SPINS_PER_CLOCK_CHECK == 0 && Instant::now() >= at {
                    return Err(SgdmaError::Timeout { direction, waited });
                }
            }
        }
        Ok(())
    }
}
