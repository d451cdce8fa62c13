//! Time-window debounce filter for edge notifications.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};

/// Accepts an edge only if at least `window` has passed since the last
/// accepted edge.
///
/// Rejected edges leave the filter untouched, so a burst of contact
/// bounce cannot keep pushing the window forward. Safe to call from
/// interrupt context: one short critical section, no allocation.
pub struct DebounceFilter {
    window: Duration,
    last_accepted: Mutex<CriticalSectionRawMutex, Cell<Option<Instant>>>,
}

impl DebounceFilter {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: Mutex::new(Cell::new(None)),
        }
    }

    /// Offer an edge observed at `now`. Returns `true` if it is accepted.
    ///
    /// The first edge ever offered is always accepted.
    pub fn accept(&self, now: Instant) -> bool {
        self.last_accepted.lock(|last| match last.get() {
            Some(prev) if now < prev + self.window => false,
            _ => {
                last.set(Some(now));
                true
            }
        })
    }

    /// Timestamp of the last accepted edge, if any.
    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted.lock(Cell::get)
    }
}
