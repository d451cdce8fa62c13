//! Single-slot, overwrite-on-publish event mailbox.
//!
//! The mailbox is deliberately lossy: it is not a queue. A publish
//! replaces whatever is in the slot, read or not, and wakes every waiting
//! reader. Readers re-check the slot under the lock after waking, so when
//! several readers race for one publish exactly one of them takes it and
//! the rest go back to waiting (or time out empty).

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use embassy_time::{with_timeout, Duration};

use crate::event::RotaryEvent;

/// Readers that can be parked at once before registration starts
/// waking (and re-queueing) everybody.
pub const MAX_WAITING_READERS: usize = 4;

struct Slot {
    event: Option<RotaryEvent>,
    waiters: MultiWakerRegistration<MAX_WAITING_READERS>,
}

pub struct EventMailbox {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Slot>>,
}

impl Default for EventMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl EventMailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                event: None,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Store `event`, replacing any unread one, and wake all readers.
    ///
    /// Non-blocking; callable from interrupt context.
    pub fn publish(&self, event: RotaryEvent) {
        self.publish_with(|| event);
    }

    /// Like [`publish`](Self::publish), but builds the event inside the
    /// critical section. The rotation path uses this so the accumulator
    /// step and the publish of its result cannot be reordered against a
    /// concurrent rotation publish.
    pub fn publish_with(&self, event: impl FnOnce() -> RotaryEvent) {
        self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            slot.event = Some(event());
            slot.waiters.wake();
        });
    }

    /// Whether an unread event is waiting.
    pub fn is_ready(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().event.is_some())
    }

    /// Take the pending event without waiting.
    pub fn try_take(&self) -> Option<RotaryEvent> {
        self.slot.lock(|slot| slot.borrow_mut().event.take())
    }

    /// Wait up to `timeout` for an event and take it.
    ///
    /// Returns `None` on timeout; that is the normal "no event" result,
    /// not an error.
    pub async fn consume(&self, timeout: Duration) -> Option<RotaryEvent> {
        with_timeout(timeout, poll_fn(|cx| self.poll_take(cx)))
            .await
            .ok()
    }

    fn poll_take(&self, cx: &mut Context<'_>) -> Poll<RotaryEvent> {
        self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.event.take() {
                Some(event) => Poll::Ready(event),
                None => {
                    slot.waiters.register(cx.waker());
                    Poll::Pending
                }
            }
        })
    }
}
