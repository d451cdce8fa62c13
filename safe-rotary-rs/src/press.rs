//! Short/long press classification.
//!
//! A press moves `Idle → Armed` on button-down and arms a long-press
//! deadline. From `Armed` exactly one of two paths claims it:
//!
//! - **release-first** — button-up before the deadline fires claims
//!   `Armed → Idle` and yields [`PressOutcome::Short`].
//! - **deadline-first** — the deadline fires and claims `Armed → Fired`,
//!   yielding [`PressOutcome::Long`]. The later button-up returns the
//!   classifier to `Idle` without an outcome.
//!
//! Both claims are a single compare-and-swap on one packed word (press
//! sequence number + phase), so for any interleaving only the first one
//! to execute succeeds.
//!
//! ```text
//!            down                 deadline (CAS)
//!   Idle ───────────▶ Armed ─────────────────────▶ Fired
//!    ▲                  │                            │
//!    │   up (CAS) Short │                            │ up, no outcome
//!    └──────────────────┴────────────────────────────┘
//! ```

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};

// ── Packed state word ────────────────────────────────────────────────────

const PHASE_BITS: u32 = 2;
const PHASE_MASK: u32 = (1 << PHASE_BITS) - 1;
const SEQUENCE_MASK: u32 = u32::MAX >> PHASE_BITS;

const IDLE: u32 = 0;
const ARMED: u32 = 1;
const FIRED: u32 = 2;

const fn pack(sequence: u32, phase: u32) -> u32 {
    ((sequence & SEQUENCE_MASK) << PHASE_BITS) | phase
}

const fn phase(word: u32) -> u32 {
    word & PHASE_MASK
}

const fn sequence(word: u32) -> u32 {
    word >> PHASE_BITS
}

// ── Public types ─────────────────────────────────────────────────────────

/// Identifies one physical press. Deadlines carry it so a stale timer
/// from an earlier press can never claim a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressId(u32);

/// A long-press deadline to be scheduled by the timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedDeadline {
    pub press: PressId,
    pub at: Instant,
}

/// Terminal classification of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressOutcome {
    Short,
    Long,
}

/// Externally invisible press state, exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Idle,
    /// Held, deadline outstanding.
    Armed,
    /// Held, long press already reported.
    Fired,
}

// ── PressClassifier ──────────────────────────────────────────────────────

pub struct PressClassifier {
    long_press: Duration,
    state: AtomicU32,
    deadline: Mutex<CriticalSectionRawMutex, Cell<Option<Instant>>>,
}

impl PressClassifier {
    pub const fn new(long_press: Duration) -> Self {
        Self {
            long_press,
            state: AtomicU32::new(pack(0, IDLE)),
            deadline: Mutex::new(Cell::new(None)),
        }
    }

    pub fn state(&self) -> ButtonState {
        match phase(self.state.load(Ordering::Acquire)) {
            ARMED => ButtonState::Armed,
            FIRED => ButtonState::Fired,
            _ => ButtonState::Idle,
        }
    }

    /// Button-down at `now`.
    ///
    /// Returns the deadline to schedule, or `None` if a press is already
    /// in progress (a repeated down edge belongs to the same press).
    pub fn press(&self, now: Instant) -> Option<ArmedDeadline> {
        let current = self.state.load(Ordering::Acquire);
        if phase(current) != IDLE {
            return None;
        }

        let seq = sequence(current).wrapping_add(1) & SEQUENCE_MASK;
        let at = now + self.long_press;

        // Publish the deadline before the press becomes visible as armed.
        self.deadline.lock(|d| d.set(Some(at)));

        self.state
            .compare_exchange(current, pack(seq, ARMED), Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ArmedDeadline {
                press: PressId(seq),
                at,
            })
    }

    /// Button-up at `now`.
    ///
    /// Claims an armed press and returns its outcome: `Short` normally,
    /// `Long` if `now` is already past the deadline but the timer has not
    /// run yet. Returns `None` when the deadline already claimed the
    /// press, or when no press was in progress.
    pub fn release(&self, now: Instant) -> Option<PressOutcome> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let seq = sequence(current);
            let outcome = match phase(current) {
                IDLE => return None,
                FIRED => None,
                _ => {
                    let overdue = self.deadline.lock(|d| d.get()).is_some_and(|at| now >= at);
                    Some(if overdue {
                        PressOutcome::Long
                    } else {
                        PressOutcome::Short
                    })
                }
            };

            match self.state.compare_exchange(
                current,
                pack(seq, IDLE),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return outcome,
                // Lost to the deadline (Armed → Fired); re-evaluate.
                Err(actual) => current = actual,
            }
        }
    }

    /// Deadline for `press` expired. Returns `true` if this claimed the
    /// press, in which case the caller reports a long press.
    pub fn fire(&self, press: PressId) -> bool {
        self.state
            .compare_exchange(
                pack(press.0, ARMED),
                pack(press.0, FIRED),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
