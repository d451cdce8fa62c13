//! The rotary controller: one owned object holding the whole event
//! subsystem.
//!
//! Edge handlers and the long-press timer call into a shared
//! `&RotaryController`; none of its producer-side methods block or
//! allocate, so they are equally valid from an async task or directly
//! from an interrupt handler. Only the read side suspends.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};

use crate::config::RotaryConfig;
use crate::debounce::DebounceFilter;
use crate::event::RotaryEvent;
use crate::mailbox::EventMailbox;
use crate::press::{ArmedDeadline, ButtonState, PressClassifier, PressId, PressOutcome};
use crate::rotation::{Direction, RotationAccumulator};

pub struct RotaryController {
    config: RotaryConfig,
    rotation_filter: DebounceFilter,
    button_filter: DebounceFilter,
    position: RotationAccumulator,
    press: PressClassifier,
    /// Latest armed deadline, handed to the long-press timer task.
    deadlines: Signal<CriticalSectionRawMutex, ArmedDeadline>,
    mailbox: EventMailbox,
}

impl RotaryController {
    /// Build a controller at position 0 with no press in progress.
    ///
    /// The configuration is not validated here; [`RotaryDevice::open`]
    /// does that before claiming any pins.
    ///
    /// [`RotaryDevice::open`]: crate::RotaryDevice::open
    pub fn new(config: RotaryConfig) -> Self {
        Self {
            rotation_filter: DebounceFilter::new(config.debounce_window()),
            button_filter: DebounceFilter::new(config.button_debounce_window()),
            position: RotationAccumulator::new(),
            press: PressClassifier::new(config.long_press_threshold()),
            deadlines: Signal::new(),
            mailbox: EventMailbox::new(),
            config,
        }
    }

    pub fn config(&self) -> &RotaryConfig {
        &self.config
    }

    /// Current absolute position.
    pub fn position(&self) -> i32 {
        self.position.position()
    }

    pub fn button_state(&self) -> ButtonState {
        self.press.state()
    }

    // -----------------------------------------------------------------------
    // Producer side (non-blocking)
    // -----------------------------------------------------------------------

    /// Falling edge on the rotation line at `now`, with the companion line
    /// sampled at the same moment.
    ///
    /// Returns `false` if the edge fell inside the debounce window, in
    /// which case nothing at all changed.
    pub fn on_rotation_edge(&self, now: Instant, companion_high: bool) -> bool {
        if !self.rotation_filter.accept(now) {
            #[cfg(feature = "defmt")]
            defmt::trace!("rotation edge at {}ms ignored (bounce)", now.as_millis());
            return false;
        }

        let direction = Direction::from_companion(companion_high);
        self.mailbox
            .publish_with(|| RotaryEvent::Rotation(self.position.step(direction)));

        #[cfg(feature = "defmt")]
        defmt::debug!("rotation {}: position={}", direction, self.position());

        true
    }

    /// Edge on the button line at `now`, carrying the line level sampled
    /// in the same notification. The switch is active-low: a low level is
    /// a press, a high level a release.
    ///
    /// Returns `false` if the button debounce window rejected the edge.
    pub fn on_button_edge(&self, now: Instant, level_high: bool) -> bool {
        if !self.button_filter.accept(now) {
            #[cfg(feature = "defmt")]
            defmt::trace!("button edge at {}ms ignored (bounce)", now.as_millis());
            return false;
        }

        if level_high {
            if let Some(outcome) = self.press.release(now) {
                self.publish_press(outcome);
            }
        } else if let Some(armed) = self.press.press(now) {
            #[cfg(feature = "defmt")]
            defmt::debug!("button down, long press at {}ms", armed.at.as_millis());
            self.deadlines.signal(armed);
        }

        true
    }

    /// Long-press deadline for `press` expired. Returns `true` if the
    /// deadline won the claim and a long press was published.
    pub fn on_deadline(&self, press: PressId) -> bool {
        if self.press.fire(press) {
            self.publish_press(PressOutcome::Long);
            true
        } else {
            false
        }
    }

    fn publish_press(&self, outcome: PressOutcome) {
        #[cfg(feature = "defmt")]
        defmt::debug!("button press classified {}", outcome);

        self.mailbox.publish(match outcome {
            PressOutcome::Short => RotaryEvent::ButtonShort,
            PressOutcome::Long => RotaryEvent::ButtonLong,
        });
    }

    /// Wait for the next armed long-press deadline.
    ///
    /// Intended for a single timer task; a newer deadline replaces one
    /// that has not been picked up yet.
    pub async fn next_deadline(&self) -> ArmedDeadline {
        self.deadlines.wait().await
    }

    // -----------------------------------------------------------------------
    // Consumer side
    // -----------------------------------------------------------------------

    /// Suspend until an event is published or `timeout` elapses.
    ///
    /// Returns `None` on timeout.
    pub async fn wait_for_event(&self, timeout: Duration) -> Option<RotaryEvent> {
        self.mailbox.consume(timeout).await
    }

    /// [`wait_for_event`](Self::wait_for_event) with the configured
    /// per-read timeout.
    pub async fn read_event(&self) -> Option<RotaryEvent> {
        self.wait_for_event(self.config.read_timeout()).await
    }

    /// Take a pending event without waiting.
    pub fn try_event(&self) -> Option<RotaryEvent> {
        self.mailbox.try_take()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
