//! Rotary knob and push-button event subsystem for the electronic safe.
//!
//! Turns raw, bouncy GPIO edges from a rotary encoder with an integrated
//! push-switch into a clean stream of classified events, read one at a
//! time through a suspending, timed read.
//!
//! # Architecture
//!
//! ```text
//! S1 falling edge ─▶ DebounceFilter ─▶ Direction ─▶ RotationAccumulator ─┐
//!                                                                         ├─▶ EventMailbox ─▶ read
//! SW any edge ─────▶ PressClassifier ◀── long-press deadline task ────────┘
//! ```
//!
//! - **[`RotaryController`]** — the single owned object holding position,
//!   press state and the mailbox. Producer methods are non-blocking and
//!   interrupt-safe; the read side is `async`.
//! - **[`RotaryDevice`]** — startup (config validation, pin claims) and a
//!   line-oriented read: `"3\n"`, `"BTN_SHORT\n"`, `"BTN_LONG\n"`, or zero
//!   bytes on timeout.
//! - **[`tasks`]** — generic edge and deadline loops for Embassy firmware.
//! - **[`collaborators`]** — boundary traits for the RTC, display and
//!   buzzer used by the application loop.
//!
//! # Quick start
//!
//! ```ignore
//! use safe_rotary::{RotaryConfig, RotaryController, RotaryDevice, PinRegistry};
//!
//! let controller = RotaryController::new(RotaryConfig::default());
//! let registry = PinRegistry::new();
//! let device = RotaryDevice::open(&controller, &registry)?;
//!
//! let mut buf = [0u8; 32];
//! let n = device.read(&mut buf).await?; // 0 if nothing within 50 ms
//! ```
//!
//! # Features
//!
//! - **`defmt`** — structured logging via [`defmt`] and `defmt::Format`
//!   implementations on public types.

#![cfg_attr(not(test), no_std)]

pub mod collaborators;
pub mod tasks;

mod config;
mod controller;
mod debounce;
mod device;
mod error;
mod event;
mod mailbox;
mod press;
mod rotation;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use config::{PinAssignment, RotaryConfig, MAX_PINS};
pub use controller::RotaryController;
pub use debounce::DebounceFilter;
pub use device::{PinClaim, PinRegistry, RotaryDevice};
pub use error::{ConfigError, DeviceError, ParseError, StartupError};
pub use event::{PositionTracker, RotaryEvent, MAX_LINE_LEN};
pub use mailbox::{EventMailbox, MAX_WAITING_READERS};
pub use press::{ArmedDeadline, ButtonState, PressClassifier, PressId, PressOutcome};
pub use rotation::{Direction, RotationAccumulator};
pub use tasks::{button_edge_task, long_press_task, rotation_edge_task};
