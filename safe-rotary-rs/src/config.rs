//! Startup configuration for the rotary event subsystem.
//!
//! [`RotaryConfig::default()`] reproduces the wiring and timing of the
//! safe's front panel: encoder S1 on GPIO 20, S2 on GPIO 21, the knob's
//! push-switch on GPIO 16, a 50 ms rotation debounce, a 1 s long-press
//! threshold and a 50 ms per-read timeout.

use embassy_time::Duration;

use crate::error::ConfigError;

/// Number of GPIO lines the [`PinRegistry`](crate::PinRegistry) can track.
pub const MAX_PINS: u8 = 64;

// ── PinAssignment ────────────────────────────────────────────────────────

/// GPIO numbers for the three encoder signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAssignment {
    /// Primary encoder line (S1). A falling edge marks one detent.
    pub rotation: u8,
    /// Companion encoder line (S2), sampled on each rotation edge to
    /// resolve direction.
    pub companion: u8,
    /// Push-switch line (SW), active-low.
    pub button: u8,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            rotation: 20,
            companion: 21,
            button: 16,
        }
    }
}

impl PinAssignment {
    /// Pins in claim order.
    pub fn in_claim_order(&self) -> [u8; 3] {
        [self.rotation, self.companion, self.button]
    }

    /// Check that the GPIOs actually handed to the edge tasks are the ones
    /// this assignment claims.
    ///
    /// # Errors
    /// [`ConfigError::WiringMismatch`] naming the first signal whose wired
    /// GPIO differs.
    pub fn check_wiring(&self, wired: &PinAssignment) -> Result<(), ConfigError> {
        for (claimed, actual) in self.in_claim_order().into_iter().zip(wired.in_claim_order()) {
            if claimed != actual {
                return Err(ConfigError::WiringMismatch { claimed, wired: actual });
            }
        }
        Ok(())
    }
}

// ── RotaryConfig ─────────────────────────────────────────────────────────

/// Configuration for the rotary controller and its device surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryConfig {
    /// GPIO assignment. Default: S1 = 20, S2 = 21, SW = 16.
    pub pins: PinAssignment,
    /// Minimum spacing between accepted rotation edges. Default: 50.
    pub debounce_ms: u64,
    /// Hold time after which a press is classified as long. Default: 1000.
    pub long_press_ms: u64,
    /// How long a device read waits for an event. Default: 50.
    pub read_timeout_ms: u64,
    /// Minimum spacing between accepted button edges. Default: 0 (off).
    pub button_debounce_ms: u64,
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            pins: PinAssignment::default(),
            debounce_ms: 50,
            long_press_ms: 1000,
            read_timeout_ms: 50,
            button_debounce_ms: 0,
        }
    }
}

impl RotaryConfig {
    /// Check pin numbers and thresholds.
    ///
    /// # Errors
    /// * [`ConfigError::PinOutOfRange`] for a GPIO number `>= MAX_PINS`
    /// * [`ConfigError::DuplicatePin`] if two signals share a GPIO
    /// * [`ConfigError::ZeroLongPress`] / [`ConfigError::ZeroReadTimeout`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.pins.in_claim_order();

        for (i, &pin) in pins.iter().enumerate() {
            if pin >= MAX_PINS {
                return Err(ConfigError::PinOutOfRange(pin));
            }
            if pins[..i].contains(&pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
        }

        if self.long_press_ms == 0 {
            return Err(ConfigError::ZeroLongPress);
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroReadTimeout);
        }

        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn long_press_threshold(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn button_debounce_window(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_front_panel_wiring() {
        let config = RotaryConfig::default();
        assert_eq!(config.pins.rotation, 20);
        assert_eq!(config.pins.companion, 21);
        assert_eq!(config.pins.button, 16);
        assert_eq!(config.debounce_window(), Duration::from_millis(50));
        assert_eq!(config.long_press_threshold(), Duration::from_millis(1000));
        assert_eq!(config.read_timeout(), Duration::from_millis(50));
        assert_eq!(config.button_debounce_window(), Duration::from_millis(0));
    }

    #[test]
    fn default_validates() {
        assert_eq!(RotaryConfig::default().validate(), Ok(()));
    }

    #[test]
    fn duplicate_pin_rejected() {
        let mut config = RotaryConfig::default();
        config.pins.button = config.pins.companion;
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(21)));
    }

    #[test]
    fn out_of_range_pin_rejected() {
        let mut config = RotaryConfig::default();
        config.pins.rotation = MAX_PINS;
        assert_eq!(config.validate(), Err(ConfigError::PinOutOfRange(MAX_PINS)));
    }

    #[test]
    fn zero_thresholds_rejected() {
        let mut config = RotaryConfig::default();
        config.long_press_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLongPress));

        let mut config = RotaryConfig::default();
        config.read_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroReadTimeout));
    }

    #[test]
    fn wiring_must_match_claimed_pins() {
        let pins = PinAssignment::default();
        assert_eq!(pins.check_wiring(&PinAssignment::default()), Ok(()));

        let wired = PinAssignment {
            companion: 22,
            ..PinAssignment::default()
        };
        assert_eq!(
            pins.check_wiring(&wired),
            Err(ConfigError::WiringMismatch { claimed: 21, wired: 22 })
        );
    }

    #[test]
    fn zero_debounce_is_allowed() {
        let mut config = RotaryConfig::default();
        config.debounce_ms = 0;
        assert!(config.validate().is_ok());
    }
}
