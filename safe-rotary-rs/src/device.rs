//! Device-style surface: pin ownership at startup and a read-only,
//! line-oriented read.
//!
//! [`RotaryDevice::open`] is the startup path. It validates the
//! configuration and claims the three encoder GPIOs in order. If any step
//! fails the pins already claimed are released again, newest first, before
//! the error is returned, so a failed startup leaves nothing held.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::MAX_PINS;
use crate::controller::RotaryController;
use crate::error::{DeviceError, StartupError};
use crate::event::MAX_LINE_LEN;

// ── PinRegistry ──────────────────────────────────────────────────────────

/// Tracks which GPIO numbers are owned.
pub struct PinRegistry {
    claimed: Mutex<CriticalSectionRawMutex, Cell<u64>>,
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PinRegistry {
    pub const fn new() -> Self {
        Self {
            claimed: Mutex::new(Cell::new(0)),
        }
    }

    /// Take ownership of `pin` until the returned guard is dropped.
    ///
    /// # Errors
    /// [`StartupError::PinUnavailable`] if the pin is already claimed or
    /// outside the tracked range.
    pub fn claim(&self, pin: u8) -> Result<PinClaim<'_>, StartupError> {
        if pin >= MAX_PINS {
            return Err(StartupError::PinUnavailable(pin));
        }

        let bit = 1u64 << pin;
        let acquired = self.claimed.lock(|claimed| {
            let current = claimed.get();
            if current & bit != 0 {
                return false;
            }
            claimed.set(current | bit);
            true
        });

        if !acquired {
            #[cfg(feature = "defmt")]
            defmt::error!("GPIO {} already claimed", pin);
            return Err(StartupError::PinUnavailable(pin));
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("GPIO {} claimed", pin);

        Ok(PinClaim {
            registry: self,
            pin,
        })
    }

    pub fn is_claimed(&self, pin: u8) -> bool {
        pin < MAX_PINS && self.claimed.lock(|claimed| claimed.get() & (1u64 << pin) != 0)
    }

    fn release(&self, pin: u8) {
        self.claimed
            .lock(|claimed| claimed.set(claimed.get() & !(1u64 << pin)));

        #[cfg(feature = "defmt")]
        defmt::debug!("GPIO {} released", pin);
    }
}

/// Ownership of one GPIO; released on drop.
pub struct PinClaim<'a> {
    registry: &'a PinRegistry,
    pin: u8,
}

impl PinClaim<'_> {
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl Drop for PinClaim<'_> {
    fn drop(&mut self) {
        self.registry.release(self.pin);
    }
}

// ── RotaryDevice ─────────────────────────────────────────────────────────

/// Read-only device handle over a [`RotaryController`].
///
/// Each successful [`read`](Self::read) yields one event line; a read that
/// times out yields zero bytes.
pub struct RotaryDevice<'a> {
    controller: &'a RotaryController,
    // Fields drop top to bottom: claims are released newest first.
    button: PinClaim<'a>,
    companion: PinClaim<'a>,
    rotation: PinClaim<'a>,
}

impl<'a> RotaryDevice<'a> {
    /// Validate the controller's configuration and claim its pins.
    ///
    /// # Errors
    /// * [`StartupError::InvalidConfig`] before any pin is touched
    /// * [`StartupError::PinUnavailable`] for the first pin that cannot be
    ///   claimed; earlier claims are released in reverse order
    pub fn open(
        controller: &'a RotaryController,
        registry: &'a PinRegistry,
    ) -> Result<Self, StartupError> {
        let config = controller.config();
        config.validate()?;

        let pins = config.pins;
        let rotation = registry.claim(pins.rotation)?;
        let companion = registry.claim(pins.companion)?;
        let button = registry.claim(pins.button)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "rotary device ready (S1={}, S2={}, SW={})",
            pins.rotation,
            pins.companion,
            pins.button
        );

        Ok(Self {
            controller,
            button,
            companion,
            rotation,
        })
    }

    pub fn controller(&self) -> &'a RotaryController {
        self.controller
    }

    /// Claimed pins in acquisition order.
    pub fn pins(&self) -> [u8; 3] {
        [self.rotation.pin(), self.companion.pin(), self.button.pin()]
    }

    /// Wait up to the configured read timeout for one event and write its
    /// line into `buf`. Returns `Ok(0)` if nothing arrived.
    ///
    /// # Errors
    /// [`DeviceError::BufferTooSmall`] if `buf` is shorter than
    /// [`MAX_LINE_LEN`]. Checked before waiting, so no event is lost.
    pub async fn read(&self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        if buf.len() < MAX_LINE_LEN {
            return Err(DeviceError::BufferTooSmall {
                needed: MAX_LINE_LEN,
            });
        }

        match self.controller.read_event().await {
            Some(event) => event.write_line(buf),
            None => Ok(0),
        }
    }

    /// The device accepts no input.
    pub fn write(&self, _data: &[u8]) -> Result<usize, DeviceError> {
        Err(DeviceError::Unsupported)
    }

    /// The device has no control requests.
    pub fn control(&self, _request: u32) -> Result<(), DeviceError> {
        Err(DeviceError::Unsupported)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotaryConfig;
    use crate::error::ConfigError;
    use embassy_futures::block_on;
    use embassy_time::Instant;

    #[test]
    fn claim_and_release() {
        let registry = PinRegistry::new();
        {
            let claim = registry.claim(7).unwrap();
            assert_eq!(claim.pin(), 7);
            assert!(registry.is_claimed(7));
            assert_eq!(
                registry.claim(7).err(),
                Some(StartupError::PinUnavailable(7))
            );
        }
        assert!(!registry.is_claimed(7));
        assert!(registry.claim(7).is_ok());
    }

    #[test]
    fn out_of_range_pin_cannot_be_claimed() {
        let registry = PinRegistry::new();
        assert_eq!(
            registry.claim(MAX_PINS).err(),
            Some(StartupError::PinUnavailable(MAX_PINS))
        );
        assert!(!registry.is_claimed(MAX_PINS));
    }

    #[test]
    fn open_claims_all_pins() {
        let controller = RotaryController::new(RotaryConfig::default());
        let registry = PinRegistry::new();
        let device = RotaryDevice::open(&controller, &registry).unwrap();

        assert_eq!(device.pins(), [20, 21, 16]);
        for pin in device.pins() {
            assert!(registry.is_claimed(pin));
        }

        drop(device);
        for pin in [20, 21, 16] {
            assert!(!registry.is_claimed(pin));
        }
    }

    #[test]
    fn failed_open_releases_earlier_claims() {
        let controller = RotaryController::new(RotaryConfig::default());
        let registry = PinRegistry::new();
        let held = registry.claim(16).unwrap();

        let result = RotaryDevice::open(&controller, &registry);
        assert_eq!(result.err(), Some(StartupError::PinUnavailable(16)));

        assert!(!registry.is_claimed(20));
        assert!(!registry.is_claimed(21));
        assert!(registry.is_claimed(held.pin()));
    }

    #[test]
    fn invalid_config_claims_nothing() {
        let config = RotaryConfig {
            long_press_ms: 0,
            ..RotaryConfig::default()
        };
        let controller = RotaryController::new(config);
        let registry = PinRegistry::new();

        assert_eq!(
            RotaryDevice::open(&controller, &registry).err(),
            Some(StartupError::InvalidConfig(ConfigError::ZeroLongPress))
        );
        assert!(!registry.is_claimed(20));
    }

    #[test]
    fn read_returns_event_line() {
        let controller = RotaryController::new(RotaryConfig::default());
        let registry = PinRegistry::new();
        let device = RotaryDevice::open(&controller, &registry).unwrap();

        controller.on_rotation_edge(Instant::from_millis(0), false);

        let mut buf = [0u8; 32];
        let n = block_on(device.read(&mut buf)).unwrap();
        assert_eq!(&buf[..n], b"-1\n");
    }

    #[test]
    fn read_times_out_with_zero_bytes() {
        let controller = RotaryController::new(RotaryConfig::default());
        let registry = PinRegistry::new();
        let device = RotaryDevice::open(&controller, &registry).unwrap();

        let mut buf = [0u8; 32];
        assert_eq!(block_on(device.read(&mut buf)), Ok(0));
    }

    #[test]
    fn short_buffer_rejected_without_consuming() {
        let controller = RotaryController::new(RotaryConfig::default());
        let registry = PinRegistry::new();
        let device = RotaryDevice::open(&controller, &registry).unwrap();

        controller.on_button_edge(Instant::from_millis(0), false);
        controller.on_button_edge(Instant::from_millis(100), true);

        let mut small = [0u8; 4];
        assert_eq!(
            block_on(device.read(&mut small)),
            Err(DeviceError::BufferTooSmall {
                needed: MAX_LINE_LEN
            })
        );

        let mut buf = [0u8; MAX_LINE_LEN];
        let n = block_on(device.read(&mut buf)).unwrap();
        assert_eq!(&buf[..n], b"BTN_SHORT\n");
    }

    #[test]
    fn write_and_control_are_unsupported() {
        let controller = RotaryController::new(RotaryConfig::default());
        let registry = PinRegistry::new();
        let device = RotaryDevice::open(&controller, &registry).unwrap();

        controller.on_rotation_edge(Instant::from_millis(0), true);

        assert_eq!(device.write(b"1\n"), Err(DeviceError::Unsupported));
        assert_eq!(device.control(0), Err(DeviceError::Unsupported));
        // No state change.
        assert_eq!(controller.position(), 1);
        assert_eq!(controller.try_event(), Some(crate::RotaryEvent::Rotation(1)));
    }
}
