//! Error types for the rotary event subsystem.

use core::fmt;

/// Rejected startup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The same GPIO number was assigned to two signals.
    DuplicatePin(u8),
    /// GPIO number outside the range the [`PinRegistry`](crate::PinRegistry) tracks.
    PinOutOfRange(u8),
    /// Long-press threshold of zero would classify every press as long.
    ZeroLongPress,
    /// Per-read timeout of zero would never observe an event.
    ZeroReadTimeout,
    /// A signal is wired to a different GPIO than the one claimed for it.
    WiringMismatch { claimed: u8, wired: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::DuplicatePin(pin) => write!(f, "GPIO {} assigned twice", pin),
            ConfigError::PinOutOfRange(pin) => write!(f, "GPIO {} out of range", pin),
            ConfigError::ZeroLongPress => write!(f, "long-press threshold must be non-zero"),
            ConfigError::ZeroReadTimeout => write!(f, "read timeout must be non-zero"),
            ConfigError::WiringMismatch { claimed, wired } => {
                write!(f, "GPIO {} claimed but GPIO {} wired", claimed, wired)
            }
        }
    }
}

/// Fatal errors while bringing the device up.
///
/// Any resource acquired before the failure has already been released
/// when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// Configuration failed validation.
    InvalidConfig(ConfigError),
    /// GPIO already claimed by another owner.
    PinUnavailable(u8),
}

impl From<ConfigError> for StartupError {
    fn from(error: ConfigError) -> Self {
        StartupError::InvalidConfig(error)
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartupError::InvalidConfig(e) => write!(f, "invalid configuration: {}", e),
            StartupError::PinUnavailable(pin) => write!(f, "GPIO {} already claimed", pin),
        }
    }
}

/// Errors returned by the device-style read surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// The device is read-only; writes and control requests are rejected.
    Unsupported,
    /// Caller buffer cannot hold the longest event line.
    BufferTooSmall { needed: usize },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceError::Unsupported => write!(f, "unsupported operation"),
            DeviceError::BufferTooSmall { needed } => {
                write!(f, "buffer too small (need {} bytes)", needed)
            }
        }
    }
}

/// Errors decoding an event line on the consumer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Zero-length line (a timed-out read).
    Empty,
    /// Neither a button keyword nor a decimal position.
    Malformed,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty event line"),
            ParseError::Malformed => write!(f, "malformed event line"),
        }
    }
}
