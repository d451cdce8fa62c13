//! Boundary types for the safe's other peripherals.
//!
//! The clock, display and buzzer drivers live outside this crate. The
//! application loop that consumes rotary events talks to them only
//! through these traits, which mirror the requests each driver accepts.

// ── Real-time clock ──────────────────────────────────────────────────────

/// Calendar time as exchanged with the RTC.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeRecord {
    /// Years since 2000 (0–99).
    pub year: u8,
    /// 1–12.
    pub month: u8,
    /// 1–31.
    pub day: u8,
    pub weekday: u8,
    /// 0–23.
    pub hour: u8,
    /// 0–59.
    pub minute: u8,
    /// 0–59.
    pub second: u8,
}

/// Field edited on the time-setting screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeField {
    Hour,
    Minute,
    Second,
}

impl TimeField {
    fn modulus(self) -> i32 {
        match self {
            TimeField::Hour => 24,
            TimeField::Minute | TimeField::Second => 60,
        }
    }
}

impl TimeRecord {
    /// Move `field` by `delta` knob steps, wrapping within its range in
    /// both directions.
    pub fn adjust(&mut self, field: TimeField, delta: i32) {
        let value = match field {
            TimeField::Hour => &mut self.hour,
            TimeField::Minute => &mut self.minute,
            TimeField::Second => &mut self.second,
        };
        let wrapped = (i32::from(*value) + delta).rem_euclid(field.modulus());
        // rem_euclid keeps the result in 0..modulus, which fits u8.
        *value = wrapped as u8;
    }
}

#[allow(async_fn_in_trait)]
pub trait RealTimeClock {
    type Error;

    async fn get_time(&mut self) -> Result<TimeRecord, Self::Error>;

    async fn set_time(&mut self, time: &TimeRecord) -> Result<(), Self::Error>;
}

// ── Text display ─────────────────────────────────────────────────────────

/// Text cursor on a 128-column, 8-page display.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorPosition {
    pub column: u8,
    pub page: u8,
}

impl CursorPosition {
    pub const MAX_COLUMN: u8 = 127;
    pub const MAX_PAGE: u8 = 7;

    /// Build a position, clamping out-of-range coordinates onto the panel.
    pub fn clamped(column: i32, page: i32) -> Self {
        Self {
            column: column.clamp(0, i32::from(Self::MAX_COLUMN)) as u8,
            page: page.clamp(0, i32::from(Self::MAX_PAGE)) as u8,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait TextDisplay {
    type Error;

    async fn clear(&mut self) -> Result<(), Self::Error>;

    async fn set_cursor(&mut self, position: CursorPosition) -> Result<(), Self::Error>;

    async fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Position the cursor and write `text` there.
    async fn write_at(&mut self, position: CursorPosition, text: &str) -> Result<(), Self::Error> {
        self.set_cursor(position).await?;
        self.write_text(text).await
    }
}

// ── Buzzer ───────────────────────────────────────────────────────────────

#[allow(async_fn_in_trait)]
pub trait Buzzer {
    type Error;

    /// Sound a tone for `duration_ms`; `0` silences immediately.
    async fn sound(&mut self, duration_ms: u32) -> Result<(), Self::Error>;

    async fn silence(&mut self) -> Result<(), Self::Error> {
        self.sound(0).await
    }
}
