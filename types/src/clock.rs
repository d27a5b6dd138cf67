//! In-game clock helpers.
//!
//! Times of day are stored as `hour + minute / 100` (so 22:30 is `22.30`).
//! Minutes use a base-100 fractional part, not base-60: `23.59` is the last
//! minute before midnight and `23.60..23.99` never occur in valid data.
//! Every producer and consumer of time-rule values goes through this module so
//! the encoding stays identical across the engine, the preset files and the UI.

use serde::{Deserialize, Serialize};

/// Divisor applied to minutes when packing them into the fractional part.
pub const MINUTE_SCALE: f32 = 100.0;

/// Largest valid hour value.
pub const MAX_HOUR: u32 = 23;

/// Largest valid minute value.
pub const MAX_MINUTE: u32 = 59;

/// Current in-game time as reported by the host calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameClock {
    pub hour: u32,
    pub minute: u32,
}

impl GameClock {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// The clock in `HH.MM` float form.
    pub fn encoded(&self) -> f32 {
        encode_time(self.hour, self.minute)
    }
}

/// Pack an hour and minute into `HH.MM` float form.
///
/// # Examples
/// ```
/// use toggler_types::clock::{encode_time, format_time};
/// assert_eq!(format_time(encode_time(22, 30)), "22:30");
/// assert!(encode_time(23, 59) < encode_time(24, 0));
/// ```
pub fn encode_time(hour: u32, minute: u32) -> f32 {
    hour as f32 + minute as f32 / MINUTE_SCALE
}

/// Split an `HH.MM` float back into hour and minute.
///
/// Rounds the fractional part to the nearest minute so that float noise
/// (`22.299999`) still decodes as `22:30`.
///
/// # Examples
/// ```
/// use toggler_types::clock::decode_time;
/// assert_eq!(decode_time(22.30), (22, 30));
/// assert_eq!(decode_time(23.59), (23, 59));
/// assert_eq!(decode_time(0.0), (0, 0));
/// ```
pub fn decode_time(value: f32) -> (u32, u32) {
    if !value.is_finite() || value <= 0.0 {
        return (0, 0);
    }
    let hour = value.trunc();
    let minute = ((value - hour) * MINUTE_SCALE).round() as u32;
    if minute >= 100 {
        (hour as u32 + 1, 0)
    } else {
        (hour as u32, minute)
    }
}

/// Inclusive range check used by time rules.
///
/// Compares whole hundredths, so `1.18` read from a preset matches
/// `encode_time(1, 18)` even where the two floats differ in the last bit.
/// A window whose start lies after its stop (e.g. `22.30..02.15`) never
/// matches; windows do not wrap around midnight.
///
/// # Examples
/// ```
/// use toggler_types::clock::{encode_time, within_range};
/// let now = encode_time(23, 45);
/// assert!(within_range(encode_time(20, 0), encode_time(23, 59), now));
/// assert!(!within_range(encode_time(22, 30), encode_time(2, 15), now));
/// ```
pub fn within_range(start: f32, stop: f32, now: f32) -> bool {
    match (hundredths(start), hundredths(stop), hundredths(now)) {
        (Some(start), Some(stop), Some(now)) => now >= start && now <= stop,
        _ => false,
    }
}

/// `HH.MM` value scaled to an integer count of hundredths. `None` when not finite.
pub fn hundredths(value: f32) -> Option<i32> {
    value
        .is_finite()
        .then(|| (value * MINUTE_SCALE).round() as i32)
}

/// Whether a value is a representable time of day (`0.00..=23.59`).
pub fn is_valid_time(value: f32) -> bool {
    if !value.is_finite() || value < 0.0 || value >= 24.0 {
        return false;
    }
    let (hour, minute) = decode_time(value);
    hour <= MAX_HOUR && minute <= MAX_MINUTE
}

/// Clamp a user-entered hour or minute component to its maximum.
///
/// # Examples
/// ```
/// use toggler_types::clock::{clamp_component, MAX_HOUR, MAX_MINUTE};
/// assert_eq!(clamp_component(31, MAX_HOUR), 23);
/// assert_eq!(clamp_component(75, MAX_MINUTE), 59);
/// assert_eq!(clamp_component(7, MAX_MINUTE), 7);
/// ```
pub fn clamp_component(value: u32, max: u32) -> u32 {
    value.min(max)
}

/// Format an `HH.MM` float as `HH:MM`.
pub fn format_time(value: f32) -> String {
    let (hour, minute) = decode_time(value);
    format!("{:02}:{:02}", hour, minute)
}
