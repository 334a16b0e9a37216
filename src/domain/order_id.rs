use chrono::{DateTime, Datelike, Duration, Utc};
use rand::Rng;

/// Indian Standard Time, UTC+05:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Builds `<prefix><year>-<last4 of phone>-<4 random digits>`, e.g. `DP2025-6789-4213`.
///
/// The random suffix does not make identifiers unique on its own; callers
/// check candidates against the ledger inside the placing transaction. The
/// year is the store's local calendar year, not the UTC one.
#[derive(Debug, Clone)]
pub struct OrderIdGenerator {
    prefix: String,
    utc_offset_minutes: i32,
}

impl OrderIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Calendar year at the store when `now` happens.
    pub fn year_of(&self, now: DateTime<Utc>) -> i32 {
        (now + Duration::minutes(i64::from(self.utc_offset_minutes))).year()
    }

    pub fn generate<R: Rng + ?Sized>(&self, year: i32, phone: &str, rng: &mut R) -> String {
        let suffix: u16 = rng.gen_range(1000..=9999);
        format!("{}{}-{}-{}", self.prefix, year, phone_tail(phone), suffix)
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new("DP")
    }
}

/// Last four digits of `phone`, left-padded with zeros.
fn phone_tail(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("{tail:0>4}")
}
