use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// UTC instant at millisecond precision.
///
/// The text form is RFC 3339 with exactly three fractional digits and a `Z`
/// suffix (`2024-05-01T12:00:00.000Z`). That form is what gets hashed, so it
/// must never vary for the same instant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current wall-clock time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis()).unwrap_or_else(Self::epoch)
    }

    /// Milliseconds since the UNIX epoch. `None` if out of range.
    pub fn from_millis(ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(Self)
    }

    /// 1970-01-01T00:00:00.000Z
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::default())
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Canonical RFC 3339 text form.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    /// Only the canonical text form is accepted, so a parsed timestamp
    /// always hashes to the text it came from.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ts = DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| TypeError::InvalidTimestamp(format!("{s}: {e}")))?;
        if ts.to_rfc3339() != s {
            return Err(TypeError::InvalidTimestamp(format!(
                "{s}: expected {}",
                ts.to_rfc3339()
            )));
        }
        Ok(ts)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of entry timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Used for reproducible chains.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(start.as_millis()),
        }
    }

    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.as_millis(), Ordering::SeqCst);
    }

    /// Move the clock forward (or backward, for negative values).
    pub fn advance(&self, ms: i64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_else(Timestamp::epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_has_millis_and_z() {
        let ts = Timestamp::from_millis(1_714_564_800_000).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn parses_canonical_form() {
        let ts: Timestamp = "2024-05-01T12:00:00.000Z".parse().unwrap();
        assert_eq!(ts.as_millis(), 1_714_564_800_000);
    }

    #[test]
    fn rejects_non_canonical_forms() {
        for text in [
            "2024-05-01T14:00:00.000+02:00",
            "2024-05-01T12:00:00.000999Z",
            "2024-05-01T12:00:00Z",
            "2024-05-01t12:00:00.000z",
        ] {
            assert!(
                matches!(text.parse::<Timestamp>(), Err(TypeError::InvalidTimestamp(_))),
                "{text} was accepted"
            );
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "yesterday".parse::<Timestamp>(),
            Err(TypeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn now_is_truncated_to_millis() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos() % 1_000_000, 0);
        // after 2020-01-01
        assert!(ts.as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn serde_uses_text_form() {
        let ts = Timestamp::from_millis(1_000).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"1970-01-01T00:00:01.000Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn manual_clock_moves_only_on_request() {
        let clock = ManualClock::new(Timestamp::from_millis(500).unwrap());
        assert_eq!(clock.now().as_millis(), 500);
        assert_eq!(clock.now().as_millis(), 500);
        clock.advance(250);
        assert_eq!(clock.now().as_millis(), 750);
        clock.set(Timestamp::epoch());
        assert_eq!(clock.now(), Timestamp::epoch());
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::from_millis(1).unwrap();
        let b = Timestamp::from_millis(2).unwrap();
        assert!(a < b);
        assert_eq!(a.max(b), b);
    }
}
