//! UTC timestamps for behavior records and profiles.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, always UTC. Serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Whole days from `earlier` to `self`; negative when `earlier` is later.
    pub fn days_since(&self, earlier: &Timestamp) -> i64 {
        self.0.signed_duration_since(earlier.0).num_days()
    }

    /// Retention cutoffs are computed as `now.minus_days(horizon)`.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninety_days_back_is_ninety_days_before() {
        let now = Timestamp::now();
        let cutoff = now.minus_days(90);

        assert!(cutoff.is_before(&now));
        assert_eq!(now.days_since(&cutoff), 90);
        assert_eq!(cutoff.days_since(&now), -90);
    }

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::from(Utc::now() - Duration::seconds(5));
        let later = Timestamp::now();

        assert!(earlier < later);
        assert!(!later.is_before(&earlier));
    }

    #[test]
    fn round_trips_rfc3339_text() {
        let ts: Timestamp = serde_json::from_str("\"2024-03-01T10:00:00Z\"").unwrap();

        assert_eq!(ts.as_datetime().to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-03-01T10:00:00Z\"");
    }
}
