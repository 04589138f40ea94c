//! Consensus timestamps

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hiero_proto as proto;

use crate::{PrimitiveError, PrimitiveResult};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A point in time with nanosecond precision
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub seconds: i64,
    /// Nanoseconds within the second, always below one billion
    pub nanos: u32,
}

impl Timestamp {
    /// Create a timestamp, normalizing excess nanoseconds into seconds
    ///
    /// Seconds saturate at the ends of the `i64` range; parse untrusted
    /// input with `try_new`.
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: seconds.saturating_add(i64::from(nanos / NANOS_PER_SECOND as u32)),
            nanos: nanos % NANOS_PER_SECOND as u32,
        }
    }

    /// Create a timestamp whose nanoseconds since the epoch fit in an `i64`
    pub fn try_new(seconds: i64, nanos: u32) -> PrimitiveResult<Self> {
        seconds
            .checked_mul(NANOS_PER_SECOND)
            .and_then(|whole| whole.checked_add(i64::from(nanos)))
            .map(Self::from_unix_nanos)
            .ok_or_else(|| PrimitiveError::InvalidTimestamp(format!("{}s {}ns", seconds, nanos)))
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Create a timestamp from nanoseconds since the epoch
    pub fn from_unix_nanos(nanos: i64) -> Self {
        Self {
            seconds: nanos.div_euclid(NANOS_PER_SECOND),
            nanos: nanos.rem_euclid(NANOS_PER_SECOND) as u32,
        }
    }

    /// Nanoseconds since the epoch, or `None` when they overflow an `i64`
    pub fn checked_unix_nanos(&self) -> Option<i64> {
        self.seconds.checked_mul(NANOS_PER_SECOND)?.checked_add(i64::from(self.nanos))
    }

    /// Nanoseconds since the epoch, saturating at the `i64` range
    pub fn unix_nanos(&self) -> i64 {
        let nanos = i128::from(self.seconds) * i128::from(NANOS_PER_SECOND) + i128::from(self.nanos);
        nanos.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// This timestamp shifted by a number of nanoseconds, or `None` on overflow
    pub fn checked_plus_nanos(&self, nanos: i64) -> Option<Self> {
        self.checked_unix_nanos()?.checked_add(nanos).map(Self::from_unix_nanos)
    }

    /// This timestamp shifted by a number of nanoseconds
    pub fn plus_nanos(&self, nanos: i64) -> Self {
        let total = i128::from(self.nanos) + i128::from(nanos);
        let per_second = i128::from(NANOS_PER_SECOND);
        let seconds = i128::from(self.seconds) + total.div_euclid(per_second);
        Self {
            seconds: seconds.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            nanos: total.rem_euclid(per_second) as u32,
        }
    }

    /// This timestamp moved back by a duration
    pub fn minus(&self, duration: Duration) -> Self {
        self.plus_nanos(-i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => Self::new(d.as_secs() as i64, d.subsec_nanos()),
            Err(e) => Self::default().minus(e.duration()),
        }
    }
}

impl From<Timestamp> for proto::Timestamp {
    fn from(ts: Timestamp) -> Self {
        proto::Timestamp { seconds: ts.seconds, nanos: ts.nanos as i32 }
    }
}

impl TryFrom<proto::Timestamp> for Timestamp {
    type Error = PrimitiveError;

    fn try_from(ts: proto::Timestamp) -> Result<Self, Self::Error> {
        let nanos = u32::try_from(ts.nanos)
            .map_err(|_| PrimitiveError::InvalidTimestamp(format!("negative nanos {}", ts.nanos)))?;
        Self::try_new(ts.seconds, nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_nanos() {
        let ts = Timestamp::new(1, 1_500_000_000);
        assert_eq!(ts, Timestamp { seconds: 2, nanos: 500_000_000 });
    }

    #[test]
    fn test_plus_nanos_carries() {
        let ts = Timestamp { seconds: 10, nanos: 999_999_999 };
        assert_eq!(ts.plus_nanos(1), Timestamp { seconds: 11, nanos: 0 });
        assert_eq!(ts.plus_nanos(1).plus_nanos(-1), ts);
    }

    #[test]
    fn test_display_pads_nanos() {
        assert_eq!(Timestamp { seconds: 5, nanos: 7 }.to_string(), "5.000000007");
    }

    #[test]
    fn test_ordering() {
        let a = Timestamp { seconds: 1, nanos: 9 };
        let b = Timestamp { seconds: 2, nanos: 0 };
        assert!(a < b);
    }

    #[test]
    fn test_proto_rejects_negative_nanos() {
        assert!(Timestamp::try_from(proto::Timestamp { seconds: 1, nanos: -1 }).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(Timestamp::try_new(i64::MAX / 2, 0), Err(PrimitiveError::InvalidTimestamp(_))));
        assert!(matches!(
            Timestamp::try_from(proto::Timestamp { seconds: i64::MIN / 2, nanos: 0 }),
            Err(PrimitiveError::InvalidTimestamp(_))
        ));
        assert_eq!(Timestamp::try_new(9_000_000_000, 5).unwrap(), Timestamp { seconds: 9_000_000_000, nanos: 5 });
    }

    #[test]
    fn test_arithmetic_saturates() {
        let far = Timestamp::new(i64::MAX, 1_500_000_000);
        assert_eq!(far, Timestamp { seconds: i64::MAX, nanos: 500_000_000 });
        assert_eq!(far.unix_nanos(), i64::MAX);
        assert_eq!(far.checked_unix_nanos(), None);
        assert_eq!(far.checked_plus_nanos(1), None);
        assert_eq!(far.plus_nanos(i64::MAX).seconds, i64::MAX);

        let edge = Timestamp::from_unix_nanos(i64::MAX);
        assert_eq!(edge.checked_plus_nanos(1), None);
        assert_eq!(edge.checked_plus_nanos(-1), Some(Timestamp::from_unix_nanos(i64::MAX - 1)));
    }
}
