//! Countdown classification for a board's next departure.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

/// The live value of a departure board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Effective time lies in the past.
    Departed,
    /// Departing within the current minute.
    Now,
    /// Whole minutes until departure.
    InMinutes(i64),
}

impl Countdown {
    /// Classify by whole minutes between `effective` and `now`.
    ///
    /// Minutes round toward negative infinity, so one second past the
    /// effective time already counts as departed.
    pub fn classify(effective: DateTime<FixedOffset>, now: DateTime<Utc>) -> Self {
        let minutes = (effective.with_timezone(&Utc) - now)
            .num_seconds()
            .div_euclid(60);

        match minutes {
            m if m < 0 => Countdown::Departed,
            0 => Countdown::Now,
            m => Countdown::InMinutes(m),
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Departed => f.write_str("Departed"),
            Countdown::Now => f.write_str("Now"),
            Countdown::InMinutes(minutes) => write!(f, "Arriving in {minutes} min"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 13, 30, 0).unwrap()
    }

    fn at(offset_secs: i64) -> DateTime<FixedOffset> {
        (now() + Duration::seconds(offset_secs)).fixed_offset()
    }

    #[test]
    fn one_second_past_is_departed() {
        assert_eq!(Countdown::classify(at(-1), now()), Countdown::Departed);
    }

    #[test]
    fn exactly_now_is_now() {
        assert_eq!(Countdown::classify(at(0), now()), Countdown::Now);
    }

    #[test]
    fn within_the_minute_is_now() {
        assert_eq!(Countdown::classify(at(59), now()), Countdown::Now);
    }

    #[test]
    fn sixty_one_seconds_is_one_minute() {
        assert_eq!(Countdown::classify(at(61), now()), Countdown::InMinutes(1));
    }

    #[test]
    fn display_strings() {
        assert_eq!(Countdown::Departed.to_string(), "Departed");
        assert_eq!(Countdown::Now.to_string(), "Now");
        assert_eq!(Countdown::InMinutes(7).to_string(), "Arriving in 7 min");
    }

    proptest! {
        #[test]
        fn classification_matches_floor_division(offset_secs in -86_400i64..86_400) {
            let expected = offset_secs.div_euclid(60);
            let classified = Countdown::classify(at(offset_secs), now());

            let matches = match classified {
                Countdown::Departed => expected < 0,
                Countdown::Now => expected == 0,
                Countdown::InMinutes(m) => m == expected && expected > 0,
            };
            prop_assert!(matches, "offset {offset_secs}s -> {classified:?}");
        }
    }
}
