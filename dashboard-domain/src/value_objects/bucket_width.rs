// Bucket width value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Fixed enumeration of trend-chart interval choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BucketWidth {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    OneWeek,
}

impl BucketWidth {
    pub const ALL: [BucketWidth; 9] = [
        BucketWidth::FiveMinutes,
        BucketWidth::FifteenMinutes,
        BucketWidth::ThirtyMinutes,
        BucketWidth::OneHour,
        BucketWidth::ThreeHours,
        BucketWidth::SixHours,
        BucketWidth::TwelveHours,
        BucketWidth::OneDay,
        BucketWidth::OneWeek,
    ];

    /// User-facing dropdown label.
    pub fn label(&self) -> &'static str {
        match self {
            BucketWidth::FiveMinutes => "5 minutes",
            BucketWidth::FifteenMinutes => "15 minutes",
            BucketWidth::ThirtyMinutes => "30 minutes",
            BucketWidth::OneHour => "1 hour",
            BucketWidth::ThreeHours => "3 hours",
            BucketWidth::SixHours => "6 hours",
            BucketWidth::TwelveHours => "12 hours",
            BucketWidth::OneDay => "1 Day",
            BucketWidth::OneWeek => "1 Week",
        }
    }

    /// Short frequency code, used in query strings.
    pub fn code(&self) -> &'static str {
        match self {
            BucketWidth::FiveMinutes => "5min",
            BucketWidth::FifteenMinutes => "15min",
            BucketWidth::ThirtyMinutes => "30min",
            BucketWidth::OneHour => "1H",
            BucketWidth::ThreeHours => "3H",
            BucketWidth::SixHours => "6H",
            BucketWidth::TwelveHours => "12H",
            BucketWidth::OneDay => "D",
            BucketWidth::OneWeek => "W",
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            BucketWidth::FiveMinutes => 5 * 60,
            BucketWidth::FifteenMinutes => 15 * 60,
            BucketWidth::ThirtyMinutes => 30 * 60,
            BucketWidth::OneHour => 60 * 60,
            BucketWidth::ThreeHours => 3 * 60 * 60,
            BucketWidth::SixHours => 6 * 60 * 60,
            BucketWidth::TwelveHours => 12 * 60 * 60,
            BucketWidth::OneDay => 24 * 60 * 60,
            BucketWidth::OneWeek => 7 * 24 * 60 * 60,
        }
    }
}

impl FromStr for BucketWidth {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BucketWidth::ALL
            .into_iter()
            .find(|width| {
                width.label().eq_ignore_ascii_case(wanted) || width.code().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| DataError::UnsupportedInterval(s.to_string()))
    }
}

impl TryFrom<String> for BucketWidth {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BucketWidth> for String {
    fn from(value: BucketWidth) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_codes_round_trip() {
        for width in BucketWidth::ALL {
            assert_eq!(width.label().parse::<BucketWidth>(), Ok(width));
            assert_eq!(width.code().parse::<BucketWidth>(), Ok(width));
        }
    }

    #[test]
    fn labels_match_dropdown() {
        assert_eq!("1 Day".parse::<BucketWidth>(), Ok(BucketWidth::OneDay));
        assert_eq!("12 hours".parse::<BucketWidth>(), Ok(BucketWidth::TwelveHours));
        assert_eq!(BucketWidth::OneWeek.seconds(), 604_800);
        assert!(matches!(
            "2 days".parse::<BucketWidth>(),
            Err(DataError::UnsupportedInterval(_))
        ));
    }
}
