//! Seasonal buckets by calendar month triplet.

use std::fmt;

use chrono::Datelike;
use serde::Serialize;

/// One of four fixed groupings of calendar months.
///
/// The bucket number is `((month mod 12) div 3) + 1`, so December, January
/// and February share bucket 1. Labels follow the Northern Hemisphere.
///
/// # Examples
///
/// ```
/// use pv_sim::sim::season::Season;
///
/// assert_eq!(Season::from_month(12), Season::Winter);
/// assert_eq!(Season::from_month(3), Season::Spring);
/// assert_eq!(Season::Autumn.bucket(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// All seasons in report order.
    pub const ALL: [Self; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Autumn];

    /// Maps a calendar month (January = 1) to its season.
    pub fn from_month(month: u32) -> Self {
        match (month % 12) / 3 + 1 {
            1 => Self::Winter,
            2 => Self::Spring,
            3 => Self::Summer,
            _ => Self::Autumn,
        }
    }

    /// Season of any date-like value.
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::from_month(date.month())
    }

    /// Bucket number, 1 to 4.
    pub fn bucket(self) -> u32 {
        self as u32 + 1
    }

    /// Position in [`Season::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
