//! Compact weekday sets.
//!
//! Weekdays are numbered 0 (Sunday) through 6 (Saturday), matching the
//! numbering stored for custom cadences and relay assignments.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// All weekdays in Sunday-first order, indexed by weekday number.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Weekday number of a chrono weekday (0 = Sunday).
pub fn weekday_number(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// A set of weekdays stored as a 7-bit mask.
///
/// Serialized as a sorted list of weekday numbers, e.g. `[1, 3, 5]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set. Never matches any date.
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build a set from raw weekday numbers.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidWeekday`] for any number above 6.
    pub fn from_numbers<I>(numbers: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut set = Self::EMPTY;
        for n in numbers {
            if n > 6 {
                return Err(ValidationError::InvalidWeekday(n));
            }
            set.0 |= 1 << n;
        }
        Ok(set)
    }

    pub fn from_weekdays<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        days.into_iter().fold(Self::EMPTY, |mut set, day| {
            set.insert(day);
            set
        })
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << weekday_number(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << weekday_number(day)) != 0
    }

    /// Whether the weekday of `date` is in the set.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Weekdays in the set, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEKDAYS.into_iter().filter(|day| self.contains(*day))
    }

    /// Sorted weekday numbers in the set.
    pub fn numbers(&self) -> Vec<u8> {
        self.iter().map(weekday_number).collect()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(numbers: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_numbers(numbers)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.numbers()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        Self::from_weekdays(iter)
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Parses comma-separated weekday numbers (`"1,3,5"`) or names (`"mon,wed,fri"`).
/// An empty string parses to the empty set.
impl FromStr for WeekdaySet {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = Self::EMPTY;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = match part.parse::<u8>() {
                Ok(n) if n <= 6 => WEEKDAYS[n as usize],
                Ok(n) => return Err(ValidationError::InvalidWeekday(n)),
                Err(_) => part.parse::<Weekday>().map_err(|_| ValidationError::InvalidValue {
                    field: "weekday".to_string(),
                    message: format!("'{part}' is neither a weekday number nor a weekday name"),
                })?,
            };
            set.insert(day);
        }
        Ok(set)
    }
}
