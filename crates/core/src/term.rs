//! Academic terms: a semester within a year.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Earliest accepted academic year.
pub const MIN_YEAR: i32 = 2000;

/// Latest accepted academic year.
pub const MAX_YEAR: i32 = 2100;

/// The three terms of an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Semester {
    First,
    Second,
    Third,
}

impl Semester {
    pub const ALL: [Semester; 3] = [Self::First, Self::Second, Self::Third];

    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!(
                    "'{raw}' is not a valid semester. Must be one of: {}",
                    names.join(", ")
                )
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "First Term",
            Self::Second => "Second Term",
            Self::Third => "Third Term",
        }
    }

    /// Term a calendar date belongs to: Sep-Dec first, Jan-Apr second,
    /// May-Aug third.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            9..=12 => Self::First,
            1..=4 => Self::Second,
            _ => Self::Third,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Semester {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Semester> for String {
    fn from(semester: Semester) -> Self {
        semester.as_str().to_string()
    }
}

/// Validate that a year lies in the supported window.
pub fn validate_year(year: i32) -> Result<i32, String> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        ))
    }
}

/// Read an optional year given either as a number or as a numeric string
/// (`2024` or `"2024"`). A blank string counts as absent.
pub fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i32),
        Text(String),
    }

    match Option::<RawYear>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawYear::Number(year)) => Ok(Some(year)),
        Some(RawYear::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawYear::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("year must be a number, got '{text}'"))),
    }
}

/// `"2024-2025"` style label for a starting year.
pub fn academic_year_label(year: i32) -> String {
    format!("{year}-{}", year + 1)
}

/// Parse an `"YYYY-YYYY"` academic-year label back to its starting year.
/// The second year must follow the first.
pub fn parse_academic_year(label: &str) -> Result<i32, String> {
    let invalid = || format!("'{label}' is not a valid academic year: expected YYYY-YYYY");
    let (first, second) = label.trim().split_once('-').ok_or_else(invalid)?;
    let first: i32 = first.parse().map_err(|_| invalid())?;
    let second: i32 = second.parse().map_err(|_| invalid())?;
    if second != first + 1 {
        return Err(invalid());
    }
    validate_year(first)
}

/// A semester+year pair scoping course and schedule uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term {
    pub semester: Semester,
    pub year: i32,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.semester, self.year)
    }
}
