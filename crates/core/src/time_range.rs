//! Weekly time slots and the half-open overlap rule.
//!
//! A slot is a `(day, start, end)` triple. Two slots collide only when they
//! fall on the same day and their `[start, end)` intervals intersect, so a
//! class ending at 10:30 never collides with one starting at 10:30.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Day of week
// ---------------------------------------------------------------------------

/// Teaching days. Sunday is not a scheduling day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 6] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Parse a full English day name or its three-letter abbreviation,
    /// case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let lower = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| {
                let name = day.as_str().to_ascii_lowercase();
                lower == name || lower == name[..3]
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|d| d.as_str()).collect();
                format!(
                    "'{raw}' is not a valid day. Must be one of: {}",
                    names.join(", ")
                )
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Storage index, Monday = 1 through Saturday = 6.
    pub fn index(&self) -> i16 {
        match self {
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Inverse of [`DayOfWeek::index`].
    pub fn from_index(index: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.index() == index)
    }

    /// The teaching day a calendar date falls on; `None` for Sundays.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            Weekday::Mon => Some(Self::Monday),
            Weekday::Tue => Some(Self::Tuesday),
            Weekday::Wed => Some(Self::Wednesday),
            Weekday::Thu => Some(Self::Thursday),
            Weekday::Fri => Some(Self::Friday),
            Weekday::Sat => Some(Self::Saturday),
            Weekday::Sun => None,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DayOfWeek {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DayOfWeek> for String {
    fn from(day: DayOfWeek) -> Self {
        day.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Clock time
// ---------------------------------------------------------------------------

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time of day with minute precision, written `HH:MM` (24-hour,
/// zero-padded). Ordering matches both numeric and lexicographic ordering of
/// the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hour and minute; `None` if out of range.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Const constructor for fixed times; out-of-range input wraps within the day.
    pub const fn at(hour: u16, minute: u16) -> Self {
        Self((hour * 60 + minute) % MINUTES_PER_DAY)
    }

    /// Parse a strict `HH:MM` string.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let invalid = || format!("'{raw}' is not a valid time: expected HH:MM (24-hour)");
        let bytes = raw.as_bytes();
        if !raw.is_ascii() || bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let (hh, mm) = (&raw[..2], &raw[3..]);
        if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u16 = hh.parse().map_err(|_| invalid())?;
        let minute: u16 = mm.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    pub fn minutes_since_midnight(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

// ---------------------------------------------------------------------------
// Time range
// ---------------------------------------------------------------------------

/// A weekly slot. Construction enforces `start_time < end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub day_of_week: DayOfWeek,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl TimeRange {
    pub fn new(day: DayOfWeek, start: ClockTime, end: ClockTime) -> Result<Self, String> {
        if start >= end {
            return Err(format!(
                "startTime ({start}) must be earlier than endTime ({end})"
            ));
        }
        Ok(Self {
            day_of_week: day,
            start_time: start,
            end_time: end,
        })
    }

    /// Parse the three wire fields at once.
    pub fn parse(day: &str, start: &str, end: &str) -> Result<Self, String> {
        Self::new(
            DayOfWeek::parse(day)?,
            ClockTime::parse(start)?,
            ClockTime::parse(end)?,
        )
    }

    /// Half-open overlap on the same day.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self, other)
    }

    /// Same day and same bounds.
    pub fn same_slot(&self, other: &TimeRange) -> bool {
        same_slot(self, other)
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_time.minutes_since_midnight() - self.start_time.minutes_since_midnight()
    }

    /// `HH:MM-HH:MM` form used in conflict messages.
    pub fn span_label(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day_of_week, self.span_label())
    }
}

/// True iff both ranges fall on the same day and `a.start < b.end && b.start < a.end`.
pub fn overlaps(a: &TimeRange, b: &TimeRange) -> bool {
    a.day_of_week == b.day_of_week && times_overlap(a, b)
}

/// Interval intersection ignoring the day; used where the occasion is
/// matched separately (dated room requests).
pub fn times_overlap(a: &TimeRange, b: &TimeRange) -> bool {
    a.start_time < b.end_time && b.start_time < a.end_time
}

/// Structural equality of day, start and end.
pub fn same_slot(a: &TimeRange, b: &TimeRange) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(day: DayOfWeek, start: &str, end: &str) -> TimeRange {
        TimeRange::new(day, ClockTime::parse(start).unwrap(), ClockTime::parse(end).unwrap())
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn day_parses_full_names_and_abbreviations() {
        assert_eq!(DayOfWeek::parse("Monday").unwrap(), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::parse("sat").unwrap(), DayOfWeek::Saturday);
        assert_eq!(DayOfWeek::parse(" WEDNESDAY ").unwrap(), DayOfWeek::Wednesday);
    }

    #[test]
    fn sunday_is_not_a_teaching_day() {
        let err = DayOfWeek::parse("Sunday").unwrap_err();
        assert!(err.contains("not a valid day"));
    }

    #[test]
    fn day_index_round_trips() {
        for day in DayOfWeek::ALL {
            assert_eq!(DayOfWeek::from_index(day.index()), Some(day));
        }
        assert_eq!(DayOfWeek::from_index(0), None);
        assert_eq!(DayOfWeek::from_index(7), None);
    }

    #[test]
    fn day_from_date() {
        // 2024-09-02 was a Monday, 2024-09-08 a Sunday.
        let monday = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        assert_eq!(DayOfWeek::from_date(monday), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::from_date(sunday), None);
    }

    #[test]
    fn clock_time_parses_strict_format() {
        assert_eq!(ClockTime::parse("09:05").unwrap().to_string(), "09:05");
        assert_eq!(ClockTime::parse("23:59").unwrap().minutes_since_midnight(), 1439);
        assert!(ClockTime::parse("9:05").is_err());
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("12:60").is_err());
        assert!(ClockTime::parse("12-30").is_err());
        assert!(ClockTime::parse("+1:30").is_err());
    }

    #[test]
    fn clock_order_matches_string_order() {
        let times = ["07:45", "08:00", "10:30", "13:15", "21:00"];
        for pair in times.windows(2) {
            let a = ClockTime::parse(pair[0]).unwrap();
            let b = ClockTime::parse(pair[1]).unwrap();
            assert_eq!(a < b, pair[0] < pair[1]);
        }
    }

    #[test]
    fn range_requires_start_before_end() {
        let err = TimeRange::parse("Monday", "10:00", "10:00").unwrap_err();
        assert!(err.contains("must be earlier"));
        assert!(TimeRange::parse("Monday", "11:00", "10:00").is_err());
    }

    // -----------------------------------------------------------------------
    // Overlap
    // -----------------------------------------------------------------------

    #[test]
    fn different_days_never_overlap() {
        for day in DayOfWeek::ALL {
            for other in DayOfWeek::ALL.into_iter().filter(|d| *d != day) {
                let a = range(day, "09:00", "12:00");
                let b = range(other, "09:00", "12:00");
                assert!(!overlaps(&a, &b));
            }
        }
    }

    #[test]
    fn same_day_overlap_matches_interval_rule() {
        let slots = ["08:00", "09:00", "09:30", "10:30", "11:00", "12:00"];
        for (i, s1) in slots.iter().enumerate() {
            for e1 in &slots[i + 1..] {
                for (j, s2) in slots.iter().enumerate() {
                    for e2 in &slots[j + 1..] {
                        let a = range(DayOfWeek::Tuesday, s1, e1);
                        let b = range(DayOfWeek::Tuesday, s2, e2);
                        let expected = s1 < e2 && s2 < e1;
                        assert_eq!(overlaps(&a, &b), expected, "{a} vs {b}");
                        assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
                    }
                }
            }
        }
    }

    #[test]
    fn touching_boundaries_do_not_overlap() {
        let a = range(DayOfWeek::Monday, "09:00", "10:30");
        let b = range(DayOfWeek::Monday, "10:30", "12:00");
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));
    }

    #[test]
    fn containment_overlaps() {
        let outer = range(DayOfWeek::Friday, "08:00", "12:00");
        let inner = range(DayOfWeek::Friday, "09:00", "10:00");
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn same_slot_is_structural() {
        let a = range(DayOfWeek::Monday, "09:00", "10:30");
        assert!(a.same_slot(&range(DayOfWeek::Monday, "09:00", "10:30")));
        assert!(!a.same_slot(&range(DayOfWeek::Tuesday, "09:00", "10:30")));
        assert!(!a.same_slot(&range(DayOfWeek::Monday, "09:00", "10:00")));
    }

    #[test]
    fn duration_and_labels() {
        let a = range(DayOfWeek::Thursday, "13:15", "14:45");
        assert_eq!(a.duration_minutes(), 90);
        assert_eq!(a.span_label(), "13:15-14:45");
        assert_eq!(a.to_string(), "Thursday 13:15-14:45");
    }

    #[test]
    fn serializes_wire_names() {
        let a = range(DayOfWeek::Monday, "09:00", "10:30");
        let json = serde_json::to_value(a).unwrap();
        assert_eq!(json["dayOfWeek"], "Monday");
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "10:30");
    }
}
