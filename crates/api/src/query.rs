//! Shared query parameter types for API handlers.
//!
//! Raw strings are accepted here and parsed into domain filters so a bad
//! value surfaces as a 400 naming the parameter.

use serde::Deserialize;
use timetable_core::assignment::{AssignmentFilter, AssignmentStatus};
use timetable_core::error::CoreError;
use timetable_core::schedule_request::{RequestFilter, RequestStatus};
use timetable_core::term::{parse_academic_year, validate_year, Semester};

/// Term and status filters shared by the schedule list endpoints
/// (`?semester=&year=&academicYear=&status=`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub semester: Option<String>,
    pub year: Option<i32>,
    pub academic_year: Option<String>,
    pub status: Option<String>,
}

impl ScheduleQuery {
    /// Convert to a store filter. `academicYear` selects its starting year
    /// and must agree with `year` when both are given.
    pub fn to_filter(&self) -> Result<AssignmentFilter, CoreError> {
        let semester = self
            .semester
            .as_deref()
            .map(Semester::parse)
            .transpose()
            .map_err(CoreError::Validation)?;

        let mut year = self
            .year
            .map(validate_year)
            .transpose()
            .map_err(CoreError::Validation)?;
        if let Some(label) = &self.academic_year {
            let start = parse_academic_year(label).map_err(CoreError::Validation)?;
            if let Some(y) = year.filter(|y| *y != start) {
                return Err(CoreError::Validation(format!(
                    "academicYear {label} does not match year {y}"
                )));
            }
            year = Some(start);
        }

        let status = self
            .status
            .as_deref()
            .map(AssignmentStatus::parse)
            .transpose()
            .map_err(CoreError::Validation)?;

        Ok(AssignmentFilter {
            semester,
            year,
            status,
            ..AssignmentFilter::default()
        })
    }
}

/// `?status=` filter for the request listing.
#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub status: Option<String>,
}

impl RequestQuery {
    pub fn to_filter(&self) -> Result<RequestFilter, CoreError> {
        let status = self
            .status
            .as_deref()
            .map(RequestStatus::parse)
            .transpose()
            .map_err(CoreError::Validation)?;
        Ok(RequestFilter {
            status,
            ..RequestFilter::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn academic_year_selects_starting_year() {
        let query = ScheduleQuery {
            academic_year: Some("2024-2025".into()),
            ..ScheduleQuery::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.year, Some(2024));
        assert_eq!(filter.semester, None);
    }

    #[test]
    fn mismatched_year_and_academic_year_is_rejected() {
        let query = ScheduleQuery {
            year: Some(2023),
            academic_year: Some("2024-2025".into()),
            ..ScheduleQuery::default()
        };
        assert_matches!(query.to_filter(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn term_and_status_are_parsed() {
        let query = ScheduleQuery {
            semester: Some("Second Term".into()),
            year: Some(2025),
            status: Some("conflict".into()),
            ..ScheduleQuery::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.semester, Some(Semester::Second));
        assert_eq!(filter.year, Some(2025));
        assert_eq!(filter.status, Some(AssignmentStatus::Conflict));
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let query = RequestQuery {
            status: Some("archived".into()),
        };
        assert_matches!(query.to_filter(), Err(CoreError::Validation(_)));
    }
}
