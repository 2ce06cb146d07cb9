//! Schedule assignments: the entity, its status machine, the candidate
//! validation pipeline and the store seam.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::term::{self, Semester, Term};
use crate::time_range::{ClockTime, DayOfWeek, TimeRange};
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_CONFLICT: &str = "conflict";
pub const STATUS_CANCELED: &str = "canceled";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_PUBLISHED,
    STATUS_CONFLICT,
    STATUS_CANCELED,
];

/// Lifecycle of an assignment.
///
/// `draft -> {published, conflict}` on create, `{published, conflict}` flip
/// between each other on every re-check, and anything may move to the
/// terminal `canceled` state. Cancelling is carried out as a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Draft,
    Published,
    Conflict,
    Canceled,
}

impl AssignmentStatus {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_PUBLISHED => Ok(Self::Published),
            STATUS_CONFLICT => Ok(Self::Conflict),
            STATUS_CANCELED => Ok(Self::Canceled),
            _ => Err(format!(
                "Invalid schedule status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::Published => STATUS_PUBLISHED,
            Self::Conflict => STATUS_CONFLICT,
            Self::Canceled => STATUS_CANCELED,
        }
    }

    /// Status an assignment lands in after a conflict check.
    pub fn after_check(has_conflicts: bool) -> Self {
        if has_conflicts {
            Self::Conflict
        } else {
            Self::Published
        }
    }

    pub fn valid_transitions(&self) -> &'static [AssignmentStatus] {
        match self {
            Self::Draft | Self::Published | Self::Conflict => {
                &[Self::Published, Self::Conflict, Self::Canceled]
            }
            Self::Canceled => &[],
        }
    }

    pub fn can_transition(&self, to: AssignmentStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn validate_transition(&self, to: AssignmentStatus) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid schedule transition: {} -> {}",
                self.as_str(),
                to.as_str()
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A course taught by an instructor in a room at a weekly slot for a term.
///
/// The display fields (`course_code` through `building`) are copied from the
/// directory when the record is written and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAssignment {
    pub id: EntityId,
    pub course_id: EntityId,
    pub instructor_id: EntityId,
    pub room_id: EntityId,
    #[serde(flatten)]
    pub slot: TimeRange,
    pub semester: Semester,
    pub year: i32,
    pub academic_year: String,
    pub status: AssignmentStatus,
    pub conflicts: Vec<String>,
    pub course_code: String,
    pub course_name: String,
    pub instructor_name: String,
    pub room_name: String,
    pub building: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScheduleAssignment {
    pub fn term(&self) -> Term {
        Term {
            semester: self.semester,
            year: self.year,
        }
    }

    /// The conflict-relevant fields of this record.
    pub fn candidate(&self) -> Candidate {
        Candidate {
            course_id: self.course_id.clone(),
            instructor_id: self.instructor_id.clone(),
            room_id: self.room_id.clone(),
            slot: self.slot,
            semester: self.semester,
            year: self.year,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A fully validated proposal: every field present and well-formed, and
/// `start < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub course_id: EntityId,
    pub instructor_id: EntityId,
    pub room_id: EntityId,
    pub slot: TimeRange,
    pub semester: Semester,
    pub year: i32,
}

impl Candidate {
    pub fn term(&self) -> Term {
        Term {
            semester: self.semester,
            year: self.year,
        }
    }

    /// Same course, instructor, room, slot and term as `existing`.
    pub fn is_identical_to(&self, existing: &ScheduleAssignment) -> bool {
        self.course_id == existing.course_id
            && self.instructor_id == existing.instructor_id
            && self.room_id == existing.room_id
            && self.slot.same_slot(&existing.slot)
            && self.semester == existing.semester
            && self.year == existing.year
    }

    /// Keys to serialize concurrent writes on.
    pub fn lock_keys(&self) -> Vec<String> {
        vec![
            format!("room:{}", self.room_id),
            format!("instructor:{}", self.instructor_id),
        ]
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw create/update payload. Every field is optional so that create can
/// report all missing fields at once and update can merge onto the stored
/// record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub course_id: Option<String>,
    pub instructor_id: Option<String>,
    pub room_id: Option<String>,
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub semester: Option<String>,
    #[serde(default, deserialize_with = "crate::term::deserialize_year")]
    pub year: Option<i32>,
}

/// Wire names of the fields required on create, in report order.
pub const REQUIRED_FIELDS: &[&str] = &[
    "courseId",
    "instructorId",
    "roomId",
    "dayOfWeek",
    "startTime",
    "endTime",
    "semester",
    "year",
];

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Record a field error and keep going so all problems are reported together.
fn collect<T>(errors: &mut Vec<String>, result: Result<T, String>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

fn parse_id(errors: &mut Vec<String>, field: &str, raw: &str) -> Option<EntityId> {
    collect(
        errors,
        EntityId::parse(raw).map_err(|_| {
            format!(
                "Invalid {field}: must be a {}-character hex id",
                crate::types::ENTITY_ID_LEN
            )
        }),
    )
}

impl AssignmentInput {
    /// Wire names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let presence = [
            present(&self.course_id).is_some(),
            present(&self.instructor_id).is_some(),
            present(&self.room_id).is_some(),
            present(&self.day_of_week).is_some(),
            present(&self.start_time).is_some(),
            present(&self.end_time).is_some(),
            present(&self.semester).is_some(),
            self.year.is_some(),
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(presence)
            .filter_map(|(name, ok)| (!ok).then_some(*name))
            .collect()
    }

    /// Whether the payload changes any conflict-relevant field.
    pub fn touches_schedule(&self) -> bool {
        [
            &self.course_id,
            &self.instructor_id,
            &self.room_id,
            &self.day_of_week,
            &self.start_time,
            &self.end_time,
            &self.semester,
        ]
        .into_iter()
        .any(|f| present(f).is_some())
            || self.year.is_some()
    }

    /// Validate a create payload: presence first, then formats.
    pub fn to_candidate(&self) -> Result<Candidate, CoreError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        self.merge_into(None)
    }

    /// Validate an update payload against the stored values; absent fields
    /// keep what `base` has.
    pub fn apply_to(&self, base: &Candidate) -> Result<Candidate, CoreError> {
        self.merge_into(Some(base))
    }

    fn merge_into(&self, base: Option<&Candidate>) -> Result<Candidate, CoreError> {
        let mut errors = Vec::new();

        let course_id = match present(&self.course_id) {
            Some(raw) => parse_id(&mut errors, "courseId", raw),
            None => base.map(|b| b.course_id.clone()),
        };
        let instructor_id = match present(&self.instructor_id) {
            Some(raw) => parse_id(&mut errors, "instructorId", raw),
            None => base.map(|b| b.instructor_id.clone()),
        };
        let room_id = match present(&self.room_id) {
            Some(raw) => parse_id(&mut errors, "roomId", raw),
            None => base.map(|b| b.room_id.clone()),
        };
        let day = match present(&self.day_of_week) {
            Some(raw) => collect(&mut errors, DayOfWeek::parse(raw)),
            None => base.map(|b| b.slot.day_of_week),
        };
        let start = match present(&self.start_time) {
            Some(raw) => collect(&mut errors, ClockTime::parse(raw)),
            None => base.map(|b| b.slot.start_time),
        };
        let end = match present(&self.end_time) {
            Some(raw) => collect(&mut errors, ClockTime::parse(raw)),
            None => base.map(|b| b.slot.end_time),
        };
        let semester = match present(&self.semester) {
            Some(raw) => collect(&mut errors, Semester::parse(raw)),
            None => base.map(|b| b.semester),
        };
        let year = match self.year {
            Some(y) => collect(&mut errors, term::validate_year(y)),
            None => base.map(|b| b.year),
        };

        let slot = match (day, start, end) {
            (Some(day), Some(start), Some(end)) => {
                collect(&mut errors, TimeRange::new(day, start, end))
            }
            _ => None,
        };

        let (
            Some(course_id),
            Some(instructor_id),
            Some(room_id),
            Some(slot),
            Some(semester),
            Some(year),
        ) = (course_id, instructor_id, room_id, slot, semester, year)
        else {
            if errors.is_empty() {
                errors.push("Incomplete schedule data".to_string());
            }
            return Err(CoreError::Validation(errors.join("; ")));
        };

        if !errors.is_empty() {
            return Err(CoreError::Validation(errors.join("; ")));
        }

        Ok(Candidate {
            course_id,
            instructor_id,
            room_id,
            slot,
            semester,
            year,
        })
    }
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Filter for store scans. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentFilter {
    pub room_id: Option<EntityId>,
    pub instructor_id: Option<EntityId>,
    pub course_id: Option<EntityId>,
    /// Restrict to any of these courses. An empty list matches nothing.
    pub course_ids: Option<Vec<EntityId>>,
    pub day_of_week: Option<DayOfWeek>,
    /// Same day as the range and half-open overlap with it.
    pub overlapping: Option<TimeRange>,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
    pub status: Option<AssignmentStatus>,
    pub exclude_id: Option<EntityId>,
}

impl AssignmentFilter {
    /// Assignments that could occupy the candidate's room at its slot.
    pub fn room_slot(candidate: &Candidate, exclude_id: Option<&EntityId>) -> Self {
        Self {
            room_id: Some(candidate.room_id.clone()),
            overlapping: Some(candidate.slot),
            semester: Some(candidate.semester),
            year: Some(candidate.year),
            exclude_id: exclude_id.cloned(),
            ..Self::default()
        }
    }

    /// Assignments that could occupy the candidate's instructor at its slot.
    pub fn instructor_slot(candidate: &Candidate, exclude_id: Option<&EntityId>) -> Self {
        Self {
            instructor_id: Some(candidate.instructor_id.clone()),
            overlapping: Some(candidate.slot),
            semester: Some(candidate.semester),
            year: Some(candidate.year),
            exclude_id: exclude_id.cloned(),
            ..Self::default()
        }
    }

    /// Every assignment of the candidate's course in its term, any day.
    pub fn course_term(candidate: &Candidate, exclude_id: Option<&EntityId>) -> Self {
        Self {
            course_id: Some(candidate.course_id.clone()),
            semester: Some(candidate.semester),
            year: Some(candidate.year),
            exclude_id: exclude_id.cloned(),
            ..Self::default()
        }
    }

    /// Reference semantics for the filter; store implementations must agree.
    pub fn matches(&self, a: &ScheduleAssignment) -> bool {
        fn eq<T: PartialEq>(want: &Option<T>, have: &T) -> bool {
            want.as_ref().is_none_or(|w| w == have)
        }

        eq(&self.room_id, &a.room_id)
            && eq(&self.instructor_id, &a.instructor_id)
            && eq(&self.course_id, &a.course_id)
            && self
                .course_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&a.course_id))
            && eq(&self.day_of_week, &a.slot.day_of_week)
            && self.overlapping.as_ref().is_none_or(|r| r.overlaps(&a.slot))
            && eq(&self.semester, &a.semester)
            && eq(&self.year, &a.year)
            && eq(&self.status, &a.status)
            && self.exclude_id.as_ref().is_none_or(|id| *id != a.id)
    }
}

/// Persistence seam for assignments.
pub trait AssignmentStore: Send + Sync {
    /// Matching assignments ordered by day, then start time.
    fn find(
        &self,
        filter: &AssignmentFilter,
    ) -> impl Future<Output = Result<Vec<ScheduleAssignment>, CoreError>> + Send;

    fn find_by_id(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<ScheduleAssignment>, CoreError>> + Send;

    fn insert(
        &self,
        assignment: &ScheduleAssignment,
    ) -> impl Future<Output = Result<ScheduleAssignment, CoreError>> + Send;

    /// Overwrite the record with the same id. `None` if it no longer exists.
    fn update(
        &self,
        assignment: &ScheduleAssignment,
    ) -> impl Future<Output = Result<Option<ScheduleAssignment>, CoreError>> + Send;

    /// Returns `true` if a record was removed.
    fn delete(&self, id: &EntityId) -> impl Future<Output = Result<bool, CoreError>> + Send;

    fn count(&self, filter: &AssignmentFilter)
        -> impl Future<Output = Result<u64, CoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

/// Weekly teaching load of an instructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub total_assignments: usize,
    pub total_hours: f64,
    pub max_hours_per_week: Option<i32>,
    pub over_limit: bool,
}

/// Sum slot lengths into weekly hours and compare with the instructor's cap.
pub fn weekly_workload(assignments: &[ScheduleAssignment], max_hours: Option<i32>) -> Workload {
    let minutes: u32 = assignments
        .iter()
        .map(|a| u32::from(a.slot.duration_minutes()))
        .sum();
    let total_hours = f64::from(minutes) / 60.0;
    Workload {
        total_assignments: assignments.len(),
        total_hours,
        max_hours_per_week: max_hours,
        over_limit: max_hours.is_some_and(|cap| total_hours > f64::from(cap)),
    }
}
