//! Ad hoc room requests from instructors and their approval funnel.
//!
//! A request is checked only against other *approved* requests for the same
//! room, never against published schedule assignments. The conflict flag is
//! computed when the request is created and again when it is approved;
//! nothing else recomputes it.

use std::fmt;
use std::future::Future;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{require_course, require_instructor, require_room, ResourceDirectory};
use crate::error::CoreError;
use crate::term::{self, Semester};
use crate::time_range::{times_overlap, ClockTime, DayOfWeek, TimeRange};
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const REQUEST_PENDING: &str = "pending";
pub const REQUEST_UNDER_REVIEW: &str = "under_review";
pub const REQUEST_APPROVED: &str = "approved";
pub const REQUEST_REJECTED: &str = "rejected";

pub const VALID_REQUEST_STATUSES: &[&str] = &[
    REQUEST_PENDING,
    REQUEST_UNDER_REVIEW,
    REQUEST_APPROVED,
    REQUEST_REJECTED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim() {
            REQUEST_PENDING => Ok(Self::Pending),
            REQUEST_UNDER_REVIEW => Ok(Self::UnderReview),
            REQUEST_APPROVED => Ok(Self::Approved),
            REQUEST_REJECTED => Ok(Self::Rejected),
            other => Err(format!(
                "Invalid request status '{other}'. Must be one of: {}",
                VALID_REQUEST_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => REQUEST_PENDING,
            Self::UnderReview => REQUEST_UNDER_REVIEW,
            Self::Approved => REQUEST_APPROVED,
            Self::Rejected => REQUEST_REJECTED,
        }
    }

    /// `approved` and `rejected` are terminal.
    pub fn valid_transitions(&self) -> &'static [RequestStatus] {
        match self {
            Self::Pending => &[Self::UnderReview, Self::Approved, Self::Rejected],
            Self::UnderReview => &[Self::Pending, Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    pub fn can_transition(&self, to: RequestStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn validate_transition(&self, to: RequestStatus) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid request transition: {} -> {}",
                self.as_str(),
                to.as_str()
            ))
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    RoomChange,
    TimeChange,
    ScheduleConflict,
}

impl RequestType {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim() {
            "room_change" => Ok(Self::RoomChange),
            "time_change" => Ok(Self::TimeChange),
            "schedule_conflict" => Ok(Self::ScheduleConflict),
            other => Err(format!(
                "Invalid requestType '{other}'. Must be one of: room_change, time_change, schedule_conflict"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomChange => "room_change",
            Self::TimeChange => "time_change",
            Self::ScheduleConflict => "schedule_conflict",
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub id: EntityId,
    pub instructor_id: EntityId,
    pub course_id: Option<EntityId>,
    pub schedule_id: Option<EntityId>,
    pub room_id: EntityId,
    pub request_type: RequestType,
    /// Set for one-off bookings; the weekday in `slot` is derived from it.
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub slot: TimeRange,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
    pub purpose: String,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub conflict_flag: bool,
    pub conflicts: Vec<String>,
    pub instructor_name: String,
    pub room_name: String,
    pub building: String,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
}

/// When and where a request wants the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub room_id: EntityId,
    pub date: Option<NaiveDate>,
    pub slot: TimeRange,
}

impl Booking {
    /// Same room, overlapping times, same occasion. Two dated bookings must
    /// share the date; otherwise the weekday decides.
    pub fn collides_with(&self, other: &Booking) -> bool {
        if self.room_id != other.room_id || !times_overlap(&self.slot, &other.slot) {
            return false;
        }
        match (self.date, other.date) {
            (Some(a), Some(b)) => a == b,
            _ => self.slot.day_of_week == other.slot.day_of_week,
        }
    }

    /// `"2024-10-07 09:00-10:00"` for dated bookings, `"Monday 09:00-10:00"`
    /// otherwise.
    pub fn occasion_label(&self) -> String {
        match self.date {
            Some(date) => format!("{date} {}", self.slot.span_label()),
            None => self.slot.to_string(),
        }
    }
}

impl ScheduleRequest {
    pub fn booking(&self) -> Booking {
        Booking {
            room_id: self.room_id.clone(),
            date: self.date,
            slot: self.slot,
        }
    }
}

/// Messages for every approved request `booking` collides with.
pub fn request_collisions(
    booking: &Booking,
    approved: &[ScheduleRequest],
    exclude_id: Option<&EntityId>,
) -> Vec<String> {
    approved
        .iter()
        .filter(|r| exclude_id != Some(&r.id) && r.status == RequestStatus::Approved)
        .map(|r| (r, r.booking()))
        .filter(|(_, other)| booking.collides_with(other))
        .map(|(r, other)| {
            format!(
                "Room already approved for another request: {} ({})",
                r.purpose,
                other.occasion_label()
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInput {
    pub instructor_id: Option<String>,
    pub course_id: Option<String>,
    pub schedule_id: Option<String>,
    pub room_id: Option<String>,
    pub request_type: Option<String>,
    pub date: Option<String>,
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub semester: Option<String>,
    #[serde(default, deserialize_with = "crate::term::deserialize_year")]
    pub year: Option<i32>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
}

/// A request payload that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub instructor_id: EntityId,
    pub course_id: Option<EntityId>,
    pub schedule_id: Option<EntityId>,
    pub request_type: RequestType,
    pub booking: Booking,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
    pub purpose: String,
    pub notes: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn collect<T>(errors: &mut Vec<String>, result: Result<T, String>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

fn id_field(errors: &mut Vec<String>, field: &str, raw: Option<&str>) -> Option<EntityId> {
    let raw = raw?;
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

impl RequestInput {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if present(&self.instructor_id).is_none() {
            missing.push("instructorId");
        }
        if present(&self.room_id).is_none() {
            missing.push("roomId");
        }
        if present(&self.date).is_none() && present(&self.day_of_week).is_none() {
            missing.push("date or dayOfWeek");
        }
        if present(&self.start_time).is_none() {
            missing.push("startTime");
        }
        if present(&self.end_time).is_none() {
            missing.push("endTime");
        }
        if present(&self.purpose).is_none() {
            missing.push("purpose");
        }
        missing
    }

    pub fn to_draft(&self) -> Result<RequestDraft, CoreError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut errors = Vec::new();
        let instructor_id = id_field(&mut errors, "instructorId", present(&self.instructor_id));
        let room_id = id_field(&mut errors, "roomId", present(&self.room_id));
        let course_id = id_field(&mut errors, "courseId", present(&self.course_id));
        let schedule_id = id_field(&mut errors, "scheduleId", present(&self.schedule_id));

        let request_type = match present(&self.request_type) {
            Some(raw) => collect(&mut errors, RequestType::parse(raw)),
            None => Some(RequestType::default()),
        };

        let date = present(&self.date).and_then(|raw| {
            collect(
                &mut errors,
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| format!("'{raw}' is not a valid date: expected YYYY-MM-DD")),
            )
        });
        let named_day = present(&self.day_of_week)
            .and_then(|raw| collect(&mut errors, DayOfWeek::parse(raw)));
        let day = match (date, named_day) {
            (Some(date), named) => match DayOfWeek::from_date(date) {
                Some(derived) if named.is_none_or(|n| n == derived) => Some(derived),
                Some(derived) => {
                    errors.push(format!("dayOfWeek does not match date {date} ({derived})"));
                    None
                }
                None => {
                    errors.push(format!("{date} falls on a Sunday, which is not a scheduling day"));
                    None
                }
            },
            (None, named) => named,
        };

        let start = present(&self.start_time)
            .and_then(|raw| collect(&mut errors, ClockTime::parse(raw)));
        let end = present(&self.end_time)
            .and_then(|raw| collect(&mut errors, ClockTime::parse(raw)));
        let slot = match (day, start, end) {
            (Some(day), Some(start), Some(end)) => {
                collect(&mut errors, TimeRange::new(day, start, end))
            }
            _ => None,
        };

        let semester = match present(&self.semester) {
            Some(raw) => collect(&mut errors, Semester::parse(raw)),
            None => date.map(Semester::from_date),
        };
        let year = match self.year {
            Some(y) => collect(&mut errors, term::validate_year(y)),
            None => date.map(|d| chrono::Datelike::year(&d)),
        };

        let (Some(instructor_id), Some(room_id), Some(request_type), Some(slot)) =
            (instructor_id, room_id, request_type, slot)
        else {
            if errors.is_empty() {
                errors.push("Incomplete request data".to_string());
            }
            return Err(CoreError::Validation(errors.join("; ")));
        };
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors.join("; ")));
        }

        Ok(RequestDraft {
            instructor_id,
            course_id,
            schedule_id,
            request_type,
            booking: Booking {
                room_id,
                date,
                slot,
            },
            semester,
            year,
            purpose: present(&self.purpose).unwrap_or_default().to_string(),
            notes: present(&self.notes).map(str::to_string),
        })
    }
}

/// Payload of a status change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub instructor_id: Option<EntityId>,
}

impl RequestFilter {
    pub fn matches(&self, r: &ScheduleRequest) -> bool {
        self.status.is_none_or(|s| s == r.status)
            && self
                .instructor_id
                .as_ref()
                .is_none_or(|id| *id == r.instructor_id)
    }
}

pub trait RequestStore: Send + Sync {
    fn find_request(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<ScheduleRequest>, CoreError>> + Send;

    /// Matching requests, newest first.
    fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> impl Future<Output = Result<Vec<ScheduleRequest>, CoreError>> + Send;

    /// Approved requests for `room_id`, excluding `exclude_id`.
    fn approved_for_room(
        &self,
        room_id: &EntityId,
        exclude_id: Option<&EntityId>,
    ) -> impl Future<Output = Result<Vec<ScheduleRequest>, CoreError>> + Send;

    fn insert_request(
        &self,
        request: &ScheduleRequest,
    ) -> impl Future<Output = Result<ScheduleRequest, CoreError>> + Send;

    fn update_request(
        &self,
        request: &ScheduleRequest,
    ) -> impl Future<Output = Result<Option<ScheduleRequest>, CoreError>> + Send;

    fn delete_request(&self, id: &EntityId) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

pub trait RequestBackend: RequestStore + ResourceDirectory {}

impl<T> RequestBackend for T where T: RequestStore + ResourceDirectory {}

pub struct RequestWorkflow<B> {
    backend: B,
}

impl<B: RequestBackend> RequestWorkflow<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Collisions against currently approved requests. A failed scan flags
    /// the request rather than clearing it.
    async fn collisions(&self, booking: &Booking, exclude_id: Option<&EntityId>) -> Vec<String> {
        match self.backend.approved_for_room(&booking.room_id, exclude_id).await {
            Ok(approved) => request_collisions(booking, &approved, exclude_id),
            Err(err) => {
                tracing::warn!(
                    room_id = %booking.room_id,
                    error = %err,
                    "Request conflict scan failed"
                );
                vec!["Room request conflict check failed".to_string()]
            }
        }
    }

    pub async fn create(&self, input: &RequestInput) -> Result<ScheduleRequest, CoreError> {
        let draft = input.to_draft()?;
        let (instructor, room, course) = tokio::try_join!(
            require_instructor(&self.backend, &draft.instructor_id),
            require_room(&self.backend, &draft.booking.room_id),
            async {
                match &draft.course_id {
                    Some(id) => require_course(&self.backend, id).await.map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let conflicts = self.collisions(&draft.booking, None).await;
        let now = Utc::now();
        let request = ScheduleRequest {
            id: EntityId::generate(),
            instructor_id: draft.instructor_id,
            course_id: draft.course_id,
            schedule_id: draft.schedule_id,
            room_id: draft.booking.room_id,
            request_type: draft.request_type,
            date: draft.booking.date,
            slot: draft.booking.slot,
            semester: draft.semester,
            year: draft.year,
            purpose: draft.purpose,
            notes: draft.notes,
            status: RequestStatus::Pending,
            conflict_flag: !conflicts.is_empty(),
            conflicts,
            instructor_name: instructor.display_name().to_string(),
            room_name: room.name,
            building: room.building,
            course_code: course.as_ref().map(|c| c.code.clone()),
            course_name: course.map(|c| c.name),
            created_at: now,
            updated_at: now,
            reviewed_at: None,
        };

        let saved = self.backend.insert_request(&request).await?;
        tracing::info!(
            request_id = %saved.id,
            room_id = %saved.room_id,
            conflict_flag = saved.conflict_flag,
            "Schedule request created"
        );
        Ok(saved)
    }

    /// Move a request along its state machine. Approval recomputes the
    /// conflict flag but does not block on it.
    pub async fn update_status(
        &self,
        id: &EntityId,
        update: &StatusUpdate,
    ) -> Result<ScheduleRequest, CoreError> {
        let to = RequestStatus::parse(&update.status).map_err(CoreError::Validation)?;
        let mut request = self.get(id).await?;
        request
            .status
            .validate_transition(to)
            .map_err(CoreError::Validation)?;

        if to == RequestStatus::Approved {
            request.conflicts = self.collisions(&request.booking(), Some(id)).await;
            request.conflict_flag = !request.conflicts.is_empty();
        }

        let now = Utc::now();
        let from = request.status;
        request.status = to;
        if let Some(notes) = update.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            request.notes = Some(notes.to_string());
        }
        if matches!(to, RequestStatus::Approved | RequestStatus::Rejected) {
            request.reviewed_at = Some(now);
        }
        request.updated_at = now;

        let saved = self
            .backend
            .update_request(&request)
            .await?
            .ok_or_else(|| CoreError::not_found("ScheduleRequest", id))?;
        tracing::info!(
            request_id = %id,
            from = from.as_str(),
            to = to.as_str(),
            conflict_flag = saved.conflict_flag,
            "Schedule request status changed"
        );
        Ok(saved)
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        if !self.backend.delete_request(id).await? {
            return Err(CoreError::not_found("ScheduleRequest", id));
        }
        tracing::info!(request_id = %id, "Schedule request deleted");
        Ok(())
    }

    pub async fn get(&self, id: &EntityId) -> Result<ScheduleRequest, CoreError> {
        self.backend
            .find_request(id)
            .await?
            .ok_or_else(|| CoreError::not_found("ScheduleRequest", id))
    }

    pub async fn list(&self, filter: &RequestFilter) -> Result<Vec<ScheduleRequest>, CoreError> {
        self.backend.list_requests(filter).await
    }
}
