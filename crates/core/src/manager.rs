//! Create, update and delete of schedule assignments.
//!
//! [`ScheduleManager`] owns the write path: validate the payload, resolve
//! every referenced entity, lock the room and instructor, run the conflict
//! check against fresh store scans, then persist with `published` or
//! `conflict` status. An exact duplicate is the only outcome that blocks the
//! write.

use chrono::Utc;
use serde::Serialize;

use crate::assignment::{
    weekly_workload, AssignmentFilter, AssignmentInput, AssignmentStatus, AssignmentStore,
    Candidate, ScheduleAssignment, Workload,
};
use crate::conflict::{detect_conflicts, Conflict, ConflictReport};
use crate::directory::{require_course, require_instructor, require_room, ResourceDirectory};
use crate::error::CoreError;
use crate::locks::KeyedLocks;
use crate::policy::{load_policy, SettingsProvider};
use crate::term::{academic_year_label, Semester};
use crate::types::EntityId;

/// Everything the manager needs from the outside world.
pub trait ScheduleBackend: AssignmentStore + ResourceDirectory + SettingsProvider {}

impl<T> ScheduleBackend for T where T: AssignmentStore + ResourceDirectory + SettingsProvider {}

/// Result of a successful create or update.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub schedule: ScheduleAssignment,
    pub conflicts: Vec<String>,
}

impl ScheduleOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Published/conflict counts for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub published: u64,
    pub conflict: u64,
    pub total: u64,
}

pub struct ScheduleManager<B> {
    backend: B,
    locks: KeyedLocks,
}

impl<B: ScheduleBackend> ScheduleManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            locks: KeyedLocks::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // -----------------------------------------------------------------------
    // Conflict check
    // -----------------------------------------------------------------------

    /// Run the full conflict check for `candidate` against the store.
    ///
    /// The policy is read fresh. Each scan that fails is reported as a
    /// check-failed conflict instead of being treated as clear.
    pub async fn check(
        &self,
        candidate: &Candidate,
        exclude_id: Option<&EntityId>,
    ) -> ConflictReport {
        let policy = load_policy(&self.backend).await;
        if !policy.auto_conflict_detection {
            return ConflictReport::default();
        }

        let room_filter = AssignmentFilter::room_slot(candidate, exclude_id);
        let instructor_filter = AssignmentFilter::instructor_slot(candidate, exclude_id);
        let course_filter = AssignmentFilter::course_term(candidate, exclude_id);

        let (room, instructor, course) = tokio::join!(
            self.backend.find(&room_filter),
            async {
                if policy.allow_overlapping_classes {
                    Ok(Vec::new())
                } else {
                    self.backend.find(&instructor_filter).await
                }
            },
            self.backend.find(&course_filter),
        );

        let mut existing: Vec<ScheduleAssignment> = Vec::new();
        let mut failed = Vec::new();
        for (check, scan) in [("Room", room), ("Instructor", instructor), ("Course", course)] {
            match scan {
                Ok(rows) => {
                    for row in rows {
                        if !existing.iter().any(|e| e.id == row.id) {
                            existing.push(row);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(check = check, error = %err, "Conflict scan failed");
                    failed.push(check);
                }
            }
        }
        existing.sort_by_key(|a| (a.slot.day_of_week, a.slot.start_time));

        let mut report = detect_conflicts(candidate, &existing, policy, exclude_id);
        for check in failed {
            report.push(Conflict::check_failed(check));
        }
        report
    }

    /// Validate and check a payload without writing anything.
    pub async fn preview(&self, input: &AssignmentInput) -> Result<ConflictReport, CoreError> {
        let candidate = input.to_candidate()?;
        tokio::try_join!(
            require_course(&self.backend, &candidate.course_id),
            require_instructor(&self.backend, &candidate.instructor_id),
            require_room(&self.backend, &candidate.room_id),
        )?;
        Ok(self.check(&candidate, None).await)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub async fn create(&self, input: &AssignmentInput) -> Result<ScheduleOutcome, CoreError> {
        let candidate = input.to_candidate()?;
        let (course, instructor, room) = tokio::try_join!(
            require_course(&self.backend, &candidate.course_id),
            require_instructor(&self.backend, &candidate.instructor_id),
            require_room(&self.backend, &candidate.room_id),
        )?;

        let _guard = self.locks.acquire(candidate.lock_keys()).await;

        let report = self.check(&candidate, None).await;
        if report.is_duplicate() {
            tracing::info!(
                course_id = %candidate.course_id,
                room_id = %candidate.room_id,
                "Rejected duplicate schedule"
            );
            return Err(CoreError::DuplicateAssignment {
                conflicts: report.messages(),
            });
        }

        let status = AssignmentStatus::after_check(report.has_conflicts());
        AssignmentStatus::Draft
            .validate_transition(status)
            .map_err(CoreError::Internal)?;

        let now = Utc::now();
        let assignment = ScheduleAssignment {
            id: EntityId::generate(),
            course_id: candidate.course_id.clone(),
            instructor_id: candidate.instructor_id.clone(),
            room_id: candidate.room_id.clone(),
            slot: candidate.slot,
            semester: candidate.semester,
            year: candidate.year,
            academic_year: academic_year_label(candidate.year),
            status,
            conflicts: report.messages(),
            course_code: course.code,
            course_name: course.name,
            instructor_name: instructor.display_name().to_string(),
            room_name: room.name,
            building: room.building,
            created_at: now,
            updated_at: now,
        };

        let saved = self.backend.insert(&assignment).await?;
        tracing::info!(
            schedule_id = %saved.id,
            status = saved.status.as_str(),
            conflicts = saved.conflicts.len(),
            "Schedule created"
        );

        Ok(ScheduleOutcome {
            conflicts: saved.conflicts.clone(),
            schedule: saved,
        })
    }

    /// Merge `input` onto the stored record.
    ///
    /// Without any schedule-relevant field the record is returned untouched,
    /// stored conflicts included. Otherwise only the references whose ids
    /// changed are resolved again and the check excludes the record itself.
    ///
    /// The record key is held from the read through the write, so two
    /// updates to one record merge in turn instead of overwriting each other.
    /// Record keys are always taken before resource keys.
    pub async fn update(
        &self,
        id: &EntityId,
        input: &AssignmentInput,
    ) -> Result<ScheduleOutcome, CoreError> {
        let _record = self.locks.acquire([record_lock_key(id)]).await;
        let existing = self.get(id).await?;
        if !input.touches_schedule() {
            return Ok(ScheduleOutcome {
                conflicts: existing.conflicts.clone(),
                schedule: existing,
            });
        }

        let candidate = input.apply_to(&existing.candidate())?;
        let (course, instructor, room) = tokio::try_join!(
            async {
                if candidate.course_id == existing.course_id {
                    Ok(None)
                } else {
                    require_course(&self.backend, &candidate.course_id).await.map(Some)
                }
            },
            async {
                if candidate.instructor_id == existing.instructor_id {
                    Ok(None)
                } else {
                    require_instructor(&self.backend, &candidate.instructor_id)
                        .await
                        .map(Some)
                }
            },
            async {
                if candidate.room_id == existing.room_id {
                    Ok(None)
                } else {
                    require_room(&self.backend, &candidate.room_id).await.map(Some)
                }
            },
        )?;

        let _guard = self.locks.acquire(candidate.lock_keys()).await;

        let report = self.check(&candidate, Some(id)).await;
        if report.is_duplicate() {
            return Err(CoreError::DuplicateAssignment {
                conflicts: report.messages(),
            });
        }

        let status = AssignmentStatus::after_check(report.has_conflicts());
        existing
            .status
            .validate_transition(status)
            .map_err(CoreError::Validation)?;

        let mut updated = existing;
        updated.course_id = candidate.course_id.clone();
        updated.instructor_id = candidate.instructor_id.clone();
        updated.room_id = candidate.room_id.clone();
        updated.slot = candidate.slot;
        updated.semester = candidate.semester;
        updated.year = candidate.year;
        updated.academic_year = academic_year_label(candidate.year);
        updated.status = status;
        updated.conflicts = report.messages();
        updated.updated_at = Utc::now();
        if let Some(course) = course {
            updated.course_code = course.code;
            updated.course_name = course.name;
        }
        if let Some(instructor) = instructor {
            updated.instructor_name = instructor.display_name().to_string();
        }
        if let Some(room) = room {
            updated.room_name = room.name;
            updated.building = room.building;
        }

        let saved = self
            .backend
            .update(&updated)
            .await?
            .ok_or_else(|| CoreError::not_found("Schedule", id))?;
        tracing::info!(
            schedule_id = %saved.id,
            status = saved.status.as_str(),
            conflicts = saved.conflicts.len(),
            "Schedule updated"
        );

        Ok(ScheduleOutcome {
            conflicts: saved.conflicts.clone(),
            schedule: saved,
        })
    }

    /// Remove the record. Cancelling is modelled as this hard delete.
    pub async fn delete(&self, id: &EntityId) -> Result<ScheduleAssignment, CoreError> {
        let _record = self.locks.acquire([record_lock_key(id)]).await;
        let existing = self.get(id).await?;
        if !self.backend.delete(id).await? {
            return Err(CoreError::not_found("Schedule", id));
        }
        tracing::info!(
            schedule_id = %id,
            course_code = %existing.course_code,
            "Schedule deleted"
        );
        Ok(existing)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn get(&self, id: &EntityId) -> Result<ScheduleAssignment, CoreError> {
        self.backend
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Schedule", id))
    }

    pub async fn list(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<ScheduleAssignment>, CoreError> {
        self.backend.find(filter).await
    }

    /// Weekly hours of an instructor within `filter` (usually a term).
    pub async fn workload(
        &self,
        instructor_id: &EntityId,
        filter: AssignmentFilter,
    ) -> Result<Workload, CoreError> {
        let instructor = require_instructor(&self.backend, instructor_id).await?;
        let filter = AssignmentFilter {
            instructor_id: Some(instructor_id.clone()),
            ..filter
        };
        let assignments = self.backend.find(&filter).await?;
        Ok(weekly_workload(&assignments, instructor.max_hours_per_week))
    }

    pub async fn status_summary(
        &self,
        semester: Option<Semester>,
        year: Option<i32>,
    ) -> Result<StatusSummary, CoreError> {
        let base = AssignmentFilter {
            semester,
            year,
            ..AssignmentFilter::default()
        };
        let published_filter = AssignmentFilter {
            status: Some(AssignmentStatus::Published),
            ..base.clone()
        };
        let conflict_filter = AssignmentFilter {
            status: Some(AssignmentStatus::Conflict),
            ..base.clone()
        };
        let (published, conflict, total) = tokio::try_join!(
            self.backend.count(&published_filter),
            self.backend.count(&conflict_filter),
            self.backend.count(&base),
        )?;
        Ok(StatusSummary {
            published,
            conflict,
            total,
        })
    }
}

fn record_lock_key(id: &EntityId) -> String {
    format!("schedule:{id}")
}
