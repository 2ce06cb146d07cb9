//! Conflict detection for schedule assignments.
//!
//! [`detect_conflicts`] is pure: it takes the candidate, the assignments
//! already in the store and the policy, and reports every collision as a
//! human-readable message. Fetching the existing set and handling scan
//! failures belongs to the manager.

use serde::Serialize;

use crate::assignment::{Candidate, ScheduleAssignment};
use crate::policy::ConflictPolicy;
use crate::types::EntityId;

/// Course code shown when a colliding record carries none.
pub const UNKNOWN_COURSE: &str = "Unknown Course";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Identical course, instructor, room, slot and term.
    Duplicate,
    Room,
    Instructor,
    /// The course already has other entries in the same term.
    CourseTerm,
    /// A store scan failed, so the check could not clear the candidate.
    CheckFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,
    /// Records the candidate collided with, in report order.
    pub with: Vec<EntityId>,
}

impl Conflict {
    pub fn check_failed(check: &str) -> Self {
        Self {
            kind: ConflictKind::CheckFailed,
            message: format!("{check} conflict check failed"),
            with: Vec::new(),
        }
    }
}

/// Accumulated result of one conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// The only condition that blocks a write outright.
    pub fn is_duplicate(&self) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.kind == ConflictKind::Duplicate)
    }

    pub fn messages(&self) -> Vec<String> {
        self.conflicts.iter().map(|c| c.message.clone()).collect()
    }

    pub fn push(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
    }
}

fn course_code(a: &ScheduleAssignment) -> &str {
    if a.course_code.trim().is_empty() {
        UNKNOWN_COURSE
    } else {
        &a.course_code
    }
}

/// `"CS101 (09:00-10:30), MA201 (10:00-11:00)"`
fn list_by_time(matches: &[&ScheduleAssignment]) -> String {
    matches
        .iter()
        .map(|a| format!("{} ({})", course_code(a), a.slot.span_label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"Monday (09:00-10:30), Wednesday (09:00-10:30)"`
fn list_by_day(matches: &[&ScheduleAssignment]) -> String {
    matches
        .iter()
        .map(|a| format!("{} ({})", a.slot.day_of_week, a.slot.span_label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn ids(matches: &[&ScheduleAssignment]) -> Vec<EntityId> {
    matches.iter().map(|a| a.id.clone()).collect()
}

/// Compute the conflicts `candidate` would have against `existing`.
///
/// Order of checks: kill-switch, exact duplicate, room, instructor (unless
/// overlapping classes are allowed), course-term. Records identical to the
/// candidate are reported once as a duplicate and not again by the
/// resource checks. `exclude_id` drops the record being updated.
pub fn detect_conflicts(
    candidate: &Candidate,
    existing: &[ScheduleAssignment],
    policy: ConflictPolicy,
    exclude_id: Option<&EntityId>,
) -> ConflictReport {
    let mut report = ConflictReport::default();
    if !policy.auto_conflict_detection {
        return report;
    }

    let term = candidate.term();
    let others: Vec<&ScheduleAssignment> = existing
        .iter()
        .filter(|a| exclude_id != Some(&a.id))
        .collect();

    if let Some(dup) = others.iter().find(|a| candidate.is_identical_to(a)) {
        report.push(Conflict {
            kind: ConflictKind::Duplicate,
            message: format!(
                "Duplicate schedule found: {} is already scheduled in {} ({}) at the same time slot ({}) in {}",
                course_code(dup),
                dup.room_name,
                dup.building,
                dup.slot,
                term
            ),
            with: vec![dup.id.clone()],
        });
    }

    let distinct: Vec<&ScheduleAssignment> = others
        .into_iter()
        .filter(|a| !candidate.is_identical_to(a) && a.term() == term)
        .collect();

    let room: Vec<&ScheduleAssignment> = distinct
        .iter()
        .copied()
        .filter(|a| a.room_id == candidate.room_id && a.slot.overlaps(&candidate.slot))
        .collect();
    if !room.is_empty() {
        report.push(Conflict {
            kind: ConflictKind::Room,
            message: format!(
                "Room is already booked during this time: {}",
                list_by_time(&room)
            ),
            with: ids(&room),
        });
    }

    if !policy.allow_overlapping_classes {
        let instructor: Vec<&ScheduleAssignment> = distinct
            .iter()
            .copied()
            .filter(|a| {
                a.instructor_id == candidate.instructor_id && a.slot.overlaps(&candidate.slot)
            })
            .collect();
        if !instructor.is_empty() {
            report.push(Conflict {
                kind: ConflictKind::Instructor,
                message: format!(
                    "Instructor has another class during this time: {}",
                    list_by_time(&instructor)
                ),
                with: ids(&instructor),
            });
        }
    }

    let course: Vec<&ScheduleAssignment> = distinct
        .iter()
        .copied()
        .filter(|a| a.course_id == candidate.course_id)
        .collect();
    if let Some(first) = course.first() {
        report.push(Conflict {
            kind: ConflictKind::CourseTerm,
            message: format!(
                "Course {} is already scheduled in {} on: {}",
                course_code(first),
                term,
                list_by_day(&course)
            ),
            with: ids(&course),
        });
    }

    report
}
