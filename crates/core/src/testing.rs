//! In-memory backend implementing every store seam, for engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::assignment::{AssignmentFilter, AssignmentStore, ScheduleAssignment};
use crate::directory::{CourseRef, InstructorRef, ResourceDirectory, RoomRef};
use crate::error::CoreError;
use crate::policy::{SchedulingSettings, SettingsProvider};
use crate::schedule_request::{RequestFilter, RequestStatus, RequestStore, ScheduleRequest};
use crate::types::EntityId;

#[derive(Default)]
struct State {
    labels: HashMap<String, EntityId>,
    courses: HashMap<EntityId, CourseRef>,
    instructors: HashMap<EntityId, InstructorRef>,
    rooms: HashMap<EntityId, RoomRef>,
    assignments: Vec<ScheduleAssignment>,
    requests: Vec<ScheduleRequest>,
    settings: SchedulingSettings,
    fail_scans: bool,
    fail_settings: bool,
}

/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    fn label(&self, kind: &str, label: &str) -> EntityId {
        self.with(|s| s.labels[&format!("{kind}:{label}")].clone())
    }

    pub fn course_id(&self, label: &str) -> EntityId {
        self.label("course", label)
    }

    pub fn instructor_id(&self, label: &str) -> EntityId {
        self.label("instructor", label)
    }

    pub fn room_id(&self, label: &str) -> EntityId {
        self.label("room", label)
    }

    /// Course whose code is `code`.
    pub fn add_course(&self, code: &str, name: &str) -> EntityId {
        let id = EntityId::generate();
        self.with(|s| {
            s.labels.insert(format!("course:{code}"), id.clone());
            s.courses.insert(
                id.clone(),
                CourseRef {
                    id: id.clone(),
                    code: code.into(),
                    name: name.into(),
                },
            );
        });
        id
    }

    /// Instructor whose display name is `name`.
    pub fn add_instructor(&self, name: &str, max_hours_per_week: Option<i32>) -> EntityId {
        let id = EntityId::generate();
        self.with(|s| {
            s.labels.insert(format!("instructor:{name}"), id.clone());
            s.instructors.insert(
                id.clone(),
                InstructorRef {
                    id: id.clone(),
                    name: Some(name.into()),
                    max_hours_per_week,
                },
            );
        });
        id
    }

    /// Room whose name is `name`.
    pub fn add_room(&self, name: &str, building: &str) -> EntityId {
        let id = EntityId::generate();
        self.with(|s| {
            s.labels.insert(format!("room:{name}"), id.clone());
            s.rooms.insert(
                id.clone(),
                RoomRef {
                    id: id.clone(),
                    name: name.into(),
                    building: building.into(),
                },
            );
        });
        id
    }

    pub fn rename_course(&self, label: &str, code: &str, name: &str) {
        let id = self.course_id(label);
        self.with(|s| {
            if let Some(course) = s.courses.get_mut(&id) {
                course.code = code.into();
                course.name = name.into();
            }
        });
    }

    pub fn set_policy(&self, auto_conflict_detection: bool, allow_overlapping_classes: bool) {
        self.with(|s| {
            s.settings.auto_conflict_detection = auto_conflict_detection;
            s.settings.allow_overlapping_classes = allow_overlapping_classes;
        });
    }

    pub fn fail_scans(&self, fail: bool) {
        self.with(|s| s.fail_scans = fail);
    }

    pub fn fail_settings(&self, fail: bool) {
        self.with(|s| s.fail_settings = fail);
    }

    pub fn assignment_count(&self) -> usize {
        self.with(|s| s.assignments.len())
    }
}

impl AssignmentStore for MemoryBackend {
    async fn find(&self, filter: &AssignmentFilter) -> Result<Vec<ScheduleAssignment>, CoreError> {
        self.with(|s| {
            if s.fail_scans {
                return Err(CoreError::Storage("scan failed".into()));
            }
            let mut rows: Vec<ScheduleAssignment> = s
                .assignments
                .iter()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect();
            rows.sort_by_key(|a| (a.slot.day_of_week, a.slot.start_time));
            Ok(rows)
        })
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<ScheduleAssignment>, CoreError> {
        Ok(self.with(|s| s.assignments.iter().find(|a| a.id == *id).cloned()))
    }

    async fn insert(
        &self,
        assignment: &ScheduleAssignment,
    ) -> Result<ScheduleAssignment, CoreError> {
        self.with(|s| s.assignments.push(assignment.clone()));
        Ok(assignment.clone())
    }

    async fn update(
        &self,
        assignment: &ScheduleAssignment,
    ) -> Result<Option<ScheduleAssignment>, CoreError> {
        Ok(self.with(|s| {
            let slot = s.assignments.iter_mut().find(|a| a.id == assignment.id)?;
            *slot = assignment.clone();
            Some(assignment.clone())
        }))
    }

    async fn delete(&self, id: &EntityId) -> Result<bool, CoreError> {
        Ok(self.with(|s| {
            let before = s.assignments.len();
            s.assignments.retain(|a| a.id != *id);
            s.assignments.len() != before
        }))
    }

    async fn count(&self, filter: &AssignmentFilter) -> Result<u64, CoreError> {
        Ok(self.with(|s| s.assignments.iter().filter(|a| filter.matches(a)).count() as u64))
    }
}

impl ResourceDirectory for MemoryBackend {
    async fn find_course(&self, id: &EntityId) -> Result<Option<CourseRef>, CoreError> {
        Ok(self.with(|s| s.courses.get(id).cloned()))
    }

    async fn find_instructor(&self, id: &EntityId) -> Result<Option<InstructorRef>, CoreError> {
        Ok(self.with(|s| s.instructors.get(id).cloned()))
    }

    async fn find_room(&self, id: &EntityId) -> Result<Option<RoomRef>, CoreError> {
        Ok(self.with(|s| s.rooms.get(id).cloned()))
    }
}

impl SettingsProvider for MemoryBackend {
    async fn scheduling_settings(&self) -> Result<SchedulingSettings, CoreError> {
        self.with(|s| {
            if s.fail_settings {
                Err(CoreError::Storage("settings unavailable".into()))
            } else {
                Ok(s.settings.clone())
            }
        })
    }

    async fn save_scheduling_settings(
        &self,
        settings: &SchedulingSettings,
    ) -> Result<SchedulingSettings, CoreError> {
        self.with(|s| s.settings = settings.clone());
        Ok(settings.clone())
    }
}

impl RequestStore for MemoryBackend {
    async fn find_request(&self, id: &EntityId) -> Result<Option<ScheduleRequest>, CoreError> {
        Ok(self.with(|s| s.requests.iter().find(|r| r.id == *id).cloned()))
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ScheduleRequest>, CoreError> {
        Ok(self.with(|s| {
            s.requests
                .iter()
                .rev()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect()
        }))
    }

    async fn approved_for_room(
        &self,
        room_id: &EntityId,
        exclude_id: Option<&EntityId>,
    ) -> Result<Vec<ScheduleRequest>, CoreError> {
        Ok(self.with(|s| {
            s.requests
                .iter()
                .filter(|r| {
                    r.room_id == *room_id
                        && r.status == RequestStatus::Approved
                        && exclude_id != Some(&r.id)
                })
                .cloned()
                .collect()
        }))
    }

    async fn insert_request(
        &self,
        request: &ScheduleRequest,
    ) -> Result<ScheduleRequest, CoreError> {
        self.with(|s| s.requests.push(request.clone()));
        Ok(request.clone())
    }

    async fn update_request(
        &self,
        request: &ScheduleRequest,
    ) -> Result<Option<ScheduleRequest>, CoreError> {
        Ok(self.with(|s| {
            let slot = s.requests.iter_mut().find(|r| r.id == request.id)?;
            *slot = request.clone();
            Some(request.clone())
        }))
    }

    async fn delete_request(&self, id: &EntityId) -> Result<bool, CoreError> {
        Ok(self.with(|s| {
            let before = s.requests.len();
            s.requests.retain(|r| r.id != *id);
            s.requests.len() != before
        }))
    }
}
