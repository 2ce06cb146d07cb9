//! PostgreSQL implementation of the engine's store traits.

use timetable_core::assignment::{AssignmentFilter, AssignmentStore, ScheduleAssignment};
use timetable_core::directory::{CourseRef, InstructorRef, ResourceDirectory, RoomRef};
use timetable_core::error::CoreError;
use timetable_core::policy::{SchedulingSettings, SettingsProvider};
use timetable_core::schedule_request::{RequestFilter, RequestStore, ScheduleRequest};
use timetable_core::types::EntityId;

use crate::models::setting::SCHEDULING_KEY;
use crate::repositories::{
    CourseRepo, InstructorRepo, RoomRepo, ScheduleRepo, ScheduleRequestRepo, SettingsRepo,
};
use crate::DbPool;

fn storage(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl AssignmentStore for PgStore {
    async fn find(&self, filter: &AssignmentFilter) -> Result<Vec<ScheduleAssignment>, CoreError> {
        ScheduleRepo::find(&self.pool, filter)
            .await
            .map_err(storage)?
            .into_iter()
            .map(|row| row.into_domain())
            .collect()
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<ScheduleAssignment>, CoreError> {
        ScheduleRepo::find_by_id(&self.pool, id.as_str())
            .await
            .map_err(storage)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn insert(
        &self,
        assignment: &ScheduleAssignment,
    ) -> Result<ScheduleAssignment, CoreError> {
        ScheduleRepo::create(&self.pool, assignment)
            .await
            .map_err(storage)?
            .into_domain()
    }

    async fn update(
        &self,
        assignment: &ScheduleAssignment,
    ) -> Result<Option<ScheduleAssignment>, CoreError> {
        ScheduleRepo::update(&self.pool, assignment)
            .await
            .map_err(storage)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn delete(&self, id: &EntityId) -> Result<bool, CoreError> {
        ScheduleRepo::delete(&self.pool, id.as_str())
            .await
            .map_err(storage)
    }

    async fn count(&self, filter: &AssignmentFilter) -> Result<u64, CoreError> {
        let n = ScheduleRepo::count(&self.pool, filter)
            .await
            .map_err(storage)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

impl ResourceDirectory for PgStore {
    async fn find_course(&self, id: &EntityId) -> Result<Option<CourseRef>, CoreError> {
        CourseRepo::find_by_id(&self.pool, id.as_str())
            .await
            .map_err(storage)?
            .map(|row| row.into_ref())
            .transpose()
    }

    async fn find_instructor(&self, id: &EntityId) -> Result<Option<InstructorRef>, CoreError> {
        InstructorRepo::find_by_id(&self.pool, id.as_str())
            .await
            .map_err(storage)?
            .map(|row| row.into_ref())
            .transpose()
    }

    async fn find_room(&self, id: &EntityId) -> Result<Option<RoomRef>, CoreError> {
        RoomRepo::find_by_id(&self.pool, id.as_str())
            .await
            .map_err(storage)?
            .map(|row| row.into_ref())
            .transpose()
    }
}

impl SettingsProvider for PgStore {
    /// Defaults when no section has been saved. A stored document that no
    /// longer deserializes is a storage error.
    async fn scheduling_settings(&self) -> Result<SchedulingSettings, CoreError> {
        match SettingsRepo::get(&self.pool, SCHEDULING_KEY)
            .await
            .map_err(storage)?
        {
            Some(row) => serde_json::from_value(row.value).map_err(|e| {
                CoreError::Storage(format!("Corrupt {SCHEDULING_KEY} settings: {e}"))
            }),
            None => Ok(SchedulingSettings::default()),
        }
    }

    async fn save_scheduling_settings(
        &self,
        settings: &SchedulingSettings,
    ) -> Result<SchedulingSettings, CoreError> {
        let value =
            serde_json::to_value(settings).map_err(|e| CoreError::Internal(e.to_string()))?;
        let row = SettingsRepo::upsert(&self.pool, SCHEDULING_KEY, &value)
            .await
            .map_err(storage)?;
        serde_json::from_value(row.value).map_err(|e| CoreError::Internal(e.to_string()))
    }
}

impl RequestStore for PgStore {
    async fn find_request(&self, id: &EntityId) -> Result<Option<ScheduleRequest>, CoreError> {
        ScheduleRequestRepo::find_by_id(&self.pool, id.as_str())
            .await
            .map_err(storage)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ScheduleRequest>, CoreError> {
        ScheduleRequestRepo::list(&self.pool, filter)
            .await
            .map_err(storage)?
            .into_iter()
            .map(|row| row.into_domain())
            .collect()
    }

    async fn approved_for_room(
        &self,
        room_id: &EntityId,
        exclude_id: Option<&EntityId>,
    ) -> Result<Vec<ScheduleRequest>, CoreError> {
        ScheduleRequestRepo::approved_for_room(
            &self.pool,
            room_id.as_str(),
            exclude_id.map(|id| id.as_str()),
        )
        .await
        .map_err(storage)?
        .into_iter()
        .map(|row| row.into_domain())
        .collect()
    }

    async fn insert_request(
        &self,
        request: &ScheduleRequest,
    ) -> Result<ScheduleRequest, CoreError> {
        ScheduleRequestRepo::create(&self.pool, request)
            .await
            .map_err(storage)?
            .into_domain()
    }

    async fn update_request(
        &self,
        request: &ScheduleRequest,
    ) -> Result<Option<ScheduleRequest>, CoreError> {
        ScheduleRequestRepo::update_review(&self.pool, request)
            .await
            .map_err(storage)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn delete_request(&self, id: &EntityId) -> Result<bool, CoreError> {
        ScheduleRequestRepo::delete(&self.pool, id.as_str())
            .await
            .map_err(storage)
    }
}
