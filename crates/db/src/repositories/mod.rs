//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod directory_repo;
pub mod schedule_repo;
pub mod schedule_request_repo;
pub mod settings_repo;

pub use directory_repo::{CourseRepo, EnrollmentRepo, InstructorRepo, RoomRepo, StudentRepo};
pub use schedule_repo::ScheduleRepo;
pub use schedule_request_repo::ScheduleRequestRepo;
pub use settings_repo::SettingsRepo;
