//! Well-known role name constants.
//!
//! Roles arrive already validated inside the caller's access token; the
//! engine only compares names.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";

/// All roles accepted by the service.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT];

/// Whether `role` may file or withdraw room-booking requests.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_INSTRUCTOR
}
