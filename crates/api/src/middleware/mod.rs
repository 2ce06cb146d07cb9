//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireStaff`] -- Requires `instructor` or `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated caller.

pub mod auth;
pub mod rbac;
