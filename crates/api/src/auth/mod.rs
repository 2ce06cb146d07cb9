//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Tokens are minted by the identity provider in front of this service; the
//! generator here exists for operators' tooling and for tests.

pub mod jwt;
