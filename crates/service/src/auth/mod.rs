//! Authentication: registration, login and token verification.
//!
//! The transport layer treats this as a capability check yielding a verified
//! user id; company ownership is always re-checked against the entity store,
//! so a role claim that goes stale after promotion is harmless.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod seaorm;
pub mod service;
