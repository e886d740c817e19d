//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Repository traits with in-memory mocks keep the core testable
//!   without a database or a real filesystem.
//! - Provides clear error types and documented interfaces.

pub mod assets;
pub mod auth;
pub mod company;
pub mod errors;
