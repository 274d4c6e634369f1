//! `coursework-core`: identifiers and error primitives shared by every crate.
//!
//! No IO lives here.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CourseId, StudentId};
