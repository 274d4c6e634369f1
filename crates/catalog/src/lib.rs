//! Catalog domain module: courses, students and enrollment.
//!
//! This crate contains the record shapes and their rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod course;
pub mod student;

pub use course::{Course, NewCourse};
pub use student::{NewStudent, Student};
