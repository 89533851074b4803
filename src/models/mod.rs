//! Domain models for coursegate.
//!
//! # Core Concepts
//!
//! ## Catalog
//!
//! - [`Course`]: Top-level container; owns an ordered list of [`Module`]s.
//! - [`Module`]: Ordered within its course by `order_index`. Owns ordered [`Lesson`]s.
//! - [`Lesson`]: Ordered within its module by `order_index`. May carry [`Quiz`]zes.
//! - [`CourseOutline`]: Read view of a whole course, used by the progression engine.
//!
//! ## Ledger
//!
//! - [`CompletedAssignment`]: The fact that a student submitted a quiz for a lesson.
//!   At most one row exists per `(student, lesson)`; the best-scoring attempt is kept.
//!
//! ## People
//!
//! - [`Student`]: A learner (an "agent" when attached to a team leader).
//! - [`TeamLeader`]: Owns zero or more students; analytics roll up across them.
//!
//! ## Engine results
//!
//! - [`AccessDecision`], [`ModuleStatus`], [`ModuleProgress`], [`NextLesson`]: progression.
//! - [`CourseProgress`], [`StudentSummary`], [`TeamLeaderAnalytics`]: analytics.

mod analytics;
mod assignment;
mod course;
mod people;
mod progression;

pub use analytics::*;
pub use assignment::*;
pub use course::*;
pub use people::*;
pub use progression::*;
