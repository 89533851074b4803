//! The progression and analytics engine.
//!
//! [`Engine`] is a thin, stateless wrapper around a [`ProgressStore`]. Each
//! call loads what it needs and evaluates pure functions over it, so the
//! engine can be cloned freely and used from any number of concurrent
//! requests. Progression operations live in [`crate::progression`], analytics
//! in [`crate::analytics`].

use uuid::Uuid;

use crate::error::{ProgressError, ProgressResult};
use crate::models::{CompletedAssignment, CourseOutline};
use crate::store::ProgressStore;

#[derive(Clone)]
pub struct Engine<S> {
    store: S,
}

impl<S: ProgressStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Outline of the course with `slug` plus the student's ledger rows in it.
    pub(crate) fn load_by_slug(
        &self,
        student_id: Uuid,
        course_slug: &str,
    ) -> ProgressResult<(CourseOutline, Vec<CompletedAssignment>)> {
        let course = self
            .store
            .course_by_slug(course_slug)?
            .ok_or(ProgressError::NotFound("Course"))?;
        self.require_student(student_id)?;
        self.load(student_id, course)
    }

    /// An unknown student has no progress to evaluate and is never granted access.
    pub(crate) fn require_student(&self, student_id: Uuid) -> ProgressResult<()> {
        self.store
            .student(student_id)?
            .map(|_| ())
            .ok_or(ProgressError::NotFound("Student"))
    }

    pub(crate) fn load(
        &self,
        student_id: Uuid,
        course: crate::models::Course,
    ) -> ProgressResult<(CourseOutline, Vec<CompletedAssignment>)> {
        let course_id = course.id;
        let outline = self.store.course_outline(course)?;
        let completions = self.store.completions_in_course(student_id, course_id)?;
        Ok((outline, completions))
    }
}
