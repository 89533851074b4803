//! Course progression: access gates, sidebar statuses and the "Continue" target.
//!
//! Every operation here is fail-closed. A missing course, module or lesson
//! becomes a denial (or an empty/`None` result), and so does any store
//! failure. Nothing in this module can grant access it could not verify.

pub mod gate;

use uuid::Uuid;

pub use gate::{lesson_path, module_path, Completions, CurrentPosition};

use crate::engine::Engine;
use crate::error::{ProgressError, ProgressResult};
use crate::models::*;
use crate::store::ProgressStore;

/// Reason given when the store fails during an access check.
pub const ACCESS_CHECK_FAILED: &str = "error checking access permissions";

impl<S: ProgressStore> Engine<S> {
    /// Can `student_id` open the module? Never fails; errors deny.
    pub fn can_access_module(
        &self,
        student_id: Uuid,
        course_slug: &str,
        module_slug: &str,
    ) -> AccessDecision {
        let result = self.load_by_slug(student_id, course_slug).and_then(|(outline, rows)| {
            let module = outline
                .module_by_slug(module_slug)
                .ok_or(ProgressError::NotFound("Module"))?;
            gate::module_access(&outline, module, &Completions::from_assignments(&rows))
        });
        fail_closed(result, student_id, course_slug)
    }

    /// Can `student_id` open the lesson? A locked module is reported as-is.
    pub fn can_access_lesson(
        &self,
        student_id: Uuid,
        course_slug: &str,
        module_slug: &str,
        lesson_slug: &str,
    ) -> AccessDecision {
        let result = self.load_by_slug(student_id, course_slug).and_then(|(outline, rows)| {
            let module = outline
                .module_by_slug(module_slug)
                .ok_or(ProgressError::NotFound("Module"))?;
            let done = Completions::from_assignments(&rows);
            // Module gate first: an inaccessible module hides whether the lesson exists.
            let module_decision = gate::module_access(&outline, module, &done)?;
            if !module_decision.can_access {
                return Ok(module_decision);
            }
            let lesson = module
                .lesson_by_slug(lesson_slug)
                .ok_or(ProgressError::NotFound("Lesson"))?;
            gate::lesson_access(&outline, module, lesson, &done)
        });
        fail_closed(result, student_id, course_slug)
    }

    /// Full per-lesson status listing for the course, in order.
    ///
    /// Returns an empty list when the course does not exist or the store fails.
    pub fn statuses_for_course(
        &self,
        student_id: Uuid,
        course_slug: &str,
        current_module_slug: Option<&str>,
        current_lesson_slug: Option<&str>,
    ) -> Vec<ModuleStatus> {
        match self.load_by_slug(student_id, course_slug) {
            Ok((outline, rows)) => gate::course_statuses(
                &outline,
                &Completions::from_assignments(&rows),
                CurrentPosition {
                    module_slug: current_module_slug,
                    lesson_slug: current_lesson_slug,
                },
            ),
            Err(e) => {
                log_failure(&e, student_id, course_slug);
                Vec::new()
            }
        }
    }

    /// Completion figures for one module, or `None` if it cannot be found.
    pub fn module_progress(
        &self,
        student_id: Uuid,
        course_slug: &str,
        module_slug: &str,
    ) -> Option<ModuleProgress> {
        let result = self.load_by_slug(student_id, course_slug).and_then(|(outline, rows)| {
            let module = outline
                .module_by_slug(module_slug)
                .ok_or(ProgressError::NotFound("Module"))?;
            Ok(gate::module_progress(
                &outline,
                module,
                &Completions::from_assignments(&rows),
            ))
        });
        match result {
            Ok(progress) => Some(progress),
            Err(e) => {
                log_failure(&e, student_id, course_slug);
                None
            }
        }
    }

    /// Lesson to continue with after finishing `lesson_slug`.
    ///
    /// `None` means either the course is finished, the next module is still
    /// locked, or a lookup failed. Callers that need to know the course is
    /// complete must check that separately.
    pub fn next_lesson_after(
        &self,
        student_id: Uuid,
        course_slug: &str,
        module_slug: &str,
        lesson_slug: &str,
    ) -> Option<NextLesson> {
        let result = self
            .load_by_slug(student_id, course_slug)
            .and_then(|(outline, rows)| {
                let module = outline
                    .module_by_slug(module_slug)
                    .ok_or(ProgressError::NotFound("Module"))?;
                let lesson = module
                    .lesson_by_slug(lesson_slug)
                    .ok_or(ProgressError::NotFound("Lesson"))?;
                gate::next_lesson(
                    &outline,
                    module,
                    lesson,
                    &Completions::from_assignments(&rows),
                )
            });
        match result {
            Ok(next) => next,
            Err(e) => {
                log_failure(&e, student_id, course_slug);
                None
            }
        }
    }
}

/// Turn any evaluation error into a denial.
fn fail_closed(
    result: ProgressResult<AccessDecision>,
    student_id: Uuid,
    course_slug: &str,
) -> AccessDecision {
    match result {
        Ok(decision) => decision,
        Err(e) => {
            log_failure(&e, student_id, course_slug);
            match e {
                ProgressError::NotFound(_) | ProgressError::IntegrityGap(_) => {
                    AccessDecision::denied(e.to_string())
                }
                ProgressError::Store(_) => AccessDecision::denied(ACCESS_CHECK_FAILED),
            }
        }
    }
}

fn log_failure(e: &ProgressError, student_id: Uuid, course_slug: &str) {
    match e {
        ProgressError::NotFound(_) => {
            tracing::debug!(%student_id, course_slug, "Progression lookup: {}", e)
        }
        ProgressError::IntegrityGap(_) => {
            tracing::warn!(%student_id, course_slug, "Course ordering integrity gap: {}", e)
        }
        ProgressError::Store(_) => {
            tracing::error!(%student_id, course_slug, "Progression check failed: {}", e)
        }
    }
}
