//! Pure access rules over a loaded course outline.
//!
//! Nothing in here touches the store. Every function takes the ordered
//! outline and the set of completed lessons, which keeps a whole-course status
//! build linear in modules plus lessons.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{ProgressError, ProgressResult};
use crate::models::*;

pub const FIRST_MODULE: &str = "First module is always accessible";
pub const PREVIOUS_MODULE_DONE: &str = "Previous module completed";
pub const MODULE_LOCKED: &str = "Complete all lessons in the previous module to unlock this module";
pub const FIRST_LESSON: &str = "First lesson is always accessible";
pub const PREVIOUS_LESSON_DONE: &str = "Previous lesson completed";
pub const LESSON_LOCKED: &str = "Complete the previous lesson to unlock this lesson";

/// Lessons a student has a ledger row for.
#[derive(Debug, Default, Clone)]
pub struct Completions(HashSet<Uuid>);

impl Completions {
    pub fn from_assignments(assignments: &[CompletedAssignment]) -> Self {
        Self(assignments.iter().map(|a| a.lesson_id).collect())
    }

    pub fn contains(&self, lesson_id: Uuid) -> bool {
        self.0.contains(&lesson_id)
    }
}

pub fn module_path(course_slug: &str, module_slug: &str) -> String {
    format!("/courses/{}/{}", course_slug, module_slug)
}

pub fn lesson_path(course_slug: &str, module_slug: &str, lesson_slug: &str) -> String {
    format!("/courses/{}/{}/{}", course_slug, module_slug, lesson_slug)
}

/// Every lesson in the module has a completion. Empty modules are complete.
pub fn module_is_complete(module: &ModuleOutline, done: &Completions) -> bool {
    module.lessons.iter().all(|l| done.contains(l.lesson.id))
}

/// Module `k` opens once module `k - 1` is complete. Module 0 is always open.
pub fn module_access(
    outline: &CourseOutline,
    module: &ModuleOutline,
    done: &Completions,
) -> ProgressResult<AccessDecision> {
    let Some(previous_index) = module.module.order_index.checked_sub(1) else {
        return Ok(AccessDecision::granted(FIRST_MODULE));
    };
    let previous = outline
        .module_at(previous_index)
        .ok_or(ProgressError::IntegrityGap("module"))?;

    if module_is_complete(previous, done) {
        Ok(AccessDecision::granted(PREVIOUS_MODULE_DONE))
    } else {
        Ok(AccessDecision::denied(MODULE_LOCKED)
            .with_redirect(module_path(&outline.course.slug, &previous.module.slug)))
    }
}

/// Lesson `k` opens once lesson `k - 1` of the same module is complete, and
/// only inside an open module. A module denial is returned unchanged.
pub fn lesson_access(
    outline: &CourseOutline,
    module: &ModuleOutline,
    lesson: &LessonOutline,
    done: &Completions,
) -> ProgressResult<AccessDecision> {
    let module_decision = module_access(outline, module, done)?;
    if !module_decision.can_access {
        return Ok(module_decision);
    }
    lesson_access_within(outline, module, lesson, done)
}

/// The lesson rule alone, assuming the module is already open.
fn lesson_access_within(
    outline: &CourseOutline,
    module: &ModuleOutline,
    lesson: &LessonOutline,
    done: &Completions,
) -> ProgressResult<AccessDecision> {
    let Some(previous_index) = lesson.lesson.order_index.checked_sub(1) else {
        return Ok(AccessDecision::granted(FIRST_LESSON));
    };
    let previous = module
        .lesson_at(previous_index)
        .ok_or(ProgressError::IntegrityGap("lesson"))?;

    if done.contains(previous.lesson.id) {
        Ok(AccessDecision::granted(PREVIOUS_LESSON_DONE))
    } else {
        Ok(AccessDecision::denied(LESSON_LOCKED)
            .with_redirect(lesson_path(
                &outline.course.slug,
                &module.module.slug,
                &previous.lesson.slug,
            ))
            .with_required_lesson(previous.lesson.slug.clone()))
    }
}

/// The lesson the caller is currently looking at.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentPosition<'a> {
    pub module_slug: Option<&'a str>,
    pub lesson_slug: Option<&'a str>,
}

impl CurrentPosition<'_> {
    fn matches(&self, module: &ModuleOutline, lesson: &LessonOutline) -> bool {
        let module_matches = self
            .module_slug
            .map_or(true, |slug| slug == module.module.slug);
        module_matches && self.lesson_slug == Some(lesson.lesson.slug.as_str())
    }
}

/// Status of every lesson in the course, module by module.
///
/// Precedence is locked, then completed, then current, then accessible. A
/// lesson in a locked module is locked regardless of its own predecessor.
pub fn course_statuses(
    outline: &CourseOutline,
    done: &Completions,
    current: CurrentPosition<'_>,
) -> Vec<ModuleStatus> {
    outline
        .modules
        .iter()
        .map(|module| {
            // Integrity gaps lock rather than error so the sidebar still renders.
            let module_open = module_access(outline, module, done)
                .map(|d| d.can_access)
                .unwrap_or(false);

            let lessons = module
                .lessons
                .iter()
                .map(|lesson| {
                    let open = module_open
                        && lesson_access_within(outline, module, lesson, done)
                            .map(|d| d.can_access)
                            .unwrap_or(false);
                    let status = if !open {
                        LessonStatus::Locked
                    } else if done.contains(lesson.lesson.id) {
                        LessonStatus::Completed
                    } else if current.matches(module, lesson) {
                        LessonStatus::Current
                    } else {
                        LessonStatus::Accessible
                    };
                    LessonStatusEntry {
                        lesson_slug: lesson.lesson.slug.clone(),
                        lesson_name: lesson.lesson.name.clone(),
                        order_index: lesson.lesson.order_index,
                        status,
                        can_access: status.can_access(),
                        icon: status.icon(),
                    }
                })
                .collect();

            ModuleStatus {
                module_slug: module.module.slug.clone(),
                module_name: module.module.name.clone(),
                lessons,
            }
        })
        .collect()
}

/// Completion figures for one module.
pub fn module_progress(
    outline: &CourseOutline,
    module: &ModuleOutline,
    done: &Completions,
) -> ModuleProgress {
    let total_lessons = module.lessons.len() as u32;
    let completed_lessons = module
        .lessons
        .iter()
        .filter(|l| done.contains(l.lesson.id))
        .count() as u32;

    let module_open = module_access(outline, module, done)
        .map(|d| d.can_access)
        .unwrap_or(false);
    let next_accessible_lesson = if module_open {
        module
            .lessons
            .iter()
            .filter(|l| !done.contains(l.lesson.id))
            .find(|l| {
                lesson_access_within(outline, module, l, done)
                    .map(|d| d.can_access)
                    .unwrap_or(false)
            })
            .map(|l| LessonRef {
                lesson_slug: l.lesson.slug.clone(),
                lesson_name: l.lesson.name.clone(),
                order_index: l.lesson.order_index,
            })
    } else {
        None
    };

    ModuleProgress {
        total_lessons,
        completed_lessons,
        progress_percentage: crate::analytics::percentage(completed_lessons, total_lessons),
        next_accessible_lesson,
    }
}

/// Where to go after finishing `lesson`.
///
/// The immediate successor in the same module needs no check, since arriving
/// here means `lesson` was just completed. Crossing into the next module
/// requires that module to be open and to have a lesson at index 0.
pub fn next_lesson(
    outline: &CourseOutline,
    module: &ModuleOutline,
    lesson: &LessonOutline,
    done: &Completions,
) -> ProgressResult<Option<NextLesson>> {
    let course_slug = &outline.course.slug;

    if let Some(successor) = module.lesson_after(lesson.lesson.order_index) {
        return Ok(Some(NextLesson {
            module_slug: module.module.slug.clone(),
            lesson_slug: successor.lesson.slug.clone(),
            lesson_name: successor.lesson.name.clone(),
            path: lesson_path(course_slug, &module.module.slug, &successor.lesson.slug),
            crosses_module: false,
        }));
    }

    let Some(next_module) = outline.module_after(module.module.order_index) else {
        return Ok(None);
    };
    if !module_access(outline, next_module, done)?.can_access {
        return Ok(None);
    }

    Ok(next_module.lesson_at(0).map(|first| NextLesson {
        module_slug: next_module.module.slug.clone(),
        lesson_slug: first.lesson.slug.clone(),
        lesson_name: first.lesson.name.clone(),
        path: lesson_path(course_slug, &next_module.module.slug, &first.lesson.slug),
        crosses_module: true,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    /// Build an outline from `(module_slug, [lesson_slug, ...])` pairs, with
    /// order indexes taken from position.
    pub(crate) fn outline(layout: &[(&str, &[&str])]) -> CourseOutline {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            slug: "sales-101".to_string(),
            name: "Sales 101".to_string(),
            description: None,
            is_public: true,
            created_at: now,
            updated_at: now,
        };
        let modules = layout
            .iter()
            .enumerate()
            .map(|(mi, (module_slug, lessons))| {
                let module = Module {
                    id: Uuid::new_v4(),
                    course_id: course.id,
                    slug: module_slug.to_string(),
                    name: module_slug.to_uppercase(),
                    order_index: mi as u32,
                };
                let lessons = lessons
                    .iter()
                    .enumerate()
                    .map(|(li, lesson_slug)| LessonOutline {
                        lesson: Lesson {
                            id: Uuid::new_v4(),
                            module_id: module.id,
                            slug: lesson_slug.to_string(),
                            name: lesson_slug.to_uppercase(),
                            description: None,
                            video_url: None,
                            order_index: li as u32,
                        },
                        quiz_count: 1,
                    })
                    .collect();
                ModuleOutline { module, lessons }
            })
            .collect();
        CourseOutline { course, modules }
    }

    pub(crate) fn lesson<'a>(o: &'a CourseOutline, m: &str, l: &str) -> (&'a ModuleOutline, &'a LessonOutline) {
        let module = o.module_by_slug(m).unwrap();
        (module, module.lesson_by_slug(l).unwrap())
    }

    pub(crate) fn done(o: &CourseOutline, lessons: &[(&str, &str)]) -> Completions {
        Completions(
            lessons
                .iter()
                .map(|(m, l)| lesson(o, m, l).1.lesson.id)
                .collect(),
        )
    }

    #[test]
    fn first_module_and_first_lesson_are_free() {
        let o = outline(&[("a", &["a0", "a1"]), ("b", &["b0"])]);
        let none = Completions::default();
        let (m, l) = lesson(&o, "a", "a0");

        let decision = lesson_access(&o, m, l, &none).unwrap();
        assert!(decision.can_access);
        assert_eq!(decision.reason, FIRST_LESSON);
        assert!(module_access(&o, m, &none).unwrap().can_access);
    }

    #[test]
    fn sales_101_scenario() {
        let o = outline(&[("a", &["a0", "a1"]), ("b", &["b0"])]);
        let done = done(&o, &[("a", "a0")]);

        let (ma, a1) = lesson(&o, "a", "a1");
        assert!(lesson_access(&o, ma, a1, &done).unwrap().can_access);

        let mb = o.module_by_slug("b").unwrap();
        let decision = module_access(&o, mb, &done).unwrap();
        assert!(!decision.can_access);
        assert_eq!(decision.redirect_to.as_deref(), Some("/courses/sales-101/a"));

        let (_, a0) = lesson(&o, "a", "a0");
        let next = next_lesson(&o, ma, a0, &done).unwrap().unwrap();
        assert_eq!(next.lesson_slug, "a1");
        assert!(!next.crosses_module);
    }

    #[test]
    fn locked_lesson_names_its_prerequisite() {
        let o = outline(&[("a", &["a0", "a1", "a2"])]);
        let done = done(&o, &[("a", "a0")]);
        let (m, a2) = lesson(&o, "a", "a2");

        let decision = lesson_access(&o, m, a2, &done).unwrap();
        assert!(!decision.can_access);
        assert_eq!(decision.required_lesson_slug.as_deref(), Some("a1"));
        assert_eq!(decision.redirect_to.as_deref(), Some("/courses/sales-101/a/a1"));
    }

    #[test]
    fn module_denial_is_propagated_verbatim_to_lessons() {
        let o = outline(&[("a", &["a0"]), ("b", &["b0", "b1"])]);
        let none = Completions::default();
        let mb = o.module_by_slug("b").unwrap();
        let (_, b1) = lesson(&o, "b", "b1");

        let module_decision = module_access(&o, mb, &none).unwrap();
        let lesson_decision = lesson_access(&o, mb, b1, &none).unwrap();
        assert_eq!(module_decision, lesson_decision);
        assert!(lesson_decision.required_lesson_slug.is_none());
    }

    #[test]
    fn empty_module_is_vacuously_complete() {
        let o = outline(&[("a", &["a0"]), ("empty", &[]), ("c", &["c0"])]);
        let done = done(&o, &[("a", "a0")]);

        let empty = o.module_by_slug("empty").unwrap();
        let c = o.module_by_slug("c").unwrap();
        assert!(module_access(&o, empty, &done).unwrap().can_access);
        assert!(module_access(&o, c, &done).unwrap().can_access);
    }

    #[test]
    fn missing_previous_module_is_an_integrity_gap() {
        let mut o = outline(&[("a", &["a0"]), ("b", &["b0"])]);
        o.modules[1].module.order_index = 5;
        let none = Completions::default();

        let err = module_access(&o, &o.modules[1], &none).unwrap_err();
        assert!(matches!(err, ProgressError::IntegrityGap("module")));
    }

    #[test]
    fn statuses_follow_precedence_and_icons() {
        let o = outline(&[("a", &["a0", "a1", "a2"]), ("b", &["b0"])]);
        let done = done(&o, &[("a", "a0")]);
        let statuses = course_statuses(
            &o,
            &done,
            CurrentPosition {
                module_slug: Some("a"),
                lesson_slug: Some("a1"),
            },
        );

        let a: Vec<_> = statuses[0].lessons.iter().map(|l| l.status).collect();
        assert_eq!(
            a,
            vec![LessonStatus::Completed, LessonStatus::Current, LessonStatus::Locked]
        );
        assert_eq!(statuses[0].lessons[1].icon, StatusIcon::Play);
        assert_eq!(statuses[1].lessons[0].status, LessonStatus::Locked);
        assert_eq!(statuses[1].lessons[0].icon, StatusIcon::Lock);
        assert!(!statuses[1].lessons[0].can_access);
    }

    #[test]
    fn statuses_agree_with_lesson_access() {
        let o = outline(&[("a", &["a0", "a1"]), ("b", &[]), ("c", &["c0", "c1"])]);
        for completed in [
            vec![],
            vec![("a", "a0")],
            vec![("a", "a0"), ("a", "a1")],
            vec![("a", "a0"), ("a", "a1"), ("c", "c0")],
            vec![("a", "a1"), ("c", "c0")],
        ] {
            let done = done(&o, &completed);
            let statuses = course_statuses(&o, &done, CurrentPosition::default());
            for (module, status) in o.modules.iter().zip(&statuses) {
                for (lesson, entry) in module.lessons.iter().zip(&status.lessons) {
                    let decision = lesson_access(&o, module, lesson, &done).unwrap();
                    assert_eq!(entry.can_access, decision.can_access, "{}", entry.lesson_slug);
                }
            }
        }
    }

    #[test]
    fn module_progress_reports_next_open_lesson() {
        let o = outline(&[("a", &["a0", "a1", "a2"])]);
        let done = done(&o, &[("a", "a0")]);
        let progress = module_progress(&o, &o.modules[0], &done);

        assert_eq!(progress.total_lessons, 3);
        assert_eq!(progress.completed_lessons, 1);
        assert_eq!(progress.progress_percentage, 33);
        assert_eq!(progress.next_accessible_lesson.unwrap().lesson_slug, "a1");
    }

    #[test]
    fn module_progress_of_empty_module_is_zero() {
        let o = outline(&[("a", &[])]);
        let progress = module_progress(&o, &o.modules[0], &Completions::default());
        assert_eq!(progress.progress_percentage, 0);
        assert!(progress.next_accessible_lesson.is_none());
    }

    #[test]
    fn next_lesson_crosses_into_unlocked_module() {
        let o = outline(&[("a", &["a0", "a1"]), ("b", &["b0"])]);
        let done = done(&o, &[("a", "a0"), ("a", "a1")]);
        let (m, a1) = lesson(&o, "a", "a1");

        let next = next_lesson(&o, m, a1, &done).unwrap().unwrap();
        assert_eq!(next.lesson_slug, "b0");
        assert_eq!(next.path, "/courses/sales-101/b/b0");
        assert!(next.crosses_module);
    }

    #[test]
    fn next_lesson_stops_at_locked_module() {
        let o = outline(&[("a", &["a0", "a1"]), ("b", &["b0"])]);
        // a1 done but a0 never completed, so module b stays locked.
        let done = done(&o, &[("a", "a1")]);
        let (m, a1) = lesson(&o, "a", "a1");

        assert!(next_lesson(&o, m, a1, &done).unwrap().is_none());
    }

    #[test]
    fn next_lesson_after_last_lesson_is_none() {
        let o = outline(&[("a", &["a0"]), ("b", &["b0"])]);
        let done = done(&o, &[("a", "a0"), ("b", "b0")]);
        let (m, b0) = lesson(&o, "b", "b0");

        assert!(next_lesson(&o, m, b0, &done).unwrap().is_none());
    }

    #[test]
    fn next_lesson_into_empty_module_is_none() {
        let o = outline(&[("a", &["a0"]), ("empty", &[]), ("c", &["c0"])]);
        let done = done(&o, &[("a", "a0")]);
        let (m, a0) = lesson(&o, "a", "a0");

        assert!(next_lesson(&o, m, a0, &done).unwrap().is_none());
    }
}
