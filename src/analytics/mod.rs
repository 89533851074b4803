//! Progress and quiz-performance rollups.
//!
//! Metrics are computed per student per course, then averaged across a
//! student's courses and across a team leader's agents. The cross-course and
//! cross-agent averages are **unweighted** simple means: each course (or
//! agent) counts once no matter how many lessons or questions it has.

mod metrics;

use std::collections::HashSet;

use uuid::Uuid;

pub use metrics::{average_score, best_per_lesson, course_metrics, mean, percentage};

use crate::engine::Engine;
use crate::error::{ProgressError, ProgressResult};
use crate::models::*;
use crate::store::ProgressStore;

impl<S: ProgressStore> Engine<S> {
    /// Metrics for one student in one course.
    pub fn course_progress(&self, student_id: Uuid, course_id: Uuid) -> ProgressResult<CourseProgress> {
        let course = self
            .store()
            .course_by_id(course_id)?
            .ok_or(ProgressError::NotFound("Course"))?;
        self.require_student(student_id)?;
        let (outline, rows) = self.load(student_id, course)?;
        Ok(course_metrics(&outline, &rows))
    }

    /// Metrics for one student across every course they are enrolled in.
    pub fn student_summary(&self, student_id: Uuid) -> ProgressResult<StudentSummary> {
        let student = self
            .store()
            .student(student_id)?
            .ok_or(ProgressError::NotFound("Student"))?;
        self.summarize(student)
    }

    /// Summaries for every agent under a team leader, plus a team overview.
    pub fn team_leader_analytics(&self, team_leader_id: Uuid) -> ProgressResult<TeamLeaderAnalytics> {
        let leader = self
            .store()
            .team_leader(team_leader_id)?
            .ok_or(ProgressError::NotFound("Team leader"))?;

        let agents = self
            .store()
            .agents_of(team_leader_id)?
            .into_iter()
            .map(|agent| self.summarize(agent))
            .collect::<ProgressResult<Vec<_>>>()?;

        tracing::debug!(
            team_leader_id = %team_leader_id,
            agents = agents.len(),
            "Computed team analytics"
        );

        Ok(TeamLeaderAnalytics {
            team_leader_id,
            team_leader_name: leader.name,
            team_overview: team_overview(&agents),
            agents,
        })
    }

    fn summarize(&self, student: Student) -> ProgressResult<StudentSummary> {
        let courses = self
            .store()
            .enrolled_courses(student.id)?
            .into_iter()
            .map(|course| {
                let (course_id, course_slug, course_name) =
                    (course.id, course.slug.clone(), course.name.clone());
                let (outline, rows) = self.load(student.id, course)?;
                Ok(CourseAnalytics {
                    course_id,
                    course_slug,
                    course_name,
                    progress: course_metrics(&outline, &rows),
                })
            })
            .collect::<ProgressResult<Vec<_>>>()?;

        Ok(student_summary(student, courses))
    }
}

/// Fold per-course figures into a student summary.
pub fn student_summary(student: Student, courses: Vec<CourseAnalytics>) -> StudentSummary {
    let progress: Vec<&CourseProgress> = courses.iter().map(|c| &c.progress).collect();

    let completed_courses = progress
        .iter()
        .filter(|p| p.total_lessons > 0 && p.completed_lessons >= p.total_lessons)
        .count() as u32;

    // Simple mean: every enrolled course weighs the same.
    let average_progress = mean(progress.iter().map(|p| p.progress_percentage));

    // An untouched course contributes a score of 0, like its progress does.
    let overall_average_quiz_score = mean(progress.iter().map(|p| p.average_quiz_score));

    let total_questions_answered = progress.iter().map(|p| p.total_questions_answered).sum();
    let total_correct_answers = progress.iter().map(|p| p.total_correct_answers).sum();

    StudentSummary {
        student_id: student.id,
        student_name: student.name,
        is_activated: student.is_activated,
        total_courses: courses.len() as u32,
        completed_courses,
        average_progress,
        total_lessons_completed: progress.iter().map(|p| p.completed_lessons).sum(),
        total_quizzes_completed: progress.iter().map(|p| p.completed_quizzes).sum(),
        overall_average_quiz_score,
        total_questions_answered,
        total_correct_answers,
        overall_accuracy: percentage(total_correct_answers, total_questions_answered),
        courses,
    }
}

/// Headline numbers across a team's agents.
pub fn team_overview(agents: &[StudentSummary]) -> TeamOverview {
    let distinct_courses: HashSet<Uuid> = agents
        .iter()
        .flat_map(|a| a.courses.iter().map(|c| c.course_id))
        .collect();

    TeamOverview {
        total_agents: agents.len() as u32,
        active_agents: agents.iter().filter(|a| a.is_activated).count() as u32,
        total_courses: distinct_courses.len() as u32,
        // Simple mean of agent averages, not weighted by course count.
        average_progress: mean(agents.iter().map(|a| a.average_progress)),
    }
}
