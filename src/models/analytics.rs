use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress and quiz performance of one student in one course.
///
/// Every percentage is an integer in `[0, 100]` and is `0` whenever its
/// denominator is `0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub progress_percentage: u32,
    pub total_quizzes: u32,
    pub completed_quizzes: u32,
    pub quiz_completion_percentage: u32,
    pub average_quiz_score: u32,
    pub total_questions_answered: u32,
    pub total_correct_answers: u32,
    pub overall_accuracy: u32,
}

/// [`CourseProgress`] labelled with the course it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseAnalytics {
    pub course_id: Uuid,
    pub course_slug: String,
    pub course_name: String,
    #[serde(flatten)]
    pub progress: CourseProgress,
}

/// A student's metrics across every enrolled course.
///
/// `average_progress` and `overall_average_quiz_score` are unweighted means of
/// the per-course figures: a two-lesson course counts as much as a two-hundred
/// lesson one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: Uuid,
    pub student_name: String,
    pub is_activated: bool,
    pub total_courses: u32,
    pub completed_courses: u32,
    pub average_progress: u32,
    pub total_lessons_completed: u32,
    pub total_quizzes_completed: u32,
    pub overall_average_quiz_score: u32,
    pub total_questions_answered: u32,
    pub total_correct_answers: u32,
    pub overall_accuracy: u32,
    pub courses: Vec<CourseAnalytics>,
}

/// Headline numbers for a team leader's dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamOverview {
    pub total_agents: u32,
    pub active_agents: u32,
    /// Distinct courses across all agents' enrollments.
    pub total_courses: u32,
    /// Unweighted mean of each agent's `average_progress`.
    pub average_progress: u32,
}

/// Analytics for every agent under one team leader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamLeaderAnalytics {
    pub team_leader_id: Uuid,
    pub team_leader_name: String,
    pub team_overview: TeamOverview,
    pub agents: Vec<StudentSummary>,
}
