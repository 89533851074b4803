use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student's submitted quiz for a lesson.
///
/// The ledger holds at most one row per `(student_id, lesson_id)`. A
/// resubmission only replaces the stored row when it scores strictly higher,
/// so the row always reflects the student's best attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedAssignment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub lesson_id: Uuid,
    pub quiz_id: Uuid,
    /// Chosen option index per question, in question order.
    pub selected_answers: Vec<usize>,
    pub number_of_questions: u32,
    pub total_correct_answers: u32,
    pub completed_at: DateTime<Utc>,
}

impl CompletedAssignment {
    /// True when `other` is a strictly better attempt than `self`.
    ///
    /// An attempt with no questions has no score and ranks below every
    /// scored attempt.
    pub fn is_beaten_by(&self, other: &CompletedAssignment) -> bool {
        match (self.number_of_questions, other.number_of_questions) {
            (_, 0) => false,
            (0, _) => true,
            // Cross-multiplied so quizzes of different lengths compare without floats.
            (mine, theirs) => {
                u64::from(other.total_correct_answers) * u64::from(mine)
                    > u64::from(self.total_correct_answers) * u64::from(theirs)
            }
        }
    }
}

/// Input for recording a graded completion in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCompletionInput {
    pub student_id: Uuid,
    pub lesson_id: Uuid,
    pub quiz_id: Uuid,
    pub selected_answers: Vec<usize>,
    pub number_of_questions: u32,
    pub total_correct_answers: u32,
}

/// Body of a quiz submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizInput {
    pub quiz_id: Uuid,
    pub selected_answers: Vec<usize>,
}

/// Response to a quiz submission: the stored ledger row and where to go next.
///
/// `next_lesson` is `None` both when the course is finished and when the next
/// module is still locked; check `course_completed` to tell them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub assignment: CompletedAssignment,
    pub next_lesson: Option<super::NextLesson>,
    pub course_completed: bool,
}
