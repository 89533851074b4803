//! Grading of quiz submissions before they reach the ledger.

use crate::models::{Quiz, RecordCompletionInput, SubmitQuizInput};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("Expected {expected} answers but got {actual}")]
    AnswerCountMismatch { expected: usize, actual: usize },
}

/// Score of a graded submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub number_of_questions: u32,
    pub total_correct_answers: u32,
}

/// Compare selected options against the quiz's answer key.
///
/// Exactly one answer is required per question. Out-of-range option indexes
/// are simply wrong.
pub fn grade(quiz: &Quiz, selected_answers: &[usize]) -> Result<Grade, GradingError> {
    if selected_answers.len() != quiz.questions.len() {
        return Err(GradingError::AnswerCountMismatch {
            expected: quiz.questions.len(),
            actual: selected_answers.len(),
        });
    }

    let correct = quiz
        .questions
        .iter()
        .zip(selected_answers)
        .filter(|(question, answer)| question.correct_option == **answer)
        .count();

    Ok(Grade {
        number_of_questions: quiz.questions.len() as u32,
        total_correct_answers: correct as u32,
    })
}

/// Grade a submission and turn it into a ledger record for `student_id`.
pub fn prepare_completion(
    student_id: uuid::Uuid,
    quiz: &Quiz,
    input: SubmitQuizInput,
) -> Result<RecordCompletionInput, GradingError> {
    let grade = grade(quiz, &input.selected_answers)?;
    Ok(RecordCompletionInput {
        student_id,
        lesson_id: quiz.lesson_id,
        quiz_id: quiz.id,
        selected_answers: input.selected_answers,
        number_of_questions: grade.number_of_questions,
        total_correct_answers: grade.total_correct_answers,
    })
}
