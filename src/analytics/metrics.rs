use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{CompletedAssignment, CourseOutline, CourseProgress};

/// `round(numerator / denominator * 100)`, rounding half up.
///
/// Returns 0 when `denominator` is 0 and never exceeds 100.
pub fn percentage(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let (n, d) = (u64::from(numerator), u64::from(denominator));
    ((200 * n + d) / (2 * d)).min(100) as u32
}

/// Rounded (half up) arithmetic mean, 0 for an empty input.
pub fn mean(values: impl IntoIterator<Item = u32>) -> u32 {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)) as u32
}

/// Collapse ledger rows to one per lesson, keeping the best score.
///
/// The store enforces this already; doing it again here means rows from an
/// older database can never count twice.
pub fn best_per_lesson(rows: &[CompletedAssignment]) -> Vec<&CompletedAssignment> {
    let mut best: HashMap<Uuid, &CompletedAssignment> = HashMap::new();
    for row in rows {
        best.entry(row.lesson_id)
            .and_modify(|kept| {
                if kept.is_beaten_by(row) {
                    *kept = row;
                }
            })
            .or_insert(row);
    }
    best.into_values().collect()
}

/// Rounded (half up) mean of `correct / questions * 100` over the attempts.
///
/// Attempts with no questions have no score and are skipped. The ratios are
/// summed as an exact fraction so a true half never rounds down.
pub fn average_score(attempts: &[&CompletedAssignment]) -> u32 {
    let scored: Vec<(u128, u128)> = attempts
        .iter()
        .filter(|a| a.number_of_questions > 0)
        .map(|a| (u128::from(a.total_correct_answers), u128::from(a.number_of_questions)))
        .collect();
    if scored.is_empty() {
        return 0;
    }

    let exact = || -> Option<u32> {
        let (num, den) = scored.iter().try_fold((0u128, 1u128), |(num, den), &(c, q)| {
            let lcm = den.checked_mul(q / gcd(den, q))?;
            let num = num
                .checked_mul(lcm / den)?
                .checked_add(c.checked_mul(lcm / q)?)?;
            let g = gcd(num, lcm);
            Some((num / g, lcm / g))
        })?;
        let d = den.checked_mul(scored.len() as u128)?;
        let rounded = num.checked_mul(200)?.checked_add(d)? / d.checked_mul(2)?;
        Some(rounded.min(100) as u32)
    };

    // Only pathological question counts overflow the common denominator.
    exact().unwrap_or_else(|| {
        let sum: f64 = scored.iter().map(|&(c, q)| c as f64 / q as f64).sum();
        ((sum / scored.len() as f64 * 100.0).round() as u32).min(100)
    })
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Progress and quiz metrics for one student's ledger rows in one course.
///
/// Rows for lessons outside the outline are ignored.
pub fn course_metrics(outline: &CourseOutline, rows: &[CompletedAssignment]) -> CourseProgress {
    let lesson_ids: std::collections::HashSet<Uuid> = outline.lesson_ids().collect();
    let in_course: Vec<CompletedAssignment> = rows
        .iter()
        .filter(|r| lesson_ids.contains(&r.lesson_id))
        .cloned()
        .collect();
    let attempts = best_per_lesson(&in_course);

    let total_lessons = outline.lesson_count();
    let completed_lessons = attempts.len() as u32;
    let total_quizzes = outline.quiz_count();
    let completed_quizzes = attempts.len() as u32;

    let average_quiz_score = average_score(&attempts);

    let total_questions_answered = attempts.iter().map(|a| a.number_of_questions).sum();
    let total_correct_answers = attempts.iter().map(|a| a.total_correct_answers).sum();

    CourseProgress {
        total_lessons,
        completed_lessons,
        progress_percentage: percentage(completed_lessons, total_lessons),
        total_quizzes,
        completed_quizzes,
        quiz_completion_percentage: percentage(completed_quizzes, total_quizzes),
        average_quiz_score,
        total_questions_answered,
        total_correct_answers,
        overall_accuracy: percentage(total_correct_answers, total_questions_answered),
    }
}
