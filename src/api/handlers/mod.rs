use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::ProgressError;
use crate::grading::{self, GradingError};
use crate::models::*;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// Lookup and validation failures raised by the store are safe to show and
/// map to 404/400/409. Anything else is logged and reported generically.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    if msg.contains("not found") {
        tracing::debug!("Lookup failed: {}", msg);
        return (StatusCode::NOT_FOUND, msg);
    }
    if msg.contains("must") {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }
    if msg.contains("UNIQUE constraint failed") {
        tracing::warn!("Conflict: {}", msg);
        return (StatusCode::CONFLICT, "Already exists".to_string());
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn progress_error(e: ProgressError) -> (StatusCode, String) {
    match e {
        ProgressError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        ProgressError::IntegrityGap(_) => {
            tracing::warn!("Course ordering integrity gap: {}", e);
            (StatusCode::CONFLICT, e.to_string())
        }
        ProgressError::Store(inner) => internal_error(inner),
    }
}

fn grading_error(e: GradingError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

/// Resolve `course/module/lesson` slugs to rows, 404 on the first miss.
fn resolve_lesson(
    state: &AppState,
    course_slug: &str,
    module_slug: &str,
    lesson_slug: &str,
) -> ApiResult<Lesson> {
    let course = state
        .db
        .get_course_by_slug(course_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Course"))?;
    let module = state
        .db
        .get_module_by_slug(course.id, module_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Module"))?;
    state
        .db
        .get_lesson_by_slug(module.id, lesson_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Lesson"))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Catalog
// ============================================================

pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    state.db.get_all_courses().map(Json).map_err(internal_error)
}

pub async fn create_course(
    State(state): State<AppState>,
    Json(input): Json<CreateCourseInput>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    state
        .db
        .create_course(input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(internal_error)
}

pub async fn get_course_outline(
    State(state): State<AppState>,
    Path(course_slug): Path<String>,
) -> ApiResult<Json<CourseOutline>> {
    let course = state
        .db
        .get_course_by_slug(&course_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Course"))?;
    state
        .db
        .get_course_outline(course)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_module(
    State(state): State<AppState>,
    Path(course_slug): Path<String>,
    Json(input): Json<CreateModuleInput>,
) -> ApiResult<(StatusCode, Json<Module>)> {
    let course = state
        .db
        .get_course_by_slug(&course_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Course"))?;
    state
        .db
        .create_module(course.id, input)
        .map(|m| (StatusCode::CREATED, Json(m)))
        .map_err(internal_error)
}

pub async fn create_lesson(
    State(state): State<AppState>,
    Path((course_slug, module_slug)): Path<(String, String)>,
    Json(input): Json<CreateLessonInput>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let course = state
        .db
        .get_course_by_slug(&course_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Course"))?;
    let module = state
        .db
        .get_module_by_slug(course.id, &module_slug)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Module"))?;
    state
        .db
        .create_lesson(module.id, input)
        .map(|l| (StatusCode::CREATED, Json(l)))
        .map_err(internal_error)
}

pub async fn create_quiz(
    State(state): State<AppState>,
    Path((course_slug, module_slug, lesson_slug)): Path<(String, String, String)>,
    Json(input): Json<CreateQuizInput>,
) -> ApiResult<(StatusCode, Json<Quiz>)> {
    let lesson = resolve_lesson(&state, &course_slug, &module_slug, &lesson_slug)?;
    state
        .db
        .create_quiz(lesson.id, input)
        .map(|q| (StatusCode::CREATED, Json(q)))
        .map_err(internal_error)
}

pub async fn list_quizzes(
    State(state): State<AppState>,
    Path((course_slug, module_slug, lesson_slug)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<Quiz>>> {
    let lesson = resolve_lesson(&state, &course_slug, &module_slug, &lesson_slug)?;
    state
        .db
        .get_quizzes(lesson.id)
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// People
// ============================================================

pub async fn create_team_leader(
    State(state): State<AppState>,
    Json(input): Json<CreateTeamLeaderInput>,
) -> ApiResult<(StatusCode, Json<TeamLeader>)> {
    state
        .db
        .create_team_leader(input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(input): Json<CreateStudentInput>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    state
        .db
        .create_student(input)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(internal_error)
}

pub async fn enroll_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(input): Json<EnrollInput>,
) -> ApiResult<StatusCode> {
    state
        .db
        .enroll(student_id, input.course_id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(internal_error)
}

// ============================================================
// Quiz submission
// ============================================================

/// Grade a submission, record it, and tell the learner where to go next.
///
/// A submission for a lesson the student cannot open is refused with 403
/// and the access decision; nothing is graded or stored.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(input): Json<SubmitQuizInput>,
) -> ApiResult<Response> {
    let quiz = state
        .db
        .get_quiz(input.quiz_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Quiz"))?;

    let lesson = state
        .db
        .get_lesson(quiz.lesson_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Lesson"))?;
    let module = state
        .db
        .get_module(lesson.module_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Module"))?;
    let course = state
        .db
        .get_course(module.course_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Course"))?;

    let decision =
        state
            .engine
            .can_access_lesson(student_id, &course.slug, &module.slug, &lesson.slug);
    if !decision.can_access {
        tracing::warn!(
            %student_id,
            lesson = %lesson.slug,
            reason = %decision.reason,
            "Submission refused for inaccessible lesson"
        );
        return Ok((StatusCode::FORBIDDEN, Json(decision)).into_response());
    }

    let record = grading::prepare_completion(student_id, &quiz, input).map_err(grading_error)?;
    let assignment = state.db.record_completion(record).map_err(internal_error)?;

    let next_lesson =
        state
            .engine
            .next_lesson_after(student_id, &course.slug, &module.slug, &lesson.slug);
    let progress = state
        .engine
        .course_progress(student_id, course.id)
        .map_err(progress_error)?;
    let course_completed =
        progress.total_lessons > 0 && progress.completed_lessons >= progress.total_lessons;

    if course_completed {
        tracing::info!(%student_id, course = %course.slug, "Course completed");
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResult {
            assignment,
            next_lesson,
            course_completed,
        }),
    )
        .into_response())
}

// ============================================================
// Progression
// ============================================================

/// Optional current position for status listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub current_module: Option<String>,
    pub current_lesson: Option<String>,
}

pub async fn course_statuses(
    State(state): State<AppState>,
    Path((student_id, course_slug)): Path<(Uuid, String)>,
    Query(query): Query<StatusQuery>,
) -> Json<Vec<ModuleStatus>> {
    Json(state.engine.statuses_for_course(
        student_id,
        &course_slug,
        query.current_module.as_deref(),
        query.current_lesson.as_deref(),
    ))
}

/// Always 200: a denial is a normal answer.
pub async fn module_access(
    State(state): State<AppState>,
    Path((student_id, course_slug, module_slug)): Path<(Uuid, String, String)>,
) -> Json<AccessDecision> {
    Json(
        state
            .engine
            .can_access_module(student_id, &course_slug, &module_slug),
    )
}

pub async fn lesson_access(
    State(state): State<AppState>,
    Path((student_id, course_slug, module_slug, lesson_slug)): Path<(Uuid, String, String, String)>,
) -> Json<AccessDecision> {
    Json(
        state
            .engine
            .can_access_lesson(student_id, &course_slug, &module_slug, &lesson_slug),
    )
}

pub async fn module_progress(
    State(state): State<AppState>,
    Path((student_id, course_slug, module_slug)): Path<(Uuid, String, String)>,
) -> ApiResult<Json<ModuleProgress>> {
    state
        .engine
        .module_progress(student_id, &course_slug, &module_slug)
        .map(Json)
        .ok_or_else(|| not_found("Module"))
}

/// `null` when there is no lesson to continue with.
pub async fn next_lesson(
    State(state): State<AppState>,
    Path((student_id, course_slug, module_slug, lesson_slug)): Path<(Uuid, String, String, String)>,
) -> Json<Option<NextLesson>> {
    Json(
        state
            .engine
            .next_lesson_after(student_id, &course_slug, &module_slug, &lesson_slug),
    )
}

// ============================================================
// Analytics
// ============================================================

pub async fn course_progress(
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CourseProgress>> {
    state
        .engine
        .course_progress(student_id, course_id)
        .map(Json)
        .map_err(progress_error)
}

pub async fn student_summary(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> ApiResult<Json<StudentSummary>> {
    state
        .engine
        .student_summary(student_id)
        .map(Json)
        .map_err(progress_error)
}

pub async fn team_leader_analytics(
    State(state): State<AppState>,
    Path(team_leader_id): Path<Uuid>,
) -> ApiResult<Json<TeamLeaderAnalytics>> {
    state
        .engine
        .team_leader_analytics(team_leader_id)
        .map(Json)
        .map_err(progress_error)
}
