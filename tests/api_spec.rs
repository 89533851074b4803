use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use coursegate::api::{create_router, create_router_with_security, middleware::SecurityConfig};
use coursegate::db::Database;
use coursegate::models::*;
use serde_json::json;

fn test_db() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db
}

fn setup() -> TestServer {
    TestServer::new(create_router(test_db())).expect("Failed to create test server")
}

async fn create_student(server: &TestServer, name: &str) -> Student {
    server
        .post("/api/v1/students")
        .json(&json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) }))
        .await
        .json::<Student>()
}

/// Creates `sales-101` with modules `a` (a0, a1) and `b` (b0), one
/// two-question quiz per lesson. Returns the course and the quizzes in order.
async fn create_sales_course(server: &TestServer) -> (Course, Vec<Quiz>) {
    let course = server
        .post("/api/v1/courses")
        .json(&CreateCourseInput {
            slug: "sales-101".to_string(),
            name: "Sales 101".to_string(),
            description: Some("Basics".to_string()),
            is_public: true,
        })
        .await
        .json::<Course>();

    let mut quizzes = Vec::new();
    for (module_index, (module_slug, lessons)) in [("a", vec!["a0", "a1"]), ("b", vec!["b0"])].into_iter().enumerate() {
        server
            .post("/api/v1/courses/sales-101/modules")
            .json(&CreateModuleInput {
                slug: module_slug.to_string(),
                name: module_slug.to_uppercase(),
                order_index: module_index as u32,
            })
            .await
            .assert_status(StatusCode::CREATED);

        for (lesson_index, lesson_slug) in lessons.into_iter().enumerate() {
            server
                .post(&format!("/api/v1/courses/sales-101/modules/{}/lessons", module_slug))
                .json(&CreateLessonInput {
                    slug: lesson_slug.to_string(),
                    name: lesson_slug.to_uppercase(),
                    description: None,
                    video_url: None,
                    order_index: lesson_index as u32,
                })
                .await
                .assert_status(StatusCode::CREATED);

            let quiz = server
                .post(&format!(
                    "/api/v1/courses/sales-101/modules/{}/lessons/{}/quizzes",
                    module_slug, lesson_slug
                ))
                .json(&json!({
                    "title": format!("{} quiz", lesson_slug),
                    "questions": [
                        { "title": "One", "options": ["yes", "no"], "correctOption": 0 },
                        { "title": "Two", "options": ["yes", "no"], "correctOption": 1 }
                    ]
                }))
                .await
                .json::<Quiz>();
            quizzes.push(quiz);
        }
    }

    (course, quizzes)
}

async fn submit(server: &TestServer, student: &Student, quiz: &Quiz, answers: [usize; 2]) -> SubmissionResult {
    let response = server
        .post(&format!("/api/v1/students/{}/submissions", student.id))
        .json(&json!({ "quizId": quiz.id, "selectedAnswers": answers }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<SubmissionResult>()
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn returns_the_ordered_outline() {
        let server = setup();
        create_sales_course(&server).await;

        let response = server.get("/api/v1/courses/sales-101").await;

        response.assert_status_ok();
        let outline: CourseOutline = response.json();
        assert_eq!(outline.course.slug, "sales-101");
        assert_eq!(outline.modules.len(), 2);
        assert_eq!(outline.modules[0].lessons.len(), 2);
        assert_eq!(outline.modules[0].lessons[0].quiz_count, 1);
    }

    #[tokio::test]
    async fn lists_courses() {
        let server = setup();
        create_sales_course(&server).await;

        let courses: Vec<Course> = server.get("/api/v1/courses").await.json();
        assert_eq!(courses.len(), 1);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_course() {
        let server = setup();

        server.get("/api/v1/courses/missing").await.assert_status_not_found();
        server
            .post("/api/v1/courses/missing/modules")
            .json(&CreateModuleInput {
                slug: "a".to_string(),
                name: "A".to_string(),
                order_index: 0,
            })
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_409_for_duplicate_module_order() {
        let server = setup();
        create_sales_course(&server).await;

        server
            .post("/api/v1/courses/sales-101/modules")
            .json(&CreateModuleInput {
                slug: "c".to_string(),
                name: "C".to_string(),
                order_index: 0,
            })
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejects_quiz_with_invalid_answer_key() {
        let server = setup();
        create_sales_course(&server).await;

        server
            .post("/api/v1/courses/sales-101/modules/a/lessons/a0/quizzes")
            .json(&json!({
                "title": "Broken",
                "questions": [{ "title": "One", "options": ["yes"], "correctOption": 4 }]
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

mod submissions {
    use super::*;

    #[tokio::test]
    async fn grades_and_points_to_the_next_lesson() {
        let server = setup();
        let (_, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;

        let result = submit(&server, &student, &quizzes[0], [0, 0]).await;

        assert_eq!(result.assignment.number_of_questions, 2);
        assert_eq!(result.assignment.total_correct_answers, 1);
        let next = result.next_lesson.expect("Should continue");
        assert_eq!(next.path, "/courses/sales-101/a/a1");
        assert!(!result.course_completed);
    }

    #[tokio::test]
    async fn reports_course_completion_on_the_last_lesson() {
        let server = setup();
        let (_, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;

        submit(&server, &student, &quizzes[0], [0, 1]).await;
        let crossing = submit(&server, &student, &quizzes[1], [0, 1]).await;
        assert!(crossing.next_lesson.expect("Should cross").crosses_module);

        let last = submit(&server, &student, &quizzes[2], [0, 1]).await;
        assert!(last.next_lesson.is_none());
        assert!(last.course_completed);
    }

    #[tokio::test]
    async fn refuses_a_quiz_in_a_locked_lesson_without_recording_it() {
        let server = setup();
        let (course, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;

        let response = server
            .post(&format!("/api/v1/students/{}/submissions", student.id))
            .json(&json!({ "quizId": quizzes[2].id, "selectedAnswers": [0, 1] }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let decision: AccessDecision = response.json();
        assert!(!decision.can_access);
        assert_eq!(decision.redirect_to.as_deref(), Some("/courses/sales-101/a"));

        let progress: CourseProgress = server
            .get(&format!("/api/v1/students/{}/analytics/courses/{}", student.id, course.id))
            .await
            .json();
        assert_eq!(progress.completed_lessons, 0);
        assert_eq!(progress.total_questions_answered, 0);
    }

    #[tokio::test]
    async fn refuses_submissions_from_unknown_students() {
        let server = setup();
        let (_, quizzes) = create_sales_course(&server).await;

        let response = server
            .post(&format!("/api/v1/students/{}/submissions", uuid::Uuid::new_v4()))
            .json(&json!({ "quizId": quizzes[0].id, "selectedAnswers": [0, 1] }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let decision: AccessDecision = response.json();
        assert_eq!(decision.reason, "Student not found");
    }

    #[tokio::test]
    async fn rejects_wrong_answer_count() {
        let server = setup();
        let (_, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;

        server
            .post(&format!("/api/v1/students/{}/submissions", student.id))
            .json(&json!({ "quizId": quizzes[0].id, "selectedAnswers": [0] }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_quiz() {
        let server = setup();
        let student = create_student(&server, "Ana").await;

        server
            .post(&format!("/api/v1/students/{}/submissions", student.id))
            .json(&json!({ "quizId": uuid::Uuid::new_v4(), "selectedAnswers": [] }))
            .await
            .assert_status_not_found();
    }
}

mod progression {
    use super::*;

    #[tokio::test]
    async fn denies_a_locked_module_with_a_redirect() {
        let server = setup();
        create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;

        let response = server
            .get(&format!("/api/v1/students/{}/courses/sales-101/modules/b/access", student.id))
            .await;

        response.assert_status_ok();
        let decision: AccessDecision = response.json();
        assert!(!decision.can_access);
        assert_eq!(decision.redirect_to.as_deref(), Some("/courses/sales-101/a"));
    }

    #[tokio::test]
    async fn denies_unknown_students() {
        let server = setup();
        create_sales_course(&server).await;

        let response = server
            .get(&format!(
                "/api/v1/students/{}/courses/sales-101/modules/a/lessons/a0/access",
                uuid::Uuid::new_v4()
            ))
            .await;

        response.assert_status_ok();
        let decision: AccessDecision = response.json();
        assert!(!decision.can_access);
        assert_eq!(decision.reason, "Student not found");
    }

    #[tokio::test]
    async fn denies_unknown_courses_with_200() {
        let server = setup();
        let student = create_student(&server, "Ana").await;

        let response = server
            .get(&format!("/api/v1/students/{}/courses/missing/modules/a/lessons/a0/access", student.id))
            .await;

        response.assert_status_ok();
        let decision: AccessDecision = response.json();
        assert!(!decision.can_access);
        assert_eq!(decision.reason, "Course not found");
    }

    #[tokio::test]
    async fn lists_statuses_with_current_position() {
        let server = setup();
        let (_, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;
        submit(&server, &student, &quizzes[0], [0, 1]).await;

        let modules: Vec<ModuleStatus> = server
            .get(&format!("/api/v1/students/{}/courses/sales-101/statuses", student.id))
            .add_query_param("currentModule", "a")
            .add_query_param("currentLesson", "a1")
            .await
            .json();

        assert_eq!(modules[0].lessons[0].status, LessonStatus::Completed);
        assert_eq!(modules[0].lessons[1].status, LessonStatus::Current);
        assert_eq!(modules[1].lessons[0].status, LessonStatus::Locked);
    }

    #[tokio::test]
    async fn reports_module_progress() {
        let server = setup();
        let (_, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;
        submit(&server, &student, &quizzes[0], [0, 1]).await;

        let progress: ModuleProgress = server
            .get(&format!("/api/v1/students/{}/courses/sales-101/modules/a/progress", student.id))
            .await
            .json();

        assert_eq!(progress.progress_percentage, 50);
        assert_eq!(progress.next_accessible_lesson.map(|l| l.lesson_slug), Some("a1".to_string()));

        server
            .get(&format!("/api/v1/students/{}/courses/sales-101/modules/z/progress", student.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_null_when_there_is_no_next_lesson() {
        let server = setup();
        create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;

        let next: Option<NextLesson> = server
            .get(&format!("/api/v1/students/{}/courses/sales-101/modules/b/lessons/b0/next", student.id))
            .await
            .json();
        assert!(next.is_none());
    }
}

mod analytics {
    use super::*;

    #[tokio::test]
    async fn summarizes_enrolled_courses() {
        let server = setup();
        let (course, quizzes) = create_sales_course(&server).await;
        let student = create_student(&server, "Ana").await;
        server
            .post(&format!("/api/v1/students/{}/enrollments", student.id))
            .json(&EnrollInput { course_id: course.id })
            .await
            .assert_status(StatusCode::NO_CONTENT);
        submit(&server, &student, &quizzes[0], [0, 0]).await;

        // A second course the student never touches still counts in the means.
        let untouched = server
            .post("/api/v1/courses")
            .json(&CreateCourseInput {
                slug: "ops".to_string(),
                name: "Ops".to_string(),
                description: None,
                is_public: true,
            })
            .await
            .json::<Course>();
        server
            .post(&format!("/api/v1/students/{}/enrollments", student.id))
            .json(&EnrollInput { course_id: untouched.id })
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let summary: StudentSummary = server
            .get(&format!("/api/v1/students/{}/analytics", student.id))
            .await
            .json();
        assert_eq!(summary.total_courses, 2);
        assert_eq!(summary.average_progress, 17);
        assert_eq!(summary.overall_average_quiz_score, 25);
        assert_eq!(summary.overall_accuracy, 50);

        let progress: CourseProgress = server
            .get(&format!("/api/v1/students/{}/analytics/courses/{}", student.id, course.id))
            .await
            .json();
        assert_eq!(progress.completed_lessons, 1);
        assert_eq!(progress.overall_accuracy, 50);
    }

    #[tokio::test]
    async fn returns_team_analytics() {
        let server = setup();
        let leader = server
            .post("/api/v1/team-leaders")
            .json(&CreateTeamLeaderInput {
                name: "Lead".to_string(),
                email: "lead@example.com".to_string(),
            })
            .await
            .json::<TeamLeader>();
        server
            .post("/api/v1/students")
            .json(&json!({
                "name": "Agent",
                "email": "agent@example.com",
                "teamLeaderId": leader.id,
                "isActivated": true
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let analytics: TeamLeaderAnalytics = server
            .get(&format!("/api/v1/team-leaders/{}/analytics", leader.id))
            .await
            .json();
        assert_eq!(analytics.team_overview.total_agents, 1);
        assert_eq!(analytics.team_overview.active_agents, 1);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_student() {
        let server = setup();

        server
            .get(&format!("/api/v1/students/{}/analytics", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}

mod security {
    use super::*;

    #[tokio::test]
    async fn rejects_requests_without_the_api_key() {
        let app = create_router_with_security(test_db(), SecurityConfig::with_api_key("secret"));
        let server = TestServer::new(app).expect("Failed to create test server");

        server
            .get("/api/v1/health")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v1/health")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v1/health")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn rate_limits_by_client() {
        let app = create_router_with_security(test_db(), SecurityConfig::with_rate_limit(2));
        let server = TestServer::new(app).expect("Failed to create test server");

        server.get("/api/v1/health").await.assert_status_ok();
        server.get("/api/v1/health").await.assert_status_ok();
        server
            .get("/api/v1/health")
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}
