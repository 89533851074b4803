mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;
use crate::store::ProgressStore;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Course operations
    // ============================================================

    pub fn get_all_courses(&self) -> Result<Vec<Course>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, slug, name, description, is_public, created_at, updated_at
             FROM courses ORDER BY name",
        )?;

        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    pub fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let course = conn
            .query_row(
                "SELECT id, slug, name, description, is_public, created_at, updated_at
                 FROM courses WHERE id = ?",
                [id.to_string()],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn get_course_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let course = conn
            .query_row(
                "SELECT id, slug, name, description, is_public, created_at, updated_at
                 FROM courses WHERE slug = ?",
                [slug],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn create_course(&self, input: CreateCourseInput) -> Result<Course> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO courses (id, slug, name, description, is_public, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.slug,
                &input.name,
                &input.description,
                if input.is_public { 1 } else { 0 },
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Course {
            id,
            slug: input.slug,
            name: input.name,
            description: input.description,
            is_public: input.is_public,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn delete_course(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM courses WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Module operations
    // ============================================================

    pub fn get_modules(&self, course_id: Uuid) -> Result<Vec<Module>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, course_id, slug, name, order_index
             FROM modules WHERE course_id = ? ORDER BY order_index",
        )?;

        let modules = stmt
            .query_map([course_id.to_string()], module_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(modules)
    }

    pub fn get_module_by_slug(&self, course_id: Uuid, slug: &str) -> Result<Option<Module>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let module = conn
            .query_row(
                "SELECT id, course_id, slug, name, order_index
                 FROM modules WHERE course_id = ? AND slug = ?",
                (course_id.to_string(), slug),
                module_from_row,
            )
            .optional()?;
        Ok(module)
    }

    pub fn create_module(&self, course_id: Uuid, input: CreateModuleInput) -> Result<Module> {
        self.get_course(course_id)?
            .ok_or_else(|| anyhow::anyhow!("Course not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO modules (id, course_id, slug, name, order_index) VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                course_id.to_string(),
                &input.slug,
                &input.name,
                input.order_index,
            ),
        )?;

        Ok(Module {
            id,
            course_id,
            slug: input.slug,
            name: input.name,
            order_index: input.order_index,
        })
    }

    pub fn get_module(&self, id: Uuid) -> Result<Option<Module>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let module = conn
            .query_row(
                "SELECT id, course_id, slug, name, order_index FROM modules WHERE id = ?",
                [id.to_string()],
                module_from_row,
            )
            .optional()?;
        Ok(module)
    }

    // ============================================================
    // Lesson operations
    // ============================================================

    pub fn get_lesson(&self, id: Uuid) -> Result<Option<Lesson>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let lesson = conn
            .query_row(
                "SELECT id, module_id, slug, name, description, video_url, order_index
                 FROM lessons WHERE id = ?",
                [id.to_string()],
                lesson_from_row,
            )
            .optional()?;
        Ok(lesson)
    }

    pub fn get_lesson_by_slug(&self, module_id: Uuid, slug: &str) -> Result<Option<Lesson>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let lesson = conn
            .query_row(
                "SELECT id, module_id, slug, name, description, video_url, order_index
                 FROM lessons WHERE module_id = ? AND slug = ?",
                (module_id.to_string(), slug),
                lesson_from_row,
            )
            .optional()?;
        Ok(lesson)
    }

    pub fn create_lesson(&self, module_id: Uuid, input: CreateLessonInput) -> Result<Lesson> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let module_exists: i32 = conn.query_row(
            "SELECT COUNT(*) FROM modules WHERE id = ?",
            [module_id.to_string()],
            |row| row.get(0),
        )?;
        if module_exists == 0 {
            anyhow::bail!("Module not found");
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO lessons (id, module_id, slug, name, description, video_url, order_index)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                module_id.to_string(),
                &input.slug,
                &input.name,
                &input.description,
                &input.video_url,
                input.order_index,
            ),
        )?;

        Ok(Lesson {
            id,
            module_id,
            slug: input.slug,
            name: input.name,
            description: input.description,
            video_url: input.video_url,
            order_index: input.order_index,
        })
    }

    // ============================================================
    // Quiz operations
    // ============================================================

    pub fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let quiz = conn
            .query_row(
                "SELECT id, lesson_id, title, questions FROM quizzes WHERE id = ?",
                [id.to_string()],
                quiz_from_row,
            )
            .optional()?;
        Ok(quiz)
    }

    pub fn get_quizzes(&self, lesson_id: Uuid) -> Result<Vec<Quiz>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, lesson_id, title, questions FROM quizzes WHERE lesson_id = ? ORDER BY title",
        )?;

        let quizzes = stmt
            .query_map([lesson_id.to_string()], quiz_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(quizzes)
    }

    pub fn create_quiz(&self, lesson_id: Uuid, input: CreateQuizInput) -> Result<Quiz> {
        self.get_lesson(lesson_id)?
            .ok_or_else(|| anyhow::anyhow!("Lesson not found"))?;

        if input.questions.is_empty() {
            anyhow::bail!("A quiz must have at least one question");
        }
        if let Some(bad) = input
            .questions
            .iter()
            .find(|q| q.correct_option >= q.options.len())
        {
            anyhow::bail!(
                "Question \"{}\" must have its correct option among its options",
                bad.title
            );
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO quizzes (id, lesson_id, title, questions) VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                lesson_id.to_string(),
                &input.title,
                serde_json::to_string(&input.questions)?,
            ),
        )?;

        Ok(Quiz {
            id,
            lesson_id,
            title: input.title,
            questions: input.questions,
        })
    }

    // ============================================================
    // Outline
    // ============================================================

    /// Load a course with every module and lesson in order, in two queries.
    pub fn get_course_outline(&self, course: Course) -> Result<CourseOutline> {
        let modules = self.get_modules(course.id)?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT l.id, l.module_id, l.slug, l.name, l.description, l.video_url, l.order_index,
                    (SELECT COUNT(*) FROM quizzes q WHERE q.lesson_id = l.id)
             FROM lessons l JOIN modules m ON m.id = l.module_id
             WHERE m.course_id = ?
             ORDER BY m.order_index, l.order_index",
        )?;

        let mut lessons_by_module: HashMap<Uuid, Vec<LessonOutline>> = HashMap::new();
        let rows = stmt.query_map([course.id.to_string()], |row| {
            Ok(LessonOutline {
                lesson: lesson_from_row(row)?,
                quiz_count: row.get(7)?,
            })
        })?;
        for lesson in rows {
            let lesson = lesson?;
            lessons_by_module
                .entry(lesson.lesson.module_id)
                .or_default()
                .push(lesson);
        }

        let modules = modules
            .into_iter()
            .map(|module| ModuleOutline {
                lessons: lessons_by_module.remove(&module.id).unwrap_or_default(),
                module,
            })
            .collect();

        Ok(CourseOutline { course, modules })
    }

    // ============================================================
    // People operations
    // ============================================================

    pub fn create_team_leader(&self, input: CreateTeamLeaderInput) -> Result<TeamLeader> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO team_leaders (id, name, email, created_at) VALUES (?, ?, ?, ?)",
            (id.to_string(), &input.name, &input.email, now.to_rfc3339()),
        )?;

        Ok(TeamLeader {
            id,
            name: input.name,
            email: input.email,
            created_at: now,
        })
    }

    pub fn get_team_leader(&self, id: Uuid) -> Result<Option<TeamLeader>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let leader = conn
            .query_row(
                "SELECT id, name, email, created_at FROM team_leaders WHERE id = ?",
                [id.to_string()],
                |row| {
                    Ok(TeamLeader {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        email: row.get(2)?,
                        created_at: parse_datetime(row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;
        Ok(leader)
    }

    pub fn create_student(&self, input: CreateStudentInput) -> Result<Student> {
        if let Some(leader_id) = input.team_leader_id {
            self.get_team_leader(leader_id)?
                .ok_or_else(|| anyhow::anyhow!("Team leader not found"))?;
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO students (id, name, email, team_leader_id, is_activated, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.email,
                input.team_leader_id.map(|u| u.to_string()),
                if input.is_activated { 1 } else { 0 },
                now.to_rfc3339(),
            ),
        )?;

        Ok(Student {
            id,
            name: input.name,
            email: input.email,
            team_leader_id: input.team_leader_id,
            is_activated: input.is_activated,
            created_at: now,
        })
    }

    pub fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let student = conn
            .query_row(
                "SELECT id, name, email, team_leader_id, is_activated, created_at
                 FROM students WHERE id = ?",
                [id.to_string()],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    pub fn set_student_activated(&self, id: Uuid, is_activated: bool) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE students SET is_activated = ? WHERE id = ?",
            (if is_activated { 1 } else { 0 }, id.to_string()),
        )?;
        Ok(rows > 0)
    }

    pub fn get_agents(&self, team_leader_id: Uuid) -> Result<Vec<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, email, team_leader_id, is_activated, created_at
             FROM students WHERE team_leader_id = ? ORDER BY name",
        )?;

        let agents = stmt
            .query_map([team_leader_id.to_string()], student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(agents)
    }

    /// Enroll a student in a course. Enrolling twice is a no-op.
    pub fn enroll(&self, student_id: Uuid, course_id: Uuid) -> Result<()> {
        self.get_student(student_id)?
            .ok_or_else(|| anyhow::anyhow!("Student not found"))?;
        self.get_course(course_id)?
            .ok_or_else(|| anyhow::anyhow!("Course not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT OR IGNORE INTO enrollments (student_id, course_id, enrolled_at) VALUES (?, ?, ?)",
            (
                student_id.to_string(),
                course_id.to_string(),
                Utc::now().to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    pub fn get_enrolled_courses(&self, student_id: Uuid) -> Result<Vec<Course>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT c.id, c.slug, c.name, c.description, c.is_public, c.created_at, c.updated_at
             FROM courses c JOIN enrollments e ON e.course_id = c.id
             WHERE e.student_id = ? ORDER BY c.name",
        )?;

        let courses = stmt
            .query_map([student_id.to_string()], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    // ============================================================
    // Completion ledger
    // ============================================================

    /// Record a graded quiz submission.
    ///
    /// One row is kept per `(student, lesson)`. A resubmission replaces the
    /// stored attempt only when its ratio of correct answers is strictly
    /// higher, or when the stored attempt had no questions; otherwise the
    /// existing row stays. Returns the row as stored.
    pub fn record_completion(&self, input: RecordCompletionInput) -> Result<CompletedAssignment> {
        if input.total_correct_answers > input.number_of_questions {
            anyhow::bail!("Correct answers must not exceed the number of questions");
        }
        let quiz = self
            .get_quiz(input.quiz_id)?
            .ok_or_else(|| anyhow::anyhow!("Quiz not found"))?;
        if quiz.lesson_id != input.lesson_id {
            anyhow::bail!("Quiz not found for lesson");
        }
        self.get_student(input.student_id)?
            .ok_or_else(|| anyhow::anyhow!("Student not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO completed_assignments
                 (id, student_id, lesson_id, quiz_id, selected_answers,
                  number_of_questions, total_correct_answers, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(student_id, lesson_id) DO UPDATE SET
                 quiz_id = excluded.quiz_id,
                 selected_answers = excluded.selected_answers,
                 number_of_questions = excluded.number_of_questions,
                 total_correct_answers = excluded.total_correct_answers,
                 completed_at = excluded.completed_at
             WHERE (completed_assignments.number_of_questions = 0
                    AND excluded.number_of_questions > 0)
                OR (excluded.number_of_questions > 0
                    AND excluded.total_correct_answers * completed_assignments.number_of_questions
                        > completed_assignments.total_correct_answers * excluded.number_of_questions)",
            (
                Uuid::new_v4().to_string(),
                input.student_id.to_string(),
                input.lesson_id.to_string(),
                input.quiz_id.to_string(),
                serde_json::to_string(&input.selected_answers)?,
                input.number_of_questions,
                input.total_correct_answers,
                now.to_rfc3339(),
            ),
        )?;

        let stored = conn.query_row(
            "SELECT id, student_id, lesson_id, quiz_id, selected_answers,
                    number_of_questions, total_correct_answers, completed_at
             FROM completed_assignments WHERE student_id = ? AND lesson_id = ?",
            (input.student_id.to_string(), input.lesson_id.to_string()),
            assignment_from_row,
        )?;

        tracing::debug!(
            student_id = %input.student_id,
            lesson_id = %input.lesson_id,
            correct = stored.total_correct_answers,
            questions = stored.number_of_questions,
            "Recorded completion"
        );

        Ok(stored)
    }

    pub fn get_completion(
        &self,
        student_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<CompletedAssignment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let assignment = conn
            .query_row(
                "SELECT id, student_id, lesson_id, quiz_id, selected_answers,
                        number_of_questions, total_correct_answers, completed_at
                 FROM completed_assignments WHERE student_id = ? AND lesson_id = ?",
                (student_id.to_string(), lesson_id.to_string()),
                assignment_from_row,
            )
            .optional()?;
        Ok(assignment)
    }

    /// Ledger rows for a student restricted to an explicit set of lessons.
    pub fn get_completions_for_lessons(
        &self,
        student_id: Uuid,
        lesson_ids: &[Uuid],
    ) -> Result<Vec<CompletedAssignment>> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let placeholders = vec!["?"; lesson_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, student_id, lesson_id, quiz_id, selected_answers,
                    number_of_questions, total_correct_answers, completed_at
             FROM completed_assignments
             WHERE student_id = ? AND lesson_id IN ({})
             ORDER BY completed_at",
            placeholders
        );

        let params = std::iter::once(student_id.to_string())
            .chain(lesson_ids.iter().map(|id| id.to_string()));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), assignment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn get_completions_for_module(
        &self,
        student_id: Uuid,
        module_id: Uuid,
    ) -> Result<Vec<CompletedAssignment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT a.id, a.student_id, a.lesson_id, a.quiz_id, a.selected_answers,
                    a.number_of_questions, a.total_correct_answers, a.completed_at
             FROM completed_assignments a JOIN lessons l ON l.id = a.lesson_id
             WHERE a.student_id = ? AND l.module_id = ?
             ORDER BY a.completed_at",
        )?;

        let rows = stmt
            .query_map(
                (student_id.to_string(), module_id.to_string()),
                assignment_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn get_completions_for_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<CompletedAssignment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT a.id, a.student_id, a.lesson_id, a.quiz_id, a.selected_answers,
                    a.number_of_questions, a.total_correct_answers, a.completed_at
             FROM completed_assignments a
             JOIN lessons l ON l.id = a.lesson_id
             JOIN modules m ON m.id = l.module_id
             WHERE a.student_id = ? AND m.course_id = ?
             ORDER BY a.completed_at",
        )?;

        let rows = stmt
            .query_map(
                (student_id.to_string(), course_id.to_string()),
                assignment_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl ProgressStore for Database {
    fn course_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        self.get_course_by_slug(slug)
    }

    fn course_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        self.get_course(id)
    }

    fn course_outline(&self, course: Course) -> Result<CourseOutline> {
        self.get_course_outline(course)
    }

    fn completions_in_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<CompletedAssignment>> {
        self.get_completions_for_course(student_id, course_id)
    }

    fn student(&self, id: Uuid) -> Result<Option<Student>> {
        self.get_student(id)
    }

    fn team_leader(&self, id: Uuid) -> Result<Option<TeamLeader>> {
        self.get_team_leader(id)
    }

    fn enrolled_courses(&self, student_id: Uuid) -> Result<Vec<Course>> {
        self.get_enrolled_courses(student_id)
    }

    fn agents_of(&self, team_leader_id: Uuid) -> Result<Vec<Student>> {
        self.get_agents(team_leader_id)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Platform data directory location of the database file.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "coursegate")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("coursegate.db"))
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: parse_uuid(row.get::<_, String>(0)?),
        slug: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        is_public: row.get::<_, i32>(4)? != 0,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn module_from_row(row: &Row<'_>) -> rusqlite::Result<Module> {
    Ok(Module {
        id: parse_uuid(row.get::<_, String>(0)?),
        course_id: parse_uuid(row.get::<_, String>(1)?),
        slug: row.get(2)?,
        name: row.get(3)?,
        order_index: row.get(4)?,
    })
}

fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<Lesson> {
    Ok(Lesson {
        id: parse_uuid(row.get::<_, String>(0)?),
        module_id: parse_uuid(row.get::<_, String>(1)?),
        slug: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        video_url: row.get(5)?,
        order_index: row.get(6)?,
    })
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    let questions_json: String = row.get(3)?;
    Ok(Quiz {
        id: parse_uuid(row.get::<_, String>(0)?),
        lesson_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        questions: serde_json::from_str(&questions_json).unwrap_or_default(),
    })
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        team_leader_id: row.get::<_, Option<String>>(3)?.map(parse_uuid),
        is_activated: row.get::<_, i32>(4)? != 0,
        created_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<CompletedAssignment> {
    let answers_json: String = row.get(4)?;
    Ok(CompletedAssignment {
        id: parse_uuid(row.get::<_, String>(0)?),
        student_id: parse_uuid(row.get::<_, String>(1)?),
        lesson_id: parse_uuid(row.get::<_, String>(2)?),
        quiz_id: parse_uuid(row.get::<_, String>(3)?),
        selected_answers: serde_json::from_str(&answers_json).unwrap_or_default(),
        number_of_questions: row.get(5)?,
        total_correct_answers: row.get(6)?,
        completed_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
