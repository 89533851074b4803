use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course in the catalog.
///
/// Courses have no ordering among themselves. Everything below a course is
/// ordered: modules within the course and lessons within each module, both by
/// a zero-based `order_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    /// Whether the course is listed publicly.
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A module within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub slug: String,
    pub name: String,
    /// Zero-based position within the course. Unique per course.
    pub order_index: u32,
}

/// A lesson within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    /// Zero-based position within the module. Unique per module.
    pub order_index: u32,
}

/// A quiz attached to a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub title: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_option: usize,
}

/// Input for creating a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseInput {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Input for creating a module. The course comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleInput {
    pub slug: String,
    pub name: String,
    pub order_index: u32,
}

/// Input for creating a lesson. The module comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonInput {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub order_index: u32,
}

/// Input for attaching a quiz to a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizInput {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

/// A whole course with its modules and lessons, in order.
///
/// This is the read view the progression engine and analytics work from.
/// Modules are sorted ascending by `order_index`, and so are the lessons
/// inside each module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    pub course: Course,
    pub modules: Vec<ModuleOutline>,
}

/// A module together with its ordered lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutline {
    #[serde(flatten)]
    pub module: Module,
    pub lessons: Vec<LessonOutline>,
}

/// A lesson together with the number of quizzes attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOutline {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub quiz_count: u32,
}

impl CourseOutline {
    /// Total number of lessons across every module.
    pub fn lesson_count(&self) -> u32 {
        self.modules.iter().map(|m| m.lessons.len() as u32).sum()
    }

    /// Total number of quizzes attached to lessons of this course.
    pub fn quiz_count(&self) -> u32 {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .map(|l| l.quiz_count)
            .sum()
    }

    pub fn module_by_slug(&self, slug: &str) -> Option<&ModuleOutline> {
        self.modules.iter().find(|m| m.module.slug == slug)
    }

    /// Module at an exact order index.
    pub fn module_at(&self, order_index: u32) -> Option<&ModuleOutline> {
        self.modules
            .binary_search_by_key(&order_index, |m| m.module.order_index)
            .ok()
            .map(|i| &self.modules[i])
    }

    /// First module whose order index is strictly greater than `order_index`.
    pub fn module_after(&self, order_index: u32) -> Option<&ModuleOutline> {
        let start = self
            .modules
            .partition_point(|m| m.module.order_index <= order_index);
        self.modules.get(start)
    }

    /// Ids of every lesson in the course.
    pub fn lesson_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .map(|l| l.lesson.id)
    }
}

impl ModuleOutline {
    pub fn lesson_by_slug(&self, slug: &str) -> Option<&LessonOutline> {
        self.lessons.iter().find(|l| l.lesson.slug == slug)
    }

    /// Lesson at an exact order index.
    pub fn lesson_at(&self, order_index: u32) -> Option<&LessonOutline> {
        self.lessons
            .binary_search_by_key(&order_index, |l| l.lesson.order_index)
            .ok()
            .map(|i| &self.lessons[i])
    }

    /// First lesson whose order index is strictly greater than `order_index`.
    pub fn lesson_after(&self, order_index: u32) -> Option<&LessonOutline> {
        let start = self
            .lessons
            .partition_point(|l| l.lesson.order_index <= order_index);
        self.lessons.get(start)
    }
}
