use serde::{Deserialize, Serialize};

/// Outcome of an access check on a module or lesson.
///
/// Denials are ordinary values, not errors. When the learner is blocked by
/// unfinished material, `redirect_to` points at what must be completed first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub can_access: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_lesson_slug: Option<String>,
}

impl AccessDecision {
    pub fn granted(reason: impl Into<String>) -> Self {
        Self {
            can_access: true,
            reason: reason.into(),
            redirect_to: None,
            required_lesson_slug: None,
        }
    }

    /// A denial with no redirect target.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            can_access: false,
            reason: reason.into(),
            redirect_to: None,
            required_lesson_slug: None,
        }
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = Some(path.into());
        self
    }

    pub fn with_required_lesson(mut self, slug: impl Into<String>) -> Self {
        self.required_lesson_slug = Some(slug.into());
        self
    }
}

/// Navigation state of a lesson for one learner.
///
/// - `Locked`: Cannot be opened yet
/// - `Completed`: A quiz for this lesson has been submitted
/// - `Current`: The lesson the learner is looking at
/// - `Accessible`: Open, not completed, not current
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Locked,
    Completed,
    Current,
    Accessible,
}

/// Icon shown next to a lesson in the sidebar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Lock,
    Check,
    Play,
    Circle,
}

impl LessonStatus {
    pub fn icon(&self) -> StatusIcon {
        match self {
            Self::Locked => StatusIcon::Lock,
            Self::Completed => StatusIcon::Check,
            Self::Current => StatusIcon::Play,
            Self::Accessible => StatusIcon::Circle,
        }
    }

    pub fn can_access(&self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// One lesson row in a course status listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LessonStatusEntry {
    pub lesson_slug: String,
    pub lesson_name: String,
    pub order_index: u32,
    pub status: LessonStatus,
    pub can_access: bool,
    pub icon: StatusIcon,
}

/// One module in a course status listing, with its lessons in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatus {
    pub module_slug: String,
    pub module_name: String,
    pub lessons: Vec<LessonStatusEntry>,
}

/// Completion summary for a single module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub progress_percentage: u32,
    /// First lesson that is open and not yet completed.
    pub next_accessible_lesson: Option<LessonRef>,
}

/// Minimal lesson reference used in progress responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub lesson_slug: String,
    pub lesson_name: String,
    pub order_index: u32,
}

/// Where the learner lands after finishing a lesson.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NextLesson {
    pub module_slug: String,
    pub lesson_slug: String,
    pub lesson_name: String,
    pub path: String,
    /// True when the next lesson sits in a different module.
    pub crosses_module: bool,
}
