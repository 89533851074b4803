use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A learner. Called an "agent" when attached to a team leader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub team_leader_id: Option<Uuid>,
    /// Whether the account has been activated.
    pub is_activated: bool,
    pub created_at: DateTime<Utc>,
}

/// Owns zero or more students.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLeader {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentInput {
    pub name: String,
    pub email: String,
    pub team_leader_id: Option<Uuid>,
    #[serde(default)]
    pub is_activated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamLeaderInput {
    pub name: String,
    pub email: String,
}

/// Input for enrolling a student in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollInput {
    pub course_id: Uuid,
}
