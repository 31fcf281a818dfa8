use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: String,
}

/// One line of a class roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EnrolledStudent {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub enrolled_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    pub student_name: String,
}

/// What the store reports after a committed enrollment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentResult {
    pub message: String,
    pub class_id: String,
    pub student_name: String,
}

/// [`EnrollmentResult`] plus the class counter re-read after commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentConfirmation {
    pub message: String,
    pub class_id: String,
    pub student_name: String,
    pub enrolled_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassRoster {
    pub class_id: String,
    pub enrolled_count: i64,
    pub students: Vec<EnrolledStudent>,
}
