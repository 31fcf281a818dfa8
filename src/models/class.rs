use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{Level, Weekday};

/// Default seat count applied when a create request omits `capacity`.
pub const DEFAULT_CAPACITY: i64 = 20;

fn default_capacity() -> i64 {
    DEFAULT_CAPACITY
}

/// Meeting days as submitted: either `"Mon, Wed"` or `["Monday", "Wednesday"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaysInput {
    Text(String),
    List(Vec<String>),
}

impl DaysInput {
    /// Non-blank raw tokens, in submission order. A text value is split on
    /// runs of `,` and `;`.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            DaysInput::Text(text) => text
                .split([',', ';'])
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect(),
            DaysInput::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassRequest {
    pub name: String,
    pub level: String,
    pub teacher: String,
    pub days: DaysInput,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    #[serde(default)]
    pub syllabus: Option<Vec<String>>,
    #[serde(default)]
    pub auto_generate_syllabus: bool,
}

/// A persisted class as callers see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
    pub level: Level,
    pub teacher: String,
    pub days: Vec<Weekday>,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i64,
    pub enrolled_count: i64,
    pub syllabus: Vec<String>,
    pub created_at: String,
}

/// Raw `classes` row; `days` and `syllabus` hold JSON arrays.
#[derive(Debug, Clone, FromRow)]
pub struct ClassRow {
    pub id: String,
    pub name: String,
    pub level: String,
    pub teacher: String,
    pub days: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i64,
    pub enrolled_count: i64,
    pub syllabus: String,
    pub created_at: String,
}

impl TryFrom<ClassRow> for ClassRecord {
    type Error = sqlx::Error;

    fn try_from(row: ClassRow) -> Result<Self, Self::Error> {
        let level = row
            .level
            .parse::<Level>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let days: Vec<Weekday> =
            serde_json::from_str(&row.days).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let syllabus: Vec<String> =
            serde_json::from_str(&row.syllabus).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(ClassRecord {
            id: row.id,
            name: row.name,
            level,
            teacher: row.teacher,
            days,
            start_time: row.start_time,
            end_time: row.end_time,
            capacity: row.capacity,
            enrolled_count: row.enrolled_count,
            syllabus,
            created_at: row.created_at,
        })
    }
}

/// Exact-match narrowing for class listings. Blank values mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassFilter {
    pub level: Option<String>,
    pub teacher: Option<String>,
}

impl ClassFilter {
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref().filter(|s| !s.is_empty())
    }

    pub fn teacher(&self) -> Option<&str> {
        self.teacher.as_deref().filter(|s| !s.is_empty())
    }
}
