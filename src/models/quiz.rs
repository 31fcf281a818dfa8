use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

fn default_difficulty() -> String {
    "intermediate".to_string()
}

fn default_focus_mode() -> String {
    "comprehension".to_string()
}

fn default_metadata() -> Value {
    Value::Object(Default::default())
}

/// Accepts `"B"` as well as an option index such as `1`.
fn answer_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(deserialize_with = "answer_as_string")]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuizRequest {
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_focus_mode")]
    pub focus_mode: String,
    #[serde(default = "default_metadata")]
    pub metadata: Value,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub focus_mode: String,
    pub created_at: String,
    pub question_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub focus_mode: String,
    pub metadata: Value,
    pub created_at: String,
    pub questions: Vec<Question>,
}
