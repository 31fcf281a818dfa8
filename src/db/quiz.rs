use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::repository::timestamp;
use crate::error::AppError;
use crate::models::{NewQuizRequest, Question, Quiz, QuizSummary};

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn create_quiz(&self, req: NewQuizRequest) -> Result<String, AppError>;
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, AppError>;
    async fn get_quiz(&self, id: &str) -> Result<Option<Quiz>, AppError>;
}

#[derive(FromRow)]
struct QuizRow {
    id: String,
    title: String,
    topic: String,
    difficulty: String,
    focus_mode: String,
    metadata: String,
    created_at: String,
}

#[derive(FromRow)]
struct QuestionRow {
    id: String,
    quiz_id: String,
    text: String,
    options: String,
    correct_answer: String,
    explanation: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = serde_json::Error;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            id: row.id,
            quiz_id: row.quiz_id,
            text: row.text,
            options: serde_json::from_str(&row.options)?,
            correct_answer: row.correct_answer,
            explanation: row.explanation,
        })
    }
}

pub struct SqliteQuizStore {
    db: SqlitePool,
}

impl SqliteQuizStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuizStore for SqliteQuizStore {
    async fn create_quiz(&self, req: NewQuizRequest) -> Result<String, AppError> {
        if req.title.trim().is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let metadata = serde_json::to_string(&req.metadata)?;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, topic, difficulty, focus_mode, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(req.title.trim())
        .bind(&req.topic)
        .bind(&req.difficulty)
        .bind(&req.focus_mode)
        .bind(metadata)
        .bind(timestamp())
        .execute(&mut *tx)
        .await?;

        for question in &req.questions {
            sqlx::query(
                r#"
                INSERT INTO questions (id, quiz_id, text, options, correct_answer, explanation)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&question.question)
            .bind(serde_json::to_string(&question.options)?)
            .bind(&question.correct_answer)
            .bind(&question.explanation)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("created quiz {} with {} questions", id, req.questions.len());
        Ok(id)
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, AppError> {
        let quizzes = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT q.id, q.title, q.topic, q.difficulty, q.focus_mode, q.created_at,
                COUNT(qu.id) AS question_count
            FROM quizzes q
            LEFT JOIN questions qu ON q.id = qu.quiz_id
            GROUP BY q.id
            ORDER BY q.created_at DESC, q.rowid DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(quizzes)
    }

    async fn get_quiz(&self, id: &str) -> Result<Option<Quiz>, AppError> {
        let Some(row) = sqlx::query_as::<_, QuizRow>(
            "SELECT id, title, topic, difficulty, focus_mode, metadata, created_at FROM quizzes WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, quiz_id, text, options, correct_answer, explanation
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Question::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Quiz {
            id: row.id,
            title: row.title,
            topic: row.topic,
            difficulty: row.difficulty,
            focus_mode: row.focus_mode,
            metadata: serde_json::from_str(&row.metadata)?,
            created_at: row.created_at,
            questions,
        }))
    }
}
