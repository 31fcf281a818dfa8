use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::{EnrollmentStore, QuizStore, SqliteQuizStore};
use crate::services::CatalogService;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub quizzes: Arc<dyn QuizStore>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            catalog: CatalogService::new(EnrollmentStore::new(db.clone())),
            quizzes: Arc::new(SqliteQuizStore::new(db)),
        }
    }
}
