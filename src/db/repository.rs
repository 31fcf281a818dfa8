use chrono::{SecondsFormat, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ClassFilter, ClassRecord, ClassRow, EnrolledStudent, EnrollmentResult, Student};
use crate::validation::ClassDefinition;

/// Microsecond precision keeps enrollment ordering stable for quick bursts.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Transactional access to classes, students and enrollments.
#[derive(Clone)]
pub struct EnrollmentStore {
    db: SqlitePool,
}

impl EnrollmentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }

    pub async fn create_class(&self, def: &ClassDefinition) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = timestamp();
        let days = serde_json::to_string(def.days())?;
        let syllabus = serde_json::to_string(def.syllabus())?;

        sqlx::query(
            r#"
            INSERT INTO classes
                (id, name, level, teacher, days, start_time, end_time,
                capacity, enrolled_count, syllabus, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(def.name())
        .bind(def.level().as_str())
        .bind(def.teacher())
        .bind(days)
        .bind(def.start_time())
        .bind(def.end_time())
        .bind(def.capacity())
        .bind(syllabus)
        .bind(now)
        .execute(&self.db)
        .await?;

        info!("created class {} ({}, {})", id, def.name(), def.level());
        Ok(id)
    }

    pub async fn get_classes(&self, filter: &ClassFilter) -> Result<Vec<ClassRecord>, AppError> {
        let rows = sqlx::query_as::<_, ClassRow>(
            r#"
            SELECT id, name, level, teacher, days, start_time, end_time,
                capacity, enrolled_count, syllabus, created_at
            FROM classes
            WHERE (?1 IS NULL OR level = ?1)
              AND (?2 IS NULL OR teacher = ?2)
            ORDER BY rowid
            "#,
        )
        .bind(filter.level())
        .bind(filter.teacher())
        .fetch_all(&self.db)
        .await?;

        debug!("fetched {} classes", rows.len());
        let classes = rows
            .into_iter()
            .map(ClassRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(classes)
    }

    pub async fn get_class(&self, id: &str) -> Result<Option<ClassRecord>, AppError> {
        let row = sqlx::query_as::<_, ClassRow>(
            r#"
            SELECT id, name, level, teacher, days, start_time, end_time,
                capacity, enrolled_count, syllabus, created_at
            FROM classes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(ClassRecord::try_from).transpose()?)
    }

    pub async fn count_classes(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    /// Enrolls `student_name` in the class, creating the student on first
    /// sight.
    ///
    /// The whole sequence runs in one transaction. Its first statement writes
    /// the class row, so the database write lock is held from before the
    /// seat count is read until commit; a concurrent enroll waits (bounded by
    /// the busy timeout) and then sees the updated count. Any failure rolls
    /// back the student insert and the counter together.
    pub async fn enroll(&self, class_id: &str, student_name: &str) -> Result<EnrollmentResult, AppError> {
        let mut tx = self.db.begin().await?;

        let locked = sqlx::query("UPDATE classes SET enrolled_count = enrolled_count WHERE id = ?1")
            .bind(class_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if locked == 0 {
            tx.rollback().await?;
            return Err(AppError::ClassNotFound(class_id.to_string()));
        }

        let (capacity, enrolled_count): (i64, i64) =
            sqlx::query_as("SELECT capacity, enrolled_count FROM classes WHERE id = ?1")
                .bind(class_id)
                .fetch_one(&mut *tx)
                .await?;
        if enrolled_count >= capacity {
            tx.rollback().await?;
            warn!("class {} is full ({}/{}), rejected {}", class_id, enrolled_count, capacity, student_name);
            return Err(AppError::ClassFull(class_id.to_string()));
        }

        let student_id = resolve_student(&mut *tx, student_name).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO enrollments (id, class_id, student_id, enrolled_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(class_id)
        .bind(&student_id)
        .bind(timestamp())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tx.rollback().await?;
                warn!("{} is already enrolled in class {}", student_name, class_id);
                return Err(AppError::AlreadyEnrolled {
                    class_id: class_id.to_string(),
                    student_name: student_name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        sqlx::query("UPDATE classes SET enrolled_count = enrolled_count + 1 WHERE id = ?1")
            .bind(class_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("enrolled {} in class {} ({}/{})", student_name, class_id, enrolled_count + 1, capacity);

        Ok(EnrollmentResult {
            message: format!("Successfully enrolled {}", student_name),
            class_id: class_id.to_string(),
            student_name: student_name.to_string(),
        })
    }

    /// Roster of a class, most recent enrollment first.
    pub async fn list_students(&self, class_id: &str) -> Result<Vec<EnrolledStudent>, AppError> {
        let students = sqlx::query_as::<_, EnrolledStudent>(
            r#"
            SELECT s.id, s.name, s.email, e.enrolled_at
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.class_id = ?1
            ORDER BY e.enrolled_at DESC, e.rowid DESC
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.db)
        .await?;
        Ok(students)
    }

    /// Live count of enrollment rows, independent of the class counter.
    pub async fn enrollment_count(&self, class_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE class_id = ?1")
            .bind(class_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn find_student_by_name(&self, name: &str) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, created_at FROM students WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(student)
    }
}

async fn find_student_id(conn: &mut SqliteConnection, name: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM students WHERE name = ?1")
        .bind(name)
        .fetch_optional(conn)
        .await
}

/// Lookup by name, insert on miss. A unique-name conflict means another
/// writer created the student first, so the lookup is repeated.
async fn resolve_student(conn: &mut SqliteConnection, name: &str) -> Result<String, sqlx::Error> {
    if let Some(id) = find_student_id(&mut *conn, name).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    let inserted = sqlx::query("INSERT INTO students (id, name, email, created_at) VALUES (?1, ?2, NULL, ?3)")
        .bind(&id)
        .bind(name)
        .bind(timestamp())
        .execute(&mut *conn)
        .await;

    match inserted {
        Ok(_) => {
            debug!("created student {} ({})", name, id);
            Ok(id)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => find_student_id(&mut *conn, name)
            .await?
            .ok_or(sqlx::Error::RowNotFound),
        Err(e) => Err(e),
    }
}
