use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::db::EnrollmentStore;
use crate::error::AppError;
use crate::models::{ClassFilter, ClassRecord, ClassRoster, EnrollmentConfirmation, NewClassRequest};
use crate::validation::{ValidationError, validate_and_build};

/// Caller-facing operations: validation first, then the store.
#[derive(Clone)]
pub struct CatalogService {
    store: EnrollmentStore,
}

/// Per-item result of a bulk create.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemOutcome {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateResult {
    pub message: String,
    pub count: usize,
    pub classes: Vec<ClassRecord>,
    pub outcomes: Vec<BulkItemOutcome>,
}

impl CatalogService {
    pub fn new(store: EnrollmentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EnrollmentStore {
        &self.store
    }

    /// Validates, persists, and returns the class as stored.
    pub async fn create_class_request(&self, req: NewClassRequest) -> Result<ClassRecord, AppError> {
        let def = validate_and_build(req)?;
        let id = self.store.create_class(&def).await?;
        self.store
            .get_class(&id)
            .await?
            .ok_or(AppError::ClassNotFound(id))
    }

    /// Creates every valid element; invalid or failing ones are skipped and
    /// only show up in `outcomes`.
    pub async fn bulk_create(&self, raw: Vec<Value>) -> BulkCreateResult {
        let mut classes = Vec::new();
        let mut outcomes = Vec::with_capacity(raw.len());

        for (index, item) in raw.into_iter().enumerate() {
            let created = match serde_json::from_value::<NewClassRequest>(item) {
                Ok(req) => self.create_class_request(req).await,
                Err(e) => Err(AppError::Json(e)),
            };

            match created {
                Ok(class) => {
                    outcomes.push(BulkItemOutcome {
                        index,
                        class_id: Some(class.id.clone()),
                        error: None,
                    });
                    classes.push(class);
                }
                Err(e) => {
                    warn!("skipping bulk item #{}: {}", index, e);
                    outcomes.push(BulkItemOutcome {
                        index,
                        class_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let count = classes.len();
        info!("bulk create: {} of {} classes created", count, outcomes.len());
        BulkCreateResult {
            message: format!("Created {} classes", count),
            count,
            classes,
            outcomes,
        }
    }

    /// Enrolls and reports the class counter as it stands after commit.
    pub async fn enroll_request(
        &self,
        class_id: &str,
        student_name: &str,
    ) -> Result<EnrollmentConfirmation, AppError> {
        let student_name = student_name.trim();
        if student_name.is_empty() {
            return Err(ValidationError::EmptyField { field: "student_name" }.into());
        }

        let result = self.store.enroll(class_id, student_name).await?;
        let class = self.get_class(class_id).await?;

        Ok(EnrollmentConfirmation {
            message: result.message,
            class_id: result.class_id,
            student_name: result.student_name,
            enrolled_count: class.enrolled_count,
        })
    }

    pub async fn get_classes(&self, filter: &ClassFilter) -> Result<Vec<ClassRecord>, AppError> {
        self.store.get_classes(filter).await
    }

    pub async fn get_class(&self, id: &str) -> Result<ClassRecord, AppError> {
        self.store
            .get_class(id)
            .await?
            .ok_or_else(|| AppError::ClassNotFound(id.to_string()))
    }

    pub async fn list_students(&self, class_id: &str) -> Result<ClassRoster, AppError> {
        let class = self.get_class(class_id).await?;
        let students = self.store.list_students(class_id).await?;
        Ok(ClassRoster {
            class_id: class.id,
            enrolled_count: class.enrolled_count,
            students,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::setup_test_db;
    use crate::models::DaysInput;
    use crate::validation::Weekday;

    async fn service() -> CatalogService {
        CatalogService::new(EnrollmentStore::new(setup_test_db().await))
    }

    fn class_json(name: &str, level: &str) -> Value {
        json!({
            "name": name,
            "level": level,
            "teacher": "Anna",
            "days": "Mon, Wed",
            "start_time": "09:00",
            "end_time": "10:30",
            "capacity": 12
        })
    }

    #[tokio::test]
    async fn test_create_class_request_returns_stored_record() {
        let service = service().await;
        let req = NewClassRequest {
            name: " Business English ".to_string(),
            level: "Upper-Intermediate".to_string(),
            teacher: "Tom".to_string(),
            days: DaysInput::Text("mon, WED".to_string()),
            start_time: "18:00".to_string(),
            end_time: "19:30".to_string(),
            capacity: 10,
            syllabus: None,
            auto_generate_syllabus: false,
        };

        let class = service.create_class_request(req).await.expect("Failed to create class");
        assert_eq!(class.name, "Business English");
        assert_eq!(class.days, vec![Weekday::Monday, Weekday::Wednesday]);
        assert_eq!(class.enrolled_count, 0);
        assert!(!class.id.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_level_persists_nothing() {
        let service = service().await;
        let req: NewClassRequest = serde_json::from_value(class_json("Genius Club", "Genius")).expect("parse");

        let err = service.create_class_request(req).await.expect_err("Genius is not a level");
        match err {
            AppError::Validation(e) => {
                assert_eq!(e.field(), "level");
                assert!(e.to_string().contains("Proficient"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(service.store().count_classes().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_bulk_create_skips_invalid_items() {
        let service = service().await;
        let mut bad_time = class_json("Late", "Beginner");
        bad_time["end_time"] = json!("08:00");

        let result = service
            .bulk_create(vec![
                class_json("One", "Beginner"),
                class_json("Two", "Genius"),
                class_json("Three", "Advanced"),
                bad_time,
                class_json("Four", "Proficient"),
            ])
            .await;

        assert_eq!(result.count, 3);
        assert_eq!(result.classes.len(), 3);
        assert_eq!(result.message, "Created 3 classes");
        let names: Vec<_> = result.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Three", "Four"]);

        assert_eq!(result.outcomes.len(), 5);
        assert!(result.outcomes[1].error.is_some());
        assert!(result.outcomes[3].class_id.is_none());

        let stored = service.get_classes(&ClassFilter::default()).await.expect("list");
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_bulk_create_tolerates_malformed_items() {
        let service = service().await;
        let result = service
            .bulk_create(vec![json!({"name": "No fields"}), json!(42), class_json("Ok", "Elementary")])
            .await;
        assert_eq!(result.count, 1);
        assert_eq!(result.outcomes[2].index, 2);
    }

    #[tokio::test]
    async fn test_enroll_request_reports_updated_count() {
        let service = service().await;
        let req: NewClassRequest = serde_json::from_value(class_json("One", "Beginner")).expect("parse");
        let class = service.create_class_request(req).await.expect("create");

        let confirmation = service.enroll_request(&class.id, " Alice ").await.expect("enroll");
        assert_eq!(confirmation.enrolled_count, 1);
        assert_eq!(confirmation.student_name, "Alice");

        let err = service.enroll_request(&class.id, "Alice").await.expect_err("duplicate");
        assert!(matches!(err, AppError::AlreadyEnrolled { .. }));
        assert_eq!(service.get_class(&class.id).await.expect("get").enrolled_count, 1);

        let err = service.enroll_request(&class.id, "   ").await.expect_err("blank name");
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyField { field: "student_name" })));
    }

    #[tokio::test]
    async fn test_reads_report_missing_classes() {
        let service = service().await;
        assert!(matches!(service.get_class("missing").await, Err(AppError::ClassNotFound(_))));
        assert!(matches!(service.list_students("missing").await, Err(AppError::ClassNotFound(_))));
        assert!(matches!(
            service.enroll_request("missing", "Alice").await,
            Err(AppError::ClassNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_students_roster() {
        let service = service().await;
        let req: NewClassRequest = serde_json::from_value(class_json("One", "Beginner")).expect("parse");
        let class = service.create_class_request(req).await.expect("create");

        service.enroll_request(&class.id, "Alice").await.expect("enroll");
        service.enroll_request(&class.id, "Bob").await.expect("enroll");

        let roster = service.list_students(&class.id).await.expect("roster");
        assert_eq!(roster.class_id, class.id);
        assert_eq!(roster.enrolled_count, 2);
        assert_eq!(roster.students[0].name, "Bob");
        assert_eq!(roster.students[1].name, "Alice");
    }
}
