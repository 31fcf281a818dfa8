pub mod class;
pub mod enrollment;
pub mod quiz;

pub use class::{ClassFilter, ClassRecord, ClassRow, DaysInput, NewClassRequest, DEFAULT_CAPACITY};
pub use enrollment::{
    ClassRoster, EnrollRequest, EnrolledStudent, EnrollmentConfirmation, EnrollmentResult, Student,
};
pub use quiz::{NewQuestion, NewQuizRequest, Question, Quiz, QuizSummary};
