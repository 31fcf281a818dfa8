//! Normalisation and validation of proposed class definitions.
//!
//! Everything here is pure: a [`NewClassRequest`] goes in, an immutable
//! [`ClassDefinition`] or the first [`ValidationError`] comes out.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NewClassRequest;

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Elementary,
    #[serde(rename = "Pre-Intermediate")]
    PreIntermediate,
    Intermediate,
    #[serde(rename = "Upper-Intermediate")]
    UpperIntermediate,
    Advanced,
    Proficient,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Beginner,
        Level::Elementary,
        Level::PreIntermediate,
        Level::Intermediate,
        Level::UpperIntermediate,
        Level::Advanced,
        Level::Proficient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Elementary => "Elementary",
            Level::PreIntermediate => "Pre-Intermediate",
            Level::Intermediate => "Intermediate",
            Level::UpperIntermediate => "Upper-Intermediate",
            Level::Advanced => "Advanced",
            Level::Proficient => "Proficient",
        }
    }

    fn allowed() -> String {
        Self::ALL.map(|l| l.as_str()).join(", ")
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    /// Exact match on the canonical name. Older seed files spell the
    /// hyphenated levels with U+2011, which is read as the same level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = s.replace('\u{2011}', "-");
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == canonical)
            .ok_or_else(|| ValidationError::UnknownLevel {
                level: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Full name for a capitalised token, abbreviations included.
    fn from_capitalized(token: &str) -> Option<Self> {
        let day = match token {
            "Monday" | "Mon" => Weekday::Monday,
            "Tuesday" | "Tue" | "Tues" => Weekday::Tuesday,
            "Wednesday" | "Wed" => Weekday::Wednesday,
            "Thursday" | "Thu" | "Thur" | "Thurs" => Weekday::Thursday,
            "Friday" | "Fri" => Weekday::Friday,
            "Saturday" | "Sat" => Weekday::Saturday,
            "Sunday" | "Sun" => Weekday::Sunday,
            _ => return None,
        };
        Some(day)
    }

    fn allowed() -> String {
        Self::ALL.map(|d| d.as_str()).join(", ")
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("level '{level}' not recognised; valid levels are: {}", Level::allowed())]
    UnknownLevel { level: String },

    #[error("at least one meeting day must be provided")]
    NoDays,

    #[error("invalid day(s): {}; allowed values are: {}", .days.join(", "), Weekday::allowed())]
    InvalidDays { days: Vec<String> },

    #[error("invalid {field} '{value}'; expected HH:MM (24-hour)")]
    InvalidTime { field: &'static str, value: String },

    #[error("end_time ('{end}') must be later than start_time ('{start}')")]
    TimeOrder { start: String, end: String },

    #[error("capacity must be a positive integer, got {capacity}")]
    InvalidCapacity { capacity: i64 },

    #[error("no syllabus defined for level '{level}'")]
    NoSyllabus { level: Level },
}

impl ValidationError {
    /// The input field the error is about.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::UnknownLevel { .. } => "level",
            ValidationError::NoDays | ValidationError::InvalidDays { .. } => "days",
            ValidationError::InvalidTime { field, .. } => field,
            ValidationError::TimeOrder { .. } => "end_time",
            ValidationError::InvalidCapacity { .. } => "capacity",
            ValidationError::NoSyllabus { .. } => "syllabus",
        }
    }
}

/// A class definition that passed every rule. Fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    name: String,
    level: Level,
    teacher: String,
    days: Vec<Weekday>,
    start_time: String,
    end_time: String,
    capacity: i64,
    syllabus: Vec<String>,
}

impl ClassDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn teacher(&self) -> &str {
        &self.teacher
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn syllabus(&self) -> &[String] {
        &self.syllabus
    }
}

/// Python-style capitalisation: first character upper, the rest lower.
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Canonical spelling of a day token; unknown tokens stay capitalised so the
/// error can echo them.
fn normalize_day(token: &str) -> String {
    let capitalized = capitalize(token.trim());
    match Weekday::from_capitalized(&capitalized) {
        Some(day) => day.as_str().to_string(),
        None => capitalized,
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn check_time(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if TIME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        })
    }
}

fn parse_days(tokens: Vec<String>) -> Result<Vec<Weekday>, ValidationError> {
    if tokens.is_empty() {
        return Err(ValidationError::NoDays);
    }

    let mut days = Vec::with_capacity(tokens.len());
    let mut invalid = Vec::new();
    for token in tokens {
        match Weekday::from_capitalized(&token) {
            Some(day) => days.push(day),
            None => invalid.push(token),
        }
    }

    if invalid.is_empty() {
        Ok(days)
    } else {
        Err(ValidationError::InvalidDays { days: invalid })
    }
}

const DEFAULT_SYLLABI: &[(Level, &[&str])] = &[
    (
        Level::Beginner,
        &[
            "Greetings & Introductions",
            "Alphabet & Numbers",
            "Family & Personal Information",
            "Daily Routines",
            "Simple Present (Yes/No, Wh-questions)",
        ],
    ),
    (
        Level::Elementary,
        &[
            "Describing People & Places",
            "Present Continuous",
            "Past Simple (Regular verbs)",
            "Shopping & Money",
            "Basic Prepositions of Time & Place",
        ],
    ),
    (
        Level::PreIntermediate,
        &[
            "Comparatives & Superlatives",
            "Past Simple (Irregular verbs)",
            "Future (will, going-to)",
            "Modals for Ability & Permission",
            "Simple Conditional (type 0/1)",
        ],
    ),
    (
        Level::Intermediate,
        &[
            "Present Perfect Simple",
            "Relative Clauses",
            "Reported Speech (statements)",
            "Passive Voice (present & past)",
            "Phrasal Verbs - Everyday Topics",
        ],
    ),
    (
        Level::UpperIntermediate,
        &[
            "Present Perfect Continuous",
            "Mixed Conditionals",
            "Reported Speech (questions & commands)",
            "Advanced Phrasal Verbs & Idioms",
            "Writing Formal Emails & Letters",
        ],
    ),
    (
        Level::Advanced,
        &[
            "Complex Subordination (that-clauses, infinitives)",
            "Advanced Modals (must, have to, ought to)",
            "Collocations & Lexical Pairs",
            "Academic Writing Structure",
            "Debate & Presentation Skills",
        ],
    ),
    (
        Level::Proficient,
        &[
            "Nuanced Register & Style",
            "Dialectal Variations & Slang",
            "Critical Analysis of Texts",
            "Advanced Literature Discussion",
            "Teaching Methodology Overview",
        ],
    ),
];

/// Starter curriculum for a level.
pub fn default_syllabus_for(level: Level) -> Result<Vec<String>, ValidationError> {
    DEFAULT_SYLLABI
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, topics)| topics.iter().map(|t| t.to_string()).collect())
        .ok_or(ValidationError::NoSyllabus { level })
}

/// Checks run in a fixed order and stop at the first failure: name and
/// teacher, level, days, time format, time ordering, capacity.
pub fn validate_and_build(input: NewClassRequest) -> Result<ClassDefinition, ValidationError> {
    let name = non_empty("name", &input.name)?;
    let teacher = non_empty("teacher", &input.teacher)?;
    let day_tokens: Vec<String> = input.days.tokens().into_iter().map(normalize_day).collect();

    let level: Level = input.level.parse()?;
    let days = parse_days(day_tokens)?;

    check_time("start_time", &input.start_time)?;
    check_time("end_time", &input.end_time)?;
    if input.end_time <= input.start_time {
        return Err(ValidationError::TimeOrder {
            start: input.start_time,
            end: input.end_time,
        });
    }

    if input.capacity <= 0 {
        return Err(ValidationError::InvalidCapacity {
            capacity: input.capacity,
        });
    }

    let syllabus = match input.syllabus {
        Some(topics) => topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None if input.auto_generate_syllabus => default_syllabus_for(level)?,
        None => Vec::new(),
    };

    Ok(ClassDefinition {
        name,
        level,
        teacher,
        days,
        start_time: input.start_time,
        end_time: input.end_time,
        capacity: input.capacity,
        syllabus,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DaysInput;

    fn request() -> NewClassRequest {
        NewClassRequest {
            name: "  Beginner Conversation - A ".to_string(),
            level: "Beginner".to_string(),
            teacher: " Maria".to_string(),
            days: DaysInput::Text("Monday, Wednesday".to_string()),
            start_time: "09:30".to_string(),
            end_time: "10:45".to_string(),
            capacity: 15,
            syllabus: None,
            auto_generate_syllabus: false,
        }
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let def = validate_and_build(request()).expect("request should validate");
        assert_eq!(def.name(), "Beginner Conversation - A");
        assert_eq!(def.teacher(), "Maria");
        assert_eq!(def.level(), Level::Beginner);
        assert_eq!(def.days(), &[Weekday::Monday, Weekday::Wednesday]);
        assert_eq!(def.capacity(), 15);
        assert!(def.syllabus().is_empty());
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut req = request();
        req.start_time = "09:00".to_string();
        req.end_time = "08:59".to_string();
        let err = validate_and_build(req).expect_err("end before start");
        assert!(matches!(err, ValidationError::TimeOrder { .. }));
        assert_eq!(err.field(), "end_time");

        let mut req = request();
        req.start_time = "09:00".to_string();
        req.end_time = "09:00".to_string();
        assert!(validate_and_build(req).is_err());

        let mut req = request();
        req.start_time = "09:00".to_string();
        req.end_time = "09:01".to_string();
        assert!(validate_and_build(req).is_ok());
    }

    #[test]
    fn test_time_format() {
        for bad in ["9:00", "24:00", "12:60", "12.30", " 09:00", ""] {
            let mut req = request();
            req.start_time = bad.to_string();
            let err = validate_and_build(req).expect_err(bad);
            assert_eq!(
                err,
                ValidationError::InvalidTime {
                    field: "start_time",
                    value: bad.to_string()
                }
            );
            assert!(err.to_string().contains("HH:MM"));
        }

        let mut req = request();
        req.start_time = "00:00".to_string();
        req.end_time = "23:59".to_string();
        assert!(validate_and_build(req).is_ok());
    }

    #[test]
    fn test_day_spellings_normalize_identically() {
        let mut a = request();
        a.days = DaysInput::Text("mon, WED".to_string());
        let mut b = request();
        b.days = DaysInput::List(vec!["Monday".to_string(), "Wednesday".to_string()]);

        let a = validate_and_build(a).expect("abbreviated days");
        let b = validate_and_build(b).expect("full days");
        assert_eq!(a.days(), b.days());
        assert_eq!(a.days(), &[Weekday::Monday, Weekday::Wednesday]);
    }

    #[test]
    fn test_semicolons_and_case() {
        let mut req = request();
        req.days = DaysInput::Text("tuesday;THURS;; sat".to_string());
        let def = validate_and_build(req).expect("days should parse");
        assert_eq!(
            def.days(),
            &[Weekday::Tuesday, Weekday::Thursday, Weekday::Saturday]
        );
    }

    #[test]
    fn test_duplicate_days_pass_through() {
        let mut req = request();
        req.days = DaysInput::List(vec!["Monday".to_string(), "monday".to_string()]);
        let def = validate_and_build(req).expect("duplicates are kept");
        assert_eq!(def.days(), &[Weekday::Monday, Weekday::Monday]);
    }

    #[test]
    fn test_unknown_and_missing_days() {
        let mut req = request();
        req.days = DaysInput::Text("Monday, Funday".to_string());
        let err = validate_and_build(req).expect_err("Funday is not a day");
        assert_eq!(
            err,
            ValidationError::InvalidDays {
                days: vec!["Funday".to_string()]
            }
        );
        assert!(err.to_string().contains("Sunday"));

        let mut req = request();
        req.days = DaysInput::Text(" , ;".to_string());
        assert_eq!(validate_and_build(req), Err(ValidationError::NoDays));
    }

    #[test]
    fn test_unknown_level_lists_allowed_set() {
        let mut req = request();
        req.level = "Genius".to_string();
        let err = validate_and_build(req).expect_err("Genius is not a level");
        assert_eq!(err.field(), "level");
        let message = err.to_string();
        assert!(message.contains("Genius"));
        for level in Level::ALL {
            assert!(message.contains(level.as_str()), "{message}");
        }
    }

    #[test]
    fn test_level_is_not_coerced() {
        let mut req = request();
        req.level = "beginner".to_string();
        assert!(validate_and_build(req).is_err());

        let mut req = request();
        req.level = "Upper\u{2011}Intermediate".to_string();
        let def = validate_and_build(req).expect("non-breaking hyphen spelling");
        assert_eq!(def.level(), Level::UpperIntermediate);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut req = request();
        req.level = "Genius".to_string();
        req.days = DaysInput::Text("Funday".to_string());
        req.capacity = 0;
        let err = validate_and_build(req).expect_err("several problems");
        assert_eq!(err.field(), "level");

        let mut req = request();
        req.name = "   ".to_string();
        req.level = "Genius".to_string();
        assert_eq!(
            validate_and_build(req),
            Err(ValidationError::EmptyField { field: "name" })
        );
    }

    #[test]
    fn test_capacity_must_be_positive() {
        for capacity in [0, -3] {
            let mut req = request();
            req.capacity = capacity;
            assert_eq!(
                validate_and_build(req),
                Err(ValidationError::InvalidCapacity { capacity })
            );
        }
    }

    #[test]
    fn test_syllabus_handling() {
        let mut req = request();
        req.auto_generate_syllabus = true;
        let def = validate_and_build(req).expect("auto syllabus");
        assert_eq!(def.syllabus().len(), 5);
        assert_eq!(def.syllabus()[0], "Greetings & Introductions");

        let mut req = request();
        req.auto_generate_syllabus = true;
        req.syllabus = Some(vec![" Essay Structure ".to_string(), "  ".to_string()]);
        let def = validate_and_build(req).expect("explicit syllabus wins");
        assert_eq!(def.syllabus(), &["Essay Structure".to_string()]);
    }

    #[test]
    fn test_every_level_has_a_syllabus() {
        for level in Level::ALL {
            let topics = default_syllabus_for(level).expect("table covers every level");
            assert!(!topics.is_empty());
        }
    }
}
