use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A student as seen by the fee ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub roll_number: String,
    pub full_name: String,
    pub email: Option<String>,
    pub department_id: String,
    pub is_active: bool,
}

/// A semester within an academic session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Semester {
    pub id: String,
    pub session_id: String,
    pub semester_number: i32,
    pub label: String,
}
