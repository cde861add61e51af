use chrono::NaiveDate;
use feeledger::modules::fee_structures::models::{FeeComponents, FeeScope};
use feeledger::modules::fee_structures::{FeeStructure, FeeStructureRepository};
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use uuid::Uuid;

/// One department, one session with semester 1 and a priced structure
pub struct Campus {
    pub department_id: String,
    pub session_id: String,
    pub semester_id: String,
    pub structure: FeeStructure,
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

pub fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

pub async fn seed_department(pool: &MySqlPool) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO departments (id, code, name) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(format!("D{}", short_id()))
        .bind("Computer Science")
        .execute(pool)
        .await
        .expect("seed department");
    id
}

pub async fn seed_session(pool: &MySqlPool) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO academic_sessions (id, name, is_current) VALUES (?, ?, TRUE)")
        .bind(&id)
        .bind(format!("S-{}", short_id()))
        .execute(pool)
        .await
        .expect("seed session");
    id
}

pub async fn seed_semester(pool: &MySqlPool, session_id: &str, number: i32) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO semesters (id, session_id, semester_number, label) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(session_id)
    .bind(number)
    .bind(format!("Semester {}", number))
    .execute(pool)
    .await
    .expect("seed semester");
    id
}

pub async fn seed_student(pool: &MySqlPool, department_id: &str, active: bool) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO students (id, roll_number, full_name, email, department_id, is_active)
        VALUES (?, ?, ?, NULL, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(format!("R-{}", short_id()))
    .bind("Test Student")
    .bind(department_id)
    .bind(active)
    .execute(pool)
    .await
    .expect("seed student");
    id
}

/// Tuition 10000 + lab 2000, late fee 50 per day
pub fn standard_components() -> FeeComponents {
    FeeComponents {
        tuition_fee: Decimal::new(10_000, 0),
        lab_fee: Decimal::new(2_000, 0),
        ..Default::default()
    }
}

pub async fn seed_campus(pool: &MySqlPool) -> Campus {
    let department_id = seed_department(pool).await;
    let session_id = seed_session(pool).await;
    let semester_id = seed_semester(pool, &session_id, 1).await;

    let structure = FeeStructure::new(
        FeeScope {
            department_id: department_id.clone(),
            semester_number: 1,
            session_id: session_id.clone(),
        },
        standard_components(),
        Decimal::new(50, 0),
        Some("Semester 1".to_string()),
        "admin-1",
    )
    .expect("valid structure");
    FeeStructureRepository::new(pool.clone())
        .create(&structure)
        .await
        .expect("seed fee structure");

    Campus {
        department_id,
        session_id,
        semester_id,
        structure,
    }
}
