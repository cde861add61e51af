// Read-only view of the academic records the ledger bills against.
// Students, departments and semesters are maintained elsewhere.

pub mod models;
pub mod repositories;

pub use models::{Semester, Student};
pub use repositories::DirectoryRepository;
