mod student;

pub use student::{Semester, Student};
