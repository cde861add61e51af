// Fee structure catalog: priced bundles of fee components per
// (department, semester number, academic session).

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use models::{FeeComponents, FeeStructure};
pub use repositories::FeeStructureRepository;
pub use services::FeeStructureService;
