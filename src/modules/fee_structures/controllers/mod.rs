mod fee_structure_controller;

pub use fee_structure_controller::configure;
