mod fee_structure;

pub use fee_structure::{
    CreateFeeStructureRequest, FeeComponents, FeeScope, FeeStructure, FeeStructureFilter,
    UpdateFeeStructureRequest,
};
