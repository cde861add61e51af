mod assignment;
mod fee_account;

pub use assignment::{
    AssignedAccount, AssignmentFailure, AssignmentSummary, AutoAssignRequest, CohortTarget,
    ManualAssignRequest, ManualSource,
};
pub use fee_account::{
    AccountFilter, AccountStatus, EffectiveStatus, FeeAccount, FeeAccountRow, FeeAccountView,
    Settlement, StudentFees,
};
