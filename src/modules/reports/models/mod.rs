mod collection_report;
mod fee_statistics;
mod unpaid_report;

pub use collection_report::{
    CollectedPayment, CollectionQuery, CollectionReport, DailyTotal, MethodTotal,
};
pub use fee_statistics::{
    AgingBucket, AgingBuckets, DepartmentTotals, FeeStatistics, StatisticsQuery, StatusCounts,
};
pub use unpaid_report::{UnpaidQuery, UnpaidReport};
