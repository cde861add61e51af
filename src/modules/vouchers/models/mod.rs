mod voucher;

pub use voucher::{FeeVoucher, IssueVoucherRequest, QrPayload, VoucherSlip, VoucherStatus};
