use chrono::NaiveDate;
use uuid::Uuid;

use super::timezone::period_code;

/// Attempts made to find an unused voucher or receipt number before giving up
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Random zero-padded decimal suffix of `digits` length (1..=9)
pub fn random_digits(digits: u32) -> String {
    let digits = digits.clamp(1, 9);
    let modulus = 10u128.pow(digits);
    let value = Uuid::new_v4().as_u128() % modulus;
    format!("{:0width$}", value, width = digits as usize)
}

/// Reduces a roll number to the characters allowed inside a voucher number
pub fn sanitize_roll(roll_number: &str) -> String {
    roll_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// `<INSTITUTION>-<YYYYMM>-<ROLL>-<4 digits>`
pub fn voucher_number(institution: &str, issue_date: NaiveDate, roll_number: &str, suffix: &str) -> String {
    format!(
        "{}-{}-{}-{}",
        institution,
        period_code(issue_date),
        sanitize_roll(roll_number),
        suffix
    )
}

/// `RCP-<YYYYMM>-<5 digits>`
pub fn receipt_number(payment_date: NaiveDate, suffix: &str) -> String {
    format!("RCP-{}-{}", period_code(payment_date), suffix)
}
