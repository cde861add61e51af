use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

use crate::modules::payments::{Payment, PaymentMethod};

/// GET /fees/reports/collection query
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub method: Option<PaymentMethod>,
}

/// Payment joined with the student it was collected from
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CollectedPayment {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub payment: Payment,
    pub student_id: String,
    pub roll_number: String,
    pub student_name: String,
    pub department_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub count: u64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub count: u64,
    pub amount: Decimal,
}

/// Money received in an inclusive date range
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub method: Option<PaymentMethod>,
    pub total_amount: Decimal,
    pub payment_count: u64,
    pub by_method: Vec<MethodTotal>,
    pub by_day: Vec<DailyTotal>,
    pub payments: Vec<CollectedPayment>,
}

impl CollectionReport {
    pub fn new(query: &CollectionQuery, payments: Vec<CollectedPayment>) -> Self {
        let mut by_method: BTreeMap<&'static str, MethodTotal> = BTreeMap::new();
        let mut by_day: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();

        for collected in &payments {
            let payment = &collected.payment;

            let method = by_method
                .entry(payment.method.as_str())
                .or_insert(MethodTotal {
                    method: payment.method,
                    count: 0,
                    amount: Decimal::ZERO,
                });
            method.count += 1;
            method.amount += payment.amount;

            let day = by_day.entry(payment.payment_date).or_insert(DailyTotal {
                date: payment.payment_date,
                count: 0,
                amount: Decimal::ZERO,
            });
            day.count += 1;
            day.amount += payment.amount;
        }

        Self {
            start_date: query.start_date,
            end_date: query.end_date,
            method: query.method,
            total_amount: payments.iter().map(|p| p.payment.amount).sum(),
            payment_count: payments.len() as u64,
            by_method: by_method.into_values().collect(),
            by_day: by_day.into_values().collect(),
            payments,
        }
    }
}
