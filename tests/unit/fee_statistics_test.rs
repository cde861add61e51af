use chrono::NaiveDate;
use feeledger::modules::fee_accounts::models::FeeAccountRow;
use feeledger::modules::fee_accounts::{FeeAccount, FeeAccountView, LateFeeCalculator};
use feeledger::modules::reports::FeeStatistics;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn view(department: &str, total_cents: u64, paid_cents: u64, days_to_due: i64) -> FeeAccountView {
    let due_date = today() + chrono::Duration::days(days_to_due);
    let mut account = FeeAccount::new(
        "stu",
        "sem",
        None,
        Decimal::new(total_cents as i64, 2),
        due_date,
        None,
        "admin",
    )
    .unwrap();
    if paid_cents > 0 {
        let settlement = account.settle(Decimal::new(paid_cents as i64, 2)).unwrap();
        account.paid_amount = settlement.paid_amount;
        account.due_amount = settlement.due_amount;
        account.status = settlement.status;
    }
    let row = FeeAccountRow {
        account,
        roll_number: "R-1".into(),
        student_name: "Student".into(),
        department_id: department.into(),
        semester_number: 1,
        semester_label: "Semester 1".into(),
        session_id: "2026".into(),
        late_fee_per_day: Decimal::new(100, 2),
    };
    let assessment = LateFeeCalculator::assess_row(&row, today());
    FeeAccountView::new(row, assessment)
}

#[test]
fn test_nothing_billed_reports_zero_percent() {
    let stats = FeeStatistics::from_accounts(&[]);
    assert_eq!(stats.total_billed, Decimal::ZERO);
    assert_eq!(stats.collection_percentage, Decimal::ZERO);
}

#[test]
fn test_ninety_days_late_is_in_61_to_90_bucket() {
    let stats = FeeStatistics::from_accounts(&[view("cs", 10_000, 0, -90)]);
    assert_eq!(stats.aging.days_61_90.accounts, 1);
    assert_eq!(stats.aging.over_90.accounts, 0);
    assert_eq!(stats.accrued_late_fees, Decimal::new(9_000, 2));
}

proptest! {
    /// Property: billed = collected + outstanding, overall and per department
    #[test]
    fn prop_totals_reconcile(
        accounts in prop::collection::vec(
            (0usize..3, 1u64..1_000_000u64, 0u64..=100u64, -200i64..200i64),
            0..30,
        ),
    ) {
        let departments = ["cs", "ee", "me"];
        let views: Vec<FeeAccountView> = accounts
            .iter()
            .map(|&(dept, total, paid_pct, days)| {
                let paid = total * paid_pct / 100;
                view(departments[dept], total, paid, days)
            })
            .collect();

        let stats = FeeStatistics::from_accounts(&views);

        prop_assert_eq!(stats.accounts as usize, views.len());
        prop_assert_eq!(stats.total_billed, stats.total_collected + stats.total_outstanding);
        for dept in &stats.by_department {
            prop_assert_eq!(dept.total_billed, dept.total_collected + dept.total_outstanding);
        }

        let aging = stats.aging;
        let bucketed = aging.not_yet_due.outstanding
            + aging.days_1_30.outstanding
            + aging.days_31_60.outstanding
            + aging.days_61_90.outstanding
            + aging.over_90.outstanding;
        prop_assert_eq!(bucketed, stats.total_outstanding);

        let counted = stats.by_status.pending
            + stats.by_status.partial
            + stats.by_status.paid
            + stats.by_status.overdue;
        prop_assert_eq!(counted, stats.accounts);
        prop_assert!(stats.collection_percentage <= Decimal::ONE_HUNDRED);
    }
}
