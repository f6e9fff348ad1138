//! End-to-end scenarios over the service layer

use std::collections::BTreeSet;

use chorebook::config::paths::ChorebookPaths;
use chorebook::ledger;
use chorebook::models::{Money, Principal, Recurrence};
use chorebook::recurrence;
use chorebook::reports::BalanceReport;
use chorebook::services::{
    ChoreFilter, ChoreService, CreateChoreInput, CreateExpenseInput, EditExpenseInput,
    ExpenseService, HouseholdService,
};
use chorebook::storage::Storage;
use chorebook::ChorebookError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

struct Household {
    _temp_dir: TempDir,
    storage: Storage,
    a: Principal,
    b: Principal,
    c: Principal,
}

fn household() -> Household {
    let temp_dir = TempDir::new().unwrap();
    let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());
    let storage = Storage::new(paths).unwrap();
    storage.load_all().unwrap();

    let service = HouseholdService::new(&storage);
    let (admin, home) = service
        .register("Alex", "alex@example.com", "Maple Street")
        .unwrap();
    let mut approved = Vec::new();
    for (name, email) in [("Blair", "blair@example.com"), ("Casey", "casey@example.com")] {
        let pending = service
            .request_join(name, email, &home.invitation_code)
            .unwrap();
        approved.push(
            service
                .approve_member(&admin.principal(), pending.id)
                .unwrap()
                .principal(),
        );
    }

    Household {
        _temp_dir: temp_dir,
        storage,
        a: admin.principal(),
        b: approved[0],
        c: approved[1],
    }
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn chore_input(h: &Household, title: &str, due: DateTime<Utc>) -> CreateChoreInput {
    CreateChoreInput {
        title: title.into(),
        description: None,
        assigned_to: h.b.member_id,
        due_date: due,
        priority: Default::default(),
        category: "general".into(),
        recurrence: None,
    }
}

fn groceries(h: &Household) -> CreateExpenseInput {
    CreateExpenseInput {
        title: "Groceries".into(),
        description: None,
        category: None,
        amount: Money::from_units(90),
        paid_by: Some(h.a.member_id),
        split_between: vec![h.a.member_id, h.b.member_id, h.c.member_id],
        date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
    }
}

#[test]
fn three_way_split_settles_once_everyone_pays() {
    let h = household();
    let expenses = ExpenseService::new(&h.storage);
    let now = Utc::now();
    let expense = expenses.create(&h.a, groceries(&h)).unwrap();

    assert_eq!(ledger::compute_share(&expense).unwrap(), Money::from_units(30));
    assert_eq!(
        ledger::amount_owed(&expense, h.b.member_id).unwrap(),
        Money::from_units(30)
    );
    assert_eq!(ledger::amount_owed(&expense, h.a.member_id).unwrap(), Money::zero());

    expenses
        .record_payment(&h.b, expense.id, Money::from_units(20), None, now)
        .unwrap();
    let stored = expenses.get(&h.a, expense.id).unwrap();
    assert_eq!(
        ledger::amount_owed(&stored, h.b.member_id).unwrap(),
        Money::from_units(10)
    );
    assert!(!stored.is_settled());

    expenses
        .record_payment(&h.b, expense.id, Money::from_units(10), None, now)
        .unwrap();
    expenses
        .record_payment(&h.c, expense.id, Money::from_units(30), Some("cash".into()), now)
        .unwrap();

    let stored = expenses.get(&h.a, expense.id).unwrap();
    let status = ledger::settlement_status(&stored).unwrap();
    assert_eq!(status.total_paid, Money::from_units(60));
    assert_eq!(status.total_owed, Money::from_units(60));
    assert!(stored.is_settled());

    let balances = BalanceReport::generate(&h.storage, &h.a).unwrap();
    assert!(balances.total_outstanding().is_zero());
}

#[test]
fn overpayment_leaves_the_ledger_untouched() {
    let h = household();
    let expenses = ExpenseService::new(&h.storage);
    let expense = expenses.create(&h.a, groceries(&h)).unwrap();

    let err = expenses
        .record_payment(&h.b, expense.id, Money::from_units(40), None, Utc::now())
        .unwrap_err();
    assert!(matches!(err, ChorebookError::Overpayment { .. }));

    let stored = expenses.get(&h.a, expense.id).unwrap();
    assert!(stored.payments.is_empty());
    assert_eq!(stored, expense);
}

#[test]
fn shares_sum_to_amount_regardless_of_order() {
    let h = household();
    let expenses = ExpenseService::new(&h.storage);
    let mut input = groceries(&h);
    input.amount = Money::from_cents(10_000);
    let forward = expenses.create(&h.a, input.clone()).unwrap();
    input.split_between.reverse();
    let reversed = expenses.create(&h.a, input).unwrap();

    let forward_shares = ledger::shares(&forward).unwrap();
    let reversed_shares = ledger::shares(&reversed).unwrap();
    assert_eq!(forward_shares, reversed_shares);
    assert_eq!(
        forward_shares.values().copied().sum::<Money>(),
        Money::from_cents(10_000)
    );
}

#[test]
fn amount_owed_never_increases_as_payments_accrue() {
    let h = household();
    let expenses = ExpenseService::new(&h.storage);
    let expense = expenses.create(&h.a, groceries(&h)).unwrap();

    let mut previous = Money::from_units(30);
    for cents in [500, 1_250, 1_000, 250] {
        expenses
            .record_payment(&h.c, expense.id, Money::from_cents(cents), None, Utc::now())
            .unwrap();
        let stored = expenses.get(&h.a, expense.id).unwrap();
        let owed = ledger::amount_owed(&stored, h.c.member_id).unwrap();
        assert!(owed <= previous);
        assert!(!owed.is_negative());
        previous = owed;
    }
    assert!(previous.is_zero());
}

#[test]
fn manual_override_is_independent_of_payments() {
    let h = household();
    let expenses = ExpenseService::new(&h.storage);
    let now = Utc::now();
    let expense = expenses.create(&h.a, groceries(&h)).unwrap();

    let toggled = expenses.toggle_settled(&h.c, expense.id, now).unwrap();
    assert!(toggled.is_settled());
    assert_eq!(toggled.manual_override, Some(true));
    assert!(!toggled.payment_settled);

    let cleared = expenses.clear_override(&h.c, expense.id, now).unwrap();
    assert!(!cleared.is_settled());
}

#[test]
fn editing_the_split_revalues_shares() {
    let h = household();
    let expenses = ExpenseService::new(&h.storage);
    let expense = expenses.create(&h.a, groceries(&h)).unwrap();

    let edited = expenses
        .edit(
            &h.a,
            expense.id,
            EditExpenseInput {
                split_between: Some(vec![h.a.member_id, h.b.member_id]),
                ..Default::default()
            },
        )
        .unwrap();
    let expected: BTreeSet<_> = [h.a.member_id, h.b.member_id].into_iter().collect();
    assert_eq!(edited.split_between, expected);
    assert_eq!(
        ledger::amount_owed(&edited, h.b.member_id).unwrap(),
        Money::from_units(45)
    );
    assert_eq!(ledger::amount_owed(&edited, h.c.member_id).unwrap(), Money::zero());
}

#[test]
fn weekly_chore_materializes_once() {
    let h = household();
    let chores = ChoreService::new(&h.storage);
    let mut input = chore_input(&h, "Bins", at(2024, 1, 1));
    input.recurrence = Some(Recurrence::weekly(1));
    let chore = chores.create(&h.a, input).unwrap();

    let completed = chores.toggle_complete(&h.b, chore.id, at(2024, 1, 2)).unwrap();
    assert_eq!(completed.next_due_date, Some(at(2024, 1, 8)));

    let first = chores.run_sweeps(at(2024, 1, 10)).unwrap();
    assert_eq!(first.materialized.len(), 1);
    assert!(first.missed.is_empty());

    let second = chores.run_sweeps(at(2024, 1, 10)).unwrap();
    assert!(second.materialized.is_empty());

    let series = chores.list(&h.a, &ChoreFilter::default(), at(2024, 1, 10)).unwrap();
    assert_eq!(series.len(), 2);
    let next = series.iter().find(|c| c.occurrence == 1).unwrap();
    assert_eq!(next.due_date, at(2024, 1, 8));
    assert_eq!(next.series_id, chore.series_id);
    assert!(!next.completed);
}

#[test]
fn overdue_chore_is_missed_once_and_cleared_on_completion() {
    let h = household();
    let chores = ChoreService::new(&h.storage);
    let chore = chores
        .create(&h.a, chore_input(&h, "Mop floor", at(2024, 3, 1)))
        .unwrap();

    let first = chores.run_sweeps(at(2024, 3, 4)).unwrap();
    assert_eq!(first.missed.len(), 1);
    let second = chores.run_sweeps(at(2024, 3, 4)).unwrap();
    assert!(second.missed.is_empty());
    assert_eq!(chores.missed_tasks(&h.a).unwrap().len(), 1);

    chores.toggle_complete(&h.b, chore.id, at(2024, 3, 5)).unwrap();
    assert!(chores.missed_tasks(&h.a).unwrap().is_empty());
}

#[test]
fn only_admin_or_assignee_may_complete() {
    let h = household();
    let chores = ChoreService::new(&h.storage);
    let chore = chores
        .create(&h.a, chore_input(&h, "Dishes", at(2030, 1, 1)))
        .unwrap();

    let err = chores.toggle_complete(&h.c, chore.id, Utc::now()).unwrap_err();
    assert!(err.is_unauthorized());
    assert!(chores.toggle_complete(&h.a, chore.id, Utc::now()).unwrap().completed);
}

#[test]
fn month_end_recurrence_clamps() {
    let due = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    assert_eq!(
        recurrence::next_due_date(due, &Recurrence::monthly(1)),
        Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap()
    );
    assert_eq!(
        recurrence::next_due_date(due, &Recurrence::weekly(2)),
        due + chrono::Duration::days(14)
    );
}
