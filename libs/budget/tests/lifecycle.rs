mod support;

use budget::service::OPEN_CYCLE_ATTEMPTS;
use budget::{AlertLevel, BudgetError};
use support::{Harness, account, d, draft};
use uuid::Uuid;

#[tokio::test]
async fn registration_opens_the_first_cycle() {
    let h = Harness::new();
    let user = h.register("2500").await;

    let cycles = h.service.list_cycles(user.id).await.unwrap();
    assert_eq!(cycles.len(), 1);
    assert_eq!(user.current_cycle_id, Some(cycles[0].id));
    assert_eq!(cycles[0].salary, d("2500"));

    let summary = h.service.cycle_summary(user.id).await.unwrap();
    assert_eq!(summary.spent, d("0"));
    assert_eq!(summary.remaining, d("2500"));
    assert_eq!(summary.percent_used.as_deref(), Some("0.00"));
}

#[tokio::test]
async fn reload_starts_an_empty_cycle_and_keeps_history() {
    let h = Harness::new();
    let user = h.register("1000").await;
    let first = h.service.append_expense(draft(user.id, "850", "rent")).await.unwrap();

    let second = h.service.reload_cycle(user.id).await.unwrap();
    assert_ne!(second.id, first.cycle_id);
    assert_eq!(second.salary, d("1000"));

    let summary = h.service.cycle_summary(user.id).await.unwrap();
    assert_eq!(summary.cycle_id, second.id);
    assert_eq!(summary.spent, d("0"));
    assert_eq!(summary.remaining, d("1000"));
    assert!(h.service.current_expenses(user.id).await.unwrap().is_empty());

    let cycles: Vec<Uuid> = h
        .service
        .list_cycles(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(cycles, vec![second.id, first.cycle_id]);

    let history = h.service.cycle_expenses(user.id, first.cycle_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, d("850"));
    assert_eq!(h.service.all_expenses(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cycle_history_flags_only_the_current_cycle() {
    let h = Harness::new();
    let user = h.register("1000").await;
    let first = user.current_cycle_id.unwrap();
    let second = h.service.reload_cycle(user.id).await.unwrap();

    let history = h.service.cycle_history(user.id).await.unwrap();
    let flags: Vec<(Uuid, bool)> = history.iter().map(|l| (l.cycle.id, l.is_current)).collect();
    assert_eq!(flags, vec![(second.id, true), (first, false)]);

    assert!(matches!(
        h.service.cycle_history(Uuid::new_v4()).await,
        Err(BudgetError::NotFound(_))
    ));
}

#[tokio::test]
async fn alerts_fire_again_in_a_new_cycle() {
    let h = Harness::new();
    let user = h.register("1000").await;
    let before = h.service.append_expense(draft(user.id, "350", "rent")).await.unwrap();
    assert_eq!(before.alert_level, Some(AlertLevel::Thirty));

    h.service.reload_cycle(user.id).await.unwrap();
    let after = h.service.append_expense(draft(user.id, "350", "rent")).await.unwrap();
    assert_eq!(after.alert_level, Some(AlertLevel::Thirty));
    assert_eq!(after.total_spent, d("350"));
}

#[tokio::test]
async fn salary_updates_apply_from_the_next_cycle() {
    let h = Harness::new();
    let user = h.register("1000").await;

    h.service.update_salary(user.id, d("2000")).await.unwrap();
    let current = h.service.cycle_summary(user.id).await.unwrap();
    assert_eq!(current.salary, d("1000"));

    let next = h.service.reload_cycle(user.id).await.unwrap();
    assert_eq!(next.salary, d("2000"));
    let old = h.service.list_cycles(user.id).await.unwrap();
    assert_eq!(old[1].salary, d("1000"));
}

#[tokio::test]
async fn salary_validation() {
    let h = Harness::new();
    let user = h.register("1000").await;

    assert!(matches!(
        h.service.update_salary(user.id, d("-1")).await,
        Err(BudgetError::Validation(_))
    ));
    assert!(matches!(
        h.service.update_salary(user.id, d("10.001")).await,
        Err(BudgetError::Validation(_))
    ));
    assert!(matches!(
        h.service.update_salary(Uuid::new_v4(), d("10")).await,
        Err(BudgetError::NotFound(_))
    ));
    assert!(matches!(
        h.service.register_account(account("-5", None)).await,
        Err(BudgetError::Validation(_))
    ));
    assert!(matches!(
        h.service.update_salary(user.id, d("1000000000000")).await,
        Err(BudgetError::Validation(_))
    ));
    assert!(matches!(
        h.service.register_account(account("1000000000000", None)).await,
        Err(BudgetError::Validation(_))
    ));
    assert_eq!(h.store.user_count(), 1);
    h.service.update_salary(user.id, d("999999999999.99")).await.unwrap();
}

#[tokio::test]
async fn zero_salary_cycles_report_no_percentage_and_never_alert() {
    let h = Harness::new();
    let user = h.register("0").await;

    let receipt = h.service.append_expense(draft(user.id, "40", "food")).await.unwrap();
    assert_eq!(receipt.percent_used, None);
    assert_eq!(receipt.alert_level, None);
    assert_eq!(receipt.remaining, d("-40"));
}

#[tokio::test]
async fn reloading_an_unknown_user_is_not_found() {
    let h = Harness::new();
    assert!(matches!(
        h.service.reload_cycle(Uuid::new_v4()).await,
        Err(BudgetError::NotFound(_))
    ));
    assert!(matches!(
        h.service.cycle_summary(Uuid::new_v4()).await,
        Err(BudgetError::NotFound(_))
    ));
}

#[tokio::test]
async fn transient_cycle_open_failures_are_retried() {
    let h = Harness::new();
    h.store.fail_next_cycle_opens(OPEN_CYCLE_ATTEMPTS - 1);

    let user = h.register("1000").await;
    assert!(user.current_cycle_id.is_some());
    assert_eq!(h.service.list_cycles(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn registration_rolls_back_when_no_cycle_can_be_opened() {
    let h = Harness::new();
    h.store.fail_next_cycle_opens(OPEN_CYCLE_ATTEMPTS);

    let result = h.service.register_account(account("1000", None)).await;
    assert!(matches!(result, Err(BudgetError::Storage(_))));
    assert_eq!(h.store.user_count(), 0);
}

#[tokio::test]
async fn registration_rolls_back_when_the_pointer_is_not_moved() {
    let h = Harness::new();
    h.store.skip_next_retargets(1);

    let result = h.service.register_account(account("1000", None)).await;
    assert!(matches!(result, Err(BudgetError::Inconsistent(_))));
    assert_eq!(h.store.user_count(), 0);
}

#[tokio::test]
async fn reload_reports_a_pointer_left_behind() {
    let h = Harness::new();
    let user = h.register("1000").await;
    let first = user.current_cycle_id.unwrap();
    h.store.skip_next_retargets(1);

    assert!(matches!(
        h.service.reload_cycle(user.id).await,
        Err(BudgetError::Inconsistent(_))
    ));
    let summary = h.service.cycle_summary(user.id).await.unwrap();
    assert_eq!(summary.cycle_id, first);

    let reloaded = h.service.reload_cycle(user.id).await.unwrap();
    assert_ne!(reloaded.id, first);
}

#[tokio::test]
async fn historical_cycles_are_scoped_to_their_owner() {
    let h = Harness::new();
    let owner = h.register("1000").await;
    let other = h.register("1000").await;
    let cycle = owner.current_cycle_id.unwrap();

    assert!(matches!(
        h.service.cycle_expenses(other.id, cycle).await,
        Err(BudgetError::NotFound(_))
    ));
    assert!(h.service.cycle_expenses(owner.id, cycle).await.unwrap().is_empty());
}
