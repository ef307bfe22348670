use super::fake_api::FakeLedgerApi;
use super::{TEST_GROUP_ID, create_test_controller};
use crate::core::errors::FairshareError;
use crate::core::models::{ConfirmedTransfer, Expense, OwesView, SettlementTransfer};
use crate::core::services::{GroupList, GroupPageController};
use crate::core::split::SplitMode;
use crate::infrastructure::storage::in_memory::InMemoryPreferenceStore;
use crate::infrastructure::storage::{PreferenceStore, current_user_key};

const MEMBERS: [(u64, &str); 2] = [(1, "Alice"), (2, "Bob")];

fn expense(expense_id: u64, description: &str) -> Expense {
    Expense {
        expense_id,
        group_id: TEST_GROUP_ID,
        description: description.to_string(),
        amount: "30.00".to_string(),
        payer_user_id: 1,
        created_at: Some("2024-05-01T10:00:00Z".to_string()),
        splits: Vec::new(),
    }
}

fn transfer(from: u64, to: u64, amount: &str) -> SettlementTransfer {
    SettlementTransfer {
        from_user_id: from,
        to_user_id: to,
        amount: amount.to_string(),
    }
}

fn confirmed(id: u64, confirmation_id: &str) -> ConfirmedTransfer {
    ConfirmedTransfer {
        id,
        group_id: TEST_GROUP_ID,
        from_user_id: 2,
        to_user_id: 1,
        amount: "15.00".to_string(),
        confirmation_id: Some(confirmation_id.to_string()),
        created_at: "2024-05-02T09:00:00Z".to_string(),
    }
}

#[test]
fn test_group_id_zero_is_rejected() {
    let result = GroupPageController::new(FakeLedgerApi::new(), InMemoryPreferenceStore::new(), 0);
    assert!(matches!(result, Err(FairshareError::InvalidGroupId(_))));
}

#[tokio::test]
async fn test_load_all_fills_every_section() {
    let (mut controller, api, preferences) = create_test_controller(&MEMBERS);
    {
        let mut data = api.data.lock().await;
        data.expenses = vec![expense(1, "Dinner")];
        data.settlements = vec![transfer(2, 1, "15.00")];
    }

    controller.load_all().await;

    let state = controller.state();
    assert_eq!(state.group_name(), Some("Trip"));
    assert_eq!(state.participant_ids(), vec![1, 2]);
    assert_eq!(state.expenses.items.len(), 1);
    assert_eq!(state.settlements.data.len(), 1);
    assert!(state.group.error.is_none());
    assert!(!state.expenses.loading);
    assert_eq!(state.current_user_id, Some(1));
    assert_eq!(state.new_expense.exact_amounts.len(), 2);

    let stored = preferences.get(&current_user_key(TEST_GROUP_ID)).await.unwrap();
    assert_eq!(stored.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_stored_current_user_is_restored() {
    let (mut controller, _api, preferences) = create_test_controller(&MEMBERS);
    preferences.set(&current_user_key(TEST_GROUP_ID), "2").await.unwrap();

    controller.load_group().await;
    assert_eq!(controller.state().current_user_id, Some(2));

    assert!(!controller.set_current_user(9).await);
    assert!(controller.set_current_user(1).await);
    let stored = preferences.get(&current_user_key(TEST_GROUP_ID)).await.unwrap();
    assert_eq!(stored.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_stale_current_user_falls_back_to_first_member() {
    let (mut controller, _api, preferences) = create_test_controller(&MEMBERS);
    preferences.set(&current_user_key(TEST_GROUP_ID), "42").await.unwrap();

    controller.load_group().await;
    assert_eq!(controller.state().current_user_id, Some(1));
}

#[tokio::test]
async fn test_stored_user_is_cleared_for_group_without_members() {
    let (mut controller, _api, preferences) = create_test_controller(&[]);
    preferences.set(&current_user_key(TEST_GROUP_ID), "2").await.unwrap();

    controller.load_group().await;

    assert_eq!(controller.state().current_user_id, None);
    let stored = preferences.get(&current_user_key(TEST_GROUP_ID)).await.unwrap();
    assert_eq!(stored, None);
}

#[tokio::test]
async fn test_failed_section_does_not_block_others() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.expenses = vec![expense(1, "Dinner")];
    api.fail("list_expenses").await;

    controller.load_all().await;
    assert_eq!(
        controller.state().expenses.error.as_deref(),
        Some("API 500: list_expenses exploded")
    );
    assert!(controller.state().settlements.error.is_none());
    assert!(controller.state().group.data.is_some());

    api.recover("list_expenses").await;
    controller.retry_list(GroupList::Expenses).await;
    assert!(controller.state().expenses.error.is_none());
    assert_eq!(controller.state().expenses.items.len(), 1);
}

#[tokio::test]
async fn test_paging_through_expenses() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.expenses = (1..=12).map(|id| expense(id, "Coffee")).collect();

    controller.load_all().await;
    assert_eq!(controller.state().expenses.total_pages, 2);
    assert_eq!(controller.state().expenses.items.len(), 10);

    controller.go_to_page(GroupList::Expenses, 2).await;
    assert_eq!(controller.state().expenses.page, 2);
    assert_eq!(controller.state().expenses.items.len(), 2);
}

#[tokio::test]
async fn test_invalid_expense_sends_nothing() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    controller.load_group().await;

    let draft = controller.new_expense_mut();
    draft.description = "Dinner".to_string();
    draft.amount = "20.00".to_string();
    draft.payer_user_id = Some(1);
    draft.split_mode = SplitMode::Exact;
    draft.exact_amounts.insert(1, "12.00".to_string());
    draft.exact_amounts.insert(2, "7.00".to_string());

    assert!(!controller.add_expense().await);
    assert_eq!(
        controller.state().add_expense_error.as_deref(),
        Some("Exact amounts must add up to the total.")
    );
    assert!(!api.data.lock().await.calls.contains(&"create_expense"));
}

#[tokio::test]
async fn test_add_expense_with_exact_split() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    controller.load_group().await;

    let draft = controller.new_expense_mut();
    draft.description = "Dinner".to_string();
    draft.amount = "20.00".to_string();
    draft.payer_user_id = Some(1);
    draft.split_mode = SplitMode::Exact;
    draft.exact_amounts.insert(1, "12.00".to_string());
    draft.exact_amounts.insert(2, "8.00".to_string());

    assert!(controller.add_expense().await);

    let data = api.data.lock().await;
    let payload = &data.created[0];
    assert_eq!(payload.participant_user_ids, vec![1, 2]);
    assert_eq!(payload.payer_user_id, 1);
    assert_eq!(payload.exact_amounts, Some(vec!["12.00".to_string(), "8.00".to_string()]));
    assert!(data.calls.contains(&"settlements"));
    assert!(data.calls.contains(&"list_events"));

    let state = controller.state();
    assert!(state.add_expense_error.is_none());
    assert!(state.new_expense.description.is_empty());
    assert_eq!(state.new_expense.exact_amounts.get(&1).map(String::as_str), Some(""));
}

#[tokio::test]
async fn test_edit_and_delete_expense() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.expenses = vec![expense(4, "Hotel"), expense(5, "Taxi")];
    controller.load_all().await;

    assert!(!controller.start_edit(99));
    assert!(controller.start_edit(4));
    if let Some(draft) = controller.edit_draft_mut() {
        draft.amount = String::new();
    }
    assert!(!controller.update_expense().await);
    assert_eq!(
        controller.state().editing.as_ref().and_then(|edit| edit.error.as_deref()),
        Some("Enter an amount greater than 0.")
    );

    if let Some(draft) = controller.edit_draft_mut() {
        draft.amount = "45".to_string();
        draft.description = "Hotel and breakfast".to_string();
    }
    assert!(controller.update_expense().await);
    assert!(controller.state().editing.is_none());
    {
        let data = api.data.lock().await;
        assert_eq!(data.updated[0].0, 4);
        assert_eq!(data.updated[0].1.amount, "45.00");
    }

    assert!(controller.start_edit(5));
    assert!(controller.delete_expense(5).await);
    assert!(controller.state().editing.is_none());
    assert_eq!(controller.state().deleting_expense_id, None);
    assert_eq!(controller.state().expenses.items.len(), 1);
}

#[tokio::test]
async fn test_confirm_transfer_only_once() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    let owed = transfer(2, 1, "15.00");
    api.data.lock().await.settlements = vec![owed.clone()];
    controller.load_all().await;

    controller.set_confirmation_id("  batch-1 ");
    assert!(controller.state().can_confirm(&owed));
    assert!(controller.confirm_transfer(&owed).await);
    assert!(!controller.state().can_confirm(&owed));
    assert!(!controller.confirm_transfer(&transfer(2, 1, "15.004")).await);

    let data = api.data.lock().await;
    assert_eq!(data.confirmations.len(), 1);
    assert_eq!(data.confirmations[0].confirmation_id.as_deref(), Some("batch-1"));
    assert_eq!(data.confirmations[0].transfers, vec![owed]);
}

#[tokio::test]
async fn test_failed_confirmation_can_be_retried() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    let owed = transfer(2, 1, "15.00");
    api.fail("confirm_transfers").await;

    assert!(!controller.confirm_transfer(&owed).await);
    assert_eq!(
        controller.state().confirm_error.as_deref(),
        Some("API 500: confirm_transfers exploded")
    );
    assert!(controller.state().can_confirm(&owed));

    api.recover("confirm_transfers").await;
    assert!(controller.confirm_transfer(&owed).await);
    assert!(controller.state().confirm_error.is_none());
    assert_eq!(api.data.lock().await.confirmations[0].confirmation_id, None);
}

#[tokio::test]
async fn test_generate_confirmation_id() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.confirmation_id = "c0ffee".to_string();

    assert!(controller.generate_confirmation_id().await);
    assert_eq!(controller.state().confirmation_id, "c0ffee");

    api.fail("generate_confirmation_id").await;
    assert!(!controller.generate_confirmation_id().await);
    assert_eq!(
        controller.state().confirmation_id_error.as_deref(),
        Some("API 500: generate_confirmation_id exploded")
    );
}

#[tokio::test]
async fn test_confirmed_transfers_filtered_by_confirmation_id() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.confirmed = vec![confirmed(1, "abc"), confirmed(2, "xyz")];
    controller.load_all().await;
    assert_eq!(controller.state().confirmed.items.len(), 2);

    controller.apply_confirmed_filter(" abc ").await;
    assert_eq!(controller.state().confirmed.items.len(), 1);
    assert_eq!(controller.state().confirmed.items[0].id, 1);
    assert_eq!(
        api.data.lock().await.confirmed_filters.last().cloned().flatten().as_deref(),
        Some("abc")
    );
}

#[tokio::test]
async fn test_member_and_rename_actions() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    controller.load_group().await;

    assert!(!controller.add_member("   ").await);
    assert_eq!(controller.state().add_member_error.as_deref(), Some("Enter a member name."));

    assert!(controller.add_member(" Cara ").await);
    assert_eq!(controller.state().members().len(), 3);
    assert_eq!(controller.state().member_names()[&3], "Cara");
    assert_eq!(controller.state().new_expense.shares.len(), 3);

    assert!(!controller.rename_group("").await);
    assert_eq!(controller.state().rename_error.as_deref(), Some("Group name cannot be empty"));
    assert!(!api.data.lock().await.calls.contains(&"rename_group"));

    assert!(controller.rename_group(" Ski week ").await);
    assert_eq!(controller.state().group_name(), Some("Ski week"));
    assert_eq!(controller.state().members().len(), 3);

    api.fail("rename_group").await;
    assert!(!controller.rename_group("Other").await);
    assert_eq!(controller.state().rename_error.as_deref(), Some("API 500: rename_group exploded"));
    assert_eq!(controller.state().group_name(), Some("Ski week"));
}

#[tokio::test]
async fn test_owes_lookup() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.owes = 12.5;
    controller.load_group().await;

    controller.set_owes_members(Some(1), Some(1));
    assert!(!controller.load_owes(OwesView::Current).await);
    assert!(!api.data.lock().await.calls.contains(&"owes"));

    controller.set_owes_members(Some(2), Some(1));
    assert!(controller.load_owes(OwesView::Current).await);
    assert!(controller.load_owes(OwesView::Historical).await);

    let state = controller.state();
    assert_eq!(state.owes.current, Some(12.5));
    assert_eq!(state.owes.historical, Some(12.5));
    assert_eq!(state.owes.view, Some(OwesView::Historical));
    assert_eq!(
        api.data.lock().await.owes_requests,
        vec![(2, 1, OwesView::Current), (2, 1, OwesView::Historical)]
    );
}

#[tokio::test]
async fn test_event_details_use_member_names() {
    let (mut controller, api, _) = create_test_controller(&MEMBERS);
    api.data.lock().await.events = vec![crate::core::models::EventRecord {
        event_id: 1,
        group_id: TEST_GROUP_ID,
        expense_id: Some(3),
        event_type: "EXPENSE_CREATED".to_string(),
        payload: r#"{"payerUserId": 2}"#.to_string(),
        created_at: "2024-05-01T10:00:00Z".to_string(),
    }];
    controller.load_all().await;

    let state = controller.state();
    assert_eq!(state.event_details(&state.events.items[0]), "Payer User Id: Bob");
}
