use crate::core::errors::FairshareError;
use crate::core::models::{Expense, Member, Split};
use crate::core::split::{ExpenseDraft, MemberInputs, SplitMode, build_member_value_map, remaining_amount};

fn members() -> Vec<Member> {
    vec![Member::new(1, "Alice"), Member::new(2, "Bob")]
}

fn draft(mode: SplitMode, amount: &str) -> ExpenseDraft {
    let mut draft = ExpenseDraft {
        description: "Dinner".to_string(),
        amount: amount.to_string(),
        payer_user_id: Some(1),
        split_mode: mode,
        ..ExpenseDraft::default()
    };
    draft.reseed(&members());
    draft
}

fn inputs(values: &[(u64, &str)]) -> MemberInputs {
    values.iter().map(|(id, value)| (*id, value.to_string())).collect()
}

fn validation_message(result: Result<impl std::fmt::Debug, FairshareError>) -> String {
    match result {
        Err(FairshareError::Validation(message)) => message,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_exact_split_within_tolerance_passes() {
    let mut expense = draft(SplitMode::Exact, "20.00");
    expense.exact_amounts = inputs(&[(1, "12.00"), (2, "8.004")]);

    let payload = expense.validate(&[1, 2]).expect("amounts reconcile");
    assert_eq!(payload.exact_amounts, Some(vec!["12.00".to_string(), "8.00".to_string()]));
}

#[test]
fn test_exact_split_outside_tolerance_fails() {
    let mut expense = draft(SplitMode::Exact, "20.00");
    expense.exact_amounts = inputs(&[(1, "12.00"), (2, "7.98")]);

    let message = validation_message(expense.validate(&[1, 2]));
    assert_eq!(message, "Exact amounts must add up to the total.");
}

#[test]
fn test_exact_split_requires_every_participant() {
    let mut expense = draft(SplitMode::Exact, "20.00");
    expense.exact_amounts = inputs(&[(1, "20.00"), (2, "")]);

    let message = validation_message(expense.validate(&[1, 2]));
    assert_eq!(message, "Enter an exact amount for each member.");
}

#[test]
fn test_percentage_split_must_total_one_hundred() {
    let mut expense = draft(SplitMode::Percentage, "50");
    expense.percentages = inputs(&[(1, "60"), (2, "40")]);
    let payload = expense.validate(&[1, 2]).expect("percentages add up");
    assert_eq!(payload.percentages, Some(vec!["60.00".to_string(), "40.00".to_string()]));
    assert_eq!(payload.exact_amounts, None);

    expense.percentages = inputs(&[(1, "60"), (2, "39")]);
    let message = validation_message(expense.validate(&[1, 2]));
    assert_eq!(message, "Percentages must add up to 100%.");
}

#[test]
fn test_shares_split_rejects_zero_and_text() {
    let mut expense = draft(SplitMode::Shares, "30");

    expense.shares = inputs(&[(1, "2"), (2, "0")]);
    assert!(expense.validate(&[1, 2]).is_err());

    expense.shares = inputs(&[(1, "2"), (2, "many")]);
    assert!(expense.validate(&[1, 2]).is_err());

    expense.shares = inputs(&[(1, "1.5"), (2, "1")]);
    assert!(expense.validate(&[1, 2]).is_err());

    expense.shares = inputs(&[(1, "2"), (2, "1")]);
    let payload = expense.validate(&[1, 2]).expect("shares are positive integers");
    assert_eq!(payload.shares, Some(vec![2, 1]));
}

#[test]
fn test_exact_split_payload_follows_participant_order() {
    let mut expense = draft(SplitMode::Exact, "20.00");
    expense.exact_amounts = inputs(&[(1, "12.00"), (2, "8.00")]);

    let payload = expense.validate(&[1, 2]).expect("amounts reconcile");
    assert_eq!(payload.participant_user_ids, vec![1, 2]);
    assert_eq!(payload.exact_amounts, Some(vec!["12.00".to_string(), "8.00".to_string()]));
    assert_eq!(payload.amount, "20.00");
    assert_eq!(payload.payer_user_id, 1);

    let body = serde_json::to_value(&payload).unwrap();
    assert_eq!(body["exactAmounts"], serde_json::json!(["12.00", "8.00"]));
    assert!(body.get("shares").is_none());
    assert!(body.get("percentages").is_none());
}

#[test]
fn test_equal_split_needs_description_amount_and_payer() {
    let mut expense = draft(SplitMode::Equal, "10");
    expense.description = "   ".to_string();
    assert_eq!(validation_message(expense.validate(&[1, 2])), "Enter a description.");

    expense.description = "Taxi".to_string();
    expense.amount = "0".to_string();
    assert_eq!(validation_message(expense.validate(&[1, 2])), "Enter an amount greater than 0.");

    expense.amount = "10".to_string();
    expense.payer_user_id = None;
    assert_eq!(validation_message(expense.validate(&[1, 2])), "Select who paid.");

    expense.payer_user_id = Some(2);
    assert_eq!(
        validation_message(expense.validate(&[])),
        "Add members before recording expenses."
    );

    let payload = expense.validate(&[1, 2]).expect("equal split is valid");
    assert_eq!(payload.amount, "10.00");
    assert_eq!(payload.shares, None);
}

#[test]
fn test_build_member_value_map_blanks_new_members() {
    let seed = inputs(&[(1, "5"), (9, "3")]);
    let map = build_member_value_map(&members(), &seed);

    assert_eq!(map.len(), 2);
    assert_eq!(map[&1], "5");
    assert_eq!(map[&2], "");
}

#[test]
fn test_remaining_amount_ignores_unparseable_inputs() {
    let amounts = inputs(&[(1, "12.50"), (2, "abc")]);
    assert_eq!(remaining_amount("20", &amounts, &[1, 2]), Some(7.5));
    assert_eq!(remaining_amount("", &amounts, &[1, 2]), None);
}

#[test]
fn test_draft_from_expense_seeds_split_inputs() {
    let expense = Expense {
        expense_id: 4,
        group_id: 7,
        description: "Hotel".to_string(),
        amount: "90.00".to_string(),
        payer_user_id: 2,
        created_at: None,
        splits: vec![
            Split {
                user_id: 1,
                share_amount: "45.00".to_string(),
            },
            Split {
                user_id: 2,
                share_amount: "45.00".to_string(),
            },
        ],
    };

    let draft = ExpenseDraft::from_expense(&expense, &members());
    assert_eq!(draft.split_mode, SplitMode::Equal);
    assert_eq!(draft.payer_user_id, Some(2));
    assert_eq!(draft.exact_amounts[&1], "45.00");
    assert_eq!(draft.percentages[&2], "");
}

#[test]
fn test_split_mode_parsing() {
    assert_eq!("Exact".parse::<SplitMode>().unwrap(), SplitMode::Exact);
    assert_eq!("percent".parse::<SplitMode>().unwrap(), SplitMode::Percentage);
    assert_eq!(SplitMode::Shares.to_string(), "shares");
    assert!("thirds".parse::<SplitMode>().is_err());
}
