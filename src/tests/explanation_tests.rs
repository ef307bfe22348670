use crate::core::explanation::{ExplanationShape, ledger_why_parts, parse_ledger_explanation, select_explanation_user};
use crate::core::formatting::MemberNames;
use crate::core::models::{Contribution, LedgerExplanationEntry, TransferBreakdown};
use serde_json::json;

fn names() -> MemberNames {
    [(1, "Alice"), (2, "Bob"), (3, "Cara")]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect()
}

fn entry(user_id: u64) -> LedgerExplanationEntry {
    LedgerExplanationEntry {
        user_id,
        ..LedgerExplanationEntry::default()
    }
}

#[test]
fn test_bare_list_is_parsed() {
    let value = json!([
        {
            "userId": 1,
            "netBalance": -12.5,
            "expenses": [{"expenseId": 3, "description": "Taxi", "amount": 25, "payerUserId": 1}],
            "transfers": [{"fromUserId": 2, "toUserId": 1, "amount": "5.00"}]
        }
    ]);

    let entries = parse_ledger_explanation(&value);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, 1);
    assert_eq!(entries[0].net_balance.as_deref(), Some("-12.5"));
    assert_eq!(entries[0].expenses[0].amount.as_deref(), Some("25"));
    match &entries[0].transfers {
        TransferBreakdown::Undirected(transfers) => assert_eq!(transfers[0].amount, "5.00"),
        other => panic!("unexpected breakdown {:?}", other),
    }
}

#[test]
fn test_keyed_and_wrapped_lists() {
    let keyed = json!({"entries": [{"userId": 2}]});
    assert!(matches!(
        ExplanationShape::detect(&keyed),
        ExplanationShape::Keyed { key: "entries", .. }
    ));

    let wrapped = json!({"data": {"users": [{"userId": "3", "contributingExpenses": [{"description": "Hotel"}]}]}});
    let shape = ExplanationShape::detect(&wrapped);
    assert!(matches!(shape, ExplanationShape::Wrapped { key: "data", .. }));

    let entries = shape.entries();
    assert_eq!(entries[0].user_id, 3);
    assert_eq!(entries[0].expenses[0].description.as_deref(), Some("Hotel"));
}

#[test]
fn test_empty_list_key_is_skipped() {
    let value = json!({"entries": [], "data": [{"userId": 2}]});
    assert!(matches!(
        ExplanationShape::detect(&value),
        ExplanationShape::Keyed { key: "data", .. }
    ));
    assert_eq!(parse_ledger_explanation(&value)[0].user_id, 2);
}

#[test]
fn test_object_keyed_by_user_id() {
    let value = json!({
        "1": {"netBalance": "4.00", "transfersIn": [{"fromUserId": 2, "toUserId": 1, "amount": 4}]},
        "2": {"netBalance": "-4.00"}
    });

    let entries = parse_ledger_explanation(&value);
    assert_eq!(entries.iter().map(|e| e.user_id).collect::<Vec<_>>(), vec![1, 2]);
    match &entries[0].transfers {
        TransferBreakdown::Directional { incoming, outgoing } => {
            assert_eq!(incoming.len(), 1);
            assert!(outgoing.is_empty());
        }
        other => panic!("unexpected breakdown {:?}", other),
    }
}

#[test]
fn test_unrecognized_shapes_are_empty() {
    assert_eq!(ExplanationShape::detect(&json!(42)), ExplanationShape::Empty);
    assert!(parse_ledger_explanation(&json!({})).is_empty());
    assert!(parse_ledger_explanation(&json!({"status": "ok"})).is_empty());
}

#[test]
fn test_why_parts_summarise_the_balance() {
    let mut explained = entry(1);
    explained.expenses = vec![Default::default(), Default::default()];
    explained.transfers = TransferBreakdown::Undirected(vec![crate::core::models::ExplanationTransfer {
        transfer_id: None,
        from_user_id: 2,
        to_user_id: 1,
        amount: "3.00".to_string(),
        created_at: None,
    }]);
    explained.contributions = ["Paid for user 2", "Owes User #3 for taxi", "Third reason"]
        .into_iter()
        .map(|description| Contribution {
            description: Some(description.to_string()),
            ..Contribution::default()
        })
        .collect();

    assert_eq!(
        ledger_why_parts(&explained, &names()),
        vec![
            "2 expenses".to_string(),
            "1 transfer".to_string(),
            "Paid for Bob • Owes Cara for taxi".to_string(),
        ]
    );
}

#[test]
fn test_directional_why_part() {
    let mut explained = entry(2);
    explained.transfers = TransferBreakdown::Directional {
        incoming: Vec::new(),
        outgoing: Vec::new(),
    };
    assert_eq!(
        ledger_why_parts(&explained, &names()),
        vec!["0 incoming / 0 outgoing transfers".to_string()]
    );
}

#[test]
fn test_selection_prefers_previous_then_current_user() {
    let entries = vec![entry(1), entry(2), entry(3)];

    assert_eq!(select_explanation_user(&entries, Some(3), Some(2)), Some(3));
    assert_eq!(select_explanation_user(&entries, Some(9), Some(2)), Some(2));
    assert_eq!(select_explanation_user(&entries, None, Some(9)), Some(1));
    assert_eq!(select_explanation_user(&[], Some(1), Some(1)), None);
}
