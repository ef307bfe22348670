use crate::core::event_diff::{NO_CHANGES, NO_DETAILS, diff_snapshots, format_event_payload, split_shares_by_user};
use crate::core::formatting::MemberNames;
use serde_json::{Value, json};

fn names() -> MemberNames {
    [(1, "Alice"), (2, "Bob"), (3, "Cara")]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect()
}

fn record(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(record) => record,
        other => panic!("not an object: {}", other),
    }
}

fn dinner(bob: &str, cara: &str) -> Value {
    json!({
        "amount": "10.00",
        "payerUserId": 1,
        "splits": [
            {"userId": 2, "shareAmount": bob},
            {"userId": 3, "shareAmount": cara}
        ]
    })
}

#[test]
fn test_identical_snapshots_report_no_changes() {
    let mut before = dinner("5.00", "5.00");
    let mut after = dinner("5.00", "5.00");
    before["expenseId"] = json!(41);
    after["expenseId"] = json!(42);
    let payload = json!({"before": before, "after": after}).to_string();

    assert_eq!(format_event_payload(&payload, &names()), NO_CHANGES);
}

#[test]
fn test_split_changes_per_person() {
    let diff = diff_snapshots(&record(dinner("5.00", "5.00")), &record(dinner("7.00", "3.00")), &names());

    assert_eq!(
        diff.split_changes,
        vec![
            "Bob: $5.00 -> $7.00 (delta +$2.00)".to_string(),
            "Cara: $5.00 -> $3.00 (delta -$2.00)".to_string(),
        ]
    );
    assert_eq!(
        diff.owes_changes,
        vec![
            "Bob: owes $5.00 -> owes $7.00 (delta +$2.00)".to_string(),
            "Cara: owes $5.00 -> owes $3.00 (delta -$2.00)".to_string(),
        ]
    );

    let rendered = diff.render();
    assert!(rendered.starts_with("Split changes per person:\nBob: $5.00 -> $7.00 (delta +$2.00)"));
    assert!(rendered.contains("Owes changes:"));
    assert!(rendered.contains("Field changes:"));
}

#[test]
fn test_snapshots_encoded_as_strings_are_diffed() {
    let payload = json!({
        "Before": dinner("5.00", "5.00").to_string(),
        "After": dinner("6.00", "4.00").to_string(),
    })
    .to_string();

    let rendered = format_event_payload(&payload, &names());
    assert!(rendered.contains("Bob: $5.00 -> $6.00 (delta +$1.00)"));
}

#[test]
fn test_field_changes_resolve_member_names() {
    let before = json!({"description": "Taxi", "amount": 12, "payerUserId": 1});
    let after = json!({"description": "Cab", "amount": 12.0, "payerUserId": 2});
    let diff = diff_snapshots(&record(before), &record(after), &names());

    assert_eq!(
        diff.field_changes,
        vec![
            "Description: Taxi -> Cab".to_string(),
            "Payer User Id: Alice -> Bob".to_string(),
        ]
    );
    assert!(diff.split_changes.is_empty());
}

#[test]
fn test_percentage_snapshots_become_shares() {
    let snapshot = record(json!({
        "amount": "30",
        "payerUserId": 1,
        "participantUserIds": [2, 3],
        "percentages": ["60", "40"]
    }));

    let shares = split_shares_by_user(&snapshot).expect("shares derived from percentages");
    assert_eq!(shares.get(&2).copied(), Some(18.0));
    assert_eq!(shares.get(&3).copied(), Some(12.0));
}

#[test]
fn test_flat_payload_lists_fields() {
    let payload = json!({
        "expenseId": 9,
        "description": "Taxi",
        "amount": "12.5",
        "payerUserId": 2
    })
    .to_string();

    assert_eq!(
        format_event_payload(&payload, &names()),
        "Description: Taxi\nAmount: $12.50\nPayer User Id: Bob"
    );
}

#[test]
fn test_unknown_member_and_plain_text_payloads() {
    let payload = json!({"fromUserId": 99}).to_string();
    assert_eq!(format_event_payload(&payload, &names()), "From User Id: User #99");

    assert_eq!(format_event_payload("member joined", &names()), "member joined");
    assert_eq!(format_event_payload("{}", &names()), NO_DETAILS);
}
