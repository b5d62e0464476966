#![allow(clippy::unwrap_used)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rust_decimal_macros::dec;

use super::*;

// ── Transaction ───────────────────────────────────────────────

fn make_txn(status: &str) -> Transaction {
    Transaction {
        id: "t1".into(),
        title: Some("Rent".into()),
        description: "March rent".into(),
        amount: dec!(1200.00),
        kind: TransactionType::Expense,
        status: TransactionStatus::parse(status),
        due_date: Some("2024-03-05".into()),
        created_at: "2024-02-28T10:00:00Z".into(),
    }
}

#[test]
fn test_display_title_prefers_title() {
    let txn = make_txn("pending");
    assert_eq!(txn.display_title(), "Rent");
}

#[test]
fn test_display_title_falls_back_to_description() {
    let mut txn = make_txn("pending");
    txn.title = None;
    assert_eq!(txn.display_title(), "March rent");
    txn.title = Some(String::new());
    assert_eq!(txn.display_title(), "March rent");
}

#[test]
fn test_due_and_created_year_month() {
    let txn = make_txn("pending");
    assert_eq!(txn.due_year_month(), Some((2024, 3)));
    assert_eq!(txn.created_year_month(), Some((2024, 2)));

    let mut no_due = make_txn("pending");
    no_due.due_date = None;
    assert_eq!(no_due.due_year_month(), None);
}

#[test]
fn test_deserialize_camel_case_wire_shape() {
    let json = r#"{
        "id": "abc-123",
        "title": "Salary",
        "description": "Monthly salary",
        "amount": 5000.50,
        "type": "INCOME",
        "status": "PENDING",
        "dueDate": "2024-01-31",
        "createdAt": "2024-01-02T08:30:00Z"
    }"#;
    let txn: Transaction = serde_json::from_str(json).unwrap();
    assert_eq!(txn.kind, TransactionType::Income);
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(txn.amount, dec!(5000.50));
    assert_eq!(txn.due_date.as_deref(), Some("2024-01-31"));
}

#[test]
fn test_deserialize_tolerates_missing_optionals() {
    let json = r#"{
        "id": "abc-124",
        "amount": 10,
        "type": "EXPENSE",
        "status": "completed"
    }"#;
    let txn: Transaction = serde_json::from_str(json).unwrap();
    assert_eq!(txn.title, None);
    assert_eq!(txn.description, "");
    assert_eq!(txn.due_date, None);
    assert!(txn.status.is_completed());
}

// ── TransactionStatus ─────────────────────────────────────────

#[test]
fn test_status_parse_is_case_insensitive() {
    assert_eq!(TransactionStatus::parse("PENDING"), TransactionStatus::Pending);
    assert_eq!(TransactionStatus::parse("Pending"), TransactionStatus::Pending);
    assert_eq!(
        TransactionStatus::parse("cancelled"),
        TransactionStatus::Cancelled
    );
}

#[test]
fn test_status_unknown_keeps_raw_value() {
    let status = TransactionStatus::parse("SCHEDULED");
    assert_eq!(status, TransactionStatus::Other("SCHEDULED".into()));
    assert_eq!(status.as_str(), "SCHEDULED");
    assert!(!status.is_pending());
}

#[test]
fn test_status_cycles_through_the_rotation() {
    assert_eq!(TransactionStatus::Pending.cycled(), TransactionStatus::Completed);
    assert_eq!(TransactionStatus::Completed.cycled(), TransactionStatus::Cancelled);
    assert_eq!(TransactionStatus::Cancelled.cycled(), TransactionStatus::Pending);
    // Unknown statuses rejoin the rotation instead of getting stuck.
    assert_eq!(
        TransactionStatus::Other("SCHEDULED".into()).cycled(),
        TransactionStatus::Pending
    );
}

#[test]
fn test_status_serializes_uppercase() {
    let patch = TransactionPatch::status_only(TransactionStatus::Completed);
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(json, r#"{"status":"COMPLETED"}"#);
}

// ── TransactionPatch ──────────────────────────────────────────

#[test]
fn test_patch_skips_absent_fields() {
    let patch = TransactionPatch {
        amount: Some(dec!(99.90)),
        ..TransactionPatch::default()
    };
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(json, r#"{"amount":99.9}"#);
}

// ── TransactionType ───────────────────────────────────────────

#[test]
fn test_type_parse_and_labels() {
    assert_eq!(TransactionType::parse("income"), Some(TransactionType::Income));
    assert_eq!(TransactionType::parse("EXPENSE"), Some(TransactionType::Expense));
    assert_eq!(TransactionType::parse("transfer"), None);
    assert_eq!(TransactionType::Income.label(), "Income");
    assert_eq!(TransactionType::Income.icon(), "💰");
    assert_eq!(TransactionType::Expense.icon(), "📋");
}

// ── date helpers ──────────────────────────────────────────────

#[test]
fn test_year_month_rejects_garbage() {
    assert_eq!(year_month("2024-03-05"), Some((2024, 3)));
    assert_eq!(year_month("2024-13-05"), None);
    assert_eq!(year_month("soon"), None);
    assert_eq!(year_month(""), None);
}

#[test]
fn test_format_wire_date() {
    assert_eq!(format_wire_date("2024-03-05"), "05/03/2024");
    assert_eq!(format_wire_date("2024-03-05T12:00:00Z"), "05/03/2024");
    assert_eq!(format_wire_date("not a date"), "not a date");
}

// ── User / JWT decode ─────────────────────────────────────────

fn fake_token(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload);
    format!("{header}.{body}.sig")
}

#[test]
fn test_user_from_login_uses_claims() {
    let token = fake_token(r#"{"id":"u-9","name":"Ana","sub":"ana@example.com"}"#);
    let user = User::from_login(&token, "ana@example.com").unwrap();
    assert_eq!(user.id, "u-9");
    assert_eq!(user.name, "Ana");
    assert_eq!(user.username, "ana@example.com");
}

#[test]
fn test_user_fallbacks_without_claims() {
    let token = fake_token(r#"{}"#);
    let user = User::from_login(&token, "bob@example.com").unwrap();
    assert_eq!(user.id, "unknown");
    assert_eq!(user.name, "bob");
    assert_eq!(user.username, "bob@example.com");
}

#[test]
fn test_user_numeric_id_claim() {
    let token = fake_token(r#"{"id":42,"sub":"carol@example.com"}"#);
    let user = User::from_stored_token(&token).unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(user.username, "carol@example.com");
    assert_eq!(user.name, "carol");
}

#[test]
fn test_user_from_malformed_token_is_none() {
    assert!(User::from_stored_token("not-a-jwt").is_none());
    assert!(User::from_stored_token("a.b.c").is_none());
}
