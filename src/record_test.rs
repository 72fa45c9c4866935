use super::*;
use crate::models::{NewWin, Win, WinCategory};
use serde_json::json;

fn win() -> Win {
    Win::from_draft(
        1,
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        NewWin {
            author_id: 2,
            author_name: "Kim".into(),
            title: "A".into(),
            description: "B".into(),
            category: WinCategory::Professional,
        },
    )
    .unwrap()
}

#[test]
fn patch_preserves_unspecified_fields() {
    let mut patch = Data::new();
    patch.insert("title".into(), json!("C"));
    let merged = apply_patch(&win(), &patch).unwrap();
    assert_eq!(merged.title, "C");
    assert_eq!(merged.description, "B");
    assert_eq!(merged.category, WinCategory::Professional);
}

#[test]
fn patch_rejects_unknown_field() {
    let mut patch = Data::new();
    patch.insert("headline".into(), json!("C"));
    let err = apply_patch(&win(), &patch).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("headline")));
}

#[test]
fn patch_rejects_read_only_change() {
    let mut patch = Data::new();
    patch.insert("id".into(), json!(99));
    assert!(matches!(apply_patch(&win(), &patch), Err(ServiceError::Validation(_))));

    let mut awards = Data::new();
    awards.insert("awards".into(), json!([]));
    // Echoing the current value is allowed.
    assert!(apply_patch(&win(), &awards).is_ok());
}

#[test]
fn patch_allows_echoed_id() {
    let mut patch = Data::new();
    patch.insert("id".into(), json!(1));
    patch.insert("title".into(), json!("Renamed"));
    assert_eq!(apply_patch(&win(), &patch).unwrap().title, "Renamed");
}

#[test]
fn patch_rejects_wrong_type() {
    let mut patch = Data::new();
    patch.insert("category".into(), json!("galactic"));
    assert!(matches!(apply_patch(&win(), &patch), Err(ServiceError::Validation(_))));
}

#[test]
fn patch_revalidates_merged_record() {
    let mut patch = Data::new();
    patch.insert("title".into(), json!("   "));
    assert!(matches!(apply_patch(&win(), &patch), Err(ServiceError::Validation(_))));
}

#[test]
fn newest_first_breaks_ties_by_id() {
    let mut a = win();
    let mut b = win();
    b.id = 2;
    let mut c = win();
    c.id = 3;
    c.timestamp -= time::Duration::hours(1);
    a.title = "first".into();

    let mut records = vec![a, c, b];
    sort_newest_first(&mut records, |w| w.timestamp);
    let ids: Vec<i64> = records.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
}

#[test]
fn require_rejects_blank() {
    assert!(require("title", "ok").is_ok());
    assert!(require("title", " \t").is_err());
}
