use super::*;
use crate::record::Record;
use time::OffsetDateTime;

fn epoch(secs: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(secs).unwrap()
}

fn message() -> Message {
    Message::from_draft(
        1,
        epoch(1_700_000_000),
        NewMessage {
            author_id: 7,
            author_name: "Sam Ortiz".into(),
            author_avatar: None,
            content: "morning all".into(),
            attachments: vec![],
        },
    )
    .unwrap()
}

#[test]
fn toggle_reaction_adds_then_removes() {
    let mut msg = message();
    assert!(msg.toggle_reaction("👍", 3));
    assert_eq!(msg.reactions.len(), 1);
    assert_eq!(msg.reactions[0].count, 1);

    assert!(!msg.toggle_reaction("👍", 3));
    assert!(msg.reactions.is_empty());
}

#[test]
fn toggle_reaction_keeps_other_voters() {
    let mut msg = message();
    msg.toggle_reaction("🎉", 1);
    msg.toggle_reaction("🎉", 2);
    msg.toggle_reaction("🎉", 1);
    assert_eq!(msg.reactions.len(), 1);
    assert_eq!(msg.reactions[0].count, 1);
    assert!(msg.reactions[0].user_ids.contains(&2));
}

#[test]
fn message_requires_content_or_attachment() {
    let err = Message::from_draft(
        1,
        epoch(0),
        NewMessage { author_id: 1, author_name: "A".into(), author_avatar: None, content: "  ".into(), attachments: vec![] },
    )
    .unwrap_err();
    assert!(matches!(err, crate::error::ServiceError::Validation(_)));

    let with_file = Message::from_draft(
        1,
        epoch(0),
        NewMessage {
            author_id: 1,
            author_name: "A".into(),
            author_avatar: None,
            content: String::new(),
            attachments: vec![Attachment { name: "report.pdf".into(), size: 1024, kind: "application/pdf".into() }],
        },
    );
    assert!(with_file.is_ok());
}

#[test]
fn message_decodes_hosted_field_names() {
    let json = r#"{
        "id": 4,
        "user_id": 9,
        "user_name": "Lee",
        "content": "hi",
        "timestamp": "2024-05-01T12:00:00Z",
        "reactions": "[{\"emoji\":\"👍\",\"count\":1,\"user_ids\":[9]}]",
        "attachments": ""
    }"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.author_id, 9);
    assert_eq!(msg.author_name, "Lee");
    assert_eq!(msg.reactions.len(), 1);
    assert!(msg.attachments.is_empty());
}

#[test]
fn cast_vote_replaces_prior_vote() {
    let mut rec = Recommendation::from_draft(
        1,
        epoch(0),
        NewRecommendation {
            author_id: 1,
            author_name: "A".into(),
            title: "Share negative keyword lists".into(),
            description: String::new(),
            category: "process".into(),
        },
    )
    .unwrap();
    assert_eq!(rec.status, RecommendationStatus::Open);

    rec.cast_vote(5, "Kim", VoteKind::Up);
    rec.cast_vote(5, "Kim", VoteKind::Up);
    assert_eq!((rec.upvote_count, rec.downvote_count), (1, 0));

    rec.cast_vote(5, "Kim", VoteKind::Down);
    rec.cast_vote(6, "Jo", VoteKind::Down);
    assert_eq!((rec.upvote_count, rec.downvote_count), (0, 2));
    assert_eq!(rec.votes.len(), 2);
}

#[test]
fn recommendation_status_uses_kebab_case() {
    let json = serde_json::to_string(&RecommendationStatus::UnderReview).unwrap();
    assert_eq!(json, r#""under-review""#);
}

#[test]
fn user_draft_derives_avatar_and_sheet_link() {
    let user = User::from_draft(
        3,
        epoch(0),
        NewUser { name: "Jamie Lynn Ortiz".into(), email: "jamie@example.com".into(), role: Role::User },
    )
    .unwrap();
    assert_eq!(user.avatar, "JLO");
    assert_eq!(user.sheet_link, "https://docs.google.com/spreadsheets/d/jamie-lynn-ortiz-sheet");
    assert_eq!(user.last_active, epoch(0));
}

#[test]
fn user_role_defaults_to_user() {
    let draft: NewUser = serde_json::from_str(r#"{"name":"A B","email":"a@b.co"}"#).unwrap();
    assert_eq!(draft.role, Role::User);
}

#[test]
fn user_rejects_bad_email() {
    let err = User::from_draft(1, epoch(0), NewUser { name: "A".into(), email: "nope".into(), role: Role::Admin });
    assert!(err.is_err());
}

#[test]
fn calendar_event_defaults_type() {
    let draft: NewCalendarEvent = serde_json::from_str(r#"{"title":"QBR","date":"2024-07-15"}"#).unwrap();
    let event = CalendarEvent::from_draft(2, epoch(0), draft).unwrap();
    assert_eq!(event.kind, calendar::DEFAULT_EVENT_TYPE);

    let typed: NewCalendarEvent = serde_json::from_str(r#"{"title":"PTO","date":"2024-07-16","type":"time-off"}"#).unwrap();
    assert_eq!(CalendarEvent::from_draft(3, epoch(0), typed).unwrap().kind, "time-off");
}

#[test]
fn tool_tags_accept_comma_text() {
    let draft: NewTool = serde_json::from_str(r#"{"name":"Optmyzr","tags":"bidding, audits"}"#).unwrap();
    let tool = Tool::from_draft(1, epoch(0), draft).unwrap();
    assert_eq!(tool.tags, vec!["bidding", "audits"]);
}

#[test]
fn tool_vote_moves_between_counters() {
    let draft: NewTool = serde_json::from_str(r#"{"name":"Optmyzr"}"#).unwrap();
    let mut tool = Tool::from_draft(1, epoch(0), draft).unwrap();
    tool.likes = 4;

    tool.cast_vote(2, ToolVoteKind::Like);
    tool.cast_vote(3, ToolVoteKind::Dislike);
    assert_eq!((tool.likes, tool.dislikes), (5, 1));

    tool.cast_vote(2, ToolVoteKind::Like);
    assert_eq!((tool.likes, tool.dislikes), (5, 1));

    tool.cast_vote(2, ToolVoteKind::Dislike);
    assert_eq!((tool.likes, tool.dislikes), (4, 2));
    assert_eq!(tool.votes.len(), 2);
}

#[test]
fn script_requires_link() {
    let draft: NewScript =
        serde_json::from_str(r#"{"name":"Budget pacing","description":"d","category":"budget"}"#).unwrap();
    assert!(Script::from_draft(1, epoch(0), draft).is_err());
}

#[test]
fn metric_draft_derives_ratios() {
    let draft = NewUserMetric {
        user_id: 2,
        user_name: "Kim".into(),
        account: "Acme Auto".into(),
        account_type: "search".into(),
        direct_manager: "Pat".into(),
        optimization_score: 88.0,
        clicks: 200,
        impressions: 10_000,
        cost: 500.0,
        conversions: 10.0,
    };
    let metric = UserMetric::from_draft(1, epoch(0), draft).unwrap();
    assert!((metric.ctr - 2.0).abs() < 1e-9);
    assert!((metric.avg_cpc - 2.5).abs() < 1e-9);
    assert!((metric.conversion_rate - 5.0).abs() < 1e-9);
    assert!((metric.cost_per_conversion - 50.0).abs() < 1e-9);
}

#[test]
fn metric_ratios_are_zero_without_denominator() {
    let draft: NewUserMetric = serde_json::from_str(r#"{"user_id":2}"#).unwrap();
    let metric = UserMetric::from_draft(1, epoch(0), draft).unwrap();
    assert!(metric.ctr.abs() < f64::EPSILON);
    assert!(metric.cost_per_conversion.abs() < f64::EPSILON);
}
