//! Tolerant serde decoders for fields the hosted backend stores as strings.
//!
//! The hosted CRUD API keeps list fields as embedded JSON text
//! (`reactions_c: "[...]"`, sometimes `""`) and tags as comma-separated text.
//! These helpers accept either encoding so only the canonical shape escapes
//! the model layer.

use std::collections::BTreeSet;

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::{Map, Value};
use time::Date;
use time::format_description::well_known::Iso8601;

use super::message::Reaction;

/// Decode a list from an array, embedded JSON text, empty text, or null.
///
/// # Errors
///
/// Fails when the value (or embedded text) is not a list of `T`.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Vec::new()),
        Value::String(text) => serde_json::from_str(&text).map_err(D::Error::custom),
        other => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

/// Decode tags from an array, embedded JSON text, or comma-separated text.
///
/// # Errors
///
/// Fails when the value is neither text nor a list of strings.
pub fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') {
                return serde_json::from_str(trimmed).map_err(D::Error::custom);
            }
            Ok(trimmed
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect())
        }
        other => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

/// Decode message reactions from any shape the hosted table has held:
///
/// - canonical `[{"emoji", "count", "user_ids": [..]}]`
/// - emoji map `{"👍": [1, 2]}`
/// - named list `[{"emoji", "count", "users": ["Jordan Lee"]}]`
///
/// Each shape may also arrive as embedded JSON text. Voters that are ids (or
/// numeric text) land in `user_ids`, anything else in `user_names`; `count`
/// is recomputed from the voter sets and entries without voters are dropped.
///
/// # Errors
///
/// Fails when the value is not a list or map of emoji voter sets.
pub fn reactions<'de, D>(deserializer: D) -> Result<Vec<Reaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::String(text) if text.trim().is_empty() => return Ok(Vec::new()),
        Value::String(text) => serde_json::from_str(&text).map_err(D::Error::custom)?,
        other => other,
    };

    let parsed: Result<Vec<Reaction>, String> = match value {
        Value::Object(by_emoji) => by_emoji
            .into_iter()
            .map(|(emoji, voters)| reaction(emoji, [voters]))
            .collect(),
        Value::Array(entries) => entries.into_iter().map(reaction_entry).collect(),
        other => Err(format!("expected reaction list or emoji map, got {other}")),
    };

    let mut reactions = parsed.map_err(D::Error::custom)?;
    reactions.retain(|reaction| reaction.count > 0);
    Ok(reactions)
}

fn reaction_entry(entry: Value) -> Result<Reaction, String> {
    let Value::Object(mut fields) = entry else {
        return Err(format!("expected reaction object, got {entry}"));
    };
    let emoji = match fields.remove("emoji") {
        Some(Value::String(emoji)) => emoji,
        _ => return Err("reaction is missing `emoji`".into()),
    };
    let voters = ["user_ids", "users", "user_names"].map(|key| take_list(&mut fields, key));
    reaction(emoji, voters)
}

fn take_list(fields: &mut Map<String, Value>, key: &str) -> Value {
    fields.remove(key).unwrap_or(Value::Null)
}

fn reaction<const N: usize>(emoji: String, voter_lists: [Value; N]) -> Result<Reaction, String> {
    let mut user_ids = BTreeSet::new();
    let mut user_names = BTreeSet::new();
    for voters in voter_lists {
        let items = match voters {
            Value::Null => continue,
            Value::Array(items) => items,
            other => return Err(format!("voters for {emoji} must be a list, got {other}")),
        };
        for voter in items {
            match voter {
                Value::Number(n) => {
                    let id = n.as_i64().ok_or_else(|| format!("invalid voter id {n} for {emoji}"))?;
                    user_ids.insert(id);
                }
                Value::String(text) => match text.trim().parse::<i64>() {
                    Ok(id) => {
                        user_ids.insert(id);
                    }
                    Err(_) => {
                        user_names.insert(text);
                    }
                },
                other => return Err(format!("invalid voter {other} for {emoji}")),
            }
        }
    }
    let count = user_ids.len() + user_names.len();
    Ok(Reaction { emoji, count, user_ids, user_names })
}

/// Calendar dates as `YYYY-MM-DD`. Full RFC 3339 timestamps are accepted on
/// input and truncated to their date part.
pub mod date {
    use super::*;

    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(date)
    }

    /// # Errors
    ///
    /// Fails when the text does not start with an ISO 8601 calendar date.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let day = text.get(..10).unwrap_or(&text);
        Date::parse(day, &Iso8601::DATE).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "list")]
        items: Vec<u32>,
        #[serde(default, deserialize_with = "tags")]
        tags: Vec<String>,
    }

    #[test]
    fn list_accepts_array_and_embedded_text() {
        let direct: Holder = serde_json::from_str(r#"{"items":[1,2]}"#).unwrap();
        assert_eq!(direct.items, vec![1, 2]);

        let embedded: Holder = serde_json::from_str(r#"{"items":"[3,4]"}"#).unwrap();
        assert_eq!(embedded.items, vec![3, 4]);
    }

    #[test]
    fn list_treats_blank_and_null_as_empty() {
        let blank: Holder = serde_json::from_str(r#"{"items":""}"#).unwrap();
        assert!(blank.items.is_empty());
        let null: Holder = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(null.items.is_empty());
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert!(missing.items.is_empty());
    }

    #[test]
    fn list_rejects_garbage_text() {
        assert!(serde_json::from_str::<Holder>(r#"{"items":"not json"}"#).is_err());
    }

    #[test]
    fn tags_split_comma_text() {
        let holder: Holder = serde_json::from_str(r#"{"tags":"seo, ppc ,,analytics"}"#).unwrap();
        assert_eq!(holder.tags, vec!["seo", "ppc", "analytics"]);
    }

    #[test]
    fn tags_accept_arrays() {
        let holder: Holder = serde_json::from_str(r#"{"tags":["a","b"]}"#).unwrap();
        assert_eq!(holder.tags, vec!["a", "b"]);
        let embedded: Holder = serde_json::from_str(r#"{"tags":"[\"c\"]"}"#).unwrap();
        assert_eq!(embedded.tags, vec!["c"]);
    }

    #[derive(Deserialize)]
    struct Reacted {
        #[serde(default, deserialize_with = "reactions")]
        reactions: Vec<Reaction>,
    }

    fn reactions_of(json: &str) -> Vec<Reaction> {
        serde_json::from_str::<Reacted>(json).unwrap().reactions
    }

    #[test]
    fn reactions_accept_emoji_map() {
        let parsed = reactions_of(r#"{"reactions":"{\"👍\":[1,2],\"🎉\":[]}"}"#);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].emoji, "👍");
        assert_eq!(parsed[0].count, 2);
        assert_eq!(parsed[0].user_ids, BTreeSet::from([1, 2]));
    }

    #[test]
    fn reactions_accept_named_voters() {
        let parsed = reactions_of(r#"{"reactions":[{"emoji":"🔥","count":7,"users":["Jordan Lee","3"]}]}"#);
        assert_eq!(parsed[0].count, 2);
        assert_eq!(parsed[0].user_ids, BTreeSet::from([3]));
        assert!(parsed[0].user_names.contains("Jordan Lee"));
    }

    #[test]
    fn reactions_accept_canonical_list() {
        let parsed = reactions_of(r#"{"reactions":[{"emoji":"👍","count":1,"user_ids":[4,5]}]}"#);
        assert_eq!(parsed[0].count, 2);
        assert!(parsed[0].user_names.is_empty());
        assert!(reactions_of(r#"{"reactions":""}"#).is_empty());
    }

    #[test]
    fn reactions_reject_scalars() {
        assert!(serde_json::from_str::<Reacted>(r#"{"reactions":5}"#).is_err());
        assert!(serde_json::from_str::<Reacted>(r#"{"reactions":[{"count":1}]}"#).is_err());
    }

    #[derive(Deserialize, serde::Serialize)]
    struct Day {
        #[serde(with = "date")]
        day: Date,
    }

    #[test]
    fn date_round_trips_and_truncates_timestamps() {
        let parsed: Day = serde_json::from_str(r#"{"day":"2024-03-09T10:00:00Z"}"#).unwrap();
        assert_eq!(parsed.day, Date::from_calendar_date(2024, time::Month::March, 9).unwrap());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"day":"2024-03-09"}"#);
    }
}
