//! # Account Data Models
//!
//! Strict `serde` models for the payloads the endpoint catalogue returns,
//! plus the extraction helpers that validate an aggregated record into
//! them. Dynamic JSON stays at the fetch boundary; everything downstream
//! of this module works with typed values, and a payload that does not
//! match its schema is logged together with the offending value instead of
//! silently shaped into something else.

use crate::hoyo::aggregator::AggregatedRecord;
use crate::loggers::sink::LogSink;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Value};

/// Timestamp layout used by the wish-history payloads and the exports.
pub const WISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` timestamps of the wish
/// history, which are not ISO 8601 (no `T` separator).
pub mod wish_time {
    use super::WISH_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Formats the timestamp back into the wire layout.
    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(WISH_TIME_FORMAT).to_string())
    }

    /// Parses the wire layout, rejecting anything else.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, WISH_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A single gacha-style item pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    /// Localized item name.
    pub name: String,
    /// Item rarity in stars, 3 to 5.
    pub rarity: u8,
    /// The banner/pull type (e.g. "Character Event Wish").
    #[serde(rename = "item_type")]
    pub pull_type: String,
    /// Pull time as provided by the source.
    #[serde(with = "wish_time")]
    pub time: NaiveDateTime,
}

/// One owned character as reported by the game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Numeric character id.
    pub id: i64,
    /// Localized character name.
    pub name: String,
    /// Character level.
    pub level: i64,
    /// Element (Anemo, Pyro, ...).
    pub element: String,
    /// Rarity in stars.
    pub rarity: u8,
    /// Icon URL or resource reference.
    pub icon: String,
}

/// The player profile assembled from the profile and daily-reward slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Player display name.
    pub nickname: String,
    /// Account (adventure) level.
    pub level: i64,
    /// Account region/server.
    pub region: String,
    /// Whether today's daily reward has been claimed.
    #[serde(default)]
    pub daily_reward_claimed: bool,
}

/// Unwraps the standard `{"retcode": .., "data": {..}}` envelope; payloads
/// without one are used as-is.
fn slot_data<'a>(record: &'a AggregatedRecord, name: &str) -> Option<&'a Value> {
    record
        .payload(name)
        .map(|payload| payload.get("data").unwrap_or(payload))
}

/// Extracts the wish history from the `wish_history` slot.
///
/// Absent or failed slots yield an empty history; a present payload that
/// does not match the schema is logged with the raw value and also yields
/// an empty history, so one bad endpoint degrades the run instead of
/// ending it.
pub fn wishes_from_record(record: &AggregatedRecord, sink: &dyn LogSink) -> Vec<Wish> {
    let Some(data) = slot_data(record, "wish_history") else {
        sink.warn("No wish history data available for this run");
        return Vec::new();
    };

    let list = data.get("list").cloned().unwrap_or(Value::Null);
    match from_value::<Vec<Wish>>(list) {
        Ok(wishes) => {
            sink.debug(&format!("Normalized {} wish entries", wishes.len()));
            wishes
        }
        Err(e) => {
            sink.error(&format!(
                "Wish history normalization failed: {} (payload: {})",
                e, data
            ));
            Vec::new()
        }
    }
}

/// Extracts the owned characters from the `game_record` slot.
pub fn characters_from_record(record: &AggregatedRecord, sink: &dyn LogSink) -> Vec<Character> {
    let Some(data) = slot_data(record, "game_record") else {
        sink.warn("No game record data available for this run");
        return Vec::new();
    };

    let avatars = data.get("avatars").cloned().unwrap_or(Value::Null);
    match from_value::<Vec<Character>>(avatars) {
        Ok(characters) => {
            sink.debug(&format!("Normalized {} characters", characters.len()));
            characters
        }
        Err(e) => {
            sink.error(&format!(
                "Character list normalization failed: {} (payload: {})",
                e, data
            ));
            Vec::new()
        }
    }
}

/// Assembles the player profile from the `profile` slot, folding in the
/// claim flag from the `daily_reward` slot when present.
///
/// Returns `None` when the profile slot failed or does not validate; the
/// report stage treats that as a fail-fast condition.
pub fn user_info_from_record(record: &AggregatedRecord, sink: &dyn LogSink) -> Option<UserInfo> {
    let Some(data) = slot_data(record, "profile") else {
        sink.warn("No profile data available for this run");
        return None;
    };

    let raw_info = data.get("user_info").cloned().unwrap_or(Value::Null);
    let mut info = match from_value::<UserInfo>(raw_info) {
        Ok(info) => info,
        Err(e) => {
            sink.error(&format!(
                "Profile normalization failed: {} (payload: {})",
                e, data
            ));
            return None;
        }
    };

    if let Some(claimed) = slot_data(record, "daily_reward").and_then(|d| d.get("is_sign")).and_then(Value::as_bool) {
        info.daily_reward_claimed = claimed;
    }

    Some(info)
}
