use super::files::{export_csv, export_json, ExportError};
use crate::hoyo::models::{Character, UserInfo, Wish, WISH_TIME_FORMAT};
use crate::loggers::sink::LogSink;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Column order of `characters.csv`.
pub const CHARACTER_COLUMNS: [&str; 5] = ["Name", "Level", "Element", "Rarity", "Icon"];
/// Column order of `wishes.csv`.
pub const WISH_COLUMNS: [&str; 4] = ["Name", "Rarity", "Type", "Date"];

/// The fixed-shape user report written to `user_report.json`.
///
/// Field names are the exact keys of the exported JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Player display name.
    #[serde(rename = "Player Name")]
    pub player_name: String,
    /// Account (adventure) level.
    #[serde(rename = "Adventure Level")]
    pub adventure_level: i64,
    /// Account region/server.
    #[serde(rename = "Region")]
    pub region: String,
    /// Number of owned characters.
    #[serde(rename = "Number of Characters")]
    pub character_count: usize,
    /// Number of wish entries retrieved.
    #[serde(rename = "Number of Wishes")]
    pub wish_count: usize,
    /// Whether today's daily reward has been claimed.
    #[serde(rename = "Last Daily Reward Claimed")]
    pub daily_reward_claimed: bool,
}

/// Composes the user report.
///
/// Fails fast with [`ExportError::MissingProfile`] when no validated
/// profile is available, instead of producing a partial report.
pub fn build_report(
    user: Option<&UserInfo>,
    characters: &[Character],
    wishes: &[Wish],
) -> Result<ReportRecord, ExportError> {
    let user = user.ok_or(ExportError::MissingProfile)?;

    Ok(ReportRecord {
        player_name: user.nickname.clone(),
        adventure_level: user.level,
        region: user.region.clone(),
        character_count: characters.len(),
        wish_count: wishes.len(),
        daily_reward_claimed: user.daily_reward_claimed,
    })
}

/// Shapes characters into export rows keyed by the CSV column names.
pub fn character_rows(characters: &[Character]) -> Vec<Map<String, Value>> {
    characters
        .iter()
        .map(|ch| {
            let mut row = Map::new();
            row.insert("Name".to_string(), json!(ch.name));
            row.insert("Level".to_string(), json!(ch.level));
            row.insert("Element".to_string(), json!(ch.element));
            row.insert("Rarity".to_string(), json!(ch.rarity));
            row.insert("Icon".to_string(), json!(ch.icon));
            row
        })
        .collect()
}

/// Shapes wishes into export rows keyed by the CSV column names.
pub fn wish_rows(wishes: &[Wish]) -> Vec<Map<String, Value>> {
    wishes
        .iter()
        .map(|wish| {
            let mut row = Map::new();
            row.insert("Name".to_string(), json!(wish.name));
            row.insert("Rarity".to_string(), json!(wish.rarity));
            row.insert("Type".to_string(), json!(wish.pull_type));
            row.insert(
                "Date".to_string(),
                json!(wish.time.format(WISH_TIME_FORMAT).to_string()),
            );
            row
        })
        .collect()
}

/// Reports one export outcome through the sink; failures are data here,
/// not errors to propagate.
fn announce(result: Result<(), ExportError>, path: &Path, sink: &dyn LogSink) {
    match result {
        Ok(()) => sink.success(&format!("Data exported to {}", path.display())),
        Err(e) => sink.error(&format!("Error exporting to {}: {}", path.display(), e)),
    }
}

/// Writes `characters.json` and `characters.csv` into `dir`. Each write is
/// isolated; a failure is announced and the sibling still runs.
pub fn save_characters(characters: &[Character], dir: &Path, sink: &dyn LogSink) {
    let rows = character_rows(characters);

    let json_path = dir.join("characters.json");
    announce(export_json(&rows, &json_path), &json_path, sink);

    let csv_path = dir.join("characters.csv");
    announce(export_csv(&rows, &csv_path, &CHARACTER_COLUMNS), &csv_path, sink);
}

/// Writes `wishes.json` and `wishes.csv` into `dir`, with the same
/// isolation as [`save_characters`].
pub fn save_wishes(wishes: &[Wish], dir: &Path, sink: &dyn LogSink) {
    let rows = wish_rows(wishes);

    let json_path = dir.join("wishes.json");
    announce(export_json(&rows, &json_path), &json_path, sink);

    let csv_path = dir.join("wishes.csv");
    announce(export_csv(&rows, &csv_path, &WISH_COLUMNS), &csv_path, sink);
}

/// Writes `user_report.json` into `dir`.
pub fn save_report(report: &ReportRecord, dir: &Path, sink: &dyn LogSink) {
    let path = dir.join("user_report.json");
    announce(export_json(report, &path), &path, sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggers::sink::{CaptureSink, Level};
    use chrono::NaiveDateTime;

    fn user() -> UserInfo {
        UserInfo {
            nickname: "Aether".to_string(),
            level: 58,
            region: "os_euro".to_string(),
            daily_reward_claimed: true,
        }
    }

    fn character() -> Character {
        Character {
            id: 10000003,
            name: "Jean".to_string(),
            level: 80,
            element: "Anemo".to_string(),
            rarity: 5,
            icon: "https://img.test/jean.png".to_string(),
        }
    }

    fn wish(name: &str) -> Wish {
        Wish {
            name: name.to_string(),
            rarity: 4,
            pull_type: "Standard Wish".to_string(),
            time: NaiveDateTime::parse_from_str("2024-03-04 05:06:07", WISH_TIME_FORMAT)
                .expect("fixture time"),
        }
    }

    #[test]
    fn report_has_the_six_exported_fields() {
        let report =
            build_report(Some(&user()), &[character()], &[wish("Amber"), wish("Lisa")])
                .expect("report");
        let value = serde_json::to_value(&report).expect("to_value");

        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 6);
        for key in [
            "Player Name",
            "Adventure Level",
            "Region",
            "Number of Characters",
            "Number of Wishes",
            "Last Daily Reward Claimed",
        ] {
            assert!(keys.contains(&key), "missing key {}", key);
        }
        assert_eq!(value["Number of Wishes"], 2);
    }

    #[test]
    fn missing_profile_fails_fast() {
        let result = build_report(None, &[], &[]);
        assert!(matches!(result, Err(ExportError::MissingProfile)));
    }

    #[test]
    fn report_json_round_trips_structurally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = CaptureSink::new();
        let report = build_report(Some(&user()), &[character()], &[wish("Amber")])
            .expect("report");

        save_report(&report, dir.path(), &sink);

        let raw = std::fs::read_to_string(dir.path().join("user_report.json")).expect("read");
        let reread: ReportRecord = serde_json::from_str(&raw).expect("parse");
        assert_eq!(reread, report);
    }

    #[test]
    fn wish_rows_format_the_date_column() {
        let rows = wish_rows(&[wish("Amber")]);
        assert_eq!(rows[0]["Date"], "2024-03-04 05:06:07");
        assert_eq!(rows[0]["Rarity"], 4);
    }

    #[test]
    fn save_characters_writes_both_formats() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = CaptureSink::new();

        save_characters(&[character()], dir.path(), &sink);

        assert!(dir.path().join("characters.json").exists());
        let csv = std::fs::read_to_string(dir.path().join("characters.csv")).expect("read");
        assert!(csv.starts_with("Name,Level,Element,Rarity,Icon\n"));
        assert!(csv.contains("Jean,80,Anemo,5,https://img.test/jean.png"));
        assert_eq!(sink.count(Level::Success), 2);
    }

    #[test]
    fn export_failures_are_isolated_and_announced() {
        let sink = CaptureSink::new();
        let bogus_dir = Path::new("/definitely/not/here");

        save_wishes(&[wish("Amber")], bogus_dir, &sink);

        // Both writes were attempted, both failures were announced, and
        // control returned normally.
        assert_eq!(sink.count(Level::Error), 2);
        assert_eq!(sink.count(Level::Success), 0);
    }
}
