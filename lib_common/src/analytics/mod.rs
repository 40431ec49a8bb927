//! # Wish Analytics Module
//!
//! Pure reduction of a wish history into its rarity distribution and its
//! most frequently pulled items. No I/O happens here: the engine takes a
//! slice, returns a summary, and leaves presentation to the `ChartSink`
//! capability and the textual reporter.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use crate::hoyo::models::Wish;
use crate::loggers::sink::LogSink;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Derived analytics over one wish history. Recomputed each run, never
/// persisted back into the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Exact pull count per rarity value.
    pub rarity_distribution: BTreeMap<u8, usize>,
    /// Item names ranked by pull count, truncated to the requested length.
    pub top_items: Vec<(String, usize)>,
}

/// Reduces a wish history to its summary.
///
/// Returns `None` for an empty history, a normal "no data" outcome that
/// lets callers skip the dependent stages. The ranking is stable: equal
/// counts keep the order in which the items first appeared in the input.
pub fn analyze(wishes: &[Wish], top_n: usize) -> Option<AnalyticsSummary> {
    if wishes.is_empty() {
        return None;
    }

    let mut rarity_distribution: BTreeMap<u8, usize> = BTreeMap::new();
    for wish in wishes {
        *rarity_distribution.entry(wish.rarity).or_insert(0) += 1;
    }

    // Counts keyed by name, kept in first-occurrence order so the stable
    // sort below breaks frequency ties that way.
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for wish in wishes {
        match positions.get(wish.name.as_str()) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(wish.name.as_str(), counts.len());
                counts.push((wish.name.clone(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_n);

    Some(AnalyticsSummary {
        rarity_distribution,
        top_items: counts,
    })
}

/// Writes the textual analysis report through the sink.
pub fn log_summary(summary: &AnalyticsSummary, sink: &dyn LogSink) {
    sink.success("--- Wish History Analysis ---");
    sink.success(&format!(
        "Rarity Distribution: {:?}",
        summary.rarity_distribution
    ));
    sink.success(&format!("Top {} Items Obtained:", summary.top_items.len()));
    for (name, count) in &summary.top_items {
        sink.success(&format!("{}: {} times", name, count));
    }
}

/// Presentation capability consuming a non-empty summary.
///
/// The engine's only obligation toward it is to hand over well-formed,
/// non-empty data; rendering belongs entirely to the implementor.
pub trait ChartSink {
    /// Renders the rarity distribution as a share-per-rarity figure.
    fn rarity_pie(&self, distribution: &BTreeMap<u8, usize>);

    /// Renders the ranked item counts as horizontal bars.
    fn top_items_bars(&self, items: &[(String, usize)]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hoyo::models::WISH_TIME_FORMAT;
    use chrono::NaiveDateTime;

    fn wish(name: &str, rarity: u8) -> Wish {
        let time = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", WISH_TIME_FORMAT)
            .expect("fixture time");
        Wish {
            name: name.to_string(),
            rarity,
            pull_type: "Standard Wish".to_string(),
            time,
        }
    }

    fn sample() -> Vec<Wish> {
        vec![
            wish("A", 5),
            wish("B", 4),
            wish("A", 5),
            wish("C", 4),
            wish("C", 4),
            wish("C", 4),
        ]
    }

    #[test]
    fn empty_history_is_no_data_not_an_error() {
        assert_eq!(analyze(&[], 5), None);
    }

    #[test]
    fn rarity_counts_and_ranking_match_the_input() {
        let summary = analyze(&sample(), 5).expect("summary");

        let mut expected = BTreeMap::new();
        expected.insert(5u8, 2usize);
        expected.insert(4u8, 4usize);
        assert_eq!(summary.rarity_distribution, expected);

        assert_eq!(
            summary.top_items,
            vec![
                ("C".to_string(), 3),
                ("A".to_string(), 2),
                ("B".to_string(), 1),
            ]
        );
    }

    #[test]
    fn distribution_sums_to_input_length() {
        let wishes = sample();
        let summary = analyze(&wishes, 10).expect("summary");
        let total: usize = summary.rarity_distribution.values().sum();
        assert_eq!(total, wishes.len());
    }

    #[test]
    fn distribution_ignores_input_order() {
        let mut reversed = sample();
        reversed.reverse();
        let a = analyze(&sample(), 10).expect("summary");
        let b = analyze(&reversed, 10).expect("summary");
        assert_eq!(a.rarity_distribution, b.rarity_distribution);
    }

    #[test]
    fn frequency_ties_keep_first_occurrence_order() {
        let wishes = vec![
            wish("Late", 4),
            wish("Early", 4),
            wish("Late", 4),
            wish("Early", 4),
        ];
        let summary = analyze(&wishes, 5).expect("summary");
        assert_eq!(
            summary.top_items,
            vec![("Late".to_string(), 2), ("Early".to_string(), 2)]
        );
    }

    #[test]
    fn truncation_never_exceeds_the_limit() {
        let summary = analyze(&sample(), 2).expect("summary");
        assert_eq!(summary.top_items.len(), 2);
        assert_eq!(summary.top_items[0].0, "C");

        // A limit beyond the distinct-item count returns them all.
        let summary = analyze(&sample(), 10).expect("summary");
        assert_eq!(summary.top_items.len(), 3);
    }

    #[test]
    fn input_is_left_untouched() {
        let wishes = sample();
        let before = wishes.clone();
        let _ = analyze(&wishes, 5);
        assert_eq!(wishes, before);
    }
}
