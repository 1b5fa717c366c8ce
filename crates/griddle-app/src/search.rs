// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::ids::RecordId;
use crate::model::Record;

/// Ranked text search over the record set. Implementations return matching
/// record ids best-first; an empty query never reaches an engine.
pub trait SearchEngine {
    fn search(&self, records: &[Record], keys: &[&str], query: &str) -> Vec<RecordId>;
}

const MIN_SCORE: i64 = 30;

/// Skim-based fuzzy matching across the searchable columns. A record's score
/// is its best field score; ties keep store order.
pub struct FuzzyEngine {
    matcher: SkimMatcherV2,
    min_score: i64,
}

impl Default for FuzzyEngine {
    fn default() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
            min_score: MIN_SCORE,
        }
    }
}

impl SearchEngine for FuzzyEngine {
    fn search(&self, records: &[Record], keys: &[&str], query: &str) -> Vec<RecordId> {
        let mut scored: Vec<(i64, usize, RecordId)> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let best = keys
                .iter()
                .filter_map(|key| self.matcher.fuzzy_match(&record.text(key), query))
                .max();
            if let Some(score) = best
                && score >= self.min_score
            {
                scored.push((score, index, record.id));
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, _, id)| id).collect()
    }
}

/// Engine-free fallback: case-insensitive substring match against any
/// searchable column, store order preserved.
pub fn substring_filter<'a>(records: &'a [Record], keys: &[&str], query: &str) -> Vec<&'a Record> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            keys.iter()
                .any(|key| record.text(key).to_lowercase().contains(&needle))
        })
        .collect()
}
