//! Near-duplicate collapse over fetched page records.
//!
//! Pages are grouped by type; within a group each new record is compared
//! against every already-kept record using word-level Jaccard similarity
//! (words longer than 3 characters, lower-cased). Above the threshold the
//! record with the higher word count survives. Group sizes are bounded by
//! the page cap, so the pairwise O(n²) comparison stays cheap.
//!
//! Contact pages collapse harder: at most one contact record is retained
//! per site, chosen by word count — not by fetch-completion order, which
//! the worker pool does not guarantee.

use crate::model::{PageRecord, PageType};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Minimum word length counted toward similarity.
const MIN_TOKEN_LEN: usize = 4;

/// Token-set Jaccard similarity between two body texts.
///
/// Symmetric and in [0, 1]. Two empty token sets are identical pages for
/// our purposes and score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Collapse near-duplicates across a run's page records.
///
/// Input order does not affect the surviving set: candidates are
/// considered in descending word count, so the largest member of any
/// duplicate cluster is kept regardless of fetch-completion order.
pub fn deduplicate(records: Vec<PageRecord>, threshold: f64) -> Vec<PageRecord> {
    let mut groups: BTreeMap<PageType, Vec<PageRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.page_type).or_default().push(record);
    }

    let mut kept: Vec<PageRecord> = Vec::new();

    for (page_type, mut group) in groups {
        if page_type == PageType::Contact {
            // One contact page per site: keep the wordiest.
            let before = group.len();
            if let Some(best) = group
                .into_iter()
                .max_by_key(|r| (r.word_count, std::cmp::Reverse(r.url.clone())))
            {
                if before > 1 {
                    debug!("collapsed {before} contact pages into {}", best.url);
                }
                kept.push(best);
            }
            continue;
        }

        // Largest first, so a smaller near-duplicate never displaces a
        // larger record that arrives later.
        group.sort_by(|a, b| {
            b.word_count
                .cmp(&a.word_count)
                .then_with(|| a.url.cmp(&b.url))
        });

        let mut group_kept: Vec<PageRecord> = Vec::new();
        for candidate in group {
            let duplicate_of = group_kept
                .iter()
                .position(|existing| {
                    similarity(&existing.body_text, &candidate.body_text) >= threshold
                });
            match duplicate_of {
                Some(idx) => {
                    debug!(
                        "dropping near-duplicate {} of {}",
                        candidate.url, group_kept[idx].url
                    );
                }
                None => group_kept.push(candidate),
            }
        }
        kept.extend(group_kept);
    }

    kept
}
