//! Leaderboard assembly

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    pub rank: usize,
    pub id: T,
    pub value: f64,
}

/// Sort `(id, value)` pairs by value, highest first. Equal values keep
/// their input order. Ranks are 1-based positions.
pub fn assemble<T, I>(entries: I) -> Vec<Ranked<T>>
where
    I: IntoIterator<Item = (T, f64)>,
{
    let mut entries: Vec<(T, f64)> = entries.into_iter().collect();
    // sort_by is stable
    entries.sort_by(|a, b| compare_desc(a.1, b.1));

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (id, value))| Ranked {
            rank: idx + 1,
            id,
            value,
        })
        .collect()
}

/// Descending order with NaN sorted last
fn compare_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
