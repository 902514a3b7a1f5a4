//! Frequency ranking for text columns.

use std::collections::HashMap;

use super::models::TopValue;
use super::stats::percentage;

/// Maximum number of ranked values reported per column.
pub const TOP_VALUE_LIMIT: usize = 5;

/// Ranks values by descending count, keeping at most [`TOP_VALUE_LIMIT`].
///
/// Ties keep first-seen order. `pct` is relative to the number of values
/// passed in.
pub fn top_values<'a, I>(values: I) -> Vec<TopValue>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, u64)> = Vec::new();
    let mut total = 0u64;

    for value in values {
        total += 1;
        match positions.get(value) {
            Some(&index) => counts[index].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(TOP_VALUE_LIMIT)
        .map(|(value, count)| TopValue {
            value: value.to_string(),
            count,
            pct: percentage(count, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_by_descending_count() {
        let ranked = top_values(["b", "a", "a", "c", "a", "b"]);
        let values: Vec<&str> = ranked.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[0].pct, 50.0);
        assert_eq!(ranked[2].pct, 16.7);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let ranked = top_values(["x", "y", "z", "y", "x", "z"]);
        let values: Vec<&str> = ranked.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_limit() {
        let ranked = top_values(["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(ranked.len(), TOP_VALUE_LIMIT);
        assert_eq!(ranked[4].value, "e");
    }

    #[test]
    fn test_empty() {
        assert!(top_values(std::iter::empty()).is_empty());
    }
}
