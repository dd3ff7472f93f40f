use std::collections::HashMap;

use crate::data::model::{CooccurrencePair, MemberMention};

// ---------------------------------------------------------------------------
// Symmetric member × member matrix
// ---------------------------------------------------------------------------

/// Co-occurrence counts over a fixed, ordered member list.
///
/// Invariant: `cells[i][j] == cells[j][i]` and the diagonal is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CooccurrenceMatrix {
    members: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<Vec<u64>>,
    dropped: usize,
}

impl CooccurrenceMatrix {
    /// Write every pair into both halves of a zeroed matrix. Pairs naming a
    /// member outside `members`, or the same member twice, are dropped.
    pub fn build(members: &[String], pairs: &[CooccurrencePair]) -> Self {
        let mut index = HashMap::with_capacity(members.len());
        let mut ordered = Vec::with_capacity(members.len());
        for m in members {
            if !index.contains_key(m) {
                index.insert(m.clone(), ordered.len());
                ordered.push(m.clone());
            }
        }

        let n = ordered.len();
        let mut cells = vec![vec![0u64; n]; n];
        let mut written = vec![vec![false; n]; n];
        let mut dropped = 0;

        for pair in pairs {
            let (Some(&a), Some(&b)) = (index.get(&pair.member_1), index.get(&pair.member_2)) else {
                log::debug!("dropping pair {} outside the member list", pair.label());
                dropped += 1;
                continue;
            };
            if a == b {
                log::debug!("dropping self pair {}", pair.label());
                dropped += 1;
                continue;
            }
            if written[a][b] {
                log::warn!(
                    "duplicate co-occurrence row for {}; keeping the later count",
                    pair.label()
                );
            }
            cells[a][b] = pair.count;
            cells[b][a] = pair.count;
            written[a][b] = true;
            written[b][a] = true;
        }

        if dropped > 0 {
            log::debug!("{dropped} co-occurrence rows referenced unknown members");
        }

        Self {
            members: ordered,
            index,
            cells,
            dropped,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Count for a pair of members, `None` if either is not in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<u64> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        Some(self.cells[i][j])
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.cells[i]
    }

    pub fn max_count(&self) -> u64 {
        self.cells
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Number of input rows that did not make it into the matrix.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Member order for a group without a configured list: the member stats
/// order, then anyone who only shows up in the pairs.
pub fn member_order(mentions: Option<&[MemberMention]>, pairs: &[CooccurrencePair]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !order.iter().any(|m| m == name) {
            order.push(name.to_string());
        }
    };
    for m in mentions.unwrap_or_default() {
        push(&m.member);
    }
    for p in pairs {
        push(&p.member_1);
        push(&p.member_2);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str, count: u64) -> CooccurrencePair {
        CooccurrencePair {
            member_1: a.into(),
            member_2: b.into(),
            pair: Some(format!("{a} & {b}")),
            count,
        }
    }

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn writes_counts_into_both_halves() {
        let m = CooccurrenceMatrix::build(
            &members(&["A", "B", "C"]),
            &[pair("A", "B", 5), pair("B", "C", 3)],
        );
        assert_eq!(m.get("A", "B"), Some(5));
        assert_eq!(m.get("B", "A"), Some(5));
        assert_eq!(m.get("B", "C"), Some(3));
        assert_eq!(m.get("C", "B"), Some(3));
        assert_eq!(m.get("A", "C"), Some(0));
        assert_eq!(m.get("A", "A"), Some(0));
        assert_eq!(m.max_count(), 5);
    }

    #[test]
    fn matrix_is_symmetric() {
        let names = members(&["RM", "Jin", "SUGA", "V"]);
        let m = CooccurrenceMatrix::build(
            &names,
            &[
                pair("RM", "Jin", 12),
                pair("V", "SUGA", 7),
                pair("Jin", "V", 1),
                pair("SUGA", "RM", 40),
            ],
        );
        for a in &names {
            for b in &names {
                assert_eq!(m.get(a, b), m.get(b, a), "{a}/{b}");
            }
        }
    }

    #[test]
    fn drops_unknown_and_self_pairs() {
        let m = CooccurrenceMatrix::build(
            &members(&["A", "B"]),
            &[pair("A", "Z", 9), pair("A", "A", 4), pair("A", "B", 2)],
        );
        assert_eq!(m.dropped(), 2);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("A", "Z"), None);
        assert_eq!(m.get("A", "A"), Some(0));
        assert_eq!(m.max_count(), 2);
    }

    #[test]
    fn later_duplicate_pair_wins() {
        let m = CooccurrenceMatrix::build(
            &members(&["A", "B"]),
            &[pair("A", "B", 2), pair("B", "A", 6)],
        );
        assert_eq!(m.get("A", "B"), Some(6));
        assert_eq!(m.get("B", "A"), Some(6));
    }

    #[test]
    fn derives_member_order_from_stats_then_pairs() {
        let mentions = vec![
            MemberMention {
                member: "B".into(),
                mention_count: 10,
                mention_rate: 50.0,
            },
            MemberMention {
                member: "A".into(),
                mention_count: 10,
                mention_rate: 50.0,
            },
        ];
        let pairs = [pair("A", "C", 1)];
        assert_eq!(member_order(Some(&mentions), &pairs), members(&["B", "A", "C"]));
        assert_eq!(member_order(None, &pairs), members(&["A", "C"]));
    }
}
