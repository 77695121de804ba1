// crates/weft-runtime/src/list/diff.rs
//! Keyed diff between two list snapshots.

use std::collections::HashMap;

use weft_layout::BatchOp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Position in the previous snapshot.
    pub index: usize,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Position in the next snapshot.
    pub index: usize,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDiff {
    pub removals: Vec<Removal>,
    pub insertions: Vec<Insertion>,
    pub moves: Vec<Move>,
}

impl ListDiff {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty() && self.moves.is_empty()
    }

    /// Deletes (descending), then inserts (ascending), then moves.
    pub fn batch_ops(&self) -> Vec<BatchOp> {
        let mut ops: Vec<BatchOp> = self
            .removals
            .iter()
            .rev()
            .map(|removal| BatchOp::Delete {
                index: removal.index,
            })
            .collect();
        ops.extend(self.insertions.iter().map(|insertion| BatchOp::Insert {
            index: insertion.index,
        }));
        ops.extend(self.moves.iter().map(|mv| BatchOp::Move {
            from: mv.from,
            to: mv.to,
        }));
        ops
    }
}

/// Diffs two id sequences. Ids must be unique within each sequence.
///
/// Items kept in both snapshots only move when they fall outside the longest run that is
/// already in relative order, so the move set is minimal.
pub fn diff_ids<S: AsRef<str>>(previous: &[S], next: &[S]) -> ListDiff {
    let old_positions: HashMap<&str, usize> = previous
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_ref(), index))
        .collect();
    let new_positions: HashMap<&str, usize> = next
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_ref(), index))
        .collect();

    let removals = previous
        .iter()
        .enumerate()
        .filter(|(_, id)| !new_positions.contains_key(id.as_ref()))
        .map(|(index, id)| Removal {
            index,
            id: id.as_ref().to_string(),
        })
        .collect();

    let mut insertions = Vec::new();
    // (old index, new index, id) for items in both snapshots, in next order.
    let mut common = Vec::new();
    for (index, id) in next.iter().enumerate() {
        match old_positions.get(id.as_ref()) {
            Some(&old) => common.push((old, index, id.as_ref())),
            None => insertions.push(Insertion {
                index,
                id: id.as_ref().to_string(),
            }),
        }
    }

    let old_order: Vec<usize> = common.iter().map(|(old, _, _)| *old).collect();
    let mut stable = vec![false; common.len()];
    for position in longest_increasing_subsequence(&old_order) {
        stable[position] = true;
    }
    let moves = common
        .iter()
        .zip(stable)
        .filter(|(_, stable)| !stable)
        .map(|((from, to, id), _)| Move {
            from: *from,
            to: *to,
            id: id.to_string(),
        })
        .collect();

    ListDiff {
        removals,
        insertions,
        moves,
    }
}

/// Positions (into `values`) of one longest strictly increasing subsequence.
fn longest_increasing_subsequence(values: &[usize]) -> Vec<usize> {
    // tails[k]: position of the smallest tail of an increasing run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessors: Vec<Option<usize>> = vec![None; values.len()];

    for (position, value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < *value);
        if slot > 0 {
            predecessors[position] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(position);
        } else {
            tails[slot] = position;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut current = tails.last().copied();
    while let Some(position) = current {
        run.push(position);
        current = predecessors[position];
    }
    run.reverse();
    run
}
