//! Position reconciliation
//!
//! Reordering an index means moving channels, and every move is one API
//! call. The slots already in the right relative order form a longest
//! increasing subsequence of the current positions; only the slots
//! outside it are moved.

use std::collections::HashSet;

/// Indices of a longest strictly-increasing subsequence of `positions`.
///
/// O(n²) DP; entry counts are small. The first predecessor extending
/// the longest chain wins; among equal-length chains the endpoint with
/// the smallest value (then the smallest index) wins, which leaves the
/// most room for the reassignment cursor.
fn longest_increasing_run(positions: &[i64]) -> Vec<usize> {
    let n = positions.len();
    if n == 0 {
        return Vec::new();
    }

    let mut len = vec![1usize; n];
    let mut prev = vec![usize::MAX; n];
    for i in 0..n {
        for j in 0..i {
            if positions[j] < positions[i] && len[j] + 1 > len[i] {
                len[i] = len[j] + 1;
                prev[i] = j;
            }
        }
    }

    let mut best = 0;
    for i in 1..n {
        if len[i] > len[best] || (len[i] == len[best] && positions[i] < positions[best]) {
            best = i;
        }
    }

    let mut run = Vec::new();
    let mut i = best;
    loop {
        run.push(i);
        if prev[i] == usize::MAX {
            break;
        }
        i = prev[i];
    }
    run.reverse();
    run
}

/// Per-slot deltas that bring `positions` into ascending order while
/// moving only the slots outside the longest increasing run.
///
/// Moved slots are assigned, in slot order, the smallest integer above
/// the cursor that no current position occupies; the cursor tracks the
/// last kept or assigned value. Delta 0 means the slot stays put.
pub fn adjust_positions(positions: &[i64]) -> Vec<i64> {
    let keep: HashSet<usize> = longest_increasing_run(positions).into_iter().collect();

    let mut deltas = vec![0i64; positions.len()];
    let mut cursor = 1i64;
    for (i, &position) in positions.iter().enumerate() {
        if keep.contains(&i) {
            cursor = position;
        } else {
            while positions.contains(&cursor) {
                cursor += 1;
            }
            deltas[i] = cursor - position;
            cursor += 1;
        }
    }
    deltas
}
