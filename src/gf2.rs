//! Gauss-Jordan elimination over `GF(2)`, returning null-space vectors as
//! sets of row indices rather than bit vectors.
//!
//! Grounded on the reference's `solver.h` `GaussJordan`: each row of the
//! augmented matrix carries a *history set*, initially just its own row
//! index, and every row operation (swap-into-place, eliminate-below,
//! eliminate-above) XORs the history sets alongside the bit rows. A row that
//! reduces to all zeros names, via its history set, exactly which of the
//! original input rows XOR together to zero — the null space of the system.
//! Used by callers doing quadratic-sieve-style factorization; nothing in this
//! crate calls it directly (§4.7 of the design notes).

use std::collections::BTreeSet;

/// XORs `from` into `to` in place: an index present in both sets cancels out,
/// one present in only `from` gets added to `to`.
fn merge_by_xor(from: &BTreeSet<usize>, to: &mut BTreeSet<usize>) {
    for &f in from {
        if !to.remove(&f) {
            to.insert(f);
        }
    }
}

fn xor_row(row: &mut [bool], other: &[bool]) {
    for (a, b) in row.iter_mut().zip(other) {
        *a ^= *b;
    }
}

/// Solves a homogeneous linear system with `GF(2)` coefficients, returning
/// the null-space basis as a set of row-index sets: each returned set names
/// the rows of `matrix` whose XOR is the zero vector.
pub fn solve(matrix: &[Vec<bool>]) -> Vec<BTreeSet<usize>> {
    if matrix.is_empty() {
        return Vec::new();
    }
    let rows = matrix.len();
    let cols = matrix[0].len();
    let mut m: Vec<Vec<bool>> = matrix.to_vec();
    let mut states: Vec<BTreeSet<usize>> = (0..rows).map(|i| BTreeSet::from([i])).collect();

    // Forward elimination.
    for k in 0..cols {
        let mut where_unit = None;
        for i in k..rows {
            if m[i][k] {
                where_unit = Some(i);
                break;
            }
        }
        let Some(pivot) = where_unit else { continue };
        if pivot > k {
            let (from, to) = split_two(&mut states, pivot, k);
            merge_by_xor(from, to);
            let (row_from, row_to) = split_two(&mut m, pivot, k);
            xor_row(row_to, row_from);
        }
        for i in (k + 1)..rows {
            if m[i][k] {
                let (from, to) = split_two(&mut states, k, i);
                merge_by_xor(from, to);
                let (row_from, row_to) = split_two(&mut m, k, i);
                xor_row(row_to, row_from);
            }
        }
    }

    // Back substitution.
    for k in (0..cols).rev() {
        let i = rows as isize + k as isize - cols as isize;
        if i < 0 {
            continue;
        }
        let i = i as usize;
        if !m[i][k] {
            continue;
        }
        for j in (0..i).rev() {
            if m[j][k] {
                let (from, to) = split_two(&mut states, i, j);
                merge_by_xor(from, to);
                let (row_from, row_to) = split_two(&mut m, i, j);
                xor_row(row_to, row_from);
            }
        }
    }

    m.iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|&b| !b))
        .map(|(i, _)| states[i].clone())
        .collect()
}

/// Returns mutable references to indices `a` and `b` of `v` (with `a != b`)
/// as `(&v[a], &mut v[b])`, since the borrow checker can't see that two
/// distinct indices of the same slice don't alias.
fn split_two<T>(v: &mut [T], a: usize, b: usize) -> (&T, &mut T) {
    assert_ne!(a, b);
    if a < b {
        let (left, right) = v.split_at_mut(b);
        (&left[a], &mut right[0])
    } else {
        let (left, right) = v.split_at_mut(a);
        (&right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_has_no_null_space() {
        assert!(solve(&[]).is_empty());
    }

    #[test]
    fn identity_matrix_has_trivial_null_space() {
        let m = vec![
            vec![true, false, false],
            vec![false, true, false],
            vec![false, false, true],
        ];
        assert!(solve(&m).is_empty());
    }

    #[test]
    fn two_identical_rows_form_a_null_space_vector() {
        let m = vec![vec![true, true, false], vec![true, true, false]];
        let result = solve(&m);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], BTreeSet::from([0, 1]));
    }

    #[test]
    fn linear_combination_is_recovered() {
        // Row 2 == row 0 XOR row 1, so {0, 1, 2} should XOR to zero.
        let m = vec![
            vec![true, false, true],
            vec![false, true, true],
            vec![true, true, false],
        ];
        let result = solve(&m);
        assert!(result.iter().any(|s| s == &BTreeSet::from([0, 1, 2])));
    }
}
