// Row-partition enumeration for row layout.
//
// A partition of N ordered children into contiguous rows is written as
// the ascending list of indices at which rows start, so it always begins
// with 0. `RowBreaks` yields the partitions a `RowMode` asks for, lazily,
// since exhaustive enumeration is exponential in N.

use super::RowMode;

/// Iterator over row-start index lists for `weights.len()` children.
pub struct RowBreaks<'w> {
    mode: RowMode,
    weights: &'w [usize],
    current: Option<Vec<usize>>,
    done: bool,
}

impl<'w> RowBreaks<'w> {
    pub fn new(mode: RowMode, weights: &'w [usize]) -> Self {
        Self {
            mode,
            weights,
            current: None,
            done: weights.is_empty(),
        }
    }

    fn first(&self) -> Vec<usize> {
        match self.mode {
            RowMode::SingleColumn => (0..self.weights.len()).collect(),
            _ => vec![0],
        }
    }

    fn after(&self, prev: &[usize]) -> Option<Vec<usize>> {
        let n = self.weights.len();
        match self.mode {
            RowMode::SingleRow | RowMode::SingleColumn => None,
            RowMode::Linear => (prev.len() == 1 && n > 1).then(|| (0..n).collect()),
            RowMode::Exhaustive => {
                let mut seq = prev.to_vec();
                advance_breaks(&mut seq, n).then_some(seq)
            }
            RowMode::ExhaustiveFirstRow => next_first_row(prev, self.weights),
        }
    }
}

impl Iterator for RowBreaks<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let next = match &self.current {
            None => Some(self.first()),
            Some(prev) => self.after(prev),
        };
        match next {
            Some(seq) => {
                self.current = Some(seq.clone());
                Some(seq)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Step `seq` to the next ascending sequence over `0..n` that starts with
/// 0: bump the rightmost index that has room, reset everything after it
/// to consecutive values, and grow by one row once every sequence of the
/// current length has been seen. Returns false after `[0, 1, .., n-1]`.
pub fn advance_breaks(seq: &mut Vec<usize>, n: usize) -> bool {
    let len = seq.len();
    for i in (1..len).rev() {
        if seq[i] < n - len + i {
            seq[i] += 1;
            for j in i + 1..len {
                seq[j] = seq[j - 1] + 1;
            }
            return true;
        }
    }
    if len < n {
        *seq = (0..=len).collect();
        true
    } else {
        false
    }
}

// Shorten the first row by one child, then let each later row take
// children while its weight stays within the first row's weight.
fn next_first_row(prev: &[usize], weights: &[usize]) -> Option<Vec<usize>> {
    let n = weights.len();
    let first_row_end = prev.get(1).copied().unwrap_or(n) - 1;
    if first_row_end == 0 {
        return None;
    }
    let first_row_weight: usize = weights[..first_row_end].iter().sum();
    let mut seq = vec![0, first_row_end];
    let mut row_weight = weights[first_row_end];
    for (i, &w) in weights.iter().enumerate().skip(first_row_end + 1) {
        if row_weight + w <= first_row_weight {
            row_weight += w;
        } else {
            seq.push(i);
            row_weight = w;
        }
    }
    Some(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(mode: RowMode, weights: &[usize]) -> Vec<Vec<usize>> {
        RowBreaks::new(mode, weights).collect()
    }

    #[test]
    fn single_row_and_column() {
        assert_eq!(collect(RowMode::SingleRow, &[1, 1, 1]), vec![vec![0]]);
        assert_eq!(collect(RowMode::SingleColumn, &[1, 1, 1]), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn linear_terminates_for_one_child() {
        assert_eq!(collect(RowMode::Linear, &[3]), vec![vec![0]]);
        assert_eq!(collect(RowMode::Linear, &[1, 2]), vec![vec![0], vec![0, 1]]);
    }

    #[test]
    fn exhaustive_order() {
        assert_eq!(
            collect(RowMode::Exhaustive, &[1, 1, 1]),
            vec![vec![0], vec![0, 1], vec![0, 2], vec![0, 1, 2]]
        );
    }

    #[test]
    fn exhaustive_covers_every_partition() {
        let all = collect(RowMode::Exhaustive, &[1; 6]);
        assert_eq!(all.len(), 32);
        let mut dedup = all.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 32);
        assert!(all.contains(&vec![0, 2, 3]));
    }

    #[test]
    fn first_row_fills_later_rows_by_weight() {
        assert_eq!(
            collect(RowMode::ExhaustiveFirstRow, &[2, 1, 1, 3]),
            vec![vec![0], vec![0, 3], vec![0, 2, 3], vec![0, 1, 3]]
        );
    }

    #[test]
    fn no_children_no_candidates() {
        assert!(collect(RowMode::Exhaustive, &[]).is_empty());
        assert!(collect(RowMode::SingleColumn, &[]).is_empty());
    }
}
