// Minimum/maximum size redistribution.
//
// Row layout sizes cells in proportion to subtree weight, which can leave
// light cells below the minimum tile size. `limit_vals` clips such cells to
// the bound and takes the difference from (or gives it to) the cells that
// still have room, keeping the total unchanged.

/// Clip every value into `[min, max]`, spreading the clipped amount evenly
/// over the values that were not clipped. Returns `None` when no value is
/// left to absorb the remainder.
///
/// A clipped value is never changed again, so each round either finishes
/// or clips at least one more value.
pub fn limit_vals(vals: &[f64], min: f64, max: f64) -> Option<Vec<f64>> {
    let mut vals = vals.to_vec();
    let mut clipped = vec![false; vals.len()];
    loop {
        let mut owed = 0.0;
        for (val, done) in vals.iter_mut().zip(clipped.iter_mut()) {
            if *done {
                continue;
            }
            if *val < min {
                owed += *val - min;
                *val = min;
                *done = true;
            } else if *val > max {
                owed += *val - max;
                *val = max;
                *done = true;
            }
        }
        if f64::abs(owed) < f64::EPSILON {
            return Some(vals);
        }

        let absorbers: Vec<usize> = (0..vals.len())
            .filter(|&i| !clipped[i] && if owed > 0.0 { vals[i] < max } else { vals[i] > min })
            .collect();
        if absorbers.is_empty() {
            return None;
        }
        let share = owed / absorbers.len() as f64;
        for i in absorbers {
            vals[i] += share;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_minimum() {
        assert_eq!(limit_vals(&[10.0, 10.0, 10.0], 12.0, f64::INFINITY), None);
    }

    #[test]
    fn raises_small_values_from_large_ones() {
        let out = limit_vals(&[5.0, 20.0, 20.0], 10.0, f64::INFINITY).unwrap();
        assert_eq!(out, vec![10.0, 17.5, 17.5]);
    }

    #[test]
    fn cascades_when_redistribution_pushes_another_value_below_min() {
        // 4 -> 10 owes 6; [11, 25] each lose 3, 11 -> 8 clips to 10 and owes 2 more.
        let out = limit_vals(&[4.0, 11.0, 25.0], 10.0, f64::INFINITY).unwrap();
        assert_eq!(out, vec![10.0, 10.0, 20.0]);
    }

    #[test]
    fn lowers_large_values_into_small_ones() {
        let out = limit_vals(&[30.0, 10.0, 10.0], 0.0, 20.0).unwrap();
        assert_eq!(out, vec![20.0, 15.0, 15.0]);
    }

    #[test]
    fn values_in_range_are_untouched() {
        let vals = [12.0, 13.0, 14.5];
        assert_eq!(limit_vals(&vals, 10.0, 20.0).unwrap(), vals.to_vec());
        assert_eq!(limit_vals(&[], 10.0, 20.0), Some(vec![]));
    }
}
