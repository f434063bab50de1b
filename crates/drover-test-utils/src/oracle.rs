//! Exhaustive reference answers for small instances.

/// Every permutation of `0..n`, in lexicographic order.
pub fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..used.len() {
            if !used[i] {
                used[i] = true;
                prefix.push(i);
                extend(prefix, used, out);
                prefix.pop();
                used[i] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::with_capacity(n), &mut vec![false; n], &mut out);
    out
}

/// Minimum total over all row-to-column bijections of a square matrix.
pub fn brute_force_min(cost: &[Vec<i64>]) -> i64 {
    permutations(cost.len())
        .iter()
        .map(|perm| perm.iter().enumerate().map(|(r, &c)| cost[r][c]).sum())
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_permutations() {
        assert_eq!(permutations(0).len(), 1);
        assert_eq!(permutations(4).len(), 24);
        assert_eq!(permutations(2), vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn brute_force_small() {
        assert_eq!(brute_force_min(&[vec![4, 1], vec![2, 9]]), 3);
        assert_eq!(brute_force_min(&[]), 0);
    }
}
