//! Stratified train/test split and stratified k-fold.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{DocClassError, Result};

/// Sample indices of one partition pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Indices of each class, shuffled with `rng`.
fn shuffled_class_members(labels: &[usize], n_classes: usize, rng: &mut StdRng) -> Vec<Vec<usize>> {
    let mut members = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        if label < n_classes {
            members[label].push(i);
        }
    }
    for class in &mut members {
        class.shuffle(rng);
    }
    members
}

/// Split sample indices so every class keeps its proportion in both parts.
///
/// Each class contributes `round(count * test_fraction)` samples to the test
/// part, clamped so that both parts receive at least one. A class with fewer
/// than two samples cannot be stratified and yields a data error. Both index
/// lists come back sorted.
pub fn stratified_split(labels: &[usize], n_classes: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    if labels.is_empty() {
        return Err(DocClassError::data("cannot split an empty corpus"));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DocClassError::data(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let members = shuffled_class_members(labels, n_classes, &mut rng);

    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for (class, indices) in members.iter().enumerate() {
        let count = indices.len();
        if count < 2 {
            return Err(DocClassError::data(format!(
                "class {class} has {count} example(s); at least 2 are needed to stratify"
            )));
        }
        let n_test = ((count as f64 * test_fraction).round() as usize).clamp(1, count - 1);
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

/// Partition positions `0..labels.len()` into `k` stratified folds.
///
/// The members of each class are dealt round-robin over the folds, so fold
/// sizes per class differ by at most one. A class smaller than `k` is simply
/// absent from some folds. Returns one [`Split`] per fold whose `test` part
/// is that fold.
pub fn stratified_kfold(labels: &[usize], n_classes: usize, k: usize, seed: u64) -> Result<Vec<Split>> {
    if k < 2 {
        return Err(DocClassError::data(format!("need at least 2 folds, got {k}")));
    }
    if labels.len() < k {
        return Err(DocClassError::data(format!(
            "cannot make {k} folds from {} samples",
            labels.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let members = shuffled_class_members(labels, n_classes, &mut rng);

    let mut fold_of = vec![0usize; labels.len()];
    let mut next = 0;
    for indices in &members {
        for &i in indices {
            fold_of[i] = next % k;
            next += 1;
        }
    }

    let folds = (0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| fold_of[i] == fold);
            Split { train, test }
        })
        .collect();
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(n_classes: usize, per_class: usize) -> Vec<usize> {
        (0..n_classes * per_class).map(|i| i % n_classes).collect()
    }

    #[test]
    fn test_split_preserves_proportions() {
        let labels = balanced(5, 150);
        let split = stratified_split(&labels, 5, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 150);
        assert_eq!(split.train.len(), 600);
        for class in 0..5 {
            let n = split.test.iter().filter(|&&i| labels[i] == class).count();
            assert_eq!(n, 30);
        }
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let labels = balanced(3, 7);
        let split = stratified_split(&labels, 3, 0.2, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..21).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_class_keeps_one_on_each_side() {
        let labels = vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1];
        let split = stratified_split(&labels, 2, 0.1, 0).unwrap();
        assert_eq!(split.test.iter().filter(|&&i| labels[i] == 0).count(), 1);
        assert_eq!(split.train.iter().filter(|&&i| labels[i] == 0).count(), 1);
    }

    #[test]
    fn test_unstratifiable_class_is_a_data_error() {
        let labels = vec![0, 0, 0, 1];
        assert!(stratified_split(&labels, 2, 0.2, 0).unwrap_err().is_data());
        // Declared class with no members at all.
        assert!(stratified_split(&[0, 0, 1, 1], 3, 0.2, 0).unwrap_err().is_data());
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels = balanced(4, 20);
        assert_eq!(
            stratified_split(&labels, 4, 0.2, 9).unwrap(),
            stratified_split(&labels, 4, 0.2, 9).unwrap()
        );
    }

    #[test]
    fn test_kfold_covers_every_sample_once() {
        let labels = balanced(3, 20);
        let folds = stratified_kfold(&labels, 3, 5, 42).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0; labels.len()];
        for fold in &folds {
            assert_eq!(fold.test.len(), 12);
            assert_eq!(fold.train.len() + fold.test.len(), labels.len());
            for class in 0..3 {
                assert_eq!(fold.test.iter().filter(|&&i| labels[i] == class).count(), 4);
            }
            for &i in &fold.test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_kfold_rejects_too_few_samples() {
        assert!(stratified_kfold(&[0, 1, 0], 2, 5, 0).unwrap_err().is_data());
        assert!(stratified_kfold(&[0, 1, 0], 2, 1, 0).unwrap_err().is_data());
    }
}
