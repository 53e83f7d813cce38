use serde::Serialize;

use crate::catalog::Catalog;
use crate::progress::Progress;

/// Collection progress over tradeable enchantments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub collected: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent; `0` for an empty denominator.
    pub percentage: u32,
}

#[must_use]
pub fn compute_stats(catalog: &Catalog, progress: &Progress) -> Stats {
    let (total, collected) = catalog
        .iter()
        .filter(|record| record.tradeable)
        .fold((0usize, 0usize), |(total, collected), record| {
            (
                total + 1,
                collected + usize::from(progress.is_complete(&record.name)),
            )
        });
    let percentage = if total == 0 {
        0
    } else {
        ((collected as f64 / total as f64) * 100.0).round() as u32
    };
    Stats {
        collected,
        total,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::{Stats, compute_stats};
    use crate::catalog::Catalog;
    use crate::catalog::fixtures::{record, tradeable};
    use crate::progress::Progress;

    #[test]
    fn no_tradeable_records_yields_zero_percent() {
        let catalog = Catalog::from_records(vec![record("soul_speed")]).expect("catalog");
        let mut progress = Progress::new();
        progress.toggle_complete("soul_speed", None);
        assert_eq!(compute_stats(&catalog, &progress), Stats::default());
        assert_eq!(compute_stats(&Catalog::empty(), &progress).percentage, 0);
    }

    #[test]
    fn only_tradeable_completions_count() {
        let catalog = Catalog::from_records(vec![
            tradeable("a", 1, &["plains"], &[]),
            tradeable("b", 1, &["plains"], &[]),
            tradeable("c", 1, &["plains"], &[]),
            record("d"),
        ])
        .expect("catalog");
        let mut progress = Progress::new();
        progress.toggle_complete("a", None);
        progress.toggle_complete("d", None);

        assert_eq!(
            compute_stats(&catalog, &progress),
            Stats {
                collected: 1,
                total: 3,
                percentage: 33,
            }
        );

        progress.toggle_complete("b", None);
        assert_eq!(compute_stats(&catalog, &progress).percentage, 67);
    }
}
