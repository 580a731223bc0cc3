mod tables;

pub use self::tables::{
    audit as print_audit, large_errors as print_large_errors, rollups as print_rollups,
    verdict as print_verdict, zero_divisions as print_zero_divisions,
};

use scout_baseline::pipeline::ComparisonObserver;
use scout_baseline::reconcile::Outcome;
use scout_baseline::taxonomy::FilterKey;

/// Prints each comparison table as soon as its combination is reconciled.
pub struct ComparisonPrinter;

impl ComparisonObserver for ComparisonPrinter {
    fn on_outcome(&mut self, _key: &FilterKey, _series_id: &str, outcome: &Outcome) {
        if let Outcome::Compared(record) = outcome {
            tables::comparison(record);
        }
    }
}
