use crate::error::BlResult;
use crate::fetch::SeriesSource;
use crate::reconcile::{reconcile, Outcome, RollupState, SkipReason};
use crate::segment::{aggregate, SegmentNode};
use crate::taxonomy::FilterKey;
use tracing::{debug, info};

/// Called once per combination, after reconciliation and before the
/// outcome is folded into the rollup.
pub trait ComparisonObserver {
    fn on_outcome(&mut self, _key: &FilterKey, _series_id: &str, _outcome: &Outcome) {}
}

impl ComparisonObserver for () {}

/// Aggregates, fetches and reconciles every combination in order.
///
/// Strictly sequential: each fetch is rate limited by the source and the
/// rollup is folded in loop order. Stops at the first taxonomy gap.
pub fn run<S, O>(
    tree: &SegmentNode,
    source: &S,
    year: &str,
    observer: &mut O,
) -> BlResult<RollupState>
where
    S: SeriesSource + ?Sized,
    O: ComparisonObserver + ?Sized,
{
    let mut state = RollupState::new();

    for key in FilterKey::all() {
        let internal = aggregate(tree, &key);
        if internal.is_empty() {
            debug!("No JSON data found for {}.", key);
        }

        let series_id = key.series_id();
        let external = source.fetch_series(&series_id, year);

        let outcome = reconcile(key, &series_id, &internal, &external)?;
        match &outcome {
            Outcome::Skipped(SkipReason::NoInternalData) => {}
            Outcome::Skipped(reason) => debug!("Skipping {} ({}): {}.", key, series_id, reason),
            Outcome::Undefined(_) => debug!(
                "Division by zero when computing average error for {}. Skipping.",
                key
            ),
            Outcome::Compared(record) => debug!(
                "Compared {} over {} years: {:.4}",
                key,
                record.rows.len(),
                record.avg_pct_error
            ),
        }

        observer.on_outcome(&key, &series_id, &outcome);
        state.absorb(&outcome);
    }

    info!(
        "Compared {} combinations; {} above threshold, {} zero-division cases.",
        state.comparisons(),
        state.error_log().len(),
        state.zero_divisions().len()
    );

    Ok(state)
}
