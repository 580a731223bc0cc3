use clap::Parser;
use scout_baseline::config::{RunArgs, Settings};
use scout_baseline::error::BlResult;
use scout_baseline::fetch::EiaClient;
use scout_baseline::pipeline;
use scout_baseline::reconcile::Verdict;
use scout_baseline::segment::{audit, SegmentNode};
use std::io;
use std::process;
use tracing::{error, info, warn, Level};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod reports;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compare Scout microsegment energy totals with EIA AEO series",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = Targets::new()
        .with_target("scout_baseline", level)
        .with_default(Level::WARN);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.run.verbose);

    match execute(&cli.run) {
        Ok(Verdict::Pass { .. }) => {}
        Ok(Verdict::Fail { .. }) => process::exit(1),
        Err(e) => {
            error!("❌ {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn execute(args: &RunArgs) -> BlResult<Verdict> {
    info!(
        "Using AEO reference year {} (verbose={}).",
        args.year, args.verbose
    );

    // Credential first so a bad setup fails before the large file is read.
    let settings = Settings::from_env()?;

    info!("📂 Loading microsegments: {}", settings.mseg_path.display());
    let tree = SegmentNode::load(&settings.mseg_path)?;

    let taxonomy = audit(&tree);
    if taxonomy.gap_count() > 0 || taxonomy.overlap_count() > 0 {
        warn!(
            "⚠️  {} energy leaves match no end use, {} match more than one.",
            taxonomy.gap_count(),
            taxonomy.overlap_count()
        );
    }

    let client = EiaClient::from_settings(&settings)?;
    let mut printer = reports::ComparisonPrinter;
    let state = pipeline::run(&tree, &client, &args.year, &mut printer)?;

    reports::print_rollups(&state);
    reports::print_large_errors(&state);
    reports::print_zero_divisions(&state);
    reports::print_audit(&taxonomy, args.verbose);

    let verdict = state.verdict(settings.max_allowed_err);
    reports::print_verdict(&verdict);
    Ok(verdict)
}
