//! Run command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use foresight::eval::ConfusionCounts;
use foresight::{Research, RunStatus, equity_frame, signals_frame, write_csv};
use tracing::warn;

use crate::{SourceArgs, data};

/// Run the full research pipeline and report its results.
pub(crate) async fn run_research(
    source: &SourceArgs,
    signals_out: Option<PathBuf>,
    equity_out: Option<PathBuf>,
    baseline_out: Option<PathBuf>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Walk-Forward Research Run                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = data::load_config(source)?;
    let series = data::load_prices(source).await?;
    let research = Research::new(config)?;

    let origin = source
        .prices
        .as_ref()
        .map_or_else(|| source.series.clone(), |p| p.display().to_string());
    println!("Series:   {origin}");
    println!("Rows:     {}", series.len());
    println!("Scorer:   {}", research.config().scorer.as_str());
    println!();

    let output = research.run(&series)?;
    let run = &output.run;

    let status = match run.status {
        RunStatus::FullyWarmedUp => "fully warmed up",
        RunStatus::PartiallyWarmedUp => "partially warmed up",
        RunStatus::NeverWarmedUp => "never warmed up",
    };
    println!("Status:   {status}");
    if let Some(date) = run.warmed_up_on() {
        println!("Warm-up:  {date}");
    }
    println!("Retrains: {}", run.retrain_dates.len());
    if !run.skipped_retrains.is_empty() {
        println!("Skipped:  {} single-class training sets", run.skipped_retrains.len());
    }
    println!("Signals:  {}", run.log.len());
    if let Some(last) = run.log.last() {
        println!(
            "Latest:   {} {} (p={:.3}, threshold {:.3})",
            last.date,
            last.action(),
            last.probability,
            last.threshold
        );
    }
    println!();

    print_counts("Walk-forward", &output.counts);
    print_counts("Backtest (pooled)", &output.backtest.pooled);

    let comparison = &output.equity.comparison;
    println!("Equity");
    println!("{}", "-".repeat(60));
    println!("  Contributed:   {:>14.2}", comparison.contributed);
    println!("  Signal-gated:  {:>14.2}", comparison.strategy_final);
    println!("  Always-buy:    {:>14.2}", comparison.baseline_final);
    println!(
        "  Difference:    {:>14.2} ({:+.2}%)",
        comparison.difference,
        comparison.relative * 100.0
    );
    println!();

    if run.status == RunStatus::NeverWarmedUp {
        warn!("no model was trained; the series is too short for the feature warm-up and label horizon");
    }

    if let Some(path) = signals_out {
        let mut df = signals_frame(&run.log)?;
        write_csv(&mut df, &path).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Signals written to {}", path.display());
    }
    if let Some(path) = equity_out {
        let mut df = equity_frame(&output.equity.strategy)?;
        write_csv(&mut df, &path).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Equity curve written to {}", path.display());
    }
    if let Some(path) = baseline_out {
        let mut df = equity_frame(&output.equity.baseline)?;
        write_csv(&mut df, &path).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Baseline curve written to {}", path.display());
    }

    Ok(())
}

fn print_counts(title: &str, counts: &ConfusionCounts) {
    println!("{title}");
    println!("{}", "-".repeat(60));
    println!(
        "  TP {:>5}  FP {:>5}  TN {:>5}  FN {:>5}",
        counts.tp, counts.fp, counts.tn, counts.fn_
    );
    println!(
        "  Precision {:.3}  Recall {:.3}  F1 {:.3}",
        counts.precision(),
        counts.recall(),
        counts.f1()
    );
    println!();
}
