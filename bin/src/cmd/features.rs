//! Features command implementation.

use foresight::features::registry::features_by_category;
use foresight::features::trend::{TREND_SCHEMA_NAME, TREND_SCHEMA_VERSION};
use foresight::features::{FeatureCategory, TrendFeatures};
use foresight::traits::FeatureBuilder;

/// List the trend feature set by category.
pub(crate) fn list_features(verbose: bool) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Features                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Schema: {TREND_SCHEMA_NAME} v{TREND_SCHEMA_VERSION}\n");

    let categories = [
        (FeatureCategory::ForwardSma, "Forward SMA"),
        (FeatureCategory::Relative, "Relative"),
        (FeatureCategory::Standard, "Standard"),
    ];

    for (category, name) in categories {
        println!("{name}:");
        println!("{}", "-".repeat(60));
        if verbose {
            println!("  {}\n", category.description());
        }
        for info in features_by_category(&category) {
            if verbose {
                println!(
                    "  {:16} - {} (warm-up: {} days)",
                    info.name, info.description, info.warmup
                );
            } else {
                println!("  {}", info.name);
            }
        }
        println!();
    }

    println!(
        "A row has every feature after {} days of history.",
        TrendFeatures::default().warmup()
    );
    if !verbose {
        println!("Use --verbose for descriptions.\n");
    }
}
