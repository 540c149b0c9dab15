//! Feature registry for discovering and describing the available features.
//!
//! This module provides metadata for every column of the trend feature set,
//! in schema order.

use serde::{Deserialize, Serialize};

use crate::indicators::{ema_warmup, tema_warmup};

/// Feature category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    /// Forward SMA metrics on a smoothed forecast
    ForwardSma,
    /// Ratios between a price-derived series and its own past
    Relative,
    /// Plain return measures
    Standard,
}

impl FeatureCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::ForwardSma => "Average and minimum of SMA(n) over an n-step smoothed forecast",
            Self::Relative => "Momentum ratios of EMA/TEMA and close-to-TEMA ratios",
            Self::Standard => "Log returns over a fixed lag",
        }
    }
}

/// Metadata about a feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureInfo {
    /// Column name in the schema
    pub name: &'static str,

    /// Category classification
    pub category: FeatureCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Leading rows on which the feature is undefined
    pub warmup: usize,
}

/// Get information about all features of the trend set, in schema order.
#[must_use]
pub fn available_features() -> Vec<FeatureInfo> {
    vec![
        // Forward SMA metrics
        FeatureInfo {
            name: "SMA_30_avg",
            category: FeatureCategory::ForwardSma,
            description: "Mean of the next 30 forecast SMA(30) values",
            warmup: 0,
        },
        FeatureInfo {
            name: "SMA_30_min",
            category: FeatureCategory::ForwardSma,
            description: "Minimum of the next 30 forecast SMA(30) values",
            warmup: 0,
        },
        FeatureInfo {
            name: "SMA_100_avg",
            category: FeatureCategory::ForwardSma,
            description: "Mean of the next 100 forecast SMA(100) values",
            warmup: 0,
        },
        FeatureInfo {
            name: "SMA_100_min",
            category: FeatureCategory::ForwardSma,
            description: "Minimum of the next 100 forecast SMA(100) values",
            warmup: 0,
        },
        FeatureInfo {
            name: "SMA_150_avg",
            category: FeatureCategory::ForwardSma,
            description: "Mean of the next 150 forecast SMA(150) values",
            warmup: 0,
        },
        FeatureInfo {
            name: "SMA_150_min",
            category: FeatureCategory::ForwardSma,
            description: "Minimum of the next 150 forecast SMA(150) values",
            warmup: 0,
        },
        // Relative indicators
        FeatureInfo {
            name: "MomEma_150_15",
            category: FeatureCategory::Relative,
            description: "EMA(150) today over EMA(150) 15 days ago",
            warmup: ema_warmup(150) + 15,
        },
        FeatureInfo {
            name: "MomEma_70_15",
            category: FeatureCategory::Relative,
            description: "EMA(70) today over EMA(70) 15 days ago",
            warmup: ema_warmup(70) + 15,
        },
        FeatureInfo {
            name: "MomEma_100_15",
            category: FeatureCategory::Relative,
            description: "EMA(100) today over EMA(100) 15 days ago",
            warmup: ema_warmup(100) + 15,
        },
        FeatureInfo {
            name: "MomTema_300_15",
            category: FeatureCategory::Relative,
            description: "TEMA(300) today over TEMA(300) 15 days ago",
            warmup: tema_warmup(300) + 15,
        },
        FeatureInfo {
            name: "RCTema_200",
            category: FeatureCategory::Relative,
            description: "Close over TEMA(200)",
            warmup: tema_warmup(200),
        },
        FeatureInfo {
            name: "RCTema_100",
            category: FeatureCategory::Relative,
            description: "Close over TEMA(100)",
            warmup: tema_warmup(100),
        },
        // Standard indicator
        FeatureInfo {
            name: "LogReturn_30",
            category: FeatureCategory::Standard,
            description: "Log of close over close 30 days ago",
            warmup: 30,
        },
    ]
}

/// Get all features in a specific category.
#[must_use]
pub fn features_by_category(category: &FeatureCategory) -> Vec<FeatureInfo> {
    available_features()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific feature by name.
#[must_use]
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    available_features()
        .into_iter()
        .find(|info| info.name == name)
}
