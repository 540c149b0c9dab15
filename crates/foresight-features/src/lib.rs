//! Feature and label implementations for the Foresight pipeline.
//!
//! This crate provides:
//! - [`indicators`]: causal EMA/TEMA based trend indicators
//! - [`TrendFeatures`]: the fixed, versioned "trend" feature set
//! - [`registry`]: metadata for every feature column
//! - [`labels`]: forward-looking label rules
//!
//! # Example
//!
//! ```ignore
//! use foresight_features::{LabelRule, TrendFeatures};
//! use foresight_traits::{FeatureBuilder, Labeler};
//!
//! let features = TrendFeatures::default().build(&series)?;
//! let labels = LabelRule::default().label(&series);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod indicators;
pub mod labels;
pub mod registry;
pub mod trend;

// Re-export key types
pub use labels::{FixedBand, LabelRule, VolatilityScaled};
pub use registry::{FeatureCategory, FeatureInfo};
pub use trend::{TrendConfig, TrendFeatures};
