//! CLI subcommand modules.
//!
//! This module contains the implementations for all foresight CLI subcommands.

pub(crate) mod backtest;
pub(crate) mod features;
pub(crate) mod run;
