//! CLI module - Command-line interface for FreshLens
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FreshLens - produce freshness checker
/// Scores photos of fruit and vegetables with a pretrained classifier
#[derive(Parser)]
#[command(name = "freshlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Classify a local image and print the result as JSON
    #[command(alias = "p")]
    Predict {
        /// Image file to classify
        path: PathBuf,
        /// Produce type for a fresh/rotten breakdown (e.g. banana)
        #[arg(long)]
        produce: Option<String>,
        /// Number of predictions to show
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Download the model checkpoint into the local cache
    FetchModel,
}

pub use commands::*;
