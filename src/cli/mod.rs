//! CLI Module
//!
//! Command-line interface over saved Cutline projects.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cutline - timeline engine for a non-linear audio/video editor
#[derive(Parser, Debug)]
#[command(name = "cutline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tracks, clips and the timeline extent
    #[command(name = "inspect")]
    Inspect {
        /// Path to the project file
        project: PathBuf,
    },

    /// Show what is visible and audible at a time
    #[command(name = "resolve")]
    Resolve {
        /// Path to the project file
        project: PathBuf,

        /// Timeline position in seconds
        #[arg(short, long)]
        time: f64,
    },

    /// Composite a still frame to PNG
    #[command(name = "render")]
    Render {
        /// Path to the project file
        project: PathBuf,

        /// Timeline position in seconds
        #[arg(short, long)]
        time: f64,

        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Split a clip at a time and save the project
    #[command(name = "split")]
    Split {
        /// Path to the project file
        project: PathBuf,

        /// Id of the clip to split
        #[arg(long)]
        clip: String,

        /// Timeline position in seconds
        #[arg(short, long)]
        time: f64,

        /// Write the result here instead of overwriting the project
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render the audio studio mix to WAV
    #[command(name = "mixdown")]
    Mixdown {
        /// Path to the project file
        project: PathBuf,

        /// Output WAV path
        #[arg(short, long)]
        out: PathBuf,

        /// Length of the mix (defaults to the longest source)
        #[arg(short, long)]
        seconds: Option<f64>,
    },
}
