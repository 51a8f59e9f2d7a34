//! Command line interface

use clap::Parser;
use std::path::PathBuf;

/// Live image classification on a camera feed with a text overlay
#[derive(Parser, Debug, Default)]
#[command(name = "nnclassify", author, version, about, long_about = None)]
pub struct Cli {
    /// Run inference on the CPU. Default runs on the NPU
    #[arg(short, long)]
    pub cpu: bool,

    /// Settings file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the model files and labels.txt
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Overlay refresh period in milliseconds
    #[arg(long, value_name = "MS")]
    pub refresh_ms: Option<u64>,

    /// V4L2 camera device
    #[arg(short, long, value_name = "PATH")]
    pub device: Option<String>,
}
