use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scribd-dl")]
#[command(about = "Download documents or text from Scribd")]
#[command(version)]
pub struct Args {
    /// Scribd document URL to download
    #[arg(value_name = "URL")]
    pub url: String,

    /// Download document as images and assemble a PDF
    #[arg(short, long)]
    pub images: bool,

    /// Directory under which `scribd/` is created
    #[arg(short, long, value_name = "ROOT")]
    pub output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds (default: none)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}
