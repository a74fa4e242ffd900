use clap::Parser;
use scribd_dl::{Downloader, RunSummary};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    ::log::info!("Starting download for URL: {}", args.url);

    let mut downloader = Downloader::new(&args.url).with_images(args.images);

    if let Some(path) = &args.config {
        downloader = match downloader.with_config_file(path) {
            Ok(downloader) => downloader,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };
    }
    if let Some(root) = args.output {
        downloader = downloader.with_output_root(root);
    }
    if let Some(secs) = args.timeout {
        downloader = downloader.with_request_timeout(secs);
    }

    let start_time = std::time::Instant::now();
    match downloader.run().await {
        Ok(summary) => report(&summary, start_time.elapsed().as_secs_f64()),
        Err(e) => {
            ::log::error!("Download failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn report(summary: &RunSummary, seconds: f64) {
    ::log::info!(
        "Finished '{}' - {} pages written, {} skipped in {:.2} seconds",
        summary.title,
        summary.pages_written,
        summary.pages_skipped,
        seconds
    );

    match &summary.output {
        Some(path) => ::log::info!("Output written to {}", path.display()),
        None => ::log::warn!("No pages found, nothing written"),
    }

    if let Ok(json) = serde_json::to_string(summary) {
        ::log::debug!("Run summary: {}", json);
    }
}
