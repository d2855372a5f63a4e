//! Minimal enqueue-poll-retrieve walkthrough
//!
//! Fetches a URL (given as the first argument) at best quality, prints
//! progress while the job runs, and saves the finished artifact into the
//! current directory.

use media_dl::{Config, FormatSelection, MediaDownloader, Status};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.youtube.com/watch?v=jNQXAC9IVRw".to_string());

    let downloader = MediaDownloader::new(Config::default()).await?;

    // Probe first: what is this, and what encodings are there?
    let info = downloader.probe(&url).await?;
    println!("{} — {} selectable formats", info.title, info.formats.len());
    for format in &info.formats {
        println!(
            "  {}: {} {} ({} bytes)",
            format.format_id,
            format.resolution.as_deref().unwrap_or("-"),
            format.ext,
            format.filesize_bytes
        );
    }

    // Enqueue at best quality and poll until terminal
    let id = downloader
        .enqueue(
            &url,
            FormatSelection {
                format_id: "best".to_string(),
                audio_only: false,
            },
        )
        .await?;
    println!("enqueued job {id}");

    loop {
        let status = downloader.query(id).await?;
        println!("  {} {:.1}%", status.status, status.progress);
        match status.status {
            Status::Completed => break,
            Status::Failed => {
                eprintln!("job failed: {}", status.error.unwrap_or_default());
                return Ok(());
            }
            _ => tokio::time::sleep(Duration::from_millis(500)).await,
        }
    }

    // Stream the artifact to a local file; dropping it cleans the job up
    let mut artifact = downloader.retrieve(id).await?;
    let mut out = tokio::fs::File::create(&artifact.filename).await?;
    tokio::io::copy(&mut artifact.file, &mut out).await?;
    println!("saved {}", artifact.filename);

    Ok(())
}
