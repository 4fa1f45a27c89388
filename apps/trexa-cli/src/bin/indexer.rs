use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use trexa_cli::telemetry;
use trexa_core::config::Config;
use trexa_index::{IndexOutcome, Pipeline};

/// Index a directory of PDF, DOCX and TXT files, or maintain the index.
#[derive(Parser)]
#[command(name = "trexa-indexer")]
struct Args {
    /// Directory to index recursively.
    dir: Option<PathBuf>,
    /// Re-index a single file.
    #[arg(long, value_name = "FILE")]
    reindex: Option<PathBuf>,
    /// Remove a single file's chunks.
    #[arg(long, value_name = "FILE")]
    delete: Option<PathBuf>,
    /// Drop every record before doing anything else.
    #[arg(long)]
    clear: bool,
    /// Print chunk and file counts.
    #[arg(long)]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let args = Args::parse();
    let settings = Config::load()?.settings()?;
    let pipeline = Pipeline::from_settings(&settings)?;
    let indexer = &pipeline.indexer;
    indexer.initialize().await?;

    if args.clear {
        indexer.clear_index().await?;
        println!("Index cleared");
    }
    if let Some(file) = &args.delete {
        indexer.delete_file(file).await?;
        println!("Deleted {}", file.display());
    }
    if let Some(file) = &args.reindex {
        match indexer.reindex_file(file).await? {
            Some(IndexOutcome::Indexed { chunks }) => println!("Re-indexed {} ({chunks} chunks)", file.display()),
            Some(IndexOutcome::Skipped(reason)) => println!("Skipped {}: {reason:?}", file.display()),
            None => println!("{} no longer exists; nothing to do", file.display()),
        }
    }
    if let Some(dir) = &args.dir {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
                .progress_chars("#>-"),
        );
        let report = indexer
            .index_directory_with(dir, |total, path| {
                pb.set_length(total as u64);
                pb.set_message(path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
                pb.inc(1);
            })
            .await?;
        pb.finish_with_message("done");
        println!(
            "Indexed {} of {} files ({} chunks), skipped {}, failed {}",
            report.indexed, report.total_files, report.chunks, report.skipped, report.failed
        );
    } else if !(args.clear || args.status || args.delete.is_some() || args.reindex.is_some()) {
        bail!("nothing to do: pass a directory or one of --reindex, --delete, --clear, --status");
    }
    if args.status {
        let status = indexer.status().await;
        println!("total_chunks={} total_files={}", status.total_chunks, status.total_files);
    }
    Ok(())
}
