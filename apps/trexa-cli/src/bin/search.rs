use clap::Parser;
use trexa_cli::telemetry;
use trexa_core::config::Config;
use trexa_index::Pipeline;

/// Semantic search over the persisted index.
#[derive(Parser)]
#[command(name = "trexa-search")]
struct Args {
    /// Query text; multiple words are joined with spaces.
    #[arg(required = true)]
    query: Vec<String>,
    #[arg(long, short = 'k')]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let args = Args::parse();
    let settings = Config::load()?.settings()?;
    let query = args.query.join(" ");
    let top_k = args.top_k.unwrap_or(settings.search.default_top_k).clamp(1, settings.search.max_top_k);

    let pipeline = Pipeline::from_settings(&settings)?;
    pipeline.indexer.open_existing().await?;
    let results = pipeline.search.search(&query, top_k).await?;

    println!("Query: \"{query}\" ({} results)", results.len());
    for (i, r) in results.iter().enumerate() {
        println!("{:>2}. {:.4}  {}  ({})", i + 1, r.score, r.file_name, r.file_path);
    }
    Ok(())
}
