use trexa_core::config::Config;
use trexa_embed::default_adapter;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let adapter = default_adapter(&settings.embedding)?;
    let query = adapter.embed_query("hello world")?;
    let passages = adapter.embed_passage_chunks("rust embeddings for local documents", settings.embedding.chunk_size)?;
    println!("query dim={} passages={}", query.len(), passages.len());
    Ok(())
}
