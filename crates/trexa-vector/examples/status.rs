use trexa_core::config::Config;
use trexa_core::traits::VectorIndex;
use trexa_vector::LanceIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let index = LanceIndex::new(&settings.index_dir(), &settings.data.table_name, 384);
    if !index.open_existing().await? {
        println!("{}: nothing indexed yet", index.table_name());
        return Ok(());
    }
    let chunks = index.count().await?;
    let files = index.file_paths().await?;
    println!("{}: chunks={} files={}", index.table_name(), chunks, files.len());
    Ok(())
}
