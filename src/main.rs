#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = acadia_rust::run().await {
        eprintln!("acadia-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
