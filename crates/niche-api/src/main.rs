#[tokio::main]
async fn main() {
    if let Err(err) = niche_api::run().await {
        tracing::error!(error = %err, "niche-api failed");
        eprintln!("niche-api failed: {err}");
        std::process::exit(1);
    }
}
