#[tokio::main]
async fn main() {
    if let Err(e) = party_server::run_with_config().await {
        tracing::error!(error = %e, "party server exited");
        std::process::exit(1);
    }
}
