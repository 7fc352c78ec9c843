#[tokio::main]
async fn main() {
    match game_client::run_with_config().await {
        Ok(outcome) => tracing::info!(
            game_over = outcome.game_over,
            level = outcome.level,
            game_time = outcome.game_time,
            "client finished"
        ),
        Err(e) => {
            tracing::error!(error = %e, "client exited");
            std::process::exit(1);
        }
    }
}
