// --- Panel de emisiones de carbono - Archivo principal ---

use carbon_dashboard::config::AppConfig;
use carbon_dashboard::run_server;
use env_logger::Env;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    log::info!("=== Panel de emisiones de carbono (API) ===");
    run_server(config).await
}
