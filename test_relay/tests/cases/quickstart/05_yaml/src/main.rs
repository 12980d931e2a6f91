use relay::tracing::info;
use relay::AppConfig;

#[relay::main]
async fn main() {
    let config = AppConfig::get();

    info!("Running {}...", config.name());
}
