use dspu::Controller;
use dspu_core::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,dspu=debug".to_string()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    let controller = match Controller::builder().config(config).build() {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!(error = %e, "failed to build controller");
            std::process::exit(1);
        }
    };

    if let Err(e) = controller.run().await {
        tracing::error!(error = %e, "controller exited with error");
        std::process::exit(1);
    }
}
