use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};

use piondash_backend::{
    config::settings::Settings,
    config::store::ConfigStore,
    db::Database,
    routes::common::{api_scope, AppState},
    routes::health::health_scope,
    services::market_data::PriceBus,
    services::pionex::{ws, PionexClient},
};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let settings = Settings::new().unwrap_or_else(|e| {
        eprintln!("Failed to load settings: {e}");
        std::process::exit(1);
    });
    let port = settings.server_port;

    let client = PionexClient::new(&settings).unwrap_or_else(|e| {
        eprintln!("Failed to build the exchange client: {e}");
        std::process::exit(1);
    });

    let config = ConfigStore::load(&settings.config_path)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {e}", settings.config_path);
            std::process::exit(1);
        });

    let db = Database::connect(&settings.database_url)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to open {}: {e}", settings.database_url);
            std::process::exit(1);
        });

    let state = web::Data::new(AppState {
        api: Arc::new(client),
        config: Arc::new(config),
        db,
        bus: Arc::new(PriceBus::new()),
    });

    // --- live price feed -----------------------------------------------
    {
        let bus = state.bus.clone();
        let config = state.config.clone();
        tokio::spawn(async move {
            loop {
                let pair = config.get().await.trading_pair;
                ws::run_price_feed(pair, bus.clone()).await;
                // feed returns on disconnect; back off and resubscribe
                // with whatever pair is configured by then
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        });
    }

    log::info!("piondash backend listening on port {port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(health_scope())
            .service(api_scope())
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
