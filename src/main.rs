use actix_files::Files;
use actix_web::{App, HttpServer, web};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use storefront::config::Config;
use storefront::middleware::RequestLogger;
use storefront::{AppState, load_templates, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storefront");
    tracing::info!("Catalog API: {}", config.api_base_url);
    tracing::info!("Image origin: {}", config.asset_base_url);

    let tera = load_templates(&config.templates_glob)?;
    let state = AppState::new(&config)?;
    let static_dir = config.static_dir.clone();

    tracing::info!("Listening on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(state.clone()))
            .service(Files::new("/static", &static_dir))
            .configure(routes)
    })
    .bind(config.bind_addr)?
    .run()
    .await?;

    Ok(())
}
