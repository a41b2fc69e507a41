use migration::{Migrator, MigratorTrait};
use server::ServerConfig;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "codefails={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = sea_orm::Database::connect(&settings.server.database).await?;
    Migrator::up(&db, None).await?;

    let engine = engine::Engine::builder().database(db).build();

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let config = ServerConfig {
        token_secret: settings.server.token_secret,
        frontend_origin: settings.server.frontend_origin,
        secure_cookies: settings.server.secure_cookies,
    };

    server::run_with_listener(engine, config, listener).await?;
    Ok(())
}
