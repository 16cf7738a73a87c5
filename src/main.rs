use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_server::{
    build_router,
    session::{repository::PostgresClaimRepository, token::TokenConfig},
    todo::repository::PostgresTodoRepository,
    user::{repository::PostgresUserRepository, PasswordHasher},
    AppConfig, AppState,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server stopped with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting todo server");

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.database.clone())
        .await?;
    info!("Database connection pool created");

    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    let app_state = AppState::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresTodoRepository::new(pool.clone())),
        Arc::new(PostgresClaimRepository::new(pool)),
        TokenConfig::new(config.jwt_secret.clone()),
        PasswordHasher::new(config.bcrypt_min_cost, config.bcrypt_max_cost),
        config.cookie_secure,
    );

    let app = build_router(app_state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
