use timebank_server::config::AppConfig;
use timebank_server::database::client::{Database, DbConfig};
use timebank_server::init::{main_router, run_migrations};
use timebank_server::middleware::mw_ctx::create_ctx_state;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;

    run_migrations(&db).await.expect("migrations ok");

    let ctx_state = create_ctx_state(db, &config);
    let router = main_router(&ctx_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("port 8080 available");
    info!("->> LISTENING on {:?}", listener.local_addr());
    axum::serve(listener, router.into_make_service())
        .await
        .expect("server starts");
}
