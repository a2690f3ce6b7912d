use std::time::Duration;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use portal_auth::config::AuthConfig;
use portal_auth::infra::delivery::ChannelRouter;
use portal_auth::infra::mail::EmailProvider;
use portal_auth::infra::sms::SmsProvider;
use portal_auth::router::build_router;
use portal_auth::state::AppState;
use portal_auth_migration::Migrator;
use portal_auth_types::cookie::CookieSettings;
use portal_core::config::Config;
use portal_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client");

    let email = EmailProvider::from_config(&config, http.clone());
    let sms = SmsProvider::from_config(&config, http);
    info!(email = email.name(), sms = sms.name(), "delivery providers selected");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        cookies: CookieSettings {
            domain: config.cookie_domain,
            secure: config.cookie_secure,
        },
        channels: ChannelRouter {
            email,
            sms,
            app_name: config.app_name,
        },
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
