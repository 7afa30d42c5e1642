//! Server construction and wiring.
//!
//! Startup order matters: the event bus is populated with every handler
//! before the listener binds, so the registration table is effectively
//! immutable once requests can arrive.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::events::handlers::register_default_handlers;
use crate::events::{EventBus, EventPublisher, PersistentEventBus};
use crate::inbound::http::auth::TokenSettings;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::{articles, comments, profiles, tags, users, AppState};
use crate::middleware::Trace;
use crate::outbound::persistence::{run_migrations, DbPool, PoolConfig};

/// Build the Actix application with all routes, middleware, and state.
pub fn build_app(
    state: AppState,
    settings: TokenSettings,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // /articles/feed must register ahead of /articles/{slug}.
    let api = web::scope("/api")
        .service(users::register)
        .service(users::login)
        .service(users::current_user)
        .service(users::update_user)
        .service(profiles::get_profile)
        .service(profiles::follow)
        .service(profiles::unfollow)
        .service(articles::feed)
        .service(articles::list_articles)
        .service(articles::create_article)
        .service(articles::get_article)
        .service(articles::update_article)
        .service(articles::delete_article)
        .service(articles::favorite)
        .service(articles::unfavorite)
        .service(comments::add_comment)
        .service(comments::list_comments)
        .service(comments::delete_comment)
        .service(tags::list_tags);

    let mut app = App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(settings))
        .app_data(health_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    {
        app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    app
}

/// Assemble dependencies from configuration and run the server until
/// shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    if config.run_migrations {
        run_migrations(&config.database_url).map_err(std::io::Error::other)?;
        info!("database migrations applied");
    }

    let pool_config =
        PoolConfig::new(&config.database_url).with_max_size(config.pool_max_size);
    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;

    let mut bus = EventBus::new();
    register_default_handlers(&mut bus);
    let bus: Arc<dyn EventPublisher> = match &config.event_log {
        Some(path) => {
            info!(path = %path.display(), "persistent event log enabled");
            Arc::new(PersistentEventBus::new(bus, path))
        }
        None => Arc::new(bus),
    };

    let state = AppState::new(pool, bus);
    let settings = TokenSettings::new(config.jwt_secret.clone(), config.token_ttl_minutes);
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(
            state.clone(),
            settings.clone(),
            server_health_state.clone(),
        )
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "server listening");
    server.run().await
}
