#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use axum::Router;
    use leptos::logging::log;
    use leptos::prelude::*;
    use leptos_axum::{LeptosRoutes, generate_route_list};
    use tower_http::compression::{CompressionLayer, CompressionLevel};
    use tower_http::services::ServeDir;
    use wedding_admin::app::*;
    use wedding_admin::core::auth::{
        AuthApiState, AuthService, BcryptVerifier, JwtConfig, JwtService, Role, auth_api_router,
        session_middleware,
    };
    use wedding_admin::core::config::Config;
    use wedding_admin::core::db::{
        CreateUser, InMemoryUserStore, UserRepository, UserStore, UserStoreError,
        create_pool,
    };

    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load application config from environment variables
    let config = Config::from_env();
    let jwt_config = match JwtConfig::from_env() {
        Ok(jwt_config) => jwt_config,
        Err(e) => {
            tracing::error!("Cannot start without a token secret: {}", e);
            std::process::exit(1);
        }
    };

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: database={}, cookie={}, secure_cookie={}, protected={:?}",
        config.has_database(),
        config.cookie_name,
        config.cookie_secure,
        config.protected_prefixes
    );

    let passwords = Arc::new(BcryptVerifier::new());

    // User store: PostgreSQL when configured, otherwise an in-memory store
    // seeded with the development admin
    let users: Arc<dyn UserStore> = match config.db_config() {
        Some(db_config) => match create_pool(&db_config).await {
            Ok(pool) => {
                let repository = UserRepository::new(pool);
                if let Some(seed) = &config.admin_seed {
                    let created = match passwords.hash(&seed.password) {
                        Ok(password_hash) => {
                            repository
                                .create(&CreateUser {
                                    email: seed.email.clone(),
                                    password_hash,
                                    display_name: seed.display_name.clone(),
                                    role: Role::Admin,
                                })
                                .await
                        }
                        Err(e) => {
                            tracing::error!("Failed to hash seed password: {}", e);
                            std::process::exit(1);
                        }
                    };
                    match created {
                        Ok(admin) => tracing::info!("Created admin account: {}", admin.email),
                        Err(UserStoreError::EmailAlreadyExists) => {
                            tracing::debug!("Admin account already exists: {}", seed.email)
                        }
                        Err(e) => tracing::error!("Failed to create admin account: {}", e),
                    }
                }
                Arc::new(repository)
            }
            Err(e) => {
                tracing::error!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory user store");
            let store = InMemoryUserStore::new();
            match &config.admin_seed {
                Some(seed) => match passwords.hash(&seed.password) {
                    Ok(hash) => match store.insert(&seed.email, &seed.display_name, Role::Admin, hash)
                    {
                        Ok(admin) => tracing::info!("Seeded admin account: {}", admin.email),
                        Err(e) => tracing::error!("Failed to seed admin account: {}", e),
                    },
                    Err(e) => tracing::error!("Failed to hash seed password: {}", e),
                },
                None => tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, nobody can sign in"),
            }
            Arc::new(store)
        }
    };

    let auth_service = AuthService::new(users, passwords, JwtService::new(jwt_config))
        .lookup_timeout(config.lookup_timeout);
    let auth_state = AuthApiState::new(auth_service)
        .cookie(config.session_cookie())
        .guard(config.route_guard());
    let session_state = Arc::new(auth_state.clone());

    // Load configuration from Cargo.toml [package.metadata.leptos]
    // Can be overridden via LEPTOS_SITE_ADDR env var for Docker/K8s
    let conf = match get_configuration(None) {
        Ok(conf) => conf,
        Err(e) => {
            tracing::error!("Invalid Leptos configuration: {}", e);
            std::process::exit(1);
        }
    };
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);

    // Create ServeDir for pkg with pre-compressed file support
    let pkg_service = ServeDir::new(format!("{}/pkg", leptos_options.site_root))
        .precompressed_br()
        .precompressed_gzip();

    // Build the Leptos router
    let leptos_router = Router::new()
        .nest_service("/pkg", pkg_service)
        .leptos_routes(&leptos_options, routes, {
            let leptos_options = leptos_options.clone();
            move || shell(leptos_options.clone())
        })
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options);

    // Build the main application router; every request passes the session
    // middleware so renewal and gating apply to pages and API alike
    let app = Router::new()
        .merge(auth_api_router(auth_state))
        .merge(leptos_router)
        .layer(axum::middleware::from_fn_with_state(
            session_state,
            session_middleware,
        ))
        .layer(
            CompressionLayer::new()
                .br(true)
                .gzip(true)
                .quality(CompressionLevel::Best),
        );

    log!("listening on http://{}", &addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {}", e);
    }
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}
