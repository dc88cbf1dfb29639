use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use whisperlog::application::ports::{
    EmailSender, OtpRepository, ProcessedContentRepository, TemplateRepository, UserRepository,
};
use whisperlog::infrastructure::auth::{BcryptPasswordHasher, JwtTokenService};
use whisperlog::infrastructure::email::{DisabledEmailSender, EmailSenderFactory};
use whisperlog::infrastructure::llm::{ProviderFactory, ProviderKind};
use whisperlog::infrastructure::observability::init_tracing;
use whisperlog::infrastructure::persistence::{
    InMemoryRepository, PgOtpRepository, PgProcessedContentRepository, PgTemplateRepository,
    PgUserRepository, create_pool, run_migrations,
};
use whisperlog::presentation::{
    AppDependencies, AppPolicies, AppState, Environment, ScaffoldConfig, Settings, create_router,
};

const SCAFFOLD_JWT_SECRET: &str = "scaffold-only-secret";

struct Repositories {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn OtpRepository>,
    templates: Arc<dyn TemplateRepository>,
    contents: Arc<dyn ProcessedContentRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;
    let scaffold = ScaffoldConfig::from_env();

    init_tracing(&settings.logging.tracing_config(environment), settings.server.port);

    let repositories = if scaffold.enabled {
        tracing::warn!("Scaffold mode: in-memory storage and mock formatting provider");
        let store = Arc::new(InMemoryRepository::new());
        Repositories {
            users: store.clone(),
            otps: store.clone(),
            templates: store.clone(),
            contents: store,
        }
    } else {
        let pool = create_pool(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.acquire_timeout(),
        )
        .await
        .context("Failed to connect to database")?;

        if settings.database.run_migrations {
            tracing::info!("Running database migrations...");
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
        }

        Repositories {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            otps: Arc::new(PgOtpRepository::new(pool.clone())),
            templates: Arc::new(PgTemplateRepository::new(pool.clone())),
            contents: Arc::new(PgProcessedContentRepository::new(pool)),
        }
    };

    let (text_provider, audio_provider) = if scaffold.enabled {
        (ProviderKind::Mock, ProviderKind::Mock)
    } else {
        (settings.ai.text_provider, settings.ai.audio_provider)
    };
    let providers = ProviderFactory::routes(
        text_provider,
        audio_provider,
        &settings.ai.provider_configs(scaffold.mock_delay()),
    )
    .context("Invalid provider routing")?;

    let jwt_secret = match settings.auth.jwt_secret.as_deref() {
        Some(secret) if !secret.is_empty() => secret.to_string(),
        _ if scaffold.enabled || !environment.is_production() => {
            tracing::warn!("JWT secret not configured, using an insecure development secret");
            SCAFFOLD_JWT_SECRET.to_string()
        }
        _ => anyhow::bail!("auth.jwt_secret (JWT_SECRET) must be set in production"),
    };

    let email_sender: Arc<dyn EmailSender> = if scaffold.enabled {
        Arc::new(DisabledEmailSender)
    } else {
        EmailSenderFactory::create(&settings.mail).context("Invalid mail configuration")?
    };

    let shutdown = CancellationToken::new();

    let state = AppState::new(
        AppDependencies {
            users: repositories.users,
            otps: repositories.otps,
            templates: repositories.templates,
            contents: repositories.contents,
            providers,
            hasher: Arc::new(BcryptPasswordHasher::new(settings.auth.bcrypt_cost)),
            token_service: Arc::new(JwtTokenService::new(
                &jwt_secret,
                settings.auth.token_lifetime(),
            )),
            email_sender,
        },
        AppPolicies {
            auth: settings.auth.policy(),
            retry: settings.processing.retry_policy(),
            redact_audio: settings.processing.redact_audio,
        },
        shutdown.clone(),
    );

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling in-flight processing");
    shutdown.cancel();
}
