use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    EmailSender, OtpRepository, PasswordHasher, ProcessedContentRepository, TemplateRepository,
    TokenService, UserRepository,
};
use crate::application::services::{
    AuthPolicy, AuthService, ContentService, ProcessingService, ProviderRoutes, RetryPolicy,
    TemplateService,
};

/// Adapters the services are wired from.
pub struct AppDependencies {
    pub users: Arc<dyn UserRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub contents: Arc<dyn ProcessedContentRepository>,
    pub providers: ProviderRoutes,
    pub hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
    pub email_sender: Arc<dyn EmailSender>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppPolicies {
    pub auth: AuthPolicy,
    pub retry: RetryPolicy,
    pub redact_audio: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub template_service: Arc<TemplateService>,
    pub content_service: Arc<ContentService>,
    pub processing_service: Arc<ProcessingService>,
    pub token_service: Arc<dyn TokenService>,
    /// Parent of every per-request processing token; cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(deps: AppDependencies, policies: AppPolicies, shutdown: CancellationToken) -> Self {
        let auth_service = AuthService::new(
            Arc::clone(&deps.users),
            deps.otps,
            deps.hasher,
            Arc::clone(&deps.token_service),
            deps.email_sender,
            policies.auth,
        );
        let template_service = TemplateService::new(Arc::clone(&deps.templates));
        let content_service =
            ContentService::new(Arc::clone(&deps.contents), Arc::clone(&deps.templates));
        let processing_service =
            ProcessingService::new(deps.templates, deps.contents, deps.providers, policies.retry)
                .with_audio_redaction(policies.redact_audio);

        Self {
            auth_service: Arc::new(auth_service),
            template_service: Arc::new(template_service),
            content_service: Arc::new(content_service),
            processing_service: Arc::new(processing_service),
            token_service: deps.token_service,
            shutdown,
        }
    }
}
