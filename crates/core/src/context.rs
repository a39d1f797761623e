//! Startup-built context handed to page controllers.

use tracing::{error, warn};

use crate::{
    api::ApiClient,
    config::AppConfig,
    error::{ApiError, ConfigError, ValidationError},
    models::Severity,
    notify::{ToastId, ToastQueue},
};

/// Configuration, API client and toast queue shared by every page.
///
/// Built once in `main`; controllers borrow it instead of reaching for
/// globals. Dropping it tears down the toast queue and its timers.
pub struct AppContext {
    /// Resolved configuration.
    pub config: AppConfig,
    /// Catalog API client; cheap to clone into request tasks.
    pub api: ApiClient,
    /// On-screen notifications.
    pub toasts: ToastQueue,
}

impl AppContext {
    /// Build the context from a validated configuration.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            config,
            api,
            toasts: ToastQueue::new(),
        })
    }

    /// Show a success toast with the configured lifetime.
    pub fn notify_success(&self, message: impl Into<String>) -> ToastId {
        self.toasts
            .push(message, Severity::Success, self.config.toast_ttl())
    }

    /// Show an error toast with the configured lifetime.
    pub fn notify_error(&self, message: impl Into<String>) -> ToastId {
        self.toasts
            .push(message, Severity::Error, self.config.toast_ttl())
    }

    /// Log a failed request and surface it as an error toast.
    pub fn report_api_error(&self, action: &str, err: &ApiError) -> ToastId {
        match err {
            ApiError::Http { status, .. } => {
                warn!(action, status, error = %err, "request rejected by server")
            }
            _ => error!(action, error = %err, "request failed"),
        }
        self.notify_error(format!("{action}: {err}"))
    }

    /// Surface a rejected form as an error toast.
    pub fn report_invalid(&self, err: &ValidationError) -> ToastId {
        warn!(field = %err.field, reason = %err.reason, "form rejected");
        self.notify_error(err.reason.clone())
    }

    /// Cancel pending toast timers before the UI goes away.
    pub fn shutdown(&self) {
        self.toasts.shutdown();
    }
}
