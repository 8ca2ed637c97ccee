//! Desktop ports — application launching and OS-level side effects.

use std::future::Future;

use astral_domain::error::ServiceError;
use astral_domain::routine::MediaCommand;

/// An application that was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedApp {
    /// Display name the request resolved to (e.g. `"code"` → `"Visual Studio Code"`).
    pub resolved_name: String,
}

pub trait AppLauncher {
    /// Start an application by name or alias.
    ///
    /// Returns [`ServiceError::NotFound`] when the name resolves to nothing.
    fn launch(
        &self,
        app_name: &str,
    ) -> impl Future<Output = Result<LaunchedApp, ServiceError>> + Send;
}

impl<T: AppLauncher + Send + Sync> AppLauncher for std::sync::Arc<T> {
    fn launch(
        &self,
        app_name: &str,
    ) -> impl Future<Output = Result<LaunchedApp, ServiceError>> + Send {
        (**self).launch(app_name)
    }
}

/// Operating-system effects used by automation actions.
pub trait Desktop {
    fn open_url(&self, url: &str) -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn notify(
        &self,
        title: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// `level` is already range-checked (`0..=100`).
    fn set_volume(&self, level: u8) -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn media(&self, command: MediaCommand) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Run a shell string; a non-zero exit status is a failure.
    fn run_shell(&self, command: &str) -> impl Future<Output = Result<(), ServiceError>> + Send;
}
