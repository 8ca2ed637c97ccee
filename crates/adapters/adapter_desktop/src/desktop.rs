//! [`Desktop`] port implementation over OS commands.

use std::time::Duration;

use astral_app::ports::Desktop;
use astral_domain::error::ServiceError;
use astral_domain::routine::MediaCommand;

use crate::config::DesktopConfig;
use crate::error::DesktopError;
use crate::platform::{CommandSpec, Platform};
use crate::process;

pub struct OsDesktop {
    platform: Platform,
    timeout: Duration,
}

impl OsDesktop {
    #[must_use]
    pub fn new(config: &DesktopConfig) -> Self {
        Self::for_platform(Platform::current(), config)
    }

    #[must_use]
    pub fn for_platform(platform: Platform, config: &DesktopConfig) -> Self {
        Self {
            platform,
            timeout: config.command_timeout(),
        }
    }

    async fn run(&self, spec: Result<CommandSpec, DesktopError>) -> Result<(), ServiceError> {
        let spec = spec.map_err(DesktopError::into_service)?;
        tracing::debug!(program = %spec.program, "running desktop command");
        process::run(&spec, self.timeout).await.map_err(|err| {
            tracing::warn!(program = %spec.program, error = %err, "desktop command failed");
            err.into_service()
        })
    }
}

impl Desktop for OsDesktop {
    async fn open_url(&self, url: &str) -> Result<(), ServiceError> {
        self.run(Ok(self.platform.open_url(url))).await
    }

    async fn notify(&self, title: &str, message: &str) -> Result<(), ServiceError> {
        self.run(Ok(self.platform.notify(title, message))).await
    }

    async fn set_volume(&self, level: u8) -> Result<(), ServiceError> {
        self.run(self.platform.set_volume(level)).await
    }

    async fn media(&self, command: MediaCommand) -> Result<(), ServiceError> {
        self.run(Ok(self.platform.media(command))).await
    }

    #[tracing::instrument(skip_all)]
    async fn run_shell(&self, command: &str) -> Result<(), ServiceError> {
        self.run(Ok(self.platform.shell(command))).await
    }
}
