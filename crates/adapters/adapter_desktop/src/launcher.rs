//! [`AppLauncher`] port implementation over the application registry.

use astral_app::ports::{AppLauncher, LaunchedApp};
use astral_domain::error::ServiceError;

use crate::error::DesktopError;
use crate::platform::Platform;
use crate::process;
use crate::registry::{AppEntry, find_app};

pub struct RegistryLauncher {
    platform: Platform,
}

impl Default for RegistryLauncher {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl RegistryLauncher {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// # Errors
    ///
    /// Returns [`DesktopError::UnknownApp`] when nothing in the registry
    /// matches `app_name`.
    pub fn resolve(app_name: &str) -> Result<&'static AppEntry, DesktopError> {
        find_app(app_name).ok_or_else(|| DesktopError::UnknownApp(app_name.trim().to_string()))
    }

    fn start(&self, app_name: &str) -> Result<LaunchedApp, DesktopError> {
        let app = Self::resolve(app_name)?;
        let spec = self.platform.launch(app);
        tracing::info!(app = app.name, program = %spec.program, "launching application");
        process::spawn_detached(&spec)?;
        Ok(LaunchedApp {
            resolved_name: app.name.to_string(),
        })
    }
}

impl AppLauncher for RegistryLauncher {
    async fn launch(&self, app_name: &str) -> Result<LaunchedApp, ServiceError> {
        self.start(app_name).map_err(|err| {
            tracing::warn!(app = app_name, error = %err, "launch failed");
            err.into_service()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_report_unknown_app_as_not_found() {
        let err = RegistryLauncher::new(Platform::Linux)
            .launch("doesnotexist")
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotFound("doesnotexist".to_string()));
    }

    #[test]
    fn should_resolve_alias_to_display_name() {
        assert_eq!(RegistryLauncher::resolve("vs code").unwrap().name, "Visual Studio Code");
    }
}
