//! # astral-adapter-desktop
//!
//! Operating-system adapter — implements the `AppLauncher`, `Desktop` and
//! `SystemInfo` ports.
//!
//! Every OS effect is a short-lived child process built from a
//! per-[`Platform`] command table (`xdg-open`, `notify-send`, `pactl`,
//! `playerctl` on Linux; `open`/`osascript` on macOS; `cmd`/`powershell`
//! on Windows). Host statistics come from `/proc` and are only available
//! on Linux.
//!
//! ## Dependency rule
//! Depends on `astral-app` (for the port traits) and `astral-domain`.

pub mod config;
pub mod desktop;
pub mod error;
pub mod launcher;
pub mod platform;
mod process;
pub mod registry;
pub mod system_info;

pub use config::DesktopConfig;
pub use desktop::OsDesktop;
pub use error::DesktopError;
pub use launcher::RegistryLauncher;
pub use platform::{CommandSpec, Platform};
pub use registry::{AppEntry, find_app};
pub use system_info::ProcSystemInfo;
