//! System-info port — host resource statistics.

use std::future::Future;

use astral_domain::error::ServiceError;
use astral_domain::system::SystemStats;

pub trait SystemInfo {
    fn stats(&self) -> impl Future<Output = Result<SystemStats, ServiceError>> + Send;
}
