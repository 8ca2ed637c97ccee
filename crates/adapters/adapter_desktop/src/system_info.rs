//! Host statistics from `/proc`.
//!
//! CPU usage is the busy share of jiffies between two `/proc/stat`
//! samples; memory comes from `MemTotal` and `MemAvailable` in
//! `/proc/meminfo`. GPU usage is not reported.

use std::time::Duration;

use astral_app::ports::SystemInfo;
use astral_domain::error::ServiceError;
use astral_domain::system::SystemStats;

use crate::error::DesktopError;

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CpuTimes {
    idle: u64,
    total: u64,
}

/// Aggregate `cpu` line of `/proc/stat`. Idle includes iowait.
fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields = line
        .split_whitespace()
        .skip(1)
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    if fields.len() < 4 {
        return None;
    }
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes {
        idle,
        total: fields.iter().sum(),
    })
}

#[allow(clippy::cast_precision_loss)]
fn cpu_percent(before: CpuTimes, after: CpuTimes) -> f32 {
    let total = after.total.saturating_sub(before.total);
    if total == 0 {
        return 0.0;
    }
    let idle = after.idle.saturating_sub(before.idle).min(total);
    ((total - idle) as f64 / total as f64 * 100.0) as f32
}

/// `(used, total)` in bytes.
fn parse_meminfo(meminfo: &str) -> Option<(u64, u64)> {
    let field = |name: &str| {
        meminfo
            .lines()
            .find_map(|l| l.strip_prefix(name))
            .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse::<u64>().ok())
            .map(|kib| kib * 1024)
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    Some((total.saturating_sub(available), total))
}

async fn read(path: &'static str) -> Result<String, DesktopError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DesktopError::Read { path, source })
}

pub struct ProcSystemInfo {
    sample: Duration,
}

impl Default for ProcSystemInfo {
    fn default() -> Self {
        Self {
            sample: Duration::from_millis(200),
        }
    }
}

impl ProcSystemInfo {
    /// Override the gap between the two CPU samples.
    #[must_use]
    pub fn with_sample_interval(mut self, sample: Duration) -> Self {
        self.sample = sample;
        self
    }

    async fn collect(&self) -> Result<SystemStats, DesktopError> {
        if !cfg!(target_os = "linux") {
            return Err(DesktopError::Unsupported("system statistics"));
        }
        let before =
            parse_cpu_times(&read(PROC_STAT).await?).ok_or(DesktopError::Format(PROC_STAT))?;
        tokio::time::sleep(self.sample).await;
        let after =
            parse_cpu_times(&read(PROC_STAT).await?).ok_or(DesktopError::Format(PROC_STAT))?;
        let (used, total) =
            parse_meminfo(&read(PROC_MEMINFO).await?).ok_or(DesktopError::Format(PROC_MEMINFO))?;

        Ok(SystemStats {
            cpu_percent: cpu_percent(before, after),
            memory_used_bytes: used,
            memory_total_bytes: total,
            gpu_percent: None,
        })
    }
}

impl SystemInfo for ProcSystemInfo {
    async fn stats(&self) -> Result<SystemStats, ServiceError> {
        self.collect().await.map_err(|err| {
            tracing::warn!(error = %err, "system stats unavailable");
            err.into_service()
        })
    }
}
