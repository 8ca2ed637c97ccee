//! Host resource statistics reported by the system-info collaborator.

use serde::{Deserialize, Serialize};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub gpu_percent: Option<f32>,
}

impl SystemStats {
    /// Share of memory in use, `0.0` when the total is unknown.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn memory_percent(&self) -> f64 {
        if self.memory_total_bytes == 0 {
            return 0.0;
        }
        self.memory_used_bytes as f64 / self.memory_total_bytes as f64 * 100.0
    }

    /// One sentence suitable for speaking aloud.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> String {
        let mut text = format!(
            "CPU usage is {:.0} percent. Memory: {:.1} of {:.1} gigabytes in use ({:.0} percent).",
            self.cpu_percent,
            self.memory_used_bytes as f64 / GIB,
            self.memory_total_bytes as f64 / GIB,
            self.memory_percent(),
        );
        if let Some(gpu) = self.gpu_percent {
            text.push_str(&format!(" GPU usage is {gpu:.0} percent."));
        }
        text
    }
}
