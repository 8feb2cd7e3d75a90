//! System statistics collaborator used by `ps`, `top` and `df`.
//! Providers return pre-formatted text; failures are reported inline, never raised.

use std::process::{Command, Stdio};

/// Maximum process rows shown by `ps`
const MAX_PROCESS_ROWS: usize = 20;

pub trait SystemStats: Send + Sync {
    /// Process table
    fn processes(&self) -> String;
    /// CPU / memory / load summary
    fn system_info(&self) -> String;
    /// Mounted filesystems and their usage
    fn disk_usage(&self) -> String;
}

/// Stats gathered from the host via standard system tools and /proc
#[derive(Debug, Default, Clone)]
pub struct HostStats;

impl HostStats {
    pub fn new() -> Self {
        Self
    }
}

impl SystemStats for HostStats {
    fn processes(&self) -> String {
        match run_tool("ps", &["-eo", "pid,comm,%cpu,%mem,stat"]) {
            Ok(out) => {
                let mut lines = vec![format!(
                    "{:<8} {:<20} {:<8} {:<8} {}",
                    "PID", "NAME", "CPU%", "MEM%", "STATUS"
                )];
                lines.push("-".repeat(60));
                lines.extend(
                    out.lines()
                        .skip(1)
                        .filter_map(format_process_row)
                        .take(MAX_PROCESS_ROWS),
                );
                lines.join("\n")
            }
            Err(e) => format!("Error getting processes: {}", e),
        }
    }

    fn system_info(&self) -> String {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get().to_string())
            .unwrap_or_else(|_| "?".to_string());

        let load = std::fs::read_to_string("/proc/loadavg")
            .ok()
            .and_then(|s| {
                let parts: Vec<&str> = s.split_whitespace().take(3).collect();
                (parts.len() == 3).then(|| format!("Load average: {}, {}, {}", parts[0], parts[1], parts[2]))
            })
            .unwrap_or_else(|| "Load average: N/A".to_string());

        let memory = std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|s| memory_summary(&s))
            .unwrap_or_else(|| "Memory: N/A".to_string());

        [
            "System Information:".to_string(),
            "-".repeat(40),
            format!("CPU cores: {}", cores),
            memory,
            load,
        ]
        .join("\n")
    }

    fn disk_usage(&self) -> String {
        match run_tool("df", &["-h"]) {
            Ok(out) => out.trim_end().to_string(),
            Err(e) => format!("Error getting disk usage: {}", e),
        }
    }
}

/// Canned statistics, for tests and hosts without system tools
#[derive(Debug, Clone, Default)]
pub struct FixedStats {
    pub processes: String,
    pub system_info: String,
    pub disk_usage: String,
}

impl SystemStats for FixedStats {
    fn processes(&self) -> String {
        self.processes.clone()
    }

    fn system_info(&self) -> String {
        self.system_info.clone()
    }

    fn disk_usage(&self) -> String {
        self.disk_usage.clone()
    }
}

fn run_tool(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| e.to_string())?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn format_process_row(line: &str) -> Option<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }
    let name: String = parts[1].chars().take(19).collect();
    Some(format!(
        "{:<8} {:<20} {:<8} {:<8} {}",
        parts[0], name, parts[2], parts[3], parts[4]
    ))
}

fn memory_summary(meminfo: &str) -> Option<String> {
    let field = |key: &str| -> Option<u64> {
        meminfo
            .lines()
            .find(|l| l.starts_with(key))
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|v| v.parse().ok())
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    let used = total.saturating_sub(available);
    let percent = if total == 0 { 0.0 } else { used as f64 * 100.0 / total as f64 };
    Some(format!(
        "Memory: {:.1}% used ({}/{})",
        percent,
        bytes_to_human(used * 1024),
        bytes_to_human(total * 1024)
    ))
}

/// Render a byte count with a binary unit suffix
pub fn bytes_to_human(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_human() {
        assert_eq!(bytes_to_human(512), "512.0B");
        assert_eq!(bytes_to_human(2048), "2.0KB");
        assert_eq!(bytes_to_human(3 * 1024 * 1024 * 1024), "3.0GB");
    }

    #[test]
    fn test_format_process_row() {
        let row = format_process_row("  42 bash 0.1 0.5 Ss").unwrap();
        assert!(row.starts_with("42"));
        assert!(row.contains("bash"));
        assert!(format_process_row("garbage").is_none());
    }

    #[test]
    fn test_memory_summary() {
        let meminfo = "MemTotal:       1000 kB\nMemFree:         100 kB\nMemAvailable:    250 kB\n";
        let summary = memory_summary(meminfo).unwrap();
        assert!(summary.starts_with("Memory: 75.0% used"));
    }

    #[test]
    fn test_system_info_never_fails() {
        let info = HostStats::new().system_info();
        assert!(info.starts_with("System Information:"));
    }
}
