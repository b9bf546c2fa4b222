//! Host status lines
//!
//! Reads load, temperature and memory straight from procfs and sysfs, disk
//! usage through `statvfs`, and addresses from `ip -4 -br addr`. Every
//! reading degrades to `"<label>: n/a"` instead of failing, so the status
//! screen always has something to show.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shell::Runner;

const IP_TIMEOUT: Duration = Duration::from_secs(5);
const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

/// Anything that can produce the status screen lines
pub trait StatusSource {
    fn status_lines(&self) -> Vec<String>;
}

/// Metrics read from the running system
pub struct SystemMetrics<R> {
    runner: R,
    proc_root: PathBuf,
    sys_root: PathBuf,
    disk_path: PathBuf,
}

impl<R: Runner> SystemMetrics<R> {
    pub fn new(runner: R) -> Self {
        Self::with_roots(runner, "/proc", "/sys", "/")
    }

    /// Read procfs and sysfs below other roots
    pub fn with_roots(
        runner: R,
        proc_root: impl Into<PathBuf>,
        sys_root: impl Into<PathBuf>,
        disk_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
            disk_path: disk_path.into(),
        }
    }

    pub fn cpu_load_line(&self) -> String {
        read(&self.proc_root.join("loadavg"))
            .and_then(|text| parse_loadavg(&text))
            .map(|load| format!("CPU Load: {:.2}", load))
            .unwrap_or_else(|| unavailable("CPU Load"))
    }

    pub fn cpu_temp_line(&self) -> String {
        read(&self.sys_root.join("class/thermal/thermal_zone0/temp"))
            .and_then(|text| text.trim().parse::<i64>().ok())
            .map(|milli| format!("CPU temp: {:.1}c", milli as f64 / 1000.0))
            .unwrap_or_else(|| unavailable("CPU temp"))
    }

    pub fn mem_line(&self) -> String {
        read(&self.proc_root.join("meminfo"))
            .and_then(|text| parse_meminfo(&text))
            .filter(|mem| mem.total > 0)
            .map(|mem| {
                let used = mem.total.saturating_sub(mem.available);
                format!(
                    "RAM:  {}/{}MB {:.2}%",
                    used / MIB,
                    mem.total / MIB,
                    used as f64 * 100.0 / mem.total as f64
                )
            })
            .unwrap_or_else(|| unavailable("RAM"))
    }

    pub fn disk_line(&self) -> String {
        match disk_usage(&self.disk_path) {
            Some(disk) => format!(
                "disk: {}/{}GB {}%",
                disk.used / GIB,
                disk.total / GIB,
                disk.percent()
            ),
            None => unavailable("disk"),
        }
    }

    /// One `ip -4 -br addr` line per interface, loopback skipped
    pub fn ip_lines(&self) -> Vec<String> {
        let status = self.runner.run("ip", &["-4", "-br", "addr"], IP_TIMEOUT);
        if !status.success() {
            log::warn!("ip failed ({}): {}", status.code, status.message);
            return vec![unavailable("ip")];
        }
        interface_lines(&status.message)
    }
}

impl<R: Runner> StatusSource for SystemMetrics<R> {
    fn status_lines(&self) -> Vec<String> {
        let mut lines = self.ip_lines();
        lines.push(String::new());
        lines.push(self.cpu_load_line());
        lines.push(self.cpu_temp_line());
        lines.push(self.mem_line());
        lines.push(self.disk_line());
        lines
    }
}

fn unavailable(label: &str) -> String {
    format!("{}: n/a", label)
}

fn read(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::debug!("cannot read {}: {}", path.display(), e);
            None
        }
    }
}

/// First field of `/proc/loadavg`
fn parse_loadavg(text: &str) -> Option<f64> {
    text.split_whitespace().next()?.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Memory {
    total: u64,
    available: u64,
}

/// `MemTotal` and `MemAvailable` from `/proc/meminfo`, in bytes
fn parse_meminfo(text: &str) -> Option<Memory> {
    let mut total = None;
    let mut available = None;
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let slot = match fields.next() {
            Some("MemTotal:") => &mut total,
            Some("MemAvailable:") => &mut available,
            _ => continue,
        };
        *slot = fields.next().and_then(|kb| kb.parse::<u64>().ok()).map(|kb| kb * 1024);
    }
    Some(Memory {
        total: total?,
        available: available?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Disk {
    total: u64,
    used: u64,
    available: u64,
}

impl Disk {
    /// Rounded up like `df`: share of the space usable by non-root users
    fn percent(&self) -> u64 {
        let usable = self.used + self.available;
        if usable == 0 {
            return 0;
        }
        (self.used * 100).div_ceil(usable)
    }
}

fn disk_usage(path: &Path) -> Option<Disk> {
    let stat = match nix::sys::statvfs::statvfs(path) {
        Ok(stat) => stat,
        Err(e) => {
            log::debug!("statvfs {} failed: {}", path.display(), e);
            return None;
        }
    };
    let fragment = u64::from(stat.fragment_size());
    let blocks = u64::from(stat.blocks());
    let free = u64::from(stat.blocks_free());
    let available = u64::from(stat.blocks_available());
    Some(Disk {
        total: blocks * fragment,
        used: blocks.saturating_sub(free) * fragment,
        available: available * fragment,
    })
}

fn interface_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("lo "))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedRunner;

    const MEMINFO: &str = "MemTotal:        1024000 kB\n\
                           MemFree:          100000 kB\n\
                           MemAvailable:     512000 kB\n\
                           Buffers:           20000 kB\n";

    fn fake_host() -> (tempfile::TempDir, SystemMetrics<ScriptedRunner>) {
        let dir = tempfile::tempdir().unwrap();
        let proc_root = dir.path().join("proc");
        let zone = dir.path().join("sys/class/thermal/thermal_zone0");
        fs::create_dir_all(&proc_root).unwrap();
        fs::create_dir_all(&zone).unwrap();
        fs::write(proc_root.join("loadavg"), "0.52 0.58 0.59 1/123 4567\n").unwrap();
        fs::write(proc_root.join("meminfo"), MEMINFO).unwrap();
        fs::write(zone.join("temp"), "47234\n").unwrap();

        let runner = ScriptedRunner::default();
        runner.reply(
            "ip -4 -br addr",
            0,
            "lo               UNKNOWN        127.0.0.1/8 \n\
             wlan0            UP             192.168.1.20/24 \n\
             eth0             DOWN           \n",
        );
        let metrics = SystemMetrics::with_roots(
            runner,
            proc_root,
            dir.path().join("sys"),
            dir.path().to_path_buf(),
        );
        (dir, metrics)
    }

    #[test]
    fn test_load_and_temperature() {
        let (_dir, metrics) = fake_host();
        assert_eq!(metrics.cpu_load_line(), "CPU Load: 0.52");
        assert_eq!(metrics.cpu_temp_line(), "CPU temp: 47.2c");
    }

    #[test]
    fn test_memory_uses_available() {
        let (_dir, metrics) = fake_host();
        assert_eq!(metrics.mem_line(), "RAM:  500/1000MB 50.00%");
    }

    #[test]
    fn test_disk_line_reads_real_filesystem() {
        let (_dir, metrics) = fake_host();
        let line = metrics.disk_line();
        assert!(line.starts_with("disk: "), "{}", line);
        assert!(line.ends_with('%'), "{}", line);
    }

    #[test]
    fn test_ip_lines_skip_loopback() {
        let (_dir, metrics) = fake_host();
        assert_eq!(
            metrics.ip_lines(),
            vec!["wlan0 UP 192.168.1.20/24", "eth0 DOWN"]
        );
        assert_eq!(metrics.runner.command_lines(), vec!["ip -4 -br addr"]);
    }

    #[test]
    fn test_missing_sources_degrade() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = SystemMetrics::with_roots(
            ScriptedRunner::default(),
            dir.path().join("none"),
            dir.path().join("none"),
            dir.path().join("none"),
        );
        assert_eq!(
            metrics.status_lines(),
            vec![
                "ip: n/a",
                "",
                "CPU Load: n/a",
                "CPU temp: n/a",
                "RAM: n/a",
                "disk: n/a"
            ]
        );
    }

    #[test]
    fn test_status_layout() {
        let (_dir, metrics) = fake_host();
        let lines = metrics.status_lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "CPU Load: 0.52");
    }

    #[test]
    fn test_meminfo_requires_both_fields() {
        assert_eq!(parse_meminfo("MemTotal: 10 kB\n"), None);
        assert_eq!(
            parse_meminfo("MemAvailable: 1 kB\nMemTotal: 2 kB\n"),
            Some(Memory {
                total: 2048,
                available: 1024
            })
        );
    }

    #[test]
    fn test_disk_percent_rounds_up() {
        let disk = Disk {
            total: 100,
            used: 10,
            available: 20,
        };
        assert_eq!(disk.percent(), 34);
        let empty = Disk {
            total: 0,
            used: 0,
            available: 0,
        };
        assert_eq!(empty.percent(), 0);
    }
}
