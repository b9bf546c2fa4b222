//! NetworkManager access through `nmcli`
//!
//! Only terse (`-t`) output is parsed. In terse mode fields are separated by
//! `:` and a literal `:` or `\` inside a field is escaped with a backslash.

use std::time::Duration;

use crate::config::NetworkConfig;
use crate::shell::{CommandStatus, Runner};

/// A saved connection profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedConnection {
    pub name: String,
    pub uuid: String,
    /// Bound to a device right now
    pub up: bool,
}

/// A visible wireless network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub in_use: bool,
    /// Signal strength, 0-100
    pub signal: u32,
    pub ssid: String,
}

/// Operations the menu needs from the network manager
pub trait NetworkManager {
    fn saved_connections(&self) -> Result<Vec<SavedConnection>, CommandStatus>;

    fn access_points(&self) -> Result<Vec<AccessPoint>, CommandStatus>;

    /// Bring a saved connection up or down
    fn set_connection(&self, uuid: &str, up: bool) -> CommandStatus;

    /// Join `ssid`, creating a profile for it
    fn connect(&self, ssid: &str, password: &str) -> CommandStatus;
}

/// Timeouts for each kind of nmcli call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmcliTimeouts {
    pub toggle: Duration,
    pub connect: Duration,
    pub scan: Duration,
}

impl From<&NetworkConfig> for NmcliTimeouts {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            toggle: config.toggle_timeout(),
            connect: config.connect_timeout(),
            scan: config.scan_timeout(),
        }
    }
}

impl Default for NmcliTimeouts {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

/// [`NetworkManager`] backed by the `nmcli` program
pub struct Nmcli<R> {
    runner: R,
    timeouts: NmcliTimeouts,
}

impl<R: Runner> Nmcli<R> {
    pub fn new(runner: R, timeouts: NmcliTimeouts) -> Self {
        Self { runner, timeouts }
    }

    fn list(&self, args: &[&str]) -> Result<String, CommandStatus> {
        let status = self.runner.run("nmcli", args, self.timeouts.scan);
        if status.success() {
            Ok(status.message)
        } else {
            log::warn!("nmcli listing failed ({}): {}", status.code, status.message);
            Err(status)
        }
    }
}

impl<R: Runner> NetworkManager for Nmcli<R> {
    fn saved_connections(&self) -> Result<Vec<SavedConnection>, CommandStatus> {
        let output = self.list(&["-t", "c", "show"])?;
        Ok(output.lines().filter_map(parse_connection).collect())
    }

    fn access_points(&self) -> Result<Vec<AccessPoint>, CommandStatus> {
        let output = self.list(&["-t", "-f", "IN-USE,SIGNAL,SSID", "device", "wifi", "list"])?;
        Ok(output.lines().filter_map(parse_access_point).collect())
    }

    fn set_connection(&self, uuid: &str, up: bool) -> CommandStatus {
        let action = if up { "up" } else { "down" };
        log::info!("connection {} {}", uuid, action);
        self.runner.run(
            "nmcli",
            &["connection", action, "uuid", uuid],
            self.timeouts.toggle,
        )
    }

    fn connect(&self, ssid: &str, password: &str) -> CommandStatus {
        log::info!("connecting to {}", ssid);
        let status = self.runner.run(
            "nmcli",
            &["device", "wifi", "connect", ssid, "password", password],
            self.timeouts.connect,
        );
        if !status.success() {
            log::warn!("connect to {} failed ({})", ssid, status.code);
        }
        status
    }
}

/// Split one line of terse output into unescaped fields
pub fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => field.push(escaped),
                None => field.push('\\'),
            },
            ':' => fields.push(core::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// `NAME:UUID:TYPE:DEVICE`
fn parse_connection(line: &str) -> Option<SavedConnection> {
    if line.is_empty() {
        return None;
    }
    let fields = split_terse(line);
    match fields.as_slice() {
        [name, uuid, _kind, device] => Some(SavedConnection {
            name: name.clone(),
            uuid: uuid.clone(),
            up: !device.is_empty(),
        }),
        _ => {
            log::debug!("skipping connection line with {} fields", fields.len());
            None
        }
    }
}

/// `IN-USE:SIGNAL:SSID`
fn parse_access_point(line: &str) -> Option<AccessPoint> {
    if line.is_empty() {
        return None;
    }
    let fields = split_terse(line);
    match fields.as_slice() {
        [in_use, signal, ssid] if !ssid.is_empty() => Some(AccessPoint {
            in_use: in_use.trim() == "*",
            signal: signal.trim().parse().ok()?,
            ssid: ssid.clone(),
        }),
        _ => None,
    }
}
