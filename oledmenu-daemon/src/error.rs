//! Daemon-level errors

use oledmenu_core::EngineError;
use oledmenu_hal_linux::LinuxHalError;
use thiserror::Error;

use crate::config::ConfigError;

/// Engine error with the Linux HAL as display and input backend
pub type LinuxEngineError = EngineError<LinuxHalError, LinuxHalError>;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("hardware setup failed: {0}")]
    Hal(#[from] LinuxHalError),

    #[error("menu setup failed: {0}")]
    Menu(oledmenu_core::ConfigError),

    #[error("{0}")]
    Engine(LinuxEngineError),

    #[error("{action} failed with code {code}: {message}")]
    Terminal {
        action: &'static str,
        code: i32,
        message: String,
    },
}

impl From<LinuxEngineError> for DaemonError {
    fn from(e: LinuxEngineError) -> Self {
        DaemonError::Engine(e)
    }
}

impl From<oledmenu_core::ConfigError> for DaemonError {
    fn from(e: oledmenu_core::ConfigError) -> Self {
        DaemonError::Menu(e)
    }
}
