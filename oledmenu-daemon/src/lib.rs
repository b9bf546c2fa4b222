//! oledmenu daemon internals
//!
//! - [`config`] - TOML configuration and command line
//! - [`scenes`] - the menu screens and their key bindings
//! - [`metrics`] - host status lines
//! - [`network`] - `nmcli` client
//! - [`text_input`] - keyboard listener for the password screen
//! - [`shell`] - bounded subprocess calls
//! - [`error`] - daemon errors

pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod scenes;
pub mod shell;
pub mod text_input;
