//! Scene navigation engine for oledmenu
//!
//! This crate contains the board-agnostic part of the menu engine:
//!
//! - [`Scene`] templates with lifecycle hooks and key dispatch
//! - [`Intent`] and [`Command`], the results hooks hand back
//! - [`Navigator`], which owns the current scene and the navigation stack
//! - [`ButtonPad`], priority-ordered button sampling
//! - [`Controller`], the input and power loop driving all of the above
//!
//! # Flow
//!
//! ```text
//! Controller ──key──▶ Navigator ──▶ Scene key handler ──▶ Intent
//!     │                   ▲                                  │
//!     │                   └──── enter / push / pop ◀─────────┘
//!     └──draw──▶ Scene draw hook ──▶ Canvas ──▶ Compositor ──▶ Panel
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod command;
pub mod controller;
pub mod error;
pub mod input;
pub mod intent;
pub mod navigator;
pub mod scene;
pub mod state;

pub use command::{Command, Scheduled, Timing};
pub use controller::{Controller, Flow, LoopTiming};
pub use error::{ConfigError, EngineError};
pub use input::{ButtonPad, Key};
pub use intent::{Intent, Target};
pub use navigator::{Navigator, MAX_CHAIN_DEPTH};
pub use scene::{KeyAction, Scene, SceneId, SceneOptions, Terminal};
pub use state::SceneState;
