//! oledmenu Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the display engine is written
//! against. Platform crates implement them for a concrete board, tests
//! implement them with scripted fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (oledmenu-daemon)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  oledmenu-core / oledmenu-display       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  oledmenu-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ oledmenu-hal- │
//!             │     linux     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Button level reads
//! - [`i2c::I2cBus`] - I2C bus writes to the panel controller
//! - [`time::Clock`] - Monotonic time and the poll-loop sleep

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Level};
pub use i2c::I2cBus;
pub use time::Clock;
