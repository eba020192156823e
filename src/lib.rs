//! LoRa Node Board Firmware Library
//!
//! Power-lifecycle control for an STM32L151-based LoRa sensor node with an
//! SX1272 radio front end. This crate brings the MCU from cold boot to a
//! running state, moves the board between Active, Sleep and Stop, calibrates
//! the Stop-mode wakeup latency once per boot and reports a normalized
//! battery level.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  POWER MODE CONTROLLER                       │
//! │   board_init / enter_sleep / enter_stop / battery_level      │
//! ├──────────────────────┬──────────────────────────────────────┤
//! │  PERIPHERAL LIFECYCLE │       WAKEUP CALIBRATOR              │
//! │  GPIO UART RTC ADC SPI│   one-shot timer + RTC latency       │
//! ├──────────────────────┴──────────────────────────────────────┤
//! │                  CLOCK PROFILE MANAGER                       │
//! │        FullSpeed (HSE + PLL)  │  LowPower (MSI)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 HAL TRAITS  (`hal` module)                   │
//! │  STM32L1 drivers (`drivers`)  │  recording mocks (`mock`)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Single owner**: board and calibration state live in one [`board::Board`]
//! - **Narrow seams**: every collaborator is reached through a `hal` trait
//! - **No unsafe in application code**: register access is confined to `drivers`
//! - **Functional core, imperative shell**: battery and ID math are pure
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Hardware Abstraction Layer
///
/// Collaborator traits for the drivers the power controller depends on.
pub mod hal;

/// Power Management
///
/// Battery level estimation and low-power mode policy.
pub mod power;

/// Clock Profile Manager
pub mod clock;

/// Peripheral Lifecycle
pub mod peripherals;

/// Wakeup Calibrator
pub mod calibration;

/// Power Mode Controller
pub mod board;

/// STM32L1 Drivers
///
/// Implementations of the `hal` traits for the target MCU.
#[cfg(feature = "embedded")]
pub mod drivers;

/// Recording mock drivers for host testing
#[cfg(feature = "std")]
pub mod mock;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::board::{Board, BoardError, BoardParts};
    pub use crate::config::BoardConfig;
    pub use crate::types::*;

    // Error handling
    pub use core::result::Result;

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
