//! LoRa Node Board Main Application
//!
//! Entry point for the STM32L151-based node. Brings the board up, then
//! alternates between a battery check and the deepest low-power mode the
//! board allows.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use node_firmware::drivers;
use node_firmware::prelude::*;

/// Seconds between RTC wakeups from Stop
const WAKEUP_PERIOD_S: u16 = 10;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("LoRa node firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(drivers::embassy_config());
    let config = BoardConfig::default();
    info!("{}", config);

    let mut board = Board::new(drivers::take(p, config));
    if let Err(err) = board.board_init() {
        error!("board init failed: {}", err);
        board.reset_device();
    }

    info!(
        "board up: id={} seed={:08x} calibration={}",
        board.unique_id(),
        board.random_seed(),
        board.calibration_state()
    );

    board
        .peripherals_mut()
        .rtc_mut()
        .start_periodic_wakeup(WAKEUP_PERIOD_S);

    loop {
        let level = board.battery_level();
        if level.is_shutdown() {
            warn!("battery below shutdown threshold ({})", board.battery_voltage());
        }

        board.feed_watchdog();

        if let Err(err) = board.enter_low_power() {
            error!("low-power transition failed: {}", err);
            board.reset_device();
        }
    }
}
