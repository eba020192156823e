//! Power Mode Controller
//!
//! Top-level board state machine:
//!
//! ```text
//!                 board_init (cold)
//!  Uninitialized ─────────────────────▶ Active ◀────────────┐
//!                                      │   ▲                │
//!                          enter_sleep │   │ interrupt      │ exit_stop
//!                                      ▼   │                │
//!                                    Sleeping      Stopped ─┘
//!                                                     ▲
//!                         Active ── enter_stop ───────┘
//! ```
//!
//! All state writes happen inside a critical section. The board is owned
//! by a single task; interrupt handlers never touch it directly.

use core::fmt;

use crate::calibration::WakeupCalibrator;
use crate::clock::{ClockError, ClockProfileManager};
use crate::config::BoardConfig;
use crate::hal::{
    AdcChannel, AdcDriver, Peripheral, Platform, PowerControl, TimerFired, UartFifo,
    WatchdogDriver, WatchdogKind,
};
use crate::peripherals::{InitError, PeripheralLifecycle};
use crate::power::{self, LowPowerMode, LowPowerPolicy, PotiLevel};
use crate::types::{
    BatteryLevel, BoardState, CalibrationState, ClockProfile, DeviceIdWords, Millivolts,
    PowerSource, UniqueId,
};

/// Transition requested from the wrong state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardOp {
    /// `enter_sleep`
    EnterSleep,
    /// `enter_stop`
    EnterStop,
    /// `exit_stop`
    ExitStop,
}

impl BoardOp {
    /// Operation name for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnterSleep => "enter_sleep",
            Self::EnterStop => "enter_stop",
            Self::ExitStop => "exit_stop",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BoardOp {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str());
    }
}

/// Board-level failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardError {
    /// Clock or peripheral initialization failed
    Init(InitError),
    /// Operation not valid in the current state
    InvalidTransition {
        /// State the board was in
        from: BoardState,
        /// Rejected operation
        op: BoardOp,
    },
}

impl From<InitError> for BoardError {
    fn from(err: InitError) -> Self {
        Self::Init(err)
    }
}

impl From<ClockError> for BoardError {
    fn from(err: ClockError) -> Self {
        Self::Init(InitError::Clock(err))
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(err) => write!(f, "init failed: {err}"),
            Self::InvalidTransition { from, op } => {
                write!(f, "{} not allowed in state {from}", op.as_str())
            }
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BoardError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Init(err) => defmt::write!(f, "Init({})", err),
            Self::InvalidTransition { from, op } => {
                defmt::write!(f, "InvalidTransition({} from {})", op, from);
            }
        }
    }
}

/// Everything needed to build a [`Board`]
pub struct BoardParts<P: Platform> {
    /// RCC / PWR / FLASH access
    pub clock: P::Clock,
    /// GPIO banks
    pub gpio: P::Gpio,
    /// ADC
    pub adc: P::Adc,
    /// Diagnostic UART
    pub uart: P::Uart,
    /// SPI bus and radio lines
    pub radio: P::Radio,
    /// Real-time clock
    pub rtc: P::Rtc,
    /// One-shot timer for the wakeup calibration
    pub timer: P::Timer,
    /// Watchdog
    pub watchdog: P::Watchdog,
    /// Power-mode and reset control
    pub power: P::Power,
    /// UART ring buffers
    pub uart_fifo: UartFifo,
    /// Factory identifier words
    pub device_id: DeviceIdWords,
    /// Where the board draws power from
    pub source: PowerSource,
    /// Flag the calibration timer raises
    pub calibration_fired: &'static TimerFired,
    /// Board variant
    pub config: BoardConfig,
}

/// The board power-mode controller
pub struct Board<P: Platform> {
    state: BoardState,
    clocks: ClockProfileManager<P::Clock>,
    peripherals: PeripheralLifecycle<P>,
    calibrator: WakeupCalibrator,
    timer: P::Timer,
    watchdog: P::Watchdog,
    power: P::Power,
    policy: LowPowerPolicy,
    source: PowerSource,
    device_id: DeviceIdWords,
    battery_voltage: Millivolts,
}

impl<P: Platform> Board<P> {
    /// Assemble an uninitialized board
    #[must_use]
    pub fn new(parts: BoardParts<P>) -> Self {
        let BoardParts {
            clock,
            gpio,
            adc,
            uart,
            radio,
            rtc,
            timer,
            watchdog,
            power,
            uart_fifo,
            device_id,
            source,
            calibration_fired,
            config,
        } = parts;

        Self {
            state: BoardState::Uninitialized,
            clocks: ClockProfileManager::new(clock),
            peripherals: PeripheralLifecycle::new(gpio, adc, uart, rtc, radio, uart_fifo, config),
            calibrator: WakeupCalibrator::new(calibration_fired),
            timer,
            watchdog,
            power,
            policy: LowPowerPolicy::new(),
            source,
            device_id,
            battery_voltage: Millivolts::from_mv(crate::config::BATTERY_MAX_LEVEL_MV),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Bring the board to Active
    ///
    /// The first call runs the full cold sequence, the first-boot radio set-up
    /// and, on battery, the wakeup calibration. Later calls only restore the
    /// FullSpeed clock and restart the ADC and radio. The watchdog is started
    /// on every call.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Init`] if a clock or peripheral fails; the board
    /// state is left unchanged.
    pub fn board_init(&mut self) -> Result<(), BoardError> {
        if self.state.is_initialized() {
            trace!("board: fast init from {}", self.state);
            self.clocks.apply_profile(ClockProfile::FullSpeed)?;
            self.peripherals.reinit_after_stop()?;
        } else {
            info!("board: cold init on {}", self.source);
            self.peripherals
                .init_all(&mut self.clocks, &mut self.power, self.source)?;
            self.policy = LowPowerPolicy::for_source(self.source);
            self.peripherals.radio_first_boot_init()?;
            self.calibrator
                .calibrate_once(self.source, &mut self.timer, self.peripherals.rtc_mut());
        }

        self.watchdog
            .init(WatchdogKind::Independent)
            .map_err(|cause| InitError::peripheral(Peripheral::Watchdog, cause))?;

        self.set_state(BoardState::Active);
        Ok(())
    }

    /// Shut down the ADC and radio; the board state is not changed
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Init`] if an oscillator pin cannot be parked.
    pub fn board_deinit(&mut self) -> Result<(), BoardError> {
        self.peripherals.deinit_all()?;
        Ok(())
    }

    /// Reset the MCU
    pub fn reset_device(&mut self) -> ! {
        warn!("board: reset requested");
        self.power.system_reset()
    }

    // =========================================================================
    // Low-power modes
    // =========================================================================

    /// Halt the core until the next interrupt
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidTransition`] unless Active.
    pub fn enter_sleep(&mut self) -> Result<(), BoardError> {
        self.require(BoardState::Active, BoardOp::EnterSleep)?;

        self.set_state(BoardState::Sleeping);
        self.power.wait_for_interrupt_sleep();
        self.set_state(BoardState::Active);
        Ok(())
    }

    /// Shut the peripherals down and enter Stop
    ///
    /// Returns after the wake event with the board in `Stopped` and the core
    /// running on MSI; call [`exit_stop`](Self::exit_stop) next.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidTransition`] unless Active, or
    /// [`BoardError::Init`] if de-initialization fails. In that case the ADC
    /// and radio are restarted and the board stays Active. If the restart
    /// fails too, its error is returned and the board drops back to
    /// Uninitialized so the next [`board_init`](Self::board_init) runs the
    /// cold sequence.
    pub fn enter_stop(&mut self) -> Result<(), BoardError> {
        self.require(BoardState::Active, BoardOp::EnterStop)?;

        critical_section::with(|_| -> Result<(), BoardError> {
            if let Err(err) = self.board_deinit() {
                error!("board: stop aborted: {}", err);
                if let Err(restart) = self.peripherals.reinit_after_stop() {
                    // Peripherals are down; only a full init recovers
                    self.state = BoardState::Uninitialized;
                    return Err(restart.into());
                }
                return Err(err);
            }
            self.power.disable_pvd();
            self.power.clear_wakeup_flag();
            self.power.enable_ultra_low_power();
            self.power.enable_fast_wakeup();
            self.state = BoardState::Stopped;
            Ok(())
        })?;

        trace!("board: entering stop");
        self.power.wait_for_interrupt_stop();
        self.clocks.note_stop_wakeup();
        Ok(())
    }

    /// Restore FullSpeed and the peripherals after a wake from Stop
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidTransition`] unless Stopped, or
    /// [`BoardError::Init`] if re-initialization fails.
    pub fn exit_stop(&mut self) -> Result<(), BoardError> {
        self.require(BoardState::Stopped, BoardOp::ExitStop)?;
        critical_section::with(|_| self.board_init())?;
        trace!("board: stop exited");
        Ok(())
    }

    /// Idle hook: enter the deepest mode the policy allows
    ///
    /// Stop (followed by [`exit_stop`](Self::exit_stop)) on battery, Sleep
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Propagates the error of the chosen transition.
    pub fn enter_low_power(&mut self) -> Result<LowPowerMode, BoardError> {
        let mode = self.policy.deepest();
        match mode {
            LowPowerMode::Stop => {
                self.enter_stop()?;
                self.exit_stop()?;
            }
            LowPowerMode::Sleep | LowPowerMode::Off => self.enter_sleep()?,
        }
        Ok(mode)
    }

    // =========================================================================
    // Measurements
    // =========================================================================

    /// Sample the supply and map it onto a [`BatteryLevel`] code
    pub fn battery_level(&mut self) -> BatteryLevel {
        let resolution = self.peripherals.adc_resolution();
        let raw = self
            .peripherals
            .adc_mut()
            .read_channel(AdcChannel::VREFINT, resolution);

        self.battery_voltage = power::battery_millivolts(raw, resolution.full_scale());
        let level = power::battery_level(self.source, self.battery_voltage);
        debug!("battery: {} -> {}", self.battery_voltage, level);
        level
    }

    /// Last sampled supply voltage (3000 mV before the first sample)
    #[must_use]
    pub const fn battery_voltage(&self) -> Millivolts {
        self.battery_voltage
    }

    /// Sample the potentiometer
    ///
    /// The channel is only converted when `analog_alarm` is set; otherwise
    /// the raw code is 0.
    pub fn potentiometer_level(&mut self, analog_alarm: bool) -> PotiLevel {
        let raw = if analog_alarm {
            let resolution = self.peripherals.adc_resolution();
            self.peripherals
                .adc_mut()
                .read_channel(AdcChannel::POTI, resolution)
        } else {
            0
        };
        power::potentiometer_level(raw)
    }

    // =========================================================================
    // Identity and status
    // =========================================================================

    /// Where the board draws power from
    #[must_use]
    pub const fn power_source(&self) -> PowerSource {
        self.source
    }

    /// 8-byte identifier derived from the factory ID words
    #[must_use]
    pub const fn unique_id(&self) -> UniqueId {
        self.device_id.unique_id()
    }

    /// Seed for the radio stack's random generator
    #[must_use]
    pub const fn random_seed(&self) -> u32 {
        self.device_id.random_seed()
    }

    /// Current board state
    #[must_use]
    pub const fn state(&self) -> BoardState {
        self.state
    }

    /// Clock profile last applied
    #[must_use]
    pub const fn clock_profile(&self) -> Option<ClockProfile> {
        self.clocks.current()
    }

    /// Wakeup calibration progress
    #[must_use]
    pub const fn calibration_state(&self) -> CalibrationState {
        self.calibrator.state()
    }

    /// Low-power modes currently permitted
    #[must_use]
    pub const fn low_power_policy(&self) -> LowPowerPolicy {
        self.policy
    }

    /// Borrow the clock manager
    #[must_use]
    pub const fn clocks(&self) -> &ClockProfileManager<P::Clock> {
        &self.clocks
    }

    /// Borrow the peripherals
    #[must_use]
    pub const fn peripherals(&self) -> &PeripheralLifecycle<P> {
        &self.peripherals
    }

    /// Borrow the peripherals mutably
    pub fn peripherals_mut(&mut self) -> &mut PeripheralLifecycle<P> {
        &mut self.peripherals
    }

    /// Reload the watchdog
    pub fn feed_watchdog(&mut self) {
        self.watchdog.feed();
    }

    fn require(&self, expected: BoardState, op: BoardOp) -> Result<(), BoardError> {
        if self.state == expected {
            Ok(())
        } else {
            warn!("board: {} rejected in {}", op, self.state);
            Err(BoardError::InvalidTransition {
                from: self.state,
                op,
            })
        }
    }

    fn set_state(&mut self, state: BoardState) {
        critical_section::with(|_| self.state = state);
        trace!("board: -> {}", state);
    }
}
