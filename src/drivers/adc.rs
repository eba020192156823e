//! ADC register access
//!
//! The L1 ADC runs from HSI, so HSI is started here and stopped again by
//! the LowPower clock profile.

use embassy_stm32::pac;
use embassy_stm32::pac::adc::vals::{Res, SampleTime};

use crate::config::adc_channels;
use crate::hal::adc::{AdcChannel, AdcDriver, AdcResolution};
use crate::hal::DriverError;

/// Polls of a ready flag before giving up
const READY_POLLS: u32 = 10_000;

/// Single ADC1 instance
#[derive(Debug, Default)]
pub struct Stm32Adc {
    resolution: Option<AdcResolution>,
}

impl Stm32Adc {
    /// ADC handle, powered down
    #[must_use]
    pub const fn new() -> Self {
        Self { resolution: None }
    }

    fn set_resolution(&mut self, resolution: AdcResolution) {
        if self.resolution == Some(resolution) {
            return;
        }
        let res = match resolution {
            AdcResolution::Bits12 => Res::BITS12,
            AdcResolution::Bits10 => Res::BITS10,
        };
        // RES is only writable with the converter off
        pac::ADC1.cr2().modify(|w| w.set_adon(false));
        pac::ADC1.cr1().modify(|w| w.set_res(res));
        pac::ADC1.cr2().modify(|w| w.set_adon(true));
        while !pac::ADC1.sr().read().adons() {}
        self.resolution = Some(resolution);
    }
}

fn poll(mut ready: impl FnMut() -> bool) -> bool {
    (0..READY_POLLS).any(|_| ready())
}

impl AdcDriver for Stm32Adc {
    fn init(&mut self) -> Result<(), DriverError> {
        pac::RCC.cr().modify(|w| w.set_hsion(true));
        if !poll(|| pac::RCC.cr().read().hsirdy()) {
            return Err(DriverError::NotReady);
        }

        pac::RCC.apb2enr().modify(|w| w.set_adc1en(true));
        pac::ADC1.ccr().modify(|w| w.set_tsvrefe(true));
        pac::ADC1.cr2().modify(|w| w.set_adon(true));
        if !poll(|| pac::ADC1.sr().read().adons()) {
            return Err(DriverError::NotReady);
        }
        self.resolution = None;
        Ok(())
    }

    fn deinit(&mut self) {
        pac::ADC1.cr2().modify(|w| w.set_adon(false));
        pac::ADC1.ccr().modify(|w| w.set_tsvrefe(false));
        pac::RCC.apb2enr().modify(|w| w.set_adc1en(false));
        self.resolution = None;
    }

    fn read_channel(&mut self, channel: AdcChannel, resolution: AdcResolution) -> u16 {
        self.set_resolution(resolution);

        let ch = channel.number();
        if ch == adc_channels::VREFINT {
            // Long sample time for the internal reference
            pac::ADC1.smpr2().modify(|w| w.set_smp(usize::from(ch - 10), SampleTime::CYCLES384));
        }
        pac::ADC1.sqr1().modify(|w| w.set_l(0));
        pac::ADC1.sqr5().modify(|w| w.set_sq(0, ch));
        pac::ADC1.cr2().modify(|w| w.set_swstart(true));
        while !pac::ADC1.sr().read().eoc() {}

        pac::ADC1.dr().read().rdata()
    }
}
