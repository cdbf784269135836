use std::thread;
use std::time::Duration;
use log::debug;
use crate::drivers::instrument::{Coupling, Generator, Oscilloscope, Waveform};
use crate::drivers::range::GainMode;
use crate::drivers::sample_rate::SampleRate;
use crate::drivers::BodeError;
/// Samples kept per channel: 20 blocks of 1024.
pub const CAPTURE_SAMPLES: usize = 20 * 1024;
/// Leading samples dropped because the scope's first transfers are unstable.
pub const SKIP_SAMPLES: usize = 2 * 1024;
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);
/// Generator channel driving the filter input.
const EXCITATION_CHANNEL: u8 = 1;
/// Scaled samples from one capture, leading transient already discarded.
#[derive(Clone, Debug)]
pub struct CaptureResult {
    pub sample_rate_hz: f64,
    pub ch1: Vec<f64>,
    pub ch2: Vec<f64>,
}
impl CaptureResult {
    pub fn duration_seconds(&self) -> f64 {
        self.ch1.len() as f64 / self.sample_rate_hz
    }
}
/// Drives the generator and scope through one measurement.
pub struct Acquirer {
    settle: Duration,
    samples: usize,
    configured: bool,
}
impl Acquirer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            samples: CAPTURE_SAMPLES,
            configured: false,
        }
    }
    /// Overrides the number of kept samples per channel.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }
    pub fn acquire<G, S>(
        &mut self,
        generator: &mut G,
        scope: &mut S,
        frequency_hz: f64,
        mode: GainMode,
        rate: SampleRate,
    ) -> Result<CaptureResult, BodeError>
    where
        G: Generator + ?Sized,
        S: Oscilloscope + ?Sized,
    {
        if !self.configured {
            scope.configure(2)?;
            scope.set_channel_coupling(1, Coupling::Dc)?;
            scope.set_channel_coupling(2, Coupling::Dc)?;
            self.configured = true;
        }
        let settings = mode.settings();
        scope.set_channel_range(1, settings.ch1_range)?;
        scope.set_channel_range(2, settings.ch2_range)?;
        scope.set_sample_rate(rate.id())?;
        generator.set_channel_waveform(
            EXCITATION_CHANNEL,
            frequency_hz,
            Waveform::Sine,
            settings.amplitude_vpp,
            0.0,
        )?;
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        let requested = self.samples + SKIP_SAMPLES;
        let (raw1, raw2) = scope.capture(requested)?;
        if raw1.len() < requested || raw2.len() < requested {
            return Err(BodeError::Instrument(format!(
                "short capture: requested {requested} samples, got {} and {}",
                raw1.len(),
                raw2.len()
            )));
        }
        debug!(
            "captured {} samples at {} kS/s (id {}) in {:?}",
            requested,
            rate.khz(),
            rate.id(),
            mode
        );
        let ch1 = scope.scale_to_voltage(&raw1[SKIP_SAMPLES..requested], settings.ch1_range, 1);
        let ch2 = scope.scale_to_voltage(&raw2[SKIP_SAMPLES..requested], settings.ch2_range, 2);
        Ok(CaptureResult {
            sample_rate_hz: rate.hz(),
            ch1,
            ch2,
        })
    }
}
impl Default for Acquirer {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE)
    }
}
