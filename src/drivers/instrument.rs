use std::ops::{Deref, DerefMut};
use log::{debug, warn};
use crate::drivers::BodeError;
/// Waveforms the generator can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coupling {
    Ac,
    Dc,
}
/// Both instruments expose channels 1 and 2.
pub fn check_channel(channel: u8) -> Result<(), BodeError> {
    if channel == 1 || channel == 2 {
        Ok(())
    } else {
        Err(BodeError::InvalidChannel(channel))
    }
}
/// Command sink for the function generator.
pub trait Generator {
    fn set_channel_waveform(
        &mut self,
        channel: u8,
        frequency_hz: f64,
        waveform: Waveform,
        amplitude_vpp: f64,
        offset_v: f64,
    ) -> Result<(), BodeError>;
}
/// Two-channel sampling oscilloscope delivering 8-bit codes.
pub trait Oscilloscope {
    fn configure(&mut self, num_channels: u8) -> Result<(), BodeError>;
    fn set_channel_range(&mut self, channel: u8, range: u8) -> Result<(), BodeError>;
    fn set_channel_coupling(&mut self, channel: u8, coupling: Coupling) -> Result<(), BodeError>;
    fn set_sample_rate(&mut self, rate_id: u8) -> Result<(), BodeError>;
    /// Captures `sample_count` samples on each channel.
    fn capture(&mut self, sample_count: usize) -> Result<(Vec<u8>, Vec<u8>), BodeError>;
    fn scale_to_voltage(&self, raw: &[u8], range: u8, channel: u8) -> Vec<f64> {
        let _ = channel;
        default_scale(raw, range)
    }
    fn close(&mut self) -> Result<(), BodeError>;
}
/// Uncalibrated 8-bit conversion: code 128 is 0 V, full scale is +/-5.12 V / range.
pub fn default_scale(raw: &[u8], range: u8) -> Vec<f64> {
    let volts_per_code = 5.12 / (range.max(1) as f64 * 128.0);
    raw.iter()
        .map(|&code| (code as f64 - 128.0) * volts_per_code)
        .collect()
}
/// Inverse of [`default_scale`], clamped to the converter's code range.
pub fn volts_to_code(volts: f64, range: u8) -> u8 {
    let volts_per_code = 5.12 / (range.max(1) as f64 * 128.0);
    (volts / volts_per_code + 128.0).round().clamp(0.0, 255.0) as u8
}
/// Owns an open oscilloscope and releases it on every exit path.
pub struct ScopeSession<S: Oscilloscope> {
    scope: S,
    closed: bool,
}
impl<S: Oscilloscope> ScopeSession<S> {
    pub fn open(scope: S) -> Self {
        debug!("oscilloscope session opened");
        Self {
            scope,
            closed: false,
        }
    }
    /// Releases the handle and reports the driver's error, if any. Further
    /// calls are no-ops.
    pub fn close(&mut self) -> Result<(), BodeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing oscilloscope session");
        self.scope.close()
    }
}
impl<S: Oscilloscope> Deref for ScopeSession<S> {
    type Target = S;
    fn deref(&self) -> &S {
        &self.scope
    }
}
impl<S: Oscilloscope> DerefMut for ScopeSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.scope
    }
}
impl<S: Oscilloscope> Drop for ScopeSession<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("failed to release oscilloscope: {err}");
        }
    }
}
