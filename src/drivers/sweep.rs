use log::{debug, info, warn};
use crate::config::SweepConfig;
use crate::drivers::acquire::{Acquirer, CaptureResult};
use crate::drivers::fft::{offset_compensated_rms, wrap_phase, HarmonicExtractor};
use crate::drivers::instrument::{Generator, Oscilloscope};
use crate::drivers::range::{Action, GainMode, RangeController};
use crate::drivers::sample_rate::SampleRate;
use crate::drivers::BodeError;
/// How the gain mode is chosen at each frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeStrategy {
    /// Every capture is accepted in the given mode.
    Fixed(GainMode),
    /// The range controller may ask for re-captures in other modes.
    AutoRange,
}
/// What happens once a frequency has used up its retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Record the latest capture anyway.
    ForceAccept,
    /// Move on without a row for this frequency.
    Skip,
}
/// One accepted point of the Bode plot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub frequency_hz: f64,
    pub rms1: f64,
    pub rms2: f64,
    /// `rms1 / rms2`.
    pub gain: f64,
    /// Channel 1 minus channel 2, radians in (-pi, pi].
    pub phase: f64,
}
/// Result of a sweep: the dataset plus what it took to get there.
#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    pub measurements: Vec<Measurement>,
    pub captures: usize,
    pub retries: usize,
    pub forced_accepts: usize,
    pub skipped_hz: Vec<f64>,
}
/// Position of the sweep: current frequency and retries spent on it.
#[derive(Clone, Copy, Debug)]
struct SweepState {
    frequency_hz: f64,
    retries: u32,
}
impl SweepState {
    fn advance(&mut self, step: f64) {
        self.frequency_hz *= step;
        self.retries = 0;
    }
}
/// Steps the excitation geometrically and collects one measurement per frequency.
pub struct SweepDriver {
    config: SweepConfig,
    acquirer: Acquirer,
    extractor: HarmonicExtractor,
    controller: RangeController,
}
impl SweepDriver {
    pub fn new(config: SweepConfig) -> Self {
        let acquirer = Acquirer::new(config.settle);
        Self::with_acquirer(config, acquirer)
    }
    pub fn with_acquirer(config: SweepConfig, acquirer: Acquirer) -> Self {
        let initial = match config.strategy {
            RangeStrategy::Fixed(mode) => mode,
            RangeStrategy::AutoRange => GainMode::default(),
        };
        Self {
            config,
            acquirer,
            extractor: HarmonicExtractor::new(),
            controller: RangeController::new(initial),
        }
    }
    pub fn mode(&self) -> GainMode {
        self.controller.mode()
    }
    pub fn run<G, S>(&mut self, generator: &mut G, scope: &mut S) -> Result<SweepReport, BodeError>
    where
        G: Generator + ?Sized,
        S: Oscilloscope + ?Sized,
    {
        let mut report = SweepReport::default();
        let mut state = SweepState {
            frequency_hz: self.config.start_hz,
            retries: 0,
        };
        info!(
            "sweeping {} Hz to {} Hz, step x{}, {:?}",
            self.config.start_hz, self.config.stop_hz, self.config.step, self.config.strategy
        );
        while state.frequency_hz < self.config.stop_hz {
            let frequency_hz = state.frequency_hz;
            let rate = SampleRate::select(2.0 * frequency_hz);
            let mode = self.controller.mode();
            let capture = self
                .acquirer
                .acquire(generator, scope, frequency_hz, mode, rate)?;
            report.captures += 1;
            let action = match self.config.strategy {
                RangeStrategy::Fixed(_) => Action::Accept,
                RangeStrategy::AutoRange => {
                    let rms1 = offset_compensated_rms(&capture.ch1);
                    debug!("{frequency_hz:.3} Hz in {mode:?}: rms1 = {rms1:.5} V");
                    self.controller.evaluate(rms1)
                }
            };
            if let Action::Retry(next) = action {
                if state.retries < self.config.max_retries {
                    debug!("{frequency_hz:.3} Hz: switching {mode:?} -> {next:?}");
                    self.controller.apply(action);
                    state.retries += 1;
                    report.retries += 1;
                    continue;
                }
                match self.config.retry_policy {
                    RetryPolicy::ForceAccept => {
                        warn!(
                            "{frequency_hz:.3} Hz: range did not settle after {} retries, keeping {mode:?}",
                            state.retries
                        );
                        report.forced_accepts += 1;
                    }
                    RetryPolicy::Skip => {
                        warn!(
                            "{frequency_hz:.3} Hz: range did not settle after {} retries, skipping",
                            state.retries
                        );
                        report.skipped_hz.push(frequency_hz);
                        state.advance(self.config.step);
                        continue;
                    }
                }
            }
            let measurement = self.measure(frequency_hz, &capture)?;
            info!(
                "{:.3} Hz: gain {:.5}, phase {:.2} deg",
                measurement.frequency_hz,
                measurement.gain,
                measurement.phase.to_degrees()
            );
            report.measurements.push(measurement);
            state.advance(self.config.step);
        }
        info!(
            "sweep finished: {} points from {} captures ({} range switches, {} forced, {} skipped)",
            report.measurements.len(),
            report.captures,
            report.retries,
            report.forced_accepts,
            report.skipped_hz.len()
        );
        Ok(report)
    }
    /// Turns an accepted capture into a measurement.
    pub fn measure(&mut self, frequency_hz: f64, capture: &CaptureResult) -> Result<Measurement, BodeError> {
        let output = self.extractor.extract(&capture.ch1, capture.sample_rate_hz)?;
        let input = self.extractor.extract(&capture.ch2, capture.sample_rate_hz)?;
        if !(input.rms > 0.0) {
            return Err(BodeError::ZeroReference {
                frequency_hz,
                rms: input.rms,
            });
        }
        debug!(
            "{frequency_hz:.3} Hz: fundamentals at {:.3} / {:.3} Hz over {:.4} s",
            output.frequency_hz,
            input.frequency_hz,
            capture.duration_seconds()
        );
        Ok(Measurement {
            frequency_hz,
            rms1: output.rms,
            rms2: input.rms,
            gain: output.rms / input.rms,
            phase: wrap_phase(output.phase - input.phase),
        })
    }
}
