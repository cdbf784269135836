use std::f64::consts::PI;
use rustfft::{num_complex::Complex64, FftPlanner};
use crate::drivers::BodeError;
/// Peaks at or below this normalized magnitude are FFT round-off, not signal.
const NOISE_FLOOR: f64 = 1e-12;
/// Dominant spectral component of one channel plus its RMS.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Harmonic {
    pub rms: f64,
    pub frequency_hz: f64,
    pub magnitude: f64,
    /// Radians in [-pi, pi], straight from `arg()`.
    pub phase: f64,
}
/// RMS with the mean subtracted afterwards: `sqrt(mean(v^2)) - mean(v)`.
///
/// This is not the textbook AC RMS. Both channels go through the same formula,
/// so their ratio stays consistent; it is only close to AC RMS while the DC
/// offset is small against the signal.
pub fn offset_compensated_rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean_square = samples.iter().map(|v| v * v).sum::<f64>() / n;
    let mean = samples.iter().sum::<f64>() / n;
    mean_square.sqrt() - mean
}
/// Folds a difference of two principal angles back into (-pi, pi].
pub fn wrap_phase(delta: f64) -> f64 {
    if delta > PI {
        delta - 2.0 * PI
    } else if delta <= -PI {
        delta + 2.0 * PI
    } else {
        delta
    }
}
/// Finds the fundamental of a captured channel with a forward FFT.
pub struct HarmonicExtractor {
    planner: FftPlanner<f64>,
}
impl HarmonicExtractor {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }
    pub fn extract(&mut self, samples: &[f64], sample_rate_hz: f64) -> Result<Harmonic, BodeError> {
        let n = samples.len();
        if n < 4 {
            return Err(BodeError::DegenerateSignal(format!(
                "{n} samples are too few for a spectrum"
            )));
        }
        let fft = self.planner.plan_fft_forward(n);
        let mut buffer: Vec<Complex64> = samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        fft.process(&mut buffer);
        let half = &buffer[..n / 2];
        // Bin 0 is DC and never counts as the fundamental.
        let (index, peak) = half
            .iter()
            .enumerate()
            .skip(1)
            .fold((0, 0.0f64), |best, (k, c)| {
                let magnitude = c.norm() / n as f64;
                if magnitude > best.1 {
                    (k, magnitude)
                } else {
                    best
                }
            });
        if index == 0 || peak <= NOISE_FLOOR {
            return Err(BodeError::DegenerateSignal(
                "spectrum has no energy outside DC".into(),
            ));
        }
        Ok(Harmonic {
            rms: offset_compensated_rms(samples),
            frequency_hz: index as f64 * sample_rate_hz / n as f64,
            magnitude: peak,
            phase: half[index].arg(),
        })
    }
}
impl Default for HarmonicExtractor {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn sine(freq: f64, amplitude: f64, phase: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / rate + phase).sin())
            .collect()
    }
    #[test]
    fn recovers_pure_sine() {
        let (rate, n) = (20_000.0, 20_480);
        let signal = sine(1_000.0, 0.5, 0.0, rate, n);
        let harmonic = HarmonicExtractor::new().extract(&signal, rate).unwrap();
        let bin_width = rate / n as f64;
        assert!((harmonic.frequency_hz - 1_000.0).abs() <= bin_width);
        assert!((harmonic.rms - 0.5 / 2f64.sqrt()).abs() < 1e-3);
        // A real sine splits its energy between the positive and negative bins.
        assert!((harmonic.magnitude - 0.25).abs() < 0.05);
    }
    #[test]
    fn relative_phase_survives_leakage() {
        let (rate, n) = (50_000.0, 4_096);
        let lead = sine(1_234.5, 1.0, 0.6, rate, n);
        let lag = sine(1_234.5, 0.3, 0.1, rate, n);
        let mut extractor = HarmonicExtractor::new();
        let a = extractor.extract(&lead, rate).unwrap();
        let b = extractor.extract(&lag, rate).unwrap();
        assert!((wrap_phase(a.phase - b.phase) - 0.5).abs() < 1e-2);
    }
    #[test]
    fn rms_subtracts_mean_after_root() {
        let samples = [1.0, 1.0, 1.0, 1.0];
        assert_eq!(offset_compensated_rms(&samples), 0.0);
        let samples = [3.0, -1.0];
        assert!((offset_compensated_rms(&samples) - (5f64.sqrt() - 1.0)).abs() < 1e-12);
    }
    #[test]
    fn wraps_single_step() {
        assert!((wrap_phase(3.5) - (3.5 - 2.0 * PI)).abs() < 1e-12);
        assert!((wrap_phase(-3.5) - (-3.5 + 2.0 * PI)).abs() < 1e-12);
        assert_eq!(wrap_phase(PI), PI);
        assert_eq!(wrap_phase(-PI), PI);
        assert_eq!(wrap_phase(-0.25), -0.25);
        for raw in [3.5, -3.5, 6.0, -6.0, -PI, -2.0 * PI + 1e-9] {
            let wrapped = wrap_phase(raw);
            assert!(wrapped > -PI && wrapped <= PI);
        }
    }
    #[test]
    fn silent_channel_is_degenerate() {
        let silent = vec![0.2; 64];
        let err = HarmonicExtractor::new().extract(&silent, 1e3).unwrap_err();
        assert!(matches!(err, BodeError::DegenerateSignal(_)));
        assert!(HarmonicExtractor::new().extract(&[0.0, 1.0], 1e3).is_err());
    }
}
