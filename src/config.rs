// src/config.rs
use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use crate::drivers::{BodeError, GainMode, RangeStrategy, RetryPolicy, DEFAULT_SETTLE};
/// Retries allowed at one frequency before the retry policy applies.
pub const DEFAULT_MAX_RETRIES: u32 = 8;
/// Command line of the sweep binary.
#[derive(Parser, Debug)]
#[command(author, version, about = "Measure a filter's Bode plot with a function generator and a USB oscilloscope", long_about = None)]
pub struct Args {
    /// Serial device of the function generator
    #[arg(long, default_value = "/dev/ttyUSB0")]
    pub port: String,
    /// First excitation frequency in Hz
    #[arg(long, default_value_t = 10.0)]
    pub fstart: f64,
    /// Sweep stops before reaching this frequency (Hz)
    #[arg(long, default_value_t = 5_000_000.0)]
    pub fstop: f64,
    /// Multiplier between consecutive frequencies
    #[arg(long, default_value_t = 1.1)]
    pub fstep: f64,
    /// Output CSV path; the plot is written next to it as PNG
    #[arg(long, default_value = "bodeplot.csv")]
    pub filename: PathBuf,
    /// Run against a simulated RC low-pass with this cutoff (Hz) instead of hardware
    #[arg(long, value_name = "CUTOFF_HZ")]
    pub simulate: Option<f64>,
    /// Keep the unity gain mode instead of auto-ranging
    #[arg(long)]
    pub fixed_range: bool,
    /// Range switches allowed per frequency before forcing acceptance
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}
/// Validated, immutable parameters of one sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub step: f64,
    pub output: PathBuf,
    pub strategy: RangeStrategy,
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
    pub settle: Duration,
}
impl SweepConfig {
    pub fn new(start_hz: f64, stop_hz: f64, step: f64, output: impl Into<PathBuf>) -> Result<Self, BodeError> {
        if !(start_hz.is_finite() && start_hz > 0.0) {
            return Err(BodeError::InvalidConfig(format!(
                "start frequency must be positive, got {start_hz}"
            )));
        }
        if !(stop_hz.is_finite() && stop_hz > start_hz) {
            return Err(BodeError::InvalidConfig(format!(
                "stop frequency {stop_hz} must exceed start frequency {start_hz}"
            )));
        }
        if !(step.is_finite() && step > 1.0) {
            return Err(BodeError::InvalidConfig(format!(
                "frequency step must be greater than 1, got {step}"
            )));
        }
        Ok(Self {
            start_hz,
            stop_hz,
            step,
            output: output.into(),
            strategy: RangeStrategy::AutoRange,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_policy: RetryPolicy::ForceAccept,
            settle: DEFAULT_SETTLE,
        })
    }
    pub fn with_strategy(mut self, strategy: RangeStrategy) -> Self {
        self.strategy = strategy;
        self
    }
    pub fn with_retry_limit(mut self, max_retries: u32, policy: RetryPolicy) -> Self {
        self.max_retries = max_retries;
        self.retry_policy = policy;
        self
    }
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
    /// Where the Bode plot image goes: the output path with a `png` extension.
    pub fn plot_path(&self) -> PathBuf {
        self.output.with_extension("png")
    }
}
impl TryFrom<&Args> for SweepConfig {
    type Error = BodeError;
    fn try_from(args: &Args) -> Result<Self, BodeError> {
        let strategy = if args.fixed_range {
            RangeStrategy::Fixed(GainMode::Unity)
        } else {
            RangeStrategy::AutoRange
        };
        Ok(SweepConfig::new(args.fstart, args.fstop, args.fstep, args.filename.clone())?
            .with_strategy(strategy)
            .with_retry_limit(args.max_retries, RetryPolicy::ForceAccept))
    }
}
