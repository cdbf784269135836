// src/main.rs
mod config;
mod drivers;
use std::time::Duration;
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use config::{Args, SweepConfig};
use drivers::{
    save_bode_png, write_csv_file, BodeError, FeelTech, FilterModel, Generator, Oscilloscope,
    PlotStyle, ScopeSession, SimulatedBench, SweepDriver, SweepReport,
};
/// Noise added by the simulated bench, volts RMS.
const SIMULATED_NOISE_VRMS: f64 = 1e-3;
// 在整个扫频期间持有示波器句柄，任何退出路径都会释放
fn run_sweep<G, S>(config: &SweepConfig, generator: &mut G, scope: S) -> Result<SweepReport>
where
    G: Generator,
    S: Oscilloscope,
{
    let mut session = ScopeSession::open(scope);
    let report = SweepDriver::new(config.clone())
        .run(generator, &mut *session)
        .context("frequency sweep aborted")?;
    session.close().context("failed to release the oscilloscope")?;
    Ok(report)
}
// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = SweepConfig::try_from(&args).context("invalid sweep parameters")?;
    let report = match args.simulate {
        Some(cutoff_hz) => {
            info!("simulating a first-order low-pass with a {cutoff_hz} Hz cutoff");
            let bench = SimulatedBench::with_noise(
                FilterModel::LowPass { cutoff_hz },
                SIMULATED_NOISE_VRMS,
                0x5eed,
            );
            let (mut generator, scope) = bench.split();
            let config = config.clone().with_settle(Duration::ZERO);
            run_sweep(&config, &mut generator, scope)?
        }
        None => {
            let _generator = FeelTech::open(&args.port)
                .with_context(|| format!("failed to open function generator on {}", args.port))?;
            error!("the function generator is ready but no oscilloscope driver is built in");
            return Err(BodeError::NoScopeBackend.into());
        }
    };
    write_csv_file(&config.output, &report.measurements)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    let plot_path = config.plot_path();
    save_bode_png(&plot_path, &report.measurements, &PlotStyle::default())
        .with_context(|| format!("failed to render {}", plot_path.display()))?;
    Ok(())
}
