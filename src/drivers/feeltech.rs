use std::io::Write;
use std::thread;
use std::time::Duration;
use log::{debug, info};
use serialport::SerialPort;
use crate::drivers::instrument::{check_channel, Generator, Waveform};
use crate::drivers::BodeError;
pub const BAUD_RATE: u32 = 9600;
/// The generator drops commands that arrive back to back.
pub const DEFAULT_COMMAND_GAP: Duration = Duration::from_millis(50);
/// FeelTech FY32xx function generator on a serial line.
///
/// Commands are ASCII lines: a channel prefix (`b` main, `d` sub), a one
/// letter register and its value.
pub struct FeelTech<W: Write> {
    port: W,
    command_gap: Duration,
}
impl FeelTech<Box<dyn SerialPort>> {
    pub fn open(path: &str) -> Result<Self, BodeError> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(Duration::from_secs(1))
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .open()?;
        info!("opened FeelTech generator on {path}");
        Ok(Self::with_writer(port, DEFAULT_COMMAND_GAP))
    }
}
impl<W: Write> FeelTech<W> {
    pub fn with_writer(port: W, command_gap: Duration) -> Self {
        Self { port, command_gap }
    }
    pub fn into_inner(self) -> W {
        self.port
    }
    fn send(&mut self, command: &str) -> Result<(), BodeError> {
        debug!("feeltech <- {command}");
        self.port.write_all(command.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        if !self.command_gap.is_zero() {
            thread::sleep(self.command_gap);
        }
        Ok(())
    }
}
fn channel_prefix(channel: u8) -> Result<char, BodeError> {
    check_channel(channel)?;
    Ok(if channel == 1 { 'b' } else { 'd' })
}
fn waveform_index(waveform: Waveform) -> u8 {
    match waveform {
        Waveform::Sine => 0,
        Waveform::Square => 1,
        Waveform::Triangle => 2,
    }
}
/// Command lines that put one channel into the requested state.
pub fn waveform_commands(
    channel: u8,
    frequency_hz: f64,
    waveform: Waveform,
    amplitude_vpp: f64,
    offset_v: f64,
) -> Result<Vec<String>, BodeError> {
    let prefix = channel_prefix(channel)?;
    if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
        return Err(BodeError::Instrument(format!(
            "cannot program a frequency of {frequency_hz} Hz"
        )));
    }
    let centi_hz = (frequency_hz * 100.0).round() as u64;
    Ok(vec![
        format!("{prefix}w{}", waveform_index(waveform)),
        format!("{prefix}f{centi_hz:09}"),
        format!("{prefix}a{amplitude_vpp:.2}"),
        format!("{prefix}o{offset_v:.2}"),
    ])
}
impl<W: Write> Generator for FeelTech<W> {
    fn set_channel_waveform(
        &mut self,
        channel: u8,
        frequency_hz: f64,
        waveform: Waveform,
        amplitude_vpp: f64,
        offset_v: f64,
    ) -> Result<(), BodeError> {
        for command in waveform_commands(channel, frequency_hz, waveform, amplitude_vpp, offset_v)? {
            self.send(&command)?;
        }
        Ok(())
    }
}
