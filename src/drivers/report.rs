use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use log::info;
use serde::Serialize;
use crate::drivers::sweep::Measurement;
use crate::drivers::BodeError;
/// One CSV row; field names are the column headers downstream tools expect.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "Frequency")]
    frequency: f64,
    #[serde(rename = "Channel 1 RMS Magnitude")]
    rms1: f64,
    #[serde(rename = "Channel 2 RMS Magnitude")]
    rms2: f64,
    #[serde(rename = "Gain (Ch1/Ch2)")]
    gain: f64,
    #[serde(rename = "Phase Difference")]
    phase: f64,
}
impl From<&Measurement> for Row {
    fn from(m: &Measurement) -> Self {
        Self {
            frequency: m.frequency_hz,
            rms1: m.rms1,
            rms2: m.rms2,
            gain: m.gain,
            phase: m.phase,
        }
    }
}
/// Writes the header and one row per measurement, phase in radians.
pub fn write_csv<W: Write>(writer: W, measurements: &[Measurement]) -> Result<(), BodeError> {
    let mut out = csv::Writer::from_writer(writer);
    if measurements.is_empty() {
        // serde only emits the header alongside the first record.
        out.write_record([
            "Frequency",
            "Channel 1 RMS Magnitude",
            "Channel 2 RMS Magnitude",
            "Gain (Ch1/Ch2)",
            "Phase Difference",
        ])?;
    }
    for measurement in measurements {
        out.serialize(Row::from(measurement))?;
    }
    out.flush()?;
    Ok(())
}
pub fn write_csv_file(path: &Path, measurements: &[Measurement]) -> Result<(), BodeError> {
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), measurements)?;
    info!("saved {} rows to {}", measurements.len(), path.display());
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    fn dataset() -> Vec<Measurement> {
        vec![
            Measurement {
                frequency_hz: 10.0,
                rms1: 0.35,
                rms2: 0.35,
                gain: 1.0,
                phase: 0.0,
            },
            Measurement {
                frequency_hz: 20.0,
                rms1: 0.25,
                rms2: 0.5,
                gain: 0.5,
                phase: -0.785,
            },
        ]
    }
    fn render(measurements: &[Measurement]) -> String {
        let mut out = Vec::new();
        write_csv(&mut out, measurements).unwrap();
        String::from_utf8(out).unwrap()
    }
    #[test]
    fn header_and_rows() {
        let text = render(&dataset());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Frequency,Channel 1 RMS Magnitude,Channel 2 RMS Magnitude,Gain (Ch1/Ch2),Phase Difference"
        );
        assert_eq!(lines.len(), 3);
        let fields: Vec<f64> = lines[2].split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields, vec![20.0, 0.25, 0.5, 0.5, -0.785]);
    }
    #[test]
    fn output_is_repeatable() {
        let data = dataset();
        assert_eq!(render(&data), render(&data));
    }
    #[test]
    fn empty_dataset_still_has_header() {
        assert_eq!(
            render(&[]),
            "Frequency,Channel 1 RMS Magnitude,Channel 2 RMS Magnitude,Gain (Ch1/Ch2),Phase Difference\n"
        );
    }
}
