use std::fs;
use std::io::Cursor;
use std::ops::Range;
use std::path::Path;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use log::info;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::BodeError;
use crate::drivers::sweep::Measurement;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub gain_color: RGBColor,
    pub phase_color: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 700,
            background: WHITE,
            foreground: BLACK,
            gain_color: BLUE,
            phase_color: RGBColor(31, 119, 180),
        }
    }
}
/// Range covering `values` with some margin; single values are widened so a
/// log axis still has extent.
fn log_bounds(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || lo <= 0.0 {
        return 0.1..10.0;
    }
    if hi / lo < 1.01 {
        (lo / 2.0)..(hi * 2.0)
    } else {
        (lo / 1.2)..(hi * 1.2)
    }
}
fn linear_bounds(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return -180.0..180.0;
    }
    let pad = ((hi - lo) * 0.1).max(5.0);
    (lo - pad)..(hi + pad)
}
/// Renders gain (log-log) above phase in degrees (semi-log x) as a PNG.
pub fn render_bode_png(measurements: &[Measurement], style: &PlotStyle) -> Result<Vec<u8>, BodeError> {
    if measurements.is_empty() {
        return Err(BodeError::Plot("no measurements to plot".into()));
    }
    // Log axes cannot show non-positive gain.
    let gains: Vec<(f64, f64)> = measurements
        .iter()
        .filter(|m| m.gain > 0.0 && m.gain.is_finite())
        .map(|m| (m.frequency_hz, m.gain))
        .collect();
    let phases: Vec<(f64, f64)> = measurements
        .iter()
        .map(|m| (m.frequency_hz, m.phase.to_degrees()))
        .collect();
    let freq_range = log_bounds(measurements.iter().map(|m| m.frequency_hz));
    let gain_range = log_bounds(gains.iter().map(|(_, g)| *g));
    let phase_range = linear_bounds(phases.iter().map(|(_, p)| *p));
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let (upper, lower) = root.split_vertically(style.height / 2);
        let caption_font = ("sans-serif", 18).into_font().color(&style.foreground);
        let mut gain_chart = ChartBuilder::on(&upper)
            .margin(10)
            .caption("Magnitude Frequency Response", caption_font.clone())
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 30)
            .build_cartesian_2d(freq_range.clone().log_scale(), gain_range.log_scale())?;
        gain_chart
            .configure_mesh()
            .y_desc("Gain Magnitude (log scale)")
            .light_line_style(&style.foreground.mix(0.1))
            .draw()?;
        let gain_color = style.gain_color;
        gain_chart.draw_series(LineSeries::new(gains.iter().copied(), &gain_color))?;
        gain_chart.draw_series(
            gains
                .iter()
                .map(|&point| Circle::new(point, 3, gain_color.filled())),
        )?;
        let mut phase_chart = ChartBuilder::on(&lower)
            .margin(10)
            .caption("Phase Frequency Response", caption_font)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(freq_range.log_scale(), phase_range)?;
        phase_chart
            .configure_mesh()
            .x_desc("Frequency in Hz (log scale)")
            .y_desc("Phase Shift in Degrees")
            .light_line_style(&style.foreground.mix(0.1))
            .draw()?;
        let phase_color = style.phase_color;
        phase_chart.draw_series(LineSeries::new(phases.iter().copied(), &phase_color))?;
        phase_chart.draw_series(
            phases
                .iter()
                .map(|&point| Circle::new(point, 3, phase_color.filled())),
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Renders the Bode plot and writes it to `path`.
pub fn save_bode_png(path: &Path, measurements: &[Measurement], style: &PlotStyle) -> Result<(), BodeError> {
    let png = render_bode_png(measurements, style)?;
    fs::write(path, png)?;
    info!("saved Bode plot to {}", path.display());
    Ok(())
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, BodeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| BodeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn empty_dataset_is_rejected() {
        let err = render_bode_png(&[], &PlotStyle::default()).unwrap_err();
        assert!(matches!(err, BodeError::Plot(_)));
    }
    #[test]
    fn renders_a_sweep_to_png() {
        let measurements: Vec<Measurement> = (0..12)
            .map(|k| {
                let frequency_hz = 10.0 * 2f64.powi(k);
                let ratio = frequency_hz / 1_000.0;
                Measurement {
                    frequency_hz,
                    rms1: 0.35 / (1.0 + ratio * ratio).sqrt(),
                    rms2: 0.35,
                    gain: 1.0 / (1.0 + ratio * ratio).sqrt(),
                    phase: -ratio.atan(),
                }
            })
            .collect();
        let png = render_bode_png(&measurements, &PlotStyle::default()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 700));
    }
    #[test]
    fn log_bounds_widen_single_points() {
        let range = log_bounds([100.0].into_iter());
        assert!(range.start < 100.0 && range.end > 100.0);
        let range = log_bounds([10.0, 1e6].into_iter());
        assert!(range.start < 10.0 && range.end > 1e6);
        assert_eq!(log_bounds(std::iter::empty()), 0.1..10.0);
    }
    #[test]
    fn phase_bounds_have_padding() {
        let range = linear_bounds([-90.0, 0.0].into_iter());
        assert!(range.start < -90.0 && range.end > 0.0);
        let flat = linear_bounds([0.0].into_iter());
        assert_eq!(flat, -5.0..5.0);
    }
}
