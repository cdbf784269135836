use thiserror::Error;
#[derive(Debug, Error)]
pub enum BodeError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("instrument fault: {0}")]
    Instrument(String),
    #[error("channel {0} does not exist (instruments have two channels)")]
    InvalidChannel(u8),
    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),
    #[error("no distinguishable fundamental: {0}")]
    DegenerateSignal(String),
    #[error("reference channel RMS is {rms} at {frequency_hz} Hz; gain is undefined")]
    ZeroReference { frequency_hz: f64, rms: f64 },
    #[error("no oscilloscope backend is available; run with --simulate or provide an Oscilloscope driver")]
    NoScopeBackend,
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for BodeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        BodeError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for BodeError {
    fn from(value: image::ImageError) -> Self {
        BodeError::Plot(value.to_string())
    }
}
