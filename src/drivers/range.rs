//! Auto-ranging between excitation amplitude and scope attenuation.
//!
//! Channel 1 (filter output) decides the mode. Each step up or down trades
//! excitation against scope sensitivity so the captured signal keeps enough
//! codes without clipping. Thresholds overlap so that a signal accepted after
//! a switch does not immediately switch back.

/// Excitation amplitude plus the voltage range of each scope channel.
///
/// Ranges are the scope's range multiplier (1, 2, 5 or 10); a higher range
/// means less attenuation and a full scale of +/-5.12 V divided by the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainSettings {
    pub amplitude_vpp: f64,
    pub ch1_range: u8,
    pub ch2_range: u8,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GainMode {
    AttenLowExcHigh,
    Unity,
    AttenHighExcLow,
    AttenHighExcLower,
}
impl Default for GainMode {
    fn default() -> Self {
        GainMode::Unity
    }
}
impl GainMode {
    pub fn settings(self) -> GainSettings {
        let (amplitude_vpp, ch1_range, ch2_range) = match self {
            GainMode::AttenLowExcHigh => (10.0, 10, 1),
            GainMode::Unity => (1.0, 5, 5),
            GainMode::AttenHighExcLow => (0.5, 1, 10),
            GainMode::AttenHighExcLower => (0.1, 1, 10),
        };
        GainSettings {
            amplitude_vpp,
            ch1_range,
            ch2_range,
        }
    }
}
/// Outcome of judging one capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Accept,
    Retry(GainMode),
}
#[derive(Clone, Debug, Default)]
pub struct RangeController {
    mode: GainMode,
}
impl RangeController {
    pub fn new(mode: GainMode) -> Self {
        Self { mode }
    }
    pub fn mode(&self) -> GainMode {
        self.mode
    }
    pub fn evaluate(&self, rms1: f64) -> Action {
        match self.mode {
            GainMode::AttenLowExcHigh if rms1 > 0.2 => Action::Retry(GainMode::Unity),
            GainMode::Unity if rms1 < 0.015 => Action::Retry(GainMode::AttenLowExcHigh),
            GainMode::Unity if rms1 > 0.4 => Action::Retry(GainMode::AttenHighExcLow),
            GainMode::AttenHighExcLow if rms1 < 0.15 => Action::Retry(GainMode::Unity),
            GainMode::AttenHighExcLow if rms1 > 4.0 => Action::Retry(GainMode::AttenHighExcLower),
            GainMode::AttenHighExcLower if rms1 < 0.15 => Action::Retry(GainMode::AttenHighExcLow),
            _ => Action::Accept,
        }
    }
    /// Adopts the mode a retry asked for; the mode carries over to later
    /// frequencies.
    pub fn apply(&mut self, action: Action) {
        if let Action::Retry(mode) = action {
            self.mode = mode;
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn eval(mode: GainMode, rms1: f64) -> Action {
        RangeController::new(mode).evaluate(rms1)
    }
    #[test]
    fn unity_transitions() {
        assert_eq!(eval(GainMode::Unity, 0.5), Action::Retry(GainMode::AttenHighExcLow));
        assert_eq!(eval(GainMode::Unity, 0.2), Action::Accept);
        assert_eq!(eval(GainMode::Unity, 0.01), Action::Retry(GainMode::AttenLowExcHigh));
    }
    #[test]
    fn attenuated_modes_step_back() {
        assert_eq!(eval(GainMode::AttenHighExcLow, 0.1), Action::Retry(GainMode::Unity));
        assert_eq!(eval(GainMode::AttenHighExcLow, 4.5), Action::Retry(GainMode::AttenHighExcLower));
        assert_eq!(eval(GainMode::AttenHighExcLow, 1.0), Action::Accept);
        assert_eq!(eval(GainMode::AttenHighExcLower, 0.1), Action::Retry(GainMode::AttenHighExcLow));
        assert_eq!(eval(GainMode::AttenHighExcLower, 10.0), Action::Accept);
        assert_eq!(eval(GainMode::AttenLowExcHigh, 0.3), Action::Retry(GainMode::Unity));
        assert_eq!(eval(GainMode::AttenLowExcHigh, 0.001), Action::Accept);
    }
    #[test]
    fn thresholds_are_strict() {
        assert_eq!(eval(GainMode::Unity, 0.4), Action::Accept);
        assert_eq!(eval(GainMode::Unity, 0.015), Action::Accept);
        assert_eq!(eval(GainMode::AttenLowExcHigh, 0.2), Action::Accept);
    }
    #[test]
    fn retry_updates_persistent_mode() {
        let mut controller = RangeController::default();
        assert_eq!(controller.mode(), GainMode::Unity);
        let action = controller.evaluate(0.9);
        controller.apply(action);
        assert_eq!(controller.mode(), GainMode::AttenHighExcLow);
        controller.apply(Action::Accept);
        assert_eq!(controller.mode(), GainMode::AttenHighExcLow);
    }
    #[test]
    fn switching_keeps_signal_inside_new_window() {
        // A signal that just crossed a threshold lands strictly inside the
        // accept band of the mode it switched to.
        for (from, rms1, to) in [
            (GainMode::Unity, 0.41, GainMode::AttenHighExcLow),
            (GainMode::Unity, 0.014, GainMode::AttenLowExcHigh),
            (GainMode::AttenHighExcLow, 4.1, GainMode::AttenHighExcLower),
        ] {
            let scaled = rms1 * to.settings().amplitude_vpp / from.settings().amplitude_vpp;
            assert_eq!(RangeController::new(to).evaluate(scaled), Action::Accept);
        }
    }
}
