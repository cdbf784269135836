/// Sample rates the oscilloscope supports, in kS/s, ascending.
pub const SAMPLE_RATES_KHZ: [u32; 13] = [
    20, 32, 50, 64, 100, 128, 200, 500, 1000, 2000, 4000, 8000, 10000,
];
/// One entry of [`SAMPLE_RATES_KHZ`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRate {
    khz: u32,
}
impl SampleRate {
    /// Smallest supported rate at or above `nyquist_hz`, or the fastest rate
    /// when the target is out of reach.
    pub fn select(nyquist_hz: f64) -> Self {
        let target_khz = nyquist_hz / 1e3;
        let khz = SAMPLE_RATES_KHZ
            .iter()
            .copied()
            .find(|&rate| rate as f64 >= target_khz)
            .unwrap_or(SAMPLE_RATES_KHZ[SAMPLE_RATES_KHZ.len() - 1]);
        Self { khz }
    }
    /// Looks up a rate from its driver identifier. Unknown ids yield `None`.
    pub fn from_id(id: u8) -> Option<Self> {
        SAMPLE_RATES_KHZ
            .iter()
            .copied()
            .map(|khz| Self { khz })
            .find(|rate| rate.id() == id)
    }
    pub fn khz(&self) -> u32 {
        self.khz
    }
    pub fn hz(&self) -> f64 {
        self.khz as f64 * 1e3
    }
    /// Driver identifier: 20k..500k map to 102..150, 1M and above to whole MS/s.
    pub fn id(&self) -> u8 {
        let khz = self.khz as f64;
        if khz < 1e3 {
            (100.0 + khz / 10.0).round() as u8
        } else {
            (khz / 1e3).round() as u8
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn selects_minimal_rate_covering_target() {
        let targets = [1.0, 20e3, 20_001.0, 99e3, 128e3, 499e3, 1.5e6, 9.9e6, 10e6];
        for target in targets {
            let chosen = SampleRate::select(target);
            assert!(SAMPLE_RATES_KHZ.contains(&chosen.khz()));
            assert!(chosen.hz() >= target);
            let smaller = SAMPLE_RATES_KHZ
                .iter()
                .filter(|&&r| r < chosen.khz())
                .any(|&r| r as f64 * 1e3 >= target);
            assert!(!smaller, "a smaller rate also covers {target}");
        }
    }
    #[test]
    fn saturates_at_fastest_rate() {
        assert_eq!(SampleRate::select(10e6 + 1.0).khz(), 10000);
        assert_eq!(SampleRate::select(2.0 * 5e6 * 1.1).khz(), 10000);
    }
    #[test]
    fn driver_ids_match_scope_convention() {
        assert_eq!(SampleRate::select(500e3).id(), 150);
        assert_eq!(SampleRate::select(1000e3).id(), 1);
        assert_eq!(SampleRate::select(20e3).id(), 102);
        assert_eq!(SampleRate::select(60e3).id(), 106);
        assert_eq!(SampleRate::select(10e6).id(), 10);
    }
    #[test]
    fn ids_are_invertible() {
        for khz in SAMPLE_RATES_KHZ {
            let rate = SampleRate { khz };
            assert_eq!(SampleRate::from_id(rate.id()), Some(rate));
        }
        assert_eq!(SampleRate::from_id(0), None);
    }
}
