use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::num_complex::Complex64;
use crate::drivers::instrument::{
    check_channel, volts_to_code, Coupling, Generator, Oscilloscope, Waveform,
};
use crate::drivers::sample_rate::SampleRate;
use crate::drivers::BodeError;
/// Transfer function placed between the generator and scope channel 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterModel {
    Passthrough,
    /// First-order RC low-pass.
    LowPass { cutoff_hz: f64 },
    /// First-order RC high-pass.
    HighPass { cutoff_hz: f64 },
}
impl FilterModel {
    pub fn response(&self, frequency_hz: f64) -> Complex64 {
        match *self {
            FilterModel::Passthrough => Complex64::new(1.0, 0.0),
            FilterModel::LowPass { cutoff_hz } => {
                Complex64::new(1.0, 0.0) / Complex64::new(1.0, frequency_hz / cutoff_hz)
            }
            FilterModel::HighPass { cutoff_hz } => {
                let jw = Complex64::new(0.0, frequency_hz / cutoff_hz);
                jw / (Complex64::new(1.0, 0.0) + jw)
            }
        }
    }
}
#[derive(Debug)]
struct BenchState {
    filter: FilterModel,
    noise_vrms: f64,
    rng: StdRng,
    frequency_hz: f64,
    waveform: Waveform,
    amplitude_vpp: f64,
    offset_v: f64,
    channels: u8,
    ranges: [u8; 2],
    couplings: [Coupling; 2],
    rate_id: Option<u8>,
    closed: bool,
    captures: usize,
}
impl BenchState {
    /// Excitation voltage at time `t` with the generator's phase `phi`.
    fn excitation(&self, t: f64, phi: f64) -> f64 {
        let peak = self.amplitude_vpp / 2.0;
        let arg = 2.0 * PI * self.frequency_hz * t + phi;
        let wave = match self.waveform {
            Waveform::Sine => arg.sin(),
            Waveform::Square => arg.sin().signum(),
            Waveform::Triangle => (2.0 / PI) * arg.sin().asin(),
        };
        peak * wave + self.offset_v
    }
    fn noise(&mut self) -> f64 {
        if self.noise_vrms == 0.0 {
            return 0.0;
        }
        // Uniform noise of the requested standard deviation.
        let half_width = self.noise_vrms * 3f64.sqrt();
        self.rng.gen_range(-half_width..=half_width)
    }
}
/// A generator and scope wired through a modelled filter.
///
/// Channel 2 sees the generator output, channel 1 the filter output. Only
/// the fundamental passes through the filter model, which is exact for the
/// sine excitation a sweep uses.
#[derive(Clone)]
pub struct SimulatedBench {
    state: Rc<RefCell<BenchState>>,
}
impl SimulatedBench {
    pub fn new(filter: FilterModel) -> Self {
        Self::with_noise(filter, 0.0, 0)
    }
    pub fn with_noise(filter: FilterModel, noise_vrms: f64, seed: u64) -> Self {
        let state = BenchState {
            filter,
            noise_vrms,
            rng: StdRng::seed_from_u64(seed),
            frequency_hz: 0.0,
            waveform: Waveform::Sine,
            amplitude_vpp: 0.0,
            offset_v: 0.0,
            channels: 0,
            ranges: [1, 1],
            couplings: [Coupling::Dc, Coupling::Dc],
            rate_id: None,
            closed: false,
            captures: 0,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }
    /// Hands out the generator and scope halves; both share this bench.
    pub fn split(&self) -> (SimulatedGenerator, SimulatedScope) {
        (
            SimulatedGenerator {
                state: self.state.clone(),
            },
            SimulatedScope {
                state: self.state.clone(),
            },
        )
    }
    pub fn captures(&self) -> usize {
        self.state.borrow().captures
    }
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }
}
pub struct SimulatedGenerator {
    state: Rc<RefCell<BenchState>>,
}
impl Generator for SimulatedGenerator {
    fn set_channel_waveform(
        &mut self,
        channel: u8,
        frequency_hz: f64,
        waveform: Waveform,
        amplitude_vpp: f64,
        offset_v: f64,
    ) -> Result<(), BodeError> {
        check_channel(channel)?;
        // Only the main channel is wired to the filter.
        if channel == 1 {
            let mut state = self.state.borrow_mut();
            state.frequency_hz = frequency_hz;
            state.waveform = waveform;
            state.amplitude_vpp = amplitude_vpp;
            state.offset_v = offset_v;
        }
        Ok(())
    }
}
pub struct SimulatedScope {
    state: Rc<RefCell<BenchState>>,
}
impl SimulatedScope {
    fn open_state(&self) -> Result<std::cell::RefMut<'_, BenchState>, BodeError> {
        let state = self.state.borrow_mut();
        if state.closed {
            return Err(BodeError::Instrument("oscilloscope handle is closed".into()));
        }
        Ok(state)
    }
}
impl Oscilloscope for SimulatedScope {
    fn configure(&mut self, num_channels: u8) -> Result<(), BodeError> {
        if !(1..=2).contains(&num_channels) {
            return Err(BodeError::Instrument(format!(
                "cannot enable {num_channels} channels"
            )));
        }
        self.open_state()?.channels = num_channels;
        Ok(())
    }
    fn set_channel_range(&mut self, channel: u8, range: u8) -> Result<(), BodeError> {
        check_channel(channel)?;
        if ![1, 2, 5, 10].contains(&range) {
            return Err(BodeError::Instrument(format!("unsupported voltage range {range}")));
        }
        self.open_state()?.ranges[channel as usize - 1] = range;
        Ok(())
    }
    fn set_channel_coupling(&mut self, channel: u8, coupling: Coupling) -> Result<(), BodeError> {
        check_channel(channel)?;
        self.open_state()?.couplings[channel as usize - 1] = coupling;
        Ok(())
    }
    fn set_sample_rate(&mut self, rate_id: u8) -> Result<(), BodeError> {
        if SampleRate::from_id(rate_id).is_none() {
            return Err(BodeError::Instrument(format!("unknown sample rate id {rate_id}")));
        }
        self.open_state()?.rate_id = Some(rate_id);
        Ok(())
    }
    fn capture(&mut self, sample_count: usize) -> Result<(Vec<u8>, Vec<u8>), BodeError> {
        let mut state = self.open_state()?;
        if state.channels != 2 {
            return Err(BodeError::Instrument("scope is not configured for two channels".into()));
        }
        let rate = state
            .rate_id
            .and_then(SampleRate::from_id)
            .ok_or_else(|| BodeError::Instrument("sample rate not set".into()))?;
        let dt = 1.0 / rate.hz();
        let response = state.filter.response(state.frequency_hz);
        let (gain, shift) = (response.norm(), response.arg());
        // The generator runs freely; every capture starts at a new phase.
        let phi = state.rng.gen_range(0.0..2.0 * PI);
        let [range1, range2] = state.ranges;
        let mut ch1 = Vec::with_capacity(sample_count);
        let mut ch2 = Vec::with_capacity(sample_count);
        for i in 0..sample_count {
            let t = i as f64 * dt;
            let input = state.excitation(t, phi);
            let ac_output = gain * (state.excitation(t, phi + shift) - state.offset_v);
            let dc_output = match state.filter {
                FilterModel::HighPass { .. } => 0.0,
                _ => state.offset_v,
            };
            let mut v1 = ac_output + dc_output + state.noise();
            let mut v2 = input + state.noise();
            if state.couplings[0] == Coupling::Ac {
                v1 -= dc_output;
            }
            if state.couplings[1] == Coupling::Ac {
                v2 -= state.offset_v;
            }
            ch1.push(volts_to_code(v1, range1));
            ch2.push(volts_to_code(v2, range2));
        }
        state.captures += 1;
        Ok((ch1, ch2))
    }
    fn close(&mut self) -> Result<(), BodeError> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(BodeError::Instrument("oscilloscope handle already closed".into()));
        }
        state.closed = true;
        Ok(())
    }
}
