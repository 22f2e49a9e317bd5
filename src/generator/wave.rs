// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::f64::consts::TAU;

use rand::Rng;

use super::{
    check_frequency, expect_params, parse_param, sample_count, Generator, GeneratorError, Samples,
};

pub(super) const NAME: &str = "wave";

/// A sine wave shifted and scaled into [0, 1], starting at a random phase on every
/// call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    /// The signal frequency in Hz.
    frequency: f64,
}

impl Wave {
    /// Creates a new wave. The frequency must be positive.
    pub fn new(frequency: f64) -> Result<Wave, GeneratorError> {
        Ok(Wave {
            frequency: check_frequency(frequency)?,
        })
    }

    pub(super) fn from_params(params: &[&str]) -> Result<Generator, GeneratorError> {
        expect_params(NAME, params, 1)?;
        Ok(Generator::Wave(Wave::new(parse_param(
            "frequency",
            params[0],
        )?)?))
    }

    /// The signal frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub(super) fn samples<R: Rng>(
        &self,
        period: f64,
        sampling_frequency: f64,
        rng: &mut R,
    ) -> Samples {
        Samples::sine(
            sample_count(period, sampling_frequency),
            rng.gen_range(0.0..TAU),
            self.frequency,
            sampling_frequency,
        )
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::Wave;

    #[test]
    fn test_wave_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for (frequency, sampling_frequency) in
            [(440.0, 44100.0), (1.0, 3.0), (5000.0, 1000.0), (0.001, 10.0)]
        {
            let wave = Wave::new(frequency).unwrap();
            let samples = wave.samples(0.5, sampling_frequency, &mut rng).collect::<Vec<f64>>();
            assert!(samples.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_wave_441_samples() {
        let wave = Wave::new(440.0).unwrap();
        let samples = wave.samples(0.01, 44100.0, &mut rand::thread_rng()).collect::<Vec<f64>>();
        assert_eq!(441, samples.len());
        assert!(samples.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_wave_follows_sine() {
        // A quarter of the sampling frequency advances the phase by pi/2 each sample.
        let wave = Wave::new(250.0).unwrap();
        let samples = wave
            .samples(0.004, 1000.0, &mut StdRng::seed_from_u64(3))
            .collect::<Vec<f64>>();
        assert_eq!(4, samples.len());

        // Opposite quarters of the cycle mirror around mid scale.
        assert!((samples[0] + samples[2] - 1.0).abs() < 1e-9);
        assert!((samples[1] + samples[3] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wave_phase_is_random() {
        let wave = Wave::new(10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let first = wave.samples(0.1, 1000.0, &mut rng).collect::<Vec<f64>>();
        let second = wave.samples(0.1, 1000.0, &mut rng).collect::<Vec<f64>>();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wave_rejects_bad_frequency() {
        assert!(Wave::new(0.0).is_err());
        assert!(Wave::new(-3.0).is_err());
        assert!(Wave::new(f64::INFINITY).is_err());
        assert!(Wave::new(f64::NAN).is_err());
    }
}
