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
use rand::Rng;

use super::{
    check_frequency, expect_params, parse_param, sample_count, Generator, GeneratorError, Samples,
};

pub(super) const NAME: &str = "pwm";

/// A square wave with a configurable duty cycle. Every call starts at a random
/// position within the cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pwm {
    /// The signal frequency in Hz.
    frequency: f64,
    /// The fraction of each cycle spent high.
    duty: f64,
}

impl Pwm {
    /// Creates a new PWM generator. The frequency must be positive and the duty cycle
    /// within [0, 1].
    pub fn new(frequency: f64, duty: f64) -> Result<Pwm, GeneratorError> {
        let frequency = check_frequency(frequency)?;
        if !(0.0..=1.0).contains(&duty) {
            return Err(GeneratorError::InvalidDuty(duty));
        }

        Ok(Pwm { frequency, duty })
    }

    pub(super) fn from_params(params: &[&str]) -> Result<Generator, GeneratorError> {
        expect_params(NAME, params, 2)?;
        Ok(Generator::Pwm(Pwm::new(
            parse_param("frequency", params[0])?,
            parse_param("duty", params[1])?,
        )?))
    }

    /// The signal frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// The duty cycle.
    pub fn duty(&self) -> f64 {
        self.duty
    }

    /// The number of samples in one cycle at the given sampling frequency, along with
    /// how many of them are high. Returns None if a cycle is shorter than one sample.
    pub fn cycle(&self, sampling_frequency: f64) -> Option<(u64, u64)> {
        let length = (sampling_frequency / self.frequency).floor();
        if length.is_nan() || length < 1.0 {
            return None;
        }

        let length = length as u64;
        let high = ((length as f64 * self.duty).floor() as u64).min(length);
        Some((length, high))
    }

    pub(super) fn samples<R: Rng>(
        &self,
        period: f64,
        sampling_frequency: f64,
        rng: &mut R,
    ) -> Samples {
        let count = sample_count(period, sampling_frequency);

        // Too fast to resolve a single cycle, hold the signal high.
        let Some((length, high)) = self.cycle(sampling_frequency) else {
            return Samples::constant(count, 1.0);
        };

        // Reading the repeated pattern from a random offset in [0, length] is the
        // same as indexing it modulo the cycle length, so no buffer is built.
        Samples::square(count, rng.gen_range(0..=length), length, high)
    }
}
