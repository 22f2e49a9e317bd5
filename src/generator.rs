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

//! Signal generators. Each generator turns a period and sampling frequency into a
//! sequence of normalized samples in [0, 1].

use std::{f64::consts::TAU, fmt, ops::Range, str::FromStr};

use rand::Rng;

mod direct;
mod pwm;
mod wave;

pub use direct::Direct;
pub use pwm::Pwm;
pub use wave::Wave;

/// Errors produced while building a generator from a control line.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    #[error("unknown shape '{0}'")]
    UnknownShape(String),

    #[error("shape '{shape}' takes {expected} parameter(s), got {actual}")]
    ParameterCount {
        shape: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {name} '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("frequency must be a positive number, got {0}")]
    InvalidFrequency(f64),

    #[error("duty must be within [0, 1], got {0}")]
    InvalidDuty(f64),
}

type Constructor = fn(&[&str]) -> Result<Generator, GeneratorError>;

/// Maps control line shape names to generator constructors.
const REGISTRY: &[(&str, Constructor)] = &[
    (direct::NAME, Direct::from_params),
    (wave::NAME, Wave::from_params),
    (pwm::NAME, Pwm::from_params),
];

/// The set of available signal generators.
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    Direct(Direct),
    Wave(Wave),
    Pwm(Pwm),
}

impl Default for Generator {
    fn default() -> Self {
        Generator::Direct(Direct)
    }
}

impl Generator {
    /// The shape name this generator is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Direct(_) => direct::NAME,
            Generator::Wave(_) => wave::NAME,
            Generator::Pwm(_) => pwm::NAME,
        }
    }

    /// Samples the generator for the given period (seconds) at the given sampling
    /// frequency (Hz). Randomness is drawn from the calling thread's RNG, so the
    /// same generator may be sampled from any number of threads at once.
    pub fn sample(&self, period: f64, sampling_frequency: f64) -> Vec<f64> {
        self.samples(period, sampling_frequency).collect()
    }

    /// Samples the generator using the given random source for phase offsets.
    pub fn sample_with_rng<R: Rng>(
        &self,
        period: f64,
        sampling_frequency: f64,
        rng: &mut R,
    ) -> Vec<f64> {
        self.samples_with_rng(period, sampling_frequency, rng)
            .collect()
    }

    /// Lazily produces the samples for the given period and sampling frequency. The
    /// random offset is drawn up front, so the iterator holds no reference to the RNG.
    pub fn samples(&self, period: f64, sampling_frequency: f64) -> Samples {
        self.samples_with_rng(period, sampling_frequency, &mut rand::thread_rng())
    }

    /// Lazily produces samples using the given random source for phase offsets.
    pub fn samples_with_rng<R: Rng>(
        &self,
        period: f64,
        sampling_frequency: f64,
        rng: &mut R,
    ) -> Samples {
        match self {
            Generator::Direct(signal) => signal.samples(period, sampling_frequency),
            Generator::Wave(signal) => signal.samples(period, sampling_frequency, rng),
            Generator::Pwm(signal) => signal.samples(period, sampling_frequency, rng),
        }
    }
}

/// The samples of a single request, computed one at a time.
#[derive(Debug, Clone)]
pub struct Samples {
    indices: Range<usize>,
    shape: Shape,
}

#[derive(Debug, Clone)]
enum Shape {
    Constant(f64),
    Sine {
        offset: f64,
        frequency: f64,
        sampling_frequency: f64,
    },
    Square {
        offset: u128,
        length: u128,
        high: u128,
    },
}

impl Samples {
    pub(crate) fn constant(count: usize, level: f64) -> Samples {
        Samples {
            indices: 0..count,
            shape: Shape::Constant(level),
        }
    }

    pub(crate) fn sine(
        count: usize,
        offset: f64,
        frequency: f64,
        sampling_frequency: f64,
    ) -> Samples {
        Samples {
            indices: 0..count,
            shape: Shape::Sine {
                offset,
                frequency,
                sampling_frequency,
            },
        }
    }

    /// A square wave of `high` ones followed by `length - high` zeros, read from
    /// `offset`. `length` must be non-zero.
    pub(crate) fn square(count: usize, offset: u64, length: u64, high: u64) -> Samples {
        Samples {
            indices: 0..count,
            shape: Shape::Square {
                offset: offset as u128,
                length: length as u128,
                high: high as u128,
            },
        }
    }
}

impl Iterator for Samples {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let i = self.indices.next()?;
        Some(match self.shape {
            Shape::Constant(level) => level,
            Shape::Sine {
                offset,
                frequency,
                sampling_frequency,
            } => (offset + TAU * i as f64 * frequency / sampling_frequency).sin() * 0.5 + 0.5,
            Shape::Square {
                offset,
                length,
                high,
            } => {
                if (offset + i as u128) % length < high {
                    1.0
                } else {
                    0.0
                }
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl ExactSizeIterator for Samples {}

impl FromStr for Generator {
    type Err = GeneratorError;

    /// Parses a control line of the form `shape,param1,param2,...`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split(',').map(str::trim);
        let shape = fields.next().unwrap_or_default().to_lowercase();
        let params: Vec<&str> = fields.collect();

        match REGISTRY.iter().find(|(name, _)| *name == shape) {
            Some((_, constructor)) => constructor(&params),
            None => Err(GeneratorError::UnknownShape(shape)),
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generator::Direct(_) => write!(f, "{}", direct::NAME),
            Generator::Wave(signal) => write!(f, "{},{}", wave::NAME, signal.frequency()),
            Generator::Pwm(signal) => {
                write!(f, "{},{},{}", pwm::NAME, signal.frequency(), signal.duty())
            }
        }
    }
}

/// The number of samples covering the given period: floor(period * sampling_frequency).
pub fn sample_count(period: f64, sampling_frequency: f64) -> usize {
    let count = (period * sampling_frequency).floor();
    if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    }
}

/// Checks the parameter count for a shape.
fn expect_params(
    shape: &'static str,
    params: &[&str],
    expected: usize,
) -> Result<(), GeneratorError> {
    if params.len() != expected {
        return Err(GeneratorError::ParameterCount {
            shape,
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}

/// Parses a single numeric parameter.
fn parse_param(name: &'static str, value: &str) -> Result<f64, GeneratorError> {
    value
        .parse::<f64>()
        .map_err(|_| GeneratorError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

/// Validates a signal frequency.
fn check_frequency(frequency: f64) -> Result<f64, GeneratorError> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(frequency)
    } else {
        Err(GeneratorError::InvalidFrequency(frequency))
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_sample_count() {
        assert_eq!(1, sample_count(0.001, 1000.0));
        assert_eq!(10, sample_count(0.01, 1000.0));
        assert_eq!(441, sample_count(0.01, 44100.0));
        assert_eq!(2, sample_count(0.5, 5.0));
        assert_eq!(0, sample_count(0.0001, 1000.0));
        assert_eq!(0, sample_count(f64::NAN, 1000.0));
        assert_eq!(0, sample_count(-1.0, 1000.0));
    }

    #[test]
    fn test_every_variant_has_floor_length() {
        let generators = vec![
            Generator::default(),
            "wave,440".parse::<Generator>().unwrap(),
            "pwm,100,0.5".parse::<Generator>().unwrap(),
            "pwm,5000,0.3".parse::<Generator>().unwrap(),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        for generator in generators.iter() {
            for (period, frequency) in [(0.001, 1000.0), (0.25, 8000.0), (1.5, 33.3), (0.01, 44100.0)]
            {
                let samples = generator.sample_with_rng(period, frequency, &mut rng);
                assert_eq!(
                    sample_count(period, frequency),
                    samples.len(),
                    "{} produced the wrong length",
                    generator
                );
                assert!(samples.iter().all(|v| (0.0..=1.0).contains(v)));
            }
        }
    }

    #[test]
    fn test_samples_are_lazy() {
        // Half a billion samples, which are never materialized.
        for line in ["direct", "wave,440", "pwm,100,0.5"] {
            let generator: Generator = line.parse().unwrap();
            let mut samples = generator.samples(500.0, 1_000_000.0);
            assert_eq!(500_000_000, samples.len());
            assert!(samples.next().is_some());
            assert_eq!(499_999_999, samples.len());
        }
    }

    #[test]
    fn test_samples_match_collected_samples() {
        let generator: Generator = "wave,50".parse().unwrap();
        let lazy: Vec<f64> = generator
            .samples_with_rng(0.1, 1000.0, &mut StdRng::seed_from_u64(9))
            .collect();
        let collected = generator.sample_with_rng(0.1, 1000.0, &mut StdRng::seed_from_u64(9));
        assert_eq!(lazy, collected);
    }

    #[test]
    fn test_parse_registry() {
        assert_eq!(Generator::Direct(Direct), "direct".parse::<Generator>().unwrap());
        assert_eq!(
            Generator::Wave(Wave::new(440.0).unwrap()),
            "wave,440".parse::<Generator>().unwrap()
        );
        assert_eq!(
            Generator::Pwm(Pwm::new(100.0, 0.5).unwrap()),
            " PWM, 100 ,0.5 ".parse::<Generator>().unwrap()
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Err(GeneratorError::UnknownShape("bogus".to_string())),
            "bogus,1,2".parse::<Generator>()
        );
        assert_eq!(
            Err(GeneratorError::UnknownShape("".to_string())),
            "".parse::<Generator>()
        );
        assert_eq!(
            Err(GeneratorError::ParameterCount {
                shape: "wave",
                expected: 1,
                actual: 0
            }),
            "wave".parse::<Generator>()
        );
        assert_eq!(
            Err(GeneratorError::ParameterCount {
                shape: "direct",
                expected: 0,
                actual: 1
            }),
            "direct,5".parse::<Generator>()
        );
        assert_eq!(
            Err(GeneratorError::InvalidNumber {
                name: "frequency",
                value: "abc".to_string()
            }),
            "wave,abc".parse::<Generator>()
        );
        assert_eq!(
            Err(GeneratorError::InvalidFrequency(0.0)),
            "pwm,0,0.5".parse::<Generator>()
        );
        assert_eq!(
            Err(GeneratorError::InvalidDuty(1.5)),
            "pwm,10,1.5".parse::<Generator>()
        );
    }

    #[test]
    fn test_display_round_trips_control_line() {
        for line in ["direct", "wave,440", "pwm,100,0.5", "pwm,2.5,0.125"] {
            let generator: Generator = line.parse().unwrap();
            assert_eq!(line, generator.to_string());
            assert_eq!(generator, generator.to_string().parse::<Generator>().unwrap());
        }
    }

    #[test]
    fn test_concurrent_sampling_of_one_instance() {
        let generator = std::sync::Arc::new("pwm,100,0.5".parse::<Generator>().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let samples = generator.sample(0.01, 1000.0);
                        assert_eq!(10, samples.len());
                        assert_eq!(5, samples.iter().filter(|v| **v == 1.0).count());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("sampling thread panicked");
        }
    }
}
