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
use super::{expect_params, sample_count, Generator, GeneratorError, Samples};

pub(super) const NAME: &str = "direct";

/// A flat signal sitting at mid scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Direct;

impl Direct {
    /// The level every direct sample takes.
    pub const LEVEL: f64 = 0.5;

    pub(super) fn from_params(params: &[&str]) -> Result<Generator, GeneratorError> {
        expect_params(NAME, params, 0)?;
        Ok(Generator::Direct(Direct))
    }

    pub(super) fn samples(&self, period: f64, sampling_frequency: f64) -> Samples {
        Samples::constant(sample_count(period, sampling_frequency), Self::LEVEL)
    }
}
