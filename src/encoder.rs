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
use std::{fmt, str::FromStr};

/// The ways a sequence of normalized samples can be turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// One byte per sample, scaled to 0-255. This is what the sample server sends.
    #[default]
    EightBit,
    /// Comma terminated ASCII decimal values.
    Comma,
}

impl Encoding {
    /// Encodes the given samples.
    pub fn encode(&self, samples: &[f64]) -> Vec<u8> {
        match self {
            Encoding::EightBit => encode_8bit(samples),
            Encoding::Comma => encode_comma(samples),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "8bit" | "8-bit" | "eightbit" => Ok(Encoding::EightBit),
            "comma" => Ok(Encoding::Comma),
            other => Err(format!("unknown encoding '{}'", other)),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::EightBit => write!(f, "8bit"),
            Encoding::Comma => write!(f, "comma"),
        }
    }
}

/// Quantizes a single sample to a byte. Values are truncated, not rounded.
#[inline]
pub fn quantize_8bit(value: f64) -> u8 {
    if value < 0.0 {
        0x00
    } else if value >= 1.0 {
        0xFF
    } else {
        // NaN falls through to here and casts to 0.
        (value * 255.0) as u8
    }
}

/// Encodes samples as one byte each.
pub fn encode_8bit(samples: &[f64]) -> Vec<u8> {
    samples.iter().copied().map(quantize_8bit).collect()
}

/// Encodes samples as comma terminated ASCII, e.g. `0.5,1,0,`.
pub fn encode_comma(samples: &[f64]) -> Vec<u8> {
    samples
        .iter()
        .map(|value| format!("{},", value))
        .collect::<String>()
        .into_bytes()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_quantize_8bit() {
        assert_eq!(0x7F, quantize_8bit(0.5));
        assert_eq!(0x00, quantize_8bit(0.0));
        assert_eq!(0x00, quantize_8bit(-0.2));
        assert_eq!(0xFF, quantize_8bit(1.0));
        assert_eq!(0xFF, quantize_8bit(3.0));
        assert_eq!(0xFE, quantize_8bit(0.999));
        assert_eq!(0x00, quantize_8bit(f64::NAN));
        // 0.9 * 255 = 229.5, which truncates.
        assert_eq!(229, quantize_8bit(0.9));
    }

    #[test]
    fn test_encode_8bit() {
        assert_eq!(vec![0x7F; 3], encode_8bit(&[0.5, 0.5, 0.5]));
        assert_eq!(
            vec![0xFF, 0x00, 0xFF, 0x00],
            encode_8bit(&[1.0, 0.0, 1.0, 0.0])
        );
        assert!(encode_8bit(&[]).is_empty());
    }

    #[test]
    fn test_encode_comma() {
        assert_eq!(b"0.5,1,0,".to_vec(), encode_comma(&[0.5, 1.0, 0.0]));
        assert!(encode_comma(&[]).is_empty());
    }

    #[test]
    fn test_encoding_dispatch() {
        assert_eq!(vec![0x7F], Encoding::default().encode(&[0.5]));
        assert_eq!(b"0.5,".to_vec(), Encoding::Comma.encode(&[0.5]));
        assert_eq!(Ok(Encoding::Comma), "Comma".parse());
        assert_eq!(Ok(Encoding::EightBit), "8bit".parse());
        assert!("base64".parse::<Encoding>().is_err());
    }
}
