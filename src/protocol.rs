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

//! The sample request/response wire protocol.
//!
//! A request is a single ASCII write of `<method>,<period>,<frequency>`. The response
//! is a four byte big-endian length followed by exactly that many payload bytes.

use std::{fmt, io, str::FromStr};

use tokio::io::{AsyncRead, AsyncReadExt};

/// The largest request read from a connection in one go.
pub const MAX_REQUEST_SIZE: usize = 1024;

/// The size of the response length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// The default cap on samples in a single response (16 MiB of payload).
pub const DEFAULT_MAX_SAMPLES: usize = 1 << 24;

/// Errors produced while parsing requests or framing responses.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("request is not ASCII text")]
    NotAscii,

    #[error("request must have 3 comma separated fields, got {0}")]
    FieldCount(usize),

    #[error("invalid {name} '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be a positive number, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("request for {count} samples exceeds the limit of {max}")]
    TooManySamples { count: usize, max: usize },

    #[error("payload of {0} bytes does not fit in a frame")]
    FrameTooLarge(usize),
}

/// A request for samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    /// Reserved. Parsed and logged, but does not change the response encoding.
    pub method: String,
    /// The period to sample, in seconds.
    pub period: f64,
    /// The sampling frequency, in Hz.
    pub sampling_frequency: f64,
}

impl SampleRequest {
    /// Creates a new request.
    pub fn new(method: &str, period: f64, sampling_frequency: f64) -> SampleRequest {
        SampleRequest {
            method: method.to_string(),
            period,
            sampling_frequency,
        }
    }

    /// Parses a request from the raw bytes of a single read.
    pub fn from_bytes(bytes: &[u8]) -> Result<SampleRequest, ProtocolError> {
        if !bytes.is_ascii() {
            return Err(ProtocolError::NotAscii);
        }
        // ASCII is always valid UTF-8.
        std::str::from_utf8(bytes)
            .map_err(|_| ProtocolError::NotAscii)?
            .parse()
    }
}

impl FromStr for SampleRequest {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 3 {
            return Err(ProtocolError::FieldCount(fields.len()));
        }

        Ok(SampleRequest {
            method: fields[0].trim().to_string(),
            period: parse_positive("period", fields[1])?,
            sampling_frequency: parse_positive("frequency", fields[2])?,
        })
    }
}

impl fmt::Display for SampleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.method, self.period, self.sampling_frequency
        )
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<f64, ProtocolError> {
    let value = value.trim();
    let parsed = value
        .parse::<f64>()
        .map_err(|_| ProtocolError::InvalidNumber {
            name,
            value: value.to_string(),
        })?;

    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(ProtocolError::NotPositive {
            name,
            value: parsed,
        })
    }
}

/// Builds a complete response frame in a single buffer so it can be written in one go.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    encode_frame_from(payload.iter().copied())
}

/// Builds a response frame directly from a byte iterator, so the payload is never
/// held in a separate buffer.
pub fn encode_frame_from<I>(payload: I) -> Result<Vec<u8>, ProtocolError>
where
    I: ExactSizeIterator<Item = u8>,
{
    let size = payload.len();
    let length = u32::try_from(size).map_err(|_| ProtocolError::FrameTooLarge(size))?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + size);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend(payload);
    Ok(frame)
}

/// Reads a single response frame and returns its payload.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, io::Error>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await?;

    let mut payload = vec![0u8; u32::from_be_bytes(prefix) as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

#[cfg(test)]
mod test {
    use crate::encoder::quantize_8bit;

    use super::*;

    #[test]
    fn test_parse_request() {
        assert_eq!(
            SampleRequest::new("x", 0.001, 1000.0),
            "x,0.001,1000".parse::<SampleRequest>().unwrap()
        );
        assert_eq!(
            SampleRequest::new("8bit", 0.5, 44100.0),
            SampleRequest::from_bytes(b"8bit, 0.5 ,44100\n").unwrap()
        );
        assert_eq!(SampleRequest::new("", 1.0, 1.0), ",1,1".parse::<SampleRequest>().unwrap());
    }

    #[test]
    fn test_parse_request_errors() {
        assert_eq!(
            Err(ProtocolError::FieldCount(2)),
            "x,0.001".parse::<SampleRequest>()
        );
        assert_eq!(
            Err(ProtocolError::FieldCount(4)),
            "x,0.001,1000,1".parse::<SampleRequest>()
        );
        assert_eq!(
            Err(ProtocolError::InvalidNumber {
                name: "period",
                value: "soon".to_string()
            }),
            "x,soon,1000".parse::<SampleRequest>()
        );
        assert_eq!(
            Err(ProtocolError::NotPositive {
                name: "frequency",
                value: 0.0
            }),
            "x,1,0".parse::<SampleRequest>()
        );
        assert!(matches!(
            "x,inf,1000".parse::<SampleRequest>(),
            Err(ProtocolError::NotPositive { name: "period", .. })
        ));
        assert_eq!(
            Err(ProtocolError::NotAscii),
            SampleRequest::from_bytes("x,1,1\u{e9}".as_bytes())
        );
    }

    #[test]
    fn test_encode_frame() {
        assert_eq!(vec![0, 0, 0, 1, 0x7F], encode_frame(&[0x7F]).unwrap());
        assert_eq!(vec![0, 0, 0, 0], encode_frame(&[]).unwrap());

        let payload = vec![0xAB; 300];
        let frame = encode_frame(&payload).unwrap();
        assert_eq!([0, 0, 1, 44], frame[..4]);
        assert_eq!(payload, frame[4..]);
    }

    #[test]
    fn test_encode_frame_from_iterator() {
        let frame = encode_frame_from([0.5, 1.0, 0.0].into_iter().map(quantize_8bit)).unwrap();
        assert_eq!(vec![0, 0, 0, 3, 0x7F, 0xFF, 0x00], frame);
    }

    #[tokio::test]
    async fn test_read_frame() {
        let payload: Vec<u8> = (0..=255).collect();
        let mut frame = encode_frame(&payload).unwrap();
        // Trailing bytes belong to the next frame and must not be consumed.
        frame.extend_from_slice(&[0, 0, 0, 0]);

        let mut reader = frame.as_slice();
        assert_eq!(payload, read_frame(&mut reader).await.unwrap());
        assert!(read_frame(&mut reader).await.unwrap().is_empty());
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_read_truncated_frame() {
        let mut reader: &[u8] = &[0, 0, 0, 5, 1, 2];
        let err = read_frame(&mut reader).await.unwrap_err();
        assert_eq!(io::ErrorKind::UnexpectedEof, err.kind());
    }
}
