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
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    encoder::quantize_8bit,
    generator::sample_count,
    protocol::{self, ProtocolError, SampleRequest, MAX_REQUEST_SIZE},
    slot::GeneratorSlot,
};

/// The reasons a connection stops being served.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

/// Serves sample requests on a single connection until the peer disconnects or sends
/// a malformed request. Requests are handled strictly one after another, and a request
/// for more than `max_samples` samples is treated as malformed.
///
/// There are no read or write timeouts. A peer that never sends a request, or that
/// stops reading responses, keeps this connection open indefinitely.
pub async fn handle<S>(
    mut stream: S,
    slot: &GeneratorSlot,
    max_samples: usize,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; MAX_REQUEST_SIZE];

    loop {
        let size = stream.read(&mut buf).await?;
        if size == 0 {
            debug!("Peer closed the connection.");
            return Ok(());
        }

        let request = SampleRequest::from_bytes(&buf[..size])?;
        let frame = respond(request, slot, max_samples).await?;

        // Prefix and payload go out from a single buffer. A frame is only cut short if
        // the peer goes away mid write.
        stream.write_all(&frame).await?;
        stream.flush().await?;
    }
}

/// Generates and frames the response to a single request.
///
/// The active generator is read from the slot exactly once, so a generator swapped in
/// while this request is being sampled does not affect it. The sample count is checked
/// against `max_samples` before anything is allocated.
pub async fn respond(
    request: SampleRequest,
    slot: &GeneratorSlot,
    max_samples: usize,
) -> Result<Vec<u8>, ConnectionError> {
    let count = sample_count(request.period, request.sampling_frequency);
    if count > max_samples {
        return Err(ProtocolError::TooManySamples {
            count,
            max: max_samples,
        }
        .into());
    }
    if u32::try_from(count).is_err() {
        return Err(ProtocolError::FrameTooLarge(count).into());
    }

    let generator = slot.snapshot();
    info!(
        method = request.method,
        period = request.period,
        frequency = request.sampling_frequency,
        signal = generator.name(),
        "Data request."
    );

    // Sampling is CPU bound, so it stays off the I/O workers. Samples are quantized
    // straight into the frame buffer.
    let frame = tokio::task::spawn_blocking(move || {
        let samples = generator.samples(request.period, request.sampling_frequency);
        protocol::encode_frame_from(samples.map(quantize_8bit))
    })
    .await
    .map_err(io::Error::other)??;

    Ok(frame)
}
