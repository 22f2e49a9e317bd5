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
use std::{io, net::SocketAddr, time::Duration};

use tokio::{
    net::{TcpListener, ToSocketAddrs},
    task::JoinHandle,
};
use tracing::{error, info, info_span, warn, Instrument};

use crate::{protocol::DEFAULT_MAX_SAMPLES, slot::GeneratorSlot};

use self::connection::ConnectionError;

pub mod connection;

/// How long to wait before accepting again after an accept error.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts sample clients and serves each one on its own task.
pub struct Server {
    /// The bound listener.
    listener: TcpListener,
    /// The generator shared with the configurator.
    slot: GeneratorSlot,
    /// The most samples a single request may ask for.
    max_samples: usize,
}

impl Server {
    /// Binds the server to the given address.
    pub async fn bind<A: ToSocketAddrs>(addr: A, slot: GeneratorSlot) -> io::Result<Server> {
        Ok(Server {
            listener: TcpListener::bind(addr).await?,
            slot,
            max_samples: DEFAULT_MAX_SAMPLES,
        })
    }

    /// Sets the most samples a single request may ask for. Larger requests close the
    /// connection without a response.
    pub fn with_max_samples(mut self, max_samples: usize) -> Server {
        self.max_samples = max_samples;
        self
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts serving on a background task.
    pub fn start(self) -> JoinHandle<io::Result<()>> {
        tokio::spawn(self.serve())
    }

    /// Accepts connections forever. A failure on one connection never stops the
    /// server or any other connection.
    pub async fn serve(self) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "Sample server started.");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(err = e.to_string(), "Error accepting connection.");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let slot = self.slot.clone();
            let max_samples = self.max_samples;
            tokio::spawn(
                async move {
                    info!("Client connected.");
                    match connection::handle(stream, &slot, max_samples).await {
                        Ok(()) => info!("Client disconnected."),
                        Err(ConnectionError::Protocol(e)) => {
                            warn!(err = e.to_string(), "Malformed request, closing connection.")
                        }
                        Err(ConnectionError::Transport(e)) => {
                            warn!(err = e.to_string(), "Connection failed.")
                        }
                    }
                }
                .instrument(info_span!("connection", %peer)),
            );
        }
    }
}
