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

use tokio::{
    io::AsyncWriteExt,
    net::{TcpStream, ToSocketAddrs},
};

use crate::protocol::{read_frame, SampleRequest};

/// A client for a running sample server.
pub struct Client {
    stream: TcpStream,
}

impl Client {
    /// Connects to the sample server at the given address.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Client> {
        Ok(Client {
            stream: TcpStream::connect(addr).await?,
        })
    }

    /// Sends a request and waits for its payload.
    pub async fn request(&mut self, request: &SampleRequest) -> io::Result<Vec<u8>> {
        self.stream
            .write_all(request.to_string().as_bytes())
            .await?;
        read_frame(&mut self.stream).await
    }
}
