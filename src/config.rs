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
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::{generator::Generator, protocol::DEFAULT_MAX_SAMPLES};

use self::error::ConfigError;

pub mod error;

/// The default host to listen on.
pub const DEFAULT_HOST: &str = "localhost";
/// The default port to listen on.
pub const DEFAULT_PORT: u16 = 5003;
/// The signal active when the server starts.
pub const DEFAULT_GENERATOR: &str = "direct";

/// The configuration for the sample server.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Server {
    /// The host to listen on.
    host: String,
    /// The port to listen on.
    port: u16,
    /// The initial signal, as a control line (e.g. `pwm,100,0.5`).
    generator: String,
    /// The most samples a single request may ask for.
    max_samples: usize,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            generator: DEFAULT_GENERATOR.to_string(),
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl Server {
    /// Creates a new server configuration.
    pub fn new(host: &str, port: u16, generator: &str) -> Server {
        Server {
            host: host.to_string(),
            port,
            generator: generator.to_string(),
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    /// Parse a server configuration from a file. The format is picked from the
    /// file extension.
    pub fn deserialize(path: &Path) -> Result<Server, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Server>()?)
    }

    /// Replaces any values given on the command line.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        generator: Option<String>,
        max_samples: Option<usize>,
    ) -> Server {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(generator) = generator {
            self.generator = generator;
        }
        if let Some(max_samples) = max_samples {
            self.max_samples = max_samples;
        }
        self
    }

    /// Gets the host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Gets the port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gets the per-request sample limit.
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// The address to listen on, in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the initial generator.
    pub fn generator(&self) -> Result<Generator, ConfigError> {
        Ok(self.generator.parse()?)
    }
}
