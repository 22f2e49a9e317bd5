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
use clap::{crate_version, Parser, Subcommand};
use siggen::client::Client;
use siggen::configurator::Configurator;
use siggen::encoder::Encoding;
use siggen::generator::Generator;
use siggen::protocol::SampleRequest;
use siggen::server::Server;
use siggen::slot::GeneratorSlot;
use siggen::{config, util};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

const SYSTEMD_SERVICE: &str = r#"
[Unit]
Description=test signal sample server

[Service]
Type=simple
Restart=on-failure
EnvironmentFile=-/etc/default/siggen
ExecStart=/usr/local/bin/siggen start --config "$SIGGEN_CONFIG"

[Install]
WantedBy=multi-user.target
Alias=siggen.service
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A test signal sample server."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts the sample server. Signal definitions are read from stdin, one per line.
    Start {
        /// The path to the server config.
        #[arg[short, long]]
        config: Option<String>,
        /// The host to listen on.
        #[arg[long]]
        host: Option<String>,
        /// The port to listen on.
        #[arg[short, long]]
        port: Option<u16>,
        /// The initial signal. Should be in the form <SHAPE>,<PARAM>,...
        /// For example, pwm,100,0.5.
        #[arg[short, long]]
        generator: Option<String>,
        /// The most samples a single request may ask for.
        #[arg[long]]
        max_samples: Option<usize>,
    },
    /// Generates one set of samples locally and prints them.
    Sample {
        /// The signal to sample. Should be in the form <SHAPE>,<PARAM>,...
        generator: String,
        /// The period to sample, in seconds.
        period: f64,
        /// The sampling frequency, in Hz.
        frequency: f64,
        /// The encoding to print (8bit or comma).
        #[arg[short, long, default_value = "8bit"]]
        encoding: Encoding,
    },
    /// Requests samples from a running server and prints the payload.
    Request {
        /// The server address, e.g. localhost:5003.
        addr: String,
        /// The period to sample, in seconds.
        period: f64,
        /// The sampling frequency, in Hz.
        frequency: f64,
        /// The request method.
        #[arg[short, long, default_value = "8bit"]]
        method: String,
    },
    /// Prints a systemd service definition to stdout.
    Systemd {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            config,
            host,
            port,
            generator,
            max_samples,
        } => {
            let server_config = match config {
                Some(path) => config::Server::deserialize(&PathBuf::from(path))?,
                None => config::Server::default(),
            }
            .with_overrides(host, port, generator, max_samples);

            let slot = GeneratorSlot::new(server_config.generator()?);
            let server = Server::bind(server_config.addr(), slot.clone())
                .await?
                .with_max_samples(server_config.max_samples());
            let server_handle = server.start();

            // Losing the control channel leaves the server running with the last signal.
            let configurator_handle = Configurator::new(slot).run();
            tokio::spawn(async move {
                match configurator_handle.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!(err = e.to_string(), "Configurator failed."),
                    Err(e) => error!(err = e.to_string(), "Configurator task failed."),
                }
            });

            server_handle.await??;
        }
        Commands::Sample {
            generator,
            period,
            frequency,
            encoding,
        } => {
            let generator: Generator = generator.parse()?;
            let payload = encoding.encode(&generator.sample(period, frequency));

            match encoding {
                Encoding::EightBit => println!("{}", util::hex_string(&payload)),
                Encoding::Comma => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&payload)?;
                    writeln!(stdout)?;
                }
            }
        }
        Commands::Request {
            addr,
            period,
            frequency,
            method,
        } => {
            let mut client = Client::connect(addr.as_str()).await?;
            let payload = client
                .request(&SampleRequest::new(&method, period, frequency))
                .await?;

            println!("Received {} bytes:", payload.len());
            println!("{}", util::hex_string(&payload));
        }
        Commands::Systemd {} => {
            println!("{}", SYSTEMD_SERVICE)
        }
    }

    Ok(())
}
