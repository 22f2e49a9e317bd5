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
use std::{io, sync::Arc};

use tokio::task::JoinHandle;
use tracing::{info, span, warn, Level};

use crate::{
    generator::{Generator, GeneratorError},
    slot::GeneratorSlot,
};

const PROMPT: &str = "Signal (direct | wave,<frequency> | pwm,<frequency>,<duty>): ";

/// Reads signal definitions from the operator and publishes them to the server.
pub struct Configurator {
    slot: GeneratorSlot,
}

impl Configurator {
    pub fn new(slot: GeneratorSlot) -> Configurator {
        Configurator { slot }
    }

    /// Parses a control line and, if it is valid, makes it the active generator and
    /// returns it. On error the active generator is left alone.
    pub fn apply(&self, line: &str) -> Result<Arc<Generator>, GeneratorError> {
        let generator = Arc::new(line.parse::<Generator>()?);
        let previous = self.slot.replace(generator.clone());
        info!(
            previous = previous.to_string(),
            current = generator.to_string(),
            "Signal generator replaced."
        );
        Ok(generator)
    }

    /// Prompts for and applies a single control line. Returns false once the input is
    /// exhausted.
    fn monitor_io<R, W>(&self, mut reader: R, mut writer: W) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(writer, "{}", PROMPT)?;
        writer.flush()?;

        let mut input = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        let line = input.trim();
        if line.is_empty() {
            return Ok(true);
        }

        match self.apply(line) {
            Ok(generator) => writeln!(writer, "Signal set to {}", generator)?,
            Err(e) => {
                warn!(input = line, err = e.to_string(), "Invalid signal");
                writeln!(writer, "Invalid signal: {}", e)?;
            }
        }
        Ok(true)
    }

    /// Runs the control loop on stdin until it is closed.
    pub fn run(self) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "configurator");
            let _enter = span.enter();

            info!("Configurator started.");
            while self.monitor_io(io::stdin().lock(), io::stdout())? {}
            info!("Control input closed, the active signal will no longer change.");
            Ok(())
        })
    }
}
