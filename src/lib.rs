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

//! Streams synthetic test signals (square, sine and constant) to clients over a
//! length prefixed TCP protocol. The active signal can be swapped at runtime through
//! a line based control channel.

pub mod client;
pub mod config;
pub mod configurator;
pub mod encoder;
pub mod generator;
pub mod protocol;
pub mod server;
pub mod slot;
pub mod util;
