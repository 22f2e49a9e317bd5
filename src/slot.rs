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
use std::sync::Arc;

use parking_lot::RwLock;

use crate::generator::Generator;

/// Holds the active generator. Cloning the slot yields another handle to the same
/// generator, so the configurator and every connection can share it.
///
/// Generators are never modified in place. A replacement swaps the whole instance,
/// and readers take an `Arc` snapshot that stays valid for as long as they hold it.
#[derive(Clone, Default)]
pub struct GeneratorSlot {
    active: Arc<RwLock<Arc<Generator>>>,
}

impl GeneratorSlot {
    /// Creates a new slot holding the given generator.
    pub fn new(generator: Generator) -> GeneratorSlot {
        GeneratorSlot {
            active: Arc::new(RwLock::new(Arc::new(generator))),
        }
    }

    /// Returns the currently active generator. The lock is only held long enough to
    /// clone the pointer.
    pub fn snapshot(&self) -> Arc<Generator> {
        self.active.read().clone()
    }

    /// Publishes a new generator and returns the one it replaced.
    pub fn replace(&self, generator: impl Into<Arc<Generator>>) -> Arc<Generator> {
        let generator = generator.into();
        std::mem::replace(&mut *self.active.write(), generator)
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use crate::generator::Generator;

    use super::GeneratorSlot;

    #[test]
    fn test_slot_starts_direct() {
        let slot = GeneratorSlot::default();
        assert_eq!(Generator::default(), *slot.snapshot());
    }

    #[test]
    fn test_replace_keeps_old_snapshots() {
        let slot = GeneratorSlot::default();
        let before = slot.snapshot();

        let previous = slot.replace("wave,440".parse::<Generator>().unwrap());
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!("direct", before.name());
        assert_eq!("wave", slot.snapshot().name());

        // Clones share the same slot.
        let other = slot.clone();
        other.replace("pwm,100,0.5".parse::<Generator>().unwrap());
        assert_eq!("pwm", slot.snapshot().name());
    }

    #[test]
    fn test_concurrent_replace_and_snapshot() {
        let slot = GeneratorSlot::default();
        let lines = ["direct", "wave,100", "pwm,100,0.5"];

        let writer = {
            let slot = slot.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    slot.replace(lines[i % lines.len()].parse::<Generator>().unwrap());
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let slot = slot.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let generator = slot.snapshot();
                        let samples = generator.sample(0.01, 1000.0);
                        assert_eq!(10, samples.len());

                        // Every sample comes from the one generator in the snapshot.
                        match generator.as_ref() {
                            Generator::Direct(_) => assert!(samples.iter().all(|v| *v == 0.5)),
                            Generator::Pwm(_) => {
                                assert!(samples.iter().all(|v| *v == 0.0 || *v == 1.0))
                            }
                            Generator::Wave(_) => {
                                assert!(samples.iter().all(|v| (0.0..=1.0).contains(v)))
                            }
                        }
                    }
                })
            })
            .collect();

        writer.join().expect("writer panicked");
        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }
}
