#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that drains a scripted spawn schedule.
//!
//! The schedule is measured in simulation time supplied by the game loop, so
//! spawns never fire while the loop is stopped and can be cancelled outright.

use std::{collections::VecDeque, time::Duration};

use canvas_td_core::{Command, EnemySpec, SpawnScript};

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingSpawn {
    due: Duration,
    enemy: EnemySpec,
}

/// Pure system that converts due schedule entries into spawn commands.
#[derive(Clone, Debug)]
pub struct Spawning {
    pending: VecDeque<PendingSpawn>,
    elapsed: Duration,
    active: bool,
}

impl Spawning {
    /// Creates a spawning system from `script`. Entries are ordered by delay.
    #[must_use]
    pub fn new(script: &SpawnScript) -> Self {
        let mut pending: Vec<PendingSpawn> = script
            .entries
            .iter()
            .map(|entry| PendingSpawn {
                due: Duration::from_millis(entry.delay_ms),
                enemy: entry.enemy,
            })
            .collect();
        pending.sort_by_key(|spawn| spawn.due);

        Self {
            pending: pending.into(),
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    /// Advances the schedule by `dt` and emits a command for every due spawn.
    ///
    /// The first call activates the schedule and starts measuring from zero,
    /// so the delta of the activating frame is not counted.
    pub fn handle(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.active {
            self.elapsed = self.elapsed.saturating_add(dt);
        } else {
            self.active = true;
            tracing::info!(scheduled = self.pending.len(), "spawn schedule activated");
        }

        while let Some(spawn) = self.pending.front().copied() {
            if spawn.due > self.elapsed {
                break;
            }
            let _ = self.pending.pop_front();
            out.push(Command::SpawnEnemy { spec: spawn.enemy });
        }
    }

    /// Drops every spawn that has not fired yet.
    pub fn cancel(&mut self) {
        if !self.pending.is_empty() {
            tracing::info!(dropped = self.pending.len(), "spawn schedule cancelled");
        }
        self.pending.clear();
    }

    /// Number of spawns still waiting.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Whether the schedule has been activated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Simulation time measured since activation.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_td_core::SpawnEntry;

    #[test]
    fn unsorted_entries_fire_in_delay_order() {
        let fast = EnemySpec {
            health: 10.0,
            ..EnemySpec::default()
        };
        let script = SpawnScript {
            entries: vec![
                SpawnEntry {
                    delay_ms: 200,
                    enemy: EnemySpec::default(),
                },
                SpawnEntry {
                    delay_ms: 100,
                    enemy: fast,
                },
            ],
        };
        let mut spawning = Spawning::new(&script);
        let mut commands = Vec::new();
        spawning.handle(Duration::ZERO, &mut commands);
        spawning.handle(Duration::from_millis(150), &mut commands);

        assert_eq!(commands, vec![Command::SpawnEnemy { spec: fast }]);
        assert_eq!(spawning.remaining(), 1);
    }
}
