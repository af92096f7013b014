//! Scenarios are replayable scripts of edits: tile pairs created and
//! removed, and entities spawned. They're the data-driven way to set up a
//! network, for tests and for the command line.

use crate::{
    config::NetworkConfig,
    entity::{EntityKind, EntityList},
    grid::{GridPoint, SuperTileType},
    network::TileNodeNetwork,
    timed,
    tnav::LocalDirection,
};
use anyhow::Context;
use log::{info, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use validator::Validate;

/// Chance that a random step creates a tile pair instead of removing one
const RANDOM_CREATE_CHANCE: f64 = 0.65;

/// One edit. Positions are in unit (whole tile) coordinates, and must be
/// multiples of one half.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    Create {
        position: [f64; 3],
        super_type: SuperTileType,
    },
    /// Remove the tile pair at a position
    Remove { position: [f64; 3] },
    /// Spawn an entity at the center of the front (or back) tile at a
    /// position
    Entity {
        position: [f64; 3],
        #[serde(default = "default_front")]
        front: bool,
        kind: EntityKind,
        #[serde(default)]
        direction: LocalDirection,
        #[serde(default)]
        orientation: LocalDirection,
    },
}

fn default_front() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Scenario {
    #[validate]
    pub config: NetworkConfig,
    pub steps: Vec<ScenarioStep>,
}

/// Everything a scenario builds
#[derive(Clone, Debug)]
pub struct ScenarioOutput {
    pub network: TileNodeNetwork,
    pub entities: EntityList,
}

impl Scenario {
    /// Replay every step into a fresh network. Steps that the network
    /// rejects (e.g. creating on an occupied position) are logged and
    /// skipped. Returns an error if the config is invalid or a step has a
    /// position that's off the grid.
    pub fn run(&self) -> anyhow::Result<ScenarioOutput> {
        let mut network = TileNodeNetwork::new(self.config)?;
        let mut entities = EntityList::new();

        timed!("Scenario replay", log::Level::Info, {
            for (i, step) in self.steps.iter().enumerate() {
                apply_step(&mut network, &mut entities, step)
                    .with_context(|| format!("in step {} ({:?})", i, step))?;
            }
        });
        info!(
            "Scenario built {} tiles, {} nodes, {} entities",
            network.tile_count(),
            network.node_count(),
            entities.len()
        );
        Ok(ScenarioOutput { network, entities })
    }

    /// Generate a random sequence of creations and removals over every
    /// lattice position within `extent` half-tiles of the origin (on each
    /// axis). The same seed always generates the same scenario.
    pub fn random(seed: u64, steps: usize, extent: i32) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let lattice = lattice_positions(extent);
        let mut live: Vec<GridPoint> = Vec::new();
        let mut scenario_steps = Vec::with_capacity(steps);

        for _ in 0..steps {
            if !live.is_empty() && !rng.gen_bool(RANDOM_CREATE_CHANCE) {
                let position = live.swap_remove(rng.gen_range(0..live.len()));
                scenario_steps.push(ScenarioStep::Remove {
                    position: to_units(position),
                });
            } else if let Some(&(position, super_type)) =
                lattice.choose(&mut rng)
            {
                if !live.contains(&position) {
                    live.push(position);
                }
                scenario_steps.push(ScenarioStep::Create {
                    position: to_units(position),
                    super_type,
                });
            }
        }

        Self {
            config: NetworkConfig::default(),
            steps: scenario_steps,
        }
    }
}

fn apply_step(
    network: &mut TileNodeNetwork,
    entities: &mut EntityList,
    step: &ScenarioStep,
) -> anyhow::Result<()> {
    match step {
        ScenarioStep::Create {
            position,
            super_type,
        } => {
            network.create_tile_pair(from_units(*position)?, *super_type);
        }
        ScenarioStep::Remove { position } => {
            let position = from_units(*position)?;
            match network.tile_at(position) {
                Some(tile) => {
                    network.remove_tile_pair(tile);
                    let pruned = entities.prune(network);
                    if pruned > 0 {
                        info!("Removed {} entities with the tiles", pruned);
                    }
                }
                None => warn!("No tile pair at {} to remove", position),
            }
        }
        ScenarioStep::Entity {
            position,
            front,
            kind,
            direction,
            orientation,
        } => {
            let position = from_units(*position)?;
            let tile = network
                .tile_at(position)
                .and_then(|front_tile| {
                    if *front {
                        Some(front_tile)
                    } else {
                        network.tile(front_tile).map(|tile| tile.sibling())
                    }
                });
            match tile {
                Some(tile) => {
                    entities.create(
                        network,
                        *kind,
                        tile,
                        *direction,
                        *orientation,
                    );
                }
                None => warn!("No tile at {} to put a {} on", position, kind),
            }
        }
    }
    Ok(())
}

fn from_units([x, y, z]: [f64; 3]) -> anyhow::Result<GridPoint> {
    GridPoint::from_units(x, y, z).context("invalid position")
}

fn to_units(position: GridPoint) -> [f64; 3] {
    [
        f64::from(position.x) / 2.0,
        f64::from(position.y) / 2.0,
        f64::from(position.z) / 2.0,
    ]
}

/// Every tile center within `extent` half-tiles of the origin
fn lattice_positions(extent: i32) -> Vec<(GridPoint, SuperTileType)> {
    let mut positions = Vec::new();
    for x in -extent..=extent {
        for y in -extent..=extent {
            for z in -extent..=extent {
                let position = GridPoint::new(x, y, z);
                for super_type in SuperTileType::iter() {
                    if super_type.accepts(position) {
                        positions.push((position, super_type));
                    }
                }
            }
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "steps": [
                {"action": "create", "position": [0, 0, 0], "super_type": "xy"},
                {"action": "entity", "position": [0, 0, 0], "kind": "player"},
                {"action": "remove", "position": [0, 0, 0]}
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.config, NetworkConfig::default());
        assert_eq!(
            scenario.steps[1],
            ScenarioStep::Entity {
                position: [0.0, 0.0, 0.0],
                front: true,
                kind: EntityKind::Player,
                direction: LocalDirection::Static,
                orientation: LocalDirection::Static,
            }
        );

        let output = scenario.run().unwrap();
        assert_eq!(output.network.tile_count(), 0);
        assert!(output.entities.is_empty());
    }

    #[test]
    fn test_off_grid_position() {
        let scenario = Scenario {
            config: NetworkConfig::default(),
            steps: vec![ScenarioStep::Create {
                position: [0.25, 0.0, 0.0],
                super_type: SuperTileType::Xy,
            }],
        };
        let error = scenario.run().unwrap_err();
        assert!(format!("{:#}", error).contains("in step 0"));
    }

    #[test]
    fn test_random_is_deterministic() {
        let first = Scenario::random(7, 40, 2);
        let second = Scenario::random(7, 40, 2);
        assert_eq!(first, second);
        assert_eq!(first.steps.len(), 40);
        assert!(matches!(first.steps[0], ScenarioStep::Create { .. }));
    }

    #[test]
    fn test_lattice_positions() {
        let positions = lattice_positions(1);
        // Per super type, 1 of the 8 parity classes. In -1..=1 that's 1 even
        // value (0) and 2 odd values (-1, 1) per axis.
        assert_eq!(positions.len(), 1 + 4 + 4);
        for (position, super_type) in positions {
            assert_eq!(
                SuperTileType::from_position(position),
                Some(super_type)
            );
        }
    }
}
