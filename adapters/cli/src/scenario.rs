//! Scenario files: world parameters plus a placement script.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use garden_defence_core::{Point, StructureKind};
use garden_defence_world::WorldConfig;
use serde::Deserialize;

/// Everything the runner needs besides the path.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Parameters of the world.
    pub(crate) world: WorldConfig,
    /// Structures bought and placed while the scenario runs.
    pub(crate) placements: Vec<ScriptedPlacement>,
}

/// A structure the runner buys and drops at a fixed spot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptedPlacement {
    /// Kind of structure to buy.
    pub(crate) kind: StructureKind,
    /// Horizontal drop coordinate.
    pub(crate) x: i32,
    /// Vertical drop coordinate.
    pub(crate) y: i32,
    /// Earliest tick at which the purchase is made.
    #[serde(default)]
    pub(crate) at_tick: u64,
}

impl ScriptedPlacement {
    /// Point the structure is dropped at.
    pub(crate) const fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Scenario {
    /// Default world defended by one structure of each kind along the
    /// built-in lane.
    pub(crate) fn builtin() -> Self {
        Self {
            world: WorldConfig::default(),
            placements: vec![
                ScriptedPlacement {
                    kind: StructureKind::Basic,
                    x: 300,
                    y: 160,
                    at_tick: 0,
                },
                ScriptedPlacement {
                    kind: StructureKind::Smart,
                    x: 300,
                    y: 400,
                    at_tick: 0,
                },
            ],
        }
    }

    /// Parses a scenario from TOML text and checks its world parameters.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(text).context("invalid scenario")?;
        scenario.world.validate().context("invalid scenario")?;
        Ok(scenario)
    }

    /// Reads and parses a scenario file.
    pub(crate) fn load(file: &Path) -> Result<Self> {
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read scenario {}", file.display()))?;
        Self::parse(&text).with_context(|| format!("failed to load scenario {}", file.display()))
    }
}
