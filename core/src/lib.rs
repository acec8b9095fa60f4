#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Garden Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened during the tick. Systems operate on immutable snapshots and never
//! mutate the world directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Garden Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one frame of the provided duration.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports the latest pointer position in field coordinates.
    MovePointer {
        /// Pointer location.
        position: Point,
    },
    /// Reports a discrete click at the last known pointer position.
    Click,
    /// Requests the purchase of a structure which then follows the pointer
    /// until a click confirms its placement.
    PurchaseStructure {
        /// Kind of structure to buy.
        kind: StructureKind,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the wave scheduler released a unit onto the path.
    UnitSpawned {
        /// Identifier assigned to the unit.
        unit: EntityId,
        /// Class of the spawned unit.
        kind: UnitKind,
    },
    /// Reports that a unit ran out of health and left a decal behind.
    UnitKilled {
        /// Identifier of the dead unit.
        unit: EntityId,
        /// Class of the dead unit.
        kind: UnitKind,
        /// Location where the unit died.
        position: Point,
    },
    /// Reports that a unit reached the end of the path.
    UnitEscaped {
        /// Identifier of the unit that escaped.
        unit: EntityId,
        /// Class of the escaped unit.
        kind: UnitKind,
        /// Damage dealt to the defender's health.
        damage: i64,
    },
    /// Confirms that a structure launched a projectile.
    ProjectileFired {
        /// Structure that fired.
        structure: EntityId,
        /// Unit the structure aimed at.
        target: EntityId,
        /// Identifier of the new projectile.
        projectile: EntityId,
    },
    /// Reports that a projectile struck a unit.
    ProjectileHit {
        /// Projectile that struck.
        projectile: EntityId,
        /// Unit that received the damage.
        unit: EntityId,
        /// Damage applied to the unit.
        damage: i32,
    },
    /// Confirms that a structure was bought and awaits placement.
    StructurePurchased {
        /// Identifier of the structure being placed.
        structure: EntityId,
        /// Kind of structure that was bought.
        kind: StructureKind,
    },
    /// Reports that a purchase request was rejected.
    PurchaseRejected {
        /// Kind of structure requested.
        kind: StructureKind,
        /// Reason the purchase failed.
        reason: PurchaseError,
    },
    /// Confirms that a structure was committed to the field.
    StructurePlaced {
        /// Identifier of the committed structure.
        structure: EntityId,
        /// Kind of structure that was placed.
        kind: StructureKind,
        /// Footprint frozen at placement time.
        footprint: Rect,
    },
    /// Reports that a placement attempt inside the field was refused.
    PlacementRejected {
        /// Identifier of the structure still being placed.
        structure: EntityId,
        /// Kind of structure being placed.
        kind: StructureKind,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a structure was dropped outside the field and refunded.
    PlacementCancelled {
        /// Identifier of the discarded structure.
        structure: EntityId,
        /// Kind of structure that was discarded.
        kind: StructureKind,
        /// Amount credited back to the player.
        refund: i64,
    },
    /// Announces that the wave order wrapped and spawning sped up.
    WaveEscalated {
        /// Zero-based index of the wave that begins.
        wave: u32,
        /// Seconds between spawns for the new wave.
        interval_secs: f64,
    },
    /// Announces that the defender's health ran out.
    GameOver {
        /// Score accumulated when the game ended.
        score: i64,
    },
}

/// Integer coordinate on the playing field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing downwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Squared Euclidean distance to another point, computed without rounding.
    #[must_use]
    pub fn distance_squared(self, other: Point) -> i64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

/// Width and height of a rectangular hitbox or footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: i32,
    height: i32,
}

impl Size {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a rectangle of the provided size centred on `center`.
    #[must_use]
    pub const fn centered(center: Point, size: Size) -> Self {
        Self {
            left: center.x - size.width / 2,
            top: center.y - size.height / 2,
            width: size.width,
            height: size.height,
        }
    }

    /// Leftmost column covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.left
    }

    /// Topmost row covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.top
    }

    /// Column of the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Row of the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Dimensions of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Centre point, truncated toward the top-left for odd dimensions.
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Corners in clockwise order starting at the top-left.
    #[must_use]
    pub const fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left, self.bottom()),
        ]
    }

    /// The four edges as `(start, end)` pairs: top, right, bottom, left.
    #[must_use]
    pub const fn edges(&self) -> [(Point, Point); 4] {
        let [top_left, top_right, bottom_right, bottom_left] = self.corners();
        [
            (top_left, top_right),
            (top_right, bottom_right),
            (bottom_left, bottom_right),
            (top_left, bottom_left),
        ]
    }

    /// Reports whether the point lies inside or on the border of the rectangle.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Reports whether the point lies strictly inside the rectangle.
    #[must_use]
    pub const fn contains_strictly(&self, point: Point) -> bool {
        point.x > self.left && point.x < self.right() && point.y > self.top && point.y < self.bottom()
    }

    /// Reports whether `other` lies entirely within this rectangle.
    #[must_use]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right() <= self.right()
            && other.top >= self.top
            && other.bottom() <= self.bottom()
    }

    /// Reports whether the interiors of the two rectangles intersect.
    ///
    /// Rectangles that merely share an edge do not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Unique handle assigned to every entity registered with the roster.
///
/// Handles never own the entity they name; they must be resolved through the
/// roster, which reports `None` once the entity is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Draw layers, painted from lowest to highest priority.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DrawLayer {
    /// Field backdrop.
    Background,
    /// Decals lying on the ground.
    Ground,
    /// Units walking the path.
    Main,
    /// Committed structures and projectiles.
    Sky,
    /// Menu panel.
    Ui,
    /// Menu buttons and structures being placed.
    SuperUi,
    /// Overlays such as the game-over banner.
    Top,
}

impl DrawLayer {
    /// Numeric draw priority; renderers paint ascending values first.
    #[must_use]
    pub const fn priority(self) -> i32 {
        match self {
            Self::Background => 0,
            Self::Ground => 1,
            Self::Main => 2,
            Self::Sky => 3,
            Self::Ui => 4,
            Self::SuperUi => 5,
            Self::Top => 6,
        }
    }
}

/// Classes of mobile units that travel along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Slow, fragile unit.
    Snail,
    /// Fast armoured van carrying snails.
    Cargo,
}

impl UnitKind {
    /// Path progress covered per second.
    #[must_use]
    pub const fn speed(self) -> f64 {
        match self {
            Self::Snail => 0.04,
            Self::Cargo => 0.15,
        }
    }

    /// Health the unit spawns with.
    #[must_use]
    pub const fn max_health(self) -> i32 {
        match self {
            Self::Snail => 3,
            Self::Cargo => 8,
        }
    }

    /// Money credited when the unit is killed.
    #[must_use]
    pub const fn reward(self) -> i64 {
        match self {
            Self::Snail => 25,
            Self::Cargo => 100,
        }
    }

    /// Score credited when the unit is killed.
    #[must_use]
    pub const fn score_value(self) -> i64 {
        match self {
            Self::Snail => 100,
            Self::Cargo => 500,
        }
    }

    /// Damage inflicted on the defender when the unit reaches the end of the path.
    #[must_use]
    pub const fn damage_on_arrival(self) -> i64 {
        match self {
            Self::Snail => 5,
            Self::Cargo => 25,
        }
    }

    /// Dimensions of the unit's hitbox, centred on its position.
    #[must_use]
    pub const fn hitbox(self) -> Size {
        match self {
            Self::Snail => Size::new(32, 32),
            Self::Cargo => Size::new(64, 40),
        }
    }

    /// Threat tier; higher tiers are preferred by priority targeting.
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Snail => 0,
            Self::Cargo => 1,
        }
    }

    /// Single-character token used by wave order files.
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Snail => 's',
            Self::Cargo => 'c',
        }
    }

    /// Parses a wave order token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "s" => Some(Self::Snail),
            "c" => Some(Self::Cargo),
            _ => None,
        }
    }
}

/// Target selection policy used by a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetingPolicy {
    /// Closest unit in range.
    Nearest,
    /// Ranked cascade that avoids overkill and prefers dangerous units.
    Priority,
}

/// How a structure computes the aim point for a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AimMode {
    /// Aim at the target's current position.
    Direct,
    /// Aim at the target's estimated position at impact time.
    Lead,
}

/// Types of structures that can be bought and placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Cheap launcher that fires at the nearest unit.
    Basic,
    /// Expensive launcher with priority targeting and lead aiming.
    Smart,
}

impl StructureKind {
    /// Purchase price.
    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            Self::Basic => 100,
            Self::Smart => 500,
        }
    }

    /// Damage carried by each projectile.
    #[must_use]
    pub const fn damage(self) -> i32 {
        match self {
            Self::Basic => 1,
            Self::Smart => 2,
        }
    }

    /// Seconds between shots.
    #[must_use]
    pub const fn reload_time(self) -> f64 {
        match self {
            Self::Basic => 1.75,
            Self::Smart => 1.0,
        }
    }

    /// Targeting radius in field units.
    #[must_use]
    pub const fn range(self) -> i32 {
        match self {
            Self::Basic => 100,
            Self::Smart => 250,
        }
    }

    /// Projectile speed in field units per second.
    #[must_use]
    pub const fn projectile_speed(self) -> f64 {
        match self {
            Self::Basic => 400.0,
            Self::Smart => 600.0,
        }
    }

    /// Footprint dimensions, centred on the structure's location.
    #[must_use]
    pub const fn footprint(self) -> Size {
        match self {
            Self::Basic | Self::Smart => Size::new(40, 56),
        }
    }

    /// Height above the structure's location from which projectiles launch.
    #[must_use]
    pub const fn muzzle_height(self) -> i32 {
        self.footprint().height() * 3 / 4
    }

    /// Target selection policy.
    #[must_use]
    pub const fn targeting(self) -> TargetingPolicy {
        match self {
            Self::Basic => TargetingPolicy::Nearest,
            Self::Smart => TargetingPolicy::Priority,
        }
    }

    /// Aim computation mode.
    #[must_use]
    pub const fn aim(self) -> AimMode {
        match self {
            Self::Basic => AimMode::Direct,
            Self::Smart => AimMode::Lead,
        }
    }
}

/// Controls how thoroughly placement checks keep structures off the path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstructionMode {
    /// Only the circles around each waypoint are obstacles.
    #[default]
    Waypoints,
    /// Waypoint circles plus every path segment buffered by the same radius.
    Segments,
}

/// Player health, money and score.
///
/// The counters are never clamped: health and money may go negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Economy {
    health: i64,
    money: i64,
    score: i64,
}

impl Economy {
    /// Creates an economy with the provided counters.
    #[must_use]
    pub const fn new(health: i64, money: i64, score: i64) -> Self {
        Self {
            health,
            money,
            score,
        }
    }

    /// Remaining defender health.
    #[must_use]
    pub const fn health(&self) -> i64 {
        self.health
    }

    /// Available money.
    #[must_use]
    pub const fn money(&self) -> i64 {
        self.money
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Reports whether the player holds at least `cost` money.
    #[must_use]
    pub const fn can_afford(&self, cost: i64) -> bool {
        self.money >= cost
    }

    /// Adds money.
    pub fn credit(&mut self, amount: i64) {
        self.money += amount;
    }

    /// Removes money.
    pub fn debit(&mut self, amount: i64) {
        self.money -= amount;
    }

    /// Adds health.
    pub fn heal(&mut self, amount: i64) {
        self.health += amount;
    }

    /// Removes health.
    pub fn damage_user(&mut self, amount: i64) {
        self.health -= amount;
    }

    /// Adds score.
    pub fn increase_score(&mut self, amount: i64) {
        self.score += amount;
    }
}

/// Reasons a structure placement may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PlacementError {
    /// The footprint overlaps a committed structure.
    #[error("footprint overlaps an existing structure")]
    OverlapsStructure,
    /// The footprint comes within the clearance radius of the path.
    #[error("footprint blocks the path")]
    BlocksPath,
}

/// Reasons a purchase request may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PurchaseError {
    /// The player cannot afford the structure.
    #[error("structure costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Price of the structure.
        cost: i64,
        /// Money held at the time of the request.
        available: i64,
    },
    /// The game has ended.
    #[error("the game is over")]
    GameOver,
}
