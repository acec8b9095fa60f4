//! Entity variants owned by the roster.
//!
//! Every entity shares the same lifecycle flags and a closed [`EntityBody`]
//! carrying its variant-specific state. Capabilities that cut across variants
//! are expressed through the [`Damageable`] and [`Clickable`] traits.

use garden_defence_core::{
    DrawLayer, Economy, EntityId, Event, Point, Rect, Size, StructureKind, UnitKind,
};
use garden_defence_geometry::PathGeometry;
use garden_defence_system_placement::PlacementValidator;
use garden_defence_system_targeting::Shooter;
use glam::DVec2;
use log::{info, warn};

/// Discriminant of an [`EntityBody`], used by typed roster queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Mobile unit walking the path.
    Unit,
    /// Defender structure.
    Structure,
    /// Projectile in flight.
    Projectile,
    /// Cosmetic remains of a killed unit.
    Decal,
    /// Menu button that buys a structure.
    PurchaseButton,
    /// Passive scenery.
    Decoration,
}

/// Simulation entity with shared lifecycle flags.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    visible: bool,
    expired: bool,
    body: EntityBody,
}

/// Variant-specific state of an entity.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityBody {
    /// Unit walking the path.
    Unit(MobileUnit),
    /// Structure being placed or firing.
    Structure(Structure),
    /// Projectile in flight.
    Projectile(Projectile),
    /// Remains of a killed unit.
    Decal(Decal),
    /// Menu button.
    PurchaseButton(PurchaseButton),
    /// Scenery without behaviour.
    Decoration(Decoration),
}

impl Entity {
    fn with_body(body: EntityBody) -> Self {
        Self {
            visible: true,
            expired: false,
            body,
        }
    }

    /// Wraps a mobile unit.
    #[must_use]
    pub fn unit(unit: MobileUnit) -> Self {
        Self::with_body(EntityBody::Unit(unit))
    }

    /// Wraps a structure.
    #[must_use]
    pub fn structure(structure: Structure) -> Self {
        Self::with_body(EntityBody::Structure(structure))
    }

    /// Wraps a projectile.
    #[must_use]
    pub fn projectile(projectile: Projectile) -> Self {
        Self::with_body(EntityBody::Projectile(projectile))
    }

    /// Wraps a decal.
    #[must_use]
    pub fn decal(decal: Decal) -> Self {
        Self::with_body(EntityBody::Decal(decal))
    }

    /// Wraps a purchase button.
    #[must_use]
    pub fn purchase_button(button: PurchaseButton) -> Self {
        Self::with_body(EntityBody::PurchaseButton(button))
    }

    /// Wraps a decoration.
    #[must_use]
    pub fn decoration(decoration: Decoration) -> Self {
        Self::with_body(EntityBody::Decoration(decoration))
    }

    /// Variant discriminant.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match &self.body {
            EntityBody::Unit(_) => EntityKind::Unit,
            EntityBody::Structure(_) => EntityKind::Structure,
            EntityBody::Projectile(_) => EntityKind::Projectile,
            EntityBody::Decal(_) => EntityKind::Decal,
            EntityBody::PurchaseButton(_) => EntityKind::PurchaseButton,
            EntityBody::Decoration(_) => EntityKind::Decoration,
        }
    }

    /// Draw layer derived from the variant and its state.
    #[must_use]
    pub fn layer(&self) -> DrawLayer {
        match &self.body {
            EntityBody::Unit(_) => DrawLayer::Main,
            EntityBody::Structure(structure) if structure.is_placing() => DrawLayer::SuperUi,
            EntityBody::Structure(_) | EntityBody::Projectile(_) => DrawLayer::Sky,
            EntityBody::Decal(_) => DrawLayer::Ground,
            EntityBody::PurchaseButton(_) => DrawLayer::SuperUi,
            EntityBody::Decoration(Decoration::Background { .. }) => DrawLayer::Background,
            EntityBody::Decoration(Decoration::Menu { .. }) => DrawLayer::Ui,
            EntityBody::Decoration(Decoration::GameOverBanner) => DrawLayer::Top,
        }
    }

    /// Reports whether renderers should draw the entity.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the entity.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Reports whether the entity is scheduled for removal at frame end.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.expired
    }

    /// Schedules the entity for removal at frame end.
    pub fn expire(&mut self) {
        self.expired = true;
    }

    /// Variant-specific state.
    #[must_use]
    pub const fn body(&self) -> &EntityBody {
        &self.body
    }

    /// Variant-specific state for mutation.
    pub fn body_mut(&mut self) -> &mut EntityBody {
        &mut self.body
    }

    /// Returns the unit if this entity is one.
    #[must_use]
    pub fn as_unit(&self) -> Option<&MobileUnit> {
        match &self.body {
            EntityBody::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Returns the structure if this entity is one.
    #[must_use]
    pub fn as_structure(&self) -> Option<&Structure> {
        match &self.body {
            EntityBody::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    /// Returns the structure for mutation if this entity is one.
    pub fn as_structure_mut(&mut self) -> Option<&mut Structure> {
        match &mut self.body {
            EntityBody::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    /// Returns the projectile if this entity is one.
    #[must_use]
    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.body {
            EntityBody::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Exposes the entity's damage capability.
    #[must_use]
    pub fn as_damageable(&self) -> Option<&dyn Damageable> {
        match &self.body {
            EntityBody::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Exposes the entity's damage capability for mutation.
    pub fn as_damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        match &mut self.body {
            EntityBody::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Exposes the entity's click capability for mutation.
    pub fn as_clickable_mut(&mut self) -> Option<&mut dyn Clickable> {
        match &mut self.body {
            EntityBody::Structure(structure) => Some(structure),
            EntityBody::PurchaseButton(button) => Some(button),
            _ => None,
        }
    }

    /// Describes what a renderer should draw for this entity.
    #[must_use]
    pub fn visual(&self) -> Visual {
        match &self.body {
            EntityBody::Unit(unit) => Visual::Unit {
                kind: unit.kind,
                hitbox: unit.hitbox_rect(),
                health: unit.health,
                max_health: unit.max_health,
            },
            EntityBody::Structure(structure) => Visual::Structure {
                kind: structure.kind,
                footprint: structure.footprint(),
                range: structure.kind.range(),
                placing: structure.is_placing(),
                reload: structure.reload_fraction(),
            },
            EntityBody::Projectile(projectile) => Visual::Projectile {
                bounds: projectile.bounds(),
            },
            EntityBody::Decal(decal) => Visual::Decal {
                kind: decal.kind,
                position: decal.position,
                fade: decal.fade(),
            },
            EntityBody::PurchaseButton(button) => Visual::PurchaseButton {
                kind: button.kind,
                bounds: button.bounds,
            },
            EntityBody::Decoration(Decoration::Background { area }) => {
                Visual::Background { area: *area }
            }
            EntityBody::Decoration(Decoration::Menu { area }) => Visual::Menu { area: *area },
            EntityBody::Decoration(Decoration::GameOverBanner) => Visual::GameOverBanner,
        }
    }
}

/// Renderer-facing description of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visual {
    /// Field backdrop.
    Background {
        /// Area covered by the field.
        area: Rect,
    },
    /// Menu panel.
    Menu {
        /// Area covered by the panel.
        area: Rect,
    },
    /// Mobile unit.
    Unit {
        /// Class of the unit.
        kind: UnitKind,
        /// Hitbox centred on the unit.
        hitbox: Rect,
        /// Remaining health.
        health: i32,
        /// Health at spawn.
        max_health: i32,
    },
    /// Structure, with a range indicator while placing.
    Structure {
        /// Kind of structure.
        kind: StructureKind,
        /// Footprint centred on the structure's location.
        footprint: Rect,
        /// Targeting radius.
        range: i32,
        /// Whether the structure still follows the pointer.
        placing: bool,
        /// Reload progress in `[0, 1]`.
        reload: f64,
    },
    /// Projectile in flight.
    Projectile {
        /// Bounding box of the projectile.
        bounds: Rect,
    },
    /// Remains of a killed unit.
    Decal {
        /// Class of the unit that died.
        kind: UnitKind,
        /// Location of death.
        position: Point,
        /// Remaining opacity in `[0, 1]`.
        fade: f64,
    },
    /// Menu button.
    PurchaseButton {
        /// Kind of structure sold by the button.
        kind: StructureKind,
        /// Clickable area.
        bounds: Rect,
    },
    /// Game-over overlay.
    GameOverBanner,
}

/// Entities that can receive damage.
pub trait Damageable {
    /// Remaining health.
    fn health(&self) -> i32;

    /// Reduces health by `amount`; health may drop below zero.
    fn take_damage(&mut self, amount: i32);

    /// Axis-aligned hitbox.
    fn hitbox(&self) -> Rect;
}

/// Shared state handed to a clickable while a click propagates.
#[derive(Debug)]
pub struct ClickContext<'a> {
    /// Handle of the entity receiving the click.
    pub id: EntityId,
    /// Pointer location at the time of the click.
    pub pointer: Point,
    /// Playable field; structures must fit inside it.
    pub field: Rect,
    /// Validator used to accept or reject placements.
    pub validator: &'a PlacementValidator,
    /// Path walked by units.
    pub path: &'a PathGeometry,
    /// Footprints of committed structures.
    pub committed: &'a [Rect],
    /// Player economy.
    pub economy: &'a mut Economy,
    /// Event sink.
    pub events: &'a mut Vec<Event>,
    discard: bool,
}

impl<'a> ClickContext<'a> {
    /// Creates a context for one clickable.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: EntityId,
        pointer: Point,
        field: Rect,
        validator: &'a PlacementValidator,
        path: &'a PathGeometry,
        committed: &'a [Rect],
        economy: &'a mut Economy,
        events: &'a mut Vec<Event>,
    ) -> Self {
        Self {
            id,
            pointer,
            field,
            validator,
            path,
            committed,
            economy,
            events,
            discard: false,
        }
    }

    /// Asks the world to expire the clicked entity.
    pub fn discard(&mut self) {
        self.discard = true;
    }

    /// Reports whether the clicked entity asked to be expired.
    #[must_use]
    pub const fn is_discarded(&self) -> bool {
        self.discard
    }
}

/// Entities that react to pointer clicks.
pub trait Clickable {
    /// Handles a click; returns `true` when the click is consumed and must not
    /// propagate further.
    fn consume_click(&mut self, ctx: &mut ClickContext<'_>) -> bool;
}

/// Result of advancing a unit by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The unit is still walking.
    Moving,
    /// The unit had no health left and dies without moving.
    Killed,
    /// The unit reached the end of the path.
    Escaped,
}

/// Unit walking the path.
#[derive(Clone, Debug, PartialEq)]
pub struct MobileUnit {
    kind: UnitKind,
    progress: f64,
    speed: f64,
    health: i32,
    max_health: i32,
    reward: i64,
    score_value: i64,
    damage_on_arrival: i64,
    hitbox: Size,
    position: Point,
}

impl MobileUnit {
    /// Creates a unit of `kind` at the start of `path`.
    #[must_use]
    pub fn new(kind: UnitKind, path: &PathGeometry) -> Self {
        Self {
            kind,
            progress: 0.0,
            speed: kind.speed(),
            health: kind.max_health(),
            max_health: kind.max_health(),
            reward: kind.reward(),
            score_value: kind.score_value(),
            damage_on_arrival: kind.damage_on_arrival(),
            hitbox: kind.hitbox(),
            position: path.first(),
        }
    }

    /// Overrides the class speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Overrides the class health; the maximum health follows.
    #[must_use]
    pub const fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    /// Advances the unit along the path.
    ///
    /// A unit without health does not move; the caller settles its death.
    pub fn advance(&mut self, dt: f64, path: &PathGeometry) -> UnitOutcome {
        if self.health <= 0 {
            return UnitOutcome::Killed;
        }

        self.progress += self.speed * dt;
        self.position = path.position(self.progress);

        if self.progress >= 1.0 {
            UnitOutcome::Escaped
        } else {
            UnitOutcome::Moving
        }
    }

    /// Class of the unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Progress along the path.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress covered per second.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Health at spawn.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Money credited on death.
    #[must_use]
    pub const fn reward(&self) -> i64 {
        self.reward
    }

    /// Score credited on death.
    #[must_use]
    pub const fn score_value(&self) -> i64 {
        self.score_value
    }

    /// Damage dealt to the defender on arrival.
    #[must_use]
    pub const fn damage_on_arrival(&self) -> i64 {
        self.damage_on_arrival
    }

    /// Current coordinate.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Hitbox centred on the current coordinate.
    #[must_use]
    pub const fn hitbox_rect(&self) -> Rect {
        Rect::centered(self.position, self.hitbox)
    }
}

impl Damageable for MobileUnit {
    fn health(&self) -> i32 {
        self.health
    }

    fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    fn hitbox(&self) -> Rect {
        self.hitbox_rect()
    }
}

/// Placement state of a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructureState {
    /// Following the pointer until a click commits it.
    Placing,
    /// Fixed on the field and firing.
    Committed,
}

/// Defender structure.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    kind: StructureKind,
    location: Point,
    state: StructureState,
    cooked: f64,
}

impl Structure {
    /// Creates a structure that follows the pointer from `location`.
    #[must_use]
    pub const fn placing(kind: StructureKind, location: Point) -> Self {
        Self {
            kind,
            location,
            state: StructureState::Placing,
            cooked: 0.0,
        }
    }

    /// Kind of structure.
    #[must_use]
    pub const fn kind(&self) -> StructureKind {
        self.kind
    }

    /// Centre of the footprint.
    #[must_use]
    pub const fn location(&self) -> Point {
        self.location
    }

    /// Placement state.
    #[must_use]
    pub const fn state(&self) -> StructureState {
        self.state
    }

    /// Reports whether the structure still follows the pointer.
    #[must_use]
    pub fn is_placing(&self) -> bool {
        self.state == StructureState::Placing
    }

    /// Footprint centred on the location.
    #[must_use]
    pub const fn footprint(&self) -> Rect {
        Rect::centered(self.location, self.kind.footprint())
    }

    /// Point from which projectiles launch.
    #[must_use]
    pub const fn muzzle(&self) -> Point {
        Point::new(self.location.x(), self.location.y() - self.kind.muzzle_height())
    }

    /// Moves the structure; ignored once committed.
    pub fn move_to(&mut self, location: Point) {
        if self.is_placing() {
            self.location = location;
        }
    }

    /// Accumulates reload time and reports whether a shot is loaded.
    ///
    /// The timer is clamped at the reload time so an idle structure stays
    /// loaded without overflowing.
    pub fn cook(&mut self, dt: f64) -> bool {
        let reload = self.kind.reload_time();
        self.cooked = (self.cooked + dt).min(reload);
        self.cooked >= reload
    }

    /// Empties the loaded shot.
    pub fn discharge(&mut self) {
        self.cooked = 0.0;
    }

    /// Reload progress in `[0, 1]`.
    #[must_use]
    pub fn reload_fraction(&self) -> f64 {
        self.cooked / self.kind.reload_time()
    }

    /// Describes the structure to the combat resolver.
    #[must_use]
    pub const fn shooter(&self) -> Shooter {
        Shooter {
            position: self.location,
            muzzle: self.muzzle(),
            range: self.kind.range(),
            damage: self.kind.damage(),
            projectile_speed: self.kind.projectile_speed(),
            policy: self.kind.targeting(),
            aim: self.kind.aim(),
        }
    }
}

impl Clickable for Structure {
    fn consume_click(&mut self, ctx: &mut ClickContext<'_>) -> bool {
        if !self.is_placing() {
            return false;
        }

        let footprint = self.footprint();
        if !ctx.field.contains_rect(&footprint) {
            let refund = self.kind.cost();
            ctx.economy.credit(refund);
            ctx.discard();
            info!("placement of {:?} cancelled, refunded {refund}", self.kind);
            ctx.events.push(Event::PlacementCancelled {
                structure: ctx.id,
                kind: self.kind,
                refund,
            });
            return true;
        }

        match ctx.validator.validate(&footprint, ctx.committed, ctx.path) {
            Ok(()) => {
                self.state = StructureState::Committed;
                info!("{:?} placed at {:?}", self.kind, self.location);
                ctx.events.push(Event::StructurePlaced {
                    structure: ctx.id,
                    kind: self.kind,
                    footprint,
                });
                true
            }
            Err(reason) => {
                warn!("{:?} cannot be placed at {:?}: {reason}", self.kind, self.location);
                ctx.events.push(Event::PlacementRejected {
                    structure: ctx.id,
                    kind: self.kind,
                    reason,
                });
                false
            }
        }
    }
}

/// Projectile in flight toward a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    position: DVec2,
    velocity: DVec2,
    damage: i32,
    target: EntityId,
    travelled: f64,
    max_travel: f64,
    size: Size,
}

impl Projectile {
    /// Creates a projectile launched from `origin`.
    #[must_use]
    pub const fn new(
        origin: DVec2,
        velocity: DVec2,
        damage: i32,
        target: EntityId,
        max_travel: f64,
        size: Size,
    ) -> Self {
        Self {
            position: origin,
            velocity,
            damage,
            target,
            travelled: 0.0,
            max_travel,
            size,
        }
    }

    /// Moves the projectile and reports whether its travel budget is spent.
    pub fn advance(&mut self, dt: f64) -> bool {
        let step = self.velocity * dt;
        self.position += step;
        self.travelled += step.length();
        self.travelled > self.max_travel
    }

    /// Current coordinate, truncated toward zero.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.position.x as i32, self.position.y as i32)
    }

    /// Velocity in field units per second.
    #[must_use]
    pub const fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Damage applied on impact.
    #[must_use]
    pub const fn damage(&self) -> i32 {
        self.damage
    }

    /// Unit the projectile was aimed at; may no longer exist.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        self.target
    }

    /// Distance covered so far.
    #[must_use]
    pub const fn travelled(&self) -> f64 {
        self.travelled
    }

    /// Bounding box centred on the current coordinate.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.position(), self.size)
    }
}

/// Remains of a killed unit that fade over time.
#[derive(Clone, Debug, PartialEq)]
pub struct Decal {
    kind: UnitKind,
    position: Point,
    age: f64,
    life_span: f64,
}

impl Decal {
    /// Creates a decal for a unit of `kind` that died at `position`.
    #[must_use]
    pub const fn new(kind: UnitKind, position: Point, life_span: f64) -> Self {
        Self {
            kind,
            position,
            age: 0.0,
            life_span,
        }
    }

    /// Ages the decal and reports whether it outlived its life span.
    pub fn age(&mut self, dt: f64) -> bool {
        self.age += dt;
        self.age > self.life_span
    }

    /// Remaining opacity in `[0, 1]`.
    #[must_use]
    pub fn fade(&self) -> f64 {
        if self.life_span <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.life_span).clamp(0.0, 1.0)
    }
}

/// Menu button that queues a structure purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseButton {
    kind: StructureKind,
    bounds: Rect,
    queued: bool,
}

impl PurchaseButton {
    /// Creates a button selling `kind` inside `bounds`.
    #[must_use]
    pub const fn new(kind: StructureKind, bounds: Rect) -> Self {
        Self {
            kind,
            bounds,
            queued: false,
        }
    }

    /// Kind of structure sold.
    #[must_use]
    pub const fn kind(&self) -> StructureKind {
        self.kind
    }

    /// Takes the queued purchase, if any.
    pub fn take_queued(&mut self) -> Option<StructureKind> {
        std::mem::take(&mut self.queued).then_some(self.kind)
    }
}

impl Clickable for PurchaseButton {
    fn consume_click(&mut self, ctx: &mut ClickContext<'_>) -> bool {
        if !self.bounds.contains_strictly(ctx.pointer) {
            return false;
        }
        self.queued = true;
        true
    }
}

/// Scenery without behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoration {
    /// Field backdrop.
    Background {
        /// Area covered by the field.
        area: Rect,
    },
    /// Menu panel beside the field.
    Menu {
        /// Area covered by the panel.
        area: Rect,
    },
    /// Overlay shown once the game ends.
    GameOverBanner,
}
