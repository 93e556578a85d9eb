/// World: the complete snapshot of a running level.
///
/// ## Level layers
///
/// Two copies of the level are kept:
///   - `base`  — the level as loaded. **Never mutated** after load.
///   - `level` — the effective level (items taken, slabs gone, floors
///               broken).
///
/// `restart` resets everything from `base`, so a restarted level is
/// tick-for-tick identical to a fresh load.
use crate::config::SimConfig;
use crate::domain::action::normal::STAND;
use crate::domain::anim::Anim;
use crate::domain::door::Doors;
use crate::domain::floor::DepressibleFloors;
use crate::domain::frame::Frame;
use crate::domain::level::Level;
use crate::domain::loose_floor::LooseFloors;
use crate::domain::pos::{FEET_Y, PLACE_WIDTH};
use crate::domain::survey::MapView;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// The player is dead; only a restart continues.
    Dead,
}

pub struct World {
    // ── Level layers ──
    pub base: Level,
    pub level: Level,

    // ── Environment objects ──
    pub doors: Doors,
    pub plates: DepressibleFloors,
    pub loose: LooseFloors,

    // ── Actors ──
    /// Actor 0 is the player.
    pub actors: Vec<Anim>,

    pub cfg: SimConfig,
    pub phase: Phase,
    pub paused: bool,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl World {
    pub fn new(level: Level, cfg: SimConfig) -> Self {
        let mut world = World {
            base: level.clone(),
            level,
            doors: Doors::default(),
            plates: DepressibleFloors::default(),
            loose: LooseFloors::default(),
            actors: vec![],
            cfg,
            phase: Phase::Playing,
            paused: false,
            tick: 0,
            message: String::new(),
            message_timer: 0,
        };
        world.restart();
        world
    }

    /// Back to the state the level was loaded in.
    pub fn restart(&mut self) {
        self.level = self.base.clone();
        self.doors = Doors::from_level(&self.level, &self.level.open_doors);
        self.plates = DepressibleFloors::from_level(&self.level);
        self.loose = LooseFloors::from_level(&self.level);
        self.actors = spawn_actors(&self.level);
        self.phase = Phase::Playing;
        self.paused = false;
        self.tick = 0;
        self.message.clear();
        self.message_timer = 0;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

/// One standing actor per spawn point, centred in its place.
fn spawn_actors(level: &Level) -> Vec<Anim> {
    level
        .spawns
        .iter()
        .enumerate()
        .map(|(id, s)| {
            let f = Frame::placed(STAND, s.pos, s.dir, (PLACE_WIDTH - STAND.w) / 2, FEET_Y + 1 - STAND.h);
            Anim::new(id, f)
        })
        .collect()
}

// ── Queries ──

impl World {
    /// Read-only view of the level and its objects, as the action
    /// handlers see it.
    pub fn view(&self) -> MapView<'_> {
        MapView { level: &self.level, doors: &self.doors.list, loose: &self.loose.list }
    }

    pub fn player(&self) -> Option<&Anim> {
        self.actors.first()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
