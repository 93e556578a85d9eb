/// Test fixtures: levels from diagrams, actors placed on them.
use super::action::{self, Ctx};
use super::anim::Anim;
use super::door::Doors;
use super::effect::Effect;
use super::frame::{Dir, Frame, Sprite};
use super::level::Level;
use super::loose_floor::LooseFloors;
use super::pos::{Coord, Pos};
use super::pressure::PressLog;
use super::survey::MapView;
use crate::sim::level::parse_level;

/// Parse a full level document.
pub fn level_text(text: &str) -> Level {
    parse_level(text).expect("test level should parse")
}

/// Single-room level from its three map rows.
pub fn level_from(rows: &[&str]) -> Level {
    level_text(&format!("@room 1\n{}\n", rows.join("\n")))
}

/// An actor whose sprite stands on `p`, its left edge `ox` pixels into
/// the place.
pub fn actor_at(p: Pos, ox: i32, dir: Dir, sprite: Sprite) -> Anim {
    let f = Frame::new(Coord::new(p.room, p.left_x() + ox, p.feet_y() + 1 - sprite.h), dir, sprite);
    Anim::new(0, f)
}

/// Dynamic objects for a freshly loaded level.
pub fn objects(level: &Level) -> (Doors, LooseFloors) {
    (Doors::from_level(level, &level.open_doors), LooseFloors::from_level(level))
}

/// A level with its doors and slabs frozen, for driving one actor's
/// handlers tick by tick.
pub struct Bench {
    pub level: Level,
    pub doors: Doors,
    pub loose: LooseFloors,
    pub presses: PressLog,
    pub effects: Vec<Effect>,
}

impl Bench {
    pub fn new(rows: &[&str]) -> Self {
        Bench::with_level(level_from(rows))
    }

    pub fn with_level(level: Level) -> Self {
        let (doors, loose) = objects(&level);
        Bench { level, doors, loose, presses: PressLog::default(), effects: vec![] }
    }

    pub fn view(&self) -> MapView<'_> {
        MapView { level: &self.level, doors: &self.doors.list, loose: &self.loose.list }
    }

    /// Run one tick of `k`. Presses are collected fresh each tick.
    pub fn run(&mut self, k: &mut Anim) {
        self.presses = PressLog::default();
        let mut ctx = Ctx {
            view: MapView { level: &self.level, doors: &self.doors.list, loose: &self.loose.list },
            presses: &mut self.presses,
            effects: &mut self.effects,
        };
        action::run(k, &mut ctx);
    }

    pub fn played(&self, sample: super::effect::Sample) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Play(s, _) if *s == sample))
    }
}
