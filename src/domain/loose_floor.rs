/// Loose floors.
///
/// Stepping on a loose floor starts it shaking. After `shake_ticks` it
/// lets go: on the release tick the construct is still in place (anyone
/// standing on it falls), afterwards the place is empty and the slab
/// drops, accelerating, until it meets a floor line that is not empty and
/// shatters there. A falling slab hits at most one actor on the way down.
use log::debug;

use super::construct::ConstructKind;
use super::effect::{Effect, Sample};
use super::level::Level;
use super::pos::{Coord, Pos, PLACE_WIDTH};
use super::pressure::PressLog;
use crate::config::LooseFloorConfig;

/// Pixels per tick added to a falling slab's speed.
pub const SLAB_ACCEL: i32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LooseState {
    Rest,
    Shaking { left: u32 },
    Falling { speed: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LooseFloor {
    pub origin: Pos,
    pub state: LooseState,
    /// Bottom-centre of the slab.
    pub c: Coord,
    pub struck: bool,
}

impl LooseFloor {
    pub fn new(origin: Pos) -> Self {
        LooseFloor {
            origin,
            state: LooseState::Rest,
            c: Coord::new(origin.room, origin.left_x() + PLACE_WIDTH / 2, origin.feet_y()),
            struck: false,
        }
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.state, LooseState::Falling { .. })
    }
}

/// An actor's head position, used to decide whether a slab hits it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Head {
    pub actor: usize,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LooseFloors {
    pub list: Vec<LooseFloor>,
}

impl LooseFloors {
    pub fn from_level(level: &Level) -> Self {
        let list = level
            .positions()
            .filter(|&p| level.con(p).fg == ConstructKind::LooseFloor)
            .map(LooseFloor::new)
            .collect();
        LooseFloors { list }
    }

    /// Start every resting slab that was stepped on this tick.
    pub fn apply_presses(&mut self, presses: &PressLog, cfg: &LooseFloorConfig, effects: &mut Vec<Effect>) {
        for l in &mut self.list {
            if l.state == LooseState::Rest && presses.contains(l.origin) {
                debug!("loose floor {:?} shaking", l.origin);
                l.state = LooseState::Shaking { left: cfg.shake_ticks.max(1) };
                effects.push(Effect::Play(Sample::LooseShake, l.origin.room));
            }
        }
    }

    /// Advance every slab by one tick. Returns the actors struck this tick.
    pub fn tick(
        &mut self,
        level: &mut Level,
        heads: &[Head],
        cfg: &LooseFloorConfig,
        effects: &mut Vec<Effect>,
    ) -> Vec<usize> {
        let mut struck = Vec::new();
        let mut done = Vec::new();

        for (idx, l) in self.list.iter_mut().enumerate() {
            match l.state {
                LooseState::Rest => {}
                LooseState::Shaking { left } => {
                    if left <= 1 {
                        debug!("loose floor {:?} released", l.origin);
                        l.state = LooseState::Falling { speed: 0 };
                        effects.push(Effect::LooseReleased(l.origin));
                    } else {
                        l.state = LooseState::Shaking { left: left - 1 };
                    }
                }
                LooseState::Falling { speed } => {
                    if level.con(l.origin).fg == ConstructKind::LooseFloor {
                        level.set_kind(l.origin, ConstructKind::NoFloor);
                    }
                    let speed = (speed + SLAB_ACCEL).min(cfg.fall_speed_max);
                    l.state = LooseState::Falling { speed };

                    let next = l.c.offset(0, speed);
                    let from = l.c.raw_floor_pos().floor;
                    let to = next.raw_floor_pos().floor;
                    let mut landed = None;
                    for floor in from + 1..=to {
                        let p = Pos { floor, ..next.raw_floor_pos() }.normalize(&level.links);
                        if p.is_void() || !level.con(p).is_strictly_traversable() {
                            landed = Some(p);
                            break;
                        }
                    }

                    if let Some(p) = landed {
                        done.push(idx);
                        if p.is_void() {
                            continue;
                        }
                        if level.con(p).fg == ConstructKind::Floor {
                            level.set_kind(p, ConstructKind::BrokenFloor);
                        }
                        debug!("loose floor {:?} shattered at {:?}", l.origin, p);
                        effects.push(Effect::LooseShattered(p));
                        effects.push(Effect::Play(Sample::LooseBreak, p.room));
                        continue;
                    }

                    l.c = next.normalize(&level.links);
                    if !l.struck {
                        let cell = l.c.raw_pos();
                        if let Some(h) = heads.iter().find(|h| h.pos == cell) {
                            l.struck = true;
                            struck.push(h.actor);
                        }
                    }
                }
            }
        }

        let mut idx = 0;
        self.list.retain(|_| {
            let keep = !done.contains(&idx);
            idx += 1;
            keep
        });
        struck
    }

    pub fn falling_at(&self, p: Pos) -> bool {
        falling_at(&self.list, p)
    }
}

pub fn falling_at(list: &[LooseFloor], p: Pos) -> bool {
    list.iter().any(|l| l.origin == p && l.is_falling())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::construct::Construct;

    /// Loose floor at (1, 0, 4) above plain floor at (1, 2, 4).
    fn level() -> (Level, Pos) {
        let mut level = Level::new(1, "t", 1);
        let p = Pos::new(1, 0, 4);
        level.set_con(p, Construct::new(ConstructKind::LooseFloor));
        level.set_con(Pos::new(1, 2, 4), Construct::new(ConstructKind::Floor));
        (level, p)
    }

    #[test]
    fn press_shakes_then_releases() {
        let cfg = LooseFloorConfig { shake_ticks: 2, fall_speed_max: 29 };
        let (mut level, p) = level();
        let mut loose = LooseFloors::from_level(&level);
        let mut fx = vec![];
        let mut presses = PressLog::default();
        presses.press(p);
        loose.apply_presses(&presses, &cfg, &mut fx);
        assert_eq!(loose.list[0].state, LooseState::Shaking { left: 2 });

        loose.tick(&mut level, &[], &cfg, &mut fx);
        assert!(!loose.falling_at(p));
        loose.tick(&mut level, &[], &cfg, &mut fx);
        assert!(loose.falling_at(p));
        // Still in place on the release tick.
        assert_eq!(level.con(p).fg, ConstructKind::LooseFloor);
        loose.tick(&mut level, &[], &cfg, &mut fx);
        assert_eq!(level.con(p).fg, ConstructKind::NoFloor);
    }

    #[test]
    fn slab_shatters_on_first_solid_floor() {
        let cfg = LooseFloorConfig { shake_ticks: 1, fall_speed_max: 29 };
        let (mut level, p) = level();
        let mut loose = LooseFloors::from_level(&level);
        let mut fx = vec![];
        let mut presses = PressLog::default();
        presses.press(p);
        loose.apply_presses(&presses, &cfg, &mut fx);
        for _ in 0..40 {
            loose.tick(&mut level, &[], &cfg, &mut fx);
        }
        assert!(loose.list.is_empty());
        assert!(fx.contains(&Effect::LooseShattered(Pos::new(1, 2, 4))));
        assert_eq!(level.con(Pos::new(1, 2, 4)).fg, ConstructKind::BrokenFloor);
    }

    #[test]
    fn slab_strikes_actor_once() {
        let cfg = LooseFloorConfig { shake_ticks: 1, fall_speed_max: 4 };
        let (mut level, p) = level();
        let mut loose = LooseFloors::from_level(&level);
        let mut fx = vec![];
        let mut presses = PressLog::default();
        presses.press(p);
        loose.apply_presses(&presses, &cfg, &mut fx);
        let heads = [Head { actor: 3, pos: Pos::new(1, 1, 4) }];
        let mut hits = vec![];
        for _ in 0..60 {
            hits.extend(loose.tick(&mut level, &heads, &cfg, &mut fx));
        }
        assert_eq!(hits, vec![3]);
    }
}
