/// Doors: a closing level `i` in `0..=DOOR_MAX_STEP` (0 = fully open).
///
/// A door blocks movement through the band `[DOOR_BAND_LEFT, PLACE_WIDTH)`
/// of its place once it is more than `DOOR_BLOCK_LIMIT` closed. Opener
/// floors raise it, it waits `open_wait` ticks, then slides shut on its
/// own; closer floors slam it.
use log::debug;

use super::construct::ConstructKind;
use super::effect::{Effect, Sample};
use super::level::Level;
use super::pos::Pos;
use crate::config::DoorConfig;

pub const DOOR_MAX_STEP: i32 = 47;
/// Above this closing level a door blocks climbing from the left.
pub const DOOR_CLIMB_LIMIT: i32 = 40;
/// Above this closing level a door blocks walking through.
pub const DOOR_BLOCK_LIMIT: i32 = 16;
/// Left edge (pixel offset in its place) of the door's blocking band.
pub const DOOR_BAND_LEFT: i32 = 24;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DoorAction {
    Rest,
    Opening,
    Closing,
    FastClosing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Door {
    pub pos: Pos,
    pub i: i32,
    pub action: DoorAction,
    pub wait: u32,
}

impl Door {
    pub fn is_blocking(&self) -> bool {
        self.i > DOOR_BLOCK_LIMIT
    }
}

/// All doors of a level, in level position order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Doors {
    pub list: Vec<Door>,
}

impl Doors {
    /// One door per `Door` construct. Doors start closed, except the ones
    /// listed in `open`.
    pub fn from_level(level: &Level, open: &[Pos]) -> Self {
        let list = level
            .positions()
            .filter(|&p| level.con(p).fg == ConstructKind::Door)
            .map(|pos| Door {
                pos,
                i: if open.contains(&pos) { 0 } else { DOOR_MAX_STEP },
                action: DoorAction::Rest,
                wait: 0,
            })
            .collect();
        Doors { list }
    }

    pub fn at(&self, p: Pos) -> Option<&Door> {
        find(&self.list, p)
    }

    fn at_mut(&mut self, p: Pos) -> Option<&mut Door> {
        self.list.iter_mut().find(|d| d.pos == p)
    }

    /// Start opening, or hold an open door open for another wait period.
    pub fn open(&mut self, p: Pos, cfg: &DoorConfig) {
        if let Some(d) = self.at_mut(p) {
            if d.i == 0 {
                d.wait = cfg.open_wait;
                d.action = DoorAction::Rest;
            } else {
                d.action = DoorAction::Opening;
            }
            debug!("door {:?} opening (i={})", p, d.i);
        }
    }

    pub fn close(&mut self, p: Pos, fast: bool) {
        if let Some(d) = self.at_mut(p) {
            d.action = if fast { DoorAction::FastClosing } else { DoorAction::Closing };
            d.wait = 0;
            debug!("door {:?} closing (fast={fast})", p);
        }
    }

    /// Advance every door by one tick.
    pub fn tick(&mut self, cfg: &DoorConfig, effects: &mut Vec<Effect>) {
        for d in &mut self.list {
            match d.action {
                DoorAction::Rest => {
                    if d.i == 0 && d.wait > 0 {
                        d.wait -= 1;
                        if d.wait == 0 {
                            d.action = DoorAction::Closing;
                        }
                    }
                }
                DoorAction::Opening => {
                    d.i = (d.i - cfg.open_step).max(0);
                    if d.i == 0 {
                        d.action = DoorAction::Rest;
                        d.wait = cfg.open_wait.max(1);
                        effects.push(Effect::Play(Sample::DoorOpen, d.pos.room));
                    }
                }
                DoorAction::Closing | DoorAction::FastClosing => {
                    let step = if d.action == DoorAction::FastClosing {
                        cfg.fast_close_step
                    } else {
                        cfg.close_step
                    };
                    d.i = (d.i + step).min(DOOR_MAX_STEP);
                    if d.i == DOOR_MAX_STEP {
                        let sample = if d.action == DoorAction::FastClosing {
                            Sample::DoorSlam
                        } else {
                            Sample::DoorClose
                        };
                        effects.push(Effect::Play(sample, d.pos.room));
                        d.action = DoorAction::Rest;
                    }
                }
            }
        }
    }
}

pub fn find(list: &[Door], p: Pos) -> Option<&Door> {
    list.iter().find(|d| d.pos == p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::construct::Construct;

    fn one_door() -> (Doors, Pos) {
        let mut level = Level::new(1, "t", 1);
        let p = Pos::new(1, 0, 5);
        level.set_con(p, Construct::new(ConstructKind::Door));
        (Doors::from_level(&level, &[]), p)
    }

    #[test]
    fn doors_start_closed_and_blocking() {
        let (doors, p) = one_door();
        let d = doors.at(p).unwrap();
        assert_eq!(d.i, DOOR_MAX_STEP);
        assert!(d.is_blocking());
    }

    #[test]
    fn opened_door_waits_then_closes() {
        let cfg = DoorConfig { open_step: 47, close_step: 47, fast_close_step: 47, open_wait: 2 };
        let (mut doors, p) = one_door();
        let mut fx = vec![];
        doors.open(p, &cfg);
        doors.tick(&cfg, &mut fx);
        assert_eq!(doors.at(p).unwrap().i, 0);
        assert_eq!(fx, vec![Effect::Play(Sample::DoorOpen, 1)]);
        doors.tick(&cfg, &mut fx);
        doors.tick(&cfg, &mut fx);
        assert_eq!(doors.at(p).unwrap().action, DoorAction::Closing);
        doors.tick(&cfg, &mut fx);
        assert_eq!(doors.at(p).unwrap().i, DOOR_MAX_STEP);
    }

    #[test]
    fn fast_close_slams() {
        let cfg = DoorConfig::default();
        let mut level = Level::new(1, "t", 1);
        let p = Pos::new(1, 0, 5);
        level.set_con(p, Construct::new(ConstructKind::Door));
        let mut doors = Doors::from_level(&level, &[p]);
        let mut fx = vec![];
        doors.close(p, true);
        for _ in 0..5 {
            doors.tick(&cfg, &mut fx);
        }
        assert_eq!(doors.at(p).unwrap().i, DOOR_MAX_STEP);
        assert!(fx.contains(&Effect::Play(Sample::DoorSlam, 1)));
    }
}
