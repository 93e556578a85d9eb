/// Depressible floors (opener and closer plates).
///
/// Each plate has a displacement in `0..=press_depth`. A tick in which any
/// actor's feet are on the plate sets it fully down and restarts its
/// release timer; pressing twice in one tick is the same as pressing once.
/// A tick without contact first runs the timer out, then lets the plate
/// rise one pixel per tick. The first tick of contact after the plate was
/// free fires its event chain.
///
/// Actors do not touch plates directly. Their handlers call `update` (or
/// `keep`) from physics-out, which records the feet positions in the
/// tick's `PressLog`; the scheduler applies the log after all actors ran.
use log::debug;

use super::anim::Anim;
use super::construct::ConstructKind;
use super::door::Doors;
use super::effect::{Effect, Sample};
use super::level::Level;
use super::pos::{Coord, Pos};
use super::pressure::PressLog;
use super::survey::{CoordFn, MapView};
use crate::config::{DoorConfig, FloorConfig};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlateKind {
    Opener,
    Closer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plate {
    pub pos: Pos,
    pub kind: PlateKind,
    pub event: usize,
    /// Pixels the plate is sunk.
    pub depth: i32,
    /// Ticks left before an unpressed plate starts rising.
    pub timer: u32,
    /// Pressed on the previous tick.
    pub held: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DepressibleFloors {
    pub list: Vec<Plate>,
}

impl DepressibleFloors {
    pub fn from_level(level: &Level) -> Self {
        let list = level
            .positions()
            .filter_map(|pos| {
                let c = level.con(pos);
                let kind = match c.fg {
                    ConstructKind::OpenerFloor => PlateKind::Opener,
                    ConstructKind::CloserFloor => PlateKind::Closer,
                    _ => return None,
                };
                Some(Plate { pos, kind, event: c.event?, depth: 0, timer: 0, held: false })
            })
            .collect();
        DepressibleFloors { list }
    }

    pub fn at(&self, p: Pos) -> Option<&Plate> {
        self.list.iter().find(|pl| pl.pos == p)
    }

    /// Apply this tick's presses to every plate.
    pub fn apply(
        &mut self,
        presses: &PressLog,
        level: &Level,
        doors: &mut Doors,
        floor_cfg: &FloorConfig,
        door_cfg: &DoorConfig,
        effects: &mut Vec<Effect>,
    ) {
        for plate in &mut self.list {
            if presses.contains(plate.pos) {
                let edge = !plate.held;
                plate.depth = plate.depth.max(floor_cfg.press_depth);
                plate.timer = floor_cfg.release_ticks;
                plate.held = true;
                if edge {
                    debug!("{:?} plate {:?} pressed", plate.kind, plate.pos);
                    effects.push(Effect::PlatePressed(plate.pos));
                    effects.push(Effect::Play(Sample::Plate, plate.pos.room));
                    fire(plate, level, doors, door_cfg);
                }
            } else {
                plate.held = false;
                if plate.timer > 0 {
                    plate.timer -= 1;
                } else if plate.depth > 0 {
                    plate.depth -= 1;
                }
            }
        }
    }
}

/// Run a plate's event chain.
fn fire(plate: &Plate, level: &Level, doors: &mut Doors, door_cfg: &DoorConfig) {
    let mut next = Some(plate.event);
    // A chain visits each event at most once.
    let mut budget = level.events.len();
    while let Some(idx) = next {
        let Some(e) = level.events.get(idx) else { break };
        if budget == 0 {
            break;
        }
        budget -= 1;
        match plate.kind {
            PlateKind::Opener => doors.open(e.door, door_cfg),
            PlateKind::Closer => doors.close(e.door, true),
        }
        next = e.next;
    }
}

// ══════════════════════════════════════════════════════════════
// Actor contacts
// ══════════════════════════════════════════════════════════════

/// Recompute the actor's two foot contacts and press them. `dx0`/`dx1`
/// are horizontal offsets from the leading edge of the feet, positive
/// toward the facing direction.
pub fn update_depressible_floor(k: &mut Anim, view: &MapView, presses: &mut PressLog, dx0: i32, dx1: i32) {
    let feet = CoordFn::BottomFront.of(&k.f);
    let sign = k.f.dir.sign();
    let at = |dx: i32| Coord::new(feet.room, feet.x + sign * dx, feet.y).normalize(view.links()).raw_pos();
    k.contacts.current = [Some(at(dx0)), Some(at(dx1))];
    keep_depressible_floor(k, presses);
}

/// Press the contacts computed by the last update again.
pub fn keep_depressible_floor(k: &Anim, presses: &mut PressLog) {
    for p in k.contacts.current.iter().flatten() {
        presses.press(*p);
    }
}

/// Forget the contacts: nothing is pressed until the next update.
pub fn clear_depressible_floor(k: &mut Anim) {
    k.contacts.current = [None, None];
}

pub fn save_depressible_floor(k: &mut Anim) {
    k.contacts.saved = k.contacts.current;
}

pub fn restore_depressible_floor(k: &mut Anim) {
    k.contacts.current = k.contacts.saved;
}

/// Press a single position regardless of the actor's contacts.
pub fn press_depressible_floor(presses: &mut PressLog, p: Pos) {
    presses.press(p);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::{sprite, Dir, Frame};
    use crate::domain::testing::level_text;

    const PLATES: &str = "\
@room 1
__________
__o__D__c_
__________
@event 0 door=1,1,5
@event 1 door=1,1,5
";

    fn setup() -> (Level, Doors, DepressibleFloors) {
        let level = level_text(PLATES);
        let doors = Doors::from_level(&level, &[]);
        let plates = DepressibleFloors::from_level(&level);
        (level, doors, plates)
    }

    fn cfg() -> (FloorConfig, DoorConfig) {
        (FloorConfig { press_depth: 2, release_ticks: 3 }, DoorConfig::default())
    }

    #[test]
    fn displacement_stays_in_bounds_and_decays() {
        let (level, mut doors, mut plates) = setup();
        let (fc, dc) = cfg();
        let opener = Pos::new(1, 1, 2);
        let mut fx = vec![];
        let mut pressed = PressLog::default();
        pressed.press(opener);
        pressed.press(opener);
        plates.apply(&pressed, &level, &mut doors, &fc, &dc, &mut fx);
        assert_eq!(plates.at(opener).unwrap().depth, 2);

        let idle = PressLog::default();
        let mut depths = vec![];
        for _ in 0..6 {
            plates.apply(&idle, &level, &mut doors, &fc, &dc, &mut fx);
            depths.push(plates.at(opener).unwrap().depth);
        }
        // Timer runs out first, then the plate rises one pixel per tick.
        assert_eq!(depths, vec![2, 2, 2, 1, 0, 0]);
    }

    #[test]
    fn held_plate_fires_once() {
        let (level, mut doors, mut plates) = setup();
        let (fc, dc) = cfg();
        let opener = Pos::new(1, 1, 2);
        let mut fx = vec![];
        let mut pressed = PressLog::default();
        pressed.press(opener);
        for _ in 0..3 {
            plates.apply(&pressed, &level, &mut doors, &fc, &dc, &mut fx);
        }
        let fired = fx.iter().filter(|e| matches!(e, Effect::PlatePressed(_))).count();
        assert_eq!(fired, 1);
        assert_eq!(plates.at(opener).unwrap().depth, 2);
    }

    #[test]
    fn opener_opens_and_closer_slams() {
        let (level, mut doors, mut plates) = setup();
        let (fc, dc) = cfg();
        let door = Pos::new(1, 1, 5);
        let mut fx = vec![];
        let mut pressed = PressLog::default();
        pressed.press(Pos::new(1, 1, 2));
        plates.apply(&pressed, &level, &mut doors, &fc, &dc, &mut fx);
        assert_eq!(doors.at(door).unwrap().action, crate::domain::door::DoorAction::Opening);

        let mut pressed = PressLog::default();
        pressed.press(Pos::new(1, 1, 8));
        plates.apply(&pressed, &level, &mut doors, &fc, &dc, &mut fx);
        assert_eq!(doors.at(door).unwrap().action, crate::domain::door::DoorAction::FastClosing);
    }

    #[test]
    fn contacts_follow_facing() {
        let level = level_text(PLATES);
        let view = MapView { level: &level, doors: &[], loose: &[] };
        let p = Pos::new(1, 1, 2);
        let s = sprite("s", 12, 51);
        let f = Frame::new(Coord::new(1, p.left_x() + 10, p.feet_y() + 1 - 51), Dir::Right, s);
        let mut k = Anim::new(0, f);
        let mut presses = PressLog::default();
        // Leading edge of the feet at x = 85; 20 px ahead is place 3.
        update_depressible_floor(&mut k, &view, &mut presses, 0, 20);
        assert_eq!(k.contacts.current, [Some(p), Some(Pos::new(1, 1, 3))]);
        assert!(presses.contains(p));

        k.f.dir = Dir::Left;
        update_depressible_floor(&mut k, &view, &mut presses, 0, 20);
        assert_eq!(k.contacts.current[1], Some(Pos::new(1, 1, 1)));
    }

    #[test]
    fn save_clear_restore() {
        let level = level_text(PLATES);
        let view = MapView { level: &level, doors: &[], loose: &[] };
        let p = Pos::new(1, 1, 2);
        let f = Frame::new(Coord::new(1, p.left_x() + 10, p.feet_y() - 50), Dir::Left, sprite("s", 12, 51));
        let mut k = Anim::new(0, f);
        let mut presses = PressLog::default();
        update_depressible_floor(&mut k, &view, &mut presses, 0, 0);
        save_depressible_floor(&mut k);
        clear_depressible_floor(&mut k);
        let mut none = PressLog::default();
        keep_depressible_floor(&k, &mut none);
        assert!(none.is_empty());
        restore_depressible_floor(&mut k);
        keep_depressible_floor(&k, &mut none);
        assert!(none.contains(p));
    }
}
