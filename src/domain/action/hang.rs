/// Hang: dangle from the ledge at `hang_pos`.
///
/// Shift keeps the grip; up pulls the actor back onto the ledge. Without
/// either, the hands let go once a short grace period is over.
use std::ops::ControlFlow;

use super::climb::CLIMB;
use super::{no_physics, run_phases, ActionKind, Ctx, Entry, Step};
use crate::domain::anim::Anim;
use crate::domain::construct::ConstructKind;
use crate::domain::door::DOOR_CLIMB_LIMIT;
use crate::domain::floor::{keep_depressible_floor, press_depressible_floor};
use crate::domain::frame::{pose, Dir, FramesetEntry};
use crate::domain::pos::Pos;
use crate::domain::survey::MapView;

pub const HANG: [FramesetEntry; 1] = [pose(CLIMB[0].sprite, 0, 0)];

/// Ticks the grip holds without shift.
pub const HANG_GRACE: i32 = 2;

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, no_physics, physics_out)
}

/// The place whose edge the hands are holding.
fn ledge(k: &Anim, view: &MapView) -> Option<Pos> {
    k.hang_pos.map(|hp| view.rel(hp, -1, k.f.dir.sign()))
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Hang) {
        k.i = 0;
        k.wait = HANG_GRACE;
    }

    let view = &ctx.view;
    let held = ledge(k, view)
        .filter(|&p| view.con(p).has_hang_edge() && !view.loose_falling_at(p));
    let Some(lp) = held else {
        k.hang_pos = None;
        return ControlFlow::Break(Step::Enter(Entry::Fall));
    };

    let door_too_closed = view.con(lp).fg == ConstructKind::Door
        && k.f.dir == Dir::Left
        && view.door_at(lp).is_some_and(|d| d.i > DOOR_CLIMB_LIMIT);
    if k.key.up && !door_too_closed {
        return ControlFlow::Break(Step::Switch(ActionKind::Climb));
    }

    if k.wait_elapsed() && !k.key.shift {
        k.hang_pos = None;
        return ControlFlow::Break(Step::Enter(Entry::Fall));
    }

    k.select_frame(&HANG, 0);
    ControlFlow::Continue(())
}

fn physics_out(k: &mut Anim, ctx: &mut Ctx) {
    keep_depressible_floor(k, ctx.presses);
    if let Some(lp) = ledge(k, &ctx.view) {
        press_depressible_floor(ctx.presses, lp);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::normal::STAND;
    use crate::domain::anim::Disturbance;
    use crate::domain::survey::{survey, CoordFn, PosFn};
    use crate::domain::testing::{actor_at, Bench};

    const EDGE: [&str; 3] = [
        "__________",
        "___.______",
        "__________",
    ];
    const LEDGE: Pos = Pos { room: 1, floor: 1, place: 4 };

    /// Crouch at the edge and climb down until hanging.
    fn hanging(b: &mut Bench) -> Anim {
        let mut k = actor_at(LEDGE, 2, Dir::Right, STAND);
        k.action = ActionKind::Couch;
        for _ in 0..30 {
            if k.action == ActionKind::Hang {
                return k;
            }
            b.run(&mut k);
        }
        panic!("never started hanging");
    }

    #[test]
    fn lets_go_after_the_grace_period() {
        let mut b = Bench::new(&EDGE);
        let mut k = hanging(&mut b);
        for _ in 0..HANG_GRACE {
            b.run(&mut k);
            assert_eq!(k.action, ActionKind::Hang);
        }
        b.run(&mut k);
        assert_eq!(k.action, ActionKind::Fall);
        assert_eq!(k.hang_pos, None);
        while k.action == ActionKind::Fall {
            b.run(&mut k);
        }
        assert_eq!(k.action, ActionKind::Couch);
        assert_eq!(k.floors_fallen, 1);
        let s = survey(CoordFn::MiddleBottom, PosFn::Cell, &k.f, &b.view());
        assert_eq!(s.pos, Pos::new(1, 2, 3));
    }

    #[test]
    fn shift_holds_on_and_weighs_on_the_ledge() {
        let mut b = Bench::new(&EDGE);
        let mut k = hanging(&mut b);
        k.key.shift = true;
        for _ in 0..50 {
            b.run(&mut k);
            assert_eq!(k.action, ActionKind::Hang);
            assert!(b.presses.contains(LEDGE));
        }
    }

    #[test]
    fn up_climbs() {
        let mut b = Bench::new(&EDGE);
        let mut k = hanging(&mut b);
        k.key.up = true;
        b.run(&mut k);
        assert_eq!(k.action, ActionKind::Climb);
    }

    #[test]
    fn a_vanished_ledge_drops_the_actor() {
        let mut b = Bench::new(&EDGE);
        let mut k = hanging(&mut b);
        k.key.shift = true;
        b.run(&mut k);
        b.level.set_kind(LEDGE, ConstructKind::NoFloor);
        b.run(&mut k);
        assert_eq!(k.action, ActionKind::Fall);
        assert_eq!(k.disturbance, Disturbance::None);
    }
}
