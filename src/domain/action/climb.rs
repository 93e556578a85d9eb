/// Climb: pull up from hanging onto the ledge, ending in a crouch.
///
/// `CLIMB[0]` doubles as the hanging pose, and unclimbing plays this
/// frameset backward, so the offsets here are the only record of how far
/// the body travels between the ledge and the pit.
use std::ops::ControlFlow;

use super::{no_physics, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::Anim;
use crate::domain::floor::{keep_depressible_floor, restore_depressible_floor};
use crate::domain::frame::{pose, sprite, FramesetEntry};

pub const CLIMB: [FramesetEntry; 15] = [
    pose(sprite("climb-01", 14, 60), 0, 0),
    pose(sprite("climb-02", 14, 60), 0, -1),
    pose(sprite("climb-03", 15, 59), 0, -2),
    pose(sprite("climb-04", 15, 58), -1, -3),
    pose(sprite("climb-05", 16, 56), -2, -4),
    pose(sprite("climb-06", 16, 54), -2, -5),
    pose(sprite("climb-07", 17, 51), -3, -6),
    pose(sprite("climb-08", 18, 48), -3, -6),
    pose(sprite("climb-09", 19, 45), -2, -6),
    pose(sprite("climb-10", 20, 42), -2, -6),
    pose(sprite("climb-11", 20, 40), -2, -5),
    pose(sprite("climb-12", 21, 38), -2, -4),
    pose(sprite("climb-13", 21, 37), -1, -4),
    pose(sprite("climb-14", 22, 36), -1, -3),
    pose(sprite("climb-15", 22, 36), -1, -2),
];

/// From this frame the feet are back on the ledge.
pub const ON_LEDGE_INDEX: i32 = 12;

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, no_physics, physics_out)
}

fn flow(k: &mut Anim, _: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Climb) {
        k.i = -1;
    }

    if k.i == CLIMB.len() as i32 - 1 {
        k.hang_pos = None;
        return ControlFlow::Break(Step::Switch(ActionKind::Couch));
    }

    k.i += 1;
    k.select_frame(&CLIMB, k.i);
    ControlFlow::Continue(())
}

fn physics_out(k: &mut Anim, ctx: &mut Ctx) {
    if k.i >= ON_LEDGE_INDEX {
        restore_depressible_floor(k);
    }
    keep_depressible_floor(k, ctx.presses);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::normal::STAND;
    use crate::domain::frame::Dir;
    use crate::domain::pos::Pos;
    use crate::domain::survey::{survey, CoordFn, PosFn};
    use crate::domain::testing::{actor_at, Bench};

    const EDGE: [&str; 3] = [
        "__________",
        "___.______",
        "__________",
    ];

    fn run_until(b: &mut Bench, k: &mut Anim, kind: ActionKind) {
        for _ in 0..60 {
            if k.action == kind {
                return;
            }
            b.run(k);
        }
        panic!("never reached {}", kind.name());
    }

    #[test]
    fn climbing_down_and_back_up_returns_to_the_ledge() {
        let mut b = Bench::new(&EDGE);
        let ledge = Pos::new(1, 1, 4);
        let mut k = actor_at(ledge, 2, Dir::Right, STAND);
        k.action = ActionKind::Couch;
        k.contacts.current = [Some(ledge), Some(ledge)];

        run_until(&mut b, &mut k, ActionKind::Hang);
        assert_eq!(k.hang_pos, Some(Pos::new(1, 2, 3)));

        k.key.up = true;
        run_until(&mut b, &mut k, ActionKind::Climb);
        k.key.up = false;
        while k.action == ActionKind::Climb {
            b.run(&mut k);
            if k.i >= ON_LEDGE_INDEX {
                assert_eq!(k.contacts.current, [Some(ledge), Some(ledge)]);
                assert!(b.presses.contains(ledge));
            }
        }
        assert_eq!(k.action, ActionKind::Couch);
        assert_eq!(k.hang_pos, None);
        // Climbing replays the offsets of the way down.
        let s = survey(CoordFn::MiddleBottom, PosFn::Cell, &k.f, &b.view());
        assert_eq!(s.pos, ledge);
        assert_eq!(s.coord.y, ledge.feet_y());

        run_until(&mut b, &mut k, ActionKind::Normal);
        assert_eq!(survey(CoordFn::Middle, PosFn::Cell, &k.f, &b.view()).pos, ledge);
    }

    #[test]
    fn climb_covers_a_floor() {
        let up: i32 = CLIMB.iter().map(|e| -e.dy).sum();
        let forward: i32 = CLIMB.iter().map(|e| -e.dx).sum();
        assert_eq!(up, 57);
        assert_eq!(forward, 22);
    }
}
