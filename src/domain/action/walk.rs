/// Walk: one careful step forward.
///
/// The step never carries the actor over an edge: if the place ahead has
/// no floor, the stride is shortened to end at the edge and the actor
/// stops there (a misstep).
use std::ops::ControlFlow;

use super::{lacks_support, run_phases, stabilize_collision, ActionKind, Ctx, Entry, Step};
use crate::domain::anim::{Anim, Disturbance};
use crate::domain::collision::is_colliding;
use crate::domain::floor::{keep_depressible_floor, update_depressible_floor};
use crate::domain::frame::{pose, sprite, FramesetEntry};
use crate::domain::survey::{dist_next_place, survey, CoordFn, PosFn};

pub const WALK: [FramesetEntry; 12] = [
    pose(sprite("walk-01", 13, 51), -1, 0),
    pose(sprite("walk-02", 15, 51), 0, 0),
    pose(sprite("walk-03", 17, 51), -1, 0),
    pose(sprite("walk-04", 19, 50), -2, 0),
    pose(sprite("walk-05", 21, 50), -2, 0),
    pose(sprite("walk-06", 23, 51), -3, 0),
    pose(sprite("walk-07", 22, 51), -4, 0),
    pose(sprite("walk-08", 20, 51), -4, 0),
    pose(sprite("walk-09", 18, 50), -3, 0),
    pose(sprite("walk-10", 16, 51), -2, 0),
    pose(sprite("walk-11", 14, 51), -2, 0),
    pose(sprite("walk-12", 13, 51), -1, 0),
];

/// First frame from which down turns the step into a crouch.
const COUCH_FROM: i32 = 4;
/// Counter-inertia handed to the crouch when stepping into it.
const COUCH_CINERTIA: i32 = 2;
/// Drift carried into a fall off the end of a step.
const FALL_INERTIA: i32 = 2;

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, physics_in, physics_out)
}

fn flow(k: &mut Anim, _: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Walk) {
        k.i = -1;
        k.disturbance = Disturbance::None;
    }

    if k.disturbance == Disturbance::Misstep || k.i == WALK.len() as i32 - 1 {
        return ControlFlow::Break(Step::Switch(ActionKind::Normal));
    }

    if k.key.down && k.i >= COUCH_FROM {
        k.cinertia = COUCH_CINERTIA;
        return ControlFlow::Break(Step::Switch(ActionKind::Couch));
    }

    k.i += 1;
    k.select_frame(&WALK, k.i);
    ControlFlow::Continue(())
}

/// Pixels the pending offset moves the leading foot forward.
fn stride(k: &Anim) -> i32 {
    let now = CoordFn::BottomFront.of(&k.f).x;
    let then = CoordFn::BottomFront.of(&k.f.next(&k.fo)).x;
    (then - now) * k.f.dir.sign()
}

fn physics_in(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    let view = &ctx.view;

    if let Some(c) = is_colliding(&k.f, &k.fo, 0, false, view) {
        return ControlFlow::Break(stabilize_collision(k, c));
    }

    let feet = survey(CoordFn::BottomFront, PosFn::Cell, &k.f, view);
    let ahead = view.rel(feet.pos, 0, k.f.dir.sign());
    if view.con(ahead).is_strictly_traversable() {
        let room = dist_next_place(&k.f, CoordFn::BottomFront, 0, false);
        let over = stride(k) - room;
        if over > 0 {
            k.fo.dx += over;
            k.disturbance = Disturbance::Misstep;
        }
    }

    if lacks_support(k, view) {
        k.inertia = FALL_INERTIA;
        return ControlFlow::Break(Step::Enter(Entry::Fall));
    }

    ControlFlow::Continue(())
}

fn physics_out(k: &mut Anim, ctx: &mut Ctx) {
    let contacts = match k.i {
        0 => Some((-3, -9)),
        3 => Some((-2, -12)),
        6 => Some((-4, -14)),
        9 => Some((-3, -10)),
        _ => None,
    };
    match contacts {
        Some((dx0, dx1)) => update_depressible_floor(k, &ctx.view, ctx.presses, dx0, dx1),
        None => keep_depressible_floor(k, ctx.presses),
    }
}
