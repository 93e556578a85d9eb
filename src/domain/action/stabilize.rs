/// Stabilize: recoil after bumping into something.
use std::ops::ControlFlow;

use super::{fall_check, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::Anim;
use crate::domain::collision::to_collision_edge;
use crate::domain::effect::{Effect, Sample};
use crate::domain::floor::{keep_depressible_floor, update_depressible_floor};
use crate::domain::frame::{pose, sprite, FramesetEntry};

pub const STABILIZE: [FramesetEntry; 4] = [
    pose(sprite("stabilize-01", 14, 51), 1, 0),
    pose(sprite("stabilize-02", 15, 51), 1, 0),
    pose(sprite("stabilize-03", 14, 51), 0, 0),
    pose(sprite("stabilize-04", 13, 51), 0, 0),
];

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, fall_check, physics_out)
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Stabilize) {
        k.i = -1;
        k.inertia = 0;
        k.cinertia = 0;
        k.f = to_collision_edge(&k.f, &ctx.view);
        ctx.effects.push(Effect::Play(Sample::HitWall, k.f.c.room));
    }

    if k.i == STABILIZE.len() as i32 - 1 {
        return ControlFlow::Break(Step::Switch(ActionKind::Normal));
    }

    k.i += 1;
    k.select_frame(&STABILIZE, k.i);
    ControlFlow::Continue(())
}

fn physics_out(k: &mut Anim, ctx: &mut Ctx) {
    if k.i == 0 {
        update_depressible_floor(k, &ctx.view, ctx.presses, -4, -10);
    } else {
        keep_depressible_floor(k, ctx.presses);
    }
}
