/// Normal: standing still, the hub every other action returns to.
use std::ops::ControlFlow;

use super::{fall_check, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::{Anim, Disturbance};
use crate::domain::construct::Item;
use crate::domain::floor::update_depressible_floor;
use crate::domain::frame::{pose, sprite, FramesetEntry, Sprite};
use crate::domain::survey::{survey, CoordFn, PosFn};

pub const STAND: Sprite = sprite("normal", 13, 51);
pub const NORMAL: [FramesetEntry; 1] = [pose(STAND, 0, 0)];

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, fall_check, physics_out)
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Normal) {
        k.i = 0;
        k.disturbance = Disturbance::None;
        k.hurt = false;
        k.inertia = 0;
        k.cinertia = 0;
        k.item_pos = None;
    }

    if k.key.shift {
        let s = survey(CoordFn::Middle, PosFn::Cell, &k.f, &ctx.view);
        if s.con.item != Item::None {
            k.item_pos = Some(s.pos);
            return ControlFlow::Break(Step::Switch(ActionKind::Couch));
        }
    }

    let next = if k.key.down {
        Some(ActionKind::Couch)
    } else if k.key.away(k.f.dir) {
        Some(ActionKind::Turn)
    } else if k.key.toward(k.f.dir) {
        Some(ActionKind::Walk)
    } else {
        None
    };
    if let Some(to) = next {
        return ControlFlow::Break(Step::Switch(to));
    }

    k.select_frame(&NORMAL, 0);
    ControlFlow::Continue(())
}

fn physics_out(k: &mut Anim, ctx: &mut Ctx) {
    update_depressible_floor(k, &ctx.view, ctx.presses, -4, -10);
}
