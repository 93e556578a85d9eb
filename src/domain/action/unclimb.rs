/// Unclimb: lower the body over the edge behind, down to hanging.
///
/// Plays the climb backward: the crouch is re-anchored on the ledge with
/// its back flush to the edge, then each climb offset is undone in
/// reverse order.
use std::ops::ControlFlow;

use super::climb::CLIMB;
use super::{keep_contacts, no_physics, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::Anim;
use crate::domain::floor::{clear_depressible_floor, save_depressible_floor};
use crate::domain::frame::{Dir, Frame, FrameOffset};
use crate::domain::pos::{FEET_Y, PLACE_WIDTH};

const LAST: i32 = CLIMB.len() as i32 - 1;

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, no_physics, keep_contacts)
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Unclimb) {
        let Some(hp) = k.hang_pos else {
            return ControlFlow::Break(Step::Switch(ActionKind::Normal));
        };
        k.i = -1;
        k.inertia = 0;
        k.cinertia = 0;
        // The hands take over from the feet; climbing back up restores them.
        save_depressible_floor(k);
        clear_depressible_floor(k);

        let ledge = ctx.view.rel(hp, -1, k.f.dir.sign());
        let s = CLIMB[LAST as usize].sprite;
        let dx = match k.f.dir {
            Dir::Right => 0,
            Dir::Left => PLACE_WIDTH - s.w,
        };
        k.f = Frame::placed(s, ledge, k.f.dir, dx, FEET_Y + 1 - s.h);
    }

    if k.i == LAST {
        return ControlFlow::Break(Step::Switch(ActionKind::Hang));
    }

    k.i += 1;
    k.fo = if k.i == 0 {
        FrameOffset { sprite: CLIMB[LAST as usize].sprite, dx: 0, dy: 0 }
    } else {
        let j = (LAST - k.i) as usize;
        FrameOffset { sprite: CLIMB[j].sprite, dx: -CLIMB[j + 1].dx, dy: -CLIMB[j + 1].dy }
    };
    ControlFlow::Continue(())
}
