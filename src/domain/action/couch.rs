/// Couch: the crouch, and everything that funnels through it.
///
/// Landing from a fall, bumping into a wall, being struck by a loose floor,
/// picking up an item and finishing a climb all pass through this pose.
/// The animation holds at `ITEM_INDEX` while the down key is held, and
/// restarts from frame 0 (a crouch-hop) when a key toward the facing
/// direction is added.
use std::ops::ControlFlow;

use super::{lacks_support, run_phases, stabilize_collision, ActionKind, Ctx, Entry, Step};
use crate::domain::anim::{Anim, Disturbance};
use crate::domain::collision::{door_split, is_colliding, CollisionKind};
use crate::domain::construct::{ConstructKind, Item};
use crate::domain::effect::{Effect, Sample};
use crate::domain::floor::{keep_depressible_floor, update_depressible_floor};
use crate::domain::frame::{pose, sprite, Dir, Frame, FramesetEntry};
use crate::domain::door::DOOR_CLIMB_LIMIT;
use crate::domain::pos::{Pos, FEET_Y, PLACE_WIDTH};
use crate::domain::survey::{dist_next_place, is_hangable_pos, survey, CoordFn, PosFn};

pub const COUCH: [FramesetEntry; 13] = [
    pose(sprite("couch-01", 17, 36), -3, 0),
    pose(sprite("couch-02", 20, 33), -4, 0),
    pose(sprite("couch-03", 21, 31), 0, 0),
    pose(sprite("couch-04", 22, 30), -4, 0),
    pose(sprite("couch-05", 22, 30), -1, 0),
    pose(sprite("couch-06", 21, 31), -4, 0),
    pose(sprite("couch-07", 19, 33), 1, 0),
    pose(sprite("couch-08", 18, 37), -2, 0),
    pose(sprite("couch-09", 17, 41), -1, 0),
    pose(sprite("couch-10", 16, 45), 0, 0),
    pose(sprite("couch-11", 15, 48), 3, 0),
    pose(sprite("couch-12", 14, 50), 0, 0),
    pose(sprite("couch-13", 13, 51), 4, 0),
];

/// Maximum distance (px) from the back edge of the place at which a
/// crouch turns into climbing down.
pub const UNCLIMB_REACH: i32 = 27;
/// Frame at which a pending item is picked up, and at which the crouch
/// holds while down is pressed.
pub const ITEM_INDEX: i32 = 2;
pub const LAST_INDEX: i32 = 12;
/// Cooldown after a hurtful landing before the actor may stand.
pub const SLOW_UNCOUCH_WAIT: i32 = 36;
/// Frame a finished climb continues from, and its registration nudge.
pub const CLIMB_SEED: i32 = 10;
pub const CLIMB_NUDGE: i32 = 7;
/// Mirror tolerance: probed this far ahead, slid back by the nudge.
pub const MIRROR_MARGIN: i32 = 2;
pub const MIRROR_NUDGE: i32 = 4;

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

/// First crouch pose centred on `p`, resting on its floor line.
fn crouch_at(p: Pos, dir: Dir) -> Frame {
    let s = COUCH[0].sprite;
    Frame::placed(s, p, dir, (PLACE_WIDTH - s.w) / 2, FEET_Y + 1 - s.h)
}

/// Knocked back from the obstruction recorded in `ci`: crouch in the place
/// in front of it.
pub fn collision_prelude(k: &mut Anim, ctx: &mut Ctx) {
    let Some(c) = k.ci else {
        debug_assert!(false, "collision entry without a collision");
        return sudden_prelude(k, ctx);
    };
    let p = ctx.view.rel(c.pos, 0, -k.f.dir.sign());
    k.f = crouch_at(p, k.f.dir);
    ctx.effects.push(Effect::Play(Sample::HitWall, k.f.c.room));
}

/// Crouch where the actor's head is.
pub fn sudden_prelude(k: &mut Anim, ctx: &mut Ctx) {
    let s = survey(CoordFn::MiddleTop, PosFn::Cell, &k.f, &ctx.view);
    k.f = crouch_at(s.pos, k.f.dir);
}

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, physics_in, physics_out)
}

// ══════════════════════════════════════════════════════════════
// Phases
// ══════════════════════════════════════════════════════════════

/// `oaction` only names the previous action on a plain switch; an entry
/// point overrides it.
fn came_from(k: &Anim, kind: ActionKind) -> bool {
    k.entry.is_none() && k.oaction == kind
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Couch) {
        k.i = -1;
        k.disturbance = Disturbance::None;
        k.wait = 0;
    }

    if k.uncouch_slowly {
        k.wait = SLOW_UNCOUCH_WAIT;
        k.uncouch_slowly = false;
    }

    if came_from(k, ActionKind::Climb) {
        k.i = CLIMB_SEED;
    }

    if k.entry == Some(Entry::Collision) {
        k.disturbance = Disturbance::Collision;
        k.inertia = 0;
        k.cinertia = 0;
    } else if came_from(k, ActionKind::Fall) {
        k.disturbance = Disturbance::Fall;
        k.inertia = 0;
        k.cinertia = 0;
    }

    // ── unclimb ──
    let view = &ctx.view;
    let front = survey(CoordFn::TopFront, PosFn::Cell, &k.f, view);
    let feet = survey(CoordFn::BottomFront, PosFn::Cell, &k.f, view);
    let ph = view.rel(feet.pos, 1, -k.f.dir.sign());
    let door_too_closed = front.con.fg == ConstructKind::Door
        && k.f.dir == Dir::Left
        && view.door_at(front.pos).is_some_and(|d| d.i > DOOR_CLIMB_LIMIT);
    if k.i == -1
        && k.disturbance == Disturbance::None
        && !k.hit_by_loose_floor
        && k.item_pos.is_none()
        && is_hangable_pos(view, ph, k.f.dir)
        && dist_next_place(&k.f, CoordFn::TopFront, 0, true) <= UNCLIMB_REACH
        && !door_too_closed
    {
        k.hang_pos = Some(ph);
        return ControlFlow::Break(Step::Switch(ActionKind::Unclimb));
    }

    if k.i == LAST_INDEX {
        k.hit_by_loose_floor = false;
        return ControlFlow::Break(Step::Switch(ActionKind::Normal));
    }

    // ── item pick-up ──
    let settled = !matches!(k.disturbance, Disturbance::Collision | Disturbance::Fall);
    if k.i == ITEM_INDEX && settled {
        if let Some(p) = k.item_pos {
            match view.con(p).item {
                Item::Potion(_) => return ControlFlow::Break(Step::Switch(ActionKind::Drink)),
                Item::Sword => return ControlFlow::Break(Step::Switch(ActionKind::RaiseSword)),
                // Nothing left to take: forget it and carry on crouching.
                Item::None => k.item_pos = None,
            }
        }
    }

    // ── crouch-hop ──
    if k.i == ITEM_INDEX
        && k.key.down
        && k.cinertia == 0
        && k.wait_elapsed()
        && k.key.toward(k.f.dir)
    {
        k.i = 0;
        k.select_frame(&COUCH, 0);
        return ControlFlow::Continue(());
    }

    if k.i != ITEM_INDEX || (!k.key.down && k.wait_elapsed()) {
        k.i += 1;
    }

    // A hurt landing or a slab on the head skips straight to the hold.
    if k.i == 1
        && k.wait > 0
        && ((k.disturbance == Disturbance::Fall && k.hurt) || k.hit_by_loose_floor)
    {
        k.i = ITEM_INDEX;
    }

    k.select_frame(&COUCH, k.i);

    if came_from(k, ActionKind::Climb) {
        k.fo.dx += CLIMB_NUDGE;
    }
    if k.i > 0 && k.i < 3 {
        k.fo.dx -= k.cinertia;
    }
    if k.cinertia > 0 {
        k.cinertia -= 1;
    }

    ControlFlow::Continue(())
}

fn physics_in(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    let view = &ctx.view;

    // Two tiers: anything but a mirror stops the actor at once; a mirror
    // only once the crouch is past its first frames.
    match is_colliding(&k.f, &k.fo, 0, false, view) {
        Some(c) if c.kind != CollisionKind::Mirror => {
            return ControlFlow::Break(stabilize_collision(k, c));
        }
        _ => {
            if let Some(c) = is_colliding(&k.f, &k.fo, MIRROR_MARGIN, false, view)
                .filter(|c| c.kind == CollisionKind::Mirror)
            {
                if k.i <= ITEM_INDEX {
                    k.f = k.f.advanced(-MIRROR_NUDGE);
                } else {
                    return ControlFlow::Break(stabilize_collision(k, c));
                }
            }
        }
    }

    if let Some((f, c)) = door_split(&k.f, view) {
        k.f = f;
        return ControlFlow::Break(stabilize_collision(k, c));
    }

    if lacks_support(k, view) && !(k.disturbance == Disturbance::Fall && k.i == 0) {
        return ControlFlow::Break(Step::Enter(Entry::Fall));
    }

    ControlFlow::Continue(())
}

/// Foot contacts per frame; the rest of the crouch keeps the last ones.
const CONTACTS: [(i32, (i32, i32)); 6] = [
    (0, (-7, -9)),
    (2, (-1, -13)),
    (5, (-19, -20)),
    (7, (-12, -22)),
    (8, (-9, -10)),
    (11, (-6, -12)),
];

fn physics_out(k: &mut Anim, ctx: &mut Ctx) {
    match CONTACTS.iter().find(|(i, _)| *i == k.i) {
        Some(&(_, (dx0, dx1))) => update_depressible_floor(k, &ctx.view, ctx.presses, dx0, dx1),
        None => keep_depressible_floor(k, ctx.presses),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
