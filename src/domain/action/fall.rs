/// Fall: free fall until a floor line with something solid on it.
///
/// Speed grows by `FALL_ACCEL` per tick up to a cap (a much lower one
/// while a float potion is active); horizontal drift is the inertia the
/// actor carried off the edge. Each floor line the feet cross is counted,
/// and the count decides how the landing goes.
use std::ops::ControlFlow;

use log::debug;

use super::{keep_contacts, run_phases, ActionKind, Ctx, Entry, Step};
use crate::domain::anim::{Anim, Disturbance};
use crate::domain::collision::is_colliding;
use crate::domain::construct::ConstructKind;
use crate::domain::effect::{Effect, Sample};
use crate::domain::floor::{clear_depressible_floor, restore_depressible_floor, save_depressible_floor};
use crate::domain::frame::{pose, sprite, FrameOffset, FramesetEntry};
use crate::domain::pos::{Coord, Pos, FEET_Y, PLACE_HEIGHT};
use crate::domain::survey::{survey, CoordFn, PosFn};

pub const FALL: [FramesetEntry; 5] = [
    pose(sprite("fall-01", 15, 51), 0, 0),
    pose(sprite("fall-02", 16, 50), 0, 0),
    pose(sprite("fall-03", 17, 49), 0, 0),
    pose(sprite("fall-04", 17, 48), 0, 0),
    pose(sprite("fall-05", 17, 48), 0, 0),
];

pub const FALL_ACCEL: i32 = 3;
pub const FALL_SPEED_MAX: i32 = 33;
pub const FLOAT_SPEED_MAX: i32 = 4;
/// Floors fallen that hurt, and that kill.
pub const HURT_FLOORS: u32 = 2;
pub const DEADLY_FLOORS: u32 = 3;

/// Swap to the first falling pose where the actor is, feet anchored. The
/// feet have left the floor, so nothing is pressed any more.
pub fn prelude(k: &mut Anim) {
    k.f = k.f.next(&FrameOffset { sprite: FALL[0].sprite, dx: 0, dy: 0 });
    save_depressible_floor(k);
    clear_depressible_floor(k);
}

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, physics_in, keep_contacts)
}

fn flow(k: &mut Anim, _: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Fall) {
        k.i = -1;
        k.fall_speed = 0;
        k.floors_fallen = 0;
        k.disturbance = Disturbance::None;
        k.ci = None;
        k.hurt = false;
    }

    k.i = (k.i + 1).min(FALL.len() as i32 - 1);
    k.select_frame(&FALL, k.i);

    let cap = if k.float_ticks > 0 { FLOAT_SPEED_MAX } else { FALL_SPEED_MAX };
    k.fall_speed = (k.fall_speed + FALL_ACCEL).min(cap);
    k.fo.dy += k.fall_speed;
    k.fo.dx -= k.inertia;

    ControlFlow::Continue(())
}

fn physics_in(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    let view = &ctx.view;

    // A wall stops the drift; the landing will bounce off it.
    if k.inertia != 0 {
        if let Some(c) = is_colliding(&k.f, &k.fo, 0, false, view) {
            k.fo.dx += k.inertia;
            k.inertia = 0;
            k.ci = Some(c);
            k.disturbance = Disturbance::Collision;
            ctx.effects.push(Effect::Play(Sample::HitWall, k.f.c.room));
        }
    }

    let from = survey(CoordFn::MiddleBottom, PosFn::FloorLine, &k.f, view).raw.floor;
    let nf = k.f.next(&k.fo);
    let feet = CoordFn::MiddleBottom.of(&nf);
    let to = feet.raw_floor_pos().floor;
    for line in from + 1..=to {
        k.floors_fallen += 1;
        let line_y = PLACE_HEIGHT * line + FEET_Y;
        let p = Coord::new(feet.room, feet.x, line_y).normalize(view.links()).raw_pos();
        if !view.con(p).is_strictly_traversable() {
            k.fo.dy -= feet.y - line_y;
            k.f = k.f.next(&k.fo);
            return ControlFlow::Break(land(k, ctx, p));
        }
    }

    ControlFlow::Continue(())
}

/// Touch down on the floor line of `p`.
fn land(k: &mut Anim, ctx: &mut Ctx, p: Pos) -> Step {
    let n = k.floors_fallen;
    let room = k.f.c.room;
    debug!("actor {} landed at {:?} after {} floor(s)", k.id, p, n);

    // Back on a plate it was pressing when it left.
    if k.contacts.saved.contains(&Some(p)) {
        restore_depressible_floor(k);
    }

    if ctx.view.con(p).fg == ConstructKind::SpikesFloor {
        k.kill();
        ctx.effects.push(Effect::Died);
        ctx.effects.push(Effect::Play(Sample::Spiked, room));
    } else if k.float_ticks > 0 || n < HURT_FLOORS {
        ctx.effects.push(Effect::Play(Sample::HitGround, room));
    } else if n < DEADLY_FLOORS {
        k.hurt = true;
        k.uncouch_slowly = true;
        ctx.effects.push(Effect::Hurt);
        if k.hurt_once() {
            ctx.effects.push(Effect::Died);
        }
        ctx.effects.push(Effect::Play(Sample::HurtLanding, room));
    } else {
        k.kill();
        ctx.effects.push(Effect::Died);
        ctx.effects.push(Effect::Play(Sample::HurtLanding, room));
    }

    if k.disturbance == Disturbance::Collision {
        if let Some(c) = k.ci.as_mut() {
            c.pos = ctx.view.rel(p, 0, k.f.dir.sign());
            return Step::Enter(Entry::Collision);
        }
    }
    Step::Switch(ActionKind::Couch)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::normal::STAND;
    use crate::domain::frame::Dir;
    use crate::domain::testing::{actor_at, Bench};

    fn faller(p: Pos, ox: i32, dir: Dir) -> Anim {
        let mut k = actor_at(p, ox, dir, STAND);
        k.pending = Some(Entry::Fall);
        k
    }

    fn fall_until_landed(b: &mut Bench, k: &mut Anim) {
        for _ in 0..100 {
            b.run(k);
            if k.action != ActionKind::Fall {
                return;
            }
        }
        panic!("never landed");
    }

    #[test]
    fn one_floor_drop_lands_softly() {
        let mut b = Bench::new(&[
            "__________",
            "____._____",
            "__________",
        ]);
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        fall_until_landed(&mut b, &mut k);
        assert_eq!(k.action, ActionKind::Couch);
        assert_eq!(k.floors_fallen, 1);
        assert_eq!(k.lives.current, 3);
        assert!(b.played(Sample::HitGround));
        assert_eq!(CoordFn::MiddleBottom.of(&k.f).y, Pos::new(1, 2, 4).feet_y());
    }

    #[test]
    fn landing_on_a_pressed_place_restores_contacts() {
        let mut b = Bench::new(&[
            "__________",
            "____._____",
            "__________",
        ]);
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        let below = Pos::new(1, 2, 4);
        k.contacts.current = [Some(below), None];
        b.run(&mut k);
        assert_eq!(k.contacts.current, [None, None]);
        assert_eq!(k.contacts.saved, [Some(below), None]);
        fall_until_landed(&mut b, &mut k);
        assert_eq!(k.contacts.current, [Some(below), None]);
        assert!(b.presses.contains(below));
    }

    #[test]
    fn lifted_contacts_stay_behind() {
        let mut b = Bench::new(&[
            "__________",
            "____._____",
            "__________",
        ]);
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        k.contacts.current = [Some(Pos::new(1, 1, 5)), None];
        fall_until_landed(&mut b, &mut k);
        assert_eq!(k.contacts.current, [None, None]);
    }

    #[test]
    fn speed_grows_to_the_cap() {
        let mut b = Bench::new(&[
            "____._____",
            "____._____",
            "____._____",
        ]);
        let mut k = faller(Pos::new(1, 0, 4), 10, Dir::Left);
        let mut speeds = vec![];
        for _ in 0..4 {
            b.run(&mut k);
            speeds.push(k.fall_speed);
        }
        assert_eq!(speeds, vec![3, 6, 9, 12]);
        assert_eq!(k.i, 3);
        while k.action == ActionKind::Fall {
            b.run(&mut k);
            assert!(k.fall_speed <= FALL_SPEED_MAX);
            assert!(k.i <= 4);
        }
    }

    #[test]
    fn two_floors_hurt() {
        let mut b = Bench::with_level(crate::domain::testing::level_text(
            "@room 1 below=2\n__________\n____._____\n____._____\n\
             @room 2 above=1\n__________\n__________\n__________\n",
        ));
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        fall_until_landed(&mut b, &mut k);
        assert_eq!(k.floors_fallen, 2);
        assert!(k.hurt && k.uncouch_slowly);
        assert_eq!(k.lives.current, 2);
        assert!(k.alive);
        assert!(b.effects.contains(&Effect::Hurt));
        // Landed on the top floor of the room below.
        assert_eq!(k.f.normalized(&b.level.links).c.room, 2);
    }

    #[test]
    fn three_floors_kill() {
        let mut b = Bench::with_level(crate::domain::testing::level_text(
            "@room 1 below=2\n__________\n____._____\n____._____\n\
             @room 2 above=1\n____._____\n__________\n__________\n",
        ));
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        fall_until_landed(&mut b, &mut k);
        assert_eq!(k.floors_fallen, 3);
        assert!(!k.alive);
        assert!(b.effects.contains(&Effect::Died));
    }

    #[test]
    fn spikes_kill_on_any_landing() {
        let mut b = Bench::new(&[
            "__________",
            "____._____",
            "____^_____",
        ]);
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        fall_until_landed(&mut b, &mut k);
        assert!(!k.alive);
        assert!(b.played(Sample::Spiked));
    }

    #[test]
    fn float_potion_slows_and_softens() {
        let mut b = Bench::with_level(crate::domain::testing::level_text(
            "@room 1 below=2\n__________\n____._____\n____._____\n\
             @room 2 above=1\n__________\n__________\n__________\n",
        ));
        let mut k = faller(Pos::new(1, 1, 4), 10, Dir::Left);
        k.float_ticks = 1000;
        b.run(&mut k);
        b.run(&mut k);
        assert_eq!(k.fall_speed, FLOAT_SPEED_MAX);
        fall_until_landed(&mut b, &mut k);
        assert_eq!(k.lives.current, 3);
        assert!(!k.hurt);
    }

    #[test]
    fn drift_into_a_wall_lands_as_a_collision() {
        let mut b = Bench::new(&[
            "__________",
            "____.#____",
            "__________",
        ]);
        let mut k = faller(Pos::new(1, 1, 4), 16, Dir::Right);
        k.inertia = 2;
        fall_until_landed(&mut b, &mut k);
        assert!(b.played(Sample::HitWall));
        assert_eq!(k.inertia, 0);
        // The landing passes straight into the collision crouch.
        assert_eq!(k.action, ActionKind::Couch);
        assert_eq!(k.disturbance, Disturbance::Collision);
        let s = survey(CoordFn::BottomFront, PosFn::Cell, &k.f, &b.view());
        assert_eq!(s.pos, Pos::new(1, 2, 4));
    }
}
