/// Turn: face the other way, then walk on if the key is still held.
use std::ops::ControlFlow;

use super::{fall_check, keep_contacts, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::Anim;
use crate::domain::frame::{pose, sprite, FramesetEntry};

pub const TURN: [FramesetEntry; 4] = [
    pose(sprite("turn-01", 13, 51), 0, 0),
    pose(sprite("turn-02", 15, 51), -1, 0),
    pose(sprite("turn-03", 15, 51), 1, 0),
    pose(sprite("turn-04", 13, 51), 0, 0),
];

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, fall_check, keep_contacts)
}

fn flow(k: &mut Anim, _: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Turn) {
        k.i = -1;
        k.f.dir = k.f.dir.flip();
    }

    if k.i == TURN.len() as i32 - 1 {
        let to = if k.key.toward(k.f.dir) { ActionKind::Walk } else { ActionKind::Normal };
        return ControlFlow::Break(Step::Switch(to));
    }

    k.i += 1;
    k.select_frame(&TURN, k.i);
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::normal::STAND;
    use crate::domain::frame::Dir;
    use crate::domain::pos::Pos;
    use crate::domain::testing::{actor_at, Bench};

    const FLAT: [&str; 3] = [
        "__________",
        "__________",
        "__________",
    ];

    #[test]
    fn turn_flips_and_walks_on() {
        let mut b = Bench::new(&FLAT);
        let mut k = actor_at(Pos::new(1, 1, 4), 10, Dir::Left, STAND);
        k.key.right = true;
        b.run(&mut k);
        assert_eq!(k.action, ActionKind::Turn);
        b.run(&mut k);
        assert_eq!(k.f.dir, Dir::Right);
        assert!(k.f.flip);
        while k.action == ActionKind::Turn {
            b.run(&mut k);
        }
        assert_eq!(k.action, ActionKind::Walk);
    }

    #[test]
    fn released_key_stands() {
        let mut b = Bench::new(&FLAT);
        let mut k = actor_at(Pos::new(1, 1, 4), 10, Dir::Right, STAND);
        k.action = ActionKind::Turn;
        for _ in 0..5 {
            b.run(&mut k);
        }
        assert_eq!(k.f.dir, Dir::Left);
        assert_eq!(k.action, ActionKind::Normal);
    }
}
