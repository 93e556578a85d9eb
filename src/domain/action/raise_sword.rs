/// Raise sword: take the sword at `item_pos` and hold it up.
use std::ops::ControlFlow;

use super::{fall_check, keep_contacts, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::Anim;
use crate::domain::construct::Item;
use crate::domain::effect::{Effect, Sample};
use crate::domain::frame::{pose, sprite, FramesetEntry};

pub const RAISE_SWORD: [FramesetEntry; 5] = [
    pose(sprite("raise-sword-01", 21, 31), 0, 0),
    pose(sprite("raise-sword-02", 19, 38), 0, 0),
    pose(sprite("raise-sword-03", 17, 45), 1, 0),
    pose(sprite("raise-sword-04", 15, 51), 0, 0),
    pose(sprite("raise-sword-05", 14, 55), 0, 0),
];

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, fall_check, keep_contacts)
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::RaiseSword) {
        k.i = -1;
    }

    if k.i == RAISE_SWORD.len() as i32 - 1 {
        k.item_pos = None;
        return ControlFlow::Break(Step::Switch(ActionKind::Normal));
    }

    k.i += 1;
    k.select_frame(&RAISE_SWORD, k.i);

    if k.i == 0 {
        if let Some(p) = k.item_pos.filter(|p| ctx.view.con(*p).item == Item::Sword) {
            k.has_sword = true;
            ctx.effects.push(Effect::TakeItem(p));
            ctx.effects.push(Effect::Play(Sample::TakeSword, k.f.c.room));
        }
    }

    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::couch::COUCH;
    use crate::domain::frame::Dir;
    use crate::domain::pos::Pos;
    use crate::domain::testing::{actor_at, Bench};

    fn raiser(b_row: &str) -> (Bench, Anim, Pos) {
        let b = Bench::new(&["__________", b_row, "__________"]);
        let p = Pos::new(1, 1, 4);
        let mut k = actor_at(p, 10, Dir::Right, COUCH[2].sprite);
        k.action = ActionKind::RaiseSword;
        k.oaction = ActionKind::Couch;
        k.item_pos = Some(p);
        (b, k, p)
    }

    #[test]
    fn takes_the_sword_on_the_first_frame() {
        let (mut b, mut k, p) = raiser("____s_____");
        b.run(&mut k);
        assert!(k.has_sword);
        assert!(b.effects.contains(&Effect::TakeItem(p)));
        assert!(b.played(Sample::TakeSword));
        while k.action == ActionKind::RaiseSword {
            b.run(&mut k);
        }
        assert_eq!(k.action, ActionKind::Normal);
        assert_eq!(k.item_pos, None);
    }

    #[test]
    fn nothing_to_take_still_finishes() {
        let (mut b, mut k, _) = raiser("__________");
        for _ in 0..6 {
            b.run(&mut k);
        }
        assert!(!k.has_sword);
        assert!(!b.played(Sample::TakeSword));
        assert_eq!(k.action, ActionKind::Normal);
    }
}
