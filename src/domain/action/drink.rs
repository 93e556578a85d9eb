/// Drink: gulp down the potion at `item_pos`.
use std::ops::ControlFlow;

use super::{fall_check, keep_contacts, run_phases, ActionKind, Ctx, Step};
use crate::domain::anim::{Anim, MAX_LIVES};
use crate::domain::construct::{Item, Potion};
use crate::domain::effect::{Effect, Sample};
use crate::domain::frame::{pose, sprite, FramesetEntry};

pub const DRINK: [FramesetEntry; 15] = [
    pose(sprite("drink-01", 21, 31), 0, 0),
    pose(sprite("drink-02", 20, 33), 0, 0),
    pose(sprite("drink-03", 19, 36), 1, 0),
    pose(sprite("drink-04", 18, 39), 0, 0),
    pose(sprite("drink-05", 17, 42), 0, 0),
    pose(sprite("drink-06", 16, 45), 0, 0),
    pose(sprite("drink-07", 15, 48), -1, 0),
    pose(sprite("drink-08", 14, 50), 0, 0),
    pose(sprite("drink-09", 14, 51), 0, 0),
    pose(sprite("drink-10", 15, 51), 0, 0),
    pose(sprite("drink-11", 15, 51), 0, 0),
    pose(sprite("drink-12", 14, 51), 0, 0),
    pose(sprite("drink-13", 14, 51), 0, 0),
    pose(sprite("drink-14", 13, 51), 0, 0),
    pose(sprite("drink-15", 13, 51), 0, 0),
];

/// Frame at which the potion takes effect.
pub const DRINK_INDEX: i32 = 8;
/// Ticks a float potion lasts.
pub const FLOAT_TICKS: u32 = 360;

pub fn tick(k: &mut Anim, ctx: &mut Ctx) -> Step {
    run_phases(k, ctx, flow, fall_check, keep_contacts)
}

fn flow(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if k.entering(ActionKind::Drink) {
        k.i = -1;
    }

    if k.i == DRINK.len() as i32 - 1 {
        k.item_pos = None;
        return ControlFlow::Break(Step::Switch(ActionKind::Normal));
    }

    k.i += 1;
    k.select_frame(&DRINK, k.i);

    if k.i == DRINK_INDEX {
        if let Some(p) = k.item_pos {
            if let Item::Potion(potion) = ctx.view.con(p).item {
                ctx.effects.push(Effect::TakeItem(p));
                ctx.effects.push(Effect::Play(Sample::Drink, k.f.c.room));
                quaff(k, potion, ctx.effects);
            }
        }
    }

    ControlFlow::Continue(())
}

fn quaff(k: &mut Anim, potion: Potion, effects: &mut Vec<Effect>) {
    match potion {
        Potion::SmallLife => k.lives.current = (k.lives.current + 1).min(k.lives.total),
        Potion::BigLife => {
            k.lives.total = (k.lives.total + 1).min(MAX_LIVES);
            k.lives.current = k.lives.total;
        }
        Potion::Poison => {
            effects.push(Effect::Hurt);
            if k.hurt_once() {
                effects.push(Effect::Died);
            }
        }
        Potion::Float => k.float_ticks = FLOAT_TICKS,
    }
}
