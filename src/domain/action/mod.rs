/// Action state machine.
///
/// Every action is a handler run once per tick for each actor in that
/// action. A handler body has three ordered phases:
///
///   flow        — entry reset, sub-transitions, frame selection
///   physics-in  — collision and support checks
///   physics-out — depressible-floor contacts
///
/// Either of the first two phases may end the tick early with a
/// transition. A plain `Switch` takes effect from the next tick. The three
/// entry points (`Entry`) re-anchor the frame and run the target handler
/// once more within the same tick.
use std::ops::ControlFlow;

use log::debug;

use super::anim::Anim;
use super::collision::Collision;
use super::construct::ConstructKind;
use super::effect::Effect;
use super::floor::keep_depressible_floor;
use super::pressure::PressLog;
use super::survey::{survey, CoordFn, MapView, PosFn};

pub mod climb;
pub mod couch;
pub mod drink;
pub mod fall;
pub mod hang;
pub mod normal;
pub mod raise_sword;
pub mod stabilize;
pub mod turn;
pub mod unclimb;
pub mod walk;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ActionKind {
    Normal,
    Walk,
    Turn,
    Couch,
    Fall,
    Drink,
    RaiseSword,
    Stabilize,
    Unclimb,
    Hang,
    Climb,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Normal => "normal",
            ActionKind::Walk => "walk",
            ActionKind::Turn => "turn",
            ActionKind::Couch => "couch",
            ActionKind::Fall => "fall",
            ActionKind::Drink => "drink",
            ActionKind::RaiseSword => "raise sword",
            ActionKind::Stabilize => "stabilize",
            ActionKind::Unclimb => "unclimb",
            ActionKind::Hang => "hang",
            ActionKind::Climb => "climb",
        }
    }
}

/// Entry points that re-anchor the frame and run their target action in
/// the same tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Entry {
    /// Knocked into a crouch against a wall (after `ci` was recorded).
    Collision,
    /// Knocked into a crouch where the actor stands.
    Sudden,
    /// Lost support.
    Fall,
}

impl Entry {
    pub fn target(self) -> ActionKind {
        match self {
            Entry::Collision | Entry::Sudden => ActionKind::Couch,
            Entry::Fall => ActionKind::Fall,
        }
    }
}

/// Outcome of one handler run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Continue,
    Switch(ActionKind),
    Enter(Entry),
}

/// What a handler may read and where it records what it did.
pub struct Ctx<'a> {
    pub view: MapView<'a>,
    pub presses: &'a mut PressLog,
    pub effects: &'a mut Vec<Effect>,
}

type Handler = fn(&mut Anim, &mut Ctx) -> Step;
type Phase = fn(&mut Anim, &mut Ctx) -> ControlFlow<Step>;

fn handler(kind: ActionKind) -> Handler {
    match kind {
        ActionKind::Normal => normal::tick,
        ActionKind::Walk => walk::tick,
        ActionKind::Turn => turn::tick,
        ActionKind::Couch => couch::tick,
        ActionKind::Fall => fall::tick,
        ActionKind::Drink => drink::tick,
        ActionKind::RaiseSword => raise_sword::tick,
        ActionKind::Stabilize => stabilize::tick,
        ActionKind::Unclimb => unclimb::tick,
        ActionKind::Hang => hang::tick,
        ActionKind::Climb => climb::tick,
    }
}

// ══════════════════════════════════════════════════════════════
// Dispatcher
// ══════════════════════════════════════════════════════════════

/// Run one tick of an actor's current action.
pub fn run(k: &mut Anim, ctx: &mut Ctx) {
    if k.float_ticks > 0 {
        k.float_ticks -= 1;
    }
    match k.pending.take() {
        Some(entry) => enter(k, ctx, entry),
        None => {
            let step = handler(k.action)(k, ctx);
            apply(k, ctx, step, true);
        }
    }
    k.f = k.f.normalized(ctx.view.links());
}

/// Settle a handler's outcome. A body that ended early skipped its
/// physics-out, so its floor contacts are kept here instead.
fn apply(k: &mut Anim, ctx: &mut Ctx, step: Step, pass_through: bool) {
    match step {
        Step::Continue => k.oaction = k.action,
        Step::Switch(to) => {
            keep_depressible_floor(k, ctx.presses);
            switch(k, ctx, to);
        }
        Step::Enter(entry) if pass_through => enter(k, ctx, entry),
        // One pass-through per tick; a second one waits for the next run.
        Step::Enter(entry) => {
            keep_depressible_floor(k, ctx.presses);
            k.oaction = k.action;
            k.pending = Some(entry);
        }
    }
}

fn switch(k: &mut Anim, ctx: &mut Ctx, to: ActionKind) {
    let from = k.action;
    debug!("actor {}: {} -> {}", k.id, from.name(), to.name());
    ctx.effects.push(Effect::Transition { from, to });
    k.oaction = from;
    k.action = to;
}

fn enter(k: &mut Anim, ctx: &mut Ctx, entry: Entry) {
    let to = entry.target();
    switch(k, ctx, to);
    k.entry = Some(entry);
    match entry {
        Entry::Collision => couch::collision_prelude(k, ctx),
        Entry::Sudden => couch::sudden_prelude(k, ctx),
        Entry::Fall => fall::prelude(k),
    }
    let step = handler(to)(k, ctx);
    k.entry = None;
    apply(k, ctx, step, false);
}

// ══════════════════════════════════════════════════════════════
// Shared pieces
// ══════════════════════════════════════════════════════════════

/// Run the three phases of a handler body. The frame offset chosen by
/// `flow` (and possibly corrected by `physics_in`) is committed between
/// physics-in and physics-out.
fn run_phases(k: &mut Anim, ctx: &mut Ctx, flow: Phase, physics_in: Phase, physics_out: fn(&mut Anim, &mut Ctx)) -> Step {
    k.f.flip = k.f.dir == super::frame::Dir::Right;
    if let ControlFlow::Break(step) = flow(k, ctx) {
        return step;
    }
    if let ControlFlow::Break(step) = physics_in(k, ctx) {
        return step;
    }
    k.f = k.f.next(&k.fo);
    physics_out(k, ctx);
    Step::Continue
}

/// Nothing to stand on: the place under the actor is empty, or its loose
/// floor has just let go.
pub fn lacks_support(k: &Anim, view: &MapView) -> bool {
    let s = survey(CoordFn::Middle, PosFn::Cell, &k.f, view);
    s.con.is_strictly_traversable()
        || (s.con.fg == ConstructKind::LooseFloor && view.loose_falling_at(s.pos))
}

/// Stop against an obstruction: momentum is gone and the stabilize action
/// takes over from the next tick.
fn stabilize_collision(k: &mut Anim, c: Collision) -> Step {
    k.ci = Some(c);
    k.inertia = 0;
    k.cinertia = 0;
    Step::Switch(ActionKind::Stabilize)
}

fn fall_check(k: &mut Anim, ctx: &mut Ctx) -> ControlFlow<Step> {
    if lacks_support(k, &ctx.view) {
        return ControlFlow::Break(Step::Enter(Entry::Fall));
    }
    ControlFlow::Continue(())
}

fn no_physics(_: &mut Anim, _: &mut Ctx) -> ControlFlow<Step> {
    ControlFlow::Continue(())
}

/// Physics-out for poses that press nothing new.
fn keep_contacts(k: &mut Anim, ctx: &mut Ctx) {
    keep_depressible_floor(k, ctx.presses);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
