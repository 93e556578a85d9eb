/// Side effects requested or reported by domain code during a tick.
///
/// Action handlers never touch the level or the audio device directly:
/// they push effects, and `sim::step` applies them (taking items) and
/// republishes them as `SimEvent`s for the frontend.
use super::action::ActionKind;
use super::pos::{Pos, RoomId};

/// Audio triggers. The frontend decides what each one sounds like.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Sample {
    HitWall,
    HitGround,
    HurtLanding,
    Drink,
    TakeSword,
    Plate,
    LooseShake,
    LooseBreak,
    DoorOpen,
    DoorClose,
    DoorSlam,
    Spiked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    Play(Sample, RoomId),
    /// The running actor picks up the item at this position.
    TakeItem(Pos),
    Transition { from: ActionKind, to: ActionKind },
    Hurt,
    Died,
    PlatePressed(Pos),
    LooseReleased(Pos),
    LooseShattered(Pos),
}
