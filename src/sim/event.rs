/// Events emitted during a simulation step.
/// The presentation layer consumes these for animation/sound.
use crate::domain::action::ActionKind;
use crate::domain::construct::Item;
use crate::domain::effect::Sample;
use crate::domain::pos::{Pos, RoomId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    Sample { sample: Sample, room: RoomId },
    ActionChanged { actor: usize, from: ActionKind, to: ActionKind },
    FloorPressed { pos: Pos },
    LooseFloorReleased { pos: Pos },
    LooseFloorShattered { pos: Pos },
    ActorHurt { actor: usize },
    ActorDied { actor: usize },
    ItemTaken { actor: usize, pos: Pos, item: Item },
}
