/// Per-tick record of floor positions under actors' feet.
///
/// Actors only record presses while they run; plates and loose floors read
/// the whole log afterwards, so several actors standing on one plate in
/// the same tick count once and none of them sees another's update.
use std::collections::BTreeSet;

use super::pos::Pos;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PressLog {
    pressed: BTreeSet<Pos>,
}

impl PressLog {
    pub fn press(&mut self, p: Pos) {
        self.pressed.insert(p);
    }

    pub fn contains(&self, p: Pos) -> bool {
        self.pressed.contains(&p)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pos> {
        self.pressed.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}
