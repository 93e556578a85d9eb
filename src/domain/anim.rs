/// The per-actor animation record.
///
/// Everything an action handler reads or writes about one actor lives
/// here: the current frame and the pending offset, the action state
/// machine's bookkeeping, the sticky flags set by falls and collisions,
/// momentum, the key snapshot for this tick and the depressible-floor
/// contacts.
use super::action::{ActionKind, Entry};
use super::collision::Collision;
use super::frame::{Dir, Frame, FrameOffset, FramesetEntry};
use super::pos::Pos;

pub const MAX_LIVES: u32 = 10;

/// Keys held this tick. `shift` is the action/grab key.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shift: bool,
}

impl KeyState {
    /// Direction key pointing the way the actor faces.
    pub fn toward(&self, dir: Dir) -> bool {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    pub fn away(&self, dir: Dir) -> bool {
        self.toward(dir.flip())
    }
}

/// What knocked the actor into its current pose. Falls and collisions are
/// mutually exclusive; whichever came last wins.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Disturbance {
    #[default]
    None,
    Fall,
    Collision,
    Misstep,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Lives {
    pub current: u32,
    pub total: u32,
}

/// Depressible-floor contacts: the places last pressed by the actor's
/// feet, plus a stash kept across poses that lift them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FloorContacts {
    pub current: [Option<Pos>; 2],
    pub saved: [Option<Pos>; 2],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Anim {
    pub id: usize,
    pub f: Frame,
    pub fo: FrameOffset,

    pub action: ActionKind,
    /// Action that ran on the previous tick (or just before a pass-through).
    pub oaction: ActionKind,
    /// Entry point being executed this tick, if the handler was reached
    /// through one.
    pub entry: Option<Entry>,
    /// Entry requested from outside the handler (a slab strike); taken on
    /// the actor's next run.
    pub pending: Option<Entry>,

    /// Frame index into the current action's frameset. -1 right after
    /// entering an action.
    pub i: i32,
    pub wait: i32,

    pub disturbance: Disturbance,
    pub hurt: bool,
    pub hit_by_loose_floor: bool,
    pub uncouch_slowly: bool,

    pub inertia: i32,
    pub cinertia: i32,
    pub fall_speed: i32,
    pub floors_fallen: u32,
    pub float_ticks: u32,

    pub key: KeyState,
    pub item_pos: Option<Pos>,
    pub hang_pos: Option<Pos>,
    pub ci: Option<Collision>,
    pub contacts: FloorContacts,

    pub lives: Lives,
    pub has_sword: bool,
    pub alive: bool,
}

impl Anim {
    /// An actor standing still with `f` as its current frame.
    pub fn new(id: usize, f: Frame) -> Self {
        Anim {
            id,
            f,
            fo: FrameOffset::still(&f),
            action: ActionKind::Normal,
            oaction: ActionKind::Normal,
            entry: None,
            pending: None,
            i: 0,
            wait: 0,
            disturbance: Disturbance::None,
            hurt: false,
            hit_by_loose_floor: false,
            uncouch_slowly: false,
            inertia: 0,
            cinertia: 0,
            fall_speed: 0,
            floors_fallen: 0,
            float_ticks: 0,
            key: KeyState::default(),
            item_pos: None,
            hang_pos: None,
            ci: None,
            contacts: FloorContacts::default(),
            lives: Lives { current: 3, total: 3 },
            has_sword: false,
            alive: true,
        }
    }

    /// True on the first tick of `kind`: the previous tick ran something
    /// else, or this run came through an entry point into `kind`.
    pub fn entering(&self, kind: ActionKind) -> bool {
        self.oaction != kind || self.entry.map(Entry::target) == Some(kind)
    }

    /// Make `frameset[i]` the pending frame offset.
    pub fn select_frame(&mut self, frameset: &[FramesetEntry], i: i32) {
        debug_assert!(i >= 0 && (i as usize) < frameset.len(), "frame index {i} out of range");
        let idx = (i.max(0) as usize).min(frameset.len().saturating_sub(1));
        self.fo = frameset[idx].into();
        self.f.flip = self.f.dir == Dir::Right;
    }

    /// `wait-- <= 0`: true once the wait counter has run out. Always
    /// consumes one tick of waiting.
    pub fn wait_elapsed(&mut self) -> bool {
        let w = self.wait;
        self.wait = (w - 1).max(-1);
        w <= 0
    }

    /// Lose one life. Returns true if that was the last one.
    pub fn hurt_once(&mut self) -> bool {
        self.lives.current = self.lives.current.saturating_sub(1);
        if self.lives.current == 0 {
            self.alive = false;
        }
        !self.alive
    }

    pub fn kill(&mut self) {
        self.lives.current = 0;
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::sprite;
    use crate::domain::pos::Coord;

    fn anim() -> Anim {
        Anim::new(0, Frame::new(Coord::new(1, 10, 10), Dir::Left, sprite("s", 10, 10)))
    }

    #[test]
    fn wait_counts_down_through_zero() {
        let mut k = anim();
        k.wait = 2;
        assert!(!k.wait_elapsed());
        assert!(!k.wait_elapsed());
        assert!(k.wait_elapsed());
        assert!(k.wait_elapsed());
        assert_eq!(k.wait, -1);
    }

    #[test]
    fn last_life_kills() {
        let mut k = anim();
        k.lives = Lives { current: 2, total: 3 };
        assert!(!k.hurt_once());
        assert!(k.hurt_once());
        assert!(!k.alive);
        assert!(k.hurt_once());
    }

    #[test]
    fn keys_relative_to_facing() {
        let key = KeyState { left: true, ..KeyState::default() };
        assert!(key.toward(Dir::Left));
        assert!(key.away(Dir::Right));
        assert!(!key.toward(Dir::Right));
    }
}
