/// Level geometry: rooms, their links, the construct grid and the event
/// table that wires opener/closer floors to doors.
///
/// Room 0 is always the void room. Its links point to itself and every
/// place in it is a wall, so anything that wanders off the edge of the
/// map hits something solid.
use thiserror::Error;

use super::construct::{Construct, ConstructKind, Item};
use super::frame::Dir;
use super::pos::{Pos, RoomId, RoomLinks, FLOORS, PLACES, VOID_ROOM};

pub type RoomGrid = [[Construct; PLACES as usize]; FLOORS as usize];

/// One entry of the event table. Pressing a plate triggers its event,
/// which acts on `door` and then continues with `next`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DoorEvent {
    pub door: Pos,
    pub next: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawn {
    pub pos: Pos,
    pub dir: Dir,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("line {line}: {msg}")]
    Syntax { line: usize, msg: String },
    #[error("line {line}: unknown glyph '{glyph}'")]
    UnknownGlyph { line: usize, glyph: char },
    #[error("room {room}: {side} link points to missing room {target}")]
    BadLink { room: RoomId, side: &'static str, target: RoomId },
    #[error("room {0} is defined more than once")]
    DuplicateRoom(RoomId),
    #[error("room {room} has {rows} rows, expected 3")]
    IncompleteRoom { room: RoomId, rows: usize },
    #[error("floor at {pos:?} triggers undefined event {event}")]
    MissingEvent { pos: Pos, event: usize },
    #[error("event {event} targets {pos:?}, which is not a door")]
    EventTarget { event: usize, pos: Pos },
    #[error("level has no rooms")]
    Empty,
    #[error("cannot read {path}: {msg}")]
    Io { path: String, msg: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub id: u32,
    pub name: String,
    /// Indexed by room id; entry 0 is the void room.
    pub links: Vec<RoomLinks>,
    pub rooms: Vec<RoomGrid>,
    pub events: Vec<DoorEvent>,
    pub spawns: Vec<Spawn>,
    /// Doors that start fully open.
    pub open_doors: Vec<Pos>,
}

pub fn void_grid() -> RoomGrid {
    [[Construct::new(ConstructKind::Wall); PLACES as usize]; FLOORS as usize]
}

impl Level {
    /// A level with `room_count` rooms (plus the void room), all empty
    /// and unlinked.
    pub fn new(id: u32, name: impl Into<String>, room_count: usize) -> Self {
        let mut rooms = vec![void_grid()];
        rooms.resize(room_count + 1, [[Construct::default(); PLACES as usize]; FLOORS as usize]);
        Level {
            id,
            name: name.into(),
            links: vec![RoomLinks::default(); room_count + 1],
            rooms,
            events: Vec::new(),
            spawns: Vec::new(),
            open_doors: Vec::new(),
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len().saturating_sub(1)
    }

    /// Construct at a position. The position is normalized first, so any
    /// in-range or out-of-range address is accepted.
    pub fn con(&self, p: Pos) -> Construct {
        let p = p.normalize(&self.links);
        match self.rooms.get(p.room) {
            Some(grid) => grid[p.floor as usize][p.place as usize],
            None => Construct::new(ConstructKind::Wall),
        }
    }

    pub fn set_con(&mut self, p: Pos, c: Construct) {
        let p = p.normalize(&self.links);
        if p.room == VOID_ROOM {
            return;
        }
        if let Some(grid) = self.rooms.get_mut(p.room) {
            grid[p.floor as usize][p.place as usize] = c;
        }
    }

    /// Replace the construct kind at `p`, keeping its item and event.
    pub fn set_kind(&mut self, p: Pos, fg: ConstructKind) {
        let mut c = self.con(p);
        c.fg = fg;
        self.set_con(p, c);
    }

    /// Remove and return the item lying at `p`.
    pub fn take_item(&mut self, p: Pos) -> Item {
        let mut c = self.con(p);
        let item = std::mem::take(&mut c.item);
        self.set_con(p, c);
        item
    }

    /// Every normalized position of every real room, in room/floor/place
    /// order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (1..self.rooms.len()).flat_map(|room| {
            (0..FLOORS).flat_map(move |floor| (0..PLACES).map(move |place| Pos { room, floor, place }))
        })
    }

    /// Check room links and the event table. The void room's links are
    /// forced back to itself.
    pub fn validate(&mut self) -> Result<(), LevelError> {
        if self.room_count() == 0 {
            return Err(LevelError::Empty);
        }
        self.links[VOID_ROOM] = RoomLinks::default();
        self.rooms[VOID_ROOM] = void_grid();

        let count = self.rooms.len();
        for (room, l) in self.links.iter().enumerate() {
            for (side, target) in [
                ("left", l.left),
                ("right", l.right),
                ("above", l.above),
                ("below", l.below),
            ] {
                if target >= count {
                    return Err(LevelError::BadLink { room, side, target });
                }
            }
        }

        for (event, e) in self.events.iter().enumerate() {
            if self.con(e.door).fg != ConstructKind::Door {
                return Err(LevelError::EventTarget { event, pos: e.door });
            }
            if let Some(next) = e.next {
                if next >= self.events.len() {
                    return Err(LevelError::MissingEvent { pos: e.door, event: next });
                }
            }
        }

        for p in self.positions() {
            let c = self.con(p);
            if c.is_depressible() {
                match c.event {
                    Some(event) if event < self.events.len() => {}
                    Some(event) => return Err(LevelError::MissingEvent { pos: p, event }),
                    None => return Err(LevelError::MissingEvent { pos: p, event: usize::MAX }),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_room_is_solid() {
        let level = Level::new(1, "t", 1);
        assert_eq!(level.con(Pos::new(VOID_ROOM, 1, 1)).fg, ConstructKind::Wall);
        // Room 1 has no neighbors, so stepping off it lands in the void.
        assert_eq!(level.con(Pos::new(1, 0, -1)).fg, ConstructKind::Wall);
    }

    #[test]
    fn bad_link_is_rejected() {
        let mut level = Level::new(1, "t", 1);
        level.links[1].right = 7;
        assert_eq!(
            level.validate(),
            Err(LevelError::BadLink { room: 1, side: "right", target: 7 })
        );
    }

    #[test]
    fn event_must_target_a_door() {
        let mut level = Level::new(1, "t", 1);
        level.events.push(DoorEvent { door: Pos::new(1, 0, 3), next: None });
        assert!(matches!(level.validate(), Err(LevelError::EventTarget { event: 0, .. })));
    }

    #[test]
    fn take_item_empties_the_place() {
        let mut level = Level::new(1, "t", 1);
        let p = Pos::new(1, 2, 4);
        level.set_con(p, Construct::new(ConstructKind::Floor).with_item(Item::Sword));
        assert_eq!(level.take_item(p), Item::Sword);
        assert_eq!(level.con(p).item, Item::None);
        assert_eq!(level.con(p).fg, ConstructKind::Floor);
    }
}
