/// Spatial address model.
///
/// A room is a grid of `FLOORS` x `PLACES` cells ("places"). Pixel
/// coordinates are relative to the top-left corner of a room:
///
///   place = x div PLACE_WIDTH
///   floor = (y - FLOOR_BIAS) div PLACE_HEIGHT
///
/// The construct stored at (floor, place) includes the floor surface at the
/// bottom of that cell, so an actor standing in a place stands on that
/// place's construct.
///
/// Crossing a room edge follows the room links. Room 0 is the void room:
/// every link out of it points back to itself.

pub const FLOORS: i32 = 3;
pub const PLACES: i32 = 10;
pub const PLACE_WIDTH: i32 = 32;
pub const PLACE_HEIGHT: i32 = 63;
pub const ROOM_WIDTH: i32 = PLACES * PLACE_WIDTH;
pub const ROOM_HEIGHT: i32 = FLOORS * PLACE_HEIGHT;

/// Pixel rows above the first floor row.
pub const FLOOR_BIAS: i32 = 3;

/// Offset (from the top of a floor row) of the pixel row an actor's feet
/// occupy when standing on that floor.
pub const FEET_Y: i32 = 62;

pub type RoomId = usize;

pub const VOID_ROOM: RoomId = 0;

/// Adjacency of one room. A link of `VOID_ROOM` means "nothing there".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RoomLinks {
    pub left: RoomId,
    pub right: RoomId,
    pub above: RoomId,
    pub below: RoomId,
}

/// Look up a room's links. Unknown rooms behave like the void room;
/// `Level::validate` guarantees no link ever names one.
#[inline]
fn links_of(links: &[RoomLinks], room: RoomId) -> RoomLinks {
    links.get(room).copied().unwrap_or_default()
}

/// A cell address: (room, floor, place).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Pos {
    pub room: RoomId,
    pub floor: i32,
    pub place: i32,
}

impl Pos {
    pub fn new(room: RoomId, floor: i32, place: i32) -> Self {
        Pos { room, floor, place }
    }

    /// Route out-of-range indices through the room links until both
    /// indices are inside the room grid.
    pub fn normalize(mut self, links: &[RoomLinks]) -> Pos {
        while self.place < 0 {
            self.room = links_of(links, self.room).left;
            self.place += PLACES;
        }
        while self.place >= PLACES {
            self.room = links_of(links, self.room).right;
            self.place -= PLACES;
        }
        while self.floor < 0 {
            self.room = links_of(links, self.room).above;
            self.floor += FLOORS;
        }
        while self.floor >= FLOORS {
            self.room = links_of(links, self.room).below;
            self.floor -= FLOORS;
        }
        self
    }

    /// The cell `floor_delta` floors and `place_delta` places away,
    /// resolved through the room links.
    pub fn relative(self, links: &[RoomLinks], floor_delta: i32, place_delta: i32) -> Pos {
        Pos {
            room: self.room,
            floor: self.floor + floor_delta,
            place: self.place + place_delta,
        }
        .normalize(links)
    }

    /// Left pixel column of this place, in its own room.
    pub fn left_x(self) -> i32 {
        PLACE_WIDTH * self.place
    }

    /// Pixel row of the feet of an actor standing on this place.
    pub fn feet_y(self) -> i32 {
        PLACE_HEIGHT * self.floor + FEET_Y
    }

    pub fn is_void(self) -> bool {
        self.room == VOID_ROOM
    }
}

/// A pixel coordinate inside a room.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Coord {
    pub room: RoomId,
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(room: RoomId, x: i32, y: i32) -> Self {
        Coord { room, x, y }
    }

    /// Move the coordinate into the room it actually lies in.
    pub fn normalize(mut self, links: &[RoomLinks]) -> Coord {
        while self.x < 0 {
            self.room = links_of(links, self.room).left;
            self.x += ROOM_WIDTH;
        }
        while self.x >= ROOM_WIDTH {
            self.room = links_of(links, self.room).right;
            self.x -= ROOM_WIDTH;
        }
        while self.y < 0 {
            self.room = links_of(links, self.room).above;
            self.y += ROOM_HEIGHT;
        }
        while self.y >= ROOM_HEIGHT {
            self.room = links_of(links, self.room).below;
            self.y -= ROOM_HEIGHT;
        }
        self
    }

    /// Cell containing this coordinate, relative to `self.room`
    /// (indices may be out of range).
    pub fn raw_pos(self) -> Pos {
        Pos {
            room: self.room,
            floor: (self.y - FLOOR_BIAS).div_euclid(PLACE_HEIGHT),
            place: self.x.div_euclid(PLACE_WIDTH),
        }
    }

    /// Cell whose floor line this coordinate has most recently reached
    /// going down, relative to `self.room`.
    pub fn raw_floor_pos(self) -> Pos {
        Pos {
            room: self.room,
            floor: (self.y - FEET_Y).div_euclid(PLACE_HEIGHT),
            place: self.x.div_euclid(PLACE_WIDTH),
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Coord {
        Coord { room: self.room, x: self.x + dx, y: self.y + dy }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
