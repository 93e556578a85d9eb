/// Survey engine: where is a frame's reference point, which cell is it in,
/// and what is built there.
///
/// Everything here is a pure query over a `MapView`. Calling a survey twice
/// on the same frame and world state returns the same answer.
use super::construct::Construct;
use super::door::{self, Door};
use super::frame::{Dir, Frame};
use super::level::Level;
use super::loose_floor::{self, LooseFloor};
use super::pos::{Coord, Pos, RoomLinks, PLACE_WIDTH};

// ══════════════════════════════════════════════════════════════
// MapView
// ══════════════════════════════════════════════════════════════

/// Read-only view of the level plus the dynamic objects the handlers
/// need to see (door openness, falling slabs).
#[derive(Clone, Copy)]
pub struct MapView<'a> {
    pub level: &'a Level,
    pub doors: &'a [Door],
    pub loose: &'a [LooseFloor],
}

impl<'a> MapView<'a> {
    pub fn links(&self) -> &'a [RoomLinks] {
        &self.level.links
    }

    pub fn con(&self, p: Pos) -> Construct {
        self.level.con(p)
    }

    pub fn door_at(&self, p: Pos) -> Option<&'a Door> {
        door::find(self.doors, p.normalize(self.links()))
    }

    pub fn loose_falling_at(&self, p: Pos) -> bool {
        loose_floor::falling_at(self.loose, p.normalize(self.links()))
    }

    pub fn rel(&self, p: Pos, floor_delta: i32, place_delta: i32) -> Pos {
        p.relative(self.links(), floor_delta, place_delta)
    }
}

// ══════════════════════════════════════════════════════════════
// Reference points
// ══════════════════════════════════════════════════════════════

/// Reference points on a frame's bounding box. "Front" is the edge the
/// actor faces.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CoordFn {
    Middle,
    MiddleTop,
    MiddleBottom,
    TopFront,
    BottomFront,
    TopBack,
    BottomBack,
}

impl CoordFn {
    pub fn of(self, f: &Frame) -> Coord {
        let mid_x = f.c.x + f.w() / 2;
        let top = f.c.y;
        let bottom = f.c.y + f.h() - 1;
        let left = f.c.x;
        let right = f.c.x + f.w() - 1;
        let (front, back) = match f.dir {
            Dir::Left => (left, right),
            Dir::Right => (right, left),
        };
        let (x, y) = match self {
            CoordFn::Middle => (mid_x, f.c.y + f.h() / 2),
            CoordFn::MiddleTop => (mid_x, top),
            CoordFn::MiddleBottom => (mid_x, bottom),
            CoordFn::TopFront => (front, top),
            CoordFn::BottomFront => (front, bottom),
            CoordFn::TopBack => (back, top),
            CoordFn::BottomBack => (back, bottom),
        };
        Coord::new(f.c.room, x, y)
    }
}

/// How a coordinate is mapped to a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PosFn {
    /// The cell containing the coordinate.
    Cell,
    /// The cell whose floor line the coordinate has last reached going
    /// down. Used to find what a falling body is about to land on.
    FloorLine,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Survey {
    /// Reference point, normalized.
    pub coord: Coord,
    /// Cell relative to the frame's own room (indices may be out of range).
    pub raw: Pos,
    /// Cell, normalized.
    pub pos: Pos,
    pub con: Construct,
}

pub fn survey(cf: CoordFn, pf: PosFn, f: &Frame, view: &MapView) -> Survey {
    let c = cf.of(f);
    let raw = match pf {
        PosFn::Cell => c.raw_pos(),
        PosFn::FloorLine => c.raw_floor_pos(),
    };
    let pos = raw.normalize(view.links());
    Survey {
        coord: c.normalize(view.links()),
        raw,
        pos,
        con: view.con(pos),
    }
}

/// Pixels from a reference point to the edge of its place, looking in the
/// facing direction (or behind, with `reverse`), plus `margin`.
pub fn dist_next_place(f: &Frame, cf: CoordFn, margin: i32, reverse: bool) -> i32 {
    let c = cf.of(f);
    let dir = if reverse { f.dir.flip() } else { f.dir };
    let ox = c.x.rem_euclid(PLACE_WIDTH);
    let d = match dir {
        Dir::Left => ox,
        Dir::Right => PLACE_WIDTH - 1 - ox,
    };
    d + margin
}

/// Can an actor facing `dir` hang at `p`? The cell above must be open and
/// the cell diagonally ahead-above must offer an edge to grab.
pub fn is_hangable_pos(view: &MapView, p: Pos, dir: Dir) -> bool {
    let above = view.rel(p, -1, 0);
    let ledge = view.rel(p, -1, dir.sign());
    view.con(above).is_strictly_traversable() && view.con(ledge).has_hang_edge()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
