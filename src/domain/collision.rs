/// Collision resolver.
///
/// Blocking constructs occupy a horizontal band of their place: a wall the
/// whole place, a closed door and a mirror a strip at the place's right
/// side. A frame collides when its leading edge, probed at two heights,
/// falls inside a band. Nothing here mutates state; the handlers decide
/// what to do with a `Collision`.
use super::construct::{Construct, ConstructKind};
use super::door::DOOR_BAND_LEFT;
use super::frame::{Dir, Frame, FrameOffset};
use super::pos::{Coord, Pos, PLACE_WIDTH};
use super::survey::{survey, CoordFn, MapView, PosFn};

/// Horizontal band of a mirror inside its place.
pub const MIRROR_BAND: (i32, i32) = (22, 30);

/// Free pixels beyond which `dist_collision` stops looking.
const SCAN_LIMIT: i32 = 2 * PLACE_WIDTH;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollisionKind {
    Wall,
    Door,
    Mirror,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Collision {
    pub kind: CollisionKind,
    /// Place of the blocking construct.
    pub pos: Pos,
    /// Direction the probe was looking.
    pub dir: Dir,
    /// How many pixels the probe is inside the band.
    pub penetration: i32,
}

fn band(view: &MapView, p: Pos, con: Construct) -> Option<(CollisionKind, i32, i32)> {
    match con.fg {
        ConstructKind::Wall => Some((CollisionKind::Wall, 0, PLACE_WIDTH)),
        ConstructKind::Door => match view.door_at(p) {
            Some(d) if d.is_blocking() => Some((CollisionKind::Door, DOOR_BAND_LEFT, PLACE_WIDTH)),
            _ => None,
        },
        ConstructKind::Mirror => Some((CollisionKind::Mirror, MIRROR_BAND.0, MIRROR_BAND.1)),
        _ => None,
    }
}

/// Body rows probed for collisions: upper body and just above the feet.
fn probe_rows(f: &Frame) -> [i32; 2] {
    [f.c.y + f.h() / 3, f.c.y + f.h() - 6]
}

fn probe(f: &Frame, margin: i32, reverse: bool, view: &MapView) -> Option<Collision> {
    let dir = if reverse { f.dir.flip() } else { f.dir };
    let edge = match dir {
        Dir::Left => f.c.x - margin,
        Dir::Right => f.c.x + f.w() - 1 + margin,
    };
    for y in probe_rows(f) {
        let c = Coord::new(f.c.room, edge, y).normalize(view.links());
        let p = c.raw_pos();
        let Some((kind, lo, hi)) = band(view, p, view.con(p)) else {
            continue;
        };
        let ox = c.x - p.left_x();
        if ox >= lo && ox < hi {
            let penetration = match dir {
                Dir::Right => ox - lo + 1,
                Dir::Left => hi - ox,
            };
            return Some(Collision { kind, pos: p, dir, penetration });
        }
    }
    None
}

/// Would applying `fo` to `f` put the leading edge (pushed out by `margin`
/// pixels) inside a blocking band?
pub fn is_colliding(
    f: &Frame,
    fo: &FrameOffset,
    margin: i32,
    reverse: bool,
    view: &MapView,
) -> Option<Collision> {
    probe(&f.next(fo), margin, reverse, view)
}

/// Free pixels between the leading edge and the next blocking band, if
/// one is within reach. `Some(0)` when already touching or inside one.
pub fn dist_collision(f: &Frame, margin: i32, reverse: bool, view: &MapView) -> Option<i32> {
    let dir = if reverse { f.dir.flip() } else { f.dir };
    (0..=SCAN_LIMIT).find_map(|k| {
        let shifted = Frame { c: f.c.offset(dir.sign() * k, 0), ..*f };
        probe(&shifted, margin, reverse, view).map(|_| (k - 1).max(0))
    })
}

/// Move a frame so its leading edge rests just outside the nearest
/// blocking band: back out if inside one, creep up if one is close.
pub fn to_collision_edge(f: &Frame, view: &MapView) -> Frame {
    if let Some(c) = probe(f, 0, false, view) {
        return f.advanced(-c.penetration);
    }
    match dist_collision(f, 0, false, view) {
        Some(d) if d < PLACE_WIDTH => f.advanced(d),
        _ => *f,
    }
}

/// An actor whose middle ended up inside a closed door's band is pushed
/// back to the side it came from. Returns the corrected frame.
pub fn door_split(f: &Frame, view: &MapView) -> Option<(Frame, Collision)> {
    let s = survey(CoordFn::Middle, PosFn::Cell, f, view);
    if s.con.fg != ConstructKind::Door {
        return None;
    }
    if !view.door_at(s.pos)?.is_blocking() {
        return None;
    }
    let ox = s.coord.x - s.pos.left_x();
    if ox < DOOR_BAND_LEFT {
        return None;
    }
    let half = f.w() / 2;
    let shift = match f.dir {
        // Came from the left: leading edge back to just before the band.
        Dir::Right => ox + (f.w() - 1 - half) - (DOOR_BAND_LEFT - 1),
        // Came from the right: leading edge back to the next place.
        Dir::Left => PLACE_WIDTH - (ox - half),
    };
    let c = Collision { kind: CollisionKind::Door, pos: s.pos, dir: f.dir, penetration: shift };
    Some((f.advanced(-shift), c))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
