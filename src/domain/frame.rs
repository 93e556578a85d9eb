/// Frames, frame offsets and framesets.
///
/// A frame is a sprite placed at a room coordinate (the sprite's top-left
/// corner). Advancing a frame by an offset keeps the actor's feet and
/// front edge anchored when the sprite size changes:
///
///   facing left:  x += dx
///   facing right: x += -dx + w_old - w_new
///   always:       y += dy + h_old - h_new
///
/// so a negative `dx` always moves the actor forward.
use super::pos::{Coord, Pos, RoomLinks};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Left,
    Right,
}

impl Dir {
    /// Place-index step in the facing direction.
    pub fn sign(self) -> i32 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }

    pub fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sprite {
    pub name: &'static str,
    pub w: i32,
    pub h: i32,
}

pub const fn sprite(name: &'static str, w: i32, h: i32) -> Sprite {
    Sprite { name, w, h }
}

/// One pose of an animation: the sprite and the offset that moves the
/// previous pose into it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FramesetEntry {
    pub sprite: Sprite,
    pub dx: i32,
    pub dy: i32,
}

pub const fn pose(sprite: Sprite, dx: i32, dy: i32) -> FramesetEntry {
    FramesetEntry { sprite, dx, dy }
}

/// Pending displacement and sprite to apply at the next `Frame::next`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FrameOffset {
    pub sprite: Sprite,
    pub dx: i32,
    pub dy: i32,
}

impl FrameOffset {
    /// Same sprite, no movement.
    pub fn still(f: &Frame) -> Self {
        FrameOffset { sprite: f.sprite, dx: 0, dy: 0 }
    }
}

impl From<FramesetEntry> for FrameOffset {
    fn from(e: FramesetEntry) -> Self {
        FrameOffset { sprite: e.sprite, dx: e.dx, dy: e.dy }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frame {
    pub c: Coord,
    pub dir: Dir,
    /// Horizontal mirror when drawing. Sprites face left.
    pub flip: bool,
    pub sprite: Sprite,
}

impl Frame {
    pub fn new(c: Coord, dir: Dir, sprite: Sprite) -> Self {
        Frame { c, dir, flip: dir == Dir::Right, sprite }
    }

    pub fn w(&self) -> i32 {
        self.sprite.w
    }

    pub fn h(&self) -> i32 {
        self.sprite.h
    }

    /// Apply a frame offset. The result is not normalized and stays in
    /// this frame's room coordinates.
    pub fn next(&self, fo: &FrameOffset) -> Frame {
        let (ow, oh) = (self.w(), self.h());
        let (nw, nh) = (fo.sprite.w, fo.sprite.h);
        let x = match self.dir {
            Dir::Left => self.c.x + fo.dx,
            Dir::Right => self.c.x - fo.dx + ow - nw,
        };
        let y = self.c.y + fo.dy + oh - nh;
        Frame {
            c: Coord { room: self.c.room, x, y },
            dir: self.dir,
            flip: self.flip,
            sprite: fo.sprite,
        }
    }

    /// Place a sprite relative to the top-left corner of a place.
    pub fn placed(sprite: Sprite, p: Pos, dir: Dir, dx: i32, dy: i32) -> Frame {
        let c = Coord::new(p.room, p.left_x() + dx, super::pos::PLACE_HEIGHT * p.floor + dy);
        Frame::new(c, dir, sprite)
    }

    /// Move horizontally by `px` pixels in the facing direction.
    pub fn advanced(&self, px: i32) -> Frame {
        let mut f = *self;
        f.c.x += self.dir.sign() * px;
        f
    }

    pub fn normalized(&self, links: &[RoomLinks]) -> Frame {
        Frame { c: self.c.normalize(links), ..*self }
    }
}
