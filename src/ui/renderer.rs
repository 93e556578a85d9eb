/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The screen shows the room the player is in. Each place is
/// `PLACE_COLS` columns wide and each floor `FLOOR_ROWS` rows tall; actor
/// and slab pixel coordinates are scaled onto that grid.
use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::anim::Anim;
use crate::domain::construct::{Construct, ConstructKind, Item, Potion};
use crate::domain::door::{Door, DOOR_MAX_STEP};
use crate::domain::floor::Plate;
use crate::domain::frame::Dir;
use crate::domain::loose_floor::LooseState;
use crate::domain::pos::{Pos, RoomId, FLOORS, PLACES, PLACE_HEIGHT, PLACE_WIDTH};
use crate::sim::world::{Phase, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

const PLACE_COLS: usize = 4;
const FLOOR_ROWS: usize = 4;
const ROOM_COLS: usize = PLACES as usize * PLACE_COLS;
const ROOM_ROWS: usize = FLOORS as usize * FLOOR_ROWS;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 40, g: 24, b: 16 };
const STONE: Color = Color::Rgb { r: 150, g: 130, b: 100 };
const WALL: Color = Color::Rgb { r: 110, g: 95, b: 75 };

/// Screen cell (relative to the map origin) of a room pixel.
fn to_screen(x: i32, y: i32) -> (i32, i32) {
    (
        (x * PLACE_COLS as i32).div_euclid(PLACE_WIDTH),
        (y * FLOOR_ROWS as i32).div_euclid(PLACE_HEIGHT),
    )
}

/// The glyph row drawn on the floor line of a place.
fn floor_glyphs(con: &Construct, plate: Option<&Plate>) -> ([char; PLACE_COLS], Color) {
    match con.fg {
        ConstructKind::NoFloor => ([' '; PLACE_COLS], STONE),
        ConstructKind::Floor | ConstructKind::Pillar | ConstructKind::Door | ConstructKind::LevelDoor => {
            (['▀'; PLACE_COLS], STONE)
        }
        ConstructKind::BrokenFloor => (['▀', '▖', ' ', '▝'], STONE),
        ConstructKind::SkeletonFloor => (['▀', '☠', '▀', '▀'], Color::Rgb { r: 220, g: 220, b: 200 }),
        ConstructKind::LooseFloor => (['▔'; PLACE_COLS], STONE),
        ConstructKind::SpikesFloor => (['▲'; PLACE_COLS], Color::Rgb { r: 200, g: 200, b: 220 }),
        ConstructKind::OpenerFloor | ConstructKind::CloserFloor => {
            let down = plate.is_some_and(|p| p.depth > 0);
            let ch = if down { '▁' } else { '▄' };
            let color = if con.fg == ConstructKind::OpenerFloor {
                Color::Rgb { r: 120, g: 200, b: 120 }
            } else {
                Color::Rgb { r: 200, g: 120, b: 120 }
            };
            ([ch; PLACE_COLS], color)
        }
        ConstructKind::Wall => (['█'; PLACE_COLS], WALL),
        ConstructKind::Mirror => (['▀', '▀', '▀', '▓'], Color::Rgb { r: 160, g: 200, b: 240 }),
    }
}

fn item_glyph(item: Item) -> Option<(char, Color)> {
    match item {
        Item::None => None,
        Item::Sword => Some(('†', Color::Rgb { r: 230, g: 230, b: 240 })),
        Item::Potion(p) => {
            let color = match p {
                Potion::SmallLife => Color::Rgb { r: 230, g: 60, b: 60 },
                Potion::BigLife => Color::Rgb { r: 255, g: 120, b: 40 },
                Potion::Poison => Color::Rgb { r: 60, g: 90, b: 230 },
                Potion::Float => Color::Rgb { r: 80, g: 220, b: 120 },
            };
            Some(('¡', color))
        }
    }
}

/// Rows (from the top of the floor) a door at closing level `i` covers.
fn door_rows(i: i32) -> usize {
    ((i.clamp(0, DOOR_MAX_STEP) as usize) * (FLOOR_ROWS - 1) + DOOR_MAX_STEP as usize - 1) / DOOR_MAX_STEP as usize
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    last_room: RoomId,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            last_room: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        let room = world.player().map_or(1, |k| k.f.c.room);
        if self.last_phase != Some(world.phase) || self.last_room != room {
            self.invalidate()?;
            self.last_phase = Some(world.phase);
            self.last_room = room;
        }

        self.front.clear();
        self.compose_hud(world, room);
        self.compose_room(world, room);
        self.compose_footer(world);
        if world.paused {
            self.compose_banner("PAUSED   F1: resume");
        } else if world.phase == Phase::Dead {
            self.compose_banner("YOU DIED   R: restart   ESC: quit");
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &World, room: RoomId) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let Some(k) = w.player() else {
            self.front.put_str(1, HUD_ROW, &w.level.name, Color::White, HUD_BG);
            return;
        };
        let hearts: String = (0..k.lives.total)
            .map(|i| if i < k.lives.current { '♥' } else { '♡' })
            .collect();
        let hud = format!(
            " {}  room {}  {}  {:<11} {}{}",
            w.level.name,
            room,
            hearts,
            k.action.name(),
            if k.has_sword { "† " } else { "" },
            if k.float_ticks > 0 { "~float~" } else { "" },
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::Rgb { r: 255, g: 220, b: 150 }, HUD_BG);
    }

    fn compose_room(&mut self, w: &World, room: RoomId) {
        for floor in 0..FLOORS {
            for place in 0..PLACES {
                let p = Pos::new(room, floor, place);
                self.compose_place(w, p);
            }
        }

        for slab in &w.loose.list {
            match slab.state {
                LooseState::Falling { .. } if slab.c.room == room => {
                    let (col, row) = to_screen(slab.c.x, slab.c.y);
                    for dx in -1..=1 {
                        self.set_map(col + dx, row, Cell::new('▬', STONE, Color::Reset));
                    }
                }
                LooseState::Shaking { left } if slab.origin.room == room => {
                    // Jitter the slab on alternate ticks.
                    let ch = if left % 2 == 0 { '▔' } else { '▀' };
                    let (col, row) = self.floor_line(slab.origin);
                    for dx in 0..PLACE_COLS as i32 {
                        self.set_map(col + dx, row, Cell::new(ch, Color::Rgb { r: 220, g: 180, b: 90 }, Color::Reset));
                    }
                }
                _ => {}
            }
        }

        for k in w.actors.iter().filter(|k| k.f.c.room == room) {
            self.compose_actor(k);
        }
    }

    /// Screen cell of the left end of a place's floor line.
    fn floor_line(&self, p: Pos) -> (i32, i32) {
        ((p.place as usize * PLACE_COLS) as i32, ((p.floor as usize + 1) * FLOOR_ROWS) as i32 - 1)
    }

    fn set_map(&mut self, col: i32, row: i32, cell: Cell) {
        if col < 0 || row < 0 || col as usize >= ROOM_COLS || row as usize >= ROOM_ROWS {
            return;
        }
        self.front.set(MAP_COL + col as usize, MAP_ROW + row as usize, cell);
    }

    fn compose_place(&mut self, w: &World, p: Pos) {
        let con = w.level.con(p);
        let (col, row) = self.floor_line(p);
        let top = row - (FLOOR_ROWS as i32 - 1);

        if con.fg == ConstructKind::Wall {
            for r in top..=row {
                for dx in 0..PLACE_COLS as i32 {
                    self.set_map(col + dx, r, Cell::new('█', WALL, Color::Reset));
                }
            }
            return;
        }

        let (glyphs, color) = floor_glyphs(&con, w.plates.at(p));
        for (dx, ch) in glyphs.iter().enumerate() {
            self.set_map(col + dx as i32, row, Cell::new(*ch, color, Color::Reset));
        }

        match con.fg {
            ConstructKind::Pillar => {
                for r in top..row {
                    self.set_map(col + 1, r, Cell::new('▐', STONE, Color::Reset));
                    self.set_map(col + 2, r, Cell::new('▌', STONE, Color::Reset));
                }
            }
            ConstructKind::Door => {
                let closed = w.doors.at(p).map_or(DOOR_MAX_STEP, |d: &Door| d.i);
                for r in 0..door_rows(closed) as i32 {
                    self.set_map(col + 3, top + r, Cell::new('▒', Color::Rgb { r: 170, g: 170, b: 190 }, Color::Reset));
                }
            }
            ConstructKind::LevelDoor => {
                for r in top..row {
                    self.set_map(col + 1, r, Cell::new('▯', Color::Rgb { r: 255, g: 220, b: 120 }, Color::Reset));
                    self.set_map(col + 2, r, Cell::new('▯', Color::Rgb { r: 255, g: 220, b: 120 }, Color::Reset));
                }
            }
            ConstructKind::Mirror => {
                for r in top..row {
                    self.set_map(col + 3, r, Cell::new('▓', Color::Rgb { r: 160, g: 200, b: 240 }, Color::Reset));
                }
            }
            _ => {}
        }

        if let Some((ch, color)) = item_glyph(con.item) {
            self.set_map(col + 1, row - 1, Cell::new(ch, color, Color::Reset));
        }
    }

    fn compose_actor(&mut self, k: &Anim) {
        let (left, top) = to_screen(k.f.c.x, k.f.c.y);
        let (right, bottom) = to_screen(k.f.c.x + k.f.w() - 1, k.f.c.y + k.f.h() - 1);
        let color = if !k.alive {
            Color::Rgb { r: 120, g: 40, b: 40 }
        } else if k.hurt || k.hit_by_loose_floor {
            Color::Rgb { r: 255, g: 140, b: 140 }
        } else {
            Color::Rgb { r: 240, g: 240, b: 255 }
        };
        for row in top..=bottom {
            for col in left..=right {
                let ch = if row == top {
                    match k.f.dir {
                        Dir::Left => '◀',
                        Dir::Right => '▶',
                    }
                } else {
                    '█'
                };
                self.set_map(col, row, Cell::new(ch, color, Color::Reset));
            }
        }
    }

    fn compose_footer(&mut self, w: &World) {
        let msg_row = MAP_ROW + ROOM_ROWS + 1;
        if !w.message.is_empty() {
            let bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bg);
            self.front.put_str(1, msg_row, &w.message, Color::Black, bg);
        }
        let help = " ←→ walk  ↓ crouch  ↑ climb  SPACE grab  F1 pause  R restart  ESC quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_banner(&mut self, text: &str) {
        let bg = Color::Rgb { r: 40, g: 40, b: 40 };
        let row = MAP_ROW + ROOM_ROWS / 2;
        let width = text.chars().count() + 4;
        let x = MAP_COL + ROOM_COLS.saturating_sub(width) / 2;
        for dx in 0..width {
            self.front.set(x + dx, row, Cell::new(' ', Color::White, bg));
        }
        self.front.put_str(x + 2, row, text, Color::Rgb { r: 255, g: 220, b: 50 }, bg);
    }
}
