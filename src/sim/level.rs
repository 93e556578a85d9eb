/// Level loader.
///
/// ## Sources (priority order):
///   1. `general.level_file` from config.toml
///   2. Built-in embedded level
///
/// ## Level format (`.txt`):
///   ```text
///   # Palace Gate
///   @level 1
///   @room 1 left=0 right=2 above=0 below=3
///   <3 rows of 10 glyphs, top floor first>
///   @room 2 left=1
///   <3 rows>
///   @event 0 door=2,1,2 next=1
///   ```
///
/// Rooms are numbered from 1 without gaps; a missing link means room 0,
/// the void. Opener and closer floors get event numbers in the order they
/// appear in the file; each `@event N` line names the door (room, floor,
/// place) it acts on and optionally the event that fires after it.
/// Lines starting with `;` are comments.
///
/// ## Glyph legend:
///   '.' = No floor          '_' = Floor            'x' = Broken floor
///   'b' = Skeleton floor    '~' = Loose floor      '^' = Spikes
///   'o' = Opener floor      'c' = Closer floor     '|' = Pillar
///   '#' = Wall              'D' = Door (closed)    'd' = Door (open)
///   'L' = Level door        'M' = Mirror
///   'p' = Small life potion 'P' = Big life potion  '!' = Poison
///   'f' = Float potion      's' = Sword
///   '<' = Actor spawn, facing left       '>' = facing right
///
/// Item and spawn glyphs stand on plain floor.

use std::path::Path;

use log::{debug, info};

use crate::config::GameConfig;
use crate::domain::construct::{Construct, ConstructKind, Item, Potion};
use crate::domain::frame::Dir;
use crate::domain::level::{DoorEvent, Level, LevelError, Spawn};
use crate::domain::pos::{Pos, RoomId, RoomLinks, FLOORS, PLACES};

/// Highest `@event` number plus one a level may use.
pub const MAX_EVENTS: usize = 256;

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the configured level file, or the embedded level if none is set.
pub fn load_level(config: &GameConfig) -> Result<Level, LevelError> {
    match &config.level_file {
        Some(path) => read_level_file(path),
        None => {
            debug!("no level file configured, using the embedded level");
            parse_level(EMBEDDED_LEVEL)
        }
    }
}

pub fn read_level_file(path: &Path) -> Result<Level, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|e| LevelError::Io {
        path: path.display().to_string(),
        msg: e.to_string(),
    })?;
    let level = parse_level(&text)?;
    info!("loaded level {} \"{}\" from {}", level.id, level.name, path.display());
    Ok(level)
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

struct RoomDef {
    id: RoomId,
    links: RoomLinks,
    rows: Vec<(usize, String)>,
}

/// What one glyph puts in a place.
struct Cell {
    con: Construct,
    spawn: Option<Dir>,
    open: bool,
}

fn glyph(ch: char) -> Option<Cell> {
    use ConstructKind::*;
    let plain = |fg| Construct::new(fg);
    let item = |i| Construct::new(Floor).with_item(i);
    let (con, spawn, open) = match ch {
        '.' => (plain(NoFloor), None, false),
        '_' => (plain(Floor), None, false),
        'x' => (plain(BrokenFloor), None, false),
        'b' => (plain(SkeletonFloor), None, false),
        '~' => (plain(LooseFloor), None, false),
        '^' => (plain(SpikesFloor), None, false),
        'o' => (plain(OpenerFloor), None, false),
        'c' => (plain(CloserFloor), None, false),
        '|' => (plain(Pillar), None, false),
        '#' => (plain(Wall), None, false),
        'D' => (plain(Door), None, false),
        'd' => (plain(Door), None, true),
        'L' => (plain(LevelDoor), None, false),
        'M' => (plain(Mirror), None, false),
        'p' => (item(Item::Potion(Potion::SmallLife)), None, false),
        'P' => (item(Item::Potion(Potion::BigLife)), None, false),
        '!' => (item(Item::Potion(Potion::Poison)), None, false),
        'f' => (item(Item::Potion(Potion::Float)), None, false),
        's' => (item(Item::Sword), None, false),
        '<' => (plain(Floor), Some(Dir::Left), false),
        '>' => (plain(Floor), Some(Dir::Right), false),
        _ => return None,
    };
    Some(Cell { con, spawn, open })
}

fn syntax(line: usize, msg: impl Into<String>) -> LevelError {
    LevelError::Syntax { line, msg: msg.into() }
}

fn parse_num<T: std::str::FromStr>(line: usize, what: &str, s: &str) -> Result<T, LevelError> {
    s.parse::<T>().map_err(|_| syntax(line, format!("bad {what} '{s}'")))
}

fn parse_room_directive(line: usize, args: &[&str]) -> Result<RoomDef, LevelError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(syntax(line, "@room needs a room number"));
    };
    let id: RoomId = parse_num(line, "room number", first)?;
    if id == 0 {
        return Err(syntax(line, "room 0 is reserved"));
    }
    let mut links = RoomLinks::default();
    for kv in rest {
        let Some((key, value)) = kv.split_once('=') else {
            return Err(syntax(line, format!("expected key=value, found '{kv}'")));
        };
        let target: RoomId = parse_num(line, "room link", value)?;
        match key {
            "left" => links.left = target,
            "right" => links.right = target,
            "above" => links.above = target,
            "below" => links.below = target,
            _ => return Err(syntax(line, format!("unknown link '{key}'"))),
        }
    }
    Ok(RoomDef { id, links, rows: Vec::new() })
}

fn parse_event_directive(line: usize, args: &[&str]) -> Result<(usize, DoorEvent), LevelError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(syntax(line, "@event needs an event number"));
    };
    let index: usize = parse_num(line, "event number", first)?;
    let mut door = None;
    let mut next = None;
    for kv in rest {
        match kv.split_once('=') {
            Some(("door", value)) => {
                let parts: Vec<&str> = value.split(',').collect();
                let [room, floor, place] = parts.as_slice() else {
                    return Err(syntax(line, "door=room,floor,place"));
                };
                door = Some(Pos::new(
                    parse_num(line, "room", room)?,
                    parse_num(line, "floor", floor)?,
                    parse_num(line, "place", place)?,
                ));
            }
            Some(("next", value)) => next = Some(parse_num(line, "event number", value)?),
            _ => return Err(syntax(line, format!("unexpected '{kv}'"))),
        }
    }
    let door = door.ok_or_else(|| syntax(line, "@event needs door=room,floor,place"))?;
    Ok((index, DoorEvent { door, next }))
}

/// Parse a level from text content.
pub fn parse_level(content: &str) -> Result<Level, LevelError> {
    let mut name = String::new();
    let mut id = 1u32;
    let mut rooms: Vec<RoomDef> = vec![];
    let mut events: Vec<Option<DoorEvent>> = vec![];

    for (n, raw) in content.lines().enumerate() {
        let line = n + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with(';') {
            continue;
        }
        if let Some(rest) = text.strip_prefix("# ") {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
            continue;
        }
        if let Some(rest) = text.strip_prefix('@') {
            let args: Vec<&str> = rest.split_whitespace().collect();
            match args.split_first() {
                Some((&"level", [n])) => id = parse_num(line, "level number", n)?,
                Some((&"room", rest)) => {
                    let def = parse_room_directive(line, rest)?;
                    if rooms.iter().any(|r| r.id == def.id) {
                        return Err(LevelError::DuplicateRoom(def.id));
                    }
                    rooms.push(def);
                }
                Some((&"event", rest)) => {
                    let (index, e) = parse_event_directive(line, rest)?;
                    if index >= MAX_EVENTS {
                        return Err(syntax(line, format!("event {index} is out of range (max {})", MAX_EVENTS - 1)));
                    }
                    if events.len() <= index {
                        events.resize(index + 1, None);
                    }
                    events[index] = Some(e);
                }
                _ => return Err(syntax(line, format!("unknown directive '{text}'"))),
            }
            continue;
        }

        let Some(room) = rooms.last_mut() else {
            return Err(syntax(line, "map row before any @room"));
        };
        if room.rows.len() >= FLOORS as usize {
            return Err(syntax(line, format!("room {} has too many rows", room.id)));
        }
        if text.chars().count() != PLACES as usize {
            return Err(syntax(line, format!("expected {PLACES} glyphs, found {}", text.chars().count())));
        }
        room.rows.push((line, text.to_string()));
    }

    if rooms.is_empty() {
        return Err(LevelError::Empty);
    }
    rooms.sort_by_key(|r| r.id);
    for (i, r) in rooms.iter().enumerate() {
        if r.id != i + 1 {
            return Err(syntax(0, format!("room {} is missing", i + 1)));
        }
        if r.rows.len() != FLOORS as usize {
            return Err(LevelError::IncompleteRoom { room: r.id, rows: r.rows.len() });
        }
    }

    if name.is_empty() {
        name = "Unnamed Palace".to_string();
    }
    let mut level = Level::new(id, name, rooms.len());
    // Plates are numbered in file order, not room order.
    let mut plate_order: Vec<(usize, Pos)> = vec![];

    for r in &rooms {
        level.links[r.id] = r.links;
        for (floor, (line, row)) in r.rows.iter().enumerate() {
            for (place, ch) in row.chars().enumerate() {
                let cell = glyph(ch).ok_or(LevelError::UnknownGlyph { line: *line, glyph: ch })?;
                let pos = Pos::new(r.id, floor as i32, place as i32);
                if cell.con.is_depressible() {
                    plate_order.push((*line * PLACES as usize + place, pos));
                }
                if let Some(dir) = cell.spawn {
                    level.spawns.push(Spawn { pos, dir });
                }
                if cell.open {
                    level.open_doors.push(pos);
                }
                level.set_con(pos, cell.con);
            }
        }
    }

    plate_order.sort_by_key(|&(order, _)| order);
    for (event, (_, pos)) in plate_order.into_iter().enumerate() {
        let mut c = level.con(pos);
        c.event = Some(event);
        level.set_con(pos, c);
    }

    for (index, e) in events.into_iter().enumerate() {
        match e {
            Some(e) => level.events.push(e),
            None => return Err(syntax(0, format!("event {index} is not defined"))),
        }
    }

    level.validate()?;
    debug!(
        "parsed level {} \"{}\": {} rooms, {} events, {} spawns",
        level.id,
        level.name,
        level.room_count(),
        level.events.len(),
        level.spawns.len()
    );
    Ok(level)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

pub const EMBEDDED_LEVEL: &str = "\
# Palace Gate
@level 1

; Entrance hall. The loose floor sits over the drop to the cellar.
@room 1 left=0 right=2 above=0 below=3
#_________
#__p_o__s_
#>__~___._

; Gatehouse. The opener in the hall raises the gate, the closer slams it.
@room 2 left=1 right=0 above=0 below=0
_______._#
__D__M___#
__c_____L#

; Cellar.
@room 3 left=0 right=0 above=1 below=0
#_________
#__^_P__f_
##########

@event 0 door=2,1,2
@event 1 door=2,1,2
";

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_level_parses() {
        let level = parse_level(EMBEDDED_LEVEL).unwrap();
        assert_eq!(level.id, 1);
        assert_eq!(level.name, "Palace Gate");
        assert_eq!(level.room_count(), 3);
        assert_eq!(level.links[1].right, 2);
        assert_eq!(level.spawns, vec![Spawn { pos: Pos::new(1, 2, 1), dir: Dir::Right }]);
        assert_eq!(level.con(Pos::new(1, 1, 3)).item, Item::Potion(Potion::SmallLife));
        assert_eq!(level.con(Pos::new(2, 1, 2)).fg, ConstructKind::Door);
    }

    #[test]
    fn plates_are_numbered_in_file_order() {
        let level = parse_level(EMBEDDED_LEVEL).unwrap();
        assert_eq!(level.con(Pos::new(1, 1, 5)).event, Some(0));
        assert_eq!(level.con(Pos::new(2, 2, 2)).event, Some(1));
    }

    #[test]
    fn unknown_glyph_reports_line() {
        let err = parse_level("@room 1\n__________\n____?_____\n__________\n").unwrap_err();
        assert_eq!(err, LevelError::UnknownGlyph { line: 3, glyph: '?' });
    }

    #[test]
    fn short_row_is_rejected() {
        let err = parse_level("@room 1\n_____\n").unwrap_err();
        assert!(matches!(err, LevelError::Syntax { line: 2, .. }));
    }

    #[test]
    fn missing_rows_are_rejected() {
        let err = parse_level("@room 1\n__________\n").unwrap_err();
        assert_eq!(err, LevelError::IncompleteRoom { room: 1, rows: 1 });
    }

    #[test]
    fn link_to_missing_room_is_rejected() {
        let text = "@room 1 right=4\n__________\n__________\n__________\n";
        assert!(matches!(parse_level(text), Err(LevelError::BadLink { target: 4, .. })));
    }

    #[test]
    fn plate_without_event_is_rejected() {
        let text = "@room 1\n__________\n____o_____\n__________\n";
        assert!(matches!(parse_level(text), Err(LevelError::MissingEvent { event: 0, .. })));
    }

    #[test]
    fn oversized_event_number_is_rejected() {
        let rows = "@room 1\n__________\n____o_____\n__________\n";
        for n in ["18446744073709551615", "1099511627776", "256"] {
            let text = format!("{rows}@event {n} door=1,1,5\n");
            let err = parse_level(&text).unwrap_err();
            assert!(matches!(err, LevelError::Syntax { line: 5, .. }), "@event {n}: {err:?}");
        }
        // The highest number is accepted; the gap below it is what fails.
        let text = format!("{rows}@event 0 door=1,1,5\n@event 255 door=1,1,5\n");
        assert!(matches!(parse_level(&text), Err(LevelError::Syntax { line: 0, .. })));
    }

    #[test]
    fn open_door_glyph() {
        let text = "@room 1\n__________\n____d_____\n__________\n";
        let level = parse_level(text).unwrap();
        assert_eq!(level.open_doors, vec![Pos::new(1, 1, 4)]);
    }
}
