/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Actors, in index order (each one sees the effects of those
///      before it: a taken item is gone for everyone after)
///   2. Depressible floors, from the tick's combined press log
///   3. Loose floors: presses start shaking, then slabs fall and strike
///   4. Doors
///   5. Death check
///
/// Actors only record floor contacts while they run; plates and slabs
/// react once every actor has moved, so the order in which two actors
/// run never changes what a plate sees.
use log::debug;

use crate::domain::action::{self, Ctx, Entry};
use crate::domain::anim::KeyState;
use crate::domain::effect::Effect;
use crate::domain::level::Level;
use crate::domain::loose_floor::Head;
use crate::domain::pressure::PressLog;
use crate::domain::survey::{survey, CoordFn, MapView, PosFn};
use super::event::SimEvent;
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// `inputs[i]` is the key state of actor `i`; missing entries mean no
/// keys pressed.
pub fn step(world: &mut World, inputs: &[KeyState]) -> Vec<SimEvent> {
    if world.phase != Phase::Playing || world.paused {
        return vec![];
    }

    let mut events: Vec<SimEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }

    let presses = resolve_actors(world, inputs, &mut events);
    resolve_plates(world, &presses, &mut events);
    resolve_loose_floors(world, &presses, &mut events);
    resolve_doors(world, &mut events);
    resolve_death(world);

    events
}

// ══════════════════════════════════════════════════════════════
// Actors
// ══════════════════════════════════════════════════════════════

fn resolve_actors(world: &mut World, inputs: &[KeyState], events: &mut Vec<SimEvent>) -> PressLog {
    let mut presses = PressLog::default();
    for (idx, k) in world.actors.iter_mut().enumerate() {
        if !k.alive {
            continue;
        }
        k.key = inputs.get(idx).copied().unwrap_or_default();
        let mut effects = Vec::new();
        {
            let mut ctx = Ctx {
                view: MapView { level: &world.level, doors: &world.doors.list, loose: &world.loose.list },
                presses: &mut presses,
                effects: &mut effects,
            };
            action::run(k, &mut ctx);
        }
        publish(&mut world.level, Some(k.id), effects, events);
    }
    presses
}

/// Apply the effects that change the level and turn all of them into
/// events. `actor` is who caused them, if anyone.
fn publish(level: &mut Level, actor: Option<usize>, effects: Vec<Effect>, events: &mut Vec<SimEvent>) {
    for e in effects {
        let event = match (e, actor) {
            (Effect::Play(sample, room), _) => SimEvent::Sample { sample, room },
            (Effect::TakeItem(pos), Some(actor)) => {
                let item = level.take_item(pos);
                debug!("actor {actor} took {item:?} at {pos:?}");
                SimEvent::ItemTaken { actor, pos, item }
            }
            (Effect::Transition { from, to }, Some(actor)) => SimEvent::ActionChanged { actor, from, to },
            (Effect::Hurt, Some(actor)) => SimEvent::ActorHurt { actor },
            (Effect::Died, Some(actor)) => SimEvent::ActorDied { actor },
            (Effect::PlatePressed(pos), _) => SimEvent::FloorPressed { pos },
            (Effect::LooseReleased(pos), _) => SimEvent::LooseFloorReleased { pos },
            (Effect::LooseShattered(pos), _) => SimEvent::LooseFloorShattered { pos },
            (e, None) => {
                debug!("dropping actor effect {e:?} with no actor");
                continue;
            }
        };
        events.push(event);
    }
}

// ══════════════════════════════════════════════════════════════
// Environment
// ══════════════════════════════════════════════════════════════

fn resolve_plates(world: &mut World, presses: &PressLog, events: &mut Vec<SimEvent>) {
    let mut effects = Vec::new();
    world.plates.apply(presses, &world.level, &mut world.doors, &world.cfg.floor, &world.cfg.door, &mut effects);
    publish(&mut world.level, None, effects, events);
}

fn resolve_loose_floors(world: &mut World, presses: &PressLog, events: &mut Vec<SimEvent>) {
    let mut effects = Vec::new();
    world.loose.apply_presses(presses, &world.cfg.loose_floor, &mut effects);

    let heads: Vec<Head> = {
        let view = world.view();
        world
            .actors
            .iter()
            .filter(|k| k.alive)
            .map(|k| Head { actor: k.id, pos: survey(CoordFn::MiddleTop, PosFn::Cell, &k.f, &view).pos })
            .collect()
    };
    let struck = world.loose.tick(&mut world.level, &heads, &world.cfg.loose_floor, &mut effects);
    publish(&mut world.level, None, effects, events);

    for id in struck {
        let Some(k) = world.actors.iter_mut().find(|k| k.id == id) else { continue };
        debug!("actor {id} struck by a loose floor");
        k.hit_by_loose_floor = true;
        k.uncouch_slowly = true;
        k.pending = Some(Entry::Sudden);
        events.push(SimEvent::ActorHurt { actor: id });
        if k.hurt_once() {
            events.push(SimEvent::ActorDied { actor: id });
        }
    }
}

fn resolve_doors(world: &mut World, events: &mut Vec<SimEvent>) {
    let mut effects = Vec::new();
    world.doors.tick(&world.cfg.door, &mut effects);
    publish(&mut world.level, None, effects, events);
}

fn resolve_death(world: &mut World) {
    if world.player().is_some_and(|k| !k.alive) {
        world.phase = Phase::Dead;
        world.set_message("You died. Press R to restart.", 0);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::domain::action::ActionKind;
    use crate::domain::construct::{ConstructKind, Item, Potion};
    use crate::domain::door::DOOR_MAX_STEP;
    use crate::domain::loose_floor::{LooseFloors, LooseState};
    use crate::domain::action::normal::STAND;
    use crate::domain::frame::{Frame, FrameOffset};
    use crate::domain::pos::{Pos, FEET_Y, PLACE_WIDTH};
    use crate::domain::testing::level_text;
    use crate::sim::level::{parse_level, EMBEDDED_LEVEL};

    fn world(text: &str) -> World {
        World::new(level_text(text), SimConfig::default())
    }

    fn keys(f: impl Fn(&mut KeyState)) -> Vec<KeyState> {
        let mut k = KeyState::default();
        f(&mut k);
        vec![k]
    }

    #[test]
    fn same_inputs_same_world() {
        let script: Vec<Vec<KeyState>> = (0..200)
            .map(|t| keys(|k| {
                k.right = t % 50 < 30;
                k.down = t % 70 > 60;
                k.shift = t % 90 > 80;
            }))
            .collect();

        let run = || {
            let mut w = World::new(parse_level(EMBEDDED_LEVEL).unwrap(), SimConfig::default());
            let mut all = vec![];
            for input in &script {
                all.extend(step(&mut w, input));
            }
            (all, w.actors[0].f, w.actors[0].action, w.loose.clone(), w.doors.clone())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn standing_on_an_opener_raises_the_door() {
        let mut w = world("@room 1\n__________\n___>o__D__\n__________\n@event 0 door=1,1,7\n");
        let right = keys(|k| k.right = true);
        let mut pressed = false;
        for _ in 0..40 {
            let events = step(&mut w, &right);
            if events.contains(&SimEvent::FloorPressed { pos: Pos::new(1, 1, 4) }) {
                pressed = true;
                break;
            }
        }
        assert!(pressed, "never stepped on the plate");
        assert!(w.plates.at(Pos::new(1, 1, 4)).is_some_and(|p| p.depth > 0));
        for _ in 0..5 {
            step(&mut w, &[]);
        }
        assert!(w.doors.at(Pos::new(1, 1, 7)).is_some_and(|d| d.i < DOOR_MAX_STEP));
    }

    #[test]
    fn two_actors_on_one_plate_press_it_once() {
        let plate = Pos::new(1, 1, 4);
        let two_on_the_plate = |reversed: bool| {
            let mut w = world("@room 1\n__________\n___<o>__D_\n__________\n@event 0 door=1,1,8\n");
            assert_eq!(w.actors.len(), 2);
            for k in &mut w.actors {
                k.f = Frame::placed(STAND, plate, k.f.dir, (PLACE_WIDTH - STAND.w) / 2, FEET_Y + 1 - STAND.h);
                k.fo = FrameOffset::still(&k.f);
            }
            if reversed {
                w.actors.reverse();
                for (id, k) in w.actors.iter_mut().enumerate() {
                    k.id = id;
                }
            }
            let events = step(&mut w, &[]);
            let pressed = events.iter().filter(|e| **e == SimEvent::FloorPressed { pos: plate }).count();
            (w.plates.at(plate).cloned(), w.doors.clone(), pressed)
        };

        let (plate_a, doors_a, pressed_a) = two_on_the_plate(false);
        let (plate_b, doors_b, pressed_b) = two_on_the_plate(true);
        assert_eq!(pressed_a, 1);
        assert_eq!(pressed_b, 1);
        assert_eq!(plate_a, plate_b);
        assert_eq!(doors_a, doors_b);

        let cfg = SimConfig::default();
        let p = plate_a.unwrap();
        assert_eq!(p.depth, cfg.floor.press_depth);
        assert_eq!(p.timer, cfg.floor.release_ticks);
        assert!(p.held);
    }

    #[test]
    fn loose_floor_gives_way_under_the_actor() {
        let mut w = world("@room 1\n__________\n____<_____\n__________\n");
        // Spawn glyphs stand on plain floor; swap in a slab under the actor.
        w.level.set_kind(Pos::new(1, 1, 4), ConstructKind::LooseFloor);
        w.loose = LooseFloors::from_level(&w.level);
        let mut released = false;
        let mut fell = false;
        for _ in 0..40 {
            for e in step(&mut w, &[]) {
                match e {
                    SimEvent::LooseFloorReleased { pos } if pos == Pos::new(1, 1, 4) => released = true,
                    SimEvent::ActionChanged { to: ActionKind::Fall, .. } => fell = true,
                    _ => {}
                }
            }
        }
        assert!(released);
        assert!(fell);
        assert_eq!(w.level.con(Pos::new(1, 1, 4)).fg, ConstructKind::NoFloor);
    }

    #[test]
    fn falling_slab_knocks_the_actor_down() {
        let mut w = world("@room 1\n____~_____\n____<_____\n__________\n");
        w.loose.list[0].state = LooseState::Shaking { left: 1 };
        let mut hurt = false;
        for _ in 0..20 {
            let events = step(&mut w, &[]);
            hurt |= events.contains(&SimEvent::ActorHurt { actor: 0 });
            if hurt {
                break;
            }
        }
        assert!(hurt);
        let k = &w.actors[0];
        assert!(k.hit_by_loose_floor && k.uncouch_slowly);
        assert_eq!(k.lives.current, 2);
        assert_eq!(k.pending, Some(Entry::Sudden));
        step(&mut w, &[]);
        assert_eq!(w.actors[0].action, ActionKind::Couch);
        assert_eq!(w.actors[0].pending, None);
    }

    #[test]
    fn picking_up_a_potion_takes_it_from_the_level() {
        let mut w = world("@room 1\n__________\n____<_____\n__________\n");
        let p = Pos::new(1, 1, 4);
        let c = w.level.con(p).with_item(Item::Potion(Potion::SmallLife));
        w.level.set_con(p, c);
        let shift = keys(|k| k.shift = true);
        let mut taken = None;
        for _ in 0..30 {
            for e in step(&mut w, &shift) {
                if let SimEvent::ItemTaken { item, .. } = e {
                    taken = Some(item);
                }
            }
        }
        assert_eq!(taken, Some(Item::Potion(Potion::SmallLife)));
        assert_eq!(w.level.con(p).item, Item::None);
    }

    #[test]
    fn player_death_stops_the_world() {
        let mut w = world("@room 1\n__________\n____<_____\n__________\n");
        w.actors[0].kill();
        step(&mut w, &[]);
        assert_eq!(w.phase, Phase::Dead);
        let tick = w.tick;
        assert!(step(&mut w, &[]).is_empty());
        assert_eq!(w.tick, tick);
    }
}
