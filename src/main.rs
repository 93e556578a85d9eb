/// Entry point and game loop.
use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{error, info};

use tilekid::config::GameConfig;
use tilekid::sim::event::SimEvent;
use tilekid::sim::level::load_level;
use tilekid::sim::step;
use tilekid::sim::world::{Phase, World};
use tilekid::ui::input::InputState;
use tilekid::ui::renderer::Renderer;
use tilekid::ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "tilekid.log";

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let level = match load_level(&config) {
        Ok(level) => level,
        Err(e) => {
            error!("level load failed: {e}");
            eprintln!("Cannot load level: {e}");
            std::process::exit(1);
        }
    };
    info!("starting level {} \"{}\"", level.id, level.name);

    let mut world = World::new(level, config.sim.clone());
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!("Left \"{}\" after {} ticks.", world.level.name, world.tick);
}

/// The terminal belongs to the renderer, so log records go to a file.
fn init_logging(config: &GameConfig) {
    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_millis();
    match File::create(LOG_FILE) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // Nowhere to write; stay quiet rather than draw over the game.
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        handle_meta(world, &kb);

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(world, &[kb.key_state()]);
            process_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn handle_meta(world: &mut World, kb: &InputState) {
    if kb.any_pressed(KEYS_RESTART) {
        info!("restart at tick {}", world.tick);
        world.restart();
        return;
    }
    if world.phase == Phase::Playing && kb.any_pressed(KEYS_PAUSE) {
        world.paused = !world.paused;
    }
}

fn process_events(sound: Option<&SoundEngine>, events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::Sample { sample, .. } => {
                if let Some(sfx) = sound {
                    sfx.play(*sample);
                }
            }
            SimEvent::ActorDied { actor } => info!("actor {actor} died"),
            SimEvent::ItemTaken { actor, item, .. } => info!("actor {actor} took {item:?}"),
            _ => {}
        }
    }
}
