//! Horde Survival headless driver
//!
//! Runs a seeded simulation at a fixed 60 Hz step with a scripted circular
//! input, always takes the first upgrade offer, and logs a summary.
//!
//! Usage: `horde-survival [seconds] [seed]`

use glam::Vec2;

use horde_survival::sim::{GamePhase, SimEvent};
use horde_survival::{TickInput, World};

const STEP: f32 = 1.0 / 60.0;
const DEFAULT_TIME_LIMIT: f32 = 300.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let time_limit = args
        .next()
        .and_then(|a| a.parse::<f32>().ok())
        .unwrap_or(DEFAULT_TIME_LIMIT);
    let seed = args.next().and_then(|a| a.parse::<u64>().ok()).unwrap_or(0);

    log::info!("Horde Survival (headless) seed={seed} limit={time_limit}s");
    let mut world = World::with_defaults(seed);

    let mut step: u64 = 0;
    while world.elapsed() < time_limit && !world.is_game_over() {
        // Slow circle around the origin
        let t = step as f32 * STEP * 0.5;
        let input = TickInput::moving(Vec2::new(-t.sin(), t.cos()));
        world.tick(STEP, &input);
        step += 1;

        for event in world.drain_events() {
            if let SimEvent::LevelUpPending { level, offers } = event {
                let names: Vec<&str> = offers.iter().map(|o| o.name.as_str()).collect();
                log::debug!("Level {level} offers: {names:?}");
            }
        }
        if world.phase() == GamePhase::LevelUp {
            if let Err(e) = world.select_upgrade(0) {
                log::warn!("Auto-select failed: {e}");
                break;
            }
        }
    }

    let stats = world.stats();
    let weapons: Vec<String> = world
        .avatar()
        .weapons
        .iter()
        .map(|w| format!("{} Lv{}", w.id.name(), w.level()))
        .collect();
    log::info!(
        "{} after {:.1}s: level {}, {} kills, {:.0} damage dealt, {:.0} taken, weapons [{}]",
        if world.is_game_over() { "Died" } else { "Survived" },
        world.elapsed(),
        world.avatar().level,
        stats.enemies_killed,
        stats.damage_dealt,
        stats.damage_taken,
        weapons.join(", ")
    );
}
