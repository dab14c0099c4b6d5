//! Brick Invaders entry point
//!
//! Runs a headless game: an autopilot at the keys, a surface that draws
//! nowhere, and the real clock pacing frames. Pass a settings JSON path as
//! the first argument to override the defaults.

use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use brick_invaders::animation::FrameScheduler;
use brick_invaders::platform::{AutopilotKeyboard, Clock, SystemClock};
use brick_invaders::renderer::NullSurface;
use brick_invaders::sim::{FixedName, GameFlow, LevelSpec};
use brick_invaders::{HighScoresTable, Settings};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Brick Invaders starting...");

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref())?;
    let mut table =
        HighScoresTable::load_or_default(&settings.high_scores_path, settings.high_score_slots);

    let clock: Rc<dyn Clock> = Rc::new(SystemClock::new());
    let keyboard = Rc::new(AutopilotKeyboard::new(Rc::clone(&clock)));
    let surface = Box::new(NullSurface::default());
    let mut scheduler = FrameScheduler::new(settings.frames_per_second, surface, clock);

    let mut flow = GameFlow::new(keyboard, &settings);
    let mut prompt = FixedName(settings.player_name.clone());
    let summary = flow.run(&mut scheduler, &[LevelSpec::battle()], &mut table, &mut prompt);
    log::info!(
        "Game over: score {}, {} level(s) cleared, {} frames",
        summary.score,
        summary.levels_cleared,
        scheduler.frames()
    );

    table.save(&settings.high_scores_path)?;
    log::info!("High scores saved to {}", settings.high_scores_path.display());
    Ok(())
}
