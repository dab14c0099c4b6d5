//! Game flow: levels in sequence while lives last, then the end screens

use std::rc::Rc;

use super::level::{Level, LevelSpec, TurnOutcome};
use crate::animation::{EndScreen, FrameScheduler, HighScoresScreen, KeyPressStoppable};
use crate::highscores::{HighScoresTable, ScoreInfo};
use crate::platform::{Key, Keyboard};
use crate::settings::Settings;

/// Asks the player for a leaderboard name
pub trait NamePrompt {
    /// `None` declines the entry
    fn ask_name(&mut self, score: i64) -> Option<String>;
}

/// Always answers with the same name
#[derive(Debug, Clone)]
pub struct FixedName(pub String);

impl NamePrompt for FixedName {
    fn ask_name(&mut self, _score: i64) -> Option<String> {
        Some(self.0.clone())
    }
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: i64,
    pub levels_cleared: u32,
    /// Leaderboard position, when the score was entered
    pub rank: Option<usize>,
}

pub struct GameFlow {
    keyboard: Rc<dyn Keyboard>,
    lives: u32,
    score: i64,
    enemy_speed: f64,
    enemy_speed_step: f64,
    seed: u64,
    level_number: u32,
}

impl GameFlow {
    pub fn new(keyboard: Rc<dyn Keyboard>, settings: &Settings) -> Self {
        Self {
            keyboard,
            lives: settings.lives,
            score: 0,
            enemy_speed: settings.enemy_speed,
            enemy_speed_step: settings.enemy_speed_step,
            seed: settings.seed,
            level_number: 1,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn enemy_speed(&self) -> f64 {
        self.enemy_speed
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    /// Play `levels` in turn, cycling back to the first after the last,
    /// until the lives run out. Every cleared level speeds the next formation up.
    pub fn run_levels(&mut self, scheduler: &mut FrameScheduler, levels: &[LevelSpec]) -> u32 {
        let mut cleared = 0;
        if levels.is_empty() {
            log::warn!("No levels to play");
            return cleared;
        }
        while self.lives > 0 {
            let spec = &levels[(self.level_number as usize - 1) % levels.len()];
            let seed = self.seed.wrapping_add(u64::from(self.level_number));
            let mut level = Level::new(
                spec,
                self.level_number,
                Rc::clone(&self.keyboard),
                self.score,
                self.enemy_speed,
                seed,
            );

            while self.lives > 0 {
                let outcome = level.play_one_turn(scheduler, self.lives);
                if outcome == TurnOutcome::Cleared {
                    break;
                }
                self.lives -= 1;
                log::info!("Life lost ({outcome:?}), {} left", self.lives);
            }
            self.score = level.score();

            if level.is_cleared() {
                cleared += 1;
                self.level_number += 1;
                self.enemy_speed += self.enemy_speed_step;
                log::info!(
                    "Level '{}' cleared, next formation speed {}",
                    level.name(),
                    self.enemy_speed
                );
            }
        }
        cleared
    }

    /// Game over screen, leaderboard entry, leaderboard screen
    pub fn finish(
        &mut self,
        scheduler: &mut FrameScheduler,
        table: &mut HighScoresTable,
        prompt: &mut dyn NamePrompt,
    ) -> Option<usize> {
        let mut end = KeyPressStoppable::new(
            Rc::clone(&self.keyboard),
            Key::Continue,
            EndScreen::new(self.score),
        );
        scheduler.run(&mut end);

        let rank = if table.qualifies(self.score) {
            prompt
                .ask_name(self.score)
                .and_then(|name| table.add(ScoreInfo::new(name, self.score)))
        } else {
            None
        };
        if let Some(rank) = rank {
            log::info!("Score {} entered at rank {rank}", self.score);
        }

        let mut scores = KeyPressStoppable::new(
            Rc::clone(&self.keyboard),
            Key::Space,
            HighScoresScreen::new(table.clone()),
        );
        scheduler.run(&mut scores);
        rank
    }

    /// A whole game
    pub fn run(
        &mut self,
        scheduler: &mut FrameScheduler,
        levels: &[LevelSpec],
        table: &mut HighScoresTable,
        prompt: &mut dyn NamePrompt,
    ) -> GameSummary {
        log::info!("Game started with {} lives", self.lives);
        let levels_cleared = self.run_levels(scheduler, levels);
        let rank = self.finish(scheduler, table, prompt);
        GameSummary {
            score: self.score,
            levels_cleared,
            rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Clock, ManualClock, ScriptedKeyboard};
    use crate::renderer::{NullSurface, RecordingSurface};
    use std::cell::RefCell;

    #[test]
    fn test_new_flow_from_settings() {
        let settings = Settings {
            lives: 7,
            enemy_speed: 80.0,
            ..Default::default()
        };
        let flow = GameFlow::new(Rc::new(ScriptedKeyboard::new()), &settings);
        assert_eq!(flow.lives(), 7);
        assert_eq!(flow.enemy_speed(), 80.0);
        assert_eq!(flow.level_number(), 1);
        assert_eq!(flow.score(), 0);
    }

    #[test]
    fn test_no_levels_ends_immediately() {
        let clock = Rc::new(ManualClock::new());
        let mut scheduler = FrameScheduler::new(60, Box::new(NullSurface::default()), clock);
        let mut flow = GameFlow::new(Rc::new(ScriptedKeyboard::new()), &Settings::default());
        assert_eq!(flow.run_levels(&mut scheduler, &[]), 0);
        assert_eq!(scheduler.frames(), 0);
    }

    /// Taps both menu keys every 100ms of clock time
    struct Tapping(Rc<ManualClock>);

    impl Keyboard for Tapping {
        fn is_pressed(&self, key: Key) -> bool {
            matches!(key, Key::Continue | Key::Space) && (self.0.now_millis() / 100) % 2 == 1
        }
    }

    struct Counting {
        asked: u32,
        answer: Option<String>,
    }

    impl NamePrompt for Counting {
        fn ask_name(&mut self, _score: i64) -> Option<String> {
            self.asked += 1;
            self.answer.clone()
        }
    }

    fn finish_with(
        score: i64,
        answer: Option<&str>,
    ) -> (Option<usize>, Counting, HighScoresTable, String) {
        let clock = Rc::new(ManualClock::new());
        let surface = Rc::new(RefCell::new(RecordingSurface::default()));
        let mut scheduler = FrameScheduler::new(60, Box::new(surface.clone()), clock.clone());
        let mut flow = GameFlow::new(Rc::new(Tapping(clock)), &Settings::default());
        flow.score = score;
        let mut table = HighScoresTable::new(5);
        let mut prompt = Counting {
            asked: 0,
            answer: answer.map(String::from),
        };
        let rank = flow.finish(&mut scheduler, &mut table, &mut prompt);
        let texts = surface.borrow().last_texts().join("|");
        (rank, prompt, table, texts)
    }

    #[test]
    fn test_finish_enters_qualifying_score() {
        let (rank, prompt, table, texts) = finish_with(35, Some("ada"));
        assert_eq!(rank, Some(1));
        assert_eq!(prompt.asked, 1);
        assert_eq!(table.entries(), &[ScoreInfo::new("ada", 35)]);
        assert!(texts.contains("ada|35"));
        assert!(texts.ends_with("Press space to continue"));
    }

    #[test]
    fn test_finish_skips_prompt_for_zero_score() {
        let (rank, prompt, table, _) = finish_with(0, Some("ada"));
        assert_eq!(rank, None);
        assert_eq!(prompt.asked, 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_declined_name_leaves_table_alone() {
        let (rank, prompt, table, _) = finish_with(20, None);
        assert_eq!(rank, None);
        assert_eq!(prompt.asked, 1);
        assert!(table.is_empty());
    }
}
