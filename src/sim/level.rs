//! A playable level
//!
//! `LevelSpec` is plain content data. `Level` builds the battlefield from it
//! (killer borders, shields, the enemy formation, hit listeners) and is the
//! frame unit the scheduler runs for each turn.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::battlefield::{Battlefield, Tally, TallyKey};
use super::collision::{BallId, Collidable, ColliderId, ListenerId, Obstacle};
use super::events::HitEventBus;
use super::formation::{Formation, ShotRequest};
use super::geometry::{Aabb, Point};
use super::listeners::{BallRemover, BlockRemover, FormationTracker, ScoreTracker};
use super::velocity::Velocity;
use crate::animation::{Countdown, Frame, FrameScheduler, FrameUnit, KeyPressStoppable, PauseScreen};
use crate::consts::{
    BOUNDARY_HEIGHT, PADDLE_FIRE_COOLDOWN_MS, PADDLE_HEIGHT, PADDLE_SHOT_RADIUS, PADDLE_SHOT_SPEED,
    SIDE_MARGIN, SURFACE_HEIGHT, SURFACE_WIDTH,
};
use crate::platform::{Cooldown, Key, Keyboard};
use crate::renderer::{Drawable, Rgb, Skin, Surface};

const COUNTDOWN_SECONDS: f64 = 2.0;
const COUNTDOWN_FROM: u32 = 3;
/// Paddle shots leave from this far above the paddle
const PADDLE_SHOT_CLEARANCE: f64 = 5.0;
const PADDLE_COLOR: Rgb = Rgb(255, 200, 0);

/// Initial obstacle descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub hit_points: u32,
    pub skin: Skin,
}

/// A grid of one-hit cells protecting the paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldSpec {
    pub x: f64,
    pub y: f64,
    pub rows: u32,
    pub columns: u32,
    pub cell: f64,
}

/// Level content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Shown with the level number appended
    pub name: String,
    pub paddle_speed: f64,
    pub paddle_width: f64,
    pub background: Skin,
    /// Enemy formation members
    pub obstacles: Vec<ObstacleSpec>,
    pub shields: Vec<ShieldSpec>,
    pub blocks_to_remove: u32,
}

impl LevelSpec {
    /// Ten columns by five rows of enemies above three shields
    pub fn battle() -> Self {
        let mut obstacles = Vec::with_capacity(50);
        for row in 0..5 {
            for col in 0..10 {
                obstacles.push(ObstacleSpec {
                    x: 150.0 + 50.0 * f64::from(col),
                    y: 40.0 + 40.0 * f64::from(row),
                    width: 40.0,
                    height: 30.0,
                    hit_points: 1,
                    skin: Skin::Image("block_images/enemy.png".into()),
                });
            }
        }
        let shields = [83.0, 320.0, 560.0]
            .into_iter()
            .map(|x| ShieldSpec {
                x,
                y: 500.0,
                rows: 3,
                columns: 30,
                cell: 5.0,
            })
            .collect();
        Self {
            name: "Battle no.".into(),
            paddle_speed: 400.0,
            paddle_width: 100.0,
            background: Skin::Image("background_images/space.jpg".into()),
            blocks_to_remove: obstacles.len() as u32,
            obstacles,
            shields,
        }
    }
}

/// Why a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Every enemy is gone
    Cleared,
    /// An enemy shot struck the paddle
    PaddleHit,
    /// The formation reached the shields
    Invaded,
}

impl TurnOutcome {
    pub fn costs_life(self) -> bool {
        self != TurnOutcome::Cleared
    }
}

/// Keyboard-driven paddle state for the current turn
struct PaddleControl {
    id: ColliderId,
    remover: ListenerId,
    speed: f64,
    fire: Cooldown,
}

pub struct Level {
    name: String,
    paddle_speed: f64,
    paddle_width: f64,
    background: Skin,
    field: Battlefield,
    bus: HitEventBus<Battlefield>,
    balls: Vec<Ball>,
    next_ball: u32,
    paddle: Option<PaddleControl>,
    keyboard: Rc<dyn Keyboard>,
    lives: u32,
    outcome: Option<TurnOutcome>,
}

impl Level {
    pub fn new(
        spec: &LevelSpec,
        number: u32,
        keyboard: Rc<dyn Keyboard>,
        score: i64,
        enemy_speed: f64,
        seed: u64,
    ) -> Self {
        let tally = Tally {
            score,
            blocks_remaining: i64::from(spec.blocks_to_remove),
            paddle_hits: 1,
            ..Default::default()
        };
        let mut level = Self {
            name: format!("{}{}", spec.name, number),
            paddle_speed: spec.paddle_speed,
            paddle_width: spec.paddle_width,
            background: spec.background.clone(),
            field: Battlefield::new(Formation::new(enemy_speed, seed), tally),
            bus: HitEventBus::new(),
            balls: Vec::new(),
            next_ball: 1,
            paddle: None,
            keyboard,
            lives: 0,
            outcome: None,
        };
        level.add_borders();
        for shield in &spec.shields {
            level.add_shield(shield);
        }
        level.add_enemies(&spec.obstacles);
        log::info!(
            "Level '{}' ready: {} enemies, {} obstacles",
            level.name,
            spec.obstacles.len(),
            level.field.obstacles.len()
        );
        level
    }

    fn add_borders(&mut self) {
        let remover = self.bus.register(Box::new(BallRemover::new(TallyKey::Balls)));
        for y in [0.0, SURFACE_HEIGHT] {
            let id = self
                .field
                .obstacles
                .add(Obstacle::boundary(Aabb::from_xywh(0.0, y, SURFACE_WIDTH, BOUNDARY_HEIGHT)));
            self.field.listen(id, remover);
        }
    }

    fn add_shield(&mut self, shield: &ShieldSpec) {
        let listeners = [
            self.bus.register(Box::new(BlockRemover::new(TallyKey::Discarded))),
            self.bus.register(Box::new(BallRemover::new(TallyKey::Balls))),
            self.bus.register(Box::new(ScoreTracker)),
        ];
        for row in 0..shield.rows {
            for col in 0..shield.columns {
                let cell = Aabb::from_xywh(
                    shield.x + f64::from(col) * shield.cell,
                    shield.y + f64::from(row) * shield.cell,
                    shield.cell,
                    shield.cell,
                );
                let id = self
                    .field
                    .obstacles
                    .add(Obstacle::block(cell, 1, Skin::Color(Rgb::SHIELD)));
                for listener in listeners {
                    self.field.listen(id, listener);
                }
            }
        }
    }

    fn add_enemies(&mut self, enemies: &[ObstacleSpec]) {
        let listeners = [
            self.bus.register(Box::new(BlockRemover::new(TallyKey::BlocksRemaining))),
            self.bus.register(Box::new(BallRemover::new(TallyKey::Balls))),
            self.bus.register(Box::new(ScoreTracker)),
            self.bus.register(Box::new(FormationTracker)),
        ];
        for spec in enemies {
            let shape = Aabb::from_xywh(spec.x, spec.y, spec.width, spec.height);
            let id = self
                .field
                .obstacles
                .add(Obstacle::enemy(shape, spec.hit_points, spec.skin.clone()));
            for listener in listeners {
                self.field.listen(id, listener);
            }
            self.field.formation.add_member(id, &self.field.obstacles);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> i64 {
        self.field.tally.score
    }

    pub fn tally(&self) -> &Tally {
        &self.field.tally
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn is_cleared(&self) -> bool {
        self.field.tally.blocks_remaining <= 0
    }

    /// Put a fresh paddle at the bottom center and reset the paddle-hit counter
    pub fn add_paddle(&mut self) {
        self.remove_paddle();
        let shape = Aabb::from_xywh(
            SURFACE_WIDTH / 2.0 - self.paddle_width / 2.0,
            SURFACE_HEIGHT - PADDLE_HEIGHT,
            self.paddle_width,
            PADDLE_HEIGHT,
        );
        let id = self
            .field
            .obstacles
            .add(Obstacle::paddle(shape, Skin::Color(PADDLE_COLOR)));
        self.field.tally.paddle_hits = 1;
        let remover = self.bus.register(Box::new(BallRemover::new(TallyKey::PaddleHits)));
        self.field.listen(id, remover);
        self.paddle = Some(PaddleControl {
            id,
            remover,
            speed: self.paddle_speed,
            fire: Cooldown::new(PADDLE_FIRE_COOLDOWN_MS),
        });
    }

    pub fn remove_paddle(&mut self) {
        if let Some(paddle) = self.paddle.take() {
            self.field.obstacles.remove(paddle.id);
            self.bus.unregister(paddle.remover);
        }
    }

    pub fn paddle_shape(&self) -> Option<Aabb> {
        let paddle = self.paddle.as_ref()?;
        self.field
            .obstacles
            .get(paddle.id)
            .map(|p| *p.collision_shape())
    }

    fn spawn(&mut self, origin: Point, velocity: Velocity, radius: f64, color: Rgb) -> BallId {
        let id = BallId(self.next_ball);
        self.next_ball += 1;
        self.balls.push(Ball::new(id, origin, radius, velocity, color));
        self.field.tally.balls += 1;
        id
    }

    fn spawn_enemy_shot(&mut self, shot: ShotRequest) {
        self.spawn(shot.origin, shot.velocity, shot.radius, Rgb::RED);
    }

    /// Fire from the paddle's upper edge, subject to its cooldown
    pub fn fire_paddle(&mut self, now_ms: u64) -> Option<BallId> {
        let paddle = self.paddle.as_mut()?;
        let mid = self
            .field
            .obstacles
            .get(paddle.id)?
            .collision_shape()
            .upper_edge()
            .midpoint();
        if !paddle.fire.try_fire(now_ms) {
            return None;
        }
        let origin = mid.translated(0.0, -PADDLE_SHOT_CLEARANCE);
        Some(self.spawn(
            origin,
            Velocity::new(0.0, -PADDLE_SHOT_SPEED),
            PADDLE_SHOT_RADIUS,
            Rgb::WHITE,
        ))
    }

    fn move_paddle(&mut self, dt: f64) {
        let Some(paddle) = self.paddle.as_ref() else {
            return;
        };
        let Some(obstacle) = self.field.obstacles.get_mut(paddle.id) else {
            return;
        };
        let step = paddle.speed * dt;
        let shape = obstacle.collision_shape();
        let (left, right) = (shape.upper_left().x, shape.right());
        let dx = if self.keyboard.is_pressed(Key::Left) && left - step >= SIDE_MARGIN {
            -step
        } else if self.keyboard.is_pressed(Key::Right)
            && right + step <= SURFACE_WIDTH - SIDE_MARGIN
        {
            step
        } else {
            return;
        };
        let ul = shape.upper_left().translated(dx, 0.0);
        obstacle.move_to(ul);
    }

    /// Advance the simulation by one tick: formation, paddle, then every shot.
    /// Shots retired by listeners are dropped once all have moved.
    pub fn update(&mut self, dt: f64, now_ms: u64) {
        if let Some(shot) = self.field.formation.tick(&mut self.field.obstacles, dt, now_ms) {
            self.spawn_enemy_shot(shot);
        }
        self.move_paddle(dt);

        for ball in &mut self.balls {
            if let Some(event) = ball.move_one_step(&mut self.field.obstacles, dt) {
                self.bus.notify(&event, &mut self.field);
            }
        }

        let spent = std::mem::take(&mut self.field.spent_shots);
        if !spent.is_empty() {
            self.balls.retain(|b| !spent.contains(&b.id));
        }
    }

    /// Drop every shot in flight
    pub fn remove_shots(&mut self) {
        self.balls.clear();
        self.field.spent_shots.clear();
    }

    /// After a lost turn: walk the formation home and clear the air
    fn reset_after_loss(&mut self, dt: f64) {
        if let Err(e) = self.field.formation.realign(&mut self.field.obstacles, dt) {
            log::warn!("{e}; formation left where it stopped");
        }
        self.remove_shots();
    }

    /// One turn: paddle in, countdown, play until the turn ends, paddle out
    pub fn play_one_turn(&mut self, scheduler: &mut FrameScheduler, lives: u32) -> TurnOutcome {
        self.lives = lives;
        self.add_paddle();

        {
            let mut countdown =
                Countdown::new(COUNTDOWN_SECONDS, COUNTDOWN_FROM, &*self, scheduler.clock());
            scheduler.run(&mut countdown);
        }

        self.outcome = None;
        scheduler.run(self);
        self.remove_paddle();

        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None if self.is_cleared() => TurnOutcome::Cleared,
            None => TurnOutcome::PaddleHit,
        };
        log::info!("Level '{}' turn over: {:?}, score {}", self.name, outcome, self.score());
        outcome
    }

    fn draw_indicators(&self, surface: &mut dyn Surface) {
        let lives_x = surface.width() / 3.0;
        let text_y = surface.height() / 25.0;
        surface.draw_image(Point::new(lives_x - 16.0, -6.0), "general_images/heart.png");
        surface.draw_text(Point::new(lives_x, text_y), &self.lives.to_string(), 20, Rgb::WHITE);
        surface.draw_text(
            Point::new(360.0, text_y),
            &format!("Score: {}", self.field.tally.score),
            18,
            Rgb::WHITE,
        );
        surface.draw_text(Point::new(75.0, 25.0), "\"p\" - pause", 18, Rgb::WHITE);
        surface.draw_text(
            Point::new(500.0, 25.0),
            &format!("Level Name: {}", self.name),
            18,
            Rgb::WHITE,
        );
    }
}

impl Drawable for Level {
    fn draw_on(&self, surface: &mut dyn Surface) {
        let screen = Aabb::from_xywh(0.0, 0.0, surface.width(), surface.height());
        self.background.paint(surface, &screen);
        for (_, obstacle) in self.field.obstacles.iter() {
            obstacle.draw_on(surface);
        }
        for ball in &self.balls {
            ball.draw_on(surface);
        }
        self.draw_indicators(surface);
    }
}

impl FrameUnit for Level {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>) {
        let dt = frame.dt();
        let now = frame.now_millis();
        self.draw_on(frame.surface());
        self.update(dt, now);

        if self.keyboard.is_pressed(Key::Space) {
            self.fire_paddle(now);
        }
        if self.keyboard.is_pressed(Key::Pause) {
            let mut pause =
                KeyPressStoppable::new(Rc::clone(&self.keyboard), Key::Continue, PauseScreen);
            frame.run(&mut pause);
        }

        if self.is_cleared() {
            log::info!("Level '{}' cleared", self.name);
            self.outcome = Some(TurnOutcome::Cleared);
        } else if self.field.tally.paddle_hits <= 0 {
            log::info!("Paddle hit");
            self.outcome = Some(TurnOutcome::PaddleHit);
            self.reset_after_loss(dt);
        } else if self.field.formation.has_arrived() {
            self.outcome = Some(TurnOutcome::Invaded);
            self.reset_after_loss(dt);
        }
    }

    fn should_stop(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ScriptedKeyboard;

    const DT: f64 = 1.0 / 60.0;

    fn level_with(spec: &LevelSpec, speed: f64) -> (Level, Rc<ScriptedKeyboard>) {
        let keyboard = Rc::new(ScriptedKeyboard::new());
        let level = Level::new(spec, 1, keyboard.clone(), 0, speed, 3);
        (level, keyboard)
    }

    fn lone_enemy() -> LevelSpec {
        LevelSpec {
            obstacles: vec![ObstacleSpec {
                x: 380.0,
                y: 100.0,
                width: 40.0,
                height: 30.0,
                hit_points: 1,
                skin: Skin::default(),
            }],
            shields: Vec::new(),
            blocks_to_remove: 1,
            ..LevelSpec::battle()
        }
    }

    #[test]
    fn test_battle_setup() {
        let (level, _kb) = level_with(&LevelSpec::battle(), 65.0);
        let field = level.battlefield();
        // 2 borders, 3 shields of 90 cells, 50 enemies
        assert_eq!(field.obstacles.len(), 2 + 270 + 50);
        assert_eq!(field.formation.members().len(), 50);
        assert_eq!(level.tally().blocks_remaining, 50);
        assert_eq!(level.name(), "Battle no.1");
    }

    #[test]
    fn test_paddle_placement_and_removal() {
        let (mut level, _kb) = level_with(&lone_enemy(), 0.0);
        level.add_paddle();
        let shape = level.paddle_shape().unwrap();
        assert_eq!(shape.upper_left(), Point::new(350.0, 580.0));
        assert_eq!(shape.width(), 100.0);

        level.remove_paddle();
        assert!(level.paddle_shape().is_none());
    }

    #[test]
    fn test_paddle_turns_do_not_pile_up_listeners() {
        let (mut level, _kb) = level_with(&lone_enemy(), 0.0);
        let base = level.bus.len();
        level.add_paddle();
        let with_paddle = level.bus.len();
        assert_eq!(with_paddle, base + 1);

        for _ in 0..5 {
            level.add_paddle();
            assert_eq!(level.bus.len(), with_paddle);
        }
        level.remove_paddle();
        assert_eq!(level.bus.len(), base);
    }

    #[test]
    fn test_paddle_respects_side_margins() {
        let (mut level, kb) = level_with(&lone_enemy(), 0.0);
        level.add_paddle();
        kb.press(Key::Left);
        for _ in 0..200 {
            level.move_paddle(DT);
        }
        let x = level.paddle_shape().unwrap().upper_left().x;
        assert!(x >= SIDE_MARGIN && x < SIDE_MARGIN + 400.0 * DT);

        kb.release(Key::Left);
        kb.press(Key::Right);
        for _ in 0..200 {
            level.move_paddle(DT);
        }
        let right = level.paddle_shape().unwrap().right();
        assert!(right <= SURFACE_WIDTH - SIDE_MARGIN);
    }

    #[test]
    fn test_paddle_fire_cooldown() {
        let (mut level, _kb) = level_with(&lone_enemy(), 0.0);
        level.add_paddle();
        let first = level.fire_paddle(1_000).unwrap();
        assert!(level.fire_paddle(1_200).is_none());
        assert!(level.fire_paddle(1_351).is_some());

        let shot = level.balls().iter().find(|b| b.id == first).unwrap();
        assert_eq!(shot.center, Point::new(400.0, 575.0));
        assert_eq!(shot.velocity, Velocity::new(0.0, -PADDLE_SHOT_SPEED));
        assert_eq!(shot.radius, PADDLE_SHOT_RADIUS);
    }

    #[test]
    fn test_paddle_shot_clears_lone_enemy() {
        let (mut level, _kb) = level_with(&lone_enemy(), 0.0);
        level.add_paddle();
        // Formation fires first; keep its shot out of the picture
        level.update(DT, 0);
        level.remove_shots();

        level.fire_paddle(10);
        for _ in 0..100 {
            level.update(DT, 10);
            if level.is_cleared() {
                break;
            }
        }
        assert!(level.is_cleared());
        assert_eq!(level.score(), 5);
        assert!(level.battlefield().formation.is_empty());
        assert!(level.balls().is_empty());
    }

    #[test]
    fn test_shield_absorbs_paddle_shot() {
        let spec = LevelSpec {
            obstacles: Vec::new(),
            blocks_to_remove: 0,
            ..LevelSpec::battle()
        };
        let (mut level, _kb) = level_with(&spec, 0.0);
        level.add_paddle();
        let before = level.battlefield().obstacles.len();
        level.fire_paddle(0);
        for _ in 0..30 {
            level.update(DT, 0);
        }
        assert!(level.balls().is_empty());
        assert_eq!(level.battlefield().obstacles.len(), before - 1);
        assert_eq!(level.score(), 0);
    }

    #[test]
    fn test_enemy_shot_hits_paddle() {
        let (mut level, _kb) = level_with(&lone_enemy(), 0.0);
        level.add_paddle();
        // Drop a shot straight onto the paddle
        level.spawn(Point::new(400.0, 560.0), Velocity::new(0.0, 300.0), 5.0, Rgb::RED);
        for _ in 0..10 {
            level.update(DT, 0);
        }
        assert_eq!(level.tally().paddle_hits, 0);
        assert!(level.paddle_shape().is_some());
    }
}
