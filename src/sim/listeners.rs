//! Hit listeners wired up by a level
//!
//! A shot counts as the player's when it was travelling upward at the moment
//! of impact. Enemy blocks only react to those.

use super::battlefield::{Battlefield, TallyKey};
use super::collision::{HitNotifier, ListenerId, Struck};
use super::events::{HitEvent, HitListener};
use crate::consts::ENEMY_SCORE;

fn upward(event: &HitEvent) -> bool {
    event.hitter_velocity.dy < 0.0
}

/// Removes a block once its hit points are gone and decrements `counter`
pub struct BlockRemover {
    counter: TallyKey,
}

impl BlockRemover {
    pub fn new(counter: TallyKey) -> Self {
        Self { counter }
    }
}

impl HitListener<Battlefield> for BlockRemover {
    fn hit_event(&mut self, me: ListenerId, event: &HitEvent, field: &mut Battlefield) {
        let Struck::Block { enemy, hit_points } = event.target else {
            return;
        };
        if (upward(event) || !enemy) && hit_points == 0 {
            if let Some(block) = field.obstacles.get_mut(event.struck) {
                block.remove_hit_listener(me);
            }
            field.obstacles.remove(event.struck);
            field.tally.adjust(self.counter, -1);
        }
    }
}

/// Retires the shot that did the hitting and decrements `counter`
pub struct BallRemover {
    counter: TallyKey,
}

impl BallRemover {
    pub fn new(counter: TallyKey) -> Self {
        Self { counter }
    }
}

impl HitListener<Battlefield> for BallRemover {
    fn hit_event(&mut self, _me: ListenerId, event: &HitEvent, field: &mut Battlefield) {
        field.retire_shot(event.hitter);
        field.tally.adjust(self.counter, -1);
    }
}

/// Scores enemy hits by the player
#[derive(Default)]
pub struct ScoreTracker;

impl HitListener<Battlefield> for ScoreTracker {
    fn hit_event(&mut self, _me: ListenerId, event: &HitEvent, field: &mut Battlefield) {
        if matches!(event.target, Struck::Block { enemy: true, .. }) && upward(event) {
            field.tally.adjust(TallyKey::Score, ENEMY_SCORE);
        }
    }
}

/// Drops shot-down enemies from the formation
#[derive(Default)]
pub struct FormationTracker;

impl HitListener<Battlefield> for FormationTracker {
    fn hit_event(&mut self, _me: ListenerId, event: &HitEvent, field: &mut Battlefield) {
        if matches!(event.target, Struck::Block { hit_points: 0, .. }) && upward(event) {
            field.formation.remove_member(event.struck);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Skin;
    use crate::sim::battlefield::Tally;
    use crate::sim::collision::{BallId, Collidable, ColliderId, Obstacle};
    use crate::sim::events::HitEventBus;
    use crate::sim::formation::Formation;
    use crate::sim::geometry::{Aabb, Point};
    use crate::sim::velocity::Velocity;

    struct Fixture {
        field: Battlefield,
        bus: HitEventBus<Battlefield>,
        enemy: ColliderId,
    }

    fn fixture() -> Fixture {
        let mut field = Battlefield::new(
            Formation::new(65.0, 0),
            Tally {
                blocks_remaining: 1,
                paddle_hits: 1,
                balls: 3,
                ..Default::default()
            },
        );
        let mut bus = HitEventBus::new();
        let enemy = field
            .obstacles
            .add(Obstacle::enemy(Aabb::from_xywh(100.0, 100.0, 40.0, 30.0), 1, Skin::default()));
        field.formation.add_member(enemy, &field.obstacles);

        let ids = [
            bus.register(Box::new(BlockRemover::new(TallyKey::BlocksRemaining))),
            bus.register(Box::new(BallRemover::new(TallyKey::Balls))),
            bus.register(Box::new(ScoreTracker)),
            bus.register(Box::new(FormationTracker)),
        ];
        for id in ids {
            field.listen(enemy, id);
        }
        Fixture { field, bus, enemy }
    }

    fn strike(fx: &mut Fixture, dy: f64) {
        let point = Point::new(120.0, 130.0);
        let velocity = Velocity::new(0.0, dy);
        let Some(block) = fx.field.obstacles.get_mut(fx.enemy) else {
            return;
        };
        let response = block.hit(BallId(9), point, velocity, 0.1);
        let event = HitEvent {
            struck: fx.enemy,
            target: response.target,
            hitter: BallId(9),
            hitter_velocity: velocity,
            point,
        };
        fx.bus.notify(&event, &mut fx.field);
    }

    #[test]
    fn test_player_shot_destroys_enemy() {
        let mut fx = fixture();
        strike(&mut fx, -350.0);

        let field = &fx.field;
        assert!(!field.obstacles.contains(fx.enemy));
        assert_eq!(field.tally.blocks_remaining, 0);
        assert_eq!(field.tally.score, ENEMY_SCORE);
        assert_eq!(field.tally.balls, 2);
        assert_eq!(field.spent_shots, vec![BallId(9)]);
        assert!(field.formation.is_empty());
    }

    #[test]
    fn test_downward_shot_spares_enemy() {
        let mut fx = fixture();
        strike(&mut fx, 300.0);

        let field = &fx.field;
        assert!(field.obstacles.contains(fx.enemy));
        assert_eq!(field.obstacles.get(fx.enemy).unwrap().hit_points(), Some(0));
        assert_eq!(field.tally.blocks_remaining, 1);
        assert_eq!(field.tally.score, 0);
        // The shot is still consumed
        assert_eq!(field.spent_shots, vec![BallId(9)]);
        assert_eq!(field.formation.members().len(), 1);
    }

    #[test]
    fn test_non_enemy_block_removed_either_direction() {
        let mut field = Battlefield::new(Formation::new(65.0, 0), Tally::default());
        let mut bus = HitEventBus::new();
        let shield = field
            .obstacles
            .add(Obstacle::block(Aabb::from_xywh(0.0, 500.0, 5.0, 5.0), 1, Skin::default()));
        let remover = bus.register(Box::new(BlockRemover::new(TallyKey::Discarded)));
        let scorer = bus.register(Box::new(ScoreTracker));
        field.listen(shield, remover);
        field.listen(shield, scorer);

        let point = Point::new(2.0, 500.0);
        let velocity = Velocity::new(0.0, 300.0);
        let response = field
            .obstacles
            .get_mut(shield)
            .unwrap()
            .hit(BallId(1), point, velocity, 0.1);
        let event = HitEvent {
            struck: shield,
            target: response.target,
            hitter: BallId(1),
            hitter_velocity: velocity,
            point,
        };
        bus.notify(&event, &mut field);

        assert!(!field.obstacles.contains(shield));
        assert_eq!(field.tally.discarded, -1);
        assert_eq!(field.tally.score, 0);
    }
}
