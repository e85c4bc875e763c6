use crate::config::RulesConfig;
use crate::constants::fruit_points;
use crate::movement::{DirectionPolicy, Mover};
use crate::types::{Direction, EntityKind, FruitView};
use crate::world::LevelWorld;

/// Bonus item parked halfway right of the level's fruit node. It never moves;
/// it only ages until eaten or expired.
#[derive(Clone, Debug)]
pub struct Fruit {
    pub mover: Mover,
    pub points: u32,
    age_secs: f32,
    lifespan_secs: f32,
}

impl Fruit {
    pub fn new(world: &LevelWorld, rules: &RulesConfig) -> Self {
        let mut mover = Mover::new(
            EntityKind::Fruit,
            world.fruit_start,
            DirectionPolicy::Random,
            &world.graph,
            &world.geometry,
        );
        mover.collide_radius = rules.collide_radius;
        mover.set_between_nodes(Direction::Right, &world.graph);
        Self {
            mover,
            points: fruit_points(world.level),
            age_secs: 0.0,
            lifespan_secs: rules.fruit_lifespan_secs,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.age_secs += dt;
    }

    pub fn is_expired(&self) -> bool {
        self.age_secs >= self.lifespan_secs
    }

    pub fn view(&self) -> FruitView {
        FruitView {
            x: self.mover.position.x,
            y: self.mover.position.y,
            points: self.points,
            age_secs: self.age_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileGeometry;

    #[test]
    fn fruit_sits_right_of_its_node_and_expires() {
        let geometry = TileGeometry::new(16.0, 16.0).expect("valid geometry");
        let world = LevelWorld::load(2, geometry).expect("level loads");
        let rules = RulesConfig::default();
        let mut fruit = Fruit::new(&world, &rules);

        let node = world.graph.position(world.fruit_start);
        assert_eq!(fruit.mover.position.y, node.y);
        assert!(fruit.mover.position.x > node.x);
        assert_eq!(fruit.points, 140);

        fruit.update(9.5);
        assert!(!fruit.is_expired());
        fruit.update(0.5);
        assert!(fruit.is_expired());
    }
}
