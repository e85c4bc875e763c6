use glam::Vec2;

use crate::movement::Mover;

pub trait Collider {
    fn position(&self) -> Vec2;
    fn collide_radius(&self) -> f32;
}

impl Collider for Mover {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn collide_radius(&self) -> f32 {
        self.collide_radius
    }
}

/// Circle overlap on squared distances; touching counts as contact.
pub fn collides<A: Collider + ?Sized, B: Collider + ?Sized>(a: &A, b: &B) -> bool {
    let distance = (a.position() - b.position()).length_squared();
    let reach = a.collide_radius() + b.collide_radius();
    distance <= reach * reach
}
