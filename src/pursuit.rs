use glam::Vec2;

use crate::config::RulesConfig;
use crate::geometry::TileGeometry;
use crate::types::{Direction, GhostMode, Species};

/// What a ghost may look at when picking its chase goal.
#[derive(Clone, Copy, Debug)]
pub struct PursuitContext {
    pub player_position: Vec2,
    pub player_direction: Direction,
    pub lead_position: Option<Vec2>,
}

pub fn scatter_goal(species: Species, geometry: &TileGeometry) -> Vec2 {
    let board = geometry.board_size();
    match species {
        Species::Direct => Vec2::ZERO,
        Species::Ambush => Vec2::new(board.x, 0.0),
        Species::Flank => board,
        Species::Shy => Vec2::new(0.0, board.y),
    }
}

pub fn chase_goal(
    species: Species,
    own_position: Vec2,
    ctx: &PursuitContext,
    geometry: &TileGeometry,
    rules: &RulesConfig,
) -> Vec2 {
    match species {
        Species::Direct => ctx.player_position,
        Species::Ambush => ahead_of_player(ctx, rules.ambush_lookahead_tiles, geometry),
        Species::Flank => {
            let ahead = ahead_of_player(ctx, rules.flank_lookahead_tiles, geometry);
            match ctx.lead_position {
                Some(lead) => lead + (ahead - lead) * 2.0,
                None => ahead,
            }
        }
        Species::Shy => {
            let radius = geometry.width() * rules.shy_radius_tiles;
            let distance = (ctx.player_position - own_position).length_squared();
            if distance <= radius * radius {
                scatter_goal(species, geometry)
            } else {
                ahead_of_player(ctx, rules.ambush_lookahead_tiles, geometry)
            }
        }
    }
}

/// Goal for the ghost's current mode, or `None` when the mode keeps whatever
/// goal it already has (freight wanders, spawn heads home).
pub fn goal_for_mode(
    species: Species,
    mode: GhostMode,
    own_position: Vec2,
    ctx: &PursuitContext,
    geometry: &TileGeometry,
    rules: &RulesConfig,
) -> Option<Vec2> {
    match mode {
        GhostMode::Scatter => Some(scatter_goal(species, geometry)),
        GhostMode::Chase => Some(chase_goal(species, own_position, ctx, geometry, rules)),
        GhostMode::Freight | GhostMode::Spawn => None,
    }
}

fn ahead_of_player(ctx: &PursuitContext, tiles: f32, geometry: &TileGeometry) -> Vec2 {
    ctx.player_position + ctx.player_direction.unit_vector() * geometry.width() * tiles
}
