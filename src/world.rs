use glam::Vec2;
use tracing::debug;

use crate::collision::{collides, Collider};
use crate::constants::{
    PELLET_COLLIDE_RADIUS, PELLET_POINTS, POWER_PELLET_POINTS, REFERENCE_TILE_WIDTH,
};
use crate::error::{CoreError, CoreResult};
use crate::geometry::TileGeometry;
use crate::graph::{NavGraph, NodeId};
use crate::types::{Direction, EntityKind, Species};

const NODE_SYMBOLS: [char; 3] = ['+', 'P', 'n'];
const PATH_SYMBOLS: [char; 4] = ['.', '-', '|', 'p'];
const PELLET_SYMBOLS: [char; 2] = ['.', '+'];
const POWER_PELLET_SYMBOLS: [char; 2] = ['P', 'p'];

const HOME_PEN: &str = "XX+XX
XX.XX
+X.X+
+.+.+
+XXX+";

type Tile = (f32, f32);

#[derive(Debug)]
pub struct MazeLayout {
    pub name: &'static str,
    pub text: &'static str,
    pub portal_pairs: &'static [(Tile, Tile)],
    pub home_offset: Tile,
    pub home_connect_left: Tile,
    pub home_connect_right: Tile,
    pub pacman_start: Tile,
    pub fruit_start: Tile,
    pub ghost_deny: &'static [(Direction, Tile)],
}

pub const MAZE1: MazeLayout = MazeLayout {
    name: "maze1",
    text: include_str!("../levels/maze1.txt"),
    portal_pairs: &[((0.0, 17.0), (27.0, 17.0))],
    home_offset: (11.5, 14.0),
    home_connect_left: (12.0, 14.0),
    home_connect_right: (15.0, 14.0),
    pacman_start: (15.0, 26.0),
    fruit_start: (9.0, 20.0),
    ghost_deny: &[
        (Direction::Up, (12.0, 14.0)),
        (Direction::Up, (15.0, 14.0)),
        (Direction::Up, (12.0, 26.0)),
        (Direction::Up, (15.0, 26.0)),
    ],
};

pub const LAYOUTS: &[MazeLayout] = &[MAZE1];

pub fn layout_for_level(level: u32) -> &'static MazeLayout {
    &LAYOUTS[level as usize % LAYOUTS.len()]
}

pub type Grid = Vec<Vec<char>>;

// Whitespace inside a line is ignored.
pub fn parse_grid(text: &str) -> CoreResult<Grid> {
    let grid: Grid = text
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();
    let Some(width) = grid.first().map(Vec::len) else {
        return Err(CoreError::MazeParse {
            row: 0,
            reason: "level text is empty".to_string(),
        });
    };
    if let Some(row) = grid.iter().position(|cells| cells.len() != width) {
        return Err(CoreError::MazeParse {
            row,
            reason: format!("expected {} cells, found {}", width, grid[row].len()),
        });
    }
    Ok(grid)
}

fn add_grid_nodes(graph: &mut NavGraph, grid: &Grid, offset: Tile, geometry: &TileGeometry) {
    for (row, cells) in grid.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if NODE_SYMBOLS.contains(cell) {
                graph.add_node(geometry.tile_to_pixel(col as f32 + offset.0, row as f32 + offset.1));
            }
        }
    }
}

fn connect_runs<I>(graph: &mut NavGraph, cells: I, direction: Direction)
where
    I: Iterator<Item = (char, Vec2)>,
{
    let mut previous: Option<NodeId> = None;
    for (cell, position) in cells {
        if NODE_SYMBOLS.contains(&cell) {
            let Some(current) = graph.node_at(position) else {
                previous = None;
                continue;
            };
            if let Some(previous) = previous {
                graph.link(previous, direction, current);
            }
            previous = Some(current);
        } else if !PATH_SYMBOLS.contains(&cell) {
            previous = None;
        }
    }
}

fn connect_grid(graph: &mut NavGraph, grid: &Grid, offset: Tile, geometry: &TileGeometry) {
    let width = grid.first().map(Vec::len).unwrap_or(0);
    let at = |col: usize, row: usize| {
        geometry.tile_to_pixel(col as f32 + offset.0, row as f32 + offset.1)
    };
    for (row, cells) in grid.iter().enumerate() {
        let run = cells.iter().enumerate().map(|(col, cell)| (*cell, at(col, row)));
        connect_runs(graph, run, Direction::Right);
    }
    for col in 0..width {
        let run = grid
            .iter()
            .enumerate()
            .map(|(row, cells)| (cells[col], at(col, row)));
        connect_runs(graph, run, Direction::Down);
    }
}

pub fn build_graph(grid: &Grid, geometry: &TileGeometry) -> NavGraph {
    let mut graph = NavGraph::new();
    add_grid_nodes(&mut graph, grid, (0.0, 0.0), geometry);
    connect_grid(&mut graph, grid, (0.0, 0.0), geometry);
    graph
}

fn node_at_tile(graph: &NavGraph, geometry: &TileGeometry, tile: Tile) -> CoreResult<NodeId> {
    graph
        .node_at(geometry.tile_to_pixel(tile.0, tile.1))
        .ok_or(CoreError::MissingNode {
            col: tile.0,
            row: tile.1,
        })
}

fn add_home_pen(
    graph: &mut NavGraph,
    geometry: &TileGeometry,
    offset: Tile,
) -> CoreResult<NodeId> {
    let pen = parse_grid(HOME_PEN)?;
    add_grid_nodes(graph, &pen, offset, geometry);
    connect_grid(graph, &pen, offset, geometry);
    node_at_tile(graph, geometry, (offset.0 + 2.0, offset.1))
}

#[derive(Clone, Debug)]
pub struct Pellet {
    pub position: Vec2,
    pub power: bool,
    pub points: u32,
    pub radius: f32,
}

impl Collider for Pellet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn collide_radius(&self) -> f32 {
        self.radius
    }
}

#[derive(Clone, Debug, Default)]
pub struct PelletGroup {
    pellets: Vec<Pellet>,
    eaten: u32,
}

impl PelletGroup {
    pub fn from_grid(grid: &Grid, geometry: &TileGeometry) -> Self {
        let radius = PELLET_COLLIDE_RADIUS * geometry.width() / REFERENCE_TILE_WIDTH;
        let mut pellets = Vec::new();
        for (row, cells) in grid.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let power = POWER_PELLET_SYMBOLS.contains(cell);
                if !power && !PELLET_SYMBOLS.contains(cell) {
                    continue;
                }
                pellets.push(Pellet {
                    position: geometry.tile_to_pixel(col as f32, row as f32),
                    power,
                    points: if power {
                        POWER_PELLET_POINTS
                    } else {
                        PELLET_POINTS
                    },
                    radius,
                });
            }
        }
        Self { pellets, eaten: 0 }
    }

    pub fn len(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty()
    }

    pub fn eaten(&self) -> u32 {
        self.eaten
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pellet> {
        self.pellets.iter()
    }

    pub fn eat_touching<C: Collider + ?Sized>(&mut self, eater: &C) -> Option<Pellet> {
        let index = self.pellets.iter().position(|pellet| collides(eater, pellet))?;
        self.eaten += 1;
        Some(self.pellets.remove(index))
    }
}

pub fn pen_exit(species: Species) -> Option<Direction> {
    match species {
        Species::Flank => Some(Direction::Right),
        Species::Shy => Some(Direction::Left),
        Species::Direct | Species::Ambush => None,
    }
}

#[derive(Clone, Debug)]
pub struct LevelWorld {
    pub level: u32,
    pub layout: &'static MazeLayout,
    pub geometry: TileGeometry,
    pub graph: NavGraph,
    pub pellets: PelletGroup,
    pub home_key: NodeId,
    pub spawn_node: NodeId,
    pub pacman_start: NodeId,
    pub fruit_start: NodeId,
    ghost_starts: [NodeId; 4],
}

impl LevelWorld {
    pub fn load(level: u32, geometry: TileGeometry) -> CoreResult<Self> {
        let layout = layout_for_level(level);
        let grid = parse_grid(layout.text)?;
        let mut graph = build_graph(&grid, &geometry);
        for (a, b) in layout.portal_pairs {
            let a = node_at_tile(&graph, &geometry, *a)?;
            let b = node_at_tile(&graph, &geometry, *b)?;
            graph.link_portals(a, b);
        }

        let (ox, oy) = layout.home_offset;
        let home_key = add_home_pen(&mut graph, &geometry, layout.home_offset)?;
        let left = node_at_tile(&graph, &geometry, layout.home_connect_left)?;
        let right = node_at_tile(&graph, &geometry, layout.home_connect_right)?;
        graph.link(home_key, Direction::Left, left);
        graph.link(home_key, Direction::Right, right);

        let spawn_node = node_at_tile(&graph, &geometry, (ox + 2.0, oy + 3.0))?;
        let ghost_starts = [
            home_key,
            spawn_node,
            node_at_tile(&graph, &geometry, (ox, oy + 3.0))?,
            node_at_tile(&graph, &geometry, (ox + 4.0, oy + 3.0))?,
        ];
        let pacman_start = node_at_tile(&graph, &geometry, layout.pacman_start)?;
        let fruit_start = node_at_tile(&graph, &geometry, layout.fruit_start)?;
        for (direction, tile) in layout.ghost_deny {
            let node = node_at_tile(&graph, &geometry, *tile)?;
            for species in Species::ALL {
                graph.deny_access(node, *direction, EntityKind::Ghost(species));
            }
        }

        let mut world = Self {
            level,
            layout,
            geometry,
            graph,
            pellets: PelletGroup::from_grid(&grid, &geometry),
            home_key,
            spawn_node,
            pacman_start,
            fruit_start,
            ghost_starts,
        };
        world.pen_ghosts();
        debug!(
            level,
            maze = layout.name,
            nodes = world.graph.len(),
            pellets = world.pellets.len(),
            "level world loaded"
        );
        Ok(world)
    }

    fn pen_ghosts(&mut self) {
        self.deny_home(EntityKind::Pacman);
        for species in Species::ALL {
            let kind = EntityKind::Ghost(species);
            self.deny_home(kind);
            self.graph.deny_access(self.spawn_node, Direction::Left, kind);
            self.graph.deny_access(self.spawn_node, Direction::Right, kind);
            if let Some(exit) = pen_exit(species) {
                self.graph.deny_access(self.ghost_start(species), exit, kind);
            }
        }
    }

    pub fn ghost_start(&self, species: Species) -> NodeId {
        match species {
            Species::Direct => self.ghost_starts[0],
            Species::Ambush => self.ghost_starts[1],
            Species::Flank => self.ghost_starts[2],
            Species::Shy => self.ghost_starts[3],
        }
    }

    pub fn deny_home(&mut self, kind: EntityKind) {
        self.graph.deny_access(self.home_key, Direction::Down, kind);
    }

    pub fn allow_home(&mut self, kind: EntityKind) {
        self.graph.allow_access(self.home_key, Direction::Down, kind);
    }

    pub fn release_ghost(&mut self, species: Species) -> bool {
        let Some(exit) = pen_exit(species) else {
            return false;
        };
        let start = self.ghost_start(species);
        self.graph.allow_access(start, exit, EntityKind::Ghost(species));
        true
    }

    pub fn tile_of(&self, node: NodeId) -> Vec2 {
        self.geometry.pixel_to_tile(self.graph.position(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{DirectionPolicy, Mover};

    fn geometry() -> TileGeometry {
        TileGeometry::new(16.0, 16.0).expect("valid geometry")
    }

    fn tile(world: &LevelWorld, col: f32, row: f32) -> NodeId {
        world
            .graph
            .node_at(world.geometry.tile_to_pixel(col, row))
            .expect("node at tile")
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let err = parse_grid("+..+\n+.+\n").expect_err("ragged");
        assert!(matches!(err, CoreError::MazeParse { row: 1, .. }));
        assert!(parse_grid("\n\n").is_err());
    }

    #[test]
    fn runs_link_only_across_path_cells() {
        let grid = parse_grid(
            "+.+X+
             |XXX.
             +-+.+",
        )
        .expect("valid grid");
        let graph = build_graph(&grid, &geometry());
        let at = |col: f32, row: f32| graph.node_at(Vec2::new(col * 16.0, row * 16.0)).expect("node");

        assert_eq!(graph.neighbor(at(0.0, 0.0), Direction::Right), Some(at(2.0, 0.0)));
        assert_eq!(graph.neighbor(at(2.0, 0.0), Direction::Right), None);
        assert_eq!(graph.neighbor(at(0.0, 0.0), Direction::Down), Some(at(0.0, 2.0)));
        assert_eq!(graph.neighbor(at(4.0, 0.0), Direction::Down), Some(at(4.0, 2.0)));
        assert_eq!(graph.neighbor(at(2.0, 2.0), Direction::Right), Some(at(4.0, 2.0)));
        assert_eq!(graph.neighbor(at(2.0, 0.0), Direction::Down), None);
    }

    #[test]
    fn pellets_follow_level_symbols() {
        let grid = parse_grid("+.P\nXnp").expect("valid grid");
        let pellets = PelletGroup::from_grid(&grid, &geometry());
        assert_eq!(pellets.len(), 4);
        assert_eq!(pellets.iter().filter(|pellet| pellet.power).count(), 2);
        assert_eq!(pellets.iter().map(|pellet| pellet.points).sum::<u32>(), 120);
    }

    #[test]
    fn classic_level_loads_with_pen_and_portals() {
        let world = LevelWorld::load(0, geometry()).expect("level loads");
        assert_eq!(world.pellets.len(), 244);

        let west = tile(&world, 0.0, 17.0);
        let east = tile(&world, 27.0, 17.0);
        assert_eq!(world.graph.portal(west), Some(east));
        assert_eq!(world.graph.portal(east), Some(west));

        assert_eq!(world.graph.position(world.home_key), Vec2::new(216.0, 224.0));
        assert_eq!(
            world.graph.neighbor(world.home_key, Direction::Left),
            Some(tile(&world, 12.0, 14.0))
        );
        assert_eq!(
            world.graph.neighbor(tile(&world, 15.0, 14.0), Direction::Left),
            Some(world.home_key)
        );
        assert_eq!(
            world.graph.neighbor(world.home_key, Direction::Down),
            Some(world.spawn_node)
        );
        assert_eq!(world.tile_of(world.pacman_start), Vec2::new(15.0, 26.0));
        assert_eq!(world.tile_of(world.fruit_start), Vec2::new(9.0, 20.0));
    }

    #[test]
    fn pen_access_starts_closed() {
        let world = LevelWorld::load(0, geometry()).expect("level loads");
        let graph = &world.graph;
        assert!(!graph.is_valid(world.home_key, Direction::Down, EntityKind::Pacman));
        for species in Species::ALL {
            let kind = EntityKind::Ghost(species);
            assert!(!graph.is_valid(world.home_key, Direction::Down, kind));
            assert!(!graph.is_valid(world.spawn_node, Direction::Left, kind));
            assert!(graph.is_valid(world.spawn_node, Direction::Up, kind));
            assert!(!graph.is_valid(tile(&world, 12.0, 26.0), Direction::Up, kind));
        }
        assert!(graph.is_valid(tile(&world, 12.0, 26.0), Direction::Up, EntityKind::Pacman));
        let flank = EntityKind::Ghost(Species::Flank);
        let shy = EntityKind::Ghost(Species::Shy);
        assert!(!graph.is_valid(world.ghost_start(Species::Flank), Direction::Right, flank));
        assert!(!graph.is_valid(world.ghost_start(Species::Shy), Direction::Left, shy));
    }

    #[test]
    fn release_opens_only_that_ghosts_exit() {
        let mut world = LevelWorld::load(0, geometry()).expect("level loads");
        assert!(world.release_ghost(Species::Flank));
        assert!(!world.release_ghost(Species::Direct));
        let start = world.ghost_start(Species::Flank);
        assert!(world
            .graph
            .is_valid(start, Direction::Right, EntityKind::Ghost(Species::Flank)));
        let shy_start = world.ghost_start(Species::Shy);
        assert!(!world
            .graph
            .is_valid(shy_start, Direction::Left, EntityKind::Ghost(Species::Shy)));
    }

    #[test]
    fn pellet_eating_counts_and_removes() {
        let grid = parse_grid("+.+").expect("valid grid");
        let mut pellets = PelletGroup::from_grid(&grid, &geometry());
        let graph = build_graph(&grid, &geometry());
        let start = graph.node_at(Vec2::ZERO).expect("node at origin");
        let mover = Mover::new(
            EntityKind::Pacman,
            start,
            DirectionPolicy::PlayerInput,
            &graph,
            &geometry(),
        );
        let eaten = pellets.eat_touching(&mover).expect("pellet under the player");
        assert_eq!(eaten.position, Vec2::ZERO);
        assert_eq!(pellets.eaten(), 1);
        assert_eq!(pellets.len(), 2);
    }

    #[test]
    fn pellet_radius_scales_with_tile_width() {
        let grid = parse_grid("+.+").expect("valid grid");
        let small = PelletGroup::from_grid(&grid, &geometry());
        let large = PelletGroup::from_grid(
            &grid,
            &TileGeometry::new(32.0, 32.0).expect("valid geometry"),
        );
        let radius = |group: &PelletGroup| group.iter().map(|pellet| pellet.radius).next();
        assert_eq!(radius(&small), Some(2.0));
        assert_eq!(radius(&large), Some(4.0));
    }
}
