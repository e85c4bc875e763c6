pub mod collision;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod ghosts;
pub mod graph;
pub mod modes;
pub mod movement;
pub mod pause;
pub mod pursuit;
pub mod rng;
pub mod types;
pub mod world;
