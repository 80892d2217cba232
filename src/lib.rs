//! Plunder - simulation core for a pirate roguelite and a heist-defense game
//!
//! Procedural level generation, grid pathfinding, agent state machines,
//! visibility and combat resolution, driven by deterministic step functions.

pub mod ai;
pub mod combat;
pub mod core;
pub mod generation;
pub mod navigation;
pub mod player;
pub mod simulation;
pub mod spatial;
pub mod visibility;
pub mod world;
