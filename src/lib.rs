/// Tilekid: per-tick action simulation for a tile-addressed 2D action
/// game, plus the terminal frontend that drives it.
pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
