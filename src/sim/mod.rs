/// Simulation layer: level loading, world state and the tick.
pub mod event;
pub mod level;
pub mod step;
pub mod world;
