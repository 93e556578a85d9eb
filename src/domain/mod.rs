/// Domain layer: addresses, constructs, frames and the action handlers.
/// Nothing here reads the clock, the terminal or the filesystem.
pub mod action;
pub mod anim;
pub mod collision;
pub mod construct;
pub mod door;
pub mod effect;
pub mod floor;
pub mod frame;
pub mod level;
pub mod loose_floor;
pub mod pos;
pub mod pressure;
pub mod survey;

#[cfg(test)]
pub mod testing;
