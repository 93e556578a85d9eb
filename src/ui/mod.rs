/// Terminal frontend.
pub mod input;
pub mod renderer;
pub mod sound;
