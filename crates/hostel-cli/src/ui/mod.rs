//! TUI rendering components.

mod render;

pub use render::draw;
