pub mod color;
pub mod legend;
pub mod map;
