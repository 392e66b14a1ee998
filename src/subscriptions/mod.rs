pub mod images;
pub mod input;
pub mod ticks;
