pub mod cards;

pub use cards::{Card, CardColors, PageIndicator, render_card};
