pub mod heatmap;
pub mod input;
