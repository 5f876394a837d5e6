pub mod color;
pub mod config;
pub mod data;
pub mod feed;
pub mod grid;
pub mod legend;
pub mod logging;
pub mod render;
pub mod scale;
