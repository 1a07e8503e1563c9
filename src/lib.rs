pub mod clock;
pub mod collision;
pub mod config;
pub mod game;
pub mod grid;
pub mod piece;
