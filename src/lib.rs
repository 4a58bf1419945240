pub mod board;
pub mod game;
pub mod input;
pub mod piece;
