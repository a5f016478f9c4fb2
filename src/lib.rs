pub mod cli;
pub mod commands;
pub mod sibship;
pub mod utils;
