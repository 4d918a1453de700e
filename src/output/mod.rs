pub mod export;
pub mod terminal;
