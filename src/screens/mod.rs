pub mod race;
pub mod select;
