pub mod cards;
pub mod eras;
pub mod sets;
pub mod system;
pub mod tcg;
