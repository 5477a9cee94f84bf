pub mod error;
pub mod history;
pub mod progression;
pub mod sets;
