pub mod data;
pub mod engine;
pub mod selection;
