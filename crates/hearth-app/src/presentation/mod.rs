pub mod bootstrap;
pub mod engine;
pub mod error;
pub mod state;
