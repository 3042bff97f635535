// Promptraits - portrait-prompt processor
// Library exports

pub mod config;
pub mod error;
pub mod knowledge;
pub mod prompt;
pub mod providers;
pub mod server;

pub use error::ProcessorError;
