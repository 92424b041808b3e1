pub mod args;
pub mod commands;
pub mod renderer;

pub use args::Args;
pub use commands::CliApp;
