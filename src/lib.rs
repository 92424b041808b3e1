pub mod models;
pub mod store;
pub mod view;
pub mod cli;
pub mod utils;

pub use anyhow::{Error, Result};
