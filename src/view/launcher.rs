use console::style;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to open browser: {0}")]
    BrowserError(#[from] std::io::Error),
}

/// Opens an order link. Fire and forget: nothing comes back from the
/// messaging service.
pub trait OrderLauncher {
    fn launch(&self, url: &str) -> Result<(), LaunchError>;
}

/// Opens the link in a new browser context.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLauncher;

impl OrderLauncher for BrowserLauncher {
    fn launch(&self, url: &str) -> Result<(), LaunchError> {
        info!("Opening order link in browser");
        webbrowser::open(url).map_err(|e| {
            error!("Failed to open browser: {}", e);
            LaunchError::BrowserError(e)
        })
    }
}

/// Prints the link instead of opening it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLauncher;

impl OrderLauncher for StdoutLauncher {
    fn launch(&self, url: &str) -> Result<(), LaunchError> {
        println!("{}", style(url).cyan().underlined());
        Ok(())
    }
}
