use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;

#[derive(Parser)]
#[command(name = "storefront-cart")]
#[command(about = "Storefront shopping cart with checkout through a messaging link")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Product catalog file (JSON)
    #[arg(short, long, global = true)]
    pub catalog: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive cart session
    Shell {
        /// How the order link is opened
        #[arg(short, long, default_value = "browser")]
        launcher: LauncherKind,
    },
    /// List the products that can be added
    Catalog,
    /// Build a cart from product ids and send the order
    Order {
        /// Product id to add; repeat an id to add it again
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
        /// How the order link is opened
        #[arg(short, long, default_value = "browser")]
        launcher: LauncherKind,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LauncherKind {
    /// Open the link in the default browser
    Browser,
    /// Print the link to stdout
    Print,
}

impl fmt::Display for LauncherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LauncherKind::Browser => write!(f, "browser"),
            LauncherKind::Print => write!(f, "print"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_with_repeated_items() {
        let args = Args::try_parse_from([
            "storefront-cart",
            "order",
            "--item",
            "miel",
            "-i",
            "miel",
            "--launcher",
            "print",
        ])
        .unwrap();

        match args.command {
            Commands::Order { items, launcher } => {
                assert_eq!(items, vec!["miel", "miel"]);
                assert!(matches!(launcher, LauncherKind::Print));
            }
            _ => panic!("expected order command"),
        }
    }

    #[test]
    fn test_order_requires_items() {
        assert!(Args::try_parse_from(["storefront-cart", "order"]).is_err());
    }

    #[test]
    fn test_global_catalog_flag() {
        let args =
            Args::try_parse_from(["storefront-cart", "shell", "--catalog", "products.json"]).unwrap();
        assert_eq!(args.catalog.as_deref(), Some("products.json"));
        assert!(matches!(
            args.command,
            Commands::Shell {
                launcher: LauncherKind::Browser
            }
        ));
    }
}
