use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use console::{style, Emoji};
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use tracing::{error, info, warn};

use crate::{
    cli::{args::*, renderer::TerminalRenderer},
    models::product::Catalog,
    store::CartStore,
    utils::{
        formatting::{format_catalog_table, format_date, format_price},
        Config,
    },
    view::{
        cart_panel::{CartPanel, OrderOutcome, PanelPhase},
        launcher::{BrowserLauncher, OrderLauncher, StdoutLauncher},
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "");
static CART: Emoji<'_, '_> = Emoji("🛒 ", "");

#[derive(Clone, Copy)]
enum ShellAction {
    AddProduct,
    Increase,
    Decrease,
    Remove,
    Clear,
    TogglePanel,
    PlaceOrder,
    Quit,
}

impl ShellAction {
    const ALL: [ShellAction; 8] = [
        ShellAction::AddProduct,
        ShellAction::Increase,
        ShellAction::Decrease,
        ShellAction::Remove,
        ShellAction::Clear,
        ShellAction::TogglePanel,
        ShellAction::PlaceOrder,
        ShellAction::Quit,
    ];
}

impl fmt::Display for ShellAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellAction::AddProduct => write!(f, "Add product"),
            ShellAction::Increase => write!(f, "Increase quantity"),
            ShellAction::Decrease => write!(f, "Decrease quantity"),
            ShellAction::Remove => write!(f, "Remove product"),
            ShellAction::Clear => write!(f, "Clear cart"),
            ShellAction::TogglePanel => write!(f, "Open / close cart"),
            ShellAction::PlaceOrder => write!(f, "Place order"),
            ShellAction::Quit => write!(f, "Quit"),
        }
    }
}

fn launcher_for(kind: LauncherKind) -> Box<dyn OrderLauncher> {
    match kind {
        LauncherKind::Browser => Box::new(BrowserLauncher),
        LauncherKind::Print => Box::new(StdoutLauncher),
    }
}

pub struct CliApp {
    config: Config,
    catalog_path: Option<PathBuf>,
    store: Arc<CartStore>,
}

impl CliApp {
    /// The catalog is read by the commands that need it, so a bad catalog
    /// path does not stop `config show`.
    pub fn new(config: Config, catalog_path: Option<String>) -> Result<Self> {
        let catalog_path = catalog_path
            .map(PathBuf::from)
            .or_else(|| config.catalog_path.clone());

        Ok(Self {
            config,
            catalog_path,
            store: Arc::new(CartStore::new()),
        })
    }

    fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::from_file(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display())),
            None => {
                info!("No catalog configured, using the demo catalog");
                Ok(Catalog::demo())
            }
        }
    }

    pub async fn run(&self, args: Args) -> Result<()> {
        match args.command {
            Commands::Shell { launcher } => self.handle_shell(launcher).await,
            Commands::Catalog => self.handle_catalog(),
            Commands::Order { items, launcher } => self.handle_order(items, launcher),
            Commands::Config { command } => self.handle_config_command(command),
        }
    }

    fn new_panel(&self) -> Result<CartPanel> {
        Ok(CartPanel::new(
            self.store.clone(),
            Arc::new(TerminalRenderer),
            self.config.panel_settings()?,
        ))
    }

    fn handle_catalog(&self) -> Result<()> {
        let catalog = self.load_catalog()?;
        println!(
            "{} {}",
            INFO,
            style(format!("{} products available", catalog.len())).bold()
        );
        println!("{}", format_catalog_table(catalog.products()));
        Ok(())
    }

    fn handle_order(&self, items: Vec<String>, launcher: LauncherKind) -> Result<()> {
        let catalog = self.load_catalog()?;
        let panel = self.new_panel()?;

        for id in &items {
            match catalog.get(id) {
                Some(product) => self.store.add_item(product.display_info()),
                None => {
                    println!("{} Unknown product '{}'", CROSS, style(id).red());
                    warn!("Skipping unknown product id: {}", id);
                }
            }
        }

        panel.open();
        self.place_order(&panel, launcher_for(launcher).as_ref());

        Ok(())
    }

    async fn handle_shell(&self, launcher: LauncherKind) -> Result<()> {
        let catalog = self.load_catalog()?;
        let panel = self.new_panel()?;
        let launcher = launcher_for(launcher);
        let theme = ColorfulTheme::default();

        println!("{} {}", CART, style("Storefront cart").bold().cyan());

        loop {
            let choice = Select::with_theme(&theme)
                .with_prompt("What would you like to do?")
                .items(&ShellAction::ALL)
                .default(0)
                .interact()?;

            match ShellAction::ALL[choice] {
                ShellAction::AddProduct => self.handle_add_product(&catalog, &theme)?,
                ShellAction::Increase => {
                    if let Some(id) = self.select_line(&theme, "Increase which product?")? {
                        panel.increment(&id);
                    }
                }
                ShellAction::Decrease => {
                    if let Some(id) = self.select_line(&theme, "Decrease which product?")? {
                        panel.decrement(&id);
                    }
                }
                ShellAction::Remove => {
                    if let Some(id) = self.select_line(&theme, "Remove which product?")? {
                        panel.remove(&id);
                        println!("{} Product removed", CHECKMARK);
                    }
                }
                ShellAction::Clear => {
                    let confirm = Confirm::with_theme(&theme)
                        .with_prompt("Remove every product from the cart?")
                        .default(false)
                        .interact()?;
                    if confirm {
                        self.store.clear();
                        println!("{} Cart cleared", CHECKMARK);
                    }
                }
                ShellAction::TogglePanel => {
                    if panel.phase() == PanelPhase::Hidden {
                        panel.open();
                        info!("Cart panel opened");
                    } else {
                        panel.close().await;
                        println!("{} Cart closed", INFO);
                    }
                }
                ShellAction::PlaceOrder => self.place_order(&panel, launcher.as_ref()),
                ShellAction::Quit => break,
            }
        }

        info!("Shell session ended with {} items in cart", self.store.item_count());
        Ok(())
    }

    fn handle_add_product(&self, catalog: &Catalog, theme: &ColorfulTheme) -> Result<()> {
        let products: Vec<_> = catalog.products().collect();
        let labels: Vec<String> = products
            .iter()
            .map(|product| format!("{} ({})", product.name, format_price(&product.price)))
            .collect();

        let index = Select::with_theme(theme)
            .with_prompt("Which product?")
            .items(&labels)
            .default(0)
            .interact()?;

        let product = products[index];
        self.store.add_item(product.display_info());
        println!(
            "{} Added {} to the cart",
            CHECKMARK,
            style(&product.name).green()
        );
        Ok(())
    }

    /// Lets the user pick a cart line. `None` when the cart is empty.
    fn select_line(&self, theme: &ColorfulTheme, prompt: &str) -> Result<Option<String>> {
        let items = self.store.items();
        if items.is_empty() {
            println!("{} Your cart is empty", WARNING);
            return Ok(None);
        }

        let labels: Vec<String> = items
            .iter()
            .map(|item| format!("{} x{}", item.name, item.quantity))
            .collect();

        let index = Select::with_theme(theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact()?;

        Ok(Some(items[index].id.clone()))
    }

    fn place_order(&self, panel: &CartPanel, launcher: &dyn OrderLauncher) {
        match panel.place_order(launcher) {
            Ok(OrderOutcome::EmptyCart) => {
                println!("{} Add products before placing an order", WARNING);
            }
            Ok(OrderOutcome::Dispatched { message, .. }) => {
                println!("{} Order sent!", CHECKMARK);
                println!("Products: {}", style(message.total_items()).green());
                println!("Sent at: {}", style(format_date(&Utc::now())).yellow());
                info!("Order placed with {} products", message.total_items());
            }
            Err(e) => {
                println!("{} Failed to send order: {}", CROSS, style(&e).red());
                error!("Failed to send order: {}", e);
            }
        }
    }

    fn handle_config_command(&self, command: ConfigCommands) -> Result<()> {
        match command {
            ConfigCommands::Show => {
                println!("{} {}", INFO, style("Configuration").bold().cyan());
                println!("Environment: {}", style(&self.config.environment).green());
                println!("Messaging URL: {}", style(&self.config.messaging_url).green());
                println!("Order recipient: {}", style(&self.config.order_recipient).green());
                println!("Close delay: {} ms", style(self.config.close_delay_ms).green());
                println!(
                    "Catalog: {}",
                    style(
                        self.catalog_path
                            .as_ref()
                            .map(|path| path.display().to_string())
                            .unwrap_or_else(|| "built-in demo".to_string())
                    )
                    .green()
                );
                println!("Log level: {}", style(&self.config.log_level).green());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn missing_catalog_app() -> (tempfile::TempDir, CliApp) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            catalog_path: Some(dir.path().join("missing.json")),
            ..Config::default()
        };
        let app = CliApp::new(config, None).unwrap();
        (dir, app)
    }

    #[tokio::test]
    async fn test_config_show_ignores_bad_catalog() {
        let (_dir, app) = missing_catalog_app();
        let args = Args::try_parse_from(["storefront-cart", "config", "show"]).unwrap();

        assert!(app.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_command_reports_bad_catalog() {
        let (_dir, app) = missing_catalog_app();
        let args = Args::try_parse_from(["storefront-cart", "catalog"]).unwrap();

        let err = app.run(args).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load catalog"));
    }

    #[test]
    fn test_flag_overrides_configured_catalog() {
        let config = Config {
            catalog_path: Some(PathBuf::from("/configured.json")),
            ..Config::default()
        };
        let app = CliApp::new(config, Some("/flag.json".to_string())).unwrap();
        assert_eq!(app.catalog_path, Some(PathBuf::from("/flag.json")));
    }

    #[test]
    fn test_demo_catalog_without_path() {
        let app = CliApp::new(Config::default(), None).unwrap();
        assert_eq!(app.load_catalog().unwrap().len(), Catalog::demo().len());
    }
}
