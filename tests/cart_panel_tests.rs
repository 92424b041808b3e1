use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront_cart::models::product::Catalog;
use storefront_cart::store::CartStore;
use storefront_cart::utils::Config;
use storefront_cart::view::{
    CartPanel, LaunchError, OrderLauncher, OrderOutcome, PanelFrame, PanelPhase, PanelRenderer,
};

#[derive(Default)]
struct FrameLog {
    frames: Mutex<Vec<PanelFrame>>,
}

impl PanelRenderer for FrameLog {
    fn render(&self, frame: &PanelFrame) {
        self.frames.lock().unwrap().push(frame.clone());
    }
}

#[derive(Default)]
struct LinkLog {
    urls: Mutex<Vec<String>>,
}

impl OrderLauncher for LinkLog {
    fn launch(&self, url: &str) -> Result<(), LaunchError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct FailingLauncher;

impl OrderLauncher for FailingLauncher {
    fn launch(&self, _url: &str) -> Result<(), LaunchError> {
        Err(LaunchError::BrowserError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no browser",
        )))
    }
}

fn setup(config: &Config) -> (Arc<CartStore>, CartPanel, Arc<FrameLog>) {
    let store = Arc::new(CartStore::new());
    let frames = Arc::new(FrameLog::default());
    let panel = CartPanel::new(
        store.clone(),
        frames.clone(),
        config.panel_settings().unwrap(),
    );
    (store, panel, frames)
}

fn catalog_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": "cafe", "name": "Café molido", "imageSrc": "/p/Cafe Molido.svg", "price": "185.00"}},
            {{"id": "pan", "name": "Pan dulce", "imageSrc": "/p/pan.svg", "price": 18.5}}
        ]"#
    )
    .unwrap();
    file
}

#[test]
fn test_order_from_catalog_file() {
    let file = catalog_file();
    let catalog = Catalog::from_file(file.path()).unwrap();
    let config = Config {
        order_recipient: "5215550001111".to_string(),
        ..Config::default()
    };
    let (store, panel, _frames) = setup(&config);

    store.add_item(catalog.get("cafe").unwrap().display_info());
    store.add_item(catalog.get("pan").unwrap().display_info());
    store.add_item(catalog.get("cafe").unwrap().display_info());

    let launcher = LinkLog::default();
    let outcome = panel.place_order(&launcher).unwrap();

    let OrderOutcome::Dispatched { url, message } = outcome else {
        panic!("expected the order to be dispatched");
    };
    assert!(url.starts_with("https://wa.me/5215550001111?text="));
    assert!(url.contains("1.%20Caf%C3%A9%20molido%20x2"));
    assert!(message.text().ends_with("Total de productos: 3"));
    assert_eq!(launcher.urls.lock().unwrap().len(), 1);
}

#[test]
fn test_custom_messaging_url() {
    let config = Config {
        messaging_url: "https://api.whatsapp.com/send/".to_string(),
        ..Config::default()
    };
    let (store, panel, _frames) = setup(&config);
    store.add_item(Catalog::demo().get("miel").unwrap().display_info());

    let message = panel.order_message().unwrap();
    let target = config.messaging_target().unwrap();
    assert!(message
        .link(&target)
        .starts_with("https://api.whatsapp.com/send/5214421234567?text="));
}

#[test]
fn test_empty_cart_never_launches() {
    let (_store, panel, _frames) = setup(&Config::default());
    let launcher = LinkLog::default();

    assert!(matches!(
        panel.place_order(&launcher).unwrap(),
        OrderOutcome::EmptyCart
    ));
    assert!(launcher.urls.lock().unwrap().is_empty());
}

#[test]
fn test_launch_failure_keeps_cart() {
    let (store, panel, _frames) = setup(&Config::default());
    store.add_item(Catalog::demo().get("miel").unwrap().display_info());

    let result = panel.place_order(&FailingLauncher);
    assert!(matches!(result, Err(LaunchError::BrowserError(_))));
    assert_eq!(store.item_count(), 1);
}

#[test]
fn test_frames_follow_store() {
    let (store, panel, frames) = setup(&Config::default());
    let catalog = Catalog::demo();

    store.set_open(true);
    store.add_item(catalog.get("miel").unwrap().display_info());
    panel.increment("miel");
    panel.decrement("miel");
    panel.remove("miel");

    let frames = frames.frames.lock().unwrap();
    let counts: Vec<u64> = frames.iter().map(|frame| frame.total_items).collect();
    assert_eq!(counts, vec![0, 0, 1, 2, 1, 0]);
    assert!(frames.last().unwrap().is_empty());
    assert_eq!(frames.last().unwrap().phase, PanelPhase::Open);
}

#[test]
fn test_dropping_panel_unsubscribes() {
    let (store, panel, _frames) = setup(&Config::default());
    assert_eq!(store.listener_count(), 1);

    drop(panel);
    assert_eq!(store.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_uses_configured_delay() {
    let config = Config {
        close_delay_ms: 1_000,
        ..Config::default()
    };
    let (store, panel, frames) = setup(&config);
    panel.open();

    let started = tokio::time::Instant::now();
    assert!(panel.close().await);

    assert!(started.elapsed() >= Duration::from_millis(1_000));
    assert!(!store.is_open());

    let phases: Vec<PanelPhase> = frames
        .frames
        .lock()
        .unwrap()
        .iter()
        .map(|frame| frame.phase)
        .collect();
    assert_eq!(
        phases,
        vec![
            PanelPhase::Hidden,
            PanelPhase::Open,
            PanelPhase::Closing,
            PanelPhase::Hidden
        ]
    );
}
