use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use folio::config::EngineConfig;
use folio::demo::{self, DemoApp, StackStore};
use folio::terminal::{install_panic_hook, TerminalSession};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("folio {}", VERSION);
        return Ok(());
    }
    let fresh = std::env::args().any(|arg| arg == "--fresh");

    color_eyre::install()?;

    let store = StackStore::at_default_location()?;
    if let Some(dir) = store.dir() {
        init_logging(dir)?;
    }
    tracing::info!(version = VERSION, path = %store.path().display(), fresh, "starting");

    install_panic_hook();

    let mut app = DemoApp::new(EngineConfig::from_env(), store);
    app.launch(fresh)?;

    let mut session = TerminalSession::new()?;
    let result = demo::run(&mut session, &mut app).await;
    session.restore()?;

    app.shutdown()?;
    tracing::info!("stopped");
    result
}

/// Log to `<dir>/folio.log`; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("folio.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!(err))
}
