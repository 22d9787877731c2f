// Matchday dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Ensure config files exist, then load config
// 3. Open database
// 4. Create mpsc channels
// 5. Build the LLM client and application state
// 6. Spawn the app logic task
// 7. Run the TUI event loop until the user quits
// 8. Cleanup on exit

use matchday::app;
use matchday::config;
use matchday::db;
use matchday::llm;
use matchday::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Matchday dashboard starting up");

    // 2. Ensure config files exist, then load config
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let copied = config::ensure_config_files(&cwd).context("failed to initialize config files")?;
    for path in &copied {
        info!("Created {} from defaults", path.display());
    }
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, round_size={}",
        config.league.name, config.league.round_size
    );

    // 3. Open database
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Create mpsc channels (before AppState so llm_tx can be passed in)
    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 5. Build the LLM client from config
    let llm_client = llm::LlmClient::from_config(&config);
    match &llm_client {
        llm::LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        llm::LlmClient::Disabled => info!("LLM client disabled (no API key)"),
    }

    let league_name = config.league.name.clone();
    let image_dir = config.image_dir.clone();
    let mut app_state = app::AppState::new(config, db, llm_client, llm_tx.clone());
    app_state
        .load_tables()
        .context("failed to load match data")?;

    // 6. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, llm_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // Drop the LLM sender clone; AppState holds its own clone for spawning tasks.
    drop(llm_tx);

    // 7. Run the TUI event loop (blocking until user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx, league_name, image_dir).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Matchday dashboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("matchday.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matchday=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
