use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use page_narrator::audio::RodioBackend;
use page_narrator::config::Args;
use page_narrator::controller::AppController;
use page_narrator::log_host_result;
use page_narrator::logging;
use page_narrator::model::{AppModel, AssetMap, ContentState, JsonSettingsStore, Page, PageContent, PlaybackInfo};
use page_narrator::narration::{HighlightSurface, InteractionGate, MarkerSet, ModeFlags, NarrationEngine};
use page_narrator::view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Page Narrator Starting ===");

    // Step 1: Load the page and the assets for the initial language
    let page = Page::load(&args.page);
    log_host_result!("load page", page);
    let page = page.with_context(|| format!("could not load page {}", args.page.display()))?;

    let audio_root = args.audio_root();
    let assets = AssetMap::load(&args.translations_dir, &args.lang, &audio_root);
    log_host_result!("load translations", assets);
    let assets = assets.with_context(|| format!("could not load translations for '{}'", args.lang))?;

    let content = PageContent::new(ContentState {
        page,
        assets,
        flags: ModeFlags {
            easy_read: args.easy_read,
            describe_images: args.describe_images,
        },
        languages: AssetMap::available_languages(&args.translations_dir),
        translations_dir: args.translations_dir.clone(),
        audio_root,
    });

    // Step 2: Audio output and the narration engine
    let backend = RodioBackend::new().context("could not open audio output")?;
    let markers = MarkerSet::new();
    let engine = NarrationEngine::new(
        Arc::new(content.clone()),
        Arc::new(backend),
        Arc::new(markers.clone()),
        Arc::new(JsonSettingsStore::new(&args.settings_file)),
        InteractionGate::new(),
        args.item_timeout(),
    );
    tracing::info!(speed = engine.speed(), "Narration engine ready");

    let model = Arc::new(Mutex::new(AppModel::new(content, markers)));
    let controller = AppController::new(model.clone(), engine.clone());
    controller.try_start_event_listener().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Silence any narration still running before the terminal is handed back
    engine.stop().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Page Narrator shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    let engine = controller.engine().clone();
    let indicator = engine.indicator();

    loop {
        // Get current state
        let (playback, ui_state, items, marked, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            let playback = PlaybackInfo {
                snapshot: engine.snapshot().await,
                audio_active: *indicator.borrow(),
                flags: model_guard.content.flags().await,
                lang: model_guard.content.lang().await,
                title: model_guard.content.title().await,
            };

            (
                playback,
                model_guard.get_ui_state().await,
                model_guard.content.display_items().await,
                model_guard.markers.marked(),
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &items, &marked);
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
