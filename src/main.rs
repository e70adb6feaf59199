mod api;
mod app;
mod board;
mod config;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{ApiClient, UNEXPECTED_ERROR_MESSAGE};
use app::App;
use board::{ComplaintBoard, ComplaintForm, ListArea, RequestPhase, EMPTY_MESSAGE};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "complaint-board")]
#[command(version)]
#[command(about = "List and submit complaints from the terminal")]
struct Args {
    /// Print the complaint list and exit
    #[arg(short, long)]
    list: bool,

    /// With --list, print the raw JSON list
    #[arg(long, requires = "list")]
    json: bool,

    /// Submit a complaint and exit (needs --title and --body)
    #[arg(short, long, requires_all = ["title", "body"], conflicts_with = "list")]
    submit: bool,

    /// Complaint title for --submit
    #[arg(long)]
    title: Option<String>,

    /// Complaint details for --submit
    #[arg(long)]
    body: Option<String>,

    /// Override the API base URL from the config file
    #[arg(long, env = "COMPLAINT_BOARD_BASE_URL")]
    base_url: Option<String>,

    /// Use this config file instead of the default one
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let interactive = !args.list && !args.submit;
    init_logging(interactive);

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_default(),
    }
    .with_base_url(args.base_url.clone());

    // Handle CLI-only commands
    if args.list {
        return print_list(&config, args.json).await;
    }

    if args.submit {
        let form = ComplaintForm {
            title: args.title.unwrap_or_default(),
            body: args.body.unwrap_or_default(),
        };
        return submit_once(&config, form).await;
    }

    // Run TUI
    run_tui(config).await
}

/// TUI mode writes logs to a file so they don't draw over the screen
fn init_logging(to_file: bool) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::from_default_env());

    if !to_file {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
        return;
    }

    match open_log_file() {
        Ok(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        Err(_) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .init(),
    }
}

fn open_log_file() -> Result<std::fs::File> {
    let dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
        .join("complaint-board");
    std::fs::create_dir_all(&dir)?;

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("complaint-board.log"))
        .context("Failed to open log file")
}

async fn print_list(config: &AppConfig, json: bool) -> Result<()> {
    let mut board = ComplaintBoard::new(ApiClient::new(config)?);
    board.mount();
    board.settle().await;

    if board.list_phase() == RequestPhase::Failed {
        let message = board.error_message().unwrap_or(UNEXPECTED_ERROR_MESSAGE);
        anyhow::bail!("{}", message);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(board.complaints())?);
        return Ok(());
    }

    match board.list_area() {
        ListArea::Entries(entries) => {
            for entry in entries {
                println!("{}", entry.heading());
                if !entry.is_placeholder() {
                    for line in entry.body.unwrap_or_default().lines() {
                        println!("    {}", line);
                    }
                }
            }
        }
        ListArea::Empty | ListArea::Loading => println!("{}", EMPTY_MESSAGE),
    }

    Ok(())
}

async fn submit_once(config: &AppConfig, form: ComplaintForm) -> Result<()> {
    let mut board = ComplaintBoard::new(ApiClient::new(config)?);
    board.mount();
    board.settle().await;

    board.form = form;
    board.submit_complaint()?;
    board.settle().await;

    if board.save_phase() != RequestPhase::Completed {
        let message = board.error_message().unwrap_or(UNEXPECTED_ERROR_MESSAGE);
        anyhow::bail!("{}", message);
    }

    println!(
        "Complaint submitted ({} complaints on the board)",
        board.complaints().len()
    );
    Ok(())
}

async fn run_tui(config: AppConfig) -> Result<()> {
    ui::init_theme(theme::Theme::from_config(&config.theme));
    let client = ApiClient::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and start the initial load
    let mut app = App::new(client);
    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Anything still in flight is cancelled here
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    app.handle_key(key);
                    if app.should_quit {
                        return Ok(());
                    }
                }
            }
        }

        // Apply finished requests and expire status messages
        app.tick();

        // Let spawned requests make progress between frames
        tokio::task::yield_now().await;
    }
}
