use anyhow::{Context, Result};
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;
use typeshot::{
    api::{self, AppState as ApiState},
    app::{App, AppAction, AppState},
    app_dirs::AppDirs,
    client::{HttpLeaderboardClient, LeaderboardClient},
    config::{ConfigStore, FileConfigStore},
    game::Game,
    leaderboard::{write_csv, Leaderboard, DEFAULT_SET_KEY, DEFAULT_TOP_N},
    questions::{default_questions, load_questions, shuffled},
    runtime::{
        spawn_submission, CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner,
    },
    scoring::ScoreRule,
    store::{upstash, MemoryStore, SortedSetStore, SqliteStore, UpstashStore},
    ui::ranking::format_row,
};

const TICK_RATE_MS: u64 = 100;
const DEFAULT_LOG_FILTER: &str = "typeshot=info,tower_http=info";

/// typing game for the terminal with a tiny leaderboard server
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run the leaderboard HTTP API
    Serve(ServeArgs),
    /// play a round in the terminal and submit the score
    Play(PlayArgs),
    /// print the current top scores
    Ranking(RankingArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// The address to bind to.
    #[arg(short, long, env = "TYPESHOT_ADDRESS", default_value = "127.0.0.1:3000")]
    address: String,

    /// where scores are kept
    #[arg(long, value_enum, default_value_t = StoreBackend::Upstash)]
    store: StoreBackend,

    /// Upstash Redis REST endpoint
    #[arg(long, env = upstash::URL_ENV)]
    upstash_url: Option<String>,

    /// Upstash Redis REST token
    #[arg(long, env = upstash::TOKEN_ENV, hide_env_values = true)]
    upstash_token: Option<String>,

    /// database file for the sqlite store
    #[arg(long)]
    sqlite_path: Option<PathBuf>,

    /// name of the sorted set holding the ranking
    #[arg(long, default_value = DEFAULT_SET_KEY)]
    set_key: String,

    /// entries returned by GET /api/result
    #[arg(long, default_value_t = DEFAULT_TOP_N as u16, value_parser = clap::value_parser!(u16).range(1..=api::MAX_TOP_N as i64))]
    top_n: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
enum StoreBackend {
    Upstash,
    Sqlite,
    Memory,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// player name, remembered for next time
    #[arg(short, long)]
    name: Option<String>,

    /// leaderboard base url
    #[arg(short, long)]
    server: Option<String>,

    /// shuffle the question order, remembered for next time
    #[arg(long, overrides_with = "no_shuffle")]
    shuffle: bool,

    /// keep the question order, clearing a remembered --shuffle
    #[arg(long, overrides_with = "shuffle")]
    no_shuffle: bool,

    /// JSON file with a custom question list
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// lowest score a slow round can end with
    #[arg(long, allow_negative_numbers = true)]
    score_floor: Option<f64>,
}

#[derive(Args, Debug)]
struct RankingArgs {
    /// leaderboard base url
    #[arg(short, long)]
    server: Option<String>,

    /// print CSV instead of a table
    #[arg(long)]
    csv: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Play(args) => play(args),
        Command::Ranking(args) => ranking(args),
    }
}

fn log_filter() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(io::stderr)
        .init();
}

/// The TUI owns the terminal, so logs go to a file instead
fn init_file_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn build_store(args: &ServeArgs) -> Result<Arc<dyn SortedSetStore>> {
    let store: Arc<dyn SortedSetStore> = match args.store {
        StoreBackend::Upstash => {
            let store = UpstashStore::new(args.upstash_url.clone(), args.upstash_token.clone());
            if !store.is_configured() {
                tracing::warn!(
                    "{} / {} not set, every leaderboard call will fail",
                    upstash::URL_ENV,
                    upstash::TOKEN_ENV
                );
            }
            Arc::new(store)
        }
        StoreBackend::Sqlite => {
            let path = args
                .sqlite_path
                .clone()
                .or_else(AppDirs::db_path)
                .unwrap_or_else(|| PathBuf::from("typeshot_leaderboard.db"));
            tracing::info!("using sqlite leaderboard at {}", path.display());
            Arc::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?,
            )
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

fn serve(args: ServeArgs) -> Result<()> {
    init_stderr_logging();

    let store = build_store(&args)?;
    tracing::info!(store = %args.store, key = %args.set_key, "starting leaderboard");
    let state = ApiState {
        leaderboard: Leaderboard::with_key(store, args.set_key.clone()),
        top_n: args.top_n as usize,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async {
        let listener = TcpListener::bind(&args.address)
            .await
            .with_context(|| format!("failed to bind {}", args.address))?;
        api::serve(listener, state, shutdown_signal()).await?;
        Ok::<(), anyhow::Error>(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        return;
    }
    tracing::info!("shutting down");
}

fn play(args: PlayArgs) -> Result<()> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }
    init_file_logging();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    let shuffle_flag = match (args.shuffle, args.no_shuffle) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    config.apply_flags(args.server, shuffle_flag);

    let questions = match &args.questions {
        Some(path) => load_questions(path)
            .with_context(|| format!("failed to load questions from {}", path.display()))?,
        None => default_questions(),
    };
    let questions = if config.shuffle {
        shuffled(questions)
    } else {
        questions
    };

    let client: Arc<dyn LeaderboardClient> = Arc::new(HttpLeaderboardClient::new(
        config.server_url.clone(),
    )?);
    if let Err(e) = client.ping() {
        tracing::warn!("leaderboard at {} not reachable yet: {e}", config.server_url);
    }

    let game = Game::new(questions, ScoreRule::with_floor(args.score_floor));
    let player_name = args.name.unwrap_or_else(|| config.player_name.clone());
    let mut app = App::new(game, player_name);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let res = start_tui(&mut terminal, &mut app, &runner, client, |name| {
        config.player_name = name.to_string();
        if let Err(e) = config_store.save(&config) {
            tracing::warn!("failed to save config: {e}");
        }
    });

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: GameEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, FixedTicker>,
    client: Arc<dyn LeaderboardClient>,
    mut on_start: impl FnMut(&str),
) -> Result<()> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                // only the running timer changes between keys
                if app.state == AppState::Playing {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            GameEvent::Ranking(reply) => {
                app.on_ranking(reply);
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            GameEvent::Key(key) => {
                match app.on_key(key) {
                    AppAction::Quit => break,
                    AppAction::Started { player_name } => on_start(&player_name),
                    AppAction::Submit { generation, entry } => {
                        spawn_submission(runner.sender(), client.clone(), generation, entry);
                    }
                    AppAction::None => {}
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

fn ranking(args: RankingArgs) -> Result<()> {
    init_stderr_logging();

    let server = args
        .server
        .unwrap_or_else(|| FileConfigStore::new().load().server_url);
    let client = HttpLeaderboardClient::new(server)?;
    let entries = client
        .top()
        .with_context(|| format!("failed to fetch ranking from {}", client.base_url()))?;

    if args.csv {
        write_csv(&entries, io::stdout())?;
    } else if entries.is_empty() {
        println!("No scores yet");
    } else {
        for (idx, entry) in entries.iter().enumerate() {
            println!("{}", format_row(idx + 1, entry));
        }
    }

    Ok(())
}
