use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::MissedTickBehavior;
use tracing::info;

use reportcard::app::App;
use reportcard::config::{
    DEFAULT_PAGE_SIZE, DEFAULT_VIEWPORT_HEIGHT_RATIO, DEFAULT_VIEWPORT_WIDTH_RATIO,
    DashboardConfig,
};
use reportcard::dashboard::Dashboard;
use reportcard::event::AppEvent;
use reportcard::logging::init_file_logging;
use reportcard::pipeline::{Pipeline, parse_run_anyway, parse_skip, parse_step, parse_target};
use reportcard::tui::{Renderer, total_counts_text};

/// Default maximum output lines kept per step
const DEFAULT_MAX_OUTPUT_LINES: usize = 10000;

/// Spinner and redraw interval
const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(
    name = "reportcard",
    author,
    version,
    about = "Run steps across many applications and watch them in a report card",
    long_about = None
)]
struct Args {
    /// Step to run for every application, as NAME=COMMAND ({app} is replaced)
    #[arg(short, long = "step", value_name = "NAME=COMMAND", required = true)]
    steps: Vec<String>,

    /// Run STEP even when AFTER failed
    #[arg(long, value_name = "STEP=AFTER")]
    run_anyway: Vec<String>,

    /// Skip STEP for APP
    #[arg(long, value_name = "APP:STEP")]
    skip: Vec<String>,

    /// Applications, as APP or APP:TAG
    #[arg(required = true, value_name = "APP[:TAG]")]
    targets: Vec<String>,

    /// Exit code reported as a warning instead of a failure
    #[arg(short, long)]
    warn_exit_code: Option<i32>,

    /// Maximum output lines kept per step (0 for unlimited)
    #[arg(short = 'b', long, default_value_t = DEFAULT_MAX_OUTPUT_LINES)]
    max_output_lines: usize,

    /// Rows per page
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Output pane width as a fraction of the terminal
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH_RATIO)]
    viewport_width: f64,

    /// Output pane height as a fraction of the terminal
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT_RATIO)]
    viewport_height: f64,

    /// Write logs to this file (RUST_LOG sets the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn build_pipeline(args: &Args) -> reportcard::Result<Pipeline> {
    let steps = args
        .steps
        .iter()
        .map(|value| parse_step(value))
        .collect::<reportcard::Result<Vec<_>>>()?;
    let targets = args
        .targets
        .iter()
        .map(|value| parse_target(value))
        .collect::<reportcard::Result<Vec<_>>>()?;

    let mut pipeline = Pipeline::new(steps, targets)?
        .with_warn_exit_code(args.warn_exit_code)
        .with_max_output_lines(args.max_output_lines);
    for value in &args.run_anyway {
        let (step, after) = parse_run_anyway(value)?;
        pipeline = pipeline.run_anyway(&step, &after)?;
    }
    for value in &args.skip {
        let (app, step) = parse_skip(value)?;
        pipeline = pipeline.skip(&app, &step)?;
    }
    Ok(pipeline)
}

fn build_dashboard(args: &Args, pipeline: &Pipeline) -> reportcard::Result<Dashboard> {
    let config = DashboardConfig::default()
        .with_page_size(args.page_size)
        .with_viewport_ratios(args.viewport_width, args.viewport_height);
    Dashboard::builder()
        .task_columns(pipeline.task_columns())
        .prefix_columns(pipeline.prefix_columns())
        .rows(pipeline.row_specs())
        .config(config)
        .build()
}

/// Initialize the terminal for TUI
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Run the application until the user quits
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    pipeline: Arc<Pipeline>,
) -> reportcard::Result<()> {
    let size = terminal.size()?;
    app.handle_event(AppEvent::Resize {
        width: size.width,
        height: size.height,
    });

    app.spawn_workers(pipeline);

    let mut terminal_events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| Renderer::render(frame, app.dashboard()))?;

        let event = tokio::select! {
            Some(event) = terminal_events.next() => match event? {
                Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Event::Resize(width, height) => AppEvent::Resize { width, height },
                _ => continue,
            },
            Some(event) = app.next_event() => event,
            _ = ticker.tick() => AppEvent::Tick,
        };
        app.handle_event(event);
        // Results that arrived while handling are applied before the next draw
        app.poll_events();

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> reportcard::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file
        && let Err(e) = init_file_logging(path)
    {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let pipeline = match build_pipeline(&args) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let dashboard = match build_dashboard(&args, &pipeline) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    info!(
        steps = pipeline.steps().len(),
        apps = pipeline.targets().len(),
        "starting report card"
    );

    let mut app = App::new(dashboard);

    // Initialize terminal
    let mut terminal = init_terminal()?;

    let result = run_app(&mut terminal, &mut app, pipeline).await;

    app.kill_all();
    restore_terminal(&mut terminal)?;

    println!("{}", total_counts_text(app.dashboard()));

    result
}
