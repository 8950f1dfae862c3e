use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use chat_desk::app::App;
use chat_desk::chat::remote::ModelProvider;
use chat_desk::chat::{CannedGenerator, RemoteGenerator, ResponseGenerator};
use chat_desk::event_loop::{ConsoleInputDriver, ControlFlow, EventLoop};
use chat_desk::tracing_sub;

#[derive(Debug, Parser)]
#[command(name = "chat-desk", version, about = "Themed chat terminals on a desktop")]
struct Cli {
    /// Append logs to this file (stderr would scribble over the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory transcript exports are written into
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Stream replies from a remote chat endpoint instead of the canned
    /// persona tables
    #[arg(long)]
    endpoint: Option<String>,

    /// Model provider announced to the remote endpoint
    #[arg(long, value_enum, default_value_t = ModelProvider::Openai)]
    provider: ModelProvider,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    tracing_sub::init(cli.log_file.as_deref())?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting chat-desk");

    let generator: Box<dyn ResponseGenerator> = match &cli.endpoint {
        Some(endpoint) => Box::new(RemoteGenerator::new(endpoint.clone(), cli.provider)),
        None => Box::new(CannedGenerator::new()),
    };
    let mut app = App::new(generator, cli.export_dir);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut event_loop = EventLoop::new(ConsoleInputDriver, Duration::from_millis(16));
    event_loop.run(|event| match event {
        None => {
            app.on_tick(Instant::now());
            terminal.draw(|frame| app.render(frame))?;
            Ok(ControlFlow::Continue)
        }
        Some(event) => Ok(app.handle_event(&event)),
    })
}
