use std::io;
use std::path::PathBuf;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use structopt::StructOpt;
use tui::{backend::CrosstermBackend, Terminal};

use jiradash::app::App;
use jiradash::config::Config;
use jiradash::event::event::{Event, Events};

#[derive(StructOpt, Debug)]
#[structopt(name = "jiradash", about = "A JIRA dashboard terminal user interface")]
struct Opt {
    /// Path to the config file
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[structopt(long)]
    server_url: Option<String>,

    /// Log level written to the log file
    #[structopt(long, default_value = "debug")]
    log_level: log::LevelFilter,

    /// Log file path
    #[structopt(long, default_value = "jiradash.log")]
    log_file: PathBuf,
}

fn setup_logger(level: log::LevelFilter, log_file: &PathBuf) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(fern::log_file(log_file)?)
        .apply()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    setup_logger(opt.log_level, &opt.log_file)?;

    let mut config = Config::new(opt.config.as_deref())?;
    if let Some(server_url) = opt.server_url {
        config.server_config.base_url = server_url;
    }
    info!("using backend {}", config.server_config.base_url);

    let mut app = App::new(config).await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let events = Events::new(250);

    terminal.clear()?;

    loop {
        terminal.draw(|f| {
            if let Err(err) = app.draw(f) {
                app.error.set(err.to_string());
            }
        })?;

        match events.next()? {
            Event::Input(key) => {
                if key == app.config.key_config.exit {
                    break;
                }
                match app.event(key).await {
                    Ok(state) => {
                        if !state.is_consumed() && key == app.config.key_config.quit {
                            break;
                        }
                    }
                    Err(err) => app.error.set(err.to_string()),
                }
            }
            Event::Tick => {}
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
