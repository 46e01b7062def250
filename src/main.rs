/////////////////////
/// POMODESK - a Pomodoro widget for the terminal
///
/// A floating panel with a work/break countdown and a task checklist.
/// Drag the panel with the mouse to move it, drag its bottom-right corner to
/// resize it. Colours, opacity, durations, tasks and the panel position are
/// saved to `pomodesk.ini` after every change.
/// - 'space' starts / pauses
/// - 'r' resets the current interval
/// - 'b' switches between work and break
/// - 'm' opens the menu
/// - 'a' adds a task, 'e' edits the list
/// - '1'..'9', or up/down + 'x', completes a task
/// - 'q' or 'esc' quits
///
pub const APP_VERSION: &str = "POMODESK V0.2.0";
const LOG_FILE_NAME: &str = "pomodesk.log";

#[macro_use] extern crate log;
extern crate simplelog;
use simplelog::*;
use std::fs::File;
#[macro_use]
extern crate ini;

use color_eyre::eyre::Result;
use build_time::build_time_local;

mod app;
mod colors;
mod dialog;
mod geometry;
mod settings;
mod sound;
mod tasks;
mod timer;
mod tui;
mod ui;

use app::App;
use ratatui::layout::Rect;
use settings::Settings;

fn init_logging() {
  let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
  loggers.push(TermLogger::new(LevelFilter::Warn, Config::default(), TerminalMode::Mixed, ColorChoice::Auto));
  match File::create(LOG_FILE_NAME) {
    Ok(log_file) => loggers.push(WriteLogger::new(LevelFilter::Info, Config::default(), log_file)),
    Err(e) => {
      eprintln!("Warning: Could not create log file: {}", e);
      eprintln!("Continuing with terminal logging only.");
    }
  }
  CombinedLogger::init(loggers).unwrap_or_else(|e| {
    eprintln!("Warning: Could not initialize logger: {}", e);
  });
}

#[tokio::main]
async fn main() -> Result<()> {
  init_logging();
  info!("Logging for {} initialized (tick interval: {}ms)", APP_VERSION, tui::TICK_INTERVAL_MS);

  let config_path = settings::config_path();
  let settings = Settings::load(&config_path);

  let tui = tui::Tui::new()?;
  let size = tui.size()?;
  let mut app = App::new(settings, Rect::new(0, 0, size.width, size.height));
  app.run(tui, config_path).await?;

  println!("Thanks for using {} (built: {})\n", APP_VERSION, build_time_local!("%Y-%b-%d at %H:%M:%S"));
  Ok(())
}
