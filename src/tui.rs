use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyEvent, MouseEvent};
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend as Backend;
use ratatui::Terminal;

pub const TICK_INTERVAL_MS: u64 = 100;         // Update tick interval in millisecs

#[derive(Clone, Debug)]
pub enum Event {
  Error,
  Tick,
  Key(KeyEvent),
  Mouse(MouseEvent),
  Resize(u16, u16),
}

/// Terminal in raw/alternate-screen mode plus the task pumping input and ticks into a channel.
pub struct Tui {
  pub terminal: Terminal<Backend<std::io::Stderr>>,
  pub task: tokio::task::JoinHandle<()>,
  pub cancellation_token: tokio_util::sync::CancellationToken,
  pub event_rx: tokio::sync::mpsc::UnboundedReceiver<Event>,
  pub event_tx: tokio::sync::mpsc::UnboundedSender<Event>,
}

impl Tui {
  pub fn new() -> Result<Tui> {
    let mut terminal = ratatui::Terminal::new(Backend::new(std::io::stderr()))?;
    terminal.clear()?;
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let cancellation_token = tokio_util::sync::CancellationToken::new();
    let task = tokio::spawn(async {});
    Ok(Self { terminal, task, cancellation_token, event_rx, event_tx })
  }

  pub async fn next(&mut self) -> Option<Event> {
    self.event_rx.recv().await
  }

  pub fn enter(&mut self) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
      std::io::stderr(),
      crossterm::terminal::EnterAlternateScreen,
      crossterm::event::EnableMouseCapture,
      crossterm::cursor::Hide
    )?;
    self.start();
    Ok(())
  }

  pub fn exit(&self) -> Result<()> {
    self.stop()?;
    crossterm::execute!(
      std::io::stderr(),
      crossterm::event::DisableMouseCapture,
      crossterm::terminal::LeaveAlternateScreen,
      crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;
    Ok(())
  }

  pub fn cancel(&self) {
    self.cancellation_token.cancel();
  }

  pub fn stop(&self) -> Result<()> {
    self.cancel();
    let mut counter = 0;
    while !self.task.is_finished() {
      std::thread::sleep(Duration::from_millis(250));
      counter += 1;
      if counter > 5 {
        self.task.abort();
      }
      if counter > 10 {
        log::error!("Failed to abort event task");
        return Err(eyre!("Unable to abort task"));
      }
    }
    Ok(())
  }

  pub fn start(&mut self) {
    let tick_rate = Duration::from_millis(TICK_INTERVAL_MS);
    self.cancel();
    self.cancellation_token = tokio_util::sync::CancellationToken::new();
    let cancellation_token = self.cancellation_token.clone();
    let event_tx = self.event_tx.clone();
    self.task = tokio::spawn(async move {
      let mut reader = crossterm::event::EventStream::new();
      let mut interval = tokio::time::interval(tick_rate);
      loop {
        let delay = interval.tick();
        let crossterm_event = reader.next().fuse();
        tokio::select! {
          _ = cancellation_token.cancelled() => {
            break;
          }
          maybe_event = crossterm_event => {
            let event = match maybe_event {
              Some(Ok(crossterm::event::Event::Key(key))) => {
                if key.kind == crossterm::event::KeyEventKind::Press { Some(Event::Key(key)) } else { None }
              }
              Some(Ok(crossterm::event::Event::Mouse(mouse))) => Some(Event::Mouse(mouse)),
              Some(Ok(crossterm::event::Event::Resize(w, h))) => Some(Event::Resize(w, h)),
              Some(Ok(_)) => None,
              Some(Err(_)) => Some(Event::Error),
              None => None,
            };
            if let Some(event) = event {
              if let Err(e) = event_tx.send(event) {
                log::error!("Failed to send terminal event: {}", e);
              }
            }
          },
          _ = delay => {
            if let Err(e) = event_tx.send(Event::Tick) {
              log::error!("Failed to send tick event: {}", e);
            }
          },
        }
      }
    });
  }
}

impl std::ops::Deref for Tui {
  type Target = ratatui::Terminal<Backend<std::io::Stderr>>;

  fn deref(&self) -> &Self::Target {
    &self.terminal
  }
}

impl std::ops::DerefMut for Tui {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.terminal
  }
}

impl Drop for Tui {
  fn drop(&mut self) {
    if let Err(e) = self.exit() {
      eprintln!("Error during cleanup: {}", e);
    }
  }
}
