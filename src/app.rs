use std::path::PathBuf;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use strum::EnumIs;

use crate::colors::{Rgb, Rgba};
use crate::dialog::{Action, ColorTarget, Dialog, MenuItem, Outcome, TextArea};
use crate::geometry::{Control, Geometry, Hit, PanelLayout, Window};
use crate::settings::Settings;
use crate::sound;
use crate::tasks::TaskList;
use crate::timer::{Countdown, Mode, Progress};
use crate::tui::{Event, Tui};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
enum AppState {
  #[default]
  Active,
  Quitting,
}

#[derive(Debug, Clone, PartialEq)]
enum Message {
  PlayPause,
  Reset,
  ToggleBreak,
  OpenMenu,
  Menu(MenuItem),
  DialogKey(KeyEvent),
  SelectPrev,
  SelectNext,
  CompleteSelected,
  Complete(usize),
  Press(u16, u16),
  Drag(u16, u16),
  Release,
  Resize(u16, u16),
  Tick,
  Quit,
  Nothing,
}

/// Side effects requested by an update, carried out by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
  Save,
  Chime,
}

pub struct App {
  state: AppState,
  timer: Countdown,
  tasks: TaskList,
  selected: Option<usize>,
  settings: Settings,
  window: Window,
  screen: Rect,
  dialog: Option<Dialog>,
  last_tick_time: Instant,
  effects: Vec<Effect>,
}

impl App {
  pub fn new(settings: Settings, screen: Rect) -> Self {
    let geometry = settings
      .geometry
      .unwrap_or_else(|| Geometry::centered_in(screen))
      .clamp_to(screen);
    Self {
      state: AppState::default(),
      timer: Countdown::new(settings.work_secs, settings.break_secs),
      tasks: TaskList::new(settings.tasks.clone()),
      selected: None,
      window: Window::new(geometry),
      screen,
      dialog: None,
      last_tick_time: Instant::now(),
      effects: Vec::new(),
      settings,
    }
  }

  pub fn timer(&self) -> &Countdown {
    &self.timer
  }

  pub fn tasks(&self) -> &TaskList {
    &self.tasks
  }

  pub fn selected(&self) -> Option<usize> {
    self.selected
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn dialog(&self) -> Option<&Dialog> {
    self.dialog.as_ref()
  }

  pub fn layout(&self) -> PanelLayout {
    PanelLayout::compute(self.window.geometry.rect(), self.tasks.len(), self.selected)
  }

  /// Current preferences, with the live timer, task and window state folded in.
  pub fn snapshot(&self) -> Settings {
    Settings {
      geometry: Some(self.window.geometry),
      work_secs: self.timer.work_secs(),
      break_secs: self.timer.break_secs(),
      tasks: self.tasks.items().to_vec(),
      ..self.settings.clone()
    }
  }

  pub async fn run(&mut self, mut tui: Tui, config_path: PathBuf) -> Result<()> {
    tui.enter()?;
    self.last_tick_time = Instant::now();
    while !self.state.is_quitting() {
      tui.draw(|f| crate::ui::render(self, f))?;
      let event = tui.next().await.ok_or(eyre!("Unable to get event"))?; // blocks until next event
      let message = self.handle_event(event);
      self.update(message);
      for effect in self.take_effects() {
        match effect {
          Effect::Save => {
            if let Err(e) = self.snapshot().save(&config_path) {
              error!("Couldn't save settings: {:#}", e);
            }
          }
          Effect::Chime => sound::play_chime(&self.settings.sound),
        }
      }
    }
    tui.exit()?;
    Ok(())
  }

  pub fn take_effects(&mut self) -> Vec<Effect> {
    let mut effects = std::mem::take(&mut self.effects);
    // One save per update is enough
    let mut saved = false;
    effects.retain(|e| !(e == &Effect::Save && std::mem::replace(&mut saved, true)));
    effects
  }

  // Event handler (keyboard, mouse, tick)
  fn handle_event(&self, event: Event) -> Message {
    match event {
      Event::Key(key) if self.dialog.is_some() => Message::DialogKey(key),
      Event::Key(key) => match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Message::Quit,
        KeyCode::Char(' ') => Message::PlayPause,
        KeyCode::Char('r') | KeyCode::Char('R') => Message::Reset,
        KeyCode::Char('b') | KeyCode::Char('B') => Message::ToggleBreak,
        KeyCode::Char('m') | KeyCode::Char('M') => Message::OpenMenu,
        KeyCode::Char('t') | KeyCode::Char('T') => Message::Menu(MenuItem::SetTimer),
        KeyCode::Char('k') | KeyCode::Char('K') => Message::Menu(MenuItem::SetBreak),
        KeyCode::Char('a') | KeyCode::Char('A') => Message::Menu(MenuItem::AddTask),
        KeyCode::Char('e') | KeyCode::Char('E') => Message::Menu(MenuItem::EditTasks),
        KeyCode::Char('c') | KeyCode::Char('C') => Message::Menu(MenuItem::BackgroundColor),
        KeyCode::Char('f') | KeyCode::Char('F') => Message::Menu(MenuItem::FontColor),
        KeyCode::Char('o') | KeyCode::Char('O') => Message::Menu(MenuItem::Opacity),
        KeyCode::Up => Message::SelectPrev,
        KeyCode::Down => Message::SelectNext,
        KeyCode::Enter | KeyCode::Char('x') | KeyCode::Char('X') => Message::CompleteSelected,
        KeyCode::Char(d @ '1'..='9') => Message::Complete(d as usize - '1' as usize),
        _ => Message::Nothing,
      },
      Event::Mouse(mouse) => match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Message::Press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => Message::Drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => Message::Release,
        _ => Message::Nothing,
      },
      Event::Resize(w, h) => Message::Resize(w, h),
      Event::Tick => Message::Tick,
      Event::Error => {
        warn!("Terminal reported an input error");
        Message::Nothing
      }
    }
  }

  fn update(&mut self, message: Message) {
    match message {
      Message::PlayPause => self.timer.toggle(),
      Message::Reset => self.timer.reset(),
      Message::ToggleBreak => {
        self.timer.toggle_break();
        self.effects.push(Effect::Chime);
      }
      Message::OpenMenu => self.dialog = Some(Dialog::Menu { selected: 0 }),
      Message::Menu(item) => self.open(item),
      Message::DialogKey(key) => self.dialog_key(key),
      Message::SelectPrev => self.move_selection(-1),
      Message::SelectNext => self.move_selection(1),
      Message::CompleteSelected => {
        if let Some(index) = self.selected {
          self.complete(index);
        }
      }
      Message::Complete(index) => self.complete(index),
      Message::Press(column, row) => self.press(column, row),
      Message::Drag(column, row) => self.window.motion(column, row, self.screen),
      Message::Release => {
        if self.window.release() {
          info!("Panel moved to {}", self.window.geometry);
          self.effects.push(Effect::Save);
        }
      }
      Message::Resize(width, height) => self.resize(width, height),
      Message::Tick => self.tick(),
      Message::Quit => self.quit(),
      Message::Nothing => {}
    }
  }

  fn tick(&mut self) {
    let now = Instant::now();
    let dur = now - self.last_tick_time;
    self.last_tick_time = now;
    self.advance(dur);
  }

  fn advance(&mut self, elapsed: Duration) {
    if let Progress::Finished(mode) = self.timer.advance(elapsed) {
      info!("{} interval complete", mode.label());
      self.effects.push(Effect::Chime);
    }
  }

  fn quit(&mut self) {
    self.state = AppState::Quitting;
  }

  fn open(&mut self, item: MenuItem) {
    debug!("Menu: {}", item.label());
    self.dialog = match item {
      MenuItem::SetTimer => Some(Dialog::minutes(Mode::Work, self.timer.work_minutes())),
      MenuItem::SetBreak => Some(Dialog::minutes(Mode::Break, self.timer.break_minutes())),
      MenuItem::AddTask => Some(Dialog::AddTask { input: String::new() }),
      MenuItem::EditTasks => Some(Dialog::EditTasks { editor: TextArea::new(&self.tasks.as_text()) }),
      MenuItem::BackgroundColor => {
        Some(Dialog::color(ColorTarget::Background, self.settings.background.to_string()))
      }
      MenuItem::FontColor => Some(Dialog::color(ColorTarget::Font, self.settings.font.to_string())),
      MenuItem::Opacity => Some(Dialog::opacity(self.settings.opacity)),
      MenuItem::Exit => {
        self.quit();
        None
      }
    };
  }

  fn dialog_key(&mut self, key: KeyEvent) {
    let Some(dialog) = self.dialog.as_mut() else { return };
    match dialog.handle_key(key) {
      Outcome::Pending => {}
      Outcome::Cancel => self.dialog = None,
      Outcome::Live(action) => self.apply(action),
      Outcome::Done(action) => {
        self.dialog = None;
        self.apply(action);
      }
    }
  }

  fn apply(&mut self, action: Action) {
    match action {
      Action::Menu(item) => self.open(item),
      Action::AddTask(text) => {
        if self.tasks.add(&text) {
          self.effects.push(Effect::Save);
        }
      }
      Action::ReplaceTasks(text) => {
        self.tasks.replace_all(&text);
        self.clamp_selection();
        self.effects.push(Effect::Save);
      }
      Action::SetMinutes(mode, minutes) => {
        self.timer.set_minutes(mode, minutes);
        self.effects.push(Effect::Save);
      }
      Action::SetBackground(color) => self.set_background(color),
      Action::SetFont(color) => self.set_font(color),
      Action::SetOpacity(percent) => {
        self.settings.opacity = percent as f32 / 100.0;
        debug!("Opacity set to {}", self.settings.opacity);
        self.effects.push(Effect::Save);
      }
    }
  }

  fn set_background(&mut self, color: Rgba) {
    info!("Background colour set to {}", color);
    self.settings.background = color;
    self.effects.push(Effect::Save);
  }

  fn set_font(&mut self, color: Rgb) {
    info!("Font colour set to {}", color);
    self.settings.font = color;
    self.effects.push(Effect::Save);
  }

  fn complete(&mut self, index: usize) {
    if self.tasks.complete(index).is_some() {
      self.clamp_selection();
      self.effects.push(Effect::Chime);
      self.effects.push(Effect::Save);
    }
  }

  fn move_selection(&mut self, delta: isize) {
    if self.tasks.is_empty() {
      self.selected = None;
      return;
    }
    let last = self.tasks.len() - 1;
    self.selected = Some(match (self.selected, delta < 0) {
      (None, true) => last,
      (None, false) => 0,
      (Some(i), true) => i.saturating_sub(1),
      (Some(i), false) => (i + 1).min(last),
    });
  }

  fn clamp_selection(&mut self) {
    self.selected = match self.selected {
      _ if self.tasks.is_empty() => None,
      Some(i) => Some(i.min(self.tasks.len() - 1)),
      None => None,
    };
  }

  fn press(&mut self, column: u16, row: u16) {
    if self.dialog.is_some() {
      return;
    }
    match self.layout().hit(column, row) {
      Hit::Control(Control::PlayPause) => self.update(Message::PlayPause),
      Hit::Control(Control::Reset) => self.update(Message::Reset),
      Hit::Control(Control::Break) => self.update(Message::ToggleBreak),
      Hit::Control(Control::Menu) => self.update(Message::OpenMenu),
      Hit::Control(Control::EditTasks) => self.open(MenuItem::EditTasks),
      Hit::Task(index, true) => self.complete(index),
      Hit::Task(index, false) => self.selected = Some(index),
      Hit::Grip => self.window.begin_resize(),
      Hit::Panel => self.window.begin_drag(column, row),
      Hit::Outside => {}
    }
  }

  fn resize(&mut self, width: u16, height: u16) {
    self.screen = Rect::new(0, 0, width, height);
    self.window.geometry = self.window.geometry.clamp_to(self.screen);
    debug!("Terminal resized to {}x{}, panel at {}", width, height, self.window.geometry);
    self.effects.push(Effect::Save);
  }
}
