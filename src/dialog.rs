use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use strum::{EnumIter, IntoEnumIterator};

use crate::colors::{Rgb, Rgba};
use crate::timer::{Mode, MAX_MINUTES, MIN_MINUTES};

pub const MIN_OPACITY_PERCENT: u8 = 30;
pub const MAX_OPACITY_PERCENT: u8 = 100;
const OPACITY_STEP: u8 = 5;
const MAX_INPUT_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MenuItem {
  SetTimer,
  SetBreak,
  AddTask,
  EditTasks,
  BackgroundColor,
  FontColor,
  Opacity,
  Exit,
}

impl MenuItem {
  pub fn label(&self) -> &'static str {
    match self {
      MenuItem::SetTimer => "Set Timer",
      MenuItem::SetBreak => "Set Break",
      MenuItem::AddTask => "Add Task",
      MenuItem::EditTasks => "Edit Tasks",
      MenuItem::BackgroundColor => "Change Background Color",
      MenuItem::FontColor => "Change Font Color",
      MenuItem::Opacity => "Change Opacity",
      MenuItem::Exit => "Exit",
    }
  }

  pub fn all() -> Vec<MenuItem> {
    MenuItem::iter().collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
  Background,
  Font,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  Menu(MenuItem),
  AddTask(String),
  ReplaceTasks(String),
  SetMinutes(Mode, u32),
  SetBackground(Rgba),
  SetFont(Rgb),
  SetOpacity(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  Pending,
  Cancel,
  /// Apply and close.
  Done(Action),
  /// Apply and keep the dialog open.
  Live(Action),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArea {
  pub lines: Vec<String>,
  pub row: usize,
  pub col: usize,
}

impl TextArea {
  pub fn new(text: &str) -> Self {
    let mut lines: Vec<String> = text.lines().map(String::from).collect();
    if lines.is_empty() {
      lines.push(String::new());
    }
    let row = lines.len() - 1;
    let col = lines[row].chars().count();
    Self { lines, row, col }
  }

  pub fn text(&self) -> String {
    self.lines.join("\n")
  }

  fn line_len(&self, row: usize) -> usize {
    self.lines[row].chars().count()
  }

  fn byte_at(&self, row: usize, col: usize) -> usize {
    self.lines[row].char_indices().nth(col).map(|(i, _)| i).unwrap_or(self.lines[row].len())
  }

  fn insert(&mut self, c: char) {
    let at = self.byte_at(self.row, self.col);
    self.lines[self.row].insert(at, c);
    self.col += 1;
  }

  fn newline(&mut self) {
    let at = self.byte_at(self.row, self.col);
    let rest = self.lines[self.row].split_off(at);
    self.row += 1;
    self.lines.insert(self.row, rest);
    self.col = 0;
  }

  fn backspace(&mut self) {
    if self.col > 0 {
      self.col -= 1;
      let at = self.byte_at(self.row, self.col);
      self.lines[self.row].remove(at);
    } else if self.row > 0 {
      let line = self.lines.remove(self.row);
      self.row -= 1;
      self.col = self.line_len(self.row);
      self.lines[self.row].push_str(&line);
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char(c) => self.insert(c),
      KeyCode::Enter => self.newline(),
      KeyCode::Backspace => self.backspace(),
      KeyCode::Left => {
        if self.col > 0 {
          self.col -= 1;
        } else if self.row > 0 {
          self.row -= 1;
          self.col = self.line_len(self.row);
        }
      }
      KeyCode::Right => {
        if self.col < self.line_len(self.row) {
          self.col += 1;
        } else if self.row + 1 < self.lines.len() {
          self.row += 1;
          self.col = 0;
        }
      }
      KeyCode::Up if self.row > 0 => {
        self.row -= 1;
        self.col = self.col.min(self.line_len(self.row));
      }
      KeyCode::Down if self.row + 1 < self.lines.len() => {
        self.row += 1;
        self.col = self.col.min(self.line_len(self.row));
      }
      KeyCode::Home => self.col = 0,
      KeyCode::End => self.col = self.line_len(self.row),
      _ => {}
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
  Menu { selected: usize },
  AddTask { input: String },
  EditTasks { editor: TextArea },
  Minutes { mode: Mode, value: u32 },
  Color { target: ColorTarget, input: String, error: Option<String> },
  Opacity { percent: u8 },
}

impl Dialog {
  pub fn title(&self) -> String {
    match self {
      Dialog::Menu { .. } => "Menu".into(),
      Dialog::AddTask { .. } => "Add Task".into(),
      Dialog::EditTasks { .. } => "Edit Tasks".into(),
      Dialog::Minutes { mode: Mode::Work, .. } => "Set Timer".into(),
      Dialog::Minutes { mode: Mode::Break, .. } => "Set Break".into(),
      Dialog::Color { target: ColorTarget::Background, .. } => "Choose Background Color".into(),
      Dialog::Color { target: ColorTarget::Font, .. } => "Choose Font Color".into(),
      Dialog::Opacity { .. } => "Change Opacity".into(),
    }
  }

  pub fn minutes(mode: Mode, current: u32) -> Dialog {
    Dialog::Minutes { mode, value: current.clamp(MIN_MINUTES, MAX_MINUTES) }
  }

  pub fn opacity(opacity: f32) -> Dialog {
    let percent = (opacity * 100.0).round() as u8;
    Dialog::Opacity { percent: percent.clamp(MIN_OPACITY_PERCENT, MAX_OPACITY_PERCENT) }
  }

  pub fn color(target: ColorTarget, current: String) -> Dialog {
    Dialog::Color { target, input: current, error: None }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
    if key.code == KeyCode::Esc {
      return Outcome::Cancel;
    }
    match self {
      Dialog::Menu { selected } => {
        let items = MenuItem::all();
        match key.code {
          KeyCode::Up => *selected = selected.checked_sub(1).unwrap_or(items.len() - 1),
          KeyCode::Down => *selected = (*selected + 1) % items.len(),
          KeyCode::Enter => return Outcome::Done(Action::Menu(items[*selected])),
          KeyCode::Char('m') | KeyCode::Char('M') => return Outcome::Cancel,
          _ => {}
        }
        Outcome::Pending
      }
      Dialog::AddTask { input } => match key.code {
        KeyCode::Enter => Outcome::Done(Action::AddTask(input.clone())),
        _ => {
          edit_line(input, key);
          Outcome::Pending
        }
      },
      Dialog::EditTasks { editor } => {
        let save = key.modifiers.contains(KeyModifiers::CONTROL)
          && matches!(key.code, KeyCode::Char('s') | KeyCode::Char('S'));
        if save {
          return Outcome::Done(Action::ReplaceTasks(editor.text()));
        }
        editor.handle_key(key);
        Outcome::Pending
      }
      Dialog::Minutes { mode, value } => {
        match key.code {
          KeyCode::Up | KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
            *value = (*value + 1).min(MAX_MINUTES)
          }
          KeyCode::Down | KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('_') => {
            *value = value.saturating_sub(1).max(MIN_MINUTES)
          }
          KeyCode::PageUp => *value = (*value + 5).min(MAX_MINUTES),
          KeyCode::PageDown => *value = value.saturating_sub(5).max(MIN_MINUTES),
          KeyCode::Enter => return Outcome::Done(Action::SetMinutes(*mode, *value)),
          _ => {}
        }
        Outcome::Pending
      }
      Dialog::Color { target, input, error } => match key.code {
        KeyCode::Enter => {
          let parsed = match target {
            ColorTarget::Background => Rgba::parse(input).map(Action::SetBackground),
            ColorTarget::Font => Rgb::parse(input).map(Action::SetFont),
          };
          match parsed {
            Ok(action) => Outcome::Done(action),
            Err(e) => {
              *error = Some(e);
              Outcome::Pending
            }
          }
        }
        _ => {
          edit_line(input, key);
          *error = None;
          Outcome::Pending
        }
      },
      Dialog::Opacity { percent } => {
        let before = *percent;
        match key.code {
          KeyCode::Left | KeyCode::Down | KeyCode::Char('-') => {
            *percent = percent.saturating_sub(OPACITY_STEP).max(MIN_OPACITY_PERCENT)
          }
          KeyCode::Right | KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
            *percent = (*percent + OPACITY_STEP).min(MAX_OPACITY_PERCENT)
          }
          KeyCode::Enter => return Outcome::Cancel,
          _ => {}
        }
        if *percent != before {
          Outcome::Live(Action::SetOpacity(*percent))
        } else {
          Outcome::Pending
        }
      }
    }
  }
}

fn edit_line(input: &mut String, key: KeyEvent) {
  match key.code {
    KeyCode::Char(c) if input.chars().count() < MAX_INPUT_LEN => input.push(c),
    KeyCode::Backspace => {
      input.pop();
    }
    _ => {}
  }
}
