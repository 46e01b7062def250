use std::time::Duration;
use strum::EnumIs;

pub const DEFAULT_WORK_SECS: u32 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u32 = 5 * 60;
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 60;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum Mode {
  #[default]
  Work,
  Break,
}

impl Mode {
  pub fn label(&self) -> &'static str {
    match self {
      Mode::Work => "Work",
      Mode::Break => "Break",
    }
  }

  fn other(&self) -> Mode {
    match self {
      Mode::Work => Mode::Break,
      Mode::Break => Mode::Work,
    }
  }
}

/// What happened during a call to [`Countdown::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
  Idle,
  Ticked,
  Finished(Mode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
  work_secs: u32,
  break_secs: u32,
  remaining: u32,
  mode: Mode,
  running: bool,
  ticking: bool,
  carry: Duration,
}

impl Default for Countdown {
  fn default() -> Self {
    Self::new(DEFAULT_WORK_SECS, DEFAULT_BREAK_SECS)
  }
}

impl Countdown {
  pub fn new(work_secs: u32, break_secs: u32) -> Self {
    Self {
      work_secs,
      break_secs,
      remaining: work_secs,
      mode: Mode::Work,
      running: false,
      ticking: false,
      carry: Duration::ZERO,
    }
  }

  pub fn remaining(&self) -> u32 {
    self.remaining
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn is_ticking(&self) -> bool {
    self.ticking
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  pub fn work_secs(&self) -> u32 {
    self.work_secs
  }

  pub fn break_secs(&self) -> u32 {
    self.break_secs
  }

  pub fn work_minutes(&self) -> u32 {
    (self.work_secs / 60).clamp(MIN_MINUTES, MAX_MINUTES)
  }

  pub fn break_minutes(&self) -> u32 {
    (self.break_secs / 60).clamp(MIN_MINUTES, MAX_MINUTES)
  }

  fn duration_of(&self, mode: Mode) -> u32 {
    match mode {
      Mode::Work => self.work_secs,
      Mode::Break => self.break_secs,
    }
  }

  /// Play/pause.
  pub fn toggle(&mut self) {
    if self.ticking {
      self.pause();
    } else {
      self.start();
    }
  }

  pub fn start(&mut self) {
    if !self.running {
      self.remaining = self.duration_of(self.mode);
      self.running = true;
    }
    self.ticking = true;
    self.carry = Duration::ZERO;
    info!("{} countdown started at {}", self.mode.label(), self.format());
  }

  pub fn pause(&mut self) {
    self.ticking = false;
    info!("{} countdown paused at {}", self.mode.label(), self.format());
  }

  pub fn reset(&mut self) {
    self.ticking = false;
    self.running = false;
    self.carry = Duration::ZERO;
    self.remaining = self.duration_of(self.mode);
    info!("{} countdown reset to {}", self.mode.label(), self.format());
  }

  /// Switches between work and break and keeps counting down.
  pub fn toggle_break(&mut self) {
    self.mode = self.mode.other();
    self.remaining = self.duration_of(self.mode);
    self.running = true;
    if !self.ticking {
      self.ticking = true;
      self.carry = Duration::ZERO;
    }
    info!("Switched to {} mode ({})", self.mode.label(), self.format());
  }

  pub fn advance(&mut self, elapsed: Duration) -> Progress {
    if !self.ticking {
      return Progress::Idle;
    }
    self.carry += elapsed;
    let mut progress = Progress::Idle;
    while self.carry >= Duration::from_secs(1) {
      self.carry -= Duration::from_secs(1);
      self.remaining = self.remaining.saturating_sub(1);
      progress = Progress::Ticked;
      if self.remaining == 0 {
        let finished = self.mode;
        self.ticking = false;
        self.running = false;
        self.carry = Duration::ZERO;
        self.remaining = self.duration_of(self.mode);
        info!("{} countdown finished", finished.label());
        return Progress::Finished(finished);
      }
    }
    progress
  }

  pub fn set_minutes(&mut self, mode: Mode, minutes: u32) {
    let secs = minutes.clamp(MIN_MINUTES, MAX_MINUTES) * 60;
    match mode {
      Mode::Work => self.work_secs = secs,
      Mode::Break => self.break_secs = secs,
    }
    if self.mode == mode {
      self.remaining = secs;
      self.carry = Duration::ZERO;
    }
    info!("{} duration set to {} min", mode.label(), secs / 60);
  }

  pub fn format(&self) -> String {
    format_mmss(self.remaining)
  }
}

pub fn format_mmss(secs: u32) -> String {
  format!("{:02}:{:02}", secs / 60, secs % 60)
}
