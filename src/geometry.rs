// Rendering and mouse hit-testing share PanelLayout

use std::fmt;
use std::ops::Range;
use ratatui::layout::Rect;
use strum::EnumIs;

pub const MIN_WIDTH: u16 = 30;
pub const MIN_HEIGHT: u16 = 10;
pub const DEFAULT_WIDTH: u16 = 46;
pub const DEFAULT_HEIGHT: u16 = 22;

// Big digits need 8 rows and 8 columns per glyph ("mm:ss" is 5 glyphs)
const BIG_TIMER_HEIGHT: u16 = 8;
const BIG_TIMER_WIDTH: u16 = 40;
const BUTTON_WIDTH: u16 = 5;
const CHECKBOX_WIDTH: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
  pub x: u16,
  pub y: u16,
  pub width: u16,
  pub height: u16,
}

impl Geometry {
  pub fn centered_in(screen: Rect) -> Geometry {
    let width = DEFAULT_WIDTH.min(screen.width);
    let height = DEFAULT_HEIGHT.min(screen.height);
    Geometry {
      x: screen.x + (screen.width - width) / 2,
      y: screen.y + (screen.height - height) / 2,
      width,
      height,
    }
  }

  pub fn parse(text: &str) -> Result<Geometry, String> {
    let parts: Vec<u16> = text
      .split(',')
      .map(|p| p.trim().parse::<u16>().map_err(|e| format!("'{}': {}", p.trim(), e)))
      .collect::<Result<_, _>>()?;
    match parts.as_slice() {
      [x, y, w, h] if *w > 0 && *h > 0 => Ok(Geometry { x: *x, y: *y, width: *w, height: *h }),
      _ => Err(format!("expected 'x, y, width, height', got '{}'", text)),
    }
  }

  pub fn rect(&self) -> Rect {
    Rect::new(self.x, self.y, self.width, self.height)
  }

  /// Shrinks and shifts so the panel fits on `screen`.
  pub fn clamp_to(&self, screen: Rect) -> Geometry {
    let width = self.width.clamp(MIN_WIDTH.min(screen.width), screen.width.max(1));
    let height = self.height.clamp(MIN_HEIGHT.min(screen.height), screen.height.max(1));
    let max_x = screen.x + screen.width.saturating_sub(width);
    let max_y = screen.y + screen.height.saturating_sub(height);
    Geometry {
      x: self.x.clamp(screen.x, max_x),
      y: self.y.clamp(screen.y, max_y),
      width,
      height,
    }
  }
}

impl fmt::Display for Geometry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}, {}, {}, {}", self.x, self.y, self.width, self.height)
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
enum Gesture {
  #[default]
  Idle,
  Dragging { dx: u16, dy: u16 },
  Resizing,
}

/// The panel plus the mouse gesture acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
  pub geometry: Geometry,
  gesture: Gesture,
}

impl Window {
  pub fn new(geometry: Geometry) -> Self {
    Self { geometry, gesture: Gesture::Idle }
  }

  pub fn is_busy(&self) -> bool {
    !self.gesture.is_idle()
  }

  pub fn begin_drag(&mut self, column: u16, row: u16) {
    self.gesture = Gesture::Dragging {
      dx: column.saturating_sub(self.geometry.x),
      dy: row.saturating_sub(self.geometry.y),
    };
  }

  pub fn begin_resize(&mut self) {
    self.gesture = Gesture::Resizing;
  }

  pub fn motion(&mut self, column: u16, row: u16, screen: Rect) {
    let moved = match self.gesture {
      Gesture::Idle => return,
      Gesture::Dragging { dx, dy } => Geometry {
        x: column.saturating_sub(dx),
        y: row.saturating_sub(dy),
        ..self.geometry
      },
      Gesture::Resizing => Geometry {
        width: column.saturating_add(1).saturating_sub(self.geometry.x).max(MIN_WIDTH),
        height: row.saturating_add(1).saturating_sub(self.geometry.y).max(MIN_HEIGHT),
        ..self.geometry
      },
    };
    self.geometry = moved.clamp_to(screen);
  }

  /// Ends the gesture; true if one was in progress.
  pub fn release(&mut self) -> bool {
    let was_busy = self.is_busy();
    self.gesture = Gesture::Idle;
    was_busy
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
  PlayPause,
  Reset,
  Break,
  Menu,
  EditTasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
  Control(Control),
  /// Task index and whether the checkbox itself was clicked.
  Task(usize, bool),
  Grip,
  Panel,
  Outside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
  pub outer: Rect,
  pub timer: Rect,
  pub big_timer: bool,
  pub buttons: Vec<(Control, Rect)>,
  pub tasks: Rect,
  pub visible_tasks: Range<usize>,
  pub footer: Rect,
  pub edit_button: Rect,
  pub grip: Rect,
}

impl PanelLayout {
  pub fn compute(outer: Rect, task_count: usize, selected: Option<usize>) -> PanelLayout {
    let inner = Rect::new(
      outer.x + 1,
      outer.y + 1,
      outer.width.saturating_sub(2),
      outer.height.saturating_sub(2),
    );
    let big_timer = inner.width >= BIG_TIMER_WIDTH && inner.height >= BIG_TIMER_HEIGHT + 4;
    let timer_height = if big_timer { BIG_TIMER_HEIGHT } else { 1 }.min(inner.height);
    let timer = Rect::new(inner.x, inner.y, inner.width, timer_height);

    let buttons_y = inner.y + timer_height;
    let order = [Control::PlayPause, Control::Reset, Control::Break, Control::Menu];
    let row_width = BUTTON_WIDTH * order.len() as u16 + (order.len() as u16 - 1);
    let start_x = inner.x + inner.width.saturating_sub(row_width) / 2;
    let buttons = order
      .iter()
      .enumerate()
      .map(|(i, c)| {
        let x = start_x.saturating_add(i as u16 * (BUTTON_WIDTH + 1));
        (*c, clip(Rect::new(x, buttons_y, BUTTON_WIDTH, 1), inner))
      })
      .collect();

    let bottom = inner.y + inner.height;
    let footer_y = bottom.saturating_sub(1).max(buttons_y + 1);
    let tasks_y = buttons_y + 1;
    let tasks = clip(Rect::new(inner.x, tasks_y, inner.width, footer_y.saturating_sub(tasks_y)), inner);
    let footer = clip(Rect::new(inner.x, footer_y, inner.width, 1), inner);
    let edit_button = clip(
      Rect::new((inner.x + inner.width).saturating_sub(BUTTON_WIDTH), footer_y, BUTTON_WIDTH, 1),
      inner,
    );
    let grip = clip(
      Rect::new((outer.x + outer.width).saturating_sub(1), (outer.y + outer.height).saturating_sub(1), 1, 1),
      outer,
    );

    PanelLayout {
      outer,
      timer,
      big_timer,
      buttons,
      visible_tasks: visible_window(selected, task_count, tasks.height as usize),
      tasks,
      footer,
      edit_button,
      grip,
    }
  }

  pub fn hit(&self, column: u16, row: u16) -> Hit {
    if contains(self.grip, column, row) {
      return Hit::Grip;
    }
    if !contains(self.outer, column, row) {
      return Hit::Outside;
    }
    if let Some((control, _)) = self.buttons.iter().find(|(_, r)| contains(*r, column, row)) {
      return Hit::Control(*control);
    }
    if contains(self.edit_button, column, row) {
      return Hit::Control(Control::EditTasks);
    }
    if contains(self.tasks, column, row) {
      let index = self.visible_tasks.start + (row - self.tasks.y) as usize;
      if self.visible_tasks.contains(&index) {
        return Hit::Task(index, column < self.tasks.x + CHECKBOX_WIDTH);
      }
    }
    Hit::Panel
  }
}

/// Range of task indices that fit in `height` rows while keeping `selected` visible.
pub fn visible_window(selected: Option<usize>, count: usize, height: usize) -> Range<usize> {
  if height == 0 {
    return 0..0;
  }
  let first = selected.map(|s| (s + 1).saturating_sub(height)).unwrap_or(0);
  first..count.min(first + height)
}

/// Part of `r` inside `bound`; zero-sized when they do not overlap.
pub fn clip(r: Rect, bound: Rect) -> Rect {
  let x = r.x.clamp(bound.x, bound.x.saturating_add(bound.width));
  let y = r.y.clamp(bound.y, bound.y.saturating_add(bound.height));
  let right = r.x.saturating_add(r.width).min(bound.x.saturating_add(bound.width));
  let bottom = r.y.saturating_add(r.height).min(bound.y.saturating_add(bound.height));
  Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
}

fn contains(r: Rect, column: u16, row: u16) -> bool {
  column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

#[cfg(test)]
mod tests {
  use super::*;

  fn screen() -> Rect {
    Rect::new(0, 0, 120, 40)
  }

  #[test]
  fn test_parse_and_display() {
    let g = Geometry::parse("3, 4, 50, 20").unwrap();
    assert_eq!(g, Geometry { x: 3, y: 4, width: 50, height: 20 });
    assert_eq!(Geometry::parse(&g.to_string()), Ok(g));
  }

  #[test]
  fn test_parse_rejects_garbage() {
    assert!(Geometry::parse("1, 2, 3").is_err());
    assert!(Geometry::parse("a, b, c, d").is_err());
    assert!(Geometry::parse("1, 2, 0, 5").is_err());
  }

  #[test]
  fn test_centered() {
    let g = Geometry::centered_in(screen());
    assert_eq!(g.width, DEFAULT_WIDTH);
    assert_eq!(g.x, (120 - DEFAULT_WIDTH) / 2);
  }

  #[test]
  fn test_clamp_moves_inside() {
    let g = Geometry { x: 100, y: 35, width: 40, height: 20 }.clamp_to(screen());
    assert_eq!(g, Geometry { x: 80, y: 20, width: 40, height: 20 });
  }

  #[test]
  fn test_clamp_shrinks_to_small_screen() {
    let g = Geometry { x: 0, y: 0, width: 60, height: 30 }.clamp_to(Rect::new(0, 0, 20, 8));
    assert_eq!(g, Geometry { x: 0, y: 0, width: 20, height: 8 });
  }

  #[test]
  fn test_drag_keeps_grab_offset() {
    let mut w = Window::new(Geometry { x: 10, y: 5, width: 40, height: 20 });
    w.begin_drag(15, 6);
    w.motion(25, 10, screen());
    assert_eq!((w.geometry.x, w.geometry.y), (20, 9));
    assert!(w.release());
    assert!(!w.release());
  }

  #[test]
  fn test_drag_clamped_to_screen() {
    let mut w = Window::new(Geometry { x: 10, y: 5, width: 40, height: 20 });
    w.begin_drag(10, 5);
    w.motion(119, 39, screen());
    assert_eq!((w.geometry.x, w.geometry.y), (80, 20));
  }

  #[test]
  fn test_resize_from_grip() {
    let mut w = Window::new(Geometry { x: 10, y: 5, width: 40, height: 20 });
    w.begin_resize();
    w.motion(69, 29, screen());
    assert_eq!((w.geometry.width, w.geometry.height), (60, 25));
    w.motion(11, 6, screen());
    assert_eq!((w.geometry.width, w.geometry.height), (MIN_WIDTH, MIN_HEIGHT));
  }

  #[test]
  fn test_motion_without_gesture_is_ignored() {
    let mut w = Window::new(Geometry { x: 10, y: 5, width: 40, height: 20 });
    w.motion(50, 30, screen());
    assert_eq!(w.geometry.x, 10);
  }

  #[test]
  fn test_layout_hits_controls() {
    let layout = PanelLayout::compute(Rect::new(0, 0, 46, 22), 3, None);
    assert!(layout.big_timer);
    for (control, r) in &layout.buttons {
      assert_eq!(layout.hit(r.x, r.y), Hit::Control(*control));
    }
    let e = layout.edit_button;
    assert_eq!(layout.hit(e.x, e.y), Hit::Control(Control::EditTasks));
    assert_eq!(layout.hit(45, 21), Hit::Grip);
    assert_eq!(layout.hit(50, 5), Hit::Outside);
    assert_eq!(layout.hit(1, 1), Hit::Panel);
  }

  #[test]
  fn test_layout_hits_tasks() {
    let layout = PanelLayout::compute(Rect::new(0, 0, 46, 22), 3, None);
    let t = layout.tasks;
    assert_eq!(layout.hit(t.x, t.y), Hit::Task(0, true));
    assert_eq!(layout.hit(t.x + 10, t.y + 2), Hit::Task(2, false));
    assert_eq!(layout.hit(t.x, t.y + 3), Hit::Panel);
  }

  #[test]
  fn test_small_panel_uses_plain_timer() {
    let layout = PanelLayout::compute(Rect::new(0, 0, MIN_WIDTH, MIN_HEIGHT), 0, None);
    assert!(!layout.big_timer);
    assert_eq!(layout.timer.height, 1);
    assert!(layout.tasks.height > 0);
  }

  fn inside(r: Rect, bound: Rect) -> bool {
    r.area() == 0 || (r.x >= bound.x && r.y >= bound.y && r.right() <= bound.right() && r.bottom() <= bound.bottom())
  }

  #[test]
  fn test_tiny_panel_layout_stays_inside() {
    for (w, h) in [(20, 12), (60, 3), (12, 3), (3, 3), (1, 1)] {
      let outer = Rect::new(5, 2, w, h);
      let layout = PanelLayout::compute(outer, 4, Some(3));
      assert!(!layout.big_timer);
      assert!(inside(layout.timer, outer), "{:?}", layout.timer);
      for (_, r) in &layout.buttons {
        assert!(inside(*r, outer), "{}x{}: {:?}", w, h, r);
      }
      assert!(inside(layout.tasks, outer), "{}x{}: {:?}", w, h, layout.tasks);
      assert!(inside(layout.footer, outer), "{}x{}: {:?}", w, h, layout.footer);
      assert!(inside(layout.edit_button, outer), "{}x{}: {:?}", w, h, layout.edit_button);
      assert!(inside(layout.grip, outer));
      assert!(layout.visible_tasks.len() <= layout.tasks.height as usize);
    }
  }

  #[test]
  fn test_clipped_button_is_not_hit() {
    let layout = PanelLayout::compute(Rect::new(0, 0, 60, 3), 2, None);
    assert!(layout.buttons.iter().all(|(_, r)| r.area() == 0));
    assert_eq!(layout.footer.area(), 0);
    assert_eq!(layout.hit(30, 2), Hit::Panel);
    assert_eq!(layout.hit(59, 2), Hit::Grip);
  }

  #[test]
  fn test_clip() {
    let bound = Rect::new(2, 2, 10, 5);
    assert_eq!(clip(Rect::new(0, 0, 20, 20), bound), bound);
    assert_eq!(clip(Rect::new(8, 3, 10, 1), bound), Rect::new(8, 3, 4, 1));
    assert_eq!(clip(Rect::new(20, 3, 5, 1), bound).area(), 0);
    assert_eq!(clip(Rect::new(4, 9, 5, 1), bound).area(), 0);
  }

  #[test]
  fn test_visible_window_follows_selection() {
    assert_eq!(visible_window(None, 10, 4), 0..4);
    assert_eq!(visible_window(Some(2), 10, 4), 0..4);
    assert_eq!(visible_window(Some(6), 10, 4), 3..7);
    assert_eq!(visible_window(Some(1), 2, 4), 0..2);
    assert_eq!(visible_window(Some(1), 2, 0), 0..0);
  }
}
