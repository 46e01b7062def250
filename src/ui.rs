use ratatui::{prelude::*, widgets::*};
use tui_big_text::BigText;

use crate::app::App;
use crate::colors::Rgb;
use crate::dialog::{Dialog, MenuItem, MAX_OPACITY_PERCENT, MIN_OPACITY_PERCENT};
use crate::geometry::{clip, Control, PanelLayout, MIN_HEIGHT, MIN_WIDTH};
use crate::timer::format_mmss;
use crate::APP_VERSION;

const DIALOG_WIDTH: u16 = 44;

/// Colours actually painted, after window opacity is applied.
struct Palette {
  fg: Color,
  bg: Color,
  button_bg: Color,
}

impl Palette {
  fn of(app: &App) -> Palette {
    let settings = app.settings();
    let bg = settings.background.blended(settings.opacity);
    Palette {
      fg: settings.font.shade(settings.opacity.max(0.5)).to_color(),
      bg: bg.to_color(),
      button_bg: lighten(bg).to_color(),
    }
  }

  fn base(&self) -> Style {
    Style::new().fg(self.fg).bg(self.bg)
  }
}

fn lighten(c: Rgb) -> Rgb {
  let up = |v: u8| v.saturating_add(40);
  Rgb { r: up(c.r), g: up(c.g), b: up(c.b) }
}

pub fn render(app: &App, f: &mut Frame) {
  let screen = f.size();
  if screen.width < MIN_WIDTH || screen.height < MIN_HEIGHT {
    let notice = vec![Line::from("too small"), Line::from(format!("need {}x{}", MIN_WIDTH, MIN_HEIGHT).dim())];
    f.render_widget(Paragraph::new(notice).alignment(Alignment::Center), screen);
    return;
  }
  f.render_widget(help_paragraph(app), Rect::new(0, screen.height.saturating_sub(1), screen.width, 1u16.min(screen.height)));

  let layout = app.layout();
  let palette = Palette::of(app);
  render_panel(app, &layout, &palette, f);

  if let Some(dialog) = app.dialog() {
    render_dialog(dialog, &palette, f);
  }
}

fn render_panel(app: &App, layout: &PanelLayout, palette: &Palette, f: &mut Frame) {
  let timer = app.timer();
  let title = format!(" {} · {} ", APP_VERSION, timer.mode().label());
  let block = Block::default()
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .title(title)
    .style(palette.base());
  render_clipped(f, Clear, layout.outer);
  render_clipped(f, block, layout.outer);

  let mut timer_style = palette.base();
  if timer.is_running() && !timer.is_ticking() {
    timer_style = timer_style.add_modifier(Modifier::DIM);
  }
  if layout.big_timer {
    render_clipped(f, timer_big_text(timer.format(), timer_style), centered(layout.timer, 40));
  } else {
    let text = Paragraph::new(timer.format()).style(timer_style.add_modifier(Modifier::BOLD)).alignment(Alignment::Center);
    render_clipped(f, text, layout.timer);
  }

  for (control, area) in &layout.buttons {
    let label = match control {
      Control::PlayPause if timer.is_ticking() => "pause",
      Control::PlayPause => "start",
      Control::Reset => "reset",
      Control::Break if timer.mode().is_break() => "work ",
      Control::Break => "break",
      Control::Menu => "menu ",
      Control::EditTasks => "edit ",
    };
    render_clipped(f, button(label, palette), *area);
  }

  let rows: Vec<Line> = app
    .tasks()
    .numbered()
    .enumerate()
    .skip(layout.visible_tasks.start)
    .take(layout.visible_tasks.len())
    .map(|(i, text)| {
      let mut style = palette.base();
      if app.selected() == Some(i) {
        style = style.add_modifier(Modifier::REVERSED);
      }
      Line::from(vec![Span::styled("[ ] ", palette.base()), Span::styled(text, style)])
    })
    .collect();
  render_clipped(f, Paragraph::new(rows).style(palette.base()), layout.tasks);

  let completed = format!("Tasks Completed: {}", app.tasks().completed());
  render_clipped(f, Paragraph::new(completed).style(palette.base()), layout.footer);
  render_clipped(f, button("edit ", palette), layout.edit_button);
  render_clipped(f, Paragraph::new("◢").style(palette.base()), layout.grip);
}

// The panel can lag one frame behind a terminal resize
fn render_clipped<W: Widget>(f: &mut Frame, widget: W, area: Rect) {
  let area = clip(area, f.size());
  if area.width > 0 && area.height > 0 {
    f.render_widget(widget, area);
  }
}

fn timer_big_text(duration: String, style: Style) -> BigText<'static> {
  let lines = vec![duration.into()];
  tui_big_text::BigTextBuilder::default()
    .lines(lines)
    .style(style)
    .build()
    .expect("BigText builder has all required fields set")
}

fn button<'a>(label: &'a str, palette: &Palette) -> Paragraph<'a> {
  Paragraph::new(label)
    .style(Style::new().fg(palette.fg).bg(palette.button_bg).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
}

fn help_paragraph(app: &App) -> Paragraph<'_> {
  let play_action = if app.timer().is_ticking() { "pause" } else { "start" };
  let help_text = Line::from(vec![
    "space ".into(), play_action.dim(), " : r ".into(), "reset".dim(), " : b ".into(), "break".dim(),
    " : m ".into(), "menu".dim(), " : a ".into(), "add".dim(), " : e ".into(), "edit".dim(),
    " : ↑↓ x ".into(), "done".dim(), " : q ".into(), "quit".dim(),
  ]);
  Paragraph::new(help_text).gray()
}

fn render_dialog(dialog: &Dialog, palette: &Palette, f: &mut Frame) {
  let screen = f.size();
  let body: Vec<Line> = match dialog {
    Dialog::Menu { selected } => MenuItem::all()
      .iter()
      .enumerate()
      .map(|(i, item)| {
        if i == *selected {
          Line::from(Span::styled(format!("> {}", item.label()), Style::new().add_modifier(Modifier::REVERSED)))
        } else {
          Line::from(format!("  {}", item.label()))
        }
      })
      .collect(),
    Dialog::AddTask { input } => vec![
      Line::from(format!("{}_", input)),
      Line::from(""),
      Line::from("enter: ok  esc: cancel".dim()),
    ],
    Dialog::EditTasks { editor } => {
      let mut lines: Vec<Line> = editor
        .lines
        .iter()
        .enumerate()
        .map(|(row, text)| {
          if row == editor.row {
            let at = text.char_indices().nth(editor.col).map(|(i, _)| i).unwrap_or(text.len());
            let (before, after) = text.split_at(at);
            Line::from(vec![before.to_string().into(), "│".bold(), after.to_string().into()])
          } else {
            Line::from(text.clone())
          }
        })
        .collect();
      lines.push(Line::from(""));
      lines.push(Line::from("one task per line  ctrl+s: save  esc: cancel".dim()));
      lines
    }
    Dialog::Minutes { value, .. } => vec![
      Line::from("Minutes:"),
      Line::from(format!("◀ {:>2} min ▶   ({})", value, format_mmss(value * 60))),
      Line::from(""),
      Line::from("↑↓: adjust  enter: set  esc: cancel".dim()),
    ],
    Dialog::Color { input, error, .. } => {
      let mut lines = vec![
        Line::from(format!("{}_", input)),
        Line::from("#rrggbb or r, g, b[, a]".dim()),
      ];
      if let Some(e) = error {
        lines.push(Line::from(Span::styled(e.clone(), Style::new().red())));
      }
      lines
    }
    Dialog::Opacity { percent } => {
      let span = (MAX_OPACITY_PERCENT - MIN_OPACITY_PERCENT) as usize;
      let filled = (percent - MIN_OPACITY_PERCENT) as usize * 30 / span;
      vec![
        Line::from("Opacity:"),
        Line::from(format!("[{}{}] {}%", "█".repeat(filled), " ".repeat(30 - filled), percent)),
        Line::from(""),
        Line::from("←→: adjust  enter/esc: close".dim()),
      ]
    }
  };

  let height = (body.len() as u16 + 2).min(screen.height);
  let area = centered_rect(screen, DIALOG_WIDTH.min(screen.width), height);
  let block = Block::default()
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .title(format!(" {} ", dialog.title()))
    .style(palette.base());
  f.render_widget(Clear, area);
  f.render_widget(Paragraph::new(body).block(block).wrap(Wrap { trim: false }), area);
}

fn centered(area: Rect, width: u16) -> Rect {
  let width = width.min(area.width);
  Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

fn centered_rect(screen: Rect, width: u16, height: u16) -> Rect {
  Rect::new(
    screen.x + (screen.width - width) / 2,
    screen.y + (screen.height - height) / 2,
    width,
    height,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Geometry;
  use crate::settings::Settings;
  use ratatui::backend::TestBackend;

  fn draw(app: &App) -> String {
    draw_sized(app, 80, 30)
  }

  fn draw_sized(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| render(app, f)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer.content.iter().map(|c| c.symbol.clone()).collect()
  }

  fn app() -> App {
    let settings = Settings {
      tasks: vec!["write report".into(), "call bob".into()],
      geometry: Some(Geometry { x: 2, y: 1, width: 46, height: 22 }),
      ..Settings::default()
    };
    App::new(settings, Rect::new(0, 0, 80, 30))
  }

  #[test]
  fn test_renders_tasks_and_counter() {
    let screen = draw(&app());
    assert!(screen.contains("1. write report"));
    assert!(screen.contains("2. call bob"));
    assert!(screen.contains("Tasks Completed: 0"));
    assert!(screen.contains("start"));
  }

  #[test]
  fn test_small_panel_renders_plain_timer() {
    let settings = Settings {
      geometry: Some(Geometry { x: 0, y: 0, width: 30, height: 10 }),
      ..Settings::default()
    };
    let screen = draw(&App::new(settings, Rect::new(0, 0, 80, 30)));
    assert!(screen.contains("25:00"));
  }

  #[test]
  fn test_tiny_terminal_shows_notice() {
    for (w, h) in [(20, 12), (60, 3), (1, 1)] {
      let app = App::new(Settings::default(), Rect::new(0, 0, w, h));
      let screen = draw_sized(&app, w, h);
      if w >= 9 {
        assert!(screen.contains("too small"), "{}x{}: {}", w, h, screen);
      }
      assert!(!screen.contains("Tasks Completed"));
    }
  }

  #[test]
  fn test_minimum_terminal_renders_panel() {
    let settings = Settings { tasks: vec!["a".into(), "b".into(), "c".into()], ..Settings::default() };
    let app = App::new(settings, Rect::new(0, 0, MIN_WIDTH, MIN_HEIGHT));
    let screen = draw_sized(&app, MIN_WIDTH, MIN_HEIGHT);
    assert!(screen.contains("25:00"));
    assert!(!screen.contains("too small"));
  }

  #[test]
  fn test_panel_larger_than_frame_is_clipped() {
    // laid out for 80x30, drawn before the resize event arrives
    let screen = draw_sized(&app(), 40, 12);
    assert!(screen.contains("1. write report"));
    assert!(!screen.contains("Tasks Completed"));
  }

  #[test]
  fn test_lighten_saturates() {
    assert_eq!(lighten(Rgb { r: 250, g: 0, b: 10 }), Rgb { r: 255, g: 40, b: 50 });
  }
}
