// Alpha and window opacity are both rendered by blending towards black

use std::fmt;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
  pub rgb: Rgb,
  pub alpha: f32,
}

pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
pub const DEFAULT_BACKGROUND: Rgba = Rgba { rgb: Rgb { r: 0, g: 0, b: 0 }, alpha: 0.5 };

impl Rgb {
  pub fn parse(text: &str) -> Result<Rgb, String> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
      if hex.len() != 6 {
        return Err(format!("expected #rrggbb, got '{}'", text));
      }
      let bytes = parse_hex(hex)?;
      return Ok(Rgb { r: bytes[0], g: bytes[1], b: bytes[2] });
    }
    let parts = split_components(text);
    if parts.len() != 3 {
      return Err(format!("expected 'r, g, b', got '{}'", text));
    }
    Ok(Rgb { r: parse_channel(parts[0])?, g: parse_channel(parts[1])?, b: parse_channel(parts[2])? })
  }

  /// Scales every channel by `factor` (0..=1), i.e. blends towards black.
  pub fn shade(&self, factor: f32) -> Rgb {
    let f = factor.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * f).round() as u8;
    Rgb { r: scale(self.r), g: scale(self.g), b: scale(self.b) }
  }

  pub fn to_color(self) -> Color {
    Color::Rgb(self.r, self.g, self.b)
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
  }
}

impl Rgba {
  pub fn parse(text: &str) -> Result<Rgba, String> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
      return match hex.len() {
        6 => Ok(Rgba { rgb: Rgb::parse(text)?, alpha: 1.0 }),
        8 => {
          let bytes = parse_hex(hex)?;
          Ok(Rgba {
            rgb: Rgb { r: bytes[0], g: bytes[1], b: bytes[2] },
            alpha: bytes[3] as f32 / 255.0,
          })
        }
        _ => Err(format!("expected #rrggbb or #rrggbbaa, got '{}'", text)),
      };
    }
    let parts = split_components(text);
    let alpha = match parts.len() {
      3 => 1.0,
      4 => parse_alpha(parts[3])?,
      _ => return Err(format!("expected 'r, g, b[, a]', got '{}'", text)),
    };
    Ok(Rgba {
      rgb: Rgb { r: parse_channel(parts[0])?, g: parse_channel(parts[1])?, b: parse_channel(parts[2])? },
      alpha,
    })
  }

  /// Colour actually painted for this background at the given window opacity.
  pub fn blended(&self, opacity: f32) -> Rgb {
    self.rgb.shade(self.alpha * opacity)
  }
}

impl fmt::Display for Rgba {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}, {}, {}, {}", self.rgb.r, self.rgb.g, self.rgb.b, self.alpha)
  }
}

fn split_components(text: &str) -> Vec<&str> {
  text.split(',').map(str::trim).collect()
}

fn parse_channel(text: &str) -> Result<u8, String> {
  text.parse::<u8>().map_err(|_| format!("colour channel '{}' is not in 0..=255", text))
}

fn parse_alpha(text: &str) -> Result<f32, String> {
  match text.parse::<f32>() {
    Ok(a) if (0.0..=1.0).contains(&a) => Ok(a),
    _ => Err(format!("alpha '{}' is not in 0..=1", text)),
  }
}

fn parse_hex(hex: &str) -> Result<Vec<u8>, String> {
  if !hex.is_ascii() {
    return Err(format!("'{}' is not hex", hex));
  }
  (0..hex.len())
    .step_by(2)
    .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("'{}' is not hex", hex)))
    .collect()
}
