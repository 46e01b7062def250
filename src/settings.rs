// `#` and `;` start comments anywhere on a line, so free text is percent-escaped

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};

use crate::colors::{Rgb, Rgba, DEFAULT_BACKGROUND, WHITE};
use crate::geometry::Geometry;
use crate::sound::SoundConfig;
use crate::timer::{DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};

pub const CONF_FILE_NAME: &str = "pomodesk.ini";
pub const CONF_PATH_ENV: &str = "POMODESK_CONFIG";

pub const DEFAULT_OPACITY: f32 = 0.5;
pub const MIN_OPACITY: f32 = 0.3;
pub const MAX_OPACITY: f32 = 1.0;

// Configuration validation constants
const MIN_TIME: u32 = 1;
const MAX_TIME: u32 = 3600;
const MAX_TASKS: usize = 500;

const SECTION: &str = "pomodesk";
const SOUND_SECTION: &str = "sound";
const TASKS_SECTION: &str = "tasks";

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub opacity: f32,
  pub background: Rgba,
  pub font: Rgb,
  pub geometry: Option<Geometry>,
  pub work_secs: u32,
  pub break_secs: u32,
  pub sound: SoundConfig,
  pub tasks: Vec<String>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      opacity: DEFAULT_OPACITY,
      background: DEFAULT_BACKGROUND,
      font: WHITE,
      geometry: None,
      work_secs: DEFAULT_WORK_SECS,
      break_secs: DEFAULT_BREAK_SECS,
      sound: SoundConfig::default(),
      tasks: Vec::new(),
    }
  }
}

/// Settings file location: `$POMODESK_CONFIG` or `pomodesk.ini` in the working directory.
pub fn config_path() -> PathBuf {
  std::env::var_os(CONF_PATH_ENV)
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from(CONF_FILE_NAME))
}

impl Settings {
  pub fn load(path: &Path) -> Settings {
    info!("Reading config from {}", path.display());
    if !path.exists() {
      info!("No config at {}, using defaults", path.display());
      return Settings::default();
    }
    let path_str = path.to_string_lossy().to_string();
    let inimap: IniMap = match ini!(safe path_str.as_str()) {
      Ok(map) => map,
      Err(error) => {
        warn!("Couldn't load config file '{}': {}, using defaults", path.display(), error);
        return Settings::default();
      }
    };
    for (key, value) in &inimap {
      debug!("{} / {:?}", key, value);
    }
    Settings::from_ini(&inimap)
  }

  fn from_ini(inimap: &IniMap) -> Settings {
    let mut settings = Settings::default();

    if let Some(section) = inimap.get(SECTION) {
      if let Some(val) = value(section, "opacity") {
        settings.opacity = parse_opacity(val);
      }
      if let Some(val) = value(section, "background") {
        settings.background = parse_or_default(Rgba::parse(val), "background", DEFAULT_BACKGROUND);
      }
      if let Some(val) = value(section, "font") {
        settings.font = parse_or_default(Rgb::parse(val), "font", WHITE);
      }
      if let Some(val) = value(section, "geometry") {
        settings.geometry = Geometry::parse(val)
          .map_err(|e| warn!("Ignoring saved geometry: {}", e))
          .ok();
      }
      if let Some(val) = value(section, "worktime") {
        settings.work_secs = parse_time_config(val, "worktime", DEFAULT_WORK_SECS);
      }
      if let Some(val) = value(section, "breaktime") {
        settings.break_secs = parse_time_config(val, "breaktime", DEFAULT_BREAK_SECS);
      }
    }

    if let Some(section) = inimap.get(SOUND_SECTION) {
      if let Some(val) = value(section, "enabled") {
        settings.sound.enabled = match val.to_ascii_lowercase().as_str() {
          "true" | "yes" | "on" | "1" => true,
          "false" | "no" | "off" | "0" => false,
          other => {
            warn!("Config value 'enabled' = '{}' is not a boolean, keeping sound on", other);
            true
          }
        };
      }
      if let Some(val) = value(section, "file") {
        settings.sound.file = PathBuf::from(unescape(val));
      }
      if let Some(val) = value(section, "player") {
        settings.sound.player = unescape(val);
      }
    }

    if let Some(section) = inimap.get(TASKS_SECTION) {
      settings.tasks = parse_tasks(section);
      info!("Loaded {} tasks", settings.tasks.len());
    }

    settings
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    fs::write(path, self.to_ini())
      .wrap_err_with(|| format!("writing settings to {}", path.display()))?;
    debug!("Settings saved to {}", path.display());
    Ok(())
  }

  pub fn to_ini(&self) -> String {
    let mut out = format!("[{}]\n", SECTION);
    out += &format!("opacity={}\n", (self.opacity * 100.0).round() / 100.0);
    out += &format!("background={}\n", self.background);
    out += &format!("font={}, {}, {}\n", self.font.r, self.font.g, self.font.b);
    if let Some(g) = self.geometry {
      out += &format!("geometry={}\n", g);
    }
    out += &format!("worktime={}\n", format_hms(self.work_secs));
    out += &format!("breaktime={}\n", format_hms(self.break_secs));

    out += &format!("\n[{}]\n", SOUND_SECTION);
    out += &format!("enabled={}\n", self.sound.enabled);
    out += &format!("file={}\n", escape(&self.sound.file.to_string_lossy()));
    out += &format!("player={}\n", escape(&self.sound.player));

    out += &format!("\n[{}]\n", TASKS_SECTION);
    out += &format!("count={}\n", self.tasks.len());
    for (i, task) in self.tasks.iter().enumerate() {
      out += &format!("task{}={}\n", i + 1, escape(task));
    }
    out
  }
}

fn value<'a>(section: &'a HashMap<String, Option<String>>, key: &str) -> Option<&'a str> {
  section
    .get(key)
    .and_then(|v| v.as_deref())
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

fn parse_or_default<T: Copy>(parsed: Result<T, String>, config_name: &str, default: T) -> T {
  parsed.unwrap_or_else(|e| {
    warn!("Invalid config value '{}': {}, using default", config_name, e);
    default
  })
}

fn parse_opacity(value: &str) -> f32 {
  match value.parse::<f32>() {
    Ok(o) if (MIN_OPACITY..=MAX_OPACITY).contains(&o) => o,
    Ok(o) => {
      warn!("Config value 'opacity' = {} is out of valid range [{}, {}], using default {}",
            o, MIN_OPACITY, MAX_OPACITY, DEFAULT_OPACITY);
      DEFAULT_OPACITY
    }
    Err(e) => {
      warn!("Failed to parse config value 'opacity' = '{}': {}, using default {}", value, e, DEFAULT_OPACITY);
      DEFAULT_OPACITY
    }
  }
}

/// Parse and validate a duration, given as `hh:mm:ss`, `mm:ss` or whole minutes.
fn parse_time_config(value: &str, config_name: &str, default: u32) -> u32 {
  match parse_hms(value) {
    Some(secs) if (MIN_TIME..=MAX_TIME).contains(&secs) => secs,
    Some(secs) => {
      warn!("Config value '{}' = {}s is out of valid range [{}, {}], using default {}",
            config_name, secs, MIN_TIME, MAX_TIME, default);
      default
    }
    None => {
      warn!("Failed to parse config value '{}' = '{}', using default {}", config_name, value, default);
      default
    }
  }
}

fn parse_hms(value: &str) -> Option<u32> {
  let parts = value
    .split(':')
    .map(|p| p.trim().parse::<u32>().ok())
    .collect::<Option<Vec<u32>>>()?;
  match parts.as_slice() {
    [m] => m.checked_mul(60),
    [m, s] if *s < 60 => m.checked_mul(60)?.checked_add(*s),
    [h, m, s] if *m < 60 && *s < 60 => h.checked_mul(3600)?.checked_add(m * 60 + s),
    _ => None,
  }
}

fn format_hms(secs: u32) -> String {
  format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

fn parse_tasks(section: &HashMap<String, Option<String>>) -> Vec<String> {
  let count = match value(section, "count").map(|c| c.parse::<usize>()) {
    Some(Ok(c)) if c <= MAX_TASKS => c,
    Some(Ok(c)) => {
      warn!("Task count {} exceeds {}, truncating", c, MAX_TASKS);
      MAX_TASKS
    }
    Some(Err(e)) => {
      warn!("Invalid task count: {}, ignoring saved tasks", e);
      return Vec::new();
    }
    None => 0,
  };
  (1..=count)
    .filter_map(|i| value(section, &format!("task{}", i)).map(unescape))
    .collect()
}

fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '%' => out.push_str("%25"),
      '#' => out.push_str("%23"),
      ';' => out.push_str("%3B"),
      _ => out.push(c),
    }
  }
  out
}

fn unescape(text: &str) -> String {
  text.replace("%23", "#").replace("%3B", ";").replace("%25", "%")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("nope.ini"));
    assert_eq!(settings, Settings::default());
  }

  #[test]
  fn test_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomodesk.ini");
    let settings = Settings {
      opacity: 0.8,
      background: Rgba { rgb: Rgb { r: 10, g: 20, b: 30 }, alpha: 0.25 },
      font: Rgb { r: 255, g: 200, b: 0 },
      geometry: Some(Geometry { x: 4, y: 2, width: 50, height: 24 }),
      work_secs: 50 * 60,
      break_secs: 10 * 60,
      sound: SoundConfig { enabled: false, file: PathBuf::from("sounds/ding.wav"), player: "paplay".into() },
      tasks: vec!["write report".into(), "call bob".into(), "call bob".into()],
    };
    settings.save(&path).unwrap();
    assert_eq!(Settings::load(&path), settings);
  }

  #[test]
  fn test_round_trip_escapes_comment_chars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomodesk.ini");
    let settings = Settings {
      tasks: vec!["fix #12; then 100% done".into(), "key=value: ok".into()],
      ..Settings::default()
    };
    settings.save(&path).unwrap();
    assert_eq!(Settings::load(&path).tasks, settings.tasks);
  }

  #[test]
  fn test_malformed_values_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomodesk.ini");
    fs::write(
      &path,
      "[pomodesk]\nopacity=7\nbackground=blue\nfont=1, 2\ngeometry=x\nworktime=99:00:00\nbreaktime=soon\n",
    )
    .unwrap();
    let settings = Settings::load(&path);
    assert_eq!(settings, Settings::default());
  }

  #[test]
  fn test_tasks_count_limits_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomodesk.ini");
    fs::write(&path, "[tasks]\ncount=1\ntask1=one\ntask2=two\n").unwrap();
    assert_eq!(Settings::load(&path).tasks, vec!["one".to_string()]);
  }

  #[test]
  fn test_to_ini_layout() {
    let ini = Settings::default().to_ini();
    assert!(ini.contains("opacity=0.5\n"));
    assert!(ini.contains("background=0, 0, 0, 0.5\n"));
    assert!(ini.contains("font=255, 255, 255\n"));
    assert!(ini.contains("worktime=00:25:00\n"));
    assert!(ini.contains("breaktime=00:05:00\n"));
    assert!(!ini.contains("geometry"));
  }

  #[test]
  fn test_parse_time_config() {
    assert_eq!(parse_time_config("00:25:00", "t", 1), 1500);
    assert_eq!(parse_time_config("25", "t", 1), 1500);
    assert_eq!(parse_time_config("01:30", "t", 1), 90);
    assert_eq!(parse_time_config("01:00:00", "t", 1), 3600);
    assert_eq!(parse_time_config("01:00:01", "t", 7), 7);
    assert_eq!(parse_time_config("00:00:00", "t", 7), 7);
    assert_eq!(parse_time_config("00:75:00", "t", 7), 7);
    assert_eq!(parse_time_config("abc", "t", 7), 7);
    assert_eq!(parse_time_config("99999999:00", "t", 7), 7);
    assert_eq!(parse_time_config("2000000:00:00", "t", 7), 7);
    assert_eq!(parse_time_config("4294967295:59", "t", 7), 7);
    assert_eq!(parse_time_config("1193047:00:00", "t", 7), 7);
  }

  #[test]
  fn test_parse_opacity() {
    assert_eq!(parse_opacity("0.3"), 0.3);
    assert_eq!(parse_opacity("1"), 1.0);
    assert_eq!(parse_opacity("0.1"), DEFAULT_OPACITY);
    assert_eq!(parse_opacity("half"), DEFAULT_OPACITY);
  }

  #[test]
  fn test_escape_round_trip() {
    let text = "a#b;c%d%23";
    assert_eq!(unescape(&escape(text)), text);
    assert!(!escape(text).contains('#'));
  }
}
