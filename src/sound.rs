use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_SOUND_FILE: &str = "res/complete.wav";
pub const DEFAULT_PLAYER: &str = "aplay";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundConfig {
  pub enabled: bool,
  pub file: PathBuf,
  pub player: String,
}

impl Default for SoundConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      file: PathBuf::from(DEFAULT_SOUND_FILE),
      player: DEFAULT_PLAYER.to_string(),
    }
  }
}

/// Fire-and-forget completion sound.
///
/// Plays the configured asset with an external player. A missing asset, or a
/// player that can't be started, falls back to the terminal bell.
pub fn play_chime(config: &SoundConfig) {
  if !config.enabled {
    return;
  }
  if config.file.exists() {
    match spawn_player(&config.player, &config.file) {
      Ok(()) => return,
      Err(e) => warn!("Couldn't run '{}' for {}: {}", config.player, config.file.display(), e),
    }
  } else {
    debug!("Sound file {} not found, ringing the bell", config.file.display());
  }
  ring_bell();
}

fn spawn_player(player: &str, file: &Path) -> std::io::Result<()> {
  let mut child = Command::new(player)
    .arg(file)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()?;
  // Reap the player off the UI thread so it doesn't linger as a zombie
  std::thread::spawn(move || {
    if let Err(e) = child.wait() {
      log::error!("Sound player did not exit cleanly: {}", e);
    }
  });
  Ok(())
}

fn ring_bell() {
  let mut err = std::io::stderr();
  if let Err(e) = err.write_all(b"\x07").and_then(|_| err.flush()) {
    warn!("Couldn't ring terminal bell: {}", e);
  }
}
