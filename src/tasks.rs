/// Ordered checklist. Completing an entry removes it and bumps the counter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskList {
  items: Vec<String>,
  completed: u32,
}

impl TaskList {
  pub fn new(items: Vec<String>) -> Self {
    Self { items, completed: 0 }
  }

  pub fn items(&self) -> &[String] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn completed(&self) -> u32 {
    self.completed
  }

  /// Returns false when the text is blank and nothing was added.
  pub fn add(&mut self, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
      return false;
    }
    self.items.push(text.to_string());
    info!("Added task #{}: {}", self.items.len(), text);
    true
  }

  /// Replaces the whole list with one task per non-blank line.
  pub fn replace_all(&mut self, text: &str) {
    self.items = text
      .lines()
      .map(|l| l.trim().to_string())
      .filter(|l| !l.is_empty())
      .collect();
    info!("Task list replaced, {} tasks", self.items.len());
  }

  pub fn complete(&mut self, index: usize) -> Option<String> {
    if index >= self.items.len() {
      debug!("Ignoring completion of missing task index {}", index);
      return None;
    }
    let done = self.items.remove(index);
    self.completed += 1;
    info!("Completed task '{}' ({} done)", done, self.completed);
    Some(done)
  }

  pub fn as_text(&self) -> String {
    self.items.join("\n")
  }

  pub fn numbered(&self) -> impl Iterator<Item = String> + '_ {
    self.items.iter().enumerate().map(|(i, t)| format!("{}. {}", i + 1, t))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn list(items: &[&str]) -> TaskList {
    TaskList::new(items.iter().map(|s| s.to_string()).collect())
  }

  #[test]
  fn test_add_appends() {
    let mut tasks = list(&["write report"]);
    assert!(tasks.add("call bob"));
    assert_eq!(tasks.items(), ["write report", "call bob"]);
  }

  #[test]
  fn test_add_blank_is_ignored() {
    let mut tasks = TaskList::default();
    assert!(!tasks.add("   "));
    assert!(tasks.is_empty());
  }

  #[test]
  fn test_duplicates_allowed() {
    let mut tasks = TaskList::default();
    tasks.add("email");
    tasks.add("email");
    assert_eq!(tasks.len(), 2);
  }

  #[test]
  fn test_complete_removes_exactly_that_entry() {
    let mut tasks = list(&["a", "b", "a"]);
    assert_eq!(tasks.complete(2), Some("a".to_string()));
    assert_eq!(tasks.items(), ["a", "b"]);
    assert_eq!(tasks.completed(), 1);
  }

  #[test]
  fn test_complete_out_of_range() {
    let mut tasks = list(&["a"]);
    assert_eq!(tasks.complete(3), None);
    assert_eq!(tasks.completed(), 0);
    assert_eq!(tasks.len(), 1);
  }

  #[test]
  fn test_replace_all_drops_blank_lines() {
    let mut tasks = list(&["old"]);
    tasks.replace_all("first\n\n  second  \n");
    assert_eq!(tasks.items(), ["first", "second"]);
    assert_eq!(tasks.as_text(), "first\nsecond");
  }

  #[test]
  fn test_numbered() {
    let tasks = list(&["x", "y"]);
    let lines: Vec<String> = tasks.numbered().collect();
    assert_eq!(lines, ["1. x", "2. y"]);
  }
}
