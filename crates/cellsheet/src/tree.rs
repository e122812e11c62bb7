//! Heading-scoped operations over the flat settings sequence.
//!
//! Settings are stored flat. A `heading` owns the contiguous run of
//! non-heading settings after it, up to the next heading; a heading plus
//! that run is its *chunk*. A non-heading setting's chunk is itself.
//! Deleting or moving a heading acts on its whole chunk.
//!
//! [`SettingsConfig::sections`] derives a read-only grouping on demand.

use std::ops::Range;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{Setting, SettingType, SettingsConfig};

/// Direction of a one-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A heading and the settings it owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section<'a> {
    /// `None` for settings that precede the first heading.
    pub heading: Option<&'a Setting>,
    pub children: &'a [Setting],
}

/// Index range covered by the setting at `index` and, for a heading, its children.
///
/// Returns `None` when `index` is out of bounds.
pub fn chunk_range(settings: &[Setting], index: usize) -> Option<Range<usize>> {
    let setting = settings.get(index)?;
    if setting.is_heading() {
        Some(index..next_heading(settings, index + 1))
    } else {
        Some(index..index + 1)
    }
}

/// First heading index at or after `from`, or the length.
fn next_heading(settings: &[Setting], from: usize) -> usize {
    settings[from.min(settings.len())..]
        .iter()
        .position(Setting::is_heading)
        .map_or(settings.len(), |offset| from + offset)
}

/// Start of the group containing `index`: its heading, or 0 for the leading run.
fn group_start(settings: &[Setting], index: usize) -> usize {
    settings[..=index]
        .iter()
        .rposition(Setting::is_heading)
        .unwrap_or(0)
}

impl SettingsConfig {
    /// Children of the heading at `index`. Empty for non-headings.
    pub fn child_range(&self, index: usize) -> Range<usize> {
        match chunk_range(&self.settings, index) {
            Some(range) => range.start + 1..range.end,
            None => index..index,
        }
    }

    /// Removes the setting at `index` together with its children, returning them.
    pub fn delete_setting(&mut self, index: usize) -> Vec<Setting> {
        match chunk_range(&self.settings, index) {
            Some(range) => self.settings.drain(range).collect(),
            None => Vec::new(),
        }
    }

    /// Moves the setting at `index` one step. Returns false when nothing moved.
    ///
    /// A non-heading swaps with its neighbour. A heading moves as a chunk past
    /// the adjacent group.
    pub fn move_setting_by(&mut self, index: usize, direction: Direction) -> bool {
        let Some(chunk) = chunk_range(&self.settings, index) else {
            return false;
        };

        if !self.settings[index].is_heading() {
            let target = match direction {
                Direction::Up if index > 0 => index - 1,
                Direction::Down if index + 1 < self.settings.len() => index + 1,
                _ => return false,
            };
            self.settings.swap(index, target);
            return true;
        }

        match direction {
            Direction::Up => {
                if index == 0 {
                    return false;
                }
                let start = group_start(&self.settings, index - 1);
                self.settings[start..chunk.end].rotate_left(index - start);
            }
            Direction::Down => {
                if chunk.end == self.settings.len() {
                    return false;
                }
                let next_end = next_heading(&self.settings, chunk.end + 1);
                self.settings[index..next_end].rotate_left(chunk.len());
            }
        }
        true
    }

    /// Moves the chunk at `from` so that it lands before the setting that is at
    /// index `to` now (`to == len` appends).
    ///
    /// Rejected, returning false, when `to` falls inside the chunk's own span
    /// or either index is out of bounds.
    pub fn move_setting_to(&mut self, from: usize, to: usize) -> bool {
        let Some(chunk) = chunk_range(&self.settings, from) else {
            return false;
        };
        if to > self.settings.len() || (chunk.start..=chunk.end).contains(&to) {
            return false;
        }

        let len = chunk.len();
        let moved: Vec<Setting> = self.settings.drain(chunk.clone()).collect();
        let at = if to > chunk.end { to - len } else { to };
        self.settings.splice(at..at, moved);
        true
    }

    /// Appends a new setting of type `ty` with a generated, unused id.
    pub fn add_setting(&mut self, ty: SettingType) -> &mut Setting {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let base = format!("new-{}-{}", ty, millis);

        let mut id = base.clone();
        let mut n = 2;
        while self.find_setting(&id).is_some() {
            id = format!("{}-{}", base, n);
            n += 1;
        }

        let index = self.settings.len();
        self.settings.push(Setting::new(ty, id));
        &mut self.settings[index]
    }

    /// Groups the settings by heading.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let settings = self.settings.as_slice();
        let mut sections = Vec::new();

        let first = next_heading(settings, 0);
        if first > 0 {
            sections.push(Section {
                heading: None,
                children: &settings[..first],
            });
        }

        let mut index = first;
        while index < settings.len() {
            let end = next_heading(settings, index + 1);
            sections.push(Section {
                heading: Some(&settings[index]),
                children: &settings[index + 1..end],
            });
            index = end;
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str) -> Setting {
        Setting::new(SettingType::Heading, id)
    }

    fn item(id: &str) -> Setting {
        Setting::new(SettingType::ClassToggle, id)
    }

    fn config(settings: Vec<Setting>) -> SettingsConfig {
        let mut config = SettingsConfig::new("t");
        config.settings = settings;
        config
    }

    fn ids(config: &SettingsConfig) -> Vec<&str> {
        config.settings.iter().map(|s| s.id.as_str()).collect()
    }

    /// `a, H1, b, c, H2, d`
    fn sample() -> SettingsConfig {
        config(vec![
            item("a"),
            heading("H1"),
            item("b"),
            item("c"),
            heading("H2"),
            item("d"),
        ])
    }

    // =========================================================================
    // Chunks
    // =========================================================================

    #[test]
    fn test_chunk_range() {
        let config = sample();
        assert_eq!(chunk_range(&config.settings, 0), Some(0..1));
        assert_eq!(chunk_range(&config.settings, 1), Some(1..4));
        assert_eq!(chunk_range(&config.settings, 4), Some(4..6));
        assert_eq!(chunk_range(&config.settings, 6), None);
    }

    #[test]
    fn test_child_range() {
        let config = sample();
        assert_eq!(config.child_range(1), 2..4);
        assert_eq!(config.child_range(2), 3..3);
        assert_eq!(config.child_range(9), 9..9);
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[test]
    fn test_delete_heading_takes_children() {
        let mut config = sample();
        let removed = config.delete_setting(1);
        assert_eq!(removed.len(), 3);
        assert_eq!(ids(&config), vec!["a", "H2", "d"]);
    }

    #[test]
    fn test_delete_plain_setting() {
        let mut config = sample();
        let removed = config.delete_setting(2);
        assert_eq!(removed.len(), 1);
        assert_eq!(ids(&config), vec!["a", "H1", "c", "H2", "d"]);
    }

    #[test]
    fn test_delete_last_heading() {
        let mut config = sample();
        config.delete_setting(4);
        assert_eq!(ids(&config), vec!["a", "H1", "b", "c"]);
    }

    #[test]
    fn test_delete_out_of_bounds() {
        let mut config = sample();
        assert!(config.delete_setting(42).is_empty());
        assert_eq!(config.settings.len(), 6);
    }

    // =========================================================================
    // Move by one
    // =========================================================================

    #[test]
    fn test_move_plain_swaps() {
        let mut config = sample();
        assert!(config.move_setting_by(3, Direction::Up));
        assert_eq!(ids(&config), vec!["a", "H1", "c", "b", "H2", "d"]);
        assert!(config.move_setting_by(3, Direction::Down));
        assert_eq!(ids(&config), vec!["a", "H1", "c", "H2", "b", "d"]);
    }

    #[test]
    fn test_move_at_edges_is_rejected() {
        let mut config = sample();
        assert!(!config.move_setting_by(0, Direction::Up));
        assert!(!config.move_setting_by(5, Direction::Down));
        assert!(!config.move_setting_by(4, Direction::Down));
        assert!(!config.move_setting_by(17, Direction::Up));
        assert_eq!(ids(&sample()), ids(&config));
    }

    #[test]
    fn test_move_heading_down_as_chunk() {
        let mut config = sample();
        assert!(config.move_setting_by(1, Direction::Down));
        assert_eq!(ids(&config), vec!["a", "H2", "d", "H1", "b", "c"]);
    }

    #[test]
    fn test_move_heading_up_as_chunk() {
        let mut config = sample();
        assert!(config.move_setting_by(4, Direction::Up));
        assert_eq!(ids(&config), vec!["a", "H2", "d", "H1", "b", "c"]);
    }

    #[test]
    fn test_move_heading_up_past_leading_run() {
        let mut config = sample();
        assert!(config.move_setting_by(1, Direction::Up));
        assert_eq!(ids(&config), vec!["H1", "b", "c", "a", "H2", "d"]);
    }

    // =========================================================================
    // Move to position
    // =========================================================================

    #[test]
    fn test_move_to_front() {
        let mut config = sample();
        assert!(config.move_setting_to(4, 0));
        assert_eq!(ids(&config), vec!["H2", "d", "a", "H1", "b", "c"]);
    }

    #[test]
    fn test_move_to_end() {
        let mut config = sample();
        assert!(config.move_setting_to(1, 6));
        assert_eq!(ids(&config), vec!["a", "H2", "d", "H1", "b", "c"]);
    }

    #[test]
    fn test_move_plain_to_position() {
        let mut config = sample();
        assert!(config.move_setting_to(0, 3));
        assert_eq!(ids(&config), vec!["H1", "b", "a", "c", "H2", "d"]);
    }

    #[test]
    fn test_move_into_own_chunk_is_rejected() {
        let mut config = sample();
        for to in 1..=4 {
            assert!(!config.move_setting_to(1, to), "to = {}", to);
        }
        assert!(!config.move_setting_to(1, 7));
        assert!(!config.move_setting_to(9, 0));
        assert_eq!(ids(&config), ids(&sample()));
    }

    // =========================================================================
    // Add and sections
    // =========================================================================

    #[test]
    fn test_add_setting_generates_unique_ids() {
        let mut config = SettingsConfig::new("t");
        let first = config.add_setting(SettingType::VariableColor).id.clone();
        let second = config.add_setting(SettingType::VariableColor).id.clone();
        assert!(first.starts_with("new-variable-color-"));
        assert_ne!(first, second);
        assert_eq!(config.settings[1].title, "New Setting");
    }

    #[test]
    fn test_sections() {
        let config = sample();
        let sections = config.sections();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].heading.is_none());
        assert_eq!(sections[0].children.len(), 1);
        assert_eq!(sections[1].heading.map(|h| h.id.as_str()), Some("H1"));
        assert_eq!(sections[1].children.len(), 2);
        assert_eq!(sections[2].children[0].id, "d");
    }

    #[test]
    fn test_sections_of_empty_config() {
        assert!(SettingsConfig::new("t").sections().is_empty());
    }
}
