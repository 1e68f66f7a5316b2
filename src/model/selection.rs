use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadState {
    Downloading,
    Ready,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionRecord {
    pub url: String,
    /// Distinguishes this selection from earlier ones of the same URL.
    pub generation: u64,
    pub path: Option<PathBuf>,
    pub state: DownloadState,
}

/// Outcome of toggling a thumbnail.
#[derive(Debug, PartialEq)]
pub enum Toggle {
    /// Newly selected; the caller should start the download tagged with this generation.
    Selected(u64),
    /// Deselected; carries the record so the caller can remove its file.
    Deselected(SelectionRecord),
}

/// Outcome of a finished download being applied to the tracker.
#[derive(Debug, PartialEq)]
pub enum Completion {
    Stored,
    /// The selection the download was started for is gone. The file is orphaned.
    Orphaned(PathBuf),
    Failed,
}

/// Selected images keyed by full-image URL, in selection order.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    records: Vec<SelectionRecord>,
    next_generation: u64,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SelectionRecord] {
        &self.records
    }

    pub fn get(&self, url: &str) -> Option<&SelectionRecord> {
        self.records.iter().find(|r| r.url == url)
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn toggle(&mut self, url: &str) -> Toggle {
        if let Some(idx) = self.records.iter().position(|r| r.url == url) {
            Toggle::Deselected(self.records.remove(idx))
        } else {
            self.next_generation += 1;
            self.records.push(SelectionRecord {
                url: url.to_string(),
                generation: self.next_generation,
                path: None,
                state: DownloadState::Downloading,
            });
            Toggle::Selected(self.next_generation)
        }
    }

    /// Applies a finished download. Only the selection that started it may claim the
    /// result; a completion from an earlier selection of the same URL is orphaned
    /// (or ignored when it failed).
    pub fn complete(
        &mut self,
        url: &str,
        generation: u64,
        result: Result<PathBuf, String>,
    ) -> Completion {
        let live = self
            .records
            .iter()
            .position(|r| r.url == url && r.generation == generation);
        match (live, result) {
            (Some(idx), Ok(path)) => {
                let record = &mut self.records[idx];
                record.path = Some(path);
                record.state = DownloadState::Ready;
                Completion::Stored
            }
            (None, Ok(path)) => Completion::Orphaned(path),
            (Some(idx), Err(_)) => {
                self.records.remove(idx);
                Completion::Failed
            }
            (None, Err(_)) => Completion::Failed,
        }
    }

    /// Paths of ready selections whose files still exist, in selection order.
    pub fn valid_paths(&self) -> Vec<PathBuf> {
        self.records
            .iter()
            .filter(|r| r.state == DownloadState::Ready)
            .filter_map(|r| r.path.as_deref())
            .filter(|p| Path::new(p).exists())
            .map(Path::to_path_buf)
            .collect()
    }

    pub fn counter_text(&self) -> String {
        format!("{} images selected", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_toggle_selects_then_deselects() {
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.toggle("a"), Toggle::Selected(1));
        assert!(tracker.is_selected("a"));
        assert_eq!(tracker.get("a").unwrap().state, DownloadState::Downloading);

        match tracker.toggle("a") {
            Toggle::Deselected(record) => assert_eq!(record.url, "a"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_completion_paths() {
        let mut tracker = SelectionTracker::new();
        let Toggle::Selected(a) = tracker.toggle("a") else {
            panic!("expected select");
        };
        let Toggle::Selected(b) = tracker.toggle("b") else {
            panic!("expected select");
        };

        assert_eq!(
            tracker.complete("a", a, Ok(PathBuf::from("a.jpg"))),
            Completion::Stored
        );
        assert_eq!(tracker.get("a").unwrap().state, DownloadState::Ready);

        assert_eq!(
            tracker.complete("b", b, Err("boom".to_string())),
            Completion::Failed
        );
        assert!(!tracker.is_selected("b"));

        assert_eq!(
            tracker.complete("gone", 99, Ok(PathBuf::from("g.jpg"))),
            Completion::Orphaned(PathBuf::from("g.jpg"))
        );
        assert_eq!(tracker.counter_text(), "1 images selected");
    }

    #[test]
    fn test_valid_paths_keep_order_and_skip_missing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("1.jpg");
        let second = dir.path().join("2.jpg");
        fs::write(&first, b"x").unwrap();
        fs::write(&second, b"x").unwrap();

        let mut tracker = SelectionTracker::new();
        let mut generation = HashMap::new();
        for url in ["second", "pending", "first", "missing"] {
            if let Toggle::Selected(g) = tracker.toggle(url) {
                generation.insert(url, g);
            }
        }
        tracker.complete("second", generation["second"], Ok(second.clone()));
        tracker.complete("first", generation["first"], Ok(first.clone()));
        tracker.complete("missing", generation["missing"], Ok(dir.path().join("nope.jpg")));

        assert_eq!(tracker.valid_paths(), vec![second, first]);
    }

    #[test]
    fn test_reselect_ignores_earlier_download() {
        let mut tracker = SelectionTracker::new();
        let Toggle::Selected(first) = tracker.toggle("u") else {
            panic!("expected select");
        };
        assert!(matches!(tracker.toggle("u"), Toggle::Deselected(_)));
        let Toggle::Selected(second) = tracker.toggle("u") else {
            panic!("expected select");
        };
        assert_ne!(first, second);

        assert_eq!(
            tracker.complete("u", first, Ok(PathBuf::from("first.jpg"))),
            Completion::Orphaned(PathBuf::from("first.jpg"))
        );
        assert_eq!(tracker.get("u").unwrap().state, DownloadState::Downloading);

        assert_eq!(
            tracker.complete("u", second, Ok(PathBuf::from("second.jpg"))),
            Completion::Stored
        );
        assert_eq!(
            tracker.get("u").unwrap().path.as_deref(),
            Some(Path::new("second.jpg"))
        );
    }

    #[test]
    fn test_earlier_failure_keeps_live_selection() {
        let mut tracker = SelectionTracker::new();
        let Toggle::Selected(first) = tracker.toggle("u") else {
            panic!("expected select");
        };
        tracker.toggle("u");
        let Toggle::Selected(second) = tracker.toggle("u") else {
            panic!("expected select");
        };
        tracker.complete("u", second, Ok(PathBuf::from("second.jpg")));

        assert_eq!(
            tracker.complete("u", first, Err("timeout".to_string())),
            Completion::Failed
        );
        assert!(tracker.is_selected("u"));
        assert_eq!(tracker.get("u").unwrap().state, DownloadState::Ready);
    }
}
