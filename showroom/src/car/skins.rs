use std::path::{Path, PathBuf};

#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};
use walkdir::WalkDir;

/// Skin directories of a car and which one is selected.
pub struct SkinSet {
    root: PathBuf,
    ids: Vec<String>,
    selected: Option<usize>,
}

impl SkinSet {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ids: Vec::new(),
            selected: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the directories directly below the skins root, sorted by name.
    pub fn scan(&mut self) {
        #[cfg(feature = "debug")]
        let timer = Timer::new_dynamic(format!("scan skins in {}", self.root.display().magenta()));

        let previous = self.selected_id().map(str::to_owned);

        let mut ids: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();

        ids.sort_by_key(|id| id.to_ascii_lowercase());
        self.ids = ids;

        self.selected = previous.and_then(|id| self.position(&id)).or(match self.selected {
            Some(_) => self.ids.first().map(|_| 0),
            None => None,
        });

        #[cfg(feature = "debug")]
        {
            print_debug!("found {} skins", self.ids.len().to_string().magenta());
            timer.stop();
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|skin| skin.eq_ignore_ascii_case(id))
    }

    /// Selects a skin by id, ignoring case. [`None`] disables the skin
    /// override. An unknown id keeps the current skin, or picks the first one
    /// if none was selected. Returns true if the selection changed.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let selected = match id {
            None => None,
            Some(id) => self.position(id).or(self.selected).or_else(|| self.ids.first().map(|_| 0)),
        };

        if selected == self.selected {
            return false;
        }

        #[cfg(feature = "debug")]
        print_debug!(
            "selected skin {}",
            selected.map(|index| self.ids[index].as_str()).unwrap_or("none").magenta()
        );

        self.selected = selected;
        true
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.and_then(|index| self.ids.get(index)).map(String::as_str)
    }

    pub fn override_directory(&self) -> Option<PathBuf> {
        self.selected_id().map(|id| self.root.join(id))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::car::skins::SkinSet;

    fn skins_directory(name: &str, skins: &[&str]) -> PathBuf {
        let root = std::env::temp_dir().join(format!("showroom_skins_{name}_{}", std::process::id()));

        for skin in skins {
            std::fs::create_dir_all(root.join(skin)).unwrap();
        }

        std::fs::write(root.join("ui_skin.json"), "{}").unwrap();
        root
    }

    #[test]
    fn test_scan_lists_directories_only() {
        let root = skins_directory("scan", &["red_02", "Blue_01"]);
        let mut skins = SkinSet::new(root.clone());
        skins.scan();

        assert_eq!(skins.ids(), &["Blue_01".to_owned(), "red_02".to_owned()]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_select_ignores_case() {
        let root = skins_directory("case", &["red_02", "blue_01"]);
        let mut skins = SkinSet::new(root.clone());
        skins.scan();

        assert!(skins.select(Some("RED_02")));
        assert_eq!(skins.selected_id(), Some("red_02"));
        assert_eq!(skins.override_directory(), Some(root.join("red_02")));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_unknown_skin_falls_back() {
        let root = skins_directory("fallback", &["a", "b"]);
        let mut skins = SkinSet::new(root.clone());
        skins.scan();

        assert!(skins.select(Some("missing")));
        assert_eq!(skins.selected_id(), Some("a"));

        skins.select(Some("b"));
        assert!(!skins.select(Some("missing")));
        assert_eq!(skins.selected_id(), Some("b"));

        assert!(skins.select(None));
        assert_eq!(skins.override_directory(), None);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_rescan_keeps_selection() {
        let root = skins_directory("rescan", &["b", "c"]);
        let mut skins = SkinSet::new(root.clone());
        skins.scan();
        skins.select(Some("c"));

        std::fs::create_dir_all(root.join("a")).unwrap();
        skins.scan();

        assert_eq!(skins.selected_id(), Some("c"));
        assert_eq!(skins.ids().len(), 3);

        let _ = std::fs::remove_dir_all(&root);
    }
}
