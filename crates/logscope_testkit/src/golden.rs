//! Golden report files.
//!
//! Compares rendered reports against files checked in under
//! `docs/golden/`. Set `UPDATE_GOLDEN=1` to rewrite them.

use std::fs;
use std::path::{Path, PathBuf};

/// A golden comparison for one named report.
pub struct GoldenReport {
    name: String,
    golden_dir: PathBuf,
    update_mode: bool,
}

impl GoldenReport {
    /// Creates a golden comparison reading from `golden_dir`.
    pub fn new(name: impl Into<String>, golden_dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            golden_dir: golden_dir.as_ref().to_path_buf(),
            update_mode: std::env::var("UPDATE_GOLDEN").is_ok(),
        }
    }

    /// Creates a golden comparison using the workspace's `docs/golden`.
    pub fn with_default_dir(name: impl Into<String>) -> Self {
        let golden_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(Path::parent)
            .map(|p| p.join("docs").join("golden"))
            .unwrap_or_else(|| PathBuf::from("golden"));

        Self::new(name, golden_dir)
    }

    /// Path of the golden file.
    pub fn path(&self) -> PathBuf {
        self.golden_dir.join(format!("{}.xml", self.name))
    }

    /// Asserts that `actual` matches the golden file.
    pub fn assert_matches(&self, actual: &str) {
        let path = self.path();

        if self.update_mode {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create golden directory");
            }
            fs::write(&path, actual).expect("Failed to write golden file");
            println!("Updated golden file: {}", path.display());
            return;
        }

        let expected = fs::read_to_string(&path).unwrap_or_else(|_| {
            panic!(
                "Golden file not found: {}\nRun with UPDATE_GOLDEN=1 to create it.\nActual:\n{actual}",
                path.display()
            )
        });

        if actual != expected {
            panic!(
                "Golden report '{}' differs:\n--- Expected ---\n{expected}\n--- Actual ---\n{actual}\nRun with UPDATE_GOLDEN=1 to update.",
                self.name
            );
        }
    }
}
