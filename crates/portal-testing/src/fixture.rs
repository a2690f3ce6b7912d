//! Contract fixture loader.
//!
//! Loads golden files from `contracts/http/` for contract assertion tests.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Load a JSON fixture file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use portal_testing::fixture::Fixture;
/// let val = Fixture::load("contracts/http/auth/sign_in_two_factor.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Directory that holds `contracts/`, found by walking up from the crate.
    pub fn workspace_root() -> PathBuf {
        let start = std::env::var("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap());
        start
            .ancestors()
            .find(|a| a.join("contracts").is_dir())
            .map(Path::to_path_buf)
            .unwrap_or(start)
    }

    /// Load and parse a fixture JSON file at `workspace_root/path`.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        let full_path = Self::workspace_root().join(relative_path);
        let contents = std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {}", full_path.display(), e));
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {}: {}", relative_path, e))
    }

    /// `response.status` of a contract fixture.
    pub fn status(fixture: &Value) -> u16 {
        fixture["response"]["status"]
            .as_u64()
            .and_then(|s| u16::try_from(s).ok())
            .expect("fixture without response.status")
    }

    /// `response.body` of a contract fixture.
    pub fn body(fixture: &Value) -> Value {
        fixture["response"]["body"].clone()
    }
}
