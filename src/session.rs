use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SessionError;
use crate::models::LearnerKey;

const DEFAULT_DISPLAY_NAME: &str = "Estudiante";

/// The local key/value session cache: who is playing and whether they
/// have been through onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCache {
    pub child_name: Option<String>,
    #[serde(default)]
    pub has_onboarded: bool,
}

impl SessionCache {
    /// A missing file is an empty cache.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn onboard(&mut self, name: &str) {
        self.child_name = Some(name.trim().to_string());
        self.has_onboarded = true;
    }
}

/// Who is playing, resolved once at startup and handed to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    display_name: String,
    key: LearnerKey,
}

impl Session {
    pub fn new(display_name: &str) -> Self {
        let trimmed = display_name.trim();
        let display_name = if trimmed.is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        let key = LearnerKey::new(&display_name);
        Self { display_name, key }
    }

    pub fn from_cache(cache: &SessionCache) -> Self {
        Self::new(cache.child_name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME))
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn key(&self) -> &LearnerKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::load(dir.path().join("session.json")).unwrap();
        assert_eq!(cache, SessionCache::default());
        assert!(!cache.has_onboarded);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut cache = SessionCache::default();
        cache.onboard("  Ana ");
        cache.save(&path).unwrap();

        let loaded = SessionCache::load(&path).unwrap();
        assert_eq!(loaded.child_name.as_deref(), Some("Ana"));
        assert!(loaded.has_onboarded);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            SessionCache::load(&path),
            Err(SessionError::Corrupt(_))
        ));
    }

    #[test]
    fn session_keeps_display_name_and_folds_key() {
        let session = Session::new(" Ana ");
        assert_eq!(session.display_name(), "Ana");
        assert_eq!(session.key().as_str(), "ana");
    }

    #[test]
    fn session_from_empty_cache_uses_default_name() {
        let session = Session::from_cache(&SessionCache::default());
        assert_eq!(session.display_name(), "Estudiante");
        assert_eq!(session.key().as_str(), "estudiante");
    }
}
