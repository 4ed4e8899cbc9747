use tracing::warn;

use crate::error::Result;
use crate::store::{KeyValueStore, THEME_KEY};
use crate::types::Theme;

/// The saved theme, or light when nothing usable is stored.
pub fn load_theme<K: KeyValueStore>(store: &K) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
            warn!(value = %value, "ignoring unknown theme");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!(error = %e, "could not read theme");
            Theme::default()
        }
    }
}

pub fn save_theme<K: KeyValueStore>(store: &K, theme: Theme) -> Result<()> {
    store.set(THEME_KEY, theme.as_str())
}

/// Flip between light and dark and persist the result.
pub fn toggle_theme<K: KeyValueStore>(store: &K) -> Result<Theme> {
    let theme = load_theme(store).toggled();
    save_theme(store, theme)?;
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        assert_eq!(load_theme(&MemoryStore::new()), Theme::Light);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let store = MemoryStore::new();
        assert_eq!(toggle_theme(&store).unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert!(load_theme(&store).is_dark());

        assert_eq!(toggle_theme(&store).unwrap(), Theme::Light);
        assert_eq!(load_theme(&store), Theme::Light);
    }
}
