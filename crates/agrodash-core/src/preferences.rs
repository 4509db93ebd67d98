//! Language and theme preferences shared between one writer and many readers.
//!
//! Readers subscribe once and are woken on every change instead of
//! re-checking on a timer.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// BCP 47 language tag, e.g. `en` or `mr`.
    pub language: String,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            theme: Theme::Light,
        }
    }
}

/// Owner of the current [`Preferences`].
///
/// Writes that do not change the value do not wake subscribers.
#[derive(Debug)]
pub struct PreferencesHub {
    tx: watch::Sender<Preferences>,
}

impl PreferencesHub {
    #[must_use]
    pub fn new(initial: Preferences) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Preferences {
        self.tx.borrow().clone()
    }

    /// Returns `true` if the stored language changed.
    pub fn set_language(&self, language: &str) -> bool {
        let language = language.trim();
        let changed = self.tx.send_if_modified(|prefs| {
            if prefs.language == language {
                false
            } else {
                language.clone_into(&mut prefs.language);
                true
            }
        });
        if changed {
            tracing::debug!(language, "language preference updated");
        }
        changed
    }

    /// Returns `true` if the stored theme changed.
    pub fn set_theme(&self, theme: Theme) -> bool {
        let changed = self.tx.send_if_modified(|prefs| {
            if prefs.theme == theme {
                false
            } else {
                prefs.theme = theme;
                true
            }
        });
        if changed {
            tracing::debug!(?theme, "theme preference updated");
        }
        changed
    }
}

impl Default for PreferencesHub {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_sees_language_change() {
        let hub = PreferencesHub::default();
        let mut rx = hub.subscribe();

        assert!(hub.set_language("mr"));
        rx.changed().await.expect("hub is alive");
        assert_eq!(rx.borrow_and_update().language, "mr");
    }

    #[tokio::test]
    async fn unchanged_write_does_not_notify() {
        let hub = PreferencesHub::default();
        let mut rx = hub.subscribe();

        assert!(!hub.set_theme(Theme::Light));
        assert!(!rx.has_changed().expect("hub is alive"));

        assert!(hub.set_theme(Theme::Dark));
        assert!(rx.has_changed().expect("hub is alive"));
        assert_eq!(rx.borrow_and_update().theme, Theme::Dark);
    }

    #[test]
    fn current_reflects_latest_write() {
        let hub = PreferencesHub::default();
        hub.set_language("hi");
        hub.set_theme(Theme::Dark);
        assert_eq!(
            hub.current(),
            Preferences {
                language: "hi".to_string(),
                theme: Theme::Dark,
            }
        );
    }

    #[tokio::test]
    async fn dropping_hub_closes_subscribers() {
        let hub = PreferencesHub::default();
        let mut rx = hub.subscribe();
        drop(hub);
        assert!(rx.changed().await.is_err());
    }
}
