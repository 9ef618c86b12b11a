//! Widget system for the home dashboard.
//!
//! Every panel is a [`Widget`]: something that can refresh itself from a
//! [`RefreshContext`] and return a [`WidgetView`] plus a [`StatePatch`].
//!
//! # Architecture
//!
//! [`DESCRIPTORS`] is the static table of known widgets: stable id, display
//! name, whether the widget is visible on a fresh install, and a factory.
//! [`WidgetRegistry::from_config`] resolves the factories once at startup;
//! the renderer then drives the resulting trait objects.
//!
//! Refreshes return boxed futures so the renderer can run them
//! concurrently over `dyn Widget`.

pub mod calendar;
pub mod context;
pub mod media;
pub mod music;
pub mod news;
pub mod notification;
pub mod photo;
pub mod reminder;
pub mod transit;
pub mod view;
pub mod weather;

pub use context::RefreshContext;
pub use view::{InputKind, RowKey, ViewRow, ViewTab, WidgetView};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use futures::future::BoxFuture;
use home_feeds::FeedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::state::StatePatch;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identifier of a built-in widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetId {
    /// Current weather.
    Weather,
    /// News headlines.
    News,
    /// Transit service notices.
    Transit,
    /// Upcoming events.
    Calendar,
    /// Mail and chat shortcuts.
    Notification,
    /// Task list.
    Reminder,
    /// Music placeholder.
    Music,
    /// Photo frame.
    Photo,
    /// Audio or video file.
    Media,
}

impl WidgetId {
    /// Every widget id in registry order.
    pub const ALL: [WidgetId; 9] = [
        WidgetId::Weather,
        WidgetId::News,
        WidgetId::Transit,
        WidgetId::Calendar,
        WidgetId::Notification,
        WidgetId::Reminder,
        WidgetId::Music,
        WidgetId::Photo,
        WidgetId::Media,
    ];

    /// Persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetId::Weather => "weather",
            WidgetId::News => "news",
            WidgetId::Transit => "transit",
            WidgetId::Calendar => "calendar",
            WidgetId::Notification => "notification",
            WidgetId::Reminder => "reminder",
            WidgetId::Music => "music",
            WidgetId::Photo => "photo",
            WidgetId::Media => "media",
        }
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing [`WidgetId`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown widget: {0} (expected one of weather, news, transit, calendar, notification, reminder, music, photo, media)")]
pub struct ParseWidgetIdError(pub String);

impl FromStr for WidgetId {
    type Err = ParseWidgetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        WidgetId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ParseWidgetIdError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Persisted widget id to visible flag.
///
/// Keys are plain strings so ids this build does not know survive a
/// load/save round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityMap(BTreeMap<String, bool>);

impl VisibilityMap {
    /// Flag stored for `id`.
    pub fn get(&self, id: WidgetId) -> Option<bool> {
        self.raw(id.as_str())
    }

    /// Flag stored under an arbitrary key.
    pub fn raw(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    /// Returns `true` only when `id` is explicitly marked visible.
    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.get(id) == Some(true)
    }

    /// Records a flag for `id`.
    pub fn set(&mut self, id: WidgetId, visible: bool) {
        self.0.insert(id.as_str().to_string(), visible);
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Map with every descriptor at its default.
    pub fn defaults() -> Self {
        let mut map = Self::default();
        for descriptor in DESCRIPTORS {
            map.set(descriptor.id, descriptor.default_visible);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Widget capability
// ---------------------------------------------------------------------------

/// Why a widget refresh failed.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The remote read failed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A local file could not be inspected.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File being inspected.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The refresh panicked.
    #[error("widget panicked: {0}")]
    Panicked(String),
}

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetUpdate {
    /// New panel content.
    pub view: WidgetView,
    /// Contribution to the shared state.
    pub patch: StatePatch,
}

impl WidgetUpdate {
    /// Update with a view and no state contribution.
    pub fn view(view: WidgetView) -> Self {
        Self {
            view,
            patch: StatePatch::None,
        }
    }

    /// Update with a view and a state contribution.
    pub fn with_patch(view: WidgetView, patch: StatePatch) -> Self {
        Self { view, patch }
    }
}

/// A dashboard panel with its own refresh logic.
///
/// Widgets must be `Send + Sync` so a registry can be shared with the task
/// running a refresh cycle.
pub trait Widget: Send + Sync {
    /// Identifier of this widget.
    fn id(&self) -> WidgetId;

    /// Produces fresh panel content.
    ///
    /// Implementations do at most one outbound read and never retry.
    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>>;

    /// Inline content shown when [`refresh`](Widget::refresh) fails.
    fn failure_view(&self, error: &WidgetError) -> WidgetView {
        let name = descriptor(self.id()).display_name;
        WidgetView::error(name, format!("Could not load {}: {error}", name.to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Factory function type for creating widget instances.
pub type WidgetFactory = fn(&Config) -> Box<dyn Widget>;

/// Static description of a built-in widget.
pub struct WidgetDescriptor {
    /// Stable id.
    pub id: WidgetId,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Visibility on first launch.
    pub default_visible: bool,
    /// Builds the widget from configuration.
    pub factory: WidgetFactory,
}

impl fmt::Debug for WidgetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("default_visible", &self.default_visible)
            .finish_non_exhaustive()
    }
}

/// Every built-in widget in registry order.
pub static DESCRIPTORS: &[WidgetDescriptor] = &[
    WidgetDescriptor {
        id: WidgetId::Weather,
        display_name: "Weather",
        default_visible: true,
        factory: weather::create,
    },
    WidgetDescriptor {
        id: WidgetId::News,
        display_name: "News",
        default_visible: true,
        factory: news::create,
    },
    WidgetDescriptor {
        id: WidgetId::Transit,
        display_name: "Transit",
        default_visible: false,
        factory: transit::create,
    },
    WidgetDescriptor {
        id: WidgetId::Calendar,
        display_name: "Calendar",
        default_visible: false,
        factory: calendar::create,
    },
    WidgetDescriptor {
        id: WidgetId::Notification,
        display_name: "Notifications",
        default_visible: false,
        factory: notification::create,
    },
    WidgetDescriptor {
        id: WidgetId::Reminder,
        display_name: "Reminders",
        default_visible: false,
        factory: reminder::create,
    },
    WidgetDescriptor {
        id: WidgetId::Music,
        display_name: "Music",
        default_visible: false,
        factory: music::create,
    },
    WidgetDescriptor {
        id: WidgetId::Photo,
        display_name: "Photo frame",
        default_visible: false,
        factory: photo::create,
    },
    WidgetDescriptor {
        id: WidgetId::Media,
        display_name: "Media player",
        default_visible: false,
        factory: media::create,
    },
];

/// Descriptor of `id`.
pub fn descriptor(id: WidgetId) -> &'static WidgetDescriptor {
    // WidgetId::ALL and DESCRIPTORS share an order.
    &DESCRIPTORS[id as usize]
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Instantiated widgets in display order.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: Vec<Box<dyn Widget>>,
}

impl WidgetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in widget.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for descriptor in DESCRIPTORS {
            registry.register((descriptor.factory)(config));
        }
        registry
    }

    /// Adds a widget, replacing any registered under the same id in place.
    pub fn register(&mut self, widget: Box<dyn Widget>) {
        let id = widget.id();
        match self.widgets.iter_mut().find(|existing| existing.id() == id) {
            Some(slot) => *slot = widget,
            None => self.widgets.push(widget),
        }
    }

    /// Widget registered under `id`.
    pub fn get(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets
            .iter()
            .find(|widget| widget.id() == id)
            .map(|widget| widget.as_ref())
    }

    /// Registered ids in order.
    pub fn ids(&self) -> Vec<WidgetId> {
        self.widgets.iter().map(|widget| widget.id()).collect()
    }

    /// Registered widgets in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Widget> {
        self.widgets.iter().map(|widget| widget.as_ref())
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_follow_id_order() {
        assert_eq!(DESCRIPTORS.len(), WidgetId::ALL.len());
        for (descriptor, id) in DESCRIPTORS.iter().zip(WidgetId::ALL) {
            assert_eq!(descriptor.id, id);
            assert_eq!(super::descriptor(id).id, id);
        }
    }

    #[test]
    fn only_weather_and_news_are_default_visible() {
        let visible: Vec<_> = DESCRIPTORS
            .iter()
            .filter(|d| d.default_visible)
            .map(|d| d.id)
            .collect();
        assert_eq!(visible, vec![WidgetId::Weather, WidgetId::News]);
    }

    #[test]
    fn widget_id_round_trips_through_strings() {
        for id in WidgetId::ALL {
            assert_eq!(id.as_str().parse::<WidgetId>(), Ok(id));
        }
        assert_eq!(" Transit ".parse::<WidgetId>(), Ok(WidgetId::Transit));
        assert!("stocks".parse::<WidgetId>().is_err());
    }

    #[test]
    fn registry_from_config_has_every_widget_in_order() {
        let registry = WidgetRegistry::from_config(&Config::default());
        assert_eq!(registry.ids(), WidgetId::ALL.to_vec());
        for id in WidgetId::ALL {
            assert_eq!(registry.get(id).map(|w| w.id()), Some(id));
        }
    }

    #[test]
    fn register_replaces_in_place() {
        let mut registry = WidgetRegistry::from_config(&Config::default());
        registry.register(music::create(&Config::default()));
        assert_eq!(registry.ids(), WidgetId::ALL.to_vec());
    }

    #[test]
    fn visibility_map_serializes_as_plain_object() {
        let mut map = VisibilityMap::default();
        map.set(WidgetId::Weather, true);
        map.set(WidgetId::Music, false);
        let json = serde_json::to_string(&map).expect("serializes");
        assert_eq!(json, r#"{"music":false,"weather":true}"#);
        assert!(map.is_visible(WidgetId::Weather));
        assert!(!map.is_visible(WidgetId::Music));
        assert!(!map.is_visible(WidgetId::News), "absent ids are hidden");
    }

    #[test]
    fn default_failure_view_names_the_widget() {
        let widget = news::create(&Config::default());
        let view = widget.failure_view(&WidgetError::Feed(FeedError::Status(503)));
        assert!(view.failed);
        assert_eq!(view.title, "News");
        assert!(view.to_plain_lines()[0].starts_with("Could not load news"));
    }
}
