//! Typed preference accessors.
//!
//! Structured values are stored as JSON strings. Decoding is tolerant: a
//! malformed value reads as the empty default and is logged.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use home_feeds::CalendarCredentials;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{JsonFileStore, MemoryStore, PreferenceStore, StoreError};
use crate::widgets::{VisibilityMap, WidgetId, DESCRIPTORS};
use crate::{LocalEvent, Task, Theme};

/// Colour scheme.
pub const KEY_THEME: &str = "theme";
/// Widget id to visible flag.
pub const KEY_VISIBILITY: &str = "widgetVisibility";
/// Calendar API key.
pub const KEY_API_KEY: &str = "googleApiKey";
/// Calendar id.
pub const KEY_CALENDAR_ID: &str = "googleCalendarId";
/// Ordered task list.
pub const KEY_TASKS: &str = "tasks";
/// Local events keyed by ISO day.
pub const KEY_LOCAL_EVENTS: &str = "localEvents";

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Typed view over a [`PreferenceStore`].
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    /// Wraps an existing store.
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Preferences backed by a JSON file at `path`.
    pub fn open(path: &Path) -> Self {
        Self::new(JsonFileStore::open(path))
    }

    /// Volatile preferences.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.store.get(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed preference, using default");
                T::default()
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|e| StoreError::Serialize {
            key: key.to_string(),
            source: e,
        })?;
        self.store.set(key, &json)
    }

    // -- Theme --------------------------------------------------------------

    /// Stored theme, or dark when unset or unrecognized.
    pub fn theme(&self) -> Theme {
        self.store
            .get(KEY_THEME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Persists `theme`.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.store.set(KEY_THEME, theme.as_str())
    }

    /// Flips and persists the theme, returning the new one.
    pub fn toggle_theme(&self) -> Result<Theme, StoreError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    // -- Visibility -----------------------------------------------------------

    /// Stored visibility map as-is.
    pub fn visibility(&self) -> VisibilityMap {
        self.read_json(KEY_VISIBILITY)
    }

    /// Visibility map with every known widget present.
    ///
    /// Missing ids take their descriptor default. The map is written back
    /// only when something was added.
    pub fn load_visibility(&self) -> Result<VisibilityMap, StoreError> {
        let mut map = self.visibility();
        let mut updated = false;
        for descriptor in DESCRIPTORS {
            if map.get(descriptor.id).is_none() {
                map.set(descriptor.id, descriptor.default_visible);
                updated = true;
            }
        }
        if updated {
            self.write_json(KEY_VISIBILITY, &map)?;
        }
        Ok(map)
    }

    /// Shows or hides one widget and persists the map.
    pub fn set_widget_visible(&self, id: WidgetId, visible: bool) -> Result<VisibilityMap, StoreError> {
        let mut map = self.load_visibility()?;
        map.set(id, visible);
        self.write_json(KEY_VISIBILITY, &map)?;
        Ok(map)
    }

    // -- Credentials --------------------------------------------------------

    /// Raw stored key and calendar id, empty when unset.
    pub fn raw_credentials(&self) -> (String, String) {
        (
            self.store.get(KEY_API_KEY).unwrap_or_default(),
            self.store.get(KEY_CALENDAR_ID).unwrap_or_default(),
        )
    }

    /// Credentials when both parts are present.
    pub fn credentials(&self) -> Option<CalendarCredentials> {
        let (api_key, calendar_id) = self.raw_credentials();
        CalendarCredentials::from_parts(&api_key, &calendar_id)
    }

    /// Persists both credential parts, trimmed.
    pub fn set_credentials(&self, api_key: &str, calendar_id: &str) -> Result<(), StoreError> {
        self.store.set(KEY_API_KEY, api_key.trim())?;
        self.store.set(KEY_CALENDAR_ID, calendar_id.trim())
    }

    /// Forgets both credential parts.
    pub fn clear_credentials(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_API_KEY)?;
        self.store.remove(KEY_CALENDAR_ID)
    }

    // -- Tasks --------------------------------------------------------------

    /// Stored tasks in order.
    pub fn tasks(&self) -> Vec<Task> {
        self.read_json(KEY_TASKS)
    }

    /// Replaces the task list.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.write_json(KEY_TASKS, tasks)
    }

    /// Appends a task. Blank text is ignored and returns `None`.
    pub fn add_task(&self, text: &str) -> Result<Option<Task>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let task = Task::new(text);
        let mut tasks = self.tasks();
        tasks.push(task.clone());
        self.save_tasks(&tasks)?;
        Ok(Some(task))
    }

    /// Flips the completed flag of the task at `index`.
    pub fn toggle_task(&self, index: usize) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks();
        let Some(task) = tasks.get_mut(index) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let toggled = task.clone();
        self.save_tasks(&tasks)?;
        Ok(Some(toggled))
    }

    /// Removes the task at `index`.
    pub fn remove_task(&self, index: usize) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks();
        if index >= tasks.len() {
            return Ok(None);
        }
        let removed = tasks.remove(index);
        self.save_tasks(&tasks)?;
        Ok(Some(removed))
    }

    // -- Local events -------------------------------------------------------

    fn day_key(day: NaiveDate) -> String {
        day.format(DAY_FORMAT).to_string()
    }

    /// Events stored for `day`.
    pub fn local_events(&self, day: NaiveDate) -> Vec<LocalEvent> {
        let mut by_day: BTreeMap<String, Vec<LocalEvent>> = self.read_json(KEY_LOCAL_EVENTS);
        by_day.remove(&Self::day_key(day)).unwrap_or_default()
    }

    /// Stores `events` as the only day in the map, dropping other days.
    pub fn save_local_events(&self, day: NaiveDate, events: &[LocalEvent]) -> Result<(), StoreError> {
        let mut by_day = BTreeMap::new();
        by_day.insert(Self::day_key(day), events);
        self.write_json(KEY_LOCAL_EVENTS, &by_day)
    }

    /// Adds an event for `day` with an id derived from `now_ms`.
    ///
    /// The id is bumped until it is unique within the day. Blank text is
    /// ignored and returns `None`.
    pub fn add_local_event(
        &self,
        day: NaiveDate,
        text: &str,
        now_ms: i64,
    ) -> Result<Option<LocalEvent>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let mut events = self.local_events(day);
        let mut id = now_ms;
        while events.iter().any(|e| e.id == id) {
            id += 1;
        }
        let event = LocalEvent {
            id,
            text: text.to_string(),
        };
        events.push(event.clone());
        self.save_local_events(day, &events)?;
        Ok(Some(event))
    }

    /// Removes the event with `id` from `day`. Returns whether one was removed.
    pub fn remove_local_event(&self, day: NaiveDate, id: i64) -> Result<bool, StoreError> {
        let mut events = self.local_events(day);
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Ok(false);
        }
        self.save_local_events(day, &events)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn store_with(key: &str, value: &str) -> Preferences {
        let store = MemoryStore::new();
        store.set(key, value).expect("seed");
        Preferences::new(store)
    }

    #[test]
    fn theme_defaults_to_dark_and_toggles() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.toggle_theme().expect("toggle"), Theme::Light);
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn unknown_theme_reads_as_default() {
        let prefs = store_with(KEY_THEME, "sepia");
        assert_eq!(prefs.theme(), Theme::Dark);
    }

    #[test]
    fn load_visibility_fills_defaults_and_persists() {
        let prefs = Preferences::in_memory();
        let map = prefs.load_visibility().expect("load");
        assert_eq!(map.get(WidgetId::Weather), Some(true));
        assert_eq!(map.get(WidgetId::News), Some(true));
        assert_eq!(map.get(WidgetId::Music), Some(false));
        assert_eq!(prefs.visibility(), map, "filled map should be written back");
    }

    #[test]
    fn load_visibility_keeps_user_choice_and_unknown_ids() {
        let prefs = store_with(KEY_VISIBILITY, r#"{"weather": false, "retired": true}"#);
        let map = prefs.load_visibility().expect("load");
        assert_eq!(map.get(WidgetId::Weather), Some(false));
        assert_eq!(map.raw("retired"), Some(true));
    }

    #[test]
    fn load_visibility_does_not_write_when_complete() {
        let prefs = Preferences::in_memory();
        let first = prefs.load_visibility().expect("load");
        let raw_before = prefs.store.get(KEY_VISIBILITY);
        let second = prefs.load_visibility().expect("load");
        assert_eq!(first, second);
        assert_eq!(prefs.store.get(KEY_VISIBILITY), raw_before);
    }

    #[test]
    fn toggling_non_default_widget_survives_reload() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("preferences.json");
        Preferences::open(&path)
            .set_widget_visible(WidgetId::Transit, true)
            .expect("toggle");

        let reloaded = Preferences::open(&path).load_visibility().expect("load");
        assert_eq!(reloaded.get(WidgetId::Transit), Some(true));
        assert_eq!(reloaded.get(WidgetId::Weather), Some(true));
    }

    #[test]
    fn malformed_json_yields_empty_defaults() {
        let store = MemoryStore::new();
        store.set(KEY_TASKS, "[{oops").expect("seed");
        store.set(KEY_LOCAL_EVENTS, "42").expect("seed");
        store.set(KEY_VISIBILITY, "not json").expect("seed");
        let prefs = Preferences::new(store);

        assert!(prefs.tasks().is_empty());
        assert!(prefs.local_events(day(2026, 10, 19)).is_empty());
        assert!(prefs.visibility().is_empty());
        let filled = prefs.load_visibility().expect("load");
        assert_eq!(filled.get(WidgetId::News), Some(true));
    }

    #[test]
    fn credentials_require_both_parts() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.credentials(), None);
        prefs.set_credentials("  key ", "").expect("set");
        assert_eq!(prefs.credentials(), None);
        prefs.set_credentials("key", "me@example.com").expect("set");
        let creds = prefs.credentials().expect("present");
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.calendar_id, "me@example.com");
        prefs.clear_credentials().expect("clear");
        assert_eq!(prefs.raw_credentials(), (String::new(), String::new()));
    }

    #[test]
    fn add_task_trims_and_ignores_blank() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.add_task("   ").expect("add"), None);
        assert_eq!(
            prefs.add_task("  water plants ").expect("add"),
            Some(Task::new("water plants"))
        );
        assert_eq!(prefs.tasks(), vec![Task::new("water plants")]);
    }

    #[test]
    fn completed_flag_survives_reload() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("preferences.json");
        {
            let prefs = Preferences::open(&path);
            prefs.add_task("first").expect("add");
            prefs.add_task("second").expect("add");
            let toggled = prefs.toggle_task(1).expect("toggle").expect("in range");
            assert!(toggled.completed);
        }
        let tasks = Preferences::open(&path).tasks();
        assert!(!tasks[0].completed);
        assert!(tasks[1].completed);
    }

    #[test]
    fn task_index_out_of_range_is_none() {
        let prefs = Preferences::in_memory();
        prefs.add_task("only").expect("add");
        assert_eq!(prefs.toggle_task(3).expect("toggle"), None);
        assert_eq!(prefs.remove_task(3).expect("remove"), None);
        assert_eq!(prefs.remove_task(0).expect("remove"), Some(Task::new("only")));
        assert!(prefs.tasks().is_empty());
    }

    #[test]
    fn add_then_delete_local_event_leaves_day_empty() {
        let prefs = Preferences::in_memory();
        let today = day(2026, 10, 19);
        let event = prefs
            .add_local_event(today, "Dentist 15:00", 1_760_000_000_000)
            .expect("add")
            .expect("non-blank");
        assert_eq!(prefs.local_events(today), vec![event.clone()]);
        assert!(prefs.remove_local_event(today, event.id).expect("remove"));
        assert!(prefs.local_events(today).is_empty());
        assert!(!prefs.remove_local_event(today, event.id).expect("remove again"));
    }

    #[test]
    fn local_event_ids_are_bumped_until_unique() {
        let prefs = Preferences::in_memory();
        let today = day(2026, 10, 19);
        let a = prefs.add_local_event(today, "a", 100).expect("add").expect("some");
        let b = prefs.add_local_event(today, "b", 100).expect("add").expect("some");
        let c = prefs.add_local_event(today, "c", 100).expect("add").expect("some");
        assert_eq!((a.id, b.id, c.id), (100, 101, 102));
    }

    #[test]
    fn saving_a_day_prunes_other_days() {
        let prefs = Preferences::in_memory();
        prefs
            .add_local_event(day(2026, 10, 18), "yesterday", 1)
            .expect("add");
        prefs.add_local_event(day(2026, 10, 19), "today", 2).expect("add");

        assert!(prefs.local_events(day(2026, 10, 18)).is_empty());
        let raw = prefs.store.get(KEY_LOCAL_EVENTS).expect("stored");
        assert_eq!(raw, r#"{"2026-10-19":[{"id":2,"text":"today"}]}"#);
    }

    #[test]
    fn blank_local_event_is_ignored() {
        let prefs = Preferences::in_memory();
        assert_eq!(
            prefs.add_local_event(day(2026, 10, 19), " \t", 5).expect("add"),
            None
        );
        assert_eq!(prefs.store.get(KEY_LOCAL_EVENTS), None);
    }
}
