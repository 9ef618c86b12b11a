//! Visibility plan and refresh cycle.
//!
//! A cycle refreshes every visible widget concurrently and waits for all of
//! them. A widget that errors or panics gets an inline failure view; the
//! others are unaffected. Patches are applied in registry order after
//! everything settles, then the greeting is composed from the result.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use futures::future::join_all;
use futures::FutureExt;
use home_feeds::FeedClient;

use crate::greeting::{self, Greeting};
use crate::state::DashboardState;
use crate::store::{Preferences, StoreError};
use crate::widgets::{
    RefreshContext, VisibilityMap, Widget, WidgetError, WidgetId, WidgetRegistry, WidgetView,
};

/// Which registered widgets to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    /// Panels to show and refresh, in registry order.
    pub shown: Vec<WidgetId>,
    /// Panels to hide.
    pub hidden: Vec<WidgetId>,
}

/// Splits the registry by the visibility map.
pub fn plan(registry: &WidgetRegistry, visibility: &VisibilityMap) -> RenderPlan {
    let (shown, hidden) = registry
        .ids()
        .into_iter()
        .partition(|id| visibility.is_visible(*id));
    RenderPlan { shown, hidden }
}

/// Reads the visibility map from the store and plans against it.
pub fn plan_from_store(
    registry: &WidgetRegistry,
    prefs: &Preferences,
) -> Result<RenderPlan, StoreError> {
    Ok(plan(registry, &prefs.load_visibility()?))
}

/// Captures everything a cycle reads from the preference store.
pub fn snapshot(
    prefs: &Preferences,
    client: FeedClient,
    photo: Option<PathBuf>,
    media: Option<PathBuf>,
    now: DateTime<Local>,
) -> RefreshContext {
    RefreshContext {
        client,
        credentials: prefs.credentials(),
        tasks: prefs.tasks(),
        local_events: prefs.local_events(now.date_naive()),
        photo,
        media,
        now,
    }
}

/// A widget whose refresh did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetFailure {
    /// Failed widget.
    pub id: WidgetId,
    /// Rendered error.
    pub message: String,
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// New content of every refreshed panel, in registry order.
    pub views: Vec<(WidgetId, WidgetView)>,
    /// State rebuilt from the successful refreshes.
    pub state: DashboardState,
    /// Greeting composed after every widget settled.
    pub greeting: Greeting,
    /// Widgets that failed.
    pub failures: Vec<WidgetFailure>,
}

/// Refreshes the widgets in `shown` and composes the greeting.
///
/// Ids missing from the registry are skipped.
pub async fn run_cycle(
    registry: &WidgetRegistry,
    shown: &[WidgetId],
    ctx: &RefreshContext,
) -> CycleReport {
    let widgets: Vec<&dyn Widget> = shown.iter().filter_map(|id| registry.get(*id)).collect();
    tracing::debug!(count = widgets.len(), "refresh cycle started");

    let outcomes = join_all(widgets.iter().map(|widget| refresh_isolated(*widget, ctx))).await;

    let mut state = DashboardState::default();
    let mut views = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (widget, outcome) in widgets.iter().zip(outcomes) {
        let id = widget.id();
        match outcome {
            Ok(update) => {
                state.apply(update.patch);
                views.push((id, update.view));
            }
            Err(error) => {
                tracing::warn!(widget = %id, error = %error, "widget refresh failed");
                views.push((id, widget.failure_view(&error)));
                failures.push(WidgetFailure {
                    id,
                    message: error.to_string(),
                });
            }
        }
    }

    let greeting = greeting::compose(&state, &ctx.tasks, &ctx.now);
    tracing::debug!(failures = failures.len(), "refresh cycle finished");
    CycleReport {
        views,
        state,
        greeting,
        failures,
    }
}

async fn refresh_isolated(
    widget: &dyn Widget,
    ctx: &RefreshContext,
) -> Result<crate::widgets::WidgetUpdate, WidgetError> {
    match AssertUnwindSafe(async move { widget.refresh(ctx).await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(WidgetError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
