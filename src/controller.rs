//! Dashboard controller
//!
//! Owns the selection state and the current series store, reacts to toolbar
//! events, and publishes a freshly computed view model to every subscriber
//! after each effective change.
//!
//! State machine: `Uninitialized` until a dataset loads successfully, then
//! `Ready`. Selection changes while `Uninitialized` are tracked but publish
//! nothing.

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::season::SeasonTag;
use crate::selection::SelectionState;
use crate::store::SeriesStore;
use crate::types::{RawPoint, ViewModel};
use crate::view::ViewBuilder;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Ready,
}

/// Rendering collaborator receiving every published snapshot
pub trait ViewModelSubscriber: Send {
    fn on_view_model(&mut self, view: &Arc<ViewModel>);
}

impl<F> ViewModelSubscriber for F
where
    F: FnMut(&Arc<ViewModel>) + Send,
{
    fn on_view_model(&mut self, view: &Arc<ViewModel>) {
        self(view)
    }
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Orchestrates selection, filtering, aggregation and publication
pub struct DashboardController {
    config: DashboardConfig,
    store: Option<Arc<SeriesStore>>,
    selection: SelectionState,
    subscribers: Vec<(SubscriptionId, Box<dyn ViewModelSubscriber>)>,
    next_subscription: u64,
    revision: u64,
    current: Option<Arc<ViewModel>>,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardController {
    /// Create a controller with default settings (all seasons active)
    pub fn new() -> Self {
        Self::from_valid_config(DashboardConfig::default())
    }

    /// Create a controller with validated settings
    pub fn with_config(config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: DashboardConfig) -> Self {
        Self {
            selection: config.initial_selection(),
            config,
            store: None,
            subscribers: Vec::new(),
            next_subscription: 0,
            revision: 0,
            current: None,
        }
    }

    /// Active settings
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// `Ready` once a dataset has loaded successfully
    pub fn state(&self) -> ControllerState {
        if self.store.is_some() {
            ControllerState::Ready
        } else {
            ControllerState::Uninitialized
        }
    }

    /// Seasons currently switched on
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Shared handle to the current dataset
    pub fn store(&self) -> Option<Arc<SeriesStore>> {
        self.store.clone()
    }

    /// Last published snapshot
    pub fn current_view(&self) -> Option<Arc<ViewModel>> {
        self.current.clone()
    }

    /// Revision of the most recent recompute request
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ------------------------------------------------------------------
    // Inbound events
    // ------------------------------------------------------------------

    /// Load a dataset and replace the current store.
    ///
    /// On failure the previous state (and store, if any) is kept and nothing
    /// is published.
    pub fn load(&mut self, raw_points: &[RawPoint]) -> Result<(), DashboardError> {
        let store = SeriesStore::load(raw_points)?;
        self.replace_store(store);
        Ok(())
    }

    /// Load a dataset from a JSON array of raw records.
    ///
    /// Each malformed element is reported at its index; only input that is
    /// not a JSON array fails as a whole.
    pub fn load_json(&mut self, json: &str) -> Result<(), DashboardError> {
        let store = SeriesStore::from_json(json)?;
        self.replace_store(store);
        Ok(())
    }

    fn replace_store(&mut self, store: SeriesStore) {
        if self.install_store(store) {
            self.recompute();
        }
    }

    /// Flip one season
    pub fn toggle(&mut self, season: SeasonTag) {
        self.selection.toggle(season);
        debug!(%season, active = self.selection.contains(season), "toggled season");
        self.recompute();
    }

    /// Flip a season given by name; unknown names leave the selection untouched
    pub fn toggle_named(&mut self, name: &str) -> Result<(), DashboardError> {
        let season: SeasonTag = name.parse()?;
        self.toggle(season);
        Ok(())
    }

    /// Switch one season on or off
    pub fn set_season(&mut self, season: SeasonTag, present: bool) {
        if self.selection.set(season, present) {
            self.recompute();
        }
    }

    /// Select or clear every season with a single recomputation
    pub fn set_all(&mut self, present: bool) {
        if self.selection.set_all(present) {
            debug!(present, "set all seasons");
            self.recompute();
        }
    }

    /// Replace the whole selection with a single recomputation
    pub fn set_selection(&mut self, selection: SelectionState) {
        if self.selection.replace(selection) {
            self.recompute();
        }
    }

    /// Replace the selection from season names; any unknown name rejects the whole call
    pub fn set_selection_named<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), DashboardError> {
        let selection = SelectionState::from_names(names)?;
        self.set_selection(selection);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a rendering collaborator
    pub fn subscribe<S>(&mut self, subscriber: S) -> SubscriptionId
    where
        S: ViewModelSubscriber + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove one registration. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscriber registration
    pub fn teardown(&mut self) {
        info!(subscribers = self.subscribers.len(), "dashboard torn down");
        self.subscribers.clear();
    }

    // ------------------------------------------------------------------
    // Recomputation
    // ------------------------------------------------------------------

    /// Swap in a new store. Returns whether a view model should be published.
    ///
    /// When nothing is published the revision still advances and the current
    /// snapshot is dropped, so a view computed from the previous store can
    /// neither be published nor linger as `current_view`.
    pub(crate) fn install_store(&mut self, store: SeriesStore) -> bool {
        let was_ready = self.state() == ControllerState::Ready;
        info!(
            points = store.len(),
            reload = was_ready,
            "dataset loaded"
        );
        self.store = Some(Arc::new(store));
        if !self.config.publish_on_load {
            self.revision += 1;
            self.current = None;
        }
        self.config.publish_on_load
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// Assign the next revision and capture the inputs to compute it from.
    ///
    /// None while uninitialized.
    pub(crate) fn begin_request(&mut self) -> Option<(u64, Arc<SeriesStore>, SelectionState)> {
        let store = self.store.clone()?;
        self.revision += 1;
        Some((self.revision, store, self.selection.clone()))
    }

    /// Publish a snapshot unless a newer request has been issued since.
    pub(crate) fn publish_if_current(&mut self, view: ViewModel) -> bool {
        if view.revision != self.revision {
            warn!(
                stale = view.revision,
                latest = self.revision,
                "discarded superseded view model"
            );
            return false;
        }
        self.publish(view);
        true
    }

    fn recompute(&mut self) {
        if let Some((revision, store, selection)) = self.begin_request() {
            let view = ViewBuilder::build(&store, &selection, revision);
            self.publish(view);
        }
    }

    fn publish(&mut self, view: ViewModel) {
        let view = Arc::new(view);
        debug!(
            revision = view.revision,
            points = view.filtered_series.len(),
            subscribers = self.subscribers.len(),
            "publishing view model"
        );
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber.on_view_model(&view);
        }
        self.current = Some(view);
    }
}
