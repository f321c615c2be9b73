//! Thread-safe dashboard handle
//!
//! For hosts that deliver events from several threads. Every mutation passes
//! through one gate (the controller mutex) and is assigned a revision there.
//! The filter/aggregate work runs outside the gate and polls for a newer
//! revision; a superseded computation is abandoned and never published.

use crate::controller::{ControllerState, DashboardController, SubscriptionId, ViewModelSubscriber};
use crate::error::DashboardError;
use crate::season::SeasonTag;
use crate::selection::SelectionState;
use crate::store::SeriesStore;
use crate::types::{RawPoint, ViewModel};
use crate::view::ViewBuilder;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Cloneable, `Send + Sync` handle over a controller
#[derive(Clone)]
pub struct SharedDashboard {
    inner: Arc<Mutex<DashboardController>>,
    latest_request: Arc<AtomicU64>,
}

impl Default for SharedDashboard {
    fn default() -> Self {
        Self::new(DashboardController::new())
    }
}

impl SharedDashboard {
    /// Wrap a controller for use from several threads
    pub fn new(controller: DashboardController) -> Self {
        let latest = controller.revision();
        Self {
            inner: Arc::new(Mutex::new(controller)),
            latest_request: Arc::new(AtomicU64::new(latest)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardController> {
        // A panicking subscriber must not wedge the dashboard
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lifecycle state of the wrapped controller
    pub fn state(&self) -> ControllerState {
        self.lock().state()
    }

    /// Copy of the current selection
    pub fn selection(&self) -> SelectionState {
        self.lock().selection().clone()
    }

    /// Last published snapshot
    pub fn current_view(&self) -> Option<Arc<ViewModel>> {
        self.lock().current_view()
    }

    /// True once a newer request than `revision` has been issued
    pub fn is_superseded(&self, revision: u64) -> bool {
        self.latest_request.load(Ordering::Acquire) != revision
    }

    /// Register a rendering collaborator
    pub fn subscribe<S>(&self, subscriber: S) -> SubscriptionId
    where
        S: ViewModelSubscriber + 'static,
    {
        self.lock().subscribe(subscriber)
    }

    /// Remove one registration
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    /// Drop every subscriber registration
    pub fn teardown(&self) {
        self.lock().teardown();
    }

    /// Validate outside the gate, then install and recompute.
    ///
    /// Returns whether the resulting view model was published.
    pub fn load(&self, raw_points: &[RawPoint]) -> Result<bool, DashboardError> {
        let store = SeriesStore::load(raw_points)?;
        Ok(self.mutate(|controller| controller.install_store(store)))
    }

    /// JSON counterpart of `load`
    pub fn load_json(&self, json: &str) -> Result<bool, DashboardError> {
        let store = SeriesStore::from_json(json)?;
        Ok(self.mutate(|controller| controller.install_store(store)))
    }

    /// Flip one season. Returns whether a view model was published.
    pub fn toggle(&self, season: SeasonTag) -> bool {
        self.mutate(|controller| {
            controller.selection_mut().toggle(season);
            true
        })
    }

    /// Flip a season given by name
    pub fn toggle_named(&self, name: &str) -> Result<bool, DashboardError> {
        let season: SeasonTag = name.parse()?;
        Ok(self.toggle(season))
    }

    /// Select or clear every season
    pub fn set_all(&self, present: bool) -> bool {
        self.mutate(|controller| controller.selection_mut().set_all(present))
    }

    /// Replace the whole selection
    pub fn set_selection(&self, selection: SelectionState) -> bool {
        self.mutate(|controller| controller.selection_mut().replace(selection))
    }

    /// Apply a mutation under the gate, compute outside it, publish under it.
    ///
    /// `apply` returns whether a recomputation is needed. Returns whether a
    /// view model was published by this call.
    fn mutate<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut DashboardController) -> bool,
    {
        let (request, interval) = {
            let mut controller = self.lock();
            let recompute = apply(&mut *controller);
            // A quiet reload advances the revision without a request
            self.latest_request.store(controller.revision(), Ordering::Release);
            if !recompute {
                return false;
            }
            let interval = controller.config().cancel_check_interval;
            match controller.begin_request() {
                Some(request) => {
                    self.latest_request.store(request.0, Ordering::Release);
                    (request, interval)
                }
                None => return false,
            }
        };

        let (revision, store, selection) = request;
        let view = ViewBuilder::build_cancellable(&store, &selection, revision, interval, || {
            self.is_superseded(revision)
        });

        match view {
            Some(view) => self.lock().publish_if_current(view),
            None => {
                debug!(revision, "recomputation superseded");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn sample_points() -> Vec<RawPoint> {
        (0..64u64)
            .map(|i| RawPoint::new(i, SeasonTag::ALL[(i % 4) as usize].as_str(), i as f64))
            .collect()
    }

    #[test]
    fn test_shared_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedDashboard>();
    }

    #[test]
    fn test_sequential_mutations_publish() {
        let dashboard = SharedDashboard::default();
        assert!(!dashboard.toggle(SeasonTag::Spring));
        assert!(dashboard.load(&sample_points()).unwrap());
        assert_eq!(dashboard.state(), ControllerState::Ready);

        let view = dashboard.current_view().unwrap();
        assert_eq!(view.filtered_series.len(), 48);

        assert!(dashboard.set_all(false));
        assert!(!dashboard.set_all(false));
        assert!(dashboard.current_view().unwrap().filtered_series.is_empty());
    }

    #[test]
    fn test_superseded_revision_is_discarded() {
        let dashboard = SharedDashboard::default();
        dashboard.load(&sample_points()).unwrap();

        let (stale, store, selection) = dashboard.lock().begin_request().unwrap();
        dashboard.latest_request.store(stale, Ordering::Release);
        assert!(dashboard.toggle(SeasonTag::Winter));

        assert!(dashboard.is_superseded(stale));
        let view = ViewBuilder::build(&store, &selection, stale);
        assert!(!dashboard.lock().publish_if_current(view));
        assert!(!dashboard.current_view().unwrap().active_seasons.contains(&SeasonTag::Winter));
    }

    #[test]
    fn test_quiet_reload_supersedes_inflight_view() {
        let config = crate::config::DashboardConfig {
            publish_on_load: false,
            ..Default::default()
        };
        let dashboard = SharedDashboard::new(DashboardController::with_config(config).unwrap());
        assert!(!dashboard.load(&sample_points()).unwrap());

        let (stale, store, selection) = dashboard.lock().begin_request().unwrap();
        dashboard.latest_request.store(stale, Ordering::Release);
        assert!(!dashboard.load(&[RawPoint::new(1u64, "autumn", 2.0)]).unwrap());

        assert!(dashboard.is_superseded(stale));
        let view = ViewBuilder::build(&store, &selection, stale);
        assert!(!dashboard.lock().publish_if_current(view));
        assert!(dashboard.current_view().is_none());
    }

    #[test]
    fn test_concurrent_toggles_end_consistent() {
        let dashboard = SharedDashboard::default();
        dashboard.load(&sample_points()).unwrap();

        let handles: Vec<_> = SeasonTag::ALL
            .into_iter()
            .map(|season| {
                let dashboard = dashboard.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        dashboard.toggle(season);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Odd number of toggles per season: everything off
        let selection = dashboard.selection();
        assert!(selection.is_empty());
        let view = dashboard.current_view().unwrap();
        assert!(view.filtered_series.is_empty());
        assert_eq!(view.kpis_overall.count, 0);
        assert!(view.active_seasons.is_empty());
    }
}
