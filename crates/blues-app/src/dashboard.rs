// Dashboard view-model publisher.
//
// Holds the current `ViewModel` in a watch channel. It starts as the loading
// placeholder and is replaced exactly once, when every group is resolved,
// totaled and sorted. Observers never see a partially built dashboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, warn};

use blues_core::{Adjustments, ChangelogEntry, Config, Roster, ViewModel};
use blues_stats::GoalSource;

use crate::builder::build_groups;

/// Static inputs for building a dashboard.
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    pub roster: Roster,
    pub adjustments: Adjustments,
    pub changelog: Vec<ChangelogEntry>,
}

impl DashboardLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            roster: config.roster.clone(),
            adjustments: config.adjustments.clone(),
            changelog: config.changelog.clone(),
        }
    }
}

/// One page load's worth of dashboard state.
pub struct Dashboard {
    layout: Arc<DashboardLayout>,
    tx: watch::Sender<ViewModel>,
    started: AtomicBool,
}

impl Dashboard {
    /// Create a dashboard showing the loading placeholder.
    pub fn new(layout: Arc<DashboardLayout>) -> Self {
        let initial = ViewModel::loading(&layout.roster, &layout.changelog);
        let (tx, _rx) = watch::channel(initial);
        Self {
            layout,
            tx,
            started: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ViewModel {
        self.tx.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    /// Run the aggregation and publish the finished view model.
    ///
    /// The build runs on its own task. If that task dies, the dashboard stays
    /// in the loading state rather than showing incomplete totals; the return
    /// value is `false` in that case. Only the first call does anything: a
    /// dashboard is one page load, and later calls return `false` untouched.
    pub async fn load<S>(&self, source: Arc<S>) -> bool
    where
        S: GoalSource + ?Sized + 'static,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("dashboard already loaded or loading, ignoring repeat load");
            return false;
        }

        let layout = Arc::clone(&self.layout);
        let started = Instant::now();

        let task = tokio::spawn(async move {
            build_groups(&layout.roster, &layout.adjustments, source.as_ref()).await
        });

        match task.await {
            Ok(groups) => {
                info!(
                    groups = groups.len(),
                    players = self.layout.roster.player_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "dashboard loaded"
                );
                self.tx
                    .send_replace(ViewModel::ready(groups, &self.layout.changelog));
                true
            }
            Err(e) => {
                error!("dashboard aggregation aborted, staying in loading state: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
