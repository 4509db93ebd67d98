//! Dashboard session: owns the state container for one actor.

use agrodash_client::BackendClient;
use agrodash_core::Actor;
use tokio::sync::watch;

use crate::aggregator::{run_cycle, AggregationReport, CycleOptions};
use crate::state::DashboardState;

/// Single writer of the dashboard state.
///
/// Readers hold a [`watch::Receiver`] from [`DashboardSession::subscribe`].
/// `refresh` takes `&mut self`, so cycles for one session never overlap.
pub struct DashboardSession {
    client: BackendClient,
    actor: Actor,
    options: CycleOptions,
    state: watch::Sender<DashboardState>,
    last_report: Option<AggregationReport>,
}

impl DashboardSession {
    #[must_use]
    pub fn new(client: BackendClient, actor: Actor, options: CycleOptions) -> Self {
        let (state, _) = watch::channel(DashboardState::loading());
        Self {
            client,
            actor,
            options,
            state,
            last_report: None,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Snapshot of the last published state.
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn last_report(&self) -> Option<&AggregationReport> {
        self.last_report.as_ref()
    }

    #[must_use]
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Switch actors. The next `refresh` loads the new actor's data.
    pub fn set_actor(&mut self, actor: Actor) {
        self.actor = actor;
        self.last_report = None;
        self.state.send_replace(DashboardState::loading());
    }

    /// Run one cycle and publish its state.
    ///
    /// Subscribers see the loading state first, then the finished state in a
    /// single update. Dropping the returned future cancels the outstanding
    /// requests; the loading state stays published until the next refresh.
    pub async fn refresh(&mut self) -> &AggregationReport {
        self.state.send_replace(DashboardState::loading());

        let result = run_cycle(&self.client, &self.actor, &self.options).await;

        self.state.send_replace(result.state);
        self.last_report.insert(result.report)
    }
}
