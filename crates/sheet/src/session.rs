use crate::error::Result;
use crate::pipeline::ingest_all;
use crate::source::WorkbookSource;
use qtally_core::{DashboardView, RowStore, Selections, Snapshot, SnapshotStore};

/// The live dashboard state: the current store, the user's selections and where to persist them.
///
/// Ingestion takes `&mut self`, so two runs can never overlap and readers never see a
/// half-built store.
#[derive(Default)]
pub struct Session {
    store: RowStore,
    selections: Selections,
    snapshots: Option<Box<dyn SnapshotStore>>,
}

impl Session {
    /// Create a session with an empty store and no persistence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist the session after every change.
    #[must_use]
    pub fn with_snapshots(mut self, snapshots: Box<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Seed the session from the last snapshot. Returns `false` when there was none.
    pub fn restore(&mut self) -> bool {
        let Some(snapshot) = self.snapshots.as_ref().and_then(|s| s.load()) else {
            return false;
        };

        let (store, selections) = snapshot.into_parts();
        tracing::info!(rows = store.len(), "Restored snapshot");
        self.store = store;
        self.selections = selections;
        self.selections.reconcile(&self.store);
        true
    }

    /// Replace the store with a full re-ingest of `sources`.
    ///
    /// On error the current store and selections are kept unchanged.
    pub fn ingest(&mut self, sources: &mut [Box<dyn WorkbookSource>]) -> Result<()> {
        let store = ingest_all(sources)?;
        self.store = store;
        self.selections.reconcile(&self.store);
        self.persist();
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> &RowStore {
        &self.store
    }

    #[must_use]
    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Apply new selections, dropping any the store does not offer.
    pub fn set_selections(&mut self, selections: Selections) {
        self.selections = selections;
        self.selections.reconcile(&self.store);
        self.persist();
    }

    /// Compute the dashboard for the current selections.
    #[must_use]
    pub fn view(&self) -> DashboardView<'_> {
        DashboardView::compute(&self.store, &self.selections)
    }

    fn persist(&self) {
        if let Some(snapshots) = &self.snapshots {
            snapshots.save(&Snapshot::capture(&self.store, &self.selections));
        }
    }
}
