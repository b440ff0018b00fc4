//! Graph providers
//!
//! The analysis layer asks a `GraphProvider` for the current graph instead of
//! reaching for a process-wide cached global. `CachedGraphProvider` rebuilds
//! through its loader once the refresh interval has elapsed.

use super::graph::PolicyGraph;
use crate::features::policy_graph::domain::GraphBuildError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub trait GraphProvider: Send + Sync {
    /// Current graph snapshot
    fn graph(&self) -> Result<Arc<PolicyGraph>, GraphBuildError>;
}

/// Fixed graph, never rebuilt
#[derive(Debug, Clone)]
pub struct StaticGraphProvider {
    graph: Arc<PolicyGraph>,
}

impl StaticGraphProvider {
    pub fn new(graph: PolicyGraph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }
}

impl GraphProvider for StaticGraphProvider {
    fn graph(&self) -> Result<Arc<PolicyGraph>, GraphBuildError> {
        Ok(Arc::clone(&self.graph))
    }
}

struct Snapshot {
    graph: Arc<PolicyGraph>,
    built_at: Instant,
}

/// Loader-backed provider with a time-based refresh policy
///
/// A failed rebuild is returned to the caller and the stale snapshot is
/// dropped, so the next call retries.
pub struct CachedGraphProvider<F>
where
    F: Fn() -> Result<PolicyGraph, GraphBuildError> + Send + Sync,
{
    loader: F,
    refresh_interval: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<F> CachedGraphProvider<F>
where
    F: Fn() -> Result<PolicyGraph, GraphBuildError> + Send + Sync,
{
    pub fn new(loader: F, refresh_interval: Duration) -> Self {
        Self {
            loader,
            refresh_interval,
            snapshot: Mutex::new(None),
        }
    }

    /// Force a rebuild on the next `graph()` call
    pub fn invalidate(&self) {
        *self.snapshot.lock() = None;
    }

    /// Age of the current snapshot, if any
    pub fn age(&self) -> Option<Duration> {
        self.snapshot.lock().as_ref().map(|s| s.built_at.elapsed())
    }
}

impl<F> GraphProvider for CachedGraphProvider<F>
where
    F: Fn() -> Result<PolicyGraph, GraphBuildError> + Send + Sync,
{
    fn graph(&self) -> Result<Arc<PolicyGraph>, GraphBuildError> {
        let mut snapshot = self.snapshot.lock();
        if let Some(current) = snapshot.as_ref() {
            if current.built_at.elapsed() < self.refresh_interval {
                debug!("Graph cache hit (age {:?})", current.built_at.elapsed());
                return Ok(Arc::clone(&current.graph));
            }
        }

        *snapshot = None;
        let graph = Arc::new((self.loader)()?);
        info!(
            "Graph rebuilt: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        *snapshot = Some(Snapshot {
            graph: Arc::clone(&graph),
            built_at: Instant::now(),
        });
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Asset;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loader(counter: Arc<AtomicUsize>) -> impl Fn() -> Result<PolicyGraph, GraphBuildError> {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut graph = PolicyGraph::new();
            graph.add_asset(Asset::new("a", "server"))?;
            Ok(graph)
        }
    }

    #[test]
    fn test_cached_until_interval() {
        let builds = Arc::new(AtomicUsize::new(0));
        let provider =
            CachedGraphProvider::new(counting_loader(Arc::clone(&builds)), Duration::from_secs(300));

        let first = provider.graph().unwrap();
        let second = provider.graph().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_interval_always_rebuilds() {
        let builds = Arc::new(AtomicUsize::new(0));
        let provider = CachedGraphProvider::new(counting_loader(Arc::clone(&builds)), Duration::ZERO);
        provider.graph().unwrap();
        provider.graph().unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let builds = Arc::new(AtomicUsize::new(0));
        let provider =
            CachedGraphProvider::new(counting_loader(Arc::clone(&builds)), Duration::from_secs(300));
        provider.graph().unwrap();
        provider.invalidate();
        assert!(provider.age().is_none());
        provider.graph().unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_loader_error_propagates() {
        let provider = CachedGraphProvider::new(
            || Err(GraphBuildError::InvalidDefinition("boom".to_string())),
            Duration::from_secs(300),
        );
        assert!(provider.graph().is_err());
        assert!(provider.age().is_none());
    }
}
