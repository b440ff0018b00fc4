//! Path Analyzer
//!
//! Enumerates bounded-depth simple paths between two assets and keeps those
//! whose IAM steps are permitted under the bound execution context.
//!
//! Complexity: enumeration visits every simple path of at most `max_depth`
//! edges, O(b^d) for branching factor b. Callers bound `max_depth`; there is
//! no mid-flight cancellation.
//!
//! Thread safety: the cache and counters sit behind one mutex, taken only
//! around lookups and updates, never during enumeration.

use crate::config::PathAnalysisConfig;
use crate::errors::{AttackPathError, Result};
use crate::features::condition_eval::ConditionEvaluator;
use crate::features::path_analysis::domain::{scoring, AnalysisMetrics, ScoredPath};
use crate::features::policy_graph::PolicyGraph;
use crate::shared::models::{condition_is_empty, AttackPath, ExecutionContext, PolicyEdge};
use parking_lot::Mutex;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct AnalyzerState {
    cache: HashMap<(String, String), Vec<AttackPath>>,
    total_paths_found: u64,
    paths_pruned: u64,
    evaluation_time: Duration,
    cache_hits: u64,
}

/// Per-query enumeration tallies
#[derive(Default)]
struct Enumeration {
    accepted: Vec<AttackPath>,
    pruned: u64,
    stopped: bool,
}

pub struct PathAnalyzer {
    graph: Arc<PolicyGraph>,
    context: ExecutionContext,
    max_depth: usize,
    /// 0 = unlimited
    max_paths: usize,
    evaluator: ConditionEvaluator,
    state: Mutex<AnalyzerState>,
}

impl PathAnalyzer {
    /// Create an analyzer bound to one graph and context
    ///
    /// `max_depth` counts edges and must be at least 1.
    pub fn new(
        graph: Arc<PolicyGraph>,
        context: ExecutionContext,
        max_depth: usize,
    ) -> Result<Self> {
        if max_depth == 0 {
            return Err(AttackPathError::InvalidDepth(max_depth));
        }
        tracing::info!(
            "path_analyzer_initialized (nodes={}, edges={}, max_depth={}, context_keys={})",
            graph.node_count(),
            graph.edge_count(),
            max_depth,
            context.len()
        );
        Ok(Self {
            graph,
            context,
            max_depth,
            max_paths: 0,
            evaluator: ConditionEvaluator::new(),
            state: Mutex::new(AnalyzerState::default()),
        })
    }

    pub fn from_config(
        graph: Arc<PolicyGraph>,
        context: ExecutionContext,
        config: &PathAnalysisConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut analyzer = Self::new(graph, context, config.max_depth)?;
        analyzer.max_paths = config.max_paths;
        Ok(analyzer)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn graph(&self) -> &PolicyGraph {
        &self.graph
    }

    /// Valid attack paths from `source` to `target`, in discovery order
    ///
    /// With `use_cache`, a previous result for the same pair is returned
    /// untouched and the counters do not move.
    pub fn find_attack_paths(
        &self,
        source: &str,
        target: &str,
        use_cache: bool,
    ) -> Result<Vec<AttackPath>> {
        let src = self
            .graph
            .node_index(source)
            .ok_or_else(|| AttackPathError::node_not_found(source))?;
        let dst = self
            .graph
            .node_index(target)
            .ok_or_else(|| AttackPathError::node_not_found(target))?;

        let key = (source.to_string(), target.to_string());
        if use_cache {
            let mut state = self.state.lock();
            if let Some(paths) = state.cache.get(&key).cloned() {
                state.cache_hits += 1;
                tracing::debug!("Path cache hit: {} -> {}", source, target);
                return Ok(paths);
            }
        }

        let start = Instant::now();
        self.require_asset(src)?;
        self.require_asset(dst)?;

        let mut run = Enumeration::default();
        if src != dst {
            let mut stack = vec![src];
            self.walk(src, dst, &mut stack, &mut run)?;
        }
        let elapsed = start.elapsed();

        tracing::debug!(
            "Enumerated {} -> {}: {} accepted, {} pruned in {:?}{}",
            source,
            target,
            run.accepted.len(),
            run.pruned,
            elapsed,
            if run.stopped { " (max_paths reached)" } else { "" }
        );

        let mut state = self.state.lock();
        state.total_paths_found += run.accepted.len() as u64;
        state.paths_pruned += run.pruned;
        state.evaluation_time += elapsed;
        if use_cache {
            state.cache.entry(key).or_insert_with(|| run.accepted.clone());
        }
        Ok(run.accepted)
    }

    /// Run independent queries, on the rayon pool when `parallel` is enabled
    ///
    /// Results line up with `queries`.
    pub fn find_attack_paths_parallel(
        &self,
        queries: &[(String, String)],
        use_cache: bool,
    ) -> Vec<Result<Vec<AttackPath>>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            queries
                .par_iter()
                .map(|(source, target)| self.find_attack_paths(source, target, use_cache))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            queries
                .iter()
                .map(|(source, target)| self.find_attack_paths(source, target, use_cache))
                .collect()
        }
    }

    fn walk(
        &self,
        current: NodeIndex,
        dst: NodeIndex,
        stack: &mut Vec<NodeIndex>,
        run: &mut Enumeration,
    ) -> Result<()> {
        // Edges used so far equals stack.len() - 1; one more must fit
        if stack.len() > self.max_depth {
            return Ok(());
        }

        for next in self.graph.successors(current) {
            if run.stopped {
                return Ok(());
            }
            if stack.contains(&next) {
                continue;
            }
            self.require_asset(next)?;

            stack.push(next);
            if next == dst {
                let path = AttackPath::new(
                    stack
                        .iter()
                        .map(|idx| self.graph.node_id(*idx).to_string())
                        .collect(),
                );
                if self.is_valid(&path) {
                    run.accepted.push(path);
                    if self.max_paths > 0 && run.accepted.len() >= self.max_paths {
                        run.stopped = true;
                    }
                } else {
                    run.pruned += 1;
                }
            } else {
                self.walk(next, dst, stack, run)?;
            }
            stack.pop();
        }
        Ok(())
    }

    fn require_asset(&self, idx: NodeIndex) -> Result<()> {
        let id = self.graph.node_id(idx);
        if self.graph.asset(id).is_none() {
            tracing::error!("Graph integrity violation: node '{}' has no asset", id);
            return Err(AttackPathError::integrity(format!(
                "edge endpoint '{}' has no asset definition",
                id
            )));
        }
        Ok(())
    }

    fn is_valid(&self, path: &AttackPath) -> bool {
        path.steps()
            .all(|(from, to)| self.chosen_edge(from, to).is_some())
    }

    fn traversable(&self, edge: &PolicyEdge) -> bool {
        match edge {
            PolicyEdge::Network { .. } => true,
            PolicyEdge::Iam { condition, .. } => self
                .evaluator
                .is_satisfied(&self.context, condition.as_ref()),
        }
    }

    /// First traversable edge for a step, in insertion order
    fn chosen_edge(&self, from: &str, to: &str) -> Option<&PolicyEdge> {
        self.graph
            .edges_between(from, to)
            .into_iter()
            .find(|edge| self.traversable(edge))
    }

    /// One line per step naming the rule or grant that allows it
    pub fn explain_path(&self, path: &AttackPath) -> Vec<String> {
        if path.len() < 2 {
            return Vec::new();
        }

        path.steps()
            .map(|(from, to)| match self.chosen_edge(from, to) {
                Some(PolicyEdge::Network {
                    rule_name,
                    protocol,
                    port,
                }) => {
                    let mut line = format!("{} can reach {} due to an allowed network rule", from, to);
                    let detail: Vec<String> = [
                        rule_name.as_ref().map(|name| format!("rule '{}'", name)),
                        match (protocol, port) {
                            (Some(proto), Some(port)) => Some(format!("{}/{}", proto, port)),
                            (Some(proto), None) => Some(proto.clone()),
                            (None, Some(port)) => Some(format!("port {}", port)),
                            (None, None) => None,
                        },
                    ]
                    .into_iter()
                    .flatten()
                    .collect();
                    if !detail.is_empty() {
                        line.push_str(&format!(" ({})", detail.join(", ")));
                    }
                    line
                }
                Some(PolicyEdge::Iam {
                    action,
                    condition,
                    policy_name,
                }) => {
                    let mut line = format!(
                        "{} has permission to access {} due to an IAM policy (action: {}",
                        from, to, action
                    );
                    if let Some(name) = policy_name {
                        line.push_str(&format!(", policy: {}", name));
                    }
                    if let Some(condition) = condition.as_ref().filter(|c| !condition_is_empty(c)) {
                        line.push_str(&format!(", condition satisfied: {}", condition));
                    }
                    line.push(')');
                    line
                }
                None if self.graph.edges_between(from, to).is_empty() => {
                    format!("{} has no edge to {}", from, to)
                }
                None => format!(
                    "{} cannot reach {}: no edge is permitted under the current context",
                    from, to
                ),
            })
            .collect()
    }

    /// Heuristic risk score in 0..=100
    ///
    /// base 10, plus a length bonus of `max(0, 25 - 5 * (len - 2))`, plus the
    /// target's criticality bonus, plus 5 per IAM step and 3 more when that
    /// step carried a non-empty condition. Steps are judged by their chosen
    /// edge; a step with no permitted edge adds nothing.
    pub fn score_path(&self, path: &AttackPath) -> Result<f64> {
        if path.len() < 2 {
            return Ok(0.0);
        }

        for id in path.nodes() {
            let idx = self
                .graph
                .node_index(id)
                .ok_or_else(|| AttackPathError::node_not_found(id.as_str()))?;
            self.require_asset(idx)?;
        }

        let target = path
            .target()
            .and_then(|id| self.graph.asset(id))
            .ok_or_else(|| AttackPathError::integrity("path target has no asset"))?;

        let extra_nodes = (path.len() - 2) as f64;
        let length_bonus = (scoring::MAX_LENGTH_BONUS
            - scoring::LENGTH_PENALTY_PER_NODE * extra_nodes)
            .max(0.0);

        let mut score = scoring::BASE + length_bonus + target.criticality.target_bonus();
        for (from, to) in path.steps() {
            if let Some(edge) = self.chosen_edge(from, to) {
                if edge.is_iam() {
                    score += scoring::IAM_STEP;
                    if edge.has_condition() {
                        score += scoring::CONDITIONED_IAM_STEP;
                    }
                }
            }
        }

        Ok(score.clamp(0.0, scoring::MAX_SCORE))
    }

    /// Score and sort, highest first; ties keep input order
    pub fn rank_paths(&self, paths: &[AttackPath]) -> Result<Vec<ScoredPath>> {
        let mut scored = paths
            .iter()
            .map(|path| {
                Ok(ScoredPath {
                    path: path.clone(),
                    score: self.score_path(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(scored)
    }

    pub fn get_metrics(&self) -> AnalysisMetrics {
        let state = self.state.lock();
        AnalysisMetrics {
            total_paths_found: state.total_paths_found,
            paths_pruned: state.paths_pruned,
            evaluation_time: state.evaluation_time,
            cache_size: state.cache.len(),
            cache_hits: state.cache_hits,
        }
    }

    /// Drop cached results; cumulative counters are kept
    pub fn clear_cache(&self) {
        let mut state = self.state.lock();
        let dropped = state.cache.len();
        state.cache.clear();
        tracing::debug!("Path cache cleared ({} entries)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Asset, Criticality};
    use serde_json::json;

    fn graph() -> PolicyGraph {
        let mut graph = PolicyGraph::new();
        for id in ["internet", "web", "app"] {
            graph.add_asset(Asset::new(id, "server")).unwrap();
        }
        graph
            .add_asset(Asset::new("db", "database").with_criticality(Criticality::Critical))
            .unwrap();
        graph.add_edge_checked("internet", "web", PolicyEdge::network()).unwrap();
        graph.add_edge_checked("web", "app", PolicyEdge::network()).unwrap();
        graph
            .add_edge_checked(
                "app",
                "db",
                PolicyEdge::iam_with_condition(
                    "rds:Connect",
                    json!({"IpAddress:source_ip": "10.0.0.0/8"}),
                ),
            )
            .unwrap();
        graph
    }

    fn analyzer(source_ip: &str) -> PathAnalyzer {
        PathAnalyzer::new(
            Arc::new(graph()),
            ExecutionContext::new().with("source_ip", source_ip),
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = PathAnalyzer::new(Arc::new(graph()), ExecutionContext::new(), 0)
            .err()
            .unwrap();
        assert!(matches!(err, AttackPathError::InvalidDepth(0)));
    }

    #[test]
    fn test_condition_gates_iam_step() {
        let allowed = analyzer("10.1.2.3");
        let paths = allowed.find_attack_paths("internet", "db", true).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes(), ["internet", "web", "app", "db"]);

        let blocked = analyzer("203.0.113.9");
        assert!(blocked.find_attack_paths("internet", "db", true).unwrap().is_empty());
        assert_eq!(blocked.get_metrics().paths_pruned, 1);
        assert_eq!(blocked.find_attack_paths("internet", "app", true).unwrap().len(), 1);
    }

    #[test]
    fn test_depth_bound() {
        let shallow =
            PathAnalyzer::new(Arc::new(graph()), ExecutionContext::new(), 2).unwrap();
        assert_eq!(shallow.find_attack_paths("internet", "app", false).unwrap().len(), 1);
        assert!(shallow.find_attack_paths("internet", "db", false).unwrap().is_empty());
    }

    #[test]
    fn test_same_source_and_target() {
        let analyzer = analyzer("10.0.0.1");
        assert!(analyzer.find_attack_paths("web", "web", false).unwrap().is_empty());
    }

    #[test]
    fn test_explain_path() {
        let analyzer = analyzer("10.0.0.1");
        let path = AttackPath::from(vec!["internet", "web", "app", "db"]);
        let lines = analyzer.explain_path(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "internet can reach web due to an allowed network rule");
        assert!(lines[2].contains("action: rds:Connect"));
        assert!(lines[2].contains("condition satisfied"));
        assert!(analyzer.explain_path(&AttackPath::from(vec!["web"])).is_empty());
    }

    #[test]
    fn test_score_components() {
        let analyzer = analyzer("10.0.0.1");
        // 10 + 15 (4 nodes) + 40 (critical) + 5 (iam) + 3 (conditioned)
        let score = analyzer
            .score_path(&AttackPath::from(vec!["internet", "web", "app", "db"]))
            .unwrap();
        assert_eq!(score, 73.0);

        // 10 + 25 + 0
        let score = analyzer
            .score_path(&AttackPath::from(vec!["internet", "web"]))
            .unwrap();
        assert_eq!(score, 35.0);
        assert_eq!(analyzer.score_path(&AttackPath::from(vec!["web"])).unwrap(), 0.0);
    }

    #[test]
    fn test_score_unknown_node() {
        let analyzer = analyzer("10.0.0.1");
        let err = analyzer
            .score_path(&AttackPath::from(vec!["internet", "mars"]))
            .unwrap_err();
        assert!(err.is_node_not_found());
    }

    #[test]
    fn test_clear_cache_keeps_counters() {
        let analyzer = analyzer("10.0.0.1");
        analyzer.find_attack_paths("internet", "db", true).unwrap();
        assert_eq!(analyzer.get_metrics().cache_size, 1);
        analyzer.clear_cache();
        let metrics = analyzer.get_metrics();
        assert_eq!(metrics.cache_size, 0);
        assert_eq!(metrics.total_paths_found, 1);
    }
}
