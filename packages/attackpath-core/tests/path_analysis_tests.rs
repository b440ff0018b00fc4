//! Path enumeration, pruning, caching and scoring over fixture graphs

mod common;

use attackpath_core::{AttackPath, AttackPathError, ExecutionContext, PathAnalyzer};
use common::assertions::{assert_paths, assert_well_formed};
use common::*;
use std::sync::Arc;

#[test]
fn test_linear_chain_single_path() {
    let analyzer = analyzer(linear_chain(), ExecutionContext::new(), 5);
    let paths = analyzer.find_attack_paths("internet", "db", true).unwrap();
    assert_paths(&paths, &[&["internet", "web", "app", "db"]]);

    let metrics = analyzer.get_metrics();
    assert_eq!(metrics.total_paths_found, 1);
    assert_eq!(metrics.paths_pruned, 0);
    assert_eq!(metrics.cache_size, 1);
}

#[test]
fn test_mismatched_iam_condition_prunes_only_db() {
    let context = ExecutionContext::new().with("source_ip", "192.168.1.50");
    let analyzer = analyzer(gated_chain(), context, 5);

    assert!(analyzer.find_attack_paths("internet", "db", true).unwrap().is_empty());
    assert_paths(
        &analyzer.find_attack_paths("internet", "app", true).unwrap(),
        &[&["internet", "web", "app"]],
    );
    assert_paths(
        &analyzer.find_attack_paths("internet", "web", true).unwrap(),
        &[&["internet", "web"]],
    );
}

#[test]
fn test_matching_iam_condition_keeps_db() {
    let context = ExecutionContext::new().with("source_ip", "10.4.5.6");
    let analyzer = analyzer(gated_chain(), context, 5);
    assert_paths(
        &analyzer.find_attack_paths("internet", "db", true).unwrap(),
        &[&["internet", "web", "app", "db"]],
    );
}

#[test]
fn test_missing_context_key_prunes() {
    let analyzer = analyzer(gated_chain(), ExecutionContext::new(), 5);
    assert!(analyzer.find_attack_paths("internet", "db", false).unwrap().is_empty());
    assert_eq!(analyzer.get_metrics().paths_pruned, 1);
}

#[test]
fn test_diamond_routes_follow_context() {
    let with_mfa = analyzer(
        diamond(),
        ExecutionContext::new().with("mfa_present", true),
        5,
    );
    let paths = with_mfa.find_attack_paths("internet", "vault", false).unwrap();
    assert_eq!(paths.len(), 2);
    assert_well_formed(&paths, "internet", "vault", 5);

    let without_mfa = analyzer(diamond(), ExecutionContext::new(), 5);
    assert_paths(
        &without_mfa.find_attack_paths("internet", "vault", false).unwrap(),
        &[&["internet", "web", "app", "vault"]],
    );
    assert_eq!(without_mfa.get_metrics().paths_pruned, 1);
}

#[test]
fn test_cache_idempotence() {
    let analyzer = analyzer(diamond(), ExecutionContext::new(), 5);
    let first = analyzer.find_attack_paths("internet", "vault", true).unwrap();
    let before = analyzer.get_metrics();

    let second = analyzer.find_attack_paths("internet", "vault", true).unwrap();
    let after = analyzer.get_metrics();

    assert_eq!(first, second);
    assert_eq!(before.total_paths_found, after.total_paths_found);
    assert_eq!(before.paths_pruned, after.paths_pruned);
    assert_eq!(after.cache_hits, before.cache_hits + 1);
}

#[test]
fn test_uncached_queries_recount() {
    let analyzer = analyzer(linear_chain(), ExecutionContext::new(), 5);
    analyzer.find_attack_paths("internet", "db", false).unwrap();
    analyzer.find_attack_paths("internet", "db", false).unwrap();
    let metrics = analyzer.get_metrics();
    assert_eq!(metrics.total_paths_found, 2);
    assert_eq!(metrics.cache_size, 0);
}

#[test]
fn test_clear_cache_then_recompute() {
    let analyzer = analyzer(linear_chain(), ExecutionContext::new(), 5);
    analyzer.find_attack_paths("internet", "db", true).unwrap();
    analyzer.clear_cache();
    assert_eq!(analyzer.get_metrics().cache_size, 0);

    analyzer.find_attack_paths("internet", "db", true).unwrap();
    let metrics = analyzer.get_metrics();
    assert_eq!(metrics.total_paths_found, 2);
    assert_eq!(metrics.cache_size, 1);
}

#[test]
fn test_node_not_found_for_source_and_target() {
    let analyzer = analyzer(linear_chain(), ExecutionContext::new(), 5);

    let err = analyzer.find_attack_paths("nowhere", "db", true).unwrap_err();
    assert!(matches!(err, AttackPathError::NodeNotFound(ref id) if id == "nowhere"));

    let err = analyzer.find_attack_paths("internet", "nowhere", true).unwrap_err();
    assert!(matches!(err, AttackPathError::NodeNotFound(ref id) if id == "nowhere"));
}

#[test]
fn test_edge_to_missing_asset_is_integrity_error() {
    let mut graph = linear_chain();
    graph.add_edge("app", "ghost", attackpath_core::PolicyEdge::network());
    graph.add_edge("ghost", "db", attackpath_core::PolicyEdge::network());

    let analyzer = analyzer(graph, ExecutionContext::new(), 5);
    let err = analyzer.find_attack_paths("internet", "db", false).unwrap_err();
    assert!(matches!(err, AttackPathError::GraphIntegrity(_)));
    assert!(!err.is_node_not_found());
}

#[test]
fn test_depth_limits_enumeration() {
    let graph = layered(3, 2);
    for depth in 1..=4 {
        let analyzer = analyzer(graph.clone(), ExecutionContext::new(), depth);
        let paths = analyzer.find_attack_paths("src", "dst", false).unwrap();
        assert_well_formed(&paths, "src", "dst", depth);
        // src → 3 layers → dst needs exactly 4 edges; 2^3 choices
        let expected = if depth >= 4 { 8 } else { 0 };
        assert_eq!(paths.len(), expected, "depth {}", depth);
    }
}

#[test]
fn test_max_paths_stops_early() {
    let config = attackpath_core::config::PathAnalysisConfig {
        max_depth: 5,
        use_cache: true,
        max_paths: 3,
    };
    let analyzer =
        PathAnalyzer::from_config(Arc::new(layered(3, 3)), ExecutionContext::new(), &config)
            .unwrap();
    assert_eq!(analyzer.find_attack_paths("src", "dst", false).unwrap().len(), 3);
}

#[test]
fn test_score_decreases_with_length() {
    let graph = GraphBuilder::new()
        .asset("a")
        .asset("b")
        .asset("c")
        .asset_with("t", attackpath_core::Criticality::High)
        .network("a", "t")
        .network("a", "b")
        .network("b", "c")
        .network("c", "t")
        .build();
    let analyzer = analyzer(graph, ExecutionContext::new(), 5);

    let short = analyzer.score_path(&AttackPath::from(vec!["a", "t"])).unwrap();
    let long = analyzer
        .score_path(&AttackPath::from(vec!["a", "b", "c", "t"]))
        .unwrap();
    assert_eq!(short, 65.0);
    assert_eq!(long, 55.0);
    assert!(short >= long);
}

#[test]
fn test_rank_paths_orders_by_score() {
    let context = ExecutionContext::new().with("mfa_present", "true");
    let analyzer = analyzer(diamond(), context, 5);
    let paths = analyzer.find_attack_paths("internet", "vault", false).unwrap();
    let ranked = analyzer.rank_paths(&paths).unwrap();

    assert_eq!(ranked.len(), 2);
    assert!(ranked[0].score >= ranked[1].score);
    // Shorter, conditioned route scores higher
    assert_eq!(ranked[0].path.nodes(), ["internet", "bastion", "vault"]);
}

#[test]
fn test_explain_gated_path() {
    let context = ExecutionContext::new().with("source_ip", "10.0.0.7");
    let analyzer = analyzer(gated_chain(), context, 5);
    let path = analyzer.find_attack_paths("internet", "db", true).unwrap().remove(0);
    let lines = analyzer.explain_path(&path);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("internet can reach web"));
    assert!(lines[2].starts_with("app has permission to access db due to an IAM policy"));
}

#[test]
fn test_parallel_queries_match_sequential() {
    let analyzer = analyzer(diamond(), ExecutionContext::new(), 5);
    let queries = vec![
        ("internet".to_string(), "vault".to_string()),
        ("internet".to_string(), "app".to_string()),
        ("missing".to_string(), "vault".to_string()),
    ];
    let results = analyzer.find_attack_paths_parallel(&queries, false);
    assert_eq!(results.len(), 3);

    let sequential = analyzer.find_attack_paths("internet", "vault", false).unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &sequential);
    assert_eq!(results[1].as_ref().unwrap().len(), 1);
    assert!(results[2].as_ref().unwrap_err().is_node_not_found());
}
