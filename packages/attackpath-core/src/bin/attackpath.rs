//! Attack Path CLI
//!
//! # Usage
//!
//! ```bash
//! # Enumerate valid paths under a context
//! attackpath paths --graph graph.yaml --source internet --target db -c source_ip=10.1.2.3
//!
//! # Verify every path (policies from the path's IAM conditions, or --policies)
//! attackpath verify --graph graph.yaml --source internet --target db --format json
//!
//! # Verify and rank by threat score
//! attackpath score --graph graph.yaml --source internet --target db --cvss 8.1
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `attackpath_core=warn`).

use attackpath_core::config::AnalysisConfig;
use attackpath_core::features::policy_graph::{
    CachedGraphProvider, GraphDocument, GraphProvider, PolicyGraph,
};
use attackpath_core::features::smt::{policies_for_path, PathVerifier, PolicyStatement, ProofResult};
use attackpath_core::features::threat_scoring::{PathScoreInput, ThreatScorer};
use attackpath_core::{AttackPath, ContextValue, ExecutionContext, PathAnalyzer, VerificationResult};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "attackpath")]
#[command(about = "Attack path discovery and verification over a policy graph", long_about = None)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct Query {
    /// Graph document (YAML or JSON)
    #[arg(short, long)]
    graph: PathBuf,

    /// Source asset id
    #[arg(short, long)]
    source: String,

    /// Target asset id
    #[arg(short, long)]
    target: String,

    /// Context entry `key=value` (repeatable)
    #[arg(short = 'c', long = "context", value_parser = parse_context_entry)]
    context: Vec<(String, ContextValue)>,

    /// JSON object with context entries (merged before --context)
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Override paths.max_depth
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List valid attack paths with risk score and explanation
    Paths {
        #[command(flatten)]
        query: Query,
    },

    /// Formally verify each valid path
    Verify {
        #[command(flatten)]
        query: Query,

        /// Policy statements (JSON array) applied to every path
        #[arg(long)]
        policies: Option<PathBuf>,
    },

    /// Verify then rank paths by threat score
    Score {
        #[command(flatten)]
        query: Query,

        /// Policy statements (JSON array) applied to every path
        #[arg(long)]
        policies: Option<PathBuf>,

        /// CVSS base score of the exploited weakness
        #[arg(long)]
        cvss: Option<f64>,

        /// Number of CVEs associated with the path
        #[arg(long, default_value = "0")]
        cve_count: u32,

        /// Highest CVSS score among those CVEs
        #[arg(long)]
        max_cve_score: Option<f64>,
    },
}

fn parse_context_entry(raw: &str) -> Result<(String, ContextValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty context key in '{}'", raw));
    }
    Ok((key.to_string(), ContextValue::parse(value)))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("attackpath_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Paths { query } => {
            let analyzer = build_analyzer(&query, &mut config)?;
            let paths = analyzer.find_attack_paths(&query.source, &query.target, config.paths.use_cache)?;
            let mut reports = Vec::with_capacity(paths.len());
            for path in paths {
                reports.push(PathReport {
                    score: analyzer.score_path(&path)?,
                    explanation: analyzer.explain_path(&path),
                    path,
                });
            }
            reports.sort_by(|a, b| b.score.total_cmp(&a.score));
            emit(cli.format, &reports, print_paths)
        }
        Commands::Verify { query, policies } => {
            let analyzer = build_analyzer(&query, &mut config)?;
            let paths = analyzer.find_attack_paths(&query.source, &query.target, config.paths.use_cache)?;
            let proofs = verify_all(&analyzer, &paths, policies, &config)?;
            emit(cli.format, &proofs, print_proofs)
        }
        Commands::Score {
            query,
            policies,
            cvss,
            cve_count,
            max_cve_score,
        } => {
            let analyzer = build_analyzer(&query, &mut config)?;
            let paths = analyzer.find_attack_paths(&query.source, &query.target, config.paths.use_cache)?;
            let proofs = verify_all(&analyzer, &paths, policies, &config)?;

            let inputs: Vec<PathScoreInput> = proofs
                .iter()
                .map(|proof| {
                    let mut input = PathScoreInput::new(
                        proof.path.clone(),
                        proof.result == VerificationResult::Exploitable,
                    )
                    .with_cves(cve_count, max_cve_score);
                    input.cvss_base_score = cvss;
                    input
                })
                .collect();
            let scores = ThreatScorer::from_config(&config.scoring).score_multiple_paths(&inputs);
            emit(cli.format, &scores, |scores| {
                for score in scores {
                    println!("{}", score);
                    for recommendation in &score.recommendations {
                        println!("    - {}", recommendation);
                    }
                }
            })
        }
    }
}

fn build_analyzer(query: &Query, config: &mut AnalysisConfig) -> CliResult<PathAnalyzer> {
    if let Some(depth) = query.max_depth {
        config.paths.max_depth = depth;
    }

    let document_path = query.graph.clone();
    let provider = CachedGraphProvider::new(
        move || PolicyGraph::from_document(&GraphDocument::from_file(&document_path)?),
        config.graph.refresh_interval(),
    );
    let graph = provider.graph()?;

    let mut context = match &query.context_file {
        Some(path) => ExecutionContext::from_json(&serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => ExecutionContext::new(),
    };
    for (key, value) in &query.context {
        context.insert(key.clone(), value.clone());
    }

    Ok(PathAnalyzer::from_config(graph, context, &config.paths)?)
}

fn verify_all(
    analyzer: &PathAnalyzer,
    paths: &[AttackPath],
    policies: Option<PathBuf>,
    config: &AnalysisConfig,
) -> CliResult<Vec<ProofResult>> {
    let verifier = PathVerifier::from_config(&config.verification);
    match policies {
        Some(file) => {
            let statements: Vec<PolicyStatement> =
                serde_json::from_str(&std::fs::read_to_string(file)?)?;
            Ok(verifier.batch_verify_paths(paths, &statements, analyzer.context()))
        }
        None => Ok(paths
            .iter()
            .map(|path| {
                let statements = policies_for_path(analyzer.graph(), path);
                verifier.verify_path_exploitability(
                    path,
                    &statements,
                    analyzer.context(),
                    config.verification.timeout_ms,
                )
            })
            .collect()),
    }
}

#[derive(Serialize)]
struct PathReport {
    path: AttackPath,
    score: f64,
    explanation: Vec<String>,
}

fn emit<T: Serialize>(format: OutputFormat, items: &[T], text: impl Fn(&[T])) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Text if items.is_empty() => println!("No attack paths found."),
        OutputFormat::Text => text(items),
    }
    Ok(())
}

fn print_paths(reports: &[PathReport]) {
    for report in reports {
        println!("[{:>5.1}] {}", report.score, report.path);
        for line in &report.explanation {
            println!("        {}", line);
        }
    }
}

fn print_proofs(proofs: &[ProofResult]) {
    for proof in proofs {
        println!("{:<11} {}", proof.result.as_str().to_uppercase(), proof.path);
        println!("            {}", proof.explanation);
        if let Some(model) = &proof.model {
            for (name, value) in model {
                println!("            {} = {}", name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_entry_parsing() {
        assert_eq!(
            parse_context_entry("source_ip=10.1.2.3").unwrap(),
            ("source_ip".to_string(), ContextValue::String("10.1.2.3".to_string()))
        );
        assert_eq!(
            parse_context_entry("port=443").unwrap(),
            ("port".to_string(), ContextValue::Int(443))
        );
        assert_eq!(
            parse_context_entry("tag=a=b").unwrap().1,
            ContextValue::String("a=b".to_string())
        );
        assert!(parse_context_entry("no-separator").is_err());
        assert!(parse_context_entry("=value").is_err());
    }

    #[test]
    fn test_score_command_parsing() {
        let cli = Cli::try_parse_from([
            "attackpath", "--format", "json", "score", "-g", "graph.yaml", "-s", "internet",
            "-t", "db", "-c", "mfa_present=true", "--cvss", "8.1", "--cve-count", "2",
        ])
        .unwrap();
        assert!(cli.format == OutputFormat::Json);
        match cli.command {
            Commands::Score {
                query, cvss, cve_count, ..
            } => {
                assert_eq!(query.source, "internet");
                assert_eq!(query.context[0].1, ContextValue::Bool(true));
                assert_eq!(cvss, Some(8.1));
                assert_eq!(cve_count, 2);
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn test_query_requires_endpoints() {
        assert!(Cli::try_parse_from(["attackpath", "paths", "-g", "graph.yaml"]).is_err());
    }
}
