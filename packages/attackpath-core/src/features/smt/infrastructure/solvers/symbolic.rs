//! Bounded symbolic solver for the policy constraint fragment
//!
//! Formulas are put in negation normal form, then searched depth-first:
//! literals are absorbed into per-variable domains, disjunctions branch.
//! Each domain is decided exactly:
//!
//! - **Strings**: at most one fixed value; positive prefixes must form a
//!   chain; a witness is the longest prefix extended by the shortest suffix
//!   that avoids every excluded value and prefix.
//! - **Integers**: an interval minus finitely many excluded points.
//! - **Booleans**: a single fixed value.
//!
//! The search gives up with `Unknown` once the deadline or the node budget
//! is exhausted, or a string witness is not found within a bounded number
//! of candidate suffixes.

use super::{SolverBackend, SolverLimits, SolverResult};
use crate::features::smt::domain::{ComparisonOp, Model, ModelValue, SymExpr, VerificationError};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Candidate suffixes tried per string variable
const STRING_WITNESS_ATTEMPTS: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════
// Negation normal form
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Literal {
    Str {
        var: String,
        atom: StrAtom,
        positive: bool,
    },
    Int {
        var: String,
        op: ComparisonOp,
        value: i64,
    },
    Bool {
        var: String,
        value: bool,
    },
}

#[derive(Debug, Clone)]
enum StrAtom {
    Eq(String),
    Prefix(String),
}

#[derive(Debug, Clone)]
enum Nnf {
    Const(bool),
    Lit(Literal),
    And(Vec<Nnf>),
    Or(Vec<Nnf>),
}

fn to_nnf(expr: &SymExpr, negated: bool) -> Nnf {
    match expr {
        SymExpr::Const(b) => Nnf::Const(*b != negated),
        SymExpr::StrEq { var, value } => Nnf::Lit(Literal::Str {
            var: var.clone(),
            atom: StrAtom::Eq(value.clone()),
            positive: !negated,
        }),
        SymExpr::StrPrefix { var, prefix } => Nnf::Lit(Literal::Str {
            var: var.clone(),
            atom: StrAtom::Prefix(prefix.clone()),
            positive: !negated,
        }),
        SymExpr::IntCmp { var, op, value } => Nnf::Lit(Literal::Int {
            var: var.clone(),
            op: if negated { op.negate() } else { *op },
            value: *value,
        }),
        SymExpr::BoolEq { var, value } => Nnf::Lit(Literal::Bool {
            var: var.clone(),
            value: *value != negated,
        }),
        SymExpr::And(items) => {
            let items = items.iter().map(|item| to_nnf(item, negated)).collect();
            if negated {
                Nnf::Or(items)
            } else {
                Nnf::And(items)
            }
        }
        SymExpr::Or(items) => {
            let items = items.iter().map(|item| to_nnf(item, negated)).collect();
            if negated {
                Nnf::And(items)
            } else {
                Nnf::Or(items)
            }
        }
        SymExpr::Not(inner) => to_nnf(inner, !negated),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Per-variable domains
// ═══════════════════════════════════════════════════════════════════════════

enum Witness<T> {
    Found(T),
    /// Provably empty domain
    Empty,
    /// Search bound hit before a witness was found
    GaveUp,
}

#[derive(Debug, Clone, Default)]
struct StrDomain {
    fixed: Option<String>,
    conflicting_fixed: bool,
    excluded: BTreeSet<String>,
    prefixes: Vec<String>,
    excluded_prefixes: Vec<String>,
}

impl StrDomain {
    fn add(&mut self, atom: &StrAtom, positive: bool) {
        match (atom, positive) {
            (StrAtom::Eq(value), true) => match &self.fixed {
                Some(existing) if existing != value => self.conflicting_fixed = true,
                _ => self.fixed = Some(value.clone()),
            },
            (StrAtom::Eq(value), false) => {
                self.excluded.insert(value.clone());
            }
            (StrAtom::Prefix(prefix), true) => self.prefixes.push(prefix.clone()),
            (StrAtom::Prefix(prefix), false) => self.excluded_prefixes.push(prefix.clone()),
        }
    }

    fn admits(&self, candidate: &str) -> bool {
        !self.excluded.contains(candidate)
            && self.prefixes.iter().all(|p| candidate.starts_with(p.as_str()))
            && !self
                .excluded_prefixes
                .iter()
                .any(|q| candidate.starts_with(q.as_str()))
    }

    fn witness(&self) -> Witness<String> {
        if self.conflicting_fixed {
            return Witness::Empty;
        }
        if let Some(value) = &self.fixed {
            return if self.admits(value) {
                Witness::Found(value.clone())
            } else {
                Witness::Empty
            };
        }

        let longest = self
            .prefixes
            .iter()
            .max_by_key(|p| p.len())
            .cloned()
            .unwrap_or_default();
        if !self.prefixes.iter().all(|p| longest.starts_with(p.as_str())) {
            return Witness::Empty;
        }
        if self
            .excluded_prefixes
            .iter()
            .any(|q| longest.starts_with(q.as_str()))
        {
            return Witness::Empty;
        }

        // Finitely many exclusions remain, so some extension exists
        (0..STRING_WITNESS_ATTEMPTS)
            .map(|n| format!("{}{}", longest, shortlex_suffix(n)))
            .find(|candidate| self.admits(candidate))
            .map_or(Witness::GaveUp, Witness::Found)
    }
}

/// n-th string over `SUFFIX_ALPHABET` in shortlex order ("" first)
fn shortlex_suffix(mut n: usize) -> String {
    let base = SUFFIX_ALPHABET.len();
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(SUFFIX_ALPHABET[n % base]);
        n /= base;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Debug, Clone)]
struct IntDomain {
    lo: i128,
    hi: i128,
    excluded: BTreeSet<i64>,
}

impl Default for IntDomain {
    fn default() -> Self {
        Self {
            lo: i64::MIN as i128,
            hi: i64::MAX as i128,
            excluded: BTreeSet::new(),
        }
    }
}

impl IntDomain {
    fn add(&mut self, op: ComparisonOp, value: i64) {
        let v = value as i128;
        match op {
            ComparisonOp::Eq => {
                self.lo = self.lo.max(v);
                self.hi = self.hi.min(v);
            }
            ComparisonOp::Neq => {
                self.excluded.insert(value);
            }
            ComparisonOp::Lt => self.hi = self.hi.min(v - 1),
            ComparisonOp::Le => self.hi = self.hi.min(v),
            ComparisonOp::Gt => self.lo = self.lo.max(v + 1),
            ComparisonOp::Ge => self.lo = self.lo.max(v),
        }
    }

    /// Exact: spirals out from the value closest to zero; a window wider
    /// than the exclusion set must contain an admissible point
    fn witness(&self) -> Witness<i64> {
        if self.lo > self.hi {
            return Witness::Empty;
        }
        let start = 0i128.clamp(self.lo, self.hi);
        let radius = self.excluded.len() as i128 + 1;
        for offset in 0..=radius {
            for candidate in [start + offset, start - offset] {
                if candidate < self.lo || candidate > self.hi {
                    continue;
                }
                let candidate = candidate as i64;
                if !self.excluded.contains(&candidate) {
                    return Witness::Found(candidate);
                }
            }
        }
        Witness::Empty
    }
}

#[derive(Debug, Clone, Copy)]
enum BoolDomain {
    Fixed(bool),
    Conflict,
}

#[derive(Debug, Clone, Default)]
struct Store {
    strings: BTreeMap<String, StrDomain>,
    ints: BTreeMap<String, IntDomain>,
    bools: BTreeMap<String, BoolDomain>,
}

impl Store {
    /// Absorb a literal; false if that variable's domain became empty
    fn assume(&mut self, literal: &Literal) -> bool {
        match literal {
            Literal::Str {
                var,
                atom,
                positive,
            } => {
                let domain = self.strings.entry(var.clone()).or_default();
                domain.add(atom, *positive);
                !matches!(domain.witness(), Witness::Empty)
            }
            Literal::Int { var, op, value } => {
                let domain = self.ints.entry(var.clone()).or_default();
                domain.add(*op, *value);
                !matches!(domain.witness(), Witness::Empty)
            }
            Literal::Bool { var, value } => {
                let next = match self.bools.get(var) {
                    None => BoolDomain::Fixed(*value),
                    Some(BoolDomain::Fixed(existing)) if existing == value => {
                        BoolDomain::Fixed(*value)
                    }
                    Some(_) => BoolDomain::Conflict,
                };
                self.bools.insert(var.clone(), next);
                !matches!(next, BoolDomain::Conflict)
            }
        }
    }

    /// Concrete assignment, or `None` when a string witness was not found
    ///
    /// A name used with several sorts gets a `#int` / `#bool` suffix on the
    /// non-string entries.
    fn model(&self) -> Option<Model> {
        let mut model = Model::new();
        for (name, domain) in &self.strings {
            match domain.witness() {
                Witness::Found(value) => {
                    model.insert(name.clone(), ModelValue::String(value));
                }
                Witness::Empty | Witness::GaveUp => return None,
            }
        }
        for (name, domain) in &self.ints {
            match domain.witness() {
                Witness::Found(value) => {
                    model.insert(self.model_key(name, "int"), ModelValue::Int(value));
                }
                Witness::Empty | Witness::GaveUp => return None,
            }
        }
        for (name, domain) in &self.bools {
            match domain {
                BoolDomain::Fixed(value) => {
                    model.insert(self.model_key(name, "bool"), ModelValue::Bool(*value));
                }
                BoolDomain::Conflict => return None,
            }
        }
        Some(model)
    }

    fn model_key(&self, name: &str, sort: &str) -> String {
        let shadowed = self.strings.contains_key(name)
            || (sort == "bool" && self.ints.contains_key(name));
        if shadowed {
            format!("{}#{}", name, sort)
        } else {
            name.to_string()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Search
// ═══════════════════════════════════════════════════════════════════════════

enum Outcome {
    Sat(Store),
    Unsat,
    Unknown,
}

struct Search {
    deadline: Instant,
    budget: usize,
    nodes: usize,
}

impl Search {
    fn exhausted(&self) -> bool {
        self.nodes >= self.budget || Instant::now() >= self.deadline
    }

    fn solve<'a>(&mut self, mut goals: Vec<&'a Nnf>, mut store: Store) -> Outcome {
        if self.exhausted() {
            return Outcome::Unknown;
        }
        self.nodes += 1;

        let mut branches: Option<&'a [Nnf]> = None;
        while let Some(goal) = goals.pop() {
            match goal {
                Nnf::Const(true) => {}
                Nnf::Const(false) => return Outcome::Unsat,
                Nnf::Lit(literal) => {
                    if !store.assume(literal) {
                        return Outcome::Unsat;
                    }
                }
                Nnf::And(items) => goals.extend(items.iter()),
                Nnf::Or(items) => {
                    branches = Some(items.as_slice());
                    break;
                }
            }
        }

        let Some(branches) = branches else {
            return Outcome::Sat(store);
        };

        let mut undecided = false;
        for branch in branches {
            let mut next = goals.clone();
            next.push(branch);
            match self.solve(next, store.clone()) {
                Outcome::Sat(found) => return Outcome::Sat(found),
                Outcome::Unsat => {}
                Outcome::Unknown => {
                    undecided = true;
                    if self.exhausted() {
                        return Outcome::Unknown;
                    }
                }
            }
        }

        if undecided {
            Outcome::Unknown
        } else {
            Outcome::Unsat
        }
    }
}

/// Built-in solver; stateless, one search per `check`
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicSolver;

impl SymbolicSolver {
    pub fn new() -> Self {
        Self
    }
}

impl SolverBackend for SymbolicSolver {
    fn name(&self) -> &'static str {
        "symbolic"
    }

    fn check(
        &self,
        assertions: &[SymExpr],
        limits: &SolverLimits,
    ) -> Result<SolverResult, VerificationError> {
        let root = Nnf::And(assertions.iter().map(|a| to_nnf(a, false)).collect());
        let mut search = Search {
            deadline: Instant::now() + limits.timeout,
            budget: limits.max_search_nodes.max(1),
            nodes: 0,
        };

        let result = match search.solve(vec![&root], Store::default()) {
            Outcome::Sat(store) => match store.model() {
                Some(model) => SolverResult::Sat(Some(model)),
                None => SolverResult::Unknown,
            },
            Outcome::Unsat => SolverResult::Unsat,
            Outcome::Unknown => SolverResult::Unknown,
        };

        tracing::debug!(
            "symbolic solver: {} assertions, {} nodes → {:?}",
            assertions.len(),
            search.nodes,
            result.to_verdict()
        );
        Ok(result)
    }
}
