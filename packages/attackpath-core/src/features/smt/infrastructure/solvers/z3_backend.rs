//! Z3 SMT Solver Backend
//!
//! Translates `SymExpr` into Z3's string, integer and boolean theories.
//! A fresh `Context` is built for every check, so nothing outlives a call
//! and concurrent checks never share solver state.
//!
//! Only available when compiled with `--features z3`.
//!
//! ## Installation
//!
//! ```bash
//! # Install Z3 library
//! apt-get install libz3-dev  # Linux
//! brew install z3            # macOS
//!
//! # Build with Z3 support
//! cargo build --release --features z3
//! ```

#![cfg(feature = "z3")]

use super::{SolverBackend, SolverLimits, SolverResult};
use crate::features::smt::domain::{
    ComparisonOp, Model, ModelValue, Sort, SymExpr, SymVar, VerificationError,
};
use std::collections::HashMap;
use z3::ast::{Ast, Bool, Int, String as Z3String};
use z3::{Config, Context, SatResult, Solver};

/// Z3-backed solver
#[derive(Debug, Clone, Copy, Default)]
pub struct Z3Backend;

impl Z3Backend {
    pub fn new() -> Self {
        Self
    }
}

/// Per-check translation state
struct Translator<'ctx> {
    ctx: &'ctx Context,
    strings: HashMap<String, Z3String<'ctx>>,
    ints: HashMap<String, Int<'ctx>>,
    bools: HashMap<String, Bool<'ctx>>,
}

impl<'ctx> Translator<'ctx> {
    fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            strings: HashMap::new(),
            ints: HashMap::new(),
            bools: HashMap::new(),
        }
    }

    fn string_var(&mut self, name: &str) -> Z3String<'ctx> {
        let ctx = self.ctx;
        self.strings
            .entry(name.to_string())
            .or_insert_with(|| Z3String::new_const(ctx, name))
            .clone()
    }

    fn int_var(&mut self, name: &str) -> Int<'ctx> {
        let ctx = self.ctx;
        self.ints
            .entry(name.to_string())
            .or_insert_with(|| Int::new_const(ctx, name))
            .clone()
    }

    fn bool_var(&mut self, name: &str) -> Bool<'ctx> {
        let ctx = self.ctx;
        self.bools
            .entry(name.to_string())
            .or_insert_with(|| Bool::new_const(ctx, name))
            .clone()
    }

    fn literal(&self, value: &str) -> Result<Z3String<'ctx>, VerificationError> {
        Z3String::from_str(self.ctx, value)
            .map_err(|e| VerificationError::Backend(format!("invalid string literal: {}", e)))
    }

    fn translate(&mut self, expr: &SymExpr) -> Result<Bool<'ctx>, VerificationError> {
        Ok(match expr {
            SymExpr::Const(b) => Bool::from_bool(self.ctx, *b),
            SymExpr::StrEq { var, value } => {
                let var = self.string_var(var);
                var._eq(&self.literal(value)?)
            }
            SymExpr::StrPrefix { var, prefix } => {
                let var = self.string_var(var);
                self.literal(prefix)?.prefix(&var)
            }
            SymExpr::IntCmp { var, op, value } => {
                let var = self.int_var(var);
                let value = Int::from_i64(self.ctx, *value);
                match op {
                    ComparisonOp::Eq => var._eq(&value),
                    ComparisonOp::Neq => var._eq(&value).not(),
                    ComparisonOp::Lt => var.lt(&value),
                    ComparisonOp::Le => var.le(&value),
                    ComparisonOp::Gt => var.gt(&value),
                    ComparisonOp::Ge => var.ge(&value),
                }
            }
            SymExpr::BoolEq { var, value } => {
                let var = self.bool_var(var);
                var._eq(&Bool::from_bool(self.ctx, *value))
            }
            SymExpr::And(items) => {
                let items = self.translate_all(items)?;
                let refs: Vec<&Bool<'ctx>> = items.iter().collect();
                Bool::and(self.ctx, &refs)
            }
            SymExpr::Or(items) => {
                let items = self.translate_all(items)?;
                let refs: Vec<&Bool<'ctx>> = items.iter().collect();
                Bool::or(self.ctx, &refs)
            }
            SymExpr::Not(inner) => self.translate(inner)?.not(),
        })
    }

    fn translate_all(&mut self, items: &[SymExpr]) -> Result<Vec<Bool<'ctx>>, VerificationError> {
        items.iter().map(|item| self.translate(item)).collect()
    }

    fn extract_model(&self, model: &z3::Model<'ctx>, vars: &[SymVar]) -> Model {
        let mut out = Model::new();
        for var in vars {
            let shadowed = var.sort != Sort::Str && self.strings.contains_key(&var.name);
            let key = if shadowed {
                format!("{}#{}", var.name, var.sort.to_string().to_lowercase())
            } else {
                var.name.clone()
            };
            let value = match var.sort {
                Sort::Str => self
                    .strings
                    .get(&var.name)
                    .and_then(|ast| model.eval(ast, true))
                    .and_then(|v| v.as_string())
                    .map(ModelValue::String),
                Sort::Int => self
                    .ints
                    .get(&var.name)
                    .and_then(|ast| model.eval(ast, true))
                    .and_then(|v| v.as_i64())
                    .map(ModelValue::Int),
                Sort::Bool => self
                    .bools
                    .get(&var.name)
                    .and_then(|ast| model.eval(ast, true))
                    .and_then(|v| v.as_bool())
                    .map(ModelValue::Bool),
            };
            if let Some(value) = value {
                out.insert(key, value);
            }
        }
        out
    }
}

impl SolverBackend for Z3Backend {
    fn name(&self) -> &'static str {
        "z3"
    }

    fn check(
        &self,
        assertions: &[SymExpr],
        limits: &SolverLimits,
    ) -> Result<SolverResult, VerificationError> {
        let mut cfg = Config::new();
        let timeout_ms = u64::try_from(limits.timeout.as_millis()).unwrap_or(u64::MAX);
        cfg.set_timeout_msec(timeout_ms.max(1));
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let mut translator = Translator::new(&ctx);
        let mut vars: Vec<SymVar> = Vec::new();
        for assertion in assertions {
            solver.assert(&translator.translate(assertion)?);
            for var in assertion.variables() {
                if !vars.contains(&var) {
                    vars.push(var);
                }
            }
        }

        Ok(match solver.check() {
            SatResult::Sat => SolverResult::Sat(
                solver
                    .get_model()
                    .map(|model| translator.extract_model(&model, &vars)),
            ),
            SatResult::Unsat => SolverResult::Unsat,
            SatResult::Unknown => {
                tracing::warn!(
                    "Z3 returned unknown: {}",
                    solver.get_reason_unknown().unwrap_or_default()
                );
                SolverResult::Unknown
            }
        })
    }
}
