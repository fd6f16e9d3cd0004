// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::error::EngineError;
use super::field::{Field, FieldRole};
use super::formulas::{FORMULAS, Formula};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::error;

static STANDARD: Lazy<DependencyGraph> = Lazy::new(|| {
    let graph = DependencyGraph::assemble(FORMULAS);
    if let Err(err) = graph.validate() {
        error!(%err, "formula table failed validation; unordered formulas run in declaration order");
    }
    graph
});

/// Derived fields, who they read, who reads them, and one topological order
/// over all of them.
#[derive(Debug)]
pub struct DependencyGraph {
    formulas: HashMap<Field, &'static Formula>,
    dependents: HashMap<Field, Vec<Field>>,
    order: Vec<Field>,
    rank: HashMap<Field, usize>,
    cyclic: Vec<Field>,
    duplicates: Vec<Field>,
}

impl DependencyGraph {
    /// The graph for the built-in formula table.
    pub fn standard() -> &'static DependencyGraph {
        &STANDARD
    }

    pub fn build(formulas: &'static [Formula]) -> Result<Self, EngineError> {
        let graph = Self::assemble(formulas);
        graph.validate()?;
        Ok(graph)
    }

    fn assemble(formulas: &'static [Formula]) -> Self {
        let mut by_output: HashMap<Field, &'static Formula> = HashMap::new();
        let mut duplicates = Vec::new();
        for f in formulas {
            if by_output.insert(f.output, f).is_some() {
                duplicates.push(f.output);
            }
        }

        let mut dependents: HashMap<Field, Vec<Field>> = HashMap::new();
        let mut in_degree: HashMap<Field, usize> = HashMap::new();
        for f in formulas {
            in_degree.entry(f.output).or_insert(0);
            for input in f.inputs {
                let readers = dependents.entry(*input).or_default();
                if !readers.contains(&f.output) {
                    readers.push(f.output);
                    if by_output.contains_key(input) {
                        *in_degree.entry(f.output).or_insert(0) += 1;
                    }
                }
            }
        }

        // Kahn's algorithm, seeded and drained in declaration order so the
        // resulting order is stable across runs.
        let mut queue: VecDeque<Field> = formulas
            .iter()
            .map(|f| f.output)
            .filter(|out| in_degree.get(out) == Some(&0))
            .collect();
        let mut seen: HashSet<Field> = queue.iter().copied().collect();
        let mut order = Vec::with_capacity(by_output.len());
        while let Some(field) = queue.pop_front() {
            order.push(field);
            for reader in dependents.get(&field).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(reader) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 && seen.insert(*reader) {
                        queue.push_back(*reader);
                    }
                }
            }
        }

        let cyclic: Vec<Field> = formulas
            .iter()
            .map(|f| f.output)
            .filter(|out| !seen.contains(out))
            .collect();
        let mut placed: HashSet<Field> = order.iter().copied().collect();
        for field in &cyclic {
            if placed.insert(*field) {
                order.push(*field);
            }
        }

        let rank = order.iter().enumerate().map(|(i, f)| (*f, i)).collect();
        DependencyGraph {
            formulas: by_output,
            dependents,
            order,
            rank,
            cyclic,
            duplicates,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        if !self.duplicates.is_empty() {
            return Err(EngineError::FormulaTable(format!(
                "more than one formula for {}",
                join(&self.duplicates)
            )));
        }
        if !self.cyclic.is_empty() {
            return Err(EngineError::FormulaTable(format!(
                "dependency cycle through {}",
                join(&self.cyclic)
            )));
        }
        if let Some(f) = self.formulas.keys().find(|f| f.role() != FieldRole::Derived) {
            return Err(EngineError::FormulaTable(format!(
                "{} has a formula but is not a derived field",
                f
            )));
        }
        let missing: Vec<Field> = Field::ALL
            .iter()
            .copied()
            .filter(|f| f.role() == FieldRole::Derived && !self.formulas.contains_key(f))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::FormulaTable(format!(
                "no formula for {}",
                join(&missing)
            )));
        }
        Ok(())
    }

    /// All derived fields, each after every field it reads.
    pub fn order(&self) -> &[Field] {
        &self.order
    }

    pub fn formula(&self, field: Field) -> Option<&'static Formula> {
        self.formulas.get(&field).copied()
    }

    pub fn inputs(&self, field: Field) -> &'static [Field] {
        self.formula(field).map(|f| f.inputs).unwrap_or(&[])
    }

    /// Derived fields that read `field` directly.
    pub fn dependents(&self, field: Field) -> &[Field] {
        self.dependents.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every derived field reachable from `changed`, in evaluation order.
    pub fn affected(&self, changed: &[Field]) -> Vec<Field> {
        let mut reached: HashSet<Field> = HashSet::new();
        let mut stack: Vec<Field> = changed.to_vec();
        while let Some(field) = stack.pop() {
            for reader in self.dependents(field) {
                if reached.insert(*reader) {
                    stack.push(*reader);
                }
            }
        }
        let mut out: Vec<Field> = reached.into_iter().collect();
        out.sort_by_key(|f| self.rank.get(f).copied().unwrap_or(usize::MAX));
        out
    }
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}
