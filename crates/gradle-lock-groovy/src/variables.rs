//! Literal variable definitions used to expand interpolated versions.

use crate::ast::{Block, Expr, Statement};
use std::collections::HashMap;

/// Identifier → literal string value, built from a manifest's assignments.
///
/// `ext.guavaVersion = '18.0'` is reachable as `ext.guavaVersion` and as
/// `guavaVersion`; map literals add one entry per key
/// (`versions = [guava: '18.0']` defines `versions.guava`). Later
/// assignments win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects assignments at every nesting level of `block`.
    pub fn from_block(block: &Block) -> Self {
        let mut table = Self::new();
        table.collect_block(block);
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Looks `name` up, dropping leading qualifiers (`project.`,
    /// `rootProject.ext.`) until a definition matches.
    pub fn get(&self, name: &str) -> Option<&str> {
        let mut candidate = name.trim();
        loop {
            if let Some(value) = self.values.get(candidate) {
                return Some(value);
            }
            let (_, rest) = candidate.split_once('.')?;
            candidate = rest;
        }
    }

    /// Adds definitions from `parent` that this table does not override,
    /// the way a subproject sees its root project's properties.
    pub fn inherit(&mut self, parent: &Self) {
        for (name, value) in &parent.values {
            self.values
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every `${name}` in `raw` with its value. Returns `None`
    /// when a referenced variable is undefined.
    ///
    /// ```
    /// use gradle_lock_groovy::VariableTable;
    ///
    /// let mut vars = VariableTable::new();
    /// vars.insert("guavaVersion", "18.0");
    /// assert_eq!(vars.substitute("${guavaVersion}").as_deref(), Some("18.0"));
    /// assert_eq!(vars.substitute("1.+").as_deref(), Some("1.+"));
    /// assert_eq!(vars.substitute("${missing}"), None);
    /// ```
    pub fn substitute(&self, raw: &str) -> Option<String> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}')?;
            out.push_str(self.get(&after[..end])?);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Some(out)
    }

    fn collect_block(&mut self, block: &Block) {
        for statement in &block.statements {
            match statement {
                Statement::Assign(assign) => {
                    self.define(&assign.target.join("."), &assign.value);
                    self.collect_expr(&assign.value);
                }
                Statement::Expr(expr) => self.collect_expr(expr),
            }
        }
    }

    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Call(call) => {
                if let Some(receiver) = &call.receiver {
                    self.collect_expr(receiver);
                }
                call.args.iter().for_each(|arg| self.collect_expr(arg));
                if let Some(closure) = &call.closure {
                    self.collect_block(closure);
                }
            }
            Expr::Closure(block) => self.collect_block(block),
            Expr::Other(compound) => compound.children.iter().for_each(|c| self.collect_expr(c)),
            Expr::List(list) => list.items.iter().for_each(|i| self.collect_expr(i)),
            _ => {}
        }
    }

    fn define(&mut self, path: &str, value: &Expr) {
        match value {
            Expr::Str(lit) => {
                if let Some(text) = lit.literal() {
                    self.define_suffixes(path, &text);
                }
            }
            Expr::Number(number) => self.define_suffixes(path, &number.text),
            Expr::Map(map) => {
                for entry in &map.entries {
                    self.define(&format!("{path}.{}", entry.key), &entry.value);
                }
            }
            _ => {}
        }
    }

    fn define_suffixes(&mut self, path: &str, value: &str) {
        let mut suffix = path;
        loop {
            self.insert(suffix, value);
            match suffix.split_once('.') {
                Some((_, rest)) => suffix = rest,
                None => break,
            }
        }
    }
}
