use super::{LogicalPlan, UnresolvedTable};
use crate::explain::{ExplainEntry, Explainable};
use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct InsertInto {
    pub destination: UnresolvedTable,
    pub columns: Vec<String>,
    /// Rows to insert. `Values`, a query, or a `LoadData` source.
    pub source: Box<LogicalPlan>,
    /// Set-field expressions from `ON DUPLICATE KEY UPDATE`.
    pub on_duplicate: Vec<Expr>,
    pub replace: bool,
    pub ignore: bool,
}

impl Explainable for InsertInto {
    fn explain_entry(&self) -> ExplainEntry {
        let name = if self.replace { "ReplaceInto" } else { "InsertInto" };
        let ent = ExplainEntry::new(name)
            .with_value("table", &self.destination)
            .with_flag("ignore", self.ignore);
        let ent = if self.columns.is_empty() {
            ent
        } else {
            ent.with_values("columns", &self.columns)
        };
        if self.on_duplicate.is_empty() {
            ent
        } else {
            ent.with_values("on_duplicate", &self.on_duplicate)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub ignore: bool,
    /// Set-field expressions.
    pub set_exprs: Vec<Expr>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Update {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Update")
            .with_values("set", &self.set_exprs)
            .with_flag("ignore", self.ignore)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteFrom {
    /// Explicit targets of a multi-table delete. Empty for a single table.
    pub targets: Vec<UnresolvedTable>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for DeleteFrom {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("DeleteFrom");
        if self.targets.is_empty() {
            ent
        } else {
            ent.with_values("targets", &self.targets)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldsOptions {
    pub terminated_by: Option<String>,
    pub enclosed_by: Option<String>,
    pub optionally_enclosed: bool,
    pub escaped_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinesOptions {
    pub starting_by: Option<String>,
    pub terminated_by: Option<String>,
}

/// How rows that duplicate an existing key are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateHandling {
    Replace,
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadData {
    pub local: bool,
    pub file: String,
    pub destination: UnresolvedTable,
    pub columns: Vec<String>,
    pub fields: Option<FieldsOptions>,
    pub lines: Option<LinesOptions>,
    pub ignore_lines: i64,
    pub duplicates: Option<DuplicateHandling>,
}

impl Explainable for LoadData {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("LoadData")
            .with_value("file", &self.file)
            .with_value("table", &self.destination)
            .with_flag("local", self.local)
            .with_value("ignore_lines", self.ignore_lines)
    }
}
