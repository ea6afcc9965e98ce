use super::UnresolvedTable;
use crate::explain::{ExplainEntry, Explainable};
use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCreateTable {
    pub table: UnresolvedTable,
    pub is_view: bool,
}

impl Explainable for ShowCreateTable {
    fn explain_entry(&self) -> ExplainEntry {
        let name = if self.is_view {
            "ShowCreateView"
        } else {
            "ShowCreateTable"
        };
        ExplainEntry::new(name).with_value("table", &self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCreateDatabase {
    pub database: String,
    pub if_not_exists: bool,
}

impl Explainable for ShowCreateDatabase {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ShowCreateDatabase")
            .with_value("database", &self.database)
            .with_flag("if_not_exists", self.if_not_exists)
    }
}

/// `SHOW CREATE` for a trigger, procedure or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCreateRoutine {
    pub database: String,
    pub name: String,
}

impl ShowCreateRoutine {
    pub fn entry(&self, node: &str) -> ExplainEntry {
        ExplainEntry::new(node).with_value(
            "name",
            UnresolvedTable::new(self.database.clone(), self.name.clone()),
        )
    }
}

/// A listing scoped to one database. Empty means the current database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInDatabase {
    pub database: String,
}

impl ShowInDatabase {
    pub fn entry(&self, node: &str) -> ExplainEntry {
        let ent = ExplainEntry::new(node);
        if self.database.is_empty() {
            ent
        } else {
            ent.with_value("database", &self.database)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowIndexes {
    pub table: UnresolvedTable,
}

impl Explainable for ShowIndexes {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ShowIndexes").with_value("table", &self.table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowVariables {
    /// Predicate over the `variable_name` column.
    pub filter: Option<Expr>,
    pub global: bool,
}

impl Explainable for ShowVariables {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ShowVariables")
            .with_opt_value("filter", self.filter.as_ref())
            .with_flag("global", self.global)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowTables {
    pub database: String,
    pub full: bool,
}

impl Explainable for ShowTables {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ShowTables")
            .with_value("database", &self.database)
            .with_flag("full", self.full)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowColumns {
    pub table: UnresolvedTable,
    pub full: bool,
}

impl Explainable for ShowColumns {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ShowColumns")
            .with_value("table", &self.table)
            .with_flag("full", self.full)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowStatus {
    pub global: bool,
}

impl Explainable for ShowStatus {
    fn explain_entry(&self) -> ExplainEntry {
        let scope = if self.global { "GLOBAL" } else { "SESSION" };
        ExplainEntry::new("ShowStatus").with_value("scope", scope)
    }
}
