use std::fmt;

use super::{LogicalPlan, comma_separated};
use crate::explain::{ExplainEntry, Explainable};
use crate::expr::{Expr, SortField, WindowDefinition};
use crate::types::DataType;

/// A table referenced by name, resolved later against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedTable {
    /// Empty when the reference is unqualified.
    pub database: String,
    pub name: String,
}

impl UnresolvedTable {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        UnresolvedTable {
            database: database.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for UnresolvedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.database.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.database, self.name)
        }
    }
}

impl Explainable for UnresolvedTable {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("UnresolvedTable").with_value("name", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedTableFunction {
    pub name: String,
    pub args: Vec<Expr>,
}

impl Explainable for UnresolvedTableFunction {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("UnresolvedTableFunction")
            .with_value("name", &self.name)
            .with_values("args", &self.args)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableAlias {
    pub alias: String,
    pub input: Box<LogicalPlan>,
}

impl Explainable for TableAlias {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("TableAlias").with_value("alias", &self.alias)
    }
}

/// A named subquery. Also used for the bodies of CTEs and views.
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryAlias {
    pub name: String,
    pub columns: Vec<String>,
    /// Source text of the subquery.
    pub text: String,
    pub input: Box<LogicalPlan>,
}

impl Explainable for SubqueryAlias {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("SubqueryAlias").with_value("name", &self.name);
        if self.columns.is_empty() {
            ent
        } else {
            ent.with_values("columns", &self.columns)
        }
    }
}

/// Literal rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Values {
    pub rows: Vec<Vec<Expr>>,
}

impl Explainable for Values {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Values").with_values(
            "rows",
            self.rows.iter().map(|r| format!("({})", comma_separated(r))),
        )
    }
}

/// `(VALUES ROW(..), ..) AS alias(cols)`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDerivedTable {
    pub alias: String,
    pub columns: Vec<String>,
    pub values: Values,
}

impl Explainable for ValueDerivedTable {
    fn explain_entry(&self) -> ExplainEntry {
        let mut ent = self.values.explain_entry().with_value("alias", &self.alias);
        ent.name = "ValueDerivedTable".to_string();
        if self.columns.is_empty() {
            ent
        } else {
            ent.with_values("columns", &self.columns)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonTableColumnOptions {
    pub name: String,
    pub data_type: DataType,
    pub path: String,
    pub for_ordinality: bool,
    pub exists: bool,
    pub default_on_empty: Option<Expr>,
    pub default_on_error: Option<Expr>,
    pub error_on_empty: bool,
    pub error_on_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonTableColumn {
    Nested {
        path: String,
        columns: Vec<JsonTableColumn>,
    },
    Column(JsonTableColumnOptions),
}

impl fmt::Display for JsonTableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested { path, columns } => {
                write!(f, "NESTED PATH '{path}' ({})", comma_separated(columns))
            }
            Self::Column(opts) if opts.for_ordinality => write!(f, "{} FOR ORDINALITY", opts.name),
            Self::Column(opts) => {
                write!(f, "{} {}", opts.name, opts.data_type)?;
                if opts.exists {
                    write!(f, " EXISTS")?;
                }
                write!(f, " PATH '{}'", opts.path)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonTable {
    pub data: Expr,
    pub path: String,
    pub alias: String,
    pub columns: Vec<JsonTableColumn>,
}

impl Explainable for JsonTable {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("JsonTable")
            .with_value("data", &self.data)
            .with_value("path", &self.path)
            .with_value("alias", &self.alias)
            .with_values("columns", &self.columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Natural,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "INNER"),
            Self::Left => write!(f, "LEFT"),
            Self::Right => write!(f, "RIGHT"),
            Self::Full => write!(f, "FULL"),
            Self::Cross => write!(f, "CROSS"),
            Self::Natural => write!(f, "NATURAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub left: Box<LogicalPlan>,
    pub right: Box<LogicalPlan>,
    /// Only set for inner and outer joins.
    pub condition: Option<Expr>,
}

impl Join {
    pub fn cross(left: LogicalPlan, right: LogicalPlan) -> Self {
        Join {
            kind: JoinKind::Cross,
            left: Box::new(left),
            right: Box::new(right),
            condition: None,
        }
    }
}

impl Explainable for Join {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Join")
            .with_value("kind", self.kind)
            .with_opt_value("on", self.condition.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub predicate: Expr,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Filter {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Filter").with_value("predicate", &self.predicate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub exprs: Vec<Expr>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Project {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Project").with_values("expressions", &self.exprs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub select_exprs: Vec<Expr>,
    pub grouping_exprs: Vec<Expr>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for GroupBy {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("GroupBy")
            .with_values("select", &self.select_exprs)
            .with_values("grouping", &self.grouping_exprs)
    }
}

/// Projection containing window functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub exprs: Vec<Expr>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Window {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Window").with_values("expressions", &self.exprs)
    }
}

/// Definitions from a `WINDOW` clause, available to the window functions
/// below this node.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedWindows {
    pub definitions: Vec<WindowDefinition>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for NamedWindows {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("NamedWindows").with_values("definitions", &self.definitions)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    pub predicate: Expr,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Having {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Having").with_value("predicate", &self.predicate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Distinct {
    pub input: Box<LogicalPlan>,
}

impl Explainable for Distinct {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Distinct")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub fields: Vec<SortField>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Sort {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Sort").with_values("fields", &self.fields)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Offset {
    pub offset: Expr,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Offset {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Offset").with_value("offset", &self.offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub limit: Expr,
    /// Set by `SQL_CALC_FOUND_ROWS`.
    pub calc_found_rows: bool,
    pub input: Box<LogicalPlan>,
}

impl Explainable for Limit {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Limit")
            .with_value("limit", &self.limit)
            .with_flag("calc_found_rows", self.calc_found_rows)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub ctes: Vec<SubqueryAlias>,
    pub recursive: bool,
    pub input: Box<LogicalPlan>,
}

impl Explainable for With {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("With")
            .with_values("ctes", self.ctes.iter().map(|c| &c.name))
            .with_flag("recursive", self.recursive)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub left: Box<LogicalPlan>,
    pub right: Box<LogicalPlan>,
    pub distinct: bool,
    pub sort_fields: Vec<SortField>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

impl Explainable for Union {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("Union")
            .with_flag("distinct", self.distinct)
            .with_opt_value("limit", self.limit.as_ref())
            .with_opt_value("offset", self.offset.as_ref());
        if self.sort_fields.is_empty() {
            ent
        } else {
            ent.with_values("sort", &self.sort_fields)
        }
    }
}

/// `SELECT ... INTO var, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectInto {
    pub vars: Vec<Expr>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for SelectInto {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Into").with_values("vars", &self.vars)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeFormat {
    Tree,
    Debug,
}

impl fmt::Display for DescribeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescribeQuery {
    pub format: DescribeFormat,
    pub input: Box<LogicalPlan>,
}

impl Explainable for DescribeQuery {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DescribeQuery").with_value("format", self.format)
    }
}
