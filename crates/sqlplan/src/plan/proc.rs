//! Stored program constructs: blocks, conditionals, loops, declarations and
//! signals.

use std::fmt;

use super::{ColumnDefaultValue, LogicalPlan};
use crate::explain::{ExplainEntry, Explainable};
use crate::expr::Expr;
use crate::types::DataType;

/// An ordered list of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<LogicalPlan>,
}

impl Block {
    pub fn new(statements: Vec<LogicalPlan>) -> Self {
        Block { statements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeginEndBlock {
    pub label: String,
    pub block: Block,
}

impl Explainable for BeginEndBlock {
    fn explain_entry(&self) -> ExplainEntry {
        label_entry("BeginEndBlock", &self.label)
    }
}

/// A condition and the block run when it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct IfConditional {
    pub condition: Expr,
    /// Always a `LogicalPlan::Block`.
    pub body: Box<LogicalPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    pub branches: Vec<IfConditional>,
    /// Always a `LogicalPlan::Block`, possibly empty.
    pub else_block: Box<LogicalPlan>,
}

impl IfElse {
    pub fn children(&self) -> Vec<&LogicalPlan> {
        let mut children: Vec<&LogicalPlan> = self.branches.iter().map(|b| b.body.as_ref()).collect();
        children.push(self.else_block.as_ref());
        children
    }
}

impl Explainable for IfElse {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("IfElse")
            .with_values("conditions", self.branches.iter().map(|b| &b.condition))
    }
}

/// A `CASE` statement. Searched when `operand` is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseStatement {
    pub operand: Option<Expr>,
    pub branches: Vec<IfConditional>,
    pub else_block: Option<Box<LogicalPlan>>,
}

impl CaseStatement {
    pub fn children(&self) -> Vec<&LogicalPlan> {
        let mut children: Vec<&LogicalPlan> = self.branches.iter().map(|b| b.body.as_ref()).collect();
        if let Some(e) = &self.else_block {
            children.push(e.as_ref());
        }
        children
    }
}

impl Explainable for CaseStatement {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("CaseStatement")
            .with_opt_value("operand", self.operand.as_ref())
            .with_values("conditions", self.branches.iter().map(|b| &b.condition))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub label: String,
    pub block: Block,
}

impl Explainable for Loop {
    fn explain_entry(&self) -> ExplainEntry {
        label_entry("Loop", &self.label)
    }
}

/// `REPEAT ... UNTIL condition END REPEAT`
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub label: String,
    pub condition: Expr,
    pub block: Block,
}

impl Explainable for Repeat {
    fn explain_entry(&self) -> ExplainEntry {
        label_entry("Repeat", &self.label).with_value("until", &self.condition)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub label: String,
    pub condition: Expr,
    pub block: Block,
}

impl Explainable for While {
    fn explain_entry(&self) -> ExplainEntry {
        label_entry("While", &self.label).with_value("condition", &self.condition)
    }
}

fn label_entry(name: &str, label: &str) -> ExplainEntry {
    let ent = ExplainEntry::new(name);
    if label.is_empty() {
        ent
    } else {
        ent.with_value("label", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leave {
    pub label: String,
}

impl Explainable for Leave {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Leave").with_value("label", &self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iterate {
    pub label: String,
}

impl Explainable for Iterate {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Iterate").with_value("label", &self.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Empty when the procedure name is unqualified.
    pub database: String,
    pub name: String,
    pub params: Vec<Expr>,
}

impl Explainable for Call {
    fn explain_entry(&self) -> ExplainEntry {
        let name = if self.database.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.database, self.name)
        };
        ExplainEntry::new("Call")
            .with_value("name", name)
            .with_values("params", &self.params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareCondition {
    /// Lowercased condition name.
    pub name: String,
    pub sqlstate: String,
}

impl Explainable for DeclareCondition {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DeclareCondition")
            .with_value("name", &self.name)
            .with_value("sqlstate", &self.sqlstate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareVariables {
    pub names: Vec<String>,
    pub data_type: DataType,
    pub default: Option<ColumnDefaultValue>,
}

impl Explainable for DeclareVariables {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DeclareVariables")
            .with_values("names", &self.names)
            .with_value("type", &self.data_type)
            .with_opt_value("default", self.default.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareCursor {
    pub name: String,
    pub select: Box<LogicalPlan>,
}

impl Explainable for DeclareCursor {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DeclareCursor").with_value("name", &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    Continue,
    Exit,
    Undo,
}

impl fmt::Display for HandlerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "CONTINUE"),
            Self::Exit => write!(f, "EXIT"),
            Self::Undo => write!(f, "UNDO"),
        }
    }
}

/// A `DECLARE ... HANDLER FOR NOT FOUND` handler.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareHandler {
    pub action: HandlerAction,
    pub statement: Box<LogicalPlan>,
}

impl Explainable for DeclareHandler {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DeclareHandler")
            .with_value("action", self.action)
            .with_value("condition", "NOT FOUND")
    }
}

/// Cursor named by `OPEN` or `CLOSE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorRef {
    pub name: String,
}

impl CursorRef {
    pub fn entry(&self, node: &str) -> ExplainEntry {
        ExplainEntry::new(node).with_value("cursor", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    pub cursor: String,
    pub variables: Vec<String>,
}

impl Explainable for Fetch {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Fetch")
            .with_value("cursor", &self.cursor)
            .with_values("into", &self.variables)
    }
}

/// Condition information items settable by `SIGNAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalItem {
    ClassOrigin,
    SubclassOrigin,
    MessageText,
    MysqlErrno,
    ConstraintCatalog,
    ConstraintSchema,
    ConstraintName,
    CatalogName,
    SchemaName,
    TableName,
    ColumnName,
    CursorName,
}

impl SignalItem {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "class_origin" => Self::ClassOrigin,
            "subclass_origin" => Self::SubclassOrigin,
            "message_text" => Self::MessageText,
            "mysql_errno" => Self::MysqlErrno,
            "constraint_catalog" => Self::ConstraintCatalog,
            "constraint_schema" => Self::ConstraintSchema,
            "constraint_name" => Self::ConstraintName,
            "catalog_name" => Self::CatalogName,
            "schema_name" => Self::SchemaName,
            "table_name" => Self::TableName,
            "column_name" => Self::ColumnName,
            "cursor_name" => Self::CursorName,
            _ => return None,
        })
    }
}

impl fmt::Display for SignalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ClassOrigin => "CLASS_ORIGIN",
            Self::SubclassOrigin => "SUBCLASS_ORIGIN",
            Self::MessageText => "MESSAGE_TEXT",
            Self::MysqlErrno => "MYSQL_ERRNO",
            Self::ConstraintCatalog => "CONSTRAINT_CATALOG",
            Self::ConstraintSchema => "CONSTRAINT_SCHEMA",
            Self::ConstraintName => "CONSTRAINT_NAME",
            Self::CatalogName => "CATALOG_NAME",
            Self::SchemaName => "SCHEMA_NAME",
            Self::TableName => "TABLE_NAME",
            Self::ColumnName => "COLUMN_NAME",
            Self::CursorName => "CURSOR_NAME",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    Int(u16),
    Text(String),
    /// A variable read when the signal is raised. Only `MESSAGE_TEXT` takes one.
    Expr(Expr),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Expr(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalInfo {
    pub item: SignalItem,
    pub value: SignalValue,
}

impl fmt::Display for SignalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.item, self.value)
    }
}

/// `SIGNAL`. Exactly one of `sqlstate` and `condition` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub sqlstate: Option<String>,
    /// Lowercased name of a declared condition.
    pub condition: Option<String>,
    pub info: Vec<SignalInfo>,
}

impl Explainable for Signal {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("Signal")
            .with_opt_value("sqlstate", self.sqlstate.as_ref())
            .with_opt_value("condition", self.condition.as_ref());
        if self.info.is_empty() {
            ent
        } else {
            ent.with_values("set", &self.info)
        }
    }
}
