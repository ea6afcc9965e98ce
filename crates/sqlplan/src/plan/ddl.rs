use std::collections::BTreeMap;
use std::fmt;

use super::{LogicalPlan, SubqueryAlias, UnresolvedTable, comma_separated};
use crate::collation::Collation;
use crate::explain::{ExplainEntry, Explainable};
use crate::expr::Expr;
use crate::types::DataType;

/// A column's `DEFAULT`, `ON UPDATE` or generated expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefaultValue {
    pub expr: Expr,
    /// The expression is a plain literal and may be stored as a value.
    pub is_literal: bool,
    /// The expression was written inside parentheses.
    pub is_parenthesized: bool,
}

impl fmt::Display for ColumnDefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_parenthesized {
            write!(f, "({})", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub comment: String,
    pub default: Option<ColumnDefaultValue>,
    pub on_update: Option<ColumnDefaultValue>,
    /// Expression of a generated column.
    pub generated: Option<ColumnDefaultValue>,
    /// Generated column is computed on read rather than stored.
    pub is_virtual: bool,
    /// Extra column information, e.g. `auto_increment`.
    pub extra: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            comment: String::new(),
            default: None,
            on_update: None,
            generated: None,
            is_virtual: false,
            extra: String::new(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        if let Some(generated) = &self.generated {
            let kind = if self.is_virtual { "VIRTUAL" } else { "STORED" };
            write!(f, " AS ({}) {kind}", generated.expr)?;
        }
        if self.auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        if self.primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        Ok(())
    }
}

/// Ordered columns of a table together with the ordinals of its primary key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    pub pk_ordinals: Vec<usize>,
}

impl TableSchema {
    pub fn new(columns: Vec<Column>) -> Self {
        let pk_ordinals = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();
        TableSchema {
            columns,
            pk_ordinals,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexUsing {
    #[default]
    BTree,
    Hash,
}

impl fmt::Display for IndexUsing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BTree => write!(f, "BTREE"),
            Self::Hash => write!(f, "HASH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexConstraint {
    #[default]
    None,
    Unique,
    Primary,
    Spatial,
    Fulltext,
}

impl fmt::Display for IndexConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Unique => write!(f, "UNIQUE"),
            Self::Primary => write!(f, "PRIMARY"),
            Self::Spatial => write!(f, "SPATIAL"),
            Self::Fulltext => write!(f, "FULLTEXT"),
        }
    }
}

/// A column in an index, with an optional prefix length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    pub length: Option<u64>,
}

impl fmt::Display for IndexColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length {
            Some(len) => write!(f, "{}({len})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub using: IndexUsing,
    pub constraint: IndexConstraint,
    pub columns: Vec<IndexColumn>,
    pub comment: String,
}

impl IndexDefinition {
    pub fn is_primary(&self) -> bool {
        self.constraint == IndexConstraint::Primary
    }
}

impl fmt::Display for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            IndexConstraint::None => write!(f, "INDEX")?,
            c => write!(f, "{c} INDEX")?,
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        write!(f, " ({})", comma_separated(&self.columns))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    DefaultAction,
    Restrict,
    Cascade,
    NoAction,
    SetNull,
    SetDefault,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultAction => write!(f, "DEFAULT"),
            Self::Restrict => write!(f, "RESTRICT"),
            Self::Cascade => write!(f, "CASCADE"),
            Self::NoAction => write!(f, "NO ACTION"),
            Self::SetNull => write!(f, "SET NULL"),
            Self::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub name: String,
    pub database: String,
    pub table: String,
    pub columns: Vec<String>,
    pub parent_database: String,
    pub parent_table: String,
    pub parent_columns: Vec<String>,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
}

impl fmt::Display for ForeignKeyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FOREIGN KEY")?;
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        write!(
            f,
            " ({}) REFERENCES {} ({})",
            self.columns.join(", "),
            UnresolvedTable::new(self.parent_database.clone(), self.parent_table.clone()),
            self.parent_columns.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckConstraint {
    pub name: String,
    pub expr: Expr,
    pub enforced: bool,
}

impl fmt::Display for CheckConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CHECK")?;
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        write!(f, " ({})", self.expr)?;
        if !self.enforced {
            write!(f, " NOT ENFORCED")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: UnresolvedTable,
    pub if_not_exists: bool,
    pub temporary: bool,
    pub schema: TableSchema,
    pub collation: Collation,
    pub comment: String,
    pub indexes: Vec<IndexDefinition>,
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    pub checks: Vec<CheckConstraint>,
    /// Source of `CREATE TABLE ... LIKE other`.
    pub like: Option<UnresolvedTable>,
    /// Query of `CREATE TABLE ... AS SELECT`.
    pub select: Option<Box<LogicalPlan>>,
}

impl Explainable for CreateTable {
    fn explain_entry(&self) -> ExplainEntry {
        let mut ent = ExplainEntry::new("CreateTable")
            .with_value("name", &self.table)
            .with_flag("if_not_exists", self.if_not_exists)
            .with_flag("temporary", self.temporary)
            .with_opt_value("like", self.like.as_ref());
        if !self.schema.columns.is_empty() {
            ent = ent
                .with_values("columns", &self.schema.columns)
                .with_value("collation", self.collation);
        }
        if !self.indexes.is_empty() {
            ent = ent.with_values("indexes", &self.indexes);
        }
        if !self.foreign_keys.is_empty() {
            ent = ent.with_values("foreign_keys", &self.foreign_keys);
        }
        if !self.checks.is_empty() {
            ent = ent.with_values("checks", &self.checks);
        }
        ent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    pub tables: Vec<UnresolvedTable>,
    pub if_exists: bool,
    pub temporary: bool,
}

impl Explainable for DropTable {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DropTable")
            .with_values("tables", &self.tables)
            .with_flag("if_exists", self.if_exists)
            .with_flag("temporary", self.temporary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTable {
    pub from: Vec<UnresolvedTable>,
    pub to: Vec<UnresolvedTable>,
    /// Issued as `ALTER TABLE ... RENAME` rather than `RENAME TABLE`.
    pub alter_table: bool,
}

impl Explainable for RenameTable {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("RenameTable")
            .with_values("from", &self.from)
            .with_values("to", &self.to)
            .with_flag("alter_table", self.alter_table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateTable {
    pub table: UnresolvedTable,
}

impl Explainable for TruncateTable {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("TruncateTable").with_value("table", &self.table)
    }
}

/// Placement of a new or modified column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrder {
    First,
    After(String),
}

impl fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "FIRST"),
            Self::After(c) => write!(f, "AFTER {c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumn {
        column: Column,
        order: Option<ColumnOrder>,
    },
    DropColumn {
        name: String,
    },
    RenameColumn {
        from: String,
        to: String,
    },
    ModifyColumn {
        column_name: String,
        column: Column,
        order: Option<ColumnOrder>,
    },
    CreateIndex(IndexDefinition),
    DropIndex {
        name: String,
    },
    RenameIndex {
        from: String,
        to: String,
    },
    DisableEnableKeys {
        disable: bool,
    },
    CreatePrimaryKey {
        columns: Vec<IndexColumn>,
    },
    DropPrimaryKey,
    AddForeignKey(ForeignKeyConstraint),
    DropForeignKey {
        name: String,
    },
    AddCheck(CheckConstraint),
    DropCheck {
        name: String,
    },
    /// Drop a constraint known only by name.
    DropConstraint {
        name: String,
    },
    SetDefault {
        column: String,
        default: ColumnDefaultValue,
    },
    DropDefault {
        column: String,
    },
    AutoIncrement(u64),
    Collation(Collation),
}

impl AlterTableAction {
    /// Position of this action when several are combined in one statement.
    /// Lower ranks run first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::RenameColumn { .. } => 0,
            Self::DropColumn { .. } => 1,
            Self::ModifyColumn { .. } => 2,
            Self::AddColumn { .. } => 3,
            Self::DropConstraint { .. } | Self::DropForeignKey { .. } => 4,
            Self::DropCheck { .. } => 5,
            Self::AddCheck(_) => 6,
            Self::RenameIndex { .. } => 7,
            Self::DropIndex { .. } | Self::DropPrimaryKey => 8,
            Self::CreateIndex(_) | Self::CreatePrimaryKey { .. } | Self::DisableEnableKeys { .. } => 9,
            Self::AddForeignKey(_)
            | Self::SetDefault { .. }
            | Self::DropDefault { .. }
            | Self::AutoIncrement(_)
            | Self::Collation(_) => 10,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::AddColumn { .. } => "AddColumn",
            Self::DropColumn { .. } => "DropColumn",
            Self::RenameColumn { .. } => "RenameColumn",
            Self::ModifyColumn { .. } => "ModifyColumn",
            Self::CreateIndex(_) => "AlterCreateIndex",
            Self::DropIndex { .. } => "AlterDropIndex",
            Self::RenameIndex { .. } => "AlterRenameIndex",
            Self::DisableEnableKeys { .. } => "AlterDisableEnableKeys",
            Self::CreatePrimaryKey { .. } => "AlterCreatePk",
            Self::DropPrimaryKey => "AlterDropPk",
            Self::AddForeignKey(_) => "CreateForeignKey",
            Self::DropForeignKey { .. } => "DropForeignKey",
            Self::AddCheck(_) => "CreateCheck",
            Self::DropCheck { .. } => "DropCheck",
            Self::DropConstraint { .. } => "DropConstraint",
            Self::SetDefault { .. } => "AlterDefaultSet",
            Self::DropDefault { .. } => "AlterDefaultDrop",
            Self::AutoIncrement(_) => "AlterAutoIncrement",
            Self::Collation(_) => "AlterTableCollation",
        }
    }
}

/// One action applied to a table.
///
/// `table` is normally the unresolved table. When a column alteration also
/// creates a unique index the index action wraps the column action.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub table: Box<LogicalPlan>,
    pub action: AlterTableAction,
}

impl AlterTable {
    pub fn new(table: UnresolvedTable, action: AlterTableAction) -> Self {
        AlterTable {
            table: Box::new(LogicalPlan::UnresolvedTable(table)),
            action,
        }
    }

    /// The table this action ultimately targets.
    pub fn target(&self) -> Option<&UnresolvedTable> {
        match self.table.as_ref() {
            LogicalPlan::UnresolvedTable(t) => Some(t),
            LogicalPlan::AlterTable(inner) => inner.target(),
            _ => None,
        }
    }
}

impl Explainable for AlterTable {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new(self.action.name());
        match &self.action {
            AlterTableAction::AddColumn { column, order } => ent
                .with_value("column", column)
                .with_opt_value("order", order.as_ref()),
            AlterTableAction::DropColumn { name } => ent.with_value("column", name),
            AlterTableAction::RenameColumn { from, to } => {
                ent.with_value("from", from).with_value("to", to)
            }
            AlterTableAction::ModifyColumn {
                column_name,
                column,
                order,
            } => ent
                .with_value("name", column_name)
                .with_value("column", column)
                .with_opt_value("order", order.as_ref()),
            AlterTableAction::CreateIndex(idx) => ent
                .with_value("index", idx)
                .with_value("using", idx.using),
            AlterTableAction::DropIndex { name } => ent.with_value("index", name),
            AlterTableAction::RenameIndex { from, to } => {
                ent.with_value("from", from).with_value("to", to)
            }
            AlterTableAction::DisableEnableKeys { disable } => {
                ent.with_value("disable", disable)
            }
            AlterTableAction::CreatePrimaryKey { columns } => ent.with_values("columns", columns),
            AlterTableAction::DropPrimaryKey => ent,
            AlterTableAction::AddForeignKey(fk) => ent.with_value("foreign_key", fk),
            AlterTableAction::DropForeignKey { name }
            | AlterTableAction::DropCheck { name }
            | AlterTableAction::DropConstraint { name } => ent.with_value("name", name),
            AlterTableAction::AddCheck(check) => ent.with_value("check", check),
            AlterTableAction::SetDefault { column, default } => ent
                .with_value("column", column)
                .with_value("default", default),
            AlterTableAction::DropDefault { column } => ent.with_value("column", column),
            AlterTableAction::AutoIncrement(v) => ent.with_value("value", v),
            AlterTableAction::Collation(c) => ent.with_value("collation", c),
        }
    }
}

/// An index handled by an external index driver.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: String,
    pub table: UnresolvedTable,
    pub exprs: Vec<Expr>,
    /// Lowercased name from `USING`.
    pub driver: String,
    /// Options passed through to the driver.
    pub config: BTreeMap<String, String>,
}

impl Explainable for CreateIndex {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("CreateIndex")
            .with_value("name", &self.name)
            .with_value("table", &self.table)
            .with_values("exprs", &self.exprs)
            .with_value("driver", &self.driver);
        if self.config.is_empty() {
            ent
        } else {
            ent.with_named_map("config", "options", &self.config)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub database: String,
    pub name: String,
    pub columns: Vec<String>,
    pub definition: SubqueryAlias,
    pub or_replace: bool,
    /// Full text of the statement.
    pub create_text: String,
    pub algorithm: String,
    pub definer: String,
    pub security: String,
}

impl Explainable for CreateView {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("CreateView")
            .with_value("name", UnresolvedTable::new(self.database.clone(), self.name.clone()))
            .with_flag("or_replace", self.or_replace)
            .with_value("definer", &self.definer);
        let ent = if self.columns.is_empty() {
            ent
        } else {
            ent.with_values("columns", &self.columns)
        };
        let ent = if self.algorithm.is_empty() {
            ent
        } else {
            ent.with_value("algorithm", &self.algorithm)
        };
        if self.security.is_empty() {
            ent
        } else {
            ent.with_value("security", &self.security)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropView {
    pub views: Vec<UnresolvedTable>,
    pub if_exists: bool,
}

impl Explainable for DropView {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DropView")
            .with_values("views", &self.views)
            .with_flag("if_exists", self.if_exists)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTime {
    Before,
    After,
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// `FOLLOWS other` or `PRECEDES other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOrder {
    pub precedes: bool,
    pub other: String,
}

impl fmt::Display for TriggerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kw = if self.precedes { "precedes" } else { "follows" };
        write!(f, "{kw} {}", self.other)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTrigger {
    pub database: String,
    pub name: String,
    pub time: TriggerTime,
    pub event: TriggerEvent,
    pub order: Option<TriggerOrder>,
    pub table: UnresolvedTable,
    pub body: Box<LogicalPlan>,
    pub create_text: String,
    pub body_text: String,
    pub definer: String,
}

impl Explainable for CreateTrigger {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("CreateTrigger")
            .with_value("name", &self.name)
            .with_value("time", self.time)
            .with_value("event", self.event)
            .with_value("table", &self.table)
            .with_opt_value("order", self.order.as_ref())
            .with_value("definer", &self.definer)
    }
}

/// Drop of a named trigger, procedure or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRoutine {
    pub database: String,
    pub name: String,
    pub if_exists: bool,
}

impl DropRoutine {
    pub fn entry(&self, node: &str) -> ExplainEntry {
        ExplainEntry::new(node)
            .with_value(
                "name",
                UnresolvedTable::new(self.database.clone(), self.name.clone()),
            )
            .with_flag("if_exists", self.if_exists)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    In,
    InOut,
    Out,
}

impl fmt::Display for ParamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::InOut => write!(f, "INOUT"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParam {
    pub direction: ParamDirection,
    pub name: String,
    pub data_type: DataType,
}

impl fmt::Display for ProcedureParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.direction, self.name, self.data_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characteristic {
    LanguageSql,
    Deterministic,
    NotDeterministic,
    ContainsSql,
    NoSql,
    ReadsSqlData,
    ModifiesSqlData,
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LanguageSql => "LANGUAGE SQL",
            Self::Deterministic => "DETERMINISTIC",
            Self::NotDeterministic => "NOT DETERMINISTIC",
            Self::ContainsSql => "CONTAINS SQL",
            Self::NoSql => "NO SQL",
            Self::ReadsSqlData => "READS SQL DATA",
            Self::ModifiesSqlData => "MODIFIES SQL DATA",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityContext {
    #[default]
    Definer,
    Invoker,
}

impl fmt::Display for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definer => write!(f, "DEFINER"),
            Self::Invoker => write!(f, "INVOKER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProcedure {
    pub database: String,
    pub name: String,
    pub definer: String,
    pub params: Vec<ProcedureParam>,
    pub characteristics: Vec<Characteristic>,
    pub security: SecurityContext,
    pub comment: String,
    pub create_text: String,
    pub body_text: String,
    pub body: Box<LogicalPlan>,
}

impl Explainable for CreateProcedure {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("CreateProcedure")
            .with_value("name", &self.name)
            .with_values("params", &self.params)
            .with_value("security", self.security)
            .with_value("definer", &self.definer);
        let ent = if self.characteristics.is_empty() {
            ent
        } else {
            ent.with_values("characteristics", &self.characteristics)
        };
        if self.comment.is_empty() {
            ent
        } else {
            ent.with_value("comment", &self.comment)
        }
    }
}

/// A point in time for an event schedule: a timestamp plus intervals added
/// to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTimestamp {
    pub timestamp: Expr,
    pub intervals: Vec<Expr>,
}

impl fmt::Display for ScheduleTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp)?;
        for interval in &self.intervals {
            write!(f, " + {interval}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventSchedule {
    At(ScheduleTimestamp),
    Every {
        interval: Expr,
        starts: Option<ScheduleTimestamp>,
        ends: Option<ScheduleTimestamp>,
    },
}

impl fmt::Display for EventSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(ts) => write!(f, "AT {ts}"),
            Self::Every {
                interval,
                starts,
                ends,
            } => {
                write!(f, "EVERY {interval}")?;
                if let Some(s) = starts {
                    write!(f, " STARTS {s}")?;
                }
                if let Some(e) = ends {
                    write!(f, " ENDS {e}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventStatus {
    #[default]
    Enable,
    Disable,
    DisableOnSlave,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => write!(f, "ENABLE"),
            Self::Disable => write!(f, "DISABLE"),
            Self::DisableOnSlave => write!(f, "DISABLE ON SLAVE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateEvent {
    pub database: String,
    pub name: String,
    pub definer: String,
    pub schedule: EventSchedule,
    pub on_completion_preserve: bool,
    pub status: EventStatus,
    pub comment: String,
    pub body_text: String,
    pub body: Box<LogicalPlan>,
    pub if_not_exists: bool,
}

impl Explainable for CreateEvent {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("CreateEvent")
            .with_value(
                "name",
                UnresolvedTable::new(self.database.clone(), self.name.clone()),
            )
            .with_value("schedule", &self.schedule)
            .with_flag("preserve", self.on_completion_preserve)
            .with_value("status", self.status)
            .with_flag("if_not_exists", self.if_not_exists)
            .with_value("definer", &self.definer)
    }
}

/// `ALTER EVENT`. Each `Option` is `Some` only when the statement changes
/// that part of the event.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterEvent {
    pub database: String,
    pub name: String,
    pub definer: String,
    pub schedule: Option<EventSchedule>,
    pub on_completion_preserve: Option<bool>,
    pub rename_to: Option<String>,
    pub status: Option<EventStatus>,
    pub comment: Option<String>,
    pub body_text: Option<String>,
    pub body: Option<Box<LogicalPlan>>,
}

impl Explainable for AlterEvent {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("AlterEvent")
            .with_value(
                "name",
                UnresolvedTable::new(self.database.clone(), self.name.clone()),
            )
            .with_opt_value("schedule", self.schedule.as_ref())
            .with_opt_value("preserve", self.on_completion_preserve)
            .with_opt_value("rename_to", self.rename_to.as_ref())
            .with_opt_value("status", self.status)
            .with_opt_value("comment", self.comment.as_ref())
            .with_value("definer", &self.definer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDatabase {
    pub name: String,
    pub if_not_exists: bool,
    pub collation: Collation,
}

impl Explainable for CreateDatabase {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("CreateDatabase")
            .with_value("name", &self.name)
            .with_flag("if_not_exists", self.if_not_exists)
            .with_value("collation", self.collation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterDatabase {
    /// Empty when the statement targets the current database.
    pub name: String,
    pub collation: Collation,
}

impl Explainable for AlterDatabase {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("AlterDatabase").with_value("collation", self.collation);
        if self.name.is_empty() {
            ent
        } else {
            ent.with_value("name", &self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDatabase {
    pub name: String,
    pub if_exists: bool,
}

impl Explainable for DropDatabase {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DropDatabase")
            .with_value("name", &self.name)
            .with_flag("if_exists", self.if_exists)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analyze {
    pub tables: Vec<UnresolvedTable>,
}

impl Explainable for Analyze {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Analyze").with_values("tables", &self.tables)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrsAttribute {
    pub name: String,
    pub definition: String,
    pub organization: String,
    pub org_id: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpatialRefSys {
    pub srid: u32,
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub attributes: SrsAttribute,
}

impl Explainable for CreateSpatialRefSys {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("CreateSpatialRefSys")
            .with_value("srid", self.srid)
            .with_value("name", &self.attributes.name)
            .with_value("organization", &self.attributes.organization)
            .with_value("org_id", self.attributes.org_id)
            .with_flag("or_replace", self.or_replace)
            .with_flag("if_not_exists", self.if_not_exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_primary_key_ordinals() {
        let mut pk = Column::new("pk", DataType::Int32);
        pk.primary_key = true;
        pk.nullable = false;
        let schema = TableSchema::new(vec![Column::new("a", DataType::Int32), pk]);
        assert_eq!(vec![1], schema.pk_ordinals);
        assert_eq!(Some(1), schema.column_index("PK"));
    }

    #[test]
    fn alter_ranks_order_columns_before_indexes() {
        let rename = AlterTableAction::RenameColumn {
            from: "a".to_string(),
            to: "b".to_string(),
        };
        let drop = AlterTableAction::DropColumn {
            name: "c".to_string(),
        };
        let drop_index = AlterTableAction::DropIndex {
            name: "i".to_string(),
        };
        assert!(rename.rank() < drop.rank());
        assert!(drop.rank() < drop_index.rank());
        assert!(drop_index.rank() < AlterTableAction::AutoIncrement(1).rank());
    }

    #[test]
    fn unique_index_wrapping_keeps_target() {
        let table = UnresolvedTable::new("db", "t");
        let inner = AlterTable::new(
            table.clone(),
            AlterTableAction::DropColumn {
                name: "c".to_string(),
            },
        );
        let outer = AlterTable {
            table: Box::new(LogicalPlan::AlterTable(inner)),
            action: AlterTableAction::DropPrimaryKey,
        };
        assert_eq!(Some(&table), outer.target());
    }
}
