//! Statement shapes produced by [`super::CustomParser`].
//!
//! Queries, expressions, INSERT and DELETE use the `sqlparser` AST directly.
//! Everything MySQL specific that `sqlparser` does not model is described by
//! the extension statements in this module.

use std::fmt;

use sqlparser::ast;

use crate::plan::{
    AccountLimits, AuthenticatedUser, Characteristic, ColumnOrder, EventStatus, KillKind,
    ObjectType, ParamDirection, PasswordOptions, Privilege, ReferentialAction,
    ReplicationOption, SecurityContext, TlsOptions, TriggerEvent, TriggerTime, UserName,
};

/// A column type as written, before it is resolved into a semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnType {
    /// Lowercased type name. Multi word names are joined by one space.
    pub name: String,
    pub length: Option<String>,
    pub scale: Option<String>,
    pub unsigned: bool,
    pub zerofill: bool,
    pub charset: Option<String>,
    pub collate: Option<String>,
    /// The `BINARY` attribute on a character type.
    pub binary_collate: bool,
    /// Members of an ENUM or SET.
    pub enum_values: Vec<String>,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.enum_values.is_empty() {
            let values: Vec<_> = self.enum_values.iter().map(|v| format!("'{v}'")).collect();
            write!(f, "({})", values.join(","))?;
        } else if let Some(len) = &self.length {
            match &self.scale {
                Some(scale) => write!(f, "({len},{scale})")?,
                None => write!(f, "({len})")?,
            }
        }
        if self.unsigned {
            write!(f, " unsigned")?;
        }
        if self.zerofill {
            write!(f, " zerofill")?;
        }
        if let Some(cs) = &self.charset {
            write!(f, " character set {cs}")?;
        }
        if let Some(co) = &self.collate {
            write!(f, " collate {co}")?;
        }
        Ok(())
    }
}

/// Key attribute written inline on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKeyOption {
    Primary,
    Unique,
    UniqueKey,
    Fulltext,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: ast::Ident,
    pub column_type: ColumnType,
    /// `Some(false)` for NOT NULL, `Some(true)` for an explicit NULL.
    pub null: Option<bool>,
    /// `DEFAULT` expression. Parenthesized defaults are `Expr::Nested`.
    pub default: Option<ast::Expr>,
    pub on_update: Option<ast::Expr>,
    pub auto_increment: bool,
    pub key: Option<ColumnKeyOption>,
    pub comment: Option<String>,
    /// `[GENERATED ALWAYS] AS (expr) [VIRTUAL|STORED]`, with the stored flag.
    pub generated: Option<(ast::Expr, bool)>,
    pub srid: Option<String>,
}

impl ColumnDef {
    pub fn new(name: ast::Ident, column_type: ColumnType) -> Self {
        ColumnDef {
            name,
            column_type,
            null: None,
            default: None,
            on_update: None,
            auto_increment: false,
            key: None,
            comment: None,
            generated: None,
            srid: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    #[default]
    Plain,
    Unique,
    Primary,
    Spatial,
    Fulltext,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexDef {
    pub name: Option<ast::Ident>,
    pub kind: IndexKind,
    /// Method named by `USING`, as written.
    pub using: Option<String>,
    pub parts: Vec<IndexPart>,
    pub comment: Option<String>,
    /// Any other `key = value` options, in order.
    pub options: Vec<(String, String)>,
}

/// One key part. `col(10)` is parsed as a function call with one argument.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexPart {
    Wildcard,
    Expr(ast::Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDef {
    pub name: Option<ast::Ident>,
    pub columns: Vec<ast::Ident>,
    pub parent: ast::ObjectName,
    pub parent_columns: Vec<ast::Ident>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckDef {
    pub name: Option<ast::Ident>,
    pub expr: ast::Expr,
    pub enforced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintDef {
    Index(IndexDef),
    ForeignKey(ForeignKeyDef),
    Check(CheckDef),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSpec {
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraintDef>,
    /// Source text of the table options following the definition list.
    pub options: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub name: ast::ObjectName,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub spec: Option<TableSpec>,
    pub like: Option<ast::ObjectName>,
    pub select: Option<Box<ast::Query>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableOperation {
    /// More than one column is an error reported by the planner.
    AddColumns {
        columns: Vec<ColumnDef>,
        order: Option<ColumnOrder>,
    },
    DropColumn(ast::Ident),
    RenameColumn {
        from: ast::Ident,
        to: ast::Ident,
    },
    /// `MODIFY` keeps the name, `CHANGE` may rename.
    ModifyColumn {
        name: ast::Ident,
        columns: Vec<ColumnDef>,
        order: Option<ColumnOrder>,
    },
    AddIndex(IndexDef),
    DropIndex(ast::Ident),
    DropPrimaryKey,
    RenameIndex {
        from: ast::Ident,
        to: ast::Ident,
    },
    DisableKeys,
    EnableKeys,
    AddForeignKey(ForeignKeyDef),
    AddCheck(CheckDef),
    DropForeignKey(ast::Ident),
    DropCheck(ast::Ident),
    DropConstraint(ast::Ident),
    SetDefault {
        column: ast::Ident,
        expr: ast::Expr,
    },
    DropDefault {
        column: ast::Ident,
    },
    AutoIncrement(String),
    Collation {
        charset: Option<String>,
        collate: Option<String>,
    },
    Rename(ast::ObjectName),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStmt {
    pub name: ast::ObjectName,
    pub operations: Vec<AlterTableOperation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub table: ast::ObjectName,
    pub index: IndexDef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStmt {
    pub name: ast::Ident,
    pub table: ast::ObjectName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    pub temporary: bool,
    pub if_exists: bool,
    pub names: Vec<ast::ObjectName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameTableStmt {
    pub renames: Vec<(ast::ObjectName, ast::ObjectName)>,
}

/// Text of a statement and of the body it defines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefinitionText {
    pub create_text: String,
    pub body_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStmt {
    pub or_replace: bool,
    pub algorithm: Option<String>,
    pub definer: Option<String>,
    pub security: Option<String>,
    pub name: ast::ObjectName,
    pub columns: Vec<ast::Ident>,
    pub query: Box<ast::Query>,
    pub text: DefinitionText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropViewStmt {
    pub if_exists: bool,
    pub names: Vec<ast::ObjectName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTriggerStmt {
    pub definer: Option<String>,
    pub name: ast::ObjectName,
    pub time: TriggerTime,
    pub event: TriggerEvent,
    pub table: ast::ObjectName,
    /// `(precedes, other trigger)`
    pub order: Option<(bool, ast::Ident)>,
    pub body: Box<Statement>,
    pub text: DefinitionText,
}

/// `DROP {TRIGGER|PROCEDURE|EVENT} [IF EXISTS] name`
#[derive(Debug, Clone, PartialEq)]
pub struct DropRoutineStmt {
    pub if_exists: bool,
    pub name: ast::ObjectName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParamDef {
    pub direction: ParamDirection,
    pub name: ast::Ident,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProcedureStmt {
    pub definer: Option<String>,
    pub name: ast::ObjectName,
    pub params: Vec<ProcedureParamDef>,
    pub characteristics: Vec<Characteristic>,
    pub security: SecurityContext,
    pub comment: Option<String>,
    pub body: Box<Statement>,
    pub text: DefinitionText,
}

/// `AT ts` or `EVERY interval [STARTS ts] [ENDS ts]`. Timestamps may carry
/// added intervals, kept as written.
#[derive(Debug, Clone, PartialEq)]
pub enum EventScheduleDef {
    At(ast::Expr),
    Every {
        interval: ast::Expr,
        starts: Option<ast::Expr>,
        ends: Option<ast::Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateEventStmt {
    pub definer: Option<String>,
    pub if_not_exists: bool,
    pub name: ast::ObjectName,
    pub schedule: EventScheduleDef,
    pub preserve: bool,
    pub status: EventStatus,
    pub comment: Option<String>,
    pub body: Box<Statement>,
    pub text: DefinitionText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterEventStmt {
    pub definer: Option<String>,
    pub name: ast::ObjectName,
    pub schedule: Option<EventScheduleDef>,
    pub preserve: Option<bool>,
    pub rename: Option<ast::ObjectName>,
    pub status: Option<EventStatus>,
    pub comment: Option<String>,
    pub body: Option<(Box<Statement>, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabaseStmt {
    pub name: ast::Ident,
    pub if_not_exists: bool,
    pub charset: Option<String>,
    pub collate: Option<String>,
    pub encryption: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterDatabaseStmt {
    pub name: Option<ast::Ident>,
    pub charset: Option<String>,
    pub collate: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropDatabaseStmt {
    pub name: ast::Ident,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSpatialRefSysStmt {
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub srid: String,
    pub name: Option<String>,
    pub definition: Option<String>,
    pub organization: Option<(String, String)>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub with: Option<ast::With>,
    pub ignore: bool,
    pub tables: Vec<ast::TableWithJoins>,
    pub assignments: Vec<ast::Assignment>,
    pub selection: Option<ast::Expr>,
    pub order_by: Vec<ast::OrderByExpr>,
    pub limit: Option<ast::Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadDataStmt {
    pub local: bool,
    pub file: String,
    pub duplicates: Option<crate::plan::DuplicateHandling>,
    pub table: ast::ObjectName,
    pub fields: Option<crate::plan::FieldsOptions>,
    pub lines: Option<crate::plan::LinesOptions>,
    pub ignore_lines: Option<ast::Expr>,
    pub columns: Vec<ast::Ident>,
}

/// A query together with the MySQL select options the grammar does not keep.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStmt {
    pub query: Box<ast::Query>,
    /// Targets of `INTO`, as written (`@a` or a bare name).
    pub into: Vec<String>,
    pub calc_found_rows: bool,
}

/// Statements of a stored program body.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub label: Option<ast::Ident>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub condition: ast::Expr,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub branches: Vec<ConditionalBlock>,
    pub else_statements: Option<Vec<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseStmt {
    pub operand: Option<ast::Expr>,
    pub branches: Vec<ConditionalBlock>,
    pub else_statements: Option<Vec<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopKind {
    Loop,
    Repeat(ast::Expr),
    While(ast::Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopStmt {
    pub kind: LoopKind,
    pub label: Option<ast::Ident>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionValue {
    SqlState(String),
    ErrorCode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerCondition {
    NotFound,
    /// Any other condition, as written.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclareStmt {
    Condition {
        name: ast::Ident,
        value: ConditionValue,
    },
    Variables {
        names: Vec<ast::Ident>,
        column_type: ColumnType,
        default: Option<ast::Expr>,
    },
    Cursor {
        name: ast::Ident,
        query: Box<ast::Query>,
    },
    Handler {
        action: crate::plan::HandlerAction,
        condition: HandlerCondition,
        statement: Box<Statement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalStmt {
    pub sqlstate: Option<String>,
    pub condition: Option<ast::Ident>,
    pub info: Vec<(ast::Ident, ast::Expr)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt {
    pub name: ast::ObjectName,
    pub args: Vec<ast::Expr>,
}

/// Scope written on a SET target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetScope {
    /// A bare name: a local variable or column.
    None,
    User,
    Session,
    Global,
    Persist,
    PersistOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetItem {
    Variable {
        scope: SetScope,
        name: String,
        value: ast::Expr,
    },
    Names {
        charset: String,
        collate: Option<String>,
    },
    /// `SET CHARACTER SET cs`. `None` for `DEFAULT`.
    Charset(Option<String>),
    Transaction {
        scope: SetScope,
        isolation: Option<String>,
        read_only: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrepareSource {
    Text(String),
    UserVariable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLockDef {
    pub table: ast::ObjectName,
    pub alias: Option<ast::Ident>,
    pub write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantAsDef {
    pub user: UserName,
    /// `None` when no `WITH ROLE` clause is given.
    pub roles: Option<RoleSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSpec {
    Default,
    None,
    All,
    AllExcept(Vec<UserName>),
    Roles(Vec<UserName>),
}

/// `db.tbl`, `db.*`, `*.*` or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeLevelDef {
    pub database: Option<String>,
    pub object: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStmt {
    CreateUser(Box<CreateUserStmt>),
    RenameUser(Vec<(UserName, UserName)>),
    DropUser {
        if_exists: bool,
        users: Vec<UserName>,
    },
    CreateRole {
        if_not_exists: bool,
        roles: Vec<UserName>,
    },
    DropRole {
        if_exists: bool,
        roles: Vec<UserName>,
    },
    Grant {
        privileges: Vec<Privilege>,
        object_type: ObjectType,
        level: PrivilegeLevelDef,
        to: Vec<UserName>,
        with_grant_option: bool,
        as_user: Option<GrantAsDef>,
    },
    GrantRole {
        roles: Vec<UserName>,
        to: Vec<UserName>,
        with_admin_option: bool,
    },
    GrantProxy {
        on: UserName,
        to: Vec<UserName>,
        with_grant_option: bool,
    },
    Revoke {
        privileges: Vec<Privilege>,
        object_type: ObjectType,
        level: PrivilegeLevelDef,
        from: Vec<UserName>,
    },
    RevokeAll {
        from: Vec<UserName>,
    },
    RevokeRole {
        roles: Vec<UserName>,
        from: Vec<UserName>,
    },
    RevokeProxy {
        on: UserName,
        from: Vec<UserName>,
    },
    ShowGrants {
        user: Option<UserName>,
        using: Vec<UserName>,
    },
    ShowPrivileges,
    Flush {
        target: String,
        no_write_to_binlog: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserStmt {
    pub if_not_exists: bool,
    pub users: Vec<AuthenticatedUser>,
    pub default_roles: Vec<UserName>,
    pub tls: Option<TlsOptions>,
    pub limits: Option<AccountLimits>,
    pub password_options: Option<PasswordOptions>,
    pub locked: bool,
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationStmt {
    ChangeSource(Vec<ReplicationOption>),
    ChangeFilter(Vec<ReplicationOption>),
    Start,
    Stop,
    Reset { all: bool },
}

/// `LIKE 'pattern'` or `WHERE expr` on a SHOW statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowFilter {
    Like(String),
    Where(ast::Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Trigger,
    Procedure,
    Event,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowStmt {
    ProcessList,
    CreateTable {
        name: ast::ObjectName,
        is_view: bool,
    },
    CreateDatabase {
        name: ast::Ident,
        if_not_exists: bool,
    },
    CreateRoutine {
        kind: RoutineKind,
        name: ast::ObjectName,
    },
    Triggers {
        database: Option<ast::Ident>,
        filter: Option<ShowFilter>,
    },
    Events {
        database: Option<ast::Ident>,
        filter: Option<ShowFilter>,
    },
    RoutineStatus {
        function: bool,
        filter: Option<ShowFilter>,
    },
    TableStatus {
        database: Option<ast::Ident>,
        filter: Option<ShowFilter>,
    },
    Indexes {
        table: ast::ObjectName,
        database: Option<ast::Ident>,
    },
    Variables {
        global: bool,
        filter: Option<ShowFilter>,
    },
    Tables {
        full: bool,
        database: Option<ast::Ident>,
        filter: Option<ShowFilter>,
    },
    Databases {
        filter: Option<ShowFilter>,
    },
    Columns {
        full: bool,
        table: ast::ObjectName,
        database: Option<ast::Ident>,
        filter: Option<ShowFilter>,
    },
    Warnings {
        offset: Option<ast::Expr>,
        limit: Option<ast::Expr>,
    },
    Collation {
        filter: Option<ShowFilter>,
    },
    Charset {
        filter: Option<ShowFilter>,
    },
    Engines,
    Status {
        global: bool,
        filter: Option<ShowFilter>,
    },
    ReplicaStatus,
    /// A SHOW form that has no plan, named by its keywords.
    Unsupported(String),
}

/// A single parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(QueryStmt),
    Insert {
        with: Option<ast::With>,
        insert: Box<ast::Insert>,
    },
    Update(Box<UpdateStmt>),
    Delete {
        with: Option<ast::With>,
        delete: Box<ast::Delete>,
    },
    LoadData(Box<LoadDataStmt>),

    CreateTable(Box<CreateTableStmt>),
    AlterTable(AlterTableStmt),
    CreateIndex(CreateIndexStmt),
    DropIndex(DropIndexStmt),
    DropTable(DropTableStmt),
    RenameTable(RenameTableStmt),
    TruncateTable(ast::ObjectName),
    Analyze(Vec<ast::ObjectName>),
    CreateView(Box<CreateViewStmt>),
    DropView(DropViewStmt),
    CreateTrigger(Box<CreateTriggerStmt>),
    DropTrigger(DropRoutineStmt),
    CreateProcedure(Box<CreateProcedureStmt>),
    DropProcedure(DropRoutineStmt),
    CreateEvent(Box<CreateEventStmt>),
    AlterEvent(Box<AlterEventStmt>),
    DropEvent(DropRoutineStmt),
    CreateDatabase(CreateDatabaseStmt),
    AlterDatabase(AlterDatabaseStmt),
    DropDatabase(DropDatabaseStmt),
    CreateSpatialRefSys(CreateSpatialRefSysStmt),

    Block(BlockStmt),
    If(IfStmt),
    Case(CaseStmt),
    Loop(LoopStmt),
    Leave(ast::Ident),
    Iterate(ast::Ident),
    Declare(DeclareStmt),
    Open(ast::Ident),
    Close(ast::Ident),
    Fetch {
        cursor: ast::Ident,
        into: Vec<ast::Ident>,
    },
    Signal(SignalStmt),
    Call(CallStmt),

    Set(Vec<SetItem>),
    Use(ast::Ident),
    StartTransaction {
        read_only: bool,
    },
    Commit,
    Rollback,
    Savepoint(ast::Ident),
    RollbackToSavepoint(ast::Ident),
    ReleaseSavepoint(ast::Ident),
    Prepare {
        name: ast::Ident,
        source: PrepareSource,
    },
    Execute {
        name: ast::Ident,
        using: Vec<String>,
    },
    Deallocate(ast::Ident),
    Kill {
        kind: KillKind,
        id: ast::Expr,
    },
    LockTables(Vec<TableLockDef>),
    UnlockTables,
    Explain {
        format: Option<String>,
        statement: Box<Statement>,
    },
    /// `DESCRIBE tbl`
    DescribeTable(ast::ObjectName),

    Account(AccountStmt),
    Replication(ReplicationStmt),
    Show(ShowStmt),

    /// A statement the grammar understands but that has no extension shape.
    Other(Box<ast::Statement>),
}

impl Statement {
    /// Whether this statement is a query that can be used as a cursor or
    /// prepared body.
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }
}
