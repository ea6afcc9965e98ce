//! Logical plan nodes.
//!
//! A plan is a strict tree: every node owns its children. Table, column and
//! function references are unresolved and carry only names.

pub mod admin;
pub mod ddl;
pub mod dml;
pub mod proc;
pub mod query;
pub mod show;

use std::fmt;

pub use admin::*;
pub use ddl::*;
pub use dml::*;
pub use proc::*;
pub use query::*;
pub use show::*;

use crate::explain::{ExplainEntry, ExplainNode, Explainable};

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    // Queries
    UnresolvedTable(UnresolvedTable),
    UnresolvedTableFunction(UnresolvedTableFunction),
    TableAlias(TableAlias),
    SubqueryAlias(SubqueryAlias),
    ValueDerivedTable(ValueDerivedTable),
    JsonTable(JsonTable),
    Dual,
    Values(Values),
    Join(Join),
    Filter(Filter),
    Project(Project),
    GroupBy(GroupBy),
    Window(Window),
    NamedWindows(NamedWindows),
    Having(Having),
    Distinct(Distinct),
    Sort(Sort),
    Offset(Offset),
    Limit(Limit),
    With(With),
    Union(Union),
    SelectInto(SelectInto),
    DescribeQuery(DescribeQuery),
    /// A statement that does nothing, e.g. one made only of comments.
    Nothing,

    // DML
    InsertInto(InsertInto),
    Update(Update),
    DeleteFrom(DeleteFrom),
    LoadData(LoadData),

    // DDL
    CreateTable(CreateTable),
    DropTable(DropTable),
    RenameTable(RenameTable),
    TruncateTable(TruncateTable),
    AlterTable(AlterTable),
    CreateIndex(CreateIndex),
    CreateView(CreateView),
    DropView(DropView),
    CreateTrigger(CreateTrigger),
    DropTrigger(DropRoutine),
    CreateProcedure(CreateProcedure),
    DropProcedure(DropRoutine),
    CreateEvent(CreateEvent),
    AlterEvent(AlterEvent),
    DropEvent(DropRoutine),
    CreateDatabase(CreateDatabase),
    AlterDatabase(AlterDatabase),
    DropDatabase(DropDatabase),
    Analyze(Analyze),
    CreateSpatialRefSys(CreateSpatialRefSys),

    // Procedural
    Block(Block),
    BeginEndBlock(BeginEndBlock),
    IfElse(IfElse),
    CaseStatement(CaseStatement),
    Loop(Loop),
    Repeat(Repeat),
    While(While),
    Leave(Leave),
    Iterate(Iterate),
    Call(Call),
    DeclareCondition(DeclareCondition),
    DeclareVariables(DeclareVariables),
    DeclareCursor(DeclareCursor),
    DeclareHandler(DeclareHandler),
    Open(CursorRef),
    Close(CursorRef),
    Fetch(Fetch),
    Signal(Signal),

    // Sessions and administration
    Set(Set),
    Use(Use),
    StartTransaction(StartTransaction),
    Commit,
    Rollback,
    Savepoint(Savepoint),
    RollbackSavepoint(Savepoint),
    ReleaseSavepoint(Savepoint),
    Prepare(Prepare),
    Execute(Execute),
    Deallocate(Deallocate),
    Kill(Kill),
    LockTables(LockTables),
    UnlockTables,
    FlushPrivileges(FlushPrivileges),

    // Accounts
    CreateUser(CreateUser),
    RenameUser(RenameUser),
    DropUser(DropUser),
    CreateRole(CreateRole),
    DropRole(DropRole),
    Grant(Grant),
    GrantRole(GrantRole),
    GrantProxy(GrantProxy),
    Revoke(Revoke),
    RevokeAll(RevokeAll),
    RevokeRole(RevokeRole),
    RevokeProxy(RevokeProxy),
    ShowGrants(ShowGrants),
    ShowPrivileges,

    // Replication
    ChangeReplicationSource(ChangeReplicationSource),
    ChangeReplicationFilter(ChangeReplicationFilter),
    StartReplica,
    StopReplica,
    ResetReplica(ResetReplica),

    // SHOW
    ShowProcessList,
    ShowCreateTable(ShowCreateTable),
    ShowCreateDatabase(ShowCreateDatabase),
    ShowCreateTrigger(ShowCreateRoutine),
    ShowCreateProcedure(ShowCreateRoutine),
    ShowCreateEvent(ShowCreateRoutine),
    ShowTriggers(ShowInDatabase),
    ShowEvents(ShowInDatabase),
    ShowTableStatus(ShowInDatabase),
    ShowIndexes(ShowIndexes),
    ShowVariables(ShowVariables),
    ShowTables(ShowTables),
    ShowDatabases,
    ShowColumns(ShowColumns),
    ShowWarnings,
    ShowCharset,
    ShowStatus(ShowStatus),
    ShowReplicaStatus,
}

impl LogicalPlan {
    /// Direct children of this node, in order.
    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            Self::TableAlias(n) => vec![n.input.as_ref()],
            Self::SubqueryAlias(n) => vec![n.input.as_ref()],
            Self::Join(n) => vec![n.left.as_ref(), n.right.as_ref()],
            Self::Filter(n) => vec![n.input.as_ref()],
            Self::Project(n) => vec![n.input.as_ref()],
            Self::GroupBy(n) => vec![n.input.as_ref()],
            Self::Window(n) => vec![n.input.as_ref()],
            Self::NamedWindows(n) => vec![n.input.as_ref()],
            Self::Having(n) => vec![n.input.as_ref()],
            Self::Distinct(n) => vec![n.input.as_ref()],
            Self::Sort(n) => vec![n.input.as_ref()],
            Self::Offset(n) => vec![n.input.as_ref()],
            Self::Limit(n) => vec![n.input.as_ref()],
            Self::With(n) => {
                let mut children: Vec<&LogicalPlan> = n.ctes.iter().map(|c| c.input.as_ref()).collect();
                children.push(n.input.as_ref());
                children
            }
            Self::Union(n) => vec![n.left.as_ref(), n.right.as_ref()],
            Self::SelectInto(n) => vec![n.input.as_ref()],
            Self::DescribeQuery(n) => vec![n.input.as_ref()],
            Self::InsertInto(n) => vec![n.source.as_ref()],
            Self::Update(n) => vec![n.input.as_ref()],
            Self::DeleteFrom(n) => vec![n.input.as_ref()],
            Self::CreateTable(n) => n.select.iter().map(|s| s.as_ref()).collect(),
            Self::AlterTable(n) => vec![n.table.as_ref()],
            Self::CreateView(n) => vec![n.definition.input.as_ref()],
            Self::CreateTrigger(n) => vec![n.body.as_ref()],
            Self::CreateProcedure(n) => vec![n.body.as_ref()],
            Self::CreateEvent(n) => vec![n.body.as_ref()],
            Self::AlterEvent(n) => n.body.iter().map(|b| b.as_ref()).collect(),
            Self::Block(n) => n.statements.iter().collect(),
            Self::BeginEndBlock(n) => n.block.statements.iter().collect(),
            Self::IfElse(n) => n.children(),
            Self::CaseStatement(n) => n.children(),
            Self::Loop(n) => n.block.statements.iter().collect(),
            Self::Repeat(n) => n.block.statements.iter().collect(),
            Self::While(n) => n.block.statements.iter().collect(),
            Self::DeclareCursor(n) => vec![n.select.as_ref()],
            Self::DeclareHandler(n) => vec![n.statement.as_ref()],
            Self::Prepare(n) => vec![n.child.as_ref()],
            Self::LockTables(n) => n.locks.iter().map(|l| &l.table).collect(),
            Self::ShowTables(_)
            | Self::UnresolvedTable(_)
            | Self::UnresolvedTableFunction(_)
            | Self::ValueDerivedTable(_)
            | Self::JsonTable(_)
            | Self::Dual
            | Self::Values(_)
            | Self::Nothing
            | Self::LoadData(_)
            | Self::DropTable(_)
            | Self::RenameTable(_)
            | Self::TruncateTable(_)
            | Self::CreateIndex(_)
            | Self::DropView(_)
            | Self::DropTrigger(_)
            | Self::DropProcedure(_)
            | Self::DropEvent(_)
            | Self::CreateDatabase(_)
            | Self::AlterDatabase(_)
            | Self::DropDatabase(_)
            | Self::Analyze(_)
            | Self::CreateSpatialRefSys(_)
            | Self::Leave(_)
            | Self::Iterate(_)
            | Self::Call(_)
            | Self::DeclareCondition(_)
            | Self::DeclareVariables(_)
            | Self::Open(_)
            | Self::Close(_)
            | Self::Fetch(_)
            | Self::Signal(_)
            | Self::Set(_)
            | Self::Use(_)
            | Self::StartTransaction(_)
            | Self::Commit
            | Self::Rollback
            | Self::Savepoint(_)
            | Self::RollbackSavepoint(_)
            | Self::ReleaseSavepoint(_)
            | Self::Execute(_)
            | Self::Deallocate(_)
            | Self::Kill(_)
            | Self::UnlockTables
            | Self::FlushPrivileges(_)
            | Self::CreateUser(_)
            | Self::RenameUser(_)
            | Self::DropUser(_)
            | Self::CreateRole(_)
            | Self::DropRole(_)
            | Self::Grant(_)
            | Self::GrantRole(_)
            | Self::GrantProxy(_)
            | Self::Revoke(_)
            | Self::RevokeAll(_)
            | Self::RevokeRole(_)
            | Self::RevokeProxy(_)
            | Self::ShowGrants(_)
            | Self::ShowPrivileges
            | Self::ChangeReplicationSource(_)
            | Self::ChangeReplicationFilter(_)
            | Self::StartReplica
            | Self::StopReplica
            | Self::ResetReplica(_)
            | Self::ShowProcessList
            | Self::ShowCreateTable(_)
            | Self::ShowCreateDatabase(_)
            | Self::ShowCreateTrigger(_)
            | Self::ShowCreateProcedure(_)
            | Self::ShowCreateEvent(_)
            | Self::ShowTriggers(_)
            | Self::ShowEvents(_)
            | Self::ShowTableStatus(_)
            | Self::ShowIndexes(_)
            | Self::ShowVariables(_)
            | Self::ShowDatabases
            | Self::ShowColumns(_)
            | Self::ShowWarnings
            | Self::ShowCharset
            | Self::ShowStatus(_)
            | Self::ShowReplicaStatus => Vec::new(),
        }
    }

    /// Build the printable tree for this plan.
    pub fn explain_node(&self) -> ExplainNode {
        ExplainNode::new(self.explain_entry())
            .with_children(self.children().into_iter().map(|c| c.explain_node()))
    }
}

impl Explainable for LogicalPlan {
    fn explain_entry(&self) -> ExplainEntry {
        match self {
            Self::UnresolvedTable(n) => n.explain_entry(),
            Self::UnresolvedTableFunction(n) => n.explain_entry(),
            Self::TableAlias(n) => n.explain_entry(),
            Self::SubqueryAlias(n) => n.explain_entry(),
            Self::ValueDerivedTable(n) => n.explain_entry(),
            Self::JsonTable(n) => n.explain_entry(),
            Self::Dual => ExplainEntry::new("Dual"),
            Self::Values(n) => n.explain_entry(),
            Self::Join(n) => n.explain_entry(),
            Self::Filter(n) => n.explain_entry(),
            Self::Project(n) => n.explain_entry(),
            Self::GroupBy(n) => n.explain_entry(),
            Self::Window(n) => n.explain_entry(),
            Self::NamedWindows(n) => n.explain_entry(),
            Self::Having(n) => n.explain_entry(),
            Self::Distinct(n) => n.explain_entry(),
            Self::Sort(n) => n.explain_entry(),
            Self::Offset(n) => n.explain_entry(),
            Self::Limit(n) => n.explain_entry(),
            Self::With(n) => n.explain_entry(),
            Self::Union(n) => n.explain_entry(),
            Self::SelectInto(n) => n.explain_entry(),
            Self::DescribeQuery(n) => n.explain_entry(),
            Self::Nothing => ExplainEntry::new("Nothing"),
            Self::InsertInto(n) => n.explain_entry(),
            Self::Update(n) => n.explain_entry(),
            Self::DeleteFrom(n) => n.explain_entry(),
            Self::LoadData(n) => n.explain_entry(),
            Self::CreateTable(n) => n.explain_entry(),
            Self::DropTable(n) => n.explain_entry(),
            Self::RenameTable(n) => n.explain_entry(),
            Self::TruncateTable(n) => n.explain_entry(),
            Self::AlterTable(n) => n.explain_entry(),
            Self::CreateIndex(n) => n.explain_entry(),
            Self::CreateView(n) => n.explain_entry(),
            Self::DropView(n) => n.explain_entry(),
            Self::CreateTrigger(n) => n.explain_entry(),
            Self::DropTrigger(n) => n.entry("DropTrigger"),
            Self::CreateProcedure(n) => n.explain_entry(),
            Self::DropProcedure(n) => n.entry("DropProcedure"),
            Self::CreateEvent(n) => n.explain_entry(),
            Self::AlterEvent(n) => n.explain_entry(),
            Self::DropEvent(n) => n.entry("DropEvent"),
            Self::CreateDatabase(n) => n.explain_entry(),
            Self::AlterDatabase(n) => n.explain_entry(),
            Self::DropDatabase(n) => n.explain_entry(),
            Self::Analyze(n) => n.explain_entry(),
            Self::CreateSpatialRefSys(n) => n.explain_entry(),
            Self::Block(_) => ExplainEntry::new("Block"),
            Self::BeginEndBlock(n) => n.explain_entry(),
            Self::IfElse(n) => n.explain_entry(),
            Self::CaseStatement(n) => n.explain_entry(),
            Self::Loop(n) => n.explain_entry(),
            Self::Repeat(n) => n.explain_entry(),
            Self::While(n) => n.explain_entry(),
            Self::Leave(n) => n.explain_entry(),
            Self::Iterate(n) => n.explain_entry(),
            Self::Call(n) => n.explain_entry(),
            Self::DeclareCondition(n) => n.explain_entry(),
            Self::DeclareVariables(n) => n.explain_entry(),
            Self::DeclareCursor(n) => n.explain_entry(),
            Self::DeclareHandler(n) => n.explain_entry(),
            Self::Open(n) => n.entry("Open"),
            Self::Close(n) => n.entry("Close"),
            Self::Fetch(n) => n.explain_entry(),
            Self::Signal(n) => n.explain_entry(),
            Self::Set(n) => n.explain_entry(),
            Self::Use(n) => n.explain_entry(),
            Self::StartTransaction(n) => n.explain_entry(),
            Self::Commit => ExplainEntry::new("Commit"),
            Self::Rollback => ExplainEntry::new("Rollback"),
            Self::Savepoint(n) => n.entry("Savepoint"),
            Self::RollbackSavepoint(n) => n.entry("RollbackSavepoint"),
            Self::ReleaseSavepoint(n) => n.entry("ReleaseSavepoint"),
            Self::Prepare(n) => n.explain_entry(),
            Self::Execute(n) => n.explain_entry(),
            Self::Deallocate(n) => n.explain_entry(),
            Self::Kill(n) => n.explain_entry(),
            Self::LockTables(n) => n.explain_entry(),
            Self::UnlockTables => ExplainEntry::new("UnlockTables"),
            Self::FlushPrivileges(n) => n.explain_entry(),
            Self::CreateUser(n) => n.explain_entry(),
            Self::RenameUser(n) => n.explain_entry(),
            Self::DropUser(n) => n.explain_entry(),
            Self::CreateRole(n) => n.explain_entry(),
            Self::DropRole(n) => n.explain_entry(),
            Self::Grant(n) => n.explain_entry(),
            Self::GrantRole(n) => n.explain_entry(),
            Self::GrantProxy(n) => n.explain_entry(),
            Self::Revoke(n) => n.explain_entry(),
            Self::RevokeAll(n) => n.explain_entry(),
            Self::RevokeRole(n) => n.explain_entry(),
            Self::RevokeProxy(n) => n.explain_entry(),
            Self::ShowGrants(n) => n.explain_entry(),
            Self::ShowPrivileges => ExplainEntry::new("ShowPrivileges"),
            Self::ChangeReplicationSource(n) => n.explain_entry(),
            Self::ChangeReplicationFilter(n) => n.explain_entry(),
            Self::StartReplica => ExplainEntry::new("StartReplica"),
            Self::StopReplica => ExplainEntry::new("StopReplica"),
            Self::ResetReplica(n) => n.explain_entry(),
            Self::ShowProcessList => ExplainEntry::new("ShowProcessList"),
            Self::ShowCreateTable(n) => n.explain_entry(),
            Self::ShowCreateDatabase(n) => n.explain_entry(),
            Self::ShowCreateTrigger(n) => n.entry("ShowCreateTrigger"),
            Self::ShowCreateProcedure(n) => n.entry("ShowCreateProcedure"),
            Self::ShowCreateEvent(n) => n.entry("ShowCreateEvent"),
            Self::ShowTriggers(n) => n.entry("ShowTriggers"),
            Self::ShowEvents(n) => n.entry("ShowEvents"),
            Self::ShowTableStatus(n) => n.entry("ShowTableStatus"),
            Self::ShowIndexes(n) => n.explain_entry(),
            Self::ShowVariables(n) => n.explain_entry(),
            Self::ShowTables(n) => n.explain_entry(),
            Self::ShowDatabases => ExplainEntry::new("ShowDatabases"),
            Self::ShowColumns(n) => n.explain_entry(),
            Self::ShowWarnings => ExplainEntry::new("ShowWarnings"),
            Self::ShowCharset => ExplainEntry::new("ShowCharset"),
            Self::ShowStatus(n) => n.explain_entry(),
            Self::ShowReplicaStatus => ExplainEntry::new("ShowReplicaStatus"),
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain_node())
    }
}

/// Join displayable items with a comma.
pub(crate) fn comma_separated<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{ComparisonOperator, Expr};
    use crate::types::{DataType, ScalarValue};

    #[test]
    fn render_tree() {
        let plan = LogicalPlan::Limit(Limit {
            limit: Expr::literal(ScalarValue::Int8(5), DataType::Int8),
            calc_found_rows: false,
            input: Box::new(LogicalPlan::Offset(Offset {
                offset: Expr::literal(ScalarValue::Int8(2), DataType::Int8),
                input: Box::new(LogicalPlan::Filter(Filter {
                    predicate: Expr::compare(
                        Expr::column("foo"),
                        ComparisonOperator::Gt,
                        Expr::column("qux"),
                    ),
                    input: Box::new(LogicalPlan::UnresolvedTable(UnresolvedTable::new(
                        "", "tbl",
                    ))),
                })),
            })),
        });

        let expected = "\
Limit (limit = 5)
└─ Offset (offset = 2)
   └─ Filter (predicate = foo > qux)
      └─ UnresolvedTable (name = tbl)
";
        assert_eq!(expected, plan.to_string());
    }

    #[test]
    fn with_children_include_ctes() {
        let cte = SubqueryAlias {
            name: "c".to_string(),
            columns: Vec::new(),
            text: "select 1".to_string(),
            input: Box::new(LogicalPlan::Dual),
        };
        let plan = LogicalPlan::With(With {
            ctes: vec![cte],
            recursive: false,
            input: Box::new(LogicalPlan::Nothing),
        });
        assert_eq!(2, plan.children().len());
    }
}
