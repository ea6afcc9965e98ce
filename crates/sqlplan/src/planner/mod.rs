//! Conversion of parsed statements into logical plans.
//!
//! [`StatementPlanner`] is the single entry point. It dispatches on the
//! statement shape and hands off to the builders in the submodules, all of
//! which are implemented as methods on the planner so they share the session
//! and source map.

mod admin;
mod ddl;
mod dml;
mod expr;
mod proc;
mod schema;
mod select;
mod show;

use sqlparser::ast::{self, ObjectName};
use tracing::{debug, trace};

use crate::context::SessionContext;
use crate::errors::{PlanError, Result};
use crate::parser::ast::Statement;
use crate::parser::{SourceMap, parse_statement};
use crate::plan::{LogicalPlan, UnresolvedTable};

pub(crate) use schema::default_value;

/// Plan SQL statements for a session.
pub struct StatementPlanner<'a> {
    ctx: &'a dyn SessionContext,
    source: &'a SourceMap,
}

impl<'a> StatementPlanner<'a> {
    pub fn new(ctx: &'a dyn SessionContext, source: &'a SourceMap) -> Self {
        StatementPlanner { ctx, source }
    }

    pub fn plan_statement(&self, statement: &Statement) -> Result<LogicalPlan> {
        debug!(kind = statement_kind(statement), "planning statement");

        match statement {
            Statement::Query(stmt) => self.plan_query_stmt(stmt),
            Statement::Insert { with, insert } => self.plan_insert(with.as_ref(), insert),
            Statement::Update(stmt) => self.plan_update(stmt),
            Statement::Delete { with, delete } => self.plan_delete(with.as_ref(), delete),
            Statement::LoadData(stmt) => self.plan_load_data(stmt),

            Statement::CreateTable(stmt) => self.plan_create_table(stmt),
            Statement::AlterTable(stmt) => self.plan_alter_table(stmt),
            Statement::CreateIndex(stmt) => self.plan_create_index(stmt),
            Statement::DropIndex(stmt) => self.plan_drop_index(stmt),
            Statement::DropTable(stmt) => self.plan_drop_table(stmt),
            Statement::RenameTable(stmt) => self.plan_rename_table(stmt),
            Statement::TruncateTable(name) => self.plan_truncate_table(name),
            Statement::Analyze(names) => self.plan_analyze(names),
            Statement::CreateView(stmt) => self.plan_create_view(stmt),
            Statement::DropView(stmt) => self.plan_drop_view(stmt),
            Statement::CreateTrigger(stmt) => self.plan_create_trigger(stmt),
            Statement::DropTrigger(stmt) => {
                Ok(LogicalPlan::DropTrigger(self.drop_routine(stmt)?))
            }
            Statement::CreateProcedure(stmt) => self.plan_create_procedure(stmt),
            Statement::DropProcedure(stmt) => {
                Ok(LogicalPlan::DropProcedure(self.drop_routine(stmt)?))
            }
            Statement::CreateEvent(stmt) => self.plan_create_event(stmt),
            Statement::AlterEvent(stmt) => self.plan_alter_event(stmt),
            Statement::DropEvent(stmt) => Ok(LogicalPlan::DropEvent(self.drop_routine(stmt)?)),
            Statement::CreateDatabase(stmt) => self.plan_create_database(stmt),
            Statement::AlterDatabase(stmt) => self.plan_alter_database(stmt),
            Statement::DropDatabase(stmt) => self.plan_drop_database(stmt),
            Statement::CreateSpatialRefSys(stmt) => self.plan_create_spatial_ref_sys(stmt),

            Statement::Block(stmt) => self.plan_begin_end_block(stmt),
            Statement::If(stmt) => self.plan_if(stmt),
            Statement::Case(stmt) => self.plan_case_statement(stmt),
            Statement::Loop(stmt) => self.plan_loop(stmt),
            Statement::Leave(label) => Ok(LogicalPlan::Leave(crate::plan::Leave {
                label: label.value.clone(),
            })),
            Statement::Iterate(label) => Ok(LogicalPlan::Iterate(crate::plan::Iterate {
                label: label.value.clone(),
            })),
            Statement::Declare(stmt) => self.plan_declare(stmt),
            Statement::Open(name) => Ok(LogicalPlan::Open(crate::plan::CursorRef {
                name: name.value.clone(),
            })),
            Statement::Close(name) => Ok(LogicalPlan::Close(crate::plan::CursorRef {
                name: name.value.clone(),
            })),
            Statement::Fetch { cursor, into } => Ok(LogicalPlan::Fetch(crate::plan::Fetch {
                cursor: cursor.value.clone(),
                variables: into.iter().map(|v| v.value.clone()).collect(),
            })),
            Statement::Signal(stmt) => self.plan_signal(stmt),
            Statement::Call(stmt) => self.plan_call(stmt),

            Statement::Set(items) => self.plan_set(items),
            Statement::Use(db) => Ok(LogicalPlan::Use(crate::plan::Use {
                database: db.value.clone(),
            })),
            Statement::StartTransaction { read_only } => Ok(LogicalPlan::StartTransaction(
                crate::plan::StartTransaction {
                    read_only: *read_only,
                },
            )),
            Statement::Commit => Ok(LogicalPlan::Commit),
            Statement::Rollback => Ok(LogicalPlan::Rollback),
            Statement::Savepoint(name) => Ok(LogicalPlan::Savepoint(savepoint(name))),
            Statement::RollbackToSavepoint(name) => {
                Ok(LogicalPlan::RollbackSavepoint(savepoint(name)))
            }
            Statement::ReleaseSavepoint(name) => {
                Ok(LogicalPlan::ReleaseSavepoint(savepoint(name)))
            }
            Statement::Prepare { name, source } => self.plan_prepare(name, source),
            Statement::Execute { name, using } => Ok(self.plan_execute(name, using)),
            Statement::Deallocate(name) => Ok(LogicalPlan::Deallocate(crate::plan::Deallocate {
                name: name.value.clone(),
            })),
            Statement::Kill { kind, id } => self.plan_kill(*kind, id),
            Statement::LockTables(locks) => self.plan_lock_tables(locks),
            Statement::UnlockTables => Ok(LogicalPlan::UnlockTables),
            Statement::Explain { format, statement } => {
                self.plan_explain(format.as_deref(), statement)
            }
            Statement::DescribeTable(name) => self.plan_describe_table(name),

            Statement::Account(stmt) => self.plan_account(stmt),
            Statement::Replication(stmt) => Ok(self.plan_replication(stmt)),
            Statement::Show(stmt) => self.plan_show(stmt),

            Statement::Other(stmt) => Err(PlanError::unsupported_syntax(stmt.to_string())),
        }
    }

    /// Plan a statement given as SQL text, e.g. the body of a PREPARE or a
    /// rewritten SHOW.
    pub(crate) fn plan_sql(&self, sql: &str) -> Result<LogicalPlan> {
        trace!(%sql, "planning nested statement");
        plan_sql(self.ctx, sql)
    }

    /// The database a routine lives in: the qualifier, else the current
    /// database.
    pub(crate) fn routine_database(&self, qualifier: Option<&str>) -> Result<String> {
        let db = match qualifier {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => self.ctx.current_database(),
        };
        if db.is_empty() {
            return Err(PlanError::validation("no database selected"));
        }
        Ok(db)
    }

    /// The definer as written, or the connected client.
    pub(crate) fn definer(&self, given: Option<&String>) -> String {
        match given {
            Some(d) => d.clone(),
            None => format!(
                "`{}`@`{}`",
                self.ctx.client_user(),
                self.ctx.client_address()
            ),
        }
    }
}

/// Plan one statement from SQL text. Empty text plans to
/// [`LogicalPlan::Nothing`].
pub(crate) fn plan_sql(ctx: &dyn SessionContext, sql: &str) -> Result<LogicalPlan> {
    match parse_statement(sql)? {
        Some(parsed) => {
            StatementPlanner::new(ctx, &parsed.source).plan_statement(&parsed.statement)
        }
        None => Ok(LogicalPlan::Nothing),
    }
}

fn savepoint(name: &ast::Ident) -> crate::plan::Savepoint {
    crate::plan::Savepoint {
        name: name.value.clone(),
    }
}

/// Split an object name into its optional qualifier and name.
pub(crate) fn split_object_name(name: &ObjectName) -> Result<(Option<&str>, &str)> {
    match name.0.as_slice() {
        [name] => Ok((None, name.value.as_str())),
        [qualifier, name] => Ok((Some(qualifier.value.as_str()), name.value.as_str())),
        _ => Err(PlanError::unsupported_syntax(format!(
            "invalid object name: {name}"
        ))),
    }
}

pub(crate) fn unresolved_table(name: &ObjectName) -> Result<UnresolvedTable> {
    let (qualifier, name) = split_object_name(name)?;
    Ok(UnresolvedTable::new(qualifier.unwrap_or_default(), name))
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Query(_) => "query",
        Statement::Insert { .. } => "insert",
        Statement::Update(_) => "update",
        Statement::Delete { .. } => "delete",
        Statement::LoadData(_) => "load_data",
        Statement::CreateTable(_)
        | Statement::AlterTable(_)
        | Statement::CreateIndex(_)
        | Statement::DropIndex(_)
        | Statement::DropTable(_)
        | Statement::RenameTable(_)
        | Statement::TruncateTable(_)
        | Statement::Analyze(_)
        | Statement::CreateView(_)
        | Statement::DropView(_)
        | Statement::CreateTrigger(_)
        | Statement::DropTrigger(_)
        | Statement::CreateProcedure(_)
        | Statement::DropProcedure(_)
        | Statement::CreateEvent(_)
        | Statement::AlterEvent(_)
        | Statement::DropEvent(_)
        | Statement::CreateDatabase(_)
        | Statement::AlterDatabase(_)
        | Statement::DropDatabase(_)
        | Statement::CreateSpatialRefSys(_) => "ddl",
        Statement::Block(_)
        | Statement::If(_)
        | Statement::Case(_)
        | Statement::Loop(_)
        | Statement::Leave(_)
        | Statement::Iterate(_)
        | Statement::Declare(_)
        | Statement::Open(_)
        | Statement::Close(_)
        | Statement::Fetch { .. }
        | Statement::Signal(_)
        | Statement::Call(_) => "procedural",
        Statement::Set(_) => "set",
        Statement::Use(_)
        | Statement::StartTransaction { .. }
        | Statement::Commit
        | Statement::Rollback
        | Statement::Savepoint(_)
        | Statement::RollbackToSavepoint(_)
        | Statement::ReleaseSavepoint(_)
        | Statement::Prepare { .. }
        | Statement::Execute { .. }
        | Statement::Deallocate(_)
        | Statement::Kill { .. }
        | Statement::LockTables(_)
        | Statement::UnlockTables => "session",
        Statement::Explain { .. } | Statement::DescribeTable(_) => "describe",
        Statement::Account(_) => "account",
        Statement::Replication(_) => "replication",
        Statement::Show(_) => "show",
        Statement::Other(_) => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BasicSessionContext;

    #[test]
    fn empty_nested_sql_is_nothing() {
        let ctx = BasicSessionContext::new("db");
        assert_eq!(LogicalPlan::Nothing, plan_sql(&ctx, "  /* nothing */ ").unwrap());
    }

    #[test]
    fn routine_database_requires_selection() {
        let ctx = BasicSessionContext::default();
        let source = SourceMap::default();
        let planner = StatementPlanner::new(&ctx, &source);
        assert_eq!(
            PlanError::validation("no database selected"),
            planner.routine_database(None).unwrap_err()
        );
        assert_eq!("other", planner.routine_database(Some("other")).unwrap());
    }

    #[test]
    fn definer_defaults_to_client() {
        let ctx = BasicSessionContext::default().with_client("bob", "%");
        let source = SourceMap::default();
        let planner = StatementPlanner::new(&ctx, &source);
        assert_eq!("`bob`@`%`", planner.definer(None));
        assert_eq!("`a`@`b`", planner.definer(Some(&"`a`@`b`".to_string())));
    }
}
