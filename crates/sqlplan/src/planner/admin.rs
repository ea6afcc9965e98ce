//! SET, prepared statements, KILL, table locks, EXPLAIN and the account and
//! replication statements.

use sqlparser::ast::{self, Ident, ObjectName};
use tracing::debug;

use super::expr::integer_value;
use super::{StatementPlanner, unresolved_table};
use crate::errors::{PlanError, Result};
use crate::expr::{Expr, Literal, VariableScope};
use crate::parser::ast::{
    AccountStmt, GrantAsDef, PrepareSource, PrivilegeLevelDef, ReplicationStmt, RoleSpec,
    SetItem, SetScope, Statement, TableLockDef,
};
use crate::plan::{
    ChangeReplicationFilter, ChangeReplicationSource, CreateRole, CreateUser, DescribeFormat,
    DescribeQuery, DropRole, DropUser, Execute, FlushPrivileges, Grant, GrantProxy, GrantRole,
    GrantUserAssumption, Kill, KillKind, LockTables, LogicalPlan, Prepare, PrivilegeLevel,
    RenameUser, ResetReplica, Revoke, RevokeAll, RevokeProxy, RevokeRole, Set, ShowColumns,
    ShowGrants, TableAlias, TableLock, UserAssumptionKind, UserName,
};
use crate::types::ScalarValue;

const DESCRIBE_FORMATS: &[&str] = &["tree"];

impl StatementPlanner<'_> {
    pub(crate) fn plan_set(&self, items: &[SetItem]) -> Result<LogicalPlan> {
        let mut exprs = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SetItem::Variable { scope, name, value } => {
                    let target = set_target(*scope, name);
                    exprs.push(Expr::set_field(target, self.plan_expr(value)?));
                }
                SetItem::Names { charset, collate } => {
                    let value = self.text(charset);
                    for var in [
                        "character_set_client",
                        "character_set_connection",
                        "character_set_results",
                    ] {
                        exprs.push(Expr::set_field(session_var(var), value.clone()));
                    }
                    if let Some(collate) = collate {
                        exprs.push(Expr::set_field(
                            session_var("collation_connection"),
                            self.text(collate),
                        ));
                    }
                }
                SetItem::Charset(charset) => {
                    let value = match charset {
                        Some(cs) => self.text(cs),
                        None => Expr::DefaultColumn(String::new()),
                    };
                    let database_charset =
                        match self.ctx.session_variable("character_set_database")? {
                            ScalarValue::Null => Expr::Literal(Literal::null()),
                            v => self.text(&v.to_text()),
                        };
                    exprs.push(Expr::set_field(
                        session_var("character_set_client"),
                        value.clone(),
                    ));
                    exprs.push(Expr::set_field(session_var("character_set_results"), value));
                    exprs.push(Expr::set_field(
                        session_var("character_set_connection"),
                        database_charset,
                    ));
                }
                SetItem::Transaction {
                    scope,
                    isolation,
                    read_only,
                } => {
                    let scope = match scope {
                        SetScope::Global => VariableScope::Global,
                        _ => VariableScope::Session,
                    };
                    if let Some(level) = isolation {
                        exprs.push(Expr::set_field(
                            system_var("transaction_isolation", scope),
                            self.text(level),
                        ));
                    }
                    if let Some(read_only) = read_only {
                        exprs.push(Expr::set_field(
                            system_var("transaction_read_only", scope),
                            Expr::Literal(Literal::boolean(*read_only)),
                        ));
                    }
                }
            }
        }
        Ok(LogicalPlan::Set(Set { exprs }))
    }

    pub(crate) fn plan_prepare(&self, name: &Ident, source: &PrepareSource) -> Result<LogicalPlan> {
        let text = match source {
            PrepareSource::Text(text) => text.clone(),
            PrepareSource::UserVariable(var) => {
                match self.ctx.user_variable(&var.to_ascii_lowercase())? {
                    Some(value) => value.to_text(),
                    None => "NULL".to_string(),
                }
            }
        };
        debug!(name = %name.value, "preparing statement");
        let child = self.plan_sql(&text)?;
        Ok(LogicalPlan::Prepare(Prepare {
            name: name.value.clone(),
            child: Box::new(child),
        }))
    }

    pub(crate) fn plan_execute(&self, name: &Ident, using: &[String]) -> LogicalPlan {
        let args = using
            .iter()
            .map(|arg| match arg.strip_prefix('@') {
                Some(var) => Expr::UserVar(var.to_ascii_lowercase()),
                None => Expr::ProcedureParam(arg.clone()),
            })
            .collect();
        LogicalPlan::Execute(Execute {
            name: name.value.clone(),
            args,
        })
    }

    pub(crate) fn plan_kill(&self, kind: KillKind, id: &ast::Expr) -> Result<LogicalPlan> {
        let id = integer_value(&self.plan_expr(id)?).ok_or_else(|| {
            PlanError::unsupported_feature("Error parsing KILL, expected int literal")
        })?;
        let connection_id = u32::try_from(id)
            .map_err(|_| PlanError::unsupported_feature("int literal is not unsigned 32-bit."))?;
        Ok(LogicalPlan::Kill(Kill {
            kind,
            connection_id,
        }))
    }

    pub(crate) fn plan_lock_tables(&self, defs: &[TableLockDef]) -> Result<LogicalPlan> {
        let locks = defs
            .iter()
            .map(|def| {
                let mut table = LogicalPlan::UnresolvedTable(unresolved_table(&def.table)?);
                if let Some(alias) = &def.alias {
                    table = LogicalPlan::TableAlias(TableAlias {
                        alias: alias.value.clone(),
                        input: Box::new(table),
                    });
                }
                Ok(TableLock {
                    table,
                    write: def.write,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LogicalPlan::LockTables(LockTables { locks }))
    }

    pub(crate) fn plan_explain(
        &self,
        format: Option<&str>,
        statement: &Statement,
    ) -> Result<LogicalPlan> {
        let input = self.plan_statement(statement)?;
        let format = match format.map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("tree") => DescribeFormat::Tree,
            Some("debug") => DescribeFormat::Debug,
            Some(_) => {
                return Err(PlanError::invalid_value(format!(
                    "invalid format {:?} for DESCRIBE, supported formats: {}",
                    format.unwrap_or_default(),
                    DESCRIBE_FORMATS.join(", ")
                )));
            }
        };
        Ok(LogicalPlan::DescribeQuery(DescribeQuery {
            format,
            input: Box::new(input),
        }))
    }

    /// `DESCRIBE t` lists the columns of `t`.
    pub(crate) fn plan_describe_table(&self, name: &ObjectName) -> Result<LogicalPlan> {
        Ok(LogicalPlan::ShowColumns(ShowColumns {
            table: unresolved_table(name)?,
            full: false,
        }))
    }

    pub(crate) fn plan_account(&self, stmt: &AccountStmt) -> Result<LogicalPlan> {
        Ok(match stmt {
            AccountStmt::CreateUser(create) => {
                let create = create.as_ref().clone();
                LogicalPlan::CreateUser(CreateUser {
                    if_not_exists: create.if_not_exists,
                    users: create.users,
                    default_roles: create.default_roles,
                    tls: create.tls,
                    limits: create.limits,
                    password_options: create.password_options,
                    locked: create.locked,
                    attribute: create.attribute.unwrap_or_default(),
                })
            }
            AccountStmt::RenameUser(pairs) => {
                let (from, to) = pairs.iter().cloned().unzip();
                LogicalPlan::RenameUser(RenameUser { from, to })
            }
            AccountStmt::DropUser { if_exists, users } => LogicalPlan::DropUser(DropUser {
                if_exists: *if_exists,
                users: users.clone(),
            }),
            AccountStmt::CreateRole {
                if_not_exists,
                roles,
            } => LogicalPlan::CreateRole(CreateRole {
                if_not_exists: *if_not_exists,
                roles: roles.clone(),
            }),
            AccountStmt::DropRole { if_exists, roles } => LogicalPlan::DropRole(DropRole {
                if_exists: *if_exists,
                roles: roles.clone(),
            }),
            AccountStmt::Grant {
                privileges,
                object_type,
                level,
                to,
                with_grant_option,
                as_user,
            } => LogicalPlan::Grant(Grant {
                privileges: privileges.clone(),
                object_type: *object_type,
                level: privilege_level(level),
                to: to.clone(),
                with_grant_option: *with_grant_option,
                as_user: as_user.as_ref().map(user_assumption),
                grantor: self.ctx.client_user(),
            }),
            AccountStmt::GrantRole {
                roles,
                to,
                with_admin_option,
            } => LogicalPlan::GrantRole(GrantRole {
                roles: roles.clone(),
                to: to.clone(),
                with_admin_option: *with_admin_option,
            }),
            AccountStmt::GrantProxy {
                on,
                to,
                with_grant_option,
            } => LogicalPlan::GrantProxy(GrantProxy {
                on: on.clone(),
                to: to.clone(),
                with_grant_option: *with_grant_option,
            }),
            AccountStmt::Revoke {
                privileges,
                object_type,
                level,
                from,
            } => LogicalPlan::Revoke(Revoke {
                privileges: privileges.clone(),
                object_type: *object_type,
                level: privilege_level(level),
                from: from.clone(),
                revoker: self.ctx.client_user(),
            }),
            AccountStmt::RevokeAll { from } => {
                LogicalPlan::RevokeAll(RevokeAll { from: from.clone() })
            }
            AccountStmt::RevokeRole { roles, from } => LogicalPlan::RevokeRole(RevokeRole {
                roles: roles.clone(),
                from: from.clone(),
            }),
            AccountStmt::RevokeProxy { on, from } => LogicalPlan::RevokeProxy(RevokeProxy {
                on: on.clone(),
                from: from.clone(),
            }),
            AccountStmt::ShowGrants { user, using } => {
                let (current_user, user) = match user {
                    Some(user) => (false, user.clone()),
                    None => (
                        true,
                        UserName::new(self.ctx.client_user(), self.ctx.client_address()),
                    ),
                };
                LogicalPlan::ShowGrants(ShowGrants {
                    current_user,
                    user,
                    using: using.clone(),
                })
            }
            AccountStmt::ShowPrivileges => LogicalPlan::ShowPrivileges,
            AccountStmt::Flush {
                target,
                no_write_to_binlog,
            } => {
                if *no_write_to_binlog {
                    return Err(PlanError::unsupported_feature(
                        "FLUSH NO_WRITE_TO_BINLOG",
                    ));
                }
                if !target.eq_ignore_ascii_case("privileges") {
                    return Err(PlanError::unsupported_feature(format!("FLUSH {target}")));
                }
                LogicalPlan::FlushPrivileges(FlushPrivileges {
                    write_to_binlog: true,
                })
            }
        })
    }

    pub(crate) fn plan_replication(&self, stmt: &ReplicationStmt) -> LogicalPlan {
        match stmt {
            ReplicationStmt::ChangeSource(options) => {
                LogicalPlan::ChangeReplicationSource(ChangeReplicationSource {
                    options: options.clone(),
                })
            }
            ReplicationStmt::ChangeFilter(options) => {
                LogicalPlan::ChangeReplicationFilter(ChangeReplicationFilter {
                    options: options.clone(),
                })
            }
            ReplicationStmt::Start => LogicalPlan::StartReplica,
            ReplicationStmt::Stop => LogicalPlan::StopReplica,
            ReplicationStmt::Reset { all } => LogicalPlan::ResetReplica(ResetReplica { all: *all }),
        }
    }

    pub(super) fn text(&self, s: &str) -> Expr {
        Expr::Literal(Literal::text(s, self.ctx.collation()))
    }
}

fn system_var(name: &str, scope: VariableScope) -> Expr {
    Expr::SystemVar {
        name: name.to_ascii_lowercase(),
        scope,
    }
}

fn session_var(name: &str) -> Expr {
    system_var(name, VariableScope::Session)
}

fn set_target(scope: SetScope, name: &str) -> Expr {
    match scope {
        SetScope::None => match name.split_once('.') {
            Some((table, column)) => Expr::qualified_column(table, column),
            None => Expr::column(name),
        },
        SetScope::User => Expr::UserVar(name.to_ascii_lowercase()),
        SetScope::Session => system_var(name, VariableScope::Session),
        SetScope::Global => system_var(name, VariableScope::Global),
        SetScope::Persist => system_var(name, VariableScope::Persist),
        SetScope::PersistOnly => system_var(name, VariableScope::PersistOnly),
    }
}

fn privilege_level(level: &PrivilegeLevelDef) -> PrivilegeLevel {
    PrivilegeLevel {
        database: level.database.clone().unwrap_or_default(),
        table_routine: level.object.clone(),
    }
}

fn user_assumption(def: &GrantAsDef) -> GrantUserAssumption {
    let (kind, roles) = match &def.roles {
        None | Some(RoleSpec::Default) => (UserAssumptionKind::Default, Vec::new()),
        Some(RoleSpec::None) => (UserAssumptionKind::None, Vec::new()),
        Some(RoleSpec::All) => (UserAssumptionKind::All, Vec::new()),
        Some(RoleSpec::AllExcept(roles)) => (UserAssumptionKind::AllExcept, roles.clone()),
        Some(RoleSpec::Roles(roles)) => (UserAssumptionKind::Roles, roles.clone()),
    };
    GrantUserAssumption {
        kind,
        user: def.user.clone(),
        roles,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::context::BasicSessionContext;
    use crate::plan::{PrivilegeType, ReplicationOptionValue};
    use crate::planner::plan_sql;

    fn plan(sql: &str) -> Result<LogicalPlan> {
        plan_sql(&BasicSessionContext::new("mydb"), sql)
    }

    fn set_exprs(sql: &str) -> Vec<String> {
        let LogicalPlan::Set(set) = plan(sql).unwrap() else {
            panic!("expected set");
        };
        set.exprs.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn set_scopes() {
        assert_eq!(
            vec![
                "SET @a = 1",
                "SET @@global.max_connections = 10",
                "SET @@session.sql_mode = 'x'",
                "SET @@persist.x = 2",
                "SET autocommit = ON",
            ],
            set_exprs(
                "SET @a = 1, @@global.max_connections = 10, SESSION sql_mode = 'x', PERSIST x = 2, autocommit = ON"
            )
        );
    }

    #[test]
    fn set_names_expands() {
        assert_eq!(
            vec![
                "SET @@session.character_set_client = 'latin1'",
                "SET @@session.character_set_connection = 'latin1'",
                "SET @@session.character_set_results = 'latin1'",
            ],
            set_exprs("SET NAMES latin1")
        );
    }

    #[test]
    fn set_charset_reads_database_charset() {
        assert_eq!(
            vec![
                "SET @@session.character_set_client = 'latin1'",
                "SET @@session.character_set_results = 'latin1'",
                "SET @@session.character_set_connection = 'utf8mb4'",
            ],
            set_exprs("SET CHARACTER SET latin1")
        );
    }

    #[rstest]
    #[case("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE", "SET @@session.transaction_isolation = 'SERIALIZABLE'")]
    #[case("SET GLOBAL TRANSACTION ISOLATION LEVEL READ COMMITTED", "SET @@global.transaction_isolation = 'READ-COMMITTED'")]
    #[case("SET TRANSACTION READ ONLY", "SET @@session.transaction_read_only = true")]
    #[case("SET SESSION TRANSACTION READ WRITE", "SET @@session.transaction_read_only = false")]
    fn set_transaction(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(vec![expected.to_string()], set_exprs(sql));
    }

    #[test]
    fn prepare_from_text() {
        let expected = "\
Prepare (name = s)
└─ Project (expressions = [a])
   └─ UnresolvedTable (name = t)
";
        assert_eq!(
            expected,
            plan("PREPARE s FROM 'SELECT a FROM t'").unwrap().to_string()
        );
    }

    #[test]
    fn prepare_from_user_variable() {
        let mut ctx = BasicSessionContext::new("mydb");
        ctx.set_user_variable("q", ScalarValue::Utf8("SELECT 1".to_string()));
        let LogicalPlan::Prepare(prepare) = plan_sql(&ctx, "PREPARE s FROM @q").unwrap() else {
            panic!("expected prepare");
        };
        assert!(matches!(prepare.child.as_ref(), LogicalPlan::Project(_)));

        // An unset variable prepares the text NULL, which is not a statement.
        assert!(plan("PREPARE s FROM @missing").is_err());
    }

    #[test]
    fn execute_arguments() {
        let LogicalPlan::Execute(execute) = plan("EXECUTE s USING @A, p").unwrap() else {
            panic!("expected execute");
        };
        assert_eq!(
            vec![Expr::UserVar("a".to_string()), Expr::ProcedureParam("p".to_string())],
            execute.args
        );
    }

    #[rstest]
    #[case("KILL 12", KillKind::Connection, 12)]
    #[case("KILL QUERY 4294967295", KillKind::Query, u32::MAX)]
    fn kill(#[case] sql: &str, #[case] kind: KillKind, #[case] id: u32) {
        assert_eq!(
            LogicalPlan::Kill(Kill {
                kind,
                connection_id: id
            }),
            plan(sql).unwrap()
        );
    }

    #[rstest]
    #[case("KILL 4294967296", "int literal is not unsigned 32-bit.")]
    #[case("KILL 'x'", "Error parsing KILL, expected int literal")]
    fn kill_errors(#[case] sql: &str, #[case] message: &str) {
        assert_eq!(PlanError::unsupported_feature(message), plan(sql).unwrap_err());
    }

    #[test]
    fn lock_tables() {
        let expected = "\
LockTables (modes = [READ, WRITE])
├─ UnresolvedTable (name = t)
└─ TableAlias (alias = x)
   └─ UnresolvedTable (name = db.u)
";
        assert_eq!(
            expected,
            plan("LOCK TABLES t READ LOCAL, db.u AS x LOW_PRIORITY WRITE")
                .unwrap()
                .to_string()
        );
    }

    #[test]
    fn explain_formats() {
        let expected = "\
DescribeQuery (format = tree)
└─ Project (expressions = [*])
   └─ UnresolvedTable (name = foo)
";
        assert_eq!(
            expected,
            plan("DESCRIBE FORMAT=tree SELECT * FROM foo").unwrap().to_string()
        );
        assert_eq!(
            expected,
            plan("EXPLAIN FORMAT=tree SELECT * FROM foo").unwrap().to_string()
        );
        assert_eq!(
            PlanError::invalid_value(
                "invalid format \"pretty\" for DESCRIBE, supported formats: tree"
            ),
            plan("DESCRIBE FORMAT=pretty SELECT * FROM foo").unwrap_err()
        );
    }

    #[test]
    fn describe_table_lists_columns() {
        assert_eq!(
            "ShowColumns (table = db.t)\n",
            plan("DESCRIBE db.t").unwrap().to_string()
        );
    }

    #[test]
    fn grant_records_grantor() {
        let ctx = BasicSessionContext::new("mydb").with_client("admin", "localhost");
        let LogicalPlan::Grant(grant) =
            plan_sql(&ctx, "GRANT SELECT, INSERT ON db.* TO 'u'@'%' WITH GRANT OPTION").unwrap()
        else {
            panic!("expected grant");
        };
        assert_eq!("admin", grant.grantor);
        assert_eq!("db.*", grant.level.to_string());
        assert_eq!(
            vec![PrivilegeType::Select, PrivilegeType::Insert],
            grant.privileges.iter().map(|p| p.kind).collect::<Vec<_>>()
        );
        assert_eq!(vec![UserName::new("u", "%")], grant.to);
        assert!(grant.with_grant_option);
    }

    #[test]
    fn show_grants_defaults_to_client() {
        let ctx = BasicSessionContext::new("mydb").with_client("bob", "%");
        let LogicalPlan::ShowGrants(show) = plan_sql(&ctx, "SHOW GRANTS").unwrap() else {
            panic!("expected show grants");
        };
        assert!(show.current_user);
        assert_eq!(UserName::new("bob", "%"), show.user);
        assert!(show.user.any_host);

        let LogicalPlan::ShowGrants(show) = plan("SHOW GRANTS FOR 'u'@'h'").unwrap() else {
            panic!("expected show grants");
        };
        assert!(!show.current_user);
        assert_eq!(UserName::new("u", "h"), show.user);
    }

    #[rstest]
    #[case("FLUSH PRIVILEGES", None)]
    #[case("FLUSH LOCAL PRIVILEGES", Some("FLUSH NO_WRITE_TO_BINLOG"))]
    #[case("FLUSH TABLES", Some("FLUSH TABLES"))]
    fn flush(#[case] sql: &str, #[case] unsupported: Option<&str>) {
        match unsupported {
            None => assert_eq!(
                LogicalPlan::FlushPrivileges(FlushPrivileges {
                    write_to_binlog: true
                }),
                plan(sql).unwrap()
            ),
            Some(message) => {
                assert_eq!(PlanError::unsupported_feature(message), plan(sql).unwrap_err())
            }
        }
    }

    #[test]
    fn rename_user_pairs() {
        let LogicalPlan::RenameUser(rename) = plan("RENAME USER a TO b, c TO d").unwrap() else {
            panic!("expected rename user");
        };
        assert_eq!(
            vec!["a", "c"],
            rename.from.iter().map(|u| u.name.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["b", "d"],
            rename.to.iter().map(|u| u.name.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn replication_filter() {
        let LogicalPlan::ChangeReplicationFilter(filter) =
            plan("CHANGE REPLICATION FILTER REPLICATE_IGNORE_TABLE = (db.t1, db.t2)").unwrap()
        else {
            panic!("expected replication filter");
        };
        assert_eq!(1, filter.options.len());
        assert!(matches!(
            &filter.options[0].value,
            ReplicationOptionValue::Tables(tables) if tables.len() == 2
        ));
        assert_eq!(
            LogicalPlan::ResetReplica(ResetReplica { all: true }),
            plan("RESET REPLICA ALL").unwrap()
        );
    }
}
