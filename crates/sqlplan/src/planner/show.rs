//! SHOW statements.
//!
//! Most forms map to a dedicated node. COLLATION, ENGINES and the routine
//! status listings are compiled from equivalent queries over
//! `information_schema`.

use sqlparser::ast::{Ident, ObjectName};

use super::select::decorate;
use super::{StatementPlanner, split_object_name, unresolved_table};
use crate::errors::{PlanError, Result};
use crate::expr::{Expr, Literal};
use crate::parser::ast::{RoutineKind, ShowFilter, ShowStmt};
use crate::plan::{
    Filter, Having, LogicalPlan, ShowColumns, ShowCreateDatabase, ShowCreateRoutine,
    ShowCreateTable, ShowInDatabase, ShowIndexes, ShowStatus, ShowTables, ShowVariables,
    UnresolvedTable,
};
use crate::types::ScalarValue;

const PROCEDURE_STATUS_QUERY: &str = "select routine_schema as `Db`, routine_name as `Name`, \
    routine_type as `Type`, definer as `Definer`, last_altered as `Modified`, \
    created as `Created`, security_type as `Security_type`, routine_comment as `Comment`, \
    character_set_client as `character_set_client`, \
    collation_connection as `collation_connection`, \
    database_collation as `Database Collation` \
    from information_schema.routines where routine_type = 'PROCEDURE'";

const FUNCTION_STATUS_QUERY: &str = "select routine_schema as `Db`, routine_name as `Name`, \
    routine_type as `Type`, definer as `Definer`, last_altered as `Modified`, \
    created as `Created`, security_type as `Security_type`, routine_comment as `Comment`, \
    character_set_client, collation_connection, \
    database_collation as `Database Collation` \
    from information_schema.routines where routine_type = 'FUNCTION'";

const COLLATION_QUERY: &str = "select collation_name as `collation`, \
    character_set_name as charset, id, is_default as `default`, is_compiled as compiled, \
    sortlen, pad_attribute from information_schema.collations";

const ENGINES_QUERY: &str = "select * from information_schema.engines";

impl StatementPlanner<'_> {
    pub(crate) fn plan_show(&self, stmt: &ShowStmt) -> Result<LogicalPlan> {
        Ok(match stmt {
            ShowStmt::ProcessList => LogicalPlan::ShowProcessList,
            ShowStmt::CreateTable { name, is_view } => {
                LogicalPlan::ShowCreateTable(ShowCreateTable {
                    table: unresolved_table(name)?,
                    is_view: *is_view,
                })
            }
            ShowStmt::CreateDatabase {
                name,
                if_not_exists,
            } => LogicalPlan::ShowCreateDatabase(ShowCreateDatabase {
                database: name.value.clone(),
                if_not_exists: *if_not_exists,
            }),
            ShowStmt::CreateRoutine { kind, name } => {
                let (qualifier, name) = split_object_name(name)?;
                let routine = ShowCreateRoutine {
                    database: self.routine_database(qualifier)?,
                    name: name.to_string(),
                };
                match kind {
                    RoutineKind::Trigger => LogicalPlan::ShowCreateTrigger(routine),
                    RoutineKind::Procedure => LogicalPlan::ShowCreateProcedure(routine),
                    RoutineKind::Event => LogicalPlan::ShowCreateEvent(routine),
                }
            }
            ShowStmt::Triggers { database, filter } => self.filtered(
                LogicalPlan::ShowTriggers(ShowInDatabase {
                    database: ident_or_empty(database.as_ref()),
                }),
                filter.as_ref(),
                "Table",
            )?,
            ShowStmt::Events { database, filter } => self.filtered(
                LogicalPlan::ShowEvents(ShowInDatabase {
                    database: ident_or_empty(database.as_ref()),
                }),
                filter.as_ref(),
                "Name",
            )?,
            ShowStmt::RoutineStatus { function, filter } => {
                let query = if *function {
                    FUNCTION_STATUS_QUERY
                } else {
                    PROCEDURE_STATUS_QUERY
                };
                let plan = self.plan_sql(query)?;
                match self.show_filter(filter.as_ref(), "Name")? {
                    Some(predicate) => having(predicate, plan),
                    None => plan,
                }
            }
            ShowStmt::TableStatus { database, filter } => {
                let database = match database {
                    Some(db) => db.value.clone(),
                    None => self.ctx.current_database(),
                };
                self.filtered(
                    LogicalPlan::ShowTableStatus(ShowInDatabase { database }),
                    filter.as_ref(),
                    "Name",
                )?
            }
            ShowStmt::Indexes { table, database } => LogicalPlan::ShowIndexes(ShowIndexes {
                table: show_table(table, database.as_ref())?,
            }),
            ShowStmt::Variables { global, filter } => LogicalPlan::ShowVariables(ShowVariables {
                filter: self.variables_filter(filter.as_ref())?,
                global: *global,
            }),
            ShowStmt::Tables {
                full,
                database,
                filter,
            } => {
                let database = match database {
                    Some(db) => db.value.clone(),
                    None => self.ctx.current_database(),
                };
                let column = format!("Tables_in_{database}");
                self.filtered(
                    LogicalPlan::ShowTables(ShowTables {
                        database,
                        full: *full,
                    }),
                    filter.as_ref(),
                    &column,
                )?
            }
            ShowStmt::Databases { filter } => {
                self.filtered(LogicalPlan::ShowDatabases, filter.as_ref(), "Database")?
            }
            ShowStmt::Columns {
                full,
                table,
                database,
                filter,
            } => self.filtered(
                LogicalPlan::ShowColumns(ShowColumns {
                    table: show_table(table, database.as_ref())?,
                    full: *full,
                }),
                filter.as_ref(),
                "Field",
            )?,
            ShowStmt::Warnings { offset, limit } => {
                let offset = offset.as_ref().map(|e| self.plan_expr(e)).transpose()?;
                let limit = limit.as_ref().map(|e| self.plan_expr(e)).transpose()?;
                decorate(LogicalPlan::ShowWarnings, Vec::new(), offset, limit, false)
            }
            ShowStmt::Collation { filter } => {
                let plan = self.plan_sql(COLLATION_QUERY)?;
                match self.show_filter(filter.as_ref(), "collation")? {
                    Some(mut predicate) => {
                        predicate.rewrite(&mut |e| {
                            rename_utf8_collation(e);
                            Ok::<_, PlanError>(())
                        })?;
                        having(predicate, plan)
                    }
                    None => plan,
                }
            }
            ShowStmt::Charset { filter } => {
                self.filtered(LogicalPlan::ShowCharset, filter.as_ref(), "Charset")?
            }
            ShowStmt::Engines => self.plan_sql(ENGINES_QUERY)?,
            ShowStmt::Status { global, filter } => self.filtered(
                LogicalPlan::ShowStatus(ShowStatus { global: *global }),
                filter.as_ref(),
                "Variable_name",
            )?,
            ShowStmt::ReplicaStatus => LogicalPlan::ShowReplicaStatus,
            ShowStmt::Unsupported(form) => {
                return Err(PlanError::unsupported_feature(format!("SHOW {form}")));
            }
        })
    }

    /// The predicate for `LIKE 'pattern'` over `column`, or the WHERE clause.
    fn show_filter(&self, filter: Option<&ShowFilter>, column: &str) -> Result<Option<Expr>> {
        Ok(match filter {
            None => None,
            Some(ShowFilter::Like(pattern)) => {
                Some(Expr::like(Expr::column(column), self.text(pattern)))
            }
            Some(ShowFilter::Where(expr)) => Some(self.plan_expr(expr)?),
        })
    }

    fn filtered(
        &self,
        plan: LogicalPlan,
        filter: Option<&ShowFilter>,
        column: &str,
    ) -> Result<LogicalPlan> {
        Ok(match self.show_filter(filter, column)? {
            Some(predicate) => LogicalPlan::Filter(Filter {
                predicate,
                input: Box::new(plan),
            }),
            None => plan,
        })
    }

    /// SHOW VARIABLES filters only on `variable_name`.
    fn variables_filter(&self, filter: Option<&ShowFilter>) -> Result<Option<Expr>> {
        let Some(mut predicate) = self.show_filter(filter, "variable_name")? else {
            return Ok(None);
        };
        predicate.rewrite(&mut |e| match e {
            Expr::Column { table: None, name } if name.eq_ignore_ascii_case("variable_name") => {
                *name = "variable_name".to_string();
                Ok(())
            }
            Expr::Column { .. } => Err(PlanError::unsupported_feature(
                "WHERE clause supports only 'variable_name' column for SHOW VARIABLES",
            )),
            _ => Ok(()),
        })?;
        Ok(Some(predicate))
    }
}

fn ident_or_empty(ident: Option<&Ident>) -> String {
    ident.map(|i| i.value.clone()).unwrap_or_default()
}

/// `tbl [FROM db]`. The FROM clause wins over a qualifier on the name.
fn show_table(name: &ObjectName, database: Option<&Ident>) -> Result<UnresolvedTable> {
    let mut table = unresolved_table(name)?;
    if let Some(db) = database {
        table.database = db.value.clone();
    }
    Ok(table)
}

fn having(predicate: Expr, input: LogicalPlan) -> LogicalPlan {
    LogicalPlan::Having(Having {
        predicate,
        input: Box::new(input),
    })
}

/// `utf8_*` collation names are spelled `utf8mb3_*` in the collations table.
fn rename_utf8_collation(expr: &mut Expr) {
    if let Expr::Literal(Literal {
        value: ScalarValue::Utf8(s),
        ..
    }) = expr
    {
        if let Some(rest) = s.strip_prefix("utf8_") {
            *s = format!("utf8mb3_{rest}");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::context::BasicSessionContext;
    use crate::planner::plan_sql;

    fn plan(sql: &str) -> Result<LogicalPlan> {
        plan_sql(&BasicSessionContext::new("mydb"), sql)
    }

    fn tree(sql: &str) -> String {
        plan(sql).unwrap().to_string()
    }

    #[rstest]
    #[case("SHOW PROCESSLIST", "ShowProcessList\n")]
    #[case("SHOW CREATE TABLE db.t", "ShowCreateTable (table = db.t)\n")]
    #[case("SHOW CREATE VIEW v", "ShowCreateView (table = v)\n")]
    #[case("SHOW CREATE TRIGGER trg", "ShowCreateTrigger (name = mydb.trg)\n")]
    #[case("SHOW CREATE PROCEDURE other.p", "ShowCreateProcedure (name = other.p)\n")]
    #[case("SHOW TRIGGERS", "ShowTriggers\n")]
    #[case("SHOW EVENTS FROM db", "ShowEvents (database = db)\n")]
    #[case("SHOW TABLE STATUS", "ShowTableStatus (database = mydb)\n")]
    #[case("SHOW INDEX FROM t FROM db", "ShowIndexes (table = db.t)\n")]
    #[case("SHOW FULL TABLES", "ShowTables (database = mydb, full = true)\n")]
    #[case("SHOW DATABASES", "ShowDatabases\n")]
    #[case("SHOW COLUMNS FROM t", "ShowColumns (table = t)\n")]
    #[case("SHOW CHARACTER SET", "ShowCharset\n")]
    #[case("SHOW GLOBAL STATUS", "ShowStatus (scope = GLOBAL)\n")]
    #[case("SHOW REPLICA STATUS", "ShowReplicaStatus\n")]
    fn direct_nodes(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(expected, tree(sql));
    }

    #[test]
    fn show_create_routine_needs_database() {
        assert_eq!(
            PlanError::validation("no database selected"),
            plan_sql(&BasicSessionContext::default(), "SHOW CREATE EVENT e").unwrap_err()
        );
    }

    #[test]
    fn tables_like_filters_on_database_column() {
        let expected = "\
Filter (predicate = Tables_in_db LIKE 'a%')
└─ ShowTables (database = db)
";
        assert_eq!(expected, tree("SHOW TABLES FROM db LIKE 'a%'"));
    }

    #[rstest]
    #[case("SHOW DATABASES LIKE 'x'", "Database LIKE 'x'")]
    #[case("SHOW TRIGGERS LIKE 'x'", "Table LIKE 'x'")]
    #[case("SHOW EVENTS LIKE 'x'", "Name LIKE 'x'")]
    #[case("SHOW TABLE STATUS LIKE 'x'", "Name LIKE 'x'")]
    #[case("SHOW FULL COLUMNS FROM t LIKE 'x'", "Field LIKE 'x'")]
    #[case("SHOW CHARSET LIKE 'x'", "Charset LIKE 'x'")]
    #[case("SHOW STATUS LIKE 'x'", "Variable_name LIKE 'x'")]
    #[case("SHOW COLUMNS FROM t WHERE Type = 'int'", "Type = 'int'")]
    fn like_and_where_filters(#[case] sql: &str, #[case] predicate: &str) {
        let LogicalPlan::Filter(filter) = plan(sql).unwrap() else {
            panic!("expected filter");
        };
        assert_eq!(predicate, filter.predicate.to_string());
    }

    #[test]
    fn variables_filter() {
        let LogicalPlan::ShowVariables(show) =
            plan("SHOW GLOBAL VARIABLES LIKE 'auto%'").unwrap()
        else {
            panic!("expected show variables");
        };
        assert!(show.global);
        assert_eq!(
            Some("variable_name LIKE 'auto%'".to_string()),
            show.filter.map(|f| f.to_string())
        );

        let LogicalPlan::ShowVariables(show) =
            plan("SHOW VARIABLES WHERE Variable_Name = 'autocommit'").unwrap()
        else {
            panic!("expected show variables");
        };
        assert_eq!(
            Some("variable_name = 'autocommit'".to_string()),
            show.filter.map(|f| f.to_string())
        );

        assert_eq!(
            PlanError::unsupported_feature(
                "WHERE clause supports only 'variable_name' column for SHOW VARIABLES"
            ),
            plan("SHOW VARIABLES WHERE value = 'ON'").unwrap_err()
        );
    }

    #[test]
    fn warnings_limit() {
        let expected = "\
Limit (limit = 2)
└─ Offset (offset = 1)
   └─ ShowWarnings
";
        assert_eq!(expected, tree("SHOW WARNINGS LIMIT 1, 2"));
        assert_eq!("ShowWarnings\n", tree("SHOW WARNINGS"));
    }

    #[test]
    fn collation_is_rewritten() {
        let LogicalPlan::Having(having) = plan("SHOW COLLATION LIKE 'utf8_bin'").unwrap() else {
            panic!("expected having");
        };
        assert_eq!("collation LIKE 'utf8mb3_bin'", having.predicate.to_string());
        assert!(matches!(having.input.as_ref(), LogicalPlan::Project(_)));

        let LogicalPlan::Having(having) =
            plan("SHOW COLLATION WHERE charset = 'utf8_general'").unwrap()
        else {
            panic!("expected having");
        };
        assert_eq!("charset = 'utf8mb3_general'", having.predicate.to_string());
    }

    #[test]
    fn routine_status_is_rewritten() {
        let LogicalPlan::Having(having) = plan("SHOW PROCEDURE STATUS LIKE 'p%'").unwrap() else {
            panic!("expected having");
        };
        assert_eq!("Name LIKE 'p%'", having.predicate.to_string());
        assert!(matches!(
            plan("SHOW FUNCTION STATUS").unwrap(),
            LogicalPlan::Project(_)
        ));
    }

    #[test]
    fn engines_is_a_query() {
        let expected = "\
Project (expressions = [*])
└─ UnresolvedTable (name = information_schema.engines)
";
        assert_eq!(expected, tree("SHOW ENGINES"));
    }

    #[rstest]
    #[case("SHOW OPEN TABLES", "SHOW OPEN TABLES")]
    #[case("SHOW COUNT(*) WARNINGS", "SHOW COUNT(*) WARNINGS")]
    #[case("SHOW ERRORS", "SHOW ERRORS")]
    fn unsupported_forms(#[case] sql: &str, #[case] message: &str) {
        assert_eq!(PlanError::unsupported_feature(message), plan(sql).unwrap_err());
    }
}
