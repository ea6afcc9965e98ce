use sqlparser::ast::{self, AssignmentTarget, FromTable, OnInsert, SetExpr};

use super::select::decorate;
use super::{StatementPlanner, unresolved_table};
use crate::errors::{PlanError, Result};
use crate::expr::Expr;
use crate::parser::ast::{LoadDataStmt, UpdateStmt};
use crate::plan::{
    DeleteFrom, DuplicateHandling, Filter, InsertInto, LoadData, LogicalPlan, Update, Values,
};

use super::expr::integer_value;

impl StatementPlanner<'_> {
    pub(crate) fn plan_insert(
        &self,
        with: Option<&ast::With>,
        insert: &ast::Insert,
    ) -> Result<LogicalPlan> {
        if insert.returning.is_some()
            || insert.partitioned.is_some()
            || !insert.after_columns.is_empty()
            || insert.insert_alias.is_some()
            || insert.overwrite
        {
            return Err(PlanError::unsupported_syntax(insert.to_string()));
        }

        let source = match insert.source.as_deref() {
            // `INSERT INTO t DEFAULT VALUES` inserts a single row of defaults.
            None => LogicalPlan::Values(Values {
                rows: vec![Vec::new()],
            }),
            Some(query) => match (query.body.as_ref(), &query.with, &query.order_by) {
                (SetExpr::Values(values), None, None) if query.limit.is_none() => {
                    LogicalPlan::Values(self.plan_values(values)?)
                }
                _ => self.plan_query(query)?,
            },
        };

        let on_duplicate = match &insert.on {
            None => Vec::new(),
            Some(OnInsert::DuplicateKeyUpdate(assignments)) => {
                self.plan_assignments(assignments)?
            }
            Some(other) => return Err(PlanError::unsupported_syntax(other.to_string())),
        };

        let plan = LogicalPlan::InsertInto(InsertInto {
            destination: unresolved_table(&insert.table_name)?,
            columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
            source: Box::new(source),
            on_duplicate,
            replace: insert.replace_into,
            ignore: insert.ignore,
        });

        match with {
            Some(with) => self.plan_with(with, plan),
            None => Ok(plan),
        }
    }

    pub(crate) fn plan_update(&self, stmt: &UpdateStmt) -> Result<LogicalPlan> {
        let input = self.plan_from(&stmt.tables)?;
        let input = self.filter_sort_limit(
            input,
            stmt.selection.as_ref(),
            &stmt.order_by,
            stmt.limit.as_ref(),
        )?;

        let plan = LogicalPlan::Update(Update {
            ignore: stmt.ignore,
            set_exprs: self.plan_assignments(&stmt.assignments)?,
            input: Box::new(input),
        });

        match &stmt.with {
            Some(with) => self.plan_with(with, plan),
            None => Ok(plan),
        }
    }

    pub(crate) fn plan_delete(
        &self,
        with: Option<&ast::With>,
        delete: &ast::Delete,
    ) -> Result<LogicalPlan> {
        if delete.returning.is_some() {
            return Err(PlanError::unsupported_syntax("DELETE ... RETURNING"));
        }

        let from = match &delete.from {
            FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
        };

        // `DELETE FROM t1, t2 USING <joins>` names its targets in the FROM
        // list and reads rows from the USING list.
        let (targets, tables) = match &delete.using {
            Some(using) => {
                let targets = from
                    .iter()
                    .map(|t| match &t.relation {
                        ast::TableFactor::Table { name, .. } if t.joins.is_empty() => {
                            unresolved_table(name)
                        }
                        other => Err(PlanError::unsupported_syntax(format!(
                            "invalid delete target: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                (targets, using.as_slice())
            }
            None => {
                let targets = delete
                    .tables
                    .iter()
                    .map(unresolved_table)
                    .collect::<Result<Vec<_>>>()?;
                (targets, from.as_slice())
            }
        };

        let input = self.plan_from(tables)?;
        let input = self.filter_sort_limit(
            input,
            delete.selection.as_ref(),
            &delete.order_by,
            delete.limit.as_ref(),
        )?;

        let plan = LogicalPlan::DeleteFrom(DeleteFrom {
            targets,
            input: Box::new(input),
        });

        match with {
            Some(with) => self.plan_with(with, plan),
            None => Ok(plan),
        }
    }

    pub(crate) fn plan_load_data(&self, stmt: &LoadDataStmt) -> Result<LogicalPlan> {
        let ignore_lines = match &stmt.ignore_lines {
            None => 0,
            Some(expr) => integer_value(&self.plan_expr(expr)?)
                .and_then(|v| i64::try_from(v).ok())
                .ok_or_else(|| PlanError::unsupported_feature("Cannot parse ignore Value"))?,
        };

        let destination = unresolved_table(&stmt.table)?;
        let columns: Vec<String> = stmt.columns.iter().map(|c| c.value.clone()).collect();

        let source = LogicalPlan::LoadData(LoadData {
            local: stmt.local,
            file: stmt.file.clone(),
            destination: destination.clone(),
            columns: columns.clone(),
            fields: stmt.fields.clone(),
            lines: stmt.lines.clone(),
            ignore_lines,
            duplicates: stmt.duplicates,
        });

        Ok(LogicalPlan::InsertInto(InsertInto {
            destination,
            columns,
            source: Box::new(source),
            on_duplicate: Vec::new(),
            replace: stmt.duplicates == Some(DuplicateHandling::Replace),
            ignore: stmt.duplicates == Some(DuplicateHandling::Ignore),
        }))
    }

    /// Filter, Sort and Limit around the rows an UPDATE or DELETE touches.
    fn filter_sort_limit(
        &self,
        mut input: LogicalPlan,
        selection: Option<&ast::Expr>,
        order_by: &[ast::OrderByExpr],
        limit: Option<&ast::Expr>,
    ) -> Result<LogicalPlan> {
        if let Some(selection) = selection {
            input = LogicalPlan::Filter(Filter {
                predicate: self.plan_expr(selection)?,
                input: Box::new(input),
            });
        }
        let sort_fields = self.plan_order_by(order_by)?;
        let limit = limit.map(|l| self.plan_expr(l)).transpose()?;
        Ok(decorate(input, sort_fields, None, limit, false))
    }

    /// `col = expr` assignments as set-field expressions.
    fn plan_assignments(&self, assignments: &[ast::Assignment]) -> Result<Vec<Expr>> {
        assignments
            .iter()
            .map(|a| {
                let target = match &a.target {
                    AssignmentTarget::ColumnName(name) => match name.0.as_slice() {
                        [ident] => self.plan_expr(&ast::Expr::Identifier(ident.clone()))?,
                        idents => self.plan_expr(&ast::Expr::CompoundIdentifier(idents.to_vec()))?,
                    },
                    AssignmentTarget::Tuple(_) => {
                        return Err(PlanError::unsupported_syntax(a.to_string()));
                    }
                };
                Ok(Expr::set_field(target, self.plan_expr(&a.value)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::BasicSessionContext;
    use crate::planner::plan_sql;

    fn plan(sql: &str) -> Result<LogicalPlan> {
        plan_sql(&BasicSessionContext::new("mydb"), sql)
    }

    fn tree(sql: &str) -> String {
        plan(sql).unwrap().to_string()
    }

    #[test]
    fn insert_values() {
        let expected = "\
InsertInto (columns = [a, b], table = t)
└─ Values (rows = [(1, 'x'), (2, 'y')])
";
        assert_eq!(expected, tree("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y')"));
    }

    #[test]
    fn insert_select_with_on_duplicate() {
        let LogicalPlan::InsertInto(insert) = plan(
            "INSERT IGNORE INTO db2.t SELECT a FROM s ON DUPLICATE KEY UPDATE a = a + 1",
        )
        .unwrap() else {
            panic!("expected insert");
        };
        assert_eq!("db2.t", insert.destination.to_string());
        assert!(insert.ignore);
        assert!(!insert.replace);
        assert_eq!(
            vec!["SET a = (a + 1)".to_string()],
            insert
                .on_duplicate
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
        );
        assert!(matches!(insert.source.as_ref(), LogicalPlan::Project(_)));
    }

    #[test]
    fn replace_sets_flag() {
        let LogicalPlan::InsertInto(insert) = plan("REPLACE INTO t VALUES (1)").unwrap() else {
            panic!("expected insert");
        };
        assert!(insert.replace);
    }

    #[test]
    fn update_decorators() {
        let expected = "\
Update (set = [SET a = 1])
└─ Limit (limit = 10)
   └─ Sort (fields = [b ASC])
      └─ Filter (predicate = c > 0)
         └─ UnresolvedTable (name = t)
";
        assert_eq!(
            expected,
            tree("UPDATE t SET a = 1 WHERE c > 0 ORDER BY b LIMIT 10")
        );
    }

    #[test]
    fn delete_single_table() {
        let expected = "\
DeleteFrom
└─ Filter (predicate = a = 1)
   └─ UnresolvedTable (name = t)
";
        assert_eq!(expected, tree("DELETE FROM t WHERE a = 1"));
    }

    #[test]
    fn delete_multi_table_targets() {
        let LogicalPlan::DeleteFrom(delete) =
            plan("DELETE t1 FROM t1 JOIN t2 ON t1.id = t2.id").unwrap()
        else {
            panic!("expected delete");
        };
        assert_eq!(vec!["t1".to_string()], delete.targets.iter().map(|t| t.to_string()).collect::<Vec<_>>());
        assert!(matches!(delete.input.as_ref(), LogicalPlan::Join(_)));
    }

    #[test]
    fn load_data_wraps_in_insert() {
        let LogicalPlan::InsertInto(insert) = plan(
            "LOAD DATA INFILE '/tmp/x.csv' REPLACE INTO TABLE t IGNORE 2 LINES (a, b)",
        )
        .unwrap() else {
            panic!("expected insert");
        };
        assert!(insert.replace);
        assert_eq!(vec!["a", "b"], insert.columns);
        let LogicalPlan::LoadData(load) = insert.source.as_ref() else {
            panic!("expected load data");
        };
        assert_eq!(2, load.ignore_lines);
        assert_eq!("/tmp/x.csv", load.file);
    }
}
