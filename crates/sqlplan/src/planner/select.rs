//! Queries: SELECT, UNION, VALUES and WITH, and the table expressions they
//! read from.

use sqlparser::ast::{
    self, JoinConstraint, JoinOperator, JsonTableColumnErrorHandling, SetExpr, SetOperator,
    SetQuantifier, TableFactor,
};
use tracing::trace;

use super::StatementPlanner;
use crate::errors::{PlanError, Result};
use crate::expr::{Expr, Literal, SortField, WindowDefinition, WindowFrame};
use crate::parser::ast::QueryStmt;
use crate::parser::parse_column_type;
use crate::plan::{
    Distinct, Filter, GroupBy, Having, Join, JoinKind, JsonTable, JsonTableColumn,
    JsonTableColumnOptions, Limit, LogicalPlan, NamedWindows, Offset, Project, SelectInto, Sort,
    SubqueryAlias, TableAlias, Union, UnresolvedTable, UnresolvedTableFunction,
    ValueDerivedTable, Values, Window, With,
};
use crate::types::{DataType, ScalarValue};

impl StatementPlanner<'_> {
    pub(crate) fn plan_query_stmt(&self, stmt: &QueryStmt) -> Result<LogicalPlan> {
        let plan = self.plan_query_with_options(&stmt.query, stmt.calc_found_rows)?;
        if stmt.into.is_empty() {
            return Ok(plan);
        }
        let vars = stmt
            .into
            .iter()
            .map(|target| match target.strip_prefix('@') {
                Some(name) => Expr::UserVar(name.to_ascii_lowercase()),
                None => Expr::ProcedureParam(target.clone()),
            })
            .collect();
        Ok(LogicalPlan::SelectInto(SelectInto {
            vars,
            input: Box::new(plan),
        }))
    }

    pub(crate) fn plan_query(&self, query: &ast::Query) -> Result<LogicalPlan> {
        self.plan_query_with_options(query, false)
    }

    fn plan_query_with_options(
        &self,
        query: &ast::Query,
        calc_found_rows: bool,
    ) -> Result<LogicalPlan> {
        if query.fetch.is_some() || !query.limit_by.is_empty() || query.for_clause.is_some() {
            return Err(PlanError::unsupported_syntax(query.to_string()));
        }

        let sort_fields = match &query.order_by {
            Some(order_by) => self.plan_order_by(&order_by.exprs)?,
            None => Vec::new(),
        };
        let limit = query
            .limit
            .as_ref()
            .map(|l| self.plan_expr(l))
            .transpose()?;
        let offset = query
            .offset
            .as_ref()
            .map(|o| self.plan_expr(&o.value))
            .transpose()?;

        let plan = match query.body.as_ref() {
            SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
            } => {
                let union = self.plan_union(op, set_quantifier, left, right)?;
                let union = propagate_union_decorators(union, sort_fields, limit, offset)?;
                LogicalPlan::Union(union)
            }
            body => {
                let plan = self.plan_set_expr(body)?;
                decorate(plan, sort_fields, offset, limit, calc_found_rows)
            }
        };

        match &query.with {
            Some(with) => self.plan_with(with, plan),
            None => Ok(plan),
        }
    }

    pub(super) fn plan_with(&self, with: &ast::With, input: LogicalPlan) -> Result<LogicalPlan> {
        let ctes = with
            .cte_tables
            .iter()
            .map(|cte| {
                Ok(SubqueryAlias {
                    name: cte.alias.name.value.clone(),
                    columns: alias_columns(&cte.alias),
                    text: cte.query.to_string(),
                    input: Box::new(self.plan_query(&cte.query)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LogicalPlan::With(With {
            ctes,
            recursive: with.recursive,
            input: Box::new(input),
        }))
    }

    fn plan_set_expr(&self, body: &SetExpr) -> Result<LogicalPlan> {
        match body {
            SetExpr::Select(select) => self.plan_select(select),
            SetExpr::Query(query) => self.plan_query(query),
            SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
            } => Ok(LogicalPlan::Union(
                self.plan_union(op, set_quantifier, left, right)?,
            )),
            SetExpr::Values(values) => Ok(LogicalPlan::Values(self.plan_values(values)?)),
            SetExpr::Table(table) => {
                let Some(name) = &table.table_name else {
                    return Err(PlanError::unsupported_syntax(body.to_string()));
                };
                let table = UnresolvedTable::new(
                    table.schema_name.clone().unwrap_or_default(),
                    name.clone(),
                );
                Ok(LogicalPlan::Project(Project {
                    exprs: vec![Expr::Star { table: None }],
                    input: Box::new(LogicalPlan::UnresolvedTable(table)),
                }))
            }
            other => Err(PlanError::unsupported_syntax(other.to_string())),
        }
    }

    fn plan_union(
        &self,
        op: &SetOperator,
        quantifier: &SetQuantifier,
        left: &SetExpr,
        right: &SetExpr,
    ) -> Result<Union> {
        if *op != SetOperator::Union {
            return Err(PlanError::unsupported_syntax(format!("{op}")));
        }
        let distinct = match quantifier {
            SetQuantifier::All => false,
            SetQuantifier::Distinct | SetQuantifier::None => true,
            other => return Err(PlanError::unsupported_syntax(format!("UNION {other}"))),
        };
        let left = self.plan_set_expr(left)?;
        let right = self.plan_set_expr(right)?;

        // A nested union on the left hands its decorators to this one.
        let (left, sort_fields, limit, offset) = match left {
            LogicalPlan::Union(inner) => {
                let Union {
                    left: l,
                    right: r,
                    distinct: d,
                    sort_fields,
                    limit,
                    offset,
                } = inner;
                let bare = LogicalPlan::Union(Union {
                    left: l,
                    right: r,
                    distinct: d,
                    sort_fields: Vec::new(),
                    limit: None,
                    offset: None,
                });
                (bare, sort_fields, limit, offset)
            }
            other => (other, Vec::new(), None, None),
        };

        Ok(Union {
            left: Box::new(left),
            right: Box::new(right),
            distinct,
            sort_fields,
            limit,
            offset,
        })
    }

    pub(crate) fn plan_values(&self, values: &ast::Values) -> Result<Values> {
        let rows = values
            .rows
            .iter()
            .map(|row| self.plan_exprs(row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Values { rows })
    }

    fn plan_select(&self, select: &ast::Select) -> Result<LogicalPlan> {
        if select.top.is_some() || select.qualify.is_some() {
            return Err(PlanError::unsupported_syntax(select.to_string()));
        }
        if select.into.is_some() {
            return Err(PlanError::unsupported_syntax(
                "select into files is not supported yet",
            ));
        }

        let mut plan = self.plan_from(&select.from)?;
        if let Some(selection) = &select.selection {
            plan = LogicalPlan::Filter(Filter {
                predicate: self.plan_expr(selection)?,
                input: Box::new(plan),
            });
        }

        plan = self.plan_selection_node(select, plan)?;

        if matches!(plan, LogicalPlan::Window(_)) && !select.named_window.is_empty() {
            let definitions = select
                .named_window
                .iter()
                .map(|def| self.plan_named_window(def))
                .collect::<Result<Vec<_>>>()?;
            plan = LogicalPlan::NamedWindows(NamedWindows {
                definitions,
                input: Box::new(plan),
            });
        }

        if let Some(having) = &select.having {
            plan = LogicalPlan::Having(Having {
                predicate: self.plan_expr(having)?,
                input: Box::new(plan),
            });
        }

        match &select.distinct {
            None => {}
            Some(ast::Distinct::Distinct) => {
                plan = LogicalPlan::Distinct(Distinct {
                    input: Box::new(plan),
                })
            }
            Some(other) => return Err(PlanError::unsupported_syntax(other.to_string())),
        }

        Ok(plan)
    }

    /// Project, GroupBy or Window over the select list.
    fn plan_selection_node(&self, select: &ast::Select, input: LogicalPlan) -> Result<LogicalPlan> {
        let exprs = self.plan_select_items(select)?;
        let group_by = match &select.group_by {
            ast::GroupByExpr::Expressions(exprs, modifiers) if modifiers.is_empty() => exprs,
            other => return Err(PlanError::unsupported_syntax(other.to_string())),
        };

        if exprs.iter().any(Expr::is_window) {
            if !group_by.is_empty() {
                return Err(PlanError::unsupported_feature(
                    "group by with window functions",
                ));
            }
            trace!("select list holds window functions");
            return Ok(LogicalPlan::Window(Window {
                exprs,
                input: Box::new(input),
            }));
        }

        if !group_by.is_empty() || exprs.iter().any(Expr::is_aggregate) {
            let grouping = self
                .plan_exprs(group_by)?
                .into_iter()
                .map(|g| resolve_group_ordinal(g, &exprs))
                .collect();
            return Ok(LogicalPlan::GroupBy(GroupBy {
                select_exprs: exprs,
                grouping_exprs: grouping,
                input: Box::new(input),
            }));
        }

        Ok(LogicalPlan::Project(Project {
            exprs,
            input: Box::new(input),
        }))
    }

    fn plan_select_items(&self, select: &ast::Select) -> Result<Vec<Expr>> {
        select
            .projection
            .iter()
            .enumerate()
            .map(|(idx, item)| match item {
                ast::SelectItem::UnnamedExpr(e) => {
                    let expr = self.plan_expr(e)?;
                    let text = self
                        .source
                        .select_item(select, idx)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string());
                    Ok(alias_if_needed(expr, text))
                }
                ast::SelectItem::ExprWithAlias { expr, alias } => Ok(Expr::Alias {
                    alias: alias.value.clone(),
                    expr: Box::new(self.plan_expr(expr)?),
                }),
                ast::SelectItem::Wildcard(_) => Ok(Expr::Star { table: None }),
                ast::SelectItem::QualifiedWildcard(name, _) => Ok(Expr::Star {
                    table: name.0.last().map(|i| i.value.clone()),
                }),
            })
            .collect()
    }

    fn plan_named_window(&self, def: &ast::NamedWindowDefinition) -> Result<WindowDefinition> {
        let ast::NamedWindowDefinition(name, window) = def;
        let mut definition = match window {
            ast::NamedWindowExpr::WindowSpec(spec) => self.plan_window_spec(spec)?,
            ast::NamedWindowExpr::NamedWindow(reference) => WindowDefinition {
                reference: Some(reference.value.to_ascii_lowercase()),
                frame: Some(WindowFrame::all_rows()),
                ..Default::default()
            },
        };
        definition.name = Some(name.value.to_ascii_lowercase());
        Ok(definition)
    }

    /// The FROM clause as a left-deep tree of cross joins.
    pub(crate) fn plan_from(&self, from: &[ast::TableWithJoins]) -> Result<LogicalPlan> {
        let mut tables = from.iter();
        let Some(first) = tables.next() else {
            return Ok(LogicalPlan::Dual);
        };
        let mut plan = self.plan_table_with_joins(first)?;
        for table in tables {
            plan = LogicalPlan::Join(Join::cross(plan, self.plan_table_with_joins(table)?));
        }
        Ok(plan)
    }

    pub(crate) fn plan_table_with_joins(&self, table: &ast::TableWithJoins) -> Result<LogicalPlan> {
        let mut plan = self.plan_table_factor(&table.relation)?;
        for join in &table.joins {
            let right = self.plan_table_factor(&join.relation)?;
            let (kind, constraint) = match &join.join_operator {
                JoinOperator::Inner(c) => (JoinKind::Inner, Some(c)),
                JoinOperator::LeftOuter(c) => (JoinKind::Left, Some(c)),
                JoinOperator::RightOuter(c) => (JoinKind::Right, Some(c)),
                JoinOperator::FullOuter(c) => (JoinKind::Full, Some(c)),
                JoinOperator::CrossJoin => (JoinKind::Cross, None),
                _ => return Err(PlanError::unsupported_syntax(join.to_string())),
            };
            let (kind, condition) = match constraint {
                None | Some(JoinConstraint::None) => (JoinKind::Cross, None),
                Some(JoinConstraint::Natural) => (JoinKind::Natural, None),
                Some(JoinConstraint::On(on)) => (kind, Some(self.plan_expr(on)?)),
                Some(JoinConstraint::Using(_)) => {
                    return Err(PlanError::unsupported_feature("USING clause on join"));
                }
            };
            plan = LogicalPlan::Join(Join {
                kind,
                left: Box::new(plan),
                right: Box::new(right),
                condition,
            });
        }
        Ok(plan)
    }

    fn plan_table_factor(&self, factor: &TableFactor) -> Result<LogicalPlan> {
        match factor {
            TableFactor::Table {
                name,
                alias,
                args: Some(args),
                ..
            } => {
                let args = args
                    .args
                    .iter()
                    .map(|a| self.plan_function_arg_expr(a))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.table_function(name, args, alias.as_ref()))
            }
            TableFactor::Table { name, alias, .. } => {
                let table = LogicalPlan::UnresolvedTable(super::unresolved_table(name)?);
                Ok(match alias {
                    Some(alias) => LogicalPlan::TableAlias(TableAlias {
                        alias: alias.name.value.clone(),
                        input: Box::new(table),
                    }),
                    None => table,
                })
            }
            TableFactor::Function {
                name, args, alias, ..
            } => {
                let args = args
                    .iter()
                    .map(|a| self.plan_function_arg_expr(a))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.table_function(name, args, alias.as_ref()))
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                if let SetExpr::Values(values) = subquery.body.as_ref() {
                    let Some(alias) = alias else {
                        return Err(PlanError::unsupported_syntax(
                            "every derived table must have an alias",
                        ));
                    };
                    return Ok(LogicalPlan::ValueDerivedTable(ValueDerivedTable {
                        alias: alias.name.value.clone(),
                        columns: alias_columns(alias),
                        values: self.plan_values(values)?,
                    }));
                }
                let Some(alias) = alias else {
                    return Err(PlanError::unsupported_feature("subquery without alias"));
                };
                Ok(LogicalPlan::SubqueryAlias(SubqueryAlias {
                    name: alias.name.value.clone(),
                    columns: alias_columns(alias),
                    text: subquery.to_string(),
                    input: Box::new(self.plan_query(subquery)?),
                }))
            }
            TableFactor::NestedJoin {
                table_with_joins,
                alias: None,
            } => self.plan_table_with_joins(table_with_joins),
            TableFactor::JsonTable {
                json_expr,
                json_path,
                columns,
                alias,
            } => {
                let Some(alias) = alias else {
                    return Err(PlanError::unsupported_syntax(
                        "every derived table must have an alias",
                    ));
                };
                Ok(LogicalPlan::JsonTable(JsonTable {
                    data: self.plan_expr(json_expr)?,
                    path: value_text(json_path),
                    alias: alias.name.value.clone(),
                    columns: self.plan_json_table_columns(columns)?,
                }))
            }
            other => Err(PlanError::unsupported_syntax(other.to_string())),
        }
    }

    fn plan_function_arg_expr(&self, arg: &ast::FunctionArg) -> Result<Expr> {
        match arg {
            ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Expr(e)) => self.plan_expr(e),
            other => Err(PlanError::unsupported_syntax(other.to_string())),
        }
    }

    fn table_function(
        &self,
        name: &ast::ObjectName,
        args: Vec<Expr>,
        alias: Option<&ast::TableAlias>,
    ) -> LogicalPlan {
        let name = name
            .0
            .iter()
            .map(|i| i.value.as_str())
            .collect::<Vec<_>>()
            .join(".");
        let alias = alias
            .map(|a| a.name.value.clone())
            .unwrap_or_else(|| name.clone());
        LogicalPlan::TableAlias(TableAlias {
            alias,
            input: Box::new(LogicalPlan::UnresolvedTableFunction(
                UnresolvedTableFunction { name, args },
            )),
        })
    }

    fn plan_json_table_columns(
        &self,
        columns: &[ast::JsonTableColumn],
    ) -> Result<Vec<JsonTableColumn>> {
        columns
            .iter()
            .map(|column| match column {
                ast::JsonTableColumn::Nested(nested) => Ok(JsonTableColumn::Nested {
                    path: value_text(&nested.path),
                    columns: self.plan_json_table_columns(&nested.columns)?,
                }),
                ast::JsonTableColumn::ForOrdinality(name) => {
                    Ok(JsonTableColumn::Column(JsonTableColumnOptions {
                        name: name.value.clone(),
                        data_type: DataType::Int64,
                        path: String::new(),
                        for_ordinality: true,
                        exists: false,
                        default_on_empty: Some(Expr::Literal(Literal::null())),
                        default_on_error: Some(Expr::Literal(Literal::null())),
                        error_on_empty: false,
                        error_on_error: false,
                    }))
                }
                ast::JsonTableColumn::Named(named) => {
                    let column_type = parse_column_type(&named.r#type.to_string())?;
                    let (default_on_empty, error_on_empty) =
                        self.json_error_handling(named.on_empty.as_ref())?;
                    let (default_on_error, error_on_error) =
                        self.json_error_handling(named.on_error.as_ref())?;
                    Ok(JsonTableColumn::Column(JsonTableColumnOptions {
                        name: named.name.value.clone(),
                        data_type: DataType::from_column_type(&column_type)?,
                        path: value_text(&named.path),
                        for_ordinality: false,
                        exists: named.exists,
                        default_on_empty,
                        default_on_error,
                        error_on_empty,
                        error_on_error,
                    }))
                }
            })
            .collect()
    }

    /// The default used when a JSON_TABLE path is empty or fails, and whether
    /// an error is raised instead. Missing handling defaults to NULL.
    fn json_error_handling(
        &self,
        handling: Option<&JsonTableColumnErrorHandling>,
    ) -> Result<(Option<Expr>, bool)> {
        let null = || Some(Expr::Literal(Literal::null()));
        Ok(match handling {
            None | Some(JsonTableColumnErrorHandling::Null) => (null(), false),
            Some(JsonTableColumnErrorHandling::Default(value)) => {
                (Some(self.plan_expr(&ast::Expr::Value(value.clone()))?), false)
            }
            Some(JsonTableColumnErrorHandling::Error) => (null(), true),
        })
    }
}

/// Sort, Offset and Limit around a non-union query body. Limit always wraps
/// Offset.
pub(super) fn decorate(
    mut plan: LogicalPlan,
    sort_fields: Vec<SortField>,
    offset: Option<Expr>,
    limit: Option<Expr>,
    calc_found_rows: bool,
) -> LogicalPlan {
    if !sort_fields.is_empty() {
        plan = LogicalPlan::Sort(Sort {
            fields: sort_fields,
            input: Box::new(plan),
        });
    }
    if let Some(offset) = offset {
        if !is_int8_zero(&offset) {
            plan = LogicalPlan::Offset(Offset {
                offset,
                input: Box::new(plan),
            });
        }
    }
    if let Some(limit) = limit {
        plan = LogicalPlan::Limit(Limit {
            limit,
            calc_found_rows,
            input: Box::new(plan),
        });
    }
    plan
}

/// Attach a union's own ORDER BY, LIMIT and OFFSET, keeping any it already
/// took over from a nested union. Both present is a conflict.
fn propagate_union_decorators(
    mut union: Union,
    sort_fields: Vec<SortField>,
    limit: Option<Expr>,
    offset: Option<Expr>,
) -> Result<Union> {
    if !sort_fields.is_empty() {
        if !union.sort_fields.is_empty() {
            return Err(PlanError::validation("conflicting external ORDER BY"));
        }
        union.sort_fields = sort_fields;
    }
    if limit.is_some() {
        if union.limit.is_some() {
            return Err(PlanError::validation("conflicting external LIMIT"));
        }
        union.limit = limit;
    }
    if offset.is_some() {
        if union.offset.is_some() {
            return Err(PlanError::validation("conflicting external OFFSET"));
        }
        union.offset = offset;
    }
    Ok(union)
}

fn is_int8_zero(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Literal(Literal {
            value: ScalarValue::Int8(0),
            ..
        })
    )
}

/// Alias an unnamed select expression with its source text when the text
/// cannot be recovered from the expression itself.
fn alias_if_needed(expr: Expr, text: String) -> Expr {
    if matches!(expr, Expr::Alias { .. }) || text.is_empty() {
        return expr;
    }
    let complex = expr.any(&mut |e| {
        matches!(
            e,
            Expr::Subquery(_)
                | Expr::Function(_)
                | Expr::CountDistinct(_)
                | Expr::GroupConcat(_)
                | Expr::Case { .. }
                | Expr::InTuple { .. }
                | Expr::InSubquery { .. }
        )
    });
    if complex || expr.to_string() != text {
        Expr::Alias {
            alias: text,
            expr: Box::new(expr),
        }
    } else {
        expr
    }
}

/// `GROUP BY 2` groups by the second select expression.
fn resolve_group_ordinal(grouping: Expr, select_exprs: &[Expr]) -> Expr {
    let Expr::Literal(Literal { value, .. }) = &grouping else {
        return grouping;
    };
    let idx = match value {
        ScalarValue::Int8(_)
        | ScalarValue::UInt8(_)
        | ScalarValue::Int16(_)
        | ScalarValue::UInt16(_)
        | ScalarValue::Int32(_)
        | ScalarValue::UInt32(_)
        | ScalarValue::Int64(_)
        | ScalarValue::UInt64(_) => value.as_u64(),
        _ => None,
    };
    match idx.and_then(|i| usize::try_from(i).ok()) {
        Some(i) if i >= 1 && i <= select_exprs.len() => match &select_exprs[i - 1] {
            Expr::Alias { alias, .. } => Expr::column(alias.clone()),
            other => other.clone(),
        },
        _ => grouping,
    }
}

fn alias_columns(alias: &ast::TableAlias) -> Vec<String> {
    alias.columns.iter().map(|c| c.name.value.clone()).collect()
}

fn value_text(value: &ast::Value) -> String {
    match value {
        ast::Value::SingleQuotedString(s) | ast::Value::DoubleQuotedString(s) => s.clone(),
        other => other.to_string(),
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

    #[test]
    fn limit_wraps_offset() {
        let expected = "\
Limit (limit = 5)
└─ Offset (offset = 2)
   └─ Project (expressions = [*])
      └─ UnresolvedTable (name = foo)
";
        assert_eq!(expected, tree("SELECT * FROM foo LIMIT 5 OFFSET 2"));
        assert_eq!(expected, tree("SELECT * FROM foo LIMIT 2, 5"));
    }

    #[test]
    fn zero_offset_is_elided() {
        let expected = "\
Limit (limit = 5)
└─ Project (expressions = [*])
   └─ UnresolvedTable (name = foo)
";
        assert_eq!(expected, tree("SELECT * FROM foo LIMIT 5 OFFSET 0"));
    }

    #[test]
    fn decorator_order() {
        let expected = "\
Limit (limit = 1)
└─ Sort (fields = [a DESC])
   └─ Distinct
      └─ Having (predicate = count(*) > 1)
         └─ GroupBy (grouping = [a], select = [a, count(*) as count(*)])
            └─ Filter (predicate = b = 2)
               └─ UnresolvedTable (name = t)
";
        assert_eq!(
            expected,
            tree(
                "SELECT DISTINCT a, count(*) FROM t WHERE b = 2 GROUP BY a \
                 HAVING COUNT(*) > 1 ORDER BY a DESC LIMIT 1"
            )
        );
    }

    #[test]
    fn group_by_ordinal_uses_select_expr() {
        let LogicalPlan::GroupBy(group) =
            plan("SELECT a AS x, SUM(b) FROM t GROUP BY 1, 3").unwrap()
        else {
            panic!("expected group by");
        };
        assert_eq!(Expr::column("x"), group.grouping_exprs[0]);
        // Out of range ordinals are left as literals.
        assert!(group.grouping_exprs[1].is_literal());
    }

    #[test]
    fn window_with_group_by_is_rejected() {
        assert_eq!(
            PlanError::unsupported_feature("group by with window functions"),
            plan("SELECT ROW_NUMBER() OVER () FROM t GROUP BY a").unwrap_err()
        );
    }

    #[test]
    fn named_windows_wrap_window() {
        let LogicalPlan::NamedWindows(named) =
            plan("SELECT SUM(a) OVER w FROM t WINDOW w AS (PARTITION BY b)").unwrap()
        else {
            panic!("expected named windows");
        };
        assert_eq!(Some("w".to_string()), named.definitions[0].name);
        assert!(matches!(*named.input, LogicalPlan::Window(_)));

        // Ignored without window functions.
        assert!(matches!(
            plan("SELECT a FROM t WINDOW w AS (PARTITION BY b)").unwrap(),
            LogicalPlan::Project(_)
        ));
    }

    #[rstest]
    #[case("SELECT a FROM t", "a")]
    #[case("SELECT 1 + 1 FROM t", "(1 + 1) as 1 + 1")]
    #[case("SELECT lower(a) FROM t", "lower(a) as lower(a)")]
    #[case("SELECT a AS b FROM t", "a as b")]
    fn implicit_aliases(#[case] sql: &str, #[case] expected: &str) {
        let LogicalPlan::Project(project) = plan(sql).unwrap() else {
            panic!("expected project");
        };
        assert_eq!(expected, project.exprs[0].to_string());
    }

    #[test]
    fn comma_joins_are_left_deep() {
        let expected = "\
Project (expressions = [*])
└─ Join (kind = CROSS)
   ├─ Join (kind = CROSS)
   │  ├─ UnresolvedTable (name = a)
   │  └─ UnresolvedTable (name = b)
   └─ TableAlias (alias = z)
      └─ UnresolvedTable (name = db.c)
";
        assert_eq!(expected, tree("SELECT * FROM a, b, db.c AS z"));
    }

    #[rstest]
    #[case("SELECT * FROM a JOIN b ON a.x = b.x", JoinKind::Inner)]
    #[case("SELECT * FROM a LEFT JOIN b ON a.x = b.x", JoinKind::Left)]
    #[case("SELECT * FROM a RIGHT OUTER JOIN b ON a.x = b.x", JoinKind::Right)]
    #[case("SELECT * FROM a NATURAL JOIN b", JoinKind::Natural)]
    #[case("SELECT * FROM a CROSS JOIN b", JoinKind::Cross)]
    #[case("SELECT * FROM a JOIN b", JoinKind::Cross)]
    fn join_kinds(#[case] sql: &str, #[case] kind: JoinKind) {
        let LogicalPlan::Project(project) = plan(sql).unwrap() else {
            panic!("expected project");
        };
        let LogicalPlan::Join(join) = *project.input else {
            panic!("expected join");
        };
        assert_eq!(kind, join.kind);
    }

    #[test]
    fn join_using_is_unsupported() {
        assert_eq!(
            PlanError::unsupported_feature("USING clause on join"),
            plan("SELECT * FROM a JOIN b USING (x)").unwrap_err()
        );
    }

    #[test]
    fn derived_tables() {
        let expected = "\
Project (expressions = [*])
└─ SubqueryAlias (columns = [x], name = s)
   └─ Project (expressions = [a])
      └─ UnresolvedTable (name = t)
";
        assert_eq!(expected, tree("SELECT * FROM (SELECT a FROM t) AS s (x)"));
        assert_eq!(
            PlanError::unsupported_feature("subquery without alias"),
            plan("SELECT * FROM (SELECT a FROM t)").unwrap_err()
        );
    }

    #[test]
    fn union_takes_nested_decorators() {
        let LogicalPlan::Union(union) =
            plan("(SELECT a FROM t UNION SELECT a FROM u LIMIT 1) UNION ALL SELECT a FROM v")
                .unwrap()
        else {
            panic!("expected union");
        };
        assert!(!union.distinct);
        assert!(union.limit.is_some());
        let LogicalPlan::Union(inner) = union.left.as_ref() else {
            panic!("expected nested union");
        };
        assert!(inner.distinct);
        assert!(inner.limit.is_none());
    }

    #[test]
    fn union_conflicting_limit() {
        assert_eq!(
            PlanError::validation("conflicting external LIMIT"),
            plan("(SELECT a FROM t UNION SELECT a FROM u LIMIT 1) UNION SELECT a FROM v LIMIT 2")
                .unwrap_err()
        );
    }

    #[test]
    fn with_is_outermost() {
        let expected = "\
With (ctes = [c])
├─ Project (expressions = [1])
│  └─ Dual
└─ Limit (limit = 1)
   └─ Project (expressions = [*])
      └─ UnresolvedTable (name = c)
";
        assert_eq!(
            expected,
            tree("WITH c AS (SELECT 1) SELECT * FROM c LIMIT 1")
        );
    }

    #[test]
    fn into_targets() {
        let LogicalPlan::SelectInto(into) = plan("SELECT a, b INTO @x, y FROM t").unwrap() else {
            panic!("expected into");
        };
        assert_eq!(
            vec![
                Expr::UserVar("x".to_string()),
                Expr::ProcedureParam("y".to_string())
            ],
            into.vars
        );
    }

    #[test]
    fn no_from_is_dual() {
        let LogicalPlan::Project(project) = plan("SELECT 1").unwrap() else {
            panic!("expected project");
        };
        assert_eq!(LogicalPlan::Dual, *project.input);
    }

    #[test]
    fn table_function() {
        let expected = "\
Project (expressions = [*])
└─ TableAlias (alias = f)
   └─ UnresolvedTableFunction (args = [1], name = f)
";
        assert_eq!(expected, tree("SELECT * FROM f(1)"));
    }
}
