//! Translation of MySQL statements into unresolved logical plans.
//!
//! The entry points take a [`SessionContext`] and SQL text and return a
//! [`LogicalPlan`] tree. Table, column and function references are left
//! unresolved for a later binding pass.
pub mod collation;
pub mod context;
pub mod errors;
pub mod explain;
pub mod expr;
pub mod parser;
pub mod plan;
pub mod planner;
pub mod types;

use sqlparser::ast;
use tracing::{debug, info_span};

pub use context::{BasicSessionContext, SessionContext, Warning};
pub use errors::{PlanError, Result};
pub use plan::LogicalPlan;

use errors::internal;
use parser::ast::Statement;
use parser::{parse_first_statement, parse_statement};
use plan::ColumnDefaultValue;
use planner::StatementPlanner;
use types::DataType;

/// Code of the warning raised for an empty statement.
pub const EMPTY_QUERY_WARNING_CODE: u16 = 0;

const EMPTY_QUERY_WARNING: &str =
    "query was empty after trimming comments, so it will be ignored";

/// Plan exactly one statement. A single trailing `;` is allowed.
///
/// Text holding no statement plans to [`LogicalPlan::Nothing`] and warns.
pub fn parse(ctx: &dyn SessionContext, query: &str) -> Result<LogicalPlan> {
    let span = info_span!("parse", query);
    let _guard = span.enter();

    match parse_statement(query)? {
        Some(parsed) => {
            StatementPlanner::new(ctx, &parsed.source).plan_statement(&parsed.statement)
        }
        None => Ok(empty_statement(ctx)),
    }
}

/// Plan the first statement of a multi statement input.
///
/// Returns the plan, the text of the statement that was planned and the
/// unparsed remainder after its `;`.
pub fn parse_one(
    ctx: &dyn SessionContext,
    query: &str,
) -> Result<(LogicalPlan, String, String)> {
    let span = info_span!("parse", query);
    let _guard = span.enter();

    let (parsed, consumed, remainder) = parse_first_statement(query)?;
    debug!(%consumed, remainder_len = remainder.len(), "split statement");
    let plan = match parsed {
        Some(parsed) => {
            StatementPlanner::new(ctx, &parsed.source).plan_statement(&parsed.statement)?
        }
        None => empty_statement(ctx),
    };
    Ok((plan, consumed, remainder))
}

/// Resolve a column type written on its own, e.g. `varchar(20)`.
pub fn column_type_from_string(ctx: &dyn SessionContext, type_text: &str) -> Result<DataType> {
    let plan = parse(ctx, &format!("CREATE TABLE a (b {type_text})"))?;
    let LogicalPlan::CreateTable(create) = plan else {
        return Err(internal!("expected a create table plan, got {plan}"));
    };
    create
        .schema
        .columns
        .into_iter()
        .next()
        .map(|column| column.data_type)
        .ok_or_else(|| internal!("create table plan has no columns"))
}

/// Plan a standalone column default, e.g. `(NOW() + INTERVAL 1 DAY)`.
pub fn default_value_from_string(
    ctx: &dyn SessionContext,
    expr_text: &str,
) -> Result<ColumnDefaultValue> {
    let sql = format!("SELECT {expr_text}");
    let parsed = parse_statement(&sql)?
        .ok_or_else(|| PlanError::syntax(format!("empty default value: {expr_text}")))?;

    let Statement::Query(stmt) = &parsed.statement else {
        return Err(PlanError::unsupported_syntax(sql));
    };
    let ast::SetExpr::Select(select) = stmt.query.body.as_ref() else {
        return Err(PlanError::unsupported_syntax(sql));
    };
    match select.projection.as_slice() {
        [ast::SelectItem::UnnamedExpr(expr)] => planner::default_value(ctx, expr),
        _ => Err(PlanError::unsupported_syntax(format!(
            "invalid default value: {expr_text}"
        ))),
    }
}

fn empty_statement(ctx: &dyn SessionContext) -> LogicalPlan {
    ctx.warn(EMPTY_QUERY_WARNING_CODE, EMPTY_QUERY_WARNING.to_string());
    LogicalPlan::Nothing
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_statement_warns() {
        let ctx = BasicSessionContext::new("db");
        assert_eq!(LogicalPlan::Nothing, parse(&ctx, "/* only a comment */;").unwrap());
        assert_eq!(
            vec![Warning {
                code: 0,
                message: EMPTY_QUERY_WARNING.to_string()
            }],
            ctx.take_warnings()
        );
    }

    #[test]
    fn column_type() {
        let ctx = BasicSessionContext::new("db");
        assert_eq!(
            DataType::BOOLEAN,
            column_type_from_string(&ctx, "tinyint(1)").unwrap()
        );
        assert!(column_type_from_string(&ctx, "nosuchtype").is_err());
    }
}
