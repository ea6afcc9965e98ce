//! Table specifications: columns, indexes, foreign keys and checks.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::{self, ObjectName};
use tracing::trace;

use super::{StatementPlanner, split_object_name};
use crate::collation::{CharacterSet, Collation, parse_collation};
use crate::context::SessionContext;
use crate::errors::{PlanError, Result};
use crate::expr::Expr;
use crate::parser::SourceMap;
use crate::parser::ast::{
    CheckDef, ColumnDef, ColumnKeyOption, ForeignKeyDef, IndexDef, IndexKind, IndexPart,
    TableConstraintDef, TableSpec,
};
use crate::plan::{
    CheckConstraint, Column, ColumnDefaultValue, ForeignKeyConstraint, IndexColumn,
    IndexConstraint, IndexDefinition, IndexUsing, TableSchema,
};
use crate::types::DataType;

static TABLE_CHARSET_OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(DEFAULT)?\s+(CHARACTER\s+SET|CHARSET)((\s*=?\s*)|\s+)([A-Za-z0-9_]+)")
        .unwrap()
});

static TABLE_COLLATION_OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(DEFAULT)?\s+COLLATE((\s*=?\s*)|\s+)([A-Za-z0-9_]+)").unwrap()
});

/// Spatial reference systems a column may be declared with.
const SUPPORTED_SRIDS: [u32; 2] = [0, 4326];

/// Niladic time functions allowed as an unparenthesized column default.
const DEFAULT_TIME_FUNCTIONS: &[&str] = &["now", "current_timestamp", "localtime", "localtimestamp"];

const FULLTEXT_WARNING: &str = "ignoring fulltext index as they have not yet been implemented";

/// A key part of an index definition.
#[derive(Debug)]
pub(super) enum IndexKey<'a> {
    Column(IndexColumn),
    Expr(&'a ast::Expr),
}

impl StatementPlanner<'_> {
    /// Columns of a table specification and the table collation, if the
    /// table options name one.
    pub(super) fn plan_schema(&self, spec: &TableSpec) -> Result<(TableSchema, Option<Collation>)> {
        let table_collation = table_option_collation(&spec.options)?;
        let pk_index = spec.constraints.iter().find_map(|c| match c {
            TableConstraintDef::Index(idx) if idx.kind == IndexKind::Primary => Some(idx),
            _ => None,
        });
        let pk_columns = match pk_index {
            Some(idx) => index_keys(&idx.parts)?
                .into_iter()
                .map(|key| match key {
                    IndexKey::Column(col) => Ok(col.name),
                    IndexKey::Expr(expr) => Err(PlanError::unsupported_syntax(format!(
                        "expression in primary key: {expr}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let columns = spec
            .columns
            .iter()
            .map(|def| {
                let in_pk = pk_columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&def.name.value));
                self.plan_column(def, in_pk, table_collation)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut schema = TableSchema::new(columns);
        if !pk_columns.is_empty() {
            schema.pk_ordinals = pk_columns
                .iter()
                .filter_map(|name| schema.column_index(name))
                .collect();
        }
        Ok((schema, table_collation))
    }

    /// A single column. `in_primary_key` marks membership in a table level
    /// primary key.
    pub(super) fn plan_column(
        &self,
        def: &ColumnDef,
        in_primary_key: bool,
        table_collation: Option<Collation>,
    ) -> Result<Column> {
        let mut column_type = def.column_type.clone();
        if column_type.charset.is_none() && column_type.collate.is_none() {
            if let Some(collation) = table_collation {
                column_type.collate = Some(collation.name().to_string());
            }
        }
        let mut data_type = DataType::from_column_type(&column_type)?;

        if let Some(srid) = &def.srid {
            let srid: u32 = srid
                .parse()
                .map_err(|_| PlanError::invalid_value(format!("invalid SRID value: {srid}")))?;
            if !SUPPORTED_SRIDS.contains(&srid) {
                return Err(PlanError::invalid_value(format!(
                    "There's no spatial reference with SRID {srid}"
                )));
            }
            if !data_type.is_spatial() {
                return Err(PlanError::invalid_value(format!(
                    "cannot define SRID for {data_type}"
                )));
            }
            data_type = data_type.with_srid(srid);
        }

        let primary_key = in_primary_key || def.key == Some(ColumnKeyOption::Primary);
        if primary_key && def.null == Some(true) {
            return Err(PlanError::validation(
                "All parts of PRIMARY KEY must be NOT NULL; if you need NULL in a key, use UNIQUE instead",
            ));
        }

        let mut column = Column::new(def.name.value.clone(), data_type);
        column.primary_key = primary_key;
        column.nullable = !primary_key && def.null != Some(false);
        column.auto_increment = def.auto_increment;
        column.comment = def.comment.clone().unwrap_or_default();
        if def.auto_increment {
            column.extra = "auto_increment".to_string();
        }
        column.default = def
            .default
            .as_ref()
            .map(|d| self.plan_default_value(d))
            .transpose()?;
        column.on_update = def
            .on_update
            .as_ref()
            .map(|d| self.plan_default_value(d))
            .transpose()?;
        if let Some((expr, stored)) = &def.generated {
            column.generated = Some(ColumnDefaultValue {
                expr: self.plan_expr(expr)?,
                is_literal: false,
                is_parenthesized: true,
            });
            column.is_virtual = !stored;
        }
        Ok(column)
    }

    /// Index definitions of a table specification, including the unique
    /// indexes implied by inline `UNIQUE` columns.
    pub(super) fn plan_index_defs(&self, spec: &TableSpec) -> Result<Vec<IndexDefinition>> {
        let mut indexes = Vec::new();
        for constraint in &spec.constraints {
            let TableConstraintDef::Index(idx) = constraint else {
                continue;
            };
            if idx.kind == IndexKind::Fulltext {
                self.ctx.warn(1214, FULLTEXT_WARNING.to_string());
                continue;
            }
            indexes.push(index_definition(idx)?);
        }

        for column in &spec.columns {
            match column.key {
                Some(ColumnKeyOption::Fulltext) => {
                    self.ctx.warn(1214, FULLTEXT_WARNING.to_string());
                }
                Some(ColumnKeyOption::Unique) | Some(ColumnKeyOption::UniqueKey) => {
                    indexes.push(IndexDefinition {
                        name: String::new(),
                        using: IndexUsing::BTree,
                        constraint: IndexConstraint::Unique,
                        columns: vec![IndexColumn {
                            name: column.name.value.clone(),
                            length: None,
                        }],
                        comment: String::new(),
                    });
                }
                _ => {}
            }
        }
        Ok(indexes)
    }

    /// Foreign keys and checks of a table specification.
    pub(super) fn plan_constraints(
        &self,
        table: &ObjectName,
        spec: &TableSpec,
    ) -> Result<(Vec<ForeignKeyConstraint>, Vec<CheckConstraint>)> {
        let mut foreign_keys = Vec::new();
        let mut checks = Vec::new();
        for constraint in &spec.constraints {
            match constraint {
                TableConstraintDef::ForeignKey(fk) => {
                    foreign_keys.push(self.plan_foreign_key(table, fk)?)
                }
                TableConstraintDef::Check(check) => checks.push(self.plan_check(check)?),
                TableConstraintDef::Index(_) => {}
            }
        }
        Ok((foreign_keys, checks))
    }

    pub(super) fn plan_foreign_key(
        &self,
        table: &ObjectName,
        def: &ForeignKeyDef,
    ) -> Result<ForeignKeyConstraint> {
        let (database, table) = split_object_name(table)?;
        let (parent_database, parent_table) = split_object_name(&def.parent)?;
        let current = || self.ctx.current_database();
        Ok(ForeignKeyConstraint {
            name: def.name.as_ref().map(|n| n.value.clone()).unwrap_or_default(),
            database: database.map(str::to_string).unwrap_or_else(current),
            table: table.to_string(),
            columns: def.columns.iter().map(|c| c.value.clone()).collect(),
            parent_database: parent_database.map(str::to_string).unwrap_or_else(current),
            parent_table: parent_table.to_string(),
            parent_columns: def.parent_columns.iter().map(|c| c.value.clone()).collect(),
            on_update: def.on_update,
            on_delete: def.on_delete,
        })
    }

    pub(super) fn plan_check(&self, def: &CheckDef) -> Result<CheckConstraint> {
        Ok(CheckConstraint {
            name: def.name.as_ref().map(|n| n.value.clone()).unwrap_or_default(),
            expr: self.plan_expr(&def.expr)?,
            enforced: def.enforced,
        })
    }

    /// Classify a column default.
    ///
    /// Parenthesized expressions are never literal. Bare literals, optionally
    /// signed, are literal. A few time functions may appear bare; any other
    /// bare function call is rejected.
    pub(crate) fn plan_default_value(&self, expr: &ast::Expr) -> Result<ColumnDefaultValue> {
        let planned = self.plan_expr(expr)?;
        let (is_literal, is_parenthesized) = match expr {
            ast::Expr::Nested(_) => (false, true),
            ast::Expr::Value(_) | ast::Expr::IntroducedString { .. } => (true, false),
            ast::Expr::UnaryOp {
                op: ast::UnaryOperator::Minus | ast::UnaryOperator::Plus,
                expr: inner,
            } if matches!(inner.as_ref(), ast::Expr::Value(_)) => (true, false),
            ast::Expr::Function(_) => match &planned {
                Expr::Function(f) if DEFAULT_TIME_FUNCTIONS.contains(&f.name.as_str()) => {
                    (false, false)
                }
                _ => {
                    return Err(PlanError::syntax(
                        "column default function expressions must be enclosed in parentheses",
                    ));
                }
            },
            _ => (false, false),
        };
        trace!(%planned, is_literal, is_parenthesized, "column default");
        Ok(ColumnDefaultValue {
            expr: planned,
            is_literal,
            is_parenthesized,
        })
    }
}

/// Classify an expression as a column default outside of any statement.
pub(crate) fn default_value(
    ctx: &dyn SessionContext,
    expr: &ast::Expr,
) -> Result<ColumnDefaultValue> {
    let source = SourceMap::default();
    StatementPlanner::new(ctx, &source).plan_default_value(expr)
}

/// The collation named by `CHARACTER SET` and `COLLATE` table options.
fn table_option_collation(options: &str) -> Result<Option<Collation>> {
    if options.is_empty() {
        return Ok(None);
    }
    // Both patterns expect whitespace before the option.
    let options = format!(" {options}");
    let charset = TABLE_CHARSET_OPTION
        .captures(&options)
        .and_then(|c| c.get(5))
        .map(|m| m.as_str().to_string());
    let collate = TABLE_COLLATION_OPTION
        .captures(&options)
        .and_then(|c| c.get(4))
        .map(|m| m.as_str().to_string());

    match (charset, collate) {
        (None, None) => Ok(None),
        (Some(charset), None) => Ok(Some(CharacterSet::from_name(&charset)?.default_collation())),
        (charset, collate) => Ok(Some(parse_collation(
            charset.as_deref(),
            collate.as_deref(),
            false,
        )?)),
    }
}

/// Split index parts into plain columns (with optional prefix lengths) and
/// expressions. `col(10)` is a column with a prefix length.
pub(super) fn index_keys(parts: &[IndexPart]) -> Result<Vec<IndexKey<'_>>> {
    parts
        .iter()
        .map(|part| {
            let expr = match part {
                IndexPart::Wildcard => {
                    return Err(PlanError::invalid_value("invalid index expression: *"));
                }
                IndexPart::Expr(expr) => expr,
            };
            match expr {
                ast::Expr::Identifier(ident) => Ok(IndexKey::Column(IndexColumn {
                    name: ident.value.clone(),
                    length: None,
                })),
                ast::Expr::Function(f) => match prefix_length_arg(f) {
                    Some(length) => {
                        let name = f.name.to_string();
                        let length: i64 = length.parse().map_err(|_| {
                            PlanError::invalid_value(format!("invalid key length: {length}"))
                        })?;
                        if length < 1 {
                            return Err(PlanError::invalid_value(format!(
                                "key part {name} length cannot be 0"
                            )));
                        }
                        Ok(IndexKey::Column(IndexColumn {
                            name,
                            length: Some(length as u64),
                        }))
                    }
                    None => Ok(IndexKey::Expr(expr)),
                },
                other => Ok(IndexKey::Expr(other)),
            }
        })
        .collect()
}

/// Plain index columns. Expression key parts are rejected.
pub(super) fn index_columns(parts: &[IndexPart]) -> Result<Vec<IndexColumn>> {
    index_keys(parts)?
        .into_iter()
        .map(|key| match key {
            IndexKey::Column(col) => Ok(col),
            IndexKey::Expr(expr) => Err(PlanError::syntax(format!(
                "unexpected syntax in index definition: {expr}"
            ))),
        })
        .collect()
}

/// `name(n)` with a single unsigned number argument.
fn prefix_length_arg(f: &ast::Function) -> Option<&str> {
    let ast::FunctionArguments::List(list) = &f.args else {
        return None;
    };
    match list.args.as_slice() {
        [
            ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Expr(ast::Expr::Value(
                ast::Value::Number(n, _),
            ))),
        ] if f.name.0.len() == 1 && list.duplicate_treatment.is_none() => Some(n.as_str()),
        _ => None,
    }
}

pub(super) fn index_using(using: Option<&str>) -> Option<IndexUsing> {
    match using.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("btree") => Some(IndexUsing::BTree),
        Some("hash") => Some(IndexUsing::Hash),
        Some(_) => None,
    }
}

/// Index definition of a CREATE TABLE. Fulltext indexes are filtered out by
/// the caller.
fn index_definition(idx: &IndexDef) -> Result<IndexDefinition> {
    let constraint = match idx.kind {
        IndexKind::Plain => IndexConstraint::None,
        IndexKind::Unique => IndexConstraint::Unique,
        IndexKind::Primary => IndexConstraint::Primary,
        IndexKind::Spatial => IndexConstraint::Spatial,
        IndexKind::Fulltext => IndexConstraint::Fulltext,
    };
    let using = index_using(idx.using.as_deref()).ok_or_else(|| {
        PlanError::unsupported_feature(format!(
            "index method {} in a table definition",
            idx.using.as_deref().unwrap_or_default()
        ))
    })?;
    Ok(IndexDefinition {
        name: idx.name.as_ref().map(|n| n.value.clone()).unwrap_or_default(),
        using,
        constraint,
        columns: index_columns(&idx.parts)?,
        comment: idx.comment.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::context::{BasicSessionContext, Warning};
    use crate::parser::ast::Statement;
    use crate::parser::parse_statement;
    use crate::plan::{CreateTable, LogicalPlan};

    fn expr(text: &str) -> ast::Expr {
        sqlparser::parser::Parser::new(&sqlparser::dialect::MySqlDialect {})
            .try_with_sql(text)
            .unwrap()
            .parse_expr()
            .unwrap()
    }

    fn parse_default(text: &str) -> Result<ColumnDefaultValue> {
        let ctx = BasicSessionContext::new("db");
        let parsed = parse_statement(&format!("SELECT {text}")).unwrap().unwrap();
        let Statement::Query(stmt) = parsed.statement else {
            panic!("expected query");
        };
        let ast::SetExpr::Select(select) = stmt.query.body.as_ref() else {
            panic!("expected select");
        };
        let ast::SelectItem::UnnamedExpr(expr) = &select.projection[0] else {
            panic!("expected expression");
        };
        default_value(&ctx, expr)
    }

    #[rstest]
    #[case("2", true, false)]
    #[case("-2", true, false)]
    #[case("'abc'", true, false)]
    #[case("NULL", true, false)]
    #[case("(2)", false, true)]
    #[case("NOW()", false, false)]
    #[case("CURRENT_TIMESTAMP", false, false)]
    #[case("(RAND() + 5)", false, true)]
    fn default_classification(
        #[case] text: &str,
        #[case] is_literal: bool,
        #[case] is_parenthesized: bool,
    ) {
        let value = parse_default(text).unwrap();
        assert_eq!(
            (is_literal, is_parenthesized),
            (value.is_literal, value.is_parenthesized)
        );
    }

    #[test]
    fn bare_function_default_is_rejected() {
        assert_eq!(
            PlanError::syntax("column default function expressions must be enclosed in parentheses"),
            parse_default("RAND()").unwrap_err()
        );
    }

    #[test]
    fn table_options_collation() {
        assert_eq!(None, table_option_collation("ENGINE=InnoDB").unwrap());
        assert_eq!(
            Some(CharacterSet::LATIN1.default_collation()),
            table_option_collation("ENGINE=InnoDB DEFAULT CHARSET=latin1").unwrap()
        );
        assert_eq!(
            Some(Collation::from_name("utf8mb4_general_ci").unwrap()),
            table_option_collation("CHARACTER SET utf8mb4 COLLATE = utf8mb4_general_ci").unwrap()
        );
    }

    #[test]
    fn prefix_lengths() {
        let parts = vec![
            IndexPart::Expr(ast::Expr::Identifier(ast::Ident::new("a"))),
            IndexPart::Expr(expr("b(10)")),
        ];
        let cols = index_columns(&parts).unwrap();
        assert_eq!(
            vec![
                IndexColumn {
                    name: "a".to_string(),
                    length: None
                },
                IndexColumn {
                    name: "b".to_string(),
                    length: Some(10)
                }
            ],
            cols
        );

        let zero = vec![IndexPart::Expr(expr("b(0)"))];
        assert!(matches!(
            index_columns(&zero),
            Err(PlanError::InvalidValue(_))
        ));
    }
    fn create_table(ctx: &BasicSessionContext, sql: &str) -> Result<CreateTable> {
        match crate::parse(ctx, sql)? {
            LogicalPlan::CreateTable(create) => Ok(create),
            other => panic!("expected create table, got {other}"),
        }
    }

    #[rstest]
    #[case("POINT SRID 0", Some(0))]
    #[case("GEOMETRY SRID 4326", Some(4326))]
    #[case("POINT", None)]
    fn supported_srids(#[case] column_type: &str, #[case] expected: Option<u32>) {
        let ctx = BasicSessionContext::new("db");
        let create = create_table(&ctx, &format!("CREATE TABLE t (g {column_type})")).unwrap();
        let DataType::Geometry { srid, .. } = &create.schema.columns[0].data_type else {
            panic!("expected geometry column");
        };
        assert_eq!(expected, *srid);
    }

    #[rstest]
    #[case("POINT SRID 1", "There's no spatial reference with SRID 1")]
    #[case("GEOMETRY SRID 3857", "There's no spatial reference with SRID 3857")]
    fn unsupported_srids(#[case] column_type: &str, #[case] message: &str) {
        let ctx = BasicSessionContext::new("db");
        let err = create_table(&ctx, &format!("CREATE TABLE t (g {column_type})")).unwrap_err();
        assert_eq!(PlanError::invalid_value(message), err);
    }

    #[test]
    fn srid_requires_spatial_type() {
        let ctx = BasicSessionContext::new("db");
        let err = create_table(&ctx, "CREATE TABLE t (g INT SRID 0)").unwrap_err();
        assert!(matches!(err, PlanError::InvalidValue(_)), "{err}");
    }

    #[rstest]
    #[case("CREATE TABLE t (a TEXT, b INT, FULLTEXT KEY ft (a), UNIQUE KEY u (b))")]
    #[case("CREATE TABLE t (a TEXT FULLTEXT, b INT UNIQUE)")]
    fn fulltext_index_dropped_with_warning(#[case] sql: &str) {
        let ctx = BasicSessionContext::new("db");
        let create = create_table(&ctx, sql).unwrap();

        assert_eq!(1, create.indexes.len());
        assert_eq!(IndexConstraint::Unique, create.indexes[0].constraint);
        assert_eq!(
            vec![Warning {
                code: 1214,
                message: FULLTEXT_WARNING.to_string()
            }],
            ctx.take_warnings()
        );
    }
}
