use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlplan::expr::{ArithmeticOperator, Expr, Literal};
use sqlplan::plan::{DescribeFormat, LogicalPlan};
use sqlplan::types::{DataType, ScalarValue};
use sqlplan::{BasicSessionContext, PlanError, default_value_from_string, parse};

fn plan(sql: &str) -> Result<LogicalPlan, PlanError> {
    parse(&BasicSessionContext::new("mydb"), sql)
}

/// The single expression of `SELECT <expr>`, without its implicit alias.
fn select_expr(sql: &str) -> Expr {
    let LogicalPlan::Project(project) = plan(sql).unwrap() else {
        panic!("expected project for {sql}");
    };
    match project.exprs.into_iter().next().unwrap() {
        Expr::Alias { expr, .. } => *expr,
        expr => expr,
    }
}

fn function_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Function(f) => Some(f.name.to_ascii_lowercase()),
        _ => None,
    }
}

#[rstest]
#[case("127", ScalarValue::Int8(127), DataType::Int8)]
#[case("255", ScalarValue::UInt8(255), DataType::Uint8)]
#[case("-129", ScalarValue::Int16(-129), DataType::Int16)]
#[case("65535", ScalarValue::UInt16(65535), DataType::Uint16)]
#[case("2147483647", ScalarValue::Int32(i32::MAX), DataType::Int32)]
#[case("4294967295", ScalarValue::UInt32(u32::MAX), DataType::Uint32)]
#[case("9223372036854775807", ScalarValue::Int64(i64::MAX), DataType::Int64)]
#[case("18446744073709551615", ScalarValue::UInt64(u64::MAX), DataType::Uint64)]
fn integer_literals_use_narrowest_type(
    #[case] text: &str,
    #[case] value: ScalarValue,
    #[case] data_type: DataType,
) {
    assert_eq!(
        Expr::Literal(Literal::new(value, data_type)),
        select_expr(&format!("SELECT {text}"))
    );
}

#[test]
fn oversized_integer_is_decimal() {
    let Expr::Literal(lit) = select_expr("SELECT 18446744073709551616") else {
        panic!("expected literal");
    };
    assert_eq!(
        ScalarValue::Decimal("18446744073709551616".to_string()),
        lit.value
    );
    assert!(matches!(lit.data_type, DataType::Decimal { .. }));
}

#[test]
fn limit_wraps_offset() {
    let LogicalPlan::Limit(limit) = plan("SELECT * FROM foo LIMIT 5 OFFSET 2").unwrap() else {
        panic!("expected limit");
    };
    assert_eq!(1, LogicalPlan::Limit(limit.clone()).children().len());
    assert!(matches!(limit.input.as_ref(), LogicalPlan::Offset(_)));
}

#[test]
fn index_expressions() {
    let err = plan("CREATE INDEX idx ON foo(*)").unwrap_err();
    assert!(err.to_string().contains("invalid index expression"), "{err}");

    let err = plan("CREATE INDEX idx ON foo(foo, fn(bar, baz))").unwrap_err();
    assert!(err.to_string().contains("unexpected syntax"), "{err}");

    let LogicalPlan::CreateIndex(create) = plan("CREATE INDEX idx ON foo(fn(bar, baz))").unwrap()
    else {
        panic!("expected create index");
    };
    assert_eq!(1, create.exprs.len());
    assert_eq!(Some("fn".to_string()), function_name(&create.exprs[0]));
    assert_eq!("foo", create.table.name);
}

#[rstest]
#[case("DESCRIBE FORMAT=tree SELECT * FROM foo")]
#[case("EXPLAIN FORMAT=tree SELECT * FROM foo")]
fn describe_wraps_query(#[case] sql: &str) {
    let LogicalPlan::DescribeQuery(describe) = plan(sql).unwrap() else {
        panic!("expected describe");
    };
    assert_eq!(DescribeFormat::Tree, describe.format);
    let LogicalPlan::Project(project) = describe.input.as_ref() else {
        panic!("expected project");
    };
    assert_eq!(vec![Expr::Star { table: None }], project.exprs);
    assert!(matches!(
        project.input.as_ref(),
        LogicalPlan::UnresolvedTable(t) if t.name == "foo" && t.database.is_empty()
    ));
}

#[test]
fn describe_rejects_unknown_format() {
    let err = plan("DESCRIBE FORMAT=pretty SELECT * FROM foo").unwrap_err();
    assert!(matches!(err, PlanError::InvalidValue(_)));
    assert!(err.to_string().contains("supported formats: tree"), "{err}");
}

#[test]
fn default_value_classification() {
    let ctx = BasicSessionContext::new("mydb");

    let value = default_value_from_string(&ctx, "2").unwrap();
    assert!(value.is_literal);
    assert!(!value.is_parenthesized);

    let value = default_value_from_string(&ctx, "(2)").unwrap();
    assert!(!value.is_literal);
    assert!(value.is_parenthesized);
    assert!(value.expr.children().is_empty());

    let value = default_value_from_string(&ctx, "(RAND() + 5)").unwrap();
    assert!(!value.is_literal);
    let Expr::Arithmetic { left, op, .. } = &value.expr else {
        panic!("expected arithmetic, got {}", value.expr);
    };
    assert_eq!(ArithmeticOperator::Plus, *op);
    assert_eq!(Some("rand".to_string()), function_name(left));

    let value = default_value_from_string(&ctx, "(GREATEST(RAND(), RAND()))").unwrap();
    assert!(!value.is_literal);
    assert_eq!(Some("greatest".to_string()), function_name(&value.expr));
    let children = value.expr.children();
    assert_eq!(2, children.len());
    assert!(children.iter().all(|c| function_name(c).as_deref() == Some("rand")));
}

#[rstest]
#[case("ALTER TABLE t RENAME COLUMN a TO b, DROP COLUMN c")]
#[case("ALTER TABLE t DROP COLUMN c, RENAME COLUMN a TO b")]
fn alter_rename_precedes_drop(#[case] sql: &str) {
    let LogicalPlan::Block(block) = plan(sql).unwrap() else {
        panic!("expected block");
    };
    let kinds: Vec<String> = block
        .statements
        .iter()
        .map(|s| s.to_string().lines().next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        vec![
            "RenameColumn (from = a, to = b)".to_string(),
            "DropColumn (column = c)".to_string()
        ],
        kinds
    );
}

#[rstest]
#[case("SIGNAL SQLSTATE '4500'", false)]
#[case("SIGNAL SQLSTATE '450000'", false)]
#[case("SIGNAL SQLSTATE '00001'", false)]
#[case("SIGNAL SQLSTATE '45000'", true)]
#[case("SIGNAL SQLSTATE VALUE '01000' SET MESSAGE_TEXT = 'careful'", true)]
fn signal_sqlstate_shape(#[case] sql: &str, #[case] ok: bool) {
    let result = plan(sql);
    assert_eq!(ok, result.is_ok(), "{sql}: {result:?}");
    if let Err(err) = result {
        assert!(matches!(err, PlanError::InvalidValue(_)), "{err}");
    }
}
