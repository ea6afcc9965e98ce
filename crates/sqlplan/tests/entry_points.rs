use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlplan::types::DataType;
use sqlplan::{
    BasicSessionContext, EMPTY_QUERY_WARNING_CODE, LogicalPlan, PlanError, column_type_from_string,
    parse, parse_one,
};

#[test]
fn parse_one_splits_at_first_statement() {
    let ctx = BasicSessionContext::new("mydb");
    let (plan, consumed, remainder) =
        parse_one(&ctx, "SELECT 1 ;  INSERT INTO t VALUES (2); SELECT 3").unwrap();

    assert!(matches!(plan, LogicalPlan::Project(_)), "{plan}");
    assert_eq!("SELECT 1", consumed);
    assert_eq!("  INSERT INTO t VALUES (2); SELECT 3", remainder);

    let (plan, consumed, remainder) = parse_one(&ctx, &remainder).unwrap();
    assert!(matches!(plan, LogicalPlan::InsertInto(_)), "{plan}");
    assert_eq!("INSERT INTO t VALUES (2)", consumed);
    assert_eq!(" SELECT 3", remainder);

    let (_, consumed, remainder) = parse_one(&ctx, &remainder).unwrap();
    assert_eq!("SELECT 3", consumed);
    assert_eq!("", remainder);
}

#[test]
fn parse_one_keeps_semicolons_inside_bodies() {
    let ctx = BasicSessionContext::new("mydb");
    let sql = "CREATE PROCEDURE p() BEGIN SELECT 1; SELECT 2; END; SELECT 3";
    let (plan, consumed, remainder) = parse_one(&ctx, sql).unwrap();

    assert!(matches!(plan, LogicalPlan::CreateProcedure(_)), "{plan}");
    assert_eq!("CREATE PROCEDURE p() BEGIN SELECT 1; SELECT 2; END", consumed);
    assert_eq!(" SELECT 3", remainder);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("-- nothing here\n")]
#[case("/* still nothing */ ;")]
fn empty_input_is_nothing(#[case] sql: &str) {
    let ctx = BasicSessionContext::new("mydb");
    assert_eq!(LogicalPlan::Nothing, parse(&ctx, sql).unwrap());

    let warnings = ctx.take_warnings();
    assert_eq!(1, warnings.len());
    assert_eq!(EMPTY_QUERY_WARNING_CODE, warnings[0].code);
    assert_eq!(
        "query was empty after trimming comments, so it will be ignored",
        warnings[0].message
    );
}

#[test]
fn parse_rejects_multiple_statements() {
    let ctx = BasicSessionContext::new("mydb");
    let err = parse(&ctx, "SELECT 1; SELECT 2").unwrap_err();
    assert!(matches!(err, PlanError::Syntax(_)), "{err}");
}

#[test]
fn parse_accepts_trailing_semicolon() {
    let ctx = BasicSessionContext::new("mydb");
    assert!(matches!(
        parse(&ctx, "SELECT 1;").unwrap(),
        LogicalPlan::Project(_)
    ));
}

#[rstest]
#[case("tinyint(1)", DataType::BOOLEAN)]
#[case("int", DataType::Int32)]
#[case("bigint unsigned", DataType::Uint64)]
#[case("double", DataType::Float64)]
fn column_types(#[case] text: &str, #[case] expected: DataType) {
    let ctx = BasicSessionContext::new("mydb");
    assert_eq!(expected, column_type_from_string(&ctx, text).unwrap());
}

#[test]
fn syntax_errors_surface() {
    let ctx = BasicSessionContext::new("mydb");
    let err = parse(&ctx, "SELEKT 1").unwrap_err();
    assert!(matches!(err, PlanError::Syntax(_)), "{err}");
}
