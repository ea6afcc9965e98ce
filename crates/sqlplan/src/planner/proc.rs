//! Stored program bodies: blocks, flow control, declarations, SIGNAL and
//! CALL.

use sqlparser::ast;

use super::{StatementPlanner, split_object_name};
use crate::errors::{PlanError, Result};
use crate::parser::ast::{
    BlockStmt, CallStmt, CaseStmt, ConditionValue, ConditionalBlock, DeclareStmt,
    HandlerCondition, IfStmt, LoopKind, LoopStmt, SignalStmt, Statement,
};
use crate::plan::{
    BeginEndBlock, Block, Call, CaseStatement, DeclareCondition, DeclareCursor, DeclareHandler,
    DeclareVariables, IfConditional, IfElse, LogicalPlan, Loop, Repeat, Signal, SignalInfo,
    SignalItem, SignalValue, While,
};
use crate::types::DataType;

const MESSAGE_TEXT_MAX_LEN: usize = 128;
const CONDITION_ITEM_MAX_LEN: usize = 64;

impl StatementPlanner<'_> {
    pub(crate) fn plan_block(&self, statements: &[Statement]) -> Result<Block> {
        statements
            .iter()
            .map(|s| self.plan_statement(s))
            .collect::<Result<Vec<_>>>()
            .map(Block::new)
    }

    pub(crate) fn plan_begin_end_block(&self, stmt: &BlockStmt) -> Result<LogicalPlan> {
        Ok(LogicalPlan::BeginEndBlock(BeginEndBlock {
            label: label(&stmt.label),
            block: self.plan_block(&stmt.statements)?,
        }))
    }

    pub(crate) fn plan_if(&self, stmt: &IfStmt) -> Result<LogicalPlan> {
        let branches = self.plan_conditionals(&stmt.branches)?;
        let else_block = match &stmt.else_statements {
            Some(statements) => self.plan_block(statements)?,
            None => Block::default(),
        };
        Ok(LogicalPlan::IfElse(IfElse {
            branches,
            else_block: Box::new(LogicalPlan::Block(else_block)),
        }))
    }

    pub(crate) fn plan_case_statement(&self, stmt: &CaseStmt) -> Result<LogicalPlan> {
        let operand = stmt
            .operand
            .as_ref()
            .map(|e| self.plan_expr(e))
            .transpose()?;
        let branches = self.plan_conditionals(&stmt.branches)?;
        let else_block = stmt
            .else_statements
            .as_ref()
            .map(|s| self.plan_block(s).map(|b| Box::new(LogicalPlan::Block(b))))
            .transpose()?;
        Ok(LogicalPlan::CaseStatement(CaseStatement {
            operand,
            branches,
            else_block,
        }))
    }

    fn plan_conditionals(&self, branches: &[ConditionalBlock]) -> Result<Vec<IfConditional>> {
        branches
            .iter()
            .map(|b| {
                Ok(IfConditional {
                    condition: self.plan_expr(&b.condition)?,
                    body: Box::new(LogicalPlan::Block(self.plan_block(&b.statements)?)),
                })
            })
            .collect()
    }

    pub(crate) fn plan_loop(&self, stmt: &LoopStmt) -> Result<LogicalPlan> {
        let label = label(&stmt.label);
        let block = self.plan_block(&stmt.statements)?;
        Ok(match &stmt.kind {
            LoopKind::Loop => LogicalPlan::Loop(Loop { label, block }),
            LoopKind::Repeat(until) => LogicalPlan::Repeat(Repeat {
                label,
                condition: self.plan_expr(until)?,
                block,
            }),
            LoopKind::While(condition) => LogicalPlan::While(While {
                label,
                condition: self.plan_expr(condition)?,
                block,
            }),
        })
    }

    pub(crate) fn plan_declare(&self, stmt: &DeclareStmt) -> Result<LogicalPlan> {
        match stmt {
            DeclareStmt::Condition { name, value } => {
                let sqlstate = match value {
                    ConditionValue::SqlState(state) => validate_sqlstate(state)?,
                    ConditionValue::ErrorCode(code) => {
                        match code.parse::<u64>() {
                            Ok(n) if n > 0 => {}
                            _ => {
                                return Err(PlanError::invalid_value(format!(
                                    "invalid value '{code}' for MySQL error code"
                                )));
                            }
                        }
                        return Err(PlanError::unsupported_syntax(format!(
                            "DECLARE {name} CONDITION FOR {code}"
                        )));
                    }
                };
                Ok(LogicalPlan::DeclareCondition(DeclareCondition {
                    name: name.value.to_lowercase(),
                    sqlstate,
                }))
            }
            DeclareStmt::Variables {
                names,
                column_type,
                default,
            } => Ok(LogicalPlan::DeclareVariables(DeclareVariables {
                names: names.iter().map(|n| n.value.clone()).collect(),
                data_type: DataType::from_column_type(column_type)?,
                default: default
                    .as_ref()
                    .map(|d| self.plan_default_value(d))
                    .transpose()?,
            })),
            DeclareStmt::Cursor { name, query } => Ok(LogicalPlan::DeclareCursor(DeclareCursor {
                name: name.value.clone(),
                select: Box::new(self.plan_query(query)?),
            })),
            DeclareStmt::Handler {
                action,
                condition,
                statement,
            } => {
                if let HandlerCondition::Other(other) = condition {
                    return Err(PlanError::unsupported_syntax(format!(
                        "DECLARE {action} HANDLER FOR {other}"
                    )));
                }
                Ok(LogicalPlan::DeclareHandler(DeclareHandler {
                    action: *action,
                    statement: Box::new(self.plan_statement(statement)?),
                }))
            }
        }
    }

    pub(crate) fn plan_signal(&self, stmt: &SignalStmt) -> Result<LogicalPlan> {
        let mut info: Vec<SignalInfo> = Vec::with_capacity(stmt.info.len());
        for (name, value) in &stmt.info {
            let item = SignalItem::from_name(&name.value).ok_or_else(|| {
                PlanError::unsupported_syntax(format!(
                    "unknown signal condition information item: {name}"
                ))
            })?;
            if info.iter().any(|i| i.item == item) {
                return Err(PlanError::validation("duplicate signal condition item"));
            }
            let value = self.signal_value(item, value)?;
            info.push(SignalInfo { item, value });
        }

        let (sqlstate, condition) = match (&stmt.sqlstate, &stmt.condition) {
            (_, Some(condition)) => (None, Some(condition.value.to_lowercase())),
            (Some(state), None) => (Some(validate_sqlstate(state)?), None),
            (None, None) => {
                return Err(PlanError::syntax("SIGNAL requires a SQLSTATE or condition name"));
            }
        };
        Ok(LogicalPlan::Signal(Signal {
            sqlstate,
            condition,
            info,
        }))
    }

    fn signal_value(&self, item: SignalItem, value: &ast::Expr) -> Result<SignalValue> {
        let invalid = || {
            PlanError::invalid_value(format!(
                "invalid value '{value}' for signal condition information item {item}"
            ))
        };
        match item {
            SignalItem::MysqlErrno => {
                let text = match value {
                    ast::Expr::Value(ast::Value::Number(n, _)) => n.as_str(),
                    ast::Expr::Value(ast::Value::SingleQuotedString(s)) => s.as_str(),
                    _ => return Err(invalid()),
                };
                match text.parse::<u16>() {
                    Ok(n) if n > 0 => Ok(SignalValue::Int(n)),
                    _ => Err(invalid()),
                }
            }
            SignalItem::MessageText => match value {
                ast::Expr::Value(ast::Value::SingleQuotedString(s)) => {
                    if s.chars().count() > MESSAGE_TEXT_MAX_LEN {
                        return Err(PlanError::invalid_value(format!(
                            "signal condition information item MESSAGE_TEXT has max length of {MESSAGE_TEXT_MAX_LEN}"
                        )));
                    }
                    Ok(SignalValue::Text(s.clone()))
                }
                ast::Expr::Identifier(_) => Ok(SignalValue::Expr(self.plan_expr(value)?)),
                _ => Err(invalid()),
            },
            _ => match value {
                ast::Expr::Value(ast::Value::SingleQuotedString(s)) => {
                    if s.chars().count() > CONDITION_ITEM_MAX_LEN {
                        return Err(PlanError::invalid_value(format!(
                            "signal condition information item {item} has max length of {CONDITION_ITEM_MAX_LEN}"
                        )));
                    }
                    Ok(SignalValue::Text(s.clone()))
                }
                _ => Err(invalid()),
            },
        }
    }

    pub(crate) fn plan_call(&self, stmt: &CallStmt) -> Result<LogicalPlan> {
        let (database, name) = split_object_name(&stmt.name)?;
        Ok(LogicalPlan::Call(Call {
            database: database.unwrap_or_default().to_string(),
            name: name.to_string(),
            params: self.plan_exprs(&stmt.args)?,
        }))
    }
}

fn label(label: &Option<ast::Ident>) -> String {
    label.as_ref().map(|l| l.value.clone()).unwrap_or_default()
}

/// A SQLSTATE is five characters and is not in the success class `00`.
fn validate_sqlstate(state: &str) -> Result<String> {
    if state.chars().count() != 5 {
        return Err(PlanError::invalid_value(
            "SQLSTATE VALUE must be a string with length 5 consisting of only integers",
        ));
    }
    if state.starts_with("00") {
        return Err(PlanError::invalid_value(format!(
            "invalid SQLSTATE VALUE: '{state}'"
        )));
    }
    Ok(state.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::context::BasicSessionContext;
    use crate::plan::HandlerAction;
    use crate::planner::plan_sql;

    fn plan(sql: &str) -> Result<LogicalPlan> {
        plan_sql(&BasicSessionContext::new("mydb"), sql)
    }

    #[test]
    fn begin_end_block_with_label() {
        let expected = "\
BeginEndBlock (label = lbl)
├─ DeclareVariables (names = [x], type = int)
└─ Loop (label = l)
   └─ Leave (label = l)
";
        assert_eq!(
            expected,
            plan("lbl: BEGIN DECLARE x INT; l: LOOP LEAVE l; END LOOP l; END lbl")
                .unwrap()
                .to_string()
        );
    }

    #[test]
    fn if_without_else_has_empty_block() {
        let LogicalPlan::IfElse(if_else) =
            plan("IF a > 1 THEN SELECT 1; ELSEIF a > 0 THEN SELECT 2; END IF").unwrap()
        else {
            panic!("expected if");
        };
        assert_eq!(2, if_else.branches.len());
        assert_eq!(LogicalPlan::Block(Block::default()), *if_else.else_block);
    }

    #[test]
    fn simple_case_statement() {
        let LogicalPlan::CaseStatement(case) =
            plan("CASE x WHEN 1 THEN SELECT 1; ELSE SELECT 2; END CASE").unwrap()
        else {
            panic!("expected case");
        };
        assert!(case.operand.is_some());
        assert_eq!(1, case.branches.len());
        assert!(case.else_block.is_some());
    }

    #[test]
    fn repeat_and_while_carry_conditions() {
        let LogicalPlan::Repeat(repeat) =
            plan("REPEAT SET x = x + 1; UNTIL x > 10 END REPEAT").unwrap()
        else {
            panic!("expected repeat");
        };
        assert_eq!("x > 10", repeat.condition.to_string());

        let LogicalPlan::While(w) = plan("w: WHILE x < 10 DO SET x = x + 1; END WHILE w").unwrap()
        else {
            panic!("expected while");
        };
        assert_eq!("w", w.label);
    }

    #[test]
    fn declare_condition() {
        assert_eq!(
            LogicalPlan::DeclareCondition(DeclareCondition {
                name: "my_cond".to_string(),
                sqlstate: "45000".to_string(),
            }),
            plan("DECLARE My_Cond CONDITION FOR SQLSTATE '45000'").unwrap()
        );
    }

    #[rstest]
    #[case("DECLARE c CONDITION FOR 1051", PlanError::unsupported_syntax("DECLARE c CONDITION FOR 1051"))]
    #[case("DECLARE c CONDITION FOR 0", PlanError::invalid_value("invalid value '0' for MySQL error code"))]
    #[case("DECLARE c CONDITION FOR SQLSTATE '00000'", PlanError::invalid_value("invalid SQLSTATE VALUE: '00000'"))]
    #[case(
        "DECLARE c CONDITION FOR SQLSTATE '4500'",
        PlanError::invalid_value("SQLSTATE VALUE must be a string with length 5 consisting of only integers")
    )]
    fn declare_condition_errors(#[case] sql: &str, #[case] expected: PlanError) {
        assert_eq!(expected, plan(sql).unwrap_err());
    }

    #[test]
    fn declare_handler_not_found() {
        let LogicalPlan::DeclareHandler(handler) =
            plan("DECLARE CONTINUE HANDLER FOR NOT FOUND SET done = 1").unwrap()
        else {
            panic!("expected handler");
        };
        assert_eq!(HandlerAction::Continue, handler.action);

        let err = plan("DECLARE EXIT HANDLER FOR SQLEXCEPTION SET done = 1").unwrap_err();
        assert!(matches!(err, PlanError::UnsupportedSyntax(_)));
    }

    #[test]
    fn signal_with_info() {
        let expected = "Signal (set = [MESSAGE_TEXT = 'oops', MYSQL_ERRNO = 1000], sqlstate = 45000)\n";
        assert_eq!(
            expected,
            plan("SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'oops', MYSQL_ERRNO = 1000")
                .unwrap()
                .to_string()
        );
    }

    #[test]
    fn signal_condition_name_is_lowercased() {
        let LogicalPlan::Signal(signal) = plan("SIGNAL Custom_Error").unwrap() else {
            panic!("expected signal");
        };
        assert_eq!(Some("custom_error".to_string()), signal.condition);
        assert_eq!(None, signal.sqlstate);
    }

    #[rstest]
    #[case("SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'a', MESSAGE_TEXT = 'b'")]
    #[case("SIGNAL SQLSTATE '45000' SET MYSQL_ERRNO = 0")]
    #[case("SIGNAL SQLSTATE '45000' SET MYSQL_ERRNO = 70000")]
    #[case("SIGNAL SQLSTATE '00000'")]
    fn signal_errors(#[case] sql: &str) {
        assert!(plan(sql).is_err());
    }

    #[test]
    fn signal_message_text_length() {
        let long = "x".repeat(129);
        let err = plan(&format!("SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = '{long}'")).unwrap_err();
        assert_eq!(
            PlanError::invalid_value("signal condition information item MESSAGE_TEXT has max length of 128"),
            err
        );

        let long = "x".repeat(65);
        let err = plan(&format!("SIGNAL SQLSTATE '45000' SET TABLE_NAME = '{long}'")).unwrap_err();
        assert_eq!(
            PlanError::invalid_value("signal condition information item TABLE_NAME has max length of 64"),
            err
        );
    }

    #[test]
    fn call_with_args() {
        let LogicalPlan::Call(call) = plan("CALL db.p(1, @x)").unwrap() else {
            panic!("expected call");
        };
        assert_eq!("db", call.database);
        assert_eq!("p", call.name);
        assert_eq!(2, call.params.len());
    }
}
