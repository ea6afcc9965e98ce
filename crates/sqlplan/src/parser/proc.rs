//! Stored program statements: blocks, flow control, DECLARE and SIGNAL.

use sqlparser::ast::Ident;
use sqlparser::parser::ParserError;
use sqlparser::tokenizer::Token;

use super::ast::*;
use super::CustomParser;
use crate::plan::HandlerAction;

impl CustomParser<'_> {
    /// Statements up to (not including) one of `terminators`, each followed
    /// by `;`.
    fn parse_statement_list(&mut self, terminators: &[&str]) -> Result<Vec<Statement>, ParserError> {
        let mut statements = Vec::new();
        loop {
            if let Some(word) = self.peek_word() {
                if terminators.contains(&word.as_str()) {
                    return Ok(statements);
                }
            }
            if self.at_end() {
                return self.expected(&terminators.join(" or "), Token::EOF);
            }
            self.body_depth += 1;
            let statement = self.parse_statement();
            self.body_depth -= 1;
            statements.push(statement?);
            self.expect_semicolon()?;
        }
    }

    /// `END <word> [label]`
    fn parse_end(&mut self, word: &str, label: &Option<Ident>) -> Result<(), ParserError> {
        self.expect_word("END")?;
        if !word.is_empty() {
            self.expect_word(word)?;
        }
        self.parse_end_label(label)
    }

    fn parse_end_label(&mut self, label: &Option<Ident>) -> Result<(), ParserError> {
        if let Token::Word(w) = self.parser.peek_token().token {
            let end_label = w.value;
            match label {
                Some(label) if label.value.eq_ignore_ascii_case(&end_label) => {
                    self.parser.next_token();
                }
                _ => {
                    return Err(ParserError::ParserError(format!(
                        "end label {end_label} does not match a begin label"
                    )));
                }
            }
        }
        Ok(())
    }

    /// `label: BEGIN ...`, `label: LOOP ...` and so on.
    pub(super) fn parse_labeled_statement(&mut self) -> Result<Statement, ParserError> {
        let label = self.parser.parse_identifier(false)?;
        self.parser.expect_token(&Token::Colon)?;
        match self.peek_word().as_deref() {
            Some("BEGIN") => self.parse_begin(Some(label)),
            Some("LOOP") | Some("REPEAT") | Some("WHILE") => self.parse_loop(Some(label)),
            _ => self.expected("BEGIN, LOOP, REPEAT or WHILE", self.parser.peek_token().token),
        }
    }

    /// A BEGIN ... END block, or `BEGIN [WORK]` outside stored programs.
    pub(super) fn parse_begin(&mut self, label: Option<Ident>) -> Result<Statement, ParserError> {
        self.expect_word("BEGIN")?;
        let starts_transaction = label.is_none()
            && self.body_depth == 0
            && (self.at_end()
                || self.parser.peek_token().token == Token::SemiColon
                || self.peek_word_is("WORK"));
        if starts_transaction {
            self.parse_word("WORK");
            return Ok(Statement::StartTransaction { read_only: false });
        }

        let statements = self.parse_statement_list(&["END"])?;
        self.parse_end("", &label)?;
        Ok(Statement::Block(BlockStmt { label, statements }))
    }

    /// Parse a SQL IF statement
    pub(super) fn parse_if(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("IF")?;
        let mut branches = Vec::new();
        let mut else_statements = None;
        loop {
            let condition = self.parser.parse_expr()?;
            self.expect_word("THEN")?;
            let statements = self.parse_statement_list(&["ELSEIF", "ELSE", "END"])?;
            branches.push(ConditionalBlock {
                condition,
                statements,
            });
            if self.parse_word("ELSEIF") {
                continue;
            }
            if self.parse_word("ELSE") {
                else_statements = Some(self.parse_statement_list(&["END"])?);
            }
            break;
        }
        self.parse_end("IF", &None)?;
        Ok(Statement::If(IfStmt {
            branches,
            else_statements,
        }))
    }

    /// Parse a SQL CASE statement
    pub(super) fn parse_case(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("CASE")?;
        let operand = if self.peek_word_is("WHEN") {
            None
        } else {
            Some(self.parser.parse_expr()?)
        };
        let mut branches = Vec::new();
        while self.parse_word("WHEN") {
            let condition = self.parser.parse_expr()?;
            self.expect_word("THEN")?;
            let statements = self.parse_statement_list(&["WHEN", "ELSE", "END"])?;
            branches.push(ConditionalBlock {
                condition,
                statements,
            });
        }
        if branches.is_empty() {
            return self.expected("WHEN", self.parser.peek_token().token);
        }
        let else_statements = if self.parse_word("ELSE") {
            Some(self.parse_statement_list(&["END"])?)
        } else {
            None
        };
        self.parse_end("CASE", &None)?;
        Ok(Statement::Case(CaseStmt {
            operand,
            branches,
            else_statements,
        }))
    }

    /// LOOP, REPEAT and WHILE.
    pub(super) fn parse_loop(&mut self, label: Option<Ident>) -> Result<Statement, ParserError> {
        let (kind, statements) = if self.parse_word("LOOP") {
            let statements = self.parse_statement_list(&["END"])?;
            self.parse_end("LOOP", &label)?;
            (LoopKind::Loop, statements)
        } else if self.parse_word("REPEAT") {
            let statements = self.parse_statement_list(&["UNTIL"])?;
            self.expect_word("UNTIL")?;
            let condition = self.parser.parse_expr()?;
            self.parse_end("REPEAT", &label)?;
            (LoopKind::Repeat(condition), statements)
        } else {
            self.expect_word("WHILE")?;
            let condition = self.parser.parse_expr()?;
            self.expect_word("DO")?;
            let statements = self.parse_statement_list(&["END"])?;
            self.parse_end("WHILE", &label)?;
            (LoopKind::While(condition), statements)
        };
        Ok(Statement::Loop(LoopStmt {
            kind,
            label,
            statements,
        }))
    }

    pub(super) fn parse_leave_iterate(&mut self) -> Result<Statement, ParserError> {
        if self.parse_word("LEAVE") {
            Ok(Statement::Leave(self.parser.parse_identifier(false)?))
        } else {
            self.expect_word("ITERATE")?;
            Ok(Statement::Iterate(self.parser.parse_identifier(false)?))
        }
    }

    /// `SQLSTATE [VALUE] 'xxxxx'`
    fn parse_sqlstate(&mut self) -> Result<String, ParserError> {
        self.expect_word("SQLSTATE")?;
        self.parse_word("VALUE");
        self.parse_string()
    }

    /// Parse a SQL DECLARE statement
    pub(super) fn parse_declare(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("DECLARE")?;

        if self.peek_nth_word(1).as_deref() == Some("HANDLER") {
            let action = match self
                .parse_one_of_words(&["CONTINUE", "EXIT", "UNDO"])
                .as_deref()
            {
                Some("CONTINUE") => HandlerAction::Continue,
                Some("EXIT") => HandlerAction::Exit,
                Some(_) => HandlerAction::Undo,
                None => {
                    return self.expected("CONTINUE, EXIT or UNDO", self.parser.peek_token().token);
                }
            };
            self.expect_words(&["HANDLER", "FOR"])?;
            let condition = self.parse_handler_condition()?;
            let (statement, _) = self.parse_body()?;
            return Ok(Statement::Declare(DeclareStmt::Handler {
                action,
                condition,
                statement: Box::new(statement),
            }));
        }

        let first = self.parser.parse_identifier(false)?;
        if self.parse_word("CONDITION") {
            self.expect_word("FOR")?;
            let value = if self.peek_word_is("SQLSTATE") {
                ConditionValue::SqlState(self.parse_sqlstate()?)
            } else {
                ConditionValue::ErrorCode(self.parse_number()?)
            };
            return Ok(Statement::Declare(DeclareStmt::Condition { name: first, value }));
        }
        if self.parse_word("CURSOR") {
            self.expect_word("FOR")?;
            let query = self.parser.parse_query()?;
            return Ok(Statement::Declare(DeclareStmt::Cursor { name: first, query }));
        }

        let mut names = vec![first];
        while self.parser.consume_token(&Token::Comma) {
            names.push(self.parser.parse_identifier(false)?);
        }
        let column_type = self.parse_column_type()?;
        let default = if self.parse_word("DEFAULT") {
            Some(self.parser.parse_expr()?)
        } else {
            None
        };
        Ok(Statement::Declare(DeclareStmt::Variables {
            names,
            column_type,
            default,
        }))
    }

    /// Conditions after `HANDLER FOR`. Anything but a lone NOT FOUND is kept
    /// as its source text.
    fn parse_handler_condition(&mut self) -> Result<HandlerCondition, ParserError> {
        let start = self.next_token_start();
        let mut conditions = Vec::new();
        loop {
            if self.parse_words(&["NOT", "FOUND"]) {
                conditions.push(HandlerCondition::NotFound);
            } else if self.peek_word_is("SQLSTATE") {
                let state = self.parse_sqlstate()?;
                conditions.push(HandlerCondition::Other(format!("SQLSTATE '{state}'")));
            } else {
                match self.parser.next_token().token {
                    Token::Word(w) => conditions.push(HandlerCondition::Other(w.value)),
                    Token::Number(n, _) => conditions.push(HandlerCondition::Other(n)),
                    other => return self.expected("handler condition", other),
                }
            }
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        match conditions.as_slice() {
            [HandlerCondition::NotFound] => Ok(HandlerCondition::NotFound),
            _ => Ok(HandlerCondition::Other(
                self.text(start, self.prev_token_end()).to_string(),
            )),
        }
    }

    /// OPEN, CLOSE and FETCH.
    pub(super) fn parse_cursor_statement(&mut self) -> Result<Statement, ParserError> {
        if self.parse_word("OPEN") {
            return Ok(Statement::Open(self.parser.parse_identifier(false)?));
        }
        if self.parse_word("CLOSE") {
            return Ok(Statement::Close(self.parser.parse_identifier(false)?));
        }
        self.expect_word("FETCH")?;
        if self.parse_word("NEXT") {
            self.expect_word("FROM")?;
        } else {
            self.parse_word("FROM");
        }
        let cursor = self.parser.parse_identifier(false)?;
        self.expect_word("INTO")?;
        let into = self
            .parser
            .parse_comma_separated(|p| p.parse_identifier(false))?;
        Ok(Statement::Fetch { cursor, into })
    }

    /// Parse a SQL SIGNAL statement
    pub(super) fn parse_signal(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("SIGNAL")?;
        let mut stmt = SignalStmt {
            sqlstate: None,
            condition: None,
            info: Vec::new(),
        };
        if self.peek_word_is("SQLSTATE") {
            stmt.sqlstate = Some(self.parse_sqlstate()?);
        } else {
            stmt.condition = Some(self.parser.parse_identifier(false)?);
        }
        if self.parse_word("SET") {
            stmt.info = self.parser.parse_comma_separated(|p| {
                let item = p.parse_identifier(false)?;
                p.expect_token(&Token::Eq)?;
                let value = p.parse_expr()?;
                Ok((item, value))
            })?;
        }
        Ok(Statement::Signal(stmt))
    }

    /// Parse a SQL CALL statement
    pub(super) fn parse_call(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("CALL")?;
        let name = self.parser.parse_object_name(false)?;
        let mut args = Vec::new();
        if self.parser.consume_token(&Token::LParen) {
            if !self.parser.consume_token(&Token::RParen) {
                args = self.parser.parse_comma_separated(|p| p.parse_expr())?;
                self.parser.expect_token(&Token::RParen)?;
            }
        }
        Ok(Statement::Call(CallStmt { name, args }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::parse_statement;

    fn parse(sql: &str) -> Statement {
        parse_statement(sql).unwrap().unwrap().statement
    }

    #[test]
    fn begin_is_transaction_at_top_level() {
        assert_eq!(
            Statement::StartTransaction { read_only: false },
            parse("BEGIN WORK")
        );
        assert_eq!(Statement::StartTransaction { read_only: false }, parse("BEGIN"));
    }

    #[test]
    fn labeled_block() {
        let Statement::Block(block) = parse("lbl: BEGIN SELECT 1; SET @a = 2; END lbl") else {
            panic!("expected block");
        };
        assert_eq!(Some(Ident::new("lbl")), block.label);
        assert_eq!(2, block.statements.len());
    }

    #[test]
    fn mismatched_end_label() {
        assert!(parse_statement("a: LOOP LEAVE a; END LOOP b").is_err());
    }

    #[test]
    fn if_elseif_else() {
        let Statement::If(stmt) =
            parse("IF a = 1 THEN SELECT 1; ELSEIF a = 2 THEN SELECT 2; SELECT 3; ELSE SELECT 4; END IF")
        else {
            panic!("expected if");
        };
        assert_eq!(2, stmt.branches.len());
        assert_eq!(2, stmt.branches[1].statements.len());
        assert_eq!(1, stmt.else_statements.unwrap().len());
    }

    #[test]
    fn case_statement() {
        let Statement::Case(stmt) = parse("CASE x WHEN 1 THEN SELECT 1; WHEN 2 THEN BEGIN END; END CASE")
        else {
            panic!("expected case");
        };
        assert!(stmt.operand.is_some());
        assert_eq!(2, stmt.branches.len());
        assert!(stmt.else_statements.is_none());
    }

    #[test]
    fn loops() {
        assert!(matches!(
            parse("l: REPEAT SET @a = @a + 1; UNTIL @a > 3 END REPEAT l"),
            Statement::Loop(LoopStmt { kind: LoopKind::Repeat(_), label: Some(_), .. })
        ));
        assert!(matches!(
            parse("WHILE @a < 3 DO SET @a = @a + 1; END WHILE"),
            Statement::Loop(LoopStmt { kind: LoopKind::While(_), label: None, .. })
        ));
    }

    #[test]
    fn declare_forms() {
        assert!(matches!(
            parse("DECLARE a, b INT DEFAULT 1"),
            Statement::Declare(DeclareStmt::Variables { names, default: Some(_), .. }) if names.len() == 2
        ));
        assert!(matches!(
            parse("DECLARE cur CURSOR FOR SELECT a FROM t"),
            Statement::Declare(DeclareStmt::Cursor { .. })
        ));
        assert_eq!(
            Statement::Declare(DeclareStmt::Condition {
                name: Ident::new("c"),
                value: ConditionValue::SqlState("45000".to_string()),
            }),
            parse("DECLARE c CONDITION FOR SQLSTATE VALUE '45000'")
        );
        match parse("DECLARE CONTINUE HANDLER FOR NOT FOUND SET @done = 1") {
            Statement::Declare(DeclareStmt::Handler { action, condition, .. }) => {
                assert_eq!(HandlerAction::Continue, action);
                assert_eq!(HandlerCondition::NotFound, condition);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
        match parse("DECLARE EXIT HANDLER FOR SQLEXCEPTION BEGIN END") {
            Statement::Declare(DeclareStmt::Handler { condition, .. }) => {
                assert_eq!(HandlerCondition::Other("SQLEXCEPTION".to_string()), condition);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn fetch_and_signal() {
        assert_eq!(
            Statement::Fetch {
                cursor: Ident::new("c"),
                into: vec![Ident::new("a"), Ident::new("b")],
            },
            parse("FETCH NEXT FROM c INTO a, b")
        );
        let Statement::Signal(signal) =
            parse("SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'oops', MYSQL_ERRNO = 1000")
        else {
            panic!("expected signal");
        };
        assert_eq!(Some("45000".to_string()), signal.sqlstate);
        assert_eq!(2, signal.info.len());
    }

    #[test]
    fn call() {
        let Statement::Call(call) = parse("CALL db.p(1, @a)") else {
            panic!("expected call");
        };
        assert_eq!("db.p", call.name.to_string());
        assert_eq!(2, call.args.len());
    }
}
