//! CREATE, ALTER, DROP and friends.

use sqlparser::ast::{self as sql_ast, Ident, ObjectName};
use sqlparser::parser::{IsOptional, ParserError};
use sqlparser::tokenizer::Token;

use super::ast::*;
use super::CustomParser;
use crate::plan::{
    Characteristic, ColumnOrder, EventStatus, ParamDirection, ReferentialAction,
    SecurityContext, TriggerEvent, TriggerTime,
};

/// Options that may sit between CREATE and the object keyword.
#[derive(Debug, Default)]
struct CreatePrefix {
    or_replace: bool,
    algorithm: Option<String>,
    definer: Option<String>,
    security: Option<String>,
}

impl CustomParser<'_> {
    /// Parse a SQL CREATE statement
    pub(super) fn parse_create(&mut self) -> Result<Statement, ParserError> {
        let create_idx = self.next_token_index();
        let start = self.next_token_start();
        self.expect_word("CREATE")?;

        let mut prefix = CreatePrefix {
            or_replace: self.parse_words(&["OR", "REPLACE"]),
            ..Default::default()
        };
        loop {
            if self.parse_word("ALGORITHM") {
                self.parser.expect_token(&Token::Eq)?;
                prefix.algorithm = Some(self.parse_name_or_string()?.to_ascii_uppercase());
            } else if self.peek_word_is("DEFINER") {
                prefix.definer = self.parse_definer()?;
            } else if self.parse_words(&["SQL", "SECURITY"]) {
                prefix.security = Some(self.parse_name_or_string()?.to_ascii_uppercase());
            } else {
                break;
            }
        }

        let Some(word) = self.peek_word() else {
            return self.expected("object type after CREATE", self.parser.peek_token().token);
        };
        match word.as_str() {
            "TEMPORARY" | "TABLE" => self.parse_create_table(),
            "UNIQUE" | "FULLTEXT" | "INDEX" => self.parse_create_index(),
            "SPATIAL" if self.peek_nth_word(1).as_deref() == Some("REFERENCE") => {
                self.parse_create_spatial_ref_sys(prefix.or_replace)
            }
            "SPATIAL" => self.parse_create_index(),
            "VIEW" => self.parse_create_view(prefix, start),
            "TRIGGER" => self.parse_create_trigger(prefix.definer, start),
            "PROCEDURE" => self.parse_create_procedure(prefix.definer, start),
            "EVENT" => self.parse_create_event(prefix.definer, start),
            "DATABASE" | "SCHEMA" => self.parse_create_database(),
            "USER" => self.parse_create_user(),
            "ROLE" => self.parse_create_role(),
            _ => {
                self.rewind(create_idx);
                self.parse_fallback()
            }
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement, ParserError> {
        let temporary = self.parse_word("TEMPORARY");
        self.expect_word("TABLE")?;
        let if_not_exists = self.parse_if_not_exists();
        let name = self.parser.parse_object_name(false)?;

        let mut stmt = CreateTableStmt {
            name,
            temporary,
            if_not_exists,
            spec: None,
            like: None,
            select: None,
        };

        if self.parse_word("LIKE") {
            stmt.like = Some(self.parser.parse_object_name(false)?);
            return Ok(Statement::CreateTable(Box::new(stmt)));
        }

        if self.parser.peek_token().token == Token::LParen {
            match self.peek_nth_word(1).as_deref() {
                Some("LIKE") => {
                    self.parser.next_token();
                    self.parser.next_token();
                    stmt.like = Some(self.parser.parse_object_name(false)?);
                    self.parser.expect_token(&Token::RParen)?;
                    return Ok(Statement::CreateTable(Box::new(stmt)));
                }
                Some("SELECT") | Some("WITH") => {
                    stmt.select = Some(self.parser.parse_query()?);
                    return Ok(Statement::CreateTable(Box::new(stmt)));
                }
                _ => {
                    let mut spec = self.parse_table_spec()?;
                    spec.options = self.parse_table_options_text();
                    stmt.spec = Some(spec);
                }
            }
        } else {
            let options = self.parse_table_options_text();
            if !options.is_empty() {
                stmt.spec = Some(TableSpec {
                    options,
                    ..Default::default()
                });
            }
        }

        self.parse_one_of_words(&["IGNORE", "REPLACE"]);
        self.parse_word("AS");
        let query_follows = matches!(
            self.peek_word().as_deref(),
            Some("SELECT") | Some("WITH") | Some("VALUES")
        ) || self.parser.peek_token().token == Token::LParen;
        if query_follows {
            stmt.select = Some(self.parser.parse_query()?);
        }
        Ok(Statement::CreateTable(Box::new(stmt)))
    }

    /// Source text of the table options, e.g. `ENGINE=InnoDB CHARSET=utf8mb4`.
    fn parse_table_options_text(&mut self) -> String {
        let start = self.next_token_start();
        loop {
            match self.parser.peek_token().token {
                Token::EOF | Token::SemiColon => break,
                Token::Word(w)
                    if w.quote_style.is_none()
                        && ["AS", "SELECT", "WITH", "IGNORE", "REPLACE"]
                            .iter()
                            .any(|kw| w.value.eq_ignore_ascii_case(kw)) =>
                {
                    break;
                }
                _ => {
                    self.parser.next_token();
                }
            }
        }
        self.text(start, self.prev_token_end().max(start))
            .trim()
            .to_string()
    }

    /// `( element, ... )`
    pub(super) fn parse_table_spec(&mut self) -> Result<TableSpec, ParserError> {
        self.parser.expect_token(&Token::LParen)?;
        let mut spec = TableSpec::default();
        loop {
            match self.parse_table_constraint()? {
                Some(constraint) => spec.constraints.push(constraint),
                None => {
                    let (column, checks) = self.parse_column_def()?;
                    spec.columns.push(column);
                    spec.constraints
                        .extend(checks.into_iter().map(TableConstraintDef::Check));
                }
            }
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        self.parser.expect_token(&Token::RParen)?;
        Ok(spec)
    }

    /// An index, foreign key or check definition. `None` when the next
    /// element is a column.
    fn parse_table_constraint(&mut self) -> Result<Option<TableConstraintDef>, ParserError> {
        let mut name = None;
        if self.parse_word("CONSTRAINT") {
            if !matches!(
                self.peek_word().as_deref(),
                Some("PRIMARY") | Some("UNIQUE") | Some("FOREIGN") | Some("CHECK")
            ) {
                name = Some(self.parser.parse_identifier(false)?);
            }
        }

        let Some(word) = self.peek_word() else {
            return Ok(None);
        };
        let constraint = match word.as_str() {
            "PRIMARY" => {
                self.expect_words(&["PRIMARY", "KEY"])?;
                let mut index = self.parse_index_def(IndexKind::Primary, false)?;
                index.name = index.name.or(name);
                TableConstraintDef::Index(index)
            }
            "UNIQUE" => {
                self.parser.next_token();
                self.parse_one_of_words(&["INDEX", "KEY"]);
                let mut index = self.parse_index_def(IndexKind::Unique, true)?;
                index.name = index.name.or(name);
                TableConstraintDef::Index(index)
            }
            "INDEX" | "KEY" => {
                self.parser.next_token();
                TableConstraintDef::Index(self.parse_index_def(IndexKind::Plain, true)?)
            }
            "FULLTEXT" | "SPATIAL" => {
                self.parser.next_token();
                self.parse_one_of_words(&["INDEX", "KEY"]);
                let kind = if word == "FULLTEXT" {
                    IndexKind::Fulltext
                } else {
                    IndexKind::Spatial
                };
                TableConstraintDef::Index(self.parse_index_def(kind, true)?)
            }
            "FOREIGN" => TableConstraintDef::ForeignKey(self.parse_foreign_key(name)?),
            "CHECK" => TableConstraintDef::Check(self.parse_check(name)?),
            _ => {
                if name.is_some() {
                    return self.expected(
                        "PRIMARY KEY, UNIQUE, FOREIGN KEY or CHECK",
                        self.parser.peek_token().token,
                    );
                }
                return Ok(None);
            }
        };
        Ok(Some(constraint))
    }

    /// `[name] [USING m] (part, ...) [options]`, after the index keywords.
    pub(super) fn parse_index_def(
        &mut self,
        kind: IndexKind,
        named: bool,
    ) -> Result<IndexDef, ParserError> {
        let mut index = IndexDef {
            kind,
            ..Default::default()
        };
        if named
            && self.parser.peek_token().token != Token::LParen
            && !self.peek_word_is("USING")
        {
            index.name = Some(self.parser.parse_identifier(false)?);
        }
        if self.parse_word("USING") {
            index.using = Some(self.parse_name_or_string()?);
        }
        index.parts = self.parse_index_parts()?;
        self.parse_index_options(&mut index)?;
        Ok(index)
    }

    fn parse_index_parts(&mut self) -> Result<Vec<IndexPart>, ParserError> {
        self.parser.expect_token(&Token::LParen)?;
        let parts = self.parser.parse_comma_separated(|p| {
            if p.consume_token(&Token::Mul) {
                return Ok(IndexPart::Wildcard);
            }
            let expr = p.parse_expr()?;
            // Direction does not change the definition.
            let _ = p.parse_one_of_keywords(&[
                sqlparser::keywords::Keyword::ASC,
                sqlparser::keywords::Keyword::DESC,
            ]);
            Ok(IndexPart::Expr(expr))
        })?;
        self.parser.expect_token(&Token::RParen)?;
        Ok(parts)
    }

    fn parse_index_options(&mut self, index: &mut IndexDef) -> Result<(), ParserError> {
        loop {
            if self.parse_word("USING") {
                index.using = Some(self.parse_name_or_string()?);
            } else if self.parse_word("COMMENT") {
                index.comment = Some(self.parse_string()?);
            } else if self.parse_word("KEY_BLOCK_SIZE") {
                self.parse_optional_eq();
                let value = self.parse_number()?;
                index.options.push(("key_block_size".to_string(), value));
            } else if let Some(word) = self.parse_one_of_words(&["VISIBLE", "INVISIBLE"]) {
                index.options.push((word.to_ascii_lowercase(), String::new()));
            } else if self.parse_words(&["WITH", "PARSER"]) {
                let parser = self.parse_name_or_string()?;
                index.options.push(("parser".to_string(), parser));
            } else if self.peek_word_is("WITH")
                && self.parser.peek_nth_token(1).token == Token::LParen
            {
                self.parser.next_token();
                self.parser.next_token();
                loop {
                    let key = self.parse_name_or_string()?;
                    self.parse_optional_eq();
                    let value = match self.parser.next_token().token {
                        Token::Number(n, _) => n,
                        Token::Word(w) => w.value,
                        Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => s,
                        other => return self.expected("index option value", other),
                    };
                    index.options.push((key, value));
                    if !self.parser.consume_token(&Token::Comma) {
                        break;
                    }
                }
                self.parser.expect_token(&Token::RParen)?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_foreign_key(&mut self, name: Option<Ident>) -> Result<ForeignKeyDef, ParserError> {
        self.expect_words(&["FOREIGN", "KEY"])?;
        let index_name = if self.parser.peek_token().token != Token::LParen {
            Some(self.parser.parse_identifier(false)?)
        } else {
            None
        };
        let columns = self
            .parser
            .parse_parenthesized_column_list(IsOptional::Mandatory, false)?;
        let (parent, parent_columns, on_delete, on_update) = self.parse_references()?;
        Ok(ForeignKeyDef {
            name: name.or(index_name),
            columns,
            parent,
            parent_columns,
            on_delete,
            on_update,
        })
    }

    /// `REFERENCES t (cols) [ON DELETE action] [ON UPDATE action]`
    fn parse_references(
        &mut self,
    ) -> Result<(ObjectName, Vec<Ident>, ReferentialAction, ReferentialAction), ParserError> {
        self.expect_word("REFERENCES")?;
        let parent = self.parser.parse_object_name(false)?;
        let parent_columns = self
            .parser
            .parse_parenthesized_column_list(IsOptional::Optional, false)?;
        let mut on_delete = ReferentialAction::DefaultAction;
        let mut on_update = ReferentialAction::DefaultAction;
        loop {
            if self.parse_words(&["ON", "DELETE"]) {
                on_delete = self.parse_referential_action()?;
            } else if self.parse_words(&["ON", "UPDATE"]) {
                on_update = self.parse_referential_action()?;
            } else {
                break;
            }
        }
        Ok((parent, parent_columns, on_delete, on_update))
    }

    fn parse_referential_action(&mut self) -> Result<ReferentialAction, ParserError> {
        Ok(match self.parser.parse_referential_action()? {
            sql_ast::ReferentialAction::Restrict => ReferentialAction::Restrict,
            sql_ast::ReferentialAction::Cascade => ReferentialAction::Cascade,
            sql_ast::ReferentialAction::SetNull => ReferentialAction::SetNull,
            sql_ast::ReferentialAction::NoAction => ReferentialAction::NoAction,
            sql_ast::ReferentialAction::SetDefault => ReferentialAction::SetDefault,
        })
    }

    fn parse_check(&mut self, name: Option<Ident>) -> Result<CheckDef, ParserError> {
        self.expect_word("CHECK")?;
        self.parser.expect_token(&Token::LParen)?;
        let expr = self.parser.parse_expr()?;
        self.parser.expect_token(&Token::RParen)?;
        let enforced = if self.parse_words(&["NOT", "ENFORCED"]) {
            false
        } else {
            self.parse_word("ENFORCED");
            true
        };
        Ok(CheckDef {
            name,
            expr,
            enforced,
        })
    }

    /// A column definition. Inline CHECK constraints are returned alongside.
    pub(super) fn parse_column_def(&mut self) -> Result<(ColumnDef, Vec<CheckDef>), ParserError> {
        let name = self.parser.parse_identifier(false)?;
        let column_type = self.parse_column_type()?;
        let mut column = ColumnDef::new(name, column_type);
        let mut checks = Vec::new();

        loop {
            if self.parse_words(&["NOT", "NULL"]) {
                column.null = Some(false);
            } else if self.parse_word("NULL") {
                column.null = Some(true);
            } else if self.parse_word("DEFAULT") {
                match self.parser.parse_expr()? {
                    sql_ast::Expr::Collate { expr, collation } => {
                        column.column_type.collate = Some(collation.to_string().to_lowercase());
                        column.default = Some(*expr);
                    }
                    expr => column.default = Some(expr),
                }
            } else if self.parse_words(&["ON", "UPDATE"]) {
                column.on_update = Some(self.parser.parse_expr()?);
            } else if self.parse_word("AUTO_INCREMENT") {
                column.auto_increment = true;
            } else if self.parse_words(&["PRIMARY", "KEY"]) || self.parse_word("KEY") {
                column.key = Some(ColumnKeyOption::Primary);
            } else if self.parse_word("UNIQUE") {
                column.key = Some(if self.parse_word("KEY") {
                    ColumnKeyOption::UniqueKey
                } else {
                    ColumnKeyOption::Unique
                });
            } else if self.parse_word("FULLTEXT") {
                self.parse_word("KEY");
                column.key = Some(ColumnKeyOption::Fulltext);
            } else if self.parse_word("COMMENT") {
                column.comment = Some(self.parse_string()?);
            } else if self.parse_word("COLLATE") {
                column.column_type.collate = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else if self.parse_words(&["CHARACTER", "SET"]) || self.parse_word("CHARSET") {
                column.column_type.charset = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else if self.parse_words(&["GENERATED", "ALWAYS"]) || self.peek_word_is("AS") {
                self.expect_word("AS")?;
                self.parser.expect_token(&Token::LParen)?;
                let expr = self.parser.parse_expr()?;
                self.parser.expect_token(&Token::RParen)?;
                let stored = match self.parse_one_of_words(&["VIRTUAL", "STORED"]) {
                    Some(w) => w == "STORED",
                    None => false,
                };
                column.generated = Some((expr, stored));
            } else if self.parse_word("SRID") {
                column.srid = Some(self.parse_number()?);
            } else if self.parse_one_of_words(&["VISIBLE", "INVISIBLE"]).is_some() {
            } else if self.peek_word_is("CHECK") || self.peek_word_is("CONSTRAINT") {
                let name = if self.parse_word("CONSTRAINT") && !self.peek_word_is("CHECK") {
                    Some(self.parser.parse_identifier(false)?)
                } else {
                    None
                };
                checks.push(self.parse_check(name)?);
            } else if self.peek_word_is("REFERENCES") {
                // Inline references are accepted and ignored, as MySQL does.
                self.parse_references()?;
            } else {
                break;
            }
        }
        Ok((column, checks))
    }

    /// `[FIRST | AFTER col]`
    fn parse_column_order(&mut self) -> Result<Option<ColumnOrder>, ParserError> {
        if self.parse_word("FIRST") {
            Ok(Some(ColumnOrder::First))
        } else if self.parse_word("AFTER") {
            Ok(Some(ColumnOrder::After(
                self.parser.parse_identifier(false)?.value,
            )))
        } else {
            Ok(None)
        }
    }

    fn parse_create_index(&mut self) -> Result<Statement, ParserError> {
        let kind = match self.parse_one_of_words(&["UNIQUE", "FULLTEXT", "SPATIAL"]).as_deref() {
            Some("UNIQUE") => IndexKind::Unique,
            Some("FULLTEXT") => IndexKind::Fulltext,
            Some(_) => IndexKind::Spatial,
            None => IndexKind::Plain,
        };
        self.expect_word("INDEX")?;
        let mut index = IndexDef {
            kind,
            name: Some(self.parser.parse_identifier(false)?),
            ..Default::default()
        };
        if self.parse_word("USING") {
            index.using = Some(self.parse_name_or_string()?);
        }
        self.expect_word("ON")?;
        let table = self.parser.parse_object_name(false)?;
        index.parts = self.parse_index_parts()?;
        self.parse_index_options(&mut index)?;
        Ok(Statement::CreateIndex(CreateIndexStmt { table, index }))
    }

    fn parse_create_view(
        &mut self,
        prefix: CreatePrefix,
        start: usize,
    ) -> Result<Statement, ParserError> {
        self.expect_word("VIEW")?;
        let name = self.parser.parse_object_name(false)?;
        let columns = self
            .parser
            .parse_parenthesized_column_list(IsOptional::Optional, false)?;
        self.expect_word("AS")?;
        let body_start = self.next_token_start();
        let query = self.parser.parse_query()?;
        let body_text = self.text(body_start, self.prev_token_end()).to_string();
        if self.parse_word("WITH") {
            self.parse_one_of_words(&["CASCADED", "LOCAL"]);
            self.expect_words(&["CHECK", "OPTION"])?;
        }
        let create_text = self.text(start, self.prev_token_end()).to_string();
        Ok(Statement::CreateView(Box::new(CreateViewStmt {
            or_replace: prefix.or_replace,
            algorithm: prefix.algorithm,
            definer: prefix.definer,
            security: prefix.security,
            name,
            columns,
            query,
            text: DefinitionText {
                create_text,
                body_text,
            },
        })))
    }

    fn parse_create_trigger(
        &mut self,
        definer: Option<String>,
        start: usize,
    ) -> Result<Statement, ParserError> {
        self.expect_word("TRIGGER")?;
        let name = self.parser.parse_object_name(false)?;
        let time = match self.parse_one_of_words(&["BEFORE", "AFTER"]).as_deref() {
            Some("BEFORE") => TriggerTime::Before,
            Some(_) => TriggerTime::After,
            None => return self.expected("BEFORE or AFTER", self.parser.peek_token().token),
        };
        let event = match self
            .parse_one_of_words(&["INSERT", "UPDATE", "DELETE"])
            .as_deref()
        {
            Some("INSERT") => TriggerEvent::Insert,
            Some("UPDATE") => TriggerEvent::Update,
            Some(_) => TriggerEvent::Delete,
            None => {
                return self.expected("INSERT, UPDATE or DELETE", self.parser.peek_token().token);
            }
        };
        self.expect_word("ON")?;
        let table = self.parser.parse_object_name(false)?;
        self.expect_words(&["FOR", "EACH", "ROW"])?;
        let order = match self.parse_one_of_words(&["FOLLOWS", "PRECEDES"]) {
            Some(word) => Some((word == "PRECEDES", self.parser.parse_identifier(false)?)),
            None => None,
        };
        let (body, body_text) = self.parse_body()?;
        let create_text = self.text(start, self.prev_token_end()).to_string();
        Ok(Statement::CreateTrigger(Box::new(CreateTriggerStmt {
            definer,
            name,
            time,
            event,
            table,
            order,
            body: Box::new(body),
            text: DefinitionText {
                create_text,
                body_text,
            },
        })))
    }

    fn parse_create_procedure(
        &mut self,
        definer: Option<String>,
        start: usize,
    ) -> Result<Statement, ParserError> {
        self.expect_word("PROCEDURE")?;
        self.parse_if_not_exists();
        let name = self.parser.parse_object_name(false)?;

        self.parser.expect_token(&Token::LParen)?;
        let mut params = Vec::new();
        if !self.parser.consume_token(&Token::RParen) {
            loop {
                let direction = match self.parse_one_of_words(&["IN", "OUT", "INOUT"]).as_deref() {
                    Some("OUT") => ParamDirection::Out,
                    Some("INOUT") => ParamDirection::InOut,
                    _ => ParamDirection::In,
                };
                let name = self.parser.parse_identifier(false)?;
                let column_type = self.parse_column_type()?;
                params.push(ProcedureParamDef {
                    direction,
                    name,
                    column_type,
                });
                if !self.parser.consume_token(&Token::Comma) {
                    break;
                }
            }
            self.parser.expect_token(&Token::RParen)?;
        }

        let mut characteristics = Vec::new();
        let mut security = SecurityContext::Definer;
        let mut comment = None;
        loop {
            if self.parse_word("COMMENT") {
                comment = Some(self.parse_string()?);
            } else if self.parse_words(&["LANGUAGE", "SQL"]) {
                characteristics.push(Characteristic::LanguageSql);
            } else if self.parse_words(&["NOT", "DETERMINISTIC"]) {
                characteristics.push(Characteristic::NotDeterministic);
            } else if self.parse_word("DETERMINISTIC") {
                characteristics.push(Characteristic::Deterministic);
            } else if self.parse_words(&["CONTAINS", "SQL"]) {
                characteristics.push(Characteristic::ContainsSql);
            } else if self.parse_words(&["NO", "SQL"]) {
                characteristics.push(Characteristic::NoSql);
            } else if self.parse_words(&["READS", "SQL", "DATA"]) {
                characteristics.push(Characteristic::ReadsSqlData);
            } else if self.parse_words(&["MODIFIES", "SQL", "DATA"]) {
                characteristics.push(Characteristic::ModifiesSqlData);
            } else if self.parse_words(&["SQL", "SECURITY"]) {
                security = match self.parse_one_of_words(&["DEFINER", "INVOKER"]).as_deref() {
                    Some("INVOKER") => SecurityContext::Invoker,
                    Some(_) => SecurityContext::Definer,
                    None => {
                        return self.expected("DEFINER or INVOKER", self.parser.peek_token().token);
                    }
                };
            } else {
                break;
            }
        }

        let (body, body_text) = self.parse_body()?;
        let create_text = self.text(start, self.prev_token_end()).to_string();
        Ok(Statement::CreateProcedure(Box::new(CreateProcedureStmt {
            definer,
            name,
            params,
            characteristics,
            security,
            comment,
            body: Box::new(body),
            text: DefinitionText {
                create_text,
                body_text,
            },
        })))
    }

    fn parse_event_schedule(&mut self) -> Result<EventScheduleDef, ParserError> {
        if self.parse_word("AT") {
            return Ok(EventScheduleDef::At(self.parser.parse_expr()?));
        }
        self.expect_word("EVERY")?;
        let interval = super::parse_interval_value(&mut self.parser)?;
        let starts = if self.parse_word("STARTS") {
            Some(self.parser.parse_expr()?)
        } else {
            None
        };
        let ends = if self.parse_word("ENDS") {
            Some(self.parser.parse_expr()?)
        } else {
            None
        };
        Ok(EventScheduleDef::Every {
            interval,
            starts,
            ends,
        })
    }

    fn parse_event_status(&mut self) -> Option<EventStatus> {
        if self.parse_word("ENABLE") {
            Some(EventStatus::Enable)
        } else if self.parse_words(&["DISABLE", "ON", "SLAVE"]) {
            Some(EventStatus::DisableOnSlave)
        } else if self.parse_word("DISABLE") {
            Some(EventStatus::Disable)
        } else {
            None
        }
    }

    /// `ON COMPLETION [NOT] PRESERVE`
    fn parse_on_completion(&mut self) -> Result<Option<bool>, ParserError> {
        if !self.parse_words(&["ON", "COMPLETION"]) {
            return Ok(None);
        }
        let preserve = !self.parse_word("NOT");
        self.expect_word("PRESERVE")?;
        Ok(Some(preserve))
    }

    fn parse_create_event(
        &mut self,
        definer: Option<String>,
        start: usize,
    ) -> Result<Statement, ParserError> {
        self.expect_word("EVENT")?;
        let if_not_exists = self.parse_if_not_exists();
        let name = self.parser.parse_object_name(false)?;
        self.expect_words(&["ON", "SCHEDULE"])?;
        let schedule = self.parse_event_schedule()?;
        let preserve = self.parse_on_completion()?.unwrap_or(false);
        let status = self.parse_event_status().unwrap_or_default();
        let comment = if self.parse_word("COMMENT") {
            Some(self.parse_string()?)
        } else {
            None
        };
        self.expect_word("DO")?;
        let (body, body_text) = self.parse_body()?;
        let create_text = self.text(start, self.prev_token_end()).to_string();
        Ok(Statement::CreateEvent(Box::new(CreateEventStmt {
            definer,
            if_not_exists,
            name,
            schedule,
            preserve,
            status,
            comment,
            body: Box::new(body),
            text: DefinitionText {
                create_text,
                body_text,
            },
        })))
    }

    /// `[DEFAULT] CHARACTER SET [=] cs`, `[DEFAULT] COLLATE [=] c` and
    /// `[DEFAULT] ENCRYPTION [=] 'Y'`, in any order.
    fn parse_database_options(
        &mut self,
    ) -> Result<(Option<String>, Option<String>, bool, bool), ParserError> {
        let mut charset = None;
        let mut collate = None;
        let mut encryption = false;
        let mut any = false;
        loop {
            let default_idx = self.next_token_index();
            let had_default = self.parse_word("DEFAULT");
            if self.parse_words(&["CHARACTER", "SET"]) || self.parse_word("CHARSET") {
                self.parse_optional_eq();
                charset = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else if self.parse_word("COLLATE") {
                self.parse_optional_eq();
                collate = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else if self.parse_word("ENCRYPTION") {
                self.parse_optional_eq();
                self.parse_name_or_string()?;
                encryption = true;
            } else {
                if had_default {
                    self.rewind(default_idx);
                }
                break;
            }
            any = true;
        }
        Ok((charset, collate, encryption, any))
    }

    fn parse_create_database(&mut self) -> Result<Statement, ParserError> {
        self.parse_one_of_words(&["DATABASE", "SCHEMA"]);
        let if_not_exists = self.parse_if_not_exists();
        let name = self.parser.parse_identifier(false)?;
        let (charset, collate, encryption, _) = self.parse_database_options()?;
        Ok(Statement::CreateDatabase(CreateDatabaseStmt {
            name,
            if_not_exists,
            charset,
            collate,
            encryption,
        }))
    }

    /// `CREATE [OR REPLACE] SPATIAL REFERENCE SYSTEM [IF NOT EXISTS] srid attrs`
    fn parse_create_spatial_ref_sys(&mut self, or_replace: bool) -> Result<Statement, ParserError> {
        self.expect_words(&["SPATIAL", "REFERENCE", "SYSTEM"])?;
        let mut stmt = CreateSpatialRefSysStmt {
            or_replace,
            if_not_exists: self.parse_if_not_exists(),
            srid: self.parse_number()?,
            ..Default::default()
        };
        loop {
            if self.parse_word("NAME") {
                stmt.name = Some(self.parse_string()?);
            } else if self.parse_word("DEFINITION") {
                stmt.definition = Some(self.parse_string()?);
            } else if self.parse_word("ORGANIZATION") {
                let org = self.parse_string()?;
                self.expect_words(&["IDENTIFIED", "BY"])?;
                stmt.organization = Some((org, self.parse_number()?));
            } else if self.parse_word("DESCRIPTION") {
                stmt.description = Some(self.parse_string()?);
            } else {
                break;
            }
        }
        Ok(Statement::CreateSpatialRefSys(stmt))
    }

    /// Parse a SQL ALTER statement
    pub(super) fn parse_alter(&mut self) -> Result<Statement, ParserError> {
        let alter_idx = self.next_token_index();
        self.expect_word("ALTER")?;
        let definer = if self.peek_word_is("DEFINER") {
            self.parse_definer()?
        } else {
            None
        };
        match self.peek_word().as_deref() {
            Some("TABLE") => {
                self.parser.next_token();
                self.parse_alter_table()
            }
            Some("DATABASE") | Some("SCHEMA") => {
                self.parser.next_token();
                let name = match self.peek_word().as_deref() {
                    Some("DEFAULT") | Some("CHARACTER") | Some("CHARSET") | Some("COLLATE")
                    | Some("ENCRYPTION") => None,
                    _ => Some(self.parser.parse_identifier(false)?),
                };
                let (charset, collate, _, any) = self.parse_database_options()?;
                if !any {
                    return self.expected(
                        "CHARACTER SET or COLLATE",
                        self.parser.peek_token().token,
                    );
                }
                Ok(Statement::AlterDatabase(AlterDatabaseStmt {
                    name,
                    charset,
                    collate,
                }))
            }
            Some("EVENT") => self.parse_alter_event(definer),
            _ => {
                self.rewind(alter_idx);
                self.parse_fallback()
            }
        }
    }

    fn parse_alter_table(&mut self) -> Result<Statement, ParserError> {
        let name = self.parser.parse_object_name(false)?;
        let mut operations = Vec::new();
        loop {
            operations.push(self.parse_alter_table_operation()?);
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::AlterTable(AlterTableStmt { name, operations }))
    }

    fn parse_alter_table_operation(&mut self) -> Result<AlterTableOperation, ParserError> {
        let Some(word) = self.peek_word() else {
            return self.expected("ALTER TABLE operation", self.parser.peek_token().token);
        };
        match word.as_str() {
            "ADD" => {
                self.parser.next_token();
                if let Some(constraint) = self.parse_table_constraint()? {
                    return Ok(match constraint {
                        TableConstraintDef::Index(index) => AlterTableOperation::AddIndex(index),
                        TableConstraintDef::ForeignKey(fk) => {
                            AlterTableOperation::AddForeignKey(fk)
                        }
                        TableConstraintDef::Check(check) => AlterTableOperation::AddCheck(check),
                    });
                }
                self.parse_word("COLUMN");
                let columns = if self.parser.consume_token(&Token::LParen) {
                    let mut columns = Vec::new();
                    loop {
                        columns.push(self.parse_column_def()?.0);
                        if !self.parser.consume_token(&Token::Comma) {
                            break;
                        }
                    }
                    self.parser.expect_token(&Token::RParen)?;
                    columns
                } else {
                    vec![self.parse_column_def()?.0]
                };
                let order = self.parse_column_order()?;
                Ok(AlterTableOperation::AddColumns { columns, order })
            }
            "DROP" => {
                self.parser.next_token();
                if self.parse_words(&["PRIMARY", "KEY"]) {
                    Ok(AlterTableOperation::DropPrimaryKey)
                } else if self.parse_one_of_words(&["INDEX", "KEY"]).is_some() {
                    Ok(AlterTableOperation::DropIndex(self.parser.parse_identifier(false)?))
                } else if self.parse_words(&["FOREIGN", "KEY"]) {
                    Ok(AlterTableOperation::DropForeignKey(
                        self.parser.parse_identifier(false)?,
                    ))
                } else if self.parse_word("CHECK") {
                    Ok(AlterTableOperation::DropCheck(self.parser.parse_identifier(false)?))
                } else if self.parse_word("CONSTRAINT") {
                    Ok(AlterTableOperation::DropConstraint(
                        self.parser.parse_identifier(false)?,
                    ))
                } else {
                    self.parse_word("COLUMN");
                    Ok(AlterTableOperation::DropColumn(self.parser.parse_identifier(false)?))
                }
            }
            "MODIFY" | "CHANGE" => {
                self.parser.next_token();
                self.parse_word("COLUMN");
                let name = if word == "CHANGE" {
                    Some(self.parser.parse_identifier(false)?)
                } else {
                    None
                };
                let columns = if self.parser.consume_token(&Token::LParen) {
                    let mut columns = Vec::new();
                    loop {
                        columns.push(self.parse_column_def()?.0);
                        if !self.parser.consume_token(&Token::Comma) {
                            break;
                        }
                    }
                    self.parser.expect_token(&Token::RParen)?;
                    columns
                } else {
                    vec![self.parse_column_def()?.0]
                };
                let order = self.parse_column_order()?;
                let name = match name {
                    Some(name) => name,
                    None => match columns.first() {
                        Some(column) => column.name.clone(),
                        None => return self.expected("column", self.parser.peek_token().token),
                    },
                };
                Ok(AlterTableOperation::ModifyColumn {
                    name,
                    columns,
                    order,
                })
            }
            "RENAME" => {
                self.parser.next_token();
                if self.parse_word("COLUMN") {
                    let from = self.parser.parse_identifier(false)?;
                    self.expect_word("TO")?;
                    let to = self.parser.parse_identifier(false)?;
                    Ok(AlterTableOperation::RenameColumn { from, to })
                } else if self.parse_one_of_words(&["INDEX", "KEY"]).is_some() {
                    let from = self.parser.parse_identifier(false)?;
                    self.expect_word("TO")?;
                    let to = self.parser.parse_identifier(false)?;
                    Ok(AlterTableOperation::RenameIndex { from, to })
                } else {
                    self.parse_one_of_words(&["TO", "AS"]);
                    Ok(AlterTableOperation::Rename(self.parser.parse_object_name(false)?))
                }
            }
            "DISABLE" => {
                self.expect_words(&["DISABLE", "KEYS"])?;
                Ok(AlterTableOperation::DisableKeys)
            }
            "ENABLE" => {
                self.expect_words(&["ENABLE", "KEYS"])?;
                Ok(AlterTableOperation::EnableKeys)
            }
            "ALTER" => {
                self.parser.next_token();
                self.parse_word("COLUMN");
                let column = self.parser.parse_identifier(false)?;
                if self.parse_words(&["SET", "DEFAULT"]) {
                    let expr = self.parser.parse_expr()?;
                    Ok(AlterTableOperation::SetDefault { column, expr })
                } else if self.parse_words(&["DROP", "DEFAULT"]) {
                    Ok(AlterTableOperation::DropDefault { column })
                } else {
                    self.expected("SET DEFAULT or DROP DEFAULT", self.parser.peek_token().token)
                }
            }
            "AUTO_INCREMENT" => {
                self.parser.next_token();
                self.parse_optional_eq();
                Ok(AlterTableOperation::AutoIncrement(self.parse_number()?))
            }
            "DEFAULT" | "CHARACTER" | "CHARSET" | "COLLATE" | "CONVERT" => {
                self.parse_word("DEFAULT");
                self.parse_words(&["CONVERT", "TO"]);
                let mut charset = None;
                let mut collate = None;
                loop {
                    if self.parse_words(&["CHARACTER", "SET"]) || self.parse_word("CHARSET") {
                        self.parse_optional_eq();
                        charset = Some(self.parse_name_or_string()?.to_ascii_lowercase());
                    } else if self.parse_word("COLLATE") {
                        self.parse_optional_eq();
                        collate = Some(self.parse_name_or_string()?.to_ascii_lowercase());
                    } else {
                        break;
                    }
                }
                if charset.is_none() && collate.is_none() {
                    return self.expected("CHARACTER SET or COLLATE", self.parser.peek_token().token);
                }
                Ok(AlterTableOperation::Collation { charset, collate })
            }
            _ => self.expected("ALTER TABLE operation", self.parser.peek_token().token),
        }
    }

    fn parse_alter_event(&mut self, definer: Option<String>) -> Result<Statement, ParserError> {
        self.expect_word("EVENT")?;
        let name = self.parser.parse_object_name(false)?;
        let schedule = if self.parse_words(&["ON", "SCHEDULE"]) {
            Some(self.parse_event_schedule()?)
        } else {
            None
        };
        let preserve = self.parse_on_completion()?;
        let rename = if self.parse_words(&["RENAME", "TO"]) {
            Some(self.parser.parse_object_name(false)?)
        } else {
            None
        };
        let status = self.parse_event_status();
        let comment = if self.parse_word("COMMENT") {
            Some(self.parse_string()?)
        } else {
            None
        };
        let body = if self.parse_word("DO") {
            let (body, text) = self.parse_body()?;
            Some((Box::new(body), text))
        } else {
            None
        };
        Ok(Statement::AlterEvent(Box::new(AlterEventStmt {
            definer,
            name,
            schedule,
            preserve,
            rename,
            status,
            comment,
            body,
        })))
    }

    /// Parse a SQL DROP statement
    pub(super) fn parse_drop(&mut self) -> Result<Statement, ParserError> {
        let drop_idx = self.next_token_index();
        self.expect_word("DROP")?;
        let temporary = self.parse_word("TEMPORARY");
        let Some(word) = self.peek_word() else {
            return self.expected("object type after DROP", self.parser.peek_token().token);
        };
        match word.as_str() {
            "TABLE" | "TABLES" => {
                self.parser.next_token();
                let if_exists = self.parse_if_exists();
                let names = self
                    .parser
                    .parse_comma_separated(|p| p.parse_object_name(false))?;
                self.parse_one_of_words(&["RESTRICT", "CASCADE"]);
                Ok(Statement::DropTable(DropTableStmt {
                    temporary,
                    if_exists,
                    names,
                }))
            }
            "INDEX" => {
                self.parser.next_token();
                let name = self.parser.parse_identifier(false)?;
                self.expect_word("ON")?;
                let table = self.parser.parse_object_name(false)?;
                Ok(Statement::DropIndex(DropIndexStmt { name, table }))
            }
            "VIEW" => {
                self.parser.next_token();
                let if_exists = self.parse_if_exists();
                let names = self
                    .parser
                    .parse_comma_separated(|p| p.parse_object_name(false))?;
                self.parse_one_of_words(&["RESTRICT", "CASCADE"]);
                Ok(Statement::DropView(DropViewStmt { if_exists, names }))
            }
            "TRIGGER" | "PROCEDURE" | "EVENT" => {
                self.parser.next_token();
                let stmt = DropRoutineStmt {
                    if_exists: self.parse_if_exists(),
                    name: self.parser.parse_object_name(false)?,
                };
                Ok(match word.as_str() {
                    "TRIGGER" => Statement::DropTrigger(stmt),
                    "PROCEDURE" => Statement::DropProcedure(stmt),
                    _ => Statement::DropEvent(stmt),
                })
            }
            "DATABASE" | "SCHEMA" => {
                self.parser.next_token();
                let if_exists = self.parse_if_exists();
                let name = self.parser.parse_identifier(false)?;
                Ok(Statement::DropDatabase(DropDatabaseStmt { name, if_exists }))
            }
            "USER" => self.parse_drop_user(),
            "ROLE" => self.parse_drop_role(),
            "PREPARE" => {
                self.parser.next_token();
                Ok(Statement::Deallocate(self.parser.parse_identifier(false)?))
            }
            _ => {
                self.rewind(drop_idx);
                self.parse_fallback()
            }
        }
    }

    /// `RENAME TABLE a TO b, ...` or `RENAME USER ...`
    pub(super) fn parse_rename(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("RENAME")?;
        if self.peek_word_is("USER") {
            return self.parse_rename_user();
        }
        self.expect_word("TABLE")?;
        let renames = self.parser.parse_comma_separated(|p| {
            let from = p.parse_object_name(false)?;
            p.expect_keyword(sqlparser::keywords::Keyword::TO)?;
            let to = p.parse_object_name(false)?;
            Ok((from, to))
        })?;
        Ok(Statement::RenameTable(RenameTableStmt { renames }))
    }

    pub(super) fn parse_truncate(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("TRUNCATE")?;
        self.parse_word("TABLE");
        Ok(Statement::TruncateTable(self.parser.parse_object_name(false)?))
    }

    pub(super) fn parse_analyze(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("ANALYZE")?;
        self.parse_one_of_words(&["NO_WRITE_TO_BINLOG", "LOCAL"]);
        self.parse_one_of_words(&["TABLE", "TABLES"]);
        let tables = self
            .parser
            .parse_comma_separated(|p| p.parse_object_name(false))?;
        Ok(Statement::Analyze(tables))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::parser::parse_statement;

    fn parse(sql: &str) -> Statement {
        parse_statement(sql).unwrap().unwrap().statement
    }

    #[rstest]
    #[case("ALTER TABLE t AUTO_INCREMENT = 10")]
    #[case("ALTER TABLE t AUTO_INCREMENT 10")]
    fn table_option_equals_is_optional(#[case] sql: &str) {
        let Statement::AlterTable(alter) = parse(sql) else {
            panic!("expected alter table");
        };
        assert_eq!(
            vec![AlterTableOperation::AutoIncrement("10".to_string())],
            alter.operations
        );
    }

    #[test]
    fn create_table_with_constraints() {
        let stmt = parse(
            "CREATE TABLE IF NOT EXISTS t (
                a INT UNSIGNED NOT NULL AUTO_INCREMENT,
                b VARCHAR(10) CHARACTER SET utf8mb4 DEFAULT 'x' COMMENT 'hi',
                c INT CHECK (c > 0),
                PRIMARY KEY (a),
                UNIQUE KEY ub (b(4)),
                CONSTRAINT fk FOREIGN KEY (c) REFERENCES p (id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=latin1",
        );
        let Statement::CreateTable(create) = stmt else {
            panic!("expected create table");
        };
        assert!(create.if_not_exists);
        let spec = create.spec.unwrap();
        assert_eq!(3, spec.columns.len());
        assert_eq!(4, spec.constraints.len());
        assert_eq!("ENGINE=InnoDB DEFAULT CHARSET=latin1", spec.options);
        assert!(spec.columns[0].column_type.unsigned);
        assert_eq!(Some(false), spec.columns[0].null);
        assert_eq!(Some("utf8mb4".to_string()), spec.columns[1].column_type.charset);
        match &spec.constraints[3] {
            TableConstraintDef::ForeignKey(fk) => {
                assert_eq!(Some(Ident::new("fk")), fk.name);
                assert_eq!(ReferentialAction::Cascade, fk.on_delete);
                assert_eq!(ReferentialAction::DefaultAction, fk.on_update);
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn create_table_like_and_select() {
        assert!(matches!(
            parse("CREATE TABLE t LIKE u"),
            Statement::CreateTable(c) if c.like.is_some()
        ));
        assert!(matches!(
            parse("CREATE TABLE t AS SELECT * FROM u"),
            Statement::CreateTable(c) if c.select.is_some() && c.spec.is_none()
        ));
    }

    #[test]
    fn default_with_collate_moves_to_type() {
        let Statement::CreateTable(create) =
            parse("CREATE TABLE t (a VARCHAR(5) DEFAULT 'x' COLLATE utf8mb4_bin)")
        else {
            panic!("expected create table");
        };
        let column = &create.spec.unwrap().columns[0];
        assert_eq!(Some("utf8mb4_bin".to_string()), column.column_type.collate);
        assert!(matches!(column.default, Some(sql_ast::Expr::Value(_))));
    }

    #[test]
    fn alter_table_operations() {
        let Statement::AlterTable(alter) = parse(
            "ALTER TABLE t DROP COLUMN a, RENAME COLUMN b TO c, ADD INDEX i (d), \
             ALTER COLUMN e SET DEFAULT 3, AUTO_INCREMENT = 10, MODIFY f INT FIRST",
        ) else {
            panic!("expected alter table");
        };
        assert_eq!(6, alter.operations.len());
        assert!(matches!(alter.operations[0], AlterTableOperation::DropColumn(_)));
        assert!(matches!(
            alter.operations[5],
            AlterTableOperation::ModifyColumn {
                order: Some(ColumnOrder::First),
                ..
            }
        ));
    }

    #[test]
    fn create_trigger_captures_text() {
        let sql = "CREATE TRIGGER trg BEFORE INSERT ON t FOR EACH ROW SET NEW.a = 1";
        let Statement::CreateTrigger(trigger) = parse(sql) else {
            panic!("expected trigger");
        };
        assert_eq!(sql, trigger.text.create_text);
        assert_eq!("SET NEW.a = 1", trigger.text.body_text);
        assert_eq!(TriggerTime::Before, trigger.time);
    }

    #[test]
    fn create_procedure() {
        let Statement::CreateProcedure(proc) = parse(
            "CREATE DEFINER = `root`@`localhost` PROCEDURE p(IN a INT, OUT b VARCHAR(10)) \
             COMMENT 'x' DETERMINISTIC BEGIN SELECT a; END",
        ) else {
            panic!("expected procedure");
        };
        assert_eq!(Some("`root`@`localhost`".to_string()), proc.definer);
        assert_eq!(2, proc.params.len());
        assert_eq!(ParamDirection::Out, proc.params[1].direction);
        assert_eq!(vec![Characteristic::Deterministic], proc.characteristics);
        assert_eq!("BEGIN SELECT a; END", proc.text.body_text);
    }

    #[test]
    fn create_event_every() {
        let Statement::CreateEvent(event) =
            parse("CREATE EVENT e ON SCHEDULE EVERY 1 DAY_HOUR STARTS '2020-01-01' DISABLE DO INSERT INTO t VALUES (1)")
        else {
            panic!("expected event");
        };
        assert_eq!(EventStatus::Disable, event.status);
        assert!(matches!(event.schedule, EventScheduleDef::Every { starts: Some(_), .. }));
    }

    #[test]
    fn create_index_wildcard() {
        let Statement::CreateIndex(index) = parse("CREATE INDEX idx ON foo(*)") else {
            panic!("expected create index");
        };
        assert_eq!(vec![IndexPart::Wildcard], index.index.parts);
    }

    #[test]
    fn drop_and_rename() {
        assert!(matches!(
            parse("DROP TABLE IF EXISTS a, b.c"),
            Statement::DropTable(DropTableStmt { if_exists: true, .. })
        ));
        assert!(matches!(
            parse("RENAME TABLE a TO b, c TO d"),
            Statement::RenameTable(r) if r.renames.len() == 2
        ));
        assert!(matches!(parse("DROP PREPARE s"), Statement::Deallocate(_)));
    }

    #[test]
    fn spatial_ref_sys() {
        let Statement::CreateSpatialRefSys(srs) = parse(
            "CREATE SPATIAL REFERENCE SYSTEM 4326 NAME 'WGS' DEFINITION 'x' ORGANIZATION 'EPSG' IDENTIFIED BY 4326",
        ) else {
            panic!("expected srs");
        };
        assert_eq!("4326", srs.srid);
        assert_eq!(Some(("EPSG".to_string(), "4326".to_string())), srs.organization);
    }
}
