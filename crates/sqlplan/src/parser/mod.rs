//! MySQL grammar front-end.
//!
//! `sqlparser` handles queries, expressions, INSERT and DELETE. Everything
//! else is read by [`CustomParser`], which drives the same token stream and
//! falls back to `sqlparser` for statements it does not extend.

pub mod ast;

mod admin;
mod ddl;
mod proc;

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use sqlparser::ast::helpers::attached_token::AttachedToken;
use sqlparser::ast::{self as sql_ast, BinaryOperator, CastKind};
use sqlparser::dialect::{Dialect, MySqlDialect, Precedence};
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer, Whitespace, Word};

use self::ast::*;
use crate::errors::{PlanError, Result};

/// MySQL dialect with the operators the stock dialect leaves out.
///
/// `@` does not start identifiers here: user and system variables are
/// joined back into single words after tokenizing so that `'u'@'h'` account
/// names tokenize.
#[derive(Debug, Default)]
pub struct MySqlPlanDialect;

static DIALECT: MySqlPlanDialect = MySqlPlanDialect;

impl Dialect for MySqlPlanDialect {
    fn dialect(&self) -> TypeId {
        TypeId::of::<MySqlDialect>()
    }

    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$' || ('\u{0080}'..='\u{ffff}').contains(&ch)
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        self.is_identifier_start(ch) || ch.is_ascii_digit()
    }

    fn is_delimited_identifier_start(&self, ch: char) -> bool {
        ch == '`'
    }

    fn identifier_quote_style(&self, _identifier: &str) -> Option<char> {
        Some('`')
    }

    fn supports_string_literal_backslash_escape(&self) -> bool {
        true
    }

    fn supports_numeric_prefix(&self) -> bool {
        true
    }

    fn require_interval_qualifier(&self) -> bool {
        true
    }

    fn supports_limit_comma(&self) -> bool {
        true
    }

    fn supports_create_table_select(&self) -> bool {
        true
    }

    fn supports_bang_not_operator(&self) -> bool {
        true
    }

    fn parse_prefix(&self, parser: &mut Parser) -> Option<Result<sql_ast::Expr, ParserError>> {
        match parser.peek_token().token {
            Token::Word(w) if w.quote_style.is_none() && w.keyword == Keyword::INTERVAL => {
                parser.next_token();
                return Some(parse_interval_value(parser));
            }
            // BINARY expr
            Token::Word(w) if w.quote_style.is_none() && w.keyword == Keyword::BINARY => {}
            _ => return None,
        }
        match parser.peek_nth_token(1).token {
            Token::EOF | Token::Comma | Token::RParen | Token::SemiColon => return None,
            _ => {}
        }
        parser.next_token();
        let prec = self.prec_value(Precedence::DoubleColon);
        Some(parser.parse_subexpr(prec).map(|expr| sql_ast::Expr::Cast {
            kind: CastKind::Cast,
            expr: Box::new(expr),
            data_type: sql_ast::DataType::Binary(None),
            format: None,
        }))
    }

    fn parse_infix(
        &self,
        parser: &mut Parser,
        expr: &sql_ast::Expr,
        precedence: u8,
    ) -> Option<Result<sql_ast::Expr, ParserError>> {
        let op = match parser.peek_token().token {
            Token::Word(w) if is_word(&w, "DIV") => BinaryOperator::MyIntegerDivide,
            Token::Word(w) if is_word(&w, "MOD") => BinaryOperator::Modulo,
            Token::ShiftLeft => BinaryOperator::PGBitwiseShiftLeft,
            Token::ShiftRight => BinaryOperator::PGBitwiseShiftRight,
            Token::Overlap => BinaryOperator::And,
            Token::StringConcat => BinaryOperator::Or,
            _ => return None,
        };
        parser.next_token();
        Some(
            parser
                .parse_subexpr(precedence)
                .map(|right| sql_ast::Expr::BinaryOp {
                    left: Box::new(expr.clone()),
                    op,
                    right: Box::new(right),
                }),
        )
    }

    fn get_next_precedence(&self, parser: &Parser) -> Option<Result<u8, ParserError>> {
        let prec = match parser.peek_token().token {
            Token::Word(w) if is_word(&w, "MOD") => self.prec_value(Precedence::MulDivModOp),
            // Logical XOR sits between AND and OR.
            Token::Word(w) if is_word(&w, "XOR") => self.prec_value(Precedence::And) - 1,
            Token::ShiftLeft | Token::ShiftRight => self.prec_value(Precedence::Caret),
            Token::Overlap => self.prec_value(Precedence::And),
            Token::StringConcat => self.prec_value(Precedence::Or),
            Token::Arrow | Token::LongArrow => self.prec_value(Precedence::DoubleColon),
            _ => return None,
        };
        Some(Ok(prec))
    }
}

/// `value unit` following INTERVAL or EVERY. Compound MySQL units such as
/// `DAY_HOUR` are kept as custom fields.
fn parse_interval_value(parser: &mut Parser) -> Result<sql_ast::Expr, ParserError> {
    let value = parser.parse_expr()?;
    let unit = if parser.next_token_is_temporal_unit() {
        parser.parse_date_time_field()?
    } else {
        match parser.next_token().token {
            Token::Word(w) => sql_ast::DateTimeField::Custom(sql_ast::Ident::new(
                w.value.to_ascii_uppercase(),
            )),
            other => {
                return Err(ParserError::ParserError(format!(
                    "Expected interval unit, found: {other}"
                )));
            }
        }
    };
    Ok(sql_ast::Expr::Interval(sql_ast::Interval {
        value: Box::new(value),
        leading_field: Some(unit),
        leading_precision: None,
        last_field: None,
        fractional_seconds_precision: None,
    }))
}

fn is_word(w: &Word, word: &str) -> bool {
    w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word)
}

/// Source text of select list items, keyed by the position of the SELECT
/// keyword that owns them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    select_items: HashMap<(u64, u64), Vec<String>>,
}

impl SourceMap {
    /// Text of the `idx`th item in the select list of `select`.
    pub fn select_item(&self, select: &sql_ast::Select, idx: usize) -> Option<&str> {
        let loc = select.select_token.0.span.start;
        self.select_items
            .get(&(loc.line, loc.column))
            .and_then(|items| items.get(idx))
            .map(|s| s.as_str())
    }
}

/// A statement along with the source text the planner needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub statement: Statement,
    pub source: SourceMap,
}

/// Parse exactly one statement. A trailing `;` is allowed.
///
/// Returns `None` when the input holds no statement, e.g. only comments.
pub fn parse_statement(sql: &str) -> Result<Option<ParsedStatement>> {
    let mut parser = CustomParser::new(sql)?;
    let statement = parser.parse_single()?;
    Ok(statement.map(|statement| ParsedStatement {
        statement,
        source: parser.source_map(),
    }))
}

/// Parse the first statement of a multi statement input.
///
/// Returns the statement, its trimmed text, and the text after its `;`.
pub fn parse_first_statement(sql: &str) -> Result<(Option<ParsedStatement>, String, String)> {
    let mut parser = CustomParser::new(sql)?;
    let (statement, consumed, remainder) = parser.parse_first()?;
    let parsed = statement.map(|statement| ParsedStatement {
        statement,
        source: parser.source_map(),
    });
    Ok((parsed, consumed, remainder))
}

/// Parse a column type written on its own, e.g. `varchar(10) collate utf8mb4_bin`.
pub fn parse_column_type(sql: &str) -> Result<ColumnType> {
    let mut parser = CustomParser::new(sql)?;
    let column_type = parser.parse_column_type()?;
    if !parser.at_end() {
        parser.expected::<()>("end of column type", parser.parser.peek_token().token)?;
    }
    Ok(column_type)
}

/// The digits of a `0b...` bit literal the tokenizer read as a word.
fn bit_literal_digits(word: &Word) -> Option<&str> {
    if word.quote_style.is_some() {
        return None;
    }
    let digits = word.value.strip_prefix("0b")?;
    (!digits.is_empty() && digits.bytes().all(|b| b == b'0' || b == b'1')).then_some(digits)
}

/// Statement keywords that end a select list when seen at its own depth.
const SELECT_LIST_TERMINATORS: &[&str] = &[
    "FROM", "WHERE", "GROUP", "HAVING", "WINDOW", "ORDER", "LIMIT", "UNION", "EXCEPT",
    "INTERSECT", "FOR", "LOCK", "INTO",
];

const SELECT_MODIFIERS: &[&str] = &[
    "SQL_CALC_FOUND_ROWS",
    "SQL_CACHE",
    "SQL_NO_CACHE",
    "SQL_SMALL_RESULT",
    "SQL_BIG_RESULT",
    "SQL_BUFFER_RESULT",
    "STRAIGHT_JOIN",
    "HIGH_PRIORITY",
];

/// Select options removed from the token stream before parsing.
#[derive(Debug, Default)]
struct SelectOptions {
    /// `INTO` targets, keyed by the token index of the owning SELECT.
    into: HashMap<usize, Vec<String>>,
    calc_found_rows: HashSet<usize>,
}

/// Parser with MySQL extensions.
pub struct CustomParser<'a> {
    parser: Parser<'a>,
    sql: &'a str,
    tokens: Vec<TokenWithSpan>,
    line_starts: Vec<usize>,
    options: SelectOptions,
    select_items: HashMap<(u64, u64), Vec<String>>,
    /// Depth of stored program bodies being parsed. `BEGIN` inside a body
    /// always opens a block.
    body_depth: usize,
}

impl<'a> CustomParser<'a> {
    pub fn new(sql: &'a str) -> Result<Self> {
        let tokens = Tokenizer::new(&DIALECT, sql).tokenize_with_location()?;
        let tokens = join_variables(tokens);
        let mut line_starts = vec![0];
        line_starts.extend(sql.match_indices('\n').map(|(i, _)| i + 1));

        let mut parser = CustomParser {
            parser: Parser::new(&DIALECT),
            sql,
            tokens,
            line_starts,
            options: SelectOptions::default(),
            select_items: HashMap::new(),
            body_depth: 0,
        };
        parser.rewrite_tokens()?;
        parser.collect_select_items();
        parser.parser = Parser::new(&DIALECT).with_tokens_with_locations(parser.tokens.clone());
        Ok(parser)
    }

    fn source_map(&self) -> SourceMap {
        SourceMap {
            select_items: self.select_items.clone(),
        }
    }

    fn parse_single(&mut self) -> Result<Option<Statement>, ParserError> {
        while self.parser.consume_token(&Token::SemiColon) {}
        if self.at_end() {
            return Ok(None);
        }
        let statement = self.parse_statement()?;
        while self.parser.consume_token(&Token::SemiColon) {}
        if !self.at_end() {
            return self.expected("end of statement", self.parser.peek_token().token);
        }
        Ok(Some(statement))
    }

    fn parse_first(&mut self) -> Result<(Option<Statement>, String, String), ParserError> {
        if self.at_end() {
            return Ok((None, String::new(), String::new()));
        }
        if self.parser.consume_token(&Token::SemiColon) {
            let rest = self.text(self.prev_token_end(), self.sql.len()).to_string();
            return Ok((None, String::new(), rest));
        }

        let start = self.next_token_start();
        let statement = self.parse_statement()?;
        let consumed = self.text(start, self.prev_token_end()).trim().to_string();
        let remainder = if self.parser.consume_token(&Token::SemiColon) {
            self.text(self.prev_token_end(), self.sql.len()).to_string()
        } else if self.at_end() {
            String::new()
        } else {
            return self.expected("end of statement", self.parser.peek_token().token);
        };
        Ok((Some(statement), consumed, remainder))
    }

    /// Rewrite the token stream in place: drop select modifiers, lift out
    /// `INTO` targets, number `?` placeholders, and turn `0b101` words into
    /// bit literals.
    fn rewrite_tokens(&mut self) -> Result<()> {
        // Token index of the SELECT that owns each open paren depth, if the
        // last statement keyword at that depth was a SELECT.
        let mut owners: Vec<Option<usize>> = vec![None];
        let mut after_select = false;
        let mut placeholders = 0;

        let mut i = 0;
        while i < self.tokens.len() {
            let token = self.tokens[i].token.clone();
            if let Token::Word(w) = &token {
                if let Some(digits) = bit_literal_digits(w) {
                    self.tokens[i].token = Token::SingleQuotedByteStringLiteral(digits.to_string());
                    after_select = false;
                    i += 1;
                    continue;
                }
            }
            match token {
                Token::Whitespace(_) => {
                    i += 1;
                    continue;
                }
                Token::LParen => owners.push(None),
                Token::RParen => {
                    if owners.len() > 1 {
                        owners.pop();
                    }
                }
                Token::SemiColon => owners = vec![None],
                Token::Placeholder(p) if p == "?" => {
                    placeholders += 1;
                    self.tokens[i].token = Token::Placeholder(format!(":v{placeholders}"));
                }
                Token::Word(w) if w.quote_style.is_none() => {
                    let upper = w.value.to_ascii_uppercase();
                    let owner = owners.last().copied().flatten();
                    match upper.as_str() {
                        "SELECT" => {
                            if let Some(top) = owners.last_mut() {
                                *top = Some(i);
                            }
                            after_select = true;
                            i += 1;
                            continue;
                        }
                        "INSERT" | "LOAD" | "FETCH" => {
                            if let Some(top) = owners.last_mut() {
                                *top = None;
                            }
                        }
                        "REPLACE" if !matches!(self.next_token_after(i), Some(Token::LParen)) => {
                            if let Some(top) = owners.last_mut() {
                                *top = None;
                            }
                        }
                        "DISTINCTROW" if after_select => {
                            self.tokens[i].token = Token::make_keyword("DISTINCT");
                            i += 1;
                            continue;
                        }
                        "ALL" | "DISTINCT" if after_select => {
                            i += 1;
                            continue;
                        }
                        m if after_select && SELECT_MODIFIERS.contains(&m) => {
                            if m == "SQL_CALC_FOUND_ROWS" {
                                if let Some(sel) = owner {
                                    self.options.calc_found_rows.insert(sel);
                                }
                            }
                            self.blank(i);
                            i += 1;
                            continue;
                        }
                        "INTO" => {
                            if let Some(sel) = owner {
                                i = self.lift_into(i, sel)?;
                                after_select = false;
                                continue;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
            after_select = false;
            i += 1;
        }
        Ok(())
    }

    /// Remove `INTO var, ...` starting at `idx`, recording the targets for
    /// `select`. Returns the index after the removed tokens.
    fn lift_into(&mut self, idx: usize, select: usize) -> Result<usize> {
        self.blank(idx);
        let mut targets = Vec::new();
        let mut i = idx + 1;
        loop {
            while matches!(self.tokens.get(i).map(|t| &t.token), Some(Token::Whitespace(_))) {
                i += 1;
            }
            let Some(token) = self.tokens.get(i).map(|t| t.token.clone()) else {
                break;
            };
            match token {
                Token::Word(w)
                    if targets.is_empty()
                        && w.quote_style.is_none()
                        && (w.value.eq_ignore_ascii_case("OUTFILE")
                            || w.value.eq_ignore_ascii_case("DUMPFILE")) =>
                {
                    return Err(PlanError::unsupported_syntax(
                        "select into files is not supported yet",
                    ));
                }
                Token::Word(w) => {
                    targets.push(w.value);
                    self.blank(i);
                    i += 1;
                }
                _ => break,
            }
            match self.next_token_after(i - 1) {
                Some(Token::Comma) => {
                    while !matches!(self.tokens.get(i).map(|t| &t.token), Some(Token::Comma)) {
                        i += 1;
                    }
                    self.blank(i);
                    i += 1;
                }
                _ => break,
            }
        }
        self.options.into.insert(select, targets);
        Ok(i)
    }

    /// Record the source text of every select list in the statement.
    fn collect_select_items(&mut self) {
        for (idx, token) in self.tokens.iter().enumerate() {
            let Token::Word(w) = &token.token else {
                continue;
            };
            if !is_word(w, "SELECT") {
                continue;
            }
            let items = self.select_item_texts(idx);
            let loc = token.span.start;
            self.select_items.insert((loc.line, loc.column), items);
        }
    }

    fn select_item_texts(&self, select: usize) -> Vec<String> {
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut first: Option<usize> = None;
        let mut last = 0;
        let mut leading = true;

        for i in select + 1..self.tokens.len() {
            let token = &self.tokens[i].token;
            match token {
                Token::Whitespace(_) => continue,
                Token::Word(w) if leading && (is_word(w, "ALL") || is_word(w, "DISTINCT")) => {
                    continue;
                }
                Token::Word(w)
                    if depth == 0
                        && w.quote_style.is_none()
                        && SELECT_LIST_TERMINATORS
                            .iter()
                            .any(|t| w.value.eq_ignore_ascii_case(t)) =>
                {
                    break;
                }
                Token::SemiColon if depth == 0 => break,
                Token::RParen if depth == 0 => break,
                Token::Comma if depth == 0 => {
                    if let Some(f) = first.take() {
                        items.push(self.token_text(f, last));
                    }
                    leading = false;
                    continue;
                }
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            leading = false;
            if first.is_none() {
                first = Some(i);
            }
            last = i;
        }
        if let Some(f) = first {
            items.push(self.token_text(f, last));
        }
        items
    }

    fn token_text(&self, first: usize, last: usize) -> String {
        let start = self.offset(self.tokens[first].span.start);
        let end = self.offset(self.tokens[last].span.end);
        self.text(start, end).trim().to_string()
    }

    fn blank(&mut self, idx: usize) {
        if let Some(token) = self.tokens.get_mut(idx) {
            token.token = Token::Whitespace(Whitespace::Space);
        }
    }

    /// The first non-whitespace token after `idx`.
    fn next_token_after(&self, idx: usize) -> Option<Token> {
        self.tokens[idx + 1..]
            .iter()
            .map(|t| &t.token)
            .find(|t| !matches!(t, Token::Whitespace(_)))
            .cloned()
    }

    /// Byte offset of a tokenizer location.
    fn offset(&self, loc: Location) -> usize {
        let line = (loc.line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(line) else {
            return self.sql.len();
        };
        let col = (loc.column as usize).saturating_sub(1);
        self.sql[start..]
            .char_indices()
            .nth(col)
            .map(|(i, _)| start + i)
            .unwrap_or(self.sql.len())
    }

    fn text(&self, start: usize, end: usize) -> &'a str {
        if start >= end {
            return "";
        }
        self.sql.get(start..end).unwrap_or("")
    }

    /// Byte offset where the next unconsumed token starts.
    fn next_token_start(&self) -> usize {
        self.tokens[self.parser.index().min(self.tokens.len())..]
            .iter()
            .find(|t| !matches!(t.token, Token::Whitespace(_)))
            .map(|t| self.offset(t.span.start))
            .unwrap_or(self.sql.len())
    }

    /// Byte offset where the last consumed token ends.
    fn prev_token_end(&self) -> usize {
        self.tokens[..self.parser.index().min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| !matches!(t.token, Token::Whitespace(_)))
            .map(|t| self.offset(t.span.end))
            .unwrap_or(0)
    }

    fn at_end(&self) -> bool {
        self.parser.peek_token().token == Token::EOF
    }

    /// Index of the next non-whitespace token.
    fn next_token_index(&self) -> usize {
        let mut idx = self.parser.index();
        while matches!(
            self.tokens.get(idx).map(|t| &t.token),
            Some(Token::Whitespace(_))
        ) {
            idx += 1;
        }
        idx
    }

    /// Step back to a token index returned by [`Self::next_token_index`].
    fn rewind(&mut self, idx: usize) {
        while self.parser.index() > idx {
            self.parser.prev_token();
        }
    }

    /// Parse the body of a stored program, returning it with its source text.
    fn parse_body(&mut self) -> Result<(Statement, String), ParserError> {
        let start = self.next_token_start();
        self.body_depth += 1;
        let body = self.parse_statement();
        self.body_depth -= 1;
        let body = body?;
        let text = self.text(start, self.prev_token_end()).trim().to_string();
        Ok((body, text))
    }

    /// Report unexpected token.
    fn expected<T>(&self, expected: &str, found: Token) -> Result<T, ParserError> {
        Err(ParserError::ParserError(format!(
            "Expected {}, found: {}",
            expected, found
        )))
    }

    /// The nth upcoming word, uppercased. Quoted identifiers are not words.
    fn peek_nth_word(&self, n: usize) -> Option<String> {
        match self.parser.peek_nth_token(n).token {
            Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_ascii_uppercase()),
            _ => None,
        }
    }

    fn peek_word(&self) -> Option<String> {
        self.peek_nth_word(0)
    }

    fn peek_word_is(&self, word: &str) -> bool {
        self.peek_word().is_some_and(|w| w == word)
    }

    /// Consume the next token if it is `word`.
    fn parse_word(&mut self, word: &str) -> bool {
        if self.peek_word_is(word) {
            self.parser.next_token();
            true
        } else {
            false
        }
    }

    /// Consume a sequence of words, or nothing if any of them is missing.
    fn parse_words(&mut self, words: &[&str]) -> bool {
        let all = words
            .iter()
            .enumerate()
            .all(|(n, word)| self.peek_nth_word(n).is_some_and(|w| w == *word));
        if all {
            for _ in words {
                self.parser.next_token();
            }
        }
        all
    }

    fn parse_one_of_words(&mut self, words: &[&str]) -> Option<String> {
        let word = self.peek_word()?;
        if words.contains(&word.as_str()) {
            self.parser.next_token();
            Some(word)
        } else {
            None
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), ParserError> {
        if self.parse_word(word) {
            Ok(())
        } else {
            self.expected(word, self.parser.peek_token().token)
        }
    }

    fn expect_words(&mut self, words: &[&str]) -> Result<(), ParserError> {
        for word in words {
            self.expect_word(word)?;
        }
        Ok(())
    }

    /// Skip an `=` if present.
    fn parse_optional_eq(&mut self) {
        let _ = self.parser.consume_token(&Token::Eq);
    }

    fn parse_if_not_exists(&mut self) -> bool {
        self.parse_words(&["IF", "NOT", "EXISTS"])
    }

    fn parse_if_exists(&mut self) -> bool {
        self.parse_words(&["IF", "EXISTS"])
    }

    /// A bare word or a quoted string, e.g. a character set name.
    fn parse_name_or_string(&mut self) -> Result<String, ParserError> {
        match self.parser.next_token().token {
            Token::Word(w) => Ok(w.value),
            Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => Ok(s),
            other => self.expected("name", other),
        }
    }

    fn parse_string(&mut self) -> Result<String, ParserError> {
        match self.parser.next_token().token {
            Token::SingleQuotedString(s)
            | Token::DoubleQuotedString(s)
            | Token::NationalStringLiteral(s) => Ok(s),
            other => self.expected("string literal", other),
        }
    }

    fn parse_number(&mut self) -> Result<String, ParserError> {
        match self.parser.next_token().token {
            Token::Number(n, _) => Ok(n),
            other => self.expected("number", other),
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), ParserError> {
        if self.parser.consume_token(&Token::SemiColon) {
            Ok(())
        } else {
            self.expected("';'", self.parser.peek_token().token)
        }
    }

    /// Parse one statement, dispatching on its leading keyword.
    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        if let (Token::Word(_), Token::Colon) = (
            self.parser.peek_nth_token(0).token,
            self.parser.peek_nth_token(1).token,
        ) {
            return self.parse_labeled_statement();
        }

        let Some(word) = self.peek_word() else {
            return match self.parser.peek_token().token {
                Token::LParen => self.parse_query_statement(),
                _ => self.parse_fallback(),
            };
        };

        match word.as_str() {
            "SELECT" | "VALUES" | "TABLE" => self.parse_query_statement(),
            "WITH" => self.parse_with_statement(),
            "INSERT" | "REPLACE" => self.parse_insert(None),
            "UPDATE" => self.parse_update(None),
            "DELETE" => self.parse_delete(None),
            "LOAD" => self.parse_load_data(),
            "CREATE" => self.parse_create(),
            "ALTER" => self.parse_alter(),
            "DROP" => self.parse_drop(),
            "RENAME" => self.parse_rename(),
            "TRUNCATE" => self.parse_truncate(),
            "ANALYZE" => self.parse_analyze(),
            "BEGIN" => self.parse_begin(None),
            "IF" => self.parse_if(),
            "CASE" => self.parse_case(),
            "LOOP" | "REPEAT" | "WHILE" => self.parse_loop(None),
            "LEAVE" | "ITERATE" => self.parse_leave_iterate(),
            "DECLARE" => self.parse_declare(),
            "OPEN" | "CLOSE" | "FETCH" => self.parse_cursor_statement(),
            "SIGNAL" => self.parse_signal(),
            "CALL" => self.parse_call(),
            "SET" => self.parse_set(),
            "USE" => self.parse_use(),
            "START" => self.parse_start(),
            "COMMIT" | "ROLLBACK" | "SAVEPOINT" | "RELEASE" => self.parse_transaction(),
            "PREPARE" | "EXECUTE" | "DEALLOCATE" => self.parse_prepared(),
            "KILL" => self.parse_kill(),
            "LOCK" | "UNLOCK" => self.parse_lock(),
            "EXPLAIN" | "DESCRIBE" | "DESC" => self.parse_explain(),
            "GRANT" => self.parse_grant(),
            "REVOKE" => self.parse_revoke(),
            "FLUSH" => self.parse_flush(),
            "CHANGE" | "STOP" | "RESET" => self.parse_replication(),
            "SHOW" => self.parse_show(),
            _ => self.parse_fallback(),
        }
    }

    /// Hand the statement to `sqlparser` unchanged.
    fn parse_fallback(&mut self) -> Result<Statement, ParserError> {
        Ok(Statement::Other(Box::new(self.parser.parse_statement()?)))
    }

    fn parse_query_statement(&mut self) -> Result<Statement, ParserError> {
        let start = self.parser.index();
        let query = self.parser.parse_query()?;
        let end = self.parser.index();
        Ok(Statement::Query(self.query_stmt(query, start, end)))
    }

    /// Attach the select options lifted out of tokens `start..end`.
    fn query_stmt(&mut self, query: Box<sql_ast::Query>, start: usize, end: usize) -> QueryStmt {
        let mut selects: Vec<usize> = self
            .options
            .into
            .keys()
            .copied()
            .filter(|idx| (start..end).contains(idx))
            .collect();
        selects.sort_unstable();
        let into = selects
            .first()
            .and_then(|idx| self.options.into.remove(idx))
            .unwrap_or_default();
        let calc_found_rows = self
            .options
            .calc_found_rows
            .iter()
            .any(|idx| (start..end).contains(idx));
        QueryStmt {
            query,
            into,
            calc_found_rows,
        }
    }

    /// `WITH` ahead of INSERT, REPLACE, UPDATE or DELETE. Anything else is a
    /// query.
    fn parse_with_statement(&mut self) -> Result<Statement, ParserError> {
        let with = self.parser.maybe_parse(|p| {
            let with_token = p.expect_keyword(Keyword::WITH)?;
            let recursive = p.parse_keyword(Keyword::RECURSIVE);
            let cte_tables = p.parse_comma_separated(Parser::parse_cte)?;
            match p.peek_token().token {
                Token::Word(w)
                    if ["INSERT", "REPLACE", "UPDATE", "DELETE"]
                        .iter()
                        .any(|kw| is_word(&w, kw)) =>
                {
                    Ok(sql_ast::With {
                        with_token: AttachedToken(with_token),
                        recursive,
                        cte_tables,
                    })
                }
                _ => p.expected("INSERT, REPLACE, UPDATE or DELETE", p.peek_token()),
            }
        })?;

        let Some(with) = with else {
            return self.parse_query_statement();
        };
        match self.peek_word().as_deref() {
            Some("UPDATE") => self.parse_update(Some(with)),
            Some("DELETE") => self.parse_delete(Some(with)),
            _ => self.parse_insert(Some(with)),
        }
    }

    fn parse_insert(&mut self, with: Option<sql_ast::With>) -> Result<Statement, ParserError> {
        let statement = if self.parse_word("REPLACE") {
            self.parser.parse_replace()?
        } else {
            self.expect_word("INSERT")?;
            self.parser.parse_insert()?
        };
        match statement {
            sql_ast::Statement::Insert(insert) => Ok(Statement::Insert {
                with,
                insert: Box::new(insert),
            }),
            other => Err(ParserError::ParserError(format!(
                "Expected INSERT, found: {other}"
            ))),
        }
    }

    fn parse_update(&mut self, with: Option<sql_ast::With>) -> Result<Statement, ParserError> {
        self.expect_word("UPDATE")?;
        self.parse_word("LOW_PRIORITY");
        let ignore = self.parse_word("IGNORE");
        let tables = self
            .parser
            .parse_comma_separated(Parser::parse_table_and_joins)?;
        self.expect_word("SET")?;
        let assignments = self.parser.parse_comma_separated(Parser::parse_assignment)?;
        let selection = if self.parse_word("WHERE") {
            Some(self.parser.parse_expr()?)
        } else {
            None
        };
        let order_by = if self.parse_words(&["ORDER", "BY"]) {
            self.parser
                .parse_comma_separated(Parser::parse_order_by_expr)?
        } else {
            Vec::new()
        };
        let limit = if self.parse_word("LIMIT") {
            Some(self.parser.parse_expr()?)
        } else {
            None
        };
        Ok(Statement::Update(Box::new(UpdateStmt {
            with,
            ignore,
            tables,
            assignments,
            selection,
            order_by,
            limit,
        })))
    }

    fn parse_delete(&mut self, with: Option<sql_ast::With>) -> Result<Statement, ParserError> {
        self.expect_word("DELETE")?;
        while self
            .parse_one_of_words(&["LOW_PRIORITY", "QUICK", "IGNORE"])
            .is_some()
        {}
        match self.parser.parse_delete()? {
            sql_ast::Statement::Delete(delete) => Ok(Statement::Delete {
                with,
                delete: Box::new(delete),
            }),
            other => Err(ParserError::ParserError(format!(
                "Expected DELETE, found: {other}"
            ))),
        }
    }

    /// `LOAD DATA [LOCAL] INFILE 'file' [REPLACE|IGNORE] INTO TABLE t ...`
    fn parse_load_data(&mut self) -> Result<Statement, ParserError> {
        self.expect_words(&["LOAD", "DATA"])?;
        self.parse_one_of_words(&["LOW_PRIORITY", "CONCURRENT"]);
        let local = self.parse_word("LOCAL");
        self.expect_word("INFILE")?;
        let file = self.parse_string()?;
        let duplicates = match self.parse_one_of_words(&["REPLACE", "IGNORE"]).as_deref() {
            Some("REPLACE") => Some(crate::plan::DuplicateHandling::Replace),
            Some(_) => Some(crate::plan::DuplicateHandling::Ignore),
            None => None,
        };
        self.expect_words(&["INTO", "TABLE"])?;
        let table = self.parser.parse_object_name(false)?;
        if self.parse_word("PARTITION") {
            self.parser.expect_token(&Token::LParen)?;
            self.parser.parse_comma_separated(|p| p.parse_identifier(false))?;
            self.parser.expect_token(&Token::RParen)?;
        }
        if self.parse_words(&["CHARACTER", "SET"]) {
            self.parse_name_or_string()?;
        }

        let fields = if self.parse_one_of_words(&["FIELDS", "COLUMNS"]).is_some() {
            let mut fields = crate::plan::FieldsOptions::default();
            loop {
                if self.parse_words(&["TERMINATED", "BY"]) {
                    fields.terminated_by = Some(self.parse_string()?);
                } else if self.parse_words(&["OPTIONALLY", "ENCLOSED", "BY"]) {
                    fields.optionally_enclosed = true;
                    fields.enclosed_by = Some(self.parse_string()?);
                } else if self.parse_words(&["ENCLOSED", "BY"]) {
                    fields.enclosed_by = Some(self.parse_string()?);
                } else if self.parse_words(&["ESCAPED", "BY"]) {
                    fields.escaped_by = Some(self.parse_string()?);
                } else {
                    break;
                }
            }
            Some(fields)
        } else {
            None
        };

        let lines = if self.parse_word("LINES") {
            let mut lines = crate::plan::LinesOptions::default();
            loop {
                if self.parse_words(&["STARTING", "BY"]) {
                    lines.starting_by = Some(self.parse_string()?);
                } else if self.parse_words(&["TERMINATED", "BY"]) {
                    lines.terminated_by = Some(self.parse_string()?);
                } else {
                    break;
                }
            }
            Some(lines)
        } else {
            None
        };

        let ignore_lines = if self.parse_word("IGNORE") {
            let count = self.parser.parse_expr()?;
            if self.parse_one_of_words(&["LINES", "ROWS"]).is_none() {
                return self.expected("LINES or ROWS", self.parser.peek_token().token);
            }
            Some(count)
        } else {
            None
        };

        let columns = if self.parser.consume_token(&Token::LParen) {
            let columns = self
                .parser
                .parse_comma_separated(|p| p.parse_identifier(false))?;
            self.parser.expect_token(&Token::RParen)?;
            columns
        } else {
            Vec::new()
        };

        Ok(Statement::LoadData(Box::new(LoadDataStmt {
            local,
            file,
            duplicates,
            table,
            fields,
            lines,
            ignore_lines,
            columns,
        })))
    }

    /// A column type as written, e.g. `varchar(10) character set utf8mb4`.
    fn parse_column_type(&mut self) -> Result<ColumnType, ParserError> {
        const MULTI_WORD_TYPES: &[&str] = &[
            "double precision",
            "char varying",
            "character varying",
            "national char",
            "national char varying",
            "national character",
            "national character varying",
            "national varchar",
            "nchar varchar",
            "nchar varying",
            "long varchar",
            "long varbinary",
        ];

        let mut name = match self.parser.next_token().token {
            Token::Word(w) => w.value.to_ascii_lowercase(),
            other => return self.expected("column type", other),
        };
        while let Some(next) = self.peek_word() {
            let candidate = format!("{name} {}", next.to_ascii_lowercase());
            let prefix = format!("{candidate} ");
            if MULTI_WORD_TYPES
                .iter()
                .any(|t| *t == candidate || t.starts_with(&prefix))
            {
                self.parser.next_token();
                name = candidate;
            } else {
                break;
            }
        }

        let mut column_type = ColumnType {
            name,
            ..Default::default()
        };
        if self.parser.consume_token(&Token::LParen) {
            if column_type.name == "enum" || column_type.name == "set" {
                loop {
                    column_type.enum_values.push(self.parse_string()?);
                    if !self.parser.consume_token(&Token::Comma) {
                        break;
                    }
                }
            } else {
                column_type.length = Some(self.parse_type_modifier()?);
                if self.parser.consume_token(&Token::Comma) {
                    column_type.scale = Some(self.parse_type_modifier()?);
                }
            }
            self.parser.expect_token(&Token::RParen)?;
        }

        loop {
            if self.parse_word("UNSIGNED") {
                column_type.unsigned = true;
            } else if self.parse_word("SIGNED") {
            } else if self.parse_word("ZEROFILL") {
                column_type.zerofill = true;
            } else if self.parse_word("BINARY") {
                column_type.binary_collate = true;
            } else if self.parse_words(&["CHARACTER", "SET"]) || self.parse_word("CHARSET") {
                column_type.charset = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else if self.parse_word("COLLATE") {
                column_type.collate = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else {
                break;
            }
        }
        Ok(column_type)
    }

    fn parse_type_modifier(&mut self) -> Result<String, ParserError> {
        match self.parser.next_token().token {
            Token::Number(n, _) => Ok(n),
            Token::Word(w) => Ok(w.value.to_ascii_lowercase()),
            other => self.expected("type length", other),
        }
    }

    /// `user`, `'user'@'host'` or `user@host`. A missing host is `%`.
    fn parse_user_name(&mut self) -> Result<crate::plan::UserName, ParserError> {
        let name = self.parse_name_or_string()?;
        // `user@host` joins into one word when the host is bare.
        if let Some((user, host)) = name.split_once('@') {
            if !user.is_empty() {
                return Ok(crate::plan::UserName::new(user, host));
            }
        }
        let host = match self.parser.peek_token().token {
            Token::AtSign => {
                self.parser.next_token();
                self.parse_name_or_string()?
            }
            Token::Word(w) if w.quote_style.is_none() && w.value.starts_with('@') => {
                self.parser.next_token();
                w.value.trim_start_matches('@').to_string()
            }
            _ => "%".to_string(),
        };
        Ok(crate::plan::UserName::new(name, host))
    }

    /// `DEFINER = user`. `CURRENT_USER` is `None`, as is a missing clause.
    fn parse_definer(&mut self) -> Result<Option<String>, ParserError> {
        if !self.parse_word("DEFINER") {
            return Ok(None);
        }
        self.parser.expect_token(&Token::Eq)?;
        if self.parse_word("CURRENT_USER") {
            if self.parser.consume_token(&Token::LParen) {
                self.parser.expect_token(&Token::RParen)?;
            }
            return Ok(None);
        }
        let user = self.parse_user_name()?;
        Ok(Some(format!("`{}`@`{}`", user.name, user.host)))
    }
}

/// Join `@`/`@@` with the word that directly follows, so `@a` and
/// `@@session.x` reach the grammar as identifiers.
fn join_variables(tokens: Vec<TokenWithSpan>) -> Vec<TokenWithSpan> {
    let mut out: Vec<TokenWithSpan> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        let prefix = match &token.token {
            Token::AtSign => "@",
            Token::AtAt => "@@",
            _ => {
                out.push(token);
                continue;
            }
        };
        // A string or word before `@` makes it the host separator of an
        // account name.
        let after_account = prefix == "@"
            && matches!(
                out.last().map(|t| &t.token),
                Some(Token::SingleQuotedString(_))
                    | Some(Token::DoubleQuotedString(_))
                    | Some(Token::Word(_))
            );
        let joined = match iter.peek().map(|t| &t.token) {
            Some(Token::Word(w)) if !after_account => Some(format!("{prefix}{}", w.value)),
            Some(Token::SingleQuotedString(s)) | Some(Token::DoubleQuotedString(s))
                if !after_account =>
            {
                Some(format!("{prefix}{s}"))
            }
            _ => None,
        };
        match joined {
            Some(value) => {
                let end = iter.next().map(|t| t.span.end).unwrap_or(token.span.end);
                out.push(TokenWithSpan::new(
                    Token::make_word(&value, None),
                    sqlparser::tokenizer::Span::new(token.span.start, end),
                ));
            }
            None => out.push(token),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(sql: &str) -> Statement {
        parse_statement(sql).unwrap().unwrap().statement
    }

    #[test]
    fn empty_input() {
        assert_eq!(None, parse_statement("  /* nothing */ ;").unwrap());
    }

    #[test]
    fn select_options_are_lifted() {
        match parse("SELECT SQL_CALC_FOUND_ROWS a INTO @x, y FROM t") {
            Statement::Query(q) => {
                assert_eq!(vec!["@x".to_string(), "y".to_string()], q.into);
                assert!(q.calc_found_rows);
                assert_eq!("SELECT a FROM t", q.query.to_string());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn into_outfile_is_rejected() {
        let err = parse_statement("SELECT a INTO OUTFILE 'x' FROM t").unwrap_err();
        assert_eq!(
            PlanError::unsupported_syntax("select into files is not supported yet"),
            err
        );
    }

    #[test]
    fn insert_into_is_not_lifted() {
        assert!(matches!(
            parse("INSERT INTO t SELECT a FROM b"),
            Statement::Insert { .. }
        ));
    }

    #[test]
    fn placeholders_are_numbered() {
        match parse("SELECT ? + ?") {
            Statement::Query(q) => assert_eq!("SELECT :v1 + :v2", q.query.to_string()),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn variables_are_joined() {
        match parse("SELECT @a, @@session.autocommit") {
            Statement::Query(q) => assert_eq!("SELECT @a, @@session.autocommit", q.query.to_string()),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn select_item_text() {
        let parsed = parse_statement("select 1+1, (select 2)  , a AS b from t")
            .unwrap()
            .unwrap();
        let Statement::Query(q) = &parsed.statement else {
            panic!("expected query");
        };
        let sql_ast::SetExpr::Select(select) = q.query.body.as_ref() else {
            panic!("expected select");
        };
        assert_eq!(Some("1+1"), parsed.source.select_item(select, 0));
        assert_eq!(Some("(select 2)"), parsed.source.select_item(select, 1));
        assert_eq!(Some("a AS b"), parsed.source.select_item(select, 2));
    }

    #[test]
    fn first_statement_and_remainder() {
        let (stmt, consumed, remainder) =
            parse_first_statement("  select 1 ;  select 2; ").unwrap();
        assert!(stmt.is_some());
        assert_eq!("select 1", consumed);
        assert_eq!("  select 2; ", remainder);
    }

    #[test]
    fn trailing_statement_is_an_error() {
        assert!(parse_statement("select 1; select 2").is_err());
    }

    #[test]
    fn mysql_operators() {
        match parse("SELECT a DIV 2, a MOD 3, 1 << 2, a && b, a || b, a XOR b = c") {
            Statement::Query(q) => assert_eq!(
                "SELECT a DIV 2, a % 3, 1 << 2, a AND b, a OR b, a XOR b = c",
                q.query.to_string()
            ),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn column_type() {
        let mut parser = CustomParser::new("national char varying(10) character set utf8mb4 binary").unwrap();
        let ct = parser.parse_column_type().unwrap();
        assert_eq!("national char varying", ct.name);
        assert_eq!(Some("10".to_string()), ct.length);
        assert_eq!(Some("utf8mb4".to_string()), ct.charset);
        assert!(ct.binary_collate);
    }

    #[test]
    fn update_with_order_and_limit() {
        match parse("UPDATE IGNORE t SET a = 1, b = DEFAULT WHERE c > 2 ORDER BY d LIMIT 3") {
            Statement::Update(u) => {
                assert!(u.ignore);
                assert_eq!(2, u.assignments.len());
                assert_eq!(1, u.order_by.len());
                assert!(u.limit.is_some());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn with_before_delete() {
        assert!(matches!(
            parse("WITH c AS (SELECT 1) DELETE FROM t WHERE a IN (SELECT * FROM c)"),
            Statement::Delete { with: Some(_), .. }
        ));
        assert!(matches!(
            parse("WITH c AS (SELECT 1) SELECT * FROM c"),
            Statement::Query(_)
        ));
    }
}
