//! Session, transaction, account, replication and SHOW statements.

use sqlparser::ast::{self as sql_ast, Ident};
use sqlparser::parser::ParserError;
use sqlparser::tokenizer::Token;

use super::ast::*;
use super::CustomParser;
use crate::plan::{
    AccountLimits, Authentication, AuthenticatedUser, KillKind, ObjectType, PasswordOptions,
    Privilege, PrivilegeType, ReplicationOption, ReplicationOptionValue, TlsOptions,
    UnresolvedTable, UserName,
};

/// Words that start a statement EXPLAIN can wrap.
const EXPLAINABLE: &[&str] = &[
    "SELECT", "WITH", "VALUES", "TABLE", "INSERT", "REPLACE", "UPDATE", "DELETE",
];

impl CustomParser<'_> {
    /// Parse a SQL SET statement
    pub(super) fn parse_set(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("SET")?;

        if self.parse_word("NAMES") {
            let charset = self.parse_name_or_string()?;
            let collate = if self.parse_word("COLLATE") {
                Some(self.parse_name_or_string()?)
            } else {
                None
            };
            return Ok(Statement::Set(vec![SetItem::Names { charset, collate }]));
        }
        if self.parse_words(&["CHARACTER", "SET"]) || self.parse_word("CHARSET") {
            let charset = if self.parse_word("DEFAULT") {
                None
            } else {
                Some(self.parse_name_or_string()?)
            };
            return Ok(Statement::Set(vec![SetItem::Charset(charset)]));
        }

        let transaction_scope = match (self.peek_word(), self.peek_nth_word(1)) {
            (Some(w), _) if w == "TRANSACTION" => Some(SetScope::None),
            (Some(w), Some(next)) if next == "TRANSACTION" && w == "GLOBAL" => {
                Some(SetScope::Global)
            }
            (Some(w), Some(next)) if next == "TRANSACTION" && w == "SESSION" => {
                Some(SetScope::Session)
            }
            _ => None,
        };
        if let Some(scope) = transaction_scope {
            if scope != SetScope::None {
                self.parser.next_token();
            }
            self.expect_word("TRANSACTION")?;
            let mut items = Vec::new();
            loop {
                items.push(self.parse_transaction_characteristic(scope)?);
                if !self.parser.consume_token(&Token::Comma) {
                    break;
                }
            }
            return Ok(Statement::Set(items));
        }

        let mut items = Vec::new();
        loop {
            items.push(self.parse_set_variable()?);
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Set(items))
    }

    fn parse_transaction_characteristic(&mut self, scope: SetScope) -> Result<SetItem, ParserError> {
        let mut item = SetItem::Transaction {
            scope,
            isolation: None,
            read_only: None,
        };
        if self.parse_words(&["ISOLATION", "LEVEL"]) {
            let level = if self.parse_words(&["REPEATABLE", "READ"]) {
                "REPEATABLE-READ"
            } else if self.parse_words(&["READ", "COMMITTED"]) {
                "READ-COMMITTED"
            } else if self.parse_words(&["READ", "UNCOMMITTED"]) {
                "READ-UNCOMMITTED"
            } else if self.parse_word("SERIALIZABLE") {
                "SERIALIZABLE"
            } else {
                return self.expected("isolation level", self.parser.peek_token().token);
            };
            if let SetItem::Transaction { isolation, .. } = &mut item {
                *isolation = Some(level.to_string());
            }
        } else if self.parse_words(&["READ", "WRITE"]) {
            if let SetItem::Transaction { read_only, .. } = &mut item {
                *read_only = Some(false);
            }
        } else if self.parse_words(&["READ", "ONLY"]) {
            if let SetItem::Transaction { read_only, .. } = &mut item {
                *read_only = Some(true);
            }
        } else {
            return self.expected("transaction characteristic", self.parser.peek_token().token);
        }
        Ok(item)
    }

    /// `[scope] name {= | :=} value`
    fn parse_set_variable(&mut self) -> Result<SetItem, ParserError> {
        let mut scope = match self
            .parse_one_of_words(&["GLOBAL", "SESSION", "LOCAL", "PERSIST", "PERSIST_ONLY"])
            .as_deref()
        {
            Some("GLOBAL") => Some(SetScope::Global),
            Some("SESSION") | Some("LOCAL") => Some(SetScope::Session),
            Some("PERSIST") => Some(SetScope::Persist),
            Some("PERSIST_ONLY") => Some(SetScope::PersistOnly),
            _ => None,
        };

        let target = self.parser.parse_object_name(false)?;
        let mut parts: Vec<String> = target.0.into_iter().map(|ident| ident.value).collect();
        let first = parts.first().cloned().unwrap_or_default();
        if scope.is_none() {
            if let Some(var) = first.strip_prefix("@@") {
                let var_scope = match var.to_ascii_lowercase().as_str() {
                    "global" if parts.len() > 1 => Some(SetScope::Global),
                    "session" | "local" if parts.len() > 1 => Some(SetScope::Session),
                    "persist" if parts.len() > 1 => Some(SetScope::Persist),
                    "persist_only" if parts.len() > 1 => Some(SetScope::PersistOnly),
                    _ => None,
                };
                match var_scope {
                    Some(s) => {
                        scope = Some(s);
                        parts.remove(0);
                    }
                    None => {
                        scope = Some(SetScope::Session);
                        parts[0] = var.to_string();
                    }
                }
            } else if let Some(var) = first.strip_prefix('@') {
                scope = Some(SetScope::User);
                parts[0] = var.to_string();
            }
        }

        match self.parser.next_token().token {
            Token::Eq | Token::Assignment => {}
            other => return self.expected("= or :=", other),
        }
        let value = self.parse_set_value()?;
        Ok(SetItem::Variable {
            scope: scope.unwrap_or(SetScope::None),
            name: parts.join("."),
            value,
        })
    }

    /// A SET value. Bare ON, OFF and DEFAULT are kept as identifiers.
    fn parse_set_value(&mut self) -> Result<sql_ast::Expr, ParserError> {
        if let Some(word) = self.peek_word() {
            let ends = matches!(
                self.parser.peek_nth_token(1).token,
                Token::Comma | Token::SemiColon | Token::EOF
            );
            if ends && matches!(word.as_str(), "ON" | "OFF" | "DEFAULT" | "ALL") {
                self.parser.next_token();
                return Ok(sql_ast::Expr::Identifier(Ident::new(word)));
            }
        }
        self.parser.parse_expr()
    }

    pub(super) fn parse_use(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("USE")?;
        Ok(Statement::Use(self.parser.parse_identifier(false)?))
    }

    /// START TRANSACTION and START REPLICA.
    pub(super) fn parse_start(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("START")?;
        if self.parse_one_of_words(&["REPLICA", "SLAVE"]).is_some() {
            return Ok(Statement::Replication(ReplicationStmt::Start));
        }
        self.expect_word("TRANSACTION")?;
        let mut read_only = false;
        loop {
            if self.parse_words(&["READ", "ONLY"]) {
                read_only = true;
            } else if self.parse_words(&["READ", "WRITE"]) {
                read_only = false;
            } else if self.parse_words(&["WITH", "CONSISTENT", "SNAPSHOT"]) {
            } else {
                break;
            }
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::StartTransaction { read_only })
    }

    /// COMMIT, ROLLBACK, SAVEPOINT and RELEASE SAVEPOINT.
    pub(super) fn parse_transaction(&mut self) -> Result<Statement, ParserError> {
        if self.parse_word("COMMIT") {
            self.parse_word("WORK");
            return Ok(Statement::Commit);
        }
        if self.parse_word("ROLLBACK") {
            self.parse_word("WORK");
            if self.parse_word("TO") {
                self.parse_word("SAVEPOINT");
                return Ok(Statement::RollbackToSavepoint(
                    self.parser.parse_identifier(false)?,
                ));
            }
            return Ok(Statement::Rollback);
        }
        if self.parse_word("SAVEPOINT") {
            return Ok(Statement::Savepoint(self.parser.parse_identifier(false)?));
        }
        self.expect_words(&["RELEASE", "SAVEPOINT"])?;
        Ok(Statement::ReleaseSavepoint(self.parser.parse_identifier(false)?))
    }

    /// PREPARE, EXECUTE and DEALLOCATE PREPARE.
    pub(super) fn parse_prepared(&mut self) -> Result<Statement, ParserError> {
        if self.parse_word("PREPARE") {
            let name = self.parser.parse_identifier(false)?;
            self.expect_word("FROM")?;
            let source = match self.parser.next_token().token {
                Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => {
                    PrepareSource::Text(s)
                }
                Token::Word(w) if w.quote_style.is_none() && w.value.starts_with('@') => {
                    PrepareSource::UserVariable(w.value.trim_start_matches('@').to_string())
                }
                other => return self.expected("string or user variable", other),
            };
            return Ok(Statement::Prepare { name, source });
        }
        if self.parse_word("EXECUTE") {
            let name = self.parser.parse_identifier(false)?;
            let using = if self.parse_word("USING") {
                self.parser
                    .parse_comma_separated(|p| p.parse_identifier(false))?
                    .into_iter()
                    .map(|ident| ident.value)
                    .collect()
            } else {
                Vec::new()
            };
            return Ok(Statement::Execute { name, using });
        }
        self.expect_word("DEALLOCATE")?;
        self.expect_word("PREPARE")?;
        Ok(Statement::Deallocate(self.parser.parse_identifier(false)?))
    }

    pub(super) fn parse_kill(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("KILL")?;
        let kind = match self.parse_one_of_words(&["CONNECTION", "QUERY"]).as_deref() {
            Some("QUERY") => KillKind::Query,
            _ => KillKind::Connection,
        };
        let id = self.parser.parse_expr()?;
        Ok(Statement::Kill { kind, id })
    }

    /// LOCK TABLES and UNLOCK TABLES.
    pub(super) fn parse_lock(&mut self) -> Result<Statement, ParserError> {
        if self.parse_word("UNLOCK") {
            self.parse_one_of_words(&["TABLES", "TABLE"]);
            return Ok(Statement::UnlockTables);
        }
        self.expect_word("LOCK")?;
        if self.parse_one_of_words(&["TABLES", "TABLE"]).is_none() {
            return self.expected("TABLES", self.parser.peek_token().token);
        }
        let mut locks = Vec::new();
        loop {
            let table = self.parser.parse_object_name(false)?;
            let alias = if self.parse_word("AS") {
                Some(self.parser.parse_identifier(false)?)
            } else if !matches!(
                self.peek_word().as_deref(),
                Some("READ") | Some("WRITE") | Some("LOW_PRIORITY")
            ) {
                Some(self.parser.parse_identifier(false)?)
            } else {
                None
            };
            let write = if self.parse_word("READ") {
                self.parse_word("LOCAL");
                false
            } else {
                self.parse_word("LOW_PRIORITY");
                self.expect_word("WRITE")?;
                true
            };
            locks.push(TableLockDef {
                table,
                alias,
                write,
            });
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::LockTables(locks))
    }

    /// EXPLAIN, DESCRIBE and DESC.
    pub(super) fn parse_explain(&mut self) -> Result<Statement, ParserError> {
        self.parser.next_token();
        let mut format = None;
        loop {
            if self.parse_word("FORMAT") {
                self.parser.expect_token(&Token::Eq)?;
                format = Some(self.parse_name_or_string()?.to_ascii_lowercase());
            } else if self.parse_one_of_words(&["EXTENDED", "PARTITIONS"]).is_some() {
            } else {
                break;
            }
        }

        let explainable = self.parser.peek_token().token == Token::LParen
            || self
                .peek_word()
                .is_some_and(|w| EXPLAINABLE.contains(&w.as_str()));
        if explainable || format.is_some() {
            let statement = self.parse_statement()?;
            return Ok(Statement::Explain {
                format,
                statement: Box::new(statement),
            });
        }

        let table = self.parser.parse_object_name(false)?;
        // `DESCRIBE t col` narrows to one column; the listing is the same.
        if let Token::Word(_) | Token::SingleQuotedString(_) = self.parser.peek_token().token {
            self.parser.next_token();
        }
        Ok(Statement::DescribeTable(table))
    }

    /// `user [, user ...]`
    fn parse_user_list(&mut self) -> Result<Vec<UserName>, ParserError> {
        let mut users = vec![self.parse_user_name()?];
        while self.parser.consume_token(&Token::Comma) {
            users.push(self.parse_user_name()?);
        }
        Ok(users)
    }

    pub(super) fn parse_create_user(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("USER")?;
        let if_not_exists = self.parse_if_not_exists();
        let mut users = Vec::new();
        loop {
            users.push(self.parse_authenticated_user()?);
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }

        let mut stmt = CreateUserStmt {
            if_not_exists,
            users,
            default_roles: Vec::new(),
            tls: None,
            limits: None,
            password_options: None,
            locked: false,
            attribute: None,
        };

        if self.parse_words(&["DEFAULT", "ROLE"]) {
            stmt.default_roles = self.parse_user_list()?;
        }
        if self.parse_word("REQUIRE") {
            stmt.tls = Some(self.parse_tls_options()?);
        }
        if self.parse_word("WITH") {
            let mut limits = AccountLimits::default();
            loop {
                if self.parse_word("MAX_QUERIES_PER_HOUR") {
                    limits.max_queries_per_hour = Some(self.parse_i64()?);
                } else if self.parse_word("MAX_UPDATES_PER_HOUR") {
                    limits.max_updates_per_hour = Some(self.parse_i64()?);
                } else if self.parse_word("MAX_CONNECTIONS_PER_HOUR") {
                    limits.max_connections_per_hour = Some(self.parse_i64()?);
                } else if self.parse_word("MAX_USER_CONNECTIONS") {
                    limits.max_user_connections = Some(self.parse_i64()?);
                } else {
                    break;
                }
            }
            stmt.limits = Some(limits);
        }

        let mut password = PasswordOptions::default();
        let mut has_password_options = false;
        loop {
            if self.parse_words(&["PASSWORD", "EXPIRE"]) {
                if self.parse_word("INTERVAL") {
                    password.expiration_time = Some(self.parse_i64()?);
                    self.expect_word("DAY")?;
                } else {
                    self.parse_one_of_words(&["DEFAULT", "NEVER"]);
                }
            } else if self.parse_words(&["PASSWORD", "HISTORY"]) {
                if !self.parse_word("DEFAULT") {
                    password.history = Some(self.parse_i64()?);
                }
            } else if self.parse_words(&["PASSWORD", "REUSE", "INTERVAL"]) {
                if !self.parse_word("DEFAULT") {
                    password.reuse_interval = Some(self.parse_i64()?);
                    self.expect_word("DAY")?;
                }
            } else if self.parse_words(&["PASSWORD", "REQUIRE", "CURRENT"]) {
                if self.parse_word("OPTIONAL") {
                    password.require_current_optional = true;
                } else {
                    self.parse_word("DEFAULT");
                }
            } else if self.parse_word("FAILED_LOGIN_ATTEMPTS") {
                password.failed_attempts = Some(self.parse_i64()?);
            } else if self.parse_word("PASSWORD_LOCK_TIME") {
                if self.parse_word("UNBOUNDED") {
                    password.lock_time = Some(-1);
                } else {
                    password.lock_time = Some(self.parse_i64()?);
                }
            } else if self.parse_words(&["ACCOUNT", "LOCK"]) {
                stmt.locked = true;
                continue;
            } else if self.parse_words(&["ACCOUNT", "UNLOCK"]) {
                stmt.locked = false;
                continue;
            } else {
                break;
            }
            has_password_options = true;
        }
        if has_password_options {
            stmt.password_options = Some(password);
        }

        if self.parse_word("COMMENT") {
            let comment = self.parse_string()?;
            stmt.attribute = Some(format!("{{\"comment\": \"{comment}\"}}"));
        } else if self.parse_word("ATTRIBUTE") {
            stmt.attribute = Some(self.parse_string()?);
        }

        Ok(Statement::Account(AccountStmt::CreateUser(Box::new(stmt))))
    }

    /// `user [IDENTIFIED [WITH plugin] [BY 'pw' | AS 'identity']]`
    fn parse_authenticated_user(&mut self) -> Result<AuthenticatedUser, ParserError> {
        let user = self.parse_user_name()?;
        let mut identity = String::new();
        let auth = if self.parse_word("IDENTIFIED") {
            let plugin = if self.parse_word("WITH") {
                self.parse_name_or_string()?
            } else {
                String::new()
            };
            let mut password = String::new();
            if self.parse_word("BY") {
                password = self.parse_string()?;
            } else if self.parse_word("AS") {
                identity = self.parse_string()?;
            }
            if self.parse_words(&["AND", "IDENTIFIED"]) {
                return Err(ParserError::ParserError(
                    "multi-factor authentication is not yet supported".to_string(),
                ));
            }
            Some(if plugin == "mysql_native_password" && !password.is_empty() {
                Authentication::NativePassword(password)
            } else if !plugin.is_empty() {
                Authentication::Other { plugin, password }
            } else {
                Authentication::Default(password)
            })
        } else {
            None
        };
        Ok(AuthenticatedUser {
            user,
            identity,
            auth,
        })
    }

    fn parse_tls_options(&mut self) -> Result<TlsOptions, ParserError> {
        let mut tls = TlsOptions::default();
        if self.parse_word("NONE") {
            return Ok(tls);
        }
        loop {
            if self.parse_word("SSL") {
                tls.ssl = true;
            } else if self.parse_word("X509") {
                tls.x509 = true;
            } else if self.parse_word("CIPHER") {
                tls.cipher = self.parse_string()?;
            } else if self.parse_word("ISSUER") {
                tls.issuer = self.parse_string()?;
            } else if self.parse_word("SUBJECT") {
                tls.subject = self.parse_string()?;
            } else {
                return self.expected("TLS option", self.parser.peek_token().token);
            }
            self.parse_word("AND");
            if !matches!(
                self.peek_word().as_deref(),
                Some("SSL") | Some("X509") | Some("CIPHER") | Some("ISSUER") | Some("SUBJECT")
            ) {
                return Ok(tls);
            }
        }
    }

    fn parse_i64(&mut self) -> Result<i64, ParserError> {
        let n = self.parse_number()?;
        n.parse::<i64>()
            .map_err(|e| ParserError::ParserError(format!("invalid integer {n}: {e}")))
    }

    pub(super) fn parse_create_role(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("ROLE")?;
        let if_not_exists = self.parse_if_not_exists();
        let roles = self.parse_user_list()?;
        Ok(Statement::Account(AccountStmt::CreateRole {
            if_not_exists,
            roles,
        }))
    }

    pub(super) fn parse_drop_user(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("USER")?;
        let if_exists = self.parse_if_exists();
        let users = self.parse_user_list()?;
        Ok(Statement::Account(AccountStmt::DropUser { if_exists, users }))
    }

    pub(super) fn parse_drop_role(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("ROLE")?;
        let if_exists = self.parse_if_exists();
        let roles = self.parse_user_list()?;
        Ok(Statement::Account(AccountStmt::DropRole { if_exists, roles }))
    }

    pub(super) fn parse_rename_user(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("USER")?;
        let mut renames = Vec::new();
        loop {
            let from = self.parse_user_name()?;
            self.expect_word("TO")?;
            let to = self.parse_user_name()?;
            renames.push((from, to));
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Account(AccountStmt::RenameUser(renames)))
    }

    /// Whether an ON keyword comes before TO/FROM, which separates privilege
    /// grants from role grants.
    fn privileges_follow(&self) -> bool {
        let mut n = 0;
        let mut depth = 0usize;
        loop {
            match self.parser.peek_nth_token(n).token {
                Token::EOF | Token::SemiColon => return false,
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::Word(w) if depth == 0 && w.quote_style.is_none() => {
                    match w.value.to_ascii_uppercase().as_str() {
                        "ON" => return true,
                        "TO" | "FROM" => return false,
                        _ => {}
                    }
                }
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_privilege(&mut self) -> Result<Privilege, ParserError> {
        let mut words = Vec::new();
        let mut n = 0;
        while let Some(word) = self.peek_nth_word(n) {
            if n > 0 && (word == "ON" || word == "TO" || word == "FROM") {
                break;
            }
            words.push(word);
            n += 1;
            if n == 3 {
                break;
            }
        }

        let mut matched = None;
        for len in (1..=words.len()).rev() {
            if len > 1 && !PrivilegeType::is_multi_word_prefix(&words[0]) && words[0] != "ALL" {
                continue;
            }
            if let Some(kind) = PrivilegeType::from_keywords(&words[..len].join(" ")) {
                matched = Some((kind, len));
                break;
            }
        }

        let (kind, dynamic) = match matched {
            Some((kind, len)) => {
                for _ in 0..len {
                    self.parser.next_token();
                }
                (kind, String::new())
            }
            None => match self.parser.next_token().token {
                Token::Word(w) => (PrivilegeType::Dynamic, w.value.to_ascii_lowercase()),
                other => return self.expected("privilege", other),
            },
        };

        let columns = if self.parser.consume_token(&Token::LParen) {
            let columns = self
                .parser
                .parse_comma_separated(|p| p.parse_identifier(false))?
                .into_iter()
                .map(|ident| ident.value)
                .collect();
            self.parser.expect_token(&Token::RParen)?;
            columns
        } else {
            Vec::new()
        };
        Ok(Privilege {
            kind,
            columns,
            dynamic,
        })
    }

    /// `ON [TABLE | FUNCTION | PROCEDURE] level`
    fn parse_privilege_target(&mut self) -> Result<(ObjectType, PrivilegeLevelDef), ParserError> {
        self.expect_word("ON")?;
        let object_type = match self
            .parse_one_of_words(&["TABLE", "FUNCTION", "PROCEDURE"])
            .as_deref()
        {
            Some("TABLE") => ObjectType::Table,
            Some("FUNCTION") => ObjectType::Function,
            Some(_) => ObjectType::Procedure,
            None => ObjectType::Any,
        };
        let first = self.parse_level_part()?;
        let level = if self.parser.consume_token(&Token::Period) {
            PrivilegeLevelDef {
                database: Some(first),
                object: self.parse_level_part()?,
            }
        } else {
            PrivilegeLevelDef {
                database: None,
                object: first,
            }
        };
        Ok((object_type, level))
    }

    fn parse_level_part(&mut self) -> Result<String, ParserError> {
        match self.parser.next_token().token {
            Token::Mul => Ok("*".to_string()),
            Token::Word(w) => Ok(w.value),
            other => self.expected("privilege level", other),
        }
    }

    fn parse_privileges(&mut self) -> Result<Vec<Privilege>, ParserError> {
        let mut privileges = vec![self.parse_privilege()?];
        while self.parser.consume_token(&Token::Comma) {
            privileges.push(self.parse_privilege()?);
        }
        Ok(privileges)
    }

    /// Parse a SQL GRANT statement
    pub(super) fn parse_grant(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("GRANT")?;
        if self.parse_words(&["PROXY", "ON"]) {
            let on = self.parse_user_name()?;
            self.expect_word("TO")?;
            let to = self.parse_user_list()?;
            let with_grant_option = self.parse_words(&["WITH", "GRANT", "OPTION"]);
            return Ok(Statement::Account(AccountStmt::GrantProxy {
                on,
                to,
                with_grant_option,
            }));
        }

        if !self.privileges_follow() {
            let roles = self.parse_user_list()?;
            self.expect_word("TO")?;
            let to = self.parse_user_list()?;
            let with_admin_option = self.parse_words(&["WITH", "ADMIN", "OPTION"]);
            return Ok(Statement::Account(AccountStmt::GrantRole {
                roles,
                to,
                with_admin_option,
            }));
        }

        let privileges = self.parse_privileges()?;
        let (object_type, level) = self.parse_privilege_target()?;
        self.expect_word("TO")?;
        let to = self.parse_user_list()?;
        let with_grant_option = self.parse_words(&["WITH", "GRANT", "OPTION"]);
        let as_user = if self.parse_word("AS") {
            let user = self.parse_user_name()?;
            let roles = if self.parse_words(&["WITH", "ROLE"]) {
                Some(if self.parse_word("DEFAULT") {
                    RoleSpec::Default
                } else if self.parse_word("NONE") {
                    RoleSpec::None
                } else if self.parse_words(&["ALL", "EXCEPT"]) {
                    RoleSpec::AllExcept(self.parse_user_list()?)
                } else if self.parse_word("ALL") {
                    RoleSpec::All
                } else {
                    RoleSpec::Roles(self.parse_user_list()?)
                })
            } else {
                None
            };
            Some(GrantAsDef { user, roles })
        } else {
            None
        };
        Ok(Statement::Account(AccountStmt::Grant {
            privileges,
            object_type,
            level,
            to,
            with_grant_option,
            as_user,
        }))
    }

    /// Parse a SQL REVOKE statement
    pub(super) fn parse_revoke(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("REVOKE")?;
        self.parse_if_exists();
        if self.parse_words(&["PROXY", "ON"]) {
            let on = self.parse_user_name()?;
            self.expect_word("FROM")?;
            let from = self.parse_user_list()?;
            return Ok(Statement::Account(AccountStmt::RevokeProxy { on, from }));
        }

        let revoke_all = self.peek_word_is("ALL")
            && match self.peek_nth_word(1).as_deref() {
                Some("PRIVILEGES") => self.parser.peek_nth_token(2).token == Token::Comma,
                _ => self.parser.peek_nth_token(1).token == Token::Comma,
            };
        if revoke_all {
            self.parser.next_token();
            self.parse_word("PRIVILEGES");
            self.parser.expect_token(&Token::Comma)?;
            self.expect_words(&["GRANT", "OPTION", "FROM"])?;
            let from = self.parse_user_list()?;
            return Ok(Statement::Account(AccountStmt::RevokeAll { from }));
        }

        if !self.privileges_follow() {
            let roles = self.parse_user_list()?;
            self.expect_word("FROM")?;
            let from = self.parse_user_list()?;
            return Ok(Statement::Account(AccountStmt::RevokeRole { roles, from }));
        }

        let privileges = self.parse_privileges()?;
        let (object_type, level) = self.parse_privilege_target()?;
        self.expect_word("FROM")?;
        let from = self.parse_user_list()?;
        Ok(Statement::Account(AccountStmt::Revoke {
            privileges,
            object_type,
            level,
            from,
        }))
    }

    /// `FLUSH [NO_WRITE_TO_BINLOG | LOCAL] target`
    pub(super) fn parse_flush(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("FLUSH")?;
        let no_write_to_binlog = self
            .parse_one_of_words(&["NO_WRITE_TO_BINLOG", "LOCAL"])
            .is_some();
        let mut words = Vec::new();
        while let Token::Word(w) = self.parser.peek_token().token {
            words.push(w.value.to_ascii_uppercase());
            self.parser.next_token();
        }
        if words.is_empty() {
            return self.expected("FLUSH option", self.parser.peek_token().token);
        }
        Ok(Statement::Account(AccountStmt::Flush {
            target: words.join(" "),
            no_write_to_binlog,
        }))
    }

    /// CHANGE REPLICATION ..., STOP REPLICA and RESET REPLICA.
    pub(super) fn parse_replication(&mut self) -> Result<Statement, ParserError> {
        if self.parse_word("STOP") {
            if self.parse_one_of_words(&["REPLICA", "SLAVE"]).is_none() {
                return self.expected("REPLICA", self.parser.peek_token().token);
            }
            return Ok(Statement::Replication(ReplicationStmt::Stop));
        }
        if self.parse_word("RESET") {
            if self.parse_one_of_words(&["REPLICA", "SLAVE"]).is_none() {
                return self.expected("REPLICA", self.parser.peek_token().token);
            }
            let all = self.parse_word("ALL");
            return Ok(Statement::Replication(ReplicationStmt::Reset { all }));
        }

        self.expect_words(&["CHANGE", "REPLICATION"])?;
        let source = if self.parse_words(&["SOURCE", "TO"]) {
            true
        } else if self.parse_word("FILTER") {
            false
        } else {
            return self.expected("SOURCE TO or FILTER", self.parser.peek_token().token);
        };
        let mut options = Vec::new();
        loop {
            let name = match self.parser.next_token().token {
                Token::Word(w) => w.value.to_ascii_uppercase(),
                other => return self.expected("replication option", other),
            };
            self.parser.expect_token(&Token::Eq)?;
            let value = match self.parser.peek_token().token {
                Token::LParen => {
                    self.parser.next_token();
                    let mut tables = Vec::new();
                    if !self.parser.consume_token(&Token::RParen) {
                        loop {
                            let name = self.parser.parse_object_name(false)?;
                            tables.push(object_name_to_table(&name));
                            if !self.parser.consume_token(&Token::Comma) {
                                break;
                            }
                        }
                        self.parser.expect_token(&Token::RParen)?;
                    }
                    ReplicationOptionValue::Tables(tables)
                }
                Token::Number(_, _) => ReplicationOptionValue::Integer(self.parse_i64()?),
                _ => ReplicationOptionValue::Text(self.parse_string()?),
            };
            options.push(ReplicationOption { name, value });
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Replication(if source {
            ReplicationStmt::ChangeSource(options)
        } else {
            ReplicationStmt::ChangeFilter(options)
        }))
    }

    /// `LIKE 'pattern'` or `WHERE expr`
    fn parse_show_filter(&mut self) -> Result<Option<ShowFilter>, ParserError> {
        if self.parse_word("LIKE") {
            Ok(Some(ShowFilter::Like(self.parse_string()?)))
        } else if self.parse_word("WHERE") {
            Ok(Some(ShowFilter::Where(self.parser.parse_expr()?)))
        } else {
            Ok(None)
        }
    }

    /// `[{FROM | IN} db]`
    fn parse_show_database(&mut self) -> Result<Option<Ident>, ParserError> {
        if self.parse_one_of_words(&["FROM", "IN"]).is_some() {
            Ok(Some(self.parser.parse_identifier(false)?))
        } else {
            Ok(None)
        }
    }

    /// Parse a SQL SHOW statement
    pub(super) fn parse_show(&mut self) -> Result<Statement, ParserError> {
        self.expect_word("SHOW")?;
        let full = self.parse_word("FULL");
        let scope = self.parse_one_of_words(&["GLOBAL", "SESSION", "LOCAL"]);
        let global = scope.as_deref() == Some("GLOBAL");

        let Some(word) = self.peek_word() else {
            return self.expected("SHOW form", self.parser.peek_token().token);
        };
        let show = match word.as_str() {
            "PROCESSLIST" => {
                self.parser.next_token();
                ShowStmt::ProcessList
            }
            "CREATE" => {
                self.parser.next_token();
                match self.parse_one_of_words(&[
                    "TABLE", "VIEW", "DATABASE", "SCHEMA", "TRIGGER", "PROCEDURE", "EVENT",
                ]) {
                    Some(kind) if kind == "TABLE" || kind == "VIEW" => ShowStmt::CreateTable {
                        name: self.parser.parse_object_name(false)?,
                        is_view: kind == "VIEW",
                    },
                    Some(kind) if kind == "DATABASE" || kind == "SCHEMA" => {
                        let if_not_exists = self.parse_if_not_exists();
                        ShowStmt::CreateDatabase {
                            name: self.parser.parse_identifier(false)?,
                            if_not_exists,
                        }
                    }
                    Some(kind) => ShowStmt::CreateRoutine {
                        kind: match kind.as_str() {
                            "TRIGGER" => RoutineKind::Trigger,
                            "PROCEDURE" => RoutineKind::Procedure,
                            _ => RoutineKind::Event,
                        },
                        name: self.parser.parse_object_name(false)?,
                    },
                    None => ShowStmt::Unsupported(format!("CREATE {}", self.rest_of_statement())),
                }
            }
            "TRIGGERS" => {
                self.parser.next_token();
                ShowStmt::Triggers {
                    database: self.parse_show_database()?,
                    filter: self.parse_show_filter()?,
                }
            }
            "EVENTS" => {
                self.parser.next_token();
                ShowStmt::Events {
                    database: self.parse_show_database()?,
                    filter: self.parse_show_filter()?,
                }
            }
            "PROCEDURE" | "FUNCTION" if self.peek_nth_word(1).as_deref() == Some("STATUS") => {
                self.parser.next_token();
                self.parser.next_token();
                ShowStmt::RoutineStatus {
                    function: word == "FUNCTION",
                    filter: self.parse_show_filter()?,
                }
            }
            "TABLE" if self.peek_nth_word(1).as_deref() == Some("STATUS") => {
                self.parser.next_token();
                self.parser.next_token();
                ShowStmt::TableStatus {
                    database: self.parse_show_database()?,
                    filter: self.parse_show_filter()?,
                }
            }
            "INDEX" | "INDEXES" | "KEYS" => {
                self.parser.next_token();
                if self.parse_one_of_words(&["FROM", "IN"]).is_none() {
                    return self.expected("FROM", self.parser.peek_token().token);
                }
                let table = self.parser.parse_object_name(false)?;
                let database = self.parse_show_database()?;
                // The WHERE filter is accepted and has no plan.
                self.parse_show_filter()?;
                ShowStmt::Indexes { table, database }
            }
            "VARIABLES" => {
                self.parser.next_token();
                ShowStmt::Variables {
                    global,
                    filter: self.parse_show_filter()?,
                }
            }
            "TABLES" => {
                self.parser.next_token();
                ShowStmt::Tables {
                    full,
                    database: self.parse_show_database()?,
                    filter: self.parse_show_filter()?,
                }
            }
            "DATABASES" | "SCHEMAS" => {
                self.parser.next_token();
                ShowStmt::Databases {
                    filter: self.parse_show_filter()?,
                }
            }
            "COLUMNS" | "FIELDS" => {
                self.parser.next_token();
                if self.parse_one_of_words(&["FROM", "IN"]).is_none() {
                    return self.expected("FROM", self.parser.peek_token().token);
                }
                ShowStmt::Columns {
                    full,
                    table: self.parser.parse_object_name(false)?,
                    database: self.parse_show_database()?,
                    filter: self.parse_show_filter()?,
                }
            }
            "WARNINGS" => {
                self.parser.next_token();
                let (offset, limit) = if self.parse_word("LIMIT") {
                    let first = self.parser.parse_expr()?;
                    if self.parser.consume_token(&Token::Comma) {
                        (Some(first), Some(self.parser.parse_expr()?))
                    } else {
                        (None, Some(first))
                    }
                } else {
                    (None, None)
                };
                ShowStmt::Warnings { offset, limit }
            }
            "COLLATION" => {
                self.parser.next_token();
                ShowStmt::Collation {
                    filter: self.parse_show_filter()?,
                }
            }
            "CHARSET" | "CHARACTER" => {
                if !self.parse_words(&["CHARACTER", "SET"]) {
                    self.parser.next_token();
                }
                ShowStmt::Charset {
                    filter: self.parse_show_filter()?,
                }
            }
            "ENGINES" | "STORAGE" => {
                self.parse_word("STORAGE");
                self.expect_word("ENGINES")?;
                ShowStmt::Engines
            }
            "STATUS" => {
                self.parser.next_token();
                ShowStmt::Status {
                    global,
                    filter: self.parse_show_filter()?,
                }
            }
            "REPLICA" | "SLAVE" if self.peek_nth_word(1).as_deref() == Some("STATUS") => {
                self.parser.next_token();
                self.parser.next_token();
                ShowStmt::ReplicaStatus
            }
            "GRANTS" => {
                self.parser.next_token();
                let (user, using) = if self.parse_word("FOR") {
                    let user = self.parse_user_name()?;
                    let using = if self.parse_word("USING") {
                        self.parse_user_list()?
                    } else {
                        Vec::new()
                    };
                    (Some(user), using)
                } else {
                    (None, Vec::new())
                };
                return Ok(Statement::Account(AccountStmt::ShowGrants { user, using }));
            }
            "PRIVILEGES" => {
                self.parser.next_token();
                return Ok(Statement::Account(AccountStmt::ShowPrivileges));
            }
            _ => ShowStmt::Unsupported(self.rest_of_statement()),
        };
        Ok(Statement::Show(show))
    }

    /// Consume the remaining tokens of the statement, returning their text.
    fn rest_of_statement(&mut self) -> String {
        let start = self.next_token_start();
        while !matches!(
            self.parser.peek_token().token,
            Token::EOF | Token::SemiColon
        ) {
            self.parser.next_token();
        }
        self.text(start, self.prev_token_end().max(start)).to_string()
    }
}

/// `db.tbl` or `tbl` as an unresolved table.
pub(crate) fn object_name_to_table(name: &sql_ast::ObjectName) -> UnresolvedTable {
    match name.0.as_slice() {
        [db, table] => UnresolvedTable::new(db.value.clone(), table.value.clone()),
        parts => UnresolvedTable::new(
            "",
            parts.last().map(|p| p.value.clone()).unwrap_or_default(),
        ),
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
    fn set_scopes() {
        let Statement::Set(items) =
            parse("SET @a = 1, @@global.max_connections = 10, SESSION sql_mode = 'x', autocommit = ON")
        else {
            panic!("expected set");
        };
        let scopes: Vec<_> = items
            .iter()
            .map(|item| match item {
                SetItem::Variable { scope, name, .. } => (*scope, name.clone()),
                other => panic!("unexpected item: {other:?}"),
            })
            .collect();
        assert_eq!(
            vec![
                (SetScope::User, "a".to_string()),
                (SetScope::Global, "max_connections".to_string()),
                (SetScope::Session, "sql_mode".to_string()),
                (SetScope::None, "autocommit".to_string()),
            ],
            scopes
        );
    }

    #[test]
    fn set_transaction() {
        assert_eq!(
            Statement::Set(vec![SetItem::Transaction {
                scope: SetScope::Global,
                isolation: Some("READ-COMMITTED".to_string()),
                read_only: None,
            }]),
            parse("SET GLOBAL TRANSACTION ISOLATION LEVEL READ COMMITTED")
        );
    }

    #[test]
    fn account_names() {
        let Statement::Account(AccountStmt::DropUser { users, .. }) =
            parse("DROP USER 'a'@'localhost', b, `c`@`%`")
        else {
            panic!("expected drop user");
        };
        assert_eq!(
            vec![
                UserName::new("a", "localhost"),
                UserName::new("b", "%"),
                UserName::new("c", "%"),
            ],
            users
        );
    }

    #[test]
    fn create_user_options() {
        let Statement::Account(AccountStmt::CreateUser(stmt)) = parse(
            "CREATE USER IF NOT EXISTS 'u'@'h' IDENTIFIED WITH mysql_native_password BY 'pw' \
             REQUIRE SSL WITH MAX_QUERIES_PER_HOUR 5 PASSWORD HISTORY 3 ACCOUNT LOCK",
        ) else {
            panic!("expected create user");
        };
        assert!(stmt.if_not_exists);
        assert_eq!(
            Some(Authentication::NativePassword("pw".to_string())),
            stmt.users[0].auth
        );
        assert!(stmt.tls.unwrap().ssl);
        assert_eq!(Some(5), stmt.limits.unwrap().max_queries_per_hour);
        assert_eq!(Some(3), stmt.password_options.unwrap().history);
        assert!(stmt.locked);
    }

    #[test]
    fn grant_forms() {
        let Statement::Account(AccountStmt::Grant {
            privileges, level, ..
        }) = parse("GRANT SELECT (a, b), CREATE TEMPORARY TABLES, BACKUP_ADMIN ON db.* TO u")
        else {
            panic!("expected grant");
        };
        assert_eq!(PrivilegeType::Select, privileges[0].kind);
        assert_eq!(vec!["a".to_string(), "b".to_string()], privileges[0].columns);
        assert_eq!(PrivilegeType::CreateTemporaryTables, privileges[1].kind);
        assert_eq!(PrivilegeType::Dynamic, privileges[2].kind);
        assert_eq!("backup_admin", privileges[2].dynamic);
        assert_eq!(
            PrivilegeLevelDef {
                database: Some("db".to_string()),
                object: "*".to_string(),
            },
            level
        );
        assert!(matches!(
            parse("GRANT r1, r2 TO u WITH ADMIN OPTION"),
            Statement::Account(AccountStmt::GrantRole { with_admin_option: true, .. })
        ));
    }

    #[test]
    fn revoke_forms() {
        assert!(matches!(
            parse("REVOKE ALL PRIVILEGES, GRANT OPTION FROM u"),
            Statement::Account(AccountStmt::RevokeAll { .. })
        ));
        assert!(matches!(
            parse("REVOKE ALL ON *.* FROM u"),
            Statement::Account(AccountStmt::Revoke { .. })
        ));
        assert!(matches!(
            parse("REVOKE r FROM u"),
            Statement::Account(AccountStmt::RevokeRole { .. })
        ));
    }

    #[test]
    fn explain_and_describe() {
        assert!(matches!(
            parse("EXPLAIN FORMAT=tree SELECT 1"),
            Statement::Explain { format: Some(f), .. } if f == "tree"
        ));
        assert!(matches!(parse("DESCRIBE t"), Statement::DescribeTable(_)));
    }

    #[test]
    fn show_forms() {
        assert!(matches!(
            parse("SHOW FULL TABLES FROM db LIKE 'a%'"),
            Statement::Show(ShowStmt::Tables { full: true, database: Some(_), filter: Some(ShowFilter::Like(_)) })
        ));
        assert!(matches!(
            parse("SHOW WARNINGS LIMIT 1, 2"),
            Statement::Show(ShowStmt::Warnings { offset: Some(_), limit: Some(_) })
        ));
        assert_eq!(
            Statement::Show(ShowStmt::Unsupported("OPEN TABLES".to_string())),
            parse("SHOW OPEN TABLES")
        );
    }

    #[test]
    fn replication() {
        let Statement::Replication(ReplicationStmt::ChangeFilter(options)) =
            parse("CHANGE REPLICATION FILTER REPLICATE_IGNORE_TABLE = (db.t1, db.t2)")
        else {
            panic!("expected replication filter");
        };
        assert_eq!(
            ReplicationOptionValue::Tables(vec![
                UnresolvedTable::new("db", "t1"),
                UnresolvedTable::new("db", "t2"),
            ]),
            options[0].value
        );
        assert_eq!(
            Statement::Replication(ReplicationStmt::Reset { all: true }),
            parse("RESET REPLICA ALL")
        );
    }
}
