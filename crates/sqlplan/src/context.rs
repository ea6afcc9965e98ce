//! Session services the planner reads from and reports to.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::warn;

use crate::collation::{CharacterSet, Collation};
use crate::errors::{PlanError, Result};
use crate::types::ScalarValue;

/// A non-fatal diagnostic produced while planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub code: u16,
    pub message: String,
}

/// The session a statement is planned for.
///
/// Planning never mutates plan state across calls, the only side effect is
/// reporting warnings.
pub trait SessionContext {
    /// The currently selected database, empty if none.
    fn current_database(&self) -> String;

    /// Read a session scoped system variable.
    fn session_variable(&self, name: &str) -> Result<ScalarValue>;

    /// Read a user defined variable (`@name`). Returns `None` if unset.
    fn user_variable(&self, name: &str) -> Result<Option<ScalarValue>>;

    /// Record a warning.
    fn warn(&self, code: u16, message: String);

    /// Collation of the connection, applied to string literals.
    fn collation(&self) -> Collation {
        match self.session_variable("collation_connection") {
            Ok(ScalarValue::Utf8(name)) => Collation::from_name(&name).unwrap_or_default(),
            _ => Collation::DEFAULT,
        }
    }

    fn character_set(&self) -> CharacterSet {
        self.collation().character_set()
    }

    /// User name of the connected client.
    fn client_user(&self) -> String {
        "root".to_string()
    }

    /// Host the client connected from.
    fn client_address(&self) -> String {
        "localhost".to_string()
    }
}

/// An in-memory session with MySQL defaults.
#[derive(Debug)]
pub struct BasicSessionContext {
    database: String,
    user: String,
    address: String,
    system_vars: HashMap<String, ScalarValue>,
    user_vars: HashMap<String, ScalarValue>,
    warnings: Mutex<Vec<Warning>>,
}

impl Default for BasicSessionContext {
    fn default() -> Self {
        let system_vars = [
            ("group_concat_max_len", ScalarValue::UInt64(1024)),
            (
                "character_set_database",
                ScalarValue::Utf8("utf8mb4".to_string()),
            ),
            (
                "character_set_client",
                ScalarValue::Utf8("utf8mb4".to_string()),
            ),
            (
                "collation_connection",
                ScalarValue::Utf8(Collation::DEFAULT.name().to_string()),
            ),
            ("autocommit", ScalarValue::Int8(1)),
            (
                "transaction_isolation",
                ScalarValue::Utf8("REPEATABLE-READ".to_string()),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        BasicSessionContext {
            database: String::new(),
            user: "root".to_string(),
            address: "localhost".to_string(),
            system_vars,
            user_vars: HashMap::new(),
            warnings: Mutex::new(Vec::new()),
        }
    }
}

impl BasicSessionContext {
    pub fn new(database: impl Into<String>) -> Self {
        BasicSessionContext {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn with_client(mut self, user: impl Into<String>, address: impl Into<String>) -> Self {
        self.user = user.into();
        self.address = address.into();
        self
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = database.into();
    }

    pub fn set_session_variable(&mut self, name: impl Into<String>, value: ScalarValue) {
        self.system_vars
            .insert(name.into().to_ascii_lowercase(), value);
    }

    pub fn set_user_variable(&mut self, name: impl Into<String>, value: ScalarValue) {
        self.user_vars.insert(name.into().to_ascii_lowercase(), value);
    }

    /// Drain accumulated warnings.
    pub fn take_warnings(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.lock())
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }
}

impl SessionContext for BasicSessionContext {
    fn current_database(&self) -> String {
        self.database.clone()
    }

    fn session_variable(&self, name: &str) -> Result<ScalarValue> {
        self.system_vars
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| PlanError::invalid_value(format!("Unknown system variable '{name}'")))
    }

    fn user_variable(&self, name: &str) -> Result<Option<ScalarValue>> {
        Ok(self.user_vars.get(&name.to_ascii_lowercase()).cloned())
    }

    fn warn(&self, code: u16, message: String) {
        warn!(%code, %message, "planner warning");
        self.warnings.lock().push(Warning { code, message });
    }

    fn client_user(&self) -> String {
        self.user.clone()
    }

    fn client_address(&self) -> String {
        self.address.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let ctx = BasicSessionContext::default();
        assert_eq!("", ctx.current_database());
        assert_eq!(
            Some(1024),
            ctx.session_variable("GROUP_CONCAT_MAX_LEN")
                .unwrap()
                .as_u64()
        );
        assert_eq!(Collation::DEFAULT, ctx.collation());
        assert!(ctx.session_variable("nope").is_err());
    }

    #[test]
    fn warnings_accumulate() {
        let ctx = BasicSessionContext::new("db");
        ctx.warn(1235, "first".to_string());
        ctx.warn(0, "second".to_string());
        assert_eq!(2, ctx.warnings().len());
        assert_eq!(1235, ctx.take_warnings()[0].code);
        assert!(ctx.warnings().is_empty());
    }
}
