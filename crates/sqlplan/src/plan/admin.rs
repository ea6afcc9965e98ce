//! Session, transaction, account and replication statements.

use std::fmt;

use super::{LogicalPlan, UnresolvedTable};
use crate::explain::{ExplainEntry, Explainable};
use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    /// One set-field expression per assignment, in statement order.
    pub exprs: Vec<Expr>,
}

impl Explainable for Set {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Set").with_values("exprs", &self.exprs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    pub database: String,
}

impl Explainable for Use {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Use").with_value("database", &self.database)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTransaction {
    pub read_only: bool,
}

impl Explainable for StartTransaction {
    fn explain_entry(&self) -> ExplainEntry {
        let mode = if self.read_only { "READ ONLY" } else { "READ WRITE" };
        ExplainEntry::new("StartTransaction").with_value("mode", mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
    pub name: String,
}

impl Savepoint {
    pub fn entry(&self, node: &str) -> ExplainEntry {
        ExplainEntry::new(node).with_value("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prepare {
    pub name: String,
    pub child: Box<LogicalPlan>,
}

impl Explainable for Prepare {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Prepare").with_value("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Execute {
    pub name: String,
    /// `@x` arguments are user variables, bare names are procedure parameters.
    pub args: Vec<Expr>,
}

impl Explainable for Execute {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("Execute").with_value("name", &self.name);
        if self.args.is_empty() {
            ent
        } else {
            ent.with_values("using", &self.args)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deallocate {
    pub name: String,
}

impl Explainable for Deallocate {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Deallocate").with_value("name", &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillKind {
    Connection,
    Query,
}

impl fmt::Display for KillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "CONNECTION"),
            Self::Query => write!(f, "QUERY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kill {
    pub kind: KillKind,
    pub connection_id: u32,
}

impl Explainable for Kill {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Kill")
            .with_value("kind", self.kind)
            .with_value("id", self.connection_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLock {
    /// The table, possibly under an alias.
    pub table: LogicalPlan,
    pub write: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LockTables {
    pub locks: Vec<TableLock>,
}

impl Explainable for LockTables {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("LockTables").with_values(
            "modes",
            self.locks
                .iter()
                .map(|l| if l.write { "WRITE" } else { "READ" }),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPrivileges {
    pub write_to_binlog: bool,
}

impl Explainable for FlushPrivileges {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("FlushPrivileges")
    }
}

/// `'user'@'host'`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName {
    pub name: String,
    pub host: String,
    /// The host is the wildcard `%`.
    pub any_host: bool,
}

impl UserName {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        let any_host = host == "%";
        UserName {
            name: name.into(),
            host,
            any_host,
        }
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.any_host {
            write!(f, "'{}'@'%'", self.name)
        } else {
            write!(f, "'{}'@'{}'", self.name, self.host)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// Password for the default plugin, possibly empty.
    Default(String),
    NativePassword(String),
    Other { plugin: String, password: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user: UserName,
    pub identity: String,
    pub auth: Option<Authentication>,
}

impl fmt::Display for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TlsOptions {
    pub ssl: bool,
    pub x509: bool,
    pub cipher: String,
    pub issuer: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountLimits {
    pub max_queries_per_hour: Option<i64>,
    pub max_updates_per_hour: Option<i64>,
    pub max_connections_per_hour: Option<i64>,
    pub max_user_connections: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasswordOptions {
    pub require_current_optional: bool,
    pub expiration_time: Option<i64>,
    pub history: Option<i64>,
    pub reuse_interval: Option<i64>,
    pub failed_attempts: Option<i64>,
    pub lock_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub if_not_exists: bool,
    pub users: Vec<AuthenticatedUser>,
    pub default_roles: Vec<UserName>,
    pub tls: Option<TlsOptions>,
    pub limits: Option<AccountLimits>,
    pub password_options: Option<PasswordOptions>,
    pub locked: bool,
    pub attribute: String,
}

impl Explainable for CreateUser {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("CreateUser")
            .with_values("users", &self.users)
            .with_flag("if_not_exists", self.if_not_exists)
            .with_flag("locked", self.locked);
        if self.default_roles.is_empty() {
            ent
        } else {
            ent.with_values("default_roles", &self.default_roles)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameUser {
    pub from: Vec<UserName>,
    pub to: Vec<UserName>,
}

impl Explainable for RenameUser {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("RenameUser")
            .with_values("from", &self.from)
            .with_values("to", &self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropUser {
    pub if_exists: bool,
    pub users: Vec<UserName>,
}

impl Explainable for DropUser {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DropUser")
            .with_values("users", &self.users)
            .with_flag("if_exists", self.if_exists)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRole {
    pub if_not_exists: bool,
    pub roles: Vec<UserName>,
}

impl Explainable for CreateRole {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("CreateRole")
            .with_values("roles", &self.roles)
            .with_flag("if_not_exists", self.if_not_exists)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRole {
    pub if_exists: bool,
    pub roles: Vec<UserName>,
}

impl Explainable for DropRole {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("DropRole")
            .with_values("roles", &self.roles)
            .with_flag("if_exists", self.if_exists)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegeType {
    All,
    Alter,
    AlterRoutine,
    Create,
    CreateRole,
    CreateRoutine,
    CreateTablespace,
    CreateTemporaryTables,
    CreateUser,
    CreateView,
    Delete,
    Drop,
    DropRole,
    Event,
    Execute,
    File,
    GrantOption,
    Index,
    Insert,
    LockTables,
    Process,
    References,
    Reload,
    ReplicationClient,
    ReplicationSlave,
    Select,
    ShowDatabases,
    ShowView,
    Shutdown,
    Super,
    Trigger,
    Update,
    Usage,
    Dynamic,
}

impl PrivilegeType {
    /// Match a static privilege by its keywords, joined by single spaces.
    pub fn from_keywords(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "ALL" | "ALL PRIVILEGES" => Self::All,
            "ALTER" => Self::Alter,
            "ALTER ROUTINE" => Self::AlterRoutine,
            "CREATE" => Self::Create,
            "CREATE ROLE" => Self::CreateRole,
            "CREATE ROUTINE" => Self::CreateRoutine,
            "CREATE TABLESPACE" => Self::CreateTablespace,
            "CREATE TEMPORARY TABLES" => Self::CreateTemporaryTables,
            "CREATE USER" => Self::CreateUser,
            "CREATE VIEW" => Self::CreateView,
            "DELETE" => Self::Delete,
            "DROP" => Self::Drop,
            "DROP ROLE" => Self::DropRole,
            "EVENT" => Self::Event,
            "EXECUTE" => Self::Execute,
            "FILE" => Self::File,
            "GRANT OPTION" => Self::GrantOption,
            "INDEX" => Self::Index,
            "INSERT" => Self::Insert,
            "LOCK TABLES" => Self::LockTables,
            "PROCESS" => Self::Process,
            "REFERENCES" => Self::References,
            "RELOAD" => Self::Reload,
            "REPLICATION CLIENT" => Self::ReplicationClient,
            "REPLICATION SLAVE" => Self::ReplicationSlave,
            "SELECT" => Self::Select,
            "SHOW DATABASES" => Self::ShowDatabases,
            "SHOW VIEW" => Self::ShowView,
            "SHUTDOWN" => Self::Shutdown,
            "SUPER" => Self::Super,
            "TRIGGER" => Self::Trigger,
            "UPDATE" => Self::Update,
            "USAGE" => Self::Usage,
            _ => return None,
        })
    }

    /// Privileges whose name is more than one keyword start with one of these.
    pub fn is_multi_word_prefix(word: &str) -> bool {
        matches!(
            word.to_ascii_uppercase().as_str(),
            "ALTER" | "CREATE" | "DROP" | "GRANT" | "LOCK" | "REPLICATION" | "SHOW"
        )
    }
}

impl fmt::Display for PrivilegeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "ALL",
            Self::Alter => "ALTER",
            Self::AlterRoutine => "ALTER ROUTINE",
            Self::Create => "CREATE",
            Self::CreateRole => "CREATE ROLE",
            Self::CreateRoutine => "CREATE ROUTINE",
            Self::CreateTablespace => "CREATE TABLESPACE",
            Self::CreateTemporaryTables => "CREATE TEMPORARY TABLES",
            Self::CreateUser => "CREATE USER",
            Self::CreateView => "CREATE VIEW",
            Self::Delete => "DELETE",
            Self::Drop => "DROP",
            Self::DropRole => "DROP ROLE",
            Self::Event => "EVENT",
            Self::Execute => "EXECUTE",
            Self::File => "FILE",
            Self::GrantOption => "GRANT OPTION",
            Self::Index => "INDEX",
            Self::Insert => "INSERT",
            Self::LockTables => "LOCK TABLES",
            Self::Process => "PROCESS",
            Self::References => "REFERENCES",
            Self::Reload => "RELOAD",
            Self::ReplicationClient => "REPLICATION CLIENT",
            Self::ReplicationSlave => "REPLICATION SLAVE",
            Self::Select => "SELECT",
            Self::ShowDatabases => "SHOW DATABASES",
            Self::ShowView => "SHOW VIEW",
            Self::Shutdown => "SHUTDOWN",
            Self::Super => "SUPER",
            Self::Trigger => "TRIGGER",
            Self::Update => "UPDATE",
            Self::Usage => "USAGE",
            Self::Dynamic => "DYNAMIC",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    pub kind: PrivilegeType,
    pub columns: Vec<String>,
    /// Name of a dynamic privilege, lowercased.
    pub dynamic: String,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PrivilegeType::Dynamic => write!(f, "{}", self.dynamic.to_ascii_uppercase())?,
            kind => write!(f, "{kind}")?,
        }
        if !self.columns.is_empty() {
            write!(f, " ({})", self.columns.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectType {
    #[default]
    Any,
    Table,
    Function,
    Procedure,
}

/// `db.tbl`, `db.*`, `*.*` or `*`. Empty parts mean the current database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeLevel {
    pub database: String,
    pub table_routine: String,
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.database.is_empty() {
            write!(f, "{}", self.table_routine)
        } else {
            write!(f, "{}.{}", self.database, self.table_routine)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAssumptionKind {
    Default,
    None,
    All,
    AllExcept,
    Roles,
}

/// `AS user [WITH ROLE ...]` on a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantUserAssumption {
    pub kind: UserAssumptionKind,
    pub user: UserName,
    pub roles: Vec<UserName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub privileges: Vec<Privilege>,
    pub object_type: ObjectType,
    pub level: PrivilegeLevel,
    pub to: Vec<UserName>,
    pub with_grant_option: bool,
    pub as_user: Option<GrantUserAssumption>,
    /// The client issuing the grant.
    pub grantor: String,
}

impl Explainable for Grant {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Grant")
            .with_values("privileges", &self.privileges)
            .with_value("on", &self.level)
            .with_values("to", &self.to)
            .with_flag("with_grant_option", self.with_grant_option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRole {
    pub roles: Vec<UserName>,
    pub to: Vec<UserName>,
    pub with_admin_option: bool,
}

impl Explainable for GrantRole {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("GrantRole")
            .with_values("roles", &self.roles)
            .with_values("to", &self.to)
            .with_flag("with_admin_option", self.with_admin_option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantProxy {
    pub on: UserName,
    pub to: Vec<UserName>,
    pub with_grant_option: bool,
}

impl Explainable for GrantProxy {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("GrantProxy")
            .with_value("on", &self.on)
            .with_values("to", &self.to)
            .with_flag("with_grant_option", self.with_grant_option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revoke {
    pub privileges: Vec<Privilege>,
    pub object_type: ObjectType,
    pub level: PrivilegeLevel,
    pub from: Vec<UserName>,
    pub revoker: String,
}

impl Explainable for Revoke {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("Revoke")
            .with_values("privileges", &self.privileges)
            .with_value("on", &self.level)
            .with_values("from", &self.from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeAll {
    pub from: Vec<UserName>,
}

impl Explainable for RevokeAll {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("RevokeAll").with_values("from", &self.from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRole {
    pub roles: Vec<UserName>,
    pub from: Vec<UserName>,
}

impl Explainable for RevokeRole {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("RevokeRole")
            .with_values("roles", &self.roles)
            .with_values("from", &self.from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeProxy {
    pub on: UserName,
    pub from: Vec<UserName>,
}

impl Explainable for RevokeProxy {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("RevokeProxy")
            .with_value("on", &self.on)
            .with_values("from", &self.from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowGrants {
    /// No `FOR` clause was given and `user` is the client.
    pub current_user: bool,
    pub user: UserName,
    pub using: Vec<UserName>,
}

impl Explainable for ShowGrants {
    fn explain_entry(&self) -> ExplainEntry {
        let ent = ExplainEntry::new("ShowGrants")
            .with_value("for", &self.user)
            .with_flag("current_user", self.current_user);
        if self.using.is_empty() {
            ent
        } else {
            ent.with_values("using", &self.using)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationOptionValue {
    Text(String),
    Integer(i64),
    Tables(Vec<UnresolvedTable>),
}

impl fmt::Display for ReplicationOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Tables(tables) => write!(f, "({})", super::comma_separated(tables)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationOption {
    /// Uppercased option name.
    pub name: String,
    pub value: ReplicationOptionValue,
}

impl fmt::Display for ReplicationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReplicationSource {
    pub options: Vec<ReplicationOption>,
}

impl Explainable for ChangeReplicationSource {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ChangeReplicationSource").with_values("options", &self.options)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReplicationFilter {
    pub options: Vec<ReplicationOption>,
}

impl Explainable for ChangeReplicationFilter {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ChangeReplicationFilter").with_values("options", &self.options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReplica {
    pub all: bool,
}

impl Explainable for ResetReplica {
    fn explain_entry(&self) -> ExplainEntry {
        ExplainEntry::new("ResetReplica").with_flag("all", self.all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_keywords() {
        assert_eq!(
            Some(PrivilegeType::CreateTemporaryTables),
            PrivilegeType::from_keywords("create temporary tables")
        );
        assert_eq!(Some(PrivilegeType::All), PrivilegeType::from_keywords("ALL PRIVILEGES"));
        assert_eq!(None, PrivilegeType::from_keywords("BACKUP_ADMIN"));
    }

    #[test]
    fn user_name_display() {
        assert_eq!("'u'@'%'", UserName::new("u", "%").to_string());
        assert_eq!("'u'@'localhost'", UserName::new("u", "localhost").to_string());
    }
}
