//! CREATE, ALTER, DROP, RENAME and TRUNCATE of tables, indexes, views,
//! routines, events and databases.

use std::collections::BTreeMap;

use sqlparser::ast::{self, ObjectName};
use tracing::debug;

use super::schema::{IndexKey, index_keys, index_using};
use super::{StatementPlanner, split_object_name, unresolved_table};
use crate::collation::parse_collation;
use crate::errors::{PlanError, Result};
use crate::expr::Expr;
use crate::parser::ast::{
    AlterDatabaseStmt, AlterEventStmt, AlterTableOperation, AlterTableStmt, ColumnDef,
    ColumnKeyOption, CreateDatabaseStmt, CreateEventStmt, CreateIndexStmt, CreateProcedureStmt,
    CreateSpatialRefSysStmt, CreateTableStmt, CreateTriggerStmt, CreateViewStmt,
    DropDatabaseStmt, DropIndexStmt, DropRoutineStmt, DropTableStmt, DropViewStmt,
    EventScheduleDef, IndexDef, IndexKind, RenameTableStmt,
};
use crate::plan::{
    AlterDatabase, AlterEvent, AlterTable, AlterTableAction, Analyze, Block, CreateDatabase,
    CreateEvent, CreateIndex, CreateProcedure, CreateSpatialRefSys, CreateTable, CreateTrigger,
    CreateView, DropDatabase, DropRoutine, DropTable, DropView, EventSchedule, IndexColumn,
    IndexConstraint, IndexDefinition, IndexUsing, LogicalPlan, ProcedureParam, RenameTable,
    ScheduleTimestamp, SrsAttribute, SubqueryAlias, TableSchema, TriggerOrder, TruncateTable,
    UnresolvedTable,
};
use crate::types::DataType;

const ENCRYPTION_WARNING: &str =
    "Setting CHARACTER SET, COLLATION and ENCRYPTION are not supported yet";

/// Rank of a table rename among combined ALTER TABLE actions. Renames run
/// after every other action.
const RENAME_RANK: u8 = 11;

impl StatementPlanner<'_> {
    pub(crate) fn plan_create_table(&self, stmt: &CreateTableStmt) -> Result<LogicalPlan> {
        let table = unresolved_table(&stmt.name)?;

        if let Some(like) = &stmt.like {
            return Ok(LogicalPlan::CreateTable(CreateTable {
                like: Some(unresolved_table(like)?),
                ..self.empty_create_table(table, stmt)
            }));
        }

        let select = stmt
            .select
            .as_ref()
            .map(|q| self.plan_query(q).map(Box::new))
            .transpose()?;

        let Some(spec) = &stmt.spec else {
            if select.is_none() {
                return Err(PlanError::validation("A table must have at least 1 column"));
            }
            return Ok(LogicalPlan::CreateTable(CreateTable {
                select,
                ..self.empty_create_table(table, stmt)
            }));
        };

        let (foreign_keys, checks) = self.plan_constraints(&stmt.name, spec)?;
        let indexes = self.plan_index_defs(spec)?;
        let (schema, collation) = self.plan_schema(spec)?;

        Ok(LogicalPlan::CreateTable(CreateTable {
            table,
            if_not_exists: stmt.if_not_exists,
            temporary: stmt.temporary,
            schema,
            collation: collation.unwrap_or_else(|| self.ctx.collation()),
            comment: String::new(),
            indexes,
            foreign_keys,
            checks,
            like: None,
            select,
        }))
    }

    fn empty_create_table(&self, table: UnresolvedTable, stmt: &CreateTableStmt) -> CreateTable {
        CreateTable {
            table,
            if_not_exists: stmt.if_not_exists,
            temporary: stmt.temporary,
            schema: TableSchema::default(),
            collation: self.ctx.collation(),
            comment: String::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            like: None,
            select: None,
        }
    }

    /// A single action is returned as is. Several actions are sequenced in a
    /// block in dependency order: column changes, then constraints, then
    /// indexes, then table level settings and finally a rename.
    pub(crate) fn plan_alter_table(&self, stmt: &AlterTableStmt) -> Result<LogicalPlan> {
        let table = unresolved_table(&stmt.name)?;
        let mut plans = stmt
            .operations
            .iter()
            .map(|op| self.plan_alter_operation(&stmt.name, &table, op))
            .collect::<Result<Vec<_>>>()?;

        if plans.len() == 1 {
            return Ok(plans.remove(0));
        }
        plans.sort_by_key(alter_rank);
        debug!(actions = plans.len(), "sequenced alter table actions");
        Ok(LogicalPlan::Block(Block::new(plans)))
    }

    fn plan_alter_operation(
        &self,
        name: &ObjectName,
        table: &UnresolvedTable,
        op: &AlterTableOperation,
    ) -> Result<LogicalPlan> {
        let alter = |action| Ok(LogicalPlan::AlterTable(AlterTable::new(table.clone(), action)));

        match op {
            AlterTableOperation::AddColumns { columns, order } => {
                let def = single_column(name, columns)?;
                let column = self.plan_column(def, false, None)?;
                let plan = LogicalPlan::AlterTable(AlterTable::new(
                    table.clone(),
                    AlterTableAction::AddColumn {
                        column,
                        order: order.clone(),
                    },
                ));
                Ok(unique_column_index(plan, def))
            }
            AlterTableOperation::ModifyColumn {
                name: column_name,
                columns,
                order,
            } => {
                let def = single_column(name, columns)?;
                let column = self.plan_column(def, false, None)?;
                let plan = LogicalPlan::AlterTable(AlterTable::new(
                    table.clone(),
                    AlterTableAction::ModifyColumn {
                        column_name: column_name.value.clone(),
                        column,
                        order: order.clone(),
                    },
                ));
                Ok(unique_column_index(plan, def))
            }
            AlterTableOperation::DropColumn(column) => alter(AlterTableAction::DropColumn {
                name: column.value.clone(),
            }),
            AlterTableOperation::RenameColumn { from, to } => {
                alter(AlterTableAction::RenameColumn {
                    from: from.value.clone(),
                    to: to.value.clone(),
                })
            }
            AlterTableOperation::AddIndex(index) => self.plan_index_action(table, index),
            AlterTableOperation::DropIndex(index) => alter(AlterTableAction::DropIndex {
                name: index.value.clone(),
            }),
            AlterTableOperation::DropPrimaryKey => alter(AlterTableAction::DropPrimaryKey),
            AlterTableOperation::RenameIndex { from, to } => {
                alter(AlterTableAction::RenameIndex {
                    from: from.value.clone(),
                    to: to.value.clone(),
                })
            }
            AlterTableOperation::DisableKeys => {
                alter(AlterTableAction::DisableEnableKeys { disable: true })
            }
            AlterTableOperation::EnableKeys => {
                alter(AlterTableAction::DisableEnableKeys { disable: false })
            }
            AlterTableOperation::AddForeignKey(fk) => {
                alter(AlterTableAction::AddForeignKey(self.plan_foreign_key(name, fk)?))
            }
            AlterTableOperation::AddCheck(check) => {
                alter(AlterTableAction::AddCheck(self.plan_check(check)?))
            }
            AlterTableOperation::DropForeignKey(fk) => alter(AlterTableAction::DropForeignKey {
                name: fk.value.clone(),
            }),
            AlterTableOperation::DropCheck(check) => alter(AlterTableAction::DropCheck {
                name: check.value.clone(),
            }),
            AlterTableOperation::DropConstraint(constraint) => {
                alter(AlterTableAction::DropConstraint {
                    name: constraint.value.clone(),
                })
            }
            AlterTableOperation::SetDefault { column, expr } => {
                alter(AlterTableAction::SetDefault {
                    column: column.value.clone(),
                    default: self.plan_default_value(expr)?,
                })
            }
            AlterTableOperation::DropDefault { column } => alter(AlterTableAction::DropDefault {
                column: column.value.clone(),
            }),
            AlterTableOperation::AutoIncrement(value) => {
                alter(AlterTableAction::AutoIncrement(auto_increment_value(value)?))
            }
            AlterTableOperation::Collation { charset, collate } => {
                alter(AlterTableAction::Collation(parse_collation(
                    charset.as_deref(),
                    collate.as_deref(),
                    false,
                )?))
            }
            AlterTableOperation::Rename(to) => Ok(LogicalPlan::RenameTable(RenameTable {
                from: vec![table.clone()],
                to: vec![unresolved_table(to)?],
                alter_table: true,
            })),
        }
    }

    pub(crate) fn plan_create_index(&self, stmt: &CreateIndexStmt) -> Result<LogicalPlan> {
        let table = unresolved_table(&stmt.table)?;
        self.plan_index_action(&table, &stmt.index)
    }

    /// An index added by CREATE INDEX or ALTER TABLE ADD INDEX.
    ///
    /// BTREE and HASH indexes over plain columns are table alterations. Any
    /// other method, or indexes over expressions, are handed to an external
    /// index driver along with their options.
    fn plan_index_action(&self, table: &UnresolvedTable, index: &IndexDef) -> Result<LogicalPlan> {
        if index.kind == IndexKind::Fulltext {
            return Err(PlanError::unsupported_feature("fulltext keys are unsupported"));
        }

        let keys = index_keys(&index.parts)?;
        let all_columns = keys.iter().all(|k| matches!(k, IndexKey::Column(_)));
        let all_exprs = keys.iter().all(|k| matches!(k, IndexKey::Expr(_)));
        if !all_columns && !all_exprs {
            return Err(PlanError::syntax(format!(
                "unexpected syntax in index definition on {table}"
            )));
        }

        let using = index_using(index.using.as_deref());
        let name = index.name.as_ref().map(|n| n.value.clone()).unwrap_or_default();

        let using = match using {
            Some(using) if all_columns => using,
            _ => return self.plan_external_index(table, index, name, keys),
        };

        let columns: Vec<IndexColumn> = keys
            .into_iter()
            .filter_map(|k| match k {
                IndexKey::Column(col) => Some(col),
                IndexKey::Expr(_) => None,
            })
            .collect();

        let constraint = match index.kind {
            IndexKind::Primary => {
                return Ok(LogicalPlan::AlterTable(AlterTable::new(
                    table.clone(),
                    AlterTableAction::CreatePrimaryKey { columns },
                )));
            }
            IndexKind::Unique => IndexConstraint::Unique,
            IndexKind::Spatial => IndexConstraint::Spatial,
            IndexKind::Plain | IndexKind::Fulltext => IndexConstraint::None,
        };

        if name.eq_ignore_ascii_case("primary") {
            return Err(PlanError::validation(format!("incorrect index name '{name}'")));
        }

        Ok(LogicalPlan::AlterTable(AlterTable::new(
            table.clone(),
            AlterTableAction::CreateIndex(IndexDefinition {
                name,
                using,
                constraint,
                columns,
                comment: index.comment.clone().unwrap_or_default(),
            }),
        )))
    }

    fn plan_external_index(
        &self,
        table: &UnresolvedTable,
        index: &IndexDef,
        name: String,
        keys: Vec<IndexKey<'_>>,
    ) -> Result<LogicalPlan> {
        let exprs = keys
            .into_iter()
            .map(|key| match key {
                IndexKey::Column(col) => Ok(Expr::column(col.name)),
                IndexKey::Expr(expr) => self.plan_expr(expr),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut config: BTreeMap<String, String> = index.options.iter().cloned().collect();
        if let Some(comment) = &index.comment {
            config.insert("comment".to_string(), comment.clone());
        }
        let driver = index
            .using
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        debug!(%name, %driver, "external index");

        Ok(LogicalPlan::CreateIndex(CreateIndex {
            name,
            table: table.clone(),
            exprs,
            driver,
            config,
        }))
    }

    pub(crate) fn plan_drop_index(&self, stmt: &DropIndexStmt) -> Result<LogicalPlan> {
        let table = unresolved_table(&stmt.table)?;
        let action = if stmt.name.value.eq_ignore_ascii_case("primary") {
            AlterTableAction::DropPrimaryKey
        } else {
            AlterTableAction::DropIndex {
                name: stmt.name.value.clone(),
            }
        };
        Ok(LogicalPlan::AlterTable(AlterTable::new(table, action)))
    }

    pub(crate) fn plan_drop_table(&self, stmt: &DropTableStmt) -> Result<LogicalPlan> {
        let tables = stmt
            .names
            .iter()
            .map(unresolved_table)
            .collect::<Result<Vec<_>>>()?;
        if let Some(first) = tables.first() {
            if tables.iter().any(|t| t.database != first.database) {
                return Err(PlanError::unsupported_feature(
                    "dropping tables on multiple databases in the same statement",
                ));
            }
        }
        Ok(LogicalPlan::DropTable(DropTable {
            tables,
            if_exists: stmt.if_exists,
            temporary: stmt.temporary,
        }))
    }

    pub(crate) fn plan_rename_table(&self, stmt: &RenameTableStmt) -> Result<LogicalPlan> {
        let mut from = Vec::with_capacity(stmt.renames.len());
        let mut to = Vec::with_capacity(stmt.renames.len());
        for (old, new) in &stmt.renames {
            from.push(unresolved_table(old)?);
            to.push(unresolved_table(new)?);
        }
        Ok(LogicalPlan::RenameTable(RenameTable {
            from,
            to,
            alter_table: false,
        }))
    }

    pub(crate) fn plan_truncate_table(&self, name: &ObjectName) -> Result<LogicalPlan> {
        Ok(LogicalPlan::TruncateTable(TruncateTable {
            table: unresolved_table(name)?,
        }))
    }

    pub(crate) fn plan_analyze(&self, names: &[ObjectName]) -> Result<LogicalPlan> {
        Ok(LogicalPlan::Analyze(Analyze {
            tables: names
                .iter()
                .map(unresolved_table)
                .collect::<Result<Vec<_>>>()?,
        }))
    }

    pub(crate) fn plan_create_view(&self, stmt: &CreateViewStmt) -> Result<LogicalPlan> {
        let (database, name) = split_object_name(&stmt.name)?;
        let input = self.plan_query(&stmt.query)?;
        Ok(LogicalPlan::CreateView(CreateView {
            database: database.unwrap_or_default().to_string(),
            name: name.to_string(),
            columns: stmt.columns.iter().map(|c| c.value.clone()).collect(),
            definition: SubqueryAlias {
                name: name.to_string(),
                columns: Vec::new(),
                text: stmt.text.body_text.clone(),
                input: Box::new(input),
            },
            or_replace: stmt.or_replace,
            create_text: stmt.text.create_text.clone(),
            algorithm: stmt.algorithm.clone().unwrap_or_default(),
            definer: self.definer(stmt.definer.as_ref()),
            security: stmt.security.clone().unwrap_or_default(),
        }))
    }

    pub(crate) fn plan_drop_view(&self, stmt: &DropViewStmt) -> Result<LogicalPlan> {
        Ok(LogicalPlan::DropView(DropView {
            views: stmt
                .names
                .iter()
                .map(unresolved_table)
                .collect::<Result<Vec<_>>>()?,
            if_exists: stmt.if_exists,
        }))
    }

    pub(crate) fn plan_create_trigger(&self, stmt: &CreateTriggerStmt) -> Result<LogicalPlan> {
        let (database, name) = split_object_name(&stmt.name)?;
        let body = self.plan_statement(&stmt.body)?;
        Ok(LogicalPlan::CreateTrigger(CreateTrigger {
            database: database.unwrap_or_default().to_string(),
            name: name.to_string(),
            time: stmt.time,
            event: stmt.event,
            order: stmt.order.as_ref().map(|(precedes, other)| TriggerOrder {
                precedes: *precedes,
                other: other.value.clone(),
            }),
            table: unresolved_table(&stmt.table)?,
            body: Box::new(body),
            create_text: stmt.text.create_text.clone(),
            body_text: stmt.text.body_text.clone(),
            definer: self.definer(stmt.definer.as_ref()),
        }))
    }

    pub(crate) fn drop_routine(&self, stmt: &DropRoutineStmt) -> Result<DropRoutine> {
        let (database, name) = split_object_name(&stmt.name)?;
        Ok(DropRoutine {
            database: database.unwrap_or_default().to_string(),
            name: name.to_string(),
            if_exists: stmt.if_exists,
        })
    }

    pub(crate) fn plan_create_procedure(&self, stmt: &CreateProcedureStmt) -> Result<LogicalPlan> {
        let (database, name) = split_object_name(&stmt.name)?;
        let params = stmt
            .params
            .iter()
            .map(|p| {
                Ok(ProcedureParam {
                    direction: p.direction,
                    name: p.name.value.clone(),
                    data_type: DataType::from_column_type(&p.column_type)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let body = self.plan_statement(&stmt.body)?;

        Ok(LogicalPlan::CreateProcedure(CreateProcedure {
            database: database.unwrap_or_default().to_string(),
            name: name.to_string(),
            definer: self.definer(stmt.definer.as_ref()),
            params,
            characteristics: stmt.characteristics.clone(),
            security: stmt.security,
            comment: stmt.comment.clone().unwrap_or_default(),
            create_text: stmt.text.create_text.clone(),
            body_text: stmt.text.body_text.clone(),
            body: Box::new(body),
        }))
    }

    pub(crate) fn plan_create_event(&self, stmt: &CreateEventStmt) -> Result<LogicalPlan> {
        let (qualifier, name) = split_object_name(&stmt.name)?;
        let database = self.routine_database(qualifier)?;
        let schedule = self.plan_event_schedule(&stmt.schedule)?;
        let body = self.plan_statement(&stmt.body)?;

        Ok(LogicalPlan::CreateEvent(CreateEvent {
            database,
            name: name.to_string(),
            definer: self.definer(stmt.definer.as_ref()),
            schedule,
            on_completion_preserve: stmt.preserve,
            status: stmt.status,
            comment: stmt.comment.clone().unwrap_or_default(),
            body_text: stmt.text.body_text.clone(),
            body: Box::new(body),
            if_not_exists: stmt.if_not_exists,
        }))
    }

    pub(crate) fn plan_alter_event(&self, stmt: &AlterEventStmt) -> Result<LogicalPlan> {
        let (qualifier, name) = split_object_name(&stmt.name)?;
        let database = self.routine_database(qualifier)?;

        let rename_to = match &stmt.rename {
            Some(to) => {
                let (to_qualifier, to_name) = split_object_name(to)?;
                if self.routine_database(to_qualifier)? != database {
                    return Err(PlanError::unsupported_feature(
                        "moving events to different database using ALTER EVENT is not supported yet",
                    ));
                }
                Some(to_name.to_string())
            }
            None => None,
        };

        let schedule = stmt
            .schedule
            .as_ref()
            .map(|s| self.plan_event_schedule(s))
            .transpose()?;
        let (body_text, body) = match &stmt.body {
            Some((body, text)) => (
                Some(text.clone()),
                Some(Box::new(self.plan_statement(body)?)),
            ),
            None => (None, None),
        };

        Ok(LogicalPlan::AlterEvent(AlterEvent {
            database,
            name: name.to_string(),
            definer: self.definer(stmt.definer.as_ref()),
            schedule,
            on_completion_preserve: stmt.preserve,
            rename_to,
            status: stmt.status,
            comment: stmt.comment.clone(),
            body_text,
            body,
        }))
    }

    fn plan_event_schedule(&self, schedule: &EventScheduleDef) -> Result<EventSchedule> {
        Ok(match schedule {
            EventScheduleDef::At(ts) => EventSchedule::At(self.plan_schedule_timestamp(ts)?),
            EventScheduleDef::Every {
                interval,
                starts,
                ends,
            } => EventSchedule::Every {
                interval: self.plan_expr(interval)?,
                starts: starts
                    .as_ref()
                    .map(|ts| self.plan_schedule_timestamp(ts))
                    .transpose()?,
                ends: ends
                    .as_ref()
                    .map(|ts| self.plan_schedule_timestamp(ts))
                    .transpose()?,
            },
        })
    }

    /// `ts [+ INTERVAL n unit]...` split into the timestamp and the intervals
    /// added to it, in written order.
    fn plan_schedule_timestamp(&self, expr: &ast::Expr) -> Result<ScheduleTimestamp> {
        let mut intervals = Vec::new();
        let mut current = expr;
        while let ast::Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Plus,
            right,
        } = current
        {
            if !matches!(right.as_ref(), ast::Expr::Interval(_)) {
                break;
            }
            intervals.push(self.plan_expr(right)?);
            current = left;
        }
        intervals.reverse();
        Ok(ScheduleTimestamp {
            timestamp: self.plan_expr(current)?,
            intervals,
        })
    }

    pub(crate) fn plan_create_database(&self, stmt: &CreateDatabaseStmt) -> Result<LogicalPlan> {
        if stmt.encryption {
            self.ctx.warn(1235, ENCRYPTION_WARNING.to_string());
        }
        Ok(LogicalPlan::CreateDatabase(CreateDatabase {
            name: stmt.name.value.clone(),
            if_not_exists: stmt.if_not_exists,
            collation: parse_collation(stmt.charset.as_deref(), stmt.collate.as_deref(), false)?,
        }))
    }

    pub(crate) fn plan_alter_database(&self, stmt: &AlterDatabaseStmt) -> Result<LogicalPlan> {
        Ok(LogicalPlan::AlterDatabase(AlterDatabase {
            name: stmt.name.as_ref().map(|n| n.value.clone()).unwrap_or_default(),
            collation: parse_collation(stmt.charset.as_deref(), stmt.collate.as_deref(), false)?,
        }))
    }

    pub(crate) fn plan_drop_database(&self, stmt: &DropDatabaseStmt) -> Result<LogicalPlan> {
        Ok(LogicalPlan::DropDatabase(DropDatabase {
            name: stmt.name.value.clone(),
            if_exists: stmt.if_exists,
        }))
    }

    pub(crate) fn plan_create_spatial_ref_sys(
        &self,
        stmt: &CreateSpatialRefSysStmt,
    ) -> Result<LogicalPlan> {
        let srid = parse_u32("SRID", &stmt.srid)?;

        let name = match stmt.name.as_deref() {
            None | Some("") => return Err(missing_attribute("NAME")),
            Some(name) if has_surrounding_whitespace(name) => {
                return Err(PlanError::invalid_value(
                    "the spatial reference system name can't be an empty string or start or end with whitespace",
                ));
            }
            Some(name) => name.to_string(),
        };
        let definition = match stmt.definition.as_deref() {
            None | Some("") => return Err(missing_attribute("DEFINITION")),
            Some(definition) => definition.to_string(),
        };
        let (organization, org_id) = match &stmt.organization {
            None => return Err(missing_attribute("ORGANIZATION NAME")),
            Some((org, _)) if org.is_empty() => return Err(missing_attribute("ORGANIZATION NAME")),
            Some((org, _)) if has_surrounding_whitespace(org) => {
                return Err(PlanError::invalid_value(
                    "the organization name can't be an empty string or start or end with whitespace",
                ));
            }
            Some((org, id)) => (org.clone(), parse_u32("ORGANIZATION ID", id)?),
        };

        Ok(LogicalPlan::CreateSpatialRefSys(CreateSpatialRefSys {
            srid,
            or_replace: stmt.or_replace,
            if_not_exists: stmt.if_not_exists,
            attributes: SrsAttribute {
                name,
                definition,
                organization,
                org_id,
                description: stmt.description.clone().unwrap_or_default(),
            },
        }))
    }
}

fn alter_rank(plan: &LogicalPlan) -> u8 {
    match plan {
        LogicalPlan::AlterTable(alter) => match alter.table.as_ref() {
            // A unique index over a column change runs with the column change.
            LogicalPlan::AlterTable(inner) => inner.action.rank(),
            _ => alter.action.rank(),
        },
        LogicalPlan::RenameTable(_) => RENAME_RANK,
        _ => RENAME_RANK - 1,
    }
}

fn single_column<'a>(table: &ObjectName, columns: &'a [ColumnDef]) -> Result<&'a ColumnDef> {
    match columns {
        [column] => Ok(column),
        _ => Err(PlanError::unsupported_feature(format!(
            "adding multiple columns in ALTER TABLE {table} MODIFY"
        ))),
    }
}

/// Wrap a column alteration in a unique index when the column is declared
/// UNIQUE.
fn unique_column_index(plan: LogicalPlan, def: &ColumnDef) -> LogicalPlan {
    if !matches!(
        def.key,
        Some(ColumnKeyOption::Unique) | Some(ColumnKeyOption::UniqueKey)
    ) {
        return plan;
    }
    LogicalPlan::AlterTable(AlterTable {
        table: Box::new(plan),
        action: AlterTableAction::CreateIndex(IndexDefinition {
            name: def.name.value.clone(),
            using: IndexUsing::BTree,
            constraint: IndexConstraint::Unique,
            columns: vec![IndexColumn {
                name: def.name.value.clone(),
                length: None,
            }],
            comment: def.comment.clone().unwrap_or_default(),
        }),
    })
}

/// `AUTO_INCREMENT = n`. Fractional values are truncated.
fn auto_increment_value(value: &str) -> Result<u64> {
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v as u64),
        _ => Err(PlanError::invalid_value(format!(
            "invalid AUTO_INCREMENT value: {value}"
        ))),
    }
}

fn parse_u32(what: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| PlanError::invalid_value(format!("invalid {what}: {value}")))
}

fn missing_attribute(name: &str) -> PlanError {
    PlanError::validation(format!("missing mandatory attribute {name}"))
}

fn has_surrounding_whitespace(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::collation::Collation;
    use crate::context::BasicSessionContext;
    use crate::plan::{ColumnOrder, EventStatus, TriggerEvent, TriggerTime};
    use crate::planner::plan_sql;

    fn plan(sql: &str) -> Result<LogicalPlan> {
        plan_sql(&BasicSessionContext::new("mydb"), sql)
    }

    fn tree(sql: &str) -> String {
        plan(sql).unwrap().to_string()
    }

    #[test]
    fn create_table_schema() {
        let LogicalPlan::CreateTable(create) = plan(
            "CREATE TABLE IF NOT EXISTS t (
                id BIGINT NOT NULL AUTO_INCREMENT,
                name VARCHAR(20) DEFAULT 'x' UNIQUE,
                parent BIGINT,
                PRIMARY KEY (id),
                KEY idx_name (name(10)),
                CONSTRAINT fk FOREIGN KEY (parent) REFERENCES other.p (id) ON DELETE CASCADE,
                CHECK (parent > 0)
            ) DEFAULT CHARSET = latin1",
        )
        .unwrap() else {
            panic!("expected create table");
        };

        assert!(create.if_not_exists);
        assert_eq!(vec![0], create.schema.pk_ordinals);
        let id = &create.schema.columns[0];
        assert!(id.primary_key && !id.nullable && id.auto_increment);
        assert_eq!("auto_increment", id.extra);

        let constraints: Vec<_> = create.indexes.iter().map(|i| i.constraint).collect();
        assert_eq!(
            vec![
                IndexConstraint::Primary,
                IndexConstraint::None,
                IndexConstraint::Unique
            ],
            constraints
        );
        assert_eq!("idx_name", create.indexes[1].name);
        assert_eq!(Some(10), create.indexes[1].columns[0].length);
        assert_eq!(IndexConstraint::Unique, create.indexes[2].constraint);

        assert_eq!(1, create.foreign_keys.len());
        assert_eq!("mydb", create.foreign_keys[0].database);
        assert_eq!("other", create.foreign_keys[0].parent_database);
        assert_eq!(1, create.checks.len());
        assert_eq!("latin1", create.collation.character_set().name());
    }

    #[test]
    fn nullable_primary_key_is_rejected() {
        let err = plan("CREATE TABLE t (a INT NULL PRIMARY KEY)").unwrap_err();
        assert_eq!(
            PlanError::validation(
                "All parts of PRIMARY KEY must be NOT NULL; if you need NULL in a key, use UNIQUE instead"
            ),
            err
        );
    }

    #[test]
    fn create_table_like_and_select() {
        let LogicalPlan::CreateTable(like) = plan("CREATE TABLE t LIKE db2.src").unwrap() else {
            panic!("expected create table");
        };
        assert_eq!(Some(UnresolvedTable::new("db2", "src")), like.like);

        let LogicalPlan::CreateTable(select) = plan("CREATE TABLE t SELECT a FROM s").unwrap()
        else {
            panic!("expected create table");
        };
        assert!(select.schema.columns.is_empty());
        assert!(select.select.is_some());
    }

    #[test]
    fn alter_sequences_rename_before_drop() {
        let expected = "\
Block
├─ RenameColumn (from = a, to = b)
│  └─ UnresolvedTable (name = t)
└─ DropColumn (column = c)
   └─ UnresolvedTable (name = t)
";
        assert_eq!(
            expected,
            tree("ALTER TABLE t DROP COLUMN c, RENAME COLUMN a TO b")
        );
    }

    #[test]
    fn alter_single_action_is_bare() {
        let plan = plan("ALTER TABLE t ADD COLUMN x INT FIRST").unwrap();
        let LogicalPlan::AlterTable(alter) = plan else {
            panic!("expected alter table");
        };
        let AlterTableAction::AddColumn { column, order } = alter.action else {
            panic!("expected add column");
        };
        assert_eq!("x", column.name);
        assert_eq!(Some(ColumnOrder::First), order);
    }

    #[test]
    fn unique_column_wraps_column_action() {
        let LogicalPlan::AlterTable(outer) =
            plan("ALTER TABLE t MODIFY COLUMN x INT UNIQUE").unwrap()
        else {
            panic!("expected alter table");
        };
        let AlterTableAction::CreateIndex(index) = &outer.action else {
            panic!("expected create index");
        };
        assert_eq!("x", index.name);
        assert_eq!(IndexConstraint::Unique, index.constraint);
        assert!(matches!(
            outer.table.as_ref(),
            LogicalPlan::AlterTable(AlterTable {
                action: AlterTableAction::ModifyColumn { .. },
                ..
            })
        ));
        assert_eq!(Some(&UnresolvedTable::new("", "t")), outer.target());
    }

    #[test]
    fn alter_rename_table_runs_last() {
        let LogicalPlan::Block(block) =
            plan("ALTER TABLE t RENAME TO t2, ADD INDEX i (a), AUTO_INCREMENT = 10").unwrap()
        else {
            panic!("expected block");
        };
        assert!(matches!(
            block.statements.last(),
            Some(LogicalPlan::RenameTable(RenameTable {
                alter_table: true,
                ..
            }))
        ));
    }

    #[rstest]
    #[case("10", 10)]
    #[case("10.7", 10)]
    fn auto_increment_values(#[case] value: &str, #[case] expected: u64) {
        assert_eq!(expected, auto_increment_value(value).unwrap());
    }

    #[test]
    fn auto_increment_rejects_text() {
        assert!(auto_increment_value("abc").is_err());
    }

    #[test]
    fn create_index_wildcard_is_invalid() {
        let err = plan("CREATE INDEX idx ON foo(*)").unwrap_err();
        assert_eq!(PlanError::invalid_value("invalid index expression: *"), err);
    }

    #[test]
    fn create_index_mixed_parts_is_rejected() {
        let err = plan("CREATE INDEX idx ON foo(foo, fn(bar, baz))").unwrap_err();
        assert!(matches!(err, PlanError::Syntax(_)));
        assert!(err.to_string().contains("unexpected syntax"));
    }

    #[test]
    fn create_index_over_expression_is_external() {
        let LogicalPlan::CreateIndex(index) = plan("CREATE INDEX idx ON foo(fn(bar, baz))").unwrap()
        else {
            panic!("expected create index");
        };
        assert_eq!(1, index.exprs.len());
        assert!(matches!(&index.exprs[0], Expr::Function(f) if f.name == "fn"));
        assert_eq!("", index.driver);
    }

    #[test]
    fn create_index_using_driver() {
        let LogicalPlan::CreateIndex(index) =
            plan("CREATE INDEX idx USING Pilosa ON foo(a, b) COMMENT 'c'").unwrap()
        else {
            panic!("expected create index");
        };
        assert_eq!("pilosa", index.driver);
        assert_eq!(Some(&"c".to_string()), index.config.get("comment"));
        assert_eq!(2, index.exprs.len());
    }

    #[test]
    fn create_unique_index() {
        let expected = "\
AlterCreateIndex (index = UNIQUE INDEX idx (a, b(4)), using = BTREE)
└─ UnresolvedTable (name = t)
";
        assert_eq!(expected, tree("CREATE UNIQUE INDEX idx ON t (a, b(4))"));
    }

    #[rstest]
    #[case("CREATE FULLTEXT INDEX idx ON t (a)", PlanError::unsupported_feature("fulltext keys are unsupported"))]
    #[case("CREATE INDEX primary ON t (a)", PlanError::validation("incorrect index name 'primary'"))]
    #[case("CREATE INDEX idx ON t (a(0))", PlanError::invalid_value("key part a length cannot be 0"))]
    fn create_index_errors(#[case] sql: &str, #[case] expected: PlanError) {
        assert_eq!(expected, plan(sql).unwrap_err());
    }

    #[test]
    fn drop_table_single_database() {
        let LogicalPlan::DropTable(drop) = plan("DROP TABLE IF EXISTS a, b").unwrap() else {
            panic!("expected drop table");
        };
        assert_eq!(2, drop.tables.len());
        assert!(drop.if_exists);

        assert_eq!(
            PlanError::unsupported_feature(
                "dropping tables on multiple databases in the same statement"
            ),
            plan("DROP TABLE db1.a, db2.b").unwrap_err()
        );
    }

    #[test]
    fn create_view_captures_text() {
        let ctx = BasicSessionContext::new("mydb").with_client("root", "localhost");
        let LogicalPlan::CreateView(view) =
            plan_sql(&ctx, "CREATE OR REPLACE VIEW v AS SELECT a FROM t").unwrap()
        else {
            panic!("expected create view");
        };
        assert!(view.or_replace);
        assert_eq!("v", view.name);
        assert_eq!("SELECT a FROM t", view.definition.text);
        assert_eq!("`root`@`localhost`", view.definer);
    }

    #[test]
    fn create_trigger() {
        let LogicalPlan::CreateTrigger(trigger) = plan(
            "CREATE TRIGGER trg BEFORE INSERT ON t FOR EACH ROW FOLLOWS other INSERT INTO audit VALUES (NEW.a)",
        )
        .unwrap() else {
            panic!("expected create trigger");
        };
        assert_eq!(TriggerTime::Before, trigger.time);
        assert_eq!(TriggerEvent::Insert, trigger.event);
        assert_eq!(
            Some(TriggerOrder {
                precedes: false,
                other: "other".to_string()
            }),
            trigger.order
        );
        assert!(matches!(trigger.body.as_ref(), LogicalPlan::InsertInto(_)));
    }

    #[test]
    fn create_event_requires_database() {
        let ctx = BasicSessionContext::default();
        let err = plan_sql(
            &ctx,
            "CREATE EVENT e ON SCHEDULE EVERY 1 DAY DO DELETE FROM t",
        )
        .unwrap_err();
        assert_eq!(PlanError::validation("no database selected"), err);
    }

    #[test]
    fn create_event_schedule_intervals() {
        let LogicalPlan::CreateEvent(event) = plan(
            "CREATE EVENT e ON SCHEDULE AT '2030-01-01 00:00:00' + INTERVAL 1 DAY + INTERVAL 2 HOUR DO DELETE FROM t",
        )
        .unwrap() else {
            panic!("expected create event");
        };
        assert_eq!("mydb", event.database);
        assert_eq!(EventStatus::Enable, event.status);
        assert!(!event.on_completion_preserve);
        let EventSchedule::At(ts) = &event.schedule else {
            panic!("expected AT schedule");
        };
        assert_eq!(2, ts.intervals.len());
    }

    #[test]
    fn alter_event_rejects_moving_database() {
        let err = plan("ALTER EVENT e RENAME TO other.e2").unwrap_err();
        assert!(matches!(err, PlanError::UnsupportedFeature(_)));

        let LogicalPlan::AlterEvent(alter) = plan("ALTER EVENT e RENAME TO e2 DISABLE").unwrap()
        else {
            panic!("expected alter event");
        };
        assert_eq!(Some("e2".to_string()), alter.rename_to);
        assert_eq!(Some(EventStatus::Disable), alter.status);
        assert_eq!(None, alter.schedule);
    }

    #[test]
    fn create_database_with_encryption_warns() {
        let ctx = BasicSessionContext::new("mydb");
        let LogicalPlan::CreateDatabase(db) = plan_sql(
            &ctx,
            "CREATE DATABASE IF NOT EXISTS d CHARACTER SET latin1 ENCRYPTION 'Y'",
        )
        .unwrap() else {
            panic!("expected create database");
        };
        assert_eq!(Collation::from_name("latin1_swedish_ci").unwrap(), db.collation);
        let warnings = ctx.take_warnings();
        assert_eq!(1, warnings.len());
        assert_eq!(1235, warnings[0].code);
    }

    #[rstest]
    #[case(
        "CREATE SPATIAL REFERENCE SYSTEM 1234 DEFINITION 'd' ORGANIZATION 'o' IDENTIFIED BY 1",
        "missing mandatory attribute NAME"
    )]
    #[case(
        "CREATE SPATIAL REFERENCE SYSTEM 1234 NAME ' n' DEFINITION 'd' ORGANIZATION 'o' IDENTIFIED BY 1",
        "the spatial reference system name can't be an empty string or start or end with whitespace"
    )]
    #[case(
        "CREATE SPATIAL REFERENCE SYSTEM 1234 NAME 'n' ORGANIZATION 'o' IDENTIFIED BY 1",
        "missing mandatory attribute DEFINITION"
    )]
    #[case(
        "CREATE SPATIAL REFERENCE SYSTEM 1234 NAME 'n' DEFINITION 'd'",
        "missing mandatory attribute ORGANIZATION NAME"
    )]
    fn spatial_ref_sys_errors(#[case] sql: &str, #[case] message: &str) {
        assert_eq!(message, plan(sql).unwrap_err().to_string());
    }

    #[test]
    fn spatial_ref_sys() {
        let LogicalPlan::CreateSpatialRefSys(srs) = plan(
            "CREATE OR REPLACE SPATIAL REFERENCE SYSTEM 1234 NAME 'n' DEFINITION 'd' ORGANIZATION 'o' IDENTIFIED BY 7 DESCRIPTION 'x'",
        )
        .unwrap() else {
            panic!("expected spatial ref sys");
        };
        assert_eq!(1234, srs.srid);
        assert!(srs.or_replace);
        assert_eq!(7, srs.attributes.org_id);
        assert_eq!("x", srs.attributes.description);
    }
}
