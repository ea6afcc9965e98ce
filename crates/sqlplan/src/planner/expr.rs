//! Expression conversion.

use sqlparser::ast::{
    self, BinaryOperator, CastKind, DuplicateTreatment, FunctionArg, FunctionArgExpr,
    FunctionArgumentClause, FunctionArguments, UnaryOperator, Value, WindowFrameBound,
    WindowFrameUnits, WindowType,
};
use tracing::trace;

use super::StatementPlanner;
use crate::collation::{CharacterSet, Collation};
use crate::errors::{PlanError, Result};
use crate::expr::{
    ArithmeticOperator, CaseBranch, ComparisonOperator, Expr, FrameBound, FrameUnits,
    FunctionExpr, GroupConcat, Literal, LogicalOperator, SortField, SortOrder, Subquery,
    VariableScope, WindowDefinition, WindowFrame,
};
use crate::types::{DECIMAL_MAX_PRECISION, DECIMAL_MAX_SCALE, DataType, ScalarValue, decimal_type};

/// Functions that always aggregate, whatever the grammar says.
const AGGREGATE_FUNCTIONS: &[&str] = &[
    "first",
    "last",
    "count",
    "sum",
    "any_value",
    "avg",
    "max",
    "min",
    "count_distinct",
    "json_arrayagg",
    "row_number",
    "percent_rank",
    "lag",
    "first_value",
    "bit_and",
    "bit_or",
    "bit_xor",
    "std",
    "stddev",
    "stddev_pop",
    "stddev_samp",
    "var_pop",
    "var_samp",
    "variance",
    "json_objectagg",
    "group_concat",
];

impl StatementPlanner<'_> {
    pub(crate) fn plan_expr(&self, expr: &ast::Expr) -> Result<Expr> {
        match expr {
            ast::Expr::Identifier(ident) => Ok(identifier_expr(ident)),
            ast::Expr::CompoundIdentifier(idents) => compound_identifier_expr(idents),
            ast::Expr::Wildcard(_) => Ok(Expr::Star { table: None }),
            ast::Expr::QualifiedWildcard(name, _) => Ok(Expr::Star {
                table: name.0.last().map(|i| i.value.clone()),
            }),
            ast::Expr::Value(value) => self.plan_value(value),
            ast::Expr::Nested(inner) => self.plan_expr(inner),

            ast::Expr::IsNull(e) => Ok(Expr::IsNull(Box::new(self.plan_expr(e)?))),
            ast::Expr::IsNotNull(e) => Ok(Expr::not(Expr::IsNull(Box::new(self.plan_expr(e)?)))),
            ast::Expr::IsTrue(e) => Ok(Expr::IsTrue(Box::new(self.plan_expr(e)?))),
            ast::Expr::IsNotTrue(e) => Ok(Expr::not(Expr::IsTrue(Box::new(self.plan_expr(e)?)))),
            ast::Expr::IsFalse(e) => Ok(Expr::IsFalse(Box::new(self.plan_expr(e)?))),
            ast::Expr::IsNotFalse(e) => {
                Ok(Expr::not(Expr::IsFalse(Box::new(self.plan_expr(e)?))))
            }

            ast::Expr::InList {
                expr,
                list,
                negated,
            } => Ok(Expr::InTuple {
                expr: Box::new(self.plan_expr(expr)?),
                list: Box::new(Expr::Tuple(self.plan_exprs(list)?)),
                negated: *negated,
            }),
            ast::Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => Ok(Expr::InSubquery {
                expr: Box::new(self.plan_expr(expr)?),
                subquery: self.plan_subquery(subquery)?,
                negated: *negated,
            }),
            ast::Expr::Between {
                expr,
                negated,
                low,
                high,
            } => {
                let between = Expr::Between {
                    expr: Box::new(self.plan_expr(expr)?),
                    low: Box::new(self.plan_expr(low)?),
                    high: Box::new(self.plan_expr(high)?),
                };
                Ok(negate_if(between, *negated))
            }

            ast::Expr::BinaryOp { left, op, right } => self.plan_binary_op(left, op, right),
            ast::Expr::UnaryOp { op, expr } => self.plan_unary_op(op, expr),

            ast::Expr::Like {
                negated,
                any: false,
                expr,
                pattern,
                escape_char,
            } => {
                let like = Expr::Like {
                    expr: Box::new(self.plan_expr(expr)?),
                    pattern: Box::new(self.plan_expr(pattern)?),
                    escape: escape_char
                        .as_ref()
                        .map(|c| Box::new(Expr::Literal(Literal::text(c, self.ctx.collation())))),
                };
                Ok(negate_if(like, *negated))
            }
            ast::Expr::RLike {
                negated,
                expr,
                pattern,
                ..
            } => {
                let regexp = Expr::compare(
                    self.plan_expr(expr)?,
                    ComparisonOperator::Regexp,
                    self.plan_expr(pattern)?,
                );
                Ok(negate_if(regexp, *negated))
            }

            ast::Expr::Cast {
                kind: CastKind::Cast,
                expr,
                data_type: ast::DataType::Binary(None),
                ..
            } => Ok(Expr::Binary(Box::new(self.plan_expr(expr)?))),
            ast::Expr::Cast {
                expr, data_type, ..
            } => self.plan_convert(expr, data_type),
            ast::Expr::Convert {
                expr,
                charset: Some(charset),
                ..
            } => {
                let charset = CharacterSet::from_name(&object_name_value(charset))?;
                Ok(Expr::Collate {
                    expr: Box::new(self.plan_expr(expr)?),
                    collation: charset.default_collation(),
                })
            }
            ast::Expr::Convert {
                expr,
                data_type: Some(data_type),
                ..
            } => self.plan_convert(expr, data_type),

            ast::Expr::Collate { expr, collation } => self.plan_collate(expr, collation),
            ast::Expr::IntroducedString { introducer, value } => {
                let charset = CharacterSet::from_name(introducer.trim_start_matches('_'))?;
                introduced_literal(value, charset.default_collation())
            }
            ast::Expr::TypedString { data_type, value } => Ok(Expr::Convert {
                expr: Box::new(Expr::Literal(Literal::text(value, self.ctx.collation()))),
                type_name: data_type.to_string().to_ascii_lowercase(),
                length: 0,
                scale: 0,
            }),

            ast::Expr::Function(func) => self.plan_function(func),
            ast::Expr::Extract { field, expr, .. } => Ok(Expr::function(
                "extract",
                vec![
                    Expr::Literal(Literal::text(
                        field.to_string().to_ascii_uppercase(),
                        self.ctx.collation(),
                    )),
                    self.plan_expr(expr)?,
                ],
            )),
            ast::Expr::Substring {
                expr,
                substring_from,
                substring_for,
                ..
            } => {
                let mut args = vec![self.plan_expr(expr)?];
                if let Some(from) = substring_from {
                    args.push(self.plan_expr(from)?);
                }
                if let Some(len) = substring_for {
                    args.push(self.plan_expr(len)?);
                }
                Ok(Expr::function("substring", args))
            }
            ast::Expr::Trim {
                expr,
                trim_where,
                trim_what,
                trim_characters: None,
            } => {
                let pattern = match trim_what {
                    Some(what) => self.plan_expr(what)?,
                    None => Expr::Literal(Literal::text(" ", self.ctx.collation())),
                };
                let direction = match trim_where {
                    Some(w) => w.to_string(),
                    None => "BOTH".to_string(),
                };
                Ok(Expr::function(
                    "trim",
                    vec![
                        self.plan_expr(expr)?,
                        pattern,
                        Expr::Literal(Literal::text(direction, self.ctx.collation())),
                    ],
                ))
            }

            ast::Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                let branches = conditions
                    .iter()
                    .zip(results)
                    .map(|(cond, value)| {
                        Ok(CaseBranch {
                            condition: self.plan_expr(cond)?,
                            value: self.plan_expr(value)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::Case {
                    operand: operand
                        .as_ref()
                        .map(|o| self.plan_expr(o).map(Box::new))
                        .transpose()?,
                    branches,
                    else_expr: else_result
                        .as_ref()
                        .map(|e| self.plan_expr(e).map(Box::new))
                        .transpose()?,
                })
            }
            ast::Expr::Exists { subquery, negated } => Ok(negate_if(
                Expr::Exists(self.plan_subquery(subquery)?),
                *negated,
            )),
            ast::Expr::Subquery(query) => Ok(Expr::Subquery(self.plan_subquery(query)?)),
            ast::Expr::Tuple(exprs) => Ok(Expr::Tuple(self.plan_exprs(exprs)?)),
            ast::Expr::Interval(interval) => {
                let unit = match &interval.leading_field {
                    Some(field) => field.to_string().to_ascii_uppercase(),
                    None => return Err(PlanError::unsupported_syntax(interval.to_string())),
                };
                Ok(Expr::Interval {
                    expr: Box::new(self.plan_expr(&interval.value)?),
                    unit,
                })
            }

            other => Err(PlanError::unsupported_syntax(other.to_string())),
        }
    }

    pub(crate) fn plan_exprs(&self, exprs: &[ast::Expr]) -> Result<Vec<Expr>> {
        exprs.iter().map(|e| self.plan_expr(e)).collect()
    }

    pub(crate) fn plan_subquery(&self, query: &ast::Query) -> Result<Subquery> {
        Ok(Subquery {
            plan: Box::new(self.plan_query(query)?),
            text: query.to_string(),
        })
    }

    pub(crate) fn plan_order_by(&self, order_by: &[ast::OrderByExpr]) -> Result<Vec<SortField>> {
        order_by
            .iter()
            .map(|o| {
                if o.nulls_first.is_some() || o.with_fill.is_some() {
                    return Err(PlanError::unsupported_syntax(o.to_string()));
                }
                let order = match o.asc {
                    Some(false) => SortOrder::Descending,
                    _ => SortOrder::Ascending,
                };
                Ok(SortField {
                    expr: self.plan_expr(&o.expr)?,
                    order,
                })
            })
            .collect()
    }

    /// Convert a window specification. A specification without ordering or
    /// framing covers every row of its partition.
    pub(crate) fn plan_window_spec(&self, spec: &ast::WindowSpec) -> Result<WindowDefinition> {
        let order_by = self.plan_order_by(&spec.order_by)?;
        let frame = match &spec.window_frame {
            Some(frame) => Some(self.plan_window_frame(frame)?),
            None if order_by.is_empty() => Some(WindowFrame::all_rows()),
            None => None,
        };
        Ok(WindowDefinition {
            partition_by: self.plan_exprs(&spec.partition_by)?,
            order_by,
            frame,
            reference: spec
                .window_name
                .as_ref()
                .map(|n| n.value.to_ascii_lowercase()),
            name: None,
        })
    }

    fn plan_window_frame(&self, frame: &ast::WindowFrame) -> Result<WindowFrame> {
        let units = match frame.units {
            WindowFrameUnits::Rows => FrameUnits::Rows,
            WindowFrameUnits::Range => FrameUnits::Range,
            WindowFrameUnits::Groups => {
                let text = match &frame.end_bound {
                    Some(end) => format!("{} BETWEEN {} AND {end}", frame.units, frame.start_bound),
                    None => format!("{} {}", frame.units, frame.start_bound),
                };
                return Err(PlanError::unsupported_syntax(text));
            }
        };
        Ok(WindowFrame {
            units,
            start: self.plan_frame_bound(&frame.start_bound)?,
            end: frame
                .end_bound
                .as_ref()
                .map(|b| self.plan_frame_bound(b))
                .transpose()?,
        })
    }

    fn plan_frame_bound(&self, bound: &WindowFrameBound) -> Result<FrameBound> {
        Ok(match bound {
            WindowFrameBound::CurrentRow => FrameBound::CurrentRow,
            WindowFrameBound::Preceding(None) => FrameBound::UnboundedPreceding,
            WindowFrameBound::Preceding(Some(e)) => {
                FrameBound::Preceding(Box::new(self.plan_expr(e)?))
            }
            WindowFrameBound::Following(None) => FrameBound::UnboundedFollowing,
            WindowFrameBound::Following(Some(e)) => {
                FrameBound::Following(Box::new(self.plan_expr(e)?))
            }
        })
    }

    fn plan_value(&self, value: &Value) -> Result<Expr> {
        match value {
            Value::Number(text, _) => number_literal(text, self.ctx.collation()),
            Value::SingleQuotedString(s)
            | Value::DoubleQuotedString(s)
            | Value::NationalStringLiteral(s)
            | Value::EscapedStringLiteral(s) => {
                Ok(Expr::Literal(Literal::text(s, self.ctx.collation())))
            }
            Value::HexStringLiteral(digits) => hex_literal(digits),
            Value::SingleQuotedByteStringLiteral(bits) => bit_literal(bits),
            Value::Boolean(b) => Ok(Expr::Literal(Literal::boolean(*b))),
            Value::Null => Ok(Expr::Literal(Literal::null())),
            Value::Placeholder(name) => Ok(Expr::BindVar(name.trim_start_matches(':').to_string())),
            other => Err(PlanError::unsupported_syntax(other.to_string())),
        }
    }

    fn plan_unary_op(&self, op: &UnaryOperator, expr: &ast::Expr) -> Result<Expr> {
        match op {
            // A minus directly on an integer literal is part of the literal.
            UnaryOperator::Minus => match expr {
                ast::Expr::Value(Value::Number(text, _))
                    if text.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    integer_literal(&format!("-{text}"))
                }
                _ => Ok(Expr::UnaryMinus(Box::new(self.plan_expr(expr)?))),
            },
            // Unary plus is a no-op.
            UnaryOperator::Plus => self.plan_expr(expr),
            UnaryOperator::Not | UnaryOperator::BangNot => Ok(Expr::not(self.plan_expr(expr)?)),
            other => Err(PlanError::unsupported_feature(format!(
                "unary operator: {other}"
            ))),
        }
    }

    fn plan_binary_op(
        &self,
        left: &ast::Expr,
        op: &BinaryOperator,
        right: &ast::Expr,
    ) -> Result<Expr> {
        let l = self.plan_expr(left)?;
        let r = self.plan_expr(right)?;

        if let Some(arith) = arithmetic_operator(op) {
            let l_interval = matches!(l, Expr::Interval { .. });
            let r_interval = matches!(r, Expr::Interval { .. });
            if l_interval && arith == ArithmeticOperator::Minus {
                return Err(PlanError::unsupported_syntax("subtracting from an interval"));
            }
            if (l_interval || r_interval)
                && !matches!(arith, ArithmeticOperator::Plus | ArithmeticOperator::Minus)
            {
                return Err(PlanError::unsupported_syntax(
                    "only + and - can be used to add or subtract intervals from dates",
                ));
            }
            if l_interval && r_interval {
                return Err(PlanError::unsupported_syntax(
                    "intervals cannot be added or subtracted from other intervals",
                ));
            }
            return Ok(Expr::Arithmetic {
                left: Box::new(l),
                op: arith,
                right: Box::new(r),
            });
        }

        let logical = |op| Expr::Logical {
            left: Box::new(l.clone()),
            op,
            right: Box::new(r.clone()),
        };
        Ok(match op {
            BinaryOperator::And => logical(LogicalOperator::And),
            BinaryOperator::Or => logical(LogicalOperator::Or),
            BinaryOperator::Xor => logical(LogicalOperator::Xor),
            BinaryOperator::Eq => Expr::compare(l, ComparisonOperator::Eq, r),
            BinaryOperator::NotEq => Expr::not(Expr::compare(l, ComparisonOperator::Eq, r)),
            BinaryOperator::Spaceship => Expr::compare(l, ComparisonOperator::NullSafeEq, r),
            BinaryOperator::Lt => Expr::compare(l, ComparisonOperator::Lt, r),
            BinaryOperator::LtEq => Expr::compare(l, ComparisonOperator::LtEq, r),
            BinaryOperator::Gt => Expr::compare(l, ComparisonOperator::Gt, r),
            BinaryOperator::GtEq => Expr::compare(l, ComparisonOperator::GtEq, r),
            BinaryOperator::Arrow => Expr::function("json_extract", vec![l, r]),
            BinaryOperator::LongArrow => Expr::function(
                "json_unquote",
                vec![Expr::function("json_extract", vec![l, r])],
            ),
            other => return Err(PlanError::unsupported_feature(other.to_string())),
        })
    }

    fn plan_convert(&self, expr: &ast::Expr, data_type: &ast::DataType) -> Result<Expr> {
        let (type_name, length, scale) = convert_target(data_type)?;
        Ok(Expr::Convert {
            expr: Box::new(self.plan_expr(expr)?),
            type_name,
            length,
            scale,
        })
    }

    fn plan_collate(&self, expr: &ast::Expr, collation: &ast::ObjectName) -> Result<Expr> {
        let collation = Collation::from_name(&object_name_value(collation))?;

        // The collation of an introduced literal must match its introducer.
        if let ast::Expr::IntroducedString { introducer, value } = expr {
            let charset = CharacterSet::from_name(introducer.trim_start_matches('_'))?;
            if !collation.works_with(&charset) {
                return Err(invalid_collation(collation, charset));
            }
            return introduced_literal(value, collation);
        }

        let inner = self.plan_expr(expr)?;
        let charset = self.ctx.character_set();
        if inner.is_literal() && !collation.works_with(&charset) {
            return Err(invalid_collation(collation, charset));
        }
        Ok(Expr::Collate {
            expr: Box::new(inner),
            collation,
        })
    }

    fn plan_function(&self, func: &ast::Function) -> Result<Expr> {
        let name = func
            .name
            .0
            .iter()
            .map(|i| i.value.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(".");
        trace!(%name, "planning function");

        if func.filter.is_some() || func.null_treatment.is_some() || !func.within_group.is_empty()
        {
            return Err(PlanError::unsupported_syntax(func.to_string()));
        }

        let mut distinct = false;
        let mut order_by = Vec::new();
        let mut separator = None;
        let args = match &func.args {
            FunctionArguments::None => Vec::new(),
            FunctionArguments::Subquery(query) => {
                vec![Expr::Subquery(self.plan_subquery(query)?)]
            }
            FunctionArguments::List(list) => {
                distinct = matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct));
                for clause in &list.clauses {
                    match clause {
                        FunctionArgumentClause::OrderBy(exprs) => {
                            order_by = self.plan_order_by(exprs)?
                        }
                        FunctionArgumentClause::Separator(value) => {
                            separator = Some(separator_text(value)?)
                        }
                        other => return Err(PlanError::unsupported_syntax(other.to_string())),
                    }
                }
                list.args
                    .iter()
                    .map(|arg| self.plan_function_arg(arg))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        if name == "group_concat" {
            let max_len = self
                .ctx
                .session_variable("group_concat_max_len")?
                .as_u64()
                .ok_or_else(|| {
                    PlanError::invalid_value("group_concat_max_len must be an unsigned integer")
                })?;
            return Ok(Expr::GroupConcat(GroupConcat {
                distinct,
                order_by,
                separator: separator.unwrap_or_else(|| ",".to_string()),
                args,
                max_len,
            }));
        }
        if !order_by.is_empty() || separator.is_some() {
            return Err(PlanError::unsupported_syntax(func.to_string()));
        }

        if name == "default" {
            if let [Expr::Column { name, .. }] = args.as_slice() {
                return Ok(Expr::DefaultColumn(name.clone()));
            }
        }

        let mut args = args;
        if distinct {
            if name == "count" {
                return Ok(Expr::CountDistinct(args));
            }
            if args.len() != 1 {
                return Err(PlanError::unsupported_syntax(
                    "more than one expression with distinct",
                ));
            }
            let arg = args.remove(0);
            args = vec![Expr::Distinct(Box::new(arg))];
        }

        let window = match &func.over {
            None => None,
            Some(WindowType::WindowSpec(spec)) => Some(Box::new(self.plan_window_spec(spec)?)),
            Some(WindowType::NamedWindow(ident)) => Some(Box::new(WindowDefinition {
                reference: Some(ident.value.to_ascii_lowercase()),
                frame: Some(WindowFrame::all_rows()),
                ..Default::default()
            })),
        };

        Ok(Expr::Function(FunctionExpr {
            is_aggregate: AGGREGATE_FUNCTIONS.contains(&name.as_str()),
            name,
            args,
            window,
        }))
    }

    fn plan_function_arg(&self, arg: &FunctionArg) -> Result<Expr> {
        match arg {
            FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => self.plan_expr(e),
            FunctionArg::Unnamed(FunctionArgExpr::Wildcard) => Ok(Expr::Star { table: None }),
            FunctionArg::Unnamed(FunctionArgExpr::QualifiedWildcard(name)) => Ok(Expr::Star {
                table: name.0.last().map(|i| i.value.clone()),
            }),
            other => Err(PlanError::unsupported_syntax(other.to_string())),
        }
    }
}

fn negate_if(expr: Expr, negated: bool) -> Expr {
    if negated { Expr::not(expr) } else { expr }
}

fn object_name_value(name: &ast::ObjectName) -> String {
    name.0
        .iter()
        .map(|i| i.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

fn invalid_collation(collation: Collation, charset: CharacterSet) -> PlanError {
    PlanError::invalid_value(format!(
        "COLLATION '{collation}' is not valid for CHARACTER SET '{charset}'"
    ))
}

/// `_charset 'text'`. Only string literals may be introduced.
fn introduced_literal(value: &Value, collation: Collation) -> Result<Expr> {
    match value {
        Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => Ok(Expr::Literal(
            Literal::new(ScalarValue::Utf8(s.clone()), DataType::long_text(collation)),
        )),
        _ => Err(PlanError::invalid_value(
            "a character set introducer must be followed by a string literal",
        )),
    }
}

/// Keywords that call a function without parentheses.
const NILADIC_FUNCTIONS: &[&str] = &[
    "current_user",
    "current_date",
    "current_time",
    "current_timestamp",
    "localtime",
    "localtimestamp",
    "utc_date",
    "utc_time",
    "utc_timestamp",
];

/// A bare word: a variable, the DEFAULT marker, a niladic function, or a
/// column.
fn identifier_expr(ident: &ast::Ident) -> Expr {
    let value = ident.value.as_str();
    if ident.quote_style.is_none() {
        if let Some(name) = value.strip_prefix("@@") {
            return Expr::SystemVar {
                name: name.to_ascii_lowercase(),
                scope: VariableScope::Session,
            };
        }
        if let Some(name) = value.strip_prefix('@') {
            return Expr::UserVar(name.to_ascii_lowercase());
        }
        if value.eq_ignore_ascii_case("default") {
            return Expr::DefaultColumn(String::new());
        }
        let lower = value.to_ascii_lowercase();
        if NILADIC_FUNCTIONS.contains(&lower.as_str()) {
            return Expr::function(lower, Vec::new());
        }
    }
    Expr::column(value)
}

fn compound_identifier_expr(idents: &[ast::Ident]) -> Result<Expr> {
    let Some(first) = idents.first() else {
        return Err(PlanError::unsupported_syntax("empty identifier"));
    };
    let rest = || {
        idents[1..]
            .iter()
            .map(|i| i.value.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(".")
    };

    if let Some(prefix) = first.value.strip_prefix("@@") {
        let scope = match prefix.to_ascii_lowercase().as_str() {
            "session" | "local" => Some(VariableScope::Session),
            "global" => Some(VariableScope::Global),
            "persist" => Some(VariableScope::Persist),
            "persist_only" => Some(VariableScope::PersistOnly),
            _ => None,
        };
        return Ok(match scope {
            Some(scope) => Expr::SystemVar {
                name: rest(),
                scope,
            },
            None => Expr::SystemVar {
                name: format!("{}.{}", prefix.to_ascii_lowercase(), rest()),
                scope: VariableScope::Session,
            },
        });
    }
    if let Some(prefix) = first.value.strip_prefix('@') {
        return Ok(Expr::UserVar(format!(
            "{}.{}",
            prefix.to_ascii_lowercase(),
            rest()
        )));
    }

    match idents {
        [table, column] | [_, table, column] => {
            Ok(Expr::qualified_column(&table.value, &column.value))
        }
        _ => Err(PlanError::unsupported_syntax(
            idents
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("."),
        )),
    }
}

fn arithmetic_operator(op: &BinaryOperator) -> Option<ArithmeticOperator> {
    Some(match op {
        BinaryOperator::Plus => ArithmeticOperator::Plus,
        BinaryOperator::Minus => ArithmeticOperator::Minus,
        BinaryOperator::Multiply => ArithmeticOperator::Multiply,
        BinaryOperator::Divide => ArithmeticOperator::Divide,
        BinaryOperator::MyIntegerDivide => ArithmeticOperator::IntDivide,
        BinaryOperator::Modulo => ArithmeticOperator::Modulo,
        BinaryOperator::BitwiseAnd => ArithmeticOperator::BitAnd,
        BinaryOperator::BitwiseOr => ArithmeticOperator::BitOr,
        BinaryOperator::BitwiseXor => ArithmeticOperator::BitXor,
        BinaryOperator::PGBitwiseShiftLeft => ArithmeticOperator::ShiftLeft,
        BinaryOperator::PGBitwiseShiftRight => ArithmeticOperator::ShiftRight,
        _ => return None,
    })
}

fn separator_text(value: &Value) -> Result<String> {
    match value {
        Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => Ok(s.clone()),
        other => Err(PlanError::invalid_value(format!(
            "invalid GROUP_CONCAT separator: {other}"
        ))),
    }
}

/// Target type name, length and scale of CAST or CONVERT.
fn convert_target(data_type: &ast::DataType) -> Result<(String, u64, u64)> {
    let text = data_type.to_string().to_ascii_lowercase();
    let (name, params) = match text.split_once('(') {
        Some((name, params)) => (name.trim(), params.trim_end_matches(')')),
        None => (text.as_str(), ""),
    };
    let name = name.strip_suffix(" integer").unwrap_or(name).to_string();

    let mut parts = params.split(',').map(str::trim).filter(|p| !p.is_empty());
    let mut next_number = || -> Result<u64> {
        match parts.next() {
            Some(p) => p
                .parse()
                .map_err(|_| PlanError::invalid_value(format!("invalid type parameter: {p}"))),
            None => Ok(0),
        }
    };
    let length = next_number()?;
    let scale = next_number()?;
    Ok((name, length, scale))
}

/// Plan a numeric literal as written.
fn number_literal(text: &str, collation: Collation) -> Result<Expr> {
    if text.contains(['.', 'e', 'E']) {
        return float_literal(text, collation);
    }
    integer_literal(text)
}

/// The narrowest integer type holding `text`, signed before unsigned at each
/// width. Values beyond 64 bits become decimals.
pub(crate) fn integer_literal(text: &str) -> Result<Expr> {
    macro_rules! try_narrow {
        ($t:ty, $variant:ident, $dt:ident) => {
            if let Ok(v) = text.parse::<$t>() {
                return Ok(Expr::literal(ScalarValue::$variant(v), DataType::$dt));
            }
        };
    }
    try_narrow!(i8, Int8, Int8);
    try_narrow!(u8, UInt8, Uint8);
    try_narrow!(i16, Int16, Int16);
    try_narrow!(u16, UInt16, Uint16);
    try_narrow!(i32, Int32, Int32);
    try_narrow!(u32, UInt32, Uint32);
    try_narrow!(i64, Int64, Int64);
    try_narrow!(u64, UInt64, Uint64);

    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Expr::literal(
            ScalarValue::Decimal(text.to_string()),
            DataType::Decimal {
                precision: DECIMAL_MAX_PRECISION,
                scale: DECIMAL_MAX_SCALE,
            },
        ));
    }
    Err(PlanError::invalid_value(format!(
        "could not convert {text} to any numerical type"
    )))
}

/// Floats keep their written precision as a decimal when formatting the
/// parsed value would lose digits. Decimals that cannot hold the value fall
/// back to text.
fn float_literal(text: &str, collation: Collation) -> Result<Expr> {
    let value: f64 = text
        .parse()
        .map_err(|_| PlanError::invalid_value(format!("invalid float literal: {text}")))?;

    if let Some((int_part, frac_part)) = text.split_once('.') {
        let exponent = text.contains('e');
        let formatted = if exponent {
            exponent_text(value)
        } else {
            format!("{value}")
        };
        if text.len() >= formatted.len() && text != formatted {
            let scale = frac_part.len();
            let precision = int_part.trim_start_matches('-').len() + scale;
            let typ = u8::try_from(precision)
                .ok()
                .zip(u8::try_from(scale).ok())
                .and_then(|(p, s)| decimal_type(p, s).ok());
            return Ok(match typ {
                Some(typ @ DataType::Decimal { precision, scale })
                    if fits_decimal(value, precision, scale) =>
                {
                    let digits = if text.contains(['e', 'E']) {
                        format!("{value:.prec$}", prec = usize::from(scale))
                    } else {
                        text.to_string()
                    };
                    Expr::literal(ScalarValue::Decimal(digits), typ)
                }
                _ => Expr::Literal(Literal::text(text, collation)),
            });
        }
    }
    Ok(Expr::literal(ScalarValue::Float64(value), DataType::Float64))
}

/// Shortest exponent form with a signed, at least two digit exponent,
/// e.g. `1.5e+03`.
fn exponent_text(value: f64) -> String {
    let rendered = format!("{value:e}");
    let Some((mantissa, exp)) = rendered.split_once('e') else {
        return rendered;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Whether the integer digits of `value` fit in `precision - scale` places.
fn fits_decimal(value: f64, precision: u8, scale: u8) -> bool {
    let int_places = i32::from(precision) - i32::from(scale);
    value.abs() < 10f64.powi(int_places)
}

/// The value of an integer literal, whatever its width.
pub(crate) fn integer_value(expr: &Expr) -> Option<i128> {
    let Expr::Literal(Literal { value, .. }) = expr else {
        return None;
    };
    Some(match value {
        ScalarValue::Int8(v) => i128::from(*v),
        ScalarValue::UInt8(v) => i128::from(*v),
        ScalarValue::Int16(v) => i128::from(*v),
        ScalarValue::UInt16(v) => i128::from(*v),
        ScalarValue::Int32(v) => i128::from(*v),
        ScalarValue::UInt32(v) => i128::from(*v),
        ScalarValue::Int64(v) => i128::from(*v),
        ScalarValue::UInt64(v) => i128::from(*v),
        _ => return None,
    })
}

fn hex_literal(digits: &str) -> Result<Expr> {
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&padded)
        .map_err(|e| PlanError::invalid_value(format!("invalid hex literal {digits}: {e}")))?;
    Ok(Expr::literal(ScalarValue::Binary(bytes), DataType::long_blob()))
}

fn bit_literal(bits: &str) -> Result<Expr> {
    if bits.is_empty() {
        return Ok(Expr::literal(ScalarValue::UInt64(0), DataType::Uint64));
    }
    let value = u64::from_str_radix(bits, 2)
        .map_err(|_| PlanError::invalid_value(format!("invalid bit literal: {bits}")))?;
    Ok(Expr::literal(ScalarValue::UInt64(value), DataType::Uint64))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::context::BasicSessionContext;
    use crate::parser::ast::Statement;
    use crate::parser::parse_statement;
    use crate::types::ScalarValue;

    fn plan_with(ctx: &BasicSessionContext, expr: &str) -> Result<Expr> {
        let parsed = parse_statement(&format!("SELECT {expr}"))?.expect("statement");
        let Statement::Query(stmt) = &parsed.statement else {
            panic!("expected query");
        };
        let ast::SetExpr::Select(select) = stmt.query.body.as_ref() else {
            panic!("expected select");
        };
        let item = match &select.projection[0] {
            ast::SelectItem::UnnamedExpr(e) | ast::SelectItem::ExprWithAlias { expr: e, .. } => e,
            other => panic!("unexpected item {other}"),
        };
        StatementPlanner::new(ctx, &parsed.source).plan_expr(item)
    }

    fn plan(expr: &str) -> Result<Expr> {
        plan_with(&BasicSessionContext::new("mydb"), expr)
    }

    #[rstest]
    #[case("0", ScalarValue::Int8(0), DataType::Int8)]
    #[case("127", ScalarValue::Int8(127), DataType::Int8)]
    #[case("128", ScalarValue::UInt8(128), DataType::Uint8)]
    #[case("255", ScalarValue::UInt8(255), DataType::Uint8)]
    #[case("256", ScalarValue::Int16(256), DataType::Int16)]
    #[case("32768", ScalarValue::UInt16(32768), DataType::Uint16)]
    #[case("65536", ScalarValue::Int32(65536), DataType::Int32)]
    #[case("2147483648", ScalarValue::UInt32(2147483648), DataType::Uint32)]
    #[case("4294967296", ScalarValue::Int64(4294967296), DataType::Int64)]
    #[case(
        "9223372036854775808",
        ScalarValue::UInt64(9223372036854775808),
        DataType::Uint64
    )]
    fn integer_narrowing(#[case] text: &str, #[case] value: ScalarValue, #[case] typ: DataType) {
        assert_eq!(Expr::literal(value, typ), integer_literal(text).unwrap());
    }

    #[test]
    fn integer_overflow_is_decimal() {
        let expr = integer_literal("18446744073709551616").unwrap();
        assert_eq!(
            Expr::literal(
                ScalarValue::Decimal("18446744073709551616".to_string()),
                DataType::Decimal {
                    precision: 65,
                    scale: 30
                }
            ),
            expr
        );
    }

    #[test]
    fn float_precision() {
        assert_eq!(
            Expr::literal(ScalarValue::Float64(1.5), DataType::Float64),
            plan("1.5").unwrap()
        );
        assert_eq!(
            Expr::literal(
                ScalarValue::Decimal("1.50".to_string()),
                DataType::Decimal {
                    precision: 3,
                    scale: 2
                }
            ),
            plan("1.50").unwrap()
        );
    }

    #[rstest]
    #[case("-129", ScalarValue::Int16(-129), DataType::Int16)]
    #[case("-128", ScalarValue::Int8(-128), DataType::Int8)]
    #[case("-32769", ScalarValue::Int32(-32769), DataType::Int32)]
    #[case(
        "-9223372036854775808",
        ScalarValue::Int64(i64::MIN),
        DataType::Int64
    )]
    fn negative_integers_fold(
        #[case] text: &str,
        #[case] value: ScalarValue,
        #[case] typ: DataType,
    ) {
        assert_eq!(Expr::literal(value, typ), plan(text).unwrap());
    }

    #[rstest]
    #[case("0.50", "0.50", 3, 2)]
    #[case("10.250", "10.250", 5, 3)]
    #[case("1.000e0", "1.00000", 6, 5)]
    fn decimal_precision_counts_integer_digits(
        #[case] text: &str,
        #[case] digits: &str,
        #[case] precision: u8,
        #[case] scale: u8,
    ) {
        let expected = Expr::literal(
            ScalarValue::Decimal(digits.to_string()),
            DataType::Decimal { precision, scale },
        );
        assert_eq!(expected, plan(text).unwrap());
    }

    #[rstest]
    #[case("1.5e3", ScalarValue::Float64(1500.0))]
    #[case("2.5e-3", ScalarValue::Float64(0.0025))]
    fn short_exponent_is_double(#[case] text: &str, #[case] value: ScalarValue) {
        assert_eq!(Expr::literal(value, DataType::Float64), plan(text).unwrap());
    }

    #[test]
    fn exponent_overflowing_decimal_is_text() {
        assert_eq!(
            Expr::Literal(Literal::text("1.5000e3", Collation::DEFAULT)),
            plan("1.5000e3").unwrap()
        );
    }

    #[test]
    fn exponent_rendering() {
        assert_eq!("1.5e+03", exponent_text(1500.0));
        assert_eq!("2.5e-03", exponent_text(0.0025));
        assert_eq!("1e+100", exponent_text(1e100));
    }

    #[rstest]
    #[case("b'101'", 5)]
    #[case("B'11'", 3)]
    #[case("b''", 0)]
    #[case("0b101", 5)]
    #[case("0b0", 0)]
    fn bit_literals(#[case] text: &str, #[case] value: u64) {
        assert_eq!(
            Expr::literal(ScalarValue::UInt64(value), DataType::Uint64),
            plan(text).unwrap()
        );
    }

    #[test]
    fn bit_prefix_needs_binary_digits() {
        assert_eq!(Expr::column("0b102"), plan("0b102").unwrap());
    }

    #[rstest]
    #[case("CURRENT_USER", "current_user")]
    #[case("utc_timestamp", "utc_timestamp")]
    #[case("UTC_DATE", "utc_date")]
    fn niladic_keywords_are_functions(#[case] text: &str, #[case] name: &str) {
        assert_eq!(Expr::function(name, Vec::new()), plan(text).unwrap());
    }

    #[test]
    fn quoted_niladic_keyword_is_column() {
        assert_eq!(Expr::column("current_user"), plan("`current_user`").unwrap());
    }

    #[test]
    fn groups_frame_is_unsupported() {
        let err = plan("SUM(a) OVER (ORDER BY a GROUPS BETWEEN 1 PRECEDING AND CURRENT ROW)")
            .unwrap_err();
        assert_eq!(
            PlanError::unsupported_syntax("GROUPS BETWEEN 1 PRECEDING AND CURRENT ROW"),
            err
        );
    }

    #[test]
    fn hex_and_negative() {
        assert_eq!(
            Expr::literal(ScalarValue::Binary(vec![0x0a, 0xff]), DataType::long_blob()),
            plan("X'0AFF'").unwrap()
        );
        assert_eq!(
            Expr::literal(ScalarValue::Int8(-5), DataType::Int8),
            plan("-5").unwrap()
        );
        assert_eq!(
            Expr::UnaryMinus(Box::new(Expr::column("a"))),
            plan("-a").unwrap()
        );
        assert_eq!(
            Expr::literal(ScalarValue::Int8(5), DataType::Int8),
            plan("+5").unwrap()
        );
    }

    #[test]
    fn variables_and_placeholders() {
        assert_eq!(Expr::UserVar("a".to_string()), plan("@a").unwrap());
        assert_eq!(
            Expr::SystemVar {
                name: "autocommit".to_string(),
                scope: VariableScope::Session
            },
            plan("@@autocommit").unwrap()
        );
        assert_eq!(
            Expr::SystemVar {
                name: "max_connections".to_string(),
                scope: VariableScope::Global
            },
            plan("@@global.max_connections").unwrap()
        );
        assert_eq!(
            Expr::Arithmetic {
                left: Box::new(Expr::BindVar("v1".to_string())),
                op: ArithmeticOperator::Plus,
                right: Box::new(Expr::BindVar("v2".to_string())),
            },
            plan("? + ?").unwrap()
        );
    }

    #[test]
    fn negated_comparisons_wrap_in_not() {
        assert_eq!(
            Expr::not(Expr::compare(
                Expr::column("a"),
                ComparisonOperator::Eq,
                Expr::column("b")
            )),
            plan("a != b").unwrap()
        );
        assert_eq!(
            Expr::not(Expr::like(
                Expr::column("a"),
                Expr::Literal(Literal::text("x%", Collation::DEFAULT))
            )),
            plan("a NOT LIKE 'x%'").unwrap()
        );
        let Expr::InTuple { negated, list, .. } = plan("a NOT IN (1, 2)").unwrap() else {
            panic!("expected in tuple");
        };
        assert!(negated);
        assert!(matches!(*list, Expr::Tuple(ref items) if items.len() == 2));
    }

    #[rstest]
    #[case("INTERVAL 1 DAY - NOW()", "subtracting from an interval")]
    #[case(
        "NOW() * INTERVAL 1 DAY",
        "only + and - can be used to add or subtract intervals from dates"
    )]
    #[case(
        "INTERVAL 1 DAY + INTERVAL 1 DAY",
        "intervals cannot be added or subtracted from other intervals"
    )]
    fn interval_arithmetic_rules(#[case] expr: &str, #[case] msg: &str) {
        assert_eq!(PlanError::unsupported_syntax(msg), plan(expr).unwrap_err());
    }

    #[test]
    fn interval_addition_allowed() {
        let expr = plan("NOW() + INTERVAL 1 DAY").unwrap();
        let Expr::Arithmetic { right, .. } = expr else {
            panic!("expected arithmetic");
        };
        assert_eq!(
            Expr::Interval {
                expr: Box::new(Expr::literal(ScalarValue::Int8(1), DataType::Int8)),
                unit: "DAY".to_string()
            },
            *right
        );
    }

    #[test]
    fn json_operators() {
        assert_eq!(
            "json_extract(doc, '$.a')",
            plan("doc -> '$.a'").unwrap().to_string()
        );
        assert_eq!(
            "json_unquote(json_extract(doc, '$.a'))",
            plan("doc ->> '$.a'").unwrap().to_string()
        );
    }

    #[test]
    fn aggregates_and_distinct() {
        assert_eq!(
            Expr::CountDistinct(vec![Expr::column("a")]),
            plan("COUNT(DISTINCT a)").unwrap()
        );
        let Expr::Function(func) = plan("SUM(DISTINCT a)").unwrap() else {
            panic!("expected function");
        };
        assert!(func.is_aggregate);
        assert_eq!(vec![Expr::Distinct(Box::new(Expr::column("a")))], func.args);

        let Expr::Function(func) = plan("CONCAT(a, b)").unwrap() else {
            panic!("expected function");
        };
        assert!(!func.is_aggregate);
    }

    #[test]
    fn group_concat_reads_session_max_len() {
        let mut ctx = BasicSessionContext::new("mydb");
        ctx.set_session_variable("group_concat_max_len", ScalarValue::UInt64(99));
        let expr = plan_with(&ctx, "GROUP_CONCAT(DISTINCT a ORDER BY b DESC SEPARATOR ';')").unwrap();
        assert_eq!(
            Expr::GroupConcat(GroupConcat {
                distinct: true,
                order_by: vec![SortField {
                    expr: Expr::column("b"),
                    order: SortOrder::Descending
                }],
                separator: ";".to_string(),
                args: vec![Expr::column("a")],
                max_len: 99,
            }),
            expr
        );
    }

    #[test]
    fn empty_over_covers_all_rows() {
        let Expr::Function(func) = plan("ROW_NUMBER() OVER ()").unwrap() else {
            panic!("expected function");
        };
        let window = func.window.expect("window");
        assert_eq!(Some(WindowFrame::all_rows()), window.frame);

        let Expr::Function(func) = plan("LAG(a) OVER (PARTITION BY b ORDER BY c)").unwrap() else {
            panic!("expected function");
        };
        let window = func.window.expect("window");
        assert_eq!(None, window.frame);
        assert_eq!(vec![Expr::column("b")], window.partition_by);
    }

    #[test]
    fn collate_literal_must_match_session_charset() {
        assert!(plan("'a' COLLATE utf8mb4_bin").is_ok());
        assert_eq!(
            PlanError::invalid_value(
                "COLLATION 'latin1_swedish_ci' is not valid for CHARACTER SET 'utf8mb4'"
            ),
            plan("'a' COLLATE latin1_swedish_ci").unwrap_err()
        );
        // Columns are checked later, against their own character set.
        assert!(plan("a COLLATE latin1_swedish_ci").is_ok());
    }

    #[test]
    fn convert_targets() {
        assert_eq!(
            Expr::Convert {
                expr: Box::new(Expr::column("a")),
                type_name: "decimal".to_string(),
                length: 10,
                scale: 2
            },
            plan("CAST(a AS DECIMAL(10, 2))").unwrap()
        );
        assert_eq!(
            Expr::Binary(Box::new(Expr::column("a"))),
            plan("BINARY a").unwrap()
        );
    }

    #[test]
    fn case_expression() {
        let expr = plan("CASE a WHEN 1 THEN 'x' ELSE 'y' END").unwrap();
        let Expr::Case {
            operand,
            branches,
            else_expr,
        } = expr
        else {
            panic!("expected case");
        };
        assert_eq!(Some(Box::new(Expr::column("a"))), operand);
        assert_eq!(1, branches.len());
        assert!(else_expr.is_some());
    }
}
