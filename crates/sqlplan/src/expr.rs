//! Expression nodes produced by the planner.
//!
//! References to columns, functions and variables are left unresolved. A
//! later binding pass replaces them.

use std::fmt;

use crate::collation::Collation;
use crate::plan::LogicalPlan;
use crate::types::{DataType, ScalarValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: ScalarValue,
    pub data_type: DataType,
}

impl Literal {
    pub fn new(value: ScalarValue, data_type: DataType) -> Self {
        Literal { value, data_type }
    }

    pub fn null() -> Self {
        Literal::new(ScalarValue::Null, DataType::Null)
    }

    pub fn boolean(v: bool) -> Self {
        Literal::new(ScalarValue::Boolean(v), DataType::BOOLEAN)
    }

    pub fn text(s: impl Into<String>, collation: Collation) -> Self {
        Literal::new(ScalarValue::Utf8(s.into()), DataType::long_text(collation))
    }
}

/// Scope of a system variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableScope {
    Session,
    Global,
    Persist,
    PersistOnly,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Global => write!(f, "global"),
            Self::Persist => write!(f, "persist"),
            Self::PersistOnly => write!(f, "persist_only"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    IntDivide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::IntDivide => "div",
            Self::Modulo => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Xor,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Xor => write!(f, "XOR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    NullSafeEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Regexp,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::NullSafeEq => "<=>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Regexp => "REGEXP",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub expr: Expr,
    pub order: SortOrder,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            SortOrder::Ascending => write!(f, "{} ASC", self.expr),
            SortOrder::Descending => write!(f, "{} DESC", self.expr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Box<Expr>),
    CurrentRow,
    Following(Box<Expr>),
    UnboundedFollowing,
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            Self::Preceding(e) => write!(f, "{e} PRECEDING"),
            Self::CurrentRow => write!(f, "CURRENT ROW"),
            Self::Following(e) => write!(f, "{e} FOLLOWING"),
            Self::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

impl WindowFrame {
    /// The frame used by an empty `OVER ()`: every row of the partition.
    pub fn all_rows() -> Self {
        WindowFrame {
            units: FrameUnits::Rows,
            start: FrameBound::UnboundedPreceding,
            end: Some(FrameBound::UnboundedFollowing),
        }
    }
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = match self.units {
            FrameUnits::Rows => "ROWS",
            FrameUnits::Range => "RANGE",
        };
        match &self.end {
            Some(end) => write!(f, "{units} BETWEEN {} AND {end}", self.start),
            None => write!(f, "{units} {}", self.start),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowDefinition {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<SortField>,
    pub frame: Option<WindowFrame>,
    /// Named window this definition builds on.
    pub reference: Option<String>,
    /// Name given in a `WINDOW` clause.
    pub name: Option<String>,
}

impl fmt::Display for WindowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(r) = &self.reference {
            parts.push(r.clone());
        }
        if !self.partition_by.is_empty() {
            parts.push(format!("PARTITION BY {}", join(&self.partition_by)));
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", join(&self.order_by)));
        }
        if let Some(frame) = &self.frame {
            parts.push(frame.to_string());
        }
        match &self.name {
            Some(name) => write!(f, "{name} AS ({})", parts.join(" ")),
            None => write!(f, "({})", parts.join(" ")),
        }
    }
}

/// A planned subquery along with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    pub plan: Box<LogicalPlan>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    /// Lowercased function name.
    pub name: String,
    pub args: Vec<Expr>,
    pub is_aggregate: bool,
    pub window: Option<Box<WindowDefinition>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupConcat {
    pub distinct: bool,
    pub order_by: Vec<SortField>,
    pub separator: String,
    pub args: Vec<Expr>,
    pub max_len: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub condition: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// Unresolved column reference with an optional table qualifier.
    Column {
        table: Option<String>,
        name: String,
    },
    Star {
        table: Option<String>,
    },
    Alias {
        alias: String,
        expr: Box<Expr>,
    },
    BindVar(String),
    UserVar(String),
    SystemVar {
        name: String,
        scope: VariableScope,
    },
    ProcedureParam(String),
    /// `DEFAULT` or `DEFAULT(col)` in value position. Empty name for the bare
    /// form.
    DefaultColumn(String),
    Function(FunctionExpr),
    CountDistinct(Vec<Expr>),
    Distinct(Box<Expr>),
    GroupConcat(GroupConcat),
    UnaryMinus(Box<Expr>),
    /// `BINARY expr`
    Binary(Box<Expr>),
    Not(Box<Expr>),
    Arithmetic {
        left: Box<Expr>,
        op: ArithmeticOperator,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOperator,
        right: Box<Expr>,
    },
    Comparison {
        left: Box<Expr>,
        op: ComparisonOperator,
        right: Box<Expr>,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<Box<Expr>>,
    },
    InTuple {
        expr: Box<Expr>,
        list: Box<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Subquery,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    IsNull(Box<Expr>),
    IsTrue(Box<Expr>),
    IsFalse(Box<Expr>),
    Tuple(Vec<Expr>),
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<CaseBranch>,
        else_expr: Option<Box<Expr>>,
    },
    Interval {
        expr: Box<Expr>,
        unit: String,
    },
    Subquery(Subquery),
    Exists(Subquery),
    Collate {
        expr: Box<Expr>,
        collation: Collation,
    },
    Convert {
        expr: Box<Expr>,
        type_name: String,
        length: u64,
        scale: u64,
    },
    /// Assignment target and value, used by SET and UPDATE.
    SetField {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn literal(value: ScalarValue, data_type: DataType) -> Self {
        Expr::Literal(Literal::new(value, data_type))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function(FunctionExpr {
            name: name.into(),
            args,
            is_aggregate: false,
            window: None,
        })
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Logical {
            left: Box::new(left),
            op: LogicalOperator::And,
            right: Box::new(right),
        }
    }

    pub fn compare(left: Expr, op: ComparisonOperator, right: Expr) -> Self {
        Expr::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn like(expr: Expr, pattern: Expr) -> Self {
        Expr::Like {
            expr: Box::new(expr),
            pattern: Box::new(pattern),
            escape: None,
        }
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    pub fn set_field(target: Expr, value: Expr) -> Self {
        Expr::SetField {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Direct child expressions. Subquery plans are not descended into.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_)
            | Expr::Column { .. }
            | Expr::Star { .. }
            | Expr::BindVar(_)
            | Expr::UserVar(_)
            | Expr::SystemVar { .. }
            | Expr::ProcedureParam(_)
            | Expr::DefaultColumn(_)
            | Expr::Subquery(_)
            | Expr::Exists(_) => Vec::new(),
            Expr::Alias { expr, .. }
            | Expr::Distinct(expr)
            | Expr::UnaryMinus(expr)
            | Expr::Binary(expr)
            | Expr::Not(expr)
            | Expr::IsNull(expr)
            | Expr::IsTrue(expr)
            | Expr::IsFalse(expr)
            | Expr::Interval { expr, .. }
            | Expr::Collate { expr, .. }
            | Expr::Convert { expr, .. }
            | Expr::InSubquery { expr, .. } => vec![expr.as_ref()],
            Expr::Function(func) => func.args.iter().collect(),
            Expr::CountDistinct(args) | Expr::Tuple(args) => args.iter().collect(),
            Expr::GroupConcat(gc) => gc.args.iter().collect(),
            Expr::Arithmetic { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::Comparison { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::Like {
                expr,
                pattern,
                escape,
            } => {
                let mut out = vec![expr.as_ref(), pattern.as_ref()];
                if let Some(e) = escape {
                    out.push(e.as_ref());
                }
                out
            }
            Expr::InTuple { expr, list, .. } => vec![expr.as_ref(), list.as_ref()],
            Expr::Between { expr, low, high } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
            Expr::Case {
                operand,
                branches,
                else_expr,
            } => {
                let mut out = Vec::new();
                if let Some(o) = operand {
                    out.push(o.as_ref());
                }
                for b in branches {
                    out.push(&b.condition);
                    out.push(&b.value);
                }
                if let Some(e) = else_expr {
                    out.push(e.as_ref());
                }
                out
            }
            Expr::SetField { target, value } => vec![target.as_ref(), value.as_ref()],
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Literal(_)
            | Expr::Column { .. }
            | Expr::Star { .. }
            | Expr::BindVar(_)
            | Expr::UserVar(_)
            | Expr::SystemVar { .. }
            | Expr::ProcedureParam(_)
            | Expr::DefaultColumn(_)
            | Expr::Subquery(_)
            | Expr::Exists(_) => Vec::new(),
            Expr::Alias { expr, .. }
            | Expr::Distinct(expr)
            | Expr::UnaryMinus(expr)
            | Expr::Binary(expr)
            | Expr::Not(expr)
            | Expr::IsNull(expr)
            | Expr::IsTrue(expr)
            | Expr::IsFalse(expr)
            | Expr::Interval { expr, .. }
            | Expr::Collate { expr, .. }
            | Expr::Convert { expr, .. }
            | Expr::InSubquery { expr, .. } => vec![expr.as_mut()],
            Expr::Function(func) => func.args.iter_mut().collect(),
            Expr::CountDistinct(args) | Expr::Tuple(args) => args.iter_mut().collect(),
            Expr::GroupConcat(gc) => gc.args.iter_mut().collect(),
            Expr::Arithmetic { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::Comparison { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Expr::Like {
                expr,
                pattern,
                escape,
            } => {
                let mut out = vec![expr.as_mut(), pattern.as_mut()];
                if let Some(e) = escape {
                    out.push(e.as_mut());
                }
                out
            }
            Expr::InTuple { expr, list, .. } => vec![expr.as_mut(), list.as_mut()],
            Expr::Between { expr, low, high } => vec![expr.as_mut(), low.as_mut(), high.as_mut()],
            Expr::Case {
                operand,
                branches,
                else_expr,
            } => {
                let mut out = Vec::new();
                if let Some(o) = operand {
                    out.push(o.as_mut());
                }
                for b in branches {
                    out.push(&mut b.condition);
                    out.push(&mut b.value);
                }
                if let Some(e) = else_expr {
                    out.push(e.as_mut());
                }
                out
            }
            Expr::SetField { target, value } => vec![target.as_mut(), value.as_mut()],
        }
    }

    /// Rewrite this expression in place, visiting each node before its
    /// children. Stops at the first error.
    pub fn rewrite<E>(&mut self, f: &mut impl FnMut(&mut Expr) -> Result<(), E>) -> Result<(), E> {
        f(self)?;
        for child in self.children_mut() {
            child.rewrite(f)?;
        }
        Ok(())
    }

    /// Walk this expression depth first, returning true as soon as `f`
    /// matches a node.
    pub fn any(&self, f: &mut impl FnMut(&Expr) -> bool) -> bool {
        if f(self) {
            return true;
        }
        self.children().into_iter().any(|c| c.any(f))
    }

    pub fn is_aggregate(&self) -> bool {
        self.any(&mut |e| match e {
            Expr::Function(func) => func.is_aggregate,
            Expr::CountDistinct(_) | Expr::GroupConcat(_) => true,
            _ => false,
        })
    }

    pub fn is_window(&self) -> bool {
        self.any(&mut |e| matches!(e, Expr::Function(func) if func.window.is_some()))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit.value),
            Expr::Column { table: Some(t), name } => write!(f, "{t}.{name}"),
            Expr::Column { table: None, name } => write!(f, "{name}"),
            Expr::Star { table: Some(t) } => write!(f, "{t}.*"),
            Expr::Star { table: None } => write!(f, "*"),
            Expr::Alias { alias, expr } => write!(f, "{expr} as {alias}"),
            Expr::BindVar(name) => write!(f, ":{name}"),
            Expr::UserVar(name) => write!(f, "@{name}"),
            Expr::SystemVar { name, scope } => write!(f, "@@{scope}.{name}"),
            Expr::ProcedureParam(name) => write!(f, "{name}"),
            Expr::DefaultColumn(name) if name.is_empty() => write!(f, "DEFAULT"),
            Expr::DefaultColumn(name) => write!(f, "DEFAULT({name})"),
            Expr::Function(func) => {
                write!(f, "{}({})", func.name, join(&func.args))?;
                if let Some(window) = &func.window {
                    write!(f, " over {window}")?;
                }
                Ok(())
            }
            Expr::CountDistinct(args) => write!(f, "COUNT(DISTINCT {})", join(args)),
            Expr::Distinct(expr) => write!(f, "DISTINCT {expr}"),
            Expr::GroupConcat(gc) => {
                write!(f, "group_concat(")?;
                if gc.distinct {
                    write!(f, "distinct ")?;
                }
                write!(f, "{}", join(&gc.args))?;
                if !gc.order_by.is_empty() {
                    write!(f, " order by {}", join(&gc.order_by))?;
                }
                write!(f, " separator '{}')", gc.separator)
            }
            Expr::UnaryMinus(expr) => write!(f, "-{expr}"),
            Expr::Binary(expr) => write!(f, "BINARY({expr})"),
            Expr::Not(expr) => write!(f, "NOT({expr})"),
            Expr::Arithmetic { left, op, right } => write!(f, "({left} {op} {right})"),
            Expr::Logical { left, op, right } => write!(f, "({left} {op} {right})"),
            Expr::Comparison { left, op, right } => write!(f, "{left} {op} {right}"),
            Expr::Like {
                expr,
                pattern,
                escape,
            } => {
                write!(f, "{expr} LIKE {pattern}")?;
                if let Some(e) = escape {
                    write!(f, " ESCAPE {e}")?;
                }
                Ok(())
            }
            Expr::InTuple {
                expr,
                list,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{expr} {not}IN {list}")
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{expr} {not}IN ({})", subquery.text)
            }
            Expr::Between { expr, low, high } => write!(f, "{expr} BETWEEN {low} AND {high}"),
            Expr::IsNull(expr) => write!(f, "{expr} IS NULL"),
            Expr::IsTrue(expr) => write!(f, "{expr} IS TRUE"),
            Expr::IsFalse(expr) => write!(f, "{expr} IS FALSE"),
            Expr::Tuple(exprs) => write!(f, "({})", join(exprs)),
            Expr::Case {
                operand,
                branches,
                else_expr,
            } => {
                write!(f, "CASE")?;
                if let Some(o) = operand {
                    write!(f, " {o}")?;
                }
                for b in branches {
                    write!(f, " WHEN {} THEN {}", b.condition, b.value)?;
                }
                if let Some(e) = else_expr {
                    write!(f, " ELSE {e}")?;
                }
                write!(f, " END")
            }
            Expr::Interval { expr, unit } => write!(f, "INTERVAL {expr} {unit}"),
            Expr::Subquery(sq) => write!(f, "({})", sq.text),
            Expr::Exists(sq) => write!(f, "EXISTS ({})", sq.text),
            Expr::Collate { expr, collation } => write!(f, "{expr} COLLATE {collation}"),
            Expr::Convert {
                expr,
                type_name,
                length,
                scale,
            } => match (length, scale) {
                (0, 0) => write!(f, "convert({expr}, {type_name})"),
                (l, 0) => write!(f, "convert({expr}, {type_name}({l}))"),
                (l, s) => write!(f, "convert({expr}, {type_name}({l},{s}))"),
            },
            Expr::SetField { target, value } => write!(f, "SET {target} = {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_detection_descends() {
        let expr = Expr::Arithmetic {
            left: Box::new(Expr::Function(FunctionExpr {
                name: "sum".to_string(),
                args: vec![Expr::column("a")],
                is_aggregate: true,
                window: None,
            })),
            op: ArithmeticOperator::Plus,
            right: Box::new(Expr::column("b")),
        };
        assert!(expr.is_aggregate());
        assert!(!expr.is_window());
        assert!(!Expr::column("a").is_aggregate());
    }

    #[test]
    fn display() {
        let expr = Expr::and(
            Expr::compare(
                Expr::qualified_column("t", "a"),
                ComparisonOperator::Gt,
                Expr::column("b"),
            ),
            Expr::not(Expr::IsNull(Box::new(Expr::column("c")))),
        );
        assert_eq!("(t.a > b AND NOT(c IS NULL))", expr.to_string());
    }

    #[test]
    fn rewrite_visits_nested_nodes() {
        let mut expr = Expr::and(
            Expr::column("a"),
            Expr::not(Expr::like(Expr::column("b"), Expr::column("c"))),
        );
        expr.rewrite(&mut |e| {
            if let Expr::Column { name, .. } = e {
                *name = name.to_uppercase();
            }
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!("(A AND NOT(B LIKE C))", expr.to_string());

        let err = expr.rewrite(&mut |e| match e {
            Expr::Column { name, .. } if name == "B" => Err(name.clone()),
            _ => Ok(()),
        });
        assert_eq!(Err("B".to_string()), err);
    }

    #[test]
    fn empty_window_frame() {
        let window = WindowDefinition {
            frame: Some(WindowFrame::all_rows()),
            ..Default::default()
        };
        assert_eq!(
            "(ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)",
            window.to_string()
        );
    }
}
