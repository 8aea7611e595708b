//! Textual rendering of bodies.
//!
//! The format follows the usual Jimple-like layout: local declarations, then
//! one statement per line with `labelN:` lines in front of every unit that is
//! a branch target or trap boundary, then the trap table.

use std::{collections::HashMap, fmt};

use crate::ir::{
    Body, Expr, InvokeExpr, LocalId, Place, RelationalExpr, Stmt, UnaryOp, UnitId, Value,
};

struct Printer<'a> {
    body: &'a Body,
    labels: HashMap<UnitId, usize>,
}

impl<'a> Printer<'a> {
    fn new(body: &'a Body) -> Self {
        let mut labels = HashMap::new();
        for unit in body.units() {
            if body.is_referenced(unit.id) {
                let next = labels.len();
                labels.insert(unit.id, next);
            }
        }
        Self { body, labels }
    }

    fn local(&self, id: LocalId) -> String {
        self.body
            .local(id)
            .map_or_else(|| id.to_string(), |local| local.name.clone())
    }

    fn label(&self, id: UnitId) -> String {
        self.labels
            .get(&id)
            .map_or_else(|| id.to_string(), |n| format!("label{n}"))
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::Local(id) => self.local(*id),
            Value::Const(c) => c.to_string(),
        }
    }

    fn relational(&self, rel: &RelationalExpr) -> String {
        format!(
            "{} {} {}",
            self.value(&rel.left),
            rel.symbol(),
            self.value(&rel.right)
        )
    }

    fn invoke(&self, invoke: &InvokeExpr) -> String {
        let args: Vec<String> = invoke.args.iter().map(|arg| self.value(arg)).collect();
        let callee = format!(
            "<{}: {} {}>",
            invoke.method.declaring_type, invoke.method.return_type, invoke.method.name
        );
        match &invoke.base {
            Some(base) => format!(
                "{} {}.{}({})",
                invoke.kind,
                self.value(base),
                callee,
                args.join(", ")
            ),
            None => format!("{} {}({})", invoke.kind, callee, args.join(", ")),
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Value(v) => self.value(v),
            Expr::Relational(rel) => self.relational(rel),
            Expr::Binary { op, left, right } => {
                format!("{} {} {}", self.value(left), op.symbol(), self.value(right))
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => format!("neg {}", self.value(operand)),
                UnaryOp::Not => format!("not {}", self.value(operand)),
            },
            Expr::Cast { ty, value } => format!("({ty}) {}", self.value(value)),
            Expr::New { ty } => format!("new {ty}"),
            Expr::NewArray { element, size } => {
                format!("newarray ({element})[{}]", self.value(size))
            }
            Expr::InstanceOf { ty, value } => format!("{} instanceof {ty}", self.value(value)),
            Expr::Length { array } => format!("lengthof {}", self.value(array)),
            Expr::Field { base, field } => match base {
                Some(base) => format!("{}.{}", self.value(base), field.name),
                None => format!("{}.{}", field.declaring_type, field.name),
            },
            Expr::ArrayElement { base, index } => {
                format!("{}[{}]", self.value(base), self.value(index))
            }
            Expr::Invoke(invoke) => self.invoke(invoke),
        }
    }

    fn place(&self, place: &Place) -> String {
        match place {
            Place::Local(id) => self.local(*id),
            Place::Field { base, field } => match base {
                Some(base) => format!("{}.{}", self.value(base), field.name),
                None => format!("{}.{}", field.declaring_type, field.name),
            },
            Place::ArrayElement { base, index } => {
                format!("{}[{}]", self.value(base), self.value(index))
            }
        }
    }

    fn stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Identity { local, source } => format!("{} := {source}", self.local(*local)),
            Stmt::Assign { place, expr } => format!("{} = {}", self.place(place), self.expr(expr)),
            Stmt::If { condition, target } => format!(
                "if {} goto {}",
                self.relational(condition),
                self.label(*target)
            ),
            Stmt::Goto { target } => format!("goto {}", self.label(*target)),
            Stmt::Switch {
                key,
                targets,
                default,
            } => {
                let cases: Vec<String> = targets
                    .iter()
                    .enumerate()
                    .map(|(i, target)| format!("case {i}: goto {}", self.label(*target)))
                    .collect();
                format!(
                    "switch({}) {{ {}; default: goto {} }}",
                    self.value(key),
                    cases.join("; "),
                    self.label(*default)
                )
            }
            Stmt::Invoke(invoke) => self.invoke(invoke),
            Stmt::Return(None) => "return".to_string(),
            Stmt::Return(Some(value)) => format!("return {}", self.value(value)),
            Stmt::Throw(value) => format!("throw {}", self.value(value)),
            Stmt::Nop => "nop".to_string(),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer::new(self);

        for local in self.locals() {
            writeln!(f, "    {local};")?;
        }
        if !self.locals().is_empty() {
            writeln!(f)?;
        }

        for unit in self.units() {
            if let Some(n) = printer.labels.get(&unit.id) {
                writeln!(f, "  label{n}:")?;
            }
            writeln!(f, "    {};", printer.stmt(&unit.stmt))?;
        }

        for trap in self.traps() {
            writeln!(
                f,
                "    catch {} from {} to {} with {};",
                trap.exception,
                printer.label(trap.begin),
                printer.label(trap.end),
                printer.label(trap.handler)
            )?;
        }
        Ok(())
    }
}

/// Renders a single statement with the body's local names.
#[must_use]
pub fn render_stmt(body: &Body, stmt: &Stmt) -> String {
    Printer::new(body).stmt(stmt)
}
