//! SQL fragments produced by value encoders.
//!
//! Encoders never build query text themselves. They return a [`SqlFragment`]
//! that the query compiler embeds where a value is needed; [`SqlFragment::compile`]
//! renders a fragment on its own with `$n` placeholders for bound values.

use serde_json::Value;

use crate::catalog::QualifiedName;

/// A value-producing SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlFragment {
    /// A bound parameter.
    Value(Value),
    /// SQL `null`.
    Null,
    /// `(expr)::type`.
    Cast { expr: Box<SqlFragment>, to: QualifiedName },
    /// A function or type-constructor call.
    Call {
        function: QualifiedName,
        args: Vec<SqlFragment>,
    },
    /// `array[...]::element_type[]`.
    Array {
        elements: Vec<SqlFragment>,
        element_type: QualifiedName,
    },
}

/// Rendered SQL text with its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    pub text: String,
    pub params: Vec<Value>,
}

impl SqlFragment {
    /// A bound parameter.
    pub fn value(value: impl Into<Value>) -> Self {
        SqlFragment::Value(value.into())
    }

    /// Cast this fragment to `to`.
    pub fn cast(self, to: QualifiedName) -> Self {
        SqlFragment::Cast {
            expr: Box::new(self),
            to,
        }
    }

    /// Call `function` with `args`.
    pub fn call(function: QualifiedName, args: Vec<SqlFragment>) -> Self {
        SqlFragment::Call { function, args }
    }

    /// Render to SQL text with `$1`, `$2`, ... placeholders.
    pub fn compile(&self) -> CompiledSql {
        let mut compiled = CompiledSql {
            text: String::new(),
            params: Vec::new(),
        };
        self.write(&mut compiled);
        compiled
    }

    fn write(&self, out: &mut CompiledSql) {
        match self {
            SqlFragment::Value(value) => {
                out.params.push(value.clone());
                out.text.push('$');
                out.text.push_str(&out.params.len().to_string());
            }
            SqlFragment::Null => out.text.push_str("null"),
            SqlFragment::Cast { expr, to } => {
                out.text.push('(');
                expr.write(out);
                out.text.push_str(")::");
                out.text.push_str(&to.to_sql());
            }
            SqlFragment::Call { function, args } => {
                out.text.push_str(&function.to_sql());
                out.text.push('(');
                write_list(args, out);
                out.text.push(')');
            }
            SqlFragment::Array {
                elements,
                element_type,
            } => {
                out.text.push_str("array[");
                write_list(elements, out);
                out.text.push_str("]::");
                out.text.push_str(&element_type.to_sql());
                out.text.push_str("[]");
            }
        }
    }
}

fn write_list(fragments: &[SqlFragment], out: &mut CompiledSql) {
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.text.push_str(", ");
        }
        fragment.write(out);
    }
}
