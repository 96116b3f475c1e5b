//! Constant evaluation and type checking.

use serde::Serialize;

use super::{ResolveError, Resolver};
use crate::constant::{parse_integer_literal, IntegerLiteralError};
use crate::ids::{ConstId, DeclRef};
use crate::shape::Bound;
use crate::syntax::ast::{Constant, ConstantKind, Literal, PrimitiveSubtype, Type, TypeKind};

/// The value of an evaluated constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConstValue {
    Integer(i128),
    /// A numeric literal that is not an integer, e.g. `1.5`.
    Float(f64),
    Bool(bool),
    String(String),
    /// The `default` literal.
    Default,
}

impl Resolver<'_> {
    /// Evaluate a constant expression.
    pub(crate) fn evaluate(&mut self, constant: &Constant) -> Result<ConstValue, ResolveError> {
        match &constant.kind {
            ConstantKind::Literal(Literal::Numeric(literal)) => {
                let invalid = |reason: String| ResolveError::InvalidConstant {
                    constant: constant.to_string(),
                    reason,
                    span: constant.span,
                };
                match parse_integer_literal::<i128>(&literal.value) {
                    Ok(value) => Ok(ConstValue::Integer(value)),
                    Err(IntegerLiteralError::Malformed(_)) if is_float_literal(&literal.value) => {
                        literal
                            .value
                            .parse::<f64>()
                            .map(ConstValue::Float)
                            .map_err(|err| invalid(err.to_string()))
                    }
                    Err(err) => Err(invalid(err.to_string())),
                }
            }
            ConstantKind::Literal(Literal::String(text)) => Ok(ConstValue::String(text.clone())),
            ConstantKind::Literal(Literal::True) => Ok(ConstValue::Bool(true)),
            ConstantKind::Literal(Literal::False) => Ok(ConstValue::Bool(false)),
            ConstantKind::Literal(Literal::Default) => Ok(ConstValue::Default),
            ConstantKind::Identifier(name) => match self.lookup_required(name)? {
                DeclRef::Const(id) => self.const_value(id),
                _ => Err(ResolveError::NotAConstant {
                    name: name.to_string(),
                    span: name.span,
                }),
            },
        }
    }

    /// Evaluate a constant that must be an integer.
    pub(crate) fn evaluate_integer(&mut self, constant: &Constant) -> Result<i128, ResolveError> {
        match self.evaluate(constant)? {
            ConstValue::Integer(value) => Ok(value),
            _ => Err(ResolveError::InvalidConstant {
                constant: constant.to_string(),
                reason: "expected an integer".to_string(),
                span: constant.span,
            }),
        }
    }

    /// The checked value of a const declaration.
    pub(crate) fn const_value(&mut self, id: ConstId) -> Result<ConstValue, ResolveError> {
        if let Some(value) = self.const_values.get(&id) {
            return Ok(value.clone());
        }

        let decls = self.decls;
        let info = &decls.consts[id];
        if self.evaluating.contains(&id) {
            return Err(ResolveError::ConstantCycle {
                name: self.name_str(&info.name),
                span: info.name.span(),
            });
        }

        self.evaluating.push(id);
        let result = self.evaluate_checked(&info.ty, &info.value);
        self.evaluating.pop();

        let value = result?;
        self.const_values.insert(id, value.clone());
        Ok(value)
    }

    fn evaluate_checked(&mut self, ty: &Type, constant: &Constant) -> Result<ConstValue, ResolveError> {
        let value = self.evaluate(constant)?;
        self.check_value(ty, &value, constant)?;
        Ok(value)
    }

    /// Check a struct member default value against the member type.
    pub(crate) fn check_default(&mut self, ty: &Type, constant: &Constant) -> Result<(), ResolveError> {
        if constant.kind == ConstantKind::Literal(Literal::Default) {
            return Ok(());
        }
        self.evaluate_checked(ty, constant).map(|_| ())
    }

    /// Check that `value` is representable in `ty`.
    pub(crate) fn check_value(
        &mut self,
        ty: &Type,
        value: &ConstValue,
        constant: &Constant,
    ) -> Result<(), ResolveError> {
        let mismatch = || ResolveError::ConstantTypeMismatch {
            constant: constant.to_string(),
            ty: ty.to_string(),
            span: constant.span,
        };

        match (&ty.kind, value) {
            (TypeKind::Primitive(subtype), _) => check_primitive(*subtype, value, constant)
                .ok_or_else(mismatch)?,
            (TypeKind::String { maybe_element_count }, ConstValue::String(text)) => {
                if let Bound::Bounded(bound) = self.bound(maybe_element_count.as_ref())? {
                    if text.len() as u64 > bound {
                        return Err(ResolveError::InvalidConstant {
                            constant: constant.to_string(),
                            reason: format!(
                                "string of length {} exceeds bound {bound}",
                                text.len()
                            ),
                            span: constant.span,
                        });
                    }
                }
                Ok(())
            }
            (TypeKind::Identifier(name), _) => match self.lookup_required(name)? {
                DeclRef::Enum(id) => {
                    let subtype = self.decls.enums[id].subtype.subtype;
                    check_primitive(subtype, value, constant).ok_or_else(mismatch)?
                }
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        }
    }
}

/// A decimal literal with a fraction or an exponent.
fn is_float_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    !unsigned.starts_with("0x")
        && !unsigned.starts_with("0X")
        && unsigned.contains(['.', 'e', 'E'])
}

/// Check `value` against a primitive type.
///
/// Returns `None` when the value has the wrong kind entirely, and
/// `Some(Err(..))` when it has the right kind but does not fit.
fn check_primitive(
    subtype: PrimitiveSubtype,
    value: &ConstValue,
    constant: &Constant,
) -> Option<Result<(), ResolveError>> {
    match value {
        ConstValue::Integer(v) if subtype.is_integer() => Some(if subtype.holds(*v) {
            Ok(())
        } else {
            Err(ResolveError::ConstantOutOfRange {
                value: *v,
                ty: subtype.to_string(),
                span: constant.span,
            })
        }),
        ConstValue::Integer(_) | ConstValue::Float(_) if subtype.is_float() => Some(Ok(())),
        ConstValue::Bool(_) if subtype == PrimitiveSubtype::Bool => Some(Ok(())),
        _ => None,
    }
}
