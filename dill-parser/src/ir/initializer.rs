use crate::error::{DecodeError, NodeFamily, Result};
use crate::ir::{
    Arguments, AssertStatement, Expression, FileOffset, Statement, VariableDeclaration, tag,
};
use crate::names::{ConstructorRef, FieldRef};
use crate::reader::Reader;

/// Constructor initializer list entry. Every kind starts with an
/// `isSynthetic` byte.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Invalid {
        is_synthetic: bool,
    },
    Field {
        is_synthetic: bool,
        field: FieldRef,
        value: Expression,
    },
    Super {
        is_synthetic: bool,
        file_offset: FileOffset,
        target: ConstructorRef,
        arguments: Arguments,
    },
    Redirecting {
        is_synthetic: bool,
        file_offset: FileOffset,
        target: ConstructorRef,
        arguments: Arguments,
    },
    Local {
        is_synthetic: bool,
        variable: VariableDeclaration,
    },
    /// Whether the `isSynthetic` byte is on the wire is decided by
    /// [`Session::assert_has_synthetic`](crate::Session::assert_has_synthetic);
    /// when absent it reads as `false`.
    Assert {
        is_synthetic: bool,
        statement: AssertStatement,
    },
}

impl Initializer {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let raw = r.read_u8()?;
        let initializer = match raw {
            tag::INVALID_INITIALIZER => Initializer::Invalid {
                is_synthetic: read_bool(r)?,
            },
            tag::FIELD_INITIALIZER => Initializer::Field {
                is_synthetic: read_bool(r)?,
                field: r.read_field_ref()?,
                value: Expression::read(r)?,
            },
            tag::SUPER_INITIALIZER => Initializer::Super {
                is_synthetic: read_bool(r)?,
                file_offset: r.read_file_offset()?,
                target: r.read_constructor_ref()?,
                arguments: Arguments::read(r)?,
            },
            tag::REDIRECTING_INITIALIZER => Initializer::Redirecting {
                is_synthetic: read_bool(r)?,
                file_offset: r.read_file_offset()?,
                target: r.read_constructor_ref()?,
                arguments: Arguments::read(r)?,
            },
            tag::LOCAL_INITIALIZER => Initializer::Local {
                is_synthetic: read_bool(r)?,
                variable: VariableDeclaration::read(r)?,
            },
            tag::ASSERT_INITIALIZER => {
                let is_synthetic = if r.session().assert_has_synthetic() {
                    read_bool(r)?
                } else {
                    false
                };
                let statement = match Statement::read(r)? {
                    Statement::Assert(statement) => statement,
                    other => {
                        return Err(DecodeError::format(format!(
                            "assert initializer wraps statement tag {} instead of an assert",
                            other.tag()
                        )));
                    }
                };
                Initializer::Assert {
                    is_synthetic,
                    statement,
                }
            }
            tag => {
                return Err(DecodeError::UnknownTag {
                    family: NodeFamily::Initializer,
                    tag,
                });
            }
        };
        Ok(initializer)
    }

    pub fn is_synthetic(&self) -> bool {
        match self {
            Initializer::Invalid { is_synthetic }
            | Initializer::Field { is_synthetic, .. }
            | Initializer::Super { is_synthetic, .. }
            | Initializer::Redirecting { is_synthetic, .. }
            | Initializer::Local { is_synthetic, .. }
            | Initializer::Assert { is_synthetic, .. } => *is_synthetic,
        }
    }
}

fn read_bool(r: &mut Reader<'_>) -> Result<bool> {
    Ok(r.read_u8()? != 0)
}
