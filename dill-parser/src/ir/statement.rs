use crate::error::{DecodeError, NodeFamily, Result};
use crate::ir::{DartType, Expression, FileOffset, FunctionNode, VariableDeclaration, tag};
use crate::reader::Reader;

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TryCatchFlags: u8 {
        const ANY_CATCH_NEEDS_STACK_TRACE = 1 << 0;
        const IS_SYNTHESIZED = 1 << 1;
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct YieldFlags: u8 {
        const IS_YIELD_STAR = 1 << 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStatement {
    pub condition: Expression,
    pub condition_start_offset: FileOffset,
    pub condition_end_offset: FileOffset,
    pub message: Option<Expression>,
}

impl AssertStatement {
    fn read_body(r: &mut Reader<'_>) -> Result<Self> {
        Ok(AssertStatement {
            condition: Expression::read(r)?,
            condition_start_offset: r.read_file_offset()?,
            condition_end_offset: r.read_file_offset()?,
            message: r.read_option(Expression::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `(file offset, expression)` per `case` label.
    pub expressions: Vec<(FileOffset, Expression)>,
    pub is_default: bool,
    pub body: Statement,
}

impl SwitchCase {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SwitchCase {
            expressions: r.read_list(|r| Ok((r.read_file_offset()?, Expression::read(r)?)))?,
            is_default: r.read_u8()? != 0,
            body: Statement::read(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub file_offset: FileOffset,
    pub guard: DartType,
    pub exception: Option<VariableDeclaration>,
    pub stack_trace: Option<VariableDeclaration>,
    pub body: Statement,
}

impl Catch {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Catch {
            file_offset: r.read_file_offset()?,
            guard: DartType::read(r)?,
            exception: r.read_option(VariableDeclaration::read)?,
            stack_trace: r.read_option(VariableDeclaration::read)?,
            body: Statement::read(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Block(Vec<Statement>),
    Empty,
    Assert(AssertStatement),
    /// A block that only executes when assertions are enabled.
    AssertBlock(Vec<Statement>),
    Labeled(Box<Statement>),
    Break {
        file_offset: FileOffset,
        /// Index of the target among the enclosing labeled statements.
        label_index: u32,
    },
    While {
        file_offset: FileOffset,
        condition: Expression,
        body: Box<Statement>,
    },
    Do {
        file_offset: FileOffset,
        body: Box<Statement>,
        condition: Expression,
    },
    For {
        file_offset: FileOffset,
        variables: Vec<VariableDeclaration>,
        condition: Option<Expression>,
        updates: Vec<Expression>,
        body: Box<Statement>,
    },
    ForIn {
        file_offset: FileOffset,
        body_offset: FileOffset,
        is_async: bool,
        variable: VariableDeclaration,
        iterable: Expression,
        body: Box<Statement>,
    },
    Switch {
        file_offset: FileOffset,
        expression: Expression,
        cases: Vec<SwitchCase>,
    },
    ContinueSwitch {
        file_offset: FileOffset,
        case_index: u32,
    },
    If {
        file_offset: FileOffset,
        condition: Expression,
        then: Box<Statement>,
        otherwise: Box<Statement>,
    },
    Return {
        file_offset: FileOffset,
        expression: Option<Expression>,
    },
    TryCatch {
        body: Box<Statement>,
        flags: TryCatchFlags,
        catches: Vec<Catch>,
    },
    TryFinally {
        body: Box<Statement>,
        finalizer: Box<Statement>,
    },
    Yield {
        file_offset: FileOffset,
        flags: YieldFlags,
        expression: Expression,
    },
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration {
        file_offset: FileOffset,
        variable: VariableDeclaration,
        function: Box<FunctionNode>,
    },
}

fn boxed(r: &mut Reader<'_>) -> Result<Box<Statement>> {
    Statement::read(r).map(Box::new)
}

impl Statement {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let raw = r.read_u8()?;
        let statement = match raw {
            tag::EXPRESSION_STATEMENT => Statement::Expression(Expression::read(r)?),
            tag::BLOCK => Statement::Block(r.read_list(Statement::read)?),
            tag::EMPTY_STATEMENT => Statement::Empty,
            tag::ASSERT_STATEMENT => Statement::Assert(AssertStatement::read_body(r)?),
            tag::ASSERT_BLOCK => Statement::AssertBlock(r.read_list(Statement::read)?),
            tag::LABELED_STATEMENT => Statement::Labeled(boxed(r)?),
            tag::BREAK_STATEMENT => Statement::Break {
                file_offset: r.read_file_offset()?,
                label_index: r.read_uint()?,
            },
            tag::WHILE_STATEMENT => Statement::While {
                file_offset: r.read_file_offset()?,
                condition: Expression::read(r)?,
                body: boxed(r)?,
            },
            tag::DO_STATEMENT => Statement::Do {
                file_offset: r.read_file_offset()?,
                body: boxed(r)?,
                condition: Expression::read(r)?,
            },
            tag::FOR_STATEMENT => Statement::For {
                file_offset: r.read_file_offset()?,
                variables: r.read_list(VariableDeclaration::read)?,
                condition: r.read_option(Expression::read)?,
                updates: r.read_list(Expression::read)?,
                body: boxed(r)?,
            },
            tag::FOR_IN_STATEMENT | tag::ASYNC_FOR_IN_STATEMENT => Statement::ForIn {
                file_offset: r.read_file_offset()?,
                body_offset: r.read_file_offset()?,
                is_async: raw == tag::ASYNC_FOR_IN_STATEMENT,
                variable: VariableDeclaration::read(r)?,
                iterable: Expression::read(r)?,
                body: boxed(r)?,
            },
            tag::SWITCH_STATEMENT => Statement::Switch {
                file_offset: r.read_file_offset()?,
                expression: Expression::read(r)?,
                cases: r.read_list(SwitchCase::read)?,
            },
            tag::CONTINUE_SWITCH_STATEMENT => Statement::ContinueSwitch {
                file_offset: r.read_file_offset()?,
                case_index: r.read_uint()?,
            },
            tag::IF_STATEMENT => Statement::If {
                file_offset: r.read_file_offset()?,
                condition: Expression::read(r)?,
                then: boxed(r)?,
                otherwise: boxed(r)?,
            },
            tag::RETURN_STATEMENT => Statement::Return {
                file_offset: r.read_file_offset()?,
                expression: r.read_option(Expression::read)?,
            },
            tag::TRY_CATCH => Statement::TryCatch {
                body: boxed(r)?,
                flags: TryCatchFlags::from_bits_retain(r.read_u8()?),
                catches: r.read_list(Catch::read)?,
            },
            tag::TRY_FINALLY => Statement::TryFinally {
                body: boxed(r)?,
                finalizer: boxed(r)?,
            },
            tag::YIELD_STATEMENT => Statement::Yield {
                file_offset: r.read_file_offset()?,
                flags: YieldFlags::from_bits_retain(r.read_u8()?),
                expression: Expression::read(r)?,
            },
            tag::VARIABLE_DECLARATION => {
                Statement::VariableDeclaration(VariableDeclaration::read(r)?)
            }
            tag::FUNCTION_DECLARATION => Statement::FunctionDeclaration {
                file_offset: r.read_file_offset()?,
                variable: VariableDeclaration::read(r)?,
                function: Box::new(FunctionNode::read(r)?),
            },
            tag => {
                return Err(DecodeError::UnknownTag {
                    family: NodeFamily::Statement,
                    tag,
                });
            }
        };
        Ok(statement)
    }

    pub fn tag(&self) -> u8 {
        match self {
            Statement::Expression(_) => tag::EXPRESSION_STATEMENT,
            Statement::Block(_) => tag::BLOCK,
            Statement::Empty => tag::EMPTY_STATEMENT,
            Statement::Assert(_) => tag::ASSERT_STATEMENT,
            Statement::AssertBlock(_) => tag::ASSERT_BLOCK,
            Statement::Labeled(_) => tag::LABELED_STATEMENT,
            Statement::Break { .. } => tag::BREAK_STATEMENT,
            Statement::While { .. } => tag::WHILE_STATEMENT,
            Statement::Do { .. } => tag::DO_STATEMENT,
            Statement::For { .. } => tag::FOR_STATEMENT,
            Statement::ForIn { is_async: false, .. } => tag::FOR_IN_STATEMENT,
            Statement::ForIn { is_async: true, .. } => tag::ASYNC_FOR_IN_STATEMENT,
            Statement::Switch { .. } => tag::SWITCH_STATEMENT,
            Statement::ContinueSwitch { .. } => tag::CONTINUE_SWITCH_STATEMENT,
            Statement::If { .. } => tag::IF_STATEMENT,
            Statement::Return { .. } => tag::RETURN_STATEMENT,
            Statement::TryCatch { .. } => tag::TRY_CATCH,
            Statement::TryFinally { .. } => tag::TRY_FINALLY,
            Statement::Yield { .. } => tag::YIELD_STATEMENT,
            Statement::VariableDeclaration(_) => tag::VARIABLE_DECLARATION,
            Statement::FunctionDeclaration { .. } => tag::FUNCTION_DECLARATION,
        }
    }
}
