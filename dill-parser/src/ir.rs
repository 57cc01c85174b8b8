//! Node families of the kernel AST.
//!
//! Each family is a closed enum with one dispatcher that reads the leading
//! tag byte and then exactly the payload of the matching variant.

mod common;
mod constant;
mod expression;
mod initializer;
mod member;
mod statement;
pub mod tag;
mod types;

pub use common::*;
pub use constant::Constant;
pub use expression::{AsFlags, Expression, LogicalOperator};
pub use initializer::Initializer;
pub use member::{
    Constructor, ConstructorFlags, Field, FieldFlags, Member, Procedure, ProcedureFlags,
    ProcedureKind, RedirectingFactoryConstructor,
};
pub use statement::{AssertStatement, Catch, Statement, SwitchCase, TryCatchFlags, YieldFlags};
pub use types::{DartType, FunctionType, InterfaceType, NamedType, TypedefType};
