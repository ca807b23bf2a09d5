//! # Expression AST
//!
//! This module defines the Abstract Syntax Tree for the expression
//! sub-language: the small, JS-flavored comparison/boolean grammar that
//! compiles into Mongo-style filter documents.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the bundled lexer
//! - **[expressions]** - Expression nodes (identifiers, member access,
//!   literals, arrays, unary/binary/logical operations)
//! - **[operators]** - Operator enums (comparison, shift/arithmetic, logical)
//!
//! ## Quick Start
//!
//! ```text
//! a > 3 && a < 45 && b.c == "ciao"
//! ```
//!
//! parses into a [`Expr::Logical`] tree whose leaves are comparisons, and
//! compiles into:
//!
//! ```text
//! { "$and": [ {"a": {"$gt": 3}}, {"a": {"$lt": 45}} ], "b.c": "ciao" }
//! ```
//!
//! ## Core Concepts
//!
//! ### Field paths
//!
//! Identifier and member-access chains stand for document fields, never for
//! runtime values. `a["b"][1]` denotes the field path `a.b.1`.
//!
//! ### The `undefined` sentinel
//!
//! The bare identifier `undefined` is not a value: compared against a field
//! it expresses an existence check (`a == undefined` → field `a` absent).
//!
//! ### Operators beyond the filter language
//!
//! The grammar admits shift and arithmetic operators so that source such as
//! `b >> 3` parses cleanly; the compiler rejects those trees with a typed
//! error rather than the parser guessing at intent.
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::Token;
pub use expressions::Expr;
pub use operators::{BinaryOp, LogicalOp, UnaryOp};
