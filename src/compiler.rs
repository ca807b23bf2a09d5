use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    ast::{BinaryOp, Expr, LogicalOp, UnaryOp},
    parser::{DefaultParser, ExpressionParser, ParseError},
    value::{Document, Value},
};

const UNDEFINED: &str = "undefined";

const AND: &str = "$and";
const OR: &str = "$or";
const NOT: &str = "$not";
const EXISTS: &str = "$exists";

/// Errors that can occur while compiling an expression tree into a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The root of the expression does not produce a document (a bare
    /// identifier, literal, or array is not a filter)
    InvalidQuery,

    /// Unary operator other than logical negation
    UnsupportedUnary(UnaryOp),

    /// `==`/`===` where both or neither operand references a field
    UnsupportedEquality,

    /// Existence comparison with no field to attach `$exists` to
    UnsupportedExists,

    /// Binary operator absent from the operator tables, or a comparison
    /// where both or neither operand references a field
    UnsupportedBinary(BinaryOp),

    /// Node kind that is not usable in the position it appeared in
    UnsupportedExpression(String),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::InvalidQuery => {
                write!(f, "Expression does not compile to a filter document")
            }
            CompileError::UnsupportedUnary(op) => write!(
                f,
                "Unsupported unary operator '{}' (only '!' has a filter equivalent)",
                op
            ),
            CompileError::UnsupportedEquality => write!(
                f,
                "Unsupported equality: exactly one side must reference a field"
            ),
            CompileError::UnsupportedExists => write!(
                f,
                "Unsupported existence check: no field to attach '$exists' to"
            ),
            CompileError::UnsupportedBinary(op) => {
                write!(f, "Unsupported binary expression with operator '{}'", op)
            }
            CompileError::UnsupportedExpression(what) => {
                write!(f, "Unsupported expression: {}", what)
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Any failure of a full source-to-filter compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The expression source did not parse
    Parse(ParseError),

    /// The parsed tree did not compile
    Compile(CompileError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "Parse error: {}", err),
            Error::Compile(err) => write!(f, "Compile error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Compile(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile(err)
    }
}

/// Returns a human-readable type name for a Value
fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Pattern(_) => "pattern",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Filter-operator token when the field is the left operand.
fn operator_token(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::GreaterThan => Some("$gt"),
        BinaryOp::LessThan => Some("$lt"),
        BinaryOp::GreaterEqual => Some("$gte"),
        BinaryOp::LessEqual => Some("$lte"),
        BinaryOp::NotEqual | BinaryOp::StrictNotEqual => Some("$ne"),
        BinaryOp::In => Some("$in"),
        _ => None,
    }
}

/// Filter-operator token when the field is the right operand: relational
/// pairs swap direction, inequality and membership stay put.
fn inverted_operator_token(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::GreaterThan => Some("$lt"),
        BinaryOp::LessThan => Some("$gt"),
        BinaryOp::GreaterEqual => Some("$lte"),
        BinaryOp::LessEqual => Some("$gte"),
        BinaryOp::NotEqual | BinaryOp::StrictNotEqual => Some("$ne"),
        BinaryOp::In => Some("$in"),
        _ => None,
    }
}

/// Whether the node stands for a document field rather than a value.
fn is_field_ref(node: &Expr) -> bool {
    matches!(node, Expr::Identifier(_) | Expr::Member { .. })
}

/// Whether the node is the bare `undefined` identifier, the marker for
/// existence checks. Member accesses never count, even ones whose path
/// happens to mention the word.
fn is_sentinel(node: &Expr) -> bool {
    matches!(node, Expr::Identifier(name) if name == UNDEFINED)
}

fn single_entry(key: String, value: Value) -> Value {
    let mut doc = Document::new();
    doc.insert(key, value);
    Value::Object(doc)
}

/// Per-field value converters, looked up by resolved field path.
///
/// A converter rewrites the non-field operand of a comparison before it is
/// placed into the document; fields without a registered converter keep
/// their values unchanged.
#[derive(Default)]
pub struct Converters {
    map: HashMap<String, Box<dyn Fn(Value) -> Value + Send + Sync>>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for a field path, replacing any previous one.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        converter: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) {
        self.map.insert(field.into(), Box::new(converter));
    }

    /// Run the converter registered for `field`, or hand the value back
    /// unchanged.
    pub fn apply(&self, field: &str, value: Value) -> Value {
        match self.map.get(field) {
            Some(converter) => converter(value),
            None => value,
        }
    }
}

/// The expression-to-filter compiler.
///
/// Holds the parser and converter registry it was configured with; both are
/// read-only during compilation, so one compiler can serve many calls, from
/// many threads, at once.
pub struct Compiler {
    parser: Box<dyn ExpressionParser>,
    converters: Converters,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new()
    }
}

impl Compiler {
    /// Creates a compiler with the bundled parser and no converters.
    pub fn new() -> Self {
        Compiler {
            parser: Box::new(DefaultParser),
            converters: Converters::new(),
        }
    }

    /// Starts configuring a compiler with a custom parser or converters.
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    /// Compiles expression source into a filter document.
    ///
    /// Parses the source with the configured parser, compiles the tree, and
    /// checks that the root came out as a document.
    ///
    /// # Examples
    ///
    /// ```
    /// use mongoexpr::{Compiler, document_to_json};
    /// use serde_json::json;
    ///
    /// let compiler = Compiler::new();
    /// let filter = compiler.compile(r#"a > 3 && b == "ciao""#).unwrap();
    ///
    /// assert_eq!(
    ///     document_to_json(&filter),
    ///     json!({"a": {"$gt": 3}, "b": "ciao"})
    /// );
    /// ```
    pub fn compile(&self, source: &str) -> Result<Document, Error> {
        debug!(source, "compiling filter expression");
        let tree = self.parser.parse(source)?;
        Ok(self.compile_expr(&tree)?)
    }

    /// Compiles an already-parsed expression tree, bypassing the parser.
    pub fn compile_expr(&self, node: &Expr) -> Result<Document, CompileError> {
        match self.compile_node(node)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(CompileError::InvalidQuery),
        }
    }

    /// The recursive dispatcher over node kinds.
    ///
    /// Comparisons and combinators produce documents; identifiers, member
    /// accesses, literals and arrays fall through to [`Compiler::resolve`]
    /// and come back as plain values, which only the root check or a `$not`
    /// wrapper ever sees.
    fn compile_node(&self, node: &Expr) -> Result<Value, CompileError> {
        match node {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let mut doc = Document::new();
                doc.insert(NOT.to_string(), self.compile_node(operand)?);
                Ok(Value::Object(doc))
            }
            Expr::Unary { op, .. } => {
                warn!(operator = %op, "unary operator has no filter equivalent");
                Err(CompileError::UnsupportedUnary(*op))
            }
            Expr::Binary { op, left, right } => self.compile_comparison(*op, left, right),
            Expr::Logical { op, left, right } => {
                let children = [self.compile_node(left)?, self.compile_node(right)?];
                for child in &children {
                    if !child.is_object() {
                        return Err(CompileError::UnsupportedExpression(
                            "logical operand does not compile to a filter document".to_string(),
                        ));
                    }
                }
                match op {
                    LogicalOp::And => Ok(Value::Object(simplify_and(&children))),
                    LogicalOp::Or => {
                        let mut doc = Document::new();
                        doc.insert(OR.to_string(), Value::Array(or_flatten(children.into())));
                        Ok(Value::Object(doc))
                    }
                }
            }
            other => self.resolve(other),
        }
    }

    /// Compiles one binary comparison into a single-key document.
    ///
    /// Dispatch order: existence checks against the `undefined` sentinel
    /// first, then plain equality, then the relational/membership tables.
    /// Exactly one operand must reference a field; the polarity of the
    /// table depends on which side that is.
    fn compile_comparison(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, CompileError> {
        if op.is_equality() || op.is_inequality() {
            let left_sentinel = is_sentinel(left);
            let right_sentinel = is_sentinel(right);

            if left_sentinel || right_sentinel {
                if left_sentinel && right_sentinel {
                    return Err(CompileError::UnsupportedExists);
                }
                let field = if left_sentinel { right } else { left };
                if !is_field_ref(field) {
                    return Err(CompileError::UnsupportedExists);
                }
                let path = self.resolve_path(field)?;
                let mut exists = Document::new();
                exists.insert(EXISTS.to_string(), Value::Boolean(op.is_inequality()));
                return Ok(single_entry(path, Value::Object(exists)));
            }
        }

        if op.is_equality() {
            let (field, value) = match (is_field_ref(left), is_field_ref(right)) {
                (true, false) => (left, right),
                (false, true) => (right, left),
                _ => return Err(CompileError::UnsupportedEquality),
            };
            let path = self.resolve_path(field)?;
            let converted = self.converters.apply(&path, self.resolve(value)?);
            return Ok(single_entry(path, converted));
        }

        let (field, value, token) = match (is_field_ref(left), is_field_ref(right)) {
            (true, false) => (left, right, operator_token(op)),
            (false, true) => (right, left, inverted_operator_token(op)),
            _ => return Err(CompileError::UnsupportedBinary(op)),
        };
        let Some(token) = token else {
            warn!(operator = %op, "binary operator has no filter equivalent");
            return Err(CompileError::UnsupportedBinary(op));
        };

        let path = self.resolve_path(field)?;
        let converted = self.converters.apply(&path, self.resolve(value)?);
        let mut inner = Document::new();
        inner.insert(token.to_string(), converted);
        Ok(single_entry(path, Value::Object(inner)))
    }

    /// Resolves a node in value position.
    ///
    /// Identifiers and member accesses come back as their field-path
    /// string; literals yield their raw value; arrays yield their elements'
    /// raw values (elements must themselves be literals). Anything else has
    /// no value to give.
    fn resolve(&self, node: &Expr) -> Result<Value, CompileError> {
        match node {
            Expr::Identifier(name) => Ok(Value::String(name.clone())),
            Expr::Member { .. } => Ok(Value::String(self.resolve_path(node)?)),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Expr::Literal(value) => values.push(value.clone()),
                        other => {
                            return Err(CompileError::UnsupportedExpression(format!(
                                "{} as an array element (array literals may only hold literals)",
                                other.kind()
                            )));
                        }
                    }
                }
                Ok(Value::Array(values))
            }
            other => Err(CompileError::UnsupportedExpression(format!(
                "{} in value position",
                other.kind()
            ))),
        }
    }

    /// Resolves an identifier or member-access chain to its dot-joined
    /// field path, e.g. `a["b"][1]` → `a.b.1`.
    fn resolve_path(&self, node: &Expr) -> Result<String, CompileError> {
        match node {
            Expr::Identifier(name) => Ok(name.clone()),
            Expr::Member { object, property } => Ok(format!(
                "{}.{}",
                self.resolve_path(object)?,
                self.resolve_path(property)?
            )),
            Expr::Literal(value) => path_segment(value),
            other => Err(CompileError::UnsupportedExpression(format!(
                "{} in a field path",
                other.kind()
            ))),
        }
    }
}

/// Renders a scalar as one segment of a dot-joined field path.
fn path_segment(value: &Value) -> Result<String, CompileError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(n.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(CompileError::UnsupportedExpression(format!(
            "{} in a field path",
            type_name(other)
        ))),
    }
}

/// Flattens AND children into an ordered list of (key, value) entries,
/// splicing nested `$and` arrays recursively. Entries keep their original
/// left-to-right order.
fn flatten_and(children: &[Value]) -> Vec<(String, Value)> {
    let mut flat = Vec::new();
    for child in children {
        let Some(map) = child.as_object() else {
            continue; // children are documents by construction
        };
        for (key, value) in map {
            match value {
                Value::Array(nested) if key == AND => flat.extend(flatten_and(nested)),
                _ => flat.push((key.clone(), value.clone())),
            }
        }
    }
    flat
}

/// Combines AND children into one document.
///
/// A key that occurs once across the flattened entries becomes a direct
/// property; a key that occurs more than once keeps every occurrence, in
/// order, as single-key documents under `$and`. Running this over an
/// already-combined document reproduces it unchanged.
fn simplify_and(children: &[Value]) -> Document {
    let flattened = flatten_and(children);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for (key, _) in &flattened {
        *counts.entry(key.clone()).or_insert(0) += 1;
    }

    let mut result = Document::new();
    for (key, value) in flattened {
        if counts[&key] == 1 {
            result.insert(key, value);
        } else {
            let entry = result
                .entry(AND.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(entries) = entry {
                entries.push(single_entry(key, value));
            }
        }
    }
    result
}

/// Splices OR children that are themselves `$or` documents (exactly one
/// key, and that key is `$or`) into one flat array; every other child is
/// kept whole. Same-operator flattening only: `$and` documents and mixed
/// documents that merely contain `$or` pass through untouched.
fn or_flatten(children: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::new();
    for child in children {
        let splices = child
            .as_object()
            .is_some_and(|map| map.len() == 1 && matches!(map.get(OR), Some(Value::Array(_))));
        if splices {
            if let Value::Object(mut map) = child {
                if let Some(Value::Array(entries)) = map.shift_remove(OR) {
                    flat.extend(entries);
                }
            }
        } else {
            flat.push(child);
        }
    }
    flat
}

/// Configures a [`Compiler`].
pub struct CompilerBuilder {
    parser: Box<dyn ExpressionParser>,
    converters: Converters,
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        CompilerBuilder::new()
    }
}

impl CompilerBuilder {
    pub fn new() -> Self {
        CompilerBuilder {
            parser: Box::new(DefaultParser),
            converters: Converters::new(),
        }
    }

    /// Use a custom parser in place of the bundled one.
    pub fn parser(mut self, parser: impl ExpressionParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Register a converter for a field path.
    ///
    /// ```
    /// use mongoexpr::{Compiler, Value};
    ///
    /// let compiler = Compiler::builder()
    ///     .converter("a", |v| match v {
    ///         Value::Integer(n) => Value::Integer(n + 1),
    ///         other => other,
    ///     })
    ///     .build();
    ///
    /// let filter = compiler.compile("a == 5").unwrap();
    /// assert_eq!(filter.get("a"), Some(&Value::Integer(6)));
    /// ```
    pub fn converter(
        mut self,
        field: impl Into<String>,
        converter: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.converters.insert(field, converter);
        self
    }

    /// Replace the whole converter registry at once.
    pub fn converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            parser: self.parser,
            converters: self.converters,
        }
    }
}
