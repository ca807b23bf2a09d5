use indexmap::IndexMap;
use regex::RegexBuilder;

/// A filter document: field-path and combinator keys mapped to values,
/// in insertion order.
///
/// Insertion order is preserved because simplification order is observable
/// in `$and`/`$or` arrays; equality is still key-based, so two documents
/// with the same entries compare equal regardless of order.
pub type Document = IndexMap<String, Value>;

/// A value appearing in a compiled filter document.
///
/// This covers every shape a document-store filter can carry: JSON scalars
/// (with the integer/float distinction preserved), pattern literals, ordered
/// sequences, and nested documents.
///
/// # Examples
///
/// ```
/// use mongoexpr::{Document, Value};
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
///
/// // A single-key document, e.g. {"status": "active"}
/// let mut doc = Document::new();
/// doc.insert("status".to_string(), Value::String("active".to_string()));
/// let object = Value::Object(doc);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Regular-expression literal (source pattern plus flags)
    Pattern(Pattern),

    /// Array of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Nested filter document
    Object(Document),
}

impl Value {
    /// Check whether the value is a document.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Get as document
    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Pattern> for Value {
    fn from(p: Pattern) -> Self {
        Value::Pattern(p)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc)
    }
}

/// A regular-expression literal as it appeared in source: the pattern text
/// and its flag letters, e.g. `/^c.*$/i` → source `^c.*$`, flags `i`.
///
/// The pattern is kept textual so documents stay cheap to clone and
/// equality-testable; [`Pattern::to_regex`] compiles it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The pattern text between the slashes, with escapes intact.
    pub source: String,
    /// Flag letters following the closing slash (`imsugy`).
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Pattern {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Whether the given flag letter is set.
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }

    /// Compile the pattern.
    ///
    /// The `i`, `m` and `s` flags map to case-insensitive, multi-line and
    /// dot-matches-newline; `g`, `u` and `y` describe matching modes with no
    /// pattern-level equivalent and are carried but ignored here.
    pub fn to_regex(&self) -> Result<regex::Regex, regex::Error> {
        RegexBuilder::new(&self.source)
            .case_insensitive(self.has_flag('i'))
            .multi_line(self.has_flag('m'))
            .dot_matches_new_line(self.has_flag('s'))
            .build()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
