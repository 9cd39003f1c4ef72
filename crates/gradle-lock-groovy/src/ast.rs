//! Syntax tree for the subset of Groovy used by build scripts.
//!
//! Every node keeps the byte span it was parsed from so edits can be
//! spliced into the original text without re-rendering the tree.

/// Half-open byte range `[start, end)` into the manifest text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }

    pub fn slice(self, source: &str) -> &str {
        &source[self.start..self.end]
    }
}

/// `{ [params ->] statements }`; also the implicit script body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub params: Vec<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expr),
    Assign(Assignment),
}

/// `[def] a.b.c = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub span: Span,
    pub target: Vec<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(StrLit),
    Number(NumberLit),
    Ident(Ident),
    Property(Property),
    Call(Call),
    Map(MapLit),
    List(ListLit),
    Closure(Block),
    /// Operators, indexing, ternaries: anything the walker only descends through.
    Other(Compound),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Str(s) => s.span,
            Self::Number(n) => n.span,
            Self::Ident(i) => i.span,
            Self::Property(p) => p.span,
            Self::Call(c) => c.span,
            Self::Map(m) => m.span,
            Self::List(l) => l.span,
            Self::Closure(b) => b.span,
            Self::Other(o) => o.span,
        }
    }

    /// Dotted path segments for `a` or `a.b.c`; `None` for anything else.
    pub fn path(&self) -> Option<Vec<&str>> {
        match self {
            Self::Ident(i) => Some(vec![i.name.as_str()]),
            Self::Property(p) => {
                let mut segments = p.target.path()?;
                segments.push(p.name.as_str());
                Some(segments)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrPart {
    Text(String),
    /// `$name`, `$a.b` or the body of `${...}`.
    Var(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
    TripleSingle,
    TripleDouble,
    /// `/.../`, as used for regular expressions.
    Slashy,
}

impl Quote {
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::Single => "'",
            Self::Double => "\"",
            Self::TripleSingle => "'''",
            Self::TripleDouble => "\"\"\"",
            Self::Slashy => "/",
        }
    }
}

/// String literal, interpolated when it contains [`StrPart::Var`] parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    pub span: Span,
    pub quote: Quote,
    pub parts: Vec<StrPart>,
}

impl StrLit {
    pub fn is_interpolated(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, StrPart::Var(_)))
    }

    /// Literal value, or `None` when interpolated.
    pub fn literal(&self) -> Option<String> {
        if self.is_interpolated() {
            return None;
        }
        Some(self.raw())
    }

    /// Value with every interpolation rendered as `${name}`.
    pub fn raw(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                StrPart::Text(t) => out.push_str(t),
                StrPart::Var(v) => {
                    out.push_str("${");
                    out.push_str(v);
                    out.push('}');
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLit {
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub span: Span,
    pub name: String,
}

/// `target.name`
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub span: Span,
    pub target: Box<Expr>,
    pub name: String,
}

/// A method call in any of Groovy's call shapes: `m(a)`, `m a`,
/// `r.m(a) { }`, `m { }`, or a link of a command chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// From the receiver (or method name) through the closing paren or
    /// closure; a trailing lock clause is not included.
    pub span: Span,
    pub receiver: Option<Box<Expr>>,
    pub method: String,
    pub method_span: Span,
    /// Positional arguments; named arguments are collected into one
    /// leading [`Expr::Map`], as Groovy does.
    pub args: Vec<Expr>,
    pub closure: Option<Block>,
    pub lock: Option<LockClause>,
}

impl Call {
    /// Receiver path segments, empty for an implicit receiver or a
    /// receiver that is not a plain path.
    pub fn receiver_path(&self) -> Vec<&str> {
        self.receiver
            .as_deref()
            .and_then(Expr::path)
            .unwrap_or_default()
    }
}

/// `lock '<version>'` trailing a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct LockClause {
    /// From the `lock` keyword through the version literal.
    pub span: Span,
    pub value: LockValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockValue {
    Str(StrLit),
    Number(NumberLit),
}

impl LockValue {
    pub fn span(&self) -> Span {
        match self {
            Self::Str(s) => s.span,
            Self::Number(n) => n.span,
        }
    }

    /// The pinned version as written.
    pub fn version(&self) -> String {
        match self {
            Self::Str(s) => s.raw(),
            Self::Number(n) => n.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLit {
    pub span: Span,
    pub entries: Vec<MapEntry>,
}

impl MapLit {
    pub fn get(&self, key: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub span: Span,
    pub key: String,
    pub key_span: Span,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListLit {
    pub span: Span,
    pub items: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub span: Span,
    pub children: Vec<Expr>,
}
