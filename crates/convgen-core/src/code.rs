//! Emitted code model.
//!
//! Converters build [`Block`]s of [`Stmt`]s instead of strings so that
//! fragments compose (a slice conversion nests its element conversion inside a
//! loop body) and stay inspectable in tests. `Display` renders the
//! Go-flavoured source with tab indentation.
//!
//! # Example
//!
//! ```
//! use convgen_core::{Block, Expr, Stmt};
//!
//! let mut block = Block::new();
//! block.push(Stmt::assign(Expr::path("dst.Name"), Expr::path("src.Name")));
//! assert_eq!(block.to_string(), "dst.Name = src.Name\n");
//! ```

use std::fmt::{self, Display, Formatter};

use crate::{TypeDesc, package_alias};

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A variable or field access path.
    Path(String),
    /// The `nil` literal.
    Nil,
    /// A literal token (`0`, `false`, `""`).
    Lit(String),
    /// `&expr`
    AddressOf(Box<Expr>),
    /// `*expr`
    Deref(Box<Expr>),
    /// `T(expr)`
    Cast { ty: TypeDesc, expr: Box<Expr> },
    /// `callee(args...)`
    Call { callee: String, args: Vec<Expr> },
    /// `recv.method(args...)`
    MethodCall {
        recv: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `base.name`
    Field { base: Box<Expr>, name: String },
    /// `T{Name: value, ...}`
    Composite {
        ty: TypeDesc,
        fields: Vec<(String, Expr)>,
    },
    /// `make(T, len)`
    Make { ty: TypeDesc, len: Box<Expr> },
    /// `len(expr)`
    Len(Box<Expr>),
    /// `lhs == rhs`
    Eq(Box<Expr>, Box<Expr>),
    /// `lhs != rhs`
    Ne(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn path(path: impl Into<String>) -> Self {
        Expr::Path(path.into())
    }

    pub fn lit(token: impl Into<String>) -> Self {
        Expr::Lit(token.into())
    }

    pub fn address_of(self) -> Self {
        Expr::AddressOf(Box::new(self))
    }

    pub fn deref(self) -> Self {
        Expr::Deref(Box::new(self))
    }

    pub fn cast(self, ty: TypeDesc) -> Self {
        Expr::Cast {
            ty,
            expr: Box::new(self),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args,
        }
    }

    /// Call a function of another package, qualified by the package alias.
    pub fn package_call(package: &str, name: &str, args: Vec<Expr>) -> Self {
        if package.is_empty() {
            Self::call(name, args)
        } else {
            Self::call(format!("{}.{}", package_alias(package), name), args)
        }
    }

    pub fn method(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            recv: Box::new(self),
            method: method.into(),
            args,
        }
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        Expr::Field {
            base: Box::new(self),
            name: name.into(),
        }
    }

    pub fn composite(ty: TypeDesc, fields: Vec<(String, Expr)>) -> Self {
        Expr::Composite { ty, fields }
    }

    pub fn make(ty: TypeDesc, len: Expr) -> Self {
        Expr::Make {
            ty,
            len: Box::new(len),
        }
    }

    pub fn length(self) -> Self {
        Expr::Len(Box::new(self))
    }

    pub fn equals(self, rhs: Expr) -> Self {
        Expr::Eq(Box::new(self), Box::new(rhs))
    }

    pub fn differs(self, rhs: Expr) -> Self {
        Expr::Ne(Box::new(self), Box::new(rhs))
    }

    pub fn is_nil(self) -> Self {
        self.equals(Expr::Nil)
    }

    pub fn not_nil(self) -> Self {
        self.differs(Expr::Nil)
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `target = value`
    Assign { target: Expr, value: Expr },
    /// `var name T`
    Declare { name: String, ty: TypeDesc },
    /// `if cond { then } else { otherwise }`
    If {
        cond: Expr,
        then: Block,
        otherwise: Option<Block>,
    },
    /// `for index := range over { body }`
    ForRange {
        index: String,
        over: Expr,
        body: Block,
    },
    /// `// text`
    Comment(String),
}

impl Stmt {
    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign { target, value }
    }

    pub fn declare(name: impl Into<String>, ty: TypeDesc) -> Self {
        Stmt::Declare {
            name: name.into(),
            ty,
        }
    }

    pub fn if_then(cond: Expr, then: Block) -> Self {
        Stmt::If {
            cond,
            then,
            otherwise: None,
        }
    }

    pub fn if_else(cond: Expr, then: Block, otherwise: Block) -> Self {
        Stmt::If {
            cond,
            then,
            otherwise: Some(otherwise),
        }
    }

    pub fn for_range(index: impl Into<String>, over: Expr, body: Block) -> Self {
        Stmt::ForRange {
            index: index.into(),
            over,
            body,
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Stmt::Comment(text.into())
    }

    fn write_indented(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        match self {
            Stmt::Assign { target, value } => writeln!(f, "{target} = {value}"),
            Stmt::Declare { name, ty } => writeln!(f, "var {name} {ty}"),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                writeln!(f, "if {cond} {{")?;
                then.write_indented(f, depth + 1)?;
                if let Some(otherwise) = otherwise {
                    indent(f, depth)?;
                    writeln!(f, "}} else {{")?;
                    otherwise.write_indented(f, depth + 1)?;
                }
                indent(f, depth)?;
                writeln!(f, "}}")
            }
            Stmt::ForRange { index, over, body } => {
                writeln!(f, "for {index} := range {over} {{")?;
                body.write_indented(f, depth + 1)?;
                indent(f, depth)?;
                writeln!(f, "}}")
            }
            Stmt::Comment(text) => writeln!(f, "// {text}"),
        }
    }
}

/// An ordered sequence of statements: the code fragment a conversion produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    stmts: Vec<Stmt>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    /// A block holding one statement.
    pub fn of(stmt: Stmt) -> Self {
        Self { stmts: vec![stmt] }
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    /// Append every statement of `other`.
    pub fn append(&mut self, other: Block) {
        self.stmts.extend(other.stmts);
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn into_stmts(self) -> Vec<Stmt> {
        self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Statements other than comments.
    pub fn code_len(&self) -> usize {
        self.stmts
            .iter()
            .filter(|s| !matches!(s, Stmt::Comment(_)))
            .count()
    }

    fn write_indented(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        for stmt in &self.stmts {
            stmt.write_indented(f, depth)?;
        }
        Ok(())
    }
}

impl From<Vec<Stmt>> for Block {
    fn from(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

impl FromIterator<Stmt> for Block {
    fn from_iter<I: IntoIterator<Item = Stmt>>(iter: I) -> Self {
        Self {
            stmts: iter.into_iter().collect(),
        }
    }
}

fn indent(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("\t")?;
    }
    Ok(())
}

fn write_args(f: &mut Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Path(path) => f.write_str(path),
            Expr::Nil => f.write_str("nil"),
            Expr::Lit(token) => f.write_str(token),
            Expr::AddressOf(inner) => write!(f, "&{inner}"),
            Expr::Deref(inner) => write!(f, "*{inner}"),
            Expr::Cast { ty, expr } => match ty {
                // `*T(x)` would parse as a dereference
                TypeDesc::Pointer(_) | TypeDesc::Function { .. } => write!(f, "({ty})({expr})"),
                _ => write!(f, "{ty}({expr})"),
            },
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Expr::MethodCall { recv, method, args } => {
                write!(f, "{recv}.{method}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Expr::Field { base, name } => write!(f, "{base}.{name}"),
            Expr::Composite { ty, fields } => {
                write!(f, "{ty}{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Expr::Make { ty, len } => write!(f, "make({ty}, {len})"),
            Expr::Len(inner) => write!(f, "len({inner})"),
            Expr::Eq(lhs, rhs) => write!(f, "{lhs} == {rhs}"),
            Expr::Ne(lhs, rhs) => write!(f, "{lhs} != {rhs}"),
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
