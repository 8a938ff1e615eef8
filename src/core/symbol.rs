use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

/// An interned name. Equality is identity: two symbols with the same textual
/// name are the same symbol. Binding keys use symbols; string property keys
/// are a different thing entirely (see `js_object`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

struct Interner {
    names: Vec<Arc<str>>,
    by_name: HashMap<Arc<str>, u32>,
}

// Process-wide and append-only. Reads vastly outnumber writes; the RwLock
// keeps lookups safe if an embedder crosses threads.
static INTERNER: LazyLock<RwLock<Interner>> = LazyLock::new(|| {
    RwLock::new(Interner {
        names: Vec::new(),
        by_name: HashMap::new(),
    })
});

impl Symbol {
    pub fn intern(name: &str) -> Symbol {
        {
            let interner = INTERNER.read().expect("symbol interner poisoned");
            if let Some(&id) = interner.by_name.get(name) {
                return Symbol(id);
            }
        }
        let mut interner = INTERNER.write().expect("symbol interner poisoned");
        // Re-check: another writer may have interned it between the locks.
        if let Some(&id) = interner.by_name.get(name) {
            return Symbol(id);
        }
        let id = interner.names.len() as u32;
        let arc: Arc<str> = Arc::from(name);
        interner.names.push(arc.clone());
        interner.by_name.insert(arc, id);
        Symbol(id)
    }

    pub fn name(&self) -> Arc<str> {
        let interner = INTERNER.read().expect("symbol interner poisoned");
        interner.names[self.0 as usize].clone()
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.name())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Symbol {
        Symbol::intern(name)
    }
}

/// IR head tags. Dispatch is by symbol identity: the head symbol of a cell is
/// resolved to a `Tag` once, then matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    // declarations and statements
    Let,
    Var,
    Const,
    Function,
    Generator,
    Class,
    Extends,
    Block,
    Return,
    ExprStmt,
    If,
    While,
    DoWhile,
    For,
    ForIn,
    ForOf,
    ForAwaitOf,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    Break,
    Continue,
    Label,
    EmptyStmt,
    UseStrict,
    // class members
    Method,
    StaticMethod,
    Getter,
    Setter,
    StaticGetter,
    StaticSetter,
    PublicField,
    PrivateField,
    StaticField,
    // expressions
    Assign,
    Call,
    OptionalCall,
    New,
    GetProp,
    OptionalGetProp,
    SetProp,
    GetIndex,
    OptionalGetIndex,
    SetIndex,
    This,
    Super,
    Lambda,
    Object,
    Array,
    Prop,
    Ternary,
    Template,
    TaggedTemplate,
    Spread,
    Rest,
    Undefined,
    TypeOf,
    Void,
    Delete,
    Negate,
    UnaryPlus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Yield,
    YieldStar,
    // destructuring patterns
    ArrayPattern,
    ObjectPattern,
    PatternElement,
    PatternProperty,
    PatternRest,
    // binary operators (heads are the operator spellings)
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    LogicalAnd,
    LogicalOr,
    Nullish,
    InstanceOf,
    In,
    Comma,
}

const TAG_NAMES: &[(&str, Tag)] = &[
    ("let", Tag::Let),
    ("var", Tag::Var),
    ("const", Tag::Const),
    ("function", Tag::Function),
    ("generator", Tag::Generator),
    ("class", Tag::Class),
    ("extends", Tag::Extends),
    ("block", Tag::Block),
    ("return", Tag::Return),
    ("expr-stmt", Tag::ExprStmt),
    ("if", Tag::If),
    ("while", Tag::While),
    ("do-while", Tag::DoWhile),
    ("for", Tag::For),
    ("for-in", Tag::ForIn),
    ("for-of", Tag::ForOf),
    ("for-await-of", Tag::ForAwaitOf),
    ("switch", Tag::Switch),
    ("case", Tag::Case),
    ("default", Tag::Default),
    ("try", Tag::Try),
    ("catch", Tag::Catch),
    ("finally", Tag::Finally),
    ("throw", Tag::Throw),
    ("break", Tag::Break),
    ("continue", Tag::Continue),
    ("label", Tag::Label),
    ("empty-stmt", Tag::EmptyStmt),
    ("use-strict", Tag::UseStrict),
    ("method", Tag::Method),
    ("static-method", Tag::StaticMethod),
    ("getter", Tag::Getter),
    ("setter", Tag::Setter),
    ("static-getter", Tag::StaticGetter),
    ("static-setter", Tag::StaticSetter),
    ("public-field", Tag::PublicField),
    ("private-field", Tag::PrivateField),
    ("static-field", Tag::StaticField),
    ("assign", Tag::Assign),
    ("call", Tag::Call),
    ("optional-call", Tag::OptionalCall),
    ("new", Tag::New),
    ("get-prop", Tag::GetProp),
    ("optional-get-prop", Tag::OptionalGetProp),
    ("set-prop", Tag::SetProp),
    ("get-index", Tag::GetIndex),
    ("optional-get-index", Tag::OptionalGetIndex),
    ("set-index", Tag::SetIndex),
    ("this", Tag::This),
    ("super", Tag::Super),
    ("lambda", Tag::Lambda),
    ("object", Tag::Object),
    ("array", Tag::Array),
    ("prop", Tag::Prop),
    ("ternary", Tag::Ternary),
    ("template", Tag::Template),
    ("tagged-template", Tag::TaggedTemplate),
    ("spread", Tag::Spread),
    ("rest", Tag::Rest),
    ("undefined", Tag::Undefined),
    ("typeof", Tag::TypeOf),
    ("void", Tag::Void),
    ("delete", Tag::Delete),
    ("negate", Tag::Negate),
    ("unary-plus", Tag::UnaryPlus),
    ("not", Tag::Not),
    ("bit-not", Tag::BitNot),
    ("pre-inc", Tag::PreInc),
    ("pre-dec", Tag::PreDec),
    ("post-inc", Tag::PostInc),
    ("post-dec", Tag::PostDec),
    ("yield", Tag::Yield),
    ("yield*", Tag::YieldStar),
    ("array-pattern", Tag::ArrayPattern),
    ("object-pattern", Tag::ObjectPattern),
    ("pattern-element", Tag::PatternElement),
    ("pattern-property", Tag::PatternProperty),
    ("pattern-rest", Tag::PatternRest),
    ("+", Tag::Add),
    ("-", Tag::Sub),
    ("*", Tag::Mul),
    ("/", Tag::Div),
    ("%", Tag::Mod),
    ("**", Tag::Pow),
    ("==", Tag::Eq),
    ("!=", Tag::NotEq),
    ("===", Tag::StrictEq),
    ("!==", Tag::StrictNotEq),
    ("<", Tag::Lt),
    ("<=", Tag::Le),
    (">", Tag::Gt),
    (">=", Tag::Ge),
    ("&", Tag::BitAnd),
    ("|", Tag::BitOr),
    ("^", Tag::BitXor),
    ("<<", Tag::Shl),
    (">>", Tag::Shr),
    (">>>", Tag::UShr),
    ("&&", Tag::LogicalAnd),
    ("||", Tag::LogicalOr),
    ("??", Tag::Nullish),
    ("instanceof", Tag::InstanceOf),
    ("in", Tag::In),
    ("comma", Tag::Comma),
];

static TAG_TABLE: LazyLock<HashMap<Symbol, Tag>> = LazyLock::new(|| {
    TAG_NAMES
        .iter()
        .map(|(name, tag)| (Symbol::intern(name), *tag))
        .collect()
});

/// Resolve a head symbol to its dispatch tag, by identity.
pub fn tag_of(sym: Symbol) -> Option<Tag> {
    TAG_TABLE.get(&sym).copied()
}

// Reserved binding names used by the evaluator itself. They live in scope
// frames next to user bindings but their names cannot be produced by a
// conforming parser.
pub fn this_symbol() -> Symbol {
    Symbol::intern("this")
}

pub fn super_binding_symbol() -> Symbol {
    Symbol::intern("__super_binding__")
}

pub fn yield_tracker_symbol() -> Symbol {
    Symbol::intern("__yield_tracker__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_identity() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("foo");
        let c = Symbol::intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(&*a.name(), "foo");
    }

    #[test]
    fn tags_resolve_by_identity() {
        assert_eq!(tag_of(Symbol::intern("let")), Some(Tag::Let));
        assert_eq!(tag_of(Symbol::intern("yield*")), Some(Tag::YieldStar));
        assert_eq!(tag_of(Symbol::intern(">>>")), Some(Tag::UShr));
        assert_eq!(tag_of(Symbol::intern("frobnicate")), None);
    }
}
