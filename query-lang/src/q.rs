//! The query algebra (spec.md §4.2 "Query model"). `Q` is evaluated, not
//! executed directly — `match-engine` compiles it against a shard's
//! `IndexData` into a cost-tiered evaluator tree.

use std::collections::BTreeSet;

/// A file's coarse classification, mirrored from `shard-format::DocumentCategory`
/// without depending on that crate (kept decoupled per spec.md §4.2: "the
/// query model has no shard-format dependency"; `match-engine` bridges the
/// two when it compiles a query against a loaded shard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocKind {
    Normal,
    Test,
    Generated,
    Vendored,
}

/// The `case:{yes|no|auto}` query modifier (spec.md §4.2 item 4). `Auto`
/// resolves per-pattern: a pattern containing an uppercase letter is treated
/// as case-sensitive, matching the convention most trigram-backed code
/// search engines use so `Foo` doesn't silently match `foo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Yes,
    No,
    Auto,
}

impl CaseSensitivity {
    /// Resolves `Auto` against `pattern`; `Yes`/`No` pass through unchanged.
    pub fn resolve(self, pattern: &str) -> bool {
        match self {
            CaseSensitivity::Yes => true,
            CaseSensitivity::No => false,
            CaseSensitivity::Auto => pattern.chars().any(|c| c.is_uppercase()),
        }
    }
}

impl From<bool> for CaseSensitivity {
    fn from(case_sensitive: bool) -> Self {
        if case_sensitive {
            CaseSensitivity::Yes
        } else {
            CaseSensitivity::No
        }
    }
}

/// One `branch -> repo ids` pairing, used by [`Q::BranchesRepos`] to restrict
/// a search to specific branches of specific repositories in one leaf rather
/// than an `Or` of `(Branch, Repo)` pairs (spec.md §4.2 item 9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRepos {
    pub branch: String,
    pub repo_ids: BTreeSet<u32>,
}

/// The full query algebra.
///
/// ```
/// use query_lang::Q;
/// let q = Q::and(vec![Q::substring("needle", false), Q::Language("rust".into())]);
/// assert!(matches!(q, Q::And(parts) if parts.len() == 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Q {
    Const(bool),
    And(Vec<Q>),
    Or(Vec<Q>),
    Not(Box<Q>),

    /// A literal substring match (spec.md §4.2 item 1). `word_boundary` is
    /// set by the simplifier's word-regex fast path (spec.md §4.2 item 6:
    /// `\bLITERAL\b` degrades from `Regexp` into this).
    Substring {
        pattern: String,
        case_sensitive: CaseSensitivity,
        content: bool,
        file_name: bool,
        word_boundary: bool,
    },

    Regexp {
        pattern: String,
        case_sensitive: CaseSensitivity,
        content: bool,
        file_name: bool,
    },

    /// Restricts an inner leaf to symbol sections only (spec.md §4.2 item
    /// 7). `exact` is set by the simplifier's anchor-stripping pass: a
    /// pattern of the form `^...$` requires the match to span the whole
    /// symbol section rather than merely fall inside it.
    Symbol(Box<Q>, bool),

    /// Substring (or, with `exact`, exact) match against a branch name.
    Branch {
        pattern: String,
        exact: bool,
    },
    Language(String),

    /// Substring match against repository name.
    Repo(String),
    RepoRegexp(String),
    RepoSet(BTreeSet<String>),
    RepoIds(BTreeSet<u32>),
    BranchesRepos(Vec<BranchRepos>),

    FileNameSet(BTreeSet<String>),
    Type(DocKind),

    /// A regex match against one piece of repository metadata (spec.md §4.2
    /// item 10, §4.3: "materialized into... a cached docMatchTree keyed by
    /// (field, checksum(regex))").
    Meta {
        field: String,
        regex: String,
    },

    /// Repository `raw-config` bitmask filter (spec.md §3's `RawConfig`
    /// flags, represented numerically here to avoid a `shard-format`
    /// dependency; `match-engine` maps bit positions).
    RawConfig(u64),

    Boost {
        query: Box<Q>,
        factor: f64,
    },

    /// Marks `inner` as a filter that narrows candidates but whose own
    /// matched spans must not surface in results (spec.md §4.3: the
    /// `NoVisitMatchTree` wrapper the simplifier puts around a regex's
    /// extracted trigram pre-filter, so the filter doesn't double-report the
    /// regex's own matches).
    NoVisit(Box<Q>),
}

impl Q {
    pub fn substring(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Q::Substring {
            pattern: pattern.into(),
            case_sensitive: case_sensitive.into(),
            content: true,
            file_name: true,
            word_boundary: false,
        }
    }

    /// A substring leaf whose case sensitivity is resolved per-pattern by
    /// the simplifier (`case:auto`).
    pub fn substring_auto(pattern: impl Into<String>) -> Self {
        Q::Substring {
            pattern: pattern.into(),
            case_sensitive: CaseSensitivity::Auto,
            content: true,
            file_name: true,
            word_boundary: false,
        }
    }

    pub fn regexp(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Q::Regexp {
            pattern: pattern.into(),
            case_sensitive: case_sensitive.into(),
            content: true,
            file_name: true,
        }
    }

    pub fn regexp_auto(pattern: impl Into<String>) -> Self {
        Q::Regexp {
            pattern: pattern.into(),
            case_sensitive: CaseSensitivity::Auto,
            content: true,
            file_name: true,
        }
    }

    pub fn and(parts: Vec<Q>) -> Self {
        Q::And(parts)
    }

    pub fn or(parts: Vec<Q>) -> Self {
        Q::Or(parts)
    }

    pub fn not(inner: Q) -> Self {
        Q::Not(Box::new(inner))
    }

    /// A `sym:` leaf with no anchor information yet; the simplifier's
    /// anchor-stripping pass decides the final `exact` flag.
    pub fn symbol(inner: Q) -> Self {
        Q::Symbol(Box::new(inner), false)
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Q::Branch {
            pattern: name.into(),
            exact: true,
        }
    }

    pub fn is_const(&self, value: bool) -> bool {
        matches!(self, Q::Const(v) if *v == value)
    }
}
