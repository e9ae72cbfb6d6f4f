use serde::{Deserialize, Serialize};

/// Reason a [`Document`] contributed no content to a shard (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    TooLarge,
    TooSmall,
    Binary,
    TooManyTrigrams,
}

/// Byte range into a document's content naming a symbol, plus the metadata
/// the match-tree evaluator hydrates a candidate with (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSection {
    pub start: u32,
    pub end: u32,
    pub kind: String,
    pub parent: Option<String>,
    pub name: String,
}

/// One file handed to the [`shard_builder`](../shard_builder/index.html) by
/// the (out of scope) ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    /// `None` iff `skip_reason.is_some()`.
    pub content: Option<Vec<u8>>,
    pub branches: Vec<String>,
    pub sub_repository_path: String,
    pub language: String,
    pub category: DocumentCategory,
    pub symbols: Vec<SymbolSection>,
    pub skip_reason: Option<SkipReason>,
}

/// Category tag used by the builder's within-shard ranking policy
/// (spec.md §4.1 item 5: "penalizes test / generated / vendored categories").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DocumentCategory {
    #[default]
    Normal,
    Test,
    Generated,
    Vendored,
}

impl Document {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: Some(content),
            branches: Vec::new(),
            sub_repository_path: String::new(),
            language: String::new(),
            category: DocumentCategory::Normal,
            symbols: Vec::new(),
            skip_reason: None,
        }
    }

    pub fn skipped(name: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            name: name.into(),
            content: None,
            branches: Vec::new(),
            sub_repository_path: String::new(),
            language: String::new(),
            category: DocumentCategory::Normal,
            symbols: Vec::new(),
            skip_reason: Some(reason),
        }
    }

    pub fn with_branches(mut self, branches: impl IntoIterator<Item = String>) -> Self {
        self.branches = branches.into_iter().collect();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_category(mut self, category: DocumentCategory) -> Self {
        self.category = category;
        self
    }
}
