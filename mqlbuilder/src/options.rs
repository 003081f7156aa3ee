/// Resolution nests at most this many operators and stages by default.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options consulted while rendering statements.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum number of nested operator or stage nodes resolved before
    /// the expression is reported as cyclic.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn new(max_depth: usize) -> Self {
        RenderOptions { max_depth }
    }
}

/// Specifies which spellings of a field name keyword construction accepts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Naming {
    /// Only canonical snake_case names and declared aliases.
    Canonical,
    /// Canonical names, aliases, and the camelCase wire spelling of either
    /// (e.g. `includeArrayIndex` for `include_array_index`).
    #[default]
    AcceptWireNames,
}

/// Options passed in for keyword construction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ArgOptions {
    pub naming: Naming,
}

impl ArgOptions {
    pub fn new(naming: Naming) -> Self {
        ArgOptions { naming }
    }
}
