use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// TOML parse / deserialization error.
    #[error("catalog parse error: {0}")]
    CatalogParse(String),

    /// Catalog validation error (bad range, duplicate field, etc.).
    #[error("catalog validation error: {0}")]
    CatalogValidation(String),

    /// Two ranges of the same group overlap.
    #[error("group '{group}': range [{a_start}, {a_end}] overlaps [{b_start}, {b_end}]")]
    OverlappingRanges {
        group: String,
        a_start: i64,
        a_end: i64,
        b_start: i64,
        b_end: i64,
    },

    /// Missing required column in the food table.
    #[error("food table: missing column '{0}'")]
    MissingColumn(String),

    /// Malformed CSV input.
    #[error("food table: {0}")]
    Csv(String),

    /// Caller asked for recommendations without selecting any group.
    #[error("no food group selected")]
    NoGroupSelected,

    /// Requested result count must be positive.
    #[error("result count must be at least 1")]
    InvalidCount,
}
