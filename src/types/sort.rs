use serde::{Deserialize, Serialize};

/// Sort direction of a sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Value for `aria-sort`.
    pub fn aria_sort(self) -> &'static str {
        match self {
            Self::Asc => "ascending",
            Self::Desc => "descending",
        }
    }
}

/// One entry of the caller-owned sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortColumn {
    pub column_key: String,
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn new(column_key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_key: column_key.into(),
            direction,
        }
    }
}
