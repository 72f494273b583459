//! Movie listing rules.
//!
//! Raw request parameters are never rejected. Anything that does not fit the
//! allow-lists or bounds falls back to a default, so a listing request always
//! resolves to a well-formed [`MovieQuery`].

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Title,
    Rating,
    ReleaseDate,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "rating" => Some(Self::Rating),
            "release_date" => Some(Self::ReleaseDate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Rating => "rating",
            SortField::ReleaseDate => "release_date",
        }
    }

    /// Column name used in ORDER BY. Never derived from user input.
    pub fn column(&self) -> &'static str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Listing parameters exactly as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieListParams {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub rating: Option<f64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// A normalized listing request.
///
/// Field order is fixed; the serialized form feeds cache key derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub min_rating: Option<f64>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

impl MovieQuery {
    pub fn normalize(params: MovieListParams) -> Self {
        let MovieListParams {
            search,
            genre,
            language,
            rating,
            sort_by,
            order,
            page,
            page_size,
        } = params;

        Self {
            search: non_blank(search),
            genre: non_blank(genre),
            language: non_blank(language),
            min_rating: rating.filter(|value| (MIN_RATING..=MAX_RATING).contains(value)),
            sort_by: sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            order: order.as_deref().and_then(SortOrder::parse).unwrap_or_default(),
            page: positive_u32(page).unwrap_or(DEFAULT_PAGE),
            page_size: positive_u32(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Rows to skip before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for MovieQuery {
    fn default() -> Self {
        Self::normalize(MovieListParams::default())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn positive_u32(value: Option<i64>) -> Option<u32> {
    value
        .filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
}
