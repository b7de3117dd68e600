//! crates/cinema_core/src/query.rs
//!
//! Query descriptors for the `films` collection and the category lookup table.
//!
//! A [`FilmQuery`] is plain data: the core builds it, an adapter translates it
//! into whatever the backend speaks.

/// Columns of the `films` collection that can be filtered or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmColumn {
    Title,
    Genre,
    ReleaseYear,
    Rating,
}

impl FilmColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            FilmColumn::Title => "title",
            FilmColumn::Genre => "genre",
            FilmColumn::ReleaseYear => "release_year",
            FilmColumn::Rating => "rating",
        }
    }
}

/// A numeric literal compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Int(v) => write!(f, "{}", v),
            FilterValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// A single-column filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column contains the needle, ignoring case.
    Contains(FilmColumn, String),
    /// Column is greater than or equal to the value.
    AtLeast(FilmColumn, FilterValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: FilmColumn,
    pub descending: bool,
}

/// A read against the `films` collection. Rows without a value in the sort
/// column always come last.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmQuery {
    pub filter: Option<Filter>,
    pub order: Order,
    pub limit: Option<usize>,
}

impl FilmQuery {
    /// Every film, best rated first.
    pub fn by_rating() -> Self {
        Self {
            filter: None,
            order: Order {
                column: FilmColumn::Rating,
                descending: true,
            },
            limit: None,
        }
    }

    pub fn filtered(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Films whose title contains `needle` in any case.
    pub fn title_search(needle: &str) -> Self {
        Self::by_rating().filtered(Filter::Contains(FilmColumn::Title, needle.to_string()))
    }

    /// Films for a category tag. Unknown tags yield the unfiltered query.
    pub fn category(tag: &str) -> Self {
        match category_filter(tag) {
            Some(rule) => Self::by_rating().filtered(rule.to_filter()),
            None => Self::by_rating(),
        }
    }
}

//=========================================================================================
// Category Table
//=========================================================================================

/// How a category narrows the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryFilter {
    MinRating(f64),
    MinReleaseYear(i64),
    /// Case-insensitive keyword matched anywhere in the genre column.
    GenreKeyword(&'static str),
}

impl CategoryFilter {
    pub fn to_filter(self) -> Filter {
        match self {
            CategoryFilter::MinRating(min) => {
                Filter::AtLeast(FilmColumn::Rating, FilterValue::Float(min))
            }
            CategoryFilter::MinReleaseYear(year) => {
                Filter::AtLeast(FilmColumn::ReleaseYear, FilterValue::Int(year))
            }
            CategoryFilter::GenreKeyword(keyword) => {
                Filter::Contains(FilmColumn::Genre, keyword.to_string())
            }
        }
    }
}

/// Category tag to filter. Genres are stored in Russian in the catalog.
pub const CATEGORY_FILTERS: &[(&str, CategoryFilter)] = &[
    ("popular", CategoryFilter::MinRating(8.0)),
    ("new", CategoryFilter::MinReleaseYear(2023)),
    ("comedy", CategoryFilter::GenreKeyword("комедия")),
    ("drama", CategoryFilter::GenreKeyword("драма")),
    ("horror", CategoryFilter::GenreKeyword("ужас")),
    ("fantasy", CategoryFilter::GenreKeyword("фантастика")),
];

pub fn category_filter(tag: &str) -> Option<CategoryFilter> {
    CATEGORY_FILTERS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, rule)| *rule)
}
