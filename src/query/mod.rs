//! Structured listing queries
//!
//! A [`ListingQuery`] is the store-facing half of a search: the predicates the
//! backing store evaluates, the ordering it applies and an optional limit. It can be
//! rendered as PostgREST query parameters or evaluated directly against rows.
//!
//! Supported operations:
//! - equality on boolean/text/number columns
//! - case-insensitive substring on one column, or OR-ed across several
//! - `>=` / `<=` on numeric columns
//! - array overlap on array columns
//! - multi-column ordering and a row limit

use crate::models::GymListing;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Characters that must be quoted inside PostgREST `or=(...)` and array literals
static RESERVED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[,.:()"\\{}\s]"#).expect("reserved character pattern"));

/// Columns of the listings table that queries may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Name,
    Address,
    City,
    State,
    PricePerSession,
    Rating,
    TotalReviews,
    Facilities,
    IsApproved,
    IsActive,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::PricePerSession => "price_per_session",
            Self::Rating => "rating",
            Self::TotalReviews => "total_reviews",
            Self::Facilities => "facilities",
            Self::IsApproved => "is_approved",
            Self::IsActive => "is_active",
        }
    }

    fn read<'a>(&self, gym: &'a GymListing) -> Cell<'a> {
        match self {
            Self::Id => Cell::Text(&gym.id),
            Self::Name => Cell::Text(&gym.name),
            Self::Address => Cell::Text(&gym.address),
            Self::City => Cell::Text(&gym.city),
            Self::State => Cell::Text(&gym.state),
            Self::PricePerSession => Cell::Number(gym.price_per_session),
            Self::Rating => Cell::Number(gym.rating),
            Self::TotalReviews => Cell::Number(f64::from(gym.total_reviews)),
            Self::Facilities => Cell::Array(&gym.facilities),
            Self::IsApproved => Cell::Bool(gym.is_approved),
            Self::IsActive => Cell::Bool(gym.is_active),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column value read from a row
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Array(&'a [String]),
}

/// Literal compared against a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A boolean condition narrowing the listing set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { column: Column, value: Value },
    /// Case-insensitive substring match on one column
    ILike { column: Column, text: String },
    /// Case-insensitive substring match on any of several columns
    AnyILike { columns: Vec<Column>, text: String },
    Gte { column: Column, value: f64 },
    Lte { column: Column, value: f64 },
    /// Array column shares at least one element with `values`
    Overlaps { column: Column, values: Vec<String> },
}

impl Predicate {
    /// Evaluate the predicate against a row
    pub fn matches(&self, gym: &GymListing) -> bool {
        match self {
            Self::Eq { column, value } => match (column.read(gym), value) {
                (Cell::Bool(have), Value::Bool(want)) => have == *want,
                (Cell::Number(have), Value::Number(want)) => have == *want,
                (Cell::Text(have), Value::Text(want)) => have == want,
                _ => false,
            },
            Self::ILike { column, text } => contains_ignore_case(column.read(gym), text),
            Self::AnyILike { columns, text } => columns
                .iter()
                .any(|c| contains_ignore_case(c.read(gym), text)),
            Self::Gte { column, value } => {
                matches!(column.read(gym), Cell::Number(n) if n >= *value)
            }
            Self::Lte { column, value } => {
                matches!(column.read(gym), Cell::Number(n) if n <= *value)
            }
            Self::Overlaps { column, values } => match column.read(gym) {
                Cell::Array(have) => values.iter().any(|v| have.contains(v)),
                _ => false,
            },
        }
    }

    /// Render as a PostgREST `(key, value)` query pair
    pub fn to_param(&self) -> (String, String) {
        match self {
            Self::Eq { column, value } => (column.to_string(), format!("eq.{}", value)),
            Self::ILike { column, text } => {
                let (op, operand) = substring_operand(text);
                (column.to_string(), format!("{}.{}", op, operand))
            }
            Self::AnyILike { columns, text } => {
                let (op, operand) = substring_operand(text);
                let operand = quote_reserved(&operand);
                let clauses = columns
                    .iter()
                    .map(|c| format!("{}.{}.{}", c, op, operand))
                    .collect::<Vec<_>>()
                    .join(",");
                ("or".to_string(), format!("({})", clauses))
            }
            Self::Gte { column, value } => (column.to_string(), format!("gte.{}", value)),
            Self::Lte { column, value } => (column.to_string(), format!("lte.{}", value)),
            Self::Overlaps { column, values } => {
                let items = values
                    .iter()
                    .map(|v| quote(v))
                    .collect::<Vec<_>>()
                    .join(",");
                (column.to_string(), format!("ov.{{{}}}", items))
            }
        }
    }
}

fn contains_ignore_case(cell: Cell<'_>, text: &str) -> bool {
    match cell {
        Cell::Text(have) => have.to_lowercase().contains(&text.to_lowercase()),
        _ => false,
    }
}

/// Operator and operand for a literal, case-insensitive substring match.
///
/// PostgREST rewrites every `*` in a like pattern to `%`, escaped or not, so text
/// containing `*` goes through `imatch` with the regex metacharacters escaped.
fn substring_operand(text: &str) -> (&'static str, String) {
    if text.contains('*') {
        ("imatch", regex::escape(text))
    } else {
        ("ilike", like_pattern(text))
    }
}

/// `%text%` with LIKE metacharacters in the user text escaped
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn quote_reserved(value: &str) -> String {
    if RESERVED.is_match(value) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: Column,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    fn to_param(self) -> String {
        if self.descending {
            format!("{}.desc.nullslast", self.column)
        } else {
            format!("{}.asc", self.column)
        }
    }

    fn compare(&self, a: &GymListing, b: &GymListing) -> Ordering {
        let ordering = match (self.column.read(a), self.column.read(b)) {
            (Cell::Number(x), Cell::Number(y)) => x.total_cmp(&y),
            (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
            (Cell::Bool(x), Cell::Bool(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Query against the listings table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    pub predicates: Vec<Predicate>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: Column, value: Value) -> Self {
        self.predicates.push(Predicate::Eq { column, value });
        self
    }

    pub fn ilike(mut self, column: Column, text: impl Into<String>) -> Self {
        self.predicates.push(Predicate::ILike {
            column,
            text: text.into(),
        });
        self
    }

    pub fn any_ilike(mut self, columns: &[Column], text: impl Into<String>) -> Self {
        self.predicates.push(Predicate::AnyILike {
            columns: columns.to_vec(),
            text: text.into(),
        });
        self
    }

    pub fn gte(mut self, column: Column, value: f64) -> Self {
        self.predicates.push(Predicate::Gte { column, value });
        self
    }

    pub fn lte(mut self, column: Column, value: f64) -> Self {
        self.predicates.push(Predicate::Lte { column, value });
        self
    }

    pub fn overlaps(mut self, column: Column, values: Vec<String>) -> Self {
        self.predicates.push(Predicate::Overlaps { column, values });
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every predicate holds for the row
    pub fn matches(&self, gym: &GymListing) -> bool {
        self.predicates.iter().all(|p| p.matches(gym))
    }

    /// Compare two rows by the query's sort keys
    pub fn compare(&self, a: &GymListing, b: &GymListing) -> Ordering {
        self.order
            .iter()
            .map(|o| o.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// PostgREST query parameters, in a stable order. Keys may repeat.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.predicates.iter().map(Predicate::to_param));

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| o.to_param())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gym() -> GymListing {
        GymListing::new("g1", "Iron Paradise")
            .with_location("4 Park Street", "Kolkata", "West Bengal")
            .with_price(500.0)
            .with_rating(4.5, 20)
            .with_facilities(["Sauna", "Parking"])
    }

    #[test]
    fn test_predicates_match() {
        let g = gym();
        assert!(ListingQuery::new()
            .eq(Column::IsApproved, Value::Bool(true))
            .ilike(Column::Name, "iron")
            .any_ilike(&[Column::City, Column::State, Column::Address], "BENGAL")
            .gte(Column::PricePerSession, 500.0)
            .lte(Column::PricePerSession, 500.0)
            .gte(Column::Rating, 4.5)
            .matches(&g));

        assert!(!ListingQuery::new().ilike(Column::Name, "yoga").matches(&g));
        assert!(!ListingQuery::new().gte(Column::Rating, 4.6).matches(&g));
        assert!(!ListingQuery::new().lte(Column::PricePerSession, 499.0).matches(&g));
        assert!(ListingQuery::new()
            .overlaps(Column::Facilities, vec!["Pool".into(), "Sauna".into()])
            .matches(&g));
        assert!(!ListingQuery::new()
            .overlaps(Column::Facilities, vec!["CrossFit".into()])
            .matches(&g));
        // type mismatch never matches
        assert!(!ListingQuery::new()
            .eq(Column::Name, Value::Bool(true))
            .matches(&g));
    }

    #[test]
    fn test_postgrest_params() {
        let query = ListingQuery::new()
            .eq(Column::IsApproved, Value::Bool(true))
            .eq(Column::IsActive, Value::Bool(true))
            .any_ilike(&[Column::City, Column::State], "pune")
            .ilike(Column::Name, "Iron")
            .gte(Column::PricePerSession, 0.0)
            .lte(Column::PricePerSession, 2000.0)
            .gte(Column::Rating, 4.5)
            .order_by(Order::desc(Column::Rating))
            .order_by(Order::asc(Column::Id))
            .limit(6);

        let params = query.to_params();
        let expected: Vec<(String, String)> = [
            ("select", "*"),
            ("is_approved", "eq.true"),
            ("is_active", "eq.true"),
            ("or", "(city.ilike.%pune%,state.ilike.%pune%)"),
            ("name", "ilike.%Iron%"),
            ("price_per_session", "gte.0"),
            ("price_per_session", "lte.2000"),
            ("rating", "gte.4.5"),
            ("order", "rating.desc.nullslast,id.asc"),
            ("limit", "6"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(params, expected);
    }

    #[test]
    fn test_reserved_characters_are_quoted() {
        let (key, value) = Predicate::AnyILike {
            columns: vec![Column::City, Column::Address],
            text: "MG Road, 5".to_string(),
        }
        .to_param();
        assert_eq!(key, "or");
        assert_eq!(
            value,
            r#"(city.ilike."%MG Road, 5%",address.ilike."%MG Road, 5%")"#
        );

        let (_, value) = Predicate::ILike {
            column: Column::Name,
            text: "100%_fit".to_string(),
        }
        .to_param();
        assert_eq!(value, r"ilike.%100\%\_fit%");

        // `*` is a wildcard in PostgREST like patterns, so it needs a regex match
        let (_, value) = Predicate::ILike {
            column: Column::Name,
            text: "24*7 Fitness".to_string(),
        }
        .to_param();
        assert_eq!(value, r"imatch.24\*7 Fitness");

        let (_, value) = Predicate::AnyILike {
            columns: vec![Column::City, Column::Address],
            text: "Plot 4*B".to_string(),
        }
        .to_param();
        assert_eq!(
            value,
            r#"(city.imatch."Plot 4\\*B",address.imatch."Plot 4\\*B")"#
        );

        let (_, value) = Predicate::Overlaps {
            column: Column::Facilities,
            values: vec!["Sauna".into(), "Swimming Pool".into()],
        }
        .to_param();
        assert_eq!(value, r#"ov.{"Sauna","Swimming Pool"}"#);
    }

    #[test]
    fn test_ordering() {
        let query = ListingQuery::new()
            .order_by(Order::desc(Column::Rating))
            .order_by(Order::asc(Column::Id));

        let a = GymListing::new("a", "A").with_rating(4.0, 1);
        let b = GymListing::new("b", "B").with_rating(4.8, 1);
        let c = GymListing::new("c", "C").with_rating(4.0, 1);

        assert_eq!(query.compare(&b, &a), Ordering::Less);
        assert_eq!(query.compare(&a, &c), Ordering::Less);
        assert_eq!(query.compare(&a, &a), Ordering::Equal);
    }
}
