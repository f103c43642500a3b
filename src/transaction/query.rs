//! Turns the raw filter parameters of a sales request into a normalized query.
//!
//! Normalization never fails: malformed values are either ignored or, when they
//! make the request contradictory, collapse the whole request into
//! [QueryDecision::Unsatisfiable] so the caller can answer with an empty page
//! without touching the database.

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// The raw query parameters accepted by the sales endpoint.
///
/// Every field is kept as text so that a malformed value never rejects the
/// request; see [normalize_query] for how each one is interpreted.
/// List parameters are comma separated, e.g. `regions=North,South`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesQuery {
    /// Free text matched against customer names and phone numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Customer regions, e.g. `North,South`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<String>,
    /// Customer genders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genders: Option<String>,
    /// The youngest customer age to include.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_min: Option<String>,
    /// The oldest customer age to include.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_max: Option<String>,
    /// Product categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    /// Matches sales with any of these tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Payment methods, e.g. `UPI,Cash`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<String>,
    /// The first day to include, as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// The last day to include, as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// One of `date`, `quantity` or `customerName`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    /// The 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl SalesQuery {
    /// Collect decoded query string pairs into a [SalesQuery].
    ///
    /// Repeated list keys such as `regions=North&regions=South` are joined with
    /// commas. For any other repeated key the last value wins. Unknown keys are
    /// ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "search" => query.search = Some(value),
                "regions" => append_list_value(&mut query.regions, value),
                "genders" => append_list_value(&mut query.genders, value),
                "ageMin" => query.age_min = Some(value),
                "ageMax" => query.age_max = Some(value),
                "categories" => append_list_value(&mut query.categories, value),
                "tags" => append_list_value(&mut query.tags, value),
                "paymentMethods" => append_list_value(&mut query.payment_methods, value),
                "startDate" => query.start_date = Some(value),
                "endDate" => query.end_date = Some(value),
                "sortBy" => query.sort_by = Some(value),
                "sortOrder" => query.sort_order = Some(value),
                "page" => query.page = Some(value),
                _ => {}
            }
        }

        query
    }
}

fn append_list_value(list: &mut Option<String>, value: String) {
    match list {
        Some(existing) => {
            existing.push(',');
            existing.push_str(&value);
        }
        None => *list = Some(value),
    }
}

/// A set of accepted values for one field, e.g. the regions to include.
///
/// An empty filter places no restriction on the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter(Vec<String>);

impl ListFilter {
    /// Build a filter from a comma separated string such as `"North, South,"`.
    ///
    /// Missing and blank strings give an empty filter.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => Self::from_values(raw.split(',')),
            None => Self::default(),
        }
    }

    /// Build a filter from already separated values.
    ///
    /// Values are trimmed, blanks are dropped, and each value may itself be a
    /// comma separated list, so repeated query keys and joined strings give
    /// the same filter.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted: Vec<String> = Vec::new();

        for value in values {
            for part in value.as_ref().split(',') {
                let part = part.trim();
                if !part.is_empty() && !accepted.iter().any(|existing| existing == part) {
                    accepted.push(part.to_owned());
                }
            }
        }

        Self(accepted)
    }

    /// The accepted values, in the order they were given.
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Whether the filter places no restriction on the field.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The values joined back into a comma separated string.
    pub fn to_query_value(&self) -> String {
        self.0.join(",")
    }
}

/// A free text search over customer names and phone numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `None` for missing or blank input.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let term = raw?.trim();

        if term.is_empty() {
            None
        } else {
            Some(Self(term.to_owned()))
        }
    }

    /// The trimmed search text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A SQL `LIKE` pattern matching any text that contains the term literally.
    ///
    /// Must be used with `ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like_pattern(&self.0))
    }
}

/// Escape the `LIKE` wildcards `%` and `_` and the escape character `\` so
/// that `text` only matches itself.
pub fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}

/// An inclusive range of customer ages, either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeRange {
    /// The youngest age included.
    pub min: Option<u32>,
    /// The oldest age included.
    pub max: Option<u32>,
}

/// An inclusive range of sale times, either end may be open.
///
/// The start is the first instant of the start day and the end is the last
/// millisecond of the end day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    /// Sales before this time are excluded.
    pub start: Option<PrimitiveDateTime>,
    /// Sales after this time are excluded.
    pub end: Option<PrimitiveDateTime>,
}

/// The conditions a sale must meet to be included in a response.
///
/// The same filter is used for the page, the count, and the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    /// Matches the customer name or phone number.
    pub search: Option<SearchTerm>,
    /// Allowed customer regions.
    pub regions: ListFilter,
    /// Allowed customer genders.
    pub genders: ListFilter,
    /// Allowed product categories.
    pub categories: ListFilter,
    /// Matches sales that have at least one of these tags.
    pub tags: ListFilter,
    /// Allowed payment methods.
    pub payment_methods: ListFilter,
    /// Sales without an age are excluded once either end is set.
    pub age: AgeRange,
    /// Sales without a date are excluded once either end is set.
    pub dates: DateBounds,
}

/// The field to sort sales by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// The sale date.
    #[default]
    Date,
    /// The number of units sold.
    Quantity,
    /// The customer name, alphabetically.
    CustomerName,
}

impl SortField {
    /// Unrecognized values sort by date.
    pub fn from_query_value(value: &str) -> Self {
        match value.trim() {
            "quantity" => Self::Quantity,
            "customerName" => Self::CustomerName,
            _ => Self::Date,
        }
    }

    /// The value of the `sortBy` query parameter for this field.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Quantity => "quantity",
            Self::CustomerName => "customerName",
        }
    }
}

/// The order to sort sales in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl SortOrder {
    /// Anything other than `asc` sorts in descending order.
    pub fn from_query_value(value: &str) -> Self {
        if value.trim() == "asc" {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    /// The value of the `sortOrder` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A validated sales query, ready to run against the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Which sales to include.
    pub filter: SalesFilter,
    /// The field to sort by. Ties are broken by insertion order.
    pub sort_field: SortField,
    /// The direction to sort in.
    pub sort_order: SortOrder,
    /// The 1-based page number.
    pub page: u64,
}

/// The outcome of normalizing a [SalesQuery].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDecision {
    /// The filters contradict each other, so no sale can match.
    Unsatisfiable {
        /// The requested page, echoed back in the empty response.
        page: u64,
    },
    /// The query to run.
    Normalized(NormalizedQuery),
}

/// Interpret the raw parameters of a sales request.
///
/// - `search` is trimmed and ignored when blank.
/// - List parameters are split on commas, trimmed, and blanks dropped.
/// - `ageMin`/`ageMax` that are not non-negative integers are ignored.
/// - `startDate`/`endDate` that are present but not dates make the request
///   unsatisfiable, blank values are ignored.
/// - Inverted age or date ranges make the request unsatisfiable.
/// - `sortBy` falls back to `date`, `sortOrder` to descending.
/// - `page` that is not a positive integer becomes 1.
pub fn normalize_query(query: &SalesQuery) -> QueryDecision {
    let page = parse_page(query.page.as_deref());

    let age = AgeRange {
        min: parse_age(query.age_min.as_deref()),
        max: parse_age(query.age_max.as_deref()),
    };

    if let AgeRange {
        min: Some(min),
        max: Some(max),
    } = age
        && min > max
    {
        tracing::debug!("age range {min}-{max} is inverted, no sales can match");
        return QueryDecision::Unsatisfiable { page };
    }

    let start = match parse_filter_date(query.start_date.as_deref()) {
        Ok(date) => date.map(Date::midnight),
        Err(raw) => {
            tracing::debug!("start date {raw:?} is not a date, no sales can match");
            return QueryDecision::Unsatisfiable { page };
        }
    };
    let end = match parse_filter_date(query.end_date.as_deref()) {
        Ok(date) => date.map(|date| date.with_time(time::macros::time!(23:59:59.999))),
        Err(raw) => {
            tracing::debug!("end date {raw:?} is not a date, no sales can match");
            return QueryDecision::Unsatisfiable { page };
        }
    };

    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        tracing::debug!("date range {start} to {end} is inverted, no sales can match");
        return QueryDecision::Unsatisfiable { page };
    }

    QueryDecision::Normalized(NormalizedQuery {
        filter: SalesFilter {
            search: SearchTerm::parse(query.search.as_deref()),
            regions: ListFilter::parse(query.regions.as_deref()),
            genders: ListFilter::parse(query.genders.as_deref()),
            categories: ListFilter::parse(query.categories.as_deref()),
            tags: ListFilter::parse(query.tags.as_deref()),
            payment_methods: ListFilter::parse(query.payment_methods.as_deref()),
            age,
            dates: DateBounds { start, end },
        },
        sort_field: query
            .sort_by
            .as_deref()
            .map(SortField::from_query_value)
            .unwrap_or_default(),
        sort_order: query
            .sort_order
            .as_deref()
            .map(SortOrder::from_query_value)
            .unwrap_or_default(),
        page,
    })
}

fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

fn parse_age(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|raw| raw.trim().parse::<u32>().ok())
}

const FILTER_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a date filter value.
///
/// Returns `Ok(None)` for a missing or blank value and `Err` with the raw
/// text when a value is present but is not a date.
fn parse_filter_date(raw: Option<&str>) -> Result<Option<Date>, &str> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = Date::parse(text, FILTER_DATE_FORMAT) {
        return Ok(Some(date));
    }

    // Full timestamps are accepted, only the calendar date is used.
    OffsetDateTime::parse(text, &Rfc3339)
        .map(|date_time| Some(date_time.date()))
        .map_err(|_| raw)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::{
        AgeRange, DateBounds, ListFilter, QueryDecision, SalesQuery, SearchTerm, SortField,
        SortOrder, escape_like_pattern, normalize_query,
    };

    #[track_caller]
    fn must_normalize(query: &SalesQuery) -> super::NormalizedQuery {
        match normalize_query(query) {
            QueryDecision::Normalized(normalized) => normalized,
            QueryDecision::Unsatisfiable { .. } => {
                panic!("Expected {query:?} to be satisfiable")
            }
        }
    }

    #[track_caller]
    fn assert_unsatisfiable(query: &SalesQuery) {
        assert!(
            matches!(normalize_query(query), QueryDecision::Unsatisfiable { .. }),
            "Expected {query:?} to be unsatisfiable"
        );
    }

    #[test]
    fn empty_query_uses_defaults() {
        let got = must_normalize(&SalesQuery::default());

        assert_eq!(got.filter, Default::default());
        assert_eq!(got.sort_field, SortField::Date);
        assert_eq!(got.sort_order, SortOrder::Descending);
        assert_eq!(got.page, 1);
    }

    #[test]
    fn list_filter_splits_trims_and_drops_blanks() {
        let got = ListFilter::parse(Some(" North, ,South,,"));

        assert_eq!(got.values(), ["North", "South"]);
    }

    #[test]
    fn list_filter_from_blank_string_is_empty() {
        assert!(ListFilter::parse(Some(" , ")).is_empty());
        assert!(ListFilter::parse(None).is_empty());
    }

    #[test]
    fn list_filter_treats_repeated_and_joined_values_the_same() {
        let joined = ListFilter::parse(Some("Cash,Card"));
        let repeated = ListFilter::from_values(["Cash", " Card "]);

        assert_eq!(joined, repeated);
    }

    #[test]
    fn list_filter_drops_duplicates() {
        let got = ListFilter::from_values(["Cash,Card", "Cash"]);

        assert_eq!(got.values(), ["Cash", "Card"]);
        assert_eq!(got.to_query_value(), "Cash,Card");
    }

    #[test]
    fn lists_are_normalized_per_field() {
        let got = must_normalize(&SalesQuery {
            regions: Some("North,South".to_owned()),
            genders: Some("Female".to_owned()),
            categories: Some("".to_owned()),
            tags: Some("New, Sale".to_owned()),
            payment_methods: Some("UPI".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.filter.regions.values(), ["North", "South"]);
        assert_eq!(got.filter.genders.values(), ["Female"]);
        assert!(got.filter.categories.is_empty());
        assert_eq!(got.filter.tags.values(), ["New", "Sale"]);
        assert_eq!(got.filter.payment_methods.values(), ["UPI"]);
    }

    #[test]
    fn search_is_trimmed() {
        let got = must_normalize(&SalesQuery {
            search: Some("  Ana  ".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.filter.search.map(|term| term.as_str().to_owned()), Some("Ana".to_owned()));
    }

    #[test]
    fn blank_search_is_ignored() {
        let got = must_normalize(&SalesQuery {
            search: Some("   ".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.filter.search, None);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like_pattern("a.b*"), "a.b*");
        assert_eq!(escape_like_pattern("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_pattern("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like_pattern("O'Brien"), "O'Brien");
    }

    #[test]
    fn like_pattern_wraps_escaped_term() {
        let term = SearchTerm::parse(Some("10%")).unwrap();

        assert_eq!(term.like_pattern(), "%10\\%%");
    }

    #[test]
    fn valid_ages_are_kept() {
        let got = must_normalize(&SalesQuery {
            age_min: Some("18".to_owned()),
            age_max: Some(" 65 ".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            got.filter.age,
            AgeRange {
                min: Some(18),
                max: Some(65)
            }
        );
    }

    #[test]
    fn invalid_ages_are_ignored() {
        for raw in ["", "abc", "-5", "30.5"] {
            let got = must_normalize(&SalesQuery {
                age_min: Some(raw.to_owned()),
                age_max: Some(raw.to_owned()),
                ..Default::default()
            });

            assert_eq!(got.filter.age, AgeRange::default(), "for input {raw:?}");
        }
    }

    #[test]
    fn equal_ages_are_satisfiable() {
        let got = must_normalize(&SalesQuery {
            age_min: Some("30".to_owned()),
            age_max: Some("30".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.filter.age.min, Some(30));
    }

    #[test]
    fn inverted_age_range_is_unsatisfiable() {
        assert_unsatisfiable(&SalesQuery {
            age_min: Some("30".to_owned()),
            age_max: Some("20".to_owned()),
            ..Default::default()
        });
    }

    #[test]
    fn inverted_age_range_is_unsatisfiable_regardless_of_other_filters() {
        assert_unsatisfiable(&SalesQuery {
            search: Some("Ana".to_owned()),
            regions: Some("North".to_owned()),
            age_min: Some("30".to_owned()),
            age_max: Some("20".to_owned()),
            start_date: Some("2023-01-01".to_owned()),
            sort_by: Some("quantity".to_owned()),
            page: Some("3".to_owned()),
            ..Default::default()
        });
    }

    #[test]
    fn unsatisfiable_query_keeps_requested_page() {
        let got = normalize_query(&SalesQuery {
            age_min: Some("30".to_owned()),
            age_max: Some("20".to_owned()),
            page: Some("4".to_owned()),
            ..Default::default()
        });

        assert_eq!(got, QueryDecision::Unsatisfiable { page: 4 });
    }

    #[test]
    fn dates_cover_whole_days() {
        let got = must_normalize(&SalesQuery {
            start_date: Some("2023-01-01".to_owned()),
            end_date: Some("2023-01-31".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            got.filter.dates,
            DateBounds {
                start: Some(datetime!(2023-01-01 0:00)),
                end: Some(datetime!(2023-01-31 23:59:59.999)),
            }
        );
    }

    #[test]
    fn same_start_and_end_date_is_satisfiable() {
        let got = must_normalize(&SalesQuery {
            start_date: Some("2023-01-01".to_owned()),
            end_date: Some("2023-01-01".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            got.filter.dates.start.map(|start| start.date()),
            Some(date!(2023 - 01 - 01))
        );
    }

    #[test]
    fn timestamp_dates_use_the_calendar_day() {
        let got = must_normalize(&SalesQuery {
            end_date: Some("2023-01-31T08:30:00Z".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.filter.dates.end, Some(datetime!(2023-01-31 23:59:59.999)));
    }

    #[test]
    fn blank_dates_are_ignored() {
        let got = must_normalize(&SalesQuery {
            start_date: Some("".to_owned()),
            end_date: Some("  ".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.filter.dates, DateBounds::default());
    }

    #[test]
    fn unparseable_start_date_is_unsatisfiable() {
        assert_unsatisfiable(&SalesQuery {
            start_date: Some("not-a-date".to_owned()),
            ..Default::default()
        });
    }

    #[test]
    fn unparseable_end_date_is_unsatisfiable() {
        for raw in ["2023-02-30", "31/01/2023", "yesterday"] {
            assert_unsatisfiable(&SalesQuery {
                end_date: Some(raw.to_owned()),
                ..Default::default()
            });
        }
    }

    #[test]
    fn inverted_date_range_is_unsatisfiable() {
        assert_unsatisfiable(&SalesQuery {
            start_date: Some("2023-02-01".to_owned()),
            end_date: Some("2023-01-31".to_owned()),
            ..Default::default()
        });
    }

    #[test]
    fn sort_field_falls_back_to_date() {
        for (raw, want) in [
            ("date", SortField::Date),
            ("quantity", SortField::Quantity),
            ("customerName", SortField::CustomerName),
            ("price", SortField::Date),
            ("", SortField::Date),
        ] {
            let got = must_normalize(&SalesQuery {
                sort_by: Some(raw.to_owned()),
                ..Default::default()
            });

            assert_eq!(got.sort_field, want, "for input {raw:?}");
        }
    }

    #[test]
    fn sort_order_defaults_to_descending() {
        for (raw, want) in [
            ("asc", SortOrder::Ascending),
            ("desc", SortOrder::Descending),
            ("ASC", SortOrder::Descending),
            ("up", SortOrder::Descending),
        ] {
            let got = must_normalize(&SalesQuery {
                sort_order: Some(raw.to_owned()),
                ..Default::default()
            });

            assert_eq!(got.sort_order, want, "for input {raw:?}");
        }
    }

    #[test]
    fn invalid_pages_become_first_page() {
        for raw in ["0", "-1", "abc", "", "1.5"] {
            let got = must_normalize(&SalesQuery {
                page: Some(raw.to_owned()),
                ..Default::default()
            });

            assert_eq!(got.page, 1, "for input {raw:?}");
        }
    }

    #[test]
    fn valid_page_is_kept() {
        let got = must_normalize(&SalesQuery {
            page: Some("2".to_owned()),
            ..Default::default()
        });

        assert_eq!(got.page, 2);
    }

    #[test]
    fn query_deserializes_from_camel_case_parameters() {
        let got: SalesQuery = serde_urlencoded::from_str(
            "search=Ana&ageMin=20&paymentMethods=UPI&startDate=2023-01-01&sortBy=quantity&sortOrder=asc&page=2",
        )
        .unwrap();

        assert_eq!(got.search.as_deref(), Some("Ana"));
        assert_eq!(got.age_min.as_deref(), Some("20"));
        assert_eq!(got.payment_methods.as_deref(), Some("UPI"));
        assert_eq!(got.start_date.as_deref(), Some("2023-01-01"));
        assert_eq!(got.sort_by.as_deref(), Some("quantity"));
        assert_eq!(got.sort_order.as_deref(), Some("asc"));
        assert_eq!(got.page.as_deref(), Some("2"));
    }

    #[test]
    fn from_pairs_joins_repeated_list_keys() {
        let got = SalesQuery::from_pairs([
            ("regions", "North"),
            ("regions", "South,East"),
            ("tags", "Online"),
            ("unknown", "ignored"),
        ]);

        assert_eq!(got.regions.as_deref(), Some("North,South,East"));
        assert_eq!(got.tags.as_deref(), Some("Online"));
        assert_eq!(
            ListFilter::parse(got.regions.as_deref()).values(),
            ["North", "South", "East"]
        );
    }

    #[test]
    fn from_pairs_keeps_last_scalar_value() {
        let got = SalesQuery::from_pairs([("page", "2"), ("page", "3"), ("sortBy", "quantity")]);

        assert_eq!(got.page.as_deref(), Some("3"));
        assert_eq!(got.sort_by.as_deref(), Some("quantity"));
    }

    #[test]
    fn from_pairs_matches_deserialized_query() {
        let text = "search=Ana&ageMin=20&paymentMethods=UPI&startDate=2023-01-01&sortBy=quantity";
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(text).unwrap();

        let got = SalesQuery::from_pairs(pairs);

        let want: SalesQuery = serde_urlencoded::from_str(text).unwrap();
        assert_eq!(got, want);
    }
}
