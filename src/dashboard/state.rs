//! The dashboard's filter state and the rules for changing it.
//!
//! [DashboardQuery] is never mutated in place. Every change goes through
//! [DashboardQuery::apply], which returns a new value: a patch that only
//! changes the page keeps every other field, any other patch starts over
//! from the first page.

use crate::{
    endpoints,
    transaction::{ListFilter, SalesQuery, SortField, SortOrder},
};

/// Everything the dashboard needs to reproduce a view of the sales.
///
/// Age and date inputs are kept as the user typed them so that the filter
/// bar shows the same text back, normalization happens when the query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    /// The search box text.
    pub search: String,
    /// Selected customer regions.
    pub regions: ListFilter,
    /// Selected genders.
    pub genders: ListFilter,
    /// The minimum age input.
    pub age_min: String,
    /// The maximum age input.
    pub age_max: String,
    /// Selected product categories.
    pub categories: ListFilter,
    /// Selected tags.
    pub tags: ListFilter,
    /// Selected payment methods.
    pub payment_methods: ListFilter,
    /// The start date input, `YYYY-MM-DD` when filled in.
    pub start_date: String,
    /// The end date input, `YYYY-MM-DD` when filled in.
    pub end_date: String,
    /// The field the table is sorted by.
    pub sort_by: SortField,
    /// The direction the table is sorted in.
    pub sort_order: SortOrder,
    /// The 1-based page number.
    pub page: u64,
}

impl Default for DashboardQuery {
    /// The dashboard opens sorted by customer name, A to Z.
    fn default() -> Self {
        Self {
            search: String::new(),
            regions: ListFilter::default(),
            genders: ListFilter::default(),
            age_min: String::new(),
            age_max: String::new(),
            categories: ListFilter::default(),
            tags: ListFilter::default(),
            payment_methods: ListFilter::default(),
            start_date: String::new(),
            end_date: String::new(),
            sort_by: SortField::CustomerName,
            sort_order: SortOrder::Ascending,
            page: 1,
        }
    }
}

/// A change to some of the fields of a [DashboardQuery].
///
/// `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    /// Replaces [DashboardQuery::search].
    pub search: Option<String>,
    /// Replaces [DashboardQuery::regions].
    pub regions: Option<ListFilter>,
    /// Replaces [DashboardQuery::genders].
    pub genders: Option<ListFilter>,
    /// Replaces [DashboardQuery::age_min].
    pub age_min: Option<String>,
    /// Replaces [DashboardQuery::age_max].
    pub age_max: Option<String>,
    /// Replaces [DashboardQuery::categories].
    pub categories: Option<ListFilter>,
    /// Replaces [DashboardQuery::tags].
    pub tags: Option<ListFilter>,
    /// Replaces [DashboardQuery::payment_methods].
    pub payment_methods: Option<ListFilter>,
    /// Replaces [DashboardQuery::start_date].
    pub start_date: Option<String>,
    /// Replaces [DashboardQuery::end_date].
    pub end_date: Option<String>,
    /// Replaces [DashboardQuery::sort_by].
    pub sort_by: Option<SortField>,
    /// Replaces [DashboardQuery::sort_order].
    pub sort_order: Option<SortOrder>,
    /// Moves to this page. Ignored unless the patch changes nothing else.
    pub page: Option<u64>,
}

impl QueryPatch {
    /// A patch that moves to `page` and changes nothing else.
    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    fn is_page_only(&self) -> bool {
        match self.page {
            Some(page) => *self == Self::page(page),
            None => false,
        }
    }
}

impl DashboardQuery {
    /// The state the Reset link returns to: no filters, newest sales first.
    pub fn reset() -> Self {
        Self {
            sort_by: SortField::Date,
            sort_order: SortOrder::Descending,
            ..Default::default()
        }
    }

    /// Return a new query with `patch` applied.
    ///
    /// If the patch only sets the page, every other field is kept. Otherwise
    /// the page goes back to 1, even if the patch also sets a page, since the
    /// old page number means nothing for a different set of results.
    pub fn apply(&self, patch: QueryPatch) -> Self {
        if patch.is_page_only()
            && let Some(page) = patch.page
        {
            return Self {
                page: page.max(1),
                ..self.clone()
            };
        }

        let current = self.clone();

        Self {
            search: patch.search.unwrap_or(current.search),
            regions: patch.regions.unwrap_or(current.regions),
            genders: patch.genders.unwrap_or(current.genders),
            age_min: patch.age_min.unwrap_or(current.age_min),
            age_max: patch.age_max.unwrap_or(current.age_max),
            categories: patch.categories.unwrap_or(current.categories),
            tags: patch.tags.unwrap_or(current.tags),
            payment_methods: patch.payment_methods.unwrap_or(current.payment_methods),
            start_date: patch.start_date.unwrap_or(current.start_date),
            end_date: patch.end_date.unwrap_or(current.end_date),
            sort_by: patch.sort_by.unwrap_or(current.sort_by),
            sort_order: patch.sort_order.unwrap_or(current.sort_order),
            page: 1,
        }
    }

    /// Read the dashboard state from the parameters of a request.
    ///
    /// Missing sort parameters fall back to the dashboard's defaults rather
    /// than the API's, and an invalid page becomes 1.
    pub fn from_sales_query(query: &SalesQuery) -> Self {
        let defaults = Self::default();
        let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_owned();

        Self {
            search: text(&query.search),
            regions: ListFilter::parse(query.regions.as_deref()),
            genders: ListFilter::parse(query.genders.as_deref()),
            age_min: text(&query.age_min),
            age_max: text(&query.age_max),
            categories: ListFilter::parse(query.categories.as_deref()),
            tags: ListFilter::parse(query.tags.as_deref()),
            payment_methods: ListFilter::parse(query.payment_methods.as_deref()),
            start_date: text(&query.start_date),
            end_date: text(&query.end_date),
            sort_by: query
                .sort_by
                .as_deref()
                .map(SortField::from_query_value)
                .unwrap_or(defaults.sort_by),
            sort_order: query
                .sort_order
                .as_deref()
                .map(SortOrder::from_query_value)
                .unwrap_or(defaults.sort_order),
            page: query
                .page
                .as_deref()
                .and_then(|page| page.trim().parse::<u64>().ok())
                .filter(|page| *page > 0)
                .unwrap_or(1),
        }
    }

    /// The parameters for searching sales with this state.
    ///
    /// Blank fields and empty lists are left out.
    pub fn to_sales_query(&self) -> SalesQuery {
        let text = |value: &str| (!value.is_empty()).then(|| value.to_owned());
        let list = |filter: &ListFilter| (!filter.is_empty()).then(|| filter.to_query_value());

        SalesQuery {
            search: text(&self.search),
            regions: list(&self.regions),
            genders: list(&self.genders),
            age_min: text(&self.age_min),
            age_max: text(&self.age_max),
            categories: list(&self.categories),
            tags: list(&self.tags),
            payment_methods: list(&self.payment_methods),
            start_date: text(&self.start_date),
            end_date: text(&self.end_date),
            sort_by: Some(self.sort_by.as_query_value().to_owned()),
            sort_order: Some(self.sort_order.as_query_value().to_owned()),
            page: Some(self.page.to_string()),
        }
    }

    /// The URL of the dashboard showing this state.
    pub fn to_url(&self) -> String {
        match serde_urlencoded::to_string(self.to_sales_query()) {
            Ok(query_string) => format!("{}?{query_string}", endpoints::ROOT),
            Err(error) => {
                tracing::error!("could not encode dashboard query {self:?}: {error}");
                endpoints::ROOT.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::transaction::{ListFilter, SalesQuery, SortField, SortOrder};

    use super::{DashboardQuery, QueryPatch};

    fn filtered_query_on_page(page: u64) -> DashboardQuery {
        DashboardQuery {
            search: "ana".to_owned(),
            regions: ListFilter::parse(Some("North,South")),
            age_min: "20".to_owned(),
            start_date: "2023-01-01".to_owned(),
            sort_by: SortField::Quantity,
            page,
            ..Default::default()
        }
    }

    #[test]
    fn default_sorts_by_customer_name_ascending() {
        let query = DashboardQuery::default();

        assert_eq!(query.sort_by, SortField::CustomerName);
        assert_eq!(query.sort_order, SortOrder::Ascending);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn reset_sorts_by_newest_date() {
        let query = DashboardQuery::reset();

        assert_eq!(query.sort_by, SortField::Date);
        assert_eq!(query.sort_order, SortOrder::Descending);
        assert!(query.regions.is_empty());
        assert_eq!(query.page, 1);
    }

    #[test]
    fn page_only_patch_keeps_other_fields() {
        let query = filtered_query_on_page(1);

        let got = query.apply(QueryPatch::page(3));

        assert_eq!(got, filtered_query_on_page(3));
    }

    #[test]
    fn filter_patch_resets_page() {
        let query = filtered_query_on_page(4);

        let got = query.apply(QueryPatch {
            genders: Some(ListFilter::parse(Some("Female"))),
            ..Default::default()
        });

        assert_eq!(got.page, 1);
        assert_eq!(got.genders.values(), ["Female"]);
        assert_eq!(got.regions, query.regions);
        assert_eq!(got.search, query.search);
    }

    #[test]
    fn patch_with_page_and_filter_still_resets_page() {
        let query = filtered_query_on_page(4);

        let got = query.apply(QueryPatch {
            search: Some("bo".to_owned()),
            page: Some(3),
            ..Default::default()
        });

        assert_eq!(got.page, 1);
        assert_eq!(got.search, "bo");
    }

    #[test]
    fn sort_patch_resets_page() {
        let query = filtered_query_on_page(2);

        let got = query.apply(QueryPatch {
            sort_order: Some(SortOrder::Ascending),
            ..Default::default()
        });

        assert_eq!(got.page, 1);
        assert_eq!(got.sort_order, SortOrder::Ascending);
        assert_eq!(got.sort_by, SortField::Quantity);
    }

    #[test]
    fn empty_patch_resets_page() {
        let got = filtered_query_on_page(5).apply(QueryPatch::default());

        assert_eq!(got, filtered_query_on_page(1));
    }

    #[test]
    fn apply_does_not_change_original() {
        let query = filtered_query_on_page(2);

        let _ = query.apply(QueryPatch::page(9));

        assert_eq!(query, filtered_query_on_page(2));
    }

    #[test]
    fn reads_request_parameters() {
        let query = SalesQuery::from_pairs([
            ("search", " ana "),
            ("regions", "North"),
            ("regions", "South"),
            ("ageMax", "40"),
            ("sortBy", "date"),
            ("page", "2"),
        ]);

        let got = DashboardQuery::from_sales_query(&query);

        assert_eq!(got.search, "ana");
        assert_eq!(got.regions.values(), ["North", "South"]);
        assert_eq!(got.age_max, "40");
        assert_eq!(got.sort_by, SortField::Date);
        // Missing sort order uses the dashboard default.
        assert_eq!(got.sort_order, SortOrder::Ascending);
        assert_eq!(got.page, 2);
    }

    #[test]
    fn invalid_page_becomes_first_page() {
        for page in ["0", "-1", "two", ""] {
            let query = SalesQuery {
                page: Some(page.to_owned()),
                ..Default::default()
            };

            assert_eq!(DashboardQuery::from_sales_query(&query).page, 1);
        }
    }

    #[test]
    fn sales_query_leaves_out_blank_fields() {
        let got = DashboardQuery::default().to_sales_query();

        assert_eq!(
            got,
            SalesQuery {
                sort_by: Some("customerName".to_owned()),
                sort_order: Some("asc".to_owned()),
                page: Some("1".to_owned()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn url_round_trips_through_request_parameters() {
        let want = filtered_query_on_page(3);

        let url = want.to_url();

        let query_string = url
            .strip_prefix("/?")
            .expect("URL should point at the dashboard");
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query_string).unwrap();
        let got = DashboardQuery::from_sales_query(&SalesQuery::from_pairs(pairs));
        assert_eq!(got, want);
    }

    #[test]
    fn url_encodes_list_values() {
        let url = filtered_query_on_page(1).to_url();

        assert!(url.contains("regions=North%2CSouth"), "got {url}");
        assert!(url.contains("sortBy=quantity"), "got {url}");
    }
}
