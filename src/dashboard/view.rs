//! Renders the dashboard: filter bar, summary cards, sales table and pager.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_count, format_currency, link,
    },
    pagination::{MAX_PAGE_INDICATORS, PaginationIndicator, create_pagination_indicators},
    transaction::{ListFilter, PageMeta, SalesPage, SalesSummary, SortField, SortOrder, Transaction},
};

use super::state::{DashboardQuery, QueryPatch};

const REGION_OPTIONS: [&str; 4] = ["North", "South", "East", "West"];
const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];
const CATEGORY_OPTIONS: [&str; 4] = ["Clothing", "Electronics", "Grocery", "Other"];
const TAG_OPTIONS: [&str; 4] = ["New", "Sale", "Premium", "Online"];
const PAYMENT_OPTIONS: [&str; 4] = ["Cash", "Card", "UPI", "NetBanking"];

/// The ID of the element HTMX requests swap out.
pub(super) const DASHBOARD_ID: &str = "dashboard";

const PAGE_TITLE: &str = "Sales Management System";

/// The full dashboard page.
pub(super) fn dashboard_page(query: &DashboardQuery, page: &SalesPage) -> Markup {
    base("Dashboard", &dashboard_fragment(query, page))
}

/// The part of the dashboard that is replaced on every change.
pub(super) fn dashboard_fragment(query: &DashboardQuery, page: &SalesPage) -> Markup {
    html! {
        div id=(DASHBOARD_ID) class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex items-center justify-between mb-4"
            {
                h1 class="text-lg font-semibold" { (PAGE_TITLE) }

                a
                    id="reset"
                    href=(DashboardQuery::reset().to_url())
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Reset"
                }
            }

            (filter_bar(query))
            (active_filters(query))
            (summary_cards(&page.summary))
            (sales_table(&page.data))
            (pager(query, &page.meta))
        }
    }
}

fn hx_target() -> String {
    format!("#{DASHBOARD_ID}")
}

fn filter_bar(query: &DashboardQuery) -> Markup {
    html! {
        form
            id="filters"
            method="get"
            action=(endpoints::ROOT)
            hx-get=(endpoints::ROOT)
            hx-target=(hx_target())
            hx-swap="outerHTML"
            hx-push-url="true"
            class="flex flex-wrap items-end gap-3 mb-3"
        {
            (multi_select("Customer Region", "regions", &REGION_OPTIONS, &query.regions))
            (multi_select("Gender", "genders", &GENDER_OPTIONS, &query.genders))

            div
            {
                span class=(FORM_LABEL_STYLE) { "Age Range" }
                div class="flex items-center gap-1"
                {
                    input
                        type="number"
                        name="ageMin"
                        min="0"
                        placeholder="Min"
                        value=(query.age_min)
                        class=(FORM_TEXT_INPUT_STYLE);
                    span { "-" }
                    input
                        type="number"
                        name="ageMax"
                        min="0"
                        placeholder="Max"
                        value=(query.age_max)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            (multi_select("Product Category", "categories", &CATEGORY_OPTIONS, &query.categories))
            (multi_select("Tags", "tags", &TAG_OPTIONS, &query.tags))
            (multi_select("Payment Method", "paymentMethods", &PAYMENT_OPTIONS, &query.payment_methods))

            div
            {
                span class=(FORM_LABEL_STYLE) { "Date" }
                div class="flex items-center gap-1"
                {
                    input
                        type="date"
                        name="startDate"
                        value=(query.start_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                    span { "-" }
                    input
                        type="date"
                        name="endDate"
                        value=(query.end_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    id="search"
                    name="search"
                    placeholder="Name, Phone no."
                    value=(query.search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="sortBy" class=(FORM_LABEL_STYLE) { "Sort by" }
                select id="sortBy" name="sortBy" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (field, label) in [
                        (SortField::CustomerName, "Customer Name (A-Z)"),
                        (SortField::Date, "Date (Newest)"),
                        (SortField::Quantity, "Quantity"),
                    ] {
                        option value=(field.as_query_value()) selected[query.sort_by == field] { (label) }
                    }
                }
            }

            div
            {
                label for="sortOrder" class=(FORM_LABEL_STYLE) { "Order" }
                select id="sortOrder" name="sortOrder" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (order, label) in [
                        (SortOrder::Ascending, "Ascending"),
                        (SortOrder::Descending, "Descending"),
                    ] {
                        option value=(order.as_query_value()) selected[query.sort_order == order] { (label) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    }
}

fn multi_select(label: &str, name: &str, options: &[&str], selected: &ListFilter) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            select multiple id=(name) name=(name) class=(FORM_TEXT_INPUT_STYLE)
            {
                @for option in options {
                    option
                        value=(option)
                        selected[selected.values().iter().any(|value| value == option)]
                    {
                        (option)
                    }
                }
            }
        }
    }
}

/// A removable chip for one active filter value.
struct FilterChip {
    label: String,
    remove_url: String,
}

type ListPatch = fn(ListFilter) -> QueryPatch;

/// Build a chip for every active search or list filter value.
///
/// Removing a chip is a filter change, so its link goes back to page 1.
fn filter_chips(query: &DashboardQuery) -> Vec<FilterChip> {
    let mut chips = Vec::new();

    if !query.search.is_empty() {
        chips.push(FilterChip {
            label: format!("Search: {}", query.search),
            remove_url: query
                .apply(QueryPatch {
                    search: Some(String::new()),
                    ..Default::default()
                })
                .to_url(),
        });
    }

    let list_fields: [(&str, &ListFilter, ListPatch); 5] = [
        ("Region", &query.regions, |filter| QueryPatch {
            regions: Some(filter),
            ..Default::default()
        }),
        ("Gender", &query.genders, |filter| QueryPatch {
            genders: Some(filter),
            ..Default::default()
        }),
        ("Category", &query.categories, |filter| QueryPatch {
            categories: Some(filter),
            ..Default::default()
        }),
        ("Tag", &query.tags, |filter| QueryPatch {
            tags: Some(filter),
            ..Default::default()
        }),
        ("Payment", &query.payment_methods, |filter| QueryPatch {
            payment_methods: Some(filter),
            ..Default::default()
        }),
    ];

    for (name, filter, make_patch) in list_fields {
        for value in filter.values() {
            let remaining =
                ListFilter::from_values(filter.values().iter().filter(|other| *other != value));

            chips.push(FilterChip {
                label: format!("{name}: {value}"),
                remove_url: query.apply(make_patch(remaining)).to_url(),
            });
        }
    }

    chips
}

fn active_filters(query: &DashboardQuery) -> Markup {
    let chips = filter_chips(query);

    html! {
        @if !chips.is_empty() {
            ul id="active-filters" class="flex flex-wrap gap-2 mb-3 text-xs"
            {
                @for chip in &chips {
                    li class="px-3 py-1 rounded-full border border-gray-300 bg-white dark:bg-gray-800"
                    {
                        (chip.label) " "
                        a
                            href=(chip.remove_url)
                            hx-get=(chip.remove_url)
                            hx-target=(hx_target())
                            hx-swap="outerHTML"
                            hx-push-url="true"
                            aria-label=(format!("Remove {}", chip.label))
                            class=(LINK_STYLE)
                        {
                            "×"
                        }
                    }
                }
            }
        }
    }
}

fn summary_cards(summary: &SalesSummary) -> Markup {
    let cards = [
        ("total-units", "Total units sold", format_count(summary.total_units)),
        ("total-amount", "Total Amount", format_currency(summary.total_amount)),
        ("total-discount", "Total Discount", format_currency(summary.total_discount)),
    ];

    html! {
        section id="summary" class="grid grid-cols-1 sm:grid-cols-3 gap-4 mb-4"
        {
            @for (id, label, value) in cards {
                div
                    id=(id)
                    class="bg-white dark:bg-gray-800 border border-gray-200
                        dark:border-gray-700 rounded-lg p-4 shadow-sm"
                {
                    p class="text-xs text-gray-500 dark:text-gray-400" { (label) }
                    p class="text-xl font-semibold" data-value { (value) }
                }
            }
        }
    }
}

const TABLE_HEADERS: [&str; 9] = [
    "Transaction ID",
    "Date",
    "Customer ID",
    "Customer name",
    "Phone Number",
    "Gender",
    "Age",
    "Product Category",
    "Quantity",
];

fn sales_table(sales: &[Transaction]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow-sm border border-gray-200 dark:border-gray-700"
        {
            table id="sales" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for header in TABLE_HEADERS {
                            th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                        }
                    }
                }

                tbody
                {
                    @for sale in sales {
                        (sale_row(sale))
                    }

                    @if sales.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td
                                colspan=(TABLE_HEADERS.len())
                                class="px-6 py-4 text-center"
                                data-empty-state
                            {
                                "No transactions found for current filters."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn sale_row(sale: &Transaction) -> Markup {
    let date = match sale.date {
        Some(date) => date.date().to_string(),
        None => "-".to_owned(),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (sale.transaction_id) }
            td class=(TABLE_CELL_STYLE) { (date) }
            td class=(TABLE_CELL_STYLE) { (sale.customer_id) }
            td class=(TABLE_CELL_STYLE) { (sale.customer_name) }
            td class=(TABLE_CELL_STYLE) { (sale.phone_number) }
            td class=(TABLE_CELL_STYLE) { (sale.gender) }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(age) = sale.age { (age) }
            }
            td class=(TABLE_CELL_STYLE) { (sale.product_category) }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(quantity) = sale.quantity { (quantity) }
            }
        }
    }
}

fn page_link(query: &DashboardQuery, page: u64, text: &str, is_button: bool) -> Markup {
    let url = query.apply(QueryPatch::page(page)).to_url();

    html! {
        a
            href=(url)
            hx-get=(url)
            hx-target=(hx_target())
            hx-swap="outerHTML"
            hx-push-url="true"
            role=[is_button.then_some("button")]
            class=(LINK_STYLE)
        {
            (text)
        }
    }
}

fn pager(query: &DashboardQuery, meta: &PageMeta) -> Markup {
    let indicators =
        create_pagination_indicators(meta.page, meta.total_pages, MAX_PAGE_INDICATORS);

    html! {
        nav class="flex flex-col items-center gap-1 mt-4 text-sm" aria-label="Pagination"
        {
            ul id="pagination" class="flex items-center gap-3"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::CurrPage(page) => {
                                p aria-current="page" class="font-bold" { (page) }
                            }
                            PaginationIndicator::Page(page) => {
                                (page_link(query, page, &page.to_string(), false))
                            }
                            PaginationIndicator::Ellipsis => {
                                "..."
                            }
                            PaginationIndicator::NextButton(page) => {
                                (page_link(query, page, "Next", true))
                            }
                            PaginationIndicator::BackButton(page) => {
                                (page_link(query, page, "Back", true))
                            }
                        }
                    }
                }
            }

            p class="text-xs text-gray-500"
            {
                "Page " (meta.page) " of " (meta.total_pages) " (" (format_count(meta.total_items)) " sales)"
            }
        }
    }
}

/// Shown instead of the dashboard when the sales could not be loaded.
pub(super) fn dashboard_error_view() -> Markup {
    html! {
        div id=(DASHBOARD_ID) class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-lg font-semibold" { (PAGE_TITLE) }
            p class="text-red-500" { "Could not load sales. " (link(endpoints::ROOT, "Try again")) }
        }
    }
}
