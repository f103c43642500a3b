//! Decoding one row of the sales CSV export into a [Transaction].

use serde::Deserialize;
use time::{
    Date, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::transaction::Transaction;

/// One row of the sales CSV export, exactly as it appears in the file.
///
/// Every column is read as text and missing columns are read as empty
/// strings, the conversion to typed values happens in
/// [SaleRecord::into_transaction].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SaleRecord {
    /// The `Transaction ID` column.
    #[serde(rename = "Transaction ID")]
    pub transaction_id: String,
    /// The `Date` column, read with [parse_sale_date].
    #[serde(rename = "Date")]
    pub date: String,
    /// The `Customer ID` column.
    #[serde(rename = "Customer ID")]
    pub customer_id: String,
    /// The `Customer Name` column.
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    /// The `Phone Number` column.
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    /// The `Gender` column.
    #[serde(rename = "Gender")]
    pub gender: String,
    /// The `Age` column. Blank or invalid text gives no age.
    #[serde(rename = "Age")]
    pub age: String,
    /// The `Customer Region` column.
    #[serde(rename = "Customer Region")]
    pub customer_region: String,
    /// The `Customer Type` column.
    #[serde(rename = "Customer Type")]
    pub customer_type: String,
    /// The `Product ID` column.
    #[serde(rename = "Product ID")]
    pub product_id: String,
    /// The `Product Name` column.
    #[serde(rename = "Product Name")]
    pub product_name: String,
    /// The `Brand` column.
    #[serde(rename = "Brand")]
    pub brand: String,
    /// The `Product Category` column.
    #[serde(rename = "Product Category")]
    pub product_category: String,
    /// The `Tags` column, a comma separated list.
    #[serde(rename = "Tags")]
    pub tags: String,
    /// The `Quantity` column. Blank or invalid text gives 0.
    #[serde(rename = "Quantity")]
    pub quantity: String,
    /// The `Price per Unit` column.
    #[serde(rename = "Price per Unit")]
    pub price_per_unit: String,
    /// The `Discount Percentage` column.
    #[serde(rename = "Discount Percentage")]
    pub discount_percentage: String,
    /// The `Total Amount` column.
    #[serde(rename = "Total Amount")]
    pub total_amount: String,
    /// The `Final Amount` column.
    #[serde(rename = "Final Amount")]
    pub final_amount: String,
    /// The `Payment Method` column.
    #[serde(rename = "Payment Method")]
    pub payment_method: String,
    /// The `Order Status` column.
    #[serde(rename = "Order Status")]
    pub order_status: String,
    /// The `Delivery Type` column.
    #[serde(rename = "Delivery Type")]
    pub delivery_type: String,
    /// The `Store ID` column.
    #[serde(rename = "Store ID")]
    pub store_id: String,
    /// The `Store Location` column.
    #[serde(rename = "Store Location")]
    pub store_location: String,
    /// The `Salesperson ID` column.
    #[serde(rename = "Salesperson ID")]
    pub salesperson_id: String,
    /// The `Employee Name` column.
    #[serde(rename = "Employee Name")]
    pub employee_name: String,
}

impl SaleRecord {
    /// Convert the raw text of the row into a sale.
    ///
    /// An unreadable date or age becomes `None`. An unreadable quantity,
    /// price, discount or amount becomes zero.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: 0,
            date: parse_sale_date(&self.date),
            age: parse_count(&self.age),
            tags: split_tags(&self.tags),
            quantity: Some(parse_count(&self.quantity).unwrap_or(0)),
            price_per_unit: Some(parse_amount(&self.price_per_unit)),
            discount_percentage: Some(parse_amount(&self.discount_percentage)),
            total_amount: Some(parse_amount(&self.total_amount)),
            final_amount: Some(parse_amount(&self.final_amount)),
            transaction_id: self.transaction_id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            gender: self.gender,
            customer_region: self.customer_region,
            customer_type: self.customer_type,
            product_id: self.product_id,
            product_name: self.product_name,
            brand: self.brand,
            product_category: self.product_category,
            payment_method: self.payment_method,
            order_status: self.order_status,
            delivery_type: self.delivery_type,
            store_id: self.store_id,
            store_location: self.store_location,
            salesperson_id: self.salesperson_id,
            employee_name: self.employee_name,
        }
    }
}

const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

const ISO_DATE_TIME_FORMATS: [&[BorrowedFormatItem]; 4] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

/// Parse the date of a sale, trying each of the formats seen in exports.
///
/// In order: an ISO 8601 date-time (converted to UTC if it has an offset),
/// an ISO date, day first `DD/MM/YYYY` or `DD-MM-YYYY`, and year first
/// `YYYY/MM/DD`. Days and months may have one or two digits in the last
/// two forms. Dates that do not exist, such as 31/02/2023, are rejected.
///
/// Returns `None` for blank text or text that matches none of the formats.
pub fn parse_sale_date(text: &str) -> Option<PrimitiveDateTime> {
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    parse_iso_date_time(text)
        .or_else(|| Date::parse(text, ISO_DATE_FORMAT).ok().map(Date::midnight))
        .or_else(|| parse_numeric_date(text))
}

fn parse_iso_date_time(text: &str) -> Option<PrimitiveDateTime> {
    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        let date_time = date_time.to_offset(UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(date_time.date(), date_time.time()));
    }

    ISO_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(text, *format).ok())
}

/// Parse `D/M/YYYY`, `D-M-YYYY` or `YYYY/M/D` style dates.
fn parse_numeric_date(text: &str) -> Option<PrimitiveDateTime> {
    let separator = if text.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = text.split(separator).collect();

    let [first, month, last] = parts.as_slice() else {
        return None;
    };

    if !parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()))
    {
        return None;
    }

    let (year, day) = match (first.len(), month.len(), last.len()) {
        (1..=2, 1..=2, 4) => (last, first),
        (4, 1..=2, 1..=2) if separator == '/' => (first, last),
        _ => return None,
    };

    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    let day: u8 = day.parse().ok()?;

    Date::from_calendar_date(year, month, day)
        .ok()
        .map(Date::midnight)
}

/// Parse a whole, non-negative number such as an age or quantity.
///
/// Accepts `3.0` as well as `3` since spreadsheet exports sometimes write
/// whole numbers with a decimal point.
fn parse_count(text: &str) -> Option<u32> {
    let text = text.trim();

    text.parse::<u32>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0 && value.fract() == 0.0)
            .filter(|value| *value <= f64::from(u32::MAX))
            .map(|value| value as u32)
    })
}

fn parse_amount(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}
