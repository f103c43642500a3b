use axum::{body::Body, response::Response};
use scraper::{ElementRef, Html, Selector};

async fn response_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).into_owned()
}

/// Parse a full page, use [parse_html_fragment] for HTMX partials.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn select_all<'a>(html: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    let selector = Selector::parse(selector)
        .unwrap_or_else(|error| panic!("Invalid selector {selector:?}: {error}"));

    html.select(&selector).collect()
}

/// The trimmed text content of `element` and its children.
pub(crate) fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}
