use crate::locale::LocaleDescriptor;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

#[derive(Debug, Default, serde::Deserialize)]
pub struct PageQuery {
    pub q: Option<String>,
}

pub async fn get_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok());
    let locale = LocaleDescriptor::from_accept_language(accept_language, &state.config.default_locale);
    let search_term = query.q.unwrap_or_default();

    tracing::debug!("Rendering page for locale {} (search: {:?})", locale.locale, search_term);

    let view = state.service.render(&locale, &search_term).await;
    match view.to_html() {
        Ok(html) => (
            [(header::CONTENT_LANGUAGE, locale.locale.clone()), (header::VARY, "Accept-Language".to_string())],
            Html(html),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}
