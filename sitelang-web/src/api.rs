//! JSON handlers for the catalog and autotranslate endpoints

use crate::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sitelang::paging::PAGE_SIZES;
use sitelang::{
    CatalogError, Format, LanguageItem, LanguageMap, Page, Site, SiteDirectory, SiteId,
    TranslationQuery, export_catalog, import_catalog, reconcile,
};
use sitelang_mt::{
    AutotranslateOptions, AutotranslateRequest, AutotranslateResponse, AutotranslateTextRequest,
    AutotranslateTextResponse, EntryRowRequest,
};
use tracing::{error, info};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Validation failures are the caller's fault (400); everything else is ours (500)
pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(CatalogError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Autotranslate
// ============================================================================

/// Malformed bodies are answered like missing parameters
pub async fn autotranslate(
    State(state): State<AppState>,
    body: Result<Json<AutotranslateRequest>, JsonRejection>,
) -> Json<AutotranslateResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    Json(state.autotranslator.autotranslate(&request).await)
}

pub async fn autotranslate_text(
    State(state): State<AppState>,
    body: Result<Json<AutotranslateTextRequest>, JsonRejection>,
) -> Json<AutotranslateTextResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    Json(state.autotranslator.autotranslate_text(&request).await)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub autotranslate: AutotranslateOptions,
    pub sites: Vec<Site>,
    pub primary_site: SiteId,
    pub languages: Vec<String>,
    pub page_sizes: Vec<usize>,
}

pub async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let sites = state.sites.list_sites();
    Json(OptionsResponse {
        autotranslate: state.autotranslator.options(),
        languages: LanguageMap::from_sites(&sites).languages(),
        primary_site: state.sites.primary_site().id,
        sites,
        page_sizes: PAGE_SIZES.to_vec(),
    })
}

// ============================================================================
// Catalog editing
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub q: Option<String>,
    pub group: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub translations: Vec<LanguageItem>,
    pub languages: Vec<String>,
    #[serde(flatten)]
    pub page: Page,
}

pub async fn list_translations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse>> {
    let mut query = TranslationQuery::new();
    if let Some(search) = params.q.as_deref().filter(|q| !q.trim().is_empty()) {
        query = query.search(search);
    }
    if let Some(group) = params.group.as_deref().filter(|g| !g.is_empty()) {
        query = query.group(group);
    }

    let map = LanguageMap::from_sites(&state.sites.list_sites());
    let store = state.store.lock().await;
    let total = store.count(&query)?;
    let page = Page::new(
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(PAGE_SIZES[0]),
        total,
    );
    let translations = store.list(&page.apply(query))?;

    Ok(Json(ListResponse {
        translations: reconcile::collapse_all(&translations, &map),
        languages: map.languages(),
        page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub translations: Vec<LanguageItem>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub saved: usize,
}

pub async fn save_translations(
    State(state): State<AppState>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    let Json(request) = body?;
    let map = LanguageMap::from_sites(&state.sites.list_sites());
    let items = reconcile::expand(request.translations, &map);

    let mut store = state.store.lock().await;
    store.save_batch(&items)?;
    info!("Saved {} translations", items.len());

    Ok(Json(SaveResponse {
        success: true,
        saved: items.len(),
    }))
}

pub async fn save_entry_row(
    State(state): State<AppState>,
    body: Result<Json<EntryRowRequest>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    let Json(row) = body?;
    let saved = state
        .autotranslator
        .save_entry_row(&row)
        .map_err(|err| CatalogError::Validation(err.to_string()))?;

    Ok(Json(SaveResponse {
        success: true,
        saved,
    }))
}

#[derive(Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<String>,
}

pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<GroupsResponse>> {
    let store = state.store.lock().await;
    Ok(Json(GroupsResponse {
        groups: store.groups()?,
    }))
}

// ============================================================================
// Interchange
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FormatParams {
    pub format: Option<String>,
}

impl FormatParams {
    /// CSV unless the caller names another format
    fn format(&self) -> Result<Format, CatalogError> {
        self.format.as_deref().unwrap_or("csv").parse()
    }
}

pub async fn export(
    State(state): State<AppState>,
    Query(params): Query<FormatParams>,
) -> ApiResult<Response> {
    let format = params.format()?;
    let sites = state.sites.list_sites();
    let bytes = {
        let store = state.store.lock().await;
        export_catalog(&store, &sites, format)?
    };

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: usize,
}

pub async fn import(
    State(state): State<AppState>,
    Query(params): Query<FormatParams>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    let format = params.format()?;
    let sites = state.sites.list_sites();
    let mut store = state.store.lock().await;
    let imported = import_catalog(&mut store, &sites, format, &body)?;
    Ok(Json(ImportResponse {
        success: true,
        imported,
    }))
}
