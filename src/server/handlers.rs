use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::ImageTranslator;
use crate::languages::{Language, LanguageCatalog};

use super::models::{
    ErrorResponse, LangResponse, LanguagesQuery, SetLangRequest, TranslateRequest,
    TranslateResponse,
};
use super::state::ServerState;
use super::translate::{ServerError, current_lang, translate_request, update_lang};

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn run_server(translator: ImageTranslator, addr: String) -> Result<()> {
    let state = Arc::new(ServerState {
        translator,
        catalog: LanguageCatalog,
    });
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| "failed to bind server address")?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/lang/:user_id", get(get_lang).put(put_lang))
        .route("/languages", get(languages))
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,PUT,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

fn into_response_error(err: ServerError) -> HandlerError {
    (err.status, Json(ErrorResponse { error: err.message }))
}

async fn translate(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, HandlerError> {
    translate_request(&state.translator, &state.catalog, payload)
        .await
        .map(Json)
        .map_err(into_response_error)
}

async fn get_lang(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<LangResponse>, HandlerError> {
    current_lang(state.translator.prefs(), &state.catalog, user_id)
        .await
        .map(Json)
        .map_err(into_response_error)
}

async fn put_lang(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<u64>,
    Json(payload): Json<SetLangRequest>,
) -> Result<Json<LangResponse>, HandlerError> {
    update_lang(state.translator.prefs(), &state.catalog, user_id, payload)
        .await
        .map(Json)
        .map_err(into_response_error)
}

async fn languages(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LanguagesQuery>,
) -> Json<Vec<Language>> {
    Json(state.catalog.autocomplete(&query.q))
}
