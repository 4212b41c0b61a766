// src/handlers/crud.rs

// Handlers genéricos: uma página CRUD qualquer (`P: CrudPage`) extraída do `AppState`.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    db::entity_store::RecordId,
    middleware::i18n::Locale,
    services::page::{CrudPage, DraftOf},
};

// GET /
pub async fn get_page<P>(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let page = P::from_ref(&app_state)
        .page()
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// PUT /draft
pub async fn stage_create<P>(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(patch): Json<DraftOf<P>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let draft = P::from_ref(&app_state)
        .stage_create(patch)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(draft)))
}

// POST /  (grava a linha de criação)
pub async fn submit_create<P>(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let record = P::from_ref(&app_state)
        .submit_create()
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

// PUT /{id}
pub async fn update_record<P>(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<RecordId>,
    Json(draft): Json<DraftOf<P>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let record = P::from_ref(&app_state)
        .update(id, draft)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(record)))
}

// DELETE /{id}  (id ausente também responde 204)
pub async fn remove_record<P>(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    P::from_ref(&app_state)
        .remove(id)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /{id}/edit
pub async fn begin_edit<P>(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let editing = P::from_ref(&app_state)
        .begin_edit(id)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(editing)))
}

// PUT /edit
pub async fn stage_edit<P>(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(patch): Json<DraftOf<P>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let editing = P::from_ref(&app_state)
        .stage_edit(patch)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(editing)))
}

// POST /edit/save
pub async fn save_edit<P>(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    let record = P::from_ref(&app_state)
        .save_edit()
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(record)))
}

// DELETE /edit
pub async fn cancel_edit<P>(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError>
where
    P: CrudPage + FromRef<AppState>,
{
    P::from_ref(&app_state)
        .cancel_edit()
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
