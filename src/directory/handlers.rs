use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::state::AppState;

use super::types::{Company, CompanyInput, StaffInput, StaffListing, StaffMember, StaffWithCompany};

pub async fn handle_list_companies(
    State(state): State<Arc<AppState>>,
) -> StoreResult<Json<Vec<Company>>> {
    Ok(Json(state.directory.list_companies().await?))
}

pub async fn handle_get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StoreResult<Json<Company>> {
    state
        .directory
        .get_company(id)
        .await?
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(format!("company {id}")))
}

/// Staff of one company, for the kiosk staff picker.
pub async fn handle_list_company_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StoreResult<Json<Vec<StaffMember>>> {
    if state.directory.get_company(id).await?.is_none() {
        return Err(StoreError::NotFound(format!("company {id}")));
    }
    Ok(Json(state.directory.list_staff_for_company(id).await?))
}

pub async fn handle_create_company(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompanyInput>,
) -> StoreResult<(StatusCode, Json<Company>)> {
    let company = state.directory.create_company(req.validated()?).await?;
    info!("Created company {} ({})", company.name, company.id);
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn handle_update_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompanyInput>,
) -> StoreResult<Json<Company>> {
    let company = state.directory.update_company(id, req.validated()?).await?;
    Ok(Json(company))
}

pub async fn handle_delete_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StoreResult<StatusCode> {
    state.directory.delete_company(id).await?;
    info!("Deleted company {id}");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_list_staff(
    State(state): State<Arc<AppState>>,
) -> StoreResult<Json<Vec<StaffListing>>> {
    Ok(Json(state.directory.list_staff().await?))
}

pub async fn handle_get_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StoreResult<Json<StaffWithCompany>> {
    state
        .directory
        .get_staff(id)
        .await?
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(format!("staff member {id}")))
}

async fn checked_staff_input(state: &AppState, req: StaffInput) -> StoreResult<StaffInput> {
    let input = req.validated()?;
    if let Some(company_id) = input.company_id {
        if state.directory.get_company(company_id).await?.is_none() {
            return Err(StoreError::Validation(format!(
                "company {company_id} does not exist"
            )));
        }
    }
    Ok(input)
}

pub async fn handle_create_staff(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StaffInput>,
) -> StoreResult<(StatusCode, Json<StaffMember>)> {
    let input = checked_staff_input(&state, req).await?;
    let staff = state.directory.create_staff(input).await?;
    info!("Created staff member {} ({})", staff.name, staff.id);
    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn handle_update_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<StaffInput>,
) -> StoreResult<Json<StaffMember>> {
    let input = checked_staff_input(&state, req).await?;
    Ok(Json(state.directory.update_staff(id, input).await?))
}

pub async fn handle_delete_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StoreResult<StatusCode> {
    state.directory.delete_staff(id).await?;
    info!("Deleted staff member {id}");
    Ok(StatusCode::NO_CONTENT)
}
