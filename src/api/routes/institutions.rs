//! Institutions Routes
//!
//! - GET /institutions - List supported institutions
//! - GET /institutions/:institution_id - Get one institution
//!
//! The catalogue is a static stub; the real listing comes from the
//! out-of-scope aggregator API client.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{InstitutionDto, InstitutionsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /institutions
pub async fn list_institutions(
    State(_state): State<Arc<AppState>>,
) -> Json<InstitutionsResponse> {
    Json(InstitutionsResponse {
        institutions: catalogue(),
    })
}

/// GET /institutions/:institution_id
pub async fn get_institution(
    State(_state): State<Arc<AppState>>,
    Path(institution_id): Path<String>,
) -> ApiResult<Json<InstitutionDto>> {
    catalogue()
        .into_iter()
        .find(|i| i.institution_id == institution_id)
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!("Institution '{}' not found", institution_id))
        })
}

fn catalogue() -> Vec<InstitutionDto> {
    vec![
        InstitutionDto {
            institution_id: "ins_1".to_string(),
            name: "First Platypus Bank".to_string(),
            products: vec!["auth".to_string(), "transactions".to_string()],
        },
        InstitutionDto {
            institution_id: "ins_2".to_string(),
            name: "Tattersall Federal Credit Union".to_string(),
            products: vec!["transactions".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_ids_are_unique() {
        let ids: Vec<_> = catalogue().into_iter().map(|i| i.institution_id).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }
}
