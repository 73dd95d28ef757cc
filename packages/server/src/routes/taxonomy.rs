//! Component taxonomy endpoint.

use axum::Json;
use identifier::ComponentType;
use serde::Serialize;

#[derive(Serialize)]
pub struct TaxonomyResponse {
    component_types: Vec<TaxonomyEntry>,
}

#[derive(Serialize)]
pub struct TaxonomyEntry {
    name: &'static str,
    description: &'static str,
}

/// The fixed component taxonomy, for client-side display.
pub async fn taxonomy_handler() -> Json<TaxonomyResponse> {
    Json(TaxonomyResponse {
        component_types: ComponentType::ALL
            .iter()
            .map(|ty| TaxonomyEntry {
                name: ty.as_str(),
                description: ty.description(),
            })
            .collect(),
    })
}
