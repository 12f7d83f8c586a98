//! FILENAME: app/demolens/src/commands/capture.rs
// PURPOSE: Capturing skeletons and editing their per-query data.

use crate::api_types::CapturedQuery;
use crate::error::AppError;
use crate::{log_debug, log_info, AppState};
use payload_engine::{LightPayload, SkeletonTemplate, SynthesizerError, ValueShapeConfig};
use query_schema::DecodeOptions;
use skeleton_store::{Product, QueryCapture, Skeleton, SkeletonSummary};

/// Stores a newly captured dashboard. Every query is checked up front (its
/// schema must decode and its template must have a first column) so a broken
/// capture fails here instead of at playback.
pub fn capture_skeleton(
    state: &AppState,
    name: &str,
    dashboard_id: Option<String>,
    source_url: Option<String>,
    product: Option<Product>,
    queries: Vec<CapturedQuery>,
) -> Result<(String, Vec<String>), AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("skeleton name is empty".to_string()));
    }
    if queries.is_empty() {
        return Err(AppError::InvalidRequest("capture has no queries".to_string()));
    }

    let product = product.unwrap_or_else(|| Product::from(state.config.profile));
    let options = DecodeOptions {
        grid_rule: product.profile().grid_rule(),
        ..Default::default()
    };

    let mut skeleton = Skeleton::new(name, product);
    skeleton.dashboard_id = dashboard_id;
    skeleton.source_url = source_url;

    for captured in queries {
        query_schema::decode(&captured.schema, &captured.visualization_type, &options)
            .map_err(SynthesizerError::from)?;
        SkeletonTemplate::from_value(captured.template.clone())?;

        let id = captured
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if skeleton.query(&id).is_some() {
            return Err(AppError::InvalidRequest(format!("duplicate query id {}", id)));
        }

        log_debug!("STORE", "captured query {} ({})", id, captured.visualization_type);
        skeleton.queries.push(QueryCapture {
            id,
            title: captured.title.unwrap_or_default(),
            visualization_type: captured.visualization_type,
            schema: captured.schema,
            template: captured.template,
            light: None,
            prior_column_count: None,
            shape: None,
        });
    }

    let query_ids = skeleton.queries.iter().map(|q| q.id.clone()).collect();
    let mut library = state.lock_library();
    let skeleton_id = library.save_skeleton(skeleton);
    state.persist(&library);

    log_info!("STORE", "capture_skeleton id={} name={}", skeleton_id, name);
    Ok((skeleton_id, query_ids))
}

pub fn delete_skeleton(state: &AppState, skeleton_id: &str) -> Result<(), AppError> {
    let mut library = state.lock_library();
    library.delete_skeleton(skeleton_id)?;
    state.persist(&library);
    log_info!("STORE", "delete_skeleton id={}", skeleton_id);
    Ok(())
}

pub fn list_skeletons(state: &AppState) -> Vec<SkeletonSummary> {
    state.lock_library().list_skeletons()
}

pub fn save_light_payload(
    state: &AppState,
    skeleton_id: &str,
    query_id: &str,
    light: LightPayload,
) -> Result<(), AppError> {
    let mut library = state.lock_library();
    library.save_light_payload(skeleton_id, query_id, light)?;
    state.persist(&library);
    log_debug!("STORE", "save_light_payload {}/{}", skeleton_id, query_id);
    Ok(())
}

pub fn set_query_shape(
    state: &AppState,
    skeleton_id: &str,
    query_id: &str,
    shape: Option<ValueShapeConfig>,
) -> Result<(), AppError> {
    let mut library = state.lock_library();
    library.set_query_shape(skeleton_id, query_id, shape)?;
    state.persist(&library);
    log_debug!("STORE", "set_query_shape {}/{}", skeleton_id, query_id);
    Ok(())
}
