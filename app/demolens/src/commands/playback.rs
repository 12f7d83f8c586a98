//! FILENAME: app/demolens/src/commands/playback.rs
// PURPOSE: Inflating captured queries into fresh payloads.
// CONTEXT: The library lock is held only to copy captures out and to pin
// column counts afterwards; inflation itself runs unlocked. The column count
// of a query's first inflate is saved so later playbacks keep the same axis
// width. Labels are regenerated every time, so time axes keep ending today.

use crate::api_types::{InflatedQuery, PlaybackResult};
use crate::config::DemoLensConfig;
use crate::error::AppError;
use crate::{log_debug, log_enter, log_error, log_exit, log_info, AppState};
use payload_engine::{inflate_payload, InflateRequest, Payload, ValueShapeConfig, VisualizationProfile};
use skeleton_store::QueryCapture;
use std::num::NonZeroUsize;
use std::thread;

/// One query to inflate, detached from the library.
struct Job {
    skeleton_id: String,
    profile: VisualizationProfile,
    capture: QueryCapture,
}

/// Inflates a single query. `shape` overrides the stored masking for this
/// call only.
pub fn inflate_query(
    state: &AppState,
    skeleton_id: &str,
    query_id: &str,
    shape: Option<ValueShapeConfig>,
) -> Result<InflatedQuery, AppError> {
    log_enter!("PLAYBACK", "inflate_query", "{}/{}", skeleton_id, query_id);

    let job = {
        let library = state.lock_library();
        let skeleton = library.get_skeleton(skeleton_id)?;
        let capture = skeleton
            .query(query_id)
            .cloned()
            .ok_or_else(|| skeleton_store::StoreError::QueryNotFound {
                skeleton_id: skeleton_id.to_string(),
                query_id: query_id.to_string(),
            })?;
        Job {
            skeleton_id: skeleton.id.clone(),
            profile: skeleton.profile(),
            capture,
        }
    };

    let (inflated, column_count) = run_job(&state.config, &job, shape.as_ref())?;
    pin_column_counts(state, vec![(job, column_count)]);

    log_exit!("PLAYBACK", "inflate_query");
    Ok(inflated)
}

/// Inflates every query of every skeleton in a scenario (the active one when
/// `scenario_id` is `None`). Queries run in parallel, at most one thread per
/// core at a time; the first failure in playlist order is returned.
pub fn play_scenario(state: &AppState, scenario_id: Option<&str>) -> Result<PlaybackResult, AppError> {
    let (scenario_id, jobs) = {
        let library = state.lock_library();
        let scenario = match scenario_id {
            Some(id) => library.get_scenario(id)?,
            None => library
                .active_scenario()
                .ok_or_else(|| AppError::InvalidRequest("no active scenario".to_string()))?,
        };

        let jobs: Vec<Job> = library
            .scenario_skeletons(&scenario.id)?
            .into_iter()
            .flat_map(|skeleton| {
                skeleton.queries.iter().map(move |capture| Job {
                    skeleton_id: skeleton.id.clone(),
                    profile: skeleton.profile(),
                    capture: capture.clone(),
                })
            })
            .collect();
        (scenario.id.clone(), jobs)
    };

    log_info!("PLAYBACK", "play_scenario id={} queries={}", scenario_id, jobs.len());

    let outcomes = run_jobs(&state.config, &jobs);

    let mut queries = Vec::with_capacity(outcomes.len());
    let mut pins = Vec::new();
    for (job, outcome) in jobs.into_iter().zip(outcomes) {
        match outcome {
            Ok((inflated, column_count)) => {
                queries.push(inflated);
                pins.push((job, column_count));
            }
            Err(e) => {
                log_error!(
                    "PLAYBACK",
                    "query {}/{} failed: {}",
                    job.skeleton_id,
                    job.capture.id,
                    e
                );
                return Err(e);
            }
        }
    }
    pin_column_counts(state, pins);

    Ok(PlaybackResult {
        scenario_id,
        queries,
    })
}

/// Runs jobs in chunks of the available parallelism. Stops after the first
/// chunk that contains a failure.
fn run_jobs(config: &DemoLensConfig, jobs: &[Job]) -> Vec<Result<(InflatedQuery, usize), AppError>> {
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let mut outcomes = Vec::with_capacity(jobs.len());

    for chunk in jobs.chunks(workers) {
        thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|job| scope.spawn(move || run_job(config, job, None)))
                .collect();
            for (job, handle) in chunk.iter().zip(handles) {
                outcomes.push(handle.join().unwrap_or_else(|_| {
                    Err(AppError::WorkerPanicked {
                        skeleton_id: job.skeleton_id.clone(),
                        query_id: job.capture.id.clone(),
                    })
                }));
            }
        });
        if outcomes.iter().any(Result::is_err) {
            break;
        }
    }
    outcomes
}

/// Inflates one job. Returns the query and its column count.
fn run_job(
    config: &DemoLensConfig,
    job: &Job,
    shape_override: Option<&ValueShapeConfig>,
) -> Result<(InflatedQuery, usize), AppError> {
    let capture = &job.capture;
    let shape = shape_override
        .or(capture.shape.as_ref())
        .unwrap_or(&config.default_shape)
        .clone();

    let request = InflateRequest::new(&capture.template, &capture.schema, &capture.visualization_type)
        .with_light(capture.light.as_ref())
        .with_prior_column_count(capture.prior_column_count)
        .with_shape(shape)
        .with_profile(job.profile)
        .with_noise(config.noise);

    let payload: Payload = inflate_payload(&request)?;
    log_debug!(
        "SYNTH",
        "inflated {}/{} columns={} rows={}",
        job.skeleton_id,
        capture.id,
        payload.result.columns.len(),
        payload.result.rows.len()
    );

    let column_count = payload.result.columns.len();
    Ok((
        InflatedQuery {
            skeleton_id: job.skeleton_id.clone(),
            query_id: capture.id.clone(),
            visualization_type: capture.visualization_type.clone(),
            payload: payload.to_json()?,
        },
        column_count,
    ))
}

/// Saves the column count of queries that had none yet.
fn pin_column_counts(state: &AppState, pins: Vec<(Job, usize)>) {
    let unpinned: Vec<_> = pins
        .into_iter()
        .filter(|(job, _)| job.capture.prior_column_count.is_none())
        .collect();
    if unpinned.is_empty() {
        return;
    }

    let mut library = state.lock_library();
    for (job, count) in unpinned {
        // The skeleton may have been deleted while we were inflating.
        if let Err(e) = library.pin_column_count(&job.skeleton_id, &job.capture.id, count) {
            log_debug!("PLAYBACK", "skip pinning {}/{}: {}", job.skeleton_id, job.capture.id, e);
        }
    }
    state.persist(&library);
}
