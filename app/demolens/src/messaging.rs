//! FILENAME: app/demolens/src/messaging.rs
// PURPOSE: Request dispatch and native-messaging framing.
// CONTEXT: Browsers frame each JSON message with a 4-byte length in native
// byte order. Every request gets exactly one response; failures become
// `Response::Error` with a stable `kind`. Requests that wait on other
// requests are answered from their own thread, so their response can come
// after responses to later requests.

use crate::api_types::{PlaybackResult, Request, Response};
use crate::commands;
use crate::error::AppError;
use crate::{log_enter, log_info, log_warn, AppState};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Largest message accepted from the extension.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// DISPATCH
// ============================================================================

pub fn dispatch(state: &AppState, request: Request) -> Response {
    log_enter!("MSG", "dispatch", "{}", request.name());
    let name = request.name();

    match handle(state, request) {
        Ok(response) => response,
        Err(e) => {
            log_warn!("MSG", "{} failed kind={} {}", name, e.kind(), e);
            error_response(&e)
        }
    }
}

fn error_response(e: &AppError) -> Response {
    Response::Error {
        kind: e.kind().to_string(),
        message: e.to_string(),
    }
}

fn handle(state: &AppState, request: Request) -> Result<Response, AppError> {
    let response = match request {
        Request::CaptureSkeleton {
            name,
            dashboard_id,
            source_url,
            product,
            queries,
        } => {
            let (skeleton_id, query_ids) =
                commands::capture_skeleton(state, &name, dashboard_id, source_url, product, queries)?;
            Response::SkeletonCaptured {
                skeleton_id,
                query_ids,
            }
        }
        Request::DeleteSkeleton { skeleton_id } => {
            commands::delete_skeleton(state, &skeleton_id)?;
            Response::Ok
        }
        Request::ListSkeletons => Response::Skeletons {
            skeletons: commands::list_skeletons(state),
        },
        Request::CreateScenario { name, description } => Response::Scenario {
            scenario: commands::create_scenario(state, &name, description.as_deref())?,
        },
        Request::RenameScenario { scenario_id, name } => Response::Scenario {
            scenario: commands::rename_scenario(state, &scenario_id, &name)?,
        },
        Request::AddToScenario {
            scenario_id,
            skeleton_id,
        } => Response::Scenario {
            scenario: commands::add_to_scenario(state, &scenario_id, &skeleton_id)?,
        },
        Request::RemoveFromScenario {
            scenario_id,
            skeleton_id,
        } => Response::Scenario {
            scenario: commands::remove_from_scenario(state, &scenario_id, &skeleton_id)?,
        },
        Request::DeleteScenario { scenario_id } => {
            commands::delete_scenario(state, &scenario_id)?;
            Response::Ok
        }
        Request::ActivateScenario { scenario_id } => {
            commands::activate_scenario(state, scenario_id.as_deref())?;
            Response::Ok
        }
        Request::ListScenarios => {
            let (scenarios, active_scenario_id) = commands::list_scenarios(state);
            Response::Scenarios {
                scenarios,
                active_scenario_id,
            }
        }
        Request::InflateQuery {
            skeleton_id,
            query_id,
            shape,
        } => Response::Inflated {
            query: commands::inflate_query(state, &skeleton_id, &query_id, shape)?,
        },
        Request::PlayScenario { scenario_id } => {
            let result: PlaybackResult = commands::play_scenario(state, scenario_id.as_deref())?;
            Response::Playback { result }
        }
        Request::SaveLightPayload {
            skeleton_id,
            query_id,
            light,
        } => {
            commands::save_light_payload(state, &skeleton_id, &query_id, light)?;
            Response::Ok
        }
        Request::SetQueryShape {
            skeleton_id,
            query_id,
            shape,
        } => {
            commands::set_query_shape(state, &skeleton_id, &query_id, shape)?;
            Response::Ok
        }
        Request::SetCurrentDashboard { dashboard } => {
            commands::set_current_dashboard(state, dashboard);
            Response::Ok
        }
        Request::GetCurrentDashboard { wait } => {
            let dashboard = if wait {
                Some(commands::wait_for_current_dashboard(state)?)
            } else {
                commands::get_current_dashboard(state)
            };
            Response::CurrentDashboard { dashboard }
        }
        Request::ExportScenario { scenario_id, path } => {
            commands::export_scenario(state, &scenario_id, Path::new(&path))?;
            Response::Ok
        }
        Request::ImportScenario { path } => Response::Scenario {
            scenario: commands::import_scenario(state, Path::new(&path))?,
        },
    };
    Ok(response)
}

// ============================================================================
// FRAMING
// ============================================================================

/// Reads one framed message body. `Ok(None)` on a clean end of stream.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, AppError> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_ne_bytes(len_bytes) as usize;
    if len > MAX_MESSAGE_BYTES {
        return Err(AppError::InvalidRequest(format!(
            "message of {} bytes exceeds limit of {}",
            len, MAX_MESSAGE_BYTES
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Reads and parses one request. `Ok(None)` on a clean end of stream.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Request>, AppError> {
    match read_frame(reader)? {
        Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
        None => Ok(None),
    }
}

pub fn write_message<W: Write>(writer: &mut W, response: &Response) -> Result<(), AppError> {
    let body = serde_json::to_vec(response)?;
    let len = u32::try_from(body.len())
        .map_err(|_| AppError::InvalidRequest("response too large".to_string()))?;
    writer.write_all(&len.to_ne_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Whether answering `request` may block until a later request arrives.
fn waits_on_other_requests(request: &Request) -> bool {
    matches!(request, Request::GetCurrentDashboard { wait: true })
}

fn send<W: Write>(writer: &Mutex<W>, response: &Response) -> Result<(), AppError> {
    let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
    write_message(&mut *writer, response)
}

/// Serves requests until the reader is exhausted. Malformed messages get an
/// error response; transport failures end the loop. Waiting requests are
/// answered from scoped threads, which are joined before returning.
pub fn run_host<R: Read, W: Write + Send>(state: &AppState, mut reader: R, writer: W) -> Result<(), AppError> {
    log_info!("MSG", "host started");
    let writer = Mutex::new(writer);
    let mut served = 0usize;

    let result = thread::scope(|scope| -> Result<(), AppError> {
        while let Some(body) = read_frame(&mut reader)? {
            served += 1;
            match serde_json::from_slice::<Request>(&body) {
                Ok(request) if waits_on_other_requests(&request) => {
                    let writer = &writer;
                    scope.spawn(move || {
                        let response = dispatch(state, request);
                        if let Err(e) = send(writer, &response) {
                            log_warn!("MSG", "could not send deferred response: {}", e);
                        }
                    });
                }
                Ok(request) => send(&writer, &dispatch(state, request))?,
                Err(e) => {
                    log_warn!("MSG", "malformed request: {}", e);
                    send(&writer, &error_response(&AppError::from(e)))?;
                }
            }
        }
        Ok(())
    });

    log_info!("MSG", "host stopped after {} messages", served);
    result
}
