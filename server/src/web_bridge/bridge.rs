use crate::web_bridge::model::{ErrorReply, MutationReply, StatusReport};
use crate::web_bridge::page::INDEX_HTML;
use crate::workflow::session::Session;
use anyhow::anyhow;
use log::{error, info, warn};
use radcore::model::UnknownUnit;
use radcore::presentation::CaptureForm;
use radcore::report::{CSV_EXPORT_FILE_NAME, MARKER_ICON_SVG};
use radcore::{GeoPoint, StoreError};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Largest CSV accepted by `/api/upload`.
const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub type SharedSession = Arc<Mutex<Session>>;

/// Hosts the HTTP surface over a single shared session.
pub struct WebBridge {
    session: SharedSession,
}

impl WebBridge {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let (bound, server) = warp::serve(routes(self.session.clone()))
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .map_err(|err| anyhow!("binding {addr}: {err}"))?;
        info!("[web] listening on http://{bound}");
        server.await;
        info!("[web] stopped");
        Ok(())
    }
}

pub fn routes(
    session: SharedSession,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let session_filter = warp::any().map(move || session.clone());

    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML).into_response());

    let marker_icon = warp::path!("static" / "marker.svg")
        .and(warp::get())
        .map(|| {
            warp::reply::with_header(MARKER_ICON_SVG, "content-type", "image/svg+xml")
                .into_response()
        });

    let view = warp::path!("api" / "view")
        .and(warp::get())
        .and(session_filter.clone())
        .map(|session: SharedSession| {
            respond(with_session(&session, |session| Ok(session.view())))
        });

    let list = warp::path!("api" / "points")
        .and(warp::get())
        .and(session_filter.clone())
        .map(|session: SharedSession| {
            respond(with_session(&session, |session| {
                Ok(session.records().to_vec())
            }))
        });

    let click = warp::path!("api" / "click")
        .and(warp::post())
        .and(warp::body::json())
        .and(session_filter.clone())
        .map(|point: GeoPoint, session: SharedSession| {
            respond(with_session(&session, |session| {
                session.record_click(point);
                Ok(session.view())
            }))
        });

    let submit = warp::path!("api" / "points")
        .and(warp::post())
        .and(warp::body::json())
        .and(session_filter.clone())
        .map(|form: CaptureForm, session: SharedSession| {
            respond(with_session(&session, |session| {
                let record = session.submit(form)?;
                info!(
                    "[web] appended {:.5},{:.5} {} {}",
                    record.latitude, record.longitude, record.value, record.unit
                );
                Ok(MutationReply::ok(session.records().len(), Some(record)))
            }))
        });

    let undo = warp::path!("api" / "undo")
        .and(warp::post())
        .and(session_filter.clone())
        .map(|session: SharedSession| {
            respond(with_session(&session, |session| {
                let removed = session.undo()?;
                Ok(MutationReply::ok(session.records().len(), removed))
            }))
        });

    let clear = warp::path!("api" / "clear")
        .and(warp::post())
        .and(session_filter.clone())
        .map(|session: SharedSession| {
            respond(with_session(&session, |session| {
                session.clear()?;
                Ok(MutationReply::ok(0, None))
            }))
        });

    let upload = warp::path!("api" / "upload")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_UPLOAD_BYTES))
        .and(warp::body::bytes())
        .and(session_filter.clone())
        .map(|body: Bytes, session: SharedSession| {
            respond(with_session(&session, |session| {
                let count = session.upload(&body)?;
                info!("[web] table replaced from upload ({} rows)", count);
                Ok(MutationReply::ok(count, None))
            }))
        });

    let export_csv = warp::path!("export" / "csv")
        .and(warp::get())
        .and(session_filter.clone())
        .map(|session: SharedSession| {
            match with_session(&session, |session| session.export_csv()) {
                Ok(bytes) => attachment(bytes, "text/csv; charset=utf-8", CSV_EXPORT_FILE_NAME),
                Err(err) => error_response(err),
            }
        });

    let export_map = warp::path!("export" / "map")
        .and(warp::get())
        .and(session_filter.clone())
        .map(|session: SharedSession| {
            match with_session(&session, |session| session.export_snapshot()) {
                Ok(Some(snapshot)) => attachment(
                    snapshot.html.into_bytes(),
                    "text/html; charset=utf-8",
                    &snapshot.file_name,
                ),
                Ok(None) => json_response(
                    &ErrorReply::new("no measurements to map".into()),
                    StatusCode::NOT_FOUND,
                ),
                Err(err) => error_response(err),
            }
        });

    let status = warp::path!("api" / "status")
        .and(warp::get())
        .and(session_filter)
        .map(|session: SharedSession| {
            respond(with_session(&session, |session| {
                Ok(StatusReport {
                    point_count: session.records().len(),
                    pending_click: session.last_click().is_some(),
                    metrics: session.metrics(),
                    version: env!("CARGO_PKG_VERSION"),
                })
            }))
        });

    index
        .or(marker_icon)
        .unify()
        .or(view)
        .unify()
        .or(list)
        .unify()
        .or(click)
        .unify()
        .or(submit)
        .unify()
        .or(undo)
        .unify()
        .or(clear)
        .unify()
        .or(upload)
        .unify()
        .or(export_csv)
        .unify()
        .or(export_map)
        .unify()
        .or(status)
        .unify()
        .recover(recover_rejection)
        .unify()
}

/// Turns body-level rejections into the same JSON error shape as handler
/// failures. Routing rejections fall through to warp's defaults.
async fn recover_rejection(rejection: Rejection) -> Result<Response, Rejection> {
    let (status, reason) = if let Some(err) = rejection.find::<warp::body::BodyDeserializeError>()
    {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, err.to_string())
    } else {
        return Err(rejection);
    };
    warn!("[web] rejected request: {reason}");
    Ok(json_response(&ErrorReply::new(reason), status))
}

fn with_session<T>(
    session: &SharedSession,
    action: impl FnOnce(&mut Session) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut guard = session
        .lock()
        .map_err(|_| anyhow!("session lock poisoned"))?;
    action(&mut guard)
}

fn respond<T: Serialize>(result: anyhow::Result<T>) -> Response {
    match result {
        Ok(value) => json_response(&value, StatusCode::OK),
        Err(err) => error_response(err),
    }
}

fn json_response<T: Serialize>(value: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(value), status).into_response()
}

fn attachment(body: Vec<u8>, content_type: &'static str, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    let reply = warp::reply::with_header(body, "content-type", content_type);
    warp::reply::with_header(reply, "content-disposition", disposition).into_response()
}

fn error_response(err: anyhow::Error) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("[web] request failed: {err:#}");
    } else {
        warn!("[web] rejected input: {err:#}");
    }
    json_response(&ErrorReply::new(format!("{err:#}")), status)
}

fn status_for(err: &anyhow::Error) -> StatusCode {
    let bad_input = err.downcast_ref::<UnknownUnit>().is_some()
        || err
            .downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_bad_input);
    if bad_input {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
