use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use super::request_trace::RequestId;

/// Log level bucket for a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Ok,
    ClientError,
    ServerError,
}

impl Severity {
    fn of(status: StatusCode) -> Self {
        if status.is_server_error() {
            Severity::ServerError
        } else if status.is_client_error() {
            Severity::ClientError
        } else {
            Severity::Ok
        }
    }
}

/// What gets logged once the response is known.
struct Completed {
    method: String,
    path: String,
    /// Matched route template, e.g. `/api/games/{id}`.
    route: String,
    status: StatusCode,
    request_id: String,
    duration_us: u64,
}

impl Completed {
    fn emit(&self) {
        let Completed {
            method,
            path,
            route,
            status,
            request_id,
            duration_us,
        } = self;
        let status_code = status.as_u16();
        match Severity::of(*status) {
            Severity::ServerError => {
                error!(http.method=%method, url.path=%path, http.route=%route, http.status_code=status_code, duration_us, request_id=%request_id, message="request_completed")
            }
            Severity::ClientError => {
                warn!(http.method=%method, url.path=%path, http.route=%route, http.status_code=status_code, duration_us, request_id=%request_id, message="request_completed")
            }
            Severity::Ok => {
                info!(http.method=%method, url.path=%path, http.route=%route, http.status_code=status_code, duration_us, request_id=%request_id, message="request_completed")
            }
        }
    }
}

/// One `request_completed` event per request, level chosen by status class.
///
/// Register before `RequestTrace` so that one runs first and the request
/// id is in the extensions.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, request_id, route) = match &result {
                Ok(res) => {
                    let req = res.request();
                    let request_id = req
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.0.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    let route = req.match_pattern().unwrap_or_else(|| "unmatched".to_string());
                    (res.status(), request_id, route)
                }
                Err(err) => (
                    err.as_response_error().status_code(),
                    "unknown".to_string(),
                    "unmatched".to_string(),
                ),
            };

            Completed {
                method,
                path,
                route,
                status,
                request_id,
                duration_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            }
            .emit();

            result
        })
    }
}
