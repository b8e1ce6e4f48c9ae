//! Assigns every request an id, exposes it to handlers and error rendering,
//! and echoes it back in `x-request-id`.
//!
//! The downstream future runs inside a `request` span carrying the id,
//! method and path, with the id also published as a task-local so error
//! rendering can stamp it on problem bodies.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    HttpMessage,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Request id stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

tokio::task_local! {
    static CURRENT: RequestId;
}

/// Id of the request the current task is serving, or "unknown" outside
/// `RequestTrace`. Catalog code gets the id from `RequestCtx` instead.
pub fn current_request_id() -> String {
    CURRENT
        .try_with(|id| id.0.clone())
        .unwrap_or_else(|_| "unknown".to_string())
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = Uuid::new_v4().to_string();
        req.extensions_mut().insert(RequestId(request_id.clone()));

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path()
        );

        let fut = self.service.call(req);
        let scoped_id = request_id.clone();

        Box::pin(
            async move {
                let mut res = CURRENT.scope(RequestId(scoped_id), fut).await?;

                res.headers_mut().insert(
                    header::HeaderName::from_static("x-request-id"),
                    header::HeaderValue::from_str(&request_id)
                        .unwrap_or_else(|_| header::HeaderValue::from_static("invalid-uuid")),
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}
