//! Access log middleware
//!
//! Logs method, path, status and duration of each request and adds a
//! `Server-Timing` header with the handler time.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone, Default)]
pub struct TimingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingService {
            service: Rc::new(service),
        }))
    }
}

pub struct TimingService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TimingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        Box::pin(async move {
            let result = srv.call(req).await;
            let elapsed = start.elapsed();

            match result {
                Ok(mut response) => {
                    let status = response.status();
                    if path.starts_with("/health") || path.starts_with("/assets") {
                        debug!("{} {} -> {} in {:?}", method, path, status.as_u16(), elapsed);
                    } else if status.is_server_error() {
                        warn!("{} {} -> {} in {:?}", method, path, status.as_u16(), elapsed);
                    } else {
                        info!("{} {} -> {} in {:?}", method, path, status.as_u16(), elapsed);
                    }

                    let timing = format!("app;dur={:.1}", elapsed.as_secs_f64() * 1000.0);
                    if let Ok(value) = HeaderValue::from_str(&timing) {
                        response
                            .headers_mut()
                            .insert(HeaderName::from_static("server-timing"), value);
                    }
                    Ok(response)
                }
                Err(e) => {
                    warn!("{} {} failed after {:?}: {}", method, path, elapsed, e);
                    Err(e)
                }
            }
        })
    }
}
