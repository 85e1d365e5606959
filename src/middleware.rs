//! Per-request access log on top of `tracing`.

use std::rc::Rc;
use std::time::Instant;

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::{LocalBoxFuture, Ready, ok};
use tracing::{info, warn};

pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggerService {
            service: Rc::new(service),
        })
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let method = req.method().to_string();
        let path = req.path().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let result = service.call(req).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(res) if res.status().as_u16() >= 400 => {
                    warn!(
                        method = %method,
                        path = %path,
                        status = res.status().as_u16(),
                        duration_ms,
                        "Request completed with error"
                    );
                }
                Ok(res) => {
                    info!(
                        method = %method,
                        path = %path,
                        status = res.status().as_u16(),
                        duration_ms,
                        "Request completed"
                    );
                }
                Err(e) => {
                    warn!(
                        method = %method,
                        path = %path,
                        error = %e,
                        duration_ms,
                        "Request failed"
                    );
                }
            }

            result
        })
    }
}
