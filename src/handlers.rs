use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

use crate::app_state::AppState;
use crate::metrics;
use crate::resolver::ResolveError;
use crate::rpc_client::UpstreamError;

const BAD_UPSTREAM_RESPONSE: &str = "Bad upstream response";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz)
        .service(get_balance)
        .service(metrics::metrics);
}

#[actix_web::get("/healthz")]
async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

#[actix_web::get("/address/balance/{address}")]
async fn get_balance(
    path: web::Path<(String,)>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ResolveError> {
    let (address,) = path.into_inner();

    let result = data.resolver.resolve(&address).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(ResolveError::InvalidInput(_)) => "invalid_input",
        Err(ResolveError::Upstream(_)) => "upstream_error",
        Err(ResolveError::Internal(err)) => {
            tracing::error!("unexpected failure resolving {address}: {err:#}");
            "internal"
        }
    };
    data.metrics
        .request_counter
        .with_label_values(&[outcome])
        .inc();

    Ok(HttpResponse::Ok().json(result?))
}

impl ResponseError for ResolveError {
    fn status_code(&self) -> StatusCode {
        match self {
            ResolveError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ResolveError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ResolveError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            ResolveError::Upstream(UpstreamError::Rpc(error)) => {
                json!({"upstream_error": error})
            }
            ResolveError::Upstream(_) => json!(BAD_UPSTREAM_RESPONSE),
            other => json!(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(json!({"detail": detail}))
    }
}
