use actix_web::{error, web, Error, HttpResponse};
use prometheus::{Counter, Encoder, IntCounterVec, Registry, TextEncoder};

use crate::app_state::AppState;

pub struct Metrics {
    pub registry: prometheus::Registry,
    pub cache_hit_counter: Counter,
    pub cache_miss_counter: Counter,
    pub cache_expired_miss_counter: Counter,
    pub upstream_error_counter: Counter,
    pub head_block_failure_counter: Counter,
    pub request_counter: IntCounterVec,
}

fn register_counter_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
) -> prometheus::Result<Counter> {
    let opts = prometheus::Opts::new(format!("{prefix}_{name}"), description);
    let counter = Counter::with_opts(opts)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn register_int_counter_vec_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
    labels: &[&str],
) -> prometheus::Result<IntCounterVec> {
    let opts = prometheus::Opts::new(format!("{prefix}_{name}"), description);
    let counter_vec = IntCounterVec::new(opts, labels)?;
    registry.register(Box::new(counter_vec.clone()))?;
    Ok(counter_vec)
}

impl Metrics {
    pub fn new(prefix: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let cache_hit_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_hit_total",
            "Total number of balance cache hits.",
        )?;
        let cache_miss_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_miss_total",
            "Total number of balance cache misses, expired entries included.",
        )?;
        let cache_expired_miss_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_expired_miss_total",
            "Total number of misses caused by an expired entry.",
        )?;
        let upstream_error_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "upstream_error_total",
            "Total number of failed eth_getBalance upstream calls.",
        )?;
        let head_block_failure_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "head_block_failure_total",
            "Total number of eth_blockNumber lookups answered with a null head block.",
        )?;
        let request_counter = register_int_counter_vec_with_prefix(
            &registry,
            prefix,
            "request_total",
            "Total number of balance requests per outcome.",
            &["outcome"],
        )?;

        Ok(Self {
            registry,
            cache_hit_counter,
            cache_miss_counter,
            cache_expired_miss_counter,
            upstream_error_counter,
            head_block_failure_counter,
            request_counter,
        })
    }
}

#[actix_web::get("/metrics")]
async fn metrics(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let encoder = TextEncoder::new();
    let metric_families = data.metrics.registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(buffer))
}
