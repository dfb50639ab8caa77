use std::net::{IpAddr, SocketAddr};

use actix_web::{HttpRequest, HttpResponse, ResponseError, get, web};
use common::logger::{TraceId, request_span};
use serde::Serialize;
use tracing::{Instrument, error, warn};

use crate::error::AppError;
use crate::likes::aggregator::StockData;
use crate::logger::annotate_request;
use crate::pipeline::{StockQuery, StockService};

/// How the caller address used for like fingerprinting is resolved.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientAddrPolicy {
    pub trust_proxy: bool,
}

#[derive(Serialize)]
struct StockResponse {
    #[serde(rename = "stockData")]
    stock_data: StockData,
}

#[get("/api/stock-prices")]
pub async fn handler(
    req: HttpRequest,
    service: web::Data<StockService>,
    policy: web::Data<ClientAddrPolicy>,
) -> Result<HttpResponse, AppError> {
    let trace_id = TraceId::default();

    async move {
        let result = match StockQuery::from_query_string(req.query_string()) {
            Ok(query) => {
                annotate_request(&query.tickers, query.like);
                service
                    .handle(&query, client_ip(&req, policy.trust_proxy))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(stock_data) => Ok(HttpResponse::Ok().json(StockResponse { stock_data })),
            Err(e) if e.is_user_facing() => {
                warn!(error = %e, "stock query rejected");
                Ok(e.error_response())
            }
            Err(e) => {
                error!(error = ?e, "stock query failed");
                Err(e)
            }
        }
    }
    .instrument(request_span("stock_prices", &trace_id))
    .await
}

fn client_ip(req: &HttpRequest, trust_proxy: bool) -> Option<IpAddr> {
    if trust_proxy {
        let forwarded = req
            .connection_info()
            .realip_remote_addr()
            .and_then(parse_ip);
        if forwarded.is_some() {
            return forwarded;
        }
    }

    req.peer_addr().map(|addr| addr.ip())
}

/// Accepts `ip`, `ip:port`, `[v6]` and `[v6]:port`.
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|s| s.ip()))
        .or_else(|| {
            raw.strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .and_then(|r| r.parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::net::Ipv4Addr;

    #[test]
    fn parses_address_forms() {
        assert_eq!(parse_ip("203.0.113.9"), Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))));
        assert_eq!(parse_ip("203.0.113.9:5500"), Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))));
        assert_eq!(parse_ip("[::1]:80"), Some("::1".parse().unwrap()));
        assert_eq!(parse_ip("[::1]"), Some("::1".parse().unwrap()));
        assert_eq!(parse_ip("unknown"), None);
    }

    #[test]
    fn forwarded_header_is_ignored_unless_trusted() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.5:41000".parse().unwrap())
            .insert_header(("x-forwarded-for", "198.51.100.20"))
            .to_http_request();

        assert_eq!(client_ip(&req, false), Some("10.0.0.5".parse().unwrap()));
        assert_eq!(client_ip(&req, true), Some("198.51.100.20".parse().unwrap()));
    }
}
