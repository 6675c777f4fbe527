//! Health and release endpoints in the layout that
//! [Dockerflow](https://github.com/mozilla-services/Dockerflow) load balancers
//! and deploy tools probe.

use actix_web::{
    get,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use serde::Serialize;

use crate::search::GeocoderRef;

/// Release description, replaced by the build pipeline.
const VERSION_FILE: &str = include_str!("../version.json");

/// Add the health and release endpoints.
pub fn configure(config: &mut ServiceConfig) {
    config
        .service(lbheartbeat)
        .service(heartbeat)
        .service(version);
}

/// Body of `__heartbeat__`.
#[derive(Debug, Serialize)]
struct Heartbeat {
    /// Version of the running server.
    version: &'static str,
    /// The geocoder tree searches are sent to, such as
    /// `timeout(NominatimGeocoder)`.
    geocoder: String,
}

/// The process is up and accepting connections.
#[get("/__lbheartbeat__")]
async fn lbheartbeat() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Report which geocoder this instance was configured with.
#[get("/__heartbeat__")]
async fn heartbeat(geocoder: Data<GeocoderRef>) -> HttpResponse {
    HttpResponse::Ok().json(Heartbeat {
        version: env!("CARGO_PKG_VERSION"),
        geocoder: geocoder.name(),
    })
}

/// Serve the release description verbatim.
#[get("/__version__")]
async fn version() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(VERSION_FILE)
}
