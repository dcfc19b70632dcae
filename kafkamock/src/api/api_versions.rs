//! ApiVersions v0: advertise exactly what the registry serves.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{ApiVersionRange, ApiVersionsResponseV0};

use crate::api::{registry, respond, HandlerReply, RequestContext};

pub(crate) async fn api_versions_v0(_ctx: RequestContext) -> Result<HandlerReply> {
    let api_keys = registry()
        .version_ranges()
        .iter()
        .map(|(key, range)| ApiVersionRange {
            api_key: *key,
            min_version: range.min,
            max_version: range.max,
        })
        .collect();

    respond(&ApiVersionsResponseV0 {
        error_code: 0,
        api_keys,
    })
}
