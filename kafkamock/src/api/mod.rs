//! API registry and handler plumbing
//!
//! The registry maps `(api key, version)` to a handler and is built once
//! for the process. The derived key -> version-range map is exactly what
//! ApiVersions responses advertise.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;

use kafkamock_common::Result;
use kafkamock_protocol::codec::Encode;
use kafkamock_protocol::tags::TagValueMap;
use kafkamock_protocol::RequestHeader;

use crate::connection::ClientConnection;

mod api_keys;
mod api_versions;
mod fetch;
mod find_coordinator;
mod heartbeat;
mod join_group;
mod leave_group;
mod list_offsets;
mod metadata;
mod offset_commit;
mod offset_fetch;
mod sync_group;

pub(crate) use api_keys::{api_key, api_name};

/// Everything a handler gets: the request payload past the header, the
/// connection it arrived on, and the parsed header.
pub(crate) struct RequestContext {
    pub payload: Bytes,
    pub conn: Arc<ClientConnection>,
    pub header: RequestHeader,
}

/// A handler's output: the encoded response body, plus response tags when
/// the schema carries them.
pub(crate) struct HandlerReply {
    pub body: BytesMut,
    pub tags: Option<TagValueMap>,
}

pub(crate) type ApiHandler = fn(RequestContext) -> BoxFuture<'static, Result<HandlerReply>>;

/// Encode `response` as an untagged handler reply.
pub(crate) fn respond<T: Encode>(response: &T) -> Result<HandlerReply> {
    let mut body = BytesMut::new();
    response.encode(&mut body);
    Ok(HandlerReply { body, tags: None })
}

/// Inclusive version range served for one api key.
pub(crate) struct VersionRange {
    pub min: i16,
    pub max: i16,
}

struct ApiEntry {
    handler: ApiHandler,
    /// Whether the request header carries a tagged fields section at this
    /// (key, version).
    has_header_tags: bool,
}

pub(crate) struct ApiRegistry {
    table: HashMap<(i16, i16), ApiEntry>,
    ranges: BTreeMap<i16, VersionRange>,
}

impl ApiRegistry {
    fn build() -> Self {
        let mut table: HashMap<(i16, i16), ApiEntry> = HashMap::new();
        {
            let mut register = |key: i16, version: i16, handler: ApiHandler| {
                table.insert(
                    (key, version),
                    ApiEntry {
                        handler,
                        has_header_tags: false,
                    },
                );
            };

            register(api_key::METADATA, 1, |ctx| {
                Box::pin(metadata::metadata_v1(ctx))
            });
            register(api_key::FIND_COORDINATOR, 0, |ctx| {
                Box::pin(find_coordinator::find_coordinator_v0(ctx))
            });
            register(api_key::OFFSET_FETCH, 1, |ctx| {
                Box::pin(offset_fetch::offset_fetch_v1(ctx))
            });
            register(api_key::JOIN_GROUP, 1, |ctx| {
                Box::pin(join_group::join_group_v1(ctx))
            });
            register(api_key::SYNC_GROUP, 0, |ctx| {
                Box::pin(sync_group::sync_group_v0(ctx))
            });
            register(api_key::LEAVE_GROUP, 0, |ctx| {
                Box::pin(leave_group::leave_group_v0(ctx))
            });
            register(api_key::API_VERSIONS, 0, |ctx| {
                Box::pin(api_versions::api_versions_v0(ctx))
            });
            register(api_key::HEARTBEAT, 0, |ctx| {
                Box::pin(heartbeat::heartbeat_v0(ctx))
            });
            register(api_key::LIST_OFFSETS, 1, |ctx| {
                Box::pin(list_offsets::list_offsets_v1(ctx))
            });
            register(api_key::OFFSET_COMMIT, 2, |ctx| {
                Box::pin(offset_commit::offset_commit_v2(ctx))
            });
            register(api_key::FETCH, 2, |ctx| Box::pin(fetch::fetch_v2(ctx)));
        }

        let mut ranges: BTreeMap<i16, VersionRange> = BTreeMap::new();
        for (key, version) in table.keys() {
            ranges
                .entry(*key)
                .and_modify(|range| {
                    range.min = range.min.min(*version);
                    range.max = range.max.max(*version);
                })
                .or_insert(VersionRange {
                    min: *version,
                    max: *version,
                });
        }

        Self { table, ranges }
    }

    pub(crate) fn lookup(&self, key: i16, version: i16) -> Option<ApiHandler> {
        self.table.get(&(key, version)).map(|entry| entry.handler)
    }

    pub(crate) fn has_header_tags(&self, key: i16, version: i16) -> bool {
        self.table
            .get(&(key, version))
            .is_some_and(|entry| entry.has_header_tags)
    }

    /// Advertised version ranges, in ascending api-key order.
    pub(crate) fn version_ranges(&self) -> &BTreeMap<i16, VersionRange> {
        &self.ranges
    }
}

static REGISTRY: Lazy<ApiRegistry> = Lazy::new(ApiRegistry::build);

pub(crate) fn registry() -> &'static ApiRegistry {
    &REGISTRY
}

/// Force registry construction; called once from [`crate::KafkaMock::new`].
pub(crate) fn init() {
    Lazy::force(&REGISTRY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_serves_the_initial_api_set() {
        let registry = registry();

        for (key, version) in [
            (api_key::API_VERSIONS, 0),
            (api_key::METADATA, 1),
            (api_key::FIND_COORDINATOR, 0),
            (api_key::LIST_OFFSETS, 1),
            (api_key::JOIN_GROUP, 1),
            (api_key::SYNC_GROUP, 0),
            (api_key::LEAVE_GROUP, 0),
            (api_key::HEARTBEAT, 0),
            (api_key::OFFSET_FETCH, 1),
            (api_key::OFFSET_COMMIT, 2),
            (api_key::FETCH, 2),
        ] {
            assert!(registry.lookup(key, version).is_some(), "missing {key} v{version}");
        }

        assert!(registry.lookup(api_key::FETCH, 11).is_none());
        assert!(registry.lookup(0, 0).is_none(), "produce is not served");
    }

    #[test]
    fn version_ranges_cover_the_registered_versions() {
        let ranges = registry().version_ranges();
        let fetch = &ranges[&api_key::FETCH];
        assert_eq!((fetch.min, fetch.max), (2, 2));

        let keys: Vec<i16> = ranges.keys().copied().collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
