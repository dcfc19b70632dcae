//! FindCoordinator v0: the mock is always the coordinator.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{decode_request, FindCoordinatorRequestV0, FindCoordinatorResponseV0};

use crate::api::metadata::LEADER_NODE;
use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn find_coordinator_v0(ctx: RequestContext) -> Result<HandlerReply> {
    let _request: FindCoordinatorRequestV0 = decode_request(&ctx.payload, "FindCoordinator")?;

    respond(&FindCoordinatorResponseV0 {
        error_code: 0,
        node_id: LEADER_NODE,
        host: "localhost".to_string(),
        port: i32::from(ctx.conn.server_port()),
    })
}
