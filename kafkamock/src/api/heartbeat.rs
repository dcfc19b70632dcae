//! Heartbeat v0: always healthy.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{decode_request, HeartbeatRequestV0, HeartbeatResponseV0};

use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn heartbeat_v0(ctx: RequestContext) -> Result<HandlerReply> {
    let _request: HeartbeatRequestV0 = decode_request(&ctx.payload, "Heartbeat")?;

    respond(&HeartbeatResponseV0 { error_code: 0 })
}
