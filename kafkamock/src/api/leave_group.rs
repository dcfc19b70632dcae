//! LeaveGroup v0: acknowledged, nothing to tear down.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{decode_request, LeaveGroupRequestV0, LeaveGroupResponseV0};

use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn leave_group_v0(ctx: RequestContext) -> Result<HandlerReply> {
    let _request: LeaveGroupRequestV0 = decode_request(&ctx.payload, "LeaveGroup")?;

    respond(&LeaveGroupResponseV0 { error_code: 0 })
}
