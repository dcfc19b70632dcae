//! JoinGroup v1: canned membership. The mock is the group leader, the
//! caller is the only other member.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{decode_request, JoinGroupMember, JoinGroupRequestV1, JoinGroupResponseV1};

use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn join_group_v1(ctx: RequestContext) -> Result<HandlerReply> {
    let _request: JoinGroupRequestV1 = decode_request(&ctx.payload, "JoinGroup")?;

    respond(&JoinGroupResponseV1 {
        error_code: 0,
        generation_id: 0,
        protocol_name: "roundrobin".to_string(),
        leader: "me".to_string(),
        member_id: "1".to_string(),
        members: vec![JoinGroupMember {
            member_id: "you".to_string(),
            metadata: None,
        }],
    })
}
