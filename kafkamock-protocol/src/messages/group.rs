//! Consumer group messages: JoinGroup v1, SyncGroup v0, Heartbeat v0,
//! LeaveGroup v0, and the member-assignment blob SyncGroup responses carry.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{
    peek_array, peek_i16, peek_i32, peek_nullable_bytes, peek_string, put_array,
    put_nullable_bytes, put_string, Decode, Encode,
};

// ============================================================================
// JoinGroup v1
// ============================================================================

#[derive(Debug, Clone)]
pub struct JoinGroupRequestV1 {
    pub group_id: String,
    pub session_timeout_ms: i32,
    pub rebalance_timeout_ms: i32,
    pub member_id: String,
    pub protocol_type: String,
    pub protocols: Vec<JoinGroupProtocol>,
}

#[derive(Debug, Clone)]
pub struct JoinGroupProtocol {
    pub name: String,
    pub metadata: Option<Bytes>,
}

#[derive(Debug, Clone)]
pub struct JoinGroupResponseV1 {
    pub error_code: i16,
    pub generation_id: i32,
    pub protocol_name: String,
    pub leader: String,
    pub member_id: String,
    pub members: Vec<JoinGroupMember>,
}

#[derive(Debug, Clone)]
pub struct JoinGroupMember {
    pub member_id: String,
    pub metadata: Option<Bytes>,
}

impl Encode for JoinGroupRequestV1 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.group_id);
        out.put_i32(self.session_timeout_ms);
        out.put_i32(self.rebalance_timeout_ms);
        put_string(out, &self.member_id);
        put_string(out, &self.protocol_type);
        put_array(out, Some(&self.protocols));
    }
}

impl Decode for JoinGroupRequestV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, group_id) = peek_string(buf, at)?;
        let (next, session_timeout_ms) = peek_i32(buf, next)?;
        let (next, rebalance_timeout_ms) = peek_i32(buf, next)?;
        let (next, member_id) = peek_string(buf, next)?;
        let (next, protocol_type) = peek_string(buf, next)?;
        let (next, protocols) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                group_id,
                session_timeout_ms,
                rebalance_timeout_ms,
                member_id,
                protocol_type,
                protocols: protocols.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for JoinGroupProtocol {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_nullable_bytes(out, self.metadata.as_deref());
    }
}

impl Decode for JoinGroupProtocol {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, metadata) = peek_nullable_bytes(buf, next)?;
        Some((next, Self { name, metadata }))
    }
}

impl Encode for JoinGroupResponseV1 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
        out.put_i32(self.generation_id);
        put_string(out, &self.protocol_name);
        put_string(out, &self.leader);
        put_string(out, &self.member_id);
        put_array(out, Some(&self.members));
    }
}

impl Decode for JoinGroupResponseV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        let (next, generation_id) = peek_i32(buf, next)?;
        let (next, protocol_name) = peek_string(buf, next)?;
        let (next, leader) = peek_string(buf, next)?;
        let (next, member_id) = peek_string(buf, next)?;
        let (next, members) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                error_code,
                generation_id,
                protocol_name,
                leader,
                member_id,
                members: members.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for JoinGroupMember {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.member_id);
        put_nullable_bytes(out, self.metadata.as_deref());
    }
}

impl Decode for JoinGroupMember {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, member_id) = peek_string(buf, at)?;
        let (next, metadata) = peek_nullable_bytes(buf, next)?;
        Some((next, Self { member_id, metadata }))
    }
}

// ============================================================================
// SyncGroup v0
// ============================================================================

#[derive(Debug, Clone)]
pub struct SyncGroupRequestV0 {
    pub group_id: String,
    pub generation_id: i32,
    pub member_id: String,
    pub assignments: Vec<SyncGroupAssignment>,
}

#[derive(Debug, Clone)]
pub struct SyncGroupAssignment {
    pub member_id: String,
    pub assignment: Option<Bytes>,
}

#[derive(Debug, Clone)]
pub struct SyncGroupResponseV0 {
    pub error_code: i16,
    pub assignment: Option<Bytes>,
}

impl Encode for SyncGroupRequestV0 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.group_id);
        out.put_i32(self.generation_id);
        put_string(out, &self.member_id);
        put_array(out, Some(&self.assignments));
    }
}

impl Decode for SyncGroupRequestV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, group_id) = peek_string(buf, at)?;
        let (next, generation_id) = peek_i32(buf, next)?;
        let (next, member_id) = peek_string(buf, next)?;
        let (next, assignments) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                group_id,
                generation_id,
                member_id,
                assignments: assignments.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for SyncGroupAssignment {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.member_id);
        put_nullable_bytes(out, self.assignment.as_deref());
    }
}

impl Decode for SyncGroupAssignment {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, member_id) = peek_string(buf, at)?;
        let (next, assignment) = peek_nullable_bytes(buf, next)?;
        Some((next, Self { member_id, assignment }))
    }
}

impl Encode for SyncGroupResponseV0 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
        put_nullable_bytes(out, self.assignment.as_deref());
    }
}

impl Decode for SyncGroupResponseV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        let (next, assignment) = peek_nullable_bytes(buf, next)?;
        Some((next, Self { error_code, assignment }))
    }
}

// ============================================================================
// Member assignment blob
// ============================================================================

/// The opaque blob a SyncGroup response hands each member: a version, the
/// topic/partition assignments, and optional user data.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAssignment {
    pub version: i16,
    pub assignments: Vec<TopicAssignment>,
    pub user_data: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicAssignment {
    pub topic: String,
    pub partitions: Vec<i32>,
}

impl Encode for MemberAssignment {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.version);
        put_array(out, Some(&self.assignments));
        put_nullable_bytes(out, self.user_data.as_deref());
    }
}

impl Decode for MemberAssignment {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, version) = peek_i16(buf, at)?;
        let (next, assignments) = peek_array(buf, next)?;
        let (next, user_data) = peek_nullable_bytes(buf, next)?;
        Some((
            next,
            Self {
                version,
                assignments: assignments.unwrap_or_default(),
                user_data,
            },
        ))
    }
}

impl Encode for TopicAssignment {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.topic);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for TopicAssignment {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topic) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                topic,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

// ============================================================================
// Heartbeat v0 / LeaveGroup v0
// ============================================================================

#[derive(Debug, Clone)]
pub struct HeartbeatRequestV0 {
    pub group_id: String,
    pub generation_id: i32,
    pub member_id: String,
}

#[derive(Debug, Clone)]
pub struct HeartbeatResponseV0 {
    pub error_code: i16,
}

impl Encode for HeartbeatRequestV0 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.group_id);
        out.put_i32(self.generation_id);
        put_string(out, &self.member_id);
    }
}

impl Decode for HeartbeatRequestV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, group_id) = peek_string(buf, at)?;
        let (next, generation_id) = peek_i32(buf, next)?;
        let (next, member_id) = peek_string(buf, next)?;
        Some((
            next,
            Self {
                group_id,
                generation_id,
                member_id,
            },
        ))
    }
}

impl Encode for HeartbeatResponseV0 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
    }
}

impl Decode for HeartbeatResponseV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        Some((next, Self { error_code }))
    }
}

#[derive(Debug, Clone)]
pub struct LeaveGroupRequestV0 {
    pub group_id: String,
    pub member_id: String,
}

#[derive(Debug, Clone)]
pub struct LeaveGroupResponseV0 {
    pub error_code: i16,
}

impl Encode for LeaveGroupRequestV0 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.group_id);
        put_string(out, &self.member_id);
    }
}

impl Decode for LeaveGroupRequestV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, group_id) = peek_string(buf, at)?;
        let (next, member_id) = peek_string(buf, next)?;
        Some((next, Self { group_id, member_id }))
    }
}

impl Encode for LeaveGroupResponseV0 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
    }
}

impl Decode for LeaveGroupResponseV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        Some((next, Self { error_code }))
    }
}
