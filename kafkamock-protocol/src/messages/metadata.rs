//! Metadata v1 messages

use bytes::{BufMut, BytesMut};

use crate::codec::{
    peek_array, peek_bool, peek_i16, peek_i32, peek_nullable_string, peek_string, put_array,
    put_bool, put_nullable_string, put_string, Decode, Encode,
};

/// Metadata request, version 1. A null topics array asks for every topic.
#[derive(Debug, Clone)]
pub struct MetadataRequestV1 {
    pub topics: Vec<String>,
}

impl Encode for MetadataRequestV1 {
    fn encode(&self, out: &mut BytesMut) {
        put_array(out, Some(&self.topics));
    }
}

impl Decode for MetadataRequestV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topics) = peek_array(buf, at)?;
        Some((
            next,
            Self {
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

/// Metadata response, version 1.
#[derive(Debug, Clone)]
pub struct MetadataResponseV1 {
    pub brokers: Vec<BrokerV1>,
    pub controller_id: i32,
    pub topics: Vec<TopicMetadataV1>,
}

#[derive(Debug, Clone)]
pub struct BrokerV1 {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
    pub rack: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TopicMetadataV1 {
    pub error_code: i16,
    pub name: String,
    pub is_internal: bool,
    pub partitions: Vec<PartitionMetadataV1>,
}

#[derive(Debug, Clone)]
pub struct PartitionMetadataV1 {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
}

impl Encode for MetadataResponseV1 {
    fn encode(&self, out: &mut BytesMut) {
        put_array(out, Some(&self.brokers));
        out.put_i32(self.controller_id);
        put_array(out, Some(&self.topics));
    }
}

impl Decode for MetadataResponseV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, brokers) = peek_array(buf, at)?;
        let (next, controller_id) = peek_i32(buf, next)?;
        let (next, topics) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                brokers: brokers.unwrap_or_default(),
                controller_id,
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for BrokerV1 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.node_id);
        put_string(out, &self.host);
        out.put_i32(self.port);
        put_nullable_string(out, self.rack.as_deref());
    }
}

impl Decode for BrokerV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, node_id) = peek_i32(buf, at)?;
        let (next, host) = peek_string(buf, next)?;
        let (next, port) = peek_i32(buf, next)?;
        let (next, rack) = peek_nullable_string(buf, next)?;
        Some((
            next,
            Self {
                node_id,
                host,
                port,
                rack,
            },
        ))
    }
}

impl Encode for TopicMetadataV1 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
        put_string(out, &self.name);
        put_bool(out, self.is_internal);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for TopicMetadataV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        let (next, name) = peek_string(buf, next)?;
        let (next, is_internal) = peek_bool(buf, next)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                error_code,
                name,
                is_internal,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for PartitionMetadataV1 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
        out.put_i32(self.partition_index);
        out.put_i32(self.leader_id);
        put_array(out, Some(&self.replica_nodes));
        put_array(out, Some(&self.isr_nodes));
    }
}

impl Decode for PartitionMetadataV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        let (next, partition_index) = peek_i32(buf, next)?;
        let (next, leader_id) = peek_i32(buf, next)?;
        let (next, replica_nodes) = peek_array(buf, next)?;
        let (next, isr_nodes) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                error_code,
                partition_index,
                leader_id,
                replica_nodes: replica_nodes.unwrap_or_default(),
                isr_nodes: isr_nodes.unwrap_or_default(),
            },
        ))
    }
}
