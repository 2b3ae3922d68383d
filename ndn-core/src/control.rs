//! `ControlParameters` and `ControlResponse`: the request/response bodies
//! carried as a Data's `Content` in NDN management protocols (prefix
//! registration, FIB/strategy management, and similar control commands).

use bytes::{Bytes, BytesMut};

use crate::block::Block;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::tlv;

mod control_types {
    pub const CONTROL_PARAMETERS: u32 = 104;
    pub const FACE_ID: u32 = 105;
    pub const URI: u32 = 114;
    pub const ORIGIN: u32 = 111;
    pub const COST: u32 = 106;
    pub const FLAGS: u32 = 108;
    pub const STRATEGY: u32 = 107;
    pub const EXPIRATION_PERIOD: u32 = 109;
    pub const CONTROL_RESPONSE: u32 = 101;
    pub const STATUS_CODE: u32 = 102;
    pub const STATUS_TEXT: u32 = 103;
}

/// Parameters of a control command, e.g. `rib/register`. Every field is
/// optional: which ones a given command requires is up to that command's
/// handler, not this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlParameters {
    pub name: Option<Name>,
    pub face_id: Option<u64>,
    pub uri: Option<String>,
    pub origin: Option<u64>,
    pub cost: Option<u64>,
    pub flags: Option<u64>,
    pub strategy: Option<Name>,
    pub expiration_period: Option<u64>,
}

impl ControlParameters {
    pub fn to_block(&self) -> Block {
        let mut block = Block::new(control_types::CONTROL_PARAMETERS);
        if let Some(name) = &self.name {
            block.push_back(name.to_block());
        }
        if let Some(v) = self.face_id {
            block.push_back(nonneg(control_types::FACE_ID, v));
        }
        if let Some(uri) = &self.uri {
            block.push_back(Block::from_value(control_types::URI, Bytes::copy_from_slice(uri.as_bytes())));
        }
        if let Some(v) = self.origin {
            block.push_back(nonneg(control_types::ORIGIN, v));
        }
        if let Some(v) = self.cost {
            block.push_back(nonneg(control_types::COST, v));
        }
        if let Some(v) = self.flags {
            block.push_back(nonneg(control_types::FLAGS, v));
        }
        if let Some(strategy) = &self.strategy {
            let mut wrapper = Block::new(control_types::STRATEGY);
            wrapper.push_back(strategy.to_block());
            block.push_back(wrapper);
        }
        if let Some(v) = self.expiration_period {
            block.push_back(nonneg(control_types::EXPIRATION_PERIOD, v));
        }
        block
    }

    pub fn from_block(block: &Block) -> Result<Self> {
        if block.tlv_type() != control_types::CONTROL_PARAMETERS {
            return Err(Error::UnexpectedType {
                expected: control_types::CONTROL_PARAMETERS,
                actual: block.tlv_type(),
            });
        }
        let mut block = block.clone();
        block.parse()?;
        let mut params = ControlParameters::default();
        for element in block.elements() {
            match element.tlv_type() {
                tlv::types::NAME => params.name = Some(Name::from_block(element)?),
                control_types::FACE_ID => params.face_id = Some(read_nonneg(element)?),
                control_types::URI => {
                    params.uri = Some(
                        String::from_utf8(element.value().to_vec())
                            .map_err(|_| Error::BadStructure("Uri is not valid UTF-8".into()))?,
                    )
                }
                control_types::ORIGIN => params.origin = Some(read_nonneg(element)?),
                control_types::COST => params.cost = Some(read_nonneg(element)?),
                control_types::FLAGS => params.flags = Some(read_nonneg(element)?),
                control_types::STRATEGY => {
                    let mut wrapper = element.clone();
                    wrapper.parse()?;
                    let inner = wrapper.elements().first().ok_or(Error::MissingElement("Strategy.Name"))?;
                    params.strategy = Some(Name::from_block(inner)?);
                }
                control_types::EXPIRATION_PERIOD => params.expiration_period = Some(read_nonneg(element)?),
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn encode(&self) -> Bytes {
        self.to_block().to_bytes()
    }

    pub fn decode(wire: &Bytes) -> Result<Self> {
        let block = Block::decode_from(wire)?;
        Self::from_block(&block)
    }
}

/// The response body of a control command: a numeric status code (in the
/// style of HTTP status codes), human-readable text, and the
/// `ControlParameters` that were actually applied (which may differ from
/// those requested, e.g. a server-assigned `FaceId`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub status_code: u16,
    pub status_text: String,
    pub body: Option<ControlParameters>,
}

impl ControlResponse {
    pub fn new(status_code: u16, status_text: impl Into<String>) -> Self {
        Self { status_code, status_text: status_text.into(), body: None }
    }

    pub fn with_body(mut self, body: ControlParameters) -> Self {
        self.body = Some(body);
        self
    }

    pub fn to_block(&self) -> Block {
        let mut block = Block::new(control_types::CONTROL_RESPONSE);
        block.push_back(nonneg(control_types::STATUS_CODE, self.status_code as u64));
        block.push_back(Block::from_value(
            control_types::STATUS_TEXT,
            Bytes::copy_from_slice(self.status_text.as_bytes()),
        ));
        if let Some(body) = &self.body {
            block.push_back(body.to_block());
        }
        block
    }

    pub fn from_block(block: &Block) -> Result<Self> {
        if block.tlv_type() != control_types::CONTROL_RESPONSE {
            return Err(Error::UnexpectedType { expected: control_types::CONTROL_RESPONSE, actual: block.tlv_type() });
        }
        let mut block = block.clone();
        block.parse()?;
        let status_code = read_nonneg(block.get(control_types::STATUS_CODE, "ControlResponse.StatusCode")?)? as u16;
        let status_text_block = block.get(control_types::STATUS_TEXT, "ControlResponse.StatusText")?;
        let status_text = String::from_utf8(status_text_block.value().to_vec())
            .map_err(|_| Error::BadStructure("StatusText is not valid UTF-8".into()))?;
        let body = match block.find(control_types::CONTROL_PARAMETERS) {
            Some(b) => Some(ControlParameters::from_block(b)?),
            None => None,
        };
        Ok(ControlResponse { status_code, status_text, body })
    }

    pub fn encode(&self) -> Bytes {
        self.to_block().to_bytes()
    }

    pub fn decode(wire: &Bytes) -> Result<Self> {
        let block = Block::decode_from(wire)?;
        Self::from_block(&block)
    }
}

fn nonneg(tlv_type: u32, value: u64) -> Block {
    let mut buf = BytesMut::new();
    tlv::encode_non_negative_integer(&mut buf, value);
    Block::from_value(tlv_type, buf.freeze())
}

fn read_nonneg(block: &Block) -> Result<u64> {
    let value = block.value();
    let mut cursor: &[u8] = &value;
    tlv::decode_non_negative_integer(&mut cursor, value.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_parameters_round_trip() {
        let params = ControlParameters {
            name: Some(Name::from_uri("/a/b").unwrap()),
            face_id: Some(12),
            cost: Some(1),
            ..Default::default()
        };
        let wire = params.encode();
        let decoded = ControlParameters::decode(&wire).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn control_response_round_trip_with_body() {
        let response = ControlResponse::new(200, "OK").with_body(ControlParameters {
            face_id: Some(7),
            ..Default::default()
        });
        let wire = response.encode();
        let decoded = ControlResponse::from_block(&Block::decode_from(&wire).unwrap()).unwrap();
        assert_eq!(decoded, response);
    }
}
