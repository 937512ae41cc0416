//! Minimal RTP (RFC 3550) header parsing and payload byte order fixup.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

pub const RTP_HEADER_LEN: usize = 12;
const RTP_VERSION: u8 = 2;

#[derive(Debug, Error)]
pub enum RtpError {
    #[error("datagram too short for an RTP header: {0} bytes")]
    TooShort(usize),

    #[error("unsupported RTP version {0}")]
    Version(u8),

    #[error("truncated RTP packet")]
    Truncated,
}

/// A parsed RTP packet borrowing its payload from the datagram.
#[derive(Debug)]
pub struct RtpPacket<'a> {
    pub payload_type: u8,
    pub marker: bool,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub payload: &'a [u8],
}

impl<'a> RtpPacket<'a> {
    pub fn parse(datagram: &'a [u8]) -> Result<Self, RtpError> {
        if datagram.len() < RTP_HEADER_LEN {
            return Err(RtpError::TooShort(datagram.len()));
        }

        let version = datagram[0] >> 6;
        if version != RTP_VERSION {
            return Err(RtpError::Version(version));
        }

        let has_padding = datagram[0] & 0x20 != 0;
        let has_extension = datagram[0] & 0x10 != 0;
        let csrc_count = (datagram[0] & 0x0f) as usize;

        let marker = datagram[1] & 0x80 != 0;
        let payload_type = datagram[1] & 0x7f;
        let sequence_number = BigEndian::read_u16(&datagram[2..4]);
        let timestamp = BigEndian::read_u32(&datagram[4..8]);
        let ssrc = BigEndian::read_u32(&datagram[8..12]);

        let mut offset = RTP_HEADER_LEN + csrc_count * 4;
        if datagram.len() < offset {
            return Err(RtpError::Truncated);
        }

        if has_extension {
            if datagram.len() < offset + 4 {
                return Err(RtpError::Truncated);
            }
            let ext_words = BigEndian::read_u16(&datagram[offset + 2..offset + 4]) as usize;
            offset += 4 + ext_words * 4;
            if datagram.len() < offset {
                return Err(RtpError::Truncated);
            }
        }

        let mut end = datagram.len();
        if has_padding {
            // Last octet holds the padding length, itself included
            let pad = datagram[end - 1] as usize;
            if pad == 0 || offset + pad > end {
                return Err(RtpError::Truncated);
            }
            end -= pad;
        }

        Ok(RtpPacket {
            payload_type,
            marker,
            sequence_number,
            timestamp,
            ssrc,
            payload: &datagram[offset..end],
        })
    }
}

/// Swap each 16-bit sample's byte pair (big endian on the wire, little
/// endian for consumption). Self-inverse for even-length input; an odd
/// trailing byte is dropped.
pub fn swap_sample_bytes(payload: &[u8]) -> Vec<u8> {
    let even = payload.len() & !1;
    let mut swapped = Vec::with_capacity(even);

    for pair in payload[..even].chunks_exact(2) {
        swapped.push(pair[1]);
        swapped.push(pair[0]);
    }

    swapped
}
