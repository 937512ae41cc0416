//! RTP/UDP packet stream audio provider.
//!
//! Receives RTP-framed big-endian s16 audio at 44.1kHz over a bound UDP
//! socket and normalizes it to mono s16le 16kHz. Unlike the container
//! path, mid-stream failures here are propagated to the caller.

use crate::{
    constants::{MAX_DATAGRAM_SIZE, RTP_SAMPLE_RATE, SOCKET_POLL_INTERVAL},
    error::StreamError,
    resample::StreamResampler,
    rtp::{swap_sample_bytes, RtpPacket},
    sources::{pcm_bytes, AudioChunk, AudioProvider, ProviderControl},
};
use byteorder::{ByteOrder, LittleEndian};
use std::io::ErrorKind;
use std::net::UdpSocket;

pub struct PacketStreamProvider {
    control: ProviderControl,
    socket: Option<UdpSocket>,
    resampler: StreamResampler,
}

impl PacketStreamProvider {
    /// Bind a UDP socket on all interfaces at `port`. Port 0 binds an
    /// ephemeral port (see `local_port`).
    pub fn new(port: u16) -> Result<Self, StreamError> {
        let socket =
            UdpSocket::bind(("0.0.0.0", port)).map_err(|source| StreamError::Bind { port, source })?;

        // Short read timeout so a close is observed even when the stream
        // goes quiet
        socket
            .set_read_timeout(Some(SOCKET_POLL_INTERVAL))
            .map_err(|source| StreamError::Bind { port, source })?;

        let resampler = StreamResampler::new(RTP_SAMPLE_RATE)
            .map_err(|e| StreamError::Transport(format!("resampler init: {e}")))?;

        debug!("packet stream bound on port {port}");

        Ok(Self {
            control: ProviderControl::new(),
            socket: Some(socket),
            resampler,
        })
    }

    /// The actually bound port, useful when constructed with port 0.
    pub fn local_port(&self) -> Option<u16> {
        self.socket
            .as_ref()
            .and_then(|s| s.local_addr().ok())
            .map(|addr| addr.port())
    }

    /// Close and drop the socket. Only the first call does anything; the
    /// socket is unusable afterwards.
    fn release(&mut self) {
        if self.socket.take().is_some() {
            debug!("packet stream socket released");
        }
    }
}

impl AudioProvider for PacketStreamProvider {
    fn next_chunk(&mut self) -> Result<Option<AudioChunk>, StreamError> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            if self.control.closed() {
                self.release();
                return Ok(None);
            }

            let Some(socket) = self.socket.as_ref() else {
                // Sequence already terminated
                return Ok(None);
            };

            let len = match socket.recv_from(&mut buf) {
                Ok((len, _)) => len,
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    // Poll timeout, re-check the closed flag
                    continue;
                }
                Err(e) => {
                    debug!("stream exception: {e}");
                    self.release();
                    return Err(StreamError::Transport(e.to_string()));
                }
            };

            if self.control.closed() {
                self.release();
                return Ok(None);
            }

            if !self.control.enabled() {
                // Dropped, not buffered
                continue;
            }

            let packet = match RtpPacket::parse(&buf[..len]) {
                Ok(packet) => packet,
                Err(e) => {
                    debug!("stream exception: {e}");
                    self.release();
                    return Err(StreamError::Transport(e.to_string()));
                }
            };

            // Payload is big-endian on the wire
            let swapped = swap_sample_bytes(packet.payload);
            let samples: Vec<i16> = swapped
                .chunks_exact(2)
                .map(LittleEndian::read_i16)
                .collect();

            match self.resampler.process(&samples) {
                // A short packet may leave the resampler still
                // accumulating; never yield an empty chunk since empty
                // means end-of-stream to the consumer
                Ok(output) if output.is_empty() => continue,
                Ok(output) => return Ok(Some(pcm_bytes(&output))),
                Err(e) => {
                    debug!("stream exception: {e}");
                    self.release();
                    return Err(StreamError::Transport(e.to_string()));
                }
            }
        }
    }

    fn control(&self) -> ProviderControl {
        self.control.clone()
    }
}
