use std::time::Duration;

// Define some constants for the acquisition pipeline
pub const TARGET_SAMPLE_RATE: u32 = 16000; // 16 kHz canonical output rate
pub const RTP_SAMPLE_RATE: u32 = 44100; // 44.1 kHz big-endian s16 over RTP

/// Largest datagram the packet stream reads; anything bigger is truncated
/// by the receive call.
pub const MAX_DATAGRAM_SIZE: usize = 1500;

/// Fixed input block size fed to the resampler. Input shorter than one
/// block stays in the carry buffer until more samples arrive.
pub const RESAMPLER_BLOCK_SIZE: usize = 256;

/// Default connect/read timeout applied when the caller supplies no
/// open-options.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Read timeout on the RTP socket, so a close is observed within one
/// iteration even when no packets arrive.
pub const SOCKET_POLL_INTERVAL: Duration = Duration::from_millis(250);
