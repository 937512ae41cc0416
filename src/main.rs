use anyhow::Result;
use audio_intake::{config, constants::TARGET_SAMPLE_RATE, stream::StreamController};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::load().await?;

    let stream = StreamController::new();

    if let Some(container) = &config.container {
        stream.open_container(&container.locator, None)?;
    } else if let Some(packet) = &config.packet {
        stream.open_packet_stream(packet.port)?;
    } else {
        anyhow::bail!("Config.toml must declare a [container] or [packet] source");
    }

    stream.start();

    // The pump performs blocking I/O and decode work, keep it off the
    // async scheduler
    let pump = {
        let stream = stream.clone();
        tokio::task::spawn_blocking(move || stream.run(true))
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let path = config
        .output_wav
        .clone()
        .unwrap_or_else(|| "capture.wav".to_string());
    let mut writer = WavWriter::create(&path, spec)?;

    loop {
        tokio::select! {
            chunk = stream.recv() => {
                if chunk.is_empty() {
                    info!("end of stream");
                    break;
                }

                for sample in chunk.chunks_exact(2) {
                    writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, closing stream");
                stream.close();
            }
        }
    }

    stream.close();
    pump.await??;
    writer.finalize()?;

    info!("captured audio written to {path}");

    Ok(())
}
