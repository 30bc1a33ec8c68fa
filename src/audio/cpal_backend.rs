use crate::audio::{AudioBackend, AudioError, SharedEngine};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, SupportedStreamConfig};
use log::{debug, error, info};

pub struct CpalBackend {
    device: cpal::Device,
    config: SupportedStreamConfig,
    stream: Option<Stream>,
}

impl CpalBackend {
    /// Opens the default output device, or the first one whose name contains `device_filter`.
    pub fn open(device_filter: Option<&str>) -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let device = match device_filter {
            Some(filter) => {
                let mut found = None;
                for device in host.output_devices()? {
                    let name = device.name().unwrap_or_default();
                    debug!("Device: {}", name);
                    if found.is_none() && device_matches(&name, filter) {
                        found = Some(device);
                    }
                }
                found.ok_or_else(|| AudioError::DeviceNotFound(filter.to_string()))?
            }
            None => host.default_output_device().ok_or(AudioError::NoDevice)?,
        };
        info!("Selected device: {}", device.name().unwrap_or_default());

        let config = device.default_output_config()?;
        if config.sample_format() != SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?}",
                config.sample_format()
            )));
        }
        info!(
            "Output config: {} Hz, {} channels",
            config.sample_rate().0,
            config.channels()
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }
}

impl AudioBackend for CpalBackend {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    fn channels(&self) -> usize {
        self.config.channels() as usize
    }

    fn start(&mut self, engine: SharedEngine) -> Result<(), AudioError> {
        let channels = self.channels();
        let stream = self.device.build_output_stream(
            &self.config.config(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match engine.lock() {
                Ok(mut engine) => engine.process(data, channels),
                Err(_) => data.fill(0.0),
            },
            |err| error!("an error occurred on stream: {}", err),
            None,
        )?;
        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.stream.take() {
            stream.pause()?;
        }
        Ok(())
    }
}

fn device_matches(name: &str, filter: &str) -> bool {
    name.to_lowercase().contains(&filter.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_filter_ignores_case() {
        assert!(device_matches("PipeWire Sound Server", "pipewire"));
        assert!(device_matches("default:CARD=PCH", "DEFAULT"));
        assert!(!device_matches("hw:CARD=HDMI", "pipewire"));
    }
}
