use hound::{SampleFormat, WavSpec, WavWriter};
use log::{debug, error};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("couldn't write recording {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("recording writer for {path} has stopped")]
    WriterGone { path: PathBuf },
}

/// Writes the rendered stereo stream to a 32-bit float WAV file.
///
/// File I/O happens on a dedicated writer thread; the audio callback only
/// hands over interleaved blocks.
pub struct WavRecorder {
    block_sender: Option<Sender<Vec<f32>>>,
    writer_thread: Option<JoinHandle<Result<(), hound::Error>>>,
    path: PathBuf,
    frames: u64,
}

impl WavRecorder {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self, RecorderError> {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(path, spec).map_err(|source| RecorderError::Wav {
            path: path.to_path_buf(),
            source,
        })?;

        let (block_sender, block_receiver) = mpsc::channel::<Vec<f32>>();
        let writer_thread = thread::spawn(move || {
            for block in block_receiver {
                for sample in block {
                    writer.write_sample(sample)?;
                }
            }
            debug!("Recording writer finished");
            writer.finalize()
        });

        Ok(Self {
            block_sender: Some(block_sender),
            writer_thread: Some(writer_thread),
            path: path.to_path_buf(),
            frames: 0,
        })
    }

    /// Queues one block for the writer thread. Never touches the file itself.
    pub fn write_block(&mut self, left: &[f32], right: &[f32]) -> Result<(), RecorderError> {
        let frames = left.len().min(right.len());
        let mut block = Vec::with_capacity(frames * 2);
        for (&l, &r) in left.iter().zip(right) {
            block.push(l);
            block.push(r);
        }
        let sent = match &self.block_sender {
            Some(sender) => sender.send(block).is_ok(),
            None => false,
        };
        if !sent {
            return Err(RecorderError::WriterGone {
                path: self.path.clone(),
            });
        }
        self.frames += frames as u64;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Waits for queued blocks to be written and closes the file.
    pub fn finalize(mut self) -> Result<(), RecorderError> {
        self.close()
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        // Dropping the sender ends the writer's receive loop.
        self.block_sender = None;
        let Some(handle) = self.writer_thread.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(result) => result.map_err(|source| RecorderError::Wav {
                path: self.path.clone(),
                source,
            }),
            Err(_) => Err(RecorderError::WriterGone {
                path: self.path.clone(),
            }),
        }
    }
}

impl Drop for WavRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("{}", e);
        }
    }
}
