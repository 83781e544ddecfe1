use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;

use crate::processor::{Dimensions, EngineError, ImageResizer};
use crate::scratch::ScratchSpace;

/// Resizes images by running ImageMagick against files in a per-call
/// scratch space.
pub struct MagickResizer {
    binary: PathBuf,
    args: Vec<String>,
    scratch_dir: Option<PathBuf>,
}

impl MagickResizer {
    pub fn new(binary: PathBuf, args: Vec<String>, scratch_dir: Option<PathBuf>) -> Self {
        Self {
            binary,
            args,
            scratch_dir,
        }
    }

    /// The full argument list for resizing `src` into `dst`.
    ///
    /// Only the first frame of `src` is read so multi-frame inputs still
    /// produce a single `dst`. The `!` flag makes ImageMagick ignore the
    /// aspect ratio and the `jpeg:` prefix forces the output format
    /// whatever `dst` is named.
    fn command_args(&self, src: &Path, dst: &Path, dimensions: Dimensions) -> Vec<OsString> {
        let mut input = src.as_os_str().to_os_string();
        input.push("[0]");

        let mut output = OsString::from("jpeg:");
        output.push(dst.as_os_str());

        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(input);
        args.push(OsString::from("-resize"));
        args.push(OsString::from(format!("{}!", dimensions)));
        args.push(output);

        args
    }

    /// Runs the engine over `src` writing an exactly sized JPEG to `dst`.
    ///
    /// `dst` is only valid once this has returned `Ok`.
    pub async fn resize_file(
        &self,
        src: &Path,
        dst: &Path,
        dimensions: Dimensions,
    ) -> Result<(), EngineError> {
        let args = self.command_args(src, dst, dimensions);
        debug!("Running {:?} with args {:?}", &self.binary, &args);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ImageResizer for MagickResizer {
    async fn resize(&self, data: Bytes, dimensions: Dimensions) -> Result<Bytes, EngineError> {
        let scratch = ScratchSpace::create(self.scratch_dir.as_deref())?;
        debug!(scratch_id = %scratch.id(), "Created scratch space @ {:?}", scratch.path());

        let src = scratch.stage(&data).await?;
        self.resize_file(&src, &scratch.output_path(), dimensions).await?;

        Ok(scratch.collect().await?)
    }

    fn name(&self) -> &'static str {
        "magick"
    }
}
