use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::TempDir;
use uuid::Uuid;

const SOURCE_FILE: &str = "source.dat";
const OUTPUT_FILE: &str = "output.jpg";

/// A private directory holding the files handed to and from the engine
/// for a single invocation.
///
/// The directory and everything in it is removed when this is dropped.
pub struct ScratchSpace {
    id: Uuid,
    dir: TempDir,
}

impl ScratchSpace {
    /// Creates a new scratch directory inside `base`, or the system temp
    /// directory if no base is given.
    pub fn create(base: Option<&Path>) -> io::Result<Self> {
        let id = Uuid::new_v4();
        let prefix = format!("resize-{}-", id);

        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match base {
            Some(base) => builder.tempdir_in(base)?,
            None => builder.tempdir()?,
        };

        Ok(Self { id, dir })
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[inline]
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join(SOURCE_FILE)
    }

    #[inline]
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_FILE)
    }

    /// Writes the source image, returning the path it was written to.
    pub async fn stage(&self, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.source_path();

        debug!("Staging {} bytes @ {:?}", data.len(), &path);
        tokio::fs::write(&path, data).await?;

        Ok(path)
    }

    /// Reads back whatever the engine wrote to the output path.
    pub async fn collect(&self) -> io::Result<Bytes> {
        let path = self.output_path();

        debug!("Collecting engine output @ {:?}", &path);
        let data = tokio::fs::read(&path).await?;

        Ok(Bytes::from(data))
    }
}
