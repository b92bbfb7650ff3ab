//! Byte channels handed out by the storage tiers

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

type CloseHook = Box<dyn FnOnce(&Path) + Send>;

/// Open file plus an optional hook run once when the channel is closed
///
/// Closing happens either through [`ByteChannel::close`] or on drop,
/// whichever comes first.
pub struct ByteChannel {
    file: File,
    path: PathBuf,
    on_close: Option<CloseHook>,
}

impl ByteChannel {
    pub fn new(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            file,
            path: path.into(),
            on_close: None,
        }
    }

    /// Attach a hook receiving the physical path when the channel closes
    #[must_use]
    pub fn on_close(mut self, hook: impl FnOnce(&Path) + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Physical file backing this channel
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the underlying file
    pub fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Flush, then run the close hook
    pub fn close(mut self) -> io::Result<()> {
        let flushed = self.file.flush();
        self.run_hook();
        flushed
    }

    fn run_hook(&mut self) {
        if let Some(hook) = self.on_close.take() {
            hook(&self.path);
        }
    }
}

impl Read for ByteChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for ByteChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for ByteChannel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Drop for ByteChannel {
    fn drop(&mut self) {
        self.run_hook();
    }
}

impl fmt::Debug for ByteChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteChannel")
            .field("path", &self.path)
            .field("has_close_hook", &self.on_close.is_some())
            .finish()
    }
}
