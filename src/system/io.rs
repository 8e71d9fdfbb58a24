// src/system/io.rs

//! Standard stream plumbing for child processes and redirections.

use crate::constants::DEV_NULL;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::Stdio;

/// An in-memory stand-in for `/dev/null`: reads hit EOF and writes are discarded.
/// Used on every platform, so scripts can redirect to `/dev/null` even without the device.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevNull;

impl Read for DevNull {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for DevNull {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where a command reads its standard input from.
#[derive(Debug)]
pub enum InputStream {
    /// The runner's own stdin.
    Inherit,
    /// Always at EOF.
    Null,
    /// A redirected file.
    File(File),
}

/// Where a command writes standard output or standard error.
#[derive(Debug)]
pub enum OutputStream {
    /// The runner's stdout.
    Stdout,
    /// The runner's stderr.
    Stderr,
    /// Discarded.
    Null,
    /// A redirected file.
    File(File),
}

impl InputStream {
    /// Hands the same underlying stream to a child process.
    pub fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
            Self::File(f) => Stdio::from(f.try_clone()?),
        })
    }

    /// Duplicates the stream, sharing any underlying file handle.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(match self {
            Self::Inherit => Self::Inherit,
            Self::Null => Self::Null,
            Self::File(f) => Self::File(f.try_clone()?),
        })
    }
}

impl OutputStream {
    /// Hands the stream to a child process. `Stderr` stays stderr even when it is
    /// used as the child's stdout (`>&2`), and vice versa.
    pub fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Self::Stdout => Stdio::from(io::stdout()),
            Self::Stderr => Stdio::from(io::stderr()),
            Self::Null => Stdio::null(),
            Self::File(f) => Stdio::from(f.try_clone()?),
        })
    }

    /// Duplicates the stream, sharing any underlying file handle.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(match self {
            Self::Stdout => Self::Stdout,
            Self::Stderr => Self::Stderr,
            Self::Null => Self::Null,
            Self::File(f) => Self::File(f.try_clone()?),
        })
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Inherit => io::stdin().read(buf),
            Self::Null => DevNull.read(buf),
            Self::File(f) => f.read(buf),
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout => io::stdout().write(buf),
            Self::Stderr => io::stderr().write(buf),
            Self::Null => DevNull.write(buf),
            Self::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
            Self::Null => Ok(()),
            Self::File(f) => f.flush(),
        }
    }
}

/// The three standard streams of an interpreter or of a single command.
#[derive(Debug)]
pub struct IoStreams {
    /// Standard input.
    pub stdin: InputStream,
    /// Standard output.
    pub stdout: OutputStream,
    /// Standard error.
    pub stderr: OutputStream,
}

impl Default for IoStreams {
    fn default() -> Self {
        Self {
            stdin: InputStream::Inherit,
            stdout: OutputStream::Stdout,
            stderr: OutputStream::Stderr,
        }
    }
}

impl IoStreams {
    /// Duplicates all three streams.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self {
            stdin: self.stdin.try_clone()?,
            stdout: self.stdout.try_clone()?,
            stderr: self.stderr.try_clone()?,
        })
    }
}

/// Opens `path` for reading. `/dev/null` never touches the filesystem.
pub fn open_input(path: &str, cwd: &Path) -> io::Result<InputStream> {
    if path == DEV_NULL {
        return Ok(InputStream::Null);
    }
    Ok(InputStream::File(File::open(cwd.join(path))?))
}

/// Opens `path` for writing, truncating unless `append` is set.
/// `/dev/null` never touches the filesystem.
pub fn open_output(path: &str, append: bool, cwd: &Path) -> io::Result<OutputStream> {
    if path == DEV_NULL {
        return Ok(OutputStream::Null);
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(cwd.join(path))?;
    Ok(OutputStream::File(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dev_null_reads_empty_and_discards_writes() {
        let cwd = Path::new("/definitely/not/a/real/dir");
        let mut input = open_input("/dev/null", cwd).unwrap();
        let mut buf = String::new();
        input.read_to_string(&mut buf).unwrap();
        assert!(buf.is_empty());

        let mut output = open_output("/dev/null", false, cwd).unwrap();
        assert_eq!(output.write(b"discarded").unwrap(), 9);
        assert!(matches!(output, OutputStream::Null));
    }

    #[test]
    fn test_open_output_truncates_and_appends() {
        let dir = tempdir().unwrap();
        {
            let mut out = open_output("log.txt", false, dir.path()).unwrap();
            out.write_all(b"first\n").unwrap();
        }
        {
            let mut out = open_output("log.txt", true, dir.path()).unwrap();
            out.write_all(b"second\n").unwrap();
        }
        let content = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(content, "first\nsecond\n");

        {
            let mut out = open_output("log.txt", false, dir.path()).unwrap();
            out.write_all(b"third\n").unwrap();
        }
        let content = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(content, "third\n");
    }

    #[test]
    fn test_standard_streams_convert_to_stdio() {
        assert!(OutputStream::Stdout.to_stdio().is_ok());
        assert!(OutputStream::Stderr.to_stdio().is_ok());
        assert!(OutputStream::Null.to_stdio().is_ok());
        assert!(InputStream::Inherit.to_stdio().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_stderr_stream_can_be_a_childs_stdout() {
        use std::process::Command;

        let status = Command::new("sh")
            .args(["-c", "echo to-runner-stderr"])
            .stdout(OutputStream::Stderr.to_stdio().unwrap())
            .stderr(OutputStream::Null.to_stdio().unwrap())
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_open_input_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(open_input("missing.txt", dir.path()).is_err());
    }
}
