use std::collections::VecDeque;
use std::io::Cursor;

use crate::error::Result;

/// A blocking, byte-granular input stream.
///
/// `read_byte` returns exactly one byte or fails. Partial reads and interrupted
/// system calls are the implementor's problem, never the caller's.
pub trait ByteSource {
    /// Block until the next byte arrives.
    ///
    /// Fails with [`TransportError::Closed`](crate::TransportError::Closed) at
    /// end-of-stream and [`TransportError::TimedOut`](crate::TransportError::TimedOut)
    /// when the transport's read timeout elapses.
    fn read_byte(&mut self) -> Result<u8>;

    /// Whether at least one byte can be read without blocking.
    ///
    /// Never blocks. Callers use this to interleave a second, independent
    /// instrument on the same thread.
    fn bytes_available(&mut self) -> Result<bool>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn bytes_available(&mut self) -> Result<bool> {
        (**self).bytes_available()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn bytes_available(&mut self) -> Result<bool> {
        (**self).bytes_available()
    }
}

/// Non-blocking query for the number of bytes ready to be read.
pub trait Available {
    /// Bytes that a subsequent `read` can return without blocking.
    fn available(&self) -> std::io::Result<usize>;
}

impl Available for &[u8] {
    fn available(&self) -> std::io::Result<usize> {
        Ok(self.len())
    }
}

impl Available for VecDeque<u8> {
    fn available(&self) -> std::io::Result<usize> {
        Ok(self.len())
    }
}

impl<T: AsRef<[u8]>> Available for Cursor<T> {
    fn available(&self) -> std::io::Result<usize> {
        let len = self.get_ref().as_ref().len() as u64;
        Ok(len.saturating_sub(self.position()) as usize)
    }
}

#[cfg(unix)]
mod fd {
    use std::os::fd::AsRawFd;

    use super::Available;

    /// Query `FIONREAD` on a descriptor (tty, pipe, or socket).
    pub(super) fn pending_bytes(fd: &impl AsRawFd) -> std::io::Result<usize> {
        let mut pending: libc::c_int = 0;

        // SAFETY: `pending` is a valid writable `c_int`, which is what FIONREAD
        // stores into, and the descriptor is borrowed from a live owner.
        let rc = unsafe {
            libc::ioctl(
                fd.as_raw_fd(),
                libc::FIONREAD,
                &mut pending as *mut libc::c_int,
            )
        };

        if rc == -1 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(pending.max(0) as usize)
    }

    impl Available for std::fs::File {
        fn available(&self) -> std::io::Result<usize> {
            pending_bytes(self)
        }
    }

    impl Available for std::os::unix::net::UnixStream {
        fn available(&self) -> std::io::Result<usize> {
            pending_bytes(self)
        }
    }

    impl Available for std::net::TcpStream {
        fn available(&self) -> std::io::Result<usize> {
            pending_bytes(self)
        }
    }
}
