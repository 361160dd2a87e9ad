use std::io::{self, ErrorKind, Read};

/// Default number of bytes staged by a single refill.
pub const INBUF_SIZE: usize = 0x8000;

/// Read-ahead buffer over the compressed input.
///
/// Header parsers look at [`staged`](Self::staged) bytes and move the
/// cursor with [`advance`](Self::advance). The codec loop reads through the
/// [`Read`] impl, which hands out staged bytes and refills the stage when it
/// runs dry, and pushes unconsumed bytes back with [`unread`](Self::unread)
/// so the cursor always sits right after the last byte actually used.
pub struct InputBuffer<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    capacity: usize,
    eof: bool,
}

impl<R: Read> InputBuffer<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(INBUF_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(capacity),
            pos: 0,
            capacity: capacity.max(1),
            eof: false,
        }
    }

    /// Bytes between the cursor and the end of the staged data.
    pub fn staged(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    pub fn staged_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Move the cursor forward, never past the staged data.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    /// Refill until at least `n` bytes are staged or the source is exhausted.
    ///
    /// Returns whether `n` bytes are now available.
    pub fn fill_to(&mut self, n: usize) -> io::Result<bool> {
        if self.staged_len() >= n {
            return Ok(true);
        }
        self.compact();
        let want = n.max(self.capacity);
        while !self.eof && self.buf.len() < n {
            let start = self.buf.len();
            self.buf.resize(want, 0);
            match self.inner.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    self.eof = true;
                }
                Ok(read) => self.buf.truncate(start + read),
                Err(e) if e.kind() == ErrorKind::Interrupted => self.buf.truncate(start),
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        }
        Ok(self.staged_len() >= n)
    }

    /// Put bytes back in front of the cursor, to be read again next.
    pub fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.pos >= bytes.len() && &self.buf[self.pos - bytes.len()..self.pos] == bytes {
            self.pos -= bytes.len();
            return;
        }
        self.compact();
        self.buf.splice(0..0, bytes.iter().copied());
    }

    fn compact(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }
}

impl<R: Read> Read for InputBuffer<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() || !self.fill_to(1)? {
            return Ok(0);
        }
        let n = self.staged_len().min(dst.len());
        dst[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
