use core::cmp::min;

/// A bounded in-memory byte pipe.
///
/// One side pushes bytes in and eventually closes, the other peeks and pops
/// them back out in order. The buffer never grows beyond the capacity fixed
/// at creation; a push that does not fit is silently truncated, and the
/// counters tell both sides how much actually moved. Nothing here blocks:
/// backpressure is expressed entirely through [`available_capacity`].
///
/// The stream is one owning object. The two roles are handed out as the
/// [`Writer`] and [`Reader`] capability surfaces, so a component can be given
/// exactly the half it is supposed to touch.
///
/// [`available_capacity`]: #method.available_capacity
#[derive(Debug)]
pub struct ByteStream {
    buffer: Vec<u8>,
    head: usize,
    len: usize,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

/// The writing half of a [`ByteStream`].
#[derive(Debug)]
pub struct Writer<'a> {
    stream: &'a mut ByteStream,
}

/// The reading half of a [`ByteStream`].
#[derive(Debug)]
pub struct Reader<'a> {
    stream: &'a mut ByteStream,
}

impl ByteStream {
    /// Create a stream bounded to `capacity` bytes.
    ///
    /// # Panics
    /// This function panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        ByteStream {
            buffer: vec![0; capacity],
            head: 0,
            len: 0,
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    /// Borrow the writing capability surface.
    pub fn writer(&mut self) -> Writer<'_> {
        Writer { stream: self }
    }

    /// Borrow the reading capability surface.
    pub fn reader(&mut self) -> Reader<'_> {
        Reader { stream: self }
    }

    /// The fixed capacity the stream was created with.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently sitting in the buffer.
    pub fn bytes_buffered(&self) -> usize {
        self.len
    }

    /// Room left for the writer.
    pub fn available_capacity(&self) -> usize {
        self.buffer.len() - self.len
    }

    /// Cumulative count of bytes accepted from the writer.
    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    /// Cumulative count of bytes handed to the reader.
    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    /// Whether the writer signalled the end of the stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the stream is closed and drained.
    pub fn is_finished(&self) -> bool {
        self.closed && self.len == 0
    }

    /// Whether either side latched a terminal failure.
    pub fn has_error(&self) -> bool {
        self.error
    }

    fn push(&mut self, data: &[u8]) -> usize {
        if self.closed || self.error {
            return 0;
        }
        let take = min(data.len(), self.available_capacity());
        if take == 0 {
            return 0;
        }

        let capacity = self.buffer.len();
        let tail = (self.head + self.len) % capacity;
        let first_run = min(take, capacity - tail);
        self.buffer[tail..tail + first_run].copy_from_slice(&data[..first_run]);
        if first_run < take {
            self.buffer[..take - first_run].copy_from_slice(&data[first_run..take]);
        }

        self.len += take;
        self.bytes_pushed += take as u64;
        take
    }

    fn peek(&self) -> &[u8] {
        // The longest contiguous run from the head; non-empty whenever any
        // byte is buffered.
        let run = min(self.len, self.buffer.len() - self.head);
        &self.buffer[self.head..self.head + run]
    }

    fn pop(&mut self, count: usize) {
        let take = min(count, self.len);
        self.head = (self.head + take) % self.buffer.len();
        self.len -= take;
        self.bytes_popped += take as u64;
    }
}

impl Writer<'_> {
    /// Write as much of `data` as fits, dropping the remainder.
    ///
    /// Returns the number of bytes accepted. Does nothing once the stream is
    /// closed or errored.
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.stream.push(data)
    }

    /// Signal that no further bytes will be pushed.
    pub fn close(&mut self) {
        self.stream.closed = true;
    }

    /// Latch a terminal failure visible to both sides.
    pub fn set_error(&mut self) {
        self.stream.error = true;
    }

    pub fn is_closed(&self) -> bool {
        self.stream.closed
    }

    pub fn has_error(&self) -> bool {
        self.stream.error
    }

    pub fn available_capacity(&self) -> usize {
        self.stream.available_capacity()
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.stream.bytes_pushed
    }
}

impl Reader<'_> {
    /// A view of buffered bytes, contiguous from the front of the stream.
    ///
    /// The view covers at least one byte whenever [`bytes_buffered`] is
    /// non-zero, but may be shorter than the full buffered amount when the
    /// ring wraps; peek again after popping to see the rest.
    ///
    /// [`bytes_buffered`]: #method.bytes_buffered
    pub fn peek(&self) -> &[u8] {
        self.stream.peek()
    }

    /// Discard up to `count` bytes from the front of the stream.
    pub fn pop(&mut self, count: usize) {
        self.stream.pop(count)
    }

    /// Copy up to `count` bytes out of the stream and discard them.
    pub fn read(&mut self, count: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(min(count, self.stream.len));
        while data.len() < count {
            let run = self.stream.peek();
            if run.is_empty() {
                break;
            }
            let take = min(run.len(), count - data.len());
            data.extend_from_slice(&run[..take]);
            self.stream.pop(take);
        }
        data
    }

    /// Latch a terminal failure visible to both sides.
    pub fn set_error(&mut self) {
        self.stream.error = true;
    }

    pub fn is_finished(&self) -> bool {
        self.stream.is_finished()
    }

    pub fn has_error(&self) -> bool {
        self.stream.error
    }

    pub fn bytes_buffered(&self) -> usize {
        self.stream.len
    }

    pub fn bytes_popped(&self) -> u64 {
        self.stream.bytes_popped
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_truncates_at_capacity() {
        let mut stream = ByteStream::new(3);
        assert_eq!(stream.writer().push(b"cat"), 3);
        assert_eq!(stream.writer().push(b"tac"), 0);
        assert_eq!(stream.bytes_pushed(), 3);
        assert_eq!(stream.bytes_buffered(), 3);
        assert_eq!(stream.reader().peek(), b"cat");

        stream.writer().close();
        stream.reader().pop(3);
        assert!(stream.reader().is_finished());
        assert_eq!(stream.bytes_popped(), 3);
    }

    #[test]
    fn partial_push_keeps_prefix() {
        let mut stream = ByteStream::new(4);
        assert_eq!(stream.writer().push(b"abc"), 3);
        assert_eq!(stream.writer().push(b"defg"), 1);
        assert_eq!(stream.reader().read(4), b"abcd");
    }

    #[test]
    fn ring_wraps_and_peek_stays_contiguous() {
        let mut stream = ByteStream::new(4);
        stream.writer().push(b"abcd");
        stream.reader().pop(3);
        // Head sits at index 3; the next push wraps around the end.
        assert_eq!(stream.writer().push(b"efg"), 3);
        assert_eq!(stream.bytes_buffered(), 4);

        // First peek yields the tail run, the rest shows up after popping.
        assert_eq!(stream.reader().peek(), b"d");
        assert_eq!(stream.reader().read(4), b"defg");
        assert_eq!(stream.bytes_popped(), 7);
    }

    #[test]
    fn close_makes_push_a_noop() {
        let mut stream = ByteStream::new(8);
        stream.writer().push(b"hi");
        stream.writer().close();
        assert_eq!(stream.writer().push(b"more"), 0);
        assert_eq!(stream.bytes_pushed(), 2);
        assert!(stream.is_closed());
        assert!(!stream.is_finished());
        stream.reader().pop(2);
        assert!(stream.is_finished());
    }

    #[test]
    fn error_latches() {
        let mut stream = ByteStream::new(8);
        stream.reader().set_error();
        assert!(stream.has_error());
        assert_eq!(stream.writer().push(b"x"), 0);
        assert!(stream.writer().has_error());
    }

    #[test]
    fn counters_monotone() {
        let mut stream = ByteStream::new(2);
        for chunk in [b"ab", b"cd", b"ef"] {
            assert_eq!(stream.writer().push(chunk), 2);
            stream.reader().pop(2);
        }
        assert_eq!(stream.bytes_pushed(), 6);
        assert_eq!(stream.bytes_popped(), 6);
        assert_eq!(stream.bytes_buffered(), 0);
    }
}
