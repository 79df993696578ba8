use std::io::{self, Read, Write};

// Reader that serves `data` but fails with `ErrorKind::Other` once `fail_after` bytes were read
pub struct FailingReader<'a> {
    data: &'a [u8],
    remaining: usize,
}

impl<'a> FailingReader<'a> {
    pub fn new(data: &'a [u8], fail_after: usize) -> Self {
        FailingReader {
            data,
            remaining: fail_after,
        }
    }
}

impl Read for FailingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("injected read failure"));
        }

        let len = buf.len().min(self.remaining).min(self.data.len());
        buf[..len].copy_from_slice(&self.data[..len]);
        self.data = &self.data[len..];
        self.remaining -= len;
        Ok(len)
    }
}

// Writer that accepts `capacity` bytes, then fails with `ErrorKind::Other`
pub struct FailingWriter {
    pub written: Vec<u8>,
    capacity: usize,
}

impl FailingWriter {
    pub fn new(capacity: usize) -> Self {
        FailingWriter {
            written: Vec::new(),
            capacity,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.capacity - self.written.len();
        if room == 0 {
            return Err(io::Error::other("injected write failure"));
        }

        let len = buf.len().min(room);
        self.written.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_reader_stops_at_limit() {
    let mut reader = FailingReader::new(&[1, 2, 3, 4], 3);
    let mut buf = [0u8; 4];
    assert_eq!(reader.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], &[1, 2, 3]);
    assert_eq!(
        reader.read(&mut buf).unwrap_err().kind(),
        io::ErrorKind::Other
    );
}

#[test]
fn failing_writer_keeps_accepted_bytes() {
    let mut writer = FailingWriter::new(2);
    assert!(writer.write_all(&[1, 2, 3]).is_err());
    assert_eq!(writer.written, [1, 2]);
}
