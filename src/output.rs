use std::io::{Error as IOError, Write};
use std::string::FromUtf8Error;

/// The sink a template renders into.
pub trait Output {
    fn write(&mut self, seg: &str) -> Result<(), IOError>;
}

pub struct WriteOutput<'a, W: Write> {
    write: &'a mut W,
}

impl<'a, W: Write> Output for WriteOutput<'a, W> {
    fn write(&mut self, seg: &str) -> Result<(), IOError> {
        self.write.write_all(seg.as_bytes())
    }
}

impl<'a, W: Write> WriteOutput<'a, W> {
    pub fn new(write: &'a mut W) -> WriteOutput<'a, W> {
        WriteOutput { write }
    }
}

pub struct StringOutput {
    buf: Vec<u8>,
}

impl Output for StringOutput {
    fn write(&mut self, seg: &str) -> Result<(), IOError> {
        self.buf.extend_from_slice(seg.as_bytes());
        Ok(())
    }
}

impl StringOutput {
    pub fn new() -> StringOutput {
        StringOutput {
            buf: Vec::with_capacity(8 * 1024),
        }
    }

    pub fn into_string(self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.buf)
    }
}

impl Default for StringOutput {
    fn default() -> Self {
        StringOutput::new()
    }
}

#[cfg(test)]
mod test {
    use crate::output::{Output, StringOutput, WriteOutput};

    #[test]
    fn test_string_output() {
        let mut out = StringOutput::new();
        out.write("hello").unwrap();
        out.write(" world").unwrap();
        assert_eq!(out.into_string().unwrap(), "hello world");
    }

    #[test]
    fn test_write_output() {
        let mut buf: Vec<u8> = Vec::new();
        let mut out = WriteOutput::new(&mut buf);
        out.write("hello").unwrap();
        assert_eq!(buf, b"hello");
    }
}
