//! Little-endian byte accumulator.
//!
//! Every value is appended in the engine's native layout (little-endian), no matter what the
//! host byte order is.
use std::io::{self, Write};

#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    pub data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn get_offset(&self) -> usize {
        self.data.len()
    }

    pub fn append_u8(&mut self, i: u8) {
        self.data.push(i);
    }

    pub fn append_u16(&mut self, i: u16) {
        self.data.extend(i.to_le_bytes());
    }

    pub fn append_i32(&mut self, i: i32) {
        self.data.extend(i.to_le_bytes());
    }

    pub fn append_f32(&mut self, i: f32) {
        self.data.extend(i.to_le_bytes());
    }

    pub fn append_u8_slice(&mut self, i: &[u8]) {
        self.data.extend_from_slice(i);
    }

    pub fn append_f32_slice(&mut self, i: &[f32]) {
        i.iter().for_each(|f| self.append_f32(*f));
    }

    /// Flushes everything accumulated so far into `out`.
    ///
    /// A short write is an error, the destination is left as is.
    pub fn write_all_to(&self, mut out: impl Write) -> io::Result<()> {
        out.write_all(&self.data)?;
        out.flush()
    }
}
