//! A growable circular byte buffer used to stage bytes between a transport
//! read and a parser feed.
//!
//! Same FIFO semantics, grow-on-demand policy, and wrap-around index
//! arithmetic as a classic C ring buffer, re-expressed as a safe Rust
//! `Vec<u8>`-backed type instead of `malloc`/`realloc`/`memcpy`.

/// Default capacity used when a non-positive size hint is supplied.
pub const DEFAULT_CBUF_SIZE: usize = 4096;

/// A growable, FIFO circular byte buffer with transparent wrap-around.
///
/// Invariants: `0 <= read_idx, write_idx < size`; `0 <= available <= size`;
/// the unread bytes are the contiguous-or-wrapped range
/// `[read_idx, read_idx + available) mod size`.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<u8>,
    write_idx: usize,
    read_idx: usize,
    available: usize,
}

impl RingBuffer {
    /// Allocates storage of `max(size_hint, DEFAULT_CBUF_SIZE)` bytes.
    ///
    /// A `size_hint` of zero (or, since the type is unsigned, any value)
    /// below the default falls back to [`DEFAULT_CBUF_SIZE`], matching
    /// `cbuf_new`'s handling of a non-positive hint.
    pub fn new(size_hint: usize) -> Self {
        let size = if size_hint == 0 {
            DEFAULT_CBUF_SIZE
        } else {
            size_hint
        };
        Self {
            data: vec![0u8; size],
            write_idx: 0,
            read_idx: 0,
            available: 0,
        }
    }

    /// Total backing storage, in bytes. Grows over time; never shrinks.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of unread bytes currently staged.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Resets the buffer to empty without releasing the backing storage.
    pub fn reset(&mut self) {
        self.write_idx = 0;
        self.read_idx = 0;
        self.available = 0;
    }

    /// Appends `src` to the buffer, growing first if there isn't enough
    /// room.
    pub fn put(&mut self, src: &[u8]) {
        let len = src.len();
        if len == 0 {
            return;
        }
        let remaining = self.data.len() - self.available;
        if remaining < len {
            self.grow(len - remaining);
        }

        let size = self.data.len();
        if self.write_idx + len >= size {
            let trimmed_length = size - self.write_idx;
            let next_write_idx = len - trimmed_length;
            self.data[self.write_idx..size].copy_from_slice(&src[..trimmed_length]);
            self.data[..next_write_idx].copy_from_slice(&src[trimmed_length..]);
            self.write_idx = next_write_idx;
        } else {
            self.data[self.write_idx..self.write_idx + len].copy_from_slice(src);
            self.write_idx += len;
        }

        self.available += len;
    }

    /// Copies up to `dst.len()` unread bytes into `dst`, advancing
    /// `read_idx`. Returns the number of bytes copied; zero if the buffer
    /// is empty, which is not an error condition.
    pub fn get(&mut self, dst: &mut [u8]) -> usize {
        if self.available == 0 {
            return 0;
        }

        let readable = dst.len().min(self.available);
        let size = self.data.len();
        if self.read_idx + readable >= size {
            let trimmed_length = size - self.read_idx;
            let next_read_idx = readable - trimmed_length;
            dst[..trimmed_length].copy_from_slice(&self.data[self.read_idx..size]);
            dst[trimmed_length..readable].copy_from_slice(&self.data[..next_read_idx]);
            self.read_idx = next_read_idx;
        } else {
            dst[..readable].copy_from_slice(&self.data[self.read_idx..self.read_idx + readable]);
            self.read_idx += readable;
        }

        self.available -= readable;
        readable
    }

    /// Grows the backing storage to hold at least `min_extra` more bytes
    /// than are currently available, preserving the logical FIFO order of
    /// the unread bytes even if the live range is currently wrapped.
    ///
    /// New size is the current size doubled, repeated until it covers
    /// `min_extra` additional bytes.
    fn grow(&mut self, min_extra: usize) {
        let old_size = self.data.len();
        let mut new_size = old_size * 2;
        while new_size < old_size + min_extra {
            new_size *= 2;
        }

        let wrapped = self.write_idx <= self.read_idx && self.available > 0;
        let mut new_data = vec![0u8; new_size];
        if wrapped {
            // Re-linearize: copy the unread range out in logical order
            // starting at index 0, rather than shifting the tail segment
            // in place. Simpler to reason about without raw pointer
            // arithmetic, same end state.
            let tail = old_size - self.read_idx;
            new_data[..tail].copy_from_slice(&self.data[self.read_idx..old_size]);
            new_data[tail..tail + self.write_idx].copy_from_slice(&self.data[..self.write_idx]);
            self.read_idx = 0;
            self.write_idx = tail + self.write_idx;
        } else {
            new_data[..old_size].copy_from_slice(&self.data);
        }

        self.data = new_data;
    }
}
