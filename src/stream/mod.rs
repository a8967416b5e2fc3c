//! Byte stream adapter over an asynchronous socket
//!
//! This module bridges a suspend/resume I/O model to a sequential read/write
//! abstraction. A connection task calls [`StreamReader::read`] or
//! [`StreamWriter::write`] as if they were ordinary blocking operations; the
//! calls suspend the task at the `.await` points while the socket performs
//! non-blocking I/O, so any number of connections make progress on a shared
//! reactor without a dedicated thread each.
//!
//! Reads are bounded by a remaining-bytes budget (see
//! [`StreamReader::set_remaining`]) so that message bodies with a declared
//! `Content-Length` are delivered exactly and never over-read. Writes are
//! buffered and reach the socket only when the output buffer fills or on an
//! explicit flush.

mod reader;
mod writer;

pub use reader::StreamReader;
pub use writer::StreamWriter;

/// Capacity of the input and output buffers.
pub(crate) const BUFFER_SIZE: usize = 16 * 1024;
