//! Transport Tests
//!
//! Tests for exact-length reads and writes over unreliable streams.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};

use conftree::protocol::{read_request, read_response, write_request, write_response};
use conftree::transport::{DuplexStream, Transport};
use conftree::{Action, ConfTreeError, Request, Response, ValueType};

/// Scripted stream: each read/write call consumes the next step
#[derive(Default)]
struct ScriptedStream {
    input: VecDeque<u8>,
    output: Vec<u8>,
    read_steps: VecDeque<Step>,
    write_steps: VecDeque<Step>,
    closed: bool,
}

#[derive(Clone, Copy)]
enum Step {
    /// Move at most this many bytes
    Chunk(usize),
    Fail(ErrorKind),
    /// Report zero bytes moved
    Zero,
}

impl ScriptedStream {
    fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn reads(mut self, steps: &[Step]) -> Self {
        self.read_steps = steps.iter().copied().collect();
        self
    }

    fn writes(mut self, steps: &[Step]) -> Self {
        self.write_steps = steps.iter().copied().collect();
        self
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = match self.read_steps.pop_front().unwrap_or(Step::Chunk(usize::MAX)) {
            Step::Chunk(n) => n,
            Step::Fail(kind) => return Err(io::Error::new(kind, "scripted")),
            Step::Zero => return Ok(0),
        };

        let n = limit.min(buf.len()).min(self.input.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.input.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let limit = match self.write_steps.pop_front().unwrap_or(Step::Chunk(usize::MAX)) {
            Step::Chunk(n) => n,
            Step::Fail(kind) => return Err(io::Error::new(kind, "scripted")),
            Step::Zero => return Ok(0),
        };

        let n = limit.min(buf.len());
        self.output.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DuplexStream for ScriptedStream {
    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_all_single_bytes() {
    let stream = ScriptedStream::default().writes(&[Step::Chunk(1); 16]);
    let mut transport = Transport::new(stream);

    transport.write_all(b"hello, transport").unwrap();
    assert_eq!(transport.get_ref().output, b"hello, transport");
}

#[test]
fn test_write_all_retries_interrupted() {
    let stream = ScriptedStream::default().writes(&[
        Step::Chunk(2),
        Step::Fail(ErrorKind::Interrupted),
        Step::Fail(ErrorKind::Interrupted),
        Step::Chunk(10),
    ]);
    let mut transport = Transport::new(stream);

    transport.write_all(b"abcdef").unwrap();
    assert_eq!(transport.get_ref().output, b"abcdef");
}

#[test]
fn test_write_zero_is_closed() {
    let stream = ScriptedStream::default().writes(&[Step::Chunk(3), Step::Zero]);
    let mut transport = Transport::new(stream);

    let result = transport.write_all(b"abcdef");
    assert!(matches!(result, Err(ConfTreeError::ConnectionClosed)));
}

#[test]
fn test_write_broken_pipe() {
    let stream = ScriptedStream::default().writes(&[Step::Fail(ErrorKind::BrokenPipe)]);
    let mut transport = Transport::new(stream);

    let result = transport.write_all(b"abc");
    assert!(matches!(result, Err(ConfTreeError::Connection(_))));
}

#[test]
fn test_write_empty_buffer() {
    let stream = ScriptedStream::default().writes(&[Step::Fail(ErrorKind::BrokenPipe)]);
    let mut transport = Transport::new(stream);

    // Nothing to write, the stream is never touched
    transport.write_all(&[]).unwrap();
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_exact_across_chunks() {
    let stream = ScriptedStream::with_input(b"0123456789").reads(&[
        Step::Chunk(1),
        Step::Chunk(4),
        Step::Fail(ErrorKind::Interrupted),
        Step::Chunk(2),
    ]);
    let mut transport = Transport::new(stream);

    assert_eq!(transport.read_exact(7).unwrap(), b"0123456");
    assert_eq!(transport.read_exact(3).unwrap(), b"789");
}

#[test]
fn test_read_exact_zero_length() {
    let mut transport = Transport::new(ScriptedStream::default());
    assert!(transport.read_exact(0).unwrap().is_empty());
}

#[test]
fn test_read_eof_mid_frame() {
    let stream = ScriptedStream::with_input(b"abc");
    let mut transport = Transport::new(stream);

    let result = transport.read_exact(5);
    assert!(matches!(result, Err(ConfTreeError::ConnectionClosed)));
}

#[test]
fn test_read_would_block_is_timeout() {
    let stream = ScriptedStream::with_input(b"abc").reads(&[
        Step::Chunk(1),
        Step::Fail(ErrorKind::WouldBlock),
    ]);
    let mut transport = Transport::new(stream);

    let result = transport.read_exact(3);
    assert!(matches!(result, Err(ConfTreeError::Timeout)));
}

#[test]
fn test_read_timed_out_is_timeout() {
    let stream = ScriptedStream::default().reads(&[Step::Fail(ErrorKind::TimedOut)]);
    let mut transport = Transport::new(stream);

    assert!(matches!(transport.read_exact(1), Err(ConfTreeError::Timeout)));
}

#[test]
fn test_read_reset_is_connection_error() {
    let stream = ScriptedStream::default().reads(&[Step::Fail(ErrorKind::ConnectionReset)]);
    let mut transport = Transport::new(stream);

    let err = transport.read_exact(1).unwrap_err();
    assert!(matches!(err, ConfTreeError::Connection(_)));
    assert!(err.is_connection_error());
}

#[test]
fn test_other_io_errors_pass_through() {
    let stream = ScriptedStream::default().reads(&[Step::Fail(ErrorKind::PermissionDenied)]);
    let mut transport = Transport::new(stream);

    assert!(matches!(transport.read_exact(1), Err(ConfTreeError::Io(_))));
}

#[test]
fn test_close_reaches_stream() {
    let mut transport = Transport::with_peer(ScriptedStream::default(), "scripted");

    transport.close().unwrap();
    assert!(transport.get_ref().closed);
    assert_eq!(transport.peer(), "scripted");
}

// =============================================================================
// Framed I/O Tests
// =============================================================================

#[test]
fn test_request_frames_over_chunked_stream() {
    let request = Request::put("/camera/", "name", ValueType::String, "front");
    let stream = ScriptedStream::default().writes(&[Step::Chunk(3); 64]);
    let mut writer = Transport::new(stream);
    write_request(&mut writer, &request).unwrap();

    let sent = writer.into_inner().output;
    let stream = ScriptedStream::with_input(&sent).reads(&[Step::Chunk(2); 64]);
    let mut reader = Transport::new(stream);

    assert_eq!(read_request(&mut reader).unwrap(), request);
}

#[test]
fn test_response_frames_back_to_back() {
    let first = Response::listing(Action::GetChildren, ["sensor", "camera"]);
    let second = Response::error("Node has no children.");

    let mut writer = Transport::new(ScriptedStream::default());
    write_response(&mut writer, &first).unwrap();
    write_response(&mut writer, &second).unwrap();

    let sent = writer.into_inner().output;
    let stream = ScriptedStream::with_input(&sent).reads(&[Step::Chunk(1); 128]);
    let mut reader = Transport::new(stream);

    assert_eq!(read_response(&mut reader).unwrap(), first);
    assert_eq!(read_response(&mut reader).unwrap(), second);
    assert!(matches!(
        read_response(&mut reader),
        Err(ConfTreeError::ConnectionClosed)
    ));
}

#[test]
fn test_unknown_request_action_keeps_stream_in_sync() {
    let mut bad = vec![9u8, 0, 0, 0, 2, 0, 0, 0, 0, 0];
    bad.extend_from_slice(b"/\0");

    let mut writer = Transport::new(ScriptedStream::default());
    writer.write_all(&bad).unwrap();
    write_request(&mut writer, &Request::node_exists("/")).unwrap();

    let sent = writer.into_inner().output;
    let mut reader = Transport::new(ScriptedStream::with_input(&sent));

    assert!(matches!(read_request(&mut reader), Err(ConfTreeError::UnknownAction(9))));
    assert_eq!(read_request(&mut reader).unwrap(), Request::node_exists("/"));
}

#[test]
fn test_truncated_response_message() {
    // Header promises 10 bytes, only 3 arrive
    let stream = ScriptedStream::with_input(&[2, 3, 10, 0, b'1', b'2', b'3']);
    let mut reader = Transport::new(stream);

    assert!(matches!(
        read_response(&mut reader),
        Err(ConfTreeError::ConnectionClosed)
    ));
}
