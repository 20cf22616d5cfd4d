#![allow(dead_code)]

use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared view of a [`TrackedBody`] after it has been handed to an iterator.
#[derive(Clone, Default)]
pub struct BodyProbe {
    dropped: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
}

impl BodyProbe {
    pub fn released(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Response body that records reads and when it is dropped.
pub struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    fail_after: Option<usize>,
    probe: BodyProbe,
}

impl TrackedBody {
    pub fn new(data: impl Into<Vec<u8>>) -> (Self, BodyProbe) {
        let probe = BodyProbe::default();
        let body = Self {
            inner: Cursor::new(data.into()),
            fail_after: None,
            probe: probe.clone(),
        };
        (body, probe)
    }

    /// Serve `data`, then fail every further read.
    pub fn failing_after(data: impl Into<Vec<u8>>) -> (Self, BodyProbe) {
        let data = data.into();
        let len = data.len();
        let (mut body, probe) = Self::new(data);
        body.fail_after = Some(len);
        (body, probe)
    }
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if self.inner.position() as usize >= limit {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ));
            }
        }
        self.inner.read(buf)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}

/// Build one SSE data frame from a JSON value.
pub fn data_frame(value: &serde_json::Value) -> String {
    format!("data: {value}\n\n")
}
