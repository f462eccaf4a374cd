use std::{
    io,
    sync::{Arc, Mutex},
};

/// Renders color requests as inline tags, e.g. `<bold-red>text<reset>`, so tests can assert on
/// exactly which spans the reporter styles.
///
/// Only the styles documenter emits are accepted: optional bold plus one of green, red, yellow
/// or white. Anything else panics, catching accidental styling in tests.
#[derive(Debug)]
pub struct TestColorWriter<W: io::Write> {
    inner: W,
}

impl<W: io::Write> TestColorWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn tag_for(spec: &termcolor::ColorSpec) -> String {
    use termcolor::Color;

    assert!(
        spec.bg().is_none() && !spec.intense() && !spec.underline(),
        "unexpected style: {spec:?}"
    );

    let color = spec.fg().map(|color| match color {
        Color::Green => "green",
        Color::Red => "red",
        Color::Yellow => "yellow",
        Color::White => "white",
        other => panic!("documenter never renders {other:?}"),
    });

    match (spec.bold(), color) {
        (true, Some(color)) => format!("<bold-{color}>"),
        (true, None) => "<bold>".to_owned(),
        (false, Some(color)) => format!("<{color}>"),
        (false, None) => "<plain>".to_owned(),
    }
}

impl<W: io::Write> io::Write for TestColorWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: io::Write> termcolor::WriteColor for TestColorWriter<W> {
    fn supports_color(&self) -> bool {
        true
    }

    fn set_color(&mut self, spec: &termcolor::ColorSpec) -> io::Result<()> {
        let tag = tag_for(spec);
        self.inner.write_all(tag.as_bytes())
    }

    fn reset(&mut self) -> io::Result<()> {
        self.inner.write_all(b"<reset>")
    }
}

/// A colorless sink counting the writes and flushes it receives.
#[derive(Default, Debug)]
pub struct MockWriter {
    pub buffer: Vec<u8>,
    pub num_writes: u64,
    pub num_flushes: u64,
}

impl io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend(buf);
        self.num_writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.num_flushes += 1;
        Ok(())
    }
}

impl termcolor::WriteColor for MockWriter {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, _spec: &termcolor::ColorSpec) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A writer handle that can be given to a reporter while the test keeps access to what was
/// written.
#[derive(Debug)]
pub struct SharedWriter<W>(Arc<Mutex<W>>);

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<W> SharedWriter<W> {
    pub fn new(w: W) -> Self {
        Self(Arc::new(Mutex::new(w)))
    }

    /// Takes back the inner writer. All other handles must have been dropped.
    pub fn get(self) -> W {
        match Arc::try_unwrap(self.0) {
            Ok(inner) => inner.into_inner().unwrap(),
            Err(_) => panic!("writer is still shared"),
        }
    }
}

impl SharedWriter<TestColorWriter<Vec<u8>>> {
    pub fn tagged() -> Self {
        Self::new(TestColorWriter::new(vec![]))
    }

    pub fn output(self) -> String {
        String::from_utf8(self.get().into_inner()).expect("output should be formatted as utf8")
    }
}

impl<W: io::Write> io::Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

impl<W: termcolor::WriteColor> termcolor::WriteColor for SharedWriter<W> {
    fn supports_color(&self) -> bool {
        self.0.lock().unwrap().supports_color()
    }

    fn set_color(&mut self, spec: &termcolor::ColorSpec) -> io::Result<()> {
        self.0.lock().unwrap().set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().reset()
    }
}
