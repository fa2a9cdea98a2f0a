use radcore::prelude::ProductOutput;
use radcore::product::ProductSink;
use serde_json::json;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Appends one JSON object per exported product.
///
/// Point records are written in full; volumes are summarised, since writing
/// volume files belongs to the product writers.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ProductSink for JsonLinesSink<W> {
    type Error = io::Error;

    fn export(&mut self, step: &str, output: &ProductOutput) -> Result<(), Self::Error> {
        let line = match output {
            ProductOutput::Point(record) => json!({
                "step": step,
                "format": output.format(),
                "record": record,
            }),
            ProductOutput::Volume(volume) => json!({
                "step": step,
                "format": output.format(),
                "rays": volume.nrays(),
                "bins": volume.nbins(),
                "fields": volume.fields.keys().collect::<Vec<_>>(),
            }),
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")
    }
}
