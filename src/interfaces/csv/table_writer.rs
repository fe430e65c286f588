use crate::error::Result;
use crate::infrastructure::table::TableRow;
use std::io::Write;

/// Renders configuration rows as `id,priority,disabled,generous` CSV.
pub struct TableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TableWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().has_headers(true).from_writer(sink);
        Self { writer }
    }

    pub fn write_rows(&mut self, rows: impl IntoIterator<Item = TableRow>) -> Result<()> {
        let mut any = false;
        for row in rows {
            self.writer.serialize(row)?;
            any = true;
        }
        if !any {
            self.writer
                .write_record(["id", "priority", "disabled", "generous"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
