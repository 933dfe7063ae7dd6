//! CSV result writer.
//!
//! One row per [`LocationMatch`]:
//!
//! ```csv
//! id,status,links,start_fraction,end_fraction,reliability,path_length,upstream,downstream
//! a,MATCH,1:0:0.05:1|5:0:0:1,0.05,1,95.39,250,,4|5
//! b,NO_PATH,,0,0,0,0,,
//! ```
//!
//! `links` lists `link_id:reversed:start_fraction:end_fraction` in travel
//! order, separated by `|`.  `upstream` / `downstream` are `|`-separated link
//! ids; an empty cell means no search was requested.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use lm_core::LinkId;
use lm_match::LocationMatch;

use crate::BatchResult;

const HEADER: [&str; 9] = [
    "id",
    "status",
    "links",
    "start_fraction",
    "end_fraction",
    "reliability",
    "path_length",
    "upstream",
    "downstream",
];

/// Streams match results to CSV.
pub struct CsvResultWriter<W: Write> {
    writer:   Writer<W>,
    finished: bool,
}

impl CsvResultWriter<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> BatchResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvResultWriter<W> {
    pub fn from_writer(inner: W) -> BatchResult<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer, finished: false })
    }

    pub fn write_result(&mut self, result: &LocationMatch) -> BatchResult<()> {
        let links = result
            .matched_links
            .iter()
            .map(|l| format!("{}:{}:{}:{}", l.link_id.0, l.reversed as u8, l.start_fraction, l.end_fraction))
            .collect::<Vec<_>>()
            .join("|");

        self.writer.write_record(&[
            result.id.clone(),
            result.status.to_string(),
            links,
            result.start_fraction.to_string(),
            result.end_fraction.to_string(),
            result.reliability.to_string(),
            result.path_length.to_string(),
            join_links(result.upstream_link_ids.as_deref()),
            join_links(result.downstream_link_ids.as_deref()),
        ])?;
        Ok(())
    }

    pub fn write_results(&mut self, results: &[LocationMatch]) -> BatchResult<()> {
        for result in results {
            self.write_result(result)?;
        }
        Ok(())
    }

    /// Flush buffered rows.  Idempotent.
    pub fn finish(&mut self) -> BatchResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> BatchResult<W> {
        self.finish()?;
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }
}

fn join_links(links: Option<&[LinkId]>) -> String {
    links
        .unwrap_or_default()
        .iter()
        .map(|id| id.0.to_string())
        .collect::<Vec<_>>()
        .join("|")
}
