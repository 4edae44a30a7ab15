//! Persistence of graphs, registries, and comparison tables
//!
//! Writes plain-text artifacts for downstream tooling:
//! - Edge lists (`a b` per line)
//! - CSV tables with RFC 4180 quoting
//! - Pretty-printed JSON documents
//!
//! The sink knows nothing about graph or registry types; callers flatten
//! their data into rows first.

use crate::errors::{AppError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// One (author, work) membership of the author table
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorWorkRow<'a> {
    pub author_id: u64,
    pub display_name: &'a str,
    pub work_title: &'a str,
}

/// One work with its author names, in listed order
#[derive(Debug, Clone, PartialEq)]
pub struct WorkRow<'a> {
    pub authors: Vec<&'a str>,
    pub work_title: &'a str,
}

/// Header of the author table
pub const AUTHOR_TABLE_HEADER: [&str; 3] = ["author_id", "display_name", "work_title"];

/// Header of the work table
pub const WORK_TABLE_HEADER: [&str; 2] = ["authors", "work_title"];

/// Quote a CSV field when it contains a delimiter, quote, or line break
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_csv_line<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> Result<()> {
    let line = fields
        .iter()
        .map(|f| csv_escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{}", line)?;
    Ok(())
}

/// Write an edge list, one `a b` pair per line; returns the edge count
pub fn write_edge_list<W, I>(writer: &mut W, edges: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = (u64, u64)>,
{
    let mut count = 0;
    for (a, b) in edges {
        writeln!(writer, "{} {}", a, b)?;
        count += 1;
    }
    Ok(count)
}

/// Read an edge list written by [`write_edge_list`]
///
/// Blank lines and `#` comments are skipped; anything after the first two
/// columns (such as an attribute dictionary) is ignored.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<Vec<(u64, u64)>> {
    let mut edges = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut columns = trimmed.split_whitespace();
        let parse = |column: Option<&str>| -> Result<u64> {
            column
                .and_then(|c| c.parse().ok())
                .ok_or_else(|| AppError::InvalidFormat {
                    message: format!("edge list line {}: {:?}", index + 1, line),
                })
        };

        let a = parse(columns.next())?;
        let b = parse(columns.next())?;
        edges.push((a, b));
    }

    Ok(edges)
}

/// Write the author table; returns the row count
pub fn write_author_table<'a, W, I>(writer: &mut W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = AuthorWorkRow<'a>>,
{
    write_csv_line(writer, &AUTHOR_TABLE_HEADER)?;

    let mut count = 0;
    for row in rows {
        write_csv_line(
            writer,
            &[row.author_id.to_string().as_str(), row.display_name, row.work_title],
        )?;
        count += 1;
    }
    Ok(count)
}

/// Write the work table, author names joined by ", "; returns the row count
pub fn write_work_table<'a, W, I>(writer: &mut W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = WorkRow<'a>>,
{
    write_csv_line(writer, &WORK_TABLE_HEADER)?;

    let mut count = 0;
    for row in rows {
        write_csv_line(writer, &[row.authors.join(", ").as_str(), row.work_title])?;
        count += 1;
    }
    Ok(count)
}

/// Write a generic CSV table; returns the row count
pub fn write_csv<W, H, I>(writer: &mut W, header: &[H], rows: I) -> Result<usize>
where
    W: Write,
    H: AsRef<str>,
    I: IntoIterator<Item = Vec<String>>,
{
    write_csv_line(writer, header)?;

    let mut count = 0;
    for row in rows {
        write_csv_line(writer, &row)?;
        count += 1;
    }
    Ok(count)
}

/// File-backed sink rooted at an output directory
#[derive(Debug, Clone)]
pub struct OutputSink {
    directory: PathBuf,
}

impl OutputSink {
    /// Create the sink, creating the directory if needed
    pub fn create(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    /// Path of a file inside the output directory
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }

    fn open(&self, file_name: &str) -> Result<BufWriter<File>> {
        Ok(BufWriter::new(File::create(self.path(file_name))?))
    }

    /// Persist an edge list
    pub fn edge_list<I>(&self, file_name: &str, edges: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut writer = self.open(file_name)?;
        let count = write_edge_list(&mut writer, edges)?;
        writer.flush()?;

        let path = self.path(file_name);
        info!(path = %path.display(), edges = count, "Edge list written");
        Ok(path)
    }

    /// Persist the author table
    pub fn author_table<'a, I>(&self, file_name: &str, rows: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = AuthorWorkRow<'a>>,
    {
        let mut writer = self.open(file_name)?;
        let count = write_author_table(&mut writer, rows)?;
        writer.flush()?;

        let path = self.path(file_name);
        info!(path = %path.display(), rows = count, "Author table written");
        Ok(path)
    }

    /// Persist the work table
    pub fn work_table<'a, I>(&self, file_name: &str, rows: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = WorkRow<'a>>,
    {
        let mut writer = self.open(file_name)?;
        let count = write_work_table(&mut writer, rows)?;
        writer.flush()?;

        let path = self.path(file_name);
        info!(path = %path.display(), rows = count, "Work table written");
        Ok(path)
    }

    /// Persist a generic CSV table
    pub fn csv<H, I>(&self, file_name: &str, header: &[H], rows: I) -> Result<PathBuf>
    where
        H: AsRef<str>,
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut writer = self.open(file_name)?;
        let count = write_csv(&mut writer, header, rows)?;
        writer.flush()?;

        let path = self.path(file_name);
        info!(path = %path.display(), rows = count, "CSV table written");
        Ok(path)
    }

    /// Persist a JSON document
    pub fn json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let mut writer = self.open(file_name)?;
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;

        let path = self.path(file_name);
        info!(path = %path.display(), "JSON document written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("Smith, J."), "\"Smith, J.\"");
        assert_eq!(csv_escape("The \"best\" paper"), "\"The \"\"best\"\" paper\"");
    }

    #[test]
    fn test_edge_list_round_trip() {
        let mut buffer = Vec::new();
        let written = write_edge_list(&mut buffer, vec![(0, 1), (1, 2)]).unwrap();
        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "0 1\n1 2\n");

        let edges = read_edge_list(buffer.as_slice()).unwrap();
        assert_eq!(edges, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_read_edge_list_tolerates_attributes() {
        let input = "# comment\n0 1 {}\n\n2 3 {'weight': 1}\n";
        let edges = read_edge_list(input.as_bytes()).unwrap();
        assert_eq!(edges, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_read_edge_list_rejects_garbage() {
        let err = read_edge_list("0 x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }

    #[test]
    fn test_author_table_flattening() {
        let rows = vec![
            AuthorWorkRow { author_id: 0, display_name: "Ada", work_title: "Notes, Part 1" },
            AuthorWorkRow { author_id: 0, display_name: "Ada", work_title: "Engines" },
        ];

        let mut buffer = Vec::new();
        let count = write_author_table(&mut buffer, rows).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "author_id,display_name,work_title");
        assert_eq!(lines[1], "0,Ada,\"Notes, Part 1\"");
        assert_eq!(lines[2], "0,Ada,Engines");
    }

    #[test]
    fn test_work_table_joins_authors() {
        let rows = vec![WorkRow { authors: vec!["A", "B"], work_title: "W" }];
        let mut buffer = Vec::new();
        write_work_table(&mut buffer, rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.ends_with("\"A, B\",W\n"));
    }

    #[test]
    fn test_output_sink_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::create(dir.path().join("out")).unwrap();

        let path = sink.edge_list("graph.edgelist", vec![(3, 4)]).unwrap();
        assert!(path.exists());
        let file = std::io::BufReader::new(File::open(&path).unwrap());
        assert_eq!(read_edge_list(file).unwrap(), vec![(3, 4)]);

        let path = sink.json("table.json", &serde_json::json!({"rows": 0})).unwrap();
        let body = std::fs::read_to_string(path).unwrap();
        assert!(body.contains("\"rows\": 0"));

        let header = ["graph", "degree", "count"];
        sink.csv("dist.csv", &header, vec![vec!["reference".into(), "1".into(), "2".into()]])
            .unwrap();
        let body = std::fs::read_to_string(sink.path("dist.csv")).unwrap();
        assert_eq!(body, "graph,degree,count\nreference,1,2\n");
    }
}
