//! Header-aware CSV row stream over an async byte reader.
//!
//! Record boundaries, quoting and escaped quotes are left to `csv_async`.
//! Fields are read as raw bytes and decoded lossily, so invalid UTF-8 becomes
//! U+FFFD instead of failing the import.

use csv_async::{AsyncReader, AsyncReaderBuilder, ByteRecord};
use tokio::io::AsyncRead;

use crate::error::SourceError;
use crate::row::RawRow;

const BOM: char = '\u{feff}';

pub struct CsvRowStream<R> {
    reader: AsyncReader<R>,
    headers: Option<Vec<String>>,
    record: ByteRecord,
}

impl<R> CsvRowStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .create_reader(reader);
        Self {
            reader,
            headers: None,
            record: ByteRecord::new(),
        }
    }

    /// Header names, once the first row has been requested. `None` when the
    /// input had no header line.
    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref().filter(|h| !h.is_empty())
    }

    /// Returns the next data row, or `None` at end of input. Blank lines are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Csv`] if a record is malformed or the body
    /// stream fails mid-read.
    pub async fn next_row(&mut self) -> Result<Option<RawRow>, SourceError> {
        if self.headers.is_none() {
            self.read_headers().await?;
        }

        if !self.reader.read_byte_record(&mut self.record).await? {
            return Ok(None);
        }

        let headers = self.headers.as_deref().unwrap_or_default();
        Ok(Some(RawRow::from_record(
            headers,
            self.record.iter().map(String::from_utf8_lossy),
        )))
    }

    async fn read_headers(&mut self) -> Result<(), SourceError> {
        let mut headers: Vec<String> = self
            .reader
            .byte_headers()
            .await?
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();

        if let Some(first) = headers.first_mut() {
            if first.starts_with(BOM) {
                first.drain(..BOM.len_utf8());
            }
        }

        tracing::debug!(columns = headers.len(), "read CSV header");
        self.headers = Some(headers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn rows_from(text: &str) -> CsvRowStream<Cursor<Vec<u8>>> {
        CsvRowStream::new(Cursor::new(text.as_bytes().to_vec()))
    }

    async fn collect(mut rows: CsvRowStream<Cursor<Vec<u8>>>) -> Vec<RawRow> {
        let mut out = Vec::new();
        while let Some(row) = rows.next_row().await.unwrap() {
            out.push(row);
        }
        out
    }

    #[tokio::test]
    async fn maps_values_by_header_name() {
        let rows = collect(rows_from("nom_station,etat_pdc\nGare,en service\n")).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("nom_station"), Some("Gare"));
        assert_eq!(rows[0].get("etat_pdc"), Some("en service"));
    }

    #[tokio::test]
    async fn header_only_input_has_no_rows() {
        let mut rows = rows_from("a,b,c\n");
        assert!(rows.next_row().await.unwrap().is_none());
        assert_eq!(rows.headers().unwrap(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn quoted_field_may_contain_commas_and_quotes() {
        let rows = collect(rows_from(
            "nom_station,observations\n\"Mairie, parking\",\"dit \"\"bis\"\"\"\n",
        ))
        .await;
        assert_eq!(rows[0].get("nom_station"), Some("Mairie, parking"));
        assert_eq!(rows[0].get("observations"), Some("dit \"bis\""));
    }

    #[tokio::test]
    async fn quoted_field_may_span_lines() {
        let rows = collect(rows_from(
            "nom_station,observations\nGare,\"ligne 1\nligne 2\"\nPort,rien\n",
        ))
        .await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("observations"), Some("ligne 1\nligne 2"));
        assert_eq!(rows[1].get("nom_station"), Some("Port"));
    }

    #[tokio::test]
    async fn quoted_field_keeps_inner_carriage_return() {
        let rows = collect(rows_from(
            "nom_station,observations\r\nGare,\"ligne 1\r\nligne 2\"\r\n",
        ))
        .await;
        assert_eq!(rows[0].get("observations"), Some("ligne 1\r\nligne 2"));
    }

    #[tokio::test]
    async fn stray_quote_in_unquoted_field_does_not_swallow_later_rows() {
        let rows = collect(rows_from(
            "nom_station,observations\nA,ecran 12\" tactile\nB,ok\nC,ok\n",
        ))
        .await;
        let names: Vec<_> = rows.iter().map(|r| r.get("nom_station")).collect();
        assert_eq!(names, vec![Some("A"), Some("B"), Some("C")]);
        assert_eq!(rows[0].get("observations"), Some("ecran 12\" tactile"));
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let rows = collect(rows_from("a,b\n\n1,2\n\n3,4\n")).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("a"), Some("3"));
    }

    #[tokio::test]
    async fn short_row_leaves_columns_absent() {
        let rows = collect(rows_from("a,b,c\n1\n")).await;
        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[0].get("c"), None);
    }

    #[tokio::test]
    async fn leading_byte_order_mark_is_stripped() {
        let rows = collect(rows_from("\u{feff}id,nom\nX,Y\n")).await;
        assert_eq!(rows[0].get("id"), Some("X"));
    }

    #[tokio::test]
    async fn crlf_line_endings_are_handled() {
        let rows = collect(rows_from("a,b\r\n1,2\r\n3,4\r\n")).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b"), Some("2"));
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let mut rows = CsvRowStream::new(Cursor::new(b"nom\ncaf\xe9\n".to_vec()));
        let row = rows.next_row().await.unwrap().unwrap();
        assert_eq!(row.get("nom"), Some("caf\u{fffd}"));
    }

    #[tokio::test]
    async fn empty_input_has_no_header_and_no_rows() {
        let mut rows = rows_from("");
        assert!(rows.next_row().await.unwrap().is_none());
        assert!(rows.headers().is_none());
    }
}
