//! CSV export of attendance history.
//!
//! Rows are streamed straight from the store cursor into the response body,
//! so memory stays bounded regardless of how wide the requested window is.
//! Format: comma-separated, CRLF line endings, header row present, fields
//! containing commas/quotes/newlines double-quoted with inner quotes doubled.

use axum::body::{Body, Bytes};
use chrono::{NaiveDate, SecondsFormat};
use csv::{Terminator, WriterBuilder};
use futures::StreamExt;
use persistence::entities::HistoryRowEntity;
use persistence::repositories::AttendanceRepository;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Export column order; `runner_id` is the stored opaque identifier.
const HEADER: [&str; 5] = ["id", "run_date", "runner_id", "registered_at", "session_code"];

/// Encodes one record (or the header) as a CSV line.
fn encode_record(fields: &[String]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    Ok(writer
        .into_inner()
        .map_err(|e| e.into_error())?)
}

fn header_line() -> Vec<u8> {
    let fields: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
    encode_record(&fields).expect("static header always encodes")
}

fn row_line(row: &HistoryRowEntity) -> Result<Vec<u8>, csv::Error> {
    encode_record(&[
        row.id.to_string(),
        row.run_date.to_string(),
        row.runner_id.clone(),
        row.registered_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        row.session_code.clone(),
    ])
}

/// Builds a streaming CSV body for the given date window.
///
/// The writer task owns the store cursor; the response consumes the channel.
/// An empty window (including start > end) yields only the header row.
pub fn csv_body(repo: AttendanceRepository, start: NaiveDate, end: NaiveDate) -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(64);

    tokio::spawn(async move {
        if tx.send(Ok(Bytes::from(header_line()))).await.is_err() {
            return;
        }

        let mut rows = Box::pin(repo.stream_history(start, end));
        while let Some(row) = rows.next().await {
            let chunk = match row {
                Ok(row) => match row_line(&row) {
                    Ok(line) => Ok(Bytes::from(line)),
                    Err(err) => {
                        tracing::error!(error = %err, "Failed to encode export row");
                        Err(std::io::Error::other(err))
                    }
                },
                Err(err) => {
                    tracing::error!(error = %err, "Export row fetch failed mid-stream");
                    Err(std::io::Error::other(err))
                }
            };
            let failed = chunk.is_err();
            if tx.send(chunk).await.is_err() || failed {
                return;
            }
        }
    });

    Body::from_stream(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(runner_id: &str) -> HistoryRowEntity {
        HistoryRowEntity {
            id: 1,
            run_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            session_code: "A7K2P".into(),
            runner_id: runner_id.into(),
            registered_at: Utc.with_ymd_and_hms(2025, 3, 10, 6, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_header_line() {
        assert_eq!(
            String::from_utf8(header_line()).unwrap(),
            "id,run_date,runner_id,registered_at,session_code\r\n"
        );
    }

    #[test]
    fn test_plain_row_is_unquoted() {
        let line = String::from_utf8(row_line(&row("12345678")).unwrap()).unwrap();
        assert_eq!(line, "1,2025-03-10,12345678,2025-03-10T06:30:00Z,A7K2P\r\n");
    }

    #[test]
    fn test_comma_in_runner_id_is_quoted() {
        let line = String::from_utf8(row_line(&row("Doe, Jane")).unwrap()).unwrap();
        assert!(line.contains("\"Doe, Jane\""));
        assert!(line.ends_with("\r\n"));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let line = String::from_utf8(row_line(&row(r#"the "flash""#)).unwrap()).unwrap();
        assert!(line.contains(r#""the ""flash""""#));
    }

    #[test]
    fn test_newline_in_runner_id_is_quoted() {
        let line = String::from_utf8(row_line(&row("a\nb")).unwrap()).unwrap();
        assert!(line.contains("\"a\nb\""));
    }
}
