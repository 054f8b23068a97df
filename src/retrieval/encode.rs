//! Response encoders.

use serde::{Deserialize, Serialize};

use crate::retrieval::{OutputFormat, RetrievalError};

pub const CSV_HEADER: [&str; 3] = ["Timestamp", "Level", "Message"];

/// JSON body of a retrieval response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLines {
    pub lines: Vec<String>,
}

/// An encoded response body with its content metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub content_type: &'static str,
    /// Download filename, if the body should be served as an attachment.
    pub attachment: Option<&'static str>,
    pub body: Vec<u8>,
}

pub fn encode(lines: Vec<String>, format: OutputFormat) -> Result<Encoded, RetrievalError> {
    match format {
        OutputFormat::Json => {
            let mut body = serde_json::to_vec(&LogLines { lines })?;
            body.push(b'\n');
            Ok(json(body))
        }
        OutputFormat::JsonPretty => {
            let mut body = serde_json::to_vec_pretty(&LogLines { lines })?;
            body.push(b'\n');
            Ok(json(body))
        }
        OutputFormat::Csv => Ok(Encoded {
            content_type: "text/csv",
            attachment: Some("logs.csv"),
            body: encode_csv(&lines)?,
        }),
        OutputFormat::Text => {
            let mut body = String::new();
            for line in &lines {
                body.push_str(line);
                body.push('\n');
            }
            Ok(Encoded {
                content_type: "text/plain",
                attachment: None,
                body: body.into_bytes(),
            })
        }
    }
}

fn json(body: Vec<u8>) -> Encoded {
    Encoded {
        content_type: "application/json",
        attachment: None,
        body,
    }
}

/// Header plus one `Timestamp,Level,Message` row per line that splits into
/// date, time, level and message. Other lines are skipped.
pub fn encode_csv(lines: &[String]) -> Result<Vec<u8>, RetrievalError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for line in lines {
        let parts: Vec<&str> = line.splitn(4, ' ').collect();
        let &[date, time, level, message] = parts.as_slice() else {
            continue;
        };
        let timestamp = format!("{} {}", date, time);
        let level = level.trim_matches(|c| c == '[' || c == ']');
        writer.write_record([timestamp.as_str(), level, message])?;
    }
    writer
        .into_inner()
        .map_err(|e| RetrievalError::Csv(e.into_error().into()))
}
