use std::path::PathBuf;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};
use thiserror::Error;

use crate::config::Config;

/// Message bodies may carry an indirection prefix instead of inline data:
/// `file:<path>` points at a file under the configured base directory and
/// `mysql:<table>/<id>` at the `data` column of a row. Anything else is a
/// plain text message.
#[derive(Debug, PartialEq, Eq)]
pub enum Payload<'a> {
    Plain,
    File(&'a str),
    Mysql { table: &'a str, id: &'a str },
}

impl<'a> Payload<'a> {
    pub fn classify(body: &'a str) -> Result<Self, PayloadError> {
        let Some((prefix, rest)) = body.split_once(':') else {
            return Ok(Payload::Plain);
        };
        match prefix {
            "file" => Ok(Payload::File(rest)),
            "mysql" => {
                let Some((table, id)) = rest.split_once('/') else {
                    return Err(PayloadError::BadRecordName);
                };
                if table.is_empty() || !table.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
                {
                    return Err(PayloadError::BadRecordName);
                }
                Ok(Payload::Mysql { table, id })
            }
            _ => Ok(Payload::Plain),
        }
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    /// Enqueue-time validation: the referenced file does not exist.
    #[error("File not exists!")]
    SourceMissing,
    /// Fetch-time: the file existed at enqueue but is gone now.
    #[error("File not found!")]
    FileVanished,
    #[error("Record name not valid!")]
    BadRecordName,
    #[error("Record not exists!")]
    RecordMissing,
    #[error("mysql is not configured")]
    MysqlDisabled,
    #[error("mysql error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("i/o error: {0}")]
    Io(std::io::Error),
}

/// A payload resolved for the client.
pub enum Materialized {
    Plain(String),
    Bytes { content_type: String, data: Vec<u8> },
}

/// Resolves `file:` and `mysql:` payloads. The MySQL pool is created lazily,
/// so nothing touches the database until the first `mysql:` message.
pub struct PayloadStore {
    base_path: PathBuf,
    pool: Option<MySqlPool>,
}

impl PayloadStore {
    pub fn new(config: &Config) -> Self {
        let pool = if config.mysql_url.is_empty() {
            None
        } else {
            match MySqlPoolOptions::new().connect_lazy(&config.mysql_url) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!("invalid mysql_url, mysql payloads disabled: {}", e);
                    None
                }
            }
        };
        Self {
            base_path: PathBuf::from(&config.file_base_path),
            pool,
        }
    }

    /// Enqueue-time check that an indirect payload actually resolves.
    pub async fn validate(&self, body: &str) -> Result<(), PayloadError> {
        match Payload::classify(body)? {
            Payload::Plain => Ok(()),
            Payload::File(path) => {
                let exists = tokio::fs::try_exists(self.base_path.join(path))
                    .await
                    .map_err(PayloadError::Io)?;
                if exists {
                    Ok(())
                } else {
                    Err(PayloadError::SourceMissing)
                }
            }
            Payload::Mysql { table, id } => {
                self.fetch_record(table, id).await?;
                Ok(())
            }
        }
    }

    /// Fetch-time resolution of a payload into response data.
    pub async fn materialize(&self, body: &str) -> Result<Materialized, PayloadError> {
        match Payload::classify(body)? {
            Payload::Plain => Ok(Materialized::Plain(body.to_string())),
            Payload::File(path) => {
                let full = self.base_path.join(path);
                let data = tokio::fs::read(&full).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        PayloadError::FileVanished
                    } else {
                        PayloadError::Io(e)
                    }
                })?;
                let content_type = mime_guess::from_path(&full)
                    .first_or_octet_stream()
                    .to_string();
                Ok(Materialized::Bytes { content_type, data })
            }
            Payload::Mysql { table, id } => {
                let data = self.fetch_record(table, id).await?;
                Ok(Materialized::Bytes {
                    content_type: "text/plain".to_string(),
                    data,
                })
            }
        }
    }

    async fn fetch_record(&self, table: &str, id: &str) -> Result<Vec<u8>, PayloadError> {
        let pool = self.pool.as_ref().ok_or(PayloadError::MysqlDisabled)?;
        // The table name was validated as a bare identifier in classify();
        // the id is bound as a parameter.
        let sql = format!("SELECT data FROM {} WHERE id = ?", table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(PayloadError::RecordMissing)?;
        Ok(row.try_get::<Vec<u8>, _>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_plain_and_prefixed() {
        assert_eq!(Payload::classify("hello").unwrap(), Payload::Plain);
        // Unknown prefixes are plain messages that happen to contain a colon.
        assert_eq!(Payload::classify("urn:x:y").unwrap(), Payload::Plain);
        assert_eq!(
            Payload::classify("file:reports/a.pdf").unwrap(),
            Payload::File("reports/a.pdf")
        );
        assert_eq!(
            Payload::classify("mysql:events/42").unwrap(),
            Payload::Mysql {
                table: "events",
                id: "42"
            }
        );
    }

    #[test]
    fn classify_rejects_bad_record_names() {
        assert!(matches!(
            Payload::classify("mysql:no_slash"),
            Err(PayloadError::BadRecordName)
        ));
        assert!(matches!(
            Payload::classify("mysql:bad-table!/1"),
            Err(PayloadError::BadRecordName)
        ));
        assert!(matches!(
            Payload::classify("mysql:/1"),
            Err(PayloadError::BadRecordName)
        ));
    }
}
