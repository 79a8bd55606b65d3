//! CSV 表文件基础设施
//!
//! 每次读取都把整个文件载入内存，每次写入都整体覆盖文件内容。
//! 文件需要预先存在，这里不会创建或删除它。

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("unable to open table file: {0}")]
    Open(#[from] io::Error),
    #[error("unable to parse table file: {0}")]
    Parse(#[source] csv::Error),
    #[error("unable to write table file: {0}")]
    Write(#[source] csv::Error),
}

/// 内存中的表：表头加数据行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Option<StringRecord>,
    pub rows: Vec<StringRecord>,
}

#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
}

impl TableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Table, TableError> {
        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(file);

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => Some(record.map_err(classify_read_error)?),
            None => None,
        };
        let rows = records
            .collect::<Result<Vec<_>, _>>()
            .map_err(classify_read_error)?;

        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(Table { header, rows })
    }

    pub fn write(&self, header: &StringRecord, rows: &[StringRecord]) -> Result<(), TableError> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer.write_record(header).map_err(TableError::Write)?;
        for row in rows {
            writer.write_record(row).map_err(TableError::Write)?;
        }
        writer
            .flush()
            .map_err(|e| TableError::Write(csv::Error::from(e)))?;

        debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

fn classify_read_error(err: csv::Error) -> TableError {
    if err.is_io_error() {
        TableError::Open(io::Error::new(io::ErrorKind::Other, err))
    } else {
        TableError::Parse(err)
    }
}
