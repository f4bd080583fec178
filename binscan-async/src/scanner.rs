//! row-level view over an event stream
use crate::binlog::Binlog;
use crate::error::{Error, Result};
use binscan_core::binlog::{BinlogOp, LogEventType, PostHeaderSizes, RowsEvent, TableMap};
use binscan_core::col::BinlogValue;
use binscan_core::row::read_bin_row;
use binscan_core::scan::FromRow;
use binscan_core::time;
use binscan_core::{bitmap, Error as CoreError};
use chrono::FixedOffset;

/// rows-event flag bit marking the end of the enclosing statement;
/// evicts the table-map cache before the next rows event
const STMT_END_FLAG: u16 = 0x01;

/// stateful scanner surfacing the data-change stream of a binlog as
/// one row at a time
///
/// correlates TABLE_MAP_EVENT entries with the rows events that follow
/// them and decodes column values with MySQL type semantics preserved.
/// The timezone governs DATE/DATETIME/TIMESTAMP materialization and
/// defaults to UTC.
#[derive(Debug)]
pub struct BinlogScanner<B> {
    binlog: B,
    filters: Vec<String>,
    tz: FixedOffset,
    header_sizes: PostHeaderSizes,
    tables: Vec<TableMap>,
    rows: RowsEvent,
    row: Option<Vec<BinlogValue>>,
    err: Option<Error>,
}

impl<B: Binlog> BinlogScanner<B> {
    /// wrap an event source
    ///
    /// `filters` are table-name prefixes matched against
    /// `database.table.` (note the trailing dot); an empty list admits
    /// every table
    pub fn new(binlog: B, filters: Vec<String>, tz: Option<FixedOffset>) -> BinlogScanner<B> {
        BinlogScanner {
            binlog,
            filters,
            tz: tz.unwrap_or_else(time::utc),
            header_sizes: PostHeaderSizes::default(),
            tables: Vec::with_capacity(2),
            rows: RowsEvent::default(),
            row: None,
            err: None,
        }
    }

    /// advance to the next row
    ///
    /// false is end-of-stream or a fatal error; check err(). After a
    /// fatal error every further call returns false.
    pub async fn next(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.next_row() {
            return true;
        }
        if self.err.is_some() {
            return false;
        }
        self.next_rows_event().await && self.next_row()
    }

    /// operation of the current row
    pub fn op(&self) -> BinlogOp {
        self.rows.op
    }

    /// database name of the current row
    pub fn database(&self) -> &str {
        self.rows.table.database.as_str()
    }

    /// table name of the current row
    pub fn table(&self) -> &str {
        self.rows.table.table.as_str()
    }

    /// first fatal error, if any
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// coerce the current row into a destination tuple
    pub fn scan<T: FromRow>(&self) -> Result<T> {
        let row = match self.row.as_ref() {
            Some(row) => row,
            None => return Err(Error::ScanNoRow),
        };
        if T::WIDTH != row.len() {
            return Err(Error::ScanArity {
                expected: row.len(),
                actual: T::WIDTH,
            });
        }
        Ok(T::from_row(row)?)
    }

    /// close the underlying event source
    pub async fn close(&mut self) -> Result<()> {
        self.binlog.close().await
    }

    /// decode one row out of the pending rows event
    fn next_row(&mut self) -> bool {
        if self.rows.data.is_empty() {
            return false;
        }
        let mut row = vec![BinlogValue::Null; self.rows.columns as usize];
        let types = self.rows.table.types.clone();

        if !bitmap::all_zero(self.rows.bitmap1.as_ref()) {
            let bm = self.rows.bitmap1.clone();
            if let Err(e) =
                read_bin_row(&mut row, bm.as_ref(), &mut self.rows.data, types.as_ref(), self.tz)
            {
                self.err = Some(e.into());
                return false;
            }
        }
        // the update after-image overwrites the before-image in place;
        // columns it does not carry keep their before-image value
        if !bitmap::all_zero(self.rows.bitmap2.as_ref()) {
            let bm = self.rows.bitmap2.clone();
            if let Err(e) =
                read_bin_row(&mut row, bm.as_ref(), &mut self.rows.data, types.as_ref(), self.tz)
            {
                self.err = Some(e.into());
                return false;
            }
        }

        self.row = Some(row);
        true
    }

    /// read events until the next decodable rows event
    async fn next_rows_event(&mut self) -> bool {
        // the end-of-statement flag acts when the next rows event is
        // looked for, not when its own event is drained
        if self.rows.flags & STMT_END_FLAG != 0 {
            self.tables.clear();
        }
        loop {
            let data = match self.binlog.read_event().await {
                Ok(Some(data)) => data,
                Ok(None) => return false,
                Err(e) => {
                    self.err = Some(e);
                    return false;
                }
            };
            if data.len() <= binscan_core::binlog::TYPE_CODE_OFFSET {
                self.err = Some(Error::BadEvent);
                return false;
            }
            match LogEventType::from(data[binscan_core::binlog::TYPE_CODE_OFFSET]) {
                LogEventType::FormatDescriptionEvent => {
                    match PostHeaderSizes::from_event(&data) {
                        Ok(sizes) => self.header_sizes = sizes,
                        Err(e) => return self.fail(e),
                    }
                }
                LogEventType::TableMapEvent => {
                    let tm = match TableMap::read_from_event(&data, &self.header_sizes) {
                        Ok(tm) => tm,
                        Err(e) => return self.fail(e),
                    };
                    if self.admits(&tm.name) {
                        log::trace!("caching table map {} (id {})", tm.name, tm.id);
                        self.tables.push(tm);
                    }
                }
                t if t.is_rows_event() => {
                    match RowsEvent::read_from_event(&data, &self.header_sizes, &self.tables) {
                        Ok(rows) => {
                            self.rows = rows;
                            // no cached table map, skip the event
                            if self.rows.columns == 0 {
                                continue;
                            }
                            return true;
                        }
                        Err(e) => return self.fail(e),
                    }
                }
                // everything else is not row-relevant
                _ => (),
            }
        }
    }

    fn admits(&self, name: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        self.filters.iter().any(|f| name.starts_with(f.as_str()))
    }

    fn fail(&mut self, e: CoreError) -> bool {
        self.err = Some(e.into());
        false
    }
}
