//! binlog event layout: type codes, headers and the event bodies the
//! row scanner consumes
mod fde;
mod header;
mod rows;
mod table_map;

pub use fde::PostHeaderSizes;
pub use header::{EventHeader, EventHeaderFlags};
pub use rows::RowsEvent;
pub use table_map::TableMap;

/// the binlog magic word, first four bytes of every binlog file
pub const BINLOG_MAGIC: [u8; 4] = [0xfe, b'b', b'i', b'n'];

/// byte offset of the type code within an event buffer
pub const TYPE_CODE_OFFSET: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogEventType {
    Unknown,
    StartEventV3,
    QueryEvent,
    StopEvent,
    RotateEvent,
    IntvarEvent,
    LoadEvent,
    SlaveEvent,
    CreateFileEvent,
    AppendBlockEvent,
    ExecLoadEvent,
    DeleteFileEvent,
    NewLoadEvent,
    RandEvent,
    UserVarEvent,
    FormatDescriptionEvent,
    XidEvent,
    BeginLoadQueryEvent,
    ExecuteLoadQueryEvent,
    TableMapEvent,
    WriteRowsEventV0,
    UpdateRowsEventV0,
    DeleteRowsEventV0,
    WriteRowsEventV1,
    UpdateRowsEventV1,
    DeleteRowsEventV1,
    IncidentEvent,
    HeartbeatLogEvent,
    IgnorableLogEvent,
    RowsQueryLogEvent,
    WriteRowsEventV2,
    UpdateRowsEventV2,
    DeleteRowsEventV2,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogEventTypeCode(pub u8);

impl From<u8> for LogEventType {
    fn from(code: u8) -> LogEventType {
        match code {
            0 => LogEventType::Unknown,
            1 => LogEventType::StartEventV3,
            2 => LogEventType::QueryEvent,
            3 => LogEventType::StopEvent,
            4 => LogEventType::RotateEvent,
            5 => LogEventType::IntvarEvent,
            6 => LogEventType::LoadEvent,
            7 => LogEventType::SlaveEvent,
            8 => LogEventType::CreateFileEvent,
            9 => LogEventType::AppendBlockEvent,
            10 => LogEventType::ExecLoadEvent,
            11 => LogEventType::DeleteFileEvent,
            12 => LogEventType::NewLoadEvent,
            13 => LogEventType::RandEvent,
            14 => LogEventType::UserVarEvent,
            15 => LogEventType::FormatDescriptionEvent,
            16 => LogEventType::XidEvent,
            17 => LogEventType::BeginLoadQueryEvent,
            18 => LogEventType::ExecuteLoadQueryEvent,
            19 => LogEventType::TableMapEvent,
            // used in 5.1.0 ~ 5.1.17
            20 => LogEventType::WriteRowsEventV0,
            21 => LogEventType::UpdateRowsEventV0,
            22 => LogEventType::DeleteRowsEventV0,
            // used in 5.1.18 ~ 5.6.x
            23 => LogEventType::WriteRowsEventV1,
            24 => LogEventType::UpdateRowsEventV1,
            25 => LogEventType::DeleteRowsEventV1,
            26 => LogEventType::IncidentEvent,
            27 => LogEventType::HeartbeatLogEvent,
            28 => LogEventType::IgnorableLogEvent,
            29 => LogEventType::RowsQueryLogEvent,
            // used after 5.6.x
            30 => LogEventType::WriteRowsEventV2,
            31 => LogEventType::UpdateRowsEventV2,
            32 => LogEventType::DeleteRowsEventV2,
            _ => LogEventType::Invalid,
        }
    }
}

impl From<LogEventTypeCode> for LogEventType {
    fn from(type_code: LogEventTypeCode) -> LogEventType {
        LogEventType::from(type_code.0)
    }
}

impl From<LogEventType> for LogEventTypeCode {
    fn from(event_type: LogEventType) -> LogEventTypeCode {
        match event_type {
            LogEventType::Unknown => LogEventTypeCode(0),
            LogEventType::StartEventV3 => LogEventTypeCode(1),
            LogEventType::QueryEvent => LogEventTypeCode(2),
            LogEventType::StopEvent => LogEventTypeCode(3),
            LogEventType::RotateEvent => LogEventTypeCode(4),
            LogEventType::IntvarEvent => LogEventTypeCode(5),
            LogEventType::LoadEvent => LogEventTypeCode(6),
            LogEventType::SlaveEvent => LogEventTypeCode(7),
            LogEventType::CreateFileEvent => LogEventTypeCode(8),
            LogEventType::AppendBlockEvent => LogEventTypeCode(9),
            LogEventType::ExecLoadEvent => LogEventTypeCode(10),
            LogEventType::DeleteFileEvent => LogEventTypeCode(11),
            LogEventType::NewLoadEvent => LogEventTypeCode(12),
            LogEventType::RandEvent => LogEventTypeCode(13),
            LogEventType::UserVarEvent => LogEventTypeCode(14),
            LogEventType::FormatDescriptionEvent => LogEventTypeCode(15),
            LogEventType::XidEvent => LogEventTypeCode(16),
            LogEventType::BeginLoadQueryEvent => LogEventTypeCode(17),
            LogEventType::ExecuteLoadQueryEvent => LogEventTypeCode(18),
            LogEventType::TableMapEvent => LogEventTypeCode(19),
            LogEventType::WriteRowsEventV0 => LogEventTypeCode(20),
            LogEventType::UpdateRowsEventV0 => LogEventTypeCode(21),
            LogEventType::DeleteRowsEventV0 => LogEventTypeCode(22),
            LogEventType::WriteRowsEventV1 => LogEventTypeCode(23),
            LogEventType::UpdateRowsEventV1 => LogEventTypeCode(24),
            LogEventType::DeleteRowsEventV1 => LogEventTypeCode(25),
            LogEventType::IncidentEvent => LogEventTypeCode(26),
            LogEventType::HeartbeatLogEvent => LogEventTypeCode(27),
            LogEventType::IgnorableLogEvent => LogEventTypeCode(28),
            LogEventType::RowsQueryLogEvent => LogEventTypeCode(29),
            LogEventType::WriteRowsEventV2 => LogEventTypeCode(30),
            LogEventType::UpdateRowsEventV2 => LogEventTypeCode(31),
            LogEventType::DeleteRowsEventV2 => LogEventTypeCode(32),
            // pseudo invalid code
            LogEventType::Invalid => LogEventTypeCode(99),
        }
    }
}

impl LogEventType {
    /// one of the nine rows-event variants
    pub fn is_rows_event(self) -> bool {
        BinlogOp::from_event_type(self).is_some()
    }

    /// update events of v1/v2 carry the after-image bitmap
    pub fn is_update_with_after_image(self) -> bool {
        matches!(
            self,
            LogEventType::UpdateRowsEventV1 | LogEventType::UpdateRowsEventV2
        )
    }
}

/// the data-change operation a rows event represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinlogOp {
    Insert,
    Update,
    Delete,
}

impl Default for BinlogOp {
    fn default() -> Self {
        BinlogOp::Insert
    }
}

impl BinlogOp {
    pub fn from_event_type(event_type: LogEventType) -> Option<BinlogOp> {
        let op = match event_type {
            LogEventType::WriteRowsEventV0
            | LogEventType::WriteRowsEventV1
            | LogEventType::WriteRowsEventV2 => BinlogOp::Insert,
            LogEventType::UpdateRowsEventV0
            | LogEventType::UpdateRowsEventV1
            | LogEventType::UpdateRowsEventV2 => BinlogOp::Update,
            LogEventType::DeleteRowsEventV0
            | LogEventType::DeleteRowsEventV1
            | LogEventType::DeleteRowsEventV2 => BinlogOp::Delete,
            _ => return None,
        };
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip() {
        for code in 0u8..=32 {
            let et = LogEventType::from(code);
            assert_eq!(code, LogEventTypeCode::from(et).0);
        }
        assert_eq!(LogEventType::Invalid, LogEventType::from(99));
    }

    #[test]
    fn test_rows_event_predicate() {
        for code in (20u8..=25).chain(30..=32) {
            assert!(LogEventType::from(code).is_rows_event());
        }
        assert!(!LogEventType::TableMapEvent.is_rows_event());
        assert!(!LogEventType::QueryEvent.is_rows_event());
    }

    #[test]
    fn test_op_mapping() {
        assert_eq!(
            Some(BinlogOp::Insert),
            BinlogOp::from_event_type(LogEventType::WriteRowsEventV2)
        );
        assert_eq!(
            Some(BinlogOp::Update),
            BinlogOp::from_event_type(LogEventType::UpdateRowsEventV0)
        );
        assert_eq!(
            Some(BinlogOp::Delete),
            BinlogOp::from_event_type(LogEventType::DeleteRowsEventV1)
        );
        assert_eq!(None, BinlogOp::from_event_type(LogEventType::XidEvent));
    }
}
