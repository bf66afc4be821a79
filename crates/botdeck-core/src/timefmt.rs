use chrono::{DateTime, FixedOffset, Local, Utc};

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FILE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Zone used to render timestamps: a fixed UTC offset, or the host's local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayZone {
    offset: Option<FixedOffset>,
}

impl DisplayZone {
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// `None` when `hours` is outside ±23.
    pub fn fixed_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(|offset| Self {
            offset: Some(offset),
        })
    }

    pub fn format(&self, at: DateTime<Utc>, fmt: &str) -> String {
        match self.offset {
            Some(offset) => at.with_timezone(&offset).format(fmt).to_string(),
            None => at.with_timezone(&Local).format(fmt).to_string(),
        }
    }

    pub fn display(&self, at: DateTime<Utc>) -> String {
        self.format(at, DISPLAY_FORMAT)
    }

    pub fn file_stamp(&self, at: DateTime<Utc>) -> String {
        self.format(at, FILE_STAMP_FORMAT)
    }
}
