//! 設定されたタイムゾーンでの「今日」を求める。

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// ある時点をタイムゾーンで解釈した日付。
///
/// 日付と曜日は必ず同じ時点から求める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    date: NaiveDate,
}

impl ResolvedDate {
    /// 現在時刻を `tz` で解釈する。
    pub fn now(tz: Tz) -> Self {
        Self::at(Utc::now(), tz)
    }

    pub fn at(instant: DateTime<Utc>, tz: Tz) -> Self {
        let local = instant.with_timezone(&tz);
        Self {
            date: local.date_naive(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `YYYY-MM-DD` 形式の日付。
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// 英語の曜日名 (例: `Monday`)。
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }
}
