//! Notion データベースに日報カードを作成する機能を提供する。
//!
//! 日付・曜日・習慣チェックボックス・名言・カバー画像を持つページを
//! 1 日 1 枚だけ作成する。

mod database;
mod fields;
mod guard;
mod notion;
mod runner;

pub use database::{CardDatabase, DryRun};
pub use notion::NotionClient;
pub use runner::DailyCardRunner;
