use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::fields::{RecordFields, page_properties};

/// 作成されたページ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub id: String,
    pub url: String,
}

/// 日報カードを保存するデータベースへの操作。
#[async_trait]
pub trait CardDatabase: Send + Sync {
    /// 日付プロパティが `date` に一致するページ数を返す (最大 1)。
    async fn count_by_date(&self, date_field: &str, date: NaiveDate) -> Result<usize>;

    /// プロパティとカバー画像を指定してページを作成する。
    async fn create_page(&self, fields: &RecordFields, cover_url: &str) -> Result<CreatedPage>;

    /// ページ本文に quote ブロックを 1 つ追加する。
    async fn append_quote_block(&self, page_id: &str, text: &str) -> Result<()>;
}

/// 参照系だけを実データベースに流し、書き込みはログに出すだけのラッパー。
pub struct DryRun<D> {
    inner: D,
}

impl<D> DryRun<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: CardDatabase> CardDatabase for DryRun<D> {
    async fn count_by_date(&self, date_field: &str, date: NaiveDate) -> Result<usize> {
        self.inner.count_by_date(date_field, date).await
    }

    async fn create_page(&self, fields: &RecordFields, cover_url: &str) -> Result<CreatedPage> {
        tracing::info!(
            properties = fields.len(),
            cover_url,
            "Dry run: skipping page creation"
        );
        tracing::debug!(properties = ?page_properties(fields), "Dry run: page properties");
        Ok(CreatedPage {
            id: "dry-run".to_string(),
            url: String::new(),
        })
    }

    async fn append_quote_block(&self, page_id: &str, text: &str) -> Result<()> {
        tracing::info!(page_id, text, "Dry run: skipping quote block");
        Ok(())
    }
}
