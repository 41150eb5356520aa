//! Notion API との連携機能を提供する。

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use notion_client::{
    endpoints::{
        Client,
        blocks::append::request::AppendBlockChildrenRequest,
        databases::query::request::{
            DateCondition, Filter, FilterType, PropertyCondition, QueryDatabaseRequest,
        },
        pages::create::request::CreateAPageRequest,
    },
    objects::{
        block::{Block, BlockType, QuoteValue, TextColor},
        file::{ExternalFile, File},
        parent::Parent,
    },
};

use super::database::{CardDatabase, CreatedPage};
use super::fields::{RecordFields, page_properties, rich_text};
use crate::config::NotionCredentials;

/// Notion API クライアントのラッパー。
pub struct NotionClient {
    /// notion-client のクライアント
    client: Client,
    /// 日報を保存するデータベース ID
    database_id: String,
}

impl NotionClient {
    /// 新しい NotionClient を作成する。
    pub fn new(credentials: &NotionCredentials) -> Result<Self> {
        let client = Client::new(credentials.token.clone(), None)
            .context("Failed to create Notion client")?;
        Ok(Self {
            client,
            database_id: credentials.database_id.clone(),
        })
    }

    /// 日付プロパティが `date` のページを最大 1 件検索し、件数を返す。
    pub async fn query_by_date(&self, date_field: &str, date: NaiveDate) -> Result<usize> {
        tracing::debug!(date_field, %date, "Querying Notion database");

        let response = self
            .client
            .databases
            .query_a_database(&self.database_id, query_by_date_request(date_field, date))
            .await
            .context("Failed to query Notion database")?;

        Ok(response.results.len())
    }

    /// 日報ページを作成し、ページ ID と URL を返す。
    pub async fn create_page(&self, fields: &RecordFields, cover_url: &str) -> Result<CreatedPage> {
        let request = create_page_request(&self.database_id, fields, cover_url);

        let page = self
            .client
            .pages
            .create_a_page(request)
            .await
            .context("Failed to create Notion page")?;

        Ok(CreatedPage {
            id: page.id,
            url: page.url,
        })
    }

    /// ページに quote ブロックを追加する。
    pub async fn append_quote_block(&self, page_id: &str, text: &str) -> Result<()> {
        let request = AppendBlockChildrenRequest {
            children: vec![quote_block(text)],
            after: None,
        };

        self.client
            .blocks
            .append_block_children(page_id, request)
            .await
            .context("Failed to append quote block")?;

        Ok(())
    }
}

#[async_trait]
impl CardDatabase for NotionClient {
    async fn count_by_date(&self, date_field: &str, date: NaiveDate) -> Result<usize> {
        self.query_by_date(date_field, date).await
    }

    async fn create_page(&self, fields: &RecordFields, cover_url: &str) -> Result<CreatedPage> {
        NotionClient::create_page(self, fields, cover_url).await
    }

    async fn append_quote_block(&self, page_id: &str, text: &str) -> Result<()> {
        NotionClient::append_quote_block(self, page_id, text).await
    }
}

/// 日付プロパティの一致で絞り込むクエリを作る。
///
/// フィルタは日時を受け取るため、その日の 00:00 (UTC) を渡す。
/// 日付のみのプロパティは日単位で比較される。
fn query_by_date_request(date_field: &str, date: NaiveDate) -> QueryDatabaseRequest {
    QueryDatabaseRequest {
        filter: Some(Filter::Value {
            filter_type: FilterType::Property {
                property: date_field.to_string(),
                condition: PropertyCondition::Date(DateCondition::Equals(
                    date.and_time(NaiveTime::MIN).and_utc(),
                )),
            },
        }),
        page_size: Some(1),
        ..Default::default()
    }
}

/// 外部画像をカバーに持つページ作成リクエストを作る。
fn create_page_request(
    database_id: &str,
    fields: &RecordFields,
    cover_url: &str,
) -> CreateAPageRequest {
    CreateAPageRequest {
        parent: Parent::DatabaseId {
            database_id: database_id.to_string(),
        },
        properties: page_properties(fields),
        cover: Some(File::External {
            external: ExternalFile {
                url: cover_url.to_string(),
            },
        }),
        ..Default::default()
    }
}

fn quote_block(text: &str) -> Block {
    Block {
        block_type: BlockType::Quote {
            quote: QuoteValue {
                rich_text: rich_text(text),
                color: TextColor::Default,
                children: None,
            },
        },
        ..Default::default()
    }
}
