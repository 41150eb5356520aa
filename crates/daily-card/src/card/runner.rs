//! 1 日 1 回の日報カード作成の流れ。
//!
//! 重複確認 → 名言取得 → プロパティ組み立て → ページ作成 → (必要なら) quote ブロック追加
//! の順に 1 つずつ実行する。重複確認と名言取得の失敗は内部で吸収し、
//! それ以外の失敗は呼び出し元に返す。

use anyhow::Result;

use super::database::{CardDatabase, CreatedPage};
use super::fields::{RecordFields, build_fields, cover_url};
use super::guard::already_exists;
use crate::clock::ResolvedDate;
use crate::config::Config;
use crate::quote::{Quote, QuoteSource};

/// 実行結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 今日のカードがすでにあったので何もしなかった
    Skipped { date: String },
    /// カードを作成した
    Created {
        page: CreatedPage,
        title: String,
        date: String,
    },
}

pub struct DailyCardRunner<'a> {
    database: &'a dyn CardDatabase,
    quotes: &'a dyn QuoteSource,
    config: &'a Config,
}

impl<'a> DailyCardRunner<'a> {
    pub fn new(
        database: &'a dyn CardDatabase,
        quotes: &'a dyn QuoteSource,
        config: &'a Config,
    ) -> Self {
        Self {
            database,
            quotes,
            config,
        }
    }

    /// `today` の日報カードを作成する。すでにあれば何もしない。
    pub async fn run(&self, today: ResolvedDate) -> Result<Outcome> {
        let date = today.iso_date();

        if already_exists(self.database, &self.config.fields.date, today.date()).await {
            tracing::info!(date = %date, "Today's page already exists, skipping");
            return Ok(Outcome::Skipped { date });
        }

        let quote = self.quotes.fetch().await;
        let fields = build_fields(&today, &quote, &self.config.fields);
        let cover = cover_url(&self.config.cover.topic);

        let page = self.create_record(&fields, &cover, &quote).await?;
        let title = today.weekday_name();

        tracing::info!(
            page_id = %page.id,
            url = %page.url,
            title = %title,
            date = %date,
            "Created daily card"
        );

        Ok(Outcome::Created { page, title, date })
    }

    /// ページを作成し、quote 用のプロパティがなければ本文に名言を追加する。
    async fn create_record(
        &self,
        fields: &RecordFields,
        cover: &str,
        quote: &Quote,
    ) -> Result<CreatedPage> {
        let page = self.database.create_page(fields, cover).await?;

        if self.config.fields.quote.is_none() {
            self.database
                .append_quote_block(&page.id, &quote.attributed())
                .await?;
        }

        Ok(page)
    }
}
