use chrono::NaiveDate;

use super::database::CardDatabase;

/// 今日の日報カードがすでにあるかを確認する。
///
/// 検索に失敗した場合は「存在しない」とみなして作成に進む。
/// 一時的な障害で重複が作られる可能性は許容している。
pub async fn already_exists(
    database: &dyn CardDatabase,
    date_field: &str,
    date: NaiveDate,
) -> bool {
    match database.count_by_date(date_field, date).await {
        Ok(count) => count > 0,
        Err(e) => {
            tracing::warn!(
                error = %format!("{e:#}"),
                %date,
                "Duplicate check failed, assuming no page exists"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::database::CreatedPage;
    use crate::card::fields::RecordFields;
    use anyhow::Result;
    use async_trait::async_trait;

    enum Query {
        Found(usize),
        Fails,
    }

    #[async_trait]
    impl CardDatabase for Query {
        async fn count_by_date(&self, _date_field: &str, _date: NaiveDate) -> Result<usize> {
            match self {
                Query::Found(count) => Ok(*count),
                Query::Fails => anyhow::bail!("Failed to query Notion database"),
            }
        }

        async fn create_page(&self, _: &RecordFields, _: &str) -> Result<CreatedPage> {
            unreachable!("guard never creates pages")
        }

        async fn append_quote_block(&self, _: &str, _: &str) -> Result<()> {
            unreachable!("guard never appends blocks")
        }
    }

    fn may_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn existing_page_is_detected() {
        assert!(already_exists(&Query::Found(1), "Date", may_day()).await);
        assert!(already_exists(&Query::Found(3), "Date", may_day()).await);
    }

    #[tokio::test]
    async fn empty_result_is_not_duplicate() {
        assert!(!already_exists(&Query::Found(0), "Date", may_day()).await);
    }

    #[tokio::test]
    async fn query_error_fails_open() {
        assert!(!already_exists(&Query::Fails, "Date", may_day()).await);
    }
}
