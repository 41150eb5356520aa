//! 名言 API から今日の一言を取得する。
//!
//! 取得はベストエフォートで、失敗しても日報カードの作成は止めない。
//! 失敗時は警告をログに出して固定の名言を返す。

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::QuoteProviderKind;

const QUOTABLE_URL: &str = "https://api.quotable.io/random";
const ZENQUOTES_URL: &str = "https://zenquotes.io/api/random";

const FALLBACK_TEXT: &str = "Small steps every day add up.";
const FALLBACK_AUTHOR: &str = "—";
const UNKNOWN_AUTHOR: &str = "Unknown";

/// 名言と著者。`text` は常に空でない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    /// 取得に失敗したときに使う名言。
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            author: FALLBACK_AUTHOR.to_string(),
        }
    }

    /// 取り出した文字列を整形する。本文が空なら None。
    fn from_parts(text: Option<&str>, author: Option<&str>) -> Option<Self> {
        let text = text.map(str::trim).filter(|t| !t.is_empty())?;
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR);
        Some(Self {
            text: text.to_string(),
            author: author.to_string(),
        })
    }

    /// `本文 — 著者` 形式の一行。
    pub fn attributed(&self) -> String {
        format!("{} — {}", self.text, self.author)
    }
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Response contained no quote text")]
    Empty,
}

/// 名言の取得元。
///
/// `fetch` は失敗しない。取得元ごとの失敗はフォールバックに置き換えて返す。
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Quote;
}

/// 設定に応じた取得元を作る。
pub fn quote_source(kind: QuoteProviderKind, http: reqwest::Client) -> Box<dyn QuoteSource> {
    match kind {
        QuoteProviderKind::Quotable => Box::new(Quotable::new(http)),
        QuoteProviderKind::ZenQuotes => Box::new(ZenQuotes::new(http)),
    }
}

/// api.quotable.io (`{"content": ..., "author": ...}`)
pub struct Quotable {
    http: reqwest::Client,
    url: String,
}

impl Quotable {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, QUOTABLE_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuoteSource for Quotable {
    async fn fetch(&self) -> Quote {
        fetch_or_fallback(&self.http, &self.url, "quotable", parse_quotable).await
    }
}

/// zenquotes.io (`[{"q": ..., "a": ...}]`)
pub struct ZenQuotes {
    http: reqwest::Client,
    url: String,
}

impl ZenQuotes {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, ZENQUOTES_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuoteSource for ZenQuotes {
    async fn fetch(&self) -> Quote {
        fetch_or_fallback(&self.http, &self.url, "zenquotes", parse_zenquotes).await
    }
}

async fn fetch_or_fallback(
    http: &reqwest::Client,
    url: &str,
    provider: &str,
    parse: fn(&str) -> Result<Quote, QuoteError>,
) -> Quote {
    match fetch_body(http, url).await.and_then(|body| parse(&body)) {
        Ok(quote) => {
            tracing::debug!(provider, author = %quote.author, "Quote fetched");
            quote
        }
        Err(e) => {
            tracing::warn!(provider, error = %e, "Quote fetch failed, using fallback");
            Quote::fallback()
        }
    }
}

async fn fetch_body(http: &reqwest::Client, url: &str) -> Result<String, QuoteError> {
    let body = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

#[derive(Deserialize)]
struct QuotableResponse {
    content: Option<String>,
    author: Option<String>,
}

#[derive(Deserialize)]
struct ZenQuotesEntry {
    q: Option<String>,
    a: Option<String>,
}

fn parse_quotable(body: &str) -> Result<Quote, QuoteError> {
    let response: QuotableResponse = serde_json::from_str(body)?;
    Quote::from_parts(response.content.as_deref(), response.author.as_deref())
        .ok_or(QuoteError::Empty)
}

fn parse_zenquotes(body: &str) -> Result<Quote, QuoteError> {
    let entries: Vec<ZenQuotesEntry> = serde_json::from_str(body)?;
    let entry = entries.first().ok_or(QuoteError::Empty)?;
    Quote::from_parts(entry.q.as_deref(), entry.a.as_deref()).ok_or(QuoteError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    /// 1 回だけ決まったレスポンスを返すローカルサーバーを立て、その URL を返す。
    async fn serve_once(status: &str, body: &str) -> String {
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/random")
    }

    /// 環境変数のプロキシ設定を無視するクライアント。
    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    async fn quotable_for(status: &str, body: &str) -> Quote {
        let url = serve_once(status, body).await;
        Quotable::with_url(local_client(), url).fetch().await
    }

    async fn zenquotes_for(status: &str, body: &str) -> Quote {
        let url = serve_once(status, body).await;
        ZenQuotes::with_url(local_client(), url).fetch().await
    }

    #[test]
    fn parse_quotable_trims_fields() {
        let body = r#"{"_id":"x","content":"  Stay hungry.  ","author":" Steve Jobs ","tags":[]}"#;
        let quote = parse_quotable(body).unwrap();
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.author, "Steve Jobs");
    }

    #[test]
    fn parse_quotable_missing_author_is_unknown() {
        let quote = parse_quotable(r#"{"content":"Keep going."}"#).unwrap();
        assert_eq!(quote.author, "Unknown");

        let quote = parse_quotable(r#"{"content":"Keep going.","author":"   "}"#).unwrap();
        assert_eq!(quote.author, "Unknown");
    }

    #[test]
    fn parse_quotable_rejects_empty_and_malformed() {
        assert!(matches!(
            parse_quotable(r#"{"content":"   ","author":"A"}"#),
            Err(QuoteError::Empty)
        ));
        assert!(matches!(parse_quotable(r#"{}"#), Err(QuoteError::Empty)));
        assert!(matches!(parse_quotable("<html>"), Err(QuoteError::Json(_))));
    }

    #[test]
    fn parse_zenquotes_uses_first_entry() {
        let body = r#"[{"q":"Act now.","a":"Anon","h":"<blockquote/>"},{"q":"Later.","a":"B"}]"#;
        let quote = parse_zenquotes(body).unwrap();
        assert_eq!(
            quote,
            Quote {
                text: "Act now.".to_string(),
                author: "Anon".to_string(),
            }
        );
    }

    #[test]
    fn parse_zenquotes_rejects_empty_and_malformed() {
        assert!(matches!(parse_zenquotes("[]"), Err(QuoteError::Empty)));
        assert!(matches!(
            parse_zenquotes(r#"[{"q":"","a":"Anon"}]"#),
            Err(QuoteError::Empty)
        ));
        assert!(matches!(
            parse_zenquotes(r#"{"q":"not a list"}"#),
            Err(QuoteError::Json(_))
        ));
    }

    #[test]
    fn attributed_joins_with_em_dash() {
        let quote = Quote {
            text: "Do it.".to_string(),
            author: "Me".to_string(),
        };
        assert_eq!(quote.attributed(), "Do it. — Me");
        assert_eq!(
            Quote::fallback().attributed(),
            "Small steps every day add up. — —"
        );
    }

    #[tokio::test]
    async fn unreachable_provider_returns_fallback() {
        let http = local_client();

        let quotable = Quotable::with_url(http.clone(), "http://127.0.0.1:9/random");
        assert_eq!(quotable.fetch().await, Quote::fallback());

        let zen = ZenQuotes::with_url(http, "http://127.0.0.1:9/api/random");
        assert_eq!(zen.fetch().await, Quote::fallback());
    }

    #[tokio::test]
    async fn invalid_url_returns_fallback() {
        let broken = Quotable::with_url(reqwest::Client::new(), "not a url");
        assert_eq!(broken.fetch().await, Quote::fallback());
    }

    #[tokio::test]
    async fn successful_response_is_parsed() {
        let body = r#"{"content":"Stay hungry.","author":"Steve Jobs"}"#;
        let quote = quotable_for("200 OK", body).await;
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.author, "Steve Jobs");

        let quote = zenquotes_for("200 OK", r#"[{"q":"Act now.","a":"Anon"}]"#).await;
        assert_eq!(quote.text, "Act now.");
        assert_eq!(quote.author, "Anon");
    }

    #[tokio::test]
    async fn error_status_returns_fallback() {
        let body = r#"{"content":"Stay hungry.","author":"Steve Jobs"}"#;
        let quote = quotable_for("500 Internal Server Error", body).await;
        assert_eq!(quote, Quote::fallback());

        let body = r#"[{"q":"Act now.","a":"Anon"}]"#;
        let quote = zenquotes_for("500 Internal Server Error", body).await;
        assert_eq!(quote, Quote::fallback());
    }

    #[tokio::test]
    async fn blank_quote_returns_fallback() {
        assert_eq!(
            quotable_for("200 OK", r#"{"content":"   "}"#).await,
            Quote::fallback()
        );
        assert_eq!(
            zenquotes_for("200 OK", r#"[{"q":"   ","a":"Anon"}]"#).await,
            Quote::fallback()
        );
    }

    #[tokio::test]
    async fn malformed_body_returns_fallback() {
        assert_eq!(quotable_for("200 OK", "<html>").await, Quote::fallback());
        assert_eq!(zenquotes_for("200 OK", "<html>").await, Quote::fallback());
    }
}
