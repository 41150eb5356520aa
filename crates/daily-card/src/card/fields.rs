//! 日報カードのプロパティ値とカバー画像 URL を組み立てる。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use notion_client::objects::{
    page::{DateOrDateTime, DatePropertyValue, PageProperty},
    rich_text::{RichText, Text},
};

use crate::clock::ResolvedDate;
use crate::config::FieldMapping;
use crate::quote::Quote;

const COVER_BASE_URL: &str = "https://source.unsplash.com/random/1200x800/";

/// プロパティの型付きの値。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Title(String),
    Date(NaiveDate),
    Checkbox(bool),
    RichText(String),
}

impl FieldValue {
    /// Notion のページプロパティに変換する。
    pub fn to_page_property(&self) -> PageProperty {
        match self {
            FieldValue::Title(text) => PageProperty::Title {
                id: None,
                title: rich_text(text),
            },
            FieldValue::Date(date) => PageProperty::Date {
                id: None,
                date: Some(DatePropertyValue {
                    start: Some(DateOrDateTime::Date(*date)),
                    end: None,
                    time_zone: None,
                }),
            },
            FieldValue::Checkbox(checked) => PageProperty::Checkbox {
                id: None,
                checkbox: *checked,
            },
            FieldValue::RichText(text) => PageProperty::RichText {
                id: None,
                rich_text: rich_text(text),
            },
        }
    }
}

/// プロパティ名 -> 値。設定で無効にした項目はキーごと含めない。
pub type RecordFields = BTreeMap<String, FieldValue>;

/// 今日の日付と名言からプロパティ値を組み立てる。
pub fn build_fields(today: &ResolvedDate, quote: &Quote, mapping: &FieldMapping) -> RecordFields {
    let mut fields = RecordFields::new();

    fields.insert(
        mapping.title.clone(),
        FieldValue::Title(today.weekday_name()),
    );
    fields.insert(mapping.date.clone(), FieldValue::Date(today.date()));

    for key in &mapping.checkboxes {
        fields.insert(key.clone(), FieldValue::Checkbox(false));
    }

    if let Some(key) = &mapping.notes {
        fields.insert(key.clone(), FieldValue::RichText(String::new()));
    }

    if let Some(key) = &mapping.quote {
        fields.insert(key.clone(), FieldValue::RichText(quote.attributed()));
    }

    fields
}

/// プロパティ全体を `CreateAPageRequest::properties` の形に変換する。
pub fn page_properties(fields: &RecordFields) -> BTreeMap<String, PageProperty> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), value.to_page_property()))
        .collect()
}

/// トピックに合うランダム画像の URL を作る。画像自体は取得しない。
///
/// `urlencoding` は英数字と `-._~` 以外をすべてエスケープするため、
/// `encodeURIComponent` と違い `!'()*` もエスケープされる。
pub fn cover_url(topic: &str) -> String {
    format!("{COVER_BASE_URL}?{}", urlencoding::encode(topic))
}

/// プレーンテキスト 1 つだけの rich text を作る。
pub(crate) fn rich_text(content: &str) -> Vec<RichText> {
    vec![RichText::Text {
        text: Text {
            content: content.to_string(),
            link: None,
        },
        annotations: None,
        plain_text: None,
        href: None,
    }]
}

#[cfg(test)]
pub(crate) fn plain_text(rich_text: &[RichText]) -> String {
    rich_text
        .iter()
        .map(|rt| match rt {
            RichText::Text { text, .. } => text.content.as_str(),
            _ => "",
        })
        .collect()
}
