//! CSV table: `key,group,<language>...`, one row per key

use crate::error::{CatalogError, CatalogResult};
use crate::item::{DEFAULT_GROUP, LanguageItem};
use std::collections::BTreeMap;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn encode(items: &[LanguageItem], languages: &[String]) -> CatalogResult<Vec<u8>> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    let mut header = vec!["key".to_string(), "group".to_string()];
    header.extend(languages.iter().cloned());
    writer.write_record(&header)?;

    for item in items {
        let mut row = vec![
            item.key.clone(),
            item.group.clone().unwrap_or_default(),
        ];
        row.extend(
            languages
                .iter()
                .map(|language| item.values.get(language).cloned().unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| CatalogError::Io(std::io::Error::other(e.to_string())))
}

/// Every column other than `key` and `group` is taken as a language
pub fn decode(bytes: &[u8]) -> CatalogResult<Vec<LanguageItem>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(CatalogError::Format("CSV file is empty.".to_string()));
    }

    let mut key_column = None;
    let mut group_column = None;
    let mut language_columns = Vec::new();
    for (index, column) in header.iter().enumerate() {
        match column.trim() {
            "key" => key_column = Some(index),
            "group" => group_column = Some(index),
            "" => {}
            language => language_columns.push((index, language.to_string())),
        }
    }
    let key_column = key_column.ok_or_else(|| {
        CatalogError::Format("CSV header is missing the 'key' column.".to_string())
    })?;

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        let key = record.get(key_column).unwrap_or_default().trim();
        if key.is_empty() {
            debug!("Skipping CSV row without a key");
            continue;
        }

        let group = group_column
            .and_then(|index| record.get(index))
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .unwrap_or(DEFAULT_GROUP);

        let values: BTreeMap<String, String> = language_columns
            .iter()
            .map(|(index, language)| {
                (
                    language.clone(),
                    record.get(*index).unwrap_or_default().to_string(),
                )
            })
            .collect();

        let mut item = LanguageItem::new(key).with_group(group);
        item.values = values;
        items.push(item);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> Vec<String> {
        vec!["en".to_string(), "fr".to_string()]
    }

    fn items() -> Vec<LanguageItem> {
        vec![
            LanguageItem::new("nav.home")
                .with_group("nav")
                .with_value("en".to_string(), "Home")
                .with_value("fr".to_string(), "Accueil"),
            LanguageItem::new("quote")
                .with_group("site")
                .with_value("en".to_string(), "Say \"hi\", then leave"),
        ]
    }

    #[test]
    fn test_encode_header_and_rows() {
        let bytes = encode(&items(), &languages()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "key,group,en,fr");
        assert_eq!(lines[1], "nav.home,nav,Home,Accueil");
        assert_eq!(lines[2], "quote,site,\"Say \"\"hi\"\", then leave\",");
    }

    #[test]
    fn test_encode_null_group_as_empty_cell() {
        let item = LanguageItem::new("k").with_value("en".to_string(), "v");
        let text = String::from_utf8(encode(&[item], &languages()).unwrap()).unwrap();
        assert_eq!(text.lines().nth(1), Some("k,,v,"));
    }

    #[test]
    fn test_round_trip_fills_missing_languages() {
        let decoded = decode(&encode(&items(), &languages()).unwrap()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], items()[0]);
        assert_eq!(decoded[1].values.get("fr").map(String::as_str), Some(""));
        assert_eq!(
            decoded[1].values.get("en").map(String::as_str),
            Some("Say \"hi\", then leave")
        );
    }

    #[test]
    fn test_decode_unknown_language_columns_kept() {
        let csv = "key,group,en,klingon\ngreeting,,Hello,nuqneH\n";
        let decoded = decode(csv.as_bytes()).unwrap();
        assert_eq!(decoded[0].group.as_deref(), Some("site"));
        assert_eq!(
            decoded[0].values.get("klingon").map(String::as_str),
            Some("nuqneH")
        );
    }

    #[test]
    fn test_decode_skips_rows_without_key_and_short_rows() {
        let csv = "group,key,en,fr\nnav,,Ignored,\nnav,  nav.back  ,Back\n";
        let decoded = decode(csv.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].key, "nav.back");
        assert_eq!(decoded[0].values.get("fr").map(String::as_str), Some(""));
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"key,en\nk,v\n");
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded[0].key, "k");
    }

    #[test]
    fn test_decode_empty_file() {
        let err = decode(b"").unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
    }

    #[test]
    fn test_decode_missing_key_column() {
        let err = decode(b"name,en\nk,v\n").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("'key'"));
    }
}
