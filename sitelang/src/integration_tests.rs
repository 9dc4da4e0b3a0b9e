//! End-to-end catalog flows: edit, import, resolve and export across sites
//! that share languages.

#[cfg(test)]
mod tests {
    use crate::*;
    use std::collections::HashMap;

    /// Two English sites and one French site, in directory order
    fn sites() -> Vec<Site> {
        vec![
            Site::new(1, "default", "en"),
            Site::new(2, "us", "en"),
            Site::new(3, "france", "fr"),
        ]
    }

    fn fixture() -> Vec<LanguageItem> {
        vec![
            LanguageItem::new("checkout.pay")
                .with_group("checkout")
                .with_value("en".to_string(), "Pay now")
                .with_value("fr".to_string(), "Payer"),
            LanguageItem::new("checkout.total")
                .with_group("checkout")
                .with_value("en".to_string(), "Total: {amount}"),
            LanguageItem::new("footer.copyright")
                .with_group("footer")
                .with_value("fr".to_string(), "Tous droits réservés"),
        ]
    }

    fn seeded_store() -> CatalogStore {
        let map = LanguageMap::from_sites(&sites());
        let mut store = CatalogStore::open_in_memory().unwrap();
        store
            .save_batch(&reconcile::expand(fixture(), &map))
            .unwrap();
        store
    }

    // ============================================================================
    // Language fan-out
    // ============================================================================

    #[test]
    fn test_language_edit_fans_out_and_leaves_other_language_alone() {
        let mut store = seeded_store();
        let map = LanguageMap::from_sites(&sites());
        let edit = LanguageItem::new("checkout.pay").with_value("en".to_string(), "Hi");
        store.save_batch(&reconcile::expand(vec![edit], &map)).unwrap();

        let pay = store.find_by_key("checkout.pay").unwrap().unwrap();
        assert_eq!(pay.values.get(&1).map(String::as_str), Some("Hi"));
        assert_eq!(pay.values.get(&2).map(String::as_str), Some("Hi"));
        assert_eq!(pay.values.get(&3).map(String::as_str), Some("Payer"));
    }

    #[test]
    fn test_divergent_same_language_values_collapse_to_first_site() {
        let mut store = seeded_store();
        store
            .save_batch(&[SiteItem::new("checkout.pay").with_value(2, "Pay up").preserving_meta()])
            .unwrap();
        let map = LanguageMap::from_sites(&sites());
        let pay = store.find_by_key("checkout.pay").unwrap().unwrap();
        let collapsed = reconcile::collapse(&pay.values, &map);
        assert_eq!(collapsed.get("en").map(String::as_str), Some("Pay now"));
    }

    // ============================================================================
    // Resolution across sites
    // ============================================================================

    #[test]
    fn test_resolution_with_fallback_and_placeholders() {
        let mut store = seeded_store();
        let directory = StaticSiteDirectory::new(sites()).unwrap();
        let mut resolver = store.resolver(directory.primary_site().id);
        let params = HashMap::from([("amount".to_string(), "12 €".to_string())]);

        let fr_total = resolver
            .resolve("checkout.total", 3, &params, ResolveOptions::default())
            .unwrap();
        assert_eq!(fr_total, "Total: 12 €");

        let fr_strict = resolver
            .resolve(
                "checkout.total",
                3,
                &params,
                ResolveOptions::default().without_fallback(),
            )
            .unwrap();
        assert_eq!(fr_strict, "checkout.total");
    }

    // ============================================================================
    // Import / export round trips through the store
    // ============================================================================

    fn round_trip(format: Format) {
        let source = seeded_store();
        let exported = export_catalog(&source, &sites(), format).unwrap();

        let mut target = CatalogStore::open_in_memory().unwrap();
        let imported = import_catalog(&mut target, &sites(), format, &exported).unwrap();
        assert_eq!(imported, 3);

        let map = LanguageMap::from_sites(&sites());
        let before = reconcile::collapse_all(&source.list(&TranslationQuery::new()).unwrap(), &map);
        let after = reconcile::collapse_all(&target.list(&TranslationQuery::new()).unwrap(), &map);
        let strip = |items: Vec<LanguageItem>| -> Vec<(String, Option<String>, _)> {
            items
                .into_iter()
                .map(|item| (item.key, item.group, item.values))
                .collect()
        };
        assert_eq!(strip(before), strip(after));
        assert_eq!(
            target.value("checkout.total", 3).unwrap(),
            None,
            "missing language must not become a stored empty string"
        );
    }

    #[test]
    fn test_csv_round_trip_through_store() {
        round_trip(Format::Csv);
    }

    #[test]
    fn test_json_round_trip_through_store() {
        round_trip(Format::Json);
    }

    #[test]
    fn test_archive_round_trip_through_store() {
        round_trip(Format::Archive);
    }

    #[test]
    fn test_archive_import_keeps_descriptions() {
        let mut store = seeded_store();
        store
            .save_batch(&[SiteItem::new("checkout.pay")
                .with_description("Primary call to action")
                .preserving_meta()])
            .unwrap();

        let exported = export_catalog(&store, &sites(), Format::Archive).unwrap();
        import_catalog(&mut store, &sites(), Format::Archive, &exported).unwrap();

        let pay = store.find_by_key("checkout.pay").unwrap().unwrap();
        assert_eq!(pay.description.as_deref(), Some("Primary call to action"));
        assert_eq!(pay.group.as_deref(), Some("checkout"));
    }

    #[test]
    fn test_csv_import_with_unknown_language_is_dropped() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let csv = "key,group,en,de\nhello,,Hello,Hallo\n";
        import_catalog(&mut store, &sites(), Format::Csv, csv.as_bytes()).unwrap();
        let hello = store.find_by_key("hello").unwrap().unwrap();
        assert_eq!(hello.values.len(), 2);
        assert_eq!(hello.group.as_deref(), Some(DEFAULT_GROUP));
    }

    #[test]
    fn test_csv_import_empty_cell_deletes_existing_value() {
        let mut store = seeded_store();
        let csv = "key,group,en,fr\ncheckout.pay,checkout,Pay now,\n";
        import_catalog(&mut store, &sites(), Format::Csv, csv.as_bytes()).unwrap();
        assert_eq!(store.value("checkout.pay", 3).unwrap(), None);
        assert_eq!(store.count(&TranslationQuery::new()).unwrap(), 3);
    }

    #[test]
    fn test_failed_import_leaves_catalog_untouched() {
        let mut store = seeded_store();
        let err = import_catalog(&mut store, &sites(), Format::Json, b"{\"k\": 1}").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count(&TranslationQuery::new()).unwrap(), 3);
    }

    #[test]
    fn test_export_uses_sorted_languages() {
        let store = seeded_store();
        let reversed: Vec<Site> = sites().into_iter().rev().collect();
        let csv = export_catalog(&store, &reversed, Format::Csv).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.lines().next(), Some("key,group,en,fr"));
    }

    #[test]
    fn test_paged_listing() {
        let store = seeded_store();
        let total = store.count(&TranslationQuery::new()).unwrap();
        let page = Page::new(1, 50, total);
        let list = store.list(&page.apply(TranslationQuery::new())).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(page.total_pages, 1);
    }
}
