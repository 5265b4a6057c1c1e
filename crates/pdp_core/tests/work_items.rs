use pdp_core::{WorkItem, PDP_URL_TEMPLATE};

#[test]
fn parse_list_skips_blanks_and_comments() {
    let input = "1086327259\n\n# commented out\n  1086327321  \n";
    let items = WorkItem::parse_list(input);
    assert_eq!(
        items,
        vec![
            WorkItem::Code("1086327259".to_string()),
            WorkItem::Code("1086327321".to_string()),
        ]
    );
}

#[test]
fn parse_list_recognizes_direct_urls() {
    let input = "https://www.liverpool.com.mx/tienda/pdp/lo-que-sea/1175413363\n42\n";
    let items = WorkItem::parse_list(input);
    assert!(matches!(items[0], WorkItem::DirectUrl(_)));
    assert!(matches!(items[1], WorkItem::Code(_)));
}

#[test]
fn code_resolves_through_template() {
    let item = WorkItem::Code("42".to_string());
    assert_eq!(item.resolved_url(), PDP_URL_TEMPLATE.replace("{code}", "42"));
    assert_eq!(item.key(), "42");
    assert_eq!(item.raw_id(), "42");
}

#[test]
fn direct_url_passes_through_and_has_no_key() {
    let item = WorkItem::DirectUrl("https://example.com/pdp/1".to_string());
    assert_eq!(item.resolved_url(), "https://example.com/pdp/1");
    assert_eq!(item.key(), "");
    assert_eq!(item.raw_id(), "https://example.com/pdp/1");
}
