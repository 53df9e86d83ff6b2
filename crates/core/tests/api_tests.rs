//! Library API integration tests
use zhuanlan_core::*;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn fixture_html() -> String {
    std::fs::read_to_string(get_fixture_path("article.html")).unwrap()
}

const EXPECTED_BODY: &str = "\
# Overview

The usual way is **static** dispatch with `std::variant`, see [the reference](https://en.cppreference.com/w/cpp/utility/variant).

---

## Details

> All problems can be solved by another level of indirection.

- alpha
  - beta
- gamma

1. first
2. second

```x86asm
mov eax, 1
ret
```

![dispatch table](https://pic.example.com/original.png)

{{< article link=\"https://zhuanlan.zhihu.com/p/646752343\" >}}";

#[test]
fn test_parse_api() {
    let article = parse(&fixture_html()).expect("should parse");

    assert_eq!(article.title, "A deep dive");
    assert_eq!(article.cover.as_deref(), Some("https://pic.example.com/cover.png"));
    assert_eq!(article.created, 1690000000);
    assert_eq!(article.updated, 1690100000);
    assert_eq!(article.content.to_string(), EXPECTED_BODY);
}

#[test]
fn test_to_markdown_front_matter() {
    let article = parse(&fixture_html()).expect("should parse");
    let markdown = article.to_markdown(None).unwrap();

    assert!(markdown.starts_with("---\ntitle: 'A deep dive'\n"));
    assert!(markdown.contains("date: 2023-07-22 04:26:40\n"));
    assert!(markdown.contains("updated: 2023-07-23 08:13:20\n"));
    assert!(markdown.contains(EXPECTED_BODY));
}

#[test]
fn test_to_markdown_with_series() {
    let article = parse(&fixture_html()).expect("should parse");
    let series = Series { name: "Dispatch".to_string(), order: 3 };
    let markdown = article.to_markdown(Some(&series)).unwrap();

    assert!(markdown.contains("series: ['Dispatch']\n"));
    assert!(markdown.contains("series_order: 3\n"));
}

#[test]
fn test_redirect_map_retargets_cross_references() {
    let mut redirects = RedirectMap::new();
    redirects.insert(
        "https://zhuanlan.zhihu.com/p/646752343",
        "https://www.example.com/articles/646752343",
    );
    let config = ParserConfig::builder().redirects(redirects).build();

    let article = ArticleParser::with_config(config).parse_article(&fixture_html()).expect("should parse");
    let body = article.content.to_string();

    assert!(body.contains(r#"{{< article link="https://www.example.com/articles/646752343" >}}"#));
    assert!(!body.contains("zhuanlan.zhihu.com/p/646752343"));
}

#[test]
fn test_unsupported_markup_aborts_parse() {
    let html = fixture_html().replace("<hr>", "<table><tr><td>x</td></tr></table>");
    let result = parse(&html);
    assert!(matches!(result, Err(ZhuanlanError::UnsupportedElement { .. })));
}

#[test]
fn test_missing_metadata_blob_aborts_parse() {
    let html = fixture_html().replace("js-initialData", "js-otherData");
    let result = parse(&html);
    assert!(matches!(result, Err(ZhuanlanError::MalformedInput(_))));
}

#[test]
fn test_parser_config_accessor() {
    let parser = ArticleParser::new();
    assert_eq!(parser.config().heading_base, 1);
    assert_eq!(parser.config().max_list_depth, 64);
}
