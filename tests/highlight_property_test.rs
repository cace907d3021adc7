use page_enhance::{Page, SearchOutcome, install_article};
use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};

// Each generated section holds three text runs; the <b> boundary means a
// match can never span the second and third.
#[derive(Debug, Clone)]
struct Section {
    lead: String,
    body: String,
    bold: String,
}

impl Section {
    fn runs(&self) -> [String; 3] {
        [
            self.lead.clone(),
            format!("{} ", self.body),
            self.bold.clone(),
        ]
    }
}

fn text_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        4 => "[A-Za-z ]{0,24}",
        1 => Just("Nepal is a country in South Asia.".to_string()),
        1 => Just("nEpAl NEPAL nepal".to_string()),
        1 => Just("नेपाल एक देश हो। नेपाल".to_string()),
        1 => Just("Café au lait or CAFÉ noir".to_string()),
        1 => Just("Cafe\u{301} culture, cafe\u{301}s".to_string()),
        1 => Just("\u{130}stanbul and istanbul".to_string()),
        1 => Just("Straße".to_string()),
        1 => Just("$2.50 (approx.) [a] .* ^x$ a+b? c|d".to_string()),
    ]
    .boxed()
}

fn section_strategy() -> BoxedStrategy<Section> {
    (text_strategy(), text_strategy(), text_strategy())
        .prop_map(|(lead, body, bold)| Section { lead, body, bold })
        .boxed()
}

fn query_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        4 => "[A-Za-z]{1,4}",
        1 => Just("nepal".to_string()),
        1 => Just("ASIA".to_string()),
        1 => Just("नेपाल".to_string()),
        1 => Just("\u{c9}".to_string()),
        1 => Just("CAF\u{c9}".to_string()),
        1 => Just("e\u{301}".to_string()),
        1 => Just("\u{130}".to_string()),
        1 => Just("$2.50".to_string()),
        1 => Just("(approx.)".to_string()),
        1 => Just(".*".to_string()),
        1 => Just("[a]".to_string()),
        1 => Just("^x$".to_string()),
        1 => Just("a+b?".to_string()),
    ]
    .boxed()
}

// Single-character case folding, as the matcher applies it. `İ` has no
// one-character lowercase and only ever matches itself.
fn fold(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(single), None) => single,
                _ => c,
            }
        })
        .collect()
}

fn render(sections: &[Section]) -> String {
    let mut html = String::from(
        r#"<html><head></head><body><input class="search-input"><button class="search-btn">Go</button>"#,
    );
    for section in sections {
        html.push_str(&format!(
            r#"<section class="content-section"><p>{}</p><p>{} <b>{}</b></p></section>"#,
            section.lead, section.body, section.bold
        ));
    }
    html.push_str("</body></html>");
    html
}

fn loaded(sections: &[Section]) -> std::result::Result<Page, TestCaseError> {
    let mut page = Page::from_html(&render(sections)).map_err(fail)?;
    install_article(&mut page).map_err(fail)?;
    page.load().map_err(fail)?;
    Ok(page)
}

fn fail(err: page_enhance::Error) -> TestCaseError {
    TestCaseError::fail(err.to_string())
}

fn expected_matches(sections: &[Section], query: &str) -> usize {
    let needle = fold(query.trim());
    sections
        .iter()
        .flat_map(Section::runs)
        .map(|run| fold(&run).matches(needle.as_str()).count())
        .sum()
}

fn assert_search_then_clear_round_trips(sections: &[Section], query: &str) -> TestCaseResult {
    let mut page = loaded(sections)?;
    let original = page.dump_dom("body").map_err(fail)?;

    let outcome = page.search(query).map_err(fail)?;
    let markers = page.highlight_markers().map_err(fail)?;
    let expected = expected_matches(sections, query);
    if expected == 0 {
        prop_assert_eq!(outcome, SearchOutcome::NotFound);
        prop_assert!(markers.is_empty());
        prop_assert_eq!(
            page.take_alert_messages(),
            vec![format!("No results found for \"{}\"", query.trim().to_lowercase())]
        );
    } else {
        prop_assert_eq!(outcome, SearchOutcome::Found { markers: expected });
        prop_assert_eq!(markers.len(), expected);
        for marker in markers {
            let text = page.dom().text_content(marker);
            prop_assert_eq!(fold(&text), fold(query.trim()), "{:?} vs {:?}", text, query);
        }
    }

    page.clear_highlights().map_err(fail)?;
    prop_assert_eq!(page.dump_dom("body").map_err(fail)?, original);
    prop_assert_eq!(page.clear_highlights().map_err(fail)?, 0);
    Ok(())
}

fn assert_text_substrings_are_found(
    sections: &[Section],
    run: prop::sample::Index,
    start: prop::sample::Index,
    len: usize,
) -> TestCaseResult {
    let runs: Vec<String> = sections.iter().flat_map(Section::runs).collect();
    let chars: Vec<char> = run.get(&runs).chars().collect();
    if chars.is_empty() {
        return Ok(());
    }
    let from = start.index(chars.len());
    let to = (from + len).min(chars.len());
    let query: String = chars[from..to].iter().collect();
    if query.trim().is_empty() {
        return Ok(());
    }

    let mut page = loaded(sections)?;
    let outcome = page.search(&query).map_err(fail)?;
    prop_assert_eq!(
        outcome,
        SearchOutcome::Found {
            markers: expected_matches(sections, &query)
        },
        "query {:?}",
        query
    );
    prop_assert!(page.take_alert_messages().is_empty());
    Ok(())
}

fn assert_short_live_queries_only_clear(sections: &[Section], query: &str) -> TestCaseResult {
    let mut page = loaded(sections)?;
    page.search("a").map_err(fail)?;
    let short: String = query.chars().take(2).collect();
    page.type_text(".search-input", &short).map_err(fail)?;
    prop_assert!(page.highlight_markers().map_err(fail)?.is_empty());
    prop_assert!(page.take_alert_messages().len() <= 1);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn search_marks_every_match_and_clear_restores_the_document(
        sections in prop::collection::vec(section_strategy(), 1..=3),
        query in query_strategy(),
    ) {
        assert_search_then_clear_round_trips(&sections, &query)?;
    }

    #[test]
    fn any_substring_of_the_rendered_text_is_found(
        sections in prop::collection::vec(section_strategy(), 1..=3),
        run in any::<prop::sample::Index>(),
        start in any::<prop::sample::Index>(),
        len in 1usize..=8,
    ) {
        assert_text_substrings_are_found(&sections, run, start, len)?;
    }

    #[test]
    fn live_queries_of_two_characters_or_fewer_never_highlight(
        sections in prop::collection::vec(section_strategy(), 1..=3),
        query in query_strategy(),
    ) {
        assert_short_live_queries_only_clear(&sections, &query)?;
    }
}
