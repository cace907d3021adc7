use super::*;

const NAV_HTML: &str = r##"
    <nav class="navbar">
      <ul class="nav">
        <li><a class="nav-link active" href="#home">Home</a></li>
        <li><a class="nav-link" href="#html">HTML</a></li>
        <li><a class="nav-link external" href="https://example.com/cv.pdf">CV</a></li>
      </ul>
    </nav>
    <div class="toc-list">
      <a href="#history">History</a>
      <a href="#">Print</a>
    </div>
    <main>
      <h2 id="h">Heading</h2>
      <p id="p1" class="lead note">one</p>
      <p id="p2" data-tags="alpha beta">two</p>
      <section id="s"><p id="p3" class="note">three</p></section>
    </main>
"##;

fn ids(dom: &Dom, nodes: &[NodeId]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| dom.attr(*node, "id").unwrap_or_default())
        .collect()
}

fn hrefs(dom: &Dom, nodes: &[NodeId]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| dom.attr(*node, "href").unwrap_or_default())
        .collect()
}

#[test]
fn attribute_prefix_selectors_pick_fragment_links() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    let links = dom.query_selector_all(r##".nav-link[href^="#"], .toc-list a[href^="#"]"##)?;
    assert_eq!(hrefs(&dom, &links), ["#home", "#html", "#history", "#"]);

    let action = dom.query_selector_all(r##"a[href="#"]"##)?;
    assert_eq!(hrefs(&dom, &action), ["#"]);
    Ok(())
}

#[test]
fn suffix_contains_and_word_attribute_conditions() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    let pdf = dom.query_selector_all(r#"a[href$=".pdf"]"#)?;
    assert_eq!(hrefs(&dom, &pdf), ["https://example.com/cv.pdf"]);

    let example = dom.query_selector_all("a[href*=example]")?;
    assert_eq!(example.len(), 1);

    let tagged = dom.query_selector_all("[data-tags~=beta]")?;
    assert_eq!(ids(&dom, &tagged), ["p2"]);
    assert!(dom.query_selector_all("[data-tags~=alp]")?.is_empty());
    assert!(dom.query_selector_all(r#"[href^=""]"#)?.is_empty());
    Ok(())
}

#[test]
fn combinators_follow_tree_relations() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    assert_eq!(ids(&dom, &dom.query_selector_all("main > p")?), ["p1", "p2"]);
    assert_eq!(ids(&dom, &dom.query_selector_all("main p.note")?), ["p1", "p3"]);
    assert_eq!(ids(&dom, &dom.query_selector_all("h2 + p")?), ["p1"]);
    assert_eq!(ids(&dom, &dom.query_selector_all("h2 ~ p")?), ["p1", "p2"]);
    assert_eq!(ids(&dom, &dom.query_selector_all("#h ~ section > .note")?), ["p3"]);
    Ok(())
}

#[test]
fn pseudo_classes_and_negation() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    assert_eq!(ids(&dom, &dom.query_selector_all("main > :first-child")?), ["h"]);
    assert_eq!(ids(&dom, &dom.query_selector_all("main > :last-child")?), ["s"]);
    assert_eq!(ids(&dom, &dom.query_selector_all("main p:not(.note)")?), ["p2"]);

    let plain = dom.query_selector_all(".nav-link:not(.active, .external)")?;
    assert_eq!(hrefs(&dom, &plain), ["#html"]);
    Ok(())
}

#[test]
fn group_results_are_in_document_order_without_duplicates() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    let found = dom.query_selector_all("#p3, .note, #p1")?;
    assert_eq!(ids(&dom, &found), ["p1", "p3"]);
    Ok(())
}

#[test]
fn scoped_queries_exclude_the_scope_root() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    let section = dom.by_id("s").expect("section exists");
    assert_eq!(dom.query_selector_from(section, "section")?, None);
    assert_eq!(dom.query_selector_from(section, ".note")?, dom.by_id("p3"));
    Ok(())
}

#[test]
fn closest_and_matches_walk_upwards() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    let p3 = dom.by_id("p3").expect("p3 exists");
    let text = dom.children(p3)[0];
    assert_eq!(dom.closest(text, "section")?, dom.by_id("s"));
    assert_eq!(dom.closest(p3, "p")?, Some(p3));
    assert_eq!(dom.closest(p3, "nav")?, None);
    assert!(dom.matches_selector(p3, "main section > p.note")?);
    assert!(!dom.matches_selector(text, "p")?);
    Ok(())
}

#[test]
fn unsupported_selectors_are_reported() -> Result<()> {
    let dom = Dom::parse(NAV_HTML)?;
    for selector in [
        "",
        "a,",
        ",a",
        "> a",
        "a >",
        "a > > b",
        "a[href",
        "a:hover",
        "p:nth-child(2)",
        "div#a#b",
        "a::before",
    ] {
        match dom.query_selector_all(selector) {
            Err(Error::UnsupportedSelector(_)) => {}
            other => panic!("expected UnsupportedSelector for {selector:?}, got {other:?}"),
        }
    }
    Ok(())
}
