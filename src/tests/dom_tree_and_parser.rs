use super::*;

#[test]
fn parse_and_dump_round_trips_attributes_in_sorted_order() -> Result<()> {
    let dom = Dom::parse("<div id='a' class=x data-flag>Hi &amp; bye<br></div>")?;
    assert_eq!(
        dom.dump_node(dom.root()),
        r#"<div class="x" data-flag="" id="a">Hi &amp; bye<br></div>"#
    );
    Ok(())
}

#[test]
fn parse_decodes_character_references_in_text_and_attributes() -> Result<()> {
    let dom = Dom::parse("<p id='p' title='a &quot;b&quot;'>&lt;tag&gt; &#65;&#x42; caf&eacute;</p>")?;
    let p = dom.by_id("p").expect("p exists");
    assert_eq!(dom.attr(p, "title").as_deref(), Some("a \"b\""));
    // Unknown named references stay as written.
    assert_eq!(dom.text_content(p), "<tag> AB caf&eacute;");
    Ok(())
}

#[test]
fn parse_keeps_script_and_style_bodies_raw() -> Result<()> {
    let dom = Dom::parse("<script>if (a < b && c) { x(); }</script><style>p > a { color: red }</style>")?;
    let script = dom.query_selector("script")?.expect("script exists");
    let style = dom.query_selector("style")?.expect("style exists");
    assert_eq!(dom.text_content(script), "if (a < b && c) { x(); }");
    assert_eq!(dom.text_content(style), "p > a { color: red }");
    Ok(())
}

#[test]
fn parse_skips_comments_and_doctype() -> Result<()> {
    let dom = Dom::parse("<!DOCTYPE html><!-- note --><p id='p'>a<!-- mid -->b</p>")?;
    let p = dom.by_id("p").expect("p exists");
    assert_eq!(dom.text_content(p), "ab");
    assert_eq!(dom.children(p).len(), 2);
    Ok(())
}

#[test]
fn parse_reports_unclosed_constructs() {
    for html in ["<p>a<!-- never closed", "<div class='x", "<div id=a", "<script>x"] {
        match Dom::parse(html) {
            Err(Error::HtmlParse(_)) => {}
            other => panic!("expected HtmlParse for {html:?}, got {other:?}"),
        }
    }
}

#[test]
fn stray_end_tags_are_ignored() -> Result<()> {
    let dom = Dom::parse("<div id='d'>a</span>b</div>")?;
    let div = dom.by_id("d").expect("div exists");
    assert_eq!(dom.text_content(div), "ab");
    Ok(())
}

#[test]
fn title_is_trimmed_text_of_title_element() -> Result<()> {
    let dom = Dom::parse("<head><title>  Nepal - Wikipedia </title></head><body></body>")?;
    assert_eq!(dom.title(), "Nepal - Wikipedia");
    assert_eq!(Dom::parse("<p>x</p>")?.title(), "");
    Ok(())
}

#[test]
fn normalize_merges_adjacent_text_and_drops_empty_nodes() -> Result<()> {
    let mut dom = Dom::parse("<div id='d'></div>")?;
    let div = dom.by_id("d").expect("div exists");
    for piece in ["Kath", "", "mandu", " valley"] {
        let text = dom.create_detached_text(piece);
        dom.append_child(div, text)?;
    }
    let em = dom.create_detached_element("em");
    dom.append_child(div, em)?;
    let tail = dom.create_detached_text("!");
    dom.append_child(div, tail)?;

    dom.normalize(div);
    let children = dom.children(div).to_vec();
    assert_eq!(children.len(), 3);
    assert_eq!(dom.text(children[0]), Some("Kathmandu valley"));
    assert_eq!(dom.tag_name(children[1]), Some("em"));
    assert_eq!(dom.text(children[2]), Some("!"));
    Ok(())
}

#[test]
fn class_list_operations_keep_tokens_unique() -> Result<()> {
    let mut dom = Dom::parse("<a id='a' class='nav-link  active'>x</a>")?;
    let a = dom.by_id("a").expect("a exists");
    dom.class_add(a, "nav-link")?;
    assert_eq!(dom.attr(a, "class").as_deref(), Some("nav-link active"));

    assert!(!dom.class_toggle(a, "active")?);
    assert!(dom.class_toggle(a, "show")?);
    assert!(dom.class_contains(a, "show")?);

    dom.class_remove(a, "nav-link")?;
    dom.class_remove(a, "show")?;
    assert!(!dom.has_attr(a, "class"));

    dom.set_class_name(a, "fas fa-sun")?;
    assert_eq!(dom.attr(a, "class").as_deref(), Some("fas fa-sun"));
    Ok(())
}

#[test]
fn inline_style_set_get_and_remove() -> Result<()> {
    let mut dom = Dom::parse("<div id='bar' style='width: 85%; color:red'></div>")?;
    let bar = dom.by_id("bar").expect("bar exists");
    assert_eq!(dom.style_get(bar, "width")?, "85%");
    assert_eq!(dom.style_get(bar, "WIDTH")?, "85%");
    assert_eq!(dom.style_get(bar, "opacity")?, "");

    dom.style_set(bar, "width", "0%")?;
    dom.style_set(bar, "opacity", "1")?;
    assert_eq!(
        dom.attr(bar, "style").as_deref(),
        Some("width: 0%; color: red; opacity: 1;")
    );

    dom.style_set(bar, "width", "")?;
    dom.style_set(bar, "color", "")?;
    dom.style_set(bar, "opacity", "")?;
    assert!(!dom.has_attr(bar, "style"));
    Ok(())
}

#[test]
fn tree_mutations_reject_cycles_and_wrong_node_kinds() -> Result<()> {
    let mut dom = Dom::parse("<div id='outer'><div id='inner'>t</div></div>")?;
    let outer = dom.by_id("outer").expect("outer exists");
    let inner = dom.by_id("inner").expect("inner exists");
    let text = dom.children(inner)[0];

    assert!(matches!(dom.append_child(inner, outer), Err(Error::Dom(_))));
    assert!(matches!(dom.append_child(text, outer), Err(Error::Dom(_))));
    assert!(matches!(dom.set_text_content(text, "x"), Err(Error::Dom(_))));
    assert!(matches!(dom.remove_child(outer, text), Err(Error::Dom(_))));
    assert!(matches!(dom.class_add(text, "x"), Err(Error::Dom(_))));
    Ok(())
}

#[test]
fn id_index_follows_attach_detach_and_text_replacement() -> Result<()> {
    let mut dom = Dom::parse("<section id='s'><p id='old'>x</p></section>")?;
    let section = dom.by_id("s").expect("section exists");

    let fresh = dom.create_detached_element("p");
    dom.set_attr(fresh, "id", "fresh")?;
    assert_eq!(dom.by_id("fresh"), None);
    dom.append_child(section, fresh)?;
    assert_eq!(dom.by_id("fresh"), Some(fresh));
    assert!(dom.is_connected(fresh));

    dom.set_text_content(section, "plain")?;
    assert_eq!(dom.by_id("old"), None);
    assert_eq!(dom.by_id("fresh"), None);
    assert!(!dom.is_connected(fresh));
    assert_eq!(dom.text_content(section), "plain");
    Ok(())
}

#[test]
fn id_index_survives_moves_of_subtrees_without_ids() -> Result<()> {
    let mut dom = Dom::parse("<div id='a'><p>plain</p></div><div id='b'></div>")?;
    let a = dom.by_id("a").expect("a exists");
    let b = dom.by_id("b").expect("b exists");
    let plain = dom.children(a)[0];

    dom.append_child(b, plain)?;
    dom.remove_child(b, plain)?;
    assert_eq!(dom.by_id("a"), Some(a));
    assert_eq!(dom.by_id("b"), Some(b));

    let wrapper = dom.create_detached_element("div");
    let nested = dom.create_detached_element("span");
    dom.set_attr(nested, "id", "nested")?;
    dom.append_child(wrapper, nested)?;
    dom.append_child(b, wrapper)?;
    assert_eq!(dom.by_id("nested"), Some(nested));
    dom.remove_child(b, wrapper)?;
    assert_eq!(dom.by_id("nested"), None);
    Ok(())
}

#[test]
fn replace_children_splices_once_and_tracks_ids() -> Result<()> {
    let mut dom = Dom::parse("<p id='p'>a<b id='keep'>b</b>c</p><div id='other'><i id='moved'>m</i></div>")?;
    let p = dom.by_id("p").expect("p exists");
    let other = dom.by_id("other").expect("other exists");
    let keep = dom.by_id("keep").expect("keep exists");
    let moved = dom.by_id("moved").expect("moved exists");
    let old_first = dom.children(p)[0];
    let x = dom.create_detached_text("X");

    dom.replace_children(p, &[x, keep, moved])?;
    assert_eq!(dom.dump_node(p), "<p id=\"p\">X<b id=\"keep\">b</b><i id=\"moved\">m</i></p>");
    assert_eq!(dom.parent(old_first), None);
    assert!(dom.children(other).is_empty());
    assert_eq!(dom.by_id("moved"), Some(moved));
    assert_eq!(dom.parent(moved), Some(p));

    assert!(matches!(dom.replace_children(p, &[x, x]), Err(Error::Dom(_))));
    assert!(matches!(dom.replace_children(keep, &[p]), Err(Error::Dom(_))));

    dom.replace_children(p, &[])?;
    assert_eq!(dom.by_id("keep"), None);
    assert_eq!(dom.by_id("moved"), None);
    assert_eq!(dom.by_id("p"), Some(p));
    Ok(())
}

#[test]
fn replace_child_swaps_in_place() -> Result<()> {
    let mut dom = Dom::parse("<p id='p'>a<b>b</b>c</p>")?;
    let p = dom.by_id("p").expect("p exists");
    let bold = dom.children(p)[1];
    let replacement = dom.create_detached_text("B");
    dom.replace_child(p, replacement, bold)?;
    assert_eq!(dom.dump_node(p), "<p id=\"p\">aBc</p>");
    assert_eq!(dom.children(p).len(), 3);
    assert_eq!(dom.parent(bold), None);
    Ok(())
}

#[test]
fn find_ancestor_by_tag_skips_self() -> Result<()> {
    let dom = Dom::parse("<a id='outer' href='#x'><span id='s'><a id='self'></a></span></a>")?;
    let inner = dom.by_id("self").expect("inner anchor exists");
    let span = dom.by_id("s").expect("span exists");
    assert_eq!(dom.find_ancestor_by_tag(span, "A"), dom.by_id("outer"));
    assert_eq!(dom.find_ancestor_by_tag(inner, "section"), None);
    Ok(())
}

#[test]
fn value_tracks_attribute_and_assignment() -> Result<()> {
    let mut dom = Dom::parse("<input id='q' value='nepal'>")?;
    let input = dom.by_id("q").expect("input exists");
    assert_eq!(dom.value(input)?, "nepal");
    dom.set_value(input, "everest")?;
    assert_eq!(dom.value(input)?, "everest");
    assert_eq!(dom.attr(input, "value").as_deref(), Some("nepal"));
    dom.remove_attr(input, "value")?;
    assert_eq!(dom.value(input)?, "");
    Ok(())
}

#[test]
fn deep_trees_dump_and_normalize_without_overflow() -> Result<()> {
    let depth = 20_000;
    let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let mut dom = Dom::parse(&html)?;
    let root = dom.root();
    dom.normalize(root);
    let dump = dom.dump_node(root);
    assert!(dump.starts_with("<div><div>"));
    assert_eq!(dom.text_content(root), "x");
    Ok(())
}
