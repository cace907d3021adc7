use super::*;
use crate::behaviors::Behavior;
use crate::page::EventTarget;

fn page(html: &str) -> Result<Page> {
    Page::builder(html)
        .url("https://example.test/nepal.html")
        .clock_origin_ms(1_714_557_600_000)
        .random_seed(7)
        .build()
}

fn set_style(node: NodeId, value: &str) -> Behavior {
    Behavior::SetStyle {
        node,
        property: "opacity".into(),
        value: value.into(),
    }
}

#[test]
fn timers_run_in_due_order_and_advance_the_clock() -> Result<()> {
    let mut page = page("<div id='box'></div>")?;
    let node = page.select_one("#box")?;
    page.set_timeout(set_style(node, "0.5"), 200);
    page.set_timeout(set_style(node, "0.2"), 100);
    page.set_timeout(set_style(node, "0.3"), 100);

    let pending = page.pending_timers();
    assert_eq!(pending.len(), 3);
    assert_eq!(pending[0].due_at, 100);
    assert_eq!(pending[0].label, r#"set-style opacity="0.2""#);

    page.advance_time(150)?;
    assert_eq!(page.now_ms(), 150);
    assert_eq!(page.dom().style_get(node, "opacity")?, "0.3");
    assert_eq!(page.pending_timers().len(), 1);

    page.flush()?;
    assert_eq!(page.now_ms(), 200);
    assert_eq!(page.dom().style_get(node, "opacity")?, "0.5");
    Ok(())
}

#[test]
fn timer_controls_validate_their_arguments() -> Result<()> {
    let mut page = page("<div id='box'></div>")?;
    let node = page.select_one("#box")?;
    let id = page.set_timeout(set_style(node, "1"), 50);

    assert!(matches!(page.advance_time(-1), Err(Error::Timer(_))));
    page.advance_time(10)?;
    assert!(matches!(page.advance_time_to(5), Err(Error::Timer(_))));
    assert!(matches!(page.set_timer_step_limit(0), Err(Error::Timer(_))));

    assert!(page.clear_timer(id));
    assert!(!page.clear_timer(id));
    assert!(!page.run_next_timer()?);
    assert_eq!(page.dom().style_get(node, "opacity")?, "");
    Ok(())
}

#[test]
fn timer_step_limit_stops_runaway_queues() -> Result<()> {
    let mut page = page("<div id='box'></div>")?;
    let node = page.select_one("#box")?;
    for _ in 0..5 {
        page.set_timeout(set_style(node, "1"), 0);
    }
    page.set_timer_step_limit(3)?;
    match page.flush() {
        Err(Error::Timer(msg)) => assert!(msg.contains("exceeded max steps")),
        other => panic!("expected Timer error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn run_due_timers_does_not_move_the_clock() -> Result<()> {
    let mut page = page("<div id='box'></div>")?;
    let node = page.select_one("#box")?;
    page.set_timeout(set_style(node, "1"), 0);
    page.set_timeout(set_style(node, "0"), 10);
    assert_eq!(page.run_due_timers()?, 1);
    assert_eq!(page.now_ms(), 0);
    assert!(page.run_next_timer()?);
    assert_eq!(page.now_ms(), 10);
    Ok(())
}

#[test]
fn throttle_gate_drops_calls_until_released() -> Result<()> {
    let mut page = page("<p></p>")?;
    assert!(page.throttle_gate("spy", 100));
    assert!(!page.throttle_gate("spy", 100));
    assert!(page.throttle_gate("other", 100));
    page.advance_time(99)?;
    assert!(!page.throttle_gate("spy", 100));
    page.advance_time(1)?;
    assert!(page.throttle_gate("spy", 100));
    Ok(())
}

#[test]
fn timestamps_follow_the_virtual_clock() -> Result<()> {
    let mut page = page("<p></p>")?;
    assert_eq!(page.timestamp(), "2024-05-01T10:00:00.000Z");
    page.advance_time(61_500)?;
    assert_eq!(page.timestamp(), "2024-05-01T10:01:01.500Z");
    Ok(())
}

#[test]
fn element_events_bubble_to_document_and_window() -> Result<()> {
    let mut page = page("<div id='outer'><button id='btn'>go</button></div>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_timers(false);
    let outer = page.select_one("#outer")?;
    page.add_listener(EventTarget::Node(outer), EventKind::Click, Behavior::PrintLink);
    page.add_listener(EventTarget::Document, EventKind::Click, Behavior::PrintLink);
    page.add_listener(EventTarget::Window, EventKind::Click, Behavior::PrintLink);

    page.click("#btn")?;
    assert_eq!(page.print_count(), 3);

    let logs = page.take_trace_logs();
    let currents: Vec<&str> = logs
        .iter()
        .filter(|line| line.starts_with("[event] click"))
        .filter_map(|line| line.split(" current=").nth(1))
        .filter_map(|rest| rest.split(' ').next())
        .collect();
    assert_eq!(currents, ["#outer", "document", "window"]);
    assert!(logs.iter().any(|line| line.starts_with("[event] done click target=#btn")));
    Ok(())
}

#[test]
fn non_bubbling_events_stay_on_their_target() -> Result<()> {
    let mut page = page("<div id='outer'><p id='inner'>x</p></div>")?;
    page.add_listener(EventTarget::Document, EventKind::Scroll, Behavior::PrintLink);
    page.scroll_to(10)?;
    assert_eq!(page.print_count(), 0);
    assert_eq!(page.scroll_y(), 10);
    Ok(())
}

#[test]
fn duplicate_listeners_are_registered_once() -> Result<()> {
    let mut page = page("<button id='btn'>go</button>")?;
    let btn = page.select_one("#btn")?;
    page.add_listener(EventTarget::Node(btn), EventKind::Click, Behavior::PrintLink);
    page.add_listener(EventTarget::Node(btn), EventKind::Click, Behavior::PrintLink);
    assert_eq!(page.listener_count("#btn", EventKind::Click)?, 1);
    page.click("#btn")?;
    assert_eq!(page.print_count(), 1);
    Ok(())
}

#[test]
fn fragment_links_navigate_unless_prevented() -> Result<()> {
    let mut page = page(
        "<a id='plain' href='#history'><span id='label'>History</span></a>\
         <a id='top' href='#'>Top</a>\
         <a id='handled' href='#history'>Handled</a>\
         <section id='history'>...</section>",
    )?;
    page.set_layout("#history", 1200, 400)?;

    page.click("#label")?;
    assert_eq!(page.url(), "https://example.test/nepal.html#history");
    assert_eq!(page.scroll_y(), 1200);
    assert_eq!(
        page.take_scroll_requests(),
        [ScrollRequest {
            top: 1200,
            smooth: false
        }]
    );

    page.click("#top")?;
    assert_eq!(page.url(), "https://example.test/nepal.html#");
    assert_eq!(page.scroll_y(), 0);

    let handled = page.select_one("#handled")?;
    page.add_listener(EventTarget::Node(handled), EventKind::Click, Behavior::PrintLink);
    page.click("#handled")?;
    assert_eq!(page.url(), "https://example.test/nepal.html#");
    assert_eq!(page.print_count(), 1);
    Ok(())
}

#[test]
fn type_text_only_accepts_form_fields() -> Result<()> {
    let mut page = page("<input id='q'><textarea id='t'></textarea><div id='d'></div>")?;
    page.type_text("#q", "nepal")?;
    page.type_text("#t", "notes")?;
    page.assert_value("#q", "nepal")?;
    page.assert_value("#t", "notes")?;
    match page.type_text("#d", "x") {
        Err(Error::TypeMismatch { actual, .. }) => assert_eq!(actual, "div"),
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert!(matches!(page.click("#missing"), Err(Error::SelectorNotFound(_))));
    Ok(())
}

#[test]
fn geometry_uses_layout_boxes_and_scroll_offset() -> Result<()> {
    let mut page = page("<section id='s'><p id='p'>x</p></section>")?;
    let section = page.select_one("#s")?;
    let para = page.select_one("#p")?;
    assert_eq!(page.bounding_client_rect(section), None);

    page.set_layout("#s", 500, 300)?;
    page.scroll_to(200)?;
    assert_eq!(
        page.bounding_client_rect(section),
        Some(ClientRect {
            top: 300,
            bottom: 600,
            height: 300
        })
    );
    assert_eq!(page.bounding_client_rect(para), None);
    assert_eq!(page.document_top(para), Some(500));

    page.scroll_to(-50)?;
    assert_eq!(page.scroll_y(), 0);
    assert!(matches!(page.set_layout("#s", 0, -1), Err(Error::InvalidArgument(_))));
    assert!(matches!(page.set_viewport_height(0), Err(Error::InvalidArgument(_))));
    Ok(())
}

#[test]
fn scroll_into_view_centers_and_clamps() -> Result<()> {
    let mut page = page("<p id='near'>a</p><p id='far'>b</p><p id='loose'>c</p>")?;
    page.set_layout("#near", 100, 20)?;
    page.set_layout("#far", 2000, 20)?;
    let near = page.select_one("#near")?;
    let far = page.select_one("#far")?;
    let loose = page.select_one("#loose")?;

    assert!(page.scroll_into_view(far, ScrollBlock::Center, true)?);
    assert_eq!(page.scroll_y(), 2000 + 10 - 400);
    assert!(page.scroll_into_view(near, ScrollBlock::Center, true)?);
    assert_eq!(page.scroll_y(), 0);
    assert!(page.scroll_into_view(far, ScrollBlock::Start, false)?);
    assert_eq!(page.scroll_y(), 2000);
    assert!(!page.scroll_into_view(loose, ScrollBlock::Start, true)?);

    assert_eq!(
        page.scroll_requests(),
        [
            ScrollRequest { top: 1610, smooth: true },
            ScrollRequest { top: 0, smooth: true },
            ScrollRequest { top: 2000, smooth: false },
        ]
    );
    Ok(())
}

#[test]
fn extreme_layout_boxes_saturate_instead_of_overflowing() -> Result<()> {
    let mut page = page("<div id='edge'>a</div><div id='low'>b</div>")?;
    let edge = page.select_one("#edge")?;
    let low = page.select_one("#low")?;
    page.observe(edge, 0.0, Behavior::RevealCard, true)?;
    page.set_layout("#edge", i64::MAX, 10)?;
    page.set_layout("#low", i64::MIN, 10)?;
    page.assert_class("#edge", "fade-in-up", false)?;

    assert!(page.scroll_into_view(edge, ScrollBlock::Center, false)?);
    assert_eq!(page.scroll_y(), i64::MAX - 400);
    assert_eq!(
        page.bounding_client_rect(edge),
        Some(ClientRect {
            top: 400,
            bottom: 410,
            height: 10
        })
    );
    page.assert_class("#edge", "fade-in-up", true)?;
    assert_eq!(page.bounding_client_rect(low).map(|rect| rect.top), Some(i64::MIN));

    page.scroll_to(i64::MAX)?;
    assert_eq!(page.bounding_client_rect(edge).map(|rect| rect.bottom), Some(10));
    Ok(())
}

#[test]
fn observers_fire_on_entry_and_once_observations_are_dropped() -> Result<()> {
    let mut page = page("<div id='card'>c</div><img id='img' src='placeholder.svg'>")?;
    page.set_layout("#card", 1000, 200)?;
    page.set_layout("#img", 1500, 100)?;
    let card = page.select_one("#card")?;
    let img = page.select_one("#img")?;
    page.observe(card, 0.5, Behavior::RevealCard, false)?;
    page.observe(img, 0.0, Behavior::RevealImage, true)?;
    assert_eq!(page.observed_count(), 2);
    page.assert_class("#card", "fade-in-up", false)?;

    // 50 px of a 200 px card is visible: below the threshold.
    page.scroll_to(250)?;
    page.assert_class("#card", "fade-in-up", false)?;
    page.scroll_to(400)?;
    page.assert_class("#card", "fade-in-up", true)?;

    page.scroll_to(800)?;
    page.assert_class("#img", "fade-in", true)?;
    assert_eq!(page.observed_count(), 1);

    page.dom_mut().class_remove(card, "fade-in-up")?;
    page.dom_mut().class_remove(img, "fade-in")?;
    page.scroll_to(3000)?;
    page.scroll_to(400)?;
    page.assert_class("#card", "fade-in-up", true)?;
    page.assert_class("#img", "fade-in", false)?;
    Ok(())
}

#[test]
fn observations_rejected_for_out_of_range_thresholds() -> Result<()> {
    let mut page = page("<div id='card'>c</div>")?;
    let card = page.select_one("#card")?;
    assert!(matches!(
        page.observe(card, 1.5, Behavior::RevealCard, false),
        Err(Error::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn handler_errors_propagate_without_the_hook_and_log_with_it() -> Result<()> {
    let mut page = page("<div id='theme' data-theme-choice='neon'>x</div>")?;
    let node = page.select_one("#theme")?;
    page.add_listener(EventTarget::Node(node), EventKind::Click, Behavior::ThemeChoice);

    match page.click("#theme") {
        Err(Error::InvalidArgument(msg)) => assert_eq!(msg, "unknown theme: neon"),
        other => panic!("expected InvalidArgument, got {other:?}"),
    }

    page.install_error_hook();
    assert!(page.error_hook_installed());
    page.click("#theme")?;
    assert_eq!(
        page.console_errors(),
        ["Unhandled error: invalid argument: unknown theme: neon"]
    );
    Ok(())
}

#[test]
fn load_and_unload_follow_the_lifecycle() -> Result<()> {
    let mut page = page("<p></p>")?;
    assert!(matches!(page.unload(), Err(Error::InvalidArgument(_))));
    page.load()?;
    assert!(page.is_loaded());
    assert!(matches!(page.load(), Err(Error::InvalidArgument(_))));
    page.unload()?;
    assert!(!page.is_loaded());
    assert!(matches!(page.unload(), Err(Error::InvalidArgument(_))));
    Ok(())
}

#[test]
fn trace_log_respects_limit() -> Result<()> {
    let mut page = page("<button id='btn'>go</button>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    assert!(matches!(page.set_trace_log_limit(0), Err(Error::InvalidArgument(_))));
    page.set_trace_log_limit(2)?;
    page.click("#btn")?;
    page.click("#btn")?;
    page.click("#btn")?;
    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 2);
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn seeded_random_is_reproducible() -> Result<()> {
    let mut first = page("<p></p>")?;
    let mut second = page("<p></p>")?;
    let a: Vec<f64> = (0..5).map(|_| first.next_random_f64()).collect();
    let b: Vec<f64> = (0..5).map(|_| second.next_random_f64()).collect();
    assert_eq!(a, b);
    assert!(a.iter().all(|value| (0.0..1.0).contains(value)));
    Ok(())
}

#[test]
fn style_rules_are_installed_once_into_head() -> Result<()> {
    let mut page = page("<html><head></head><body></body></html>")?;
    assert!(page.install_style_rules("article", ".x { color: red }")?);
    assert!(!page.install_style_rules("article", ".x { color: red }")?);
    assert!(page.style_rules_installed("article"));
    assert_eq!(page.select_all(r#"head > style[data-rules="article"]"#)?.len(), 1);
    Ok(())
}

#[test]
fn assertion_failures_carry_a_dom_snippet() -> Result<()> {
    let page = page("<p id='p'>actual</p>")?;
    match page.assert_text("#p", "expected") {
        Err(Error::AssertionFailed {
            actual, dom_snippet, ..
        }) => {
            assert_eq!(actual, "actual");
            assert_eq!(dom_snippet, "<p id=\"p\">actual</p>");
        }
        other => panic!("expected AssertionFailed, got {other:?}"),
    }
    page.assert_exists("#p")?;
    assert_eq!(page.dump_dom("#p")?, "<p id=\"p\">actual</p>");
    Ok(())
}
