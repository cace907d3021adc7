use super::{Behavior, fragment_target, search, set_active_link};
use crate::page::{EventKind, EventState, EventTarget, Page, ShareRequest};
use crate::preferences::{self, Bookmark};
use crate::Result;

const SMOOTH_ANCHOR_SELECTOR: &str = r##".nav-link[href^="#"], .toc-list a[href^="#"]"##;
const ACTIVE_NAV_SELECTOR: &str = r##".nav-link[href^="#"]"##;
const LAZY_IMAGE_SELECTOR: &str = r#"img[src*="placeholder.svg"]"#;
const ACTION_LINK_SELECTOR: &str = r##"a[href="#"]"##;
const DARK_MODE_CLASS: &str = "dark-mode";
const DARK_MODE_TOGGLE: &str = "#darkModeToggle";
const DARK_MODE_ICON: &str = "#darkModeToggle i";
const BACK_TO_TOP: &str = "#backToTop";
const SCROLL_SPY_KEY: &str = "scroll-spy";
const TRANSITION_RESET_MS: i64 = 300;

const ARTICLE_STYLE_RULES: &str = r#"
    .search-highlight {
        background-color: #ffeb3b;
        color: #000;
        padding: 2px 4px;
        border-radius: 3px;
        font-weight: bold;
    }

    .dark-mode .search-highlight {
        background-color: #ff9800;
        color: #000;
    }

    .fade-in {
        animation: fadeIn 0.5s ease-in;
    }

    @keyframes fadeIn {
        from { opacity: 0; }
        to { opacity: 1; }
    }

    .nav-link.active {
        color: var(--primary-color) !important;
        font-weight: 600;
        background-color: rgba(0, 102, 204, 0.1);
        border-radius: 4px;
        padding-left: 0.5rem !important;
    }
"#;

/// Installs the article page: style rules now, everything else once the
/// document has loaded.
pub fn install_article(page: &mut Page) -> Result<()> {
    page.install_style_rules("article", ARTICLE_STYLE_RULES)?;
    page.add_listener(
        EventTarget::Document,
        EventKind::DomContentLoaded,
        Behavior::ArticleReady,
    );
    Ok(())
}

pub(super) fn ready(page: &mut Page) -> Result<()> {
    search::install(page)?;
    init_dark_mode(page)?;
    init_back_to_top(page)?;
    init_smooth_scrolling(page)?;
    init_lazy_images(page)?;
    init_action_links(page)?;
    page.console_log("[v0] Nepal Wikipedia loaded successfully");
    Ok(())
}

fn init_dark_mode(page: &mut Page) -> Result<()> {
    let key = page.config.storage_keys.dark_mode.clone();
    if preferences::load_dark_mode(page.storage(), &key)? {
        let body = page.body()?;
        page.dom.class_add(body, DARK_MODE_CLASS)?;
        update_dark_mode_icon(page, true)?;
    }
    if let Some(toggle) = page.dom.query_selector(DARK_MODE_TOGGLE)? {
        page.add_listener(
            EventTarget::Node(toggle),
            EventKind::Click,
            Behavior::DarkModeToggle,
        );
    }
    Ok(())
}

fn update_dark_mode_icon(page: &mut Page, dark: bool) -> Result<()> {
    if let Some(icon) = page.dom.query_selector(DARK_MODE_ICON)? {
        let class_name = if dark { "fas fa-sun" } else { "fas fa-moon" };
        page.dom.set_class_name(icon, class_name)?;
    }
    Ok(())
}

pub(super) fn toggle_dark_mode(page: &mut Page) -> Result<()> {
    let body = page.body()?;
    let dark = page.dom.class_toggle(body, DARK_MODE_CLASS)?;
    let key = page.config.storage_keys.dark_mode.clone();
    preferences::save_dark_mode(page.storage_mut(), &key, dark)?;
    update_dark_mode_icon(page, dark)?;

    page.dom.style_set(body, "transition", "all 0.3s ease")?;
    page.set_timeout(
        Behavior::SetStyle {
            node: body,
            property: "transition".into(),
            value: String::new(),
        },
        TRANSITION_RESET_MS,
    );
    Ok(())
}

fn init_back_to_top(page: &mut Page) -> Result<()> {
    let Some(button) = page.dom.query_selector(BACK_TO_TOP)? else {
        return Ok(());
    };
    page.add_listener(
        EventTarget::Window,
        EventKind::Scroll,
        Behavior::BackToTopVisibility,
    );
    page.add_listener(
        EventTarget::Node(button),
        EventKind::Click,
        Behavior::BackToTopClick,
    );
    Ok(())
}

pub(super) fn update_back_to_top(page: &mut Page) -> Result<()> {
    let Some(button) = page.dom.query_selector(BACK_TO_TOP)? else {
        return Ok(());
    };
    if page.scroll_y() > page.config.navigation.back_to_top_threshold {
        page.dom.class_add(button, "show")
    } else {
        page.dom.class_remove(button, "show")
    }
}

pub(super) fn back_to_top(page: &mut Page) -> Result<()> {
    page.window_scroll_to(0, true)
}

fn init_smooth_scrolling(page: &mut Page) -> Result<()> {
    for link in page.dom.query_selector_all(SMOOTH_ANCHOR_SELECTOR)? {
        page.add_listener(EventTarget::Node(link), EventKind::Click, Behavior::SmoothAnchor);
    }
    page.add_listener(EventTarget::Window, EventKind::Scroll, Behavior::ScrollSpy);
    Ok(())
}

pub(super) fn smooth_anchor(page: &mut Page, event: &mut EventState) -> Result<()> {
    event.prevent_default();
    let Some(link) = event.current_node() else {
        return Ok(());
    };
    let Some(target_id) = fragment_target(page, link) else {
        return Ok(());
    };
    let Some(target) = page.dom.by_id(&target_id) else {
        return Ok(());
    };
    let Some(rect) = page.bounding_client_rect(target) else {
        return Ok(());
    };

    let top = rect
        .top
        .saturating_add(page.scroll_y())
        .saturating_sub(page.config.navigation.header_offset);
    page.window_scroll_to(top, true)?;
    set_active_link(page, ACTIVE_NAV_SELECTOR, &target_id)
}

pub(super) fn scroll_spy(page: &mut Page) -> Result<()> {
    let limit = page.config.navigation.scroll_spy_throttle_ms;
    if !page.throttle_gate(SCROLL_SPY_KEY, limit) {
        return Ok(());
    }

    let position = page
        .scroll_y()
        .saturating_add(page.config.navigation.scroll_spy_offset);
    let sections = page
        .dom
        .query_selector_all(&page.config.navigation.section_selector)?;
    for section in sections {
        let Some(layout) = page.layout_of(section) else {
            continue;
        };
        if position >= layout.top && position < layout.top.saturating_add(layout.height) {
            let id = page.dom.attr(section, "id").unwrap_or_default();
            set_active_link(page, ACTIVE_NAV_SELECTOR, &id)?;
        }
    }
    Ok(())
}

fn init_lazy_images(page: &mut Page) -> Result<()> {
    for image in page.dom.query_selector_all(LAZY_IMAGE_SELECTOR)? {
        page.observe(image, 0.0, Behavior::RevealImage, true)?;
    }
    Ok(())
}

pub(super) fn reveal_image(page: &mut Page, event: &EventState) -> Result<()> {
    match event.target_node() {
        Some(image) => page.dom.class_add(image, "fade-in"),
        None => Ok(()),
    }
}

fn init_action_links(page: &mut Page) -> Result<()> {
    for link in page.dom.query_selector_all(ACTION_LINK_SELECTOR)? {
        let text = page.dom.text_content(link);
        let target = EventTarget::Node(link);
        if text.contains("Print") {
            page.add_listener(target, EventKind::Click, Behavior::PrintLink);
        }
        if text.contains("Share") {
            page.add_listener(target, EventKind::Click, Behavior::ShareLink);
        }
        if text.contains("Bookmark") {
            page.add_listener(target, EventKind::Click, Behavior::BookmarkLink);
        }
    }
    Ok(())
}

pub(super) fn print_link(page: &mut Page, event: &mut EventState) -> Result<()> {
    event.prevent_default();
    page.print();
    Ok(())
}

pub(super) fn share_link(page: &mut Page, event: &mut EventState) -> Result<()> {
    event.prevent_default();
    let url = page.url().to_string();
    if page.share_supported() {
        let request = ShareRequest {
            title: page.config.share.title.clone(),
            text: page.config.share.text.clone(),
            url,
        };
        page.share(request);
    } else {
        page.set_clipboard_text(&url);
        page.alert("URL copied to clipboard!".into());
    }
    Ok(())
}

pub(super) fn bookmark_link(page: &mut Page, event: &mut EventState) -> Result<()> {
    event.prevent_default();
    let bookmark = Bookmark {
        title: page.dom.title(),
        url: page.url().to_string(),
        timestamp: page.timestamp(),
    };
    let key = page.config.storage_keys.bookmarks.clone();
    let message = if preferences::add_bookmark(page.storage_mut(), &key, bookmark)? {
        "Page bookmarked!"
    } else {
        "Page already bookmarked!"
    };
    page.alert(message.into());
    Ok(())
}
