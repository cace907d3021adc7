//! Page behaviours. Each listener, observer callback and timer task is a
//! [`Behavior`] value; the page runtime stores them and calls
//! [`Behavior::run`] when the matching event fires.

use crate::dom::NodeId;
use crate::page::{EventState, Page};
use crate::Result;

mod article;
mod portfolio;
mod search;

pub use article::install_article;
pub(crate) use portfolio::PortfolioSession;
pub use portfolio::{Skill, SkillsCatalog, install_portfolio, skills_data};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Behavior {
    // Article page.
    ArticleReady,
    SearchButton,
    SearchOnEnter,
    LiveSearch,
    DarkModeToggle,
    BackToTopVisibility,
    BackToTopClick,
    SmoothAnchor,
    ScrollSpy,
    RevealImage,
    PrintLink,
    ShareLink,
    BookmarkLink,

    // Portfolio page.
    PortfolioReady,
    NavLinkClick,
    PortfolioScroll,
    Greet,
    GreetOnEnter,
    ValidateName,
    ThemeChoice,
    AnimateProgressBar,
    RevealCard,
    SavePreferences,
    ReportLoadTime,

    // Timer tasks.
    SetStyle {
        node: NodeId,
        property: String,
        value: String,
    },
    RevealGreeting {
        node: NodeId,
        message: String,
    },
    ReleaseThrottle {
        key: String,
    },
}

impl Behavior {
    pub(crate) fn run(&self, page: &mut Page, event: &mut EventState) -> Result<()> {
        match self {
            Self::ArticleReady => article::ready(page),
            Self::SearchButton => search::on_search_button(page),
            Self::SearchOnEnter => search::on_search_keypress(page, event),
            Self::LiveSearch => search::on_search_input(page, event),
            Self::DarkModeToggle => article::toggle_dark_mode(page),
            Self::BackToTopVisibility => article::update_back_to_top(page),
            Self::BackToTopClick => article::back_to_top(page),
            Self::SmoothAnchor => article::smooth_anchor(page, event),
            Self::ScrollSpy => article::scroll_spy(page),
            Self::RevealImage => article::reveal_image(page, event),
            Self::PrintLink => article::print_link(page, event),
            Self::ShareLink => article::share_link(page, event),
            Self::BookmarkLink => article::bookmark_link(page, event),

            Self::PortfolioReady => portfolio::ready(page),
            Self::NavLinkClick => portfolio::nav_link_click(page, event),
            Self::PortfolioScroll => portfolio::on_scroll(page),
            Self::Greet => page.generate_greeting(),
            Self::GreetOnEnter => {
                if event.key_is("Enter") {
                    page.generate_greeting()?;
                }
                Ok(())
            }
            Self::ValidateName => portfolio::validate_name(page, event),
            Self::ThemeChoice => portfolio::theme_choice(page, event),
            Self::AnimateProgressBar => portfolio::animate_progress_bar(page, event),
            Self::RevealCard => portfolio::reveal_card(page, event),
            Self::SavePreferences => portfolio::save_preferences(page),
            Self::ReportLoadTime => {
                let duration = page.load_event_duration_ms();
                page.console_log(format!("Page load time: {duration} ms"));
                Ok(())
            }

            Self::SetStyle {
                node,
                property,
                value,
            } => {
                if page.dom.is_connected(*node) {
                    page.dom.style_set(*node, property, value)?;
                }
                Ok(())
            }
            Self::RevealGreeting { node, message } => {
                portfolio::reveal_greeting(page, *node, message)
            }
            Self::ReleaseThrottle { key } => {
                page.release_throttle(key);
                Ok(())
            }
        }
    }

    pub(crate) fn label(&self) -> String {
        match self {
            Self::SetStyle {
                property, value, ..
            } => format!("set-style {property}={value:?}"),
            Self::RevealGreeting { .. } => "reveal-greeting".into(),
            Self::ReleaseThrottle { key } => format!("release-throttle {key}"),
            other => format!("{other:?}"),
        }
    }
}

/// Replaces the children of `node` with a single `<tag class=...>text</tag>`.
/// `text` always lands in a text node, never parsed as markup.
pub(crate) fn replace_with_element(
    page: &mut Page,
    node: NodeId,
    tag: &str,
    class_name: &str,
    text: &str,
) -> Result<NodeId> {
    page.dom.set_text_content(node, "")?;
    let child = page.dom.create_detached_element(tag);
    page.dom.set_class_name(child, class_name)?;
    let inner = page.dom.create_detached_text(text);
    page.dom.append_child(child, inner)?;
    page.dom.append_child(node, child)?;
    Ok(child)
}

/// `href` of `node` with the leading `#` removed, if it is a fragment link.
pub(crate) fn fragment_target(page: &Page, node: NodeId) -> Option<String> {
    page.dom
        .attr(node, "href")
        .and_then(|href| href.strip_prefix('#').map(str::to_string))
}

/// Marks every link matching `selector` inactive, then `href="#{active_id}"`
/// active.
pub(crate) fn set_active_link(page: &mut Page, selector: &str, active_id: &str) -> Result<()> {
    let wanted = format!("#{active_id}");
    for link in page.dom.query_selector_all(selector)? {
        page.dom.class_remove(link, "active")?;
        if !active_id.is_empty() && page.dom.attr(link, "href").as_deref() == Some(wanted.as_str()) {
            page.dom.class_add(link, "active")?;
        }
    }
    Ok(())
}
