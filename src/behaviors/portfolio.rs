use serde::Serialize;

use super::{Behavior, fragment_target, replace_with_element, set_active_link};
use crate::dom::NodeId;
use crate::page::{EventKind, EventState, EventTarget, Page, ScrollBlock};
use crate::preferences::{PortfolioPreferences, Theme};
use crate::{Error, Result};

const NAV_LINK_SELECTOR: &str = ".nav-link";
const NAVBAR_SELECTOR: &str = ".navbar";
const NAME_INPUT: &str = "#nameInput";
const GREETING_OUTPUT: &str = "#greetingOutput";
const GREET_TRIGGER: &str = r#"[data-action="greet"]"#;
const THEME_TRIGGER: &str = "[data-theme-choice]";
const THEME_DEMO: &str = "#themeDemo";
const GREETING_FADE_MS: i64 = 200;
const PROGRESS_RESTORE_MS: i64 = 100;
const PROGRESS_THRESHOLD: f64 = 0.5;
const CARD_THRESHOLD: f64 = 0.1;
const NAVBAR_SCROLLED: &str = "rgba(8, 145, 178, 0.95)";
const NAVBAR_TOP: &str = "rgba(8, 145, 178, 1)";

/// Per-visit state that ends up in the saved preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PortfolioSession {
    pub(crate) preferred_theme: Theme,
    pub(crate) viewed_sections: Vec<String>,
}

impl PortfolioSession {
    fn mark_viewed(&mut self, section: &str) {
        if !self.viewed_sections.iter().any(|viewed| viewed == section) {
            self.viewed_sections.push(section.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub name: &'static str,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillsCatalog {
    pub frontend: Vec<Skill>,
    pub backend: Vec<Skill>,
    pub tools: Vec<Skill>,
}

fn skills(entries: &[(&'static str, u8)]) -> Vec<Skill> {
    entries
        .iter()
        .map(|&(name, level)| Skill { name, level })
        .collect()
}

pub fn skills_data() -> SkillsCatalog {
    SkillsCatalog {
        frontend: skills(&[
            ("HTML", 95),
            ("CSS", 90),
            ("JavaScript", 88),
            ("Bootstrap", 92),
            ("React", 80),
            ("Vue.js", 75),
        ]),
        backend: skills(&[
            ("Node.js", 85),
            ("Python", 80),
            ("PHP", 75),
            ("Express.js", 82),
            ("MongoDB", 78),
            ("MySQL", 85),
        ]),
        tools: skills(&[
            ("Git/GitHub", 90),
            ("VS Code", 95),
            ("Webpack", 70),
            ("Sass/SCSS", 85),
            ("NPM/Yarn", 88),
            ("Chrome DevTools", 92),
        ]),
    }
}

fn greetings(name: &str) -> [String; 5] {
    [
        format!("Hello {name}! Welcome to my ePortfolio! 👋"),
        format!("Hi there {name}! Thanks for visiting! 🌟"),
        format!("Greetings {name}! Explore my full stack skills! 🚀"),
        format!("Welcome {name}! Let's build something amazing! 💻"),
        format!("Hey {name}! Ready to see some code magic? ✨"),
    ]
}

pub fn install_portfolio(page: &mut Page) -> Result<()> {
    page.add_listener(
        EventTarget::Document,
        EventKind::DomContentLoaded,
        Behavior::PortfolioReady,
    );
    Ok(())
}

pub(super) fn ready(page: &mut Page) -> Result<()> {
    page.console_log("ePortfolio JavaScript initialized");

    for bar in page.dom.query_selector_all(".progress-bar")? {
        page.observe(bar, PROGRESS_THRESHOLD, Behavior::AnimateProgressBar, false)?;
    }
    for card in page.dom.query_selector_all(".card")? {
        page.observe(card, CARD_THRESHOLD, Behavior::RevealCard, false)?;
    }

    if let Some(input) = page.dom.query_selector(NAME_INPUT)? {
        let target = EventTarget::Node(input);
        page.add_listener(target, EventKind::Input, Behavior::ValidateName);
        page.add_listener(target, EventKind::KeyPress, Behavior::GreetOnEnter);
    }
    for trigger in page.dom.query_selector_all(GREET_TRIGGER)? {
        page.add_listener(EventTarget::Node(trigger), EventKind::Click, Behavior::Greet);
    }
    for trigger in page.dom.query_selector_all(THEME_TRIGGER)? {
        page.add_listener(
            EventTarget::Node(trigger),
            EventKind::Click,
            Behavior::ThemeChoice,
        );
    }

    let catalog = serde_json::to_string(&skills_data())
        .map_err(|err| Error::InvalidArgument(err.to_string()))?;
    page.console_log(format!("Skills data loaded: {catalog}"));

    load_preferences(page);
    page.add_listener(EventTarget::Window, EventKind::Load, Behavior::ReportLoadTime);
    page.install_error_hook();

    page.add_listener(EventTarget::Window, EventKind::Scroll, Behavior::PortfolioScroll);
    for link in page.dom.query_selector_all(NAV_LINK_SELECTOR)? {
        page.add_listener(EventTarget::Node(link), EventKind::Click, Behavior::NavLinkClick);
    }
    page.add_listener(
        EventTarget::Window,
        EventKind::BeforeUnload,
        Behavior::SavePreferences,
    );

    page.console_log("All ePortfolio features loaded successfully! 🚀");
    Ok(())
}

// A stored blob that does not parse counts as no preferences.
fn load_preferences(page: &mut Page) {
    let key = page.config.storage_keys.preferences.clone();
    match PortfolioPreferences::load(page.storage(), &key) {
        Ok(Some(saved)) => {
            page.console_log(format!("Welcome back! Last visited: {}", saved.last_visited));
            page.portfolio.preferred_theme = saved.preferred_theme;
            for section in &saved.viewed_sections {
                page.portfolio.mark_viewed(section);
            }
        }
        Ok(None) => {}
        Err(err) => page.console_error(format!("Ignoring saved preferences: {err}")),
    }
}

pub(super) fn save_preferences(page: &mut Page) -> Result<()> {
    let preferences = PortfolioPreferences {
        last_visited: page.timestamp(),
        preferred_theme: page.portfolio.preferred_theme,
        viewed_sections: page.portfolio.viewed_sections.clone(),
    };
    let key = page.config.storage_keys.preferences.clone();
    preferences.save(page.storage_mut(), &key)
}

impl Page {
    /// Smooth-scrolls so the element with `section_id` sits at the top.
    /// Unknown ids are ignored.
    pub fn scroll_to_section(&mut self, section_id: &str) -> Result<()> {
        if let Some(section) = self.dom.by_id(section_id) {
            self.scroll_into_view(section, ScrollBlock::Start, true)?;
        }
        Ok(())
    }

    pub fn generate_greeting(&mut self) -> Result<()> {
        let (Some(input), Some(output)) = (
            self.dom.query_selector(NAME_INPUT)?,
            self.dom.query_selector(GREETING_OUTPUT)?,
        ) else {
            return Ok(());
        };

        let value = self.dom.value(input)?;
        let name = value.trim();
        if name.is_empty() {
            replace_with_element(
                self,
                output,
                "span",
                "text-warning",
                "Please enter your name first!",
            )?;
            return Ok(());
        }

        let choices = greetings(name);
        let index = ((self.next_random_f64() * choices.len() as f64) as usize).min(choices.len() - 1);
        let message = choices[index].clone();

        self.dom.style_set(output, "opacity", "0")?;
        self.set_timeout(
            Behavior::RevealGreeting {
                node: output,
                message,
            },
            GREETING_FADE_MS,
        );
        Ok(())
    }

    /// Applies `theme` to the demo panel and remembers it for this visit.
    pub fn change_theme(&mut self, theme: &str) -> Result<()> {
        let theme: Theme = theme.parse()?;
        self.portfolio.preferred_theme = theme;

        let Some(demo) = self.dom.query_selector(THEME_DEMO)? else {
            return Ok(());
        };
        for known in Theme::ALL {
            self.dom.class_remove(demo, &known.class_name())?;
        }
        self.dom.class_add(demo, &theme.class_name())?;
        replace_with_element(self, demo, "p", "mb-0", theme.message())?;
        Ok(())
    }

    /// Recomputes the active portfolio section from the current scroll
    /// position. Returns the active section id, if any.
    pub fn update_active_nav_link(&mut self) -> Result<Option<String>> {
        let line = self.config.navigation.active_line_y;
        let mut current = None;
        for section_id in &self.config.navigation.portfolio_sections {
            let Some(section) = self.dom.by_id(section_id) else {
                continue;
            };
            let Some(rect) = self.bounding_client_rect(section) else {
                continue;
            };
            if rect.top <= line && rect.bottom >= line {
                current = Some(section_id.clone());
            }
        }

        set_active_link(self, NAV_LINK_SELECTOR, current.as_deref().unwrap_or_default())?;
        if let Some(section) = &current {
            self.portfolio.mark_viewed(section);
        }
        Ok(current)
    }
}

pub(super) fn nav_link_click(page: &mut Page, event: &mut EventState) -> Result<()> {
    event.prevent_default();
    let Some(link) = event.current_node() else {
        return Ok(());
    };
    let target = fragment_target(page, link).unwrap_or_default();
    page.scroll_to_section(&target)
}

pub(super) fn on_scroll(page: &mut Page) -> Result<()> {
    page.update_active_nav_link()?;
    if let Some(navbar) = page.dom.query_selector(NAVBAR_SELECTOR)? {
        let color = if page.scroll_y() > page.config.navigation.navbar_threshold {
            NAVBAR_SCROLLED
        } else {
            NAVBAR_TOP
        };
        page.dom.style_set(navbar, "background-color", color)?;
    }
    Ok(())
}

pub(super) fn validate_name(page: &mut Page, event: &EventState) -> Result<()> {
    let Some(input) = event.current_node() else {
        return Ok(());
    };
    let length = page.dom.value(input)?.trim().chars().count();
    match length {
        0 => {
            page.dom.class_remove(input, "is-valid")?;
            page.dom.class_remove(input, "is-invalid")?;
        }
        1 => {
            page.dom.class_add(input, "is-invalid")?;
            page.dom.class_remove(input, "is-valid")?;
        }
        _ => {
            page.dom.class_add(input, "is-valid")?;
            page.dom.class_remove(input, "is-invalid")?;
        }
    }
    Ok(())
}

pub(super) fn theme_choice(page: &mut Page, event: &EventState) -> Result<()> {
    let Some(trigger) = event.current_node() else {
        return Ok(());
    };
    let theme = page.dom.attr(trigger, "data-theme-choice").unwrap_or_default();
    page.change_theme(&theme)
}

pub(super) fn animate_progress_bar(page: &mut Page, event: &EventState) -> Result<()> {
    let Some(bar) = event.target_node() else {
        return Ok(());
    };
    let width = page.dom.style_get(bar, "width")?;
    page.dom.style_set(bar, "width", "0%")?;
    page.set_timeout(
        Behavior::SetStyle {
            node: bar,
            property: "width".into(),
            value: width,
        },
        PROGRESS_RESTORE_MS,
    );
    Ok(())
}

pub(super) fn reveal_card(page: &mut Page, event: &EventState) -> Result<()> {
    match event.target_node() {
        Some(card) => page.dom.class_add(card, "fade-in-up"),
        None => Ok(()),
    }
}

pub(super) fn reveal_greeting(page: &mut Page, output: NodeId, message: &str) -> Result<()> {
    if !page.dom.is_connected(output) {
        return Ok(());
    }
    replace_with_element(page, output, "span", "text-primary fw-bold", message)?;
    page.dom.style_set(output, "opacity", "1")
}
