//! Ordered selector fallbacks.
//!
//! Site templates drift: a headline that used to be `h1.title_news_detail`
//! becomes `h1.title-detail` after a redesign. A [`SelectorCascade`] holds the
//! known variants in priority order and stops at the first one that yields a
//! non-empty value, so old and new pages both parse.

use crate::error::{ScrapeError, ScrapeResult};
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

/// How a matched element is turned into a value.
#[derive(Debug, Clone, Copy)]
pub enum Extract {
    /// Whitespace-normalized text content.
    Text,
    /// First non-empty attribute among these names.
    Attr(&'static [&'static str]),
}

/// One selector and its extraction strategy.
#[derive(Debug, Clone)]
pub struct Rule {
    selector: Selector,
    extract: Extract,
}

impl Rule {
    fn new(css: &str, extract: Extract) -> ScrapeResult<Self> {
        let selector = Selector::parse(css).map_err(|e| ScrapeError::Selector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { selector, extract })
    }

    fn value(&self, element: ElementRef<'_>) -> Option<String> {
        let value = match self.extract {
            Extract::Text => element_text(element),
            Extract::Attr(names) => names
                .iter()
                .filter_map(|name| element.value().attr(name))
                .map(str::trim)
                .find(|v| !v.is_empty() && !v.starts_with("data:"))
                .map(str::to_string)
                .unwrap_or_default(),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// Ordered list of rules evaluated with early exit.
#[derive(Debug, Clone, Default)]
pub struct SelectorCascade {
    rules: Vec<Rule>,
}

impl SelectorCascade {
    /// Cascade extracting element text from each selector in turn.
    pub fn text(selectors: &[&str]) -> ScrapeResult<Self> {
        Self::default().then_all(selectors, Extract::Text)
    }

    /// Cascade extracting one of `attrs` from each selector in turn.
    pub fn attr(selectors: &[&str], attrs: &'static [&'static str]) -> ScrapeResult<Self> {
        Self::default().then_all(selectors, Extract::Attr(attrs))
    }

    /// Append a lower-priority rule.
    pub fn then(mut self, selector: &str, extract: Extract) -> ScrapeResult<Self> {
        self.rules.push(Rule::new(selector, extract)?);
        Ok(self)
    }

    fn then_all(self, selectors: &[&str], extract: Extract) -> ScrapeResult<Self> {
        selectors
            .iter()
            .try_fold(self, |cascade, css| cascade.then(css, extract))
    }

    /// Value of the first element, under the first rule, that yields anything.
    pub fn first(&self, document: &Html) -> Option<String> {
        self.first_with(document, |rule, element| rule.value(element))
    }

    /// Like [`first`](Self::first) but with a caller-supplied extraction, for
    /// fields that need more than text or an attribute.
    pub fn first_with<'a, T>(
        &self,
        document: &'a Html,
        mut extract: impl FnMut(&Rule, ElementRef<'a>) -> Option<T>,
    ) -> Option<T> {
        self.rules.iter().find_map(|rule| {
            document
                .select(&rule.selector)
                .find_map(|element| extract(rule, element))
        })
    }

    /// Every value from every rule, de-duplicated, in rule-then-document order.
    pub fn union(&self, document: &Html) -> Vec<String> {
        self.rules
            .iter()
            .flat_map(|rule| {
                document
                    .select(&rule.selector)
                    .filter_map(move |element| rule.value(element))
            })
            .unique()
            .collect()
    }

    /// Matched elements grouped per rule, each group in document order.
    /// Callers walking containers can stop a group early and move to the next.
    pub fn groups<'a>(
        &'a self,
        document: &'a Html,
    ) -> impl Iterator<Item = impl Iterator<Item = ElementRef<'a>> + 'a> + 'a {
        self.rules.iter().map(move |rule| document.select(&rule.selector))
    }
}

/// Text content of an element with runs of whitespace collapsed to one space.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(element.text())
}

/// Concatenate text fragments, then collapse whitespace runs and trim.
pub fn collapse_whitespace<'s>(fragments: impl Iterator<Item = &'s str>) -> String {
    let joined: String = fragments.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
