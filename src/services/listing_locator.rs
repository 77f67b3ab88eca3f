use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::{
    configuration::MarketplaceSettings,
    domain::{ListingRecord, PriceMap},
};

use super::ScrapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// Title and price are read from inside each result card.
    Card,
    /// Titles and prices are queried separately and zipped by index.
    Positional,
}

/// Finds listings in a rendered search results page.
pub trait ListingLocator: Send + Sync {
    /// Selector whose first match means the results have rendered.
    fn ready_selector(&self) -> &str;

    fn locate(&self, document: &Html) -> PriceMap;
}

pub fn build_locator(
    settings: &MarketplaceSettings,
) -> Result<Box<dyn ListingLocator>, ScrapeError> {
    match settings.strategy {
        LocatorStrategy::Card => Ok(Box::new(CardLocator::new(
            &settings.card,
            &settings.title,
            &settings.price,
        )?)),
        LocatorStrategy::Positional => Ok(Box::new(PositionalLocator::new(
            &settings.title,
            &settings.price,
        )?)),
    }
}

fn parse_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        reason: format!("{:?}", e),
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect()
}

pub struct CardLocator {
    card_css: String,
    card: Selector,
    title: Selector,
    price: Selector,
}

impl CardLocator {
    pub fn new(card: &str, title: &str, price: &str) -> Result<Self, ScrapeError> {
        Ok(CardLocator {
            card_css: card.to_string(),
            card: parse_selector(card)?,
            title: parse_selector(title)?,
            price: parse_selector(price)?,
        })
    }
}

impl ListingLocator for CardLocator {
    fn ready_selector(&self) -> &str {
        &self.card_css
    }

    fn locate(&self, document: &Html) -> PriceMap {
        let mut cards = 0;
        let mut incomplete = 0;

        let listings: PriceMap = document
            .select(&self.card)
            .filter_map(|card| {
                cards += 1;
                let title = card.select(&self.title).next().map(element_text);
                let price = card.select(&self.price).next().map(element_text);
                match (title, price) {
                    (Some(title), Some(price)) => Some(ListingRecord::new(&title, &price)),
                    _ => {
                        incomplete += 1;
                        None
                    }
                }
            })
            .collect();

        log::info!(
            "Found {} cards, skipped {} incomplete | {} listings",
            cards,
            incomplete,
            listings.len()
        );

        listings
    }
}

pub struct PositionalLocator {
    price_css: String,
    title: Selector,
    price: Selector,
}

impl PositionalLocator {
    pub fn new(title: &str, price: &str) -> Result<Self, ScrapeError> {
        Ok(PositionalLocator {
            price_css: price.to_string(),
            title: parse_selector(title)?,
            price: parse_selector(price)?,
        })
    }
}

impl ListingLocator for PositionalLocator {
    fn ready_selector(&self) -> &str {
        &self.price_css
    }

    /// Assumes both node sets render in the same order. Nodes past the end
    /// of the shorter sequence are dropped.
    fn locate(&self, document: &Html) -> PriceMap {
        let titles: Vec<String> = document.select(&self.title).map(element_text).collect();
        let prices: Vec<String> = document.select(&self.price).map(element_text).collect();

        if titles.len() != prices.len() {
            log::warn!(
                "Title/price count mismatch ({} titles, {} prices), pairing may be off",
                titles.len(),
                prices.len()
            );
        }

        let listings: PriceMap = titles
            .iter()
            .zip(prices.iter())
            .map(|(title, price)| ListingRecord::new(title, price))
            .collect();

        log::info!(
            "Found {} titles and {} prices | {} listings",
            titles.len(),
            prices.len(),
            listings.len()
        );

        listings
    }
}
