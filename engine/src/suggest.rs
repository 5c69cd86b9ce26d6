//! Debounced product-name suggestions.
//!
//! Typing calls [`SuggestionCoordinator::set_query`]; the frame loop calls
//! [`SuggestionCoordinator::poll`]. A lookup runs once the query has been
//! stable for the debounce interval, so a burst of keystrokes costs a single
//! catalog query.

use std::time::{Duration, Instant};

use lico_config::SuggestionSettings;
use lico_store::Catalog;
use lico_types::Product;

pub struct SuggestionCoordinator {
    catalog: Catalog,
    limit: usize,
    debounce: Duration,
    query: String,
    deadline: Option<Instant>,
    suggestions: Vec<Product>,
}

impl SuggestionCoordinator {
    #[must_use]
    pub fn new(catalog: Catalog, settings: &SuggestionSettings) -> Self {
        Self {
            catalog,
            limit: settings.limit,
            debounce: settings.debounce,
            query: String::new(),
            deadline: None,
            suggestions: Vec::new(),
        }
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Product] {
        &self.suggestions
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// A lookup is scheduled but has not run yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a new query. Returns `true` if the visible suggestions changed now.
    ///
    /// A blank query clears the suggestions immediately; anything else is
    /// looked up by [`Self::poll`] once `debounce` has elapsed since the last call.
    pub fn set_query(&mut self, query: &str, now: Instant) -> bool {
        let query = query.trim();
        if query.is_empty() {
            self.query.clear();
            self.deadline = None;
            let had_results = !self.suggestions.is_empty();
            self.suggestions.clear();
            return had_results;
        }
        if query != self.query {
            self.query = query.to_string();
            self.deadline = Some(now + self.debounce);
        }
        false
    }

    /// Run the pending lookup if its deadline has passed.
    ///
    /// Returns `true` when the suggestions changed. Catalog failures are
    /// logged and leave the previous suggestions in place.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {}
            _ => return false,
        }
        self.deadline = None;

        match self.catalog.search_by_name(&self.query, self.limit) {
            Ok(found) => {
                tracing::debug!(query = %self.query, results = found.len(), "Product lookup");
                if found == self.suggestions {
                    false
                } else {
                    self.suggestions = found;
                    true
                }
            }
            Err(err) => {
                tracing::warn!(query = %self.query, "Product lookup failed: {err:#}");
                false
            }
        }
    }

    /// Forget the query and results, e.g. when the add-product screen opens.
    pub fn reset(&mut self) {
        self.query.clear();
        self.deadline = None;
        self.suggestions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "\
id,name,category,supermarket
1,Leche entera,Lácteos,Mercadona
2,Leche desnatada,Lácteos,Mercadona
3,Lentejas,Legumbres,Mercadona
4,Pan de molde,Panadería,Mercadona
";

    fn coordinator(limit: usize) -> SuggestionCoordinator {
        let settings = SuggestionSettings {
            limit,
            debounce: Duration::from_millis(250),
            quick: Vec::new(),
        };
        SuggestionCoordinator::new(Catalog::from_seed(SEED).unwrap(), &settings)
    }

    fn names(c: &SuggestionCoordinator) -> Vec<&str> {
        c.suggestions().iter().map(Product::display_name).collect()
    }

    #[test]
    fn lookup_waits_for_debounce() {
        let mut c = coordinator(10);
        let t0 = Instant::now();
        c.set_query("le", t0);
        assert!(c.is_pending());
        assert!(!c.poll(t0 + Duration::from_millis(100)));
        assert!(c.suggestions().is_empty());

        assert!(c.poll(t0 + Duration::from_millis(250)));
        assert_eq!(names(&c), ["Leche entera", "Leche desnatada", "Lentejas"]);
        assert!(!c.is_pending());
    }

    #[test]
    fn typing_pushes_deadline_forward() {
        let mut c = coordinator(10);
        let t0 = Instant::now();
        c.set_query("l", t0);
        c.set_query("le", t0 + Duration::from_millis(200));
        c.set_query("lec", t0 + Duration::from_millis(400));
        assert!(!c.poll(t0 + Duration::from_millis(500)));
        assert!(c.poll(t0 + Duration::from_millis(650)));
        assert_eq!(names(&c), ["Leche entera", "Leche desnatada"]);
    }

    #[test]
    fn blank_query_clears_immediately() {
        let mut c = coordinator(10);
        let t0 = Instant::now();
        c.set_query("pan", t0);
        c.poll(t0 + Duration::from_secs(1));
        assert_eq!(names(&c), ["Pan de molde"]);

        assert!(c.set_query("   ", t0 + Duration::from_secs(2)));
        assert!(c.suggestions().is_empty());
        assert!(!c.is_pending());
        assert!(!c.set_query("", t0 + Duration::from_secs(3)));
    }

    #[test]
    fn limit_caps_results() {
        let mut c = coordinator(1);
        let t0 = Instant::now();
        c.set_query("le", t0);
        c.poll(t0 + Duration::from_secs(1));
        assert_eq!(names(&c), ["Leche entera"]);
    }

    #[test]
    fn unchanged_results_report_no_change() {
        let mut c = coordinator(10);
        let t0 = Instant::now();
        c.set_query("leche", t0);
        assert!(c.poll(t0 + Duration::from_secs(1)));
        c.set_query("lech", t0 + Duration::from_secs(2));
        assert!(!c.poll(t0 + Duration::from_secs(3)));
        assert_eq!(c.query(), "lech");
    }

    #[test]
    fn reset_forgets_everything() {
        let mut c = coordinator(10);
        let t0 = Instant::now();
        c.set_query("pan", t0);
        c.poll(t0 + Duration::from_secs(1));
        c.reset();
        assert!(c.suggestions().is_empty());
        assert_eq!(c.query(), "");
        assert!(!c.poll(t0 + Duration::from_secs(5)));
    }
}
