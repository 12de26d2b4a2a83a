//! Ordered rule tables.
//!
//! Each extractor declares its heuristics as a static slice of [`Rule`]s so
//! precedence is visible in one place and each rule can be tested alone.

pub(crate) struct Rule<C: ?Sized, T> {
    pub name: &'static str,
    pub applies: fn(&C) -> bool,
    pub extract: fn(&C) -> T,
}

impl<C: ?Sized, T> Rule<C, T> {
    pub fn evaluate(&self, ctx: &C) -> Option<T> {
        if (self.applies)(ctx) {
            tracing::trace!(rule = self.name, "rule matched");
            Some((self.extract)(ctx))
        } else {
            None
        }
    }
}

/// Output of the first rule that applies.
pub(crate) fn first_match<C: ?Sized, T>(rules: &[Rule<C, T>], ctx: &C) -> Option<T> {
    rules.iter().find_map(|rule| rule.evaluate(ctx))
}

/// Outputs of every rule that applies, in table order.
pub(crate) fn all_matches<C: ?Sized, T>(rules: &[Rule<C, T>], ctx: &C) -> Vec<T> {
    rules.iter().filter_map(|rule| rule.evaluate(ctx)).collect()
}
