//! Runtime feature flags.
//!
//! A feature is on when its `use_*` flag is set and its config section is
//! present. Currently only Stripe is switchable; the catalog is always served.

use coursehub_config::AppConfig;

pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

pub fn is_stripe_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_stripe, config.stripe.as_ref())
}
