/// What the normalizer does when a request carries no timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Reject the request; the output must be reproducible from the input alone.
    #[default]
    Require,
    /// Substitute the current unix time. Results are not reproducible.
    WallClock,
}

#[derive(Clone, Debug, Default)]
pub struct ResolverCfg {
    pub timestamp_policy: TimestampPolicy,
}

impl ResolverCfg {
    /// Cfg matching the legacy proxy, which filled in the current time.
    pub fn with_clock_fallback() -> Self {
        Self {
            timestamp_policy: TimestampPolicy::WallClock,
        }
    }
}
