/// Per-source rate limit configuration. Any window left `None` is treated as
/// unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitConfig {
    pub(crate) per_second: Option<u32>,
    pub(crate) per_hour: Option<u32>,
    pub(crate) per_day: Option<u32>,
}

impl RateLimitConfig {
    pub fn builder() -> RateLimitConfigBuilder {
        RateLimitConfigBuilder::default()
    }

    pub fn per_second(&self) -> Option<u32> {
        self.per_second
    }

    pub fn per_hour(&self) -> Option<u32> {
        self.per_hour
    }

    pub fn per_day(&self) -> Option<u32> {
        self.per_day
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitConfigBuilder {
    per_second: Option<u32>,
    per_hour: Option<u32>,
    per_day: Option<u32>,
}

impl RateLimitConfigBuilder {
    pub fn per_second(mut self, n: u32) -> Self {
        self.per_second = Some(n);
        self
    }

    pub fn per_hour(mut self, n: u32) -> Self {
        self.per_hour = Some(n);
        self
    }

    pub fn per_day(mut self, n: u32) -> Self {
        self.per_day = Some(n);
        self
    }

    pub fn build(self) -> RateLimitConfig {
        RateLimitConfig {
            per_second: self.per_second,
            per_hour: self.per_hour,
            per_day: self.per_day,
        }
    }
}
