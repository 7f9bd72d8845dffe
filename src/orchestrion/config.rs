use std::time::Duration;

/// Timing and humanization knobs for event delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Upper bound of the random onset spread within one chord.
    pub max_delay: Duration,
    /// Lower bound of the velocity scale, in percent.
    pub velocity_min_percent: u32,
    /// Upper bound of the velocity scale, in percent.
    pub velocity_max_percent: u32,
    /// How long a pedal-down takes to reach the strings.
    pub pedal_delay: Duration,
    /// Seed of the humanization stream.
    pub seed: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_millis(50),
            velocity_min_percent: 70,
            velocity_max_percent: 130,
            pedal_delay: Duration::from_millis(100),
            seed: 0,
        }
    }
}

impl DeliveryConfig {
    /// No spread, no velocity change and an instant pedal.
    pub fn exact() -> Self {
        Self {
            max_delay: Duration::ZERO,
            velocity_min_percent: 100,
            velocity_max_percent: 100,
            pedal_delay: Duration::ZERO,
            seed: 0,
        }
    }
}

/// Loop region in notated ticks.
///
/// Looping only takes effect while `enabled` and a right bound is set; the
/// region is `[left, right)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSettings {
    pub enabled: bool,
    pub left: u32,
    pub right: Option<u32>,
}

impl LoopSettings {
    pub fn new(left: u32, right: u32) -> Self {
        Self {
            enabled: true,
            left,
            right: Some(right),
        }
    }

    /// The right bound, if the loop is armed.
    pub fn active_right(&self) -> Option<u32> {
        self.right.filter(|_| self.enabled)
    }
}
