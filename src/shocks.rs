//! Random shock selection. Everything here is seeded and lives outside the
//! simulation core, which only ever sees the resolved [`ScheduledShock`].

use serde::Serialize;

use crate::core::{ScheduledShock, ShockKind};

#[derive(Debug, Clone)]
pub struct ShockTemplate {
    pub name: &'static str,
    pub kind: ShockKind,
    pub magnitude_min: f64,
    pub magnitude_max: f64,
    pub earliest_month: u32,
    pub latest_month: u32,
}

#[derive(Debug, Clone)]
pub struct ShockCatalog {
    pub entries: Vec<ShockTemplate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShock {
    pub name: &'static str,
    pub shock: ScheduledShock,
}

impl ShockCatalog {
    pub fn default_catalog() -> Self {
        Self {
            entries: vec![
                ShockTemplate {
                    name: "job loss",
                    kind: ShockKind::Fixed,
                    magnitude_min: 10_000.0,
                    magnitude_max: 40_000.0,
                    earliest_month: 6,
                    latest_month: 120,
                },
                ShockTemplate {
                    name: "medical bill",
                    kind: ShockKind::Fixed,
                    magnitude_min: 2_000.0,
                    magnitude_max: 20_000.0,
                    earliest_month: 1,
                    latest_month: 240,
                },
                ShockTemplate {
                    name: "market drawdown",
                    kind: ShockKind::PercentOfCash,
                    magnitude_min: 0.10,
                    magnitude_max: 0.35,
                    earliest_month: 1,
                    latest_month: 180,
                },
                ShockTemplate {
                    name: "new dependant",
                    kind: ShockKind::RecurringExpenseMultiplier,
                    magnitude_min: 0.10,
                    magnitude_max: 0.30,
                    earliest_month: 12,
                    latest_month: 120,
                },
                ShockTemplate {
                    name: "car replacement",
                    kind: ShockKind::Fixed,
                    magnitude_min: 15_000.0,
                    magnitude_max: 45_000.0,
                    earliest_month: 24,
                    latest_month: 240,
                },
            ],
        }
    }

    /// Draws one shock scheduled inside `1..=horizon_months`. Entries whose
    /// window starts after the horizon are skipped.
    pub fn draw(&self, seed: u64, horizon_months: u32) -> Option<ResolvedShock> {
        let candidates = self
            .entries
            .iter()
            .filter(|t| t.earliest_month.max(1) <= horizon_months)
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return None;
        }

        let mut rng = Rng::new(splitmix64(seed));
        let template = candidates[rng.next_index(candidates.len())];

        let low = template.magnitude_min.min(template.magnitude_max);
        let high = template.magnitude_min.max(template.magnitude_max);
        let magnitude = low + (high - low) * rng.next_f64();

        let first = template.earliest_month.max(1);
        let last = template.latest_month.min(horizon_months).max(first);
        let month = first + rng.next_index((last - first + 1) as usize) as u32;

        Some(ResolvedShock {
            name: template.name,
            shock: ScheduledShock {
                kind: template.kind,
                magnitude,
                month,
            },
        })
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 / DENOM
    }

    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}
