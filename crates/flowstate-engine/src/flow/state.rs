//! Flow-state snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FlowBands;
use crate::error::{ensure_unit, EngineResult};

/// Attention-state classification of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    /// No session running.
    #[default]
    Resting,
    /// Session started; building concentration.
    Focus,
    /// Sustained productive state.
    Flow,
    /// Peak concentration.
    Hyperfocus,
    /// Metrics collapsed below the low band.
    Exhausted,
    /// Session ended; cooling down before the next one.
    Recovering,
}

impl FlowType {
    /// All states in lifecycle order.
    pub const ALL: [FlowType; 6] = [
        FlowType::Resting,
        FlowType::Focus,
        FlowType::Flow,
        FlowType::Hyperfocus,
        FlowType::Exhausted,
        FlowType::Recovering,
    ];

    /// Upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Resting => "RESTING",
            FlowType::Focus => "FOCUS",
            FlowType::Flow => "FLOW",
            FlowType::Hyperfocus => "HYPERFOCUS",
            FlowType::Exhausted => "EXHAUSTED",
            FlowType::Recovering => "RECOVERING",
        }
    }

    /// FOCUS, FLOW or HYPERFOCUS.
    pub fn is_engaged(&self) -> bool {
        matches!(self, FlowType::Focus | FlowType::Flow | FlowType::Hyperfocus)
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intensity band of the averaged metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntensity {
    #[default]
    Low,
    Medium,
    High,
    Peak,
}

impl FlowIntensity {
    /// Classify an averaged metric value against the bands.
    pub fn from_average(average: f32, bands: &FlowBands) -> Self {
        if average >= bands.peak {
            FlowIntensity::Peak
        } else if average >= bands.high {
            FlowIntensity::High
        } else if average >= bands.medium {
            FlowIntensity::Medium
        } else {
            FlowIntensity::Low
        }
    }
}

/// Quality weights; they sum to 1 so quality stays in `[0, 1]`.
const QUALITY_WEIGHTS: [f32; 7] = [0.10, 0.10, 0.20, 0.10, 0.20, 0.15, 0.15];

/// Rolling session metrics, each in `[0, 1]`.
///
/// `resistance` is the only "bad" metric: it enters averages and quality as
/// `1 - resistance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub velocity: f32,
    pub momentum: f32,
    pub resistance: f32,
    pub conductivity: f32,
    pub focus: f32,
    pub energy: f32,
    pub clarity: f32,
}

impl FlowMetrics {
    /// Metrics whose average is exactly `level` (resistance = `1 - level`).
    pub fn uniform(level: f32) -> Self {
        Self {
            velocity: level,
            momentum: level,
            resistance: 1.0 - level,
            conductivity: level,
            focus: level,
            energy: level,
            clarity: level,
        }
    }

    /// Reject non-finite or out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_unit("velocity", self.velocity)?;
        ensure_unit("momentum", self.momentum)?;
        ensure_unit("resistance", self.resistance)?;
        ensure_unit("conductivity", self.conductivity)?;
        ensure_unit("focus", self.focus)?;
        ensure_unit("energy", self.energy)?;
        ensure_unit("clarity", self.clarity)?;
        Ok(())
    }

    /// The seven core metrics with resistance inverted, in field order.
    fn core(&self) -> [f32; 7] {
        [
            self.velocity,
            self.momentum,
            1.0 - self.resistance,
            self.conductivity,
            self.focus,
            self.energy,
            self.clarity,
        ]
    }

    /// Unweighted mean of the core metrics (used for classification and as
    /// preservation coherence).
    pub fn average(&self) -> f32 {
        self.core().iter().sum::<f32>() / 7.0
    }

    /// Weighted quality score.
    ///
    /// ```text
    /// 0.20 focus + 0.15 energy + 0.15 clarity + 0.10 velocity
    ///   + 0.10 momentum + 0.10 conductivity + 0.20 (1 - resistance)
    /// ```
    pub fn quality(&self) -> f32 {
        self.core()
            .iter()
            .zip(QUALITY_WEIGHTS)
            .map(|(m, w)| m * w)
            .sum::<f32>()
            .clamp(0.0, 1.0)
    }

    /// Move every good metric up by `step` and resistance down by `step`.
    pub(crate) fn step_toward_flow(&mut self, step: f32) {
        let up = |v: f32| (v + step).min(1.0);
        self.velocity = up(self.velocity);
        self.momentum = up(self.momentum);
        self.conductivity = up(self.conductivity);
        self.focus = up(self.focus);
        self.energy = up(self.energy);
        self.clarity = up(self.clarity);
        self.resistance = (self.resistance - step).max(0.0);
    }
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

/// Live flow state of a session.
///
/// `quality` is derived from the metrics and only changes through
/// [`FlowState::set_metrics`], so it always matches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FlowStateWire")]
pub struct FlowState {
    /// Whether a session is running.
    pub active: bool,
    /// Current classification.
    pub flow_type: FlowType,
    /// Current intensity band.
    pub intensity: FlowIntensity,
    /// Accumulated session duration in milliseconds.
    pub duration_ms: u64,
    metrics: FlowMetrics,
    quality: f32,
    /// Logical time of the last state change.
    pub last_transition_ms: u64,
    /// Whether the protection shield guards the session.
    pub protected: bool,
}

impl FlowState {
    /// Resting state with the given metrics.
    pub fn resting(metrics: FlowMetrics) -> Self {
        Self {
            active: false,
            flow_type: FlowType::Resting,
            intensity: FlowIntensity::Low,
            duration_ms: 0,
            quality: metrics.quality(),
            metrics,
            last_transition_ms: 0,
            protected: false,
        }
    }

    /// Current metrics.
    #[inline]
    pub fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }

    /// Derived quality.
    #[inline]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Replace the metrics after validating them; quality is recomputed.
    pub fn set_metrics(&mut self, metrics: FlowMetrics) -> EngineResult<()> {
        metrics.validate()?;
        self.metrics = metrics;
        self.quality = metrics.quality();
        Ok(())
    }

    /// Apply one metrics step in place; quality is recomputed.
    pub(crate) fn step_metrics(&mut self, step: f32) {
        self.metrics.step_toward_flow(step);
        self.quality = self.metrics.quality();
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::resting(FlowMetrics::default())
    }
}

/// Serialized form of [`FlowState`]; quality is recomputed on load.
#[derive(Deserialize)]
struct FlowStateWire {
    active: bool,
    flow_type: FlowType,
    intensity: FlowIntensity,
    duration_ms: u64,
    metrics: FlowMetrics,
    last_transition_ms: u64,
    protected: bool,
}

impl From<FlowStateWire> for FlowState {
    fn from(wire: FlowStateWire) -> Self {
        Self {
            active: wire.active,
            flow_type: wire.flow_type,
            intensity: wire.intensity,
            duration_ms: wire.duration_ms,
            quality: wire.metrics.quality(),
            metrics: wire.metrics,
            last_transition_ms: wire.last_transition_ms,
            protected: wire.protected,
        }
    }
}
