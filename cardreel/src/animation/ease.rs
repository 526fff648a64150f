/// Progress curve of an entrance or exit window.
///
/// Wire names are camelCase (`outCubic`); the editor's CSS-style names (`ease-out`) are
/// accepted as aliases of the cubic curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    #[serde(alias = "ease-in")]
    InCubic,
    #[serde(alias = "ease-out")]
    OutCubic,
    #[serde(alias = "ease-in-out")]
    InOutCubic,
}

impl Ease {
    /// Eased progress `elapsed` seconds into a window lasting `duration` seconds.
    ///
    /// An empty window is already complete.
    pub fn window(self, elapsed: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return 1.0;
        }
        self.apply(elapsed / duration)
    }

    /// Map normalized progress; input outside `[0, 1]` is clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::InOutQuad if t < 0.5 => 2.0 * t * t,
            Self::InOutQuad => (4.0 - 2.0 * t) * t - 1.0,
            Self::InCubic => t * t * t,
            Self::OutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Self::InOutCubic if t < 0.5 => 4.0 * t * t * t,
            Self::InOutCubic => {
                let u = 2.0 * t - 2.0;
                0.5 * u * u * u + 1.0
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
