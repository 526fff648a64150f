use crate::animation::ease::Ease;

/// Named entrance/exit animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimName {
    /// No animation.
    #[default]
    None,
    /// Opacity 0 → 1.
    FadeIn,
    /// Rises 50 preview units into place.
    SlideInUp,
    /// Fades in while growing from 80 % to 100 %.
    ZoomIn,
    /// Opacity 1 → 0.
    FadeOut,
    /// Drops 50 preview units out of place.
    SlideOutDown,
    /// Fades out while shrinking from 100 % to 80 %.
    ZoomOut,
    /// Any name this engine does not know. Rejected by validation.
    #[serde(other)]
    Unknown,
}

impl AnimName {
    /// Return `true` for names valid in the `in` slot.
    pub fn is_entrance(self) -> bool {
        matches!(
            self,
            Self::None | Self::FadeIn | Self::SlideInUp | Self::ZoomIn
        )
    }

    /// Return `true` for names valid in the `out` slot.
    pub fn is_exit(self) -> bool {
        matches!(
            self,
            Self::None | Self::FadeOut | Self::SlideOutDown | Self::ZoomOut
        )
    }
}

fn default_anim_duration() -> f64 {
    0.5
}

/// One animation slot: name, duration in seconds, easing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anim {
    /// Animation name.
    #[serde(default)]
    pub name: AnimName,
    /// Window length in seconds.
    #[serde(default = "default_anim_duration")]
    pub duration: f64,
    /// Progress easing.
    #[serde(default)]
    pub ease: Ease,
}

impl Default for Anim {
    fn default() -> Self {
        Self {
            name: AnimName::None,
            duration: default_anim_duration(),
            ease: Ease::Linear,
        }
    }
}

/// Entrance + exit pair attached to a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InOut {
    /// Entrance, measured from the start of the card.
    #[serde(rename = "in", default)]
    pub enter: Anim,
    /// Exit, measured back from the end of the card.
    #[serde(rename = "out", default)]
    pub exit: Anim,
}

/// Animated adjustments applied on top of a block's static placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Multiplicative opacity in `[0, 1]`.
    pub opacity: f64,
    /// Vertical offset in output pixels.
    pub translate_y: f64,
    /// Extra uniform scale around the block center.
    pub scale: f64,
}

impl Motion {
    /// The resting state: fully visible, untransformed.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// Return `true` when sampling produced no visible change.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Sample the motion of a block `t` seconds into a card lasting `card_duration` seconds.
///
/// The entrance window (`t < in.duration`) is checked first; the exit window
/// (`t >= card_duration - out.duration`) only applies when the entrance did not match.
/// `px_scale` converts preview units into output pixels for slide distances.
pub fn sample_motion(anims: &InOut, card_duration: f64, t: f64, px_scale: f64) -> Motion {
    let mut m = Motion::IDENTITY;

    let enter = anims.enter;
    if enter.name != AnimName::None && t < enter.duration {
        let p = enter.ease.window(t, enter.duration);
        match enter.name {
            AnimName::FadeIn => m.opacity = p,
            AnimName::SlideInUp => m.translate_y = (1.0 - p) * 50.0 * px_scale,
            AnimName::ZoomIn => {
                m.opacity = p;
                m.scale = 0.8 + 0.2 * p;
            }
            _ => {}
        }
        return m;
    }

    let exit = anims.exit;
    let out_start = card_duration - exit.duration;
    if exit.name != AnimName::None && exit.duration > 0.0 && t >= out_start {
        let p = exit.ease.window(t - out_start, exit.duration);
        match exit.name {
            AnimName::FadeOut => m.opacity = 1.0 - p,
            AnimName::SlideOutDown => m.translate_y = p * 50.0 * px_scale,
            AnimName::ZoomOut => {
                m.opacity = 1.0 - p;
                m.scale = 1.0 - 0.2 * p;
            }
            _ => {}
        }
    }
    m
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
