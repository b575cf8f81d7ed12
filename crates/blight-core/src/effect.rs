//! Status effect descriptions applied to actors in infected regions.

use std::fmt;

/// Host-defined kind of status effect (e.g. `"poison"`, `"wither"`).
///
/// The engine treats the kind as an opaque name and hands it to the
/// [`EffectApplier`](crate::EffectApplier) unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EffectKind(pub String);

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectKind {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

/// A fully parameterised status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectSpec {
    /// Which effect to apply.
    pub kind: EffectKind,
    /// Effect strength; `0` is the weakest level.
    pub amplifier: u8,
    /// How long one application lasts, in host ticks.
    pub duration_ticks: u32,
}

impl Default for EffectSpec {
    fn default() -> Self {
        Self {
            kind: EffectKind::from("poison"),
            amplifier: 0,
            duration_ticks: 60,
        }
    }
}

impl fmt::Display for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (amplifier {}, {} ticks)",
            self.kind, self.amplifier, self.duration_ticks
        )
    }
}
