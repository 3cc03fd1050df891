use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Volatile status held by a slot (and mirrored on combatants for switch-out marks).
    ///
    /// Everything here is battle-local: a slot's flags are wiped when a new
    /// combatant is placed into it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct VolatileFlags: u16 {
        const FLINCH             = 1 << 0;
        const CHARGING           = 1 << 1;
        const SEMI_INVULNERABLE  = 1 << 2;
        const PROTECTED          = 1 << 3;
        const FOCUSING           = 1 << 4;
        const HIT_WHILE_FOCUSING = 1 << 5;
        const SWITCHING_OUT      = 1 << 6;
        const LOAFING            = 1 << 7;
    }
}

impl VolatileFlags {
    /// Flags that only live until the end of the turn they were set in.
    pub const PER_TURN: VolatileFlags = VolatileFlags::FLINCH
        .union(VolatileFlags::PROTECTED)
        .union(VolatileFlags::FOCUSING)
        .union(VolatileFlags::HIT_WHILE_FOCUSING)
        .union(VolatileFlags::SWITCHING_OUT);
}

impl fmt::Display for VolatileFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}
