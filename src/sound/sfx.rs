// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The stock sound effect table.
//!
//! Effect ids are dense indices into [`SFX_NAMES`]. Id 0 is the "none" effect
//! and has no lump.

/// A stable, dense sound effect identifier.
pub type EffectId = usize;

/// Number of entries in the effect table.
pub const NUM_SFX: usize = 109;

/// Prefix prepended to an effect name to form its lump name.
const LUMP_PREFIX: &str = "ds";

/// Effect names, indexed by effect id.
pub const SFX_NAMES: [&str; NUM_SFX] = [
    "none",
    "pistol",
    "shotgn",
    "sgcock",
    "dshtgn",
    "dbopn",
    "dbcls",
    "dbload",
    "plasma",
    "bfg",
    "sawup",
    "sawidl",
    "sawful",
    "sawhit",
    "rlaunc",
    "rxplod",
    "firsht",
    "firxpl",
    "pstart",
    "pstop",
    "doropn",
    "dorcls",
    "stnmov",
    "swtchn",
    "swtchx",
    "plpain",
    "dmpain",
    "popain",
    "vipain",
    "mnpain",
    "pepain",
    "slop",
    "itemup",
    "wpnup",
    "oof",
    "telept",
    "posit1",
    "posit2",
    "posit3",
    "bgsit1",
    "bgsit2",
    "sgtsit",
    "cacsit",
    "brssit",
    "cybsit",
    "spisit",
    "bspsit",
    "kntsit",
    "vilsit",
    "mansit",
    "pesit",
    "sklatk",
    "sgtatk",
    "skepch",
    "vilatk",
    "claw",
    "skeswg",
    "pldeth",
    "pdiehi",
    "podth1",
    "podth2",
    "podth3",
    "bgdth1",
    "bgdth2",
    "sgtdth",
    "cacdth",
    "skldth",
    "brsdth",
    "cybdth",
    "spidth",
    "bspdth",
    "vildth",
    "kntdth",
    "pedth",
    "skedth",
    "posact",
    "bgact",
    "dmact",
    "bspact",
    "bspwlk",
    "vilact",
    "noway",
    "barexp",
    "punch",
    "hoof",
    "metal",
    "chgun",
    "tink",
    "bdopn",
    "bdcls",
    "itmbk",
    "flame",
    "flamst",
    "getpow",
    "bospit",
    "boscub",
    "bossit",
    "bospn",
    "bosdth",
    "manatk",
    "mandth",
    "sssit",
    "ssdth",
    "keenpn",
    "keendt",
    "skeact",
    "skesit",
    "skeatk",
    "radio",
];

/// Returns the name of the effect.
pub fn name(id: EffectId) -> Option<&'static str> {
    SFX_NAMES.get(id).copied()
}

/// Returns the lump holding the effect's raw data, or None for the "none"
/// effect and unknown ids.
pub fn lump_name(id: EffectId) -> Option<String> {
    if id == 0 {
        return None;
    }
    name(id).map(|name| format!("{LUMP_PREFIX}{name}"))
}

/// Looks up an effect by name ("pistol") or lump name ("DSPISTOL").
pub fn find(name: &str) -> Option<EffectId> {
    let lower = name.to_ascii_lowercase();
    let bare = lower.strip_prefix(LUMP_PREFIX).unwrap_or(&lower);
    SFX_NAMES
        .iter()
        .position(|candidate| *candidate == lower || *candidate == bare)
}
