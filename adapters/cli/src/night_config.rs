//! Optional TOML override for the built-in night difficulty table.
//!
//! ```toml
//! [nights.3]
//! tilly = 9
//! balloona = 4
//! crowman = 5
//! dizzy = 3
//! ```
//!
//! Missing nights keep their built-in entry.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use carnival_core::{NightLevels, NightTable, WIN_GAME_NIGHT};

#[derive(Debug, Deserialize)]
struct NightTableFile {
    #[serde(default)]
    nights: BTreeMap<String, NightEntry>,
}

#[derive(Debug, Deserialize)]
struct NightEntry {
    tilly: u8,
    balloona: u8,
    crowman: u8,
    dizzy: u8,
}

/// Loads a night table, overlaying the file's entries on the defaults.
pub(crate) fn load_night_table(path: &Path) -> Result<NightTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: NightTableFile =
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;

    table_from_entries(&file.nights)
}

fn table_from_entries(entries: &BTreeMap<String, NightEntry>) -> Result<NightTable> {
    let defaults = NightTable::default();
    let mut nights: [NightLevels; WIN_GAME_NIGHT as usize] =
        std::array::from_fn(|index| defaults.levels_for(index as u8 + 1));

    for (key, entry) in entries {
        let night: u8 = key
            .parse()
            .with_context(|| format!("night key {key:?} is not a number"))?;
        if !(1..=WIN_GAME_NIGHT).contains(&night) {
            bail!("night key {night} is outside 1..={WIN_GAME_NIGHT}");
        }
        nights[usize::from(night - 1)] =
            NightLevels::new(entry.tilly, entry.balloona, entry.crowman, entry.dizzy);
    }

    Ok(NightTable::from_nights(nights))
}
