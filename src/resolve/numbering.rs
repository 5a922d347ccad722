use std::collections::HashMap;

use crate::source::{LevelDefinition, NumberingDefinitions};

/// Word supports list levels 0 through 8.
pub const MAX_LIST_LEVELS: u8 = 9;

/// Sentinel list id for numbering synthesized from rendering hints.
pub const SYNTHETIC_LIST_ID: &str = "-1";

/// Per-pass list counter store, keyed by list id and level.
pub trait ListCounterContext {
    fn get(&self, list_id: &str, level: u8) -> i64;
    /// Bump the counter and return the new value.
    fn increment(&mut self, list_id: &str, level: u8) -> i64;
    fn reset(&mut self, list_id: &str, level: u8);
}

#[derive(Debug, Default)]
pub struct ListCounters {
    counters: HashMap<(String, u8), i64>,
}

impl ListCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
    }
}

impl ListCounterContext for ListCounters {
    fn get(&self, list_id: &str, level: u8) -> i64 {
        self.counters
            .get(&(list_id.to_string(), level))
            .copied()
            .unwrap_or(0)
    }

    fn increment(&mut self, list_id: &str, level: u8) -> i64 {
        let counter = self
            .counters
            .entry((list_id.to_string(), level))
            .or_insert(0);
        *counter += 1;
        *counter
    }

    fn reset(&mut self, list_id: &str, level: u8) {
        self.counters.remove(&(list_id.to_string(), level));
    }
}

/// Floor a level, mapping negatives and NaN to 0.
pub fn clamp_level(level: f64) -> u8 {
    if level.is_nan() || level <= 0.0 {
        return 0;
    }
    level.floor().min(f64::from(u8::MAX)) as u8
}

/// Full multi-level counter for a list item: one entry per level up to and
/// including `level`, the last being `counter`. Shallower entries come from
/// `store`; a level that was never incremented reads as 1, which is how Word
/// shows parents that have not started yet.
pub fn build_numbering_path(
    list_id: Option<&str>,
    level: f64,
    counter: u32,
    store: Option<&dyn ListCounterContext>,
) -> Vec<u32> {
    let level = clamp_level(level);
    let mut path: Vec<u32> = (0..level)
        .map(|lvl| match (list_id, store) {
            (Some(id), Some(store)) => {
                let value = store.get(id, lvl);
                if value <= 0 {
                    1
                } else {
                    u32::try_from(value).unwrap_or(u32::MAX)
                }
            }
            _ => 1,
        })
        .collect();
    path.push(counter);
    path
}

/// Level definition for `num_id`/`level`, with the instance's
/// `w:lvlOverride` applied.
pub fn lookup_level(
    defs: &NumberingDefinitions,
    num_id: &str,
    level: u8,
) -> Option<LevelDefinition> {
    let instance = defs.instances.get(num_id)?;
    let override_def = instance.overrides.get(&level);
    let mut def = override_def
        .and_then(|o| o.level.clone())
        .or_else(|| {
            defs.abstracts
                .get(&instance.abstract_id)
                .and_then(|a| a.levels.get(&level))
                .cloned()
        })?;
    if let Some(start) = override_def.and_then(|o| o.start) {
        def.start = Some(start);
    }
    Some(def)
}

fn to_roman(mut n: u32) -> String {
    const TABLE: &[(u32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut result = String::new();
    for &(value, numeral) in TABLE {
        while n >= value {
            result.push_str(numeral);
            n -= value;
        }
    }
    result
}

/// Word repeats the letter past z: 27 is "aa", 28 is "bb".
fn to_letters(value: u32, base: u8) -> String {
    if value == 0 {
        return String::new();
    }
    let letter = (base + ((value - 1) % 26) as u8) as char;
    let repeat = ((value - 1) / 26 + 1) as usize;
    std::iter::repeat_n(letter, repeat).collect()
}

fn ordinal_suffix(value: u32) -> &'static str {
    match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

pub fn format_number(value: u32, num_fmt: &str) -> String {
    match num_fmt {
        "decimal" => value.to_string(),
        "decimalZero" => format!("{value:02}"),
        "lowerLetter" => to_letters(value, b'a'),
        "upperLetter" => to_letters(value, b'A'),
        "lowerRoman" => to_roman(value),
        "upperRoman" => to_roman(value).to_uppercase(),
        "ordinal" => format!("{value}{}", ordinal_suffix(value)),
        "none" => String::new(),
        _ => value.to_string(),
    }
}

pub fn normalize_bullet_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if (0xF000..=0xF0FF).contains(&cp) {
                symbol_pua_to_unicode(cp).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

fn symbol_pua_to_unicode(cp: u32) -> Option<char> {
    let sym = cp - 0xF000;
    let mapped = match sym {
        0xB7 => '\u{2022}', // bullet
        0xA7 => '\u{25A0}', // black square (Wingdings)
        0xA8 => '\u{25CB}', // white circle
        0xD8 => '\u{2666}', // diamond
        0x76 => '\u{221A}', // check mark
        _ => return char::from_u32(sym),
    };
    Some(mapped)
}

/// Expand `lvlText` for the item at the end of `path`. Parent entries of
/// the path are raw counts, so each is shifted by its own level's start.
pub fn format_marker(
    defs: &NumberingDefinitions,
    num_id: &str,
    def: &LevelDefinition,
    path: &[u32],
) -> String {
    let format = def.format.as_deref().unwrap_or("decimal");
    let text = def.text.as_deref().unwrap_or("");
    if format == "bullet" {
        let bullet = normalize_bullet_text(text);
        return if bullet.is_empty() {
            "\u{2022}".to_string()
        } else {
            bullet
        };
    }
    let Some(&current) = path.last() else {
        return text.to_string();
    };
    if text.is_empty() {
        // No template: show the bare counter.
        return format_number(current, format);
    }

    let item_level = path.len().saturating_sub(1);
    let mut label = text.to_string();
    for lvl in 0..MAX_LIST_LEVELS {
        let placeholder = format!("%{}", lvl + 1);
        if !label.contains(&placeholder) {
            continue;
        }
        let lvl_def = lookup_level(defs, num_id, lvl);
        let start = lvl_def.as_ref().and_then(|d| d.start).unwrap_or(1);
        let lvl_fmt = lvl_def
            .as_ref()
            .and_then(|d| d.format.as_deref())
            .unwrap_or("decimal");
        let idx = usize::from(lvl);
        let value = if idx == item_level {
            path[idx]
        } else if idx < item_level {
            path[idx].saturating_add(start).saturating_sub(1)
        } else {
            start
        };
        label = label.replace(&placeholder, &format_number(value, lvl_fmt));
    }
    label
}
