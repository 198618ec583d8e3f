//! Parser for the species/spawn-rule definitions format.
//!
//! The format is a flat sectioned key=value file: each `[section]` describes
//! one species, optionally with an attached spawn rule. The parser never
//! fails on bad content — malformed lines and sections are skipped with a
//! recorded warning and every unset field keeps its default, so a partly
//! broken file still yields a usable catalog.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::spawn::{SpawnFilter, SpawnRule};
use crate::species::{Color, Competence, SpeciesDef, SpeciesId, infer_default_sex};

/// A non-fatal problem found while parsing definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseWarning {
    /// 1-based line number the problem was found on.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

/// Everything a definitions file declares.
#[derive(Debug, Clone, Default)]
pub struct DefinitionsFile {
    /// Parsed species, in file order. Ids may collide; the registry decides.
    pub species: Vec<SpeciesDef>,
    /// Parsed spawn rules, in file order.
    pub rules: Vec<SpawnRule>,
}

/// Read and parse a definitions file.
///
/// Only an unreadable file is an error; parse problems surface as warnings.
pub fn load_definitions(path: &Path) -> CoreResult<(DefinitionsFile, Vec<ParseWarning>)> {
    let text =
        std::fs::read_to_string(path).map_err(|source| CoreError::DefinitionsUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_definitions(&text))
}

/// Parse definitions text. Never fails; problems are returned as warnings.
pub fn parse_definitions(text: &str) -> (DefinitionsFile, Vec<ParseWarning>) {
    let mut file = DefinitionsFile::default();
    let mut warnings = Vec::new();
    let mut state = State::Outside;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            state.finish(&mut file, &mut warnings);
            let Some(name) = header.strip_suffix(']').map(str::trim) else {
                warnings.push(warn(line_no, "unterminated section header"));
                state = State::Skipping;
                continue;
            };
            if name.is_empty() {
                warnings.push(warn(line_no, "empty section name; section skipped"));
                state = State::Skipping;
            } else {
                state = State::Section(Box::new(Section::new(name, line_no)));
            }
            continue;
        }

        let Some((key, value)) = split_key_value(line) else {
            warnings.push(warn(line_no, format!("expected `key = value`, got `{line}`")));
            continue;
        };

        match &mut state {
            State::Outside => {
                warnings.push(warn(line_no, format!("key `{key}` outside any section")));
            }
            State::Skipping => {}
            State::Section(section) => section.apply(&key, value, line_no, &mut warnings),
        }
    }

    state.finish(&mut file, &mut warnings);
    (file, warnings)
}

fn warn(line: usize, message: impl Into<String>) -> ParseWarning {
    ParseWarning {
        line,
        message: message.into(),
    }
}

fn split_key_value(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim().to_ascii_lowercase();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some((key, value))
}

enum State {
    Outside,
    Skipping,
    Section(Box<Section>),
}

impl State {
    fn finish(&mut self, file: &mut DefinitionsFile, warnings: &mut Vec<ParseWarning>) {
        if let State::Section(section) = std::mem::replace(self, State::Outside) {
            section.finish(file, warnings);
        }
    }
}

/// One `[section]` being assembled.
struct Section {
    def: SpeciesDef,
    start_line: usize,
    saw_id: bool,
    saw_display: bool,
    saw_texture: bool,
    spawn: SpawnDraft,
}

#[derive(Default)]
struct SpawnDraft {
    tile: Option<String>,
    biome: Option<String>,
    density: Option<f32>,
    group: Option<(u32, u32)>,
    mode: Option<SpawnMode>,
}

#[derive(Clone, Copy, PartialEq)]
enum SpawnMode {
    Tiles,
    Structure,
}

impl Section {
    fn new(name: &str, start_line: usize) -> Self {
        Self {
            def: SpeciesDef::new(SpeciesId(0), name.to_ascii_lowercase()),
            start_line,
            saw_id: false,
            saw_display: false,
            saw_texture: false,
            spawn: SpawnDraft::default(),
        }
    }

    fn apply(&mut self, key: &str, value: &str, line: usize, warnings: &mut Vec<ParseWarning>) {
        match key {
            "id" => match value.parse::<u16>() {
                Ok(v) => {
                    self.def.id = SpeciesId(v);
                    self.saw_id = true;
                }
                Err(_) => warnings.push(warn(line, format!("invalid species id `{value}`"))),
            },
            "name" => {
                self.def.name = value.to_ascii_lowercase();
            }
            "display_name" => {
                self.def.display_name = value.to_string();
                self.saw_display = true;
            }
            "category" => self.def.category = value.to_ascii_lowercase(),
            "traits" => self.def.traits = comma_list(value),
            "max_hp" => apply_f32(value, line, "max_hp", warnings, |v| self.def.max_hp = v),
            "max_speed" => apply_f32(value, line, "max_speed", warnings, |v| {
                self.def.max_speed = v;
            }),
            "radius" => apply_f32(value, line, "radius", warnings, |v| self.def.radius = v),
            "color" => match Color::from_hex(value) {
                Some(c) => self.def.color = c,
                None => warnings.push(warn(line, format!("invalid color `{value}`"))),
            },
            "texture" => {
                self.def.sprite.texture = value.to_string();
                self.saw_texture = true;
            }
            "sprite.origin" => match parse_pair(value) {
                Some(p) => self.def.sprite.origin = p,
                None => warnings.push(warn(line, format!("invalid sprite.origin `{value}`"))),
            },
            "sprite.size" => match parse_pair(value) {
                Some(p) => self.def.sprite.size = p,
                None => warnings.push(warn(line, format!("invalid sprite.size `{value}`"))),
            },
            "sprite.frames" => match value.parse::<u32>() {
                Ok(v) if v >= 1 => self.def.sprite.frames = v,
                _ => warnings.push(warn(line, format!("invalid sprite.frames `{value}`"))),
            },
            "flags" => {
                for token in comma_list(value) {
                    if !self.def.flags.set_by_name(&token) {
                        warnings.push(warn(line, format!("unknown flag `{token}`")));
                    }
                }
            }
            "competences" => {
                for token in comma_list(value) {
                    match Competence::parse(&token) {
                        Some(c) => self.def.competences.insert(c),
                        None => warnings.push(warn(line, format!("unknown competence `{token}`"))),
                    }
                }
            }
            "referred.structure" => self.def.structure = Some(value.to_ascii_lowercase()),
            "ai.hunt" => apply_bool(value, line, "ai.hunt", warnings, |v| {
                self.def.can_hunt = v;
            }),
            "ai.gather" => apply_bool(value, line, "ai.gather", warnings, |v| {
                self.def.can_gather = v;
            }),
            "ai.reproduce" => apply_bool(value, line, "ai.reproduce", warnings, |v| {
                self.def.can_reproduce = v;
            }),
            "ai.hunt_targets" => self.def.hunt_tags = comma_list(value),
            "ai.gather_targets" => self.def.gather_tags = comma_list(value),
            "spawn.tile" => self.spawn.tile = Some(value.to_ascii_lowercase()),
            "spawn.biome" => self.spawn.biome = Some(value.to_ascii_lowercase()),
            "spawn.density" => match value.parse::<f32>() {
                Ok(v) if (0.0..=1.0).contains(&v) => self.spawn.density = Some(v),
                Ok(v) => {
                    warnings.push(warn(
                        line,
                        format!("spawn.density {v} outside [0, 1]; clamped"),
                    ));
                    self.spawn.density = Some(v.clamp(0.0, 1.0));
                }
                Err(_) => warnings.push(warn(line, format!("invalid spawn.density `{value}`"))),
            },
            "spawn.group" => match parse_group(value) {
                Some(g) => self.spawn.group = Some(g),
                None => warnings.push(warn(line, format!("invalid spawn.group `{value}`"))),
            },
            "spawn.type" => match value.to_ascii_lowercase().as_str() {
                "tiles" => self.spawn.mode = Some(SpawnMode::Tiles),
                "structure" => self.spawn.mode = Some(SpawnMode::Structure),
                other => warnings.push(warn(line, format!("unknown spawn.type `{other}`"))),
            },
            other => warnings.push(warn(line, format!("unknown key `{other}` ignored"))),
        }
    }

    fn finish(mut self, file: &mut DefinitionsFile, warnings: &mut Vec<ParseWarning>) {
        if !self.saw_id {
            warnings.push(warn(
                self.start_line,
                format!("section `{}` has no valid id; skipped", self.def.name),
            ));
            return;
        }

        // Fields derived from the name unless given explicitly.
        if !self.saw_display {
            self.def.display_name.clone_from(&self.def.name);
        }
        if !self.saw_texture {
            self.def.sprite.texture = format!("{}.png", self.def.name);
        }
        self.def.default_sex = infer_default_sex(&self.def.name);

        if let Some(rule) = self.build_rule(warnings) {
            file.rules.push(rule);
        }
        file.species.push(self.def);
    }

    fn build_rule(&self, warnings: &mut Vec<ParseWarning>) -> Option<SpawnRule> {
        let draft = &self.spawn;
        let declared = draft.tile.is_some()
            || draft.biome.is_some()
            || draft.density.is_some()
            || draft.group.is_some()
            || draft.mode.is_some();
        if !declared {
            return None;
        }

        let mode = draft.mode.unwrap_or({
            if self.def.structure.is_some() {
                SpawnMode::Structure
            } else {
                SpawnMode::Tiles
            }
        });

        let filter = match mode {
            SpawnMode::Structure => {
                let Some(kind) = self.def.structure.clone() else {
                    warnings.push(warn(
                        self.start_line,
                        format!(
                            "section `{}`: structure spawn without referred.structure; rule skipped",
                            self.def.name
                        ),
                    ));
                    return None;
                };
                SpawnFilter::Structure { kind }
            }
            SpawnMode::Tiles => {
                let Some(tile) = draft.tile.clone() else {
                    warnings.push(warn(
                        self.start_line,
                        format!(
                            "section `{}`: tile spawn without spawn.tile; rule skipped",
                            self.def.name
                        ),
                    ));
                    return None;
                };
                SpawnFilter::Tiles {
                    tile,
                    biome: draft.biome.clone(),
                }
            }
        };

        let (min, max) = draft.group.unwrap_or((1, 1));
        Some(SpawnRule {
            species: self.def.id,
            filter,
            density: draft.density.unwrap_or(0.05),
            group: (min.min(max), min.max(max)),
        })
    }
}

fn apply_f32(
    value: &str,
    line: usize,
    key: &str,
    warnings: &mut Vec<ParseWarning>,
    set: impl FnOnce(f32),
) {
    match value.parse::<f32>() {
        Ok(v) if v > 0.0 && v.is_finite() => set(v),
        _ => warnings.push(warn(line, format!("invalid {key} `{value}`"))),
    }
}

fn apply_bool(
    value: &str,
    line: usize,
    key: &str,
    warnings: &mut Vec<ParseWarning>,
    set: impl FnOnce(bool),
) {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => set(true),
        "false" | "no" | "0" => set(false),
        _ => warnings.push(warn(line, format!("invalid {key} `{value}`"))),
    }
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_pair(value: &str) -> Option<(u32, u32)> {
    let (a, b) = value.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_group(value: &str) -> Option<(u32, u32)> {
    if let Some((min, max)) = value.split_once('-') {
        let min: u32 = min.trim().parse().ok()?;
        let max: u32 = max.trim().parse().ok()?;
        Some((min, max))
    } else {
        let n: u32 = value.trim().parse().ok()?;
        Some((n, n))
    }
}
