use serde::{Deserialize, Serialize};

/// Numeric identifier for a species. Assigned in the definitions file or by
/// the built-in fallback catalog; stable for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

impl std::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Biological sex of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Sex {
    /// The complementary sex.
    pub fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Capability flags describing what a species fundamentally is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Attacks other actors on sight.
    pub hostile: bool,
    /// Can move at all. Immobile species never leave their spawn point.
    pub mobile: bool,
    /// Uses structures, doors, and stored food.
    pub intelligent: bool,
    /// Undead: faster hunger decay, enrages instead of starving.
    pub undead: bool,
    /// Trades rather than forages.
    pub merchant: bool,
    /// Wild animal.
    pub animal: bool,
}

impl Flags {
    /// Set the flag named by `token`. Returns `false` for unknown names.
    pub fn set_by_name(&mut self, token: &str) -> bool {
        match token {
            "hostile" => self.hostile = true,
            "mobile" => self.mobile = true,
            "intelligent" => self.intelligent = true,
            "undead" => self.undead = true,
            "merchant" => self.merchant = true,
            "animal" => self.animal = true,
            _ => return false,
        }
        true
    }
}

/// A learned competence a species may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Competence {
    /// Can open closed doors instead of turning around.
    OpenDoors,
    /// Returns to a structure when night falls.
    ShelterAtNight,
    /// Lights fires in its home structure at dusk.
    LightFires,
}

impl Competence {
    /// All competences, in bit order.
    pub const ALL: [Self; 3] = [Self::OpenDoors, Self::ShelterAtNight, Self::LightFires];

    /// Parse a competence name from the definitions format.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "open_doors" => Some(Self::OpenDoors),
            "shelter_at_night" => Some(Self::ShelterAtNight),
            "light_fires" => Some(Self::LightFires),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::OpenDoors => 1,
            Self::ShelterAtNight => 1 << 1,
            Self::LightFires => 1 << 2,
        }
    }
}

impl std::fmt::Display for Competence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenDoors => write!(f, "open_doors"),
            Self::ShelterAtNight => write!(f, "shelter_at_night"),
            Self::LightFires => write!(f, "light_fires"),
        }
    }
}

/// Bitmask of competences held by a species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetenceSet(u8);

impl CompetenceSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Add a competence, builder style.
    #[must_use]
    pub fn with(mut self, c: Competence) -> Self {
        self.insert(c);
        self
    }

    /// Add a competence in place.
    pub fn insert(&mut self, c: Competence) {
        self.0 |= c.bit();
    }

    /// Whether the set holds `c`.
    pub fn contains(self, c: Competence) -> bool {
        self.0 & c.bit() != 0
    }

    /// Whether no competence is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the competences in the set.
    pub fn iter(self) -> impl Iterator<Item = Competence> {
        Competence::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// An sRGB tint applied to a species' sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Untinted white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `#rrggbb`. Returns `None` for anything else.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Where a species' animation frames live on its sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    /// Texture asset name.
    pub texture: String,
    /// Pixel offset of the first frame.
    pub origin: (u32, u32),
    /// Pixel size of one frame cell.
    pub size: (u32, u32),
    /// Number of animation frames.
    pub frames: u32,
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self {
            texture: String::new(),
            origin: (0, 0),
            size: (16, 16),
            frames: 1,
        }
    }
}

/// Immutable metadata shared by every actor of one species.
///
/// Registered once (from the definitions file or the fallback catalog) and
/// never mutated afterwards; actors refer to it by [`SpeciesId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDef {
    /// Numeric id actors reference.
    pub id: SpeciesId,
    /// Internal identifier, lowercase, may carry lineage qualifiers
    /// (`villager_male`, `villager_child`).
    pub name: String,
    /// Name shown to players.
    pub display_name: String,
    /// Free-form category label (`wildlife`, `settler`, ...).
    pub category: String,
    /// Free-form trait labels; also select the movement behavior.
    pub traits: Vec<String>,
    /// Capability flags.
    pub flags: Flags,
    /// Competence bitmask.
    pub competences: CompetenceSet,
    /// Hit points a fresh actor starts with.
    pub max_hp: f32,
    /// Walk speed cap in tiles per second.
    pub max_speed: f32,
    /// Collision radius in tiles.
    pub radius: f32,
    /// Sprite tint.
    pub color: Color,
    /// Sprite sheet descriptor.
    pub sprite: SpriteSheet,
    /// Structure kind this species lives in, if any.
    pub structure: Option<String>,
    /// Sex assigned at spawn; `None` means rolled per actor.
    pub default_sex: Option<Sex>,
    /// Explicit offspring species. When `None`, the `<lineage>_child`
    /// species is used if registered, else the parent species itself.
    pub offspring: Option<SpeciesId>,
    /// Whether this species mates at night.
    pub can_reproduce: bool,
    /// Whether this species hunts prey by day.
    pub can_hunt: bool,
    /// Whether this species forages the terrain by day.
    pub can_gather: bool,
    /// Names/categories/traits this species treats as prey. Empty means any
    /// non-undead actor.
    pub hunt_tags: Vec<String>,
    /// Object names/tags this species harvests. Empty means anything edible.
    pub gather_tags: Vec<String>,
    /// Age in seconds past which the actor is an elder (moves at half speed).
    pub elder_age: f32,
    /// Age in seconds at which the actor dies of old age.
    pub death_age: f32,
    /// Upper hunger bound; actors spawn full.
    pub max_hunger: f32,
    /// Hunger restored to a predator that eats one of these.
    pub nutrition: f32,
}

impl SpeciesDef {
    /// Create a definition with defaults applied: display name and texture
    /// derived from `name`, default sex inferred from a trailing lineage
    /// qualifier, modest stats.
    pub fn new(id: SpeciesId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            display_name: name.clone(),
            category: String::new(),
            traits: Vec::new(),
            flags: Flags::default(),
            competences: CompetenceSet::EMPTY,
            max_hp: 10.0,
            max_speed: 1.5,
            radius: 0.4,
            color: Color::WHITE,
            sprite: SpriteSheet {
                texture: format!("{name}.png"),
                ..SpriteSheet::default()
            },
            structure: None,
            default_sex: infer_default_sex(&name),
            offspring: None,
            can_reproduce: false,
            can_hunt: false,
            can_gather: false,
            hunt_tags: Vec::new(),
            gather_tags: Vec::new(),
            elder_age: 2400.0,
            death_age: 6000.0,
            max_hunger: 100.0,
            nutrition: 25.0,
            name,
        }
    }

    /// Whether this species carries the trait `label` (case-insensitive).
    pub fn has_trait(&self, label: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(label))
    }

    /// Whether this species holds the competence.
    pub fn has_competence(&self, c: Competence) -> bool {
        self.competences.contains(c)
    }

    /// Whether `tag` names this species by internal name, category, or trait.
    ///
    /// Hunters match their prey lists against this.
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
            || self.category.eq_ignore_ascii_case(tag)
            || self.has_trait(tag)
    }

    /// The lineage prefix of the internal name, with trailing qualifiers
    /// (`_male`, `_female`, `_child`, `_elder`, digits) stripped.
    pub fn lineage(&self) -> &str {
        lineage_root(&self.name)
    }
}

impl Default for SpeciesDef {
    fn default() -> Self {
        Self::new(SpeciesId(0), "unnamed")
    }
}

/// Strip trailing qualifier segments from an internal species name.
///
/// `villager_male` and `villager_child` share the lineage `villager`;
/// `dire_wolf` keeps both segments because `wolf` is not a qualifier.
pub fn lineage_root(name: &str) -> &str {
    let mut end = name.len();
    loop {
        let head = &name[..end];
        let Some(cut) = head.rfind('_') else {
            return head;
        };
        let segment = &head[cut + 1..];
        if is_qualifier(segment) {
            end = cut;
        } else {
            return head;
        }
    }
}

fn is_qualifier(segment: &str) -> bool {
    matches!(segment, "male" | "female" | "child" | "elder")
        || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

/// Infer a default sex from a trailing `_male`/`_female` name qualifier.
pub fn infer_default_sex(name: &str) -> Option<Sex> {
    if name.ends_with("_male") {
        Some(Sex::Male)
    } else if name.ends_with("_female") {
        Some(Sex::Female)
    } else {
        None
    }
}
