use crate::error::{CoreError, CoreResult};
use crate::spawn::SpawnRule;
use crate::species::{Competence, CompetenceSet, SpeciesDef, SpeciesId};

/// Highest species id the registry accepts.
pub const MAX_SPECIES_ID: u16 = 4095;

/// Immutable catalog of species and their spawn rules.
///
/// Populated once at startup, then only read. Lookup is a linear scan; the
/// catalog is small (tens of entries) and ordering is registration order,
/// which keeps downstream iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct SpeciesRegistry {
    species: Vec<SpeciesDef>,
    rules: Vec<SpawnRule>,
}

impl SpeciesRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in fallback catalog: a structure-dwelling gatherer and a
    /// free-roaming grazer. Used whenever external definitions fail to load,
    /// so the simulation always has something to run.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let mut villager = SpeciesDef::new(SpeciesId(1), "villager");
        villager.display_name = "Villager".into();
        villager.category = "settler".into();
        villager.traits = vec!["wander".into()];
        villager.flags.mobile = true;
        villager.flags.intelligent = true;
        villager.competences = CompetenceSet::EMPTY
            .with(Competence::OpenDoors)
            .with(Competence::ShelterAtNight)
            .with(Competence::LightFires);
        villager.max_hp = 20.0;
        villager.max_speed = 1.6;
        villager.structure = Some("house".into());
        villager.can_reproduce = true;
        villager.can_gather = true;
        villager.gather_tags = vec!["berry".into(), "crop".into()];
        let villager_rule = SpawnRule::structure(SpeciesId(1), "house").with_group(1, 2);

        let mut deer = SpeciesDef::new(SpeciesId(2), "deer");
        deer.display_name = "Deer".into();
        deer.category = "wildlife".into();
        deer.traits = vec!["skitter".into()];
        deer.flags.mobile = true;
        deer.flags.animal = true;
        deer.max_hp = 10.0;
        deer.max_speed = 2.2;
        deer.nutrition = 40.0;
        let deer_rule = SpawnRule::tiles(SpeciesId(2), "grass", 0.01).with_group(2, 4);

        // The fallback catalog is known-good; registration cannot fail here.
        let _ = registry.register_with_rule(villager, villager_rule);
        let _ = registry.register_with_rule(deer, deer_rule);
        registry
    }

    /// Register a species. Rejects out-of-range and duplicate ids, leaving
    /// the registry unchanged.
    pub fn register(&mut self, def: SpeciesDef) -> CoreResult<()> {
        if def.id.0 > MAX_SPECIES_ID {
            return Err(CoreError::SpeciesIdOutOfRange {
                id: def.id,
                max: MAX_SPECIES_ID,
            });
        }
        if self.get(def.id).is_some() {
            return Err(CoreError::DuplicateSpecies(def.id));
        }
        self.species.push(def);
        Ok(())
    }

    /// Register a species together with its spawn rule.
    pub fn register_with_rule(&mut self, def: SpeciesDef, rule: SpawnRule) -> CoreResult<()> {
        self.register(def)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Record a spawn rule for an already-registered species.
    pub fn add_rule(&mut self, rule: SpawnRule) -> CoreResult<()> {
        if self.get(rule.species).is_none() {
            return Err(CoreError::SpeciesNotFound(rule.species));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Look up a species by id.
    pub fn get(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.species.iter().find(|d| d.id == id)
    }

    /// Look up a species by internal name (case-insensitive).
    pub fn by_name(&self, name: &str) -> Option<&SpeciesDef> {
        self.species
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// All registered species, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SpeciesDef> {
        self.species.iter()
    }

    /// All registered spawn rules, in registration order.
    pub fn rules(&self) -> &[SpawnRule] {
        &self.rules
    }

    /// Number of registered species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Whether no species are registered.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species carrying the trait `label`.
    pub fn with_trait<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a SpeciesDef> {
        self.species.iter().filter(move |d| d.has_trait(label))
    }

    /// Species in the given category (case-insensitive).
    pub fn with_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a SpeciesDef> {
        self.species
            .iter()
            .filter(move |d| d.category.eq_ignore_ascii_case(category))
    }

    /// Species holding the given competence.
    pub fn with_competence(&self, c: Competence) -> impl Iterator<Item = &SpeciesDef> {
        self.species.iter().filter(move |d| d.has_competence(c))
    }

    /// Resolve the offspring species for a parent: the explicit offspring id
    /// when set, else the registered `<lineage>_child` species, else the
    /// parent species itself.
    pub fn offspring_of(&self, parent: &SpeciesDef) -> SpeciesId {
        if let Some(id) = parent.offspring
            && self.get(id).is_some()
        {
            return id;
        }
        let child_name = format!("{}_child", parent.lineage());
        self.by_name(&child_name).map_or(parent.id, |d| d.id)
    }
}
