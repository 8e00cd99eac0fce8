//! World themes: name, specialty, point-of-interest and event vocabularies.
//!
//! The generator only ever asks a theme for random strings; it never looks at
//! the tables directly.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::placement::SettlementTier;

/// Supported world themes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Medieval,
    Fantasy,
    Scifi,
    Steampunk,
}

/// Themed flavor for one point of interest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiFlavor {
    /// Theme vocabulary key, e.g. `dragon_lair`
    pub kind: String,
    pub name: String,
    pub icon: String,
}

/// A themed event headline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEvent {
    pub category: String,
    pub name: String,
    pub theme: Theme,
}

struct PoiDef {
    kind: &'static str,
    icon: &'static str,
    name: &'static str,
}

struct ThemeTables {
    name: &'static str,
    icon: &'static str,
    description: &'static str,
    /// Prefixes and suffixes in city, town, village order
    prefixes: [&'static [&'static str]; 3],
    suffixes: [&'static [&'static str]; 3],
    specialties: [&'static [&'static str]; 3],
    pois: &'static [PoiDef],
    events: &'static [(&'static str, &'static [&'static str])],
}

// ============================================================================
// MEDIEVAL
// ============================================================================

static MEDIEVAL: ThemeTables = ThemeTables {
    name: "Medieval",
    icon: "⚔️",
    description: "A world of knights, castles, and ancient kingdoms",
    prefixes: [
        &["Castle", "Fort", "Keep", "Citadel"],
        &["Market", "Mill", "Fair"],
        &["Little", "Old", "New", "Upper", "Lower"],
    ],
    suffixes: [
        &["burg", "shire", "haven", "gate", "ford", "bridge", "wick"],
        &["ton", "ham", "worth", "field", "stead"],
        &["thorpe", "wick", "by", "croft", "leigh"],
    ],
    specialties: [
        &["Royal Court", "Grand Cathedral", "Knights Academy", "Merchant Guild", "Blacksmith Quarter"],
        &["Market Square", "Artisan Quarter", "Breweries", "Textile Mills", "Horse Markets"],
        &["Farming", "Shepherding", "Woodcutting", "Quarrying", "Fishing"],
    ],
    pois: &[
        PoiDef { kind: "ancient_castle", icon: "🏰", name: "Ancient Castle" },
        PoiDef { kind: "monastery", icon: "⛪", name: "Monastery" },
        PoiDef { kind: "battlefield", icon: "⚔️", name: "Battlefield" },
        PoiDef { kind: "shrine", icon: "🕯️", name: "Shrine" },
        PoiDef { kind: "watchtower", icon: "🗼", name: "Watchtower" },
    ],
    events: &[
        ("political", &["Royal Coronation", "Noble Uprising", "Treaty Signing", "Border Dispute"]),
        ("economic", &["Trade Fair", "Harvest Festival", "Market Crisis", "New Trade Route"]),
        ("military", &["Barbarian Raid", "Knight Tournament", "Siege", "Crusade"]),
        ("cultural", &["Religious Pilgrimage", "Troubadour Festival", "Royal Wedding", "Heresy Trial"]),
    ],
};

// ============================================================================
// FANTASY
// ============================================================================

static FANTASY: ThemeTables = ThemeTables {
    name: "Fantasy",
    icon: "🧙",
    description: "A magical world of wizards, dragons, and enchanted realms",
    prefixes: [
        &["Crystal", "Dragon", "Arcane", "Mystic", "Elder"],
        &["Moon", "Star", "Shadow", "Silver"],
        &["Fairy", "Gnome", "Halfling", "Elven"],
    ],
    suffixes: [
        &["spire", "hold", "reach", "fell", "moor", "garde"],
        &["vale", "wood", "hollow", "glen", "brook"],
        &["dell", "grove", "meadow", "glade", "spring"],
    ],
    specialties: [
        &["Mage Academy", "Enchantment Forges", "Alchemist Quarter", "Dragon Riders", "Crystal Mines"],
        &["Potion Breweries", "Spell Components", "Magical Beasts", "Rune Crafting", "Divination"],
        &["Herb Gathering", "Fairy Circles", "Magical Farming", "Crystal Harvesting", "Spirit Tending"],
    ],
    pois: &[
        PoiDef { kind: "wizard_tower", icon: "🏛️", name: "Wizard Tower" },
        PoiDef { kind: "dragon_lair", icon: "🐉", name: "Dragon Lair" },
        PoiDef { kind: "enchanted_forest", icon: "🌲", name: "Enchanted Forest" },
        PoiDef { kind: "ancient_ruins", icon: "🗿", name: "Ancient Ruins" },
        PoiDef { kind: "magic_portal", icon: "🌀", name: "Magic Portal" },
    ],
    events: &[
        ("magical", &["Dragon Awakening", "Magical Storm", "Portal Opening", "Ley Line Surge"]),
        ("political", &["Wizard Council", "Prophecy Fulfilled", "Dark Lord Rising", "Alliance of Races"]),
        ("cultural", &["Magical Tournament", "Harvest Moon Festival", "Spirit Night", "Elemental Convergence"]),
        ("crisis", &["Undead Invasion", "Demon Incursion", "Curse Spreading", "Magic Plague"]),
    ],
};

// ============================================================================
// SCIENCE FICTION
// ============================================================================

static SCIFI: ThemeTables = ThemeTables {
    name: "Science Fiction",
    icon: "🚀",
    description: "A futuristic world of advanced technology and space exploration",
    prefixes: [
        &["Neo", "Cyber", "Quantum", "Nova", "Meta"],
        &["Tech", "Data", "Grid", "Neural"],
        &["Agri", "Bio", "Eco", "Solar"],
    ],
    suffixes: [
        &["plex", "city", "prime", "hub", "core", "nexus"],
        &["port", "node", "link", "zone", "sector"],
        &["dome", "lab", "pod", "unit", "cell"],
    ],
    specialties: [
        &["Spaceport", "AI Research", "Quantum Computing", "Biotech Labs", "Energy Harvesting"],
        &["Tech Manufacturing", "Data Mining", "Robotics", "Neural Interfaces", "Clone Facilities"],
        &["Hydroponic Farms", "Solar Arrays", "Mining Outpost", "Research Station", "Monitoring Post"],
    ],
    pois: &[
        PoiDef { kind: "research_facility", icon: "🔬", name: "Research Facility" },
        PoiDef { kind: "crashed_ship", icon: "🛸", name: "Crashed Ship" },
        PoiDef { kind: "energy_plant", icon: "⚡", name: "Energy Plant" },
        PoiDef { kind: "ai_core", icon: "🤖", name: "AI Core" },
        PoiDef { kind: "terraforming_site", icon: "🌍", name: "Terraforming Site" },
    ],
    events: &[
        ("technological", &["AI Awakening", "New Discovery", "System Malfunction", "Quantum Breakthrough"]),
        ("political", &["Corporate Takeover", "Colony Independence", "Trade War", "Diplomatic Summit"]),
        ("crisis", &["Alien Contact", "Solar Flare", "Nano Plague", "Resource Shortage"]),
        ("cultural", &["Virtual Festival", "Augmentation Rights", "Digital Art Expo", "Memory Upload Day"]),
    ],
};

// ============================================================================
// STEAMPUNK
// ============================================================================

static STEAMPUNK: ThemeTables = ThemeTables {
    name: "Steampunk",
    icon: "⚙️",
    description: "A world of steam-powered machinery and Victorian innovation",
    prefixes: [
        &["Brass", "Steam", "Gear", "Clock", "Iron"],
        &["Copper", "Coal", "Engine", "Boiler"],
        &["Cog", "Pipe", "Valve", "Spring"],
    ],
    suffixes: [
        &["works", "forge", "haven", "borough", "junction"],
        &["mill", "depot", "yard", "station", "works"],
        &["hamlet", "hollow", "bend", "ridge", "crossing"],
    ],
    specialties: [
        &["Airship Port", "Clockwork Academy", "Steam Engine Works", "Inventor Guild", "Coal Exchange"],
        &["Gear Manufacturing", "Brass Foundry", "Automaton Workshop", "Boiler Works", "Telegraph Station"],
        &["Coal Mining", "Copper Smithing", "Pipe Fitting", "Steam Farming", "Cog Crafting"],
    ],
    pois: &[
        PoiDef { kind: "airship_dock", icon: "🎈", name: "Airship Dock" },
        PoiDef { kind: "clocktower", icon: "🕐", name: "Grand Clocktower" },
        PoiDef { kind: "steam_factory", icon: "🏭", name: "Steam Factory" },
        PoiDef { kind: "inventor_workshop", icon: "🔧", name: "Inventor Workshop" },
        PoiDef { kind: "underground_railway", icon: "🚂", name: "Underground Railway" },
    ],
    events: &[
        ("technological", &["New Invention", "Boiler Explosion", "Automaton Uprising", "Airship Race"]),
        ("industrial", &["Factory Strike", "Coal Shortage", "Trade Exhibition", "Railway Opening"]),
        ("cultural", &["Inventor Fair", "Steam Rally", "Clockwork Opera", "Gear Festival"]),
        ("adventure", &["Sky Pirates", "Underground Discovery", "Time Machine Test", "Steam Dragon Sighting"]),
    ],
};

fn pick<R: Rng>(items: &'static [&'static str], rng: &mut R) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn tier_index(tier: SettlementTier) -> usize {
    match tier {
        SettlementTier::City => 0,
        SettlementTier::Town => 1,
        SettlementTier::Village => 2,
    }
}

impl Theme {
    pub fn all() -> &'static [Self] {
        &[Self::Medieval, Self::Fantasy, Self::Scifi, Self::Steampunk]
    }

    /// Identifier used on the command line and in save files
    pub fn id(&self) -> &'static str {
        match self {
            Self::Medieval => "medieval",
            Self::Fantasy => "fantasy",
            Self::Scifi => "scifi",
            Self::Steampunk => "steampunk",
        }
    }

    fn tables(&self) -> &'static ThemeTables {
        match self {
            Self::Medieval => &MEDIEVAL,
            Self::Fantasy => &FANTASY,
            Self::Scifi => &SCIFI,
            Self::Steampunk => &STEAMPUNK,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.tables().name
    }

    pub fn icon(&self) -> &'static str {
        self.tables().icon
    }

    pub fn description(&self) -> &'static str {
        self.tables().description
    }

    /// Prefix + suffix, e.g. "Castleford" or "Neoplex".
    pub fn random_settlement_name<R: Rng>(&self, tier: SettlementTier, rng: &mut R) -> String {
        let t = self.tables();
        let i = tier_index(tier);
        format!("{}{}", pick(t.prefixes[i], rng), pick(t.suffixes[i], rng))
    }

    pub fn random_specialty<R: Rng>(&self, tier: SettlementTier, rng: &mut R) -> String {
        pick(self.tables().specialties[tier_index(tier)], rng).to_string()
    }

    pub fn random_poi<R: Rng>(&self, rng: &mut R) -> PoiFlavor {
        match self.tables().pois.choose(rng) {
            Some(def) => PoiFlavor {
                kind: def.kind.to_string(),
                name: def.name.to_string(),
                icon: def.icon.to_string(),
            },
            None => PoiFlavor {
                kind: "ruins".to_string(),
                name: "Unknown Ruins".to_string(),
                icon: String::new(),
            },
        }
    }

    /// Category first, then an event within it.
    pub fn random_event<R: Rng>(&self, rng: &mut R) -> ThemeEvent {
        let (category, names) = self
            .tables()
            .events
            .choose(rng)
            .copied()
            .unwrap_or(("", &[]));
        ThemeEvent {
            category: category.to_string(),
            name: pick(names, rng).to_string(),
            theme: *self,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Theme {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| GenerationError::UnknownTheme(s.to_string()))
    }
}
