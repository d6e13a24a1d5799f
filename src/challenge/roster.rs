//! Static character → weapon table.

use std::sync::OnceLock;

/// A playable character and the two weapons it can wield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub weapons: [String; 2],
}

impl Character {
    /// True if either weapon appears verbatim (case-sensitive) in the text.
    pub fn matches(&self, challenge_text: &str) -> bool {
        self.weapons
            .iter()
            .any(|weapon| challenge_text.contains(weapon.as_str()))
    }
}

/// Ordered, read-only table of characters. Iteration order is the order
/// characters were defined in, which is also the order results are reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraitTable {
    characters: Vec<Character>,
}

impl TraitTable {
    /// Builds a table from `(name, [weapon, weapon])` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, [&'a str; 2])>,
    {
        let characters = pairs
            .into_iter()
            .map(|(name, [a, b])| Character {
                name: name.to_string(),
                weapons: [a.to_string(), b.to_string()],
            })
            .collect();
        Self { characters }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }
}

static BUILTIN: OnceLock<TraitTable> = OnceLock::new();

/// The built-in legend roster, constructed on first use.
pub fn builtin() -> &'static TraitTable {
    BUILTIN.get_or_init(|| TraitTable::from_pairs(LEGENDS.iter().copied()))
}

const LEGENDS: &[(&str, [&str; 2])] = &[
    ("Bodvar", ["Hammer", "Sword"]),
    ("Cassidy", ["Hammer", "Blasters"]),
    ("Orion", ["Spear", "Rocket Lance"]),
    ("Lord Vraxx", ["Rocket Lance", "Blasters"]),
    ("Gnash", ["Hammer", "Spear"]),
    ("Queen Nai", ["Spear", "Katars"]),
    ("Hattori", ["Sword", "Spear"]),
    ("Sir Roland", ["Sword", "Rocket Lance"]),
    ("Scarlet", ["Hammer", "Rocket Lance"]),
    ("Thatch", ["Sword", "Blasters"]),
    ("Ada", ["Spear", "Blasters"]),
    ("Sentinel", ["Katars", "Hammer"]),
    ("Lucien", ["Katars", "Blasters"]),
    ("Teros", ["Axe", "Hammer"]),
    ("Brynn", ["Axe", "Spear"]),
    ("Asuri", ["Sword", "Katars"]),
    ("Barraza", ["Axe", "Blasters"]),
    ("Ember", ["Bow", "Katars"]),
    ("Azoth", ["Bow", "Axe"]),
    ("Koji", ["Bow", "Sword"]),
    ("Ulgrim", ["Axe", "Rocket Lance"]),
    ("Diana", ["Bow", "Blasters"]),
    ("Jhala", ["Sword", "Axe"]),
    ("Kor", ["Gauntlets", "Hammer"]),
    ("Wu Shang", ["Spear", "Gauntlets"]),
    ("Val", ["Sword", "Gauntlets"]),
    ("Ragnir", ["Axe", "Katars"]),
    ("Cross", ["Blasters", "Gauntlets"]),
    ("Mirage", ["Spear", "Scythe"]),
    ("Nix", ["Blasters", "Scythe"]),
    ("Mordex", ["Gauntlets", "Scythe"]),
    ("Yumiko", ["Hammer", "Bow"]),
    ("Artemis", ["Rocket Lance", "Scythe"]),
    ("Caspian", ["Gauntlets", "Katars"]),
    ("Sidra", ["Cannon", "Sword"]),
    ("Xull", ["Cannon", "Axe"]),
    ("Kaya", ["Spear", "Bow"]),
    ("Isaiah", ["Cannon", "Blasters"]),
    ("Jiro", ["Sword", "Scythe"]),
    ("Lin Fei", ["Katars", "Cannon"]),
    ("Zariel", ["Gauntlets", "Bow"]),
    ("Rayman", ["Axe", "Gauntlets"]),
    ("Dusk", ["Orb", "Spear"]),
    ("Fait", ["Orb", "Scythe"]),
    ("Thor", ["Orb", "Hammer"]),
    ("Petra", ["Gauntlets", "Orb"]),
    ("Vector", ["Bow", "Rocket Lance"]),
    ("Volkov", ["Scythe", "Axe"]),
    ("Onyx", ["Cannon", "Gauntlets"]),
    ("Jaeyun", ["Sword", "Greatsword"]),
    ("Mako", ["Katars", "Greatsword"]),
    ("Magyar", ["Hammer", "Greatsword"]),
    ("Reno", ["Blasters", "Orb"]),
    ("Munin", ["Scythe", "Bow"]),
    ("Arcadia", ["Greatsword", "Spear"]),
    ("Ezio", ["Sword", "Orb"]),
    ("Tezca", ["Battle Boots", "Gauntlets"]),
    ("Thea", ["Rocket Lance", "Battle Boots"]),
    ("Red Raptor", ["Battle Boots", "Orb"]),
    ("Loki", ["Scythe", "Katars"]),
    ("Seven", ["Cannon", "Spear"]),
];
