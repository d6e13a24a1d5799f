//! Ranks characters by how many active challenges their weapons cover.

use std::fmt;

use super::roster::TraitTable;

/// Active challenges matched by one character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    pub character: String,
    pub challenges: Vec<String>,
}

/// Outcome of [`best_characters`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// There were no active challenges to match
    NoChallenges,
    /// No character's weapons appear in any active challenge
    NoMatchingCharacters,
    /// Every character tied for the highest match count, in roster order
    Best(Vec<Coverage>),
}

impl MatchResult {
    /// Names of the winning characters; empty for the sentinel outcomes.
    pub fn best_characters(&self) -> Vec<&str> {
        match self {
            Self::Best(coverage) => coverage.iter().map(|c| c.character.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Matched challenges per winning character; empty for the sentinel outcomes.
    pub fn coverage(&self) -> &[Coverage] {
        match self {
            Self::Best(coverage) => coverage,
            _ => &[],
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChallenges => writeln!(f, "No specific challenges identified"),
            Self::NoMatchingCharacters => writeln!(f, "No matching characters for the challenges"),
            Self::Best(_) => {
                for entry in self.coverage() {
                    writeln!(f, "Best character: {}", entry.character)?;
                    writeln!(f, "Challenges:")?;
                    for challenge in &entry.challenges {
                        writeln!(f, "- {}", challenge)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

/// Finds the character(s) whose weapons appear in the most active challenges.
///
/// A challenge counts for a character if either weapon is a case-sensitive
/// substring of it. Challenges may count for several characters, and ties
/// are all returned.
pub fn best_characters<S: AsRef<str>>(active_challenges: &[S], traits: &TraitTable) -> MatchResult {
    if active_challenges.is_empty() {
        return MatchResult::NoChallenges;
    }

    let coverage: Vec<Coverage> = traits
        .iter()
        .map(|character| Coverage {
            character: character.name.clone(),
            challenges: active_challenges
                .iter()
                .map(|s| s.as_ref())
                .filter(|text| character.matches(text))
                .map(str::to_string)
                .collect(),
        })
        .filter(|c| !c.challenges.is_empty())
        .collect();

    let Some(max_count) = coverage.iter().map(|c| c.challenges.len()).max() else {
        return MatchResult::NoMatchingCharacters;
    };

    MatchResult::Best(
        coverage
            .into_iter()
            .filter(|c| c.challenges.len() == max_count)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::roster;

    fn small_table() -> TraitTable {
        TraitTable::from_pairs([
            ("Bodvar", ["Hammer", "Sword"]),
            ("Cassidy", ["Hammer", "Blasters"]),
        ])
    }

    #[test]
    fn test_best_character_wins_on_count() {
        let result = best_characters(
            &["Deal damage with Hammer", "Win with Sword"],
            &small_table(),
        );
        assert_eq!(result.best_characters(), vec!["Bodvar"]);
        assert_eq!(
            result.coverage()[0].challenges,
            vec!["Deal damage with Hammer", "Win with Sword"]
        );
    }

    #[test]
    fn test_empty_input_is_sentinel() {
        let empty: [&str; 0] = [];
        let result = best_characters(&empty, &small_table());
        assert_eq!(result, MatchResult::NoChallenges);
        assert!(result.coverage().is_empty());
        assert_eq!(result.to_string(), "No specific challenges identified\n");
    }

    #[test]
    fn test_no_matches_is_sentinel() {
        let result = best_characters(&["Win 10 matches", "Play online"], &small_table());
        assert_eq!(result, MatchResult::NoMatchingCharacters);
        assert!(result.best_characters().is_empty());
    }

    #[test]
    fn test_ties_are_all_returned() {
        let result = best_characters(&["Deal damage with Hammer"], &small_table());
        assert_eq!(result.best_characters(), vec!["Bodvar", "Cassidy"]);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let result = best_characters(&["deal damage with hammer"], &small_table());
        assert_eq!(result, MatchResult::NoMatchingCharacters);
    }

    #[test]
    fn test_accepts_owned_strings() {
        let active = vec!["KO with Blasters".to_string()];
        let result = best_characters(&active, &small_table());
        assert_eq!(result.best_characters(), vec!["Cassidy"]);
    }

    #[test]
    fn test_builtin_roster_multi_weapon_challenge() {
        let result = best_characters(
            &[
                "Deal 500 damage with Rocket Lance",
                "Win 2 games with Scythe",
            ],
            roster::builtin(),
        );
        // Artemis has Rocket Lance + Scythe
        assert_eq!(result.best_characters(), vec!["Artemis"]);
    }

    #[test]
    fn test_display_lists_challenges() {
        let result = best_characters(&["Win with Sword"], &small_table());
        assert_eq!(
            result.to_string(),
            "Best character: Bodvar\nChallenges:\n- Win with Sword\n\n"
        );
    }
}
