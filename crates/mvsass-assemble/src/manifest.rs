//! Order manifest matching and fragment ordering.

use glob::Pattern;

use crate::config::UnlistedPolicy;
use crate::error::AssembleError;
use crate::fragment::{compile_patterns, Fragment, MATCH_OPTIONS};

/// Ordered list of fragment-name patterns.
#[derive(Debug, Clone)]
pub struct OrderManifest {
    entries: Vec<(String, Pattern)>,
}

/// Fragments in final concatenation order.
#[derive(Debug)]
pub struct Ordered {
    /// Fragments to concatenate, in order
    pub fragments: Vec<Fragment>,

    /// Manifest entries that matched nothing
    pub skipped: Vec<String>,
}

impl OrderManifest {
    /// Compile manifest entries into patterns.
    pub fn new(entries: &[String]) -> Result<Self, AssembleError> {
        let patterns = compile_patterns(entries)?;
        Ok(Self {
            entries: entries.iter().cloned().zip(patterns).collect(),
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the entry at `index` names this fragment.
    ///
    /// The entry may match the whole relative path or any trailing run of its
    /// components.
    fn entry_matches(&self, index: usize, fragment: &Fragment) -> bool {
        let (_, pattern) = &self.entries[index];
        fragment
            .suffixes()
            .any(|s| pattern.matches_with(s, MATCH_OPTIONS))
    }

    /// Rank of a fragment: index of the first entry naming it.
    pub fn rank(&self, fragment: &Fragment) -> Option<usize> {
        (0..self.entries.len()).find(|&i| self.entry_matches(i, fragment))
    }

    /// Arrange fragments in concatenation order.
    ///
    /// Ranked fragments come first by rank, ties broken by relative path.
    /// Unlisted fragments follow in relative path order, or are dropped under
    /// [`UnlistedPolicy::Exclude`]. In strict mode an entry matching zero or
    /// several fragments is an error; otherwise unmatched entries are reported
    /// in [`Ordered::skipped`].
    pub fn order(
        &self,
        fragments: Vec<Fragment>,
        policy: UnlistedPolicy,
        strict: bool,
    ) -> Result<Ordered, AssembleError> {
        let mut skipped = Vec::new();

        for (index, (entry, _)) in self.entries.iter().enumerate() {
            let matches: Vec<String> = fragments
                .iter()
                .filter(|f| self.entry_matches(index, f))
                .map(|f| f.relative.clone())
                .collect();

            match matches.len() {
                0 if strict => {
                    return Err(AssembleError::UnmatchedManifestEntry {
                        entry: entry.clone(),
                    })
                }
                0 => skipped.push(entry.clone()),
                1 => {}
                _ if strict => {
                    return Err(AssembleError::AmbiguousManifestEntry {
                        entry: entry.clone(),
                        matches,
                    })
                }
                _ => {}
            }
        }

        let mut ranked = Vec::new();
        let mut unlisted = Vec::new();

        for fragment in fragments {
            match self.rank(&fragment) {
                Some(rank) => ranked.push((rank, fragment)),
                None => unlisted.push(fragment),
            }
        }

        ranked.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.relative.cmp(&b.relative)));
        unlisted.sort_by(|a, b| a.relative.cmp(&b.relative));

        let mut ordered: Vec<Fragment> = ranked.into_iter().map(|(_, f)| f).collect();

        match policy {
            UnlistedPolicy::Append => ordered.extend(unlisted),
            UnlistedPolicy::Exclude => {
                for fragment in &unlisted {
                    tracing::debug!("Dropped unlisted fragment {}", fragment.relative);
                }
            }
        }

        Ok(Ordered {
            fragments: ordered,
            skipped,
        })
    }
}
