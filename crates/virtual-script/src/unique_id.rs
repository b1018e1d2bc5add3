//! Collision-free identifiers for synthesized code.

use rustc_hash::FxHashSet;

/// Prefix of every minted identifier.
pub const UNIQUE_ID_PREFIX: &str = "$_";

/// Mints identifiers of the form `$_<base><seq>`.
///
/// The sequence counter is shared by every base within one generator, so
/// ids minted for different bases never share a number.
#[derive(Debug, Clone)]
pub struct UniqueIdGenerator {
    seq: u64,
    used: FxHashSet<String>,
}

impl Default for UniqueIdGenerator {
    fn default() -> Self {
        Self {
            seq: 1,
            used: FxHashSet::default(),
        }
    }
}

impl UniqueIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id that was not minted before and does not occur in any
    /// of `texts`.
    pub fn generate(&mut self, base: &str, texts: &[&str]) -> String {
        let base = sanitize(base);
        loop {
            let candidate = format!("{UNIQUE_ID_PREFIX}{base}{}", self.seq);
            self.seq += 1;
            let taken =
                self.used.contains(&candidate) || texts.iter().any(|t| t.contains(&candidate));
            if !taken {
                self.used.insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// Returns true if `id` was minted by this generator.
    pub fn is_generated(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}

/// Replaces characters that cannot appear in an identifier with `_`.
fn sanitize(base: &str) -> String {
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
