//! Approximate configuration matching.
//!
//! Projects do not always agree on configuration names ("Debug" in one,
//! "DebugX86" in another). When one project needs the counterpart of a
//! foreign configuration it takes the configuration whose name is closest by
//! edit distance.

use std::collections::HashMap;

use crate::core::project::Project;

/// Levenshtein distance between two strings, counted in characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let insertion = current[j] + 1;
            let deletion = previous[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Edit distance scaled to 0..=100 by the longer string's length.
///
/// 0 means identical; two empty strings score 0.
pub fn similarity_score(a: &str, b: &str) -> usize {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        0
    } else {
        edit_distance(a, b) * 100 / longest
    }
}

/// Index of the candidate closest to `target`.
///
/// Ties go to the earliest candidate.
pub fn closest<'a, I>(target: &str, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let score = similarity_score(target, candidate);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Names from `candidates` close enough to `target` to suggest as a typo fix.
pub fn suggestions<'a, I>(target: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = target.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|c| (similarity_score(&target, &c.to_lowercase()), c))
        .filter(|(score, _)| *score <= 40)
        .collect();
    scored.sort();
    scored.into_iter().map(|(_, c)| c.to_string()).collect()
}

/// Memoized lookup of a project's configuration matching a foreign name.
#[derive(Debug, Default)]
pub struct ConfigurationMatcher {
    cache: HashMap<(String, String), Option<String>>,
}

impl ConfigurationMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of `project`'s configuration closest to `foreign`.
    ///
    /// None only when the project has no configurations.
    pub fn best_configuration(&mut self, project: &Project, foreign: &str) -> Option<String> {
        let key = (project.name.clone(), foreign.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let configurations = project.configurations();
        let result = closest(foreign, configurations.iter().map(|c| c.name.as_str()))
            .map(|index| configurations[index].name.clone());

        self.cache.insert(key, result.clone());
        result
    }
}
