/*!
Typo correction for unknown arguments. [`distance`] is a Levenshtein edit
distance in which changing only the case of a letter costs half an edit, so
`-V` is a closer match for `-v` than anything else.
*/

/// The largest distance at which a known name is offered as a suggestion
pub const SUGGESTION_THRESHOLD: f64 = 2.0;

fn substitution_cost(a: char, b: char) -> f64 {
    if a == b {
        0.0
    } else if a.to_lowercase().eq(b.to_lowercase()) {
        0.5
    } else {
        1.0
    }
}

/// Edit distance between two strings. Insertions, deletions and substitutions
/// cost 1, except that a substitution which only changes case costs 0.5.
#[must_use]
pub fn distance(a: &str, b: &str) -> f64 {
    let b: Vec<char> = b.chars().collect();

    // Single-row dynamic programming: `row[j]` is the distance between the
    // prefix of `a` processed so far and `b[..j]`
    let mut row: Vec<f64> = (0..=b.len()).map(|j| j as f64).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = (i + 1) as f64;

        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let replaced = diagonal + substitution_cost(ca, cb);
            let deleted = above + 1.0;
            let inserted = row[j] + 1.0;

            row[j + 1] = replaced.min(deleted).min(inserted);
            diagonal = above;
        }
    }

    row[b.len()]
}

/// Find the candidate closest to `target`. Ties go to whichever candidate
/// came first.
pub fn closest<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<(&'a str, f64)> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, distance(target, candidate)))
        .fold(None, |best, (candidate, score)| match best {
            Some((_, best_score)) if best_score <= score => best,
            _ => Some((candidate, score)),
        })
}

/// The closest candidate, but only if it's close enough to be a likely typo
pub fn suggest<'a>(target: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    closest(target, candidates)
        .filter(|&(_, score)| score <= SUGGESTION_THRESHOLD)
        .map(|(candidate, _)| candidate)
}
