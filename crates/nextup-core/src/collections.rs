//! Collection membership comparisons.

pub use nextup_models::normalize_collection_name as normalize;

pub fn same_collection(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    !a.is_empty() && a == b
}

/// Loose franchise match between movie and TV collection names: either
/// normalized name is a prefix of the other.
pub fn collections_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.starts_with(&b) || b.starts_with(&a)
}

/// True if any of `memberships` is the same collection as any of `names`.
pub fn any_same(memberships: &[String], names: &[String]) -> bool {
    memberships
        .iter()
        .any(|m| names.iter().any(|n| same_collection(m, n)))
}

/// Distinct normalized names, first occurrence order.
pub fn normalized_set(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let n = normalize(name);
        if !n.is_empty() && !out.contains(&n) {
            out.push(n);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_same_collection_pairs() {
        assert!(same_collection("Stargate Collection", "Stargate"));
        assert!(same_collection("stargate", "STARGATE COLLECTION"));
        assert!(!same_collection("Stargate Collection", "Star Trek"));
        assert!(!same_collection("", " Collection"));
    }

    #[test]
    fn test_same_collection_agrees_with_normalize() {
        let samples = ["Stargate Collection", "Stargate", "Star Trek", "X-Files Collection", "x-files", "Alien"];
        for a in samples {
            for b in samples {
                assert_eq!(same_collection(a, b), normalize(a) == normalize(b), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_overlap_is_prefix_either_direction() {
        assert!(collections_overlap("X-Files Collection", "X-Files"));
        assert!(collections_overlap("Star Wars", "Star Wars: Clone Wars"));
        assert!(collections_overlap("Star Wars: Clone Wars", "Star Wars Collection"));
        assert!(!collections_overlap("Alien", "Predator"));
        assert!(!collections_overlap("Alien", ""));
    }

    #[test]
    fn test_any_same_and_normalized_set() {
        let memberships = names(&["Christmas Collection", "Comedy"]);
        assert!(any_same(&memberships, &names(&["christmas"])));
        assert!(!any_same(&memberships, &names(&["Halloween"])));
        assert!(!any_same(&[], &names(&["Christmas"])));

        assert_eq!(
            normalized_set(&names(&["Stargate Collection", "stargate", "Sci-Fi"])),
            names(&["stargate", "sci-fi"])
        );
    }
}
