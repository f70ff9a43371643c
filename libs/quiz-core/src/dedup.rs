//! Duplicate ID detection and renaming.
//!
//! The first occurrence of an ID keeps it. Each later occurrence is renamed
//! to `<id>_<n>` with the smallest `n >= 2` that collides with nothing else
//! in the collection, including IDs that only appear further down.

use std::collections::{HashMap, HashSet};

/// A planned rename of one duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// Position of the renamed item.
    pub index: usize,
    /// Position of the item that keeps the original ID.
    pub first_index: usize,
    pub old_id: String,
    pub new_id: String,
}

/// Plan the renames needed to make `ids` unique. Returns them in order.
pub fn plan_renames<'a, I>(ids: I) -> Vec<Rename>
where
    I: IntoIterator<Item = &'a str>,
{
    let ids: Vec<&str> = ids.into_iter().collect();
    let mut taken: HashSet<String> = ids.iter().map(|id| id.to_string()).collect();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut renames = Vec::new();

    for (index, &id) in ids.iter().enumerate() {
        match first_seen.get(id) {
            None => {
                first_seen.insert(id, index);
            }
            Some(&first_index) => {
                let new_id = next_free_id(id, &taken);
                taken.insert(new_id.clone());
                renames.push(Rename {
                    index,
                    first_index,
                    old_id: id.to_string(),
                    new_id,
                });
            }
        }
    }

    renames
}

/// Return `items` with duplicate IDs renamed, plus the renames applied.
pub fn deduplicate<T, F, R>(items: &[T], id_of: F, rename: R) -> (Vec<T>, Vec<Rename>)
where
    T: Clone,
    F: Fn(&T) -> &str,
    R: Fn(&T, &str) -> T,
{
    let renames = plan_renames(items.iter().map(&id_of));
    let mut out = items.to_vec();
    for r in &renames {
        out[r.index] = rename(&items[r.index], &r.new_id);
    }
    (out, renames)
}

fn next_free_id(id: &str, taken: &HashSet<String>) -> String {
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", id, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
