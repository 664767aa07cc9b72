//! Entry reachability.

use std::collections::{HashMap, VecDeque};

use crate::stats::DatabaseId;

/// Breadth-first shortest paths from a set of seeds.
///
/// Every seed gets the one-element path `[seed]`. Other nodes get the
/// first path found while expanding through `neighbors`, which is a
/// shortest one in edge count. Each id is visited once across all seeds;
/// ids that are never reached are absent from the result.
///
/// Nothing is written anywhere until the whole map is computed.
///
/// # Example
///
/// ```
/// use bundlescope::graph::shortest_paths;
/// use std::collections::HashMap;
///
/// let edges: HashMap<u64, Vec<u64>> = HashMap::from([(1, vec![2]), (2, vec![3])]);
/// let paths = shortest_paths(&[1], |id| edges.get(&id).cloned().unwrap_or_default());
///
/// assert_eq!(paths[&3], vec![1, 2, 3]);
/// ```
pub fn shortest_paths<F, I>(seeds: &[DatabaseId], mut neighbors: F) -> HashMap<DatabaseId, Vec<DatabaseId>>
where
    F: FnMut(DatabaseId) -> I,
    I: IntoIterator<Item = DatabaseId>,
{
    let mut paths: HashMap<DatabaseId, Vec<DatabaseId>> = HashMap::new();
    let mut queue: VecDeque<DatabaseId> = VecDeque::new();

    for &seed in seeds {
        if !paths.contains_key(&seed) {
            paths.insert(seed, vec![seed]);
            queue.push_back(seed);
        }
    }

    while let Some(current) = queue.pop_front() {
        let current_path = match paths.get(&current) {
            Some(path) => path.clone(),
            None => continue,
        };

        for next in neighbors(current) {
            if paths.contains_key(&next) {
                continue;
            }
            let mut path = Vec::with_capacity(current_path.len() + 1);
            path.extend_from_slice(&current_path);
            path.push(next);
            paths.insert(next, path);
            queue.push_back(next);
        }
    }

    paths
}
