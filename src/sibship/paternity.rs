use std::collections::HashMap;

/// Assignment of offspring to paternal clusters.
///
/// Labels are kept compact (`0..num_fathers`, numbered by first occurrence)
/// after every call to [`Paternity::compact`]. Candidate moves made with
/// [`Paternity::assign`] may leave gaps until the next compaction; all
/// readers below tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Paternity {
    labels: Vec<usize>,
}

impl Paternity {
    pub fn new(labels: Vec<usize>) -> Self {
        Paternity {
            labels: compact_labels(&labels),
        }
    }

    /// Every offspring shares one father.
    pub fn single_father(num_offspring: usize) -> Self {
        Paternity {
            labels: vec![0; num_offspring],
        }
    }

    /// Every offspring has its own father.
    pub fn singletons(num_offspring: usize) -> Self {
        Paternity {
            labels: (0..num_offspring).collect(),
        }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn father_of(&self, offspring: usize) -> usize {
        self.labels[offspring]
    }

    /// Number of label slots, i.e. one past the largest label in use.
    pub fn num_fathers(&self) -> usize {
        self.labels.iter().max().map_or(0, |max| max + 1)
    }

    pub fn assign(&mut self, offspring: usize, father: usize) {
        self.labels[offspring] = father;
    }

    pub fn compact(&mut self) {
        self.labels = compact_labels(&self.labels);
    }

    /// Offspring count per label slot; unused slots count zero.
    pub fn family_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_fathers()];
        for &father in &self.labels {
            sizes[father] += 1;
        }
        sizes
    }

    /// Offspring indices of each non-empty family, in label order.
    pub fn families(&self) -> Vec<Vec<usize>> {
        let mut families = vec![Vec::new(); self.num_fathers()];
        for (offspring, &father) in self.labels.iter().enumerate() {
            families[father].push(offspring);
        }
        families.retain(|family| !family.is_empty());
        families
    }
}

/// Relabels clusters to `0..d` in order of first occurrence.
pub fn compact_labels(labels: &[usize]) -> Vec<usize> {
    let mut relabel = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let next = relabel.len();
            *relabel.entry(*label).or_insert(next)
        })
        .collect()
}
