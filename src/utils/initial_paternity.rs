use crate::sibship::Paternity;
use crate::utils::{open_input_reader, Result};
use std::{collections::HashMap, io::BufRead, path::Path};

/// Starting paternity for the optimizer and samplers.
#[derive(Debug, PartialEq, Clone)]
pub enum InitialPaternity {
    /// All offspring share one father
    Single,
    /// Every offspring has its own father
    Singletons,
    /// Labels read from a file, keyed by offspring id
    Custom(HashMap<String, usize>),
}

impl InitialPaternity {
    pub fn new(encoding: &str) -> Result<Self> {
        match encoding {
            "single" => Ok(InitialPaternity::Single),
            "singletons" => Ok(InitialPaternity::Singletons),
            _ => {
                let reader = open_input_reader(Path::new(encoding))
                    .map_err(|e| format!("File {}: {}", encoding, e))?;
                Self::from_reader(reader)
            }
        }
    }

    /// Parses `OFFSPRING_ID LABEL` lines; blank and `#` lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut labels = HashMap::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (id, label) = match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(label), None) => (id, label),
                _ => {
                    return Err(format!(
                        "Expected 'offspring label' at paternity line {}: {}",
                        line_number + 1,
                        line
                    ))
                }
            };
            let label = label.parse::<usize>().map_err(|e| {
                format!("Invalid father label at line {}, {}", line_number + 1, e)
            })?;

            if labels.contains_key(id) {
                Err(format!(
                    "Duplicate offspring entry at line {}: {}",
                    line_number + 1,
                    id
                ))?
            } else {
                labels.insert(id.to_string(), label);
            }
        }

        Ok(InitialPaternity::Custom(labels))
    }

    /// Paternity over `offspring_ids`, in that order.
    pub fn resolve(&self, offspring_ids: &[String]) -> Result<Paternity> {
        match self {
            InitialPaternity::Single => Ok(Paternity::single_father(offspring_ids.len())),
            InitialPaternity::Singletons => Ok(Paternity::singletons(offspring_ids.len())),
            InitialPaternity::Custom(labels) => {
                if labels.len() != offspring_ids.len() {
                    return Err(format!(
                        "Paternity file lists {} offspring, genotypes file has {}",
                        labels.len(),
                        offspring_ids.len()
                    ));
                }
                let assignment = offspring_ids
                    .iter()
                    .map(|id| {
                        labels
                            .get(id)
                            .copied()
                            .ok_or_else(|| format!("Father was not specified for offspring: {}", id))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Paternity::new(assignment))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_presets() {
        let offspring = ids(&["a", "b", "c"]);
        let single = InitialPaternity::new("single").unwrap();
        assert_eq!(single.resolve(&offspring).unwrap().labels(), &[0, 0, 0]);
        let singletons = InitialPaternity::new("singletons").unwrap();
        assert_eq!(singletons.resolve(&offspring).unwrap().labels(), &[0, 1, 2]);
    }

    #[test]
    fn test_from_reader_compacts_in_offspring_order() {
        let data = "# offspring father\nc 3\na 7\nb 3\n";
        let initial = InitialPaternity::from_reader(Cursor::new(data)).unwrap();
        let paternity = initial.resolve(&ids(&["a", "b", "c"])).unwrap();
        assert_eq!(paternity.labels(), &[0, 1, 1]);
    }

    #[test]
    fn test_from_reader_errors() {
        assert!(InitialPaternity::from_reader(Cursor::new("a 1\na 2\n")).is_err());
        assert!(InitialPaternity::from_reader(Cursor::new("a x\n")).is_err());
        assert!(InitialPaternity::from_reader(Cursor::new("a\n")).is_err());
        assert!(InitialPaternity::from_reader(Cursor::new("a 1 2\n")).is_err());
    }

    #[test]
    fn test_resolve_requires_every_offspring() {
        let initial = InitialPaternity::from_reader(Cursor::new("a 0\nx 1\n")).unwrap();
        assert!(initial.resolve(&ids(&["a", "b"])).is_err());
        assert!(initial.resolve(&ids(&["a"])).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(InitialPaternity::new("/nonexistent/paternity.txt").is_err());
    }
}
