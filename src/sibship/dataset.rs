//! Multi-locus data for one maternal family, and the text formats it is
//! read from.

use super::{parse_call, ErrorRates, Locus, Paternity, Phenotype, Result, SibshipError};
use std::io::BufRead;

/// Loci observed on one mother and a shared set of offspring.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub mother_id: String,
    pub offspring_ids: Vec<String>,
    pub loci: Vec<Locus>,
}

impl Dataset {
    /// Builds a dataset with placeholder individual names.
    pub fn new(loci: Vec<Locus>) -> Result<Self> {
        let num_offspring = loci.first().map_or(0, Locus::num_offspring);
        let offspring_ids = (0..num_offspring)
            .map(|index| format!("offspring_{}", index + 1))
            .collect();
        Self::with_names("mother".to_string(), offspring_ids, loci)
    }

    pub fn with_names(
        mother_id: String,
        offspring_ids: Vec<String>,
        loci: Vec<Locus>,
    ) -> Result<Self> {
        for locus in &loci {
            if locus.num_offspring() != offspring_ids.len() {
                return Err(SibshipError::input_shape(format!(
                    "locus {} has phenotypes for {} offspring, expected {}",
                    locus.id,
                    locus.num_offspring(),
                    offspring_ids.len()
                )));
            }
        }
        Ok(Dataset {
            mother_id,
            offspring_ids,
            loci,
        })
    }

    pub fn num_loci(&self) -> usize {
        self.loci.len()
    }

    pub fn num_offspring(&self) -> usize {
        self.offspring_ids.len()
    }

    /// Checks the per-call inputs against the dataset; run once at each entry
    /// point so the iterative algorithms can skip the checks.
    pub fn validate_inputs(&self, paternity: &Paternity, rates: &[ErrorRates]) -> Result<()> {
        if paternity.len() != self.num_offspring() {
            return Err(SibshipError::input_shape(format!(
                "paternity has {} entries, expected one per offspring ({})",
                paternity.len(),
                self.num_offspring()
            )));
        }
        if rates.len() != self.num_loci() {
            return Err(SibshipError::input_shape(format!(
                "got error rates for {} loci, expected {}",
                rates.len(),
                self.num_loci()
            )));
        }
        for (locus, locus_rates) in self.loci.iter().zip(rates) {
            locus_rates.validate().map_err(|e| {
                SibshipError::invalid_parameter(format!("locus {}: {}", locus.id, e.message()))
            })?;
        }
        Ok(())
    }
}

/// Locus definition read from a loci file: `ID DROPOUT MISTYPING FREQUENCIES`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocusRecord {
    pub id: String,
    pub rates: ErrorRates,
    pub frequencies: Vec<f64>,
}

impl LocusRecord {
    pub fn from_line(line: &str) -> std::result::Result<Self, String> {
        const EXPECTED_FIELD_COUNT: usize = 4;
        let split_line: Vec<&str> = line.split_whitespace().collect();
        let (id, dropout, mistyping, frequencies) = match &split_line[..] {
            [id, dropout, mistyping, frequencies] => (*id, *dropout, *mistyping, *frequencies),
            _ => {
                return Err(format!(
                    "Expected {} fields in the format 'id dropout mistyping frequencies', found {}: {}",
                    EXPECTED_FIELD_COUNT,
                    split_line.len(),
                    line
                ))
            }
        };

        let parse_rate = |name: &str, value: &str| {
            value
                .parse::<f64>()
                .map_err(|e| format!("Could not parse {} rate '{}': {}", name, value, e))
        };
        let rates = ErrorRates::new(
            parse_rate("dropout", dropout)?,
            parse_rate("mistyping", mistyping)?,
        )
        .map_err(|e| format!("Locus {}: {}", id, e))?;

        let frequencies = frequencies
            .split(',')
            .map(|f| {
                f.parse::<f64>()
                    .map_err(|e| format!("Could not parse allele frequency '{}': {}", f, e))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(LocusRecord {
            id: id.to_string(),
            rates,
            frequencies,
        })
    }
}

/// Role of an individual in the genotypes file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Mother,
    Offspring,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mother" => Ok(Role::Mother),
            "offspring" => Ok(Role::Offspring),
            _ => Err(format!("role must be 'mother' or 'offspring', got '{}'", s)),
        }
    }
}

fn data_lines<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = std::result::Result<(usize, String), String>> {
    reader
        .lines()
        .enumerate()
        .map(|(line_number, line)| {
            line.map(|l| (line_number + 1, l))
                .map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))
        })
        .filter(|line| match line {
            Ok((_, l)) => !l.trim().is_empty() && !l.starts_with('#'),
            Err(_) => true,
        })
}

pub fn read_loci<R: BufRead>(reader: R) -> std::result::Result<Vec<LocusRecord>, String> {
    let mut records: Vec<LocusRecord> = Vec::new();
    for line in data_lines(reader) {
        let (line_number, line) = line?;
        let record = LocusRecord::from_line(&line)
            .map_err(|e| format!("Error at loci line {}: {}", line_number, e))?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(format!(
                "Duplicate locus entry at line {}: {}",
                line_number, record.id
            ));
        }
        records.push(record);
    }
    Ok(records)
}

/// Reads the genotypes file against the loci it refers to.
///
/// Returns the dataset together with the per-locus error rates from the loci
/// records, in loci-file order.
pub fn read_dataset<R: BufRead>(
    records: &[LocusRecord],
    reader: R,
) -> std::result::Result<(Dataset, Vec<ErrorRates>), String> {
    let num_loci = records.len();
    let mut mother: Option<(String, Vec<Phenotype>)> = None;
    let mut offspring_ids = Vec::new();
    let mut offspring_calls: Vec<Vec<Phenotype>> = Vec::new();

    for line in data_lines(reader) {
        let (line_number, line) = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != num_loci + 2 {
            return Err(format!(
                "Expected {} fields (id, role and one call per locus) at genotypes line {}, found {}",
                num_loci + 2,
                line_number,
                fields.len()
            ));
        }
        let id = fields[0].to_string();
        let role: Role = fields[1]
            .parse()
            .map_err(|e| format!("Error at genotypes line {}: {}", line_number, e))?;
        let calls = fields[2..]
            .iter()
            .map(|call| parse_call(call))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("Error at genotypes line {}: {}", line_number, e))?;

        if id == mother.as_ref().map_or("", |(m, _)| m.as_str()) || offspring_ids.contains(&id) {
            return Err(format!(
                "Duplicate individual at genotypes line {}: {}",
                line_number, id
            ));
        }
        match role {
            Role::Mother if mother.is_some() => {
                return Err(format!(
                    "Second mother at genotypes line {}: only one maternal family is supported",
                    line_number
                ))
            }
            Role::Mother => mother = Some((id, calls)),
            Role::Offspring => {
                offspring_ids.push(id);
                offspring_calls.push(calls);
            }
        }
    }

    let (mother_id, mother_calls) =
        mother.ok_or_else(|| "Genotypes file has no mother".to_string())?;

    let loci = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let offspring = offspring_calls.iter().map(|calls| calls[index]).collect();
            Locus::new(
                record.id.clone(),
                &record.frequencies,
                mother_calls[index],
                offspring,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let dataset = Dataset::with_names(mother_id, offspring_ids, loci)?;
    let rates = records.iter().map(|r| r.rates).collect();
    Ok((dataset, rates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sibship::AllelePair;
    use std::io::Cursor;

    const LOCI: &str = "\
# id dropout mistyping frequencies
L1 0.05 0.01 0.5,0.3,0.2
L2 0.02 0.02 1,1
";

    #[test]
    fn test_read_loci() {
        let records = read_loci(Cursor::new(LOCI)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "L1");
        assert_eq!(records[0].rates, ErrorRates::new(0.05, 0.01).unwrap());
        assert_eq!(records[1].frequencies, vec![1.0, 1.0]);
    }

    #[test]
    fn test_read_loci_incomplete_line() {
        let result = read_loci(Cursor::new("L1 0.05 0.01\n"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_loci_invalid_rate() {
        let result = read_loci(Cursor::new("L1 0.7 0.01 0.5,0.5\n"));
        assert!(result.unwrap_err().contains("dropout rate"));
    }

    #[test]
    fn test_read_loci_duplicate() {
        let result = read_loci(Cursor::new("L1 0.05 0.01 1,1\nL1 0.05 0.01 1,1\n"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_dataset() {
        let records = read_loci(Cursor::new(LOCI)).unwrap();
        let genotypes = "\
queen mother 0/1 0/0
w1 offspring 0/2 0/1
w2 offspring ./. 1/1
";
        let (dataset, rates) = read_dataset(&records, Cursor::new(genotypes)).unwrap();
        assert_eq!(dataset.mother_id, "queen");
        assert_eq!(dataset.offspring_ids, vec!["w1", "w2"]);
        assert_eq!(dataset.num_loci(), 2);
        assert_eq!(dataset.loci[0].mother, Some(AllelePair(0, 1)));
        assert_eq!(dataset.loci[0].offspring, vec![Some(AllelePair(0, 2)), None]);
        assert_eq!(dataset.loci[1].frequencies(), &[0.5, 0.5]);
        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn test_read_dataset_rejects_two_mothers() {
        let records = read_loci(Cursor::new(LOCI)).unwrap();
        let genotypes = "m1 mother 0/1 0/0\nm2 mother 0/1 0/0\n";
        assert!(read_dataset(&records, Cursor::new(genotypes)).is_err());
    }

    #[test]
    fn test_read_dataset_requires_mother() {
        let records = read_loci(Cursor::new(LOCI)).unwrap();
        let genotypes = "w1 offspring 0/1 0/0\n";
        assert_eq!(
            read_dataset(&records, Cursor::new(genotypes)).unwrap_err(),
            "Genotypes file has no mother"
        );
    }

    #[test]
    fn test_read_dataset_allele_out_of_range() {
        let records = read_loci(Cursor::new(LOCI)).unwrap();
        let genotypes = "m mother 0/1 0/0\nw1 offspring 0/1 0/2\n";
        let err = read_dataset(&records, Cursor::new(genotypes)).unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_read_dataset_wrong_field_count() {
        let records = read_loci(Cursor::new(LOCI)).unwrap();
        let genotypes = "m mother 0/1\n";
        assert!(read_dataset(&records, Cursor::new(genotypes)).is_err());
    }

    #[test]
    fn test_validate_inputs_shapes() {
        let locus = Locus::new("L1", &[0.5, 0.5], None, vec![None, None]).unwrap();
        let dataset = Dataset::new(vec![locus]).unwrap();
        let rates = vec![ErrorRates::new(0.05, 0.01).unwrap()];
        assert!(dataset
            .validate_inputs(&Paternity::single_father(2), &rates)
            .is_ok());
        assert!(matches!(
            dataset.validate_inputs(&Paternity::single_father(3), &rates),
            Err(SibshipError::InputShape { .. })
        ));
        assert!(matches!(
            dataset.validate_inputs(&Paternity::single_father(2), &[]),
            Err(SibshipError::InputShape { .. })
        ));
        let bad_rates = vec![ErrorRates {
            dropout: 0.0,
            mistyping: 0.01,
        }];
        assert!(matches!(
            dataset.validate_inputs(&Paternity::single_father(2), &bad_rates),
            Err(SibshipError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_dataset_rejects_ragged_loci() {
        let l1 = Locus::new("L1", &[0.5, 0.5], None, vec![None, None]).unwrap();
        let l2 = Locus::new("L2", &[0.5, 0.5], None, vec![None]).unwrap();
        assert!(matches!(
            Dataset::new(vec![l1, l2]),
            Err(SibshipError::InputShape { .. })
        ));
    }
}
