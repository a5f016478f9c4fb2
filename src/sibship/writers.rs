//! Tab-separated output of point estimates and sampler chains.

use super::{Dataset, Paternity, PaternityChain, RateChain};
use crate::utils::Result;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Buffered TSV file with a header line.
pub struct TsvWriter {
    path: String,
    writer: BufWriter<File>,
}

impl TsvWriter {
    pub fn new(output_path: &str, header: &[&str]) -> Result<TsvWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;
        let mut writer = TsvWriter {
            path: output_path.to_string(),
            writer: BufWriter::new(file),
        };
        writer.write_row(header)?;
        Ok(writer)
    }

    pub fn write_row<T: std::fmt::Display>(&mut self, fields: &[T]) -> Result<()> {
        writeln!(self.writer, "{}", fields.iter().join("\t"))
            .map_err(|e| format!("Failed to write to {}: {}", self.path, e))
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to write to {}: {}", self.path, e))
    }
}

/// One line per offspring with its father label.
pub fn write_assignment(output_path: &str, dataset: &Dataset, paternity: &Paternity) -> Result<()> {
    let mut writer = TsvWriter::new(output_path, &["offspring", "father"])?;
    for (id, father) in dataset.offspring_ids.iter().zip(paternity.labels()) {
        writer.write_row(&[id.clone(), father.to_string()])?;
    }
    writer.finish()
}

/// One line per iteration with the father label of every offspring.
pub fn write_paternity_chain(
    output_path: &str,
    dataset: &Dataset,
    chain: &PaternityChain,
) -> Result<()> {
    let header: Vec<&str> = std::iter::once("iteration")
        .chain(dataset.offspring_ids.iter().map(String::as_str))
        .collect();
    let mut writer = TsvWriter::new(output_path, &header)?;
    for (iteration, sample) in chain.paternity.iter().enumerate() {
        let row: Vec<usize> = std::iter::once(iteration)
            .chain(sample.labels().iter().copied())
            .collect();
        writer.write_row(&row)?;
    }
    writer.finish()
}

/// Long format: one line per iteration and locus.
pub fn write_rate_chain(output_path: &str, dataset: &Dataset, chain: &RateChain) -> Result<()> {
    let mut writer = TsvWriter::new(output_path, &["iteration", "locus", "dropout", "mistyping"])?;
    for iteration in 0..chain.num_iterations() {
        for (locus, rates) in dataset.loci.iter().zip(chain.at(iteration)) {
            writer.write_row(&[
                iteration.to_string(),
                locus.id.clone(),
                rates.dropout.to_string(),
                rates.mistyping.to_string(),
            ])?;
        }
    }
    writer.finish()
}

pub fn write_deviance(output_path: &str, deviance: &[f64]) -> Result<()> {
    let mut writer = TsvWriter::new(output_path, &["iteration", "deviance"])?;
    for (iteration, value) in deviance.iter().enumerate() {
        writer.write_row(&[iteration.to_string(), value.to_string()])?;
    }
    writer.finish()
}

/// Square matrix of pairwise co-assignment probabilities, labelled by
/// offspring id.
pub fn write_coassignment(output_path: &str, dataset: &Dataset, matrix: &[Vec<f64>]) -> Result<()> {
    let header: Vec<&str> = std::iter::once("offspring")
        .chain(dataset.offspring_ids.iter().map(String::as_str))
        .collect();
    let mut writer = TsvWriter::new(output_path, &header)?;
    for (id, row) in dataset.offspring_ids.iter().zip(matrix) {
        let fields: Vec<String> = std::iter::once(id.clone())
            .chain(row.iter().map(|p| format!("{:.4}", p)))
            .collect();
        writer.write_row(&fields)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sibship::{AllelePair, ErrorRates, Locus};
    use std::fs;

    fn dataset() -> Dataset {
        let locus = Locus::new("L1", &[0.5, 0.5], Some(AllelePair(0, 1)), vec![None, None]).unwrap();
        Dataset::with_names(
            "queen".to_string(),
            vec!["w1".to_string(), "w2".to_string()],
            vec![locus],
        )
        .unwrap()
    }

    #[test]
    fn test_write_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.paternity.tsv");
        let path = path.to_str().unwrap();
        write_assignment(path, &dataset(), &Paternity::singletons(2)).unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "offspring\tfather\nw1\t0\nw2\t1\n"
        );
    }

    #[test]
    fn test_write_chains() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dataset();
        let mut rates = RateChain::with_capacity(1, 2);
        rates.push(&[ErrorRates::new(0.25, 0.5).unwrap()]);
        rates.push(&[ErrorRates::new(0.125, 0.5).unwrap()]);
        let chain = PaternityChain {
            paternity: vec![Paternity::single_father(2), Paternity::singletons(2)],
            rates,
            deviance: vec![10.5, 12.0],
        };

        let paternity_path = dir.path().join("p.tsv");
        let paternity_path = paternity_path.to_str().unwrap();
        write_paternity_chain(paternity_path, &dataset, &chain).unwrap();
        assert_eq!(
            fs::read_to_string(paternity_path).unwrap(),
            "iteration\tw1\tw2\n0\t0\t0\n1\t0\t1\n"
        );

        let rates_path = dir.path().join("r.tsv");
        let rates_path = rates_path.to_str().unwrap();
        write_rate_chain(rates_path, &dataset, &chain.rates).unwrap();
        assert_eq!(
            fs::read_to_string(rates_path).unwrap(),
            "iteration\tlocus\tdropout\tmistyping\n0\tL1\t0.25\t0.5\n1\tL1\t0.125\t0.5\n"
        );

        let deviance_path = dir.path().join("d.tsv");
        let deviance_path = deviance_path.to_str().unwrap();
        write_deviance(deviance_path, &chain.deviance).unwrap();
        assert_eq!(
            fs::read_to_string(deviance_path).unwrap(),
            "iteration\tdeviance\n0\t10.5\n1\t12\n"
        );
    }

    #[test]
    fn test_write_coassignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.tsv");
        let path = path.to_str().unwrap();
        write_coassignment(path, &dataset(), &[vec![1.0, 0.25], vec![0.25, 1.0]]).unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "offspring\tw1\tw2\nw1\t1.0000\t0.2500\nw2\t0.2500\t1.0000\n"
        );
    }
}
