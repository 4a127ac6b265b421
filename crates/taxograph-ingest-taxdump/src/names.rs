//! Labels and synonyms per tax_id, with scientific-name conflict resolution.

use crate::dump::NameRecord;
use std::collections::{HashMap, HashSet};
use tracing::warn;

pub const SCIENTIFIC_NAME: &str = "scientific name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synonym {
    pub text: String,
    pub disambiguator: String,
    pub name_class: String,
}

#[derive(Debug, Default)]
pub struct NameIndex {
    labels: HashMap<String, String>,
    synonyms: HashMap<String, Vec<Synonym>>,
}

impl NameIndex {
    /// Build labels and synonym lists from name records (in file order).
    ///
    /// When several tax_ids share a scientific name, each contender is
    /// labelled with its own unique name instead, and the shared name is
    /// re-filed as a `scientific name` synonym on each of them.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = NameRecord>,
    {
        let mut index = Self::default();
        // scientific name -> [(tax_id, unique_name)], names in first-seen order
        let mut contenders: Vec<(String, Vec<(String, String)>)> = Vec::new();
        let mut slot_by_name: HashMap<String, usize> = HashMap::new();

        for record in records {
            if record.name_class == SCIENTIFIC_NAME {
                index
                    .labels
                    .insert(record.tax_id.clone(), record.name.clone());
                let slot = *slot_by_name.entry(record.name.clone()).or_insert_with(|| {
                    contenders.push((record.name.clone(), Vec::new()));
                    contenders.len() - 1
                });
                contenders[slot].1.push((record.tax_id, record.unique_name));
            } else {
                index
                    .synonyms
                    .entry(record.tax_id)
                    .or_default()
                    .push(Synonym {
                        text: record.name,
                        disambiguator: record.unique_name,
                        name_class: record.name_class,
                    });
            }
        }

        for (name, holders) in contenders {
            if holders.len() < 2 {
                continue;
            }
            let distinct: HashSet<&str> = holders.iter().map(|(_, u)| u.as_str()).collect();
            if distinct.len() != holders.len() {
                let tax_ids: Vec<&str> = holders.iter().map(|(t, _)| t.as_str()).collect();
                warn!(
                    name = %name,
                    tax_ids = ?tax_ids,
                    "duplicate disambiguators among nodes sharing a scientific name"
                );
            }
            for (tax_id, unique) in holders {
                if !unique.is_empty() {
                    index.labels.insert(tax_id.clone(), unique.clone());
                }
                index.synonyms.entry(tax_id).or_default().push(Synonym {
                    text: name.clone(),
                    disambiguator: unique,
                    name_class: SCIENTIFIC_NAME.to_string(),
                });
            }
        }

        index
    }

    pub fn label(&self, tax_id: &str) -> Option<&str> {
        self.labels.get(tax_id).map(String::as_str)
    }

    pub fn synonyms(&self, tax_id: &str) -> &[Synonym] {
        self.synonyms
            .get(tax_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(tax_id: &str, name: &str, unique: &str, class: &str) -> NameRecord {
        NameRecord {
            tax_id: tax_id.into(),
            name: name.into(),
            unique_name: unique.into(),
            name_class: class.into(),
        }
    }

    #[test]
    fn scientific_name_becomes_label_and_others_synonyms() {
        let index = NameIndex::build(vec![
            name("562", "Escherichia coli", "", "scientific name"),
            name("562", "E. coli", "disamb1", "common name"),
        ]);
        assert_eq!(index.label("562"), Some("Escherichia coli"));
        assert_eq!(
            index.synonyms("562"),
            &[Synonym {
                text: "E. coli".into(),
                disambiguator: "disamb1".into(),
                name_class: "common name".into(),
            }]
        );
        assert!(index.synonyms("9606").is_empty());
    }

    #[test]
    fn shared_scientific_names_use_disambiguators() {
        let index = NameIndex::build(vec![
            name("10", "Bacillus", "Bacillus <bacterium>", "scientific name"),
            name("20", "Bacillus", "Bacillus <stick insect>", "scientific name"),
            name("30", "Homo", "", "scientific name"),
        ]);
        assert_eq!(index.label("10"), Some("Bacillus <bacterium>"));
        assert_eq!(index.label("20"), Some("Bacillus <stick insect>"));
        assert_eq!(index.label("30"), Some("Homo"));

        let refiled = &index.synonyms("10")[0];
        assert_eq!(refiled.text, "Bacillus");
        assert_eq!(refiled.name_class, SCIENTIFIC_NAME);
        assert!(index.synonyms("30").is_empty());
    }

    #[test]
    fn duplicate_disambiguators_still_resolve() {
        let index = NameIndex::build(vec![
            name("10", "Same", "", "scientific name"),
            name("20", "Same", "", "scientific name"),
        ]);
        // Empty disambiguators leave the scientific name as the label.
        assert_eq!(index.label("10"), Some("Same"));
        assert_eq!(index.label("20"), Some("Same"));
        assert_eq!(index.synonyms("20").len(), 1);
    }
}
