//! Named, reusable calculation inputs

use super::RecordStore;
use crate::error::{CalcError, Result};
use crate::interest::CalculationInput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: u64,
    pub name: String,
    pub input: CalculationInput,
}

/// Template collection on top of any record store
#[derive(Debug)]
pub struct Templates<S> {
    store: S,
}

impl<S: RecordStore<Template>> Templates<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Save `input` under `name`, assigning the next id
    pub fn save(&self, name: &str, input: CalculationInput) -> Result<Template> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CalcError::invalid("name", "template name must not be empty"));
        }

        let mut templates = self.store.load()?;
        let template = Template {
            id: templates.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            input,
        };
        templates.push(template.clone());
        self.store.save(&templates)?;
        log::info!("saved template {} ({})", template.id, template.name);
        Ok(template)
    }

    pub fn list(&self) -> Result<Vec<Template>> {
        self.store.load()
    }

    /// Look up by numeric id, falling back to a case-insensitive name match
    pub fn find(&self, key: &str) -> Result<Option<Template>> {
        let templates = self.store.load()?;
        let key = key.trim();

        if let Ok(id) = key.parse::<u64>() {
            if let Some(found) = templates.iter().find(|t| t.id == id) {
                return Ok(Some(found.clone()));
            }
        }
        Ok(templates.into_iter().find(|t| t.name.eq_ignore_ascii_case(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};

    #[test]
    fn test_save_and_find() {
        let templates = Templates::new(MemoryStore::<Template>::new());
        let retirement = CalculationInput::regular_savings(500.0, 6.0, 30.0, 12).unwrap();
        let house = CalculationInput::lump_sum(20_000.0, 4.0, 5.0, 4).unwrap();

        assert_eq!(templates.save("Retirement", retirement).unwrap().id, 1);
        assert_eq!(templates.save("  House deposit ", house).unwrap().id, 2);

        assert_eq!(templates.find("2").unwrap().unwrap().name, "House deposit");
        assert_eq!(templates.find("retirement").unwrap().unwrap().input, retirement);
        assert!(templates.find("99").unwrap().is_none());
        assert!(templates.find("holiday").unwrap().is_none());
    }

    #[test]
    fn test_rejects_blank_name() {
        let templates = Templates::new(MemoryStore::<Template>::new());
        let input = CalculationInput::lump_sum(1.0, 1.0, 1.0, 1).unwrap();
        assert!(matches!(templates.save("   ", input), Err(CalcError::InvalidInput { field: "name", .. })));
    }

    #[test]
    fn test_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let input = CalculationInput::lump_sum(1000.0, 3.5, 10.0, 12)
            .and_then(|i| i.with_tax_rate(15.0))
            .unwrap();

        Templates::new(JsonFileStore::<Template>::new(&path)).save("bond", input).unwrap();

        let reloaded = Templates::new(JsonFileStore::<Template>::new(&path)).list().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].input.tax_rate(), 15.0);
    }
}
