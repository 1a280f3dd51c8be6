use std::fs;
use std::path::Path;

use crate::config::ConfigError;

/// Medicines recognised out of the box when no list file is configured.
pub const DEFAULT_KNOWN_MEDICINES: &[&str] = &[
    "Paracetamol", "Acetaminophen", "Ibuprofen", "Aspirin", "Diclofenac",
    "Naproxen", "Tramadol", "Amoxicillin", "Azithromycin", "Ciprofloxacin",
    "Doxycycline", "Metronidazole", "Cephalexin", "Cetirizine", "Loratadine",
    "Montelukast", "Salbutamol", "Omeprazole", "Pantoprazole", "Ranitidine",
    "Domperidone", "Ondansetron", "Metformin", "Glimepiride", "Insulin",
    "Atorvastatin", "Simvastatin", "Amlodipine", "Losartan", "Lisinopril",
    "Metoprolol", "Atenolol", "Furosemide", "Hydrochlorothiazide", "Clopidogrel",
    "Warfarin", "Levothyroxine", "Prednisone", "Prednisolone", "Sertraline",
    "Fluoxetine", "Gabapentin", "Folic Acid", "Vitamin D3", "Calcium Carbonate",
];

/// The externally configured reference list of recognisable medicine names.
///
/// Names are trimmed; blank names and case-insensitive duplicates are dropped,
/// keeping the first spelling seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownMedicines {
    names: Vec<String>,
}

impl KnownMedicines {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            if kept.iter().any(|k| k.eq_ignore_ascii_case(trimmed)) {
                continue;
            }
            kept.push(trimmed.to_string());
        }
        Self { names: kept }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_KNOWN_MEDICINES.iter().copied())
    }

    /// Load a JSON array of names, e.g. `["Paracetamol", "Ibuprofen"]`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let names: Vec<String> = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::new(names);
        tracing::info!(path = %path.display(), count = list.len(), "Loaded known-medicine list");
        Ok(list)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

impl Default for KnownMedicines {
    fn default() -> Self {
        Self::builtin()
    }
}
