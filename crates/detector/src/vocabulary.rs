/// The BCCD class list the bundled model was trained on, in model order.
pub const BLOOD_CELL_CLASSES: [&str; 3] = ["RBC", "WBC", "Platelets"];

/// The closed, ordered set of class names a model predicts over.
/// `Detection::class_id` indexes into this list; summaries emit one row
/// per entry in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
}

impl Vocabulary {
    pub fn new(names: Vec<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !names.is_empty(),
            "vocabulary must contain at least one class"
        );
        Ok(Self { names })
    }

    pub fn blood_cells() -> Self {
        Self {
            names: BLOOD_CELL_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Class name for a class id, or None when the id falls outside the
    /// vocabulary.
    pub fn name(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::blood_cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_cells_order_is_fixed() {
        let vocabulary = Vocabulary::blood_cells();
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.name(0), Some("RBC"));
        assert_eq!(vocabulary.name(1), Some("WBC"));
        assert_eq!(vocabulary.name(2), Some("Platelets"));
    }

    #[test]
    fn out_of_range_class_id_has_no_name() {
        let vocabulary = Vocabulary::blood_cells();
        assert_eq!(vocabulary.name(3), None);
        assert_eq!(vocabulary.name(u32::MAX), None);
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        assert!(Vocabulary::new(Vec::new()).is_err());
    }

    #[test]
    fn custom_vocabulary_keeps_order() {
        let vocabulary =
            Vocabulary::new(vec!["cat".to_string(), "dog".to_string()]).unwrap();
        assert_eq!(vocabulary.names(), ["cat", "dog"]);
    }
}
