/// A user `goto` target of the function being compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    // offset of the first goto naming this label, or of its definition
    pub first_use: usize,
    pub definition: Option<usize>,
}

/// Per function table of goto labels. Forward references are allowed and
/// checked once the function body is complete.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable { labels: Vec::new() }
    }

    pub fn reset(&mut self) {
        self.labels.clear();
    }

    /// Record a `goto name`.
    pub fn reference(&mut self, name: &str, at: usize) {
        if self.labels.iter().any(|label| label.name == name) {
            return;
        }
        log::debug!(target: "parser", "forward reference to label {}", name);
        self.labels.push(Label {
            name: name.to_string(),
            first_use: at,
            definition: None,
        });
    }

    /// Record `name:`; fails with the offset of the earlier definition.
    pub fn define(&mut self, name: &str, at: usize) -> Result<(), usize> {
        match self.labels.iter_mut().find(|label| label.name == name) {
            Some(Label {
                definition: Some(previous),
                ..
            }) => Err(*previous),
            Some(label) => {
                label.definition = Some(at);
                Ok(())
            }
            None => {
                self.labels.push(Label {
                    name: name.to_string(),
                    first_use: at,
                    definition: Some(at),
                });
                Ok(())
            }
        }
    }

    /// The first label, in order of appearance, that was used but never defined.
    pub fn first_undefined(&self) -> Option<&Label> {
        self.labels.iter().find(|label| label.definition.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_reference_resolves() {
        let mut labels = LabelTable::new();
        labels.reference("done", 4);
        assert_eq!(labels.first_undefined().unwrap().first_use, 4);
        labels.define("done", 20).unwrap();
        assert!(labels.first_undefined().is_none());
        labels.reference("done", 30);
        assert!(labels.first_undefined().is_none());
    }

    #[test]
    fn redefinition_reports_first_definition() {
        let mut labels = LabelTable::new();
        labels.reference("top", 1);
        labels.define("top", 3).unwrap();
        assert_eq!(labels.define("top", 12), Err(3));
    }

    #[test]
    fn undefined_labels_in_order_and_reset() {
        let mut labels = LabelTable::new();
        labels.reference("a", 1);
        labels.reference("b", 2);
        labels.define("a", 3).unwrap();
        assert_eq!(labels.first_undefined().unwrap().name, "b");
        labels.reset();
        assert!(labels.first_undefined().is_none());
    }
}
