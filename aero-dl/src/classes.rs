//! The fixed aircraft category set.

use crate::common::*;

pub const NUM_CLASSES: usize = 6;

/// Category names in id order. The ids are part of the submission format
/// and must not be reordered.
pub static CLASSES: Lazy<IndexSet<&'static str>> = Lazy::new(|| {
    let classes: IndexSet<_> = ["A10", "B52", "C130", "F16", "F22", "F35"]
        .into_iter()
        .collect();
    debug_assert_eq!(classes.len(), NUM_CLASSES);
    classes
});

pub fn class_index(name: &str) -> Result<usize> {
    CLASSES
        .get_index_of(name)
        .ok_or_else(|| format_err!("unknown aircraft category '{}'", name))
}

pub fn class_name(index: usize) -> Result<&'static str> {
    CLASSES
        .get_index(index)
        .copied()
        .ok_or_else(|| format_err!("class id {} out of range", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ids_are_stable() {
        assert_eq!(class_index("A10").unwrap(), 0);
        assert_eq!(class_index("F35").unwrap(), 5);
        assert_eq!(class_name(2).unwrap(), "C130");
        assert!(class_index("MIG29").is_err());
        assert!(class_name(6).is_err());
    }
}
