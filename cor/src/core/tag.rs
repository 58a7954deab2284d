//! Enumerated discriminator constants.
//!
//! A [`TagSet`] plays the role of an enumeration declared at runtime: a named,
//! ordered list of `(variant, value)` pairs. A [`Tag`] is one member of a set.
//! Tags compare by identity, so two sets that happen to share a name and values
//! still produce distinct tags.

use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct TagSetInner {
    name: String,
    variants: Vec<(String, String)>,
}

/// A named set of enumerated constants.
#[derive(Debug, Clone)]
pub struct TagSet(Arc<TagSetInner>);

impl TagSet {
    /// Creates a new tag set from `(variant name, value)` pairs.
    #[must_use]
    pub fn new<I, N, V>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self(Arc::new(TagSetInner {
            name: name.into(),
            variants: variants
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }))
    }

    /// Returns the set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Looks up a member by variant name.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<Tag> {
        self.0
            .variants
            .iter()
            .position(|(n, _)| n == name)
            .map(|index| self.at(index))
    }

    /// Looks up a member by variant name.
    ///
    /// # Panics
    ///
    /// Panics if the set has no such variant.
    #[must_use]
    pub fn tag(&self, name: &str) -> Tag {
        self.variant(name)
            .unwrap_or_else(|| panic!("{} has no variant {}", self.name(), name))
    }

    /// Looks up a member by its value.
    #[must_use]
    pub fn by_value(&self, value: &str) -> Option<Tag> {
        self.0
            .variants
            .iter()
            .position(|(_, v)| v == value)
            .map(|index| self.at(index))
    }

    /// Returns true if the tag belongs to this set.
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        Arc::ptr_eq(&self.0, &tag.set.0)
    }

    /// Iterates over all members in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        (0..self.0.variants.len()).map(|index| self.at(index))
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.variants.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.variants.is_empty()
    }

    /// Human-readable description, e.g. `Kind("a", "b")`.
    #[must_use]
    pub fn describe(&self) -> String {
        let values: Vec<String> = self
            .0
            .variants
            .iter()
            .map(|(_, v)| format!("\"{v}\""))
            .collect();
        format!("{}({})", self.name(), values.join(", "))
    }

    fn at(&self, index: usize) -> Tag {
        Tag {
            set: self.clone(),
            index,
        }
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TagSet {}

/// A member of a [`TagSet`].
#[derive(Clone)]
pub struct Tag {
    set: TagSet,
    index: usize,
}

impl Tag {
    /// Returns the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.set.0.variants[self.index].0
    }

    /// Returns the variant value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.set.0.variants[self.index].1
    }

    /// Returns the set this tag belongs to.
    #[must_use]
    pub fn set(&self) -> &TagSet {
        &self.set
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set && self.index == other.index
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.set.name(), self.name())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheeler_types() -> TagSet {
        TagSet::new(
            "WheelerType",
            [("Bicycle", "bicycle"), ("Car", "car"), ("Truck", "truck")],
        )
    }

    #[test]
    fn test_lookup() {
        let kinds = wheeler_types();
        let car = kinds.variant("Car").unwrap();
        assert_eq!(car.value(), "car");
        assert_eq!(kinds.by_value("car"), Some(car));
        assert!(kinds.variant("Plane").is_none());
        assert_eq!(kinds.len(), 3);
    }

    #[test]
    fn test_identity() {
        let a = wheeler_types();
        let b = wheeler_types();
        assert_eq!(a.tag("Car"), a.tag("Car"));
        assert_ne!(a.tag("Car"), a.tag("Truck"));
        assert_ne!(a.tag("Car"), b.tag("Car"));
        assert!(a.contains(&a.tag("Bicycle")));
        assert!(!a.contains(&b.tag("Bicycle")));
    }

    #[test]
    fn test_describe() {
        let kinds = wheeler_types();
        assert_eq!(kinds.describe(), r#"WheelerType("bicycle", "car", "truck")"#);
        assert_eq!(kinds.tag("Truck").to_string(), "truck");
        assert_eq!(format!("{:?}", kinds.tag("Truck")), "WheelerType.Truck");
    }
}
