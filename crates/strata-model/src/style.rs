use std::fmt;

use crate::attrs::Attrs;
use crate::schema::StyleType;

/// A character-level style: a type plus its attributes (e.g. a link target).
/// Two styles are equal when both type and attributes match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    style_type: StyleType,
    attrs: Attrs,
}

impl Style {
    pub(crate) fn new(style_type: StyleType, attrs: Attrs) -> Self {
        Self { style_type, attrs }
    }

    pub fn style_type(&self) -> &StyleType {
        &self.style_type
    }

    pub fn name(&self) -> &str {
        self.style_type.name()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Add this style to `set`, replacing any instance of the same type.
    pub fn add_to_set(&self, set: &StyleSet) -> StyleSet {
        let mut styles = Vec::with_capacity(set.0.len() + 1);
        let mut placed = false;
        for existing in &set.0 {
            if existing.style_type == self.style_type {
                if !placed {
                    styles.push(self.clone());
                    placed = true;
                }
                continue;
            }
            if !placed && existing.style_type.rank() > self.style_type.rank() {
                styles.push(self.clone());
                placed = true;
            }
            styles.push(existing.clone());
        }
        if !placed {
            styles.push(self.clone());
        }
        StyleSet(styles)
    }

    pub fn remove_from_set(&self, set: &StyleSet) -> StyleSet {
        StyleSet(set.0.iter().filter(|s| *s != self).cloned().collect())
    }

    pub fn is_in_set(&self, set: &StyleSet) -> bool {
        set.0.contains(self)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of styles ordered by rank, holding at most one style per type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSet(Vec<Style>);

impl StyleSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a set from arbitrary styles. Later styles supersede earlier ones
    /// of the same type.
    pub fn from_styles<I: IntoIterator<Item = Style>>(styles: I) -> Self {
        styles
            .into_iter()
            .fold(Self::empty(), |set, style| style.add_to_set(&set))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Style> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, style: &Style) -> bool {
        style.is_in_set(self)
    }

    /// The instance of `style_type` in this set, if any.
    pub fn find_type(&self, style_type: &StyleType) -> Option<&Style> {
        self.0.iter().find(|s| &s.style_type == style_type)
    }

    pub fn with(&self, style: &Style) -> Self {
        style.add_to_set(self)
    }

    pub fn without(&self, style: &Style) -> Self {
        style.remove_from_set(self)
    }
}

impl<'a> IntoIterator for &'a StyleSet {
    type Item = &'a Style;
    type IntoIter = std::slice::Iter<'a, Style>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::attrs;
    use crate::schema::Schema;

    fn style(name: &str) -> Style {
        Schema::basic().style(name, None).unwrap()
    }

    fn link(href: &str) -> Style {
        Schema::basic()
            .style("link", Some(&attrs([("href", href)])))
            .unwrap()
    }

    #[test]
    fn sets_are_ordered_by_rank() {
        let set = StyleSet::from_styles([style("code"), style("em"), style("strong")]);
        let names: Vec<_> = set.iter().map(Style::name).collect();
        assert_eq!(names, ["em", "strong", "code"]);
    }

    #[test]
    fn same_type_replaces_payload() {
        let set = link("http://foo").add_to_set(&StyleSet::from_styles([style("em")]));
        let set = link("http://bar").add_to_set(&set);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.find_type(link("x").style_type()),
            Some(&link("http://bar"))
        );
    }

    #[test]
    fn remove_requires_equal_attrs() {
        let set = StyleSet::from_styles([link("http://foo")]);
        assert_eq!(link("http://bar").remove_from_set(&set), set);
        assert!(link("http://foo").remove_from_set(&set).is_empty());
    }

    #[test]
    fn adding_existing_style_is_stable() {
        let set = StyleSet::from_styles([style("em"), style("strong")]);
        assert_eq!(style("em").add_to_set(&set), set);
    }
}
