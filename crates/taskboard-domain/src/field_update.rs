use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Three-state update for a nullable task field.
///
/// On the wire a `NoChange` field is omitted, `Clear` is `null`, and
/// `Set(value)` is the value itself:
///
/// ```
/// use taskboard_domain::FieldUpdate;
///
/// let mut completed_by = Some("alice".to_string());
/// FieldUpdate::Set("bob".to_string()).apply_cloned(&mut completed_by);
/// assert_eq!(completed_by.as_deref(), Some("bob"));
///
/// FieldUpdate::<String>::Clear.apply_cloned(&mut completed_by);
/// assert_eq!(completed_by, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    NoChange,
    Set(T),
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_no_change(&self) -> bool {
        matches!(self, FieldUpdate::NoChange)
    }

    /// A later update wins unless it is `NoChange`.
    pub fn or(self, earlier: FieldUpdate<T>) -> FieldUpdate<T> {
        match self {
            FieldUpdate::NoChange => earlier,
            later => later,
        }
    }
}

impl<T: Clone> FieldUpdate<T> {
    pub fn apply_cloned(&self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value.clone()),
            FieldUpdate::Clear => *field = None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldUpdate::Set(value) => serializer.serialize_some(value),
            FieldUpdate::Clear | FieldUpdate::NoChange => serializer.serialize_none(),
        }
    }
}

// Only reached when the key is present; pair with `#[serde(default)]` so a
// missing key stays `NoChange`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(FieldUpdate::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
        note: FieldUpdate<String>,
    }

    #[test]
    fn test_wire_forms() {
        let omitted = serde_json::to_string(&Holder::default()).unwrap();
        assert_eq!(omitted, "{}");

        let cleared = serde_json::to_string(&Holder {
            note: FieldUpdate::Clear,
        })
        .unwrap();
        assert_eq!(cleared, r#"{"note":null}"#);

        let set = serde_json::to_string(&Holder {
            note: FieldUpdate::Set("hi".into()),
        })
        .unwrap();
        assert_eq!(set, r#"{"note":"hi"}"#);
    }

    #[test]
    fn test_deserialize_distinguishes_missing_from_null() {
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.note, FieldUpdate::NoChange);

        let null: Holder = serde_json::from_str(r#"{"note":null}"#).unwrap();
        assert_eq!(null.note, FieldUpdate::Clear);

        let set: Holder = serde_json::from_str(r#"{"note":"x"}"#).unwrap();
        assert_eq!(set.note, FieldUpdate::Set("x".to_string()));
    }

    #[test]
    fn test_or_prefers_later_change() {
        let earlier = FieldUpdate::Set(1);
        assert_eq!(FieldUpdate::NoChange.or(earlier.clone()), FieldUpdate::Set(1));
        assert_eq!(FieldUpdate::Set(2).or(earlier.clone()), FieldUpdate::Set(2));
        assert_eq!(FieldUpdate::Clear.or(earlier), FieldUpdate::<i32>::Clear);
    }
}
