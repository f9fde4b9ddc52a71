//! Combining two schemas into one.

use super::object::Child;
use super::{Kind, Schema};
use crate::error::BuildError;

impl Schema {
    /// Merges `other` into this schema.
    ///
    /// The result checks everything both schemas check: rules and
    /// references are appended, allowed and denied values are merged with
    /// `other` winning on conflicts, flags set on `other` override, and
    /// object children with the same key are concatenated recursively. An
    /// `any` schema takes on the type of the other side.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    /// use serde_json::json;
    ///
    /// let a = Schema::object().keys([("a", Schema::number())]);
    /// let b = Schema::object().keys([("b", Schema::string())]);
    /// let both = a.concat(b).unwrap();
    /// assert!(both.validate(json!({"a": 1, "b": "x"})).error.is_none());
    ///
    /// assert!(Schema::string().concat(Schema::number()).is_err());
    /// ```
    pub fn concat(self, other: Schema) -> Result<Self, BuildError> {
        let left_any = self.type_name() == "any";
        let right_any = other.type_name() == "any";
        if !left_any && !right_any && self.type_name() != other.type_name() {
            return Err(BuildError::IncompatibleConcat {
                left: self.type_name().to_string(),
                right: other.type_name().to_string(),
            });
        }

        let mut merged = self;
        if left_any && !right_any {
            merged.extension = other.extension.clone();
            merged.base_type = other.base_type.clone();
        }

        merged.settings = match (&merged.settings, &other.settings) {
            (Some(left), Some(right)) => Some(left.merge(right)),
            (left, right) => right.clone().or_else(|| left.clone()),
        };
        merged.valids = merged.valids.merge(&other.valids, &other.invalids);
        merged.invalids = merged.invalids.merge(&other.invalids, &other.valids);
        merged.rules.extend(other.rules.iter().cloned());
        merged.refs.extend(other.refs.iter().cloned());
        merged.flags = merged.flags.merge(&other.flags);
        merged.docs = merged.docs.concat(&other.docs);
        merged.kind = concat_kind(merged.kind, other.kind)?;
        Ok(merged)
    }
}

fn concat_kind(left: Kind, right: Kind) -> Result<Kind, BuildError> {
    let kind = match (left, right) {
        (Kind::Any, right) => right,
        (left, Kind::Any) => left,
        (Kind::String(mut left), Kind::String(right)) => {
            left.normalize = right.normalize.or(left.normalize);
            left.case = right.case.or(left.case);
            left.trim |= right.trim;
            left.replacements.extend(right.replacements);
            left.truncate |= right.truncate;
            left.max_length = left.max_length.or(right.max_length);
            left.byte_aligned |= right.byte_aligned;
            Kind::String(left)
        }
        (Kind::Number(mut left), Kind::Number(right)) => {
            left.precision = right.precision.or(left.precision);
            Kind::Number(left)
        }
        (Kind::Boolean(mut left), Kind::Boolean(right)) => {
            left.truthy = left.truthy.concat(&right.truthy);
            left.falsy = left.falsy.concat(&right.falsy);
            Kind::Boolean(left)
        }
        (Kind::Date(mut left), Kind::Date(right)) => {
            left.iso |= right.iso;
            left.timestamp = right.timestamp.or(left.timestamp);
            Kind::Date(left)
        }
        (Kind::Binary(mut left), Kind::Binary(right)) => {
            left.encoding = right.encoding.or(left.encoding);
            Kind::Binary(left)
        }
        (Kind::Array(mut left), Kind::Array(right)) => {
            left.items.extend(right.items);
            left.ordereds.extend(right.ordereds);
            left.inclusions.extend(right.inclusions);
            left.exclusions.extend(right.exclusions);
            left.requireds.extend(right.requireds);
            left.sparse |= right.sparse;
            left.single |= right.single;
            Kind::Array(left)
        }
        (Kind::Object(mut left), Kind::Object(right)) => {
            left.children = match (left.children, right.children) {
                (Some(target), Some(source)) => Some(concat_children(target, source)?),
                (target, source) => source.or(target),
            };
            left.renames.extend(right.renames);
            left.dependencies.extend(right.dependencies);
            left.patterns.extend(right.patterns);
            left.allow_unknown = right.allow_unknown.or(left.allow_unknown);
            Kind::Object(left)
        }
        (Kind::Alternatives(mut left), Kind::Alternatives(right)) => {
            left.matches.extend(right.matches);
            Kind::Alternatives(left)
        }
        (Kind::Lazy(mut left), Kind::Lazy(right)) => {
            left.factory = right.factory.or(left.factory);
            Kind::Lazy(left)
        }
        (Kind::Function, Kind::Function) => Kind::Function,
        (left, right) => {
            return Err(BuildError::IncompatibleConcat {
                left: left.schema_type().to_string(),
                right: right.schema_type().to_string(),
            })
        }
    };
    Ok(kind)
}

/// Children of `source` replace or extend `target`; a shared key keeps its
/// position and concatenates both schemas.
fn concat_children(mut target: Vec<Child>, source: Vec<Child>) -> Result<Vec<Child>, BuildError> {
    for child in source {
        match target.iter().position(|existing| existing.key == child.key) {
            Some(i) => {
                let existing = target[i].schema.clone();
                target[i].schema = existing.concat(child.schema)?;
            }
            None => target.push(child),
        }
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_incompatible_types() {
        let error = Schema::string().concat(Schema::number()).unwrap_err();
        assert_eq!(error.to_string(), "cannot merge type string with another type: number");
    }

    #[test]
    fn test_any_adopts_type() {
        let schema = Schema::any().required().concat(Schema::number().min(3)).unwrap();
        assert_eq!(schema.schema_type(), SchemaType::Number);
        assert_eq!(schema.validate(Value::Undefined).error.unwrap().details[0].code, "any.required");
        assert_eq!(schema.validate(1).error.unwrap().details[0].code, "number.min");

        let kept = Schema::number().concat(Schema::any().label("n")).unwrap();
        assert_eq!(kept.schema_type(), SchemaType::Number);
        assert_eq!(kept.get_label(), Some("n"));
    }

    #[test]
    fn test_rules_append_and_flags_override() {
        let schema = Schema::string()
            .min(2)
            .optional()
            .concat(Schema::string().max(4).required())
            .unwrap();
        assert_eq!(schema.rules.len(), 2);
        assert!(schema.validate(Value::Undefined).error.is_some());
        assert!(schema.validate("abc").is_ok());
        assert!(schema.validate("abcde").error.is_some());
    }

    #[test]
    fn test_values_merge() {
        let schema = Schema::any()
            .invalid([1])
            .allow([2])
            .concat(Schema::any().allow([1]).invalid([2]))
            .unwrap();
        assert!(schema.validate(1).is_ok());
        assert!(schema.validate(2).error.is_some());
    }

    #[test]
    fn test_disjoint_object_keys() {
        let a = Schema::object().keys([("a", Schema::number())]);
        let b = Schema::object().keys([("b", Schema::string())]);
        let both = a.concat(b).unwrap();
        assert!(both.validate(json!({"a": 1, "b": "x"})).is_ok());
        assert!(both.validate(json!({"c": 1})).error.is_some());
    }

    #[test]
    fn test_shared_object_keys_concat() {
        let a = Schema::object().keys([("a", Schema::number().min(1))]);
        let b = Schema::object().keys([("a", Schema::number().max(3))]);
        let both = a.concat(b).unwrap();
        assert!(both.validate(json!({"a": 2})).is_ok());
        assert!(both.validate(json!({"a": 0})).error.is_some());
        assert!(both.validate(json!({"a": 4})).error.is_some());
    }

    #[test]
    fn test_docs_concat() {
        let schema = Schema::any()
            .description("first")
            .tags(["a"])
            .concat(Schema::any().description("second").tags(["b"]))
            .unwrap();
        let description = schema.describe();
        assert_eq!(description["description"], json!("second"));
        assert_eq!(description["tags"], json!(["a", "b"]));
    }
}
