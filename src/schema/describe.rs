//! Introspection: renders a schema as a JSON document.
//!
//! References render as `ref:<key>` (or `context:<key>`), default factories
//! as their description, and functions as `"[function]"`. The label is
//! reported at the top level rather than among the flags.

use serde_json::{json, Map, Value as Json};

use super::{DefaultValue, ErrorOverride, Kind, Match, Schema};
use crate::schema::alternatives::Test;
use crate::schema::object::RenameSource;
use crate::schema::string::Case;

impl Schema {
    /// Describes the schema tree.
    ///
    /// # Example
    ///
    /// ```rust
    /// use valuate::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::object().keys([("a", Schema::string().min(1).required())]);
    /// assert_eq!(
    ///     schema.describe(),
    ///     json!({
    ///         "type": "object",
    ///         "children": {
    ///             "a": {
    ///                 "type": "string",
    ///                 "flags": {"presence": "required"},
    ///                 "invalids": [""],
    ///                 "rules": [{"name": "min", "arg": 1}]
    ///             }
    ///         }
    ///     })
    /// );
    /// ```
    pub fn describe(&self) -> Json {
        let mut description = Map::new();
        description.insert("type".to_string(), Json::String(self.type_name().to_string()));

        let flags = self.describe_flags();
        if !flags.is_empty() {
            description.insert("flags".to_string(), Json::Object(flags));
        }
        if let Some(settings) = &self.settings {
            description.insert("options".to_string(), settings.to_json());
        }
        if let Some(base) = &self.base_type {
            description.insert("base".to_string(), base.describe());
        }

        let docs = &self.docs;
        if let Some(text) = &docs.description {
            description.insert("description".to_string(), Json::String(text.clone()));
        }
        if !docs.notes.is_empty() {
            description.insert("notes".to_string(), json!(docs.notes));
        }
        if !docs.tags.is_empty() {
            description.insert("tags".to_string(), json!(docs.tags));
        }
        if !docs.meta.is_empty() {
            description.insert("meta".to_string(), Json::Array(docs.meta.clone()));
        }
        if !docs.examples.is_empty() {
            let examples = docs.examples.iter().map(|example| example.to_json()).collect();
            description.insert("examples".to_string(), Json::Array(examples));
        }
        if let Some(unit) = &docs.unit {
            description.insert("unit".to_string(), Json::String(unit.clone()));
        }

        if !self.valids.is_empty() {
            description.insert("valids".to_string(), Json::Array(self.valids.describe()));
        }
        if !self.invalids.is_empty() {
            description.insert("invalids".to_string(), Json::Array(self.invalids.describe()));
        }

        if !self.rules.is_empty() {
            let rules = self
                .rules
                .iter()
                .map(|rule| {
                    let mut item = Map::new();
                    item.insert("name".to_string(), Json::String(rule.name.clone()));
                    if let Some(arg) = &rule.arg {
                        item.insert("arg".to_string(), arg.clone());
                    }
                    Json::Object(item)
                })
                .collect();
            description.insert("rules".to_string(), Json::Array(rules));
        }

        if let Some(label) = &self.flags.label {
            description.insert("label".to_string(), Json::String(label.clone()));
        }

        self.describe_inner(&mut description);
        Json::Object(description)
    }

    fn describe_flags(&self) -> Map<String, Json> {
        let flags = &self.flags;
        let mut out = Map::new();

        if let Some(presence) = flags.presence {
            out.insert("presence".to_string(), json!(presence.as_str()));
        }
        if flags.allow_only {
            out.insert("allowOnly".to_string(), json!(true));
        }
        if flags.strip {
            out.insert("strip".to_string(), json!(true));
        }
        if let Some(insensitive) = flags.insensitive {
            out.insert("insensitive".to_string(), json!(insensitive));
        }
        if flags.raw {
            out.insert("raw".to_string(), json!(true));
        }
        match &flags.error {
            Some(ErrorOverride::Message(message)) => {
                out.insert("error".to_string(), json!(message));
            }
            Some(ErrorOverride::Func(_)) => {
                out.insert("error".to_string(), json!("[function]"));
            }
            None => {}
        }
        match &flags.default {
            Some(DefaultValue::Value(value)) => {
                out.insert("default".to_string(), value.to_json());
            }
            Some(DefaultValue::Ref(reference)) => {
                out.insert("default".to_string(), json!(reference.to_string()));
            }
            Some(DefaultValue::Func { description, .. }) => {
                out.insert(
                    "default".to_string(),
                    json!({"description": description, "function": "[function]"}),
                );
            }
            None => {}
        }
        if let Some(empty) = &flags.empty {
            out.insert("empty".to_string(), empty.describe());
        }

        match &self.kind {
            Kind::String(inner) => {
                if let Some(form) = inner.normalize {
                    out.insert("normalize".to_string(), json!(form.as_str()));
                }
                match inner.case {
                    Some(Case::Lower) => {
                        out.insert("case".to_string(), json!("lower"));
                    }
                    Some(Case::Upper) => {
                        out.insert("case".to_string(), json!("upper"));
                    }
                    None => {}
                }
                if inner.trim {
                    out.insert("trim".to_string(), json!(true));
                }
                if inner.truncate {
                    out.insert("truncate".to_string(), json!(true));
                }
                if inner.byte_aligned {
                    out.insert("byteAligned".to_string(), json!(true));
                }
            }
            Kind::Number(inner) => {
                if let Some(precision) = inner.precision {
                    out.insert("precision".to_string(), json!(precision));
                }
            }
            Kind::Date(inner) => {
                if inner.iso {
                    out.insert("format".to_string(), json!("iso"));
                }
                if let Some(unit) = inner.timestamp {
                    out.insert("timestamp".to_string(), json!(unit.as_str()));
                }
            }
            Kind::Binary(inner) => {
                if let Some(encoding) = inner.encoding {
                    out.insert("encoding".to_string(), json!(encoding.as_str()));
                }
            }
            Kind::Array(inner) => {
                if inner.sparse {
                    out.insert("sparse".to_string(), json!(true));
                }
                if inner.single {
                    out.insert("single".to_string(), json!(true));
                }
            }
            Kind::Object(inner) => {
                if let Some(allow) = inner.allow_unknown {
                    out.insert("allowUnknown".to_string(), json!(allow));
                }
            }
            _ => {}
        }
        out
    }

    fn describe_inner(&self, description: &mut Map<String, Json>) {
        match &self.kind {
            Kind::Object(inner) => {
                if let Some(children) = &inner.children {
                    let children: Map<String, Json> = children
                        .iter()
                        .map(|child| (child.key.clone(), child.schema.describe()))
                        .collect();
                    description.insert("children".to_string(), Json::Object(children));
                }
                if !inner.dependencies.is_empty() {
                    let dependencies = inner
                        .dependencies
                        .iter()
                        .map(|dependency| {
                            json!({
                                "type": dependency.kind.as_str(),
                                "key": dependency.key,
                                "peers": dependency.peers,
                            })
                        })
                        .collect();
                    description.insert("dependencies".to_string(), Json::Array(dependencies));
                }
                if !inner.patterns.is_empty() {
                    let patterns = inner
                        .patterns
                        .iter()
                        .map(|pattern| {
                            json!({
                                "regex": format!("/{}/", pattern.regex.as_str()),
                                "rule": pattern.schema.describe(),
                            })
                        })
                        .collect();
                    description.insert("patterns".to_string(), Json::Array(patterns));
                }
                if !inner.renames.is_empty() {
                    let renames = inner
                        .renames
                        .iter()
                        .map(|rename| {
                            let from = match &rename.from {
                                RenameSource::Key(key) => json!(key),
                                RenameSource::Pattern(regex) => json!(format!("/{}/", regex.as_str())),
                            };
                            json!({
                                "from": from,
                                "to": rename.to,
                                "options": {
                                    "alias": rename.options.alias,
                                    "multiple": rename.options.multiple,
                                    "override": rename.options.allow_override,
                                    "ignoreUndefined": rename.options.ignore_undefined,
                                },
                            })
                        })
                        .collect();
                    description.insert("renames".to_string(), Json::Array(renames));
                }
            }
            Kind::Array(inner) => {
                if !inner.ordereds.is_empty() {
                    let ordered = inner.ordereds.iter().map(Schema::describe).collect();
                    description.insert("orderedItems".to_string(), Json::Array(ordered));
                }
                if !inner.items.is_empty() {
                    let items = inner.items.iter().map(Schema::describe).collect();
                    description.insert("items".to_string(), Json::Array(items));
                }
            }
            Kind::Alternatives(inner) => {
                let alternatives = inner
                    .matches
                    .iter()
                    .map(|item| match item {
                        Match::Schema(schema) => schema.describe(),
                        Match::When { test, then, otherwise } => {
                            let mut when = match test {
                                Test::Ref { reference, is } => {
                                    let mut map = Map::new();
                                    map.insert("ref".to_string(), json!(reference.to_string()));
                                    map.insert("is".to_string(), is.describe());
                                    map
                                }
                                Test::Peek(peek) => {
                                    let mut map = Map::new();
                                    map.insert("peek".to_string(), peek.describe());
                                    map
                                }
                            };
                            if let Some(then) = then {
                                when.insert("then".to_string(), then.describe());
                            }
                            if let Some(otherwise) = otherwise {
                                when.insert("otherwise".to_string(), otherwise.describe());
                            }
                            Json::Object(when)
                        }
                    })
                    .collect();
                description.insert("alternatives".to_string(), Json::Array(alternatives));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;
    use crate::schema::When;
    use crate::value::Value;

    #[test]
    fn test_describe_any() {
        assert_eq!(Schema::any().describe(), json!({"type": "any"}));
    }

    #[test]
    fn test_describe_flags_and_docs() {
        let schema = Schema::string()
            .trim()
            .lowercase()
            .label("Name")
            .description("the name")
            .notes(["first note"])
            .tags(["api"])
            .example("ada")
            .default("anon");
        let description = schema.describe();
        assert_eq!(description["label"], json!("Name"));
        assert_eq!(description["description"], json!("the name"));
        assert_eq!(description["notes"], json!(["first note"]));
        assert_eq!(description["tags"], json!(["api"]));
        assert_eq!(description["examples"], json!(["ada"]));
        assert_eq!(description["flags"]["trim"], json!(true));
        assert_eq!(description["flags"]["case"], json!("lower"));
        assert_eq!(description["flags"]["default"], json!("anon"));
        assert!(description["flags"].get("label").is_none());
        assert_eq!(description["invalids"], json!([""]));
    }

    #[test]
    fn test_describe_references() {
        let schema = Schema::number()
            .min(Reference::new("a"))
            .default_ref(Reference::context("b"))
            .valid([Reference::new("c")]);
        let description = schema.describe();
        assert_eq!(description["rules"][0], json!({"name": "min", "arg": "ref:a"}));
        assert_eq!(description["flags"]["default"], json!("context:b"));
        assert_eq!(description["valids"], json!(["ref:c"]));
    }

    #[test]
    fn test_describe_default_function() {
        let schema = Schema::any().default_fn("generated id", |_, _| Ok(Value::from(1)));
        assert_eq!(
            schema.describe()["flags"]["default"],
            json!({"description": "generated id", "function": "[function]"})
        );
    }

    #[test]
    fn test_describe_object() {
        let schema = Schema::object()
            .keys([("a", Schema::any())])
            .xor(["a", "b"])
            .unknown(true);
        let description = schema.describe();
        assert_eq!(description["children"]["a"], json!({"type": "any"}));
        assert_eq!(
            description["dependencies"],
            json!([{"type": "xor", "key": null, "peers": ["a", "b"]}])
        );
        assert_eq!(description["flags"]["allowUnknown"], json!(true));
    }

    #[test]
    fn test_describe_alternatives() {
        let schema = Schema::alternatives()
            .when("a", When::is(true).then(Schema::string()))
            .unwrap();
        let description = schema.describe();
        let when = &description["alternatives"][0];
        assert_eq!(when["ref"], json!("ref:a"));
        assert_eq!(when["is"]["flags"]["presence"], json!("required"));
        assert_eq!(when["then"]["type"], json!("string"));
    }

    #[test]
    fn test_describe_when_on_concrete_schema() {
        let schema = Schema::number()
            .when("a", When::is(1).otherwise(Schema::number().min(0)))
            .unwrap();
        let description = schema.describe();
        assert_eq!(description["type"], json!("alternatives"));
        assert_eq!(description["flags"]["presence"], json!("ignore"));
        assert_eq!(description["base"]["type"], json!("number"));
    }
}
