//! Entity schema translation through the public API.

use odm_openapi::{
    assemble, build_field_schema, parse_models, resolve_type, DeclaredType, FieldDescriptor,
    ModelDocument, Resolved, SchemaRegistry, SchemaTree, TranslateError, TranslateOptions,
    TypeToken,
};
use serde_json::{json, Value};

fn translate(models: Value, name: &str) -> Value {
    let document: ModelDocument = parse_models(&models).unwrap();
    document.translate(name).unwrap().to_value()
}

fn person_ref() -> Value {
    json!({ "oneOf": [{ "type": "string" }, { "$ref": "#/components/schemas/person" }] })
}

// === End-to-End Scenarios ===

mod scenarios {
    use super::*;

    #[test]
    fn required_and_optional_scalars() {
        let schema = translate(
            json!({ "models": { "person": { "schema": {
                "name": { "type": "String", "required": true },
                "age": "Number"
            } } } }),
            "person",
        );
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "number" },
                    "_id": { "type": "string" }
                },
                "required": ["name"]
            })
        );
    }

    #[test]
    fn reference_field() {
        let schema = translate(
            json!({ "models": { "story": { "schema": {
                "author": { "type": "ObjectId", "ref": "person" }
            } } } }),
            "story",
        );
        assert_eq!(schema["properties"]["author"], person_ref());
    }

    #[test]
    fn array_of_references() {
        let schema = translate(
            json!({ "models": { "story": { "schema": {
                "fans": [{ "type": "ObjectId", "ref": "person" }]
            } } } }),
            "story",
        );
        assert_eq!(
            schema["properties"]["fans"],
            json!({ "type": "array", "items": person_ref() })
        );
    }

    #[test]
    fn omitted_field() {
        let schema = translate(
            json!({ "models": { "story": {
                "schema": {
                    "title": "String",
                    "internalFlag": { "type": "Boolean", "required": true }
                },
                "options": { "model": { "omitFields": ["internalFlag"] } }
            } } }),
            "story",
        );
        assert!(schema["properties"].get("internalFlag").is_none());
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn no_required_fields_means_no_required_key() {
        let schema = translate(
            json!({ "models": { "story": { "schema": { "title": "String" } } } }),
            "story",
        );
        assert!(schema.get("required").is_none());
    }
}

// === Translation Properties ===

mod properties {
    use super::*;

    #[test]
    fn scalar_tokens_do_not_depend_on_context() {
        let cases = [
            (DeclaredType::Number, TypeToken::Number),
            (DeclaredType::Decimal, TypeToken::Number),
            (DeclaredType::String, TypeToken::String),
            (DeclaredType::Date, TypeToken::String),
            (DeclaredType::Identifier, TypeToken::String),
            (DeclaredType::Boolean, TypeToken::Boolean),
            (DeclaredType::Mixed, TypeToken::Object),
        ];
        for (declared, token) in cases {
            assert_eq!(resolve_type(&declared, None), Some(Resolved::Token(token)));
        }

        let schema = translate(
            json!({ "models": { "story": { "schema": {
                "top": "Date",
                "list": ["Date"],
                "nested": { "inner": "Date" }
            } } } }),
            "story",
        );
        let date = json!({ "type": "string", "format": "date-time" });
        assert_eq!(schema["properties"]["top"], date);
        assert_eq!(schema["properties"]["list"]["items"], date);
        assert_eq!(schema["properties"]["nested"]["properties"]["inner"], date);
    }

    #[test]
    fn required_bubbles_to_nested_parent() {
        let schema = translate(
            json!({ "models": { "story": { "schema": {
                "meta": {
                    "votes": { "type": "Number", "required": true, "description": "upvotes" },
                    "favs": "Number"
                }
            } } } }),
            "story",
        );
        let meta = &schema["properties"]["meta"];
        assert_eq!(meta["required"], json!(["votes"]));
        assert_eq!(
            meta["properties"]["votes"],
            json!({ "type": "number", "description": "upvotes" })
        );
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn truthy_required_values_bubble() {
        let schema = translate(
            json!({ "models": { "story": { "schema": {
                "title": { "type": "String", "required": 1 },
                "body": { "type": "String", "required": [true, "body is mandatory"] },
                "draft": { "type": "Boolean", "required": 0 }
            } } } }),
            "story",
        );
        assert_eq!(schema["required"], json!(["title", "body"]));
    }

    #[test]
    fn version_key_never_appears() {
        let schema = translate(
            json!({ "models": {
                "a": { "schema": { "x": "String" } },
                "b": { "schema": { "x": "String" }, "versionKey": "_rev" }
            } }),
            "b",
        );
        assert!(schema["properties"].get("_rev").is_none());
        assert!(schema["properties"].get("__v").is_none());
    }

    #[test]
    fn virtuals_never_appear() {
        let schema = translate(
            json!({ "models": { "person": { "schema": {
                "first": "String",
                "fullName": { "virtual": true }
            } } } }),
            "person",
        );
        let names: Vec<_> = schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(names, vec!["first", "_id"]);
    }

    #[test]
    fn identifier_without_target_is_plain_string() {
        let built = build_field_schema(
            &FieldDescriptor::new(DeclaredType::Identifier),
            &[],
            &SchemaRegistry::new(),
        )
        .unwrap();
        assert_eq!(built.fragment.unwrap().to_value(), json!({ "type": "string" }));
    }

    #[test]
    fn map_uses_additional_properties() {
        let schema = translate(
            json!({ "models": { "story": { "schema": {
                "labels": { "type": "Map", "of": "String" },
                "anything": { "type": "Map" }
            } } } }),
            "story",
        );
        let labels = &schema["properties"]["labels"];
        assert_eq!(
            labels,
            &json!({ "type": "object", "additionalProperties": { "type": "string" } })
        );
        assert!(labels.get("properties").is_none());
        assert_eq!(
            schema["properties"]["anything"]["additionalProperties"],
            json!({ "type": "object", "properties": {} })
        );
    }
}

// === Metadata Tests ===

mod metadata {
    use super::*;

    #[test]
    fn caller_listed_format_is_copied() {
        let schema = translate(
            json!({ "models": { "person": {
                "schema": {
                    "email": { "type": "String", "format": "email", "example": "a@b.io" },
                    "born": { "type": "Date", "format": "birthday" },
                    "nick": { "type": "String", "format": null }
                },
                "options": { "model": { "props": ["format", "example"] } }
            } } }),
            "person",
        );
        assert_eq!(
            schema["properties"]["email"],
            json!({ "type": "string", "format": "email", "example": "a@b.io" })
        );
        // date-time always wins on dates
        assert_eq!(
            schema["properties"]["born"],
            json!({ "type": "string", "format": "date-time" })
        );
        assert_eq!(schema["properties"]["nick"], json!({ "type": "string" }));
    }

    #[test]
    fn unlisted_metadata_is_dropped() {
        let schema = translate(
            json!({ "models": { "person": { "schema": {
                "email": { "type": "String", "format": "email", "description": "contact" }
            } } } }),
            "person",
        );
        assert_eq!(
            schema["properties"]["email"],
            json!({ "type": "string", "description": "contact" })
        );
    }

    #[test]
    fn metadata_cannot_replace_structure() {
        let schema = translate(
            json!({ "models": { "person": {
                "schema": { "tags": { "type": ["String"], "items": "nope" } },
                "options": { "model": { "props": ["items"] } }
            } } }),
            "person",
        );
        assert_eq!(
            schema["properties"]["tags"],
            json!({ "type": "array", "items": { "type": "string" } })
        );
    }
}

// === Embedded Sub-Schema Tests ===

mod embedding {
    use super::*;

    #[test]
    fn embedded_subschema_is_inlined() {
        let schema = translate(
            json!({
                "schemas": { "address": {
                    "city": { "type": "String", "required": true },
                    "_id": false
                } },
                "models": { "person": { "schema": {
                    "home": { "$embed": "address" },
                    "previous": [{ "$embed": "address" }]
                } } }
            }),
            "person",
        );
        let expected = json!({
            "type": "object",
            "properties": { "city": { "type": "string" } },
            "required": ["city"]
        });
        assert_eq!(schema["properties"]["home"], expected);
        assert_eq!(schema["properties"]["previous"]["items"], expected);
    }

    #[test]
    fn self_embedding_is_rejected() {
        let document = parse_models(&json!({
            "schemas": {
                "a": { "b": { "$embed": "b" } },
                "b": { "a": { "$embed": "a" } }
            },
            "models": { "root": { "schema": { "start": { "$embed": "a" } } } }
        }))
        .unwrap();

        match document.translate("root") {
            Err(TranslateError::CyclicSchema { chain }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected cyclic schema error, got {:?}", other),
        }
    }

    #[test]
    fn engine_api_without_adapter() {
        let mut registry = SchemaRegistry::new();
        registry.insert(
            "point",
            SchemaTree::new()
                .with("x", FieldDescriptor::new(DeclaredType::Number).required())
                .with("y", FieldDescriptor::new(DeclaredType::Number)),
        );
        let tree = SchemaTree::new()
            .with(
                "at",
                FieldDescriptor::new(DeclaredType::Embedded("point".into())).required(),
            )
            .with(
                "owner",
                FieldDescriptor::new(DeclaredType::Identifier)
                    .reference("person")
                    .meta("description", json!("who placed it")),
            );

        let schema = assemble("marker", &tree, &TranslateOptions::default(), &registry).unwrap();
        assert_eq!(schema.required(), ["at"]);
        assert_eq!(
            schema.to_value()["properties"]["at"]["required"],
            json!(["x"])
        );
        assert_eq!(
            schema.to_value()["properties"]["owner"]["description"],
            "who placed it"
        );
    }
}
