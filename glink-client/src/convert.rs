/// Conversion from protobuf answers to client concepts
use glink_core::{Error, Result};
use glink_proto as proto;
use proto::concept::{attribute_value, Encoding};

use crate::answer::{ConceptMap, Numeric};
use crate::concept::{Attribute, AttributeType, Concept, RoleType, Thing, ThingType, Value, ValueType};

pub(crate) fn concept_map(proto_map: proto::answer::ConceptMap) -> Result<ConceptMap> {
    let map = proto_map
        .map
        .into_iter()
        .map(|(variable, concept)| Ok((variable, self::concept(concept)?)))
        .collect::<Result<_>>()?;
    Ok(ConceptMap::new(map))
}

pub(crate) fn concept_maps(answers: Vec<proto::answer::ConceptMap>) -> Result<Vec<ConceptMap>> {
    answers.into_iter().map(concept_map).collect()
}

pub(crate) fn concept(proto_concept: proto::concept::Concept) -> Result<Concept> {
    match proto_concept.concept {
        Some(proto::concept::concept::Concept::Thing(thing)) => self::thing(thing),
        Some(proto::concept::concept::Concept::Type(type_)) => self::type_concept(type_),
        None => Err(Error::MissingResponseField("concept".to_string())),
    }
}

fn encoding(value: i32) -> Result<Encoding> {
    Encoding::try_from(value)
        .map_err(|_| Error::UnexpectedResponse(format!("unknown type encoding {}", value)))
}

pub(crate) fn value_type(value: i32) -> Result<ValueType> {
    let value_type = proto::concept::ValueType::try_from(value)
        .map_err(|_| Error::UnexpectedResponse(format!("unknown value type {}", value)))?;
    Ok(match value_type {
        proto::concept::ValueType::Object => ValueType::Object,
        proto::concept::ValueType::Boolean => ValueType::Boolean,
        proto::concept::ValueType::Long => ValueType::Long,
        proto::concept::ValueType::Double => ValueType::Double,
        proto::concept::ValueType::String => ValueType::String,
        proto::concept::ValueType::Datetime => ValueType::DateTime,
    })
}

fn thing_type(type_: &proto::concept::Type) -> ThingType {
    ThingType {
        label: type_.label.clone(),
        is_root: type_.is_root,
    }
}

fn attribute_type(type_: &proto::concept::Type) -> Result<AttributeType> {
    Ok(AttributeType {
        label: type_.label.clone(),
        value_type: value_type(type_.value_type)?,
        is_root: type_.is_root,
    })
}

pub(crate) fn type_concept(type_: proto::concept::Type) -> Result<Concept> {
    Ok(match encoding(type_.encoding)? {
        Encoding::ThingType => Concept::RootThingType(thing_type(&type_)),
        Encoding::EntityType => Concept::EntityType(thing_type(&type_)),
        Encoding::RelationType => Concept::RelationType(thing_type(&type_)),
        Encoding::AttributeType => Concept::AttributeType(attribute_type(&type_)?),
        Encoding::RoleType => Concept::RoleType(RoleType {
            scope: type_.scope,
            label: type_.label,
            is_root: type_.is_root,
        }),
    })
}

pub(crate) fn thing(thing: proto::concept::Thing) -> Result<Concept> {
    let type_ = thing
        .r#type
        .ok_or_else(|| Error::MissingResponseField("thing.type".to_string()))?;

    match encoding(type_.encoding)? {
        Encoding::EntityType => Ok(Concept::Entity(Thing {
            iid: thing.iid,
            type_: thing_type(&type_),
        })),
        Encoding::RelationType => Ok(Concept::Relation(Thing {
            iid: thing.iid,
            type_: thing_type(&type_),
        })),
        Encoding::AttributeType => {
            let value = thing
                .value
                .ok_or_else(|| Error::MissingResponseField("attribute.value".to_string()))?;
            Ok(Concept::Attribute(Attribute {
                iid: thing.iid,
                type_: attribute_type(&type_)?,
                value: self::value(value)?,
            }))
        }
        other => Err(Error::UnexpectedResponse(format!(
            "thing with {:?} encoding",
            other
        ))),
    }
}

pub(crate) fn value(value: proto::concept::AttributeValue) -> Result<Value> {
    match value.value {
        Some(attribute_value::Value::Boolean(v)) => Ok(Value::Boolean(v)),
        Some(attribute_value::Value::Long(v)) => Ok(Value::Long(v)),
        Some(attribute_value::Value::Double(v)) => Ok(Value::Double(v)),
        Some(attribute_value::Value::String(v)) => Ok(Value::String(v)),
        Some(attribute_value::Value::DateTime(v)) => Ok(Value::DateTime(v)),
        None => Err(Error::MissingResponseField("attribute.value".to_string())),
    }
}

pub(crate) fn numeric(numeric: Option<proto::answer::Numeric>) -> Result<Numeric> {
    match numeric.and_then(|n| n.value) {
        Some(proto::answer::numeric::Value::LongValue(v)) => Ok(Numeric::Long(v)),
        Some(proto::answer::numeric::Value::DoubleValue(v)) => Ok(Numeric::Double(v)),
        Some(proto::answer::numeric::Value::Nan(_)) => Ok(Numeric::NaN),
        None => Err(Error::MissingResponseField("numeric".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn proto_type(label: &str, encoding: Encoding) -> proto::concept::Type {
        proto::concept::Type {
            label: label.to_string(),
            scope: String::new(),
            encoding: encoding as i32,
            value_type: proto::concept::ValueType::Object as i32,
            is_root: false,
        }
    }

    #[test]
    fn test_entity() {
        let concept = thing(proto::concept::Thing {
            iid: vec![1, 2, 3],
            r#type: Some(proto_type("person", Encoding::EntityType)),
            value: None,
        })
        .unwrap();
        assert_eq!(concept.label(), "person");
        assert_eq!(concept.iid(), Some(&[1u8, 2, 3][..]));
        assert!(concept.is_thing());
    }

    #[test]
    fn test_attribute() {
        let mut type_ = proto_type("name", Encoding::AttributeType);
        type_.value_type = proto::concept::ValueType::String as i32;
        let concept = thing(proto::concept::Thing {
            iid: vec![9],
            r#type: Some(type_),
            value: Some(proto::concept::AttributeValue {
                value: Some(attribute_value::Value::String("Alice".into())),
            }),
        })
        .unwrap();
        assert_eq!(concept.value(), Some(&Value::String("Alice".into())));
        match concept {
            Concept::Attribute(attribute) => {
                assert_eq!(attribute.type_.value_type, ValueType::String)
            }
            other => panic!("expected attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_attribute_without_value_is_rejected() {
        let err = thing(proto::concept::Thing {
            iid: vec![9],
            r#type: Some(proto_type("name", Encoding::AttributeType)),
            value: None,
        })
        .unwrap_err();
        assert_eq!(err.code(), "MISSING_RESPONSE_FIELD");
    }

    #[test]
    fn test_role_type() {
        let mut type_ = proto_type("employee", Encoding::RoleType);
        type_.scope = "employment".to_string();
        match type_concept(type_).unwrap() {
            Concept::RoleType(role) => assert_eq!(role.scoped_label(), "employment:employee"),
            other => panic!("expected role type, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_encoding() {
        let mut type_ = proto_type("x", Encoding::EntityType);
        type_.encoding = 42;
        assert_eq!(type_concept(type_).unwrap_err().code(), "UNEXPECTED_RESPONSE");
    }

    #[test]
    fn test_concept_map() {
        let mut map = HashMap::new();
        map.insert(
            "p".to_string(),
            proto::concept::Concept {
                concept: Some(proto::concept::concept::Concept::Type(proto_type(
                    "person",
                    Encoding::EntityType,
                ))),
            },
        );
        let answer = concept_map(proto::answer::ConceptMap { map }).unwrap();
        assert_eq!(answer.len(), 1);
        assert!(matches!(answer.get("p"), Some(Concept::EntityType(_))));
    }

    #[test]
    fn test_numeric() {
        let long = proto::answer::Numeric {
            value: Some(proto::answer::numeric::Value::LongValue(12)),
        };
        assert_eq!(numeric(Some(long)).unwrap(), Numeric::Long(12));

        let nan = proto::answer::Numeric {
            value: Some(proto::answer::numeric::Value::Nan(true)),
        };
        assert!(numeric(Some(nan)).unwrap().is_nan());
        assert!(numeric(None).is_err());
    }
}
