/// Concepts returned in query answers
///
/// Every concept is either a type (a node of the schema) or a thing (an
/// instance of a type).

/// Data type held by an attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// The root attribute type, which holds no values itself.
    Object,
    Boolean,
    Long,
    Double,
    String,
    DateTime,
}

/// Value of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::DateTime(_) => ValueType::DateTime,
        }
    }
}

/// A labelled schema type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThingType {
    pub label: String,
    pub is_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeType {
    pub label: String,
    pub value_type: ValueType,
    pub is_root: bool,
}

/// A role, labelled within the relation type that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleType {
    pub scope: String,
    pub label: String,
    pub is_root: bool,
}

impl RoleType {
    /// `scope:label`, the form roles are written in queries.
    pub fn scoped_label(&self) -> String {
        format!("{}:{}", self.scope, self.label)
    }
}

/// An entity or relation instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Thing {
    pub iid: Vec<u8>,
    pub type_: ThingType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub iid: Vec<u8>,
    pub type_: AttributeType,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Concept {
    /// The root of the type hierarchy.
    RootThingType(ThingType),
    EntityType(ThingType),
    RelationType(ThingType),
    AttributeType(AttributeType),
    RoleType(RoleType),
    Entity(Thing),
    Relation(Thing),
    Attribute(Attribute),
}

impl Concept {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Concept::RootThingType(_)
                | Concept::EntityType(_)
                | Concept::RelationType(_)
                | Concept::AttributeType(_)
                | Concept::RoleType(_)
        )
    }

    pub fn is_thing(&self) -> bool {
        !self.is_type()
    }

    /// Label of the concept's type, or of the type itself.
    pub fn label(&self) -> &str {
        match self {
            Concept::RootThingType(t) | Concept::EntityType(t) | Concept::RelationType(t) => &t.label,
            Concept::AttributeType(t) => &t.label,
            Concept::RoleType(t) => &t.label,
            Concept::Entity(thing) | Concept::Relation(thing) => &thing.type_.label,
            Concept::Attribute(attribute) => &attribute.type_.label,
        }
    }

    /// Instance id, for things.
    pub fn iid(&self) -> Option<&[u8]> {
        match self {
            Concept::Entity(thing) | Concept::Relation(thing) => Some(&thing.iid),
            Concept::Attribute(attribute) => Some(&attribute.iid),
            _ => None,
        }
    }

    /// Attribute value, for attributes.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Concept::Attribute(attribute) => Some(&attribute.value),
            _ => None,
        }
    }
}
