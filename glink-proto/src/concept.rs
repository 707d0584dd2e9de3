/// Concept messages carried inside query answers
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Concept {
    #[prost(oneof = "concept::Concept", tags = "1, 2")]
    pub concept: ::core::option::Option<concept::Concept>,
}

pub mod concept {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Concept {
        #[prost(message, tag = "1")]
        Thing(super::Thing),
        #[prost(message, tag = "2")]
        Type(super::Type),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Thing {
    #[prost(bytes = "vec", tag = "1")]
    pub iid: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub r#type: ::core::option::Option<Type>,
    #[prost(message, optional, tag = "3")]
    pub value: ::core::option::Option<AttributeValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Type {
    #[prost(string, tag = "1")]
    pub label: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub scope: ::prost::alloc::string::String,
    #[prost(enumeration = "Encoding", tag = "3")]
    pub encoding: i32,
    #[prost(enumeration = "ValueType", tag = "4")]
    pub value_type: i32,
    #[prost(bool, tag = "5")]
    pub is_root: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttributeValue {
    #[prost(oneof = "attribute_value::Value", tags = "1, 2, 3, 4, 5")]
    pub value: ::core::option::Option<attribute_value::Value>,
}

pub mod attribute_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(bool, tag = "1")]
        Boolean(bool),
        #[prost(int64, tag = "2")]
        Long(i64),
        #[prost(double, tag = "3")]
        Double(f64),
        #[prost(string, tag = "4")]
        String(::prost::alloc::string::String),
        /// Milliseconds since the Unix epoch
        #[prost(int64, tag = "5")]
        DateTime(i64),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Encoding {
    ThingType = 0,
    EntityType = 1,
    RelationType = 2,
    AttributeType = 3,
    RoleType = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ValueType {
    Object = 0,
    Boolean = 1,
    Long = 2,
    Double = 3,
    String = 4,
    Datetime = 5,
}
